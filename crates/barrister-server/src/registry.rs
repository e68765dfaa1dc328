//! Handler registry with startup-time conformance checks.
//!
//! Registration verifies that a handler binds every function of the interface
//! with matching arity, the two-slot return shape, and representations that
//! accept a synthesized sample of each declared type.

use std::collections::HashMap;
use std::sync::Arc;

use barrister_idl::{Contract, Field, Primitive, SchemaError, TypeRef};
use serde_json::{Map, Value};
use tracing::info;

use crate::convert::Converter;
use crate::error::{ConvertError, RegistrationError, RegistrationResult};
use crate::handler::{Handler, capitalize};
use crate::repr::TypeRepr;

/// Interface name to handler binding table
#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    contract: Arc<Contract>,
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    pub fn new(contract: Arc<Contract>) -> Self {
        Self {
            contract,
            handlers: HashMap::new(),
        }
    }

    /// Verify `handler` against the interface and store it. A later
    /// registration for the same interface replaces the earlier one.
    pub fn register(&mut self, interface: &str, handler: Handler) -> RegistrationResult<()> {
        let functions = self
            .contract
            .interface(interface)
            .ok_or_else(|| RegistrationError::UnknownInterface(interface.to_string()))?;
        let converter = Converter::new(&self.contract);

        for function in functions {
            let name = capitalize(&function.name);
            let binding = handler
                .get(&name)
                .ok_or_else(|| RegistrationError::MissingFunction {
                    interface: interface.to_string(),
                    function: name.clone(),
                })?;
            let signature = binding.signature();

            if signature.params.len() != function.params.len() {
                return Err(RegistrationError::Arity {
                    interface: interface.to_string(),
                    function: name,
                    expected: function.params.len(),
                    actual: signature.params.len(),
                });
            }
            if signature.returns.len() != 2 || signature.returns[1] != TypeRepr::RpcError {
                return Err(RegistrationError::ReturnShape {
                    interface: interface.to_string(),
                    function: name,
                    actual: signature.returns.len(),
                });
            }

            for (i, (param, repr)) in function.params.iter().zip(&signature.params).enumerate() {
                let path = format!("{interface}.{name} param[{i}]");
                self.verify(&converter, param, repr, &path)?;
            }
            let path = format!("{interface}.{name} return value[0]");
            self.verify(&converter, &function.returns, &signature.returns[0], &path)?;
        }

        info!(
            interface = interface,
            functions = functions.len(),
            "Registered handler"
        );
        self.handlers.insert(interface.to_string(), handler);
        Ok(())
    }

    fn verify(
        &self,
        converter: &Converter<'_>,
        field: &Field,
        repr: &TypeRepr,
        path: &str,
    ) -> RegistrationResult<()> {
        let sample = test_value(&self.contract, field, &mut Vec::new())
            .map_err(|err| schema_error(err, path))?;

        match converter.convert(field, repr, &sample, path) {
            Ok(_) => Ok(()),
            Err(ConvertError::Mismatch { path, message }) => Err(RegistrationError::TypeMismatch {
                path,
                repr: repr.to_string(),
                reason: message,
            }),
            Err(err) => Err(schema_error(err, path)),
        }
    }

    pub fn get(&self, interface: &str) -> Option<&Handler> {
        self.handlers.get(interface)
    }

    pub fn contains(&self, interface: &str) -> bool {
        self.handlers.contains_key(interface)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }
}

fn schema_error(err: ConvertError, path: &str) -> RegistrationError {
    match err {
        ConvertError::UnknownType {
            path: location,
            type_name,
        } => RegistrationError::Schema(SchemaError::UnknownType {
            location: if location.is_empty() {
                path.to_string()
            } else {
                location
            },
            type_name,
        }),
        ConvertError::Mismatch { message, .. } => RegistrationError::TypeMismatch {
            path: path.to_string(),
            repr: String::new(),
            reason: message,
        },
    }
}

/// Representative value for a descriptor: `"testval"`, `99`, `10.3`, `true`,
/// one-element arrays, structs filled field by field, and the first value of
/// an enum. `stack` holds the structs being filled so self-referencing
/// structs terminate.
pub fn test_value(
    contract: &Contract,
    field: &Field,
    stack: &mut Vec<String>,
) -> Result<Value, ConvertError> {
    if stack.contains(&field.type_name) {
        return Ok(if field.is_array {
            Value::Array(Vec::new())
        } else {
            Value::Null
        });
    }
    if field.is_array {
        return Ok(Value::Array(vec![test_value(contract, &field.element(), stack)?]));
    }

    match contract.resolve_type(&field.type_name) {
        Some(TypeRef::Primitive(Primitive::String)) => Ok(Value::from("testval")),
        Some(TypeRef::Primitive(Primitive::Int)) => Ok(Value::from(99)),
        Some(TypeRef::Primitive(Primitive::Float)) => Ok(Value::from(10.3)),
        Some(TypeRef::Primitive(Primitive::Bool)) => Ok(Value::Bool(true)),
        Some(TypeRef::Enum(values)) => Ok(Value::from(
            values.first().map(|v| v.value.clone()).unwrap_or_default(),
        )),
        Some(TypeRef::Struct(def)) => {
            stack.push(def.name.clone());
            let mut object = Map::new();
            for (name, member) in def.resolved_fields() {
                object.insert(name.clone(), test_value(contract, member, stack)?);
            }
            stack.pop();
            Ok(Value::Object(object))
        }
        None => Err(ConvertError::UnknownType {
            path: String::new(),
            type_name: field.type_name.clone(),
        }),
    }
}
