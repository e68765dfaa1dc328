//! The contract model: an immutable, indexed view of a parsed IDL.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{EnumValue, Field, Function, Meta, Primitive, SchemaElement};

/// Struct declaration together with its resolved field set
#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: String,
    pub extends: Option<String>,
    pub comment: String,
    /// Fields declared on this struct, in declaration order
    pub fields: Vec<Field>,
    resolved: BTreeMap<String, Field>,
}

impl Struct {
    /// Own and inherited fields keyed by name. A declaration closer to this
    /// struct shadows the same name further up the chain.
    pub fn resolved_fields(&self) -> &BTreeMap<String, Field> {
        &self.resolved
    }

    pub fn resolved_field(&self, name: &str) -> Option<&Field> {
        self.resolved.get(name)
    }
}

/// What a type name resolves to
#[derive(Debug, Clone, Copy)]
pub enum TypeRef<'a> {
    Primitive(Primitive),
    Struct(&'a Struct),
    Enum(&'a [EnumValue]),
}

/// A field whose type name resolves to nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedType {
    /// e.g. `struct Person field email` or `A.add param[0]`
    pub location: String,
    pub type_name: String,
}

/// Parsed, indexed and immutable form of an IDL document
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    elements: Vec<SchemaElement>,
    /// Elements exactly as decoded, served by introspection
    raw: Vec<Value>,
    meta: Option<Meta>,
    interface_order: Vec<String>,
    interfaces: HashMap<String, Vec<Function>>,
    methods: HashMap<String, Function>,
    structs: HashMap<String, Struct>,
    enums: HashMap<String, Vec<EnumValue>>,
}

impl Contract {
    /// Decode IDL JSON and build the model. No partial model is produced on
    /// failure.
    pub fn parse(bytes: &[u8]) -> SchemaResult<Self> {
        let raw: Vec<Value> = serde_json::from_slice(bytes).map_err(|source| SchemaError::Parse {
            path: ".".to_string(),
            source,
        })?;
        let elements: Vec<SchemaElement> = serde_path_to_error::deserialize(Value::Array(raw.clone()))
            .map_err(|err| SchemaError::Parse {
                path: err.path().to_string(),
                source: err.into_inner(),
            })?;

        Ok(Self::index(elements, raw))
    }

    /// Index elements and compute every struct's resolved field set. The
    /// introspection form is the elements re-encoded as IDL JSON.
    pub fn from_elements(elements: Vec<SchemaElement>) -> Self {
        let raw = elements
            .iter()
            .filter_map(|element| serde_json::to_value(element).ok())
            .collect();
        Self::index(elements, raw)
    }

    fn index(elements: Vec<SchemaElement>, raw: Vec<Value>) -> Self {
        let mut contract = Contract {
            elements: Vec::new(),
            raw,
            meta: None,
            interface_order: Vec::new(),
            interfaces: HashMap::new(),
            methods: HashMap::new(),
            structs: HashMap::new(),
            enums: HashMap::new(),
        };

        for element in &elements {
            match element {
                SchemaElement::Comment(_) => {}
                SchemaElement::Meta(meta) => contract.meta = Some(meta.clone()),
                SchemaElement::Interface(iface) => {
                    for function in &iface.functions {
                        let qualified = format!("{}.{}", iface.name, function.name);
                        contract.methods.insert(qualified, function.clone());
                    }
                    if !contract.interfaces.contains_key(&iface.name) {
                        contract.interface_order.push(iface.name.clone());
                    }
                    contract
                        .interfaces
                        .insert(iface.name.clone(), iface.functions.clone());
                }
                SchemaElement::Struct(def) => {
                    contract.structs.insert(
                        def.name.clone(),
                        Struct {
                            name: def.name.clone(),
                            extends: def.extends.clone(),
                            comment: def.comment.clone(),
                            fields: def.fields.clone(),
                            resolved: BTreeMap::new(),
                        },
                    );
                }
                SchemaElement::Enum(def) => {
                    contract.enums.insert(def.name.clone(), def.values.clone());
                }
            }
        }

        let resolved: Vec<(String, BTreeMap<String, Field>)> = contract
            .structs
            .keys()
            .map(|name| (name.clone(), contract.compute_struct_fields(name)))
            .collect();
        for (name, fields) in resolved {
            if let Some(def) = contract.structs.get_mut(&name) {
                def.resolved = fields;
            }
        }

        contract.elements = elements;
        debug!(
            interfaces = contract.interfaces.len(),
            methods = contract.methods.len(),
            structs = contract.structs.len(),
            enums = contract.enums.len(),
            "Built contract model"
        );
        contract
    }

    // Walk the extends chain root-ward. An unknown parent ends the walk, as
    // does revisiting a struct already seen.
    fn compute_struct_fields(&self, name: &str) -> BTreeMap<String, Field> {
        let mut all_fields = BTreeMap::new();
        let mut visited = HashSet::new();
        let mut current = self.structs.get(name);

        while let Some(def) = current {
            if !visited.insert(def.name.as_str()) {
                break;
            }
            for field in &def.fields {
                all_fields
                    .entry(field.name.clone())
                    .or_insert_with(|| field.clone());
            }
            current = def
                .extends
                .as_deref()
                .and_then(|parent| self.structs.get(parent));
        }

        all_fields
    }

    /// Look up a function by `Interface.function`
    pub fn method(&self, qualified_name: &str) -> Option<&Function> {
        self.methods.get(qualified_name)
    }

    /// Functions of an interface, in declaration order
    pub fn interface(&self, name: &str) -> Option<&[Function]> {
        self.interfaces.get(name).map(Vec::as_slice)
    }

    /// Interface names in declaration order
    pub fn interface_names(&self) -> impl Iterator<Item = &str> {
        self.interface_order.iter().map(String::as_str)
    }

    pub fn struct_def(&self, name: &str) -> Option<&Struct> {
        self.structs.get(name)
    }

    pub fn enum_values(&self, name: &str) -> Option<&[EnumValue]> {
        self.enums.get(name).map(Vec::as_slice)
    }

    /// Typed schema elements in document order
    pub fn elements(&self) -> &[SchemaElement] {
        &self.elements
    }

    /// Schema elements as decoded, attribute for attribute
    pub fn raw_elements(&self) -> &[Value] {
        &self.raw
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    pub fn resolve_type(&self, type_name: &str) -> Option<TypeRef<'_>> {
        if let Some(primitive) = Primitive::from_name(type_name) {
            return Some(TypeRef::Primitive(primitive));
        }
        if let Some(def) = self.structs.get(type_name) {
            return Some(TypeRef::Struct(def));
        }
        self.enums
            .get(type_name)
            .map(|values| TypeRef::Enum(values.as_slice()))
    }

    /// Every field, parameter and return value whose type does not resolve,
    /// in document order
    pub fn unresolved_types(&self) -> Vec<UnresolvedType> {
        let mut unresolved = Vec::new();
        let mut check = |location: String, field: &Field| {
            if self.resolve_type(&field.type_name).is_none() {
                unresolved.push(UnresolvedType {
                    location,
                    type_name: field.type_name.clone(),
                });
            }
        };

        for element in &self.elements {
            match element {
                SchemaElement::Struct(def) => {
                    for field in &def.fields {
                        check(format!("struct {} field {}", def.name, field.name), field);
                    }
                }
                SchemaElement::Interface(iface) => {
                    for function in &iface.functions {
                        for (i, param) in function.params.iter().enumerate() {
                            check(format!("{}.{} param[{}]", iface.name, function.name, i), param);
                        }
                        check(
                            format!("{}.{} returns", iface.name, function.name),
                            &function.returns,
                        );
                    }
                }
                _ => {}
            }
        }

        unresolved
    }

    /// Fail on the first unresolved type reference
    pub fn check(&self) -> SchemaResult<()> {
        match self.unresolved_types().into_iter().next() {
            Some(UnresolvedType { location, type_name }) => {
                Err(SchemaError::UnknownType { location, type_name })
            }
            None => Ok(()),
        }
    }
}
