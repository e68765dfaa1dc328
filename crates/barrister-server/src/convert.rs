//! Value conversion: checks a dynamic JSON value against an IDL field
//! descriptor and the handler's representation, producing a normalized value
//! the handler can deserialize.

use barrister_idl::{Contract, EnumValue, Field, Primitive, Struct, TypeRef};
use serde_json::{Map, Value};

use crate::error::ConvertError;
use crate::repr::TypeRepr;

/// Converts values against one contract. Pure: inputs are never modified.
#[derive(Debug, Clone, Copy)]
pub struct Converter<'a> {
    contract: &'a Contract,
}

impl<'a> Converter<'a> {
    pub fn new(contract: &'a Contract) -> Self {
        Self { contract }
    }

    /// Convert `value` against `field`, targeting `repr`. `path` prefixes
    /// every error, e.g. `param[0]`.
    pub fn convert(
        &self,
        field: &Field,
        repr: &TypeRepr,
        value: &Value,
        path: &str,
    ) -> Result<Value, ConvertError> {
        self.convert_in(field, repr, value, path, &mut Vec::new())
    }

    // `scope` holds the struct representations enclosing the current value,
    // innermost last, for resolving `TypeRepr::Named`.
    fn convert_in<'r>(
        &self,
        field: &Field,
        repr: &'r TypeRepr,
        value: &Value,
        path: &str,
        scope: &mut Vec<&'r TypeRepr>,
    ) -> Result<Value, ConvertError> {
        let target = if field.optional {
            match repr {
                TypeRepr::Optional(inner) => inner.as_ref(),
                TypeRepr::Any => repr,
                other => {
                    return Err(ConvertError::mismatch(
                        path,
                        format!(
                            "optional {} requires an optional representation, got {other}",
                            type_label(field)
                        ),
                    ));
                }
            }
        } else {
            match repr {
                TypeRepr::Optional(inner) => inner.as_ref(),
                other => other,
            }
        };
        let target = match target {
            TypeRepr::Named(name) => resolve_named(name, scope, path)?,
            other => other,
        };

        if value.is_null() {
            if field.optional {
                return Ok(Value::Null);
            }
            return Err(ConvertError::mismatch(path, "required value missing"));
        }

        if field.is_array {
            self.convert_array(field, target, value, path, scope)
        } else {
            self.convert_single(field, target, value, path, scope)
        }
    }

    fn convert_array<'r>(
        &self,
        field: &Field,
        target: &'r TypeRepr,
        value: &Value,
        path: &str,
        scope: &mut Vec<&'r TypeRepr>,
    ) -> Result<Value, ConvertError> {
        let element_repr = match target {
            TypeRepr::Array(element) => element.as_ref(),
            TypeRepr::Any => &TypeRepr::Any,
            other => {
                return Err(ConvertError::mismatch(
                    path,
                    format!("{} cannot be converted to {other}", type_label(field)),
                ));
            }
        };
        let Value::Array(items) = value else {
            return Err(ConvertError::mismatch(
                path,
                format!("expected array, got {}", kind(value)),
            ));
        };

        let element = field.element();
        let mut converted = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            converted.push(self.convert_in(
                &element,
                element_repr,
                item,
                &format!("{path}[{i}]"),
                scope,
            )?);
        }
        Ok(Value::Array(converted))
    }

    fn convert_single<'r>(
        &self,
        field: &Field,
        target: &'r TypeRepr,
        value: &Value,
        path: &str,
        scope: &mut Vec<&'r TypeRepr>,
    ) -> Result<Value, ConvertError> {
        match self.contract.resolve_type(&field.type_name) {
            Some(TypeRef::Primitive(primitive)) => {
                convert_primitive(primitive, target, value, path)
            }
            Some(TypeRef::Struct(def)) => {
                if let TypeRepr::Struct { .. } = target {
                    scope.push(target);
                    let converted = self.convert_struct(def, target, value, path, scope);
                    scope.pop();
                    converted
                } else {
                    self.convert_struct(def, target, value, path, scope)
                }
            }
            Some(TypeRef::Enum(values)) => {
                convert_enum(&field.type_name, values, target, value, path)
            }
            None => Err(ConvertError::UnknownType {
                path: path.to_string(),
                type_name: field.type_name.clone(),
            }),
        }
    }

    fn convert_struct<'r>(
        &self,
        def: &Struct,
        target: &'r TypeRepr,
        value: &Value,
        path: &str,
        scope: &mut Vec<&'r TypeRepr>,
    ) -> Result<Value, ConvertError> {
        if !matches!(target, TypeRepr::Struct { .. } | TypeRepr::Any) {
            return Err(ConvertError::mismatch(
                path,
                format!("struct {} cannot be converted to {target}", def.name),
            ));
        }
        let Value::Object(entries) = value else {
            return Err(ConvertError::mismatch(
                path,
                format!("expected object for struct {}, got {}", def.name, kind(value)),
            ));
        };

        let mut converted = Map::new();
        for (name, field) in def.resolved_fields() {
            let field_repr = match target {
                TypeRepr::Any => &TypeRepr::Any,
                _ => target.field(name).ok_or_else(|| {
                    ConvertError::mismatch(
                        path,
                        format!("{target} has no field named {name}"),
                    )
                })?,
            };
            let entry = entries.get(name).unwrap_or(&Value::Null);
            let field_value =
                self.convert_in(field, field_repr, entry, &format!("{path}.{name}"), scope)?;
            converted.insert(name.clone(), field_value);
        }

        Ok(Value::Object(converted))
    }
}

/// The innermost enclosing struct representation called `name`
fn resolve_named<'r>(
    name: &str,
    scope: &[&'r TypeRepr],
    path: &str,
) -> Result<&'r TypeRepr, ConvertError> {
    scope
        .iter()
        .rev()
        .copied()
        .find(|repr| matches!(repr, TypeRepr::Struct { name: enclosing, .. } if enclosing == name))
        .ok_or_else(|| {
            ConvertError::mismatch(
                path,
                format!("struct {name} is not defined by an enclosing representation"),
            )
        })
}

/// `i64::MIN` and `i64::MAX + 1` as floats; both are exact powers of two
const I64_MIN_F64: f64 = -9_223_372_036_854_775_808.0;
const I64_END_F64: f64 = 9_223_372_036_854_775_808.0;

fn convert_primitive(
    primitive: Primitive,
    target: &TypeRepr,
    value: &Value,
    path: &str,
) -> Result<Value, ConvertError> {
    let expected = match primitive {
        Primitive::String => TypeRepr::String,
        Primitive::Int => TypeRepr::Int,
        Primitive::Float => TypeRepr::Float,
        Primitive::Bool => TypeRepr::Bool,
    };
    if *target != TypeRepr::Any && *target != expected {
        return Err(ConvertError::mismatch(
            path,
            format!("{primitive} cannot be converted to {target}"),
        ));
    }

    match (primitive, value) {
        (Primitive::String, Value::String(_)) | (Primitive::Bool, Value::Bool(_)) => {
            Ok(value.clone())
        }
        (Primitive::Int, Value::Number(number)) => {
            if number.is_i64() || number.is_u64() {
                return Ok(value.clone());
            }
            match number.as_f64() {
                Some(f) if f.fract() == 0.0 && (I64_MIN_F64..I64_END_F64).contains(&f) => {
                    Ok(Value::from(f as i64))
                }
                _ => Err(ConvertError::mismatch(
                    path,
                    format!("{number} is not an integer"),
                )),
            }
        }
        (Primitive::Float, Value::Number(number)) => Ok(number
            .as_f64()
            .map(Value::from)
            .unwrap_or_else(|| value.clone())),
        _ => Err(ConvertError::mismatch(
            path,
            format!("expected {primitive}, got {}", kind(value)),
        )),
    }
}

fn convert_enum(
    name: &str,
    declared: &[EnumValue],
    target: &TypeRepr,
    value: &Value,
    path: &str,
) -> Result<Value, ConvertError> {
    let supported: &[String] = match target {
        TypeRepr::Enum { values, .. } => values.as_slice(),
        TypeRepr::String | TypeRepr::Any => &[],
        other => {
            return Err(ConvertError::mismatch(
                path,
                format!("enum {name} cannot be converted to {other}"),
            ));
        }
    };
    let Value::String(text) = value else {
        return Err(ConvertError::mismatch(
            path,
            format!("expected string for enum {name}, got {}", kind(value)),
        ));
    };

    if !declared.iter().any(|v| v.value == *text) {
        let allowed: Vec<&str> = declared.iter().map(|v| v.value.as_str()).collect();
        return Err(ConvertError::mismatch(
            path,
            format!("value '{text}' is not in enum {name}: [{}]", allowed.join(", ")),
        ));
    }
    if !supported.is_empty() && !supported.contains(text) {
        return Err(ConvertError::mismatch(
            path,
            format!("value '{text}' is not supported by {target}"),
        ));
    }

    Ok(value.clone())
}

fn type_label(field: &Field) -> String {
    if field.is_array {
        format!("[]{}", field.type_name)
    } else {
        field.type_name.clone()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conform() -> Contract {
        Contract::parse(include_bytes!("../../../tests/fixtures/conform.json")).unwrap()
    }

    fn mismatch_message(err: ConvertError) -> String {
        match err {
            ConvertError::Mismatch { path, message } => format!("{path}: {message}"),
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    fn status_repr() -> TypeRepr {
        TypeRepr::enumeration("Status", vec!["ok".into(), "err".into()])
    }

    fn repeat_response_repr() -> TypeRepr {
        TypeRepr::structure(
            "RepeatResponse",
            vec![
                ("status".into(), status_repr()),
                ("count".into(), TypeRepr::Int),
                ("items".into(), TypeRepr::array(TypeRepr::String)),
            ],
        )
    }

    #[test]
    fn test_optional_null_passes() {
        let contract = conform();
        let converter = Converter::new(&contract);
        let field = Field::new("s", "string").optional();

        let out = converter
            .convert(&field, &TypeRepr::optional(TypeRepr::String), &Value::Null, "param[0]")
            .unwrap();
        assert_eq!(out, Value::Null);
    }

    #[test]
    fn test_required_null_fails() {
        let contract = conform();
        let converter = Converter::new(&contract);
        let field = Field::new("s", "string");

        for repr in [TypeRepr::String, TypeRepr::optional(TypeRepr::String)] {
            let err = converter.convert(&field, &repr, &Value::Null, "param[0]").unwrap_err();
            assert_eq!(mismatch_message(err), "param[0]: required value missing");
        }
    }

    #[test]
    fn test_optional_descriptor_needs_optional_repr() {
        let contract = conform();
        let converter = Converter::new(&contract);
        let field = Field::new("s", "string").optional();

        let err = converter
            .convert(&field, &TypeRepr::String, &json!("present"), "param[0]")
            .unwrap_err();
        assert!(mismatch_message(err).contains("requires an optional representation"));
        assert!(converter.convert(&field, &TypeRepr::Any, &json!("x"), "p").is_ok());
    }

    #[test]
    fn test_array_conversion() {
        let contract = conform();
        let converter = Converter::new(&contract);
        let field = Field::new("nums", "float").array();
        let repr = TypeRepr::array(TypeRepr::Float);

        let out = converter.convert(&field, &repr, &json!([3, 1.5, -2]), "param[0]").unwrap();
        assert_eq!(out, json!([3.0, 1.5, -2.0]));

        let err = converter.convert(&field, &repr, &json!(1.0), "param[0]").unwrap_err();
        assert_eq!(mismatch_message(err), "param[0]: expected array, got number");

        let err = converter
            .convert(&field, &repr, &json!([1, "two"]), "param[0]")
            .unwrap_err();
        assert_eq!(err.path(), "param[0][1]");
    }

    #[test]
    fn test_optional_array_elements() {
        let contract = conform();
        let converter = Converter::new(&contract);
        let field = Field::new("tags", "string").array().optional();
        let repr = TypeRepr::optional(TypeRepr::array(TypeRepr::optional(TypeRepr::String)));

        assert_eq!(converter.convert(&field, &repr, &Value::Null, "p").unwrap(), Value::Null);
        let out = converter.convert(&field, &repr, &json!(["a", null]), "param[0]").unwrap();
        assert_eq!(out, json!(["a", null]));

        // Elements of an optional array need an optional representation too
        let required_elements = TypeRepr::optional(TypeRepr::array(TypeRepr::String));
        let err = converter
            .convert(&field, &required_elements, &json!(["a"]), "param[0]")
            .unwrap_err();
        assert_eq!(err.path(), "param[0][0]");
        assert!(mismatch_message(err).contains("requires an optional representation"));
    }

    #[test]
    fn test_required_array_elements() {
        let contract = conform();
        let converter = Converter::new(&contract);
        let field = Field::new("tags", "string").array();
        let repr = TypeRepr::array(TypeRepr::String);

        let err = converter.convert(&field, &repr, &json!(["a", null]), "p").unwrap_err();
        assert_eq!(mismatch_message(err), "p[1]: required value missing");
    }

    #[test]
    fn test_int_rejects_fraction() {
        let contract = conform();
        let converter = Converter::new(&contract);
        let int_field = Field::new("a", "int");
        let float_field = Field::new("a", "float");

        let err = converter.convert(&int_field, &TypeRepr::Int, &json!(3.2), "param[0]").unwrap_err();
        assert!(mismatch_message(err).contains("not an integer"));

        let out = converter.convert(&int_field, &TypeRepr::Int, &json!(3.0), "param[0]").unwrap();
        assert_eq!(out, json!(3));
        assert!(out.is_i64());

        let out = converter.convert(&float_field, &TypeRepr::Float, &json!(3.2), "param[0]").unwrap();
        assert_eq!(out, json!(3.2));
    }

    #[test]
    fn test_int_range_boundary() {
        let contract = conform();
        let converter = Converter::new(&contract);
        let field = Field::new("a", "int");

        // 2^63 is integral but one past i64::MAX
        let err = converter
            .convert(&field, &TypeRepr::Int, &json!(9_223_372_036_854_775_808.0f64), "param[0]")
            .unwrap_err();
        assert!(mismatch_message(err).contains("not an integer"));

        let out = converter
            .convert(&field, &TypeRepr::Int, &json!(-9_223_372_036_854_775_808.0f64), "param[0]")
            .unwrap();
        assert_eq!(out, json!(i64::MIN));

        let out = converter
            .convert(&field, &TypeRepr::Int, &json!(4_611_686_018_427_387_904.0f64), "param[0]")
            .unwrap();
        assert_eq!(out, json!(4_611_686_018_427_387_904i64));
    }

    #[test]
    fn test_primitive_kind_must_match_repr() {
        let contract = conform();
        let converter = Converter::new(&contract);

        let err = converter
            .convert(&Field::new("a", "int"), &TypeRepr::Float, &json!(1), "param[0]")
            .unwrap_err();
        assert_eq!(mismatch_message(err), "param[0]: int cannot be converted to float");

        let err = converter
            .convert(&Field::new("s", "string"), &TypeRepr::String, &json!(true), "param[0]")
            .unwrap_err();
        assert_eq!(mismatch_message(err), "param[0]: expected string, got bool");
    }

    #[test]
    fn test_enum_membership() {
        let contract = conform();
        let converter = Converter::new(&contract);
        let field = Field::new("operation", "MathOp");

        assert!(converter.convert(&field, &TypeRepr::String, &json!("add"), "p").is_ok());

        let err = converter.convert(&field, &TypeRepr::String, &json!("divide"), "p").unwrap_err();
        assert_eq!(
            mismatch_message(err),
            "p: value 'divide' is not in enum MathOp: [add, multiply]"
        );

        let narrow = TypeRepr::enumeration("MathOp", vec!["add".into()]);
        assert!(converter.convert(&field, &narrow, &json!("multiply"), "p").is_err());
    }

    #[test]
    fn test_struct_with_inheritance() {
        let contract = conform();
        let converter = Converter::new(&contract);
        let field = Field::new("resp", "RepeatResponse");

        let out = converter
            .convert(
                &field,
                &repeat_response_repr(),
                &json!({"status": "ok", "count": 2, "items": ["a", "b"], "extra": 1}),
                "return",
            )
            .unwrap();
        assert_eq!(out, json!({"status": "ok", "count": 2, "items": ["a", "b"]}));

        let err = converter
            .convert(&field, &repeat_response_repr(), &json!({"count": 2, "items": []}), "return")
            .unwrap_err();
        assert_eq!(mismatch_message(err), "return.status: required value missing");
    }

    #[test]
    fn test_struct_repr_must_declare_every_field() {
        let contract = conform();
        let converter = Converter::new(&contract);
        let field = Field::new("resp", "RepeatResponse");
        let repr = TypeRepr::structure("RepeatResponse", vec![("count".into(), TypeRepr::Int)]);

        let err = converter
            .convert(&field, &repr, &json!({"status": "ok", "count": 1, "items": []}), "return")
            .unwrap_err();
        assert!(mismatch_message(err).contains("has no field named"));
    }

    #[test]
    fn test_struct_optional_field_absent() {
        let contract = conform();
        let converter = Converter::new(&contract);
        let field = Field::new("p", "Person");
        let repr = TypeRepr::structure(
            "Person",
            vec![
                ("personId".into(), TypeRepr::String),
                ("firstName".into(), TypeRepr::String),
                ("lastName".into(), TypeRepr::String),
                ("email".into(), TypeRepr::optional(TypeRepr::String)),
            ],
        );

        let out = converter
            .convert(
                &field,
                &repr,
                &json!({"personId": "1", "firstName": "Ann", "lastName": "Lee"}),
                "param[0]",
            )
            .unwrap();
        assert_eq!(out["email"], Value::Null);
        assert_eq!(out.as_object().unwrap().len(), 4);
    }

    fn node_contract() -> Contract {
        Contract::parse(
            br#"[{"type":"struct","name":"Node","fields":[
                {"name":"label","type":"string"},
                {"name":"children","type":"Node","is_array":true}]}]"#,
        )
        .unwrap()
    }

    fn node_repr() -> TypeRepr {
        TypeRepr::structure(
            "Node",
            vec![
                ("label".into(), TypeRepr::String),
                ("children".into(), TypeRepr::array(TypeRepr::Named("Node".into()))),
            ],
        )
    }

    #[test]
    fn test_self_referencing_struct() {
        let contract = node_contract();
        let converter = Converter::new(&contract);
        let field = Field::new("n", "Node");
        let tree = json!({"label": "root", "children": [
            {"label": "a", "children": []},
            {"label": "b", "children": [{"label": "b1", "children": []}]}
        ]});

        let out = converter.convert(&field, &node_repr(), &tree, "param[0]").unwrap();
        assert_eq!(out, tree);

        let broken = json!({"label": "root", "children": [
            {"label": "a", "children": [{"label": 7, "children": []}]}
        ]});
        let err = converter.convert(&field, &node_repr(), &broken, "param[0]").unwrap_err();
        assert_eq!(err.path(), "param[0].children[0].children[0].label");
    }

    #[test]
    fn test_dangling_named_repr() {
        let contract = node_contract();
        let converter = Converter::new(&contract);

        let err = converter
            .convert(
                &Field::new("n", "Node"),
                &TypeRepr::Named("Node".into()),
                &json!({"label": "x", "children": []}),
                "param[0]",
            )
            .unwrap_err();
        assert!(mismatch_message(err).contains("not defined by an enclosing representation"));
    }

    #[test]
    fn test_unknown_type_is_distinct() {
        let contract = conform();
        let converter = Converter::new(&contract);

        let err = converter
            .convert(&Field::new("x", "Ghost"), &TypeRepr::Any, &json!({}), "param[0]")
            .unwrap_err();
        assert_eq!(
            err,
            ConvertError::UnknownType {
                path: "param[0]".into(),
                type_name: "Ghost".into()
            }
        );
    }

    #[test]
    fn test_input_not_mutated() {
        let contract = conform();
        let converter = Converter::new(&contract);
        let input = json!({"status": "ok", "count": 1, "items": [], "extra": true});
        let before = input.clone();

        converter
            .convert(&Field::new("r", "RepeatResponse"), &TypeRepr::Any, &input, "p")
            .unwrap();
        assert_eq!(input, before);
    }
}
