//! Schema elements as they appear in a Barrister IDL JSON document.
//!
//! The document is an ordered array of elements discriminated by their
//! `type` attribute. Each variant carries only the attributes relevant to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One parsed unit of the IDL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaElement {
    Comment(Comment),
    Enum(EnumDef),
    Struct(StructDef),
    Interface(InterfaceDef),
    Meta(Meta),
}

impl SchemaElement {
    /// Name of the declared item, if the element declares one
    pub fn name(&self) -> Option<&str> {
        match self {
            SchemaElement::Enum(e) => Some(&e.name),
            SchemaElement::Struct(s) => Some(&s.name),
            SchemaElement::Interface(i) => Some(&i.name),
            SchemaElement::Comment(_) | SchemaElement::Meta(_) => None,
        }
    }
}

/// Free-standing comment block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub value: String,
}

/// Enum declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub value: String,
    #[serde(default)]
    pub comment: String,
}

/// Struct declaration with an optional parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDef {
    pub name: String,
    /// Parent struct; the IDL writes `""` when there is none
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        serialize_with = "none_as_empty"
    )]
    pub extends: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Interface declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDef {
    pub name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub params: Vec<Field>,
    pub returns: Field,
}

/// Type annotation of a parameter, return value or struct field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub comment: String,
}

impl Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            optional: false,
            is_array: false,
            comment: String::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    /// Descriptor for one element of an array field: the same descriptor
    /// with `is_array` cleared, so an optional array holds optional elements.
    pub fn element(&self) -> Field {
        Field {
            is_array: false,
            ..self.clone()
        }
    }

    pub fn primitive(&self) -> Option<Primitive> {
        Primitive::from_name(&self.type_name)
    }
}

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Int,
    Float,
    Bool,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Primitive::String),
            "int" => Some(Primitive::Int),
            "float" => Some(Primitive::Float),
            "bool" => Some(Primitive::Bool),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
        }
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Generator metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub barrister_version: String,
    /// Milliseconds since the epoch, as written by the IDL translator
    #[serde(default)]
    pub date_generated: i64,
    #[serde(default)]
    pub checksum: String,
}

impl Meta {
    /// Generation time scaled to nanoseconds
    pub fn date_generated_nanos(&self) -> i64 {
        self.date_generated.saturating_mul(1_000_000)
    }

    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.date_generated)
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn none_as_empty<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or_default())
}
