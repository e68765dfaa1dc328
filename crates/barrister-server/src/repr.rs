//! Representation types: the Rust-side shape a handler expects for each
//! parameter and return value.

use std::cell::RefCell;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Shape of a value as the handler sees it
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRepr {
    String,
    Int,
    Float,
    Bool,
    Optional(Box<TypeRepr>),
    Array(Box<TypeRepr>),
    Struct {
        name: String,
        fields: Vec<(String, TypeRepr)>,
    },
    /// An empty value list accepts any declared enum value
    Enum {
        name: String,
        values: Vec<String>,
    },
    /// Reference to an enclosing struct representation of this name, used
    /// where a type contains itself
    Named(String),
    /// Untyped; accepts whatever the descriptor allows
    Any,
    /// The trailing error slot of a binding's return signature
    RpcError,
}

impl TypeRepr {
    pub fn optional(inner: TypeRepr) -> Self {
        TypeRepr::Optional(Box::new(inner))
    }

    pub fn array(element: TypeRepr) -> Self {
        TypeRepr::Array(Box::new(element))
    }

    pub fn structure(name: impl Into<String>, fields: Vec<(String, TypeRepr)>) -> Self {
        TypeRepr::Struct {
            name: name.into(),
            fields,
        }
    }

    /// Struct representation whose fields are built by `fields`. A struct
    /// reached again while its own fields are being built becomes
    /// [`TypeRepr::Named`], so self-referencing types terminate.
    pub fn recursive_structure(
        name: &str,
        fields: impl FnOnce() -> Vec<(String, TypeRepr)>,
    ) -> Self {
        let Some(_guard) = BuildGuard::enter(name) else {
            return TypeRepr::Named(name.to_string());
        };
        TypeRepr::Struct {
            name: name.to_string(),
            fields: fields(),
        }
    }

    pub fn enumeration(name: impl Into<String>, values: Vec<String>) -> Self {
        TypeRepr::Enum {
            name: name.into(),
            values,
        }
    }

    /// Field representation of a struct representation
    pub fn field(&self, name: &str) -> Option<&TypeRepr> {
        match self {
            TypeRepr::Struct { fields, .. } => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, repr)| repr),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRepr::String => f.write_str("string"),
            TypeRepr::Int => f.write_str("int"),
            TypeRepr::Float => f.write_str("float"),
            TypeRepr::Bool => f.write_str("bool"),
            TypeRepr::Optional(inner) => write!(f, "optional {inner}"),
            TypeRepr::Array(element) => write!(f, "[]{element}"),
            TypeRepr::Struct { name, .. } => write!(f, "struct {name}"),
            TypeRepr::Enum { name, .. } => write!(f, "enum {name}"),
            TypeRepr::Named(name) => write!(f, "struct {name}"),
            TypeRepr::Any => f.write_str("any"),
            TypeRepr::RpcError => f.write_str("rpc error"),
        }
    }
}

thread_local! {
    static BUILDING: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Marks a struct representation as under construction on this thread
struct BuildGuard;

impl BuildGuard {
    fn enter(name: &str) -> Option<Self> {
        BUILDING.with(|building| {
            let mut building = building.borrow_mut();
            if building.iter().any(|n| n == name) {
                return None;
            }
            building.push(name.to_string());
            Some(BuildGuard)
        })
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        BUILDING.with(|building| {
            building.borrow_mut().pop();
        });
    }
}

/// Types that can appear as handler parameters or results.
///
/// Implement with `#[derive(IdlType)]` from `barrister-derive` for structs
/// and unit enums.
pub trait IdlType: Serialize + DeserializeOwned {
    fn repr() -> TypeRepr;
}

impl IdlType for String {
    fn repr() -> TypeRepr {
        TypeRepr::String
    }
}

macro_rules! impl_idl_type {
    ($repr:expr => $($ty:ty),+) => {
        $(
            impl IdlType for $ty {
                fn repr() -> TypeRepr {
                    $repr
                }
            }
        )+
    };
}

impl_idl_type!(TypeRepr::Int => i64, i32, i16, u32, u16);
impl_idl_type!(TypeRepr::Float => f64, f32);
impl_idl_type!(TypeRepr::Bool => bool);
impl_idl_type!(TypeRepr::Any => Value);

impl<T: IdlType> IdlType for Option<T> {
    fn repr() -> TypeRepr {
        TypeRepr::optional(T::repr())
    }
}

impl<T: IdlType> IdlType for Vec<T> {
    fn repr() -> TypeRepr {
        TypeRepr::array(T::repr())
    }
}
