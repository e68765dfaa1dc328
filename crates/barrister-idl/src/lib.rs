//! # Barrister IDL Contract Model
//!
//! Parses a Barrister IDL JSON document into an immutable [`Contract`]:
//! indexed interfaces, functions, structs and enums, with every struct's
//! inherited fields resolved up front.
//!
//! ```rust,no_run
//! use barrister_idl::Contract;
//!
//! # fn main() -> Result<(), barrister_idl::SchemaError> {
//! let bytes = std::fs::read("service.json").unwrap_or_default();
//! let contract = Contract::parse(&bytes)?;
//! contract.check()?;
//! for name in contract.interface_names() {
//!     println!("{name}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod contract;
pub mod error;
pub mod schema;

pub use contract::{Contract, Struct, TypeRef, UnresolvedType};
pub use error::{SchemaError, SchemaResult};
pub use schema::{
    Comment, EnumDef, EnumValue, Field, Function, InterfaceDef, Meta, Primitive, SchemaElement,
    StructDef,
};
