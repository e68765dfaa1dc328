//! # Barrister Derive Macros
//!
//! `#[derive(IdlType)]` describes a Rust struct or unit enum as a Barrister
//! representation so it can be used as a handler parameter or result.
//!
//! Naming follows serde: `#[serde(rename = "...")]` and
//! `#[serde(rename_all = "...")]` change the wire names of fields and enum
//! values, and `#[serde(skip)]` members are left out. The IDL type name
//! defaults to the Rust identifier; override it with `#[idl(name = "...")]`.
//!
//! ```rust,ignore
//! use barrister_derive::IdlType;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, IdlType)]
//! #[serde(rename_all = "camelCase")]
//! struct Person {
//!     person_id: String,
//!     first_name: String,
//!     email: Option<String>,
//! }
//!
//! #[derive(Serialize, Deserialize, IdlType)]
//! #[serde(rename_all = "lowercase")]
//! enum MathOp {
//!     Add,
//!     Multiply,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod idl_type_derive;
mod utils;


/// Derive `barrister_server::IdlType`
#[proc_macro_derive(IdlType, attributes(idl))]
pub fn derive_idl_type(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    idl_type_derive::derive_idl_type_impl(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
