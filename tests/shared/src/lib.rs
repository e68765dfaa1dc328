//! Shared E2E testing utilities for the Barrister crates
//!
//! Provides the typed conformance implementation used across the
//! integration tests and a harness that serves it over HTTP.

pub mod conform;
pub mod e2e_utils;

pub use conform::{conform_contract, conform_server};
pub use e2e_utils::{RpcTestClient, TestServerManager};
