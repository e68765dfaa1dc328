//! Server Builder
//!
//! Collects a contract and its handlers, then verifies everything in one
//! `build()` call.

use std::sync::Arc;

use barrister_idl::Contract;
use tracing::info;

use crate::error::ServerBuildError;
use crate::handler::Handler;
use crate::server::Server;

/// Builder for [`Server`]
pub struct ServerBuilder {
    contract: Arc<Contract>,

    /// Reject contracts with unresolved type names before registering
    strict_types: bool,

    /// Handlers in registration order
    handlers: Vec<(String, Handler)>,
}

impl ServerBuilder {
    pub fn new(contract: impl Into<Arc<Contract>>) -> Self {
        Self {
            contract: contract.into(),
            strict_types: false,
            handlers: Vec::new(),
        }
    }

    pub fn strict_types(mut self, strict: bool) -> Self {
        self.strict_types = strict;
        self
    }

    /// Add a handler for `interface`; verified at `build()`
    pub fn handler(mut self, interface: impl Into<String>, handler: Handler) -> Self {
        self.handlers.push((interface.into(), handler));
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        if self.strict_types {
            self.contract.check()?;
        }

        let mut server = Server::new(self.contract);
        for (interface, handler) in self.handlers {
            server.register(&interface, handler)?;
        }

        info!(
            interfaces = server.registry().interfaces().count(),
            "Server built"
        );
        Ok(server)
    }
}
