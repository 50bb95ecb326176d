// Host-framework context handed to DbAdapter::init.
//
// The adapter never calls back into the framework; the context only carries
// what the adapter consumes: identity for log messages and the logger itself.

use crate::logger::StoreLogger;

/// The service context an adapter is initialized with.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    /// Name of the service this adapter instance is bound to.
    pub service_name: String,
    /// Node identity within the service cluster, when known.
    pub node_id: Option<String>,
    /// Logger the adapter emits lifecycle events through.
    pub logger: StoreLogger,
}

impl ServiceContext {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            node_id: None,
            logger: StoreLogger::default(),
        }
    }

    pub fn with_node_id(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn with_logger(mut self, logger: StoreLogger) -> Self {
        self.logger = logger;
        self
    }
}
