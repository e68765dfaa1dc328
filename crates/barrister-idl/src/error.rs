use thiserror::Error;

/// Schema configuration errors. These mean the contract itself is unusable,
/// as opposed to a single request being malformed.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unable to parse IDL at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{location} references unknown type: {type_name}")]
    UnknownType { location: String, type_name: String },
}

pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
