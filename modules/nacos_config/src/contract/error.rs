//! Error types for config clients, coercion and property resolution

use thiserror::Error;

/// Failure of a single remote fetch
#[derive(Debug, Error)]
pub enum ClientError {
    /// The entry does not exist on the server
    #[error("config not found: {group}/{data_id}")]
    NotFound {
        /// Data ID that was requested
        data_id: String,
        /// Group that was requested
        group: String,
    },

    /// The server rejected the credentials or the access token
    #[error("unauthorized: {reason}")]
    Unauthorized {
        /// Server-provided or local explanation
        reason: String,
    },

    /// The request did not complete in time
    #[error("request to {address} timed out")]
    Timeout {
        /// Server address that timed out
        address: String,
    },

    /// The server answered with an unexpected status
    #[error("unexpected status {status} from {address}: {body}")]
    Status {
        /// Server address that answered
        address: String,
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// Connection-level failure
    #[error("transport error talking to {address}: {reason}")]
    Transport {
        /// Server address that failed
        address: String,
        /// Underlying error message
        reason: String,
    },

    /// A configured server address could not be parsed
    #[error("invalid server address '{address}': {reason}")]
    InvalidAddress {
        /// Address as configured
        address: String,
        /// Parse error details
        reason: String,
    },

    /// Failure reported by a custom client implementation
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClientError {
    /// Whether the failure means the entry is absent rather than unreachable
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failure to turn a raw remote string into the declared type
#[derive(Debug, Error)]
pub enum CoercionError {
    /// A scalar value could not be parsed
    #[error("cannot parse value as {type_name}: {reason}")]
    Parse {
        /// Declared type
        type_name: &'static str,
        /// Parser message
        reason: String,
    },

    /// A structured value could not be decoded into the declared type
    #[error("cannot decode {format} value as {type_name}: {reason}")]
    Decode {
        /// Encoding the raw value was read as
        format: &'static str,
        /// Declared type
        type_name: &'static str,
        /// Decoder message
        reason: String,
    },

    /// The JSON Schema attached to the property is itself invalid
    #[error("invalid JSON Schema: {reason}")]
    InvalidSchema {
        /// Compiler message
        reason: String,
    },

    /// The decoded value violates the property's JSON Schema
    #[error("schema validation failed: {}", .errors.join(", "))]
    SchemaValidation {
        /// One message per violation
        errors: Vec<String>,
    },
}

/// Errors surfaced when declaring a configuration class or accessing one of
/// its properties
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No client is bound to the class and the property has no default
    #[error(
        "no config client bound to '{class}' for '{data_id}'; set NACOS_SERVER and \
         NACOS_NAMESPACE_ID, or configure the class with a client or server address"
    )]
    ConfigurationMissing {
        /// Configuration class name
        class: String,
        /// Property being accessed
        data_id: String,
    },

    /// The remote fetch failed and the property has no default
    #[error("failed to fetch '{data_id}' in group '{group}'")]
    RemoteFetch {
        /// Property being accessed
        data_id: String,
        /// Group of the property
        group: String,
        /// Client failure
        #[source]
        source: ClientError,
    },

    /// The fetched value does not fit the declared type
    #[error("value of '{data_id}' does not match its declared type")]
    TypeCoercion {
        /// Property being accessed
        data_id: String,
        /// Coercion failure
        #[source]
        source: CoercionError,
    },

    /// No property with this name is registered on the class
    #[error("'{class}' has no property named '{name}'")]
    UnknownProperty {
        /// Configuration class name
        class: String,
        /// Requested name
        name: String,
    },

    /// The property exists but was declared with another type
    #[error("property '{name}' is declared as {declared}, not {expected}")]
    PropertyTypeMismatch {
        /// Requested name
        name: String,
        /// Type registered on the class
        declared: &'static str,
        /// Type the caller asked for
        expected: &'static str,
    },

    /// Two properties of one class share a remote key
    #[error("'{class}' declares property '{name}' twice")]
    DuplicateProperty {
        /// Configuration class name
        class: String,
        /// Duplicated name
        name: String,
    },

    /// Connection options could not be turned into a client
    #[error("invalid connection configuration: {reason}")]
    InvalidConnection {
        /// Details
        reason: String,
    },
}
