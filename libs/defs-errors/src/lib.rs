//! # defs-errors
//!
//! The error taxonomy shared across the workspace, rendered as `thiserror` enums so
//! every crate in the workspace propagates the same vocabulary instead of
//! ad hoc strings. Grounded on a split between typed library
//! errors (`thiserror`) and opaque caller-facing errors (`anyhow`, used only
//! at the handler/application boundary, never inside these crates).

use thiserror::Error;

/// Conflicts and lookups against a `FunctionRegistry`, `ServiceRegistry`, or
/// `PortalRegistry`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("'{0}' is already registered")]
    DuplicateName(String),

    #[error("'{0}' was not found")]
    NotFound(String),

    #[error("scheme '{0}' is already claimed by another portal")]
    SchemeConflict(String),
}

/// Lifecycle and addressing failures raised by a `Portal` implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortalError {
    #[error("address scheme '{actual}' is not handled by this portal (expected one of {expected:?})")]
    SchemeMismatch {
        expected: Vec<&'static str>,
        actual: String,
    },

    #[error("no function or service is registered at address '{0}'")]
    AddressNotFound(String),

    #[error("portal is not running")]
    NotRunning,

    #[error("'{0}' is already registered on this portal")]
    Conflict(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Wire-level failures raised while marshalling a call over a transport.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("operation timed out")]
    Timeout,

    #[error("connection lost: {0}")]
    ConnectionLost(String),

    #[error("failed to upgrade connection: {0}")]
    UpgradeFailed(String),

    #[error("failed to (de)serialize payload: {0}")]
    SerializationError(String),

    #[error("operation was cancelled")]
    Cancelled,
}

/// Diagnostic wrapper recording which validation consumer failed to run and
/// why — not for per-value validation failures (those stay `ValidationIssue`
/// values in `defs-validate`), but for bugs in consumer registration itself
/// (e.g. two consumers double-registered under the same purpose tag).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("consumer '{consumer}' (purpose: {purpose}) failed at path '{path}': {cause}")]
pub struct ConsumerError {
    pub consumer: &'static str,
    pub purpose: &'static str,
    pub path: String,
    pub cause: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_error_wraps_registry_error() {
        let e: PortalError = RegistryError::NotFound("add".into()).into();
        assert!(matches!(e, PortalError::Registry(RegistryError::NotFound(_))));
        assert!(e.to_string().contains("add"));
    }

    #[test]
    fn messages_carry_identifying_context() {
        let e = PortalError::SchemeMismatch {
            expected: vec!["local"],
            actual: "http".into(),
        };
        assert!(e.to_string().contains("http"));
        assert!(e.to_string().contains("local"));
    }
}
