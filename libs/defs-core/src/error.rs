use defs_errors::RegistryError;
use defs_validate::ValidationResult;
use thiserror::Error;

/// The outcome of a registry-mediated call: either it never reached the
/// handler (bad name, failed validation) or the handler itself returned an
/// error. Kept distinct from `defs_errors::PortalError`/`TransportError`,
/// which are about addressing and wire transport rather than dispatch.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("input failed validation: {0:?}")]
    Validation(ValidationResult),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}
