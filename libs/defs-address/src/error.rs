use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AddressError {
    #[error("address '{0}' does not match scheme://authority/path?query#fragment")]
    Malformed(String),

    #[error("failed to parse address: {0}")]
    Parse(String),
}
