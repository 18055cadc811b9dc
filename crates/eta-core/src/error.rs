use thiserror::Error;

pub type EtaResult<T> = Result<T, EtaError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EtaError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
