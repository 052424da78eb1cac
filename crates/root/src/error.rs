#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RootError {
    #[error("root actor is not running")]
    Stopped,
    #[error("unknown spawn form field: {0}")]
    UnknownField(String),
    #[error("invalid value {value:?} for {path}")]
    InvalidValue { path: String, value: String },
}
