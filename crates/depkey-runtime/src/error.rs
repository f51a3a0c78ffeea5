#![forbid(unsafe_code)]

use depkey_core::ComputedError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("object root must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("cannot set `{path}`: parent is missing or not a container")]
    InvalidPath { path: String },

    #[error("computed property `{key}` has no setter")]
    ReadOnly { key: String },

    #[error("cannot set `{path}` below computed property `{key}`")]
    NestedComputed { key: String, path: String },

    #[error("invalid {name} value: {value}")]
    InvalidConfig { name: &'static str, value: String },

    #[error(transparent)]
    Computed(#[from] ComputedError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
