use thiserror::Error;

use crate::registry::error::NamespaceError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Namespace error: {0}")]
    Namespace(#[from] NamespaceError),

    #[error("Config error: {0}")]
    Config(String),
}

pub type InternalResult<T> = Result<T, Error>;
