use thiserror::Error;
use vx_mapping::MappingError;

use crate::legacy::LegacyError;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("failed to read the vocabulary: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to fetch the vocabulary: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid legacy vocabulary: {0}")]
    Legacy(#[from] LegacyError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error("the stylesheet is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
