use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("{context} (HTTP {status})")]
    Status { status: u16, context: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GalleryError>;
