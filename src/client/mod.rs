//! Terminal client for the rating API

pub mod api_client;
pub mod shell;
pub mod token_file;

pub use api_client::ApiClient;
pub use shell::Shell;
pub use token_file::TokenFile;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx answer; `detail` is the server's message verbatim
    #[error("{detail}")]
    Api { status: u16, detail: String },

    #[error("could not reach the server: {0}")]
    Transport(#[from] reqwest::Error),

    /// Terminal or token file I/O
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected locally before any request was sent
    #[error("{0}")]
    Input(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
