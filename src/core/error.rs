use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("No active session")]
    NoActiveSession,
}

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

#[derive(Error, Debug, Clone)]
pub enum StreamError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Stream request failed ({status}): {body}")]
    BadStatus { status: u16, body: String },

    /// Not produced by the bundled reqwest backend, which always exposes a
    /// body stream; for [`ChatBackend`](crate::api::ChatBackend)
    /// implementations over transports where the body can be absent.
    #[error("Response has no body stream")]
    MissingBody,

    #[error("No session selected")]
    MissingSession,

    #[error("Stream read error: {0}")]
    Read(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    File(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
