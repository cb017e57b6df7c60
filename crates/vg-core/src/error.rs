use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {message}")]
    Transport { message: String },
    #[error("server returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("response decode failed: {message}")]
    Decode { message: String },
    #[error("invalid endpoint: {message}")]
    Endpoint { message: String },
}
