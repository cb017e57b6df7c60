use thiserror::Error;
use vg_core::ApiError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("report save failed: {message}")]
    Save { message: String },
}
