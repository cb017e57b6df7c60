pub mod error;
pub mod http;
pub mod seq;
pub mod session;
pub mod stream;

pub use error::ClientError;
pub use http::HttpApi;
pub use session::{Command, Inbound, Session, SessionConfig};
