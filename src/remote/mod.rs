pub mod backend;
pub mod http;
pub mod types;

pub use backend::{Backend, RemoteError};
pub use http::{DEFAULT_BASE_URL, HttpBackend};
pub use types::{ChatEntry, Document, Mode, Session};
