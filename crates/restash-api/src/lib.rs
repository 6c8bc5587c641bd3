// restash-api: Async HTTP surface for REST-like collection resources.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{CollectionClient, RequestContext};
pub use error::{Error, UNKNOWN_CODE};
pub use transport::{TlsMode, TransportConfig};
