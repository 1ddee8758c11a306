// gestor-api: Async Rust client for paginated REST resources of the Gestor backend

pub mod client;
pub mod error;
pub mod page;
pub mod record;
pub mod resource;
pub mod transport;

pub use client::RestClient;
pub use error::{Error, FieldErrors};
pub use page::{ListQuery, Page};
pub use record::{Record, RecordId};
pub use resource::{Capabilities, ListAllMode, RemoteResource, RestResource};
pub use transport::{TlsMode, TransportConfig};
