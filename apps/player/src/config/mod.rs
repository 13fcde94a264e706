pub mod api;

pub use api::{resolve_api_base, ClientConfig, TunnelHeader};
