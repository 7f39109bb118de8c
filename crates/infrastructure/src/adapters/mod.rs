//! Infrastructure adapters

mod api_types;
mod http_gateway;
mod system_clock;

pub use http_gateway::HttpCatalogGateway;
pub use system_clock::SystemClock;
