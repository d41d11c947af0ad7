pub mod http;
pub mod memory;
pub mod traits;
pub mod types;

pub use http::HttpGateway;
pub use memory::InMemoryGateway;
pub use traits::PropertyGateway;
pub use types::{Availability, GatewayConfig, ListingFilter};
