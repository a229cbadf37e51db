//! Completion gateway adapters.

mod http_gateway;
mod mock_gateway;

pub use http_gateway::{HttpCompletionGateway, HttpGatewayConfig};
pub use mock_gateway::{MockCompletionGateway, MockFailure};
