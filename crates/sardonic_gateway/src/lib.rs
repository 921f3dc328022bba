pub mod server;
pub mod types;

pub use server::{build_router, GatewayServer};
pub use types::{ClearResponse, ErrorBody, HealthResponse, HistoryResponse};
