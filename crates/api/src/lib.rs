pub mod dto;
pub mod error;
pub mod middleware;
pub mod routes;

pub use routes::{build_router, ApiState};
