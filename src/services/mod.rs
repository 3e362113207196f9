pub mod api_client;
pub mod resources;

pub use api_client::{GhlApiClient, RequestOptions};
pub use resources::{GhlResources, Pagination};
