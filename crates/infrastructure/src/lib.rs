//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod google_api;
mod http_cloud_asset_query_service;
mod http_service_health_source;
mod in_memory_resource_query_service;
mod in_memory_service_health_source;

pub use http_cloud_asset_query_service::HttpCloudAssetQueryService;
pub use http_service_health_source::HttpServiceHealthSource;
pub use in_memory_resource_query_service::{InMemoryResourceQueryService, MAX_SERVER_PAGE_SIZE};
pub use in_memory_service_health_source::InMemoryServiceHealthSource;
