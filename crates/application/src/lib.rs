//! Application services and ports.

#![forbid(unsafe_code)]

mod authenticator;
mod enablement_auditor;
mod event_timeline_normalizer;
mod health_event_service;
mod inventory_service;
mod paginated_scanner;
mod query_ports;

#[cfg(test)]
mod test_support;

pub use authenticator::{
    Authenticator, BearerAuthenticator, ambient_token, resolve_credential, with_ambient_token,
};
pub use enablement_auditor::{AuditPolicy, EnablementAuditor};
pub use event_timeline_normalizer::normalize_event;
pub use health_event_service::{ACTIVE_EVENT_FILTER, DEFAULT_EVENT_LOCATION, HealthEventService};
pub use inventory_service::{
    AssetSearchInput, InventoryService, RESOURCE_SEARCH_LIMIT, ResourceSearchInput,
    SERVICE_HEALTH_API,
};
pub use paginated_scanner::{
    PageAllowance, PaginatedScanner, ScanBatch, ScanCursor, ScanFailure, ScanProgress,
};
pub use query_ports::{
    EventFeed, EventListRequest, EventPage, PageRequest, ResourceQueryService,
    ServiceHealthSource,
};
