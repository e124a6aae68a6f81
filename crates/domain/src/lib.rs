//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod health_event;
mod resource;
mod scan;
mod scope;

pub use audit::AuditResult;
pub use health_event::{
    EventField, EventImpact, EventSource, EventUpdate, HealthEvent, Product, RawEvent,
    ServiceHealthEvent, TimelineUpdate,
};
pub use resource::{Page, ResourceKind, ResourceRecord};
pub use scan::{DEFAULT_PAGE_SIZE, ResourceQuery, ScanBudget};
pub use scope::{ProjectId, Scope, ScopeKind, project_reference};
