mod resource_query;
mod service_health;

pub use resource_query::{PageRequest, ResourceQueryService};
pub use service_health::{EventFeed, EventListRequest, EventPage, ServiceHealthSource};
