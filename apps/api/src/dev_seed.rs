use assetlens_application::{EventFeed, SERVICE_HEALTH_API};
use assetlens_domain::{RawEvent, ResourceKind, ResourceRecord};
use assetlens_infrastructure::{InMemoryResourceQueryService, InMemoryServiceHealthSource};
use serde_json::json;
use tracing::info;

const DEV_SEED_PROJECT_NUMBERS: [u32; 6] = [100, 101, 102, 103, 104, 105];
const DEV_SEED_SERVICE_HEALTH_PROJECTS: [u32; 3] = [100, 102, 104];
pub const DEV_SEED_PROJECT_ID: &str = "demo-project";
pub const DEV_SEED_ORGANIZATION_ID: &str = "123456789";

/// Loads demo inventory and events into the in-memory backend.
pub async fn run(resources: &InMemoryResourceQueryService, events: &InMemoryServiceHealthSource) {
    resources.insert(seed_resources()).await;

    let project_parent = format!("projects/{DEV_SEED_PROJECT_ID}/locations/global");
    events
        .publish(
            &project_parent,
            EventFeed::Project,
            RawEvent::Mapping(json!({
                "name": format!("{project_parent}/events/packet-loss"),
                "title": "Packet Loss in us-central1",
                "category": "INCIDENT",
                "state": "ACTIVE",
                "updateTime": "2024-03-01T10:30:00Z",
                "updates": [
                    {
                        "updateTime": "2024-03-01T09:00:00Z",
                        "title": "Investigating",
                        "description": "Elevated packet loss observed.",
                        "workaround": "Retry failed requests."
                    },
                    {
                        "updateTime": "2024-03-01T10:30:00Z",
                        "title": "Mitigation in progress",
                        "description": "Traffic is being drained from the affected zone.",
                        "workaround": "Failover to us-east1"
                    }
                ],
                "impactedProducts": [{"productName": "Compute Engine"}]
            })),
        )
        .await;
    events
        .publish(
            &project_parent,
            EventFeed::Project,
            RawEvent::Mapping(json!({
                "name": format!("{project_parent}/events/sql-maintenance"),
                "title": "Cloud SQL maintenance",
                "category": "INCIDENT",
                "state": "CLOSED",
                "updateTime": "2024-02-10T08:00:00Z",
                "impactedProducts": [{"productName": "Cloud SQL"}]
            })),
        )
        .await;

    let organization_parent = format!("organizations/{DEV_SEED_ORGANIZATION_ID}/locations/global");
    events
        .publish(
            &organization_parent,
            EventFeed::Organization,
            RawEvent::Mapping(json!({
                "name": format!("{organization_parent}/organizationEvents/iam-latency"),
                "title": "IAM policy propagation delays",
                "category": "INCIDENT",
                "state": "ACTIVE",
                "updateTime": "2024-03-02T12:00:00Z",
                "updates": [
                    {
                        "updateTime": "2024-03-02T12:00:00Z",
                        "description": "Policy changes take up to 15 minutes to apply.",
                        "workaround": "Allow extra time before retrying."
                    }
                ],
                "eventImpacts": [{"product": {"productName": "Identity and Access Management"}}]
            })),
        )
        .await;

    info!(
        projects = DEV_SEED_PROJECT_NUMBERS.len(),
        "in-memory backend seeded with demo data"
    );
}

fn seed_resources() -> Vec<ResourceRecord> {
    let projects = DEV_SEED_PROJECT_NUMBERS.iter().map(|number| {
        ResourceRecord::new(
            format!("//cloudresourcemanager.googleapis.com/projects/{number}"),
            ResourceKind::PROJECT_ASSET_TYPE,
        )
        .with_project(format!("projects/{number}"))
        .with_state("ACTIVE")
    });
    let services = DEV_SEED_SERVICE_HEALTH_PROJECTS.iter().map(|number| {
        ResourceRecord::new(
            format!("//serviceusage.googleapis.com/projects/{number}/services/{SERVICE_HEALTH_API}"),
            ResourceKind::SERVICE_ASSET_TYPE,
        )
        .with_project(format!("projects/{number}"))
        .with_state("ENABLED")
    });
    let instances = DEV_SEED_PROJECT_NUMBERS.iter().take(2).map(|number| {
        let mut instance = ResourceRecord::new(
            format!(
                "//compute.googleapis.com/projects/{number}/zones/us-central1-a/instances/web-{number}"
            ),
            ResourceKind::COMPUTE_INSTANCE_ASSET_TYPE,
        )
        .with_project(format!("projects/{number}"))
        .with_state("RUNNING");
        instance.display_name = Some(format!("web-{number}"));
        instance.location = Some("us-central1-a".to_owned());
        instance
    });

    projects.chain(services).chain(instances).collect()
}
