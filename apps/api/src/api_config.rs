use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use assetlens_application::AuditPolicy;
use assetlens_core::AppError;
use tracing_subscriber::EnvFilter;

/// Backend serving asset and health queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryBackend {
    Google,
    Memory,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub query_backend: QueryBackend,
    pub cloud_asset_endpoint: String,
    pub service_health_endpoint: String,
    pub default_scope: String,
    pub audit_policy: AuditPolicy,
    pub event_list_limit: usize,
    pub http_timeout: Duration,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_host = value("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        // Cloud Run injects PORT, which wins over the local API_PORT.
        let api_port = match value("PORT") {
            Some(port) => parse_number("PORT", &port)?,
            None => optional_number(value("API_PORT"), "API_PORT", 8080)?,
        };

        let query_backend = match value("QUERY_BACKEND")
            .unwrap_or_else(|| "google".to_owned())
            .to_ascii_lowercase()
            .as_str()
        {
            "google" => QueryBackend::Google,
            "memory" => QueryBackend::Memory,
            other => {
                return Err(AppError::InvalidInput(format!(
                    "QUERY_BACKEND must be either 'google' or 'memory', got '{other}'"
                )));
            }
        };

        let defaults = AuditPolicy::default();
        let audit_policy = AuditPolicy {
            default_max_projects: positive_number(
                value("AUDIT_DEFAULT_MAX_PROJECTS"),
                "AUDIT_DEFAULT_MAX_PROJECTS",
                defaults.default_max_projects,
            )?,
            organization_max_projects: positive_number(
                value("AUDIT_ORGANIZATION_MAX_PROJECTS"),
                "AUDIT_ORGANIZATION_MAX_PROJECTS",
                defaults.organization_max_projects,
            )?,
            marker_page_size: positive_number(
                value("AUDIT_MARKER_PAGE_SIZE"),
                "AUDIT_MARKER_PAGE_SIZE",
                defaults.marker_page_size,
            )?,
            marker_max_pages: positive_number(
                value("AUDIT_MARKER_MAX_PAGES"),
                "AUDIT_MARKER_MAX_PAGES",
                defaults.marker_max_pages,
            )?,
            max_total_pages: positive_number(
                value("AUDIT_MAX_TOTAL_PAGES"),
                "AUDIT_MAX_TOTAL_PAGES",
                defaults.max_total_pages,
            )?,
        };

        let event_list_limit = positive_number(value("EVENT_LIST_LIMIT"), "EVENT_LIST_LIMIT", 10)?;
        let http_timeout_seconds =
            positive_number(value("HTTP_TIMEOUT_SECONDS"), "HTTP_TIMEOUT_SECONDS", 30)?;

        Ok(Self {
            api_host,
            api_port,
            query_backend,
            cloud_asset_endpoint: value("CLOUD_ASSET_ENDPOINT")
                .unwrap_or_else(|| "https://cloudasset.googleapis.com".to_owned()),
            service_health_endpoint: value("SERVICE_HEALTH_ENDPOINT")
                .unwrap_or_else(|| "https://servicehealth.googleapis.com".to_owned()),
            default_scope: value("DEFAULT_SCOPE")
                .unwrap_or_else(|| "organizations/123456789".to_owned()),
            audit_policy,
            event_list_limit,
            http_timeout: Duration::from_secs(http_timeout_seconds),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::InvalidInput(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_number<T>(name: &str, value: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|error| AppError::InvalidInput(format!("invalid {name} '{value}': {error}")))
}

fn optional_number<T>(value: Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |value| parse_number(name, &value))
}

fn positive_number<T>(value: Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let parsed = optional_number(value, name, default)?;
    if parsed == T::default() {
        return Err(AppError::InvalidInput(format!("{name} must be positive")));
    }

    Ok(parsed)
}
