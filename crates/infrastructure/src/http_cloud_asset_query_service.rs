use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use assetlens_application::{PageRequest, ResourceQueryService};
use assetlens_core::{AppResult, Credential};
use assetlens_domain::{Page, ResourceRecord};

use crate::google_api::{get_json, parse_endpoint, resource_url};

/// Cloud Asset Inventory `searchAllResources` client.
pub struct HttpCloudAssetQueryService {
    http_client: reqwest::Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchAllResourcesResponse {
    #[serde(default)]
    results: Vec<ResourceRecord>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl HttpCloudAssetQueryService {
    /// Creates a client for the API base `endpoint`.
    pub fn new(http_client: reqwest::Client, endpoint: &str) -> AppResult<Self> {
        Ok(Self {
            http_client,
            endpoint: parse_endpoint(endpoint)?,
        })
    }

    fn search_url(&self, request: &PageRequest) -> AppResult<Url> {
        let mut url = resource_url(
            &self.endpoint,
            &format!("{}:searchAllResources", request.scope),
        )?;

        {
            let mut query = url.query_pairs_mut();
            if !request.filter.is_empty() {
                query.append_pair("query", request.filter.as_str());
            }
            for asset_type in &request.asset_types {
                query.append_pair("assetTypes", asset_type.as_str());
            }
            query.append_pair("pageSize", &request.page_size.to_string());
            if let Some(page_token) = request.page_token.as_deref() {
                query.append_pair("pageToken", page_token);
            }
            if let Some(read_mask) = request.read_mask.as_deref() {
                query.append_pair("readMask", read_mask);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl ResourceQueryService for HttpCloudAssetQueryService {
    async fn fetch_page(&self, credential: &Credential, request: PageRequest) -> AppResult<Page> {
        let url = self.search_url(&request)?;
        let response: SearchAllResourcesResponse =
            get_json(&self.http_client, credential, url).await?;

        debug!(
            scope = %request.scope,
            results = response.results.len(),
            has_next_page = response.next_page_token.is_some(),
            "asset search page received"
        );

        Ok(Page::new(response.results, response.next_page_token))
    }
}
