use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tracing::warn;
use url::Url;

use assetlens_core::{AppError, AppResult, Credential};

/// Parses an API base URL, forcing a trailing slash so relative joins append.
pub(crate) fn parse_endpoint(value: &str) -> AppResult<Url> {
    let mut endpoint = Url::parse(value.trim()).map_err(|error| {
        AppError::InvalidInput(format!("invalid API endpoint '{value}': {error}"))
    })?;

    if endpoint.cannot_be_a_base() {
        return Err(AppError::InvalidInput(format!(
            "API endpoint '{value}' cannot be used as a base URL"
        )));
    }
    if !endpoint.path().ends_with('/') {
        let path = format!("{}/", endpoint.path());
        endpoint.set_path(&path);
    }

    Ok(endpoint)
}

/// Resolves `v1/<resource>` against the endpoint.
pub(crate) fn resource_url(endpoint: &Url, resource: &str) -> AppResult<Url> {
    endpoint
        .join(&format!("v1/{}", resource.trim_start_matches('/')))
        .map_err(|error| AppError::InvalidInput(format!("invalid resource '{resource}': {error}")))
}

/// Issues an authorized GET and decodes the JSON body.
pub(crate) async fn get_json<T>(
    http_client: &reqwest::Client,
    credential: &Credential,
    url: Url,
) -> AppResult<T>
where
    T: DeserializeOwned,
{
    let path = url.path().to_owned();
    let response = http_client
        .get(url)
        .header(AUTHORIZATION, credential.authorization_header())
        .send()
        .await
        .map_err(|error| AppError::ScanFailed(format!("request to '{path}' failed: {error}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());
        warn!(path = %path, status = status.as_u16(), "google api call rejected");
        return Err(status_error(status, &path, body));
    }

    response
        .json::<T>()
        .await
        .map_err(|error| AppError::ScanFailed(format!("invalid response from '{path}': {error}")))
}

fn status_error(status: StatusCode, path: &str, body: String) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthenticated(format!(
            "google api rejected the credential for '{path}' with status {status}"
        )),
        StatusCode::NOT_FOUND => AppError::NotFound(format!("'{path}' does not exist")),
        _ => AppError::ScanFailed(format!(
            "'{path}' failed with status {status}: {body}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_gains_trailing_slash() {
        let endpoint = parse_endpoint("http://localhost:9000/proxy")
            .unwrap_or_else(|_| unreachable!());
        let url = resource_url(&endpoint, "organizations/1:searchAllResources")
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(
            url.as_str(),
            "http://localhost:9000/proxy/v1/organizations/1:searchAllResources"
        );
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        assert!(matches!(
            parse_endpoint("not a url"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(parse_endpoint("mailto:ops@example.com").is_err());
    }

    #[test]
    fn auth_statuses_map_to_unauthenticated() {
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "/v1/x", String::new()),
            AppError::Unauthenticated(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "/v1/x", String::new()),
            AppError::ScanFailed(_)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "/v1/x", String::new()),
            AppError::NotFound(_)
        ));
    }
}
