use assetlens_application::with_ambient_token;
use assetlens_core::BearerToken;
use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

/// Scopes the request's `Authorization: Bearer` token as the ambient token
/// for everything the handler awaits.
pub async fn bind_ambient_token(request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(BearerToken::from_authorization_header);

    with_ambient_token(token, next.run(request)).await
}
