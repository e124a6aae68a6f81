use axum::Router;
use axum::http::Method;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::middleware::from_fn;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(app_state: AppState) -> Router {
    let tool_routes = Router::new()
        .route(
            "/tools/search_assets",
            post(handlers::tools::search_assets_handler),
        )
        .route(
            "/tools/search_resources",
            post(handlers::tools::search_resources_handler),
        )
        .route(
            "/tools/list_projects_without_service_health",
            post(handlers::tools::list_projects_without_service_health_handler),
        )
        .route(
            "/tools/list_active_events",
            post(handlers::tools::list_active_events_handler),
        )
        .route(
            "/tools/list_org_events",
            post(handlers::tools::list_org_events_handler),
        )
        .route(
            "/tools/get_event_details",
            post(handlers::tools::get_event_details_handler),
        )
        .route(
            "/tools/normalize_event",
            post(handlers::tools::normalize_event_handler),
        )
        .route_layer(from_fn(middleware::bind_ambient_token));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(tool_routes)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
        .with_state(app_state)
}

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
