//! Router assembly

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    Router,
};
use keeweb_shared::{config::CorsSettings, AppError};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::handlers::{health, AuthenticationRoutes, DatabaseRoutes, RouteGroup};
use crate::server::RestServer;
use crate::state::AppState;

/// Registers every route group and wraps the result in the CORS and trace layers.
pub fn build_router(state: &AppState) -> Result<Router, AppError> {
    let mut server = RestServer::new(state.config.app.name.clone());

    let groups: [Box<dyn RouteGroup>; 2] = [
        Box::new(AuthenticationRoutes::new(state)),
        Box::new(DatabaseRoutes::new(state)),
    ];
    for group in &groups {
        group.implement(&mut server)?;
        debug!("Route implemented: {}", group.name());
    }
    info!("{} routes registered", server.len());

    let router = server
        .into_router()
        .merge(health::router(state))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors)?);

    Ok(router)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Resource not found.".to_string())
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(format!("{} is not supported on this resource.", method))
}

fn cors_layer(settings: &CorsSettings) -> Result<CorsLayer, AppError> {
    let origin = if settings.allowed_origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let origins = settings
            .allowed_origins
            .iter()
            .map(|origin| {
                if origin.trim() == "*" {
                    return Err(AppError::parameter(
                        "cors.allowed_origins",
                        "Wildcard origin cannot be combined with credentials.",
                    ));
                }
                origin.parse::<HeaderValue>().map_err(|_| {
                    AppError::parameter("cors.allowed_origins", format!("Invalid origin '{}'.", origin))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::ACCEPT,
            HeaderName::from_static("accept-version"),
            header::CONTENT_TYPE,
            HeaderName::from_static("api-version"),
            HeaderName::from_static("x-requested-with"),
            header::AUTHORIZATION,
        ])
        .expose_headers([header::WWW_AUTHENTICATE]))
}
