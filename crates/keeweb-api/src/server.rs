//! REST route registrar on top of axum.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::Request,
    http::Method,
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter},
    Router,
};
use keeweb_shared::AppError;
use tracing::debug;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::pipeline::{Pipeline, RoutePattern};

struct RouteHandler {
    pattern: RoutePattern,
    pipeline: Pipeline,
}

impl RouteHandler {
    async fn dispatch(&self, request: Request) -> Response {
        let (parts, _body) = request.into_parts();
        let Some(params) = self.pattern.captures(parts.uri.path()) else {
            return ApiError::InvalidArgument("Malformed path parameter.".to_string())
                .into_response();
        };
        self.pipeline
            .handle(RequestContext::from_parts(parts, params))
            .await
    }
}

/// Collects `(method, path) -> pipeline` routes and turns them into an axum router.
pub struct RestServer {
    name: String,
    routes: BTreeMap<String, MethodRouter>,
    registered: HashSet<(Method, String)>,
}

impl RestServer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: BTreeMap::new(),
            registered: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn route(&mut self, method: Method, path: &str, pipeline: Pipeline) -> Result<(), AppError> {
        let pattern = RoutePattern::parse(path)?;
        let filter = method_filter(&method)?;
        if !self.registered.insert((method.clone(), path.to_string())) {
            return Err(AppError::parameter(
                "route",
                format!("{} {} is already registered.", method, path),
            ));
        }

        let handler = Arc::new(RouteHandler { pattern, pipeline });
        let endpoint = move |request: Request| {
            let handler = handler.clone();
            async move { handler.dispatch(request).await }
        };

        let router = self
            .routes
            .remove(path)
            .unwrap_or_else(MethodRouter::new)
            .on(filter, endpoint);
        self.routes.insert(path.to_string(), router);

        debug!("[{}] Route registered: {} {}", self.name, method, path);
        Ok(())
    }

    pub fn get(&mut self, path: &str, pipeline: Pipeline) -> Result<(), AppError> {
        self.route(Method::GET, path, pipeline)
    }

    pub fn post(&mut self, path: &str, pipeline: Pipeline) -> Result<(), AppError> {
        self.route(Method::POST, path, pipeline)
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn into_router(self) -> Router {
        self.routes
            .into_iter()
            .fold(Router::new(), |router, (path, method_router)| {
                router.route(&path, method_router)
            })
    }
}

fn method_filter(method: &Method) -> Result<MethodFilter, AppError> {
    let filter = match *method {
        Method::GET => MethodFilter::GET,
        Method::POST => MethodFilter::POST,
        Method::PUT => MethodFilter::PUT,
        Method::PATCH => MethodFilter::PATCH,
        Method::DELETE => MethodFilter::DELETE,
        _ => {
            return Err(AppError::parameter(
                "method",
                format!("Unsupported method {}.", method),
            ))
        }
    };
    Ok(filter)
}
