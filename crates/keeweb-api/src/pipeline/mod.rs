// ============================================================================
// Keeweb API - Request Pipeline
// File: crates/keeweb-api/src/pipeline/mod.rs
// ============================================================================
//! Ordered step execution for a single route.
//!
//! A request moves through `PENDING -> RUNNING(step i) -> RUNNING(step i+1)`
//! until a step responds (`TERMINATED(success)`), a step fails
//! (`TERMINATED(error)`), or the steps run out (success, `204 No Content`).
//!
//! Every step receives a [`Next`] continuation and must return the
//! [`Completion`] obtained by consuming it. `Next` cannot be cloned or built
//! outside this crate and `Completion` has no public constructor, so each
//! step settles its continuation exactly once:
//!
//! ```compile_fail
//! use keeweb_api::pipeline::{Completion, Next};
//!
//! fn settle_twice(next: Next) -> (Completion, Completion) {
//!     (next.proceed(), next.proceed())
//! }
//! ```
//!
//! ```compile_fail
//! use keeweb_api::pipeline::Next;
//!
//! let forged = Next { _token: () };
//! ```

pub mod pattern;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::auth::AuthenticationGate;
use crate::context::RequestContext;
use crate::error::ApiError;

pub use pattern::RoutePattern;

#[async_trait]
pub trait Step: Send + Sync {
    async fn run(&self, ctx: &mut RequestContext, next: Next) -> Completion;

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Continuation handed to a step. Consumed by whichever outcome the step picks.
#[must_use = "a step must settle its continuation"]
pub struct Next {
    _token: (),
}

/// Proof that a step settled its continuation.
#[must_use]
pub struct Completion(Flow);

enum Flow {
    Proceed,
    Fail(ApiError),
    Respond(Response),
}

impl Next {
    pub(crate) fn new() -> Self {
        Self { _token: () }
    }

    /// Advances to the following step.
    pub fn proceed(self) -> Completion {
        Completion(Flow::Proceed)
    }

    /// Aborts the remaining steps with `err`.
    pub fn fail(self, err: impl Into<ApiError>) -> Completion {
        Completion(Flow::Fail(err.into()))
    }

    /// Terminates the request with `response`.
    pub fn respond(self, response: impl IntoResponse) -> Completion {
        Completion(Flow::Respond(response.into_response()))
    }

    /// `proceed` on `Ok`, `fail` on `Err`.
    pub fn check<E: Into<ApiError>>(self, result: Result<(), E>) -> Completion {
        match result {
            Ok(()) => self.proceed(),
            Err(err) => self.fail(err),
        }
    }

    /// `respond` on `Ok`, `fail` on `Err`.
    pub fn finish<R: IntoResponse, E: Into<ApiError>>(self, result: Result<R, E>) -> Completion {
        match result {
            Ok(response) => self.respond(response),
            Err(err) => self.fail(err),
        }
    }
}

/// Optional authentication gate followed by steps in registration order.
///
/// The step list is never mutated after construction; each invocation walks
/// it with its own cursor, so concurrent requests on one route share nothing
/// mutable.
#[derive(Clone, Default)]
pub struct Pipeline {
    gate: Option<AuthenticationGate>,
    steps: Vec<Arc<dyn Step>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The gate runs before step 0; steps may then rely on `ctx.session()`.
    pub fn require_auth(mut self, gate: AuthenticationGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn requires_auth(&self) -> bool {
        self.gate.is_some()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// `Ok(None)` when every step proceeded without responding.
    pub async fn execute(&self, ctx: &mut RequestContext) -> Result<Option<Response>, ApiError> {
        if let Some(gate) = &self.gate {
            gate.admit(ctx).await?;
        }

        for (index, step) in self.steps.iter().enumerate() {
            debug!(index, step = step.name(), "Running pipeline step");
            match step.run(ctx, Next::new()).await.0 {
                Flow::Proceed => continue,
                Flow::Fail(err) => {
                    debug!(index, step = step.name(), "Pipeline step failed: {}", err);
                    return Err(err);
                }
                Flow::Respond(response) => return Ok(Some(response)),
            }
        }

        Ok(None)
    }

    /// Runs the pipeline and maps the outcome to a response, merging any
    /// headers the gate or steps left on the context.
    pub async fn handle(&self, mut ctx: RequestContext) -> Response {
        let mut response = match self.execute(&mut ctx).await {
            Ok(Some(response)) => response,
            Ok(None) => StatusCode::NO_CONTENT.into_response(),
            Err(err) => err.into_response(),
        };
        response.headers_mut().extend(ctx.take_response_headers());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Authenticator, Credentials};
    use axum::http::{header, HeaderMap, HeaderValue, Method, Uri};
    use keeweb_session::Payload;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    enum Action {
        Proceed,
        Fail(&'static str),
        Respond,
    }

    struct Record {
        label: &'static str,
        log: Log,
        action: Action,
    }

    #[async_trait]
    impl Step for Record {
        async fn run(&self, _ctx: &mut RequestContext, next: Next) -> Completion {
            self.log.lock().unwrap().push(self.label);
            match self.action {
                Action::Proceed => next.proceed(),
                Action::Fail(msg) => next.fail(ApiError::InvalidArgument(msg.to_string())),
                Action::Respond => next.respond(StatusCode::ACCEPTED),
            }
        }
    }

    fn record(label: &'static str, log: &Log, action: Action) -> Record {
        Record {
            label,
            log: log.clone(),
            action,
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::new(Method::GET, Uri::from_static("/test"), HeaderMap::new())
    }

    #[tokio::test]
    async fn test_steps_run_in_order() {
        let log = Log::default();
        let pipeline = Pipeline::new()
            .step(record("one", &log, Action::Proceed))
            .step(record("two", &log, Action::Proceed))
            .step(record("three", &log, Action::Respond));

        let response = pipeline.execute(&mut ctx()).await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(*log.lock().unwrap(), vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_error_short_circuits() {
        let log = Log::default();
        let pipeline = Pipeline::new()
            .step(record("one", &log, Action::Proceed))
            .step(record("two", &log, Action::Fail("step two broke")))
            .step(record("three", &log, Action::Respond));

        let err = pipeline.execute(&mut ctx()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(ref msg) if msg == "step two broke"));
        assert_eq!(*log.lock().unwrap(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_response_ends_pipeline() {
        let log = Log::default();
        let pipeline = Pipeline::new()
            .step(record("one", &log, Action::Respond))
            .step(record("two", &log, Action::Proceed));

        let response = pipeline.handle(ctx()).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(*log.lock().unwrap(), vec!["one"]);
    }

    #[tokio::test]
    async fn test_all_proceed_yields_no_content() {
        let log = Log::default();
        let pipeline = Pipeline::new()
            .step(record("one", &log, Action::Proceed))
            .step(record("two", &log, Action::Proceed));

        assert!(pipeline.execute(&mut ctx()).await.unwrap().is_none());
        assert_eq!(pipeline.handle(ctx()).await.status(), StatusCode::NO_CONTENT);
        assert!(Pipeline::new().handle(ctx()).await.status() == StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_each_invocation_starts_at_step_zero() {
        let log = Log::default();
        let pipeline = Arc::new(
            Pipeline::new()
                .step(record("one", &log, Action::Proceed))
                .step(record("two", &log, Action::Respond)),
        );

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = pipeline.clone();
                tokio::spawn(async move { pipeline.handle(ctx()).await.status() })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), StatusCode::ACCEPTED);
        }

        let log = log.lock().unwrap();
        assert_eq!(log.iter().filter(|l| **l == "one").count(), 4);
        assert_eq!(log.iter().filter(|l| **l == "two").count(), 4);
    }

    struct Challenging;

    #[async_trait]
    impl Step for Challenging {
        async fn run(&self, ctx: &mut RequestContext, next: Next) -> Completion {
            ctx.challenge("REST");
            next.fail(ApiError::AuthenticationRequired("Authorization required".into()))
        }
    }

    #[tokio::test]
    async fn test_context_headers_reach_error_response() {
        let response = Pipeline::new().step(Challenging).handle(ctx()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"REST\""
        );
    }

    struct AcceptAll;

    #[async_trait]
    impl Authenticator for AcceptAll {
        async fn check(&self, _credentials: &Credentials) -> bool {
            true
        }

        async fn resolve(&self, credentials: &Credentials) -> Result<Payload, ApiError> {
            Ok(Payload::new().with("user", credentials.password.clone()))
        }
    }

    struct ReadSession {
        seen: Arc<Mutex<Option<String>>>,
    }

    #[async_trait]
    impl Step for ReadSession {
        async fn run(&self, ctx: &mut RequestContext, next: Next) -> Completion {
            let user = ctx.session().and_then(|s| s.get::<String>("user")).cloned();
            *self.seen.lock().unwrap() = user;
            next.respond(StatusCode::OK)
        }
    }

    #[tokio::test]
    async fn test_gate_runs_before_first_step() {
        let seen = Arc::new(Mutex::new(None));
        let gate = AuthenticationGate::new(Arc::new(AcceptAll), "REST");
        let pipeline = Pipeline::new()
            .require_auth(gate)
            .step(ReadSession { seen: seen.clone() });
        assert!(pipeline.requires_auth());

        let creds = Credentials {
            username: String::new(),
            password: "sid-1".into(),
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&creds.to_header_value()).unwrap(),
        );
        let ctx = RequestContext::new(Method::GET, Uri::from_static("/groups"), headers);

        assert_eq!(pipeline.handle(ctx).await.status(), StatusCode::OK);
        assert_eq!(seen.lock().unwrap().as_deref(), Some("sid-1"));
    }

    #[tokio::test]
    async fn test_gate_rejection_skips_steps() {
        let log = Log::default();
        let gate = AuthenticationGate::new(Arc::new(AcceptAll), "REST");
        let pipeline = Pipeline::new()
            .require_auth(gate)
            .step(record("one", &log, Action::Respond));

        let response = pipeline.handle(ctx()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_next_helpers() {
        assert!(matches!(Next::new().check(Ok::<(), ApiError>(())).0, Flow::Proceed));
        assert!(matches!(
            Next::new().check(Err(ApiError::Internal("x".into()))).0,
            Flow::Fail(ApiError::Internal(_))
        ));
        assert!(matches!(
            Next::new().finish(Ok::<_, ApiError>(StatusCode::OK)).0,
            Flow::Respond(_)
        ));
    }
}
