//! Read-only views over the database held by the caller's session.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use keeweb_core::{AuthService, Database, DomainError, EntryView, GroupView};
use keeweb_shared::AppError;
use serde::Serialize;

use crate::auth::AuthenticationGate;
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::handlers::RouteGroup;
use crate::pipeline::{Completion, Next, Pipeline, Step};
use crate::response::ApiResponse;
use crate::server::RestServer;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GroupsResponse {
    pub data: Vec<GroupView>,
}

#[derive(Debug, Serialize)]
pub struct EntriesResponse {
    pub group: String,
    pub data: Vec<EntryView>,
}

fn session_database(ctx: &RequestContext) -> Result<Arc<Database>, ApiError> {
    let session = ctx
        .session()
        .ok_or_else(|| ApiError::Internal("No session attached to request".to_string()))?;
    AuthService::database(session)
        .ok_or_else(|| ApiError::Internal("Session holds no database".to_string()))
}

pub struct GetGroups;

#[async_trait]
impl Step for GetGroups {
    async fn run(&self, ctx: &mut RequestContext, next: Next) -> Completion {
        next.finish(session_database(ctx).map(|database| {
            Json(ApiResponse::success(GroupsResponse {
                data: GroupView::from_groups(&database.groups),
            }))
        }))
    }
}

pub struct GetEntries;

impl GetEntries {
    fn entries(ctx: &RequestContext) -> Result<EntriesResponse, ApiError> {
        let gid = ctx
            .param("gid")
            .ok_or_else(|| ApiError::InvalidArgument("No group specified.".to_string()))?;
        let database = session_database(ctx)?;
        let group = database
            .find_group(gid)
            .ok_or_else(|| DomainError::GroupNotFound(gid.to_string()))?;

        Ok(EntriesResponse {
            group: gid.to_string(),
            data: EntryView::from_entries(&group.entries),
        })
    }
}

#[async_trait]
impl Step for GetEntries {
    async fn run(&self, ctx: &mut RequestContext, next: Next) -> Completion {
        next.finish(Self::entries(ctx).map(|body| Json(ApiResponse::success(body))))
    }
}

pub struct DatabaseRoutes {
    gate: AuthenticationGate,
}

impl DatabaseRoutes {
    pub fn new(state: &AppState) -> Self {
        Self {
            gate: state.gate.clone(),
        }
    }
}

impl RouteGroup for DatabaseRoutes {
    fn name(&self) -> &'static str {
        "database"
    }

    fn implement(&self, server: &mut RestServer) -> Result<(), AppError> {
        server.get(
            "/groups",
            Pipeline::new().require_auth(self.gate.clone()).step(GetGroups),
        )?;
        server.get(
            "/entries/{gid}",
            Pipeline::new()
                .require_auth(self.gate.clone())
                .step(GetEntries),
        )?;
        Ok(())
    }
}
