//! HTTP front end for the workflow runtime.
//!
//! Every request goes through [`dispatch`], which resolves the method and
//! path against [`api_routes`] before touching the body.

pub mod body;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;

pub use body::{parse_body, ParsedBody, UploadedFile, DEFAULT_BODY_LIMIT};
pub use config::ServerConfig;
pub use error::ApiError;
pub use router::{parse_params, Params, Route, Router};

use actix_web::{http::Method, web, HttpRequest, HttpResponse};
use hireruntime::HireRuntime;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    ListWorkflows,
    CreateWorkflow,
    GetWorkflow,
    DeleteWorkflow,
    ExecuteWorkflow,
    ValidateWorkflow,
    ListNodes,
    Events,
    UploadResume,
    GetResume,
    Ai,
    EventFeed,
}

pub fn api_routes() -> Router<Endpoint> {
    Router::new()
        .route(Method::GET, "/health", Endpoint::Health)
        .route(Method::GET, "/api/workflows", Endpoint::ListWorkflows)
        .route(Method::POST, "/api/workflows", Endpoint::CreateWorkflow)
        .route(Method::GET, "/api/workflows/:id", Endpoint::GetWorkflow)
        .route(Method::DELETE, "/api/workflows/:id", Endpoint::DeleteWorkflow)
        .route(Method::POST, "/api/workflows/:id/execute", Endpoint::ExecuteWorkflow)
        .route(Method::POST, "/api/workflows/:id/validate", Endpoint::ValidateWorkflow)
        .route(Method::GET, "/api/nodes", Endpoint::ListNodes)
        .route(Method::GET, "/api/events", Endpoint::Events)
        .route(Method::POST, "/api/resumes/upload", Endpoint::UploadResume)
        .route(Method::GET, "/api/resumes/:id", Endpoint::GetResume)
        .route(Method::POST, "/api/ai/*", Endpoint::Ai)
        .route(Method::GET, "/api/events/*", Endpoint::EventFeed)
}

/// Application state shared across handlers
pub struct AppState {
    pub runtime: Arc<HireRuntime>,
    routes: Router<Endpoint>,
    body_limit: usize,
}

impl AppState {
    pub fn new(runtime: HireRuntime) -> Self {
        Self {
            runtime: Arc::new(runtime),
            routes: api_routes(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Cap request bodies at `bytes`; larger ones get 413
    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }
}

/// Single entry point for every request
pub async fn dispatch(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    let Some((endpoint, params)) = state.routes.find(req.method(), req.path()) else {
        return Err(ApiError::NotFound(format!("No route for {} {}", req.method(), req.path())).into());
    };
    let endpoint = *endpoint;

    let id = params.get("id").map(String::as_str).unwrap_or_default();
    let limit = state.body_limit;

    let response = match endpoint {
        Endpoint::Health => handlers::health(),
        Endpoint::ListWorkflows => handlers::list_workflows(&state).await,
        Endpoint::CreateWorkflow => {
            let body = parse_body(&req, payload, limit).await?;
            handlers::create_workflow(&state, body).await?
        }
        Endpoint::GetWorkflow => handlers::get_workflow(&state, id).await?,
        Endpoint::DeleteWorkflow => handlers::delete_workflow(&state, id).await?,
        Endpoint::ExecuteWorkflow => {
            let body = parse_body(&req, payload, limit).await?;
            handlers::execute_workflow(&state, id, body).await?
        }
        Endpoint::ValidateWorkflow => handlers::validate_workflow(&state, id).await?,
        Endpoint::ListNodes => handlers::list_node_types(&state),
        Endpoint::Events => handlers::events(&req, payload, &state)?,
        Endpoint::UploadResume => {
            let body = parse_body(&req, payload, limit).await?;
            return Err(handlers::not_implemented("resume upload", &body).into());
        }
        Endpoint::Ai => {
            let body = parse_body(&req, payload, limit).await?;
            return Err(handlers::not_implemented("AI assistance", &body).into());
        }
        Endpoint::GetResume => {
            return Err(handlers::not_implemented("resume lookup", &ParsedBody::default()).into())
        }
        Endpoint::EventFeed => {
            return Err(handlers::not_implemented("event discovery", &ParsedBody::default()).into())
        }
    };

    Ok(response)
}
