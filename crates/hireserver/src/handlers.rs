use crate::body::ParsedBody;
use crate::error::ApiError;
use crate::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use actix_ws::Message;
use hirecore::{Payload, Workflow};
use serde_json::{json, Value};
use tracing::{error, info};

pub fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "hireflow"
    }))
}

pub async fn list_workflows(state: &AppState) -> HttpResponse {
    let summaries: Vec<_> = state
        .runtime
        .list_workflows()
        .await
        .iter()
        .map(|w| {
            json!({
                "id": w.id,
                "name": w.name,
                "nodes": w.nodes().len(),
                "edges": w.edges().len(),
            })
        })
        .collect();

    HttpResponse::Ok().json(summaries)
}

/// Store a workflow after structural validation
pub async fn create_workflow(state: &AppState, body: ParsedBody) -> Result<HttpResponse, ApiError> {
    let workflow: Workflow = serde_json::from_value(Value::Object(body.fields))
        .map_err(|e| ApiError::BadRequest(format!("Invalid workflow: {}", e)))?;

    let report = workflow.validate();
    if !report.is_ok() {
        return Ok(HttpResponse::UnprocessableEntity().json(json!({
            "error": format!("Workflow {} failed validation", workflow.id),
            "issues": report.issues,
        })));
    }

    let id = workflow.id.clone();
    let replaced = state.runtime.register_workflow(workflow).await;
    info!(workflow_id = %id, replaced, "Stored workflow");

    Ok(HttpResponse::Created().json(json!({
        "id": id,
        "replaced": replaced,
        "warnings": report.warnings().map(|i| i.message.clone()).collect::<Vec<_>>(),
    })))
}

pub async fn get_workflow(state: &AppState, id: &str) -> Result<HttpResponse, ApiError> {
    match state.runtime.get_workflow(id).await {
        Some(workflow) => Ok(HttpResponse::Ok().json(workflow)),
        None => Err(ApiError::NotFound(format!("Workflow {} not found", id))),
    }
}

pub async fn delete_workflow(state: &AppState, id: &str) -> Result<HttpResponse, ApiError> {
    match state.runtime.remove_workflow(id).await {
        Some(_) => {
            info!(workflow_id = %id, "Deleted workflow");
            Ok(HttpResponse::Ok().json(json!({ "id": id, "deleted": true })))
        }
        None => Err(ApiError::NotFound(format!("Workflow {} not found", id))),
    }
}

/// Run a stored workflow
///
/// The initial payload is the body's `payload` member when present,
/// otherwise the whole body.
pub async fn execute_workflow(
    state: &AppState,
    id: &str,
    mut body: ParsedBody,
) -> Result<HttpResponse, ApiError> {
    let payload = match body.fields.remove("payload") {
        Some(value) => {
            Payload::from_json(value).map_err(|e| ApiError::BadRequest(e.to_string()))?
        }
        None => Payload::from(body.fields),
    };

    info!(workflow_id = %id, "Executing workflow");

    match state.runtime.execute_workflow(id, payload).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        Err(e) => {
            error!(workflow_id = %id, error = %e, "Workflow execution failed");
            Err(e.into())
        }
    }
}

/// Structural report plus executor availability for a stored workflow
pub async fn validate_workflow(state: &AppState, id: &str) -> Result<HttpResponse, ApiError> {
    let workflow = state
        .runtime
        .get_workflow(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Workflow {} not found", id)))?;

    let report = workflow.validate();
    let runnable = state.runtime.preflight(&workflow).map_err(|e| e.to_string());

    Ok(HttpResponse::Ok().json(json!({
        "id": workflow.id,
        "valid": report.is_ok() && runnable.is_ok(),
        "issues": report.issues,
        "preflight": runnable.err(),
    })))
}

pub fn list_node_types(state: &AppState) -> HttpResponse {
    let registry = state.runtime.registry();

    let nodes: Vec<_> = registry
        .list_node_types()
        .iter()
        .map(|node_type| {
            let metadata = registry.get_metadata(node_type).unwrap_or_default();
            json!({
                "type": node_type,
                "description": metadata.description,
                "category": metadata.category,
            })
        })
        .collect();

    HttpResponse::Ok().json(nodes)
}

/// Backend endpoints this deployment does not provide
pub fn not_implemented(endpoint: &str, body: &ParsedBody) -> ApiError {
    ApiError::NotImplemented {
        detail: json!({
            "endpoint": endpoint,
            "message": format!("{} is served by a separate backend", endpoint),
            "received": {
                "fields": body.fields.keys().collect::<Vec<_>>(),
                "files": &body.files,
            },
        }),
    }
}

/// Stream run events to a websocket client
pub fn events(
    req: &HttpRequest,
    stream: web::Payload,
    state: &AppState,
) -> actix_web::Result<HttpResponse> {
    let (res, mut session, mut msg_stream) = actix_ws::handle(req, stream)?;

    info!("WebSocket client connected");

    let mut events = state.runtime.subscribe_events();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Ok(event) => {
                            if let Ok(json) = serde_json::to_string(&event) {
                                if session.text(json).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(_) => break,
                    }
                }

                Some(Ok(msg)) = msg_stream.recv() => {
                    match msg {
                        Message::Ping(bytes) => {
                            if session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }

                else => break,
            }
        }

        info!("WebSocket client disconnected");
        let _ = session.close(None).await;
    });

    Ok(res)
}
