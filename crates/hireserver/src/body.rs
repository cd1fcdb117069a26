//! Request body parsing keyed on `Content-Type`.

use crate::error::ApiError;
use actix_multipart::Multipart;
use actix_web::{http::header, web, HttpMessage, HttpRequest};
use futures::StreamExt;
use serde::Serialize;
use serde_json::{Map, Value};

/// Largest request body accepted unless `AppState` is told otherwise
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// An uploaded file from a multipart body
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub field: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub size: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedBody {
    pub fields: Map<String, Value>,
    pub files: Vec<UploadedFile>,
}

impl ParsedBody {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }
}

/// Parse the request body
///
/// JSON objects and url-encoded forms become `fields`; multipart bodies fill
/// both `fields` and `files`. Any other content type yields an empty body.
/// Bodies larger than `limit` bytes are rejected with 413.
pub async fn parse_body(
    req: &HttpRequest,
    payload: web::Payload,
    limit: usize,
) -> Result<ParsedBody, ApiError> {
    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(ApiError::PayloadTooLarge { limit });
    }

    let content_type = req.content_type().to_ascii_lowercase();

    match content_type.as_str() {
        "application/json" => parse_json(&read_bytes(payload, limit).await?),
        "application/x-www-form-urlencoded" => Ok(parse_form(&read_bytes(payload, limit).await?)),
        "multipart/form-data" => parse_multipart(req, payload, limit).await,
        other => {
            tracing::debug!(content_type = other, "Ignoring body with unsupported content type");
            Ok(ParsedBody::default())
        }
    }
}

async fn read_bytes(mut payload: web::Payload, limit: usize) -> Result<web::BytesMut, ApiError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| ApiError::BadRequest(format!("Failed to read body: {}", e)))?;
        if body.len() + chunk.len() > limit {
            return Err(ApiError::PayloadTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn parse_json(bytes: &[u8]) -> Result<ParsedBody, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ParsedBody::default());
    }

    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    match value {
        Value::Object(fields) => Ok(ParsedBody {
            fields,
            files: Vec::new(),
        }),
        Value::Null => Ok(ParsedBody::default()),
        _ => Err(ApiError::BadRequest("JSON body must be an object".to_string())),
    }
}

fn parse_form(bytes: &[u8]) -> ParsedBody {
    let fields = url::form_urlencoded::parse(bytes)
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect();

    ParsedBody {
        fields,
        files: Vec::new(),
    }
}

async fn parse_multipart(
    req: &HttpRequest,
    payload: web::Payload,
    limit: usize,
) -> Result<ParsedBody, ApiError> {
    let mut multipart = Multipart::new(req.headers(), payload);
    let mut body = ParsedBody::default();
    let mut total = 0usize;

    while let Some(item) = multipart.next().await {
        let mut field =
            item.map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?;

        let disposition = field.content_disposition().cloned();
        let name = disposition
            .as_ref()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        let filename = disposition
            .as_ref()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?;
            total += chunk.len();
            if total > limit {
                return Err(ApiError::PayloadTooLarge { limit });
            }
            data.extend_from_slice(&chunk);
        }

        if filename.is_some() {
            body.files.push(UploadedFile {
                field: name,
                filename,
                content_type,
                size: data.len(),
                data,
            });
        } else {
            let value = String::from_utf8_lossy(&data).into_owned();
            body.fields.insert(name, Value::String(value));
        }
    }

    Ok(body)
}
