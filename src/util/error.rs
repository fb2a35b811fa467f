use axum::{response::{IntoResponse, Response}, http::StatusCode};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HandlerErrorKind {
    NotFound,
    Validation,
    Internal,
    Unauthorized,
    Forbidden,
    Conflict,
    BadRequest,
}

impl std::fmt::Display for HandlerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HandlerErrorKind::NotFound => "NotFound",
            HandlerErrorKind::Validation => "Validation",
            HandlerErrorKind::Internal => "Internal",
            HandlerErrorKind::Unauthorized => "Unauthorized",
            HandlerErrorKind::Forbidden => "Forbidden",
            HandlerErrorKind::Conflict => "Conflict",
            HandlerErrorKind::BadRequest => "BadRequest",
        };
        write!(f, "{}", s)
    }
}

impl HandlerErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerErrorKind::NotFound => StatusCode::NOT_FOUND,
            // referential blocks are reported as a bad request, not 409
            HandlerErrorKind::Validation | HandlerErrorKind::BadRequest | HandlerErrorKind::Conflict => StatusCode::BAD_REQUEST,
            HandlerErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            HandlerErrorKind::Forbidden => StatusCode::FORBIDDEN,
            HandlerErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// One violated field of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorCampo {
    pub campo: String,
    pub mensaje: String,
}

impl ErrorCampo {
    pub fn new(campo: impl Into<String>, mensaje: impl Into<String>) -> Self {
        ErrorCampo { campo: campo.into(), mensaje: mensaje.into() }
    }
}

/// Failure envelope returned by every handler.
#[derive(Debug, Serialize)]
pub struct HandlerError {
    pub success: bool,
    pub error: HandlerErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorCampo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HandlerError {
    pub fn new(error: HandlerErrorKind, message: impl Into<String>) -> Self {
        HandlerError { success: false, error, message: message.into(), errors: None, details: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::Forbidden, message)
    }

    pub fn validation(errors: Vec<ErrorCampo>) -> Self {
        HandlerError {
            errors: Some(errors),
            ..Self::new(HandlerErrorKind::Validation, "Error de validación")
        }
    }

    pub fn status(&self) -> StatusCode {
        self.error.status()
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for HandlerError {}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = axum::Json(self);
        (status, body).into_response()
    }
}

/// Business-level failure returned by every service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Invalid Input: {0}")]
    InvalidInput(String),
    /// Field-level failures, reported together.
    #[error("Validation failed: {}", nombres_campos(.0))]
    Validation(Vec<ErrorCampo>),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Internal Error: {0}")]
    InternalError(String),
}

fn nombres_campos(errores: &[ErrorCampo]) -> String {
    errores.iter().map(|e| e.campo.as_str()).collect::<Vec<_>>().join(", ")
}

impl ServiceError {
    /// Single-field validation failure.
    pub fn campo(campo: impl Into<String>, mensaje: impl Into<String>) -> Self {
        ServiceError::Validation(vec![ErrorCampo::new(campo, mensaje)])
    }
}

impl From<crate::repository::repository_error::RepositoryError> for ServiceError {
    fn from(err: crate::repository::repository_error::RepositoryError) -> Self {
        use crate::repository::repository_error::RepositoryError;
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::ValidationError(msg) => ServiceError::InvalidInput(msg),
            // unique index hit: same answer as the in-service duplicate check
            RepositoryError::AlreadyExists(msg) => ServiceError::InvalidInput(msg),
            RepositoryError::DatabaseError(msg) => ServiceError::InternalError(msg),
            RepositoryError::ConnectionError(msg) => ServiceError::InternalError(msg),
            RepositoryError::SerializationError(msg) => ServiceError::InternalError(msg),
            RepositoryError::Driver(e) => ServiceError::InternalError(e.to_string()),
        }
    }
}

impl From<ServiceError> for HandlerError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => HandlerError::new(HandlerErrorKind::NotFound, msg),
            ServiceError::InvalidInput(msg) => HandlerError::new(HandlerErrorKind::Validation, msg),
            ServiceError::Validation(errors) => HandlerError::validation(errors),
            ServiceError::Conflict(msg) => HandlerError::new(HandlerErrorKind::Conflict, msg),
            ServiceError::Unauthorized(msg) => HandlerError::unauthorized(msg),
            ServiceError::Forbidden(msg) => HandlerError::forbidden(msg),
            ServiceError::InternalError(msg) => {
                error!("Internal error reaching handler boundary: {}", msg);
                HandlerError {
                    details: Some(msg),
                    ..HandlerError::new(HandlerErrorKind::Internal, "Error interno del servidor")
                }
            }
        }
    }
}

/// Flattens `validator` output into the `{campo, mensaje}` list, sorted by field.
pub fn errores_de_validacion(errors: &validator::ValidationErrors) -> Vec<ErrorCampo> {
    let mut campos: Vec<ErrorCampo> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(campo, lista)| {
            let campo = if campo.to_string() == "__all__" { String::new() } else { campo.to_string() };
            lista.iter().map(move |e| {
                let mensaje = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| mensaje_por_codigo(&e.code));
                ErrorCampo::new(campo.clone(), mensaje)
            })
        })
        .collect();
    campos.sort_by(|a, b| a.campo.cmp(&b.campo));
    campos
}

fn mensaje_por_codigo(code: &str) -> String {
    match code {
        "required" => "El campo es requerido".to_string(),
        "length" => "Longitud no válida".to_string(),
        "email" => "Correo electrónico no válido".to_string(),
        otro => format!("Valor no válido ({})", otro),
    }
}
