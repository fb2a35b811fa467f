//! Request extractors that report malformed input with the common failure
//! envelope instead of axum's plain-text rejections.

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::util::error::{ErrorCampo, HandlerError, ServiceError};

/// JSON body extractor.
pub struct JsonCuerpo<T>(pub T);

impl<T, S> FromRequest<S> for JsonCuerpo<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(valor)) => Ok(JsonCuerpo(valor)),
            Err(rechazo) => {
                debug!("Rejected request body: {}", rechazo.body_text());
                Err(HandlerError {
                    details: Some(rechazo.body_text()),
                    ..HandlerError::bad_request("Cuerpo JSON inválido")
                })
            }
        }
    }
}

/// Query-string extractor.
pub struct Consulta<T>(pub T);

impl<T, S> FromRequestParts<S> for Consulta<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(valor)) => Ok(Consulta(valor)),
            Err(rechazo) => Err(HandlerError {
                details: Some(rechazo.body_text()),
                ..HandlerError::bad_request("Parámetros de consulta inválidos")
            }),
        }
    }
}

/// Parses a path identifier as a 24-hex ObjectId.
pub fn parsear_id(id: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(id.trim())
        .map_err(|_| ServiceError::Validation(vec![ErrorCampo::new("id", format!("'{}' no es un identificador válido", id))]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_object_id() {
        assert!(parsear_id("65a1b2c3d4e5f60718293a4b").is_ok());
    }

    #[test]
    fn test_parse_invalid_object_id() {
        for id in ["", "123", "zzzzzzzzzzzzzzzzzzzzzzzz", "65a1b2c3d4e5f60718293a4b00"] {
            assert!(matches!(parsear_id(id), Err(ServiceError::Validation(_))), "{}", id);
        }
    }
}
