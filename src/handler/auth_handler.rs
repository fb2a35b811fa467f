use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Extension};
use tracing::warn;

use crate::dto::auth_dto::{LoginRequest, RefreshRequest, RegistroRequest};
use crate::dto::common::Respuesta;
use crate::dto::validar;
use crate::model::actor::Actor;
use crate::service::auth_service::{AuthService, AuthServiceImpl};
use crate::util::error::HandlerError;
use crate::util::extract::JsonCuerpo;

pub async fn login_handler(
    State(service): State<Arc<AuthServiceImpl>>,
    JsonCuerpo(payload): JsonCuerpo<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let errores = validar(&payload);
    if !errores.is_empty() {
        warn!("Login rejected by validation");
        return Err(HandlerError::validation(errores));
    }
    let email = payload.email.trim().to_lowercase();
    let sesion = service.login(email, payload.password).await?;
    Ok(Respuesta::ok("Inicio de sesión exitoso", sesion))
}

pub async fn refresh_token_handler(
    State(service): State<Arc<AuthServiceImpl>>,
    JsonCuerpo(payload): JsonCuerpo<RefreshRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let errores = validar(&payload);
    if !errores.is_empty() {
        return Err(HandlerError::validation(errores));
    }
    let tokens = service.refresh_token(payload.refresh_token).await?;
    Ok(Respuesta::ok("Token renovado exitosamente", tokens))
}

pub async fn registro_handler(
    State(service): State<Arc<AuthServiceImpl>>,
    Extension(actor): Extension<Actor>,
    JsonCuerpo(payload): JsonCuerpo<RegistroRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let funcionario = service.registrar(payload, Some(&actor)).await?;
    Ok(Respuesta::ok("Funcionario registrado exitosamente", funcionario).creado())
}

pub async fn perfil_handler(
    State(service): State<Arc<AuthServiceImpl>>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, HandlerError> {
    let funcionario = service.perfil(&actor).await?;
    Ok(Respuesta::ok("Perfil obtenido exitosamente", funcionario))
}
