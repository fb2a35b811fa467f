use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::model::actor::Actor;
use crate::util::error::HandlerError;
use crate::util::jwt::{Claims, JwtTokenUtils};

pub struct AuthState {
    pub jwt_utils: Arc<dyn JwtTokenUtils>,
    /// Missing tokens on the activity/attendee surfaces act as `sistema`.
    pub permitir_anonimo: bool,
}

impl AuthState {
    pub fn new(jwt_utils: Arc<dyn JwtTokenUtils>, permitir_anonimo: bool) -> Self {
        AuthState { jwt_utils, permitir_anonimo }
    }

    /// `Ok(None)` when no Authorization header was sent. A header that is
    /// present but not a valid access token is always an error.
    fn claims(&self, req: &Request<Body>) -> Result<Option<Claims>, HandlerError> {
        let Some(valor) = req.headers().get(header::AUTHORIZATION) else {
            return Ok(None);
        };
        let valor = valor
            .to_str()
            .map_err(|_| HandlerError::unauthorized("Cabecera Authorization inválida"))?;
        let token = self
            .jwt_utils
            .extract_token_from_header(valor)
            .map_err(|_| HandlerError::unauthorized("Formato de token inválido"))?;
        let claims = self.jwt_utils.validate_access_token(&token).map_err(|e| {
            debug!("Rejected access token: {}", e);
            HandlerError::unauthorized("Token inválido o expirado")
        })?;
        Ok(Some(claims))
    }
}

async fn autenticar(
    state: &AuthState,
    mut req: Request<Body>,
    next: Next,
    permitir_anonimo: bool,
) -> Result<Response, HandlerError> {
    let actor = match state.claims(&req)? {
        Some(claims) => Actor::Funcionario(claims),
        None if permitir_anonimo => Actor::Sistema,
        None => {
            warn!("Request to {} without token", req.uri().path());
            return Err(HandlerError::unauthorized("Token de autenticación requerido"));
        }
    };
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

/// Bearer token required.
pub async fn requerir_autenticacion(
    State(state): State<Arc<AuthState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    autenticar(&state, req, next, false).await
}

/// Anonymous requests pass as `sistema` when the deployment allows it.
pub async fn autenticacion_segun_politica(
    State(state): State<Arc<AuthState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let permitir = state.permitir_anonimo;
    autenticar(&state, req, next, permitir).await
}

/// Token optional regardless of policy; used where the caller's role only
/// widens what is allowed.
pub async fn identificar_actor(
    State(state): State<Arc<AuthState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    autenticar(&state, req, next, true).await
}

pub async fn requerir_admin(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let claims = state
        .claims(&req)?
        .ok_or_else(|| HandlerError::unauthorized("Token de autenticación requerido"))?;
    if !state.jwt_utils.check_role_permission(&claims.role, "admin") {
        warn!("Staff member {} tried to reach an admin route", claims.sub);
        return Err(HandlerError::forbidden("Se requieren permisos de administrador"));
    }
    req.extensions_mut().insert(Actor::Funcionario(claims));
    Ok(next.run(req).await)
}
