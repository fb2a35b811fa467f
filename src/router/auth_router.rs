use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handler::auth_handler::{login_handler, perfil_handler, refresh_token_handler, registro_handler};
use crate::middlewares::auth_middleware::{identificar_actor, requerir_autenticacion, AuthState};
use crate::service::auth_service::AuthServiceImpl;

pub fn auth_router(service: Arc<AuthServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/refresh", post(refresh_token_handler));

    // anonymous callers may register staff; only an admin token may register admins
    let registro = Router::new()
        .route("/api/auth/registro", post(registro_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), identificar_actor));

    let protegido = Router::new()
        .route("/api/auth/perfil", get(perfil_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, requerir_autenticacion));

    public.merge(registro).merge(protegido).with_state(service)
}
