use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::handler::asistente_handler::{
    actualizar_asistente_handler, crear_asistente_handler, eliminar_asistente_handler, listar_asistentes_handler,
    obtener_asistente_handler,
};
use crate::middlewares::auth_middleware::{autenticacion_segun_politica, AuthState};
use crate::service::asistente_service::AsistenteServiceImpl;

pub fn asistente_router(service: Arc<AsistenteServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/api/asistentes", get(listar_asistentes_handler).post(crear_asistente_handler))
        .route(
            "/api/asistentes/{id}",
            get(obtener_asistente_handler)
                .put(actualizar_asistente_handler)
                .delete(eliminar_asistente_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, autenticacion_segun_politica))
        .with_state(service)
}
