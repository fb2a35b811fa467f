use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handler::linea_trabajo_handler::{listar_lineas_handler, obtener_linea_handler};
use crate::service::linea_trabajo_service::LineaTrabajoServiceImpl;

pub fn linea_trabajo_router(service: Arc<LineaTrabajoServiceImpl>) -> Router {
    Router::new()
        .route("/api/lineas-trabajo", get(listar_lineas_handler))
        .route("/api/lineas-trabajo/{id}", get(obtener_linea_handler))
        .with_state(service)
}
