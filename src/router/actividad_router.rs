use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::handler::actividad_handler::{
    actualizar_actividad_handler, crear_actividad_handler, eliminar_actividad_handler, exportar_asistencia_handler,
    exportar_excel_handler, guardar_asistencia_handler, listar_actividades_handler, obtener_actividad_handler,
    obtener_asistencia_handler,
};
use crate::middlewares::auth_middleware::{autenticacion_segun_politica, AuthState};
use crate::service::actividad_service::ActividadServiceImpl;

pub fn actividad_router(service: Arc<ActividadServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/api/actividades", get(listar_actividades_handler).post(crear_actividad_handler))
        .route(
            "/api/actividades/{id}",
            get(obtener_actividad_handler)
                .put(actualizar_actividad_handler)
                .delete(eliminar_actividad_handler),
        )
        .route(
            "/api/actividades/{id}/asistentes",
            get(obtener_asistencia_handler).post(guardar_asistencia_handler),
        )
        .route("/api/actividades/{id}/asistentes/exportar", get(exportar_asistencia_handler))
        .route("/api/actividades/{id}/exportar-excel", get(exportar_excel_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, autenticacion_segun_politica))
        .with_state(service)
}
