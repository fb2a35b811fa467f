use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handler::beneficiario_handler::{
    actualizar_beneficiario_handler, conteo_por_mes_handler, detalle_beneficiario_handler,
    eliminar_beneficiario_handler, estadisticas_handler, estadisticas_linea_handler, exportar_beneficiarios_handler,
    listar_beneficiarios_handler, poblaciones_vulnerables_handler, registrar_beneficiario_handler,
    verificar_correo_handler, verificar_documento_handler,
};
use crate::middlewares::auth_middleware::{requerir_admin, requerir_autenticacion, AuthState};
use crate::service::beneficiario_service::BeneficiarioServiceImpl;

pub fn beneficiario_router(service: Arc<BeneficiarioServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    let funcionarios = Router::new()
        .route("/beneficiarios/registrar", post(registrar_beneficiario_handler))
        .route("/beneficiarios/listar", get(listar_beneficiarios_handler))
        .route("/beneficiarios/detalle/{id}", get(detalle_beneficiario_handler))
        .route("/beneficiarios/actualizar/{id}", put(actualizar_beneficiario_handler))
        .route("/beneficiarios/{id}", delete(eliminar_beneficiario_handler))
        .route("/beneficiarios/verificar-documento/{numero}", get(verificar_documento_handler))
        .route("/beneficiarios/verificar-correo/{correo}", get(verificar_correo_handler))
        .route("/beneficiarios/estadisticas", get(estadisticas_handler))
        .route("/beneficiarios/estadisticas/linea-trabajo/{id}", get(estadisticas_linea_handler))
        .route("/beneficiarios/exportar-beneficiarios-excel", get(exportar_beneficiarios_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), requerir_autenticacion));

    let admin = Router::new()
        .route("/beneficiarios/estadisticas/por-mes", get(conteo_por_mes_handler))
        .route("/beneficiarios/estadisticas/poblaciones-vulnerables", get(poblaciones_vulnerables_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, requerir_admin));

    funcionarios.merge(admin).with_state(service)
}
