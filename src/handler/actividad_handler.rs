use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};
use tracing::info;

use crate::dto::actividad_dto::{
    ActividadResponse, ActualizarActividadRequest, AsistenciasGuardadas, CrearActividadRequest, ExportarQuery,
    GuardarAsistenciaRequest, ListarActividadesQuery,
};
use crate::dto::common::{Exportacion, Respuesta};
use crate::model::actor::Actor;
use crate::service::actividad_service::{ActividadService, ActividadServiceImpl};
use crate::util::error::HandlerError;
use crate::util::extract::{Consulta, JsonCuerpo};

pub async fn crear_actividad_handler(
    State(service): State<Arc<ActividadServiceImpl>>,
    JsonCuerpo(payload): JsonCuerpo<CrearActividadRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let actividad = service.crear(payload).await?;
    Ok(Respuesta::ok("Actividad creada exitosamente", ActividadResponse::from(actividad)).creado())
}

pub async fn listar_actividades_handler(
    State(service): State<Arc<ActividadServiceImpl>>,
    Consulta(query): Consulta<ListarActividadesQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let (actividades, paginacion) = service.listar(query).await?;
    let data: Vec<ActividadResponse> = actividades.into_iter().map(ActividadResponse::from).collect();
    Ok(Respuesta::ok("Actividades obtenidas exitosamente", data).con_paginacion(paginacion))
}

pub async fn obtener_actividad_handler(
    State(service): State<Arc<ActividadServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let actividad = service.obtener(&id).await?;
    Ok(Respuesta::ok("Actividad obtenida exitosamente", ActividadResponse::from(actividad)))
}

pub async fn actualizar_actividad_handler(
    State(service): State<Arc<ActividadServiceImpl>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    JsonCuerpo(payload): JsonCuerpo<ActualizarActividadRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let actividad = service.actualizar(&id, payload, &actor).await?;
    Ok(Respuesta::ok("Actividad actualizada exitosamente", ActividadResponse::from(actividad)))
}

pub async fn eliminar_actividad_handler(
    State(service): State<Arc<ActividadServiceImpl>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.eliminar(&id).await?;
    info!("Activity {} deleted by {}", id, actor.id());
    Ok(Respuesta::ok("Actividad eliminada exitosamente", ()))
}

pub async fn guardar_asistencia_handler(
    State(service): State<Arc<ActividadServiceImpl>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    JsonCuerpo(payload): JsonCuerpo<GuardarAsistenciaRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let total = service.guardar_asistencia(&id, payload, &actor).await?;
    Ok(Respuesta::ok("Asistencia guardada exitosamente", AsistenciasGuardadas { actividad_id: id, total }))
}

pub async fn obtener_asistencia_handler(
    State(service): State<Arc<ActividadServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let asistentes = service.obtener_asistencia(&id).await?;
    let count = asistentes.len();
    Ok(Respuesta::ok("Asistencia obtenida exitosamente", asistentes).con_count(count))
}

/// Roster only, every populated column.
pub async fn exportar_asistencia_handler(
    State(service): State<Arc<ActividadServiceImpl>>,
    Path(id): Path<String>,
) -> Result<Exportacion, HandlerError> {
    Ok(service.exportar_asistencia(&id, None, false).await?.into())
}

/// Summary sheet plus the roster restricted to `?columnas=`.
pub async fn exportar_excel_handler(
    State(service): State<Arc<ActividadServiceImpl>>,
    Path(id): Path<String>,
    Consulta(query): Consulta<ExportarQuery>,
) -> Result<Exportacion, HandlerError> {
    Ok(service.exportar_asistencia(&id, query.columnas.as_deref(), true).await?.into())
}
