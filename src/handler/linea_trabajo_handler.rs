use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

use crate::dto::common::Respuesta;
use crate::dto::linea_trabajo_dto::LineaTrabajoResponse;
use crate::service::linea_trabajo_service::{LineaTrabajoService, LineaTrabajoServiceImpl};
use crate::util::error::HandlerError;

pub async fn listar_lineas_handler(
    State(service): State<Arc<LineaTrabajoServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let data: Vec<LineaTrabajoResponse> = service.listar().await?.into_iter().map(Into::into).collect();
    let count = data.len();
    Ok(Respuesta::ok("Líneas de trabajo obtenidas exitosamente", data).con_count(count))
}

pub async fn obtener_linea_handler(
    State(service): State<Arc<LineaTrabajoServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let linea = service.obtener(&id).await?;
    Ok(Respuesta::ok("Línea de trabajo obtenida exitosamente", LineaTrabajoResponse::from(linea)))
}
