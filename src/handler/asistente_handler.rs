use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

use crate::dto::asistente_dto::{
    ActualizarAsistenteRequest, AsistenteResponse, CrearAsistenteRequest, ListarAsistentesQuery,
};
use crate::dto::common::Respuesta;
use crate::service::asistente_service::{AsistenteService, AsistenteServiceImpl};
use crate::util::error::HandlerError;
use crate::util::extract::{Consulta, JsonCuerpo};

pub async fn crear_asistente_handler(
    State(service): State<Arc<AsistenteServiceImpl>>,
    JsonCuerpo(payload): JsonCuerpo<CrearAsistenteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let asistente = service.crear(payload).await?;
    Ok(Respuesta::ok("Asistente creado exitosamente", AsistenteResponse::from(asistente)).creado())
}

pub async fn listar_asistentes_handler(
    State(service): State<Arc<AsistenteServiceImpl>>,
    Consulta(query): Consulta<ListarAsistentesQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let tipo = query.tipo.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let data: Vec<AsistenteResponse> =
        service.listar(tipo).await?.into_iter().map(AsistenteResponse::from).collect();
    let count = data.len();
    Ok(Respuesta::ok("Asistentes obtenidos exitosamente", data).con_count(count))
}

pub async fn obtener_asistente_handler(
    State(service): State<Arc<AsistenteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let asistente = service.obtener(&id).await?;
    Ok(Respuesta::ok("Asistente obtenido exitosamente", AsistenteResponse::from(asistente)))
}

pub async fn actualizar_asistente_handler(
    State(service): State<Arc<AsistenteServiceImpl>>,
    Path(id): Path<String>,
    JsonCuerpo(payload): JsonCuerpo<ActualizarAsistenteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let asistente = service.actualizar(&id, payload).await?;
    Ok(Respuesta::ok("Asistente actualizado exitosamente", AsistenteResponse::from(asistente)))
}

pub async fn eliminar_asistente_handler(
    State(service): State<Arc<AsistenteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.eliminar(&id).await?;
    Ok(Respuesta::ok("Asistente eliminado exitosamente", ()))
}
