use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};

use crate::dto::beneficiario_dto::{BeneficiarioRequest, ExportarBeneficiariosQuery, ListarBeneficiariosQuery};
use crate::dto::common::{Exportacion, IdCreado, Respuesta};
use crate::model::actor::Actor;
use crate::service::beneficiario_service::{BeneficiarioService, BeneficiarioServiceImpl};
use crate::util::error::HandlerError;
use crate::util::extract::{Consulta, JsonCuerpo};

pub async fn registrar_beneficiario_handler(
    State(service): State<Arc<BeneficiarioServiceImpl>>,
    Extension(actor): Extension<Actor>,
    JsonCuerpo(payload): JsonCuerpo<BeneficiarioRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let creado = service.registrar(payload, &actor).await?;
    let id = creado.id.map(|id| id.to_hex()).unwrap_or_default();
    Ok(Respuesta::ok("Beneficiario registrado exitosamente", IdCreado { id }).creado())
}

pub async fn listar_beneficiarios_handler(
    State(service): State<Arc<BeneficiarioServiceImpl>>,
    Consulta(query): Consulta<ListarBeneficiariosQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let (data, paginacion) = service.listar(query).await?;
    Ok(Respuesta::ok("Beneficiarios obtenidos exitosamente", data).con_paginacion(paginacion))
}

pub async fn detalle_beneficiario_handler(
    State(service): State<Arc<BeneficiarioServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let beneficiario = service.detalle(&id).await?;
    Ok(Respuesta::ok("Beneficiario obtenido exitosamente", beneficiario))
}

pub async fn actualizar_beneficiario_handler(
    State(service): State<Arc<BeneficiarioServiceImpl>>,
    Path(id): Path<String>,
    JsonCuerpo(payload): JsonCuerpo<BeneficiarioRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let beneficiario = service.actualizar(&id, payload).await?;
    Ok(Respuesta::ok("Beneficiario actualizado exitosamente", beneficiario))
}

pub async fn eliminar_beneficiario_handler(
    State(service): State<Arc<BeneficiarioServiceImpl>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.eliminar(&id, &actor).await?;
    Ok(Respuesta::ok("Beneficiario eliminado exitosamente", ()))
}

pub async fn verificar_documento_handler(
    State(service): State<Arc<BeneficiarioServiceImpl>>,
    Path(numero): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let verificacion = service.verificar_documento(&numero).await?;
    Ok(Respuesta::ok("Verificación completada", verificacion))
}

pub async fn verificar_correo_handler(
    State(service): State<Arc<BeneficiarioServiceImpl>>,
    Path(correo): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let verificacion = service.verificar_correo(&correo).await?;
    Ok(Respuesta::ok("Verificación completada", verificacion))
}

pub async fn estadisticas_handler(
    State(service): State<Arc<BeneficiarioServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let estadisticas = service.estadisticas(None).await?;
    Ok(Respuesta::ok("Estadísticas obtenidas exitosamente", estadisticas))
}

pub async fn estadisticas_linea_handler(
    State(service): State<Arc<BeneficiarioServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let estadisticas = service.estadisticas(Some(&id)).await?;
    Ok(Respuesta::ok("Estadísticas obtenidas exitosamente", estadisticas))
}

pub async fn conteo_por_mes_handler(
    State(service): State<Arc<BeneficiarioServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let meses = service.conteo_por_mes().await?;
    let count = meses.len();
    Ok(Respuesta::ok("Registros por mes obtenidos exitosamente", meses).con_count(count))
}

pub async fn poblaciones_vulnerables_handler(
    State(service): State<Arc<BeneficiarioServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let poblaciones = service.poblaciones_vulnerables().await?;
    Ok(Respuesta::ok("Poblaciones vulnerables obtenidas exitosamente", poblaciones))
}

pub async fn exportar_beneficiarios_handler(
    State(service): State<Arc<BeneficiarioServiceImpl>>,
    Consulta(query): Consulta<ExportarBeneficiariosQuery>,
) -> Result<Exportacion, HandlerError> {
    Ok(service.exportar(query).await?.into())
}
