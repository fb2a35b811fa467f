use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{debug, instrument};

use crate::model::linea_trabajo::{LineaTrabajo, SIN_LINEA_TRABAJO};
use crate::repository::linea_trabajo_repo::LineaTrabajoRepository;
use crate::util::error::ServiceError;
use crate::util::extract::parsear_id;

#[async_trait]
pub trait LineaTrabajoService: Send + Sync {
    async fn listar(&self) -> Result<Vec<LineaTrabajo>, ServiceError>;
    async fn obtener(&self, id: &str) -> Result<LineaTrabajo, ServiceError>;
}

pub struct LineaTrabajoServiceImpl {
    pub linea_repo: Arc<dyn LineaTrabajoRepository>,
}

impl LineaTrabajoServiceImpl {
    pub fn new(linea_repo: Arc<dyn LineaTrabajoRepository>) -> Self {
        Self { linea_repo }
    }
}

#[async_trait]
impl LineaTrabajoService for LineaTrabajoServiceImpl {
    #[instrument(skip(self))]
    async fn listar(&self) -> Result<Vec<LineaTrabajo>, ServiceError> {
        Ok(self.linea_repo.listar().await?)
    }

    #[instrument(skip(self))]
    async fn obtener(&self, id: &str) -> Result<LineaTrabajo, ServiceError> {
        let id = parsear_id(id)?;
        Ok(self.linea_repo.obtener_por_id(id).await?)
    }
}

/// Resolves work-line ids to display names in one query.
///
/// Ids that are not ObjectIds or that point nowhere are absent from the map.
pub async fn nombres_lineas<'a, I>(
    repo: &dyn LineaTrabajoRepository,
    ids: I,
) -> Result<HashMap<String, String>, ServiceError>
where
    I: IntoIterator<Item = &'a str> + Send,
{
    let mut oids: Vec<ObjectId> = ids.into_iter().filter_map(|id| ObjectId::parse_str(id.trim()).ok()).collect();
    oids.sort();
    oids.dedup();
    let lineas = repo.buscar_por_ids(&oids).await?;
    debug!("Resolved {} of {} work lines", lineas.len(), oids.len());
    Ok(lineas.into_iter().map(|l| (l.id.to_hex(), l.nombre)).collect())
}

pub fn nombre_o_defecto(nombres: &HashMap<String, String>, id: &str) -> String {
    nombres.get(id.trim()).cloned().unwrap_or_else(|| SIN_LINEA_TRABAJO.to_string())
}

/// A work-line filter given either by name or by id: the name wins when one matches.
pub async fn resolver_filtro_linea(repo: &dyn LineaTrabajoRepository, valor: &str) -> Result<String, ServiceError> {
    match repo.buscar_por_nombre(valor).await? {
        Some(linea) => Ok(linea.id.to_hex()),
        None => Ok(valor.trim().to_string()),
    }
}
