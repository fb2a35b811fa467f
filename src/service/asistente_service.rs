use std::sync::Arc;

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use tracing::{info, instrument, warn};

use crate::dto::asistente_dto::{ActualizarAsistenteRequest, CrearAsistenteRequest};
use crate::model::asistente::Asistente;
use crate::repository::actividad_repo::ActividadRepository;
use crate::repository::asistente_repo::AsistenteRepository;
use crate::util::error::{ErrorCampo, ServiceError};
use crate::util::extract::parsear_id;

#[async_trait]
pub trait AsistenteService: Send + Sync {
    async fn crear(&self, req: CrearAsistenteRequest) -> Result<Asistente, ServiceError>;
    async fn listar(&self, tipo: Option<&str>) -> Result<Vec<Asistente>, ServiceError>;
    async fn obtener(&self, id: &str) -> Result<Asistente, ServiceError>;
    async fn actualizar(&self, id: &str, req: ActualizarAsistenteRequest) -> Result<Asistente, ServiceError>;
    async fn eliminar(&self, id: &str) -> Result<(), ServiceError>;
}

pub struct AsistenteServiceImpl {
    pub asistente_repo: Arc<dyn AsistenteRepository>,
    pub actividad_repo: Arc<dyn ActividadRepository>,
}

impl AsistenteServiceImpl {
    pub fn new(asistente_repo: Arc<dyn AsistenteRepository>, actividad_repo: Arc<dyn ActividadRepository>) -> Self {
        Self { asistente_repo, actividad_repo }
    }

    /// Duplicate `cedula` / non-empty `email` among other records.
    async fn duplicados(
        &self,
        cedula: Option<&str>,
        email: Option<&str>,
        excluir: Option<ObjectId>,
    ) -> Result<Vec<ErrorCampo>, ServiceError> {
        let mut errores = Vec::new();
        if let Some(cedula) = cedula {
            if self.asistente_repo.existe_con("cedula", cedula, excluir).await? {
                errores.push(ErrorCampo::new("cedula", "Ya existe un asistente con esta cédula"));
            }
        }
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            if self.asistente_repo.existe_con("email", email, excluir).await? {
                errores.push(ErrorCampo::new("email", "Ya existe un asistente con este correo electrónico"));
            }
        }
        Ok(errores)
    }
}

#[async_trait]
impl AsistenteService for AsistenteServiceImpl {
    #[instrument(skip(self, req))]
    async fn crear(&self, req: CrearAsistenteRequest) -> Result<Asistente, ServiceError> {
        let asistente = req.a_asistente(DateTime::now()).map_err(ServiceError::Validation)?;
        let duplicados = self.duplicados(Some(&asistente.cedula), Some(&asistente.email), None).await?;
        if !duplicados.is_empty() {
            warn!(cedula = %asistente.cedula, "Attendee rejected as duplicate");
            return Err(ServiceError::Validation(duplicados));
        }
        let creado = self.asistente_repo.crear(asistente).await?;
        info!("Attendee {:?} created", creado.id);
        Ok(creado)
    }

    #[instrument(skip(self))]
    async fn listar(&self, tipo: Option<&str>) -> Result<Vec<Asistente>, ServiceError> {
        Ok(self.asistente_repo.listar(tipo).await?)
    }

    #[instrument(skip(self))]
    async fn obtener(&self, id: &str) -> Result<Asistente, ServiceError> {
        let id = parsear_id(id)?;
        Ok(self.asistente_repo.obtener_por_id(id).await?)
    }

    #[instrument(skip(self, req))]
    async fn actualizar(&self, id: &str, req: ActualizarAsistenteRequest) -> Result<Asistente, ServiceError> {
        let id = parsear_id(id)?;
        let req = req.validar().map_err(ServiceError::Validation)?;
        // a missing record is a 404, never a duplicate
        self.asistente_repo.obtener_por_id(id).await?;

        let duplicados = self.duplicados(req.cedula.as_deref(), req.email.as_deref(), Some(id)).await?;
        if !duplicados.is_empty() {
            return Err(ServiceError::Validation(duplicados));
        }

        let mut cambios = bson::to_document(&req).map_err(|e| ServiceError::InternalError(e.to_string()))?;
        cambios.insert("fecha_actualizacion", DateTime::now());
        let actualizado = self.asistente_repo.actualizar(id, cambios).await?;
        info!("Attendee {} updated", id);
        Ok(actualizado)
    }

    #[instrument(skip(self))]
    async fn eliminar(&self, id: &str) -> Result<(), ServiceError> {
        let id = parsear_id(id)?;
        self.asistente_repo.obtener_por_id(id).await?;
        if self.actividad_repo.existe_asistente_referenciado(id).await? {
            warn!("Attendee {} is still referenced by an activity roster", id);
            return Err(ServiceError::Conflict(
                "No se puede eliminar el asistente porque está registrado en una o más actividades".to_string(),
            ));
        }
        self.asistente_repo.eliminar(id).await?;
        info!("Attendee {} deleted", id);
        Ok(())
    }
}
