use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::{options::FindOptions, Collection};
use tracing::debug;

use crate::model::linea_trabajo::LineaTrabajo;
use crate::repository::mongo::{error_db, MongoContext, LINEAS_TRABAJO};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::util::texto::escapar_regex;

#[async_trait]
pub trait LineaTrabajoRepository: Send + Sync {
    async fn listar(&self) -> RepositoryResult<Vec<LineaTrabajo>>;
    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<LineaTrabajo>;
    async fn buscar_por_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<LineaTrabajo>>;
    /// Case-insensitive exact match on `nombre`.
    async fn buscar_por_nombre(&self, nombre: &str) -> RepositoryResult<Option<LineaTrabajo>>;
}

pub struct MongoLineaTrabajoRepository {
    collection: Collection<LineaTrabajo>,
}

impl MongoLineaTrabajoRepository {
    pub fn new(contexto: &MongoContext) -> Self {
        MongoLineaTrabajoRepository { collection: contexto.collection::<LineaTrabajo>(LINEAS_TRABAJO) }
    }
}

#[async_trait]
impl LineaTrabajoRepository for MongoLineaTrabajoRepository {
    #[tracing::instrument(skip(self))]
    async fn listar(&self) -> RepositoryResult<Vec<LineaTrabajo>> {
        let opciones = FindOptions::builder().sort(doc! { "nombre": 1 }).build();
        let cursor = self.collection.find(None, opciones).await.map_err(|e| error_db("List work lines", e))?;
        let lineas: Vec<LineaTrabajo> = cursor.try_collect().await.map_err(|e| error_db("Read work lines", e))?;
        debug!("Fetched {} work lines", lineas.len());
        Ok(lineas)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<LineaTrabajo> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| error_db("Fetch work line", e))?
            .ok_or_else(|| RepositoryError::not_found(format!("Línea de trabajo {} no encontrada", id)))
    }

    #[tracing::instrument(skip(self))]
    async fn buscar_por_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<LineaTrabajo>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids.to_vec() } }, None)
            .await
            .map_err(|e| error_db("Find work lines", e))?;
        cursor.try_collect().await.map_err(|e| error_db("Read work lines", e))
    }

    #[tracing::instrument(skip(self))]
    async fn buscar_por_nombre(&self, nombre: &str) -> RepositoryResult<Option<LineaTrabajo>> {
        let patron = format!("^{}$", escapar_regex(nombre.trim()));
        self.collection
            .find_one(doc! { "nombre": { "$regex": patron, "$options": "i" } }, None)
            .await
            .map_err(|e| error_db("Find work line by name", e))
    }
}
