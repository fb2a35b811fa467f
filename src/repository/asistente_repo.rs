use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::{
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Collection,
};
use tracing::{debug, info, warn};

use crate::model::asistente::Asistente;
use crate::repository::mongo::{error_db, MongoContext, ASISTENTES};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait AsistenteRepository: Send + Sync {
    async fn crear(&self, asistente: Asistente) -> RepositoryResult<Asistente>;
    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<Asistente>;
    async fn listar(&self, tipo: Option<&str>) -> RepositoryResult<Vec<Asistente>>;
    /// Whether another record (other than `excluir`) already has `valor` in `campo`.
    async fn existe_con(&self, campo: &str, valor: &str, excluir: Option<ObjectId>) -> RepositoryResult<bool>;
    /// Applies a `$set` of plain fields and returns the updated record.
    async fn actualizar(&self, id: ObjectId, cambios: Document) -> RepositoryResult<Asistente>;
    async fn eliminar(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoAsistenteRepository {
    collection: Collection<Asistente>,
}

impl MongoAsistenteRepository {
    pub fn new(contexto: &MongoContext) -> Self {
        MongoAsistenteRepository { collection: contexto.collection::<Asistente>(ASISTENTES) }
    }
}

fn filtro_existencia(campo: &str, valor: &str, excluir: Option<ObjectId>) -> Document {
    let mut filtro = doc! { campo: valor };
    if let Some(id) = excluir {
        filtro.insert("_id", doc! { "$ne": id });
    }
    filtro
}

#[async_trait]
impl AsistenteRepository for MongoAsistenteRepository {
    #[tracing::instrument(skip(self, asistente), fields(cedula = %asistente.cedula))]
    async fn crear(&self, asistente: Asistente) -> RepositoryResult<Asistente> {
        let mut nuevo = asistente;
        nuevo.id = Some(ObjectId::new());
        self.collection.insert_one(&nuevo, None).await.map_err(|e| error_db("Insert attendee", e))?;
        info!("Attendee created with id {:?}", nuevo.id);
        Ok(nuevo)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<Asistente> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| error_db("Fetch attendee", e))?
            .ok_or_else(|| RepositoryError::not_found(format!("Asistente {} no encontrado", id)))
    }

    #[tracing::instrument(skip(self))]
    async fn listar(&self, tipo: Option<&str>) -> RepositoryResult<Vec<Asistente>> {
        let filtro = match tipo {
            Some(tipo) => doc! { "tipo": tipo },
            None => Document::new(),
        };
        let opciones = FindOptions::builder().sort(doc! { "nombre": 1, "_id": 1 }).build();
        let cursor = self.collection.find(filtro, opciones).await.map_err(|e| error_db("List attendees", e))?;
        let asistentes: Vec<Asistente> = cursor.try_collect().await.map_err(|e| error_db("Read attendees", e))?;
        debug!("Fetched {} attendees", asistentes.len());
        Ok(asistentes)
    }

    #[tracing::instrument(skip(self))]
    async fn existe_con(&self, campo: &str, valor: &str, excluir: Option<ObjectId>) -> RepositoryResult<bool> {
        let total = self
            .collection
            .count_documents(filtro_existencia(campo, valor, excluir), None)
            .await
            .map_err(|e| error_db("Check attendee uniqueness", e))?;
        Ok(total > 0)
    }

    #[tracing::instrument(skip(self, cambios), fields(id = %id))]
    async fn actualizar(&self, id: ObjectId, cambios: Document) -> RepositoryResult<Asistente> {
        let opciones = FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build();
        let actualizado = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": cambios }, opciones)
            .await
            .map_err(|e| error_db("Update attendee", e))?;
        match actualizado {
            Some(asistente) => {
                info!("Attendee {} updated", id);
                Ok(asistente)
            }
            None => Err(RepositoryError::not_found(format!("Asistente {} no encontrado", id))),
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn eliminar(&self, id: ObjectId) -> RepositoryResult<()> {
        let resultado = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| error_db("Delete attendee", e))?;
        if resultado.deleted_count == 0 {
            warn!("No attendee deleted for id {}", id);
            return Err(RepositoryError::not_found(format!("Asistente {} no encontrado", id)));
        }
        info!("Attendee {} deleted", id);
        Ok(())
    }
}
