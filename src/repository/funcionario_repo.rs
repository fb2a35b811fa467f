use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Collection;
use tracing::info;

use crate::model::funcionario::Funcionario;
use crate::repository::mongo::{error_db, MongoContext, FUNCIONARIOS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait FuncionarioRepository: Send + Sync {
    async fn crear(&self, funcionario: Funcionario) -> RepositoryResult<Funcionario>;
    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<Funcionario>;
    async fn buscar_por_email(&self, email: &str) -> RepositoryResult<Option<Funcionario>>;
}

pub struct MongoFuncionarioRepository {
    collection: Collection<Funcionario>,
}

impl MongoFuncionarioRepository {
    pub fn new(contexto: &MongoContext) -> Self {
        MongoFuncionarioRepository { collection: contexto.collection::<Funcionario>(FUNCIONARIOS) }
    }
}

#[async_trait]
impl FuncionarioRepository for MongoFuncionarioRepository {
    #[tracing::instrument(skip(self, funcionario), fields(email = %funcionario.email))]
    async fn crear(&self, funcionario: Funcionario) -> RepositoryResult<Funcionario> {
        let mut nuevo = funcionario;
        nuevo.id = Some(ObjectId::new());
        self.collection.insert_one(&nuevo, None).await.map_err(|e| error_db("Insert staff account", e))?;
        info!("Staff account created with id {:?}", nuevo.id);
        Ok(nuevo)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<Funcionario> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| error_db("Fetch staff account", e))?
            .ok_or_else(|| RepositoryError::not_found(format!("Funcionario {} no encontrado", id)))
    }

    #[tracing::instrument(skip(self))]
    async fn buscar_por_email(&self, email: &str) -> RepositoryResult<Option<Funcionario>> {
        self.collection
            .find_one(doc! { "email": email.trim().to_lowercase() }, None)
            .await
            .map_err(|e| error_db("Find staff account by email", e))
    }
}
