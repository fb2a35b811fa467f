use std::time::Duration;

use bson::{doc, Bson, Document};
use mongodb::{
    options::{ClientOptions, Credential, IndexOptions, ResolverConfig},
    Client, Collection, Database, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info, warn};

use crate::config::mongo_conf::MongoConfig;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

pub const ACTIVIDADES: &str = "actividades";
pub const ASISTENTES: &str = "asistentes";
pub const BENEFICIARIOS: &str = "beneficiarios";
pub const FUNCIONARIOS: &str = "funcionarios";
pub const LINEAS_TRABAJO: &str = "lineas_trabajo";

/// One pooled client shared by every repository.
#[derive(Clone, Debug)]
pub struct MongoContext {
    client: Client,
    db: Database,
}

impl MongoContext {
    pub async fn connect(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let mut client_options =
            ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
        client_options.app_name = Some("RedInclusionBackend".to_string());
        client_options.max_pool_size = Some(config.pool_size);
        client_options.connect_timeout = Some(Duration::from_secs(config.connection_timeout_secs));
        client_options.server_selection_timeout = Some(Duration::from_secs(config.connection_timeout_secs));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            client_options.credential =
                Some(Credential::builder().username(username.clone()).password(password.clone()).build());
        }

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database);
        info!("MongoDB client configured for database '{}'", config.database);
        Ok(MongoContext { client, db })
    }

    pub fn collection<T: Serialize + DeserializeOwned + Unpin + Send + Sync>(&self, nombre: &str) -> Collection<T> {
        self.db.collection::<T>(nombre)
    }

    pub fn documentos(&self, nombre: &str) -> Collection<Document> {
        self.db.collection::<Document>(nombre)
    }

    #[tracing::instrument(skip(self))]
    pub async fn ping(&self) -> RepositoryResult<()> {
        self.client.database("admin").run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    /// Creates the unique indexes backing the duplicate checks.
    ///
    /// An index that cannot be built (usually because existing data already
    /// holds duplicates) is logged and skipped so the service still starts.
    #[tracing::instrument(skip(self))]
    pub async fn asegurar_indices(&self) -> RepositoryResult<()> {
        let texto_presente = |campo: &str| doc! { campo: { "$type": "string" } };
        let texto_no_vacio = |campo: &str| doc! { campo: { "$type": "string", "$gt": "" } };

        let indices: Vec<(&str, &str, Option<Document>)> = vec![
            (BENEFICIARIOS, "numero_documento", None),
            (BENEFICIARIOS, "correo_electronico", Some(texto_presente("correo_electronico"))),
            (ASISTENTES, "cedula", None),
            (ASISTENTES, "email", Some(texto_no_vacio("email"))),
            (FUNCIONARIOS, "email", None),
        ];

        let mut fallidos = 0;
        for (coleccion, campo, parcial) in indices {
            let opciones = IndexOptions::builder()
                .unique(true)
                .name(format!("{}_unico", campo))
                .partial_filter_expression(parcial)
                .build();
            let modelo = IndexModel::builder().keys(doc! { campo: 1 }).options(opciones).build();
            match self.documentos(coleccion).create_index(modelo, None).await {
                Ok(_) => info!("Unique index ensured on {}.{}", coleccion, campo),
                Err(e) => {
                    fallidos += 1;
                    warn!("Could not create unique index on {}.{}: {}", coleccion, campo, e);
                }
            }
        }
        if fallidos > 0 {
            warn!("{} unique index(es) missing; duplicate checks rely on the service layer", fallidos);
        }
        Ok(())
    }
}

/// Reads a numeric aggregation output as a count.
pub(crate) fn entero(valor: Option<&Bson>) -> u64 {
    match valor {
        Some(Bson::Int32(n)) => (*n).max(0) as u64,
        Some(Bson::Int64(n)) => (*n).max(0) as u64,
        Some(Bson::Double(n)) if *n > 0.0 => *n as u64,
        _ => 0,
    }
}

/// Maps a driver error to a repository error after logging it.
pub(crate) fn error_db(operacion: &str, e: mongodb::error::Error) -> RepositoryError {
    error!("{} failed: {}", operacion, e);
    RepositoryError::from(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entero_reads_numeric_variants() {
        assert_eq!(entero(Some(&Bson::Int32(4))), 4);
        assert_eq!(entero(Some(&Bson::Int64(7))), 7);
        assert_eq!(entero(Some(&Bson::Double(2.0))), 2);
        assert_eq!(entero(Some(&Bson::String("3".into()))), 0);
        assert_eq!(entero(None), 0);
    }
}
