use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use futures::stream::TryStreamExt;
use mongodb::{
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Collection,
};
use tracing::{debug, info, warn};

use crate::model::actividad::{Actividad, Asistencia, CambiosActividad, EstadoActividad};
use crate::repository::mongo::{error_db, MongoContext, ACTIVIDADES};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::util::texto::escapar_regex;

/// Fields a listing can be sorted by.
pub const CAMPOS_ORDEN: [&str; 8] =
    ["fecha", "tema", "lugar", "dependencia", "estado", "fecha_creacion", "fecha_actualizacion", "_id"];

const CAMPOS_BUSQUEDA: [&str; 4] = ["tema", "lugar", "dependencia", "objetivo"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiltroActividades {
    pub busqueda: Option<String>,
    pub linea_trabajo_id: Option<String>,
    pub funcionario_id: Option<String>,
    pub creado_por: Option<String>,
    pub estado: Option<EstadoActividad>,
    /// Inclusive lower bound on `fecha`
    pub desde: Option<DateTime>,
    /// Inclusive upper bound on `fecha`
    pub hasta: Option<DateTime>,
}

impl FiltroActividades {
    pub fn a_documento(&self) -> Document {
        let mut filtro = Document::new();
        for (campo, valor) in [
            ("linea_trabajo_id", &self.linea_trabajo_id),
            ("funcionario_id", &self.funcionario_id),
            ("creado_por", &self.creado_por),
        ] {
            if let Some(valor) = valor {
                filtro.insert(campo, valor.as_str());
            }
        }
        if let Some(estado) = self.estado {
            filtro.insert("estado", estado.as_str());
        }
        if self.desde.is_some() || self.hasta.is_some() {
            let mut rango = Document::new();
            if let Some(desde) = self.desde {
                rango.insert("$gte", desde);
            }
            if let Some(hasta) = self.hasta {
                rango.insert("$lte", hasta);
            }
            filtro.insert("fecha", rango);
        }
        if let Some(texto) = &self.busqueda {
            let patron = escapar_regex(texto);
            let alternativas: Vec<Bson> = CAMPOS_BUSQUEDA
                .iter()
                .map(|&campo| Bson::Document(doc! { campo: { "$regex": patron.as_str(), "$options": "i" } }))
                .collect();
            filtro.insert("$or", alternativas);
        }
        filtro
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrdenActividades {
    pub campo: &'static str,
    pub ascendente: bool,
}

impl Default for OrdenActividades {
    fn default() -> Self {
        OrdenActividades { campo: "fecha", ascendente: false }
    }
}

impl OrdenActividades {
    /// `None` when the field is not sortable.
    pub fn campo_permitido(campo: &str) -> Option<&'static str> {
        CAMPOS_ORDEN.iter().copied().find(|c| *c == campo)
    }

    pub fn a_documento(&self) -> Document {
        let direccion = if self.ascendente { 1 } else { -1 };
        let mut orden = Document::new();
        orden.insert(self.campo, direccion);
        if self.campo != "_id" {
            orden.insert("_id", direccion);
        }
        orden
    }
}

#[async_trait]
pub trait ActividadRepository: Send + Sync {
    async fn crear(&self, actividad: Actividad) -> RepositoryResult<Actividad>;
    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<Actividad>;
    async fn listar(
        &self,
        filtro: &FiltroActividades,
        orden: OrdenActividades,
        saltar: u64,
        limite: i64,
    ) -> RepositoryResult<Vec<Actividad>>;
    async fn contar(&self, filtro: &FiltroActividades) -> RepositoryResult<u64>;
    async fn actualizar(&self, id: ObjectId, cambios: &CambiosActividad) -> RepositoryResult<Actividad>;
    async fn eliminar(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn reemplazar_asistentes(
        &self,
        id: ObjectId,
        asistentes: &[Asistencia],
        actualizado_por: &str,
        ahora: DateTime,
    ) -> RepositoryResult<()>;
    /// Whether any roster entry points at the standalone attendee.
    async fn existe_asistente_referenciado(&self, asistente_id: ObjectId) -> RepositoryResult<bool>;
}

pub struct MongoActividadRepository {
    collection: Collection<Actividad>,
}

impl MongoActividadRepository {
    pub fn new(contexto: &MongoContext) -> Self {
        MongoActividadRepository { collection: contexto.collection::<Actividad>(ACTIVIDADES) }
    }
}

#[async_trait]
impl ActividadRepository for MongoActividadRepository {
    #[tracing::instrument(skip(self, actividad), fields(tema = %actividad.tema))]
    async fn crear(&self, actividad: Actividad) -> RepositoryResult<Actividad> {
        let mut nueva = actividad;
        nueva.id = Some(ObjectId::new());
        self.collection.insert_one(&nueva, None).await.map_err(|e| error_db("Insert activity", e))?;
        info!("Activity created with id {:?}", nueva.id);
        Ok(nueva)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<Actividad> {
        match self.collection.find_one(doc! { "_id": id }, None).await {
            Ok(Some(actividad)) => Ok(actividad),
            Ok(None) => {
                debug!("Activity {} not found", id);
                Err(RepositoryError::not_found(format!("Actividad {} no encontrada", id)))
            }
            Err(e) => Err(error_db("Fetch activity", e)),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn listar(
        &self,
        filtro: &FiltroActividades,
        orden: OrdenActividades,
        saltar: u64,
        limite: i64,
    ) -> RepositoryResult<Vec<Actividad>> {
        let opciones = FindOptions::builder().sort(orden.a_documento()).skip(saltar).limit(limite).build();
        let cursor = self
            .collection
            .find(filtro.a_documento(), opciones)
            .await
            .map_err(|e| error_db("List activities", e))?;
        let actividades: Vec<Actividad> = cursor.try_collect().await.map_err(|e| error_db("Read activities", e))?;
        debug!("Fetched {} activities", actividades.len());
        Ok(actividades)
    }

    #[tracing::instrument(skip(self))]
    async fn contar(&self, filtro: &FiltroActividades) -> RepositoryResult<u64> {
        self.collection
            .count_documents(filtro.a_documento(), None)
            .await
            .map_err(|e| error_db("Count activities", e))
    }

    #[tracing::instrument(skip(self, cambios), fields(id = %id))]
    async fn actualizar(&self, id: ObjectId, cambios: &CambiosActividad) -> RepositoryResult<Actividad> {
        let set = bson::to_document(cambios)?;
        let opciones = FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build();
        match self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, opciones)
            .await
        {
            Ok(Some(actividad)) => {
                info!("Activity {} updated", id);
                Ok(actividad)
            }
            Ok(None) => Err(RepositoryError::not_found(format!("Actividad {} no encontrada", id))),
            Err(e) => Err(error_db("Update activity", e)),
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn eliminar(&self, id: ObjectId) -> RepositoryResult<()> {
        let resultado = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| error_db("Delete activity", e))?;
        if resultado.deleted_count == 0 {
            warn!("No activity deleted for id {}", id);
            return Err(RepositoryError::not_found(format!("Actividad {} no encontrada", id)));
        }
        info!("Activity {} deleted", id);
        Ok(())
    }

    #[tracing::instrument(skip(self, asistentes), fields(id = %id, total = asistentes.len()))]
    async fn reemplazar_asistentes(
        &self,
        id: ObjectId,
        asistentes: &[Asistencia],
        actualizado_por: &str,
        ahora: DateTime,
    ) -> RepositoryResult<()> {
        let lista = bson::to_bson(asistentes)?;
        let actualizacion = doc! {
            "$set": {
                "asistentes": lista,
                "actualizado_por": actualizado_por,
                "fecha_actualizacion": ahora,
            }
        };
        let resultado = self
            .collection
            .update_one(doc! { "_id": id }, actualizacion, None)
            .await
            .map_err(|e| error_db("Replace roster", e))?;
        if resultado.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Actividad {} no encontrada", id)));
        }
        info!("Roster of activity {} replaced with {} entries", id, asistentes.len());
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(asistente_id = %asistente_id))]
    async fn existe_asistente_referenciado(&self, asistente_id: ObjectId) -> RepositoryResult<bool> {
        let filtro = doc! {
            "asistentes.asistente_id": { "$in": [asistente_id.to_hex(), asistente_id] }
        };
        let total = self
            .collection
            .count_documents(filtro, None)
            .await
            .map_err(|e| error_db("Check roster references", e))?;
        Ok(total > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::fecha::{fin_rango, inicio_rango};

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(FiltroActividades::default().a_documento().is_empty());
    }

    #[test]
    fn test_filter_combines_criteria() {
        let filtro = FiltroActividades {
            linea_trabajo_id: Some("lt1".to_string()),
            estado: Some(EstadoActividad::Completada),
            desde: inicio_rango("2024-01-01"),
            hasta: fin_rango("2024-01-31"),
            busqueda: Some("salud (norte)".to_string()),
            ..Default::default()
        };
        let documento = filtro.a_documento();
        assert_eq!(documento.get_str("linea_trabajo_id").unwrap(), "lt1");
        assert_eq!(documento.get_str("estado").unwrap(), "completada");

        let rango = documento.get_document("fecha").unwrap();
        assert!(rango.contains_key("$gte"));
        let hasta = rango.get_datetime("$lte").unwrap();
        assert_eq!(hasta.to_chrono().to_rfc3339(), "2024-01-31T23:59:59.999+00:00");

        let alternativas = documento.get_array("$or").unwrap();
        assert_eq!(alternativas.len(), 4);
        let primera = alternativas[0].as_document().unwrap().get_document("tema").unwrap();
        assert_eq!(primera.get_str("$regex").unwrap(), r"salud \(norte\)");
        assert_eq!(primera.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_sort_adds_id_tie_break_in_same_direction() {
        let orden = OrdenActividades { campo: "tema", ascendente: true };
        let documento = orden.a_documento();
        let claves: Vec<_> = documento.keys().map(String::as_str).collect();
        assert_eq!(claves, vec!["tema", "_id"]);
        assert_eq!(documento.get_i32("_id").unwrap(), 1);

        let por_defecto = OrdenActividades::default().a_documento();
        assert_eq!(por_defecto.get_i32("fecha").unwrap(), -1);
        assert_eq!(por_defecto.get_i32("_id").unwrap(), -1);
    }

    #[test]
    fn test_sort_by_id_has_single_key() {
        let orden = OrdenActividades { campo: "_id", ascendente: false };
        assert_eq!(orden.a_documento().len(), 1);
    }

    #[test]
    fn test_only_whitelisted_fields_sort() {
        assert_eq!(OrdenActividades::campo_permitido("lugar"), Some("lugar"));
        assert_eq!(OrdenActividades::campo_permitido("asistentes"), None);
    }
}
