use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use futures::stream::TryStreamExt;
use mongodb::{
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Collection,
};
use tracing::{debug, info, warn};

use crate::model::beneficiario::{Beneficiario, ConteoMes, PoblacionesVulnerables};
use crate::repository::mongo::{entero, error_db, MongoContext, BENEFICIARIOS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::util::texto::escapar_regex;

/// Text search fields of the paginated listing.
pub const BUSQUEDA_LISTADO: [&str; 3] = ["nombre_completo", "funcionario_nombre", "numero_documento"];
/// Text search fields of the Excel export.
pub const BUSQUEDA_EXPORTACION: [&str; 4] = ["nombre_completo", "numero_documento", "comuna", "barrio"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiltroBeneficiarios {
    pub texto: Option<String>,
    pub campos_texto: &'static [&'static str],
    /// Work-line id as stored on the beneficiary.
    pub linea_trabajo: Option<String>,
    pub desde: Option<DateTime>,
    pub hasta: Option<DateTime>,
}

impl FiltroBeneficiarios {
    pub fn a_documento(&self) -> Document {
        let mut filtro = Document::new();
        if let Some(linea) = &self.linea_trabajo {
            filtro.insert("linea_trabajo", linea.as_str());
        }
        if self.desde.is_some() || self.hasta.is_some() {
            let mut rango = Document::new();
            if let Some(desde) = self.desde {
                rango.insert("$gte", desde);
            }
            if let Some(hasta) = self.hasta {
                rango.insert("$lte", hasta);
            }
            filtro.insert("fecha_registro", rango);
        }
        if let Some(texto) = &self.texto {
            let patron = escapar_regex(texto);
            let alternativas: Vec<Bson> = self
                .campos_texto
                .iter()
                .map(|&campo| Bson::Document(doc! { campo: { "$regex": patron.as_str(), "$options": "i" } }))
                .collect();
            filtro.insert("$or", alternativas);
        }
        filtro
    }
}

fn orden_registro() -> Document {
    doc! { "fecha_registro": -1, "_id": -1 }
}

fn filtro_linea(linea_trabajo: Option<&str>) -> Document {
    match linea_trabajo {
        Some(linea) => doc! { "linea_trabajo": linea },
        None => Document::new(),
    }
}

/// Registrations grouped by `YYYY-MM`, oldest month first.
///
/// Legacy string dates are converted on the fly; values that do not convert
/// are dropped from the grouping.
pub fn pipeline_por_mes(linea_trabajo: Option<&str>) -> Vec<Document> {
    vec![
        doc! { "$match": filtro_linea(linea_trabajo) },
        doc! {
            "$project": {
                "fecha": {
                    "$convert": { "input": "$fecha_registro", "to": "date", "onError": null, "onNull": null }
                }
            }
        },
        doc! { "$match": { "fecha": { "$ne": null } } },
        doc! {
            "$group": {
                "_id": { "$dateToString": { "format": "%Y-%m", "date": "$fecha" } },
                "cantidad": { "$sum": 1 },
            }
        },
        doc! { "$sort": { "_id": 1 } },
    ]
}

pub fn pipeline_poblaciones(linea_trabajo: Option<&str>) -> Vec<Document> {
    let faceta = |condicion: Document| vec![doc! { "$match": condicion }, doc! { "$count": "total" }];
    vec![
        doc! { "$match": filtro_linea(linea_trabajo) },
        doc! {
            "$facet": {
                "discapacidad": faceta(doc! { "tiene_discapacidad": true }),
                "victimas_conflicto": faceta(doc! { "victima_conflicto": true }),
                "jovenes": faceta(doc! { "rango_edad": "18-28" }),
                "adultos_mayores": faceta(doc! { "rango_edad": "60+" }),
            }
        },
    ]
}

/// Reads one `$facet` output; a facet with no matches comes back as `[]`.
pub fn poblaciones_desde_facet(resultado: &Document) -> PoblacionesVulnerables {
    let total = |faceta: &str| -> u64 {
        resultado
            .get_array(faceta)
            .ok()
            .and_then(|lista| lista.first())
            .and_then(Bson::as_document)
            .map(|d| entero(d.get("total")))
            .unwrap_or(0)
    };
    PoblacionesVulnerables {
        discapacidad: total("discapacidad"),
        victimas_conflicto: total("victimas_conflicto"),
        jovenes: total("jovenes"),
        adultos_mayores: total("adultos_mayores"),
    }
}

pub fn conteo_mes_desde(documento: &Document) -> Option<ConteoMes> {
    let mes = documento.get_str("_id").ok()?;
    Some(ConteoMes { mes: mes.to_string(), cantidad: entero(documento.get("cantidad")) })
}

#[async_trait]
pub trait BeneficiarioRepository: Send + Sync {
    async fn crear(&self, beneficiario: Beneficiario) -> RepositoryResult<Beneficiario>;
    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<Beneficiario>;
    async fn listar(&self, filtro: &FiltroBeneficiarios, saltar: u64, limite: i64) -> RepositoryResult<Vec<Beneficiario>>;
    /// Every match, same order as [`BeneficiarioRepository::listar`].
    async fn listar_todos(&self, filtro: &FiltroBeneficiarios) -> RepositoryResult<Vec<Beneficiario>>;
    async fn contar(&self, filtro: &FiltroBeneficiarios) -> RepositoryResult<u64>;
    async fn buscar_por_documento(&self, numero_documento: &str) -> RepositoryResult<Option<Beneficiario>>;
    async fn buscar_por_correo(&self, correo: &str) -> RepositoryResult<Option<Beneficiario>>;
    async fn actualizar(&self, id: ObjectId, cambios: Document) -> RepositoryResult<Beneficiario>;
    async fn eliminar(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn conteo_por_mes(&self, linea_trabajo: Option<&str>) -> RepositoryResult<Vec<ConteoMes>>;
    async fn poblaciones_vulnerables(&self, linea_trabajo: Option<&str>) -> RepositoryResult<PoblacionesVulnerables>;
}

pub struct MongoBeneficiarioRepository {
    collection: Collection<Beneficiario>,
}

impl MongoBeneficiarioRepository {
    pub fn new(contexto: &MongoContext) -> Self {
        MongoBeneficiarioRepository { collection: contexto.collection::<Beneficiario>(BENEFICIARIOS) }
    }

    async fn buscar_uno(&self, filtro: Document) -> RepositoryResult<Option<Beneficiario>> {
        self.collection.find_one(filtro, None).await.map_err(|e| error_db("Find beneficiary", e))
    }

    async fn buscar(&self, filtro: &FiltroBeneficiarios, opciones: FindOptions) -> RepositoryResult<Vec<Beneficiario>> {
        let cursor = self
            .collection
            .find(filtro.a_documento(), opciones)
            .await
            .map_err(|e| error_db("List beneficiaries", e))?;
        let lista: Vec<Beneficiario> = cursor.try_collect().await.map_err(|e| error_db("Read beneficiaries", e))?;
        debug!("Fetched {} beneficiaries", lista.len());
        Ok(lista)
    }

    async fn agregar(&self, pipeline: Vec<Document>) -> RepositoryResult<Vec<Document>> {
        let cursor = self.collection.aggregate(pipeline, None).await.map_err(|e| error_db("Aggregate beneficiaries", e))?;
        cursor.try_collect().await.map_err(|e| error_db("Read aggregation", e))
    }
}

#[async_trait]
impl BeneficiarioRepository for MongoBeneficiarioRepository {
    #[tracing::instrument(skip(self, beneficiario), fields(documento = %beneficiario.perfil.numero_documento))]
    async fn crear(&self, beneficiario: Beneficiario) -> RepositoryResult<Beneficiario> {
        let mut nuevo = beneficiario;
        nuevo.id = Some(ObjectId::new());
        self.collection.insert_one(&nuevo, None).await.map_err(|e| error_db("Insert beneficiary", e))?;
        info!("Beneficiary registered with id {:?}", nuevo.id);
        Ok(nuevo)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<Beneficiario> {
        self.buscar_uno(doc! { "_id": id })
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Beneficiario {} no encontrado", id)))
    }

    #[tracing::instrument(skip(self))]
    async fn listar(&self, filtro: &FiltroBeneficiarios, saltar: u64, limite: i64) -> RepositoryResult<Vec<Beneficiario>> {
        let opciones = FindOptions::builder().sort(orden_registro()).skip(saltar).limit(limite).build();
        self.buscar(filtro, opciones).await
    }

    #[tracing::instrument(skip(self))]
    async fn listar_todos(&self, filtro: &FiltroBeneficiarios) -> RepositoryResult<Vec<Beneficiario>> {
        let opciones = FindOptions::builder().sort(orden_registro()).build();
        self.buscar(filtro, opciones).await
    }

    #[tracing::instrument(skip(self))]
    async fn contar(&self, filtro: &FiltroBeneficiarios) -> RepositoryResult<u64> {
        self.collection
            .count_documents(filtro.a_documento(), None)
            .await
            .map_err(|e| error_db("Count beneficiaries", e))
    }

    #[tracing::instrument(skip(self))]
    async fn buscar_por_documento(&self, numero_documento: &str) -> RepositoryResult<Option<Beneficiario>> {
        self.buscar_uno(doc! { "numero_documento": numero_documento }).await
    }

    #[tracing::instrument(skip(self))]
    async fn buscar_por_correo(&self, correo: &str) -> RepositoryResult<Option<Beneficiario>> {
        self.buscar_uno(doc! { "correo_electronico": correo }).await
    }

    #[tracing::instrument(skip(self, cambios), fields(id = %id))]
    async fn actualizar(&self, id: ObjectId, cambios: Document) -> RepositoryResult<Beneficiario> {
        let opciones = FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build();
        let actualizado = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": cambios }, opciones)
            .await
            .map_err(|e| error_db("Update beneficiary", e))?;
        match actualizado {
            Some(beneficiario) => {
                info!("Beneficiary {} updated", id);
                Ok(beneficiario)
            }
            None => Err(RepositoryError::not_found(format!("Beneficiario {} no encontrado", id))),
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn eliminar(&self, id: ObjectId) -> RepositoryResult<()> {
        let resultado = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| error_db("Delete beneficiary", e))?;
        if resultado.deleted_count == 0 {
            warn!("No beneficiary deleted for id {}", id);
            return Err(RepositoryError::not_found(format!("Beneficiario {} no encontrado", id)));
        }
        info!("Beneficiary {} deleted", id);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn conteo_por_mes(&self, linea_trabajo: Option<&str>) -> RepositoryResult<Vec<ConteoMes>> {
        let documentos = self.agregar(pipeline_por_mes(linea_trabajo)).await?;
        Ok(documentos.iter().filter_map(conteo_mes_desde).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn poblaciones_vulnerables(&self, linea_trabajo: Option<&str>) -> RepositoryResult<PoblacionesVulnerables> {
        let documentos = self.agregar(pipeline_poblaciones(linea_trabajo)).await?;
        Ok(documentos.first().map(poblaciones_desde_facet).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::fecha::{fin_rango, inicio_rango};

    #[test]
    fn test_listing_filter_searches_listing_fields() {
        let filtro = FiltroBeneficiarios {
            texto: Some("pérez".to_string()),
            campos_texto: &BUSQUEDA_LISTADO,
            linea_trabajo: Some("65a1b2c3d4e5f60718293a4b".to_string()),
            ..Default::default()
        };
        let documento = filtro.a_documento();
        assert_eq!(documento.get_array("$or").unwrap().len(), 3);
        assert_eq!(documento.get_str("linea_trabajo").unwrap(), "65a1b2c3d4e5f60718293a4b");
        assert!(!documento.contains_key("fecha_registro"));
    }

    #[test]
    fn test_export_filter_ands_text_with_date_range() {
        let filtro = FiltroBeneficiarios {
            texto: Some("Centro".to_string()),
            campos_texto: &BUSQUEDA_EXPORTACION,
            desde: inicio_rango("2024-03-01"),
            hasta: fin_rango("2024-03-31"),
            ..Default::default()
        };
        let documento = filtro.a_documento();
        let campos: Vec<String> = documento
            .get_array("$or")
            .unwrap()
            .iter()
            .filter_map(|b| b.as_document())
            .filter_map(|d| d.keys().next().cloned())
            .collect();
        assert_eq!(campos, vec!["nombre_completo", "numero_documento", "comuna", "barrio"]);
        let rango = documento.get_document("fecha_registro").unwrap();
        assert!(rango.contains_key("$gte") && rango.contains_key("$lte"));
    }

    #[test]
    fn test_facet_output_with_missing_groups_reads_zero() {
        let resultado = doc! {
            "discapacidad": [ { "total": 3 } ],
            "victimas_conflicto": [],
            "jovenes": [ { "total": 5_i64 } ],
        };
        let poblaciones = poblaciones_desde_facet(&resultado);
        assert_eq!(
            poblaciones,
            PoblacionesVulnerables { discapacidad: 3, victimas_conflicto: 0, jovenes: 5, adultos_mayores: 0 }
        );
    }

    #[test]
    fn test_facet_pipeline_scopes_to_work_line() {
        let pipeline = pipeline_poblaciones(Some("lt"));
        assert_eq!(pipeline[0].get_document("$match").unwrap().get_str("linea_trabajo").unwrap(), "lt");
        let facetas = pipeline[1].get_document("$facet").unwrap();
        assert_eq!(facetas.len(), 4);
        assert!(pipeline_poblaciones(None)[0].get_document("$match").unwrap().is_empty());
    }

    #[test]
    fn test_month_rows_are_read_from_group_output() {
        let fila = doc! { "_id": "2024-03", "cantidad": 4 };
        assert_eq!(conteo_mes_desde(&fila), Some(ConteoMes { mes: "2024-03".to_string(), cantidad: 4 }));
        assert_eq!(conteo_mes_desde(&doc! { "_id": Bson::Null, "cantidad": 1 }), None);
        let pipeline = pipeline_por_mes(None);
        assert!(pipeline.last().unwrap().contains_key("$sort"));
    }
}
