//! Rewrites date fields still stored as strings into BSON dates.
//!
//! Usage: `migrar_fechas [--simular]`. With `--simular` nothing is written,
//! the tool only reports what it would change.

use bson::{doc, Bson, DateTime, Document};
use dotenv::dotenv;
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info, warn};

use redinclusion_backend::config::MongoConfig;
use redinclusion_backend::repository::mongo::{MongoContext, ACTIVIDADES, ASISTENTES, BENEFICIARIOS, FUNCIONARIOS};
use redinclusion_backend::util::fecha::parsear_fecha;
use redinclusion_backend::util::logger::Logger;

const CAMPOS_FECHA: [(&str, &[&str]); 4] = [
    (ACTIVIDADES, &["fecha", "fecha_creacion", "fecha_actualizacion"]),
    (BENEFICIARIOS, &["fecha_registro"]),
    (ASISTENTES, &["fecha_creacion", "fecha_actualizacion"]),
    (FUNCIONARIOS, &["fecha_registro"]),
];

#[derive(Debug, Default, PartialEq, Eq)]
struct Resultado {
    convertidos: u64,
    invalidos: u64,
}

/// The stored string as a BSON date, if it parses.
fn convertir(valor: &Bson) -> Option<DateTime> {
    match valor {
        Bson::String(texto) => parsear_fecha(texto).map(DateTime::from_chrono),
        _ => None,
    }
}

async fn migrar_campo(
    contexto: &MongoContext,
    coleccion: &str,
    campo: &str,
    simular: bool,
) -> Result<Resultado, mongodb::error::Error> {
    let documentos = contexto.documentos(coleccion);
    let opciones = FindOptions::builder().projection(doc! { campo: 1 }).build();
    let pendientes: Vec<Document> = documentos
        .find(doc! { campo: { "$type": "string" } }, opciones)
        .await?
        .try_collect()
        .await?;

    let mut resultado = Resultado::default();
    for documento in pendientes {
        let Some(id) = documento.get("_id").cloned() else { continue };
        let valor = documento.get(campo).cloned().unwrap_or(Bson::Null);
        match convertir(&valor) {
            Some(fecha) => {
                if !simular {
                    documentos.update_one(doc! { "_id": id }, doc! { "$set": { campo: fecha } }, None).await?;
                }
                resultado.convertidos += 1;
            }
            None => {
                warn!("{}.{} on {} holds unparseable value {}", coleccion, campo, id, valor);
                resultado.invalidos += 1;
            }
        }
    }
    Ok(resultado)
}

#[tokio::main]
async fn main() {
    let _logger = Logger::console_only();
    let _ = dotenv();
    let simular = std::env::args().any(|a| a == "--simular");

    let config = match MongoConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid MongoDB configuration: {}", e);
            std::process::exit(1);
        }
    };
    let contexto = match MongoContext::connect(&config).await {
        Ok(c) => c,
        Err(e) => {
            error!("Could not connect to MongoDB: {}", e);
            std::process::exit(1);
        }
    };

    if simular {
        info!("Dry run, no document will be modified");
    }
    let mut fallos = 0;
    for (coleccion, campos) in CAMPOS_FECHA {
        for campo in campos {
            match migrar_campo(&contexto, coleccion, campo, simular).await {
                Ok(r) => info!(
                    "{}.{}: {} converted, {} left untouched",
                    coleccion, campo, r.convertidos, r.invalidos
                ),
                Err(e) => {
                    fallos += 1;
                    error!("{}.{} migration failed: {}", coleccion, campo, e);
                }
            }
        }
    }
    if fallos > 0 {
        std::process::exit(1);
    }
}
