use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::util::fecha::deserializar_fecha_opcional;

pub const TIPO_FUNCIONARIO: &str = "funcionario";

fn tipo_funcionario() -> String {
    TIPO_FUNCIONARIO.to_string()
}

/// Standalone staff attendee, reused across activity rosters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asistente {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default = "tipo_funcionario")]
    pub tipo: String,
    pub nombre: String,
    pub cedula: String,
    pub dependencia: String,
    pub cargo: String,
    pub tipo_participacion: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "deserializar_fecha_opcional")]
    pub fecha_creacion: Option<DateTime>,
    #[serde(default, deserialize_with = "deserializar_fecha_opcional")]
    pub fecha_actualizacion: Option<DateTime>,
}
