use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const SIN_LINEA_TRABAJO: &str = "Sin línea de trabajo";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineaTrabajo {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}
