use serde::Serialize;

use crate::model::linea_trabajo::LineaTrabajo;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LineaTrabajoResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

impl From<LineaTrabajo> for LineaTrabajoResponse {
    fn from(l: LineaTrabajo) -> Self {
        LineaTrabajoResponse { id: l.id.to_hex(), nombre: l.nombre, descripcion: l.descripcion }
    }
}
