use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::util::fecha::deserializar_fecha_opcional;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rol {
    Admin,
    #[default]
    Funcionario,
}

impl Rol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rol::Admin => "admin",
            Rol::Funcionario => "funcionario",
        }
    }

    pub fn parse(valor: &str) -> Option<Self> {
        match valor.trim() {
            "admin" => Some(Rol::Admin),
            "funcionario" => Some(Rol::Funcionario),
            _ => None,
        }
    }
}

fn estado_activo() -> String {
    "Activo".to_string()
}

/// Staff account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funcionario {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub nombre: String,
    pub email: String,
    /// Older accounts stored the hash under `password`.
    #[serde(alias = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub secretaria: String,
    /// Work-line id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linea_trabajo: Option<String>,
    #[serde(default)]
    pub rol: Rol,
    #[serde(default = "estado_activo")]
    pub estado: String,
    #[serde(default, deserialize_with = "deserializar_fecha_opcional")]
    pub fecha_registro: Option<DateTime>,
}
