use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::util::fecha::{deserializar_fecha, deserializar_fecha_opcional};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstadoActividad {
    #[default]
    Pendiente,
    EnProgreso,
    Completada,
    Cancelada,
}

impl EstadoActividad {
    pub const VALORES: [&'static str; 4] = ["pendiente", "en_progreso", "completada", "cancelada"];

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoActividad::Pendiente => "pendiente",
            EstadoActividad::EnProgreso => "en_progreso",
            EstadoActividad::Completada => "completada",
            EstadoActividad::Cancelada => "cancelada",
        }
    }

    pub fn parse(valor: &str) -> Option<Self> {
        match valor.trim() {
            "pendiente" => Some(EstadoActividad::Pendiente),
            "en_progreso" => Some(EstadoActividad::EnProgreso),
            "completada" => Some(EstadoActividad::Completada),
            "cancelada" => Some(EstadoActividad::Cancelada),
            _ => None,
        }
    }
}

/// Staff member listed on a roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncionarioAsistente {
    pub nombre: String,
    pub cedula: String,
    pub dependencia: String,
    pub cargo: String,
    pub tipo_participacion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firma: Option<String>,
    /// Hex id of the standalone attendee record this entry was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asistente_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum Participante {
    Beneficiario { beneficiario_id: String },
    Funcionario(FuncionarioAsistente),
}

/// Roster entry embedded in an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asistencia {
    #[serde(flatten)]
    pub participante: Participante,
    #[serde(default)]
    pub asistio: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}

impl Asistencia {
    pub fn tipo(&self) -> &'static str {
        match self.participante {
            Participante::Beneficiario { .. } => "beneficiario",
            Participante::Funcionario(_) => "funcionario",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actividad {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub tema: String,
    pub objetivo: String,
    pub lugar: String,
    pub dependencia: String,
    #[serde(deserialize_with = "deserializar_fecha")]
    pub fecha: DateTime,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub linea_trabajo_id: String,
    pub funcionario_id: String,
    pub creado_por: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actualizado_por: Option<String>,
    #[serde(default)]
    pub estado: EstadoActividad,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub asistentes: Vec<Asistencia>,
    #[serde(default, deserialize_with = "deserializar_fecha_opcional")]
    pub fecha_creacion: Option<DateTime>,
    #[serde(default, deserialize_with = "deserializar_fecha_opcional")]
    pub fecha_actualizacion: Option<DateTime>,
}

/// Partial update of an activity. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CambiosActividad {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objetivo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lugar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencia: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hora_inicio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hora_fin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linea_trabajo_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funcionario_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<EstadoActividad>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asistentes: Option<Vec<Asistencia>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actualizado_por: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_actualizacion: Option<DateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_roster_entry_is_tagged_by_tipo() {
        let entrada = Asistencia {
            participante: Participante::Beneficiario { beneficiario_id: "65a1b2c3d4e5f60718293a4b".to_string() },
            asistio: true,
            observaciones: None,
        };
        let documento = bson::to_document(&entrada).unwrap();
        assert_eq!(documento.get_str("tipo").unwrap(), "beneficiario");
        assert!(documento.get_bool("asistio").unwrap());
    }

    #[test]
    fn test_staff_entry_reads_from_stored_document() {
        let documento = doc! {
            "tipo": "funcionario",
            "nombre": "Ana",
            "cedula": "123",
            "dependencia": "Salud",
            "cargo": "Enfermera",
            "tipo_participacion": "Asistente",
        };
        let entrada: Asistencia = bson::from_document(documento).unwrap();
        assert!(!entrada.asistio);
        match entrada.participante {
            Participante::Funcionario(f) => assert_eq!(f.cedula, "123"),
            otro => panic!("unexpected participant {:?}", otro),
        }
    }

    #[test]
    fn test_activity_reads_legacy_string_dates() {
        let documento = doc! {
            "_id": ObjectId::new(),
            "tema": "Taller",
            "objetivo": "o",
            "lugar": "l",
            "dependencia": "d",
            "fecha": "2024-01-10",
            "hora_inicio": "09:00",
            "hora_fin": "11:00",
            "linea_trabajo_id": "lt",
            "funcionario_id": "f",
            "creado_por": "f",
            "fecha_creacion": "2024-01-01T08:00:00",
        };
        let actividad: Actividad = bson::from_document(documento).unwrap();
        assert_eq!(actividad.estado, EstadoActividad::Pendiente);
        assert!(actividad.asistentes.is_empty());
        assert!(actividad.fecha_creacion.is_some());
        assert!(actividad.fecha_actualizacion.is_none());
    }

    #[test]
    fn test_estado_parse() {
        assert_eq!(EstadoActividad::parse("en_progreso"), Some(EstadoActividad::EnProgreso));
        assert_eq!(EstadoActividad::parse("terminada"), None);
    }
}
