use std::collections::HashMap;

use bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

use crate::util::fecha::deserializar_fecha;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoVerificacion {
    HuellaDigital,
    FirmaDigital,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstadoVerificacion {
    Pendiente,
    Verificado,
    Rechazado,
}

/// WebAuthn-style credential registered for a beneficiary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificacionBiometrica {
    pub credential_id: String,
    pub public_key: String,
    #[serde(deserialize_with = "deserializar_fecha")]
    pub fecha_registro: DateTime,
    pub tipo_verificacion: TipoVerificacion,
    pub estado: EstadoVerificacion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispositivo: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

/// Plain profile fields of a beneficiary.
///
/// Kept free of BSON-specific types: the struct is flattened into
/// [`Beneficiario`] and flattened content is buffered by serde.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerfilBeneficiario {
    #[serde(default)]
    pub funcionario_id: String,
    #[serde(default)]
    pub funcionario_nombre: String,
    /// Work-line id
    #[serde(default)]
    pub linea_trabajo: String,
    #[serde(default)]
    pub nombre_completo: String,
    #[serde(default)]
    pub tipo_documento: String,
    #[serde(default)]
    pub numero_documento: String,
    #[serde(default)]
    pub genero: String,
    #[serde(default)]
    pub rango_edad: String,
    #[serde(default)]
    pub sabe_leer: bool,
    #[serde(default)]
    pub sabe_escribir: bool,
    #[serde(default)]
    pub numero_celular: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correo_electronico: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etnia: Option<String>,
    #[serde(default)]
    pub comuna: String,
    #[serde(default)]
    pub barrio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barrio_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barrio_lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiene_discapacidad: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_discapacidad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiene_certificado_discapacidad: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre_cuidadora: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labora_cuidadora: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub victima_conflicto: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hijos_a_cargo: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estudia_actualmente: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nivel_educativo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situacion_laboral: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_vivienda: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ayuda_humanitaria: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion_ayuda_humanitaria: Option<String>,
    /// Base64 signature image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codigo_verificacion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beneficiario {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(deserialize_with = "deserializar_fecha")]
    pub fecha_registro: DateTime,
    #[serde(flatten)]
    pub perfil: PerfilBeneficiario,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verificacion_biometrica: Option<VerificacionBiometrica>,
    /// Superseded by `verificacion_biometrica`; kept as stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub huella_dactilar: Option<Document>,
}

/// Registrations in one calendar month (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConteoMes {
    pub mes: String,
    pub cantidad: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoblacionesVulnerables {
    pub discapacidad: u64,
    pub victimas_conflicto: u64,
    pub jovenes: u64,
    pub adultos_mayores: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConteoPoblacion {
    pub poblacion: &'static str,
    pub cantidad: u64,
}

impl PoblacionesVulnerables {
    pub fn a_lista(&self) -> Vec<ConteoPoblacion> {
        vec![
            ConteoPoblacion { poblacion: "Personas con Discapacidad", cantidad: self.discapacidad },
            ConteoPoblacion { poblacion: "Víctimas", cantidad: self.victimas_conflicto },
            ConteoPoblacion { poblacion: "Jóvenes", cantidad: self.jovenes },
            ConteoPoblacion { poblacion: "Tercera Edad", cantidad: self.adultos_mayores },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstadisticasBeneficiarios {
    pub total: u64,
    pub por_mes: Vec<ConteoMes>,
    pub poblaciones_vulnerables: Vec<ConteoPoblacion>,
}
