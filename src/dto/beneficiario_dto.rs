use std::collections::HashMap;

use bson::{Bson, DateTime, Document};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::{numero_pagina, requerir, texto_opcional, validar};
use crate::model::beneficiario::{
    Beneficiario, EstadoVerificacion, PerfilBeneficiario, TipoVerificacion, VerificacionBiometrica,
};
use crate::util::error::ErrorCampo;
use crate::util::fecha::{a_dia, a_iso, parsear_fecha};

const REQUERIDO: &str = "El campo es requerido";

#[derive(Debug, Clone, Deserialize)]
pub struct VerificacionBiometricaRequest {
    pub credential_id: String,
    pub public_key: String,
    pub fecha_registro: String,
    pub tipo_verificacion: TipoVerificacion,
    pub estado: EstadoVerificacion,
    #[serde(default)]
    pub dispositivo: Option<HashMap<String, String>>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

/// Beneficiary payload for both registration and partial update.
///
/// Registration requires the fourteen core fields; an update only checks the
/// format of the fields it carries.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BeneficiarioRequest {
    pub funcionario_id: Option<String>,
    pub funcionario_nombre: Option<String>,
    pub linea_trabajo: Option<String>,
    pub fecha_registro: Option<String>,
    pub nombre_completo: Option<String>,
    pub tipo_documento: Option<String>,
    pub numero_documento: Option<String>,
    pub genero: Option<String>,
    pub rango_edad: Option<String>,
    pub sabe_leer: Option<bool>,
    pub sabe_escribir: Option<bool>,
    pub numero_celular: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    #[validate(email(message = "Correo electrónico no válido"))]
    pub correo_electronico: Option<String>,
    pub etnia: Option<String>,
    pub comuna: Option<String>,
    pub barrio: Option<String>,
    pub barrio_lat: Option<f64>,
    pub barrio_lng: Option<f64>,
    pub tiene_discapacidad: Option<bool>,
    pub tipo_discapacidad: Option<String>,
    pub tiene_certificado_discapacidad: Option<bool>,
    pub nombre_cuidadora: Option<String>,
    pub labora_cuidadora: Option<bool>,
    pub victima_conflicto: Option<bool>,
    #[validate(range(min = 0, message = "Debe ser un número mayor o igual a 0"))]
    pub hijos_a_cargo: Option<i32>,
    pub estudia_actualmente: Option<bool>,
    pub nivel_educativo: Option<String>,
    pub situacion_laboral: Option<String>,
    pub tipo_vivienda: Option<String>,
    pub ayuda_humanitaria: Option<bool>,
    pub descripcion_ayuda_humanitaria: Option<String>,
    pub firma: Option<String>,
    pub codigo_verificacion: Option<String>,
    pub verificacion_biometrica: Option<VerificacionBiometricaRequest>,
    pub huella_dactilar: Option<serde_json::Value>,
}

impl BeneficiarioRequest {
    pub fn a_beneficiario(self) -> Result<Beneficiario, Vec<ErrorCampo>> {
        let mut errores = validar(&self);
        for (campo, valor) in [
            ("funcionario_id", &self.funcionario_id),
            ("funcionario_nombre", &self.funcionario_nombre),
            ("linea_trabajo", &self.linea_trabajo),
            ("fecha_registro", &self.fecha_registro),
            ("nombre_completo", &self.nombre_completo),
            ("tipo_documento", &self.tipo_documento),
            ("numero_documento", &self.numero_documento),
            ("genero", &self.genero),
            ("rango_edad", &self.rango_edad),
            ("numero_celular", &self.numero_celular),
            ("comuna", &self.comuna),
            ("barrio", &self.barrio),
        ] {
            requerir(&mut errores, campo, valor.as_deref(), REQUERIDO);
        }
        if self.sabe_leer.is_none() {
            errores.push(ErrorCampo::new("sabe_leer", REQUERIDO));
        }
        if self.sabe_escribir.is_none() {
            errores.push(ErrorCampo::new("sabe_escribir", REQUERIDO));
        }

        let fecha_registro = self
            .fecha_registro
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .and_then(|f| fecha_o_error(&mut errores, "fecha_registro", f));
        let verificacion = self.verificacion_biometrica.clone().and_then(|v| verificacion(&mut errores, v));
        let huella = self.huella_dactilar.clone().and_then(|h| huella(&mut errores, h));

        let (Some(fecha_registro), true) = (fecha_registro, errores.is_empty()) else {
            errores.sort_by(|a, b| a.campo.cmp(&b.campo));
            return Err(errores);
        };

        Ok(Beneficiario {
            id: None,
            fecha_registro,
            perfil: PerfilBeneficiario {
                funcionario_id: self.funcionario_id.unwrap_or_default(),
                funcionario_nombre: self.funcionario_nombre.unwrap_or_default(),
                linea_trabajo: self.linea_trabajo.unwrap_or_default(),
                nombre_completo: self.nombre_completo.unwrap_or_default().trim().to_string(),
                tipo_documento: self.tipo_documento.unwrap_or_default(),
                numero_documento: self.numero_documento.unwrap_or_default().trim().to_string(),
                genero: self.genero.unwrap_or_default(),
                rango_edad: self.rango_edad.unwrap_or_default(),
                sabe_leer: self.sabe_leer.unwrap_or_default(),
                sabe_escribir: self.sabe_escribir.unwrap_or_default(),
                numero_celular: self.numero_celular.unwrap_or_default(),
                correo_electronico: self.correo_electronico,
                etnia: self.etnia,
                comuna: self.comuna.unwrap_or_default(),
                barrio: self.barrio.unwrap_or_default(),
                barrio_lat: self.barrio_lat,
                barrio_lng: self.barrio_lng,
                tiene_discapacidad: self.tiene_discapacidad,
                tipo_discapacidad: self.tipo_discapacidad,
                tiene_certificado_discapacidad: self.tiene_certificado_discapacidad,
                nombre_cuidadora: self.nombre_cuidadora,
                labora_cuidadora: self.labora_cuidadora,
                victima_conflicto: self.victima_conflicto,
                hijos_a_cargo: self.hijos_a_cargo,
                estudia_actualmente: self.estudia_actualmente,
                nivel_educativo: self.nivel_educativo,
                situacion_laboral: self.situacion_laboral,
                tipo_vivienda: self.tipo_vivienda,
                ayuda_humanitaria: self.ayuda_humanitaria,
                descripcion_ayuda_humanitaria: self.descripcion_ayuda_humanitaria,
                firma: self.firma,
                codigo_verificacion: self.codigo_verificacion,
            },
            verificacion_biometrica: verificacion,
            huella_dactilar: huella,
        })
    }

    /// Builds the `$set` document for a partial update from the declared fields.
    pub fn a_cambios(self) -> Result<Document, Vec<ErrorCampo>> {
        let mut errores = validar(&self);
        let mut cambios = Document::new();

        let mut texto = |campo: &str, valor: Option<String>, errores: &mut Vec<ErrorCampo>, obligatorio: bool| {
            if let Some(valor) = valor {
                let valor = valor.trim().to_string();
                if obligatorio && valor.is_empty() {
                    errores.push(ErrorCampo::new(campo, "El campo no puede estar vacío"));
                } else {
                    cambios.insert(campo, valor);
                }
            }
        };
        texto("funcionario_id", self.funcionario_id, &mut errores, true);
        texto("funcionario_nombre", self.funcionario_nombre, &mut errores, true);
        texto("linea_trabajo", self.linea_trabajo, &mut errores, true);
        texto("nombre_completo", self.nombre_completo, &mut errores, true);
        texto("tipo_documento", self.tipo_documento, &mut errores, true);
        texto("numero_documento", self.numero_documento, &mut errores, true);
        texto("genero", self.genero, &mut errores, true);
        texto("rango_edad", self.rango_edad, &mut errores, true);
        texto("numero_celular", self.numero_celular, &mut errores, true);
        texto("correo_electronico", self.correo_electronico, &mut errores, false);
        texto("etnia", self.etnia, &mut errores, false);
        texto("comuna", self.comuna, &mut errores, true);
        texto("barrio", self.barrio, &mut errores, true);
        texto("tipo_discapacidad", self.tipo_discapacidad, &mut errores, false);
        texto("nombre_cuidadora", self.nombre_cuidadora, &mut errores, false);
        texto("nivel_educativo", self.nivel_educativo, &mut errores, false);
        texto("situacion_laboral", self.situacion_laboral, &mut errores, false);
        texto("tipo_vivienda", self.tipo_vivienda, &mut errores, false);
        texto("descripcion_ayuda_humanitaria", self.descripcion_ayuda_humanitaria, &mut errores, false);
        texto("firma", self.firma, &mut errores, false);
        texto("codigo_verificacion", self.codigo_verificacion, &mut errores, false);

        for (campo, valor) in [
            ("sabe_leer", self.sabe_leer),
            ("sabe_escribir", self.sabe_escribir),
            ("tiene_discapacidad", self.tiene_discapacidad),
            ("tiene_certificado_discapacidad", self.tiene_certificado_discapacidad),
            ("labora_cuidadora", self.labora_cuidadora),
            ("victima_conflicto", self.victima_conflicto),
            ("estudia_actualmente", self.estudia_actualmente),
            ("ayuda_humanitaria", self.ayuda_humanitaria),
        ] {
            if let Some(valor) = valor {
                cambios.insert(campo, valor);
            }
        }
        if let Some(lat) = self.barrio_lat {
            cambios.insert("barrio_lat", lat);
        }
        if let Some(lng) = self.barrio_lng {
            cambios.insert("barrio_lng", lng);
        }
        if let Some(hijos) = self.hijos_a_cargo {
            cambios.insert("hijos_a_cargo", hijos);
        }
        if let Some(fecha) = self.fecha_registro.as_deref() {
            if let Some(fecha) = fecha_o_error(&mut errores, "fecha_registro", fecha) {
                cambios.insert("fecha_registro", fecha);
            }
        }
        if let Some(v) = self.verificacion_biometrica {
            if let Some(v) = verificacion(&mut errores, v) {
                match bson::to_bson(&v) {
                    Ok(valor) => {
                        cambios.insert("verificacion_biometrica", valor);
                    }
                    Err(e) => errores.push(ErrorCampo::new("verificacion_biometrica", e.to_string())),
                }
            }
        }
        if let Some(h) = self.huella_dactilar {
            if let Some(h) = huella(&mut errores, h) {
                cambios.insert("huella_dactilar", h);
            }
        }

        if errores.is_empty() {
            Ok(cambios)
        } else {
            errores.sort_by(|a, b| a.campo.cmp(&b.campo));
            Err(errores)
        }
    }
}

fn fecha_o_error(errores: &mut Vec<ErrorCampo>, campo: &str, texto: &str) -> Option<DateTime> {
    match parsear_fecha(texto) {
        Some(fecha) => Some(DateTime::from_chrono(fecha)),
        None => {
            errores.push(ErrorCampo::new(campo, "Fecha no válida"));
            None
        }
    }
}

fn verificacion(errores: &mut Vec<ErrorCampo>, v: VerificacionBiometricaRequest) -> Option<VerificacionBiometrica> {
    let fecha = fecha_o_error(errores, "verificacion_biometrica.fecha_registro", &v.fecha_registro)?;
    Some(VerificacionBiometrica {
        credential_id: v.credential_id,
        public_key: v.public_key,
        fecha_registro: fecha,
        tipo_verificacion: v.tipo_verificacion,
        estado: v.estado,
        dispositivo: v.dispositivo,
        metadata: v.metadata,
    })
}

fn huella(errores: &mut Vec<ErrorCampo>, valor: serde_json::Value) -> Option<Document> {
    match Bson::try_from(valor) {
        Ok(Bson::Document(documento)) => Some(documento),
        Ok(Bson::Null) => None,
        _ => {
            errores.push(ErrorCampo::new("huella_dactilar", "Debe ser un objeto"));
            None
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListarBeneficiariosQuery {
    #[serde(default, deserialize_with = "numero_pagina")]
    pub pagina: Option<u64>,
    #[serde(default, deserialize_with = "numero_pagina")]
    pub por_pagina: Option<u64>,
    pub filtro: Option<String>,
    pub linea_trabajo: Option<String>,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportarBeneficiariosQuery {
    pub filtro: Option<String>,
    pub tipo_exportacion: Option<String>,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VerificacionBiometricaResponse {
    pub credential_id: String,
    pub public_key: String,
    pub fecha_registro: String,
    pub tipo_verificacion: TipoVerificacion,
    pub estado: EstadoVerificacion,
    pub dispositivo: Option<HashMap<String, String>>,
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BeneficiarioResponse {
    #[serde(rename = "_id")]
    pub id: String,
    /// `YYYY-MM-DD`
    pub fecha_registro: String,
    #[serde(flatten)]
    pub perfil: PerfilBeneficiario,
    pub nombre_linea_trabajo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verificacion_biometrica: Option<VerificacionBiometricaResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub huella_dactilar: Option<serde_json::Value>,
}

impl BeneficiarioResponse {
    pub fn new(b: Beneficiario, nombre_linea_trabajo: String) -> Self {
        BeneficiarioResponse {
            id: b.id.map(|id| id.to_hex()).unwrap_or_default(),
            fecha_registro: a_dia(&b.fecha_registro),
            perfil: b.perfil,
            nombre_linea_trabajo,
            verificacion_biometrica: b.verificacion_biometrica.map(|v| VerificacionBiometricaResponse {
                credential_id: v.credential_id,
                public_key: v.public_key,
                fecha_registro: a_iso(&v.fecha_registro),
                tipo_verificacion: v.tipo_verificacion,
                estado: v.estado,
                dispositivo: v.dispositivo,
                metadata: v.metadata,
            }),
            huella_dactilar: b.huella_dactilar.map(|h| Bson::Document(h).into_relaxed_extjson()),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VerificacionResponse {
    pub existe: bool,
    pub msg: String,
}
