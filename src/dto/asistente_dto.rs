use bson::DateTime;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail};

use crate::dto::{texto_opcional, validar};
use crate::model::asistente::{Asistente, TIPO_FUNCIONARIO};
use crate::util::error::ErrorCampo;
use crate::util::fecha::a_iso;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CrearAsistenteRequest {
    #[validate(required(message = "El campo es requerido"), length(min = 1, message = "El campo es requerido"))]
    pub nombre: Option<String>,
    #[validate(required(message = "El campo es requerido"), length(min = 1, message = "El campo es requerido"))]
    pub cedula: Option<String>,
    #[validate(required(message = "El campo es requerido"), length(min = 1, message = "El campo es requerido"))]
    pub dependencia: Option<String>,
    #[validate(required(message = "El campo es requerido"), length(min = 1, message = "El campo es requerido"))]
    pub cargo: Option<String>,
    #[validate(required(message = "El campo es requerido"), length(min = 1, message = "El campo es requerido"))]
    pub tipo_participacion: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub telefono: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    #[validate(email(message = "Correo electrónico no válido"))]
    pub email: Option<String>,
}

impl CrearAsistenteRequest {
    pub fn a_asistente(self, ahora: DateTime) -> Result<Asistente, Vec<ErrorCampo>> {
        let errores = validar(&self);
        if !errores.is_empty() {
            return Err(errores);
        }
        Ok(Asistente {
            id: None,
            tipo: TIPO_FUNCIONARIO.to_string(),
            nombre: limpio(self.nombre),
            cedula: limpio(self.cedula),
            dependencia: limpio(self.dependencia),
            cargo: limpio(self.cargo),
            tipo_participacion: limpio(self.tipo_participacion),
            telefono: self.telefono.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            fecha_creacion: Some(ahora),
            fecha_actualizacion: Some(ahora),
        })
    }
}

fn limpio(valor: Option<String>) -> String {
    valor.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Partial update. `telefono`/`email` may be sent empty to clear them.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ActualizarAsistenteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "El campo no puede estar vacío"))]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "El campo no puede estar vacío"))]
    pub cedula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "El campo no puede estar vacío"))]
    pub dependencia: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "El campo no puede estar vacío"))]
    pub cargo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "El campo no puede estar vacío"))]
    pub tipo_participacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ActualizarAsistenteRequest {
    pub fn validar(mut self) -> Result<Self, Vec<ErrorCampo>> {
        for campo in [
            &mut self.nombre,
            &mut self.cedula,
            &mut self.dependencia,
            &mut self.cargo,
            &mut self.tipo_participacion,
            &mut self.telefono,
            &mut self.email,
        ] {
            if let Some(valor) = campo {
                *valor = valor.trim().to_string();
            }
        }
        let mut errores = validar(&self);
        if let Some(email) = self.email.as_deref() {
            if !email.is_empty() && !email.validate_email() {
                errores.push(ErrorCampo::new("email", "Correo electrónico no válido"));
            }
        }
        if errores.is_empty() {
            Ok(self)
        } else {
            Err(errores)
        }
    }

    pub fn es_vacio(&self) -> bool {
        self.nombre.is_none()
            && self.cedula.is_none()
            && self.dependencia.is_none()
            && self.cargo.is_none()
            && self.tipo_participacion.is_none()
            && self.telefono.is_none()
            && self.email.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListarAsistentesQuery {
    pub tipo: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AsistenteResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub tipo: String,
    pub nombre: String,
    pub cedula: String,
    pub dependencia: String,
    pub cargo: String,
    pub tipo_participacion: String,
    pub telefono: String,
    pub email: String,
    pub fecha_creacion: Option<String>,
    pub fecha_actualizacion: Option<String>,
}

impl From<Asistente> for AsistenteResponse {
    fn from(a: Asistente) -> Self {
        AsistenteResponse {
            id: a.id.map(|id| id.to_hex()).unwrap_or_default(),
            tipo: a.tipo,
            nombre: a.nombre,
            cedula: a.cedula,
            dependencia: a.dependencia,
            cargo: a.cargo,
            tipo_participacion: a.tipo_participacion,
            telefono: a.telefono,
            email: a.email,
            fecha_creacion: a.fecha_creacion.as_ref().map(a_iso),
            fecha_actualizacion: a.fecha_actualizacion.as_ref().map(a_iso),
        }
    }
}
