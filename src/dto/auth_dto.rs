use bson::DateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::{texto_opcional, validar};
use crate::model::funcionario::{Funcionario, Rol};
use crate::util::error::ErrorCampo;
use crate::util::fecha::a_iso;
use crate::util::jwt::TokenPair;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Correo electrónico no válido"))]
    pub email: String,
    #[validate(length(min = 1, message = "La contraseña es requerida"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 10, message = "Token de refresco no válido"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegistroRequest {
    #[validate(required(message = "El campo es requerido"), length(min = 2, max = 100, message = "Debe tener entre 2 y 100 caracteres"))]
    pub nombre: Option<String>,
    #[validate(required(message = "El campo es requerido"), email(message = "Correo electrónico no válido"))]
    pub email: Option<String>,
    #[validate(required(message = "El campo es requerido"), length(min = 8, max = 128, message = "Debe tener entre 8 y 128 caracteres"))]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub secretaria: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub linea_trabajo: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub rol: Option<String>,
}

/// Validated registration, password still in clear text until the service hashes it.
#[derive(Debug, Clone)]
pub struct Registro {
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub secretaria: String,
    pub linea_trabajo: Option<String>,
    pub rol: Rol,
}

impl RegistroRequest {
    pub fn a_registro(self) -> Result<Registro, Vec<ErrorCampo>> {
        let mut errores = validar(&self);
        let rol = match self.rol.as_deref() {
            None => Rol::default(),
            Some(valor) => match Rol::parse(valor) {
                Some(rol) => rol,
                None => {
                    errores.push(ErrorCampo::new("rol", "Debe ser admin o funcionario"));
                    Rol::default()
                }
            },
        };
        if !errores.is_empty() {
            return Err(errores);
        }
        Ok(Registro {
            nombre: self.nombre.unwrap_or_default().trim().to_string(),
            email: self.email.unwrap_or_default().trim().to_lowercase(),
            password: self.password.unwrap_or_default(),
            secretaria: self.secretaria.unwrap_or_default(),
            linea_trabajo: self.linea_trabajo,
            rol,
        })
    }
}

impl Registro {
    pub fn a_funcionario(self, password_hash: String, ahora: DateTime) -> Funcionario {
        Funcionario {
            id: None,
            nombre: self.nombre,
            email: self.email,
            password_hash,
            secretaria: self.secretaria,
            linea_trabajo: self.linea_trabajo,
            rol: self.rol,
            estado: "Activo".to_string(),
            fecha_registro: Some(ahora),
        }
    }
}

/// Staff account as shown to clients; never carries the hash.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FuncionarioResponse {
    pub id: String,
    pub nombre: String,
    pub email: String,
    pub secretaria: String,
    /// Display name of the work line.
    pub linea_trabajo: String,
    pub linea_trabajo_id: Option<String>,
    pub rol: Rol,
    pub estado: String,
    pub fecha_registro: Option<String>,
}

impl FuncionarioResponse {
    pub fn new(f: Funcionario, nombre_linea_trabajo: String) -> Self {
        FuncionarioResponse {
            id: f.id.map(|id| id.to_hex()).unwrap_or_default(),
            nombre: f.nombre,
            email: f.email,
            secretaria: f.secretaria,
            linea_trabajo: nombre_linea_trabajo,
            linea_trabajo_id: f.linea_trabajo,
            rol: f.rol,
            estado: f.estado,
            fecha_registro: f.fecha_registro.as_ref().map(a_iso),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub funcionario: FuncionarioResponse,
}
