pub mod actividad_dto;
pub mod asistente_dto;
pub mod auth_dto;
pub mod beneficiario_dto;
pub mod common;
pub mod linea_trabajo_dto;

use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::util::error::{errores_de_validacion, ErrorCampo};

/// Runs the derived rules and returns every violation.
pub(crate) fn validar<T: Validate>(valor: &T) -> Vec<ErrorCampo> {
    match valor.validate() {
        Ok(()) => Vec::new(),
        Err(errores) => errores_de_validacion(&errores),
    }
}

/// Optional text where `""` and whitespace mean "not provided".
pub(crate) fn texto_opcional<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let valor = Option::<String>::deserialize(deserializer)?;
    Ok(valor.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}

/// Page number or size from a query string. Blank or non-numeric input means
/// "not provided"; zero and negative values become 1.
pub(crate) fn numero_pagina<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Valor {
        Entero(i64),
        Texto(String),
    }

    let numero = match Option::<Valor>::deserialize(deserializer)? {
        Some(Valor::Entero(n)) => Some(n),
        Some(Valor::Texto(texto)) => texto.trim().parse::<i64>().ok(),
        None => None,
    };
    Ok(numero.map(|n| n.max(1) as u64))
}

/// Adds `ErrorCampo` for a required value that is absent or blank.
pub(crate) fn requerir(errores: &mut Vec<ErrorCampo>, campo: &str, valor: Option<&str>, mensaje: &str) {
    if valor.map(|v| v.trim().is_empty()).unwrap_or(true) {
        errores.push(ErrorCampo::new(campo, mensaje));
    }
}
