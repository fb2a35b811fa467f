use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::util::{excel::CONTENT_TYPE_XLSX, pagination::Paginacion};

/// Success envelope shared by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct Respuesta<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paginacion: Option<Paginacion>,
}

impl<T: Serialize> Respuesta<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Respuesta { success: true, message: message.into(), data, count: None, paginacion: None }
    }

    pub fn con_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn con_paginacion(mut self, paginacion: Paginacion) -> Self {
        self.paginacion = Some(paginacion);
        self
    }

    pub fn creado(self) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Json(self))
    }
}

impl<T: Serialize> IntoResponse for Respuesta<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IdCreado {
    pub id: String,
}

/// In-memory `.xlsx` ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct Archivo {
    pub nombre: String,
    pub contenido: Vec<u8>,
}

impl IntoResponse for Archivo {
    fn into_response(self) -> Response {
        let disposicion = format!("attachment; filename=\"{}\"", self.nombre);
        let mut respuesta = (StatusCode::OK, self.contenido).into_response();
        let headers = respuesta.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_XLSX));
        if let Ok(valor) = HeaderValue::from_str(&disposicion) {
            headers.insert(header::CONTENT_DISPOSITION, valor);
        }
        respuesta
    }
}

/// Export result: an attachment, or 204 when there was nothing to write.
pub enum Exportacion {
    Archivo(Archivo),
    Vacia,
}

impl From<Option<Archivo>> for Exportacion {
    fn from(archivo: Option<Archivo>) -> Self {
        archivo.map(Exportacion::Archivo).unwrap_or(Exportacion::Vacia)
    }
}

impl IntoResponse for Exportacion {
    fn into_response(self) -> Response {
        match self {
            Exportacion::Archivo(archivo) => archivo.into_response(),
            Exportacion::Vacia => StatusCode::NO_CONTENT.into_response(),
        }
    }
}
