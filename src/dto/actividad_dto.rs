use bson::DateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::{numero_pagina, requerir, texto_opcional, validar};
use crate::model::actividad::{
    Actividad, Asistencia, CambiosActividad, EstadoActividad, FuncionarioAsistente, Participante,
};
use crate::util::error::ErrorCampo;
use crate::util::fecha::{a_iso, parsear_fecha};

const REQUERIDO: &str = "El campo es requerido";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CrearActividadRequest {
    #[validate(
        required(message = "El campo es requerido"),
        length(min = 3, max = 200, message = "El tema debe tener entre 3 y 200 caracteres")
    )]
    pub tema: Option<String>,
    pub objetivo: Option<String>,
    pub lugar: Option<String>,
    pub dependencia: Option<String>,
    #[validate(required(message = "El campo es requerido"))]
    pub fecha: Option<String>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub linea_trabajo_id: Option<String>,
    pub funcionario_id: Option<String>,
    pub creado_por: Option<String>,
    pub estado: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub asistentes: Vec<AsistenciaRequest>,
}

impl CrearActividadRequest {
    /// Validates the whole payload and builds the record to insert.
    pub fn a_actividad(mut self, ahora: DateTime) -> Result<Actividad, Vec<ErrorCampo>> {
        for campo in [
            &mut self.tema,
            &mut self.objetivo,
            &mut self.lugar,
            &mut self.dependencia,
            &mut self.fecha,
            &mut self.hora_inicio,
            &mut self.hora_fin,
            &mut self.linea_trabajo_id,
            &mut self.funcionario_id,
            &mut self.creado_por,
        ] {
            recortar(campo);
        }

        let mut errores = validar(&self);
        for (campo, valor) in [
            ("objetivo", &self.objetivo),
            ("lugar", &self.lugar),
            ("dependencia", &self.dependencia),
            ("hora_inicio", &self.hora_inicio),
            ("hora_fin", &self.hora_fin),
            ("linea_trabajo_id", &self.linea_trabajo_id),
            ("funcionario_id", &self.funcionario_id),
            ("creado_por", &self.creado_por),
        ] {
            requerir(&mut errores, campo, valor.as_deref(), REQUERIDO);
        }

        let fecha = validar_fecha(&mut errores, self.fecha.as_deref());
        let estado = match self.estado.as_deref() {
            None => EstadoActividad::default(),
            Some(valor) => validar_estado(&mut errores, valor).unwrap_or_default(),
        };
        let asistentes = validar_lista(&mut errores, self.asistentes);

        if !errores.is_empty() {
            return Err(errores);
        }

        Ok(Actividad {
            id: None,
            tema: self.tema.unwrap_or_default(),
            objetivo: self.objetivo.unwrap_or_default(),
            lugar: self.lugar.unwrap_or_default(),
            dependencia: self.dependencia.unwrap_or_default(),
            fecha: fecha.unwrap_or(ahora),
            hora_inicio: self.hora_inicio.unwrap_or_default(),
            hora_fin: self.hora_fin.unwrap_or_default(),
            linea_trabajo_id: self.linea_trabajo_id.unwrap_or_default(),
            funcionario_id: self.funcionario_id.unwrap_or_default(),
            creado_por: self.creado_por.unwrap_or_default(),
            actualizado_por: None,
            estado,
            logo_url: self.logo_url,
            asistentes,
            fecha_creacion: Some(ahora),
            fecha_actualizacion: Some(ahora),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ActualizarActividadRequest {
    #[validate(length(min = 3, max = 200, message = "El tema debe tener entre 3 y 200 caracteres"))]
    pub tema: Option<String>,
    #[validate(length(min = 1, message = "El campo no puede estar vacío"))]
    pub objetivo: Option<String>,
    #[validate(length(min = 1, message = "El campo no puede estar vacío"))]
    pub lugar: Option<String>,
    #[validate(length(min = 1, message = "El campo no puede estar vacío"))]
    pub dependencia: Option<String>,
    pub fecha: Option<String>,
    #[validate(length(min = 1, message = "El campo no puede estar vacío"))]
    pub hora_inicio: Option<String>,
    #[validate(length(min = 1, message = "El campo no puede estar vacío"))]
    pub hora_fin: Option<String>,
    #[validate(length(min = 1, message = "El campo no puede estar vacío"))]
    pub linea_trabajo_id: Option<String>,
    #[validate(length(min = 1, message = "El campo no puede estar vacío"))]
    pub funcionario_id: Option<String>,
    pub estado: Option<String>,
    pub logo_url: Option<String>,
    pub asistentes: Option<Vec<AsistenciaRequest>>,
}

impl ActualizarActividadRequest {
    /// Validates the declared fields. Audit fields are set by the caller.
    pub fn a_cambios(mut self) -> Result<CambiosActividad, Vec<ErrorCampo>> {
        for campo in [
            &mut self.tema,
            &mut self.objetivo,
            &mut self.lugar,
            &mut self.dependencia,
            &mut self.fecha,
            &mut self.hora_inicio,
            &mut self.hora_fin,
            &mut self.linea_trabajo_id,
            &mut self.funcionario_id,
        ] {
            recortar(campo);
        }
        let mut errores = validar(&self);

        let fecha = match self.fecha.as_deref() {
            Some(texto) => validar_fecha(&mut errores, Some(texto)),
            None => None,
        };
        let estado = self.estado.as_deref().and_then(|v| validar_estado(&mut errores, v));
        let asistentes = self.asistentes.map(|lista| validar_lista(&mut errores, lista));

        if !errores.is_empty() {
            return Err(errores);
        }

        Ok(CambiosActividad {
            tema: self.tema,
            objetivo: self.objetivo,
            lugar: self.lugar,
            dependencia: self.dependencia,
            fecha,
            hora_inicio: self.hora_inicio,
            hora_fin: self.hora_fin,
            linea_trabajo_id: self.linea_trabajo_id,
            funcionario_id: self.funcionario_id,
            estado,
            logo_url: self.logo_url,
            asistentes,
            actualizado_por: None,
            fecha_actualizacion: None,
        })
    }
}

/// One roster entry as sent by clients.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AsistenciaRequest {
    #[validate(required(message = "El tipo de asistente es requerido"))]
    pub tipo: Option<String>,
    pub asistio: Option<bool>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub observaciones: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub beneficiario_id: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub cedula: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub dependencia: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub cargo: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub tipo_participacion: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub telefono: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    #[validate(email(message = "Correo electrónico no válido"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub firma: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub asistente_id: Option<String>,
}

impl AsistenciaRequest {
    pub fn a_asistencia(self) -> Result<Asistencia, Vec<ErrorCampo>> {
        let mut errores = validar(&self);

        let participante = match self.tipo.as_deref().map(str::trim) {
            None => None,
            Some("beneficiario") => {
                requerir(
                    &mut errores,
                    "beneficiario_id",
                    self.beneficiario_id.as_deref(),
                    "El campo beneficiario_id es requerido para asistentes tipo beneficiario",
                );
                self.beneficiario_id
                    .clone()
                    .map(|beneficiario_id| Participante::Beneficiario { beneficiario_id })
            }
            Some("funcionario") => {
                for (campo, valor) in [
                    ("nombre", &self.nombre),
                    ("cedula", &self.cedula),
                    ("dependencia", &self.dependencia),
                    ("cargo", &self.cargo),
                    ("tipo_participacion", &self.tipo_participacion),
                ] {
                    requerir(
                        &mut errores,
                        campo,
                        valor.as_deref(),
                        &format!("El campo {} es requerido para asistentes tipo funcionario", campo),
                    );
                }
                Some(Participante::Funcionario(FuncionarioAsistente {
                    nombre: self.nombre.clone().unwrap_or_default(),
                    cedula: self.cedula.clone().unwrap_or_default(),
                    dependencia: self.dependencia.clone().unwrap_or_default(),
                    cargo: self.cargo.clone().unwrap_or_default(),
                    tipo_participacion: self.tipo_participacion.clone().unwrap_or_default(),
                    telefono: self.telefono.clone(),
                    email: self.email.clone(),
                    firma: self.firma.clone(),
                    asistente_id: self.asistente_id.clone(),
                }))
            }
            Some(_) => {
                errores.push(ErrorCampo::new("tipo", "El tipo debe ser 'beneficiario' o 'funcionario'"));
                None
            }
        };

        match participante {
            Some(participante) if errores.is_empty() => Ok(Asistencia {
                participante,
                asistio: self.asistio.unwrap_or(false),
                observaciones: self.observaciones,
            }),
            _ => Err(errores),
        }
    }
}

/// Body of `POST /api/actividades/{id}/asistentes`: `{"asistentes": [...]}` or a bare list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GuardarAsistenciaRequest {
    Objeto { asistentes: Vec<AsistenciaRequest> },
    Lista(Vec<AsistenciaRequest>),
}

impl GuardarAsistenciaRequest {
    /// Validates every entry; any failure rejects the whole roster.
    pub fn a_asistencias(self) -> Result<Vec<Asistencia>, Vec<ErrorCampo>> {
        let lista = match self {
            GuardarAsistenciaRequest::Objeto { asistentes } => asistentes,
            GuardarAsistenciaRequest::Lista(asistentes) => asistentes,
        };
        let mut errores = Vec::new();
        let asistentes = validar_lista(&mut errores, lista);
        if errores.is_empty() {
            Ok(asistentes)
        } else {
            Err(errores)
        }
    }
}

fn recortar(valor: &mut Option<String>) {
    if let Some(texto) = valor {
        *texto = texto.trim().to_string();
    }
}

fn validar_fecha(errores: &mut Vec<ErrorCampo>, texto: Option<&str>) -> Option<DateTime> {
    let texto = texto?;
    match parsear_fecha(texto) {
        Some(fecha) => Some(DateTime::from_chrono(fecha)),
        None => {
            errores.push(ErrorCampo::new("fecha", "Fecha no válida"));
            None
        }
    }
}

fn validar_estado(errores: &mut Vec<ErrorCampo>, valor: &str) -> Option<EstadoActividad> {
    let estado = EstadoActividad::parse(valor);
    if estado.is_none() {
        errores.push(ErrorCampo::new(
            "estado",
            format!("Debe ser uno de: {}", EstadoActividad::VALORES.join(", ")),
        ));
    }
    estado
}

/// Validates each roster entry, prefixing field errors with `asistentes[i].`.
fn validar_lista(errores: &mut Vec<ErrorCampo>, lista: Vec<AsistenciaRequest>) -> Vec<Asistencia> {
    let mut validas = Vec::with_capacity(lista.len());
    for (i, entrada) in lista.into_iter().enumerate() {
        match entrada.a_asistencia() {
            Ok(asistencia) => validas.push(asistencia),
            Err(campos) => errores.extend(campos.into_iter().map(|e| {
                let campo = if e.campo.is_empty() {
                    format!("asistentes[{}]", i)
                } else {
                    format!("asistentes[{}].{}", i, e.campo)
                };
                ErrorCampo::new(campo, e.mensaje)
            })),
        }
    }
    validas
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListarActividadesQuery {
    #[serde(default, deserialize_with = "numero_pagina")]
    pub pagina: Option<u64>,
    #[serde(default, deserialize_with = "numero_pagina")]
    pub por_pagina: Option<u64>,
    pub busqueda: Option<String>,
    pub linea_trabajo_id: Option<String>,
    pub funcionario_id: Option<String>,
    pub creado_por: Option<String>,
    pub estado: Option<String>,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
    pub orden_por: Option<String>,
    pub orden_direccion: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportarQuery {
    pub columnas: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActividadResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub tema: String,
    pub objetivo: String,
    pub lugar: String,
    pub dependencia: String,
    pub fecha: String,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub linea_trabajo_id: String,
    pub funcionario_id: String,
    pub creado_por: String,
    pub actualizado_por: Option<String>,
    pub estado: EstadoActividad,
    pub logo_url: Option<String>,
    pub asistentes: Vec<Asistencia>,
    pub fecha_creacion: Option<String>,
    pub fecha_actualizacion: Option<String>,
}

impl From<Actividad> for ActividadResponse {
    fn from(a: Actividad) -> Self {
        ActividadResponse {
            id: a.id.map(|id| id.to_hex()).unwrap_or_default(),
            tema: a.tema,
            objetivo: a.objetivo,
            lugar: a.lugar,
            dependencia: a.dependencia,
            fecha: a_iso(&a.fecha),
            hora_inicio: a.hora_inicio,
            hora_fin: a.hora_fin,
            linea_trabajo_id: a.linea_trabajo_id,
            funcionario_id: a.funcionario_id,
            creado_por: a.creado_por,
            actualizado_por: a.actualizado_por,
            estado: a.estado,
            logo_url: a.logo_url,
            asistentes: a.asistentes,
            fecha_creacion: a.fecha_creacion.as_ref().map(a_iso),
            fecha_actualizacion: a.fecha_actualizacion.as_ref().map(a_iso),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AsistenciasGuardadas {
    pub actividad_id: String,
    pub total: usize,
}
