use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use tracing::{error, info, instrument, warn};

use crate::dto::actividad_dto::{
    ActualizarActividadRequest, CrearActividadRequest, GuardarAsistenciaRequest, ListarActividadesQuery,
};
use crate::dto::common::Archivo;
use crate::model::actividad::{Actividad, Asistencia, EstadoActividad, Participante};
use crate::model::actor::Actor;
use crate::model::beneficiario::Beneficiario;
use crate::repository::actividad_repo::{ActividadRepository, FiltroActividades, OrdenActividades, CAMPOS_ORDEN};
use crate::repository::beneficiario_repo::BeneficiarioRepository;
use crate::repository::repository_error::RepositoryError;
use crate::util::error::{ErrorCampo, ServiceError};
use crate::util::excel::{generar_xlsx, nombre_archivo, seleccionar_columnas, si_no, Fila, HojaExcel};
use crate::util::extract::parsear_id;
use crate::util::fecha::{a_dia, fin_rango, inicio_rango};
use crate::util::pagination::Paginacion;
use crate::util::texto::{lista_separada_por_comas, no_vacio};

/// Roster columns in export order.
pub const COLUMNAS_ASISTENCIA: [&str; 9] = [
    "nombre",
    "cedula",
    "dependencia",
    "cargo",
    "tipo_participacion",
    "telefono",
    "email",
    "asistio",
    "observaciones",
];

#[async_trait]
pub trait ActividadService: Send + Sync {
    async fn crear(&self, req: CrearActividadRequest) -> Result<Actividad, ServiceError>;
    async fn listar(&self, query: ListarActividadesQuery) -> Result<(Vec<Actividad>, Paginacion), ServiceError>;
    async fn obtener(&self, id: &str) -> Result<Actividad, ServiceError>;
    async fn actualizar(&self, id: &str, req: ActualizarActividadRequest, actor: &Actor)
        -> Result<Actividad, ServiceError>;
    async fn eliminar(&self, id: &str) -> Result<(), ServiceError>;
    /// Replaces the roster; returns how many entries were saved.
    async fn guardar_asistencia(&self, id: &str, req: GuardarAsistenciaRequest, actor: &Actor)
        -> Result<usize, ServiceError>;
    async fn obtener_asistencia(&self, id: &str) -> Result<Vec<Asistencia>, ServiceError>;
    /// `None` when the roster is empty.
    async fn exportar_asistencia(
        &self,
        id: &str,
        columnas: Option<&str>,
        con_resumen: bool,
    ) -> Result<Option<Archivo>, ServiceError>;
}

pub struct ActividadServiceImpl {
    pub actividad_repo: Arc<dyn ActividadRepository>,
    pub beneficiario_repo: Arc<dyn BeneficiarioRepository>,
}

impl ActividadServiceImpl {
    pub fn new(actividad_repo: Arc<dyn ActividadRepository>, beneficiario_repo: Arc<dyn BeneficiarioRepository>) -> Self {
        Self { actividad_repo, beneficiario_repo }
    }

    /// Beneficiaries referenced by the roster, keyed by hex id.
    async fn beneficiarios_de(&self, asistentes: &[Asistencia]) -> Result<HashMap<String, Beneficiario>, ServiceError> {
        let mut encontrados = HashMap::new();
        for asistencia in asistentes {
            let Participante::Beneficiario { beneficiario_id } = &asistencia.participante else {
                continue;
            };
            if encontrados.contains_key(beneficiario_id) {
                continue;
            }
            let Ok(oid) = ObjectId::parse_str(beneficiario_id.trim()) else {
                warn!("Roster references malformed beneficiary id '{}'", beneficiario_id);
                continue;
            };
            match self.beneficiario_repo.obtener_por_id(oid).await {
                Ok(beneficiario) => {
                    encontrados.insert(beneficiario_id.clone(), beneficiario);
                }
                Err(RepositoryError::NotFound(_)) => {
                    warn!("Roster references missing beneficiary {}", beneficiario_id);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(encontrados)
    }
}

/// Translates listing query parameters into a filter and a sort order.
pub fn filtro_desde_consulta(
    query: &ListarActividadesQuery,
) -> Result<(FiltroActividades, OrdenActividades), Vec<ErrorCampo>> {
    let mut errores = Vec::new();

    let estado = no_vacio(query.estado.as_deref()).and_then(|valor| {
        let estado = EstadoActividad::parse(valor);
        if estado.is_none() {
            errores.push(ErrorCampo::new("estado", format!("Debe ser uno de: {}", EstadoActividad::VALORES.join(", "))));
        }
        estado
    });
    let mut fecha = |campo: &str, valor: Option<&str>, convertir: fn(&str) -> Option<DateTime>| {
        no_vacio(valor).and_then(|texto| {
            let fecha = convertir(texto);
            if fecha.is_none() {
                errores.push(ErrorCampo::new(campo, "Fecha no válida"));
            }
            fecha
        })
    };
    let desde = fecha("fecha_inicio", query.fecha_inicio.as_deref(), inicio_rango);
    let hasta = fecha("fecha_fin", query.fecha_fin.as_deref(), fin_rango);

    let campo = match no_vacio(query.orden_por.as_deref()) {
        None => OrdenActividades::default().campo,
        Some(valor) => OrdenActividades::campo_permitido(valor).unwrap_or_else(|| {
            errores.push(ErrorCampo::new("orden_por", format!("Debe ser uno de: {}", CAMPOS_ORDEN.join(", "))));
            OrdenActividades::default().campo
        }),
    };
    let ascendente = match no_vacio(query.orden_direccion.as_deref()).map(str::to_ascii_lowercase).as_deref() {
        None | Some("desc") => false,
        Some("asc") => true,
        Some(_) => {
            errores.push(ErrorCampo::new("orden_direccion", "Debe ser 'asc' o 'desc'"));
            false
        }
    };

    if !errores.is_empty() {
        return Err(errores);
    }
    let filtro = FiltroActividades {
        busqueda: no_vacio(query.busqueda.as_deref()).map(str::to_string),
        linea_trabajo_id: no_vacio(query.linea_trabajo_id.as_deref()).map(str::to_string),
        funcionario_id: no_vacio(query.funcionario_id.as_deref()).map(str::to_string),
        creado_por: no_vacio(query.creado_por.as_deref()).map(str::to_string),
        estado,
        desde,
        hasta,
    };
    Ok((filtro, OrdenActividades { campo, ascendente }))
}

/// Flattens roster entries into export rows.
///
/// Beneficiary entries take their name, document, phone and e-mail from the
/// beneficiary record when it can be found.
pub fn filas_asistencia(asistentes: &[Asistencia], beneficiarios: &HashMap<String, Beneficiario>) -> Vec<Fila> {
    asistentes
        .iter()
        .map(|asistencia| {
            let mut fila = Fila::new();
            match &asistencia.participante {
                Participante::Funcionario(f) => {
                    fila.insert("nombre".to_string(), f.nombre.clone());
                    fila.insert("cedula".to_string(), f.cedula.clone());
                    fila.insert("dependencia".to_string(), f.dependencia.clone());
                    fila.insert("cargo".to_string(), f.cargo.clone());
                    fila.insert("tipo_participacion".to_string(), f.tipo_participacion.clone());
                    fila.insert("telefono".to_string(), f.telefono.clone().unwrap_or_default());
                    fila.insert("email".to_string(), f.email.clone().unwrap_or_default());
                }
                Participante::Beneficiario { beneficiario_id } => {
                    if let Some(b) = beneficiarios.get(beneficiario_id) {
                        fila.insert("nombre".to_string(), b.perfil.nombre_completo.clone());
                        fila.insert("cedula".to_string(), b.perfil.numero_documento.clone());
                        fila.insert("telefono".to_string(), b.perfil.numero_celular.clone());
                        fila.insert(
                            "email".to_string(),
                            b.perfil.correo_electronico.clone().unwrap_or_default(),
                        );
                    }
                    fila.insert("tipo_participacion".to_string(), "Beneficiario".to_string());
                }
            }
            fila.insert("asistio".to_string(), si_no(asistencia.asistio));
            fila.insert("observaciones".to_string(), asistencia.observaciones.clone().unwrap_or_default());
            fila
        })
        .collect()
}

/// Resolves `columnas=a,b` against the known roster columns.
pub fn columnas_solicitadas(columnas: Option<&str>, filas: &[Fila]) -> Result<Vec<String>, ServiceError> {
    let Some(texto) = no_vacio(columnas) else {
        return Ok(seleccionar_columnas(&COLUMNAS_ASISTENCIA, filas));
    };
    let pedidas = lista_separada_por_comas(texto);
    let desconocidas: Vec<&str> = pedidas
        .iter()
        .map(String::as_str)
        .filter(|c| !COLUMNAS_ASISTENCIA.contains(c))
        .collect();
    if !desconocidas.is_empty() {
        return Err(ServiceError::campo(
            "columnas",
            format!("Columnas desconocidas: {}. Disponibles: {}", desconocidas.join(", "), COLUMNAS_ASISTENCIA.join(", ")),
        ));
    }
    if pedidas.is_empty() {
        return Ok(seleccionar_columnas(&COLUMNAS_ASISTENCIA, filas));
    }
    let mut unicas: Vec<String> = Vec::with_capacity(pedidas.len());
    for columna in pedidas {
        if !unicas.contains(&columna) {
            unicas.push(columna);
        }
    }
    Ok(unicas)
}

fn hoja_resumen(actividad: &Actividad) -> HojaExcel {
    let pares = [
        ("Tema", actividad.tema.clone()),
        ("Objetivo", actividad.objetivo.clone()),
        ("Lugar", actividad.lugar.clone()),
        ("Dependencia", actividad.dependencia.clone()),
        ("Fecha", a_dia(&actividad.fecha)),
        ("Hora inicio", actividad.hora_inicio.clone()),
        ("Hora fin", actividad.hora_fin.clone()),
        ("Estado", actividad.estado.as_str().to_string()),
        ("Total asistentes", actividad.asistentes.len().to_string()),
        ("Asistieron", actividad.asistentes.iter().filter(|a| a.asistio).count().to_string()),
    ];
    HojaExcel {
        nombre: "Actividad".to_string(),
        columnas: vec!["Campo".to_string(), "Valor".to_string()],
        filas: pares.into_iter().map(|(campo, valor)| vec![campo.to_string(), valor]).collect(),
    }
}

#[async_trait]
impl ActividadService for ActividadServiceImpl {
    #[instrument(skip(self, req))]
    async fn crear(&self, req: CrearActividadRequest) -> Result<Actividad, ServiceError> {
        let actividad = req.a_actividad(DateTime::now()).map_err(ServiceError::Validation)?;
        info!(tema = %actividad.tema, "Creating activity");
        Ok(self.actividad_repo.crear(actividad).await?)
    }

    #[instrument(skip(self))]
    async fn listar(&self, query: ListarActividadesQuery) -> Result<(Vec<Actividad>, Paginacion), ServiceError> {
        let (filtro, orden) = filtro_desde_consulta(&query).map_err(ServiceError::Validation)?;
        let total = self.actividad_repo.contar(&filtro).await?;
        let paginacion = Paginacion::new(total, query.pagina, query.por_pagina);
        let actividades = self
            .actividad_repo
            .listar(&filtro, orden, paginacion.saltar(), paginacion.limite())
            .await?;
        info!("Listed {} of {} activities", actividades.len(), total);
        Ok((actividades, paginacion))
    }

    #[instrument(skip(self))]
    async fn obtener(&self, id: &str) -> Result<Actividad, ServiceError> {
        let id = parsear_id(id)?;
        Ok(self.actividad_repo.obtener_por_id(id).await?)
    }

    #[instrument(skip(self, req))]
    async fn actualizar(
        &self,
        id: &str,
        req: ActualizarActividadRequest,
        actor: &Actor,
    ) -> Result<Actividad, ServiceError> {
        let id = parsear_id(id)?;
        let mut cambios = req.a_cambios().map_err(ServiceError::Validation)?;
        cambios.actualizado_por = Some(actor.id().to_string());
        cambios.fecha_actualizacion = Some(DateTime::now());
        let actividad = self.actividad_repo.actualizar(id, &cambios).await?;
        info!("Activity {} updated by {}", id, actor.id());
        Ok(actividad)
    }

    #[instrument(skip(self))]
    async fn eliminar(&self, id: &str) -> Result<(), ServiceError> {
        let id = parsear_id(id)?;
        self.actividad_repo.eliminar(id).await?;
        Ok(())
    }

    #[instrument(skip(self, req))]
    async fn guardar_asistencia(
        &self,
        id: &str,
        req: GuardarAsistenciaRequest,
        actor: &Actor,
    ) -> Result<usize, ServiceError> {
        let id = parsear_id(id)?;
        let asistentes = req.a_asistencias().map_err(|errores| {
            warn!("Roster for activity {} rejected with {} error(s)", id, errores.len());
            ServiceError::Validation(errores)
        })?;
        self.actividad_repo
            .reemplazar_asistentes(id, &asistentes, actor.id(), DateTime::now())
            .await?;
        info!("Saved {} roster entries for activity {}", asistentes.len(), id);
        Ok(asistentes.len())
    }

    #[instrument(skip(self))]
    async fn obtener_asistencia(&self, id: &str) -> Result<Vec<Asistencia>, ServiceError> {
        let id = parsear_id(id)?;
        Ok(self.actividad_repo.obtener_por_id(id).await?.asistentes)
    }

    #[instrument(skip(self))]
    async fn exportar_asistencia(
        &self,
        id: &str,
        columnas: Option<&str>,
        con_resumen: bool,
    ) -> Result<Option<Archivo>, ServiceError> {
        let oid = parsear_id(id)?;
        let actividad = self.actividad_repo.obtener_por_id(oid).await?;
        if actividad.asistentes.is_empty() {
            info!("Activity {} has no roster to export", oid);
            return Ok(None);
        }

        let beneficiarios = self.beneficiarios_de(&actividad.asistentes).await?;
        let filas = filas_asistencia(&actividad.asistentes, &beneficiarios);
        let columnas = columnas_solicitadas(columnas, &filas)?;

        let mut hojas = Vec::with_capacity(2);
        if con_resumen {
            hojas.push(hoja_resumen(&actividad));
        }
        hojas.push(HojaExcel::desde_filas("Asistentes", columnas, &filas));

        let contenido = generar_xlsx(&hojas).map_err(|e| {
            error!("Could not render roster workbook for {}: {}", oid, e);
            ServiceError::InternalError(e.to_string())
        })?;
        Ok(Some(Archivo { nombre: nombre_archivo(&format!("asistentes_{}", oid)), contenido }))
    }
}
