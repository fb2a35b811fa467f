use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, DateTime, Document};
use tracing::{error, info, instrument, warn};

use crate::dto::beneficiario_dto::{
    BeneficiarioRequest, BeneficiarioResponse, ExportarBeneficiariosQuery, ListarBeneficiariosQuery,
    VerificacionResponse,
};
use crate::dto::common::Archivo;
use crate::model::actor::Actor;
use crate::model::beneficiario::{Beneficiario, ConteoMes, ConteoPoblacion, EstadisticasBeneficiarios};
use crate::model::funcionario::Rol;
use crate::repository::beneficiario_repo::{
    BeneficiarioRepository, FiltroBeneficiarios, BUSQUEDA_EXPORTACION, BUSQUEDA_LISTADO,
};
use crate::repository::linea_trabajo_repo::LineaTrabajoRepository;
use crate::service::linea_trabajo_service::{nombre_o_defecto, nombres_lineas, resolver_filtro_linea};
use crate::util::error::{ErrorCampo, ServiceError};
use crate::util::excel::{generar_xlsx, nombre_archivo, si_no, HojaExcel};
use crate::util::extract::parsear_id;
use crate::util::fecha::{a_dia, fin_rango, inicio_rango};
use crate::util::pagination::Paginacion;
use crate::util::texto::no_vacio;

pub const COLUMNAS_EXPORTACION: [&str; 16] = [
    "Nombre Completo",
    "Tipo Documento",
    "Número Documento",
    "Género",
    "Rango Edad",
    "Correo Electrónico",
    "Número Celular",
    "Comuna",
    "Barrio",
    "Línea Trabajo",
    "Fecha Registro",
    "Estudia Actualmente",
    "Nivel Educativo",
    "Situación Laboral",
    "Víctima Conflicto",
    "Tiene Discapacidad",
];

const NO_REGISTRADO: &str = "No registrado";
const NO_ASIGNADO: &str = "No asignado";

#[async_trait]
pub trait BeneficiarioService: Send + Sync {
    async fn registrar(&self, req: BeneficiarioRequest, actor: &Actor) -> Result<Beneficiario, ServiceError>;
    async fn listar(
        &self,
        query: ListarBeneficiariosQuery,
    ) -> Result<(Vec<BeneficiarioResponse>, Paginacion), ServiceError>;
    async fn detalle(&self, id: &str) -> Result<BeneficiarioResponse, ServiceError>;
    async fn actualizar(&self, id: &str, req: BeneficiarioRequest) -> Result<BeneficiarioResponse, ServiceError>;
    async fn eliminar(&self, id: &str, actor: &Actor) -> Result<(), ServiceError>;
    async fn verificar_documento(&self, numero_documento: &str) -> Result<VerificacionResponse, ServiceError>;
    async fn verificar_correo(&self, correo: &str) -> Result<VerificacionResponse, ServiceError>;
    /// Global statistics, or scoped to one work line.
    async fn estadisticas(&self, linea_trabajo_id: Option<&str>) -> Result<EstadisticasBeneficiarios, ServiceError>;
    async fn conteo_por_mes(&self) -> Result<Vec<ConteoMes>, ServiceError>;
    async fn poblaciones_vulnerables(&self) -> Result<Vec<ConteoPoblacion>, ServiceError>;
    /// `None` when nothing matches.
    async fn exportar(&self, query: ExportarBeneficiariosQuery) -> Result<Option<Archivo>, ServiceError>;
}

pub struct BeneficiarioServiceImpl {
    pub beneficiario_repo: Arc<dyn BeneficiarioRepository>,
    pub linea_repo: Arc<dyn LineaTrabajoRepository>,
}

impl BeneficiarioServiceImpl {
    pub fn new(beneficiario_repo: Arc<dyn BeneficiarioRepository>, linea_repo: Arc<dyn LineaTrabajoRepository>) -> Self {
        Self { beneficiario_repo, linea_repo }
    }

    async fn respuestas(&self, beneficiarios: Vec<Beneficiario>) -> Result<Vec<BeneficiarioResponse>, ServiceError> {
        let nombres =
            nombres_lineas(self.linea_repo.as_ref(), beneficiarios.iter().map(|b| b.perfil.linea_trabajo.as_str()))
                .await?;
        Ok(beneficiarios
            .into_iter()
            .map(|b| {
                let nombre = nombre_o_defecto(&nombres, &b.perfil.linea_trabajo);
                BeneficiarioResponse::new(b, nombre)
            })
            .collect())
    }

    /// Document/e-mail already used by a beneficiary other than `propio`.
    async fn duplicados(
        &self,
        numero_documento: Option<&str>,
        correo: Option<&str>,
        propio: Option<ObjectId>,
    ) -> Result<Vec<ErrorCampo>, ServiceError> {
        let ajeno = |b: &Beneficiario| propio.is_none() || b.id != propio;
        let mut errores = Vec::new();
        if let Some(numero) = no_vacio(numero_documento) {
            if let Some(existente) = self.beneficiario_repo.buscar_por_documento(numero).await? {
                if ajeno(&existente) {
                    errores.push(ErrorCampo::new("numero_documento", "Ya existe un beneficiario con este número de documento"));
                }
            }
        }
        if let Some(correo) = no_vacio(correo) {
            if let Some(existente) = self.beneficiario_repo.buscar_por_correo(correo).await? {
                if ajeno(&existente) {
                    errores.push(ErrorCampo::new("correo_electronico", "Ya existe un beneficiario con este correo electrónico"));
                }
            }
        }
        Ok(errores)
    }
}

fn rango_fechas(
    errores: &mut Vec<ErrorCampo>,
    fecha_inicio: Option<&str>,
    fecha_fin: Option<&str>,
) -> (Option<DateTime>, Option<DateTime>) {
    let mut convertir = |campo: &str, valor: Option<&str>, f: fn(&str) -> Option<DateTime>| {
        no_vacio(valor).and_then(|texto| {
            let fecha = f(texto);
            if fecha.is_none() {
                errores.push(ErrorCampo::new(campo, "Fecha no válida"));
            }
            fecha
        })
    };
    let desde = convertir("fecha_inicio", fecha_inicio, inicio_rango);
    let hasta = convertir("fecha_fin", fecha_fin, fin_rango);
    (desde, hasta)
}

/// Export filter: optional text AND optional date range.
pub fn filtro_exportacion(query: &ExportarBeneficiariosQuery) -> Result<FiltroBeneficiarios, Vec<ErrorCampo>> {
    let mut errores = Vec::new();
    let por_rango = no_vacio(query.tipo_exportacion.as_deref()) == Some("rango");
    if por_rango {
        if no_vacio(query.fecha_inicio.as_deref()).is_none() {
            errores.push(ErrorCampo::new("fecha_inicio", "Requerida para exportar por rango"));
        }
        if no_vacio(query.fecha_fin.as_deref()).is_none() {
            errores.push(ErrorCampo::new("fecha_fin", "Requerida para exportar por rango"));
        }
    }
    let (desde, hasta) = rango_fechas(&mut errores, query.fecha_inicio.as_deref(), query.fecha_fin.as_deref());
    if !errores.is_empty() {
        return Err(errores);
    }
    Ok(FiltroBeneficiarios {
        texto: no_vacio(query.filtro.as_deref()).map(str::to_string),
        campos_texto: &BUSQUEDA_EXPORTACION,
        linea_trabajo: None,
        desde,
        hasta,
    })
}

/// One export row, in [`COLUMNAS_EXPORTACION`] order.
pub fn fila_exportacion(b: &Beneficiario, nombres_lineas: &HashMap<String, String>) -> Vec<String> {
    let p = &b.perfil;
    let o_defecto = |valor: &Option<String>, defecto: &str| {
        no_vacio(valor.as_deref()).unwrap_or(defecto).to_string()
    };
    vec![
        p.nombre_completo.clone(),
        p.tipo_documento.clone(),
        p.numero_documento.clone(),
        p.genero.clone(),
        p.rango_edad.clone(),
        o_defecto(&p.correo_electronico, NO_REGISTRADO),
        no_vacio(Some(p.numero_celular.as_str())).unwrap_or(NO_REGISTRADO).to_string(),
        p.comuna.clone(),
        p.barrio.clone(),
        nombres_lineas.get(p.linea_trabajo.trim()).cloned().unwrap_or_else(|| NO_ASIGNADO.to_string()),
        a_dia(&b.fecha_registro),
        si_no(p.estudia_actualmente.unwrap_or(false)),
        p.nivel_educativo.clone().unwrap_or_default(),
        p.situacion_laboral.clone().unwrap_or_default(),
        si_no(p.victima_conflicto.unwrap_or(false)),
        si_no(p.tiene_discapacidad.unwrap_or(false)),
    ]
}

fn texto_de(cambios: &Document, campo: &str) -> Option<String> {
    match cambios.get(campo) {
        Some(Bson::String(valor)) => Some(valor.clone()),
        _ => None,
    }
}

#[async_trait]
impl BeneficiarioService for BeneficiarioServiceImpl {
    #[instrument(skip(self, req))]
    async fn registrar(&self, req: BeneficiarioRequest, actor: &Actor) -> Result<Beneficiario, ServiceError> {
        if actor.rol() != Some(Rol::Funcionario.as_str()) {
            warn!("Beneficiary registration refused for actor {}", actor.id());
            return Err(ServiceError::Forbidden("Solo los funcionarios pueden registrar beneficiarios".to_string()));
        }
        let beneficiario = req.a_beneficiario().map_err(ServiceError::Validation)?;
        let duplicados = self
            .duplicados(
                Some(&beneficiario.perfil.numero_documento),
                beneficiario.perfil.correo_electronico.as_deref(),
                None,
            )
            .await?;
        if !duplicados.is_empty() {
            return Err(ServiceError::Validation(duplicados));
        }
        let creado = self.beneficiario_repo.crear(beneficiario).await?;
        info!("Beneficiary {:?} registered by {}", creado.id, actor.id());
        Ok(creado)
    }

    #[instrument(skip(self))]
    async fn listar(
        &self,
        query: ListarBeneficiariosQuery,
    ) -> Result<(Vec<BeneficiarioResponse>, Paginacion), ServiceError> {
        let mut errores = Vec::new();
        let (desde, hasta) = rango_fechas(&mut errores, query.fecha_inicio.as_deref(), query.fecha_fin.as_deref());
        if !errores.is_empty() {
            return Err(ServiceError::Validation(errores));
        }
        let linea_trabajo = match no_vacio(query.linea_trabajo.as_deref()) {
            Some(valor) => Some(resolver_filtro_linea(self.linea_repo.as_ref(), valor).await?),
            None => None,
        };
        let filtro = FiltroBeneficiarios {
            texto: no_vacio(query.filtro.as_deref()).map(str::to_string),
            campos_texto: &BUSQUEDA_LISTADO,
            linea_trabajo,
            desde,
            hasta,
        };

        let total = self.beneficiario_repo.contar(&filtro).await?;
        let paginacion = Paginacion::new(total, query.pagina, query.por_pagina);
        let beneficiarios = self
            .beneficiario_repo
            .listar(&filtro, paginacion.saltar(), paginacion.limite())
            .await?;
        info!("Listed {} of {} beneficiaries", beneficiarios.len(), total);
        Ok((self.respuestas(beneficiarios).await?, paginacion))
    }

    #[instrument(skip(self))]
    async fn detalle(&self, id: &str) -> Result<BeneficiarioResponse, ServiceError> {
        let id = parsear_id(id)?;
        let beneficiario = self.beneficiario_repo.obtener_por_id(id).await?;
        let mut respuestas = self.respuestas(vec![beneficiario]).await?;
        respuestas.pop().ok_or_else(|| ServiceError::InternalError("Respuesta vacía".to_string()))
    }

    #[instrument(skip(self, req))]
    async fn actualizar(&self, id: &str, req: BeneficiarioRequest) -> Result<BeneficiarioResponse, ServiceError> {
        let id = parsear_id(id)?;
        let cambios = req.a_cambios().map_err(ServiceError::Validation)?;
        self.beneficiario_repo.obtener_por_id(id).await?;

        let documento = texto_de(&cambios, "numero_documento");
        let correo = texto_de(&cambios, "correo_electronico");
        let duplicados = self.duplicados(documento.as_deref(), correo.as_deref(), Some(id)).await?;
        if !duplicados.is_empty() {
            warn!("Update of beneficiary {} collides with another record", id);
            return Err(ServiceError::Validation(duplicados));
        }

        let actualizado = if cambios.is_empty() {
            self.beneficiario_repo.obtener_por_id(id).await?
        } else {
            self.beneficiario_repo.actualizar(id, cambios).await?
        };
        let mut respuestas = self.respuestas(vec![actualizado]).await?;
        respuestas.pop().ok_or_else(|| ServiceError::InternalError("Respuesta vacía".to_string()))
    }

    #[instrument(skip(self))]
    async fn eliminar(&self, id: &str, actor: &Actor) -> Result<(), ServiceError> {
        let permitido = matches!(actor.rol(), Some(rol) if Rol::parse(rol).is_some());
        if !permitido {
            return Err(ServiceError::Forbidden("No tiene permisos para eliminar beneficiarios".to_string()));
        }
        let id = parsear_id(id)?;
        self.beneficiario_repo.eliminar(id).await?;
        info!("Beneficiary {} deleted by {}", id, actor.id());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn verificar_documento(&self, numero_documento: &str) -> Result<VerificacionResponse, ServiceError> {
        let existe = self.beneficiario_repo.buscar_por_documento(numero_documento.trim()).await?.is_some();
        let msg = if existe { "Documento ya registrado" } else { "Documento verificado" };
        Ok(VerificacionResponse { existe, msg: msg.to_string() })
    }

    #[instrument(skip(self))]
    async fn verificar_correo(&self, correo: &str) -> Result<VerificacionResponse, ServiceError> {
        let existe = self.beneficiario_repo.buscar_por_correo(correo.trim()).await?.is_some();
        let msg = if existe { "Correo ya registrado" } else { "Correo verificado" };
        Ok(VerificacionResponse { existe, msg: msg.to_string() })
    }

    #[instrument(skip(self))]
    async fn estadisticas(&self, linea_trabajo_id: Option<&str>) -> Result<EstadisticasBeneficiarios, ServiceError> {
        let linea = match linea_trabajo_id {
            Some(id) => {
                let oid = parsear_id(id)?;
                Some(self.linea_repo.obtener_por_id(oid).await?.id.to_hex())
            }
            None => None,
        };
        let filtro = FiltroBeneficiarios { linea_trabajo: linea.clone(), ..Default::default() };
        let total = self.beneficiario_repo.contar(&filtro).await?;
        let por_mes = self.beneficiario_repo.conteo_por_mes(linea.as_deref()).await?;
        let poblaciones = self.beneficiario_repo.poblaciones_vulnerables(linea.as_deref()).await?;
        Ok(EstadisticasBeneficiarios { total, por_mes, poblaciones_vulnerables: poblaciones.a_lista() })
    }

    #[instrument(skip(self))]
    async fn conteo_por_mes(&self) -> Result<Vec<ConteoMes>, ServiceError> {
        Ok(self.beneficiario_repo.conteo_por_mes(None).await?)
    }

    #[instrument(skip(self))]
    async fn poblaciones_vulnerables(&self) -> Result<Vec<ConteoPoblacion>, ServiceError> {
        Ok(self.beneficiario_repo.poblaciones_vulnerables(None).await?.a_lista())
    }

    #[instrument(skip(self))]
    async fn exportar(&self, query: ExportarBeneficiariosQuery) -> Result<Option<Archivo>, ServiceError> {
        let filtro = filtro_exportacion(&query).map_err(ServiceError::Validation)?;
        let beneficiarios = self.beneficiario_repo.listar_todos(&filtro).await?;
        if beneficiarios.is_empty() {
            info!("No beneficiaries match the export filter");
            return Ok(None);
        }
        let nombres =
            nombres_lineas(self.linea_repo.as_ref(), beneficiarios.iter().map(|b| b.perfil.linea_trabajo.as_str()))
                .await?;
        let hoja = HojaExcel {
            nombre: "Beneficiarios".to_string(),
            columnas: COLUMNAS_EXPORTACION.iter().map(|c| c.to_string()).collect(),
            filas: beneficiarios.iter().map(|b| fila_exportacion(b, &nombres)).collect(),
        };
        let contenido = generar_xlsx(&[hoja]).map_err(|e| {
            error!("Could not render beneficiary workbook: {}", e);
            ServiceError::InternalError(e.to_string())
        })?;
        info!("Exported {} beneficiaries", beneficiarios.len());
        Ok(Some(Archivo { nombre: nombre_archivo("beneficiarios"), contenido }))
    }
}
