//! In-memory repositories and request helpers shared by the HTTP tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use bson::{oid::ObjectId, DateTime, Document};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tower::ServiceExt;

use redinclusion_backend::app::app::{crear_router, Servicios};
use redinclusion_backend::config::JwtConfig;
use redinclusion_backend::middlewares::auth_middleware::AuthState;
use redinclusion_backend::model::actividad::{Actividad, Asistencia, CambiosActividad, Participante};
use redinclusion_backend::model::asistente::Asistente;
use redinclusion_backend::model::beneficiario::{Beneficiario, ConteoMes, PoblacionesVulnerables};
use redinclusion_backend::model::funcionario::{Funcionario, Rol};
use redinclusion_backend::model::linea_trabajo::LineaTrabajo;
use redinclusion_backend::repository::actividad_repo::{ActividadRepository, FiltroActividades, OrdenActividades};
use redinclusion_backend::repository::asistente_repo::AsistenteRepository;
use redinclusion_backend::repository::beneficiario_repo::{BeneficiarioRepository, FiltroBeneficiarios};
use redinclusion_backend::repository::funcionario_repo::FuncionarioRepository;
use redinclusion_backend::repository::linea_trabajo_repo::LineaTrabajoRepository;
use redinclusion_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use redinclusion_backend::service::actividad_service::ActividadServiceImpl;
use redinclusion_backend::service::asistente_service::AsistenteServiceImpl;
use redinclusion_backend::service::auth_service::AuthServiceImpl;
use redinclusion_backend::service::beneficiario_service::BeneficiarioServiceImpl;
use redinclusion_backend::service::linea_trabajo_service::LineaTrabajoServiceImpl;
use redinclusion_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use redinclusion_backend::util::password::{PasswordUtils, PasswordUtilsImpl};

pub const PASSWORD_ADMIN: &str = "ClaveAdmin2024";
pub const PASSWORD_FUNCIONARIO: &str = "ClaveFuncionario2024";

/// `$set` semantics over a serializable record.
fn fusionar<T: Serialize + DeserializeOwned>(actual: &T, cambios: Document) -> RepositoryResult<T> {
    let mut documento = bson::to_document(actual)?;
    documento.extend(cambios);
    Ok(bson::from_document(documento)?)
}

fn no_encontrado(que: &str, id: ObjectId) -> RepositoryError {
    RepositoryError::NotFound(format!("{} {} no encontrado", que, id))
}

fn contiene(texto: &str, patron: &str) -> bool {
    texto.to_lowercase().contains(&patron.to_lowercase())
}

fn en_rango(fecha: DateTime, desde: Option<DateTime>, hasta: Option<DateTime>) -> bool {
    desde.map(|d| fecha >= d).unwrap_or(true) && hasta.map(|h| fecha <= h).unwrap_or(true)
}

#[derive(Default)]
pub struct ActividadesEnMemoria {
    pub datos: Mutex<Vec<Actividad>>,
}

impl ActividadesEnMemoria {
    fn coincide(a: &Actividad, f: &FiltroActividades) -> bool {
        let igual = |esperado: &Option<String>, valor: &str| esperado.as_deref().map(|e| e == valor).unwrap_or(true);
        igual(&f.linea_trabajo_id, &a.linea_trabajo_id)
            && igual(&f.funcionario_id, &a.funcionario_id)
            && igual(&f.creado_por, &a.creado_por)
            && f.estado.map(|e| e == a.estado).unwrap_or(true)
            && en_rango(a.fecha, f.desde, f.hasta)
            && f.busqueda
                .as_deref()
                .map(|b| [&a.tema, &a.lugar, &a.dependencia, &a.objetivo].iter().any(|c| contiene(c, b)))
                .unwrap_or(true)
    }
}

#[async_trait]
impl ActividadRepository for ActividadesEnMemoria {
    async fn crear(&self, mut actividad: Actividad) -> RepositoryResult<Actividad> {
        actividad.id = Some(ObjectId::new());
        self.datos.lock().unwrap().push(actividad.clone());
        Ok(actividad)
    }

    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<Actividad> {
        self.datos
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == Some(id))
            .cloned()
            .ok_or_else(|| no_encontrado("Actividad", id))
    }

    async fn listar(
        &self,
        filtro: &FiltroActividades,
        orden: OrdenActividades,
        saltar: u64,
        limite: i64,
    ) -> RepositoryResult<Vec<Actividad>> {
        let mut encontradas: Vec<Actividad> =
            self.datos.lock().unwrap().iter().filter(|a| Self::coincide(a, filtro)).cloned().collect();
        encontradas.sort_by(|x, y| {
            let base = match orden.campo {
                "tema" => x.tema.cmp(&y.tema),
                "lugar" => x.lugar.cmp(&y.lugar),
                _ => x.fecha.cmp(&y.fecha),
            }
            .then_with(|| x.id.cmp(&y.id));
            if orden.ascendente {
                base
            } else {
                base.reverse()
            }
        });
        Ok(encontradas.into_iter().skip(saltar as usize).take(limite as usize).collect())
    }

    async fn contar(&self, filtro: &FiltroActividades) -> RepositoryResult<u64> {
        Ok(self.datos.lock().unwrap().iter().filter(|a| Self::coincide(a, filtro)).count() as u64)
    }

    async fn actualizar(&self, id: ObjectId, cambios: &CambiosActividad) -> RepositoryResult<Actividad> {
        let cambios = bson::to_document(cambios)?;
        let mut datos = self.datos.lock().unwrap();
        let actual = datos.iter_mut().find(|a| a.id == Some(id)).ok_or_else(|| no_encontrado("Actividad", id))?;
        *actual = fusionar(actual, cambios)?;
        Ok(actual.clone())
    }

    async fn eliminar(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut datos = self.datos.lock().unwrap();
        let antes = datos.len();
        datos.retain(|a| a.id != Some(id));
        if datos.len() == antes {
            return Err(no_encontrado("Actividad", id));
        }
        Ok(())
    }

    async fn reemplazar_asistentes(
        &self,
        id: ObjectId,
        asistentes: &[Asistencia],
        actualizado_por: &str,
        ahora: DateTime,
    ) -> RepositoryResult<()> {
        let mut datos = self.datos.lock().unwrap();
        let actual = datos.iter_mut().find(|a| a.id == Some(id)).ok_or_else(|| no_encontrado("Actividad", id))?;
        actual.asistentes = asistentes.to_vec();
        actual.actualizado_por = Some(actualizado_por.to_string());
        actual.fecha_actualizacion = Some(ahora);
        Ok(())
    }

    async fn existe_asistente_referenciado(&self, asistente_id: ObjectId) -> RepositoryResult<bool> {
        let hex = asistente_id.to_hex();
        Ok(self.datos.lock().unwrap().iter().any(|a| {
            a.asistentes.iter().any(|entrada| match &entrada.participante {
                Participante::Funcionario(f) => f.asistente_id.as_deref() == Some(hex.as_str()),
                Participante::Beneficiario { .. } => false,
            })
        }))
    }
}

#[derive(Default)]
pub struct AsistentesEnMemoria {
    pub datos: Mutex<Vec<Asistente>>,
}

#[async_trait]
impl AsistenteRepository for AsistentesEnMemoria {
    async fn crear(&self, mut asistente: Asistente) -> RepositoryResult<Asistente> {
        asistente.id = Some(ObjectId::new());
        self.datos.lock().unwrap().push(asistente.clone());
        Ok(asistente)
    }

    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<Asistente> {
        self.datos
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == Some(id))
            .cloned()
            .ok_or_else(|| no_encontrado("Asistente", id))
    }

    async fn listar(&self, tipo: Option<&str>) -> RepositoryResult<Vec<Asistente>> {
        let mut lista: Vec<Asistente> = self
            .datos
            .lock()
            .unwrap()
            .iter()
            .filter(|a| tipo.map(|t| a.tipo == t).unwrap_or(true))
            .cloned()
            .collect();
        lista.sort_by(|x, y| x.nombre.cmp(&y.nombre).then_with(|| x.id.cmp(&y.id)));
        Ok(lista)
    }

    async fn existe_con(&self, campo: &str, valor: &str, excluir: Option<ObjectId>) -> RepositoryResult<bool> {
        Ok(self.datos.lock().unwrap().iter().any(|a| {
            let actual = match campo {
                "cedula" => a.cedula.as_str(),
                "email" => a.email.as_str(),
                _ => return false,
            };
            actual == valor && (excluir.is_none() || a.id != excluir)
        }))
    }

    async fn actualizar(&self, id: ObjectId, cambios: Document) -> RepositoryResult<Asistente> {
        let mut datos = self.datos.lock().unwrap();
        let actual = datos.iter_mut().find(|a| a.id == Some(id)).ok_or_else(|| no_encontrado("Asistente", id))?;
        *actual = fusionar(actual, cambios)?;
        Ok(actual.clone())
    }

    async fn eliminar(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut datos = self.datos.lock().unwrap();
        let antes = datos.len();
        datos.retain(|a| a.id != Some(id));
        if datos.len() == antes {
            return Err(no_encontrado("Asistente", id));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct BeneficiariosEnMemoria {
    pub datos: Mutex<Vec<Beneficiario>>,
}

impl BeneficiariosEnMemoria {
    fn coincide(b: &Beneficiario, f: &FiltroBeneficiarios) -> bool {
        let texto_ok = match f.texto.as_deref() {
            None => true,
            Some(texto) => {
                let documento = bson::to_document(&b.perfil).unwrap_or_default();
                f.campos_texto
                    .iter()
                    .any(|campo| documento.get_str(*campo).map(|v| contiene(v, texto)).unwrap_or(false))
            }
        };
        texto_ok
            && f.linea_trabajo.as_deref().map(|l| l == b.perfil.linea_trabajo).unwrap_or(true)
            && en_rango(b.fecha_registro, f.desde, f.hasta)
    }

    fn filtrados(&self, f: &FiltroBeneficiarios) -> Vec<Beneficiario> {
        let mut lista: Vec<Beneficiario> =
            self.datos.lock().unwrap().iter().filter(|b| Self::coincide(b, f)).cloned().collect();
        lista.sort_by(|x, y| y.fecha_registro.cmp(&x.fecha_registro).then_with(|| y.id.cmp(&x.id)));
        lista
    }

    fn de_linea(&self, linea_trabajo: Option<&str>) -> Vec<Beneficiario> {
        self.datos
            .lock()
            .unwrap()
            .iter()
            .filter(|b| linea_trabajo.map(|l| b.perfil.linea_trabajo == l).unwrap_or(true))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BeneficiarioRepository for BeneficiariosEnMemoria {
    async fn crear(&self, mut beneficiario: Beneficiario) -> RepositoryResult<Beneficiario> {
        beneficiario.id = Some(ObjectId::new());
        self.datos.lock().unwrap().push(beneficiario.clone());
        Ok(beneficiario)
    }

    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<Beneficiario> {
        self.datos
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == Some(id))
            .cloned()
            .ok_or_else(|| no_encontrado("Beneficiario", id))
    }

    async fn listar(&self, filtro: &FiltroBeneficiarios, saltar: u64, limite: i64) -> RepositoryResult<Vec<Beneficiario>> {
        Ok(self.filtrados(filtro).into_iter().skip(saltar as usize).take(limite as usize).collect())
    }

    async fn listar_todos(&self, filtro: &FiltroBeneficiarios) -> RepositoryResult<Vec<Beneficiario>> {
        Ok(self.filtrados(filtro))
    }

    async fn contar(&self, filtro: &FiltroBeneficiarios) -> RepositoryResult<u64> {
        Ok(self.filtrados(filtro).len() as u64)
    }

    async fn buscar_por_documento(&self, numero_documento: &str) -> RepositoryResult<Option<Beneficiario>> {
        Ok(self.datos.lock().unwrap().iter().find(|b| b.perfil.numero_documento == numero_documento).cloned())
    }

    async fn buscar_por_correo(&self, correo: &str) -> RepositoryResult<Option<Beneficiario>> {
        Ok(self
            .datos
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.perfil.correo_electronico.as_deref() == Some(correo))
            .cloned())
    }

    async fn actualizar(&self, id: ObjectId, cambios: Document) -> RepositoryResult<Beneficiario> {
        let mut datos = self.datos.lock().unwrap();
        let actual = datos.iter_mut().find(|b| b.id == Some(id)).ok_or_else(|| no_encontrado("Beneficiario", id))?;
        *actual = fusionar(actual, cambios)?;
        Ok(actual.clone())
    }

    async fn eliminar(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut datos = self.datos.lock().unwrap();
        let antes = datos.len();
        datos.retain(|b| b.id != Some(id));
        if datos.len() == antes {
            return Err(no_encontrado("Beneficiario", id));
        }
        Ok(())
    }

    async fn conteo_por_mes(&self, linea_trabajo: Option<&str>) -> RepositoryResult<Vec<ConteoMes>> {
        let mut meses: Vec<ConteoMes> = Vec::new();
        for b in self.de_linea(linea_trabajo) {
            let mes = b.fecha_registro.to_chrono().format("%Y-%m").to_string();
            match meses.iter_mut().find(|m| m.mes == mes) {
                Some(m) => m.cantidad += 1,
                None => meses.push(ConteoMes { mes, cantidad: 1 }),
            }
        }
        meses.sort_by(|a, b| a.mes.cmp(&b.mes));
        Ok(meses)
    }

    async fn poblaciones_vulnerables(&self, linea_trabajo: Option<&str>) -> RepositoryResult<PoblacionesVulnerables> {
        let lista = self.de_linea(linea_trabajo);
        let contar = |f: fn(&Beneficiario) -> bool| lista.iter().filter(|b| f(b)).count() as u64;
        Ok(PoblacionesVulnerables {
            discapacidad: contar(|b| b.perfil.tiene_discapacidad == Some(true)),
            victimas_conflicto: contar(|b| b.perfil.victima_conflicto == Some(true)),
            jovenes: contar(|b| b.perfil.rango_edad == "18-28"),
            adultos_mayores: contar(|b| b.perfil.rango_edad == "60+"),
        })
    }
}

#[derive(Default)]
pub struct FuncionariosEnMemoria {
    pub datos: Mutex<Vec<Funcionario>>,
}

#[async_trait]
impl FuncionarioRepository for FuncionariosEnMemoria {
    async fn crear(&self, mut funcionario: Funcionario) -> RepositoryResult<Funcionario> {
        let mut datos = self.datos.lock().unwrap();
        if datos.iter().any(|f| f.email == funcionario.email) {
            return Err(RepositoryError::AlreadyExists(format!("email {}", funcionario.email)));
        }
        funcionario.id = Some(ObjectId::new());
        datos.push(funcionario.clone());
        Ok(funcionario)
    }

    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<Funcionario> {
        self.datos
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == Some(id))
            .cloned()
            .ok_or_else(|| no_encontrado("Funcionario", id))
    }

    async fn buscar_por_email(&self, email: &str) -> RepositoryResult<Option<Funcionario>> {
        let email = email.trim().to_lowercase();
        Ok(self.datos.lock().unwrap().iter().find(|f| f.email == email).cloned())
    }
}

#[derive(Default)]
pub struct LineasEnMemoria {
    pub datos: Mutex<Vec<LineaTrabajo>>,
}

#[async_trait]
impl LineaTrabajoRepository for LineasEnMemoria {
    async fn listar(&self) -> RepositoryResult<Vec<LineaTrabajo>> {
        let mut lista = self.datos.lock().unwrap().clone();
        lista.sort_by(|a, b| a.nombre.cmp(&b.nombre));
        Ok(lista)
    }

    async fn obtener_por_id(&self, id: ObjectId) -> RepositoryResult<LineaTrabajo> {
        self.datos
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("Línea de trabajo {} no encontrada", id)))
    }

    async fn buscar_por_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<LineaTrabajo>> {
        Ok(self.datos.lock().unwrap().iter().filter(|l| ids.contains(&l.id)).cloned().collect())
    }

    async fn buscar_por_nombre(&self, nombre: &str) -> RepositoryResult<Option<LineaTrabajo>> {
        let nombre = nombre.to_lowercase();
        Ok(self.datos.lock().unwrap().iter().find(|l| l.nombre.to_lowercase() == nombre).cloned())
    }
}

/// Router over in-memory storage plus handles to inspect it.
pub struct Entorno {
    pub router: Router,
    pub jwt: Arc<JwtTokenUtilsImpl>,
    pub actividades: Arc<ActividadesEnMemoria>,
    pub asistentes: Arc<AsistentesEnMemoria>,
    pub beneficiarios: Arc<BeneficiariosEnMemoria>,
    pub funcionarios: Arc<FuncionariosEnMemoria>,
    pub lineas: Arc<LineasEnMemoria>,
    pub linea_id: ObjectId,
    pub admin: Funcionario,
    pub funcionario: Funcionario,
}

fn cuenta(nombre: &str, email: &str, password: &str, rol: Rol, linea: Option<ObjectId>) -> Funcionario {
    Funcionario {
        id: Some(ObjectId::new()),
        nombre: nombre.to_string(),
        email: email.to_string(),
        password_hash: PasswordUtilsImpl::hash_password(password).unwrap(),
        secretaria: "Secretaría de Inclusión".to_string(),
        linea_trabajo: linea.map(|l| l.to_hex()),
        rol,
        estado: "Activo".to_string(),
        fecha_registro: Some(DateTime::now()),
    }
}

impl Entorno {
    pub fn new(permitir_anonimo: bool) -> Self {
        let jwt = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default()));
        let actividades = Arc::new(ActividadesEnMemoria::default());
        let asistentes = Arc::new(AsistentesEnMemoria::default());
        let beneficiarios = Arc::new(BeneficiariosEnMemoria::default());
        let funcionarios = Arc::new(FuncionariosEnMemoria::default());
        let lineas = Arc::new(LineasEnMemoria::default());

        let linea_id = ObjectId::new();
        lineas.datos.lock().unwrap().push(LineaTrabajo {
            id: linea_id,
            nombre: "Discapacidad".to_string(),
            descripcion: Some("Atención a personas con discapacidad".to_string()),
        });

        let admin = cuenta("Administrador", "admin@redinclusion.com", PASSWORD_ADMIN, Rol::Admin, None);
        let funcionario =
            cuenta("Laura Gómez", "laura@redinclusion.com", PASSWORD_FUNCIONARIO, Rol::Funcionario, Some(linea_id));
        funcionarios.datos.lock().unwrap().extend([admin.clone(), funcionario.clone()]);

        let jwt_dyn: Arc<dyn JwtTokenUtils> = jwt.clone();
        let servicios = Servicios {
            actividad: Arc::new(ActividadServiceImpl::new(actividades.clone(), beneficiarios.clone())),
            asistente: Arc::new(AsistenteServiceImpl::new(asistentes.clone(), actividades.clone())),
            beneficiario: Arc::new(BeneficiarioServiceImpl::new(beneficiarios.clone(), lineas.clone())),
            auth: Arc::new(AuthServiceImpl::new(funcionarios.clone(), lineas.clone(), jwt_dyn.clone())),
            linea_trabajo: Arc::new(LineaTrabajoServiceImpl::new(lineas.clone())),
        };
        let auth_state = Arc::new(AuthState::new(jwt_dyn, permitir_anonimo));
        let router = crear_router(&servicios, auth_state, &[]);

        Entorno { router, jwt, actividades, asistentes, beneficiarios, funcionarios, lineas, linea_id, admin, funcionario }
    }

    fn token_de(&self, f: &Funcionario) -> String {
        let id = f.id.map(|i| i.to_hex()).unwrap_or_default();
        self.jwt.generate_access_token(&id, &f.email, f.rol.as_str()).unwrap()
    }

    pub fn token_admin(&self) -> String {
        self.token_de(&self.admin)
    }

    pub fn token_funcionario(&self) -> String {
        self.token_de(&self.funcionario)
    }

    pub async fn crudo(
        &self,
        metodo: &str,
        uri: &str,
        token: Option<&str>,
        cuerpo: Option<Value>,
    ) -> (StatusCode, HeaderMap, Bytes) {
        let mut req = Request::builder().method(metodo).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match cuerpo {
            Some(valor) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(valor.to_string())
            }
            None => Body::empty(),
        };
        let resp = self.router.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes)
    }

    pub async fn json(&self, metodo: &str, uri: &str, token: Option<&str>, cuerpo: Option<Value>) -> (StatusCode, Value) {
        let (status, _, bytes) = self.crudo(metodo, uri, token, cuerpo).await;
        let valor = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, valor)
    }
}

pub fn actividad_valida() -> Value {
    serde_json::json!({
        "tema": "Taller de lectura inclusiva",
        "objetivo": "Fomentar la lectura en población con discapacidad visual",
        "lugar": "Biblioteca Municipal",
        "dependencia": "Secretaría de Cultura",
        "fecha": "2024-05-10",
        "hora_inicio": "09:00",
        "hora_fin": "11:00",
        "linea_trabajo_id": "65a1b2c3d4e5f60718293a4b",
        "funcionario_id": "65a1b2c3d4e5f60718293a4c",
        "creado_por": "65a1b2c3d4e5f60718293a4c"
    })
}

pub fn asistente_valido(cedula: &str, email: &str) -> Value {
    serde_json::json!({
        "nombre": "Carlos Ruiz",
        "cedula": cedula,
        "dependencia": "Secretaría de Salud",
        "cargo": "Profesional",
        "tipo_participacion": "Asistente",
        "telefono": "3001234567",
        "email": email
    })
}

pub fn beneficiario_valido(linea_id: &ObjectId, documento: &str, correo: Option<&str>) -> Value {
    let mut cuerpo = serde_json::json!({
        "funcionario_id": "65a1b2c3d4e5f60718293a4c",
        "funcionario_nombre": "Laura Gómez",
        "linea_trabajo": linea_id.to_hex(),
        "fecha_registro": "2024-03-05",
        "nombre_completo": "María Fernanda López",
        "tipo_documento": "Cédula",
        "numero_documento": documento,
        "genero": "Femenino",
        "rango_edad": "18-28",
        "sabe_leer": true,
        "sabe_escribir": true,
        "numero_celular": "3109876543",
        "comuna": "Comuna 4",
        "barrio": "El Centro",
        "tiene_discapacidad": true,
        "victima_conflicto": false
    });
    if let Some(correo) = correo {
        cuerpo["correo_electronico"] = Value::String(correo.to_string());
    }
    cuerpo
}
