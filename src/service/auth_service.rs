use std::sync::Arc;

use async_trait::async_trait;
use bson::DateTime;
use tracing::{error, info, instrument, warn};

use crate::config::AdminUserConfig;
use crate::dto::auth_dto::{FuncionarioResponse, LoginResponse, RegistroRequest};
use crate::model::actor::Actor;
use crate::model::funcionario::{Funcionario, Rol};
use crate::model::linea_trabajo::SIN_LINEA_TRABAJO;
use crate::repository::funcionario_repo::FuncionarioRepository;
use crate::repository::linea_trabajo_repo::LineaTrabajoRepository;
use crate::repository::repository_error::RepositoryError;
use crate::service::linea_trabajo_service::{nombre_o_defecto, nombres_lineas};
use crate::util::error::{ErrorCampo, ServiceError};
use crate::util::extract::parsear_id;
use crate::util::jwt::{JwtTokenUtils, TokenPair};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, email: String, password: String) -> Result<LoginResponse, ServiceError>;
    async fn refresh_token(&self, refresh_token: String) -> Result<TokenPair, ServiceError>;
    async fn registrar(&self, req: RegistroRequest, actor: Option<&Actor>) -> Result<FuncionarioResponse, ServiceError>;
    async fn perfil(&self, actor: &Actor) -> Result<FuncionarioResponse, ServiceError>;
    /// Creates the configured admin account when it does not exist yet.
    async fn asegurar_admin(&self, config: &AdminUserConfig) -> Result<bool, ServiceError>;
}

pub struct AuthServiceImpl {
    pub funcionario_repo: Arc<dyn FuncionarioRepository>,
    pub linea_repo: Arc<dyn LineaTrabajoRepository>,
    pub jwt_utils: Arc<dyn JwtTokenUtils>,
}

impl AuthServiceImpl {
    pub fn new(
        funcionario_repo: Arc<dyn FuncionarioRepository>,
        linea_repo: Arc<dyn LineaTrabajoRepository>,
        jwt_utils: Arc<dyn JwtTokenUtils>,
    ) -> Self {
        Self { funcionario_repo, linea_repo, jwt_utils }
    }

    async fn respuesta(&self, funcionario: Funcionario) -> Result<FuncionarioResponse, ServiceError> {
        let nombre = match funcionario.linea_trabajo.as_deref() {
            Some(id) => {
                let nombres = nombres_lineas(self.linea_repo.as_ref(), [id]).await?;
                nombre_o_defecto(&nombres, id)
            }
            None => SIN_LINEA_TRABAJO.to_string(),
        };
        Ok(FuncionarioResponse::new(funcionario, nombre))
    }

    fn tokens_para(&self, funcionario: &Funcionario) -> Result<TokenPair, ServiceError> {
        let id = funcionario.id.map(|id| id.to_hex()).unwrap_or_default();
        self.jwt_utils
            .generate_token_pair(&id, &funcionario.email, funcionario.rol.as_str())
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))
    }

    fn hash(password: &str) -> Result<String, ServiceError> {
        PasswordUtilsImpl::hash_password(password).map_err(|e| ServiceError::InternalError(e.to_string()))
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: String, password: String) -> Result<LoginResponse, ServiceError> {
        info!("Staff login attempt");
        let funcionario = self
            .funcionario_repo
            .buscar_por_email(&email)
            .await?
            .ok_or_else(|| {
                warn!("No staff account for login email");
                ServiceError::NotFound("Funcionario no encontrado".to_string())
            })?;

        let valido = PasswordUtilsImpl::verify_password(&password, &funcionario.password_hash).map_err(|e| {
            error!("Stored hash for {} is unusable: {}", funcionario.email, e);
            ServiceError::InternalError(e.to_string())
        })?;
        if !valido {
            warn!("Invalid credentials");
            return Err(ServiceError::Unauthorized("Credenciales inválidas".to_string()));
        }

        let tokens = self.tokens_para(&funcionario)?;
        let funcionario = self.respuesta(funcionario).await?;
        info!("Staff member logged in");
        Ok(LoginResponse { token: tokens.access_token.clone(), tokens, funcionario })
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh_token(&self, refresh_token: String) -> Result<TokenPair, ServiceError> {
        let claims = self
            .jwt_utils
            .validate_refresh_token(&refresh_token)
            .map_err(|e| ServiceError::Unauthorized(format!("Token de refresco inválido: {}", e)))?;
        let id = parsear_id(&claims.sub).map_err(|_| ServiceError::Unauthorized("Token de refresco inválido".to_string()))?;
        // the account may have been removed or demoted since the token was issued
        let funcionario = match self.funcionario_repo.obtener_por_id(id).await {
            Ok(f) => f,
            Err(RepositoryError::NotFound(_)) => {
                return Err(ServiceError::Unauthorized("La cuenta ya no existe".to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        info!("Token pair refreshed for {}", claims.sub);
        self.tokens_para(&funcionario)
    }

    #[instrument(skip(self, req, actor))]
    async fn registrar(&self, req: RegistroRequest, actor: Option<&Actor>) -> Result<FuncionarioResponse, ServiceError> {
        let registro = req.a_registro().map_err(ServiceError::Validation)?;
        if registro.rol == Rol::Admin && !actor.map(Actor::es_admin).unwrap_or(false) {
            warn!("Attempt to register an admin without admin credentials");
            return Err(ServiceError::Forbidden("Solo un administrador puede registrar administradores".to_string()));
        }
        if self.funcionario_repo.buscar_por_email(&registro.email).await?.is_some() {
            return Err(ServiceError::Validation(vec![ErrorCampo::new("email", "El correo ya está registrado")]));
        }
        let hash = Self::hash(&registro.password)?;
        let creado = self.funcionario_repo.crear(registro.a_funcionario(hash, DateTime::now())).await?;
        info!("Staff account {:?} registered", creado.id);
        self.respuesta(creado).await
    }

    #[instrument(skip(self, actor))]
    async fn perfil(&self, actor: &Actor) -> Result<FuncionarioResponse, ServiceError> {
        let Actor::Funcionario(claims) = actor else {
            return Err(ServiceError::Unauthorized("Token requerido".to_string()));
        };
        let id = parsear_id(&claims.sub).map_err(|_| ServiceError::Unauthorized("Token inválido".to_string()))?;
        let funcionario = self.funcionario_repo.obtener_por_id(id).await?;
        self.respuesta(funcionario).await
    }

    #[instrument(skip(self, config), fields(email = %config.email))]
    async fn asegurar_admin(&self, config: &AdminUserConfig) -> Result<bool, ServiceError> {
        let email = config.email.trim().to_lowercase();
        if self.funcionario_repo.buscar_por_email(&email).await?.is_some() {
            info!("Admin account already present");
            return Ok(false);
        }
        let admin = Funcionario {
            id: None,
            nombre: config.nombre.clone(),
            email,
            password_hash: Self::hash(&config.password)?,
            secretaria: config.secretaria.clone(),
            linea_trabajo: None,
            rol: Rol::Admin,
            estado: "Activo".to_string(),
            fecha_registro: Some(DateTime::now()),
        };
        match self.funcionario_repo.crear(admin).await {
            Ok(_) => {
                info!("Admin account created");
                Ok(true)
            }
            Err(RepositoryError::AlreadyExists(_)) => {
                info!("Admin account created concurrently by another instance");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
