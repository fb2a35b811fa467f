use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::{AdminUserConfig, AppConfig, ConfigError, JwtConfig, MongoConfig};
use crate::middlewares::auth_middleware::AuthState;
use crate::repository::actividad_repo::MongoActividadRepository;
use crate::repository::asistente_repo::MongoAsistenteRepository;
use crate::repository::beneficiario_repo::MongoBeneficiarioRepository;
use crate::repository::funcionario_repo::MongoFuncionarioRepository;
use crate::repository::linea_trabajo_repo::MongoLineaTrabajoRepository;
use crate::repository::mongo::MongoContext;
use crate::router::actividad_router::actividad_router;
use crate::router::asistente_router::asistente_router;
use crate::router::auth_router::auth_router;
use crate::router::beneficiario_router::beneficiario_router;
use crate::router::linea_trabajo_router::linea_trabajo_router;
use crate::service::actividad_service::ActividadServiceImpl;
use crate::service::asistente_service::AsistenteServiceImpl;
use crate::service::auth_service::{AuthService, AuthServiceImpl};
use crate::service::beneficiario_service::BeneficiarioServiceImpl;
use crate::service::linea_trabajo_service::LineaTrabajoServiceImpl;
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid listen address: {0}")]
    Address(String),
}

/// Every service the HTTP surface needs, already wired to its repositories.
#[derive(Clone)]
pub struct Servicios {
    pub actividad: Arc<ActividadServiceImpl>,
    pub asistente: Arc<AsistenteServiceImpl>,
    pub beneficiario: Arc<BeneficiarioServiceImpl>,
    pub auth: Arc<AuthServiceImpl>,
    pub linea_trabajo: Arc<LineaTrabajoServiceImpl>,
}

impl Servicios {
    pub fn desde_mongo(contexto: &MongoContext, jwt_utils: Arc<dyn JwtTokenUtils>) -> Self {
        let actividad_repo = Arc::new(MongoActividadRepository::new(contexto));
        let asistente_repo = Arc::new(MongoAsistenteRepository::new(contexto));
        let beneficiario_repo = Arc::new(MongoBeneficiarioRepository::new(contexto));
        let funcionario_repo = Arc::new(MongoFuncionarioRepository::new(contexto));
        let linea_repo = Arc::new(MongoLineaTrabajoRepository::new(contexto));

        Servicios {
            actividad: Arc::new(ActividadServiceImpl::new(actividad_repo.clone(), beneficiario_repo.clone())),
            asistente: Arc::new(AsistenteServiceImpl::new(asistente_repo, actividad_repo)),
            beneficiario: Arc::new(BeneficiarioServiceImpl::new(beneficiario_repo, linea_repo.clone())),
            auth: Arc::new(AuthServiceImpl::new(funcionario_repo, linea_repo.clone(), jwt_utils)),
            linea_trabajo: Arc::new(LineaTrabajoServiceImpl::new(linea_repo)),
        }
    }
}

/// Full router: every surface, `/health`, CORS and request tracing.
pub fn crear_router(servicios: &Servicios, auth_state: Arc<AuthState>, cors_origins: &[String]) -> Router {
    Router::new()
        .merge(actividad_router(servicios.actividad.clone(), auth_state.clone()))
        .merge(asistente_router(servicios.asistente.clone(), auth_state.clone()))
        .merge(auth_router(servicios.auth.clone(), auth_state.clone()))
        .merge(beneficiario_router(servicios.beneficiario.clone(), auth_state))
        .merge(linea_trabajo_router(servicios.linea_trabajo.clone()))
        .route("/health", get(|| async { "OK" }))
        .layer(cors(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return base.allow_origin(Any);
    }
    let permitidos: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(valor) => Some(valor),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    base.allow_origin(permitidos)
}

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Result<Self, AppError> {
        let config = AppConfig::from_env()?;
        let jwt_config = JwtConfig::from_env()?;
        let mongo_config = MongoConfig::from_env()?;

        let contexto = MongoContext::connect(&mongo_config).await?;
        match contexto.ping().await {
            Ok(()) => info!("MongoDB reachable"),
            Err(e) => warn!("MongoDB ping failed, continuing: {}", e),
        }
        if let Err(e) = contexto.asegurar_indices().await {
            warn!("Unique indexes not ensured: {}", e);
        }

        let jwt_utils: Arc<dyn JwtTokenUtils> = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let servicios = Servicios::desde_mongo(&contexto, jwt_utils.clone());
        let auth_state = Arc::new(AuthState::new(jwt_utils, config.allow_anonymous_writes));
        if config.allow_anonymous_writes {
            info!("Anonymous requests on activities and attendees are attributed to 'sistema'");
        }

        crear_primer_admin(servicios.auth.as_ref()).await;

        let router = crear_router(&servicios, auth_state, &config.cors_origins);
        Ok(App { config, router })
    }

    pub async fn start(self) -> Result<(), AppError> {
        let ip = self
            .config
            .host
            .parse()
            .map_err(|_| AppError::Address(self.config.host.clone()))?;
        let addr = SocketAddr::new(ip, self.config.port);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("🚀 Server running at http://{}", addr);
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

async fn crear_primer_admin(auth: &dyn AuthService) {
    let admin_conf = match AdminUserConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            warn!("Admin account not provisioned: {}", e);
            return;
        }
    };
    match auth.asegurar_admin(&admin_conf).await {
        Ok(true) => info!("First admin account created for {}", admin_conf.email),
        Ok(false) => info!("Admin account already exists, skipping creation"),
        Err(e) => error!("Failed to provision admin account: {}", e),
    }
}
