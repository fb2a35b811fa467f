mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{Entorno, PASSWORD_FUNCIONARIO};
use redinclusion_backend::config::AdminUserConfig;
use redinclusion_backend::service::auth_service::{AuthService, AuthServiceImpl};
use redinclusion_backend::util::jwt::JwtTokenUtils;

#[tokio::test]
async fn test_login_returns_tokens_and_profile() {
    let entorno = Entorno::new(true);
    let (status, body) = entorno
        .json(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "LAURA@redinclusion.com", "password": PASSWORD_FUNCIONARIO })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let data = &body["data"];
    let token = data["token"].as_str().unwrap();
    assert_eq!(data["access_token"], token);
    assert!(data["refresh_token"].is_string());
    assert_eq!(data["funcionario"]["rol"], "funcionario");
    assert_eq!(data["funcionario"]["linea_trabajo"], "Discapacidad");
    assert_eq!(data["funcionario"]["linea_trabajo_id"], entorno.linea_id.to_hex());

    let claims = entorno.jwt.validate_access_token(token).unwrap();
    assert_eq!(claims.sub, entorno.funcionario.id.unwrap().to_hex());
    assert_eq!(claims.role, "funcionario");
    assert!(!claims.jti.is_empty());
}

#[tokio::test]
async fn test_login_failures() {
    let entorno = Entorno::new(true);
    let (status, body) = entorno
        .json("POST", "/api/auth/login", None, Some(json!({ "email": "laura@redinclusion.com", "password": "otra" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("data").is_none());

    let (status, _) = entorno
        .json("POST", "/api/auth/login", None, Some(json!({ "email": "nadie@redinclusion.com", "password": "x" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) =
        entorno.json("POST", "/api/auth/login", None, Some(json!({ "email": "no-es-correo", "password": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let entorno = Entorno::new(true);
    let id = entorno.funcionario.id.unwrap().to_hex();
    let refresh = entorno.jwt.generate_refresh_token(&id, &entorno.funcionario.email, "funcionario").unwrap();

    let (status, body) = entorno.json("POST", "/api/auth/refresh", None, Some(json!({ "refresh_token": refresh }))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(entorno.jwt.validate_access_token(body["data"]["access_token"].as_str().unwrap()).is_ok());

    // an access token is not accepted in place of a refresh token
    let access = entorno.token_funcionario();
    let (status, _) = entorno.json("POST", "/api/auth/refresh", None, Some(json!({ "refresh_token": access }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_requires_token() {
    let entorno = Entorno::new(true);
    let (status, _) = entorno.json("GET", "/api/auth/perfil", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = entorno.token_admin();
    let (status, body) = entorno.json("GET", "/api/auth/perfil", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "admin@redinclusion.com");
    assert_eq!(body["data"]["linea_trabajo"], "Sin línea de trabajo");
}

#[tokio::test]
async fn test_profile_of_deleted_account_is_not_found() {
    let entorno = Entorno::new(true);
    let token = entorno.token_funcionario();
    entorno.funcionarios.datos.lock().unwrap().retain(|f| f.rol.as_str() == "admin");
    let (status, _) = entorno.json("GET", "/api/auth/perfil", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_staff_and_reject_duplicate_email() {
    let entorno = Entorno::new(true);
    let cuerpo = json!({
        "nombre": "Pedro Díaz",
        "email": "Pedro@RedInclusion.com",
        "password": "ClaveSegura123",
        "secretaria": "Secretaría de Salud",
        "linea_trabajo": entorno.linea_id.to_hex()
    });
    let (status, body) = entorno.json("POST", "/api/auth/registro", None, Some(cuerpo.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["email"], "pedro@redinclusion.com");
    assert_eq!(body["data"]["rol"], "funcionario");
    assert!(body["data"].get("password_hash").is_none());

    let guardado = entorno
        .funcionarios
        .datos
        .lock()
        .unwrap()
        .iter()
        .find(|f| f.email == "pedro@redinclusion.com")
        .cloned()
        .unwrap();
    assert!(guardado.password_hash.starts_with("$argon2"));

    let (status, body) = entorno.json("POST", "/api/auth/registro", None, Some(cuerpo)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["campo"], "email");
}

#[tokio::test]
async fn test_only_admin_registers_admins() {
    let entorno = Entorno::new(true);
    let cuerpo = json!({
        "nombre": "Nueva Admin",
        "email": "nueva@redinclusion.com",
        "password": "ClaveSegura123",
        "rol": "admin"
    });

    let (status, _) = entorno.json("POST", "/api/auth/registro", None, Some(cuerpo.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let token = entorno.token_funcionario();
    let (status, _) = entorno.json("POST", "/api/auth/registro", Some(&token), Some(cuerpo.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let token = entorno.token_admin();
    let (status, body) = entorno.json("POST", "/api/auth/registro", Some(&token), Some(cuerpo)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["rol"], "admin");
}

#[tokio::test]
async fn test_work_lines_and_health() {
    let entorno = Entorno::new(true);
    let (status, body) = entorno.json("GET", "/api/lineas-trabajo", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["nombre"], "Discapacidad");

    let (status, _) = entorno.json("GET", "/api/lineas-trabajo/65a1b2c3d4e5f60718293a4b", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, bytes) = entorno.crudo("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_admin_bootstrap_is_idempotent() {
    let entorno = Entorno::new(true);
    let auth = AuthServiceImpl::new(entorno.funcionarios.clone(), entorno.lineas.clone(), entorno.jwt.clone());
    let config = AdminUserConfig {
        nombre: "Segunda Admin".to_string(),
        secretaria: "Administración General".to_string(),
        email: " Coordinacion@RedInclusion.com ".to_string(),
        password: "ClaveInicial123".to_string(),
    };

    assert!(auth.asegurar_admin(&config).await.unwrap());
    assert!(!auth.asegurar_admin(&config).await.unwrap());

    let creadas: Vec<_> = entorno
        .funcionarios
        .datos
        .lock()
        .unwrap()
        .iter()
        .filter(|f| f.email == "coordinacion@redinclusion.com")
        .cloned()
        .collect();
    assert_eq!(creadas.len(), 1);
    assert_eq!(creadas[0].rol.as_str(), "admin");

    let (status, body) = entorno
        .json(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "coordinacion@redinclusion.com", "password": "ClaveInicial123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["funcionario"]["rol"], "admin");
}
