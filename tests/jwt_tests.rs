use chrono::Utc;
use redinclusion_backend::config::JwtConfig;
use redinclusion_backend::util::jwt::*;

fn create_test_jwt_utils() -> JwtTokenUtilsImpl {
    JwtTokenUtilsImpl::new(JwtConfig::default())
}

struct TestStaff {
    id: String,
    email: String,
    role: String,
}

impl TestStaff {
    fn funcionario() -> Self {
        Self {
            id: "65a1b2c3d4e5f60718293a4b".to_string(),
            email: "laura@redinclusion.com".to_string(),
            role: "funcionario".to_string(),
        }
    }

    fn admin() -> Self {
        Self {
            id: "65a1b2c3d4e5f60718293a4c".to_string(),
            email: "admin@redinclusion.com".to_string(),
            role: "admin".to_string(),
        }
    }
}

#[test]
fn test_token_type_as_str() {
    assert_eq!(TokenType::Access.as_str(), "access");
    assert_eq!(TokenType::Refresh.as_str(), "refresh");
}

#[test]
fn test_generate_access_token_carries_staff_claims() {
    let jwt_utils = create_test_jwt_utils();
    let staff = TestStaff::funcionario();

    let token = jwt_utils.generate_access_token(&staff.id, &staff.email, &staff.role).unwrap();
    let claims = jwt_utils.validate_access_token(&token).unwrap();

    assert_eq!(claims.sub, staff.id);
    assert_eq!(claims.email, staff.email);
    assert_eq!(claims.role, "funcionario");
    assert_eq!(claims.token_type, "access");
    assert_eq!(claims.iss.as_deref(), Some("redinclusion-backend-test"));
    assert!(!claims.es_admin());
}

#[test]
fn test_token_pair_lifetimes() {
    let jwt_utils = create_test_jwt_utils();
    let staff = TestStaff::admin();
    let before = Utc::now().timestamp();

    let pair = jwt_utils.generate_token_pair(&staff.id, &staff.email, &staff.role).unwrap();
    assert_eq!(pair.token_type, "Bearer");
    assert_eq!(pair.expires_in, 480 * 60);
    assert_ne!(pair.access_token, pair.refresh_token);

    let access = jwt_utils.validate_access_token(&pair.access_token).unwrap();
    let refresh = jwt_utils.validate_refresh_token(&pair.refresh_token).unwrap();
    assert!(access.es_admin());
    assert!(access.iat >= before);
    assert_eq!(access.exp - access.iat, 480 * 60);
    assert_eq!(refresh.exp - refresh.iat, 10080 * 60);
    assert_ne!(access.jti, refresh.jti);
}

#[test]
fn test_token_types_are_not_interchangeable() {
    let jwt_utils = create_test_jwt_utils();
    let staff = TestStaff::funcionario();
    let pair = jwt_utils.generate_token_pair(&staff.id, &staff.email, &staff.role).unwrap();

    match jwt_utils.validate_access_token(&pair.refresh_token) {
        Err(JwtError::InvalidTokenType { expected, actual }) => {
            assert_eq!(expected, "access");
            assert_eq!(actual, "refresh");
        }
        other => panic!("expected InvalidTokenType, got {:?}", other),
    }

    match jwt_utils.validate_refresh_token(&pair.access_token) {
        Err(JwtError::InvalidTokenType { expected, actual }) => {
            assert_eq!(expected, "refresh");
            assert_eq!(actual, "access");
        }
        other => panic!("expected InvalidTokenType, got {:?}", other),
    }

    // no expected type accepts either
    assert!(jwt_utils.validate_token(&pair.refresh_token, None).is_ok());
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let jwt_utils = create_test_jwt_utils();
    let other = JwtTokenUtilsImpl::new(JwtConfig {
        jwt_secret: "another_secret_key_that_is_also_long_enough_for_hs256_signing".to_string(),
        ..JwtConfig::default()
    });
    let staff = TestStaff::funcionario();

    let token = other.generate_access_token(&staff.id, &staff.email, &staff.role).unwrap();
    assert!(matches!(jwt_utils.validate_access_token(&token), Err(JwtError::DecodingFailed(_))));
}

#[test]
fn test_audience_mismatch_is_rejected() {
    let jwt_utils = create_test_jwt_utils();
    let other = JwtTokenUtilsImpl::new(JwtConfig {
        jwt_audience: Some("otra-aplicacion".to_string()),
        ..JwtConfig::default()
    });
    let staff = TestStaff::funcionario();

    let token = other.generate_access_token(&staff.id, &staff.email, &staff.role).unwrap();
    assert!(jwt_utils.validate_access_token(&token).is_err());
}

#[test]
fn test_expired_token() {
    let expired = JwtTokenUtilsImpl::new(JwtConfig { access_token_expiration: -1, ..JwtConfig::default() });
    let staff = TestStaff::funcionario();

    let token = expired.generate_access_token(&staff.id, &staff.email, &staff.role).unwrap();
    assert!(matches!(expired.validate_access_token(&token), Err(JwtError::TokenExpired)));
}

#[test]
fn test_malformed_and_tampered_tokens() {
    let jwt_utils = create_test_jwt_utils();
    for token in ["", "not.a.token", "abc"] {
        assert!(matches!(jwt_utils.validate_access_token(token), Err(JwtError::DecodingFailed(_))), "{}", token);
    }

    let staff = TestStaff::funcionario();
    let token = jwt_utils.generate_access_token(&staff.id, &staff.email, &staff.role).unwrap();
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    assert_eq!(parts.len(), 3);

    // swap in the payload of an admin token; the signature no longer matches
    let admin = TestStaff::admin();
    let admin_token = jwt_utils.generate_access_token(&admin.id, &admin.email, &admin.role).unwrap();
    parts[1] = admin_token.split('.').nth(1).unwrap().to_string();
    assert!(jwt_utils.validate_access_token(&parts.join(".")).is_err());
}

#[test]
fn test_extract_token_from_header() {
    let jwt_utils = create_test_jwt_utils();

    assert_eq!(jwt_utils.extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
    assert_eq!(jwt_utils.extract_token_from_header("Bearer   abc.def.ghi  ").unwrap(), "abc.def.ghi");

    for header in ["abc.def.ghi", "Basic dXNlcjpwYXNz", "bearer abc", "Bearer ", "Bearer    "] {
        assert!(matches!(jwt_utils.extract_token_from_header(header), Err(JwtError::InvalidToken)), "{}", header);
    }
}

#[test]
fn test_check_role_permission() {
    let jwt_utils = create_test_jwt_utils();

    let cases = [
        ("admin", "admin", true),
        ("admin", "funcionario", true),
        ("funcionario", "funcionario", true),
        ("funcionario", "admin", false),
        ("invitado", "funcionario", false),
        ("", "funcionario", false),
    ];
    for (role, required, allowed) in cases {
        assert_eq!(jwt_utils.check_role_permission(role, required), allowed, "{} -> {}", role, required);
    }
}

#[test]
fn test_claims_serialization_skips_missing_issuer() {
    let claims = Claims {
        sub: "65a1b2c3d4e5f60718293a4b".to_string(),
        email: "laura@redinclusion.com".to_string(),
        role: "funcionario".to_string(),
        iat: 1_700_000_000,
        exp: 1_700_028_800,
        token_type: "access".to_string(),
        jti: "jti-1".to_string(),
        iss: None,
        aud: None,
    };

    let json = serde_json::to_value(&claims).unwrap();
    assert!(json.get("iss").is_none());
    assert!(json.get("aud").is_none());

    let back: Claims = serde_json::from_value(json).unwrap();
    assert_eq!(back, claims);
}

#[test]
fn test_jwt_error_display() {
    assert_eq!(JwtError::TokenExpired.to_string(), "Token has expired");
    assert_eq!(JwtError::InvalidToken.to_string(), "Invalid token format");
    assert_eq!(
        JwtError::InvalidTokenType { expected: "access".to_string(), actual: "refresh".to_string() }.to_string(),
        "Invalid token type: expected access, got refresh"
    );
}
