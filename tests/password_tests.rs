use redinclusion_backend::util::password::*;
use std::collections::HashSet;

#[test]
fn test_hash_password_produces_phc_string() {
    let password = "ClaveSegura123";
    let hash = PasswordUtilsImpl::hash_password(password).unwrap();

    assert_ne!(hash, password);
    assert!(hash.starts_with("$argon2id$"));
    let parts: Vec<&str> = hash.split('$').collect();
    assert!(parts.len() >= 5, "Hash should have at least 5 parts separated by $");
}

#[test]
fn test_hash_password_salts_every_hash() {
    let hashes: HashSet<String> = (0..5).map(|_| PasswordUtilsImpl::hash_password("MismaClave1").unwrap()).collect();
    assert_eq!(hashes.len(), 5);
    for hash in &hashes {
        assert!(PasswordUtilsImpl::verify_password("MismaClave1", hash).unwrap());
    }
}

#[test]
fn test_verify_password_correct_and_incorrect() {
    let hash = PasswordUtilsImpl::hash_password("ClaveSegura123").unwrap();

    assert!(PasswordUtilsImpl::verify_password("ClaveSegura123", &hash).unwrap());
    assert!(!PasswordUtilsImpl::verify_password("claveSegura123", &hash).unwrap());
    assert!(!PasswordUtilsImpl::verify_password("ClaveSegura123 ", &hash).unwrap());
    assert!(!PasswordUtilsImpl::verify_password("", &hash).unwrap());
}

#[test]
fn test_unicode_and_long_passwords() {
    let passwords = ["contraseña_añejo_ñandú", "密码🔒", &"x".repeat(1000)];
    for password in passwords {
        let hash = PasswordUtilsImpl::hash_password(password).unwrap();
        assert!(PasswordUtilsImpl::verify_password(password, &hash).unwrap(), "{}", password);
    }
}

#[test]
fn test_empty_password_still_hashes() {
    // emptiness is rejected by request validation, not by the hasher
    let hash = PasswordUtilsImpl::hash_password("").unwrap();
    assert!(PasswordUtilsImpl::verify_password("", &hash).unwrap());
}

#[test]
fn test_verify_password_rejects_unusable_hash() {
    for hash in ["", "plaintext", "argon2id"] {
        assert!(
            matches!(PasswordUtilsImpl::verify_password("ClaveSegura123", hash), Err(PasswordError::InvalidHashFormat)),
            "{}",
            hash
        );
    }
}

#[test]
fn test_password_error_display() {
    assert_eq!(PasswordError::HashingFailed("boom".to_string()).to_string(), "Failed to hash password: boom");
    assert_eq!(PasswordError::InvalidHashFormat.to_string(), "Invalid password hash format");
}

#[test]
fn test_trait_is_usable_generically() {
    fn roundtrip<T: PasswordUtils>(password: &str) -> bool {
        let hash = T::hash_password(password).unwrap();
        T::verify_password(password, &hash).unwrap()
    }
    assert!(roundtrip::<PasswordUtilsImpl>("Generica1"));
}
