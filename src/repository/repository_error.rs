use mongodb::error::{ErrorKind, WriteFailure};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Failures surfaced by the Mongo repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Not Found: {0}")]
    NotFound(String),
    /// A unique index rejected the write.
    #[error("Already Exists: {0}")]
    AlreadyExists(String),
    #[error("Validation Error: {0}")]
    ValidationError(String),
    #[error("Database Error: {0}")]
    DatabaseError(String),
    #[error("Connection Error: {0}")]
    ConnectionError(String),
    #[error("Serialization Error: {0}")]
    SerializationError(String),
    #[error("Driver Error: {0}")]
    Driver(#[source] mongodb::error::Error),
}

impl RepositoryError {
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        RepositoryError::NotFound(msg.into())
    }
}

/// Field named in a duplicate-key message (`... dup key: { cedula: "1" }`).
fn duplicate_key_field(message: &str) -> Option<&str> {
    let rest = message.split("dup key: {").nth(1)?;
    let field = rest.split(':').next()?.trim();
    (!field.is_empty()).then_some(field)
}

impl From<mongodb::error::Error> for RepositoryError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE => {
                RepositoryError::AlreadyExists(match duplicate_key_field(&write_error.message) {
                    Some(field) => format!("Ya existe un registro con el mismo valor de '{}'", field),
                    None => "Ya existe un registro con un valor único duplicado".to_string(),
                })
            }
            ErrorKind::Write(_) => RepositoryError::DatabaseError(format!("Write error: {}", err)),
            ErrorKind::Authentication { .. } | ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } => {
                RepositoryError::ConnectionError(err.to_string())
            }
            ErrorKind::InvalidArgument { .. } => RepositoryError::ValidationError(err.to_string()),
            _ => RepositoryError::Driver(err),
        }
    }
}

impl From<bson::ser::Error> for RepositoryError {
    fn from(err: bson::ser::Error) -> Self {
        RepositoryError::SerializationError(format!("BSON serialization error: {}", err))
    }
}

impl From<bson::de::Error> for RepositoryError {
    fn from(err: bson::de::Error) -> Self {
        RepositoryError::SerializationError(format!("BSON deserialization error: {}", err))
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_field_is_extracted() {
        let msg = r#"E11000 duplicate key error collection: db.asistentes index: cedula_1 dup key: { cedula: "123" }"#;
        assert_eq!(duplicate_key_field(msg), Some("cedula"));
        assert_eq!(duplicate_key_field("E11000 duplicate key error"), None);
    }

    #[test]
    fn test_bson_errors_become_serialization_errors() {
        let err: RepositoryError = bson::from_document::<u32>(bson::doc! {}).unwrap_err().into();
        assert!(matches!(err, RepositoryError::SerializationError(_)));
    }
}
