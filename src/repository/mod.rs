pub mod actividad_repo;
pub mod asistente_repo;
pub mod beneficiario_repo;
pub mod funcionario_repo;
pub mod linea_trabajo_repo;
pub mod mongo;
pub mod repository_error;
