pub mod actividad_service;
pub mod asistente_service;
pub mod auth_service;
pub mod beneficiario_service;
pub mod linea_trabajo_service;
