pub mod actividad_handler;
pub mod asistente_handler;
pub mod auth_handler;
pub mod beneficiario_handler;
pub mod linea_trabajo_handler;
