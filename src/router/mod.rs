pub mod actividad_router;
pub mod asistente_router;
pub mod auth_router;
pub mod beneficiario_router;
pub mod linea_trabajo_router;
