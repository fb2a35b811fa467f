pub mod actividad;
pub mod actor;
pub mod asistente;
pub mod beneficiario;
pub mod funcionario;
pub mod linea_trabajo;
