pub mod error;
pub mod excel;
pub mod extract;
pub mod fecha;
pub mod jwt;
pub mod logger;
pub mod pagination;
pub mod password;
pub mod texto;
