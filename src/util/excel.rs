//! Spreadsheet rendering for the activity roster and beneficiary exports.

use std::collections::HashMap;

use chrono::Utc;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::debug;

pub const CONTENT_TYPE_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const ANCHO_MAXIMO: usize = 30;

/// One row keyed by column name. Missing or empty values render as blank cells.
pub type Fila = HashMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum ExcelError {
    #[error("Failed to build workbook: {0}")]
    Workbook(#[from] XlsxError),
    #[error("Workbook has no sheets")]
    SinHojas,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HojaExcel {
    pub nombre: String,
    pub columnas: Vec<String>,
    pub filas: Vec<Vec<String>>,
}

impl HojaExcel {
    /// Projects keyed rows onto `columnas`, in that order.
    pub fn desde_filas(nombre: impl Into<String>, columnas: Vec<String>, filas: &[Fila]) -> Self {
        let filas = filas
            .iter()
            .map(|fila| {
                columnas
                    .iter()
                    .map(|c| fila.get(c).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        HojaExcel { nombre: nombre.into(), columnas, filas }
    }
}

/// Keeps the preferred columns that hold a non-empty value in at least one row.
pub fn seleccionar_columnas(preferidas: &[&str], filas: &[Fila]) -> Vec<String> {
    preferidas
        .iter()
        .filter(|col| {
            filas
                .iter()
                .any(|f| f.get(**col).map(|v| !v.is_empty()).unwrap_or(false))
        })
        .map(|col| col.to_string())
        .collect()
}

/// Width per column: longest cell or header plus two, capped at `maximo`.
pub fn anchos_columna(columnas: &[String], filas: &[Vec<String>], maximo: usize) -> Vec<usize> {
    columnas
        .iter()
        .enumerate()
        .map(|(i, titulo)| {
            let mas_largo = filas
                .iter()
                .filter_map(|f| f.get(i))
                .map(|v| v.chars().count())
                .chain(std::iter::once(titulo.chars().count()))
                .max()
                .unwrap_or(0);
            (mas_largo + 2).min(maximo)
        })
        .collect()
}

/// Sheet names are limited to 31 characters and exclude `[]:*?/\`.
fn nombre_hoja(nombre: &str) -> String {
    let limpio: String = nombre
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    if limpio.trim().is_empty() {
        "Hoja".to_string()
    } else {
        limpio
    }
}

/// Renders the sheets into an in-memory `.xlsx` file with a bold header row.
pub fn generar_xlsx(hojas: &[HojaExcel]) -> Result<Vec<u8>, ExcelError> {
    if hojas.is_empty() {
        return Err(ExcelError::SinHojas);
    }
    let mut workbook = Workbook::new();
    let negrita = Format::new().set_bold();

    for hoja in hojas {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(nombre_hoja(&hoja.nombre))?;

        for (col, titulo) in hoja.columnas.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, titulo, &negrita)?;
        }
        for (fila, valores) in hoja.filas.iter().enumerate() {
            for (col, valor) in valores.iter().enumerate() {
                if !valor.is_empty() {
                    worksheet.write_string(fila as u32 + 1, col as u16, valor)?;
                }
            }
        }
        for (col, ancho) in anchos_columna(&hoja.columnas, &hoja.filas, ANCHO_MAXIMO).into_iter().enumerate() {
            worksheet.set_column_width(col as u16, ancho as f64)?;
        }
        debug!("Rendered sheet '{}' with {} rows", hoja.nombre, hoja.filas.len());
    }

    Ok(workbook.save_to_buffer()?)
}

/// `<prefijo>_<YYYYmmdd_HHMMSS>.xlsx`
pub fn nombre_archivo(prefijo: &str) -> String {
    format!("{}_{}.xlsx", prefijo, Utc::now().format("%Y%m%d_%H%M%S"))
}

pub fn si_no(valor: bool) -> String {
    if valor { "Sí" } else { "No" }.to_string()
}
