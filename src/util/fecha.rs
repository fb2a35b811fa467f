//! Date handling shared by the models, the filters and the migration tool.
//!
//! Dates are stored as BSON `DateTime` (UTC). Older documents may still hold
//! ISO-8601 strings or bare `YYYY-MM-DD` values; [`deserializar_fecha`] accepts
//! both so those records stay readable until `migrar_fechas` rewrites them.

use bson::{Bson, DateTime};
use chrono::{DateTime as ChronoDateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Parses the textual date forms found in payloads and legacy documents.
///
/// Accepted: RFC 3339 (`2024-01-10T09:00:00Z`, `...+05:00`), naive ISO
/// date-time (`2024-01-10T09:00:00`, `2024-01-10 09:00:00.123`, taken as UTC)
/// and date only (`2024-01-10`, midnight UTC).
pub fn parsear_fecha(texto: &str) -> Option<ChronoDateTime<Utc>> {
    let texto = texto.trim();
    if texto.is_empty() {
        return None;
    }
    if let Ok(dt) = ChronoDateTime::parse_from_rfc3339(texto) {
        return Some(dt.with_timezone(&Utc));
    }
    for formato in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(texto, formato) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(texto, "%Y-%m-%d")
        .ok()
        .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
}

/// True when the value is a bare calendar date (no time part).
pub fn es_solo_fecha(texto: &str) -> bool {
    NaiveDate::parse_from_str(texto.trim(), "%Y-%m-%d").is_ok()
}

/// Lower bound of an inclusive range.
pub fn inicio_rango(texto: &str) -> Option<DateTime> {
    parsear_fecha(texto).map(DateTime::from_chrono)
}

/// Upper bound of an inclusive range. A bare date covers the whole day.
pub fn fin_rango(texto: &str) -> Option<DateTime> {
    let inicio = parsear_fecha(texto)?;
    if es_solo_fecha(texto) {
        let fin = inicio + chrono::Duration::days(1) - chrono::Duration::milliseconds(1);
        Some(DateTime::from_chrono(fin))
    } else {
        Some(DateTime::from_chrono(inicio))
    }
}

/// Canonical textual form used in every response: RFC 3339, UTC, `Z` suffix.
pub fn a_iso(fecha: &DateTime) -> String {
    fecha.to_chrono().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `YYYY-MM-DD`, used by the beneficiary listing and exports.
pub fn a_dia(fecha: &DateTime) -> String {
    fecha.to_chrono().format("%Y-%m-%d").to_string()
}

/// Converts a stored BSON value into a `DateTime`, accepting legacy strings.
pub fn fecha_desde_bson(valor: &Bson) -> Option<DateTime> {
    match valor {
        Bson::DateTime(dt) => Some(*dt),
        Bson::String(s) => parsear_fecha(s).map(DateTime::from_chrono),
        _ => None,
    }
}

/// `deserialize_with` helper for date fields.
pub fn deserializar_fecha<'de, D>(deserializer: D) -> Result<DateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let valor = Bson::deserialize(deserializer)?;
    fecha_desde_bson(&valor)
        .ok_or_else(|| serde::de::Error::custom(format!("fecha no reconocida: {}", valor)))
}

/// `deserialize_with` helper for optional date fields.
pub fn deserializar_fecha_opcional<'de, D>(deserializer: D) -> Result<Option<DateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let valor = Option::<Bson>::deserialize(deserializer)?;
    match valor {
        None | Some(Bson::Null) => Ok(None),
        Some(v) => fecha_desde_bson(&v)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("fecha no reconocida: {}", v))),
    }
}
