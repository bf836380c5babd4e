//! Wall clock and timestamp formatting
//!
//! The engine itself never reads the clock; drivers call `now_ms` and pass
//! the value down.

use chrono::{DateTime, Local, SecondsFormat, Utc};

/// Milliseconds since the Unix epoch
pub type Millis = u64;

/// Current time (WASM: `Date.now()`)
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> Millis {
    js_sys::Date::now() as Millis
}

/// Current time
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> Millis {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as Millis)
        .unwrap_or_default()
}

fn to_utc(ms: Millis) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms as i64).unwrap_or_default()
}

/// `2024-05-01T10:00:00.000Z`
pub fn iso_timestamp(ms: Millis) -> String {
    to_utc(ms).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// UTC calendar date, `YYYY-MM-DD` (date input format)
pub fn iso_date(ms: Millis) -> String {
    to_utc(ms).format("%Y-%m-%d").to_string()
}

/// Local wall time, `HH:MM` (time input format)
pub fn local_hh_mm(ms: Millis) -> String {
    to_utc(ms).with_timezone(&Local).format("%H:%M").to_string()
}

/// Local date and time in French order, `dd/mm/yyyy HH:MM:SS`
pub fn local_fr(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%d/%m/%Y %H:%M:%S")
        .to_string()
}
