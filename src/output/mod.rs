//! Output naming and writing.

mod writer;

use std::sync::OnceLock;

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

pub use writer::OutputWriter;

/// Make a speaker id safe to embed in a file name.
///
/// Anything other than ASCII letters, digits, `-` and `_` becomes `_`.
pub fn file_component(speaker_id: &str) -> String {
    let cleaned: String = speaker_id.chars().map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' }).collect();
    if cleaned.is_empty() { "_".to_string() } else { cleaned }
}

static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Determine and remember the local UTC offset, falling back to UTC.
///
/// The offset can only be read reliably while the process is single-threaded, so call this from `main`
/// before the async runtime starts.
pub fn capture_local_offset() -> UtcOffset {
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}

/// Timestamp prefix shared by every file of one run, e.g. `2024-05-01_14-03-59`.
///
/// Local time using the offset from [`capture_local_offset`]; without it, whatever offset can still be
/// determined, else UTC.
pub fn session_timestamp() -> String {
    let offset = LOCAL_OFFSET.get().copied().or_else(|| UtcOffset::current_local_offset().ok()).unwrap_or(UtcOffset::UTC);
    format_timestamp(OffsetDateTime::now_utc().to_offset(offset))
}

fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    at.format(&format).unwrap_or_else(|_| at.unix_timestamp().to_string())
}
