//! Timecode rendering for second offsets.

/// Renders a seconds offset as `[-][H:]MM:SS`.
///
/// The hours component is omitted when zero; when present, minutes are
/// zero-padded to two digits. Without hours, minutes are unpadded.
/// Seconds are always zero-padded. Negative offsets get a leading `-`.
#[must_use]
pub fn format_offset(offset_seconds: i64) -> String {
    let sign = if offset_seconds < 0 { "-" } else { "" };
    let total = offset_seconds.unsigned_abs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{sign}{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{minutes}:{seconds:02}")
    }
}
