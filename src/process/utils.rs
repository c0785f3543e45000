use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::region::RegionDirectory;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Extracts the region id from `{prefix}_id_{region_id}_{timestamp}.{ext}`.
/// The id is the field right after `{prefix}_id_` (the prefix itself may
/// contain `_`) and must be an integer in `1..=25`.
pub fn region_id_from_file_name(file_name: &str, prefix: &str) -> Option<u8> {
    let rest = file_name.strip_prefix(prefix)?.strip_prefix("_id_")?;
    let (field, _) = rest.split_once('_')?;
    let id: i64 = field.parse().ok()?;
    if RegionDirectory::contains(id) {
        u8::try_from(id).ok()
    } else {
        None
    }
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// VHI reading: finite and non-negative, else `None` (negative is the
/// source's "no data" marker).
pub fn coerce_vhi(raw: &str) -> Option<f64> {
    let v: f64 = clean_str(raw).parse().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v)
}

/// First run of digits in a possibly decorated year field (`"1982,"`, `"y2001"`).
pub fn coerce_year(raw: &str) -> Option<i32> {
    DIGITS.find(raw)?.as_str().parse().ok()
}

/// Week number counted from 1; integral numeric labels such as `"3.0"` are
/// accepted. Anything else yields `None`, which leaves the week unknown but
/// keeps the reading.
pub fn coerce_week(raw: &str) -> Option<u16> {
    let s = clean_str(raw);
    let week = match s.parse::<u16>() {
        Ok(w) => w,
        Err(_) => {
            let f: f64 = s.parse().ok()?;
            if f.fract() != 0.0 || !(0.0..=u16::MAX as f64).contains(&f) {
                return None;
            }
            f as u16
        }
    };
    (week >= 1).then_some(week)
}
