// src/process/clean.rs

use once_cell::sync::Lazy;
use regex::Regex;

/// Literal the source uses for a missing reading.
pub const MISSING_SENTINEL: &str = "N/A";

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("markup pattern is valid"));

/// Remove every `<...>` tag from a single line.
pub fn strip_markup(line: &str) -> String {
    MARKUP.replace_all(line, "").into_owned()
}

/// Line-level cleaning done before any delimiter parsing: lines carrying the
/// missing sentinel are dropped whole, markup is stripped from the rest, and
/// lines left blank are skipped.
pub fn clean_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| !line.contains(MISSING_SENTINEL))
        .map(strip_markup)
        .filter(|line| !line.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_inline_tags() {
        assert_eq!(strip_markup("<tt><pre>1982,  1, 42.23,<br>"), "1982,  1, 42.23,");
        assert_eq!(strip_markup("no tags"), "no tags");
    }

    #[test]
    fn drops_sentinel_lines_before_stripping() {
        let raw = "meta<br>\nyear,week,VHI<br>\n1982,1,N/A,<br>\n1982,2,30.5,<br>\n</pre></tt>\n";
        let lines = clean_lines(raw);
        assert_eq!(lines, vec!["meta", "year,week,VHI", "1982,2,30.5,"]);
    }

    #[test]
    fn sentinel_inside_markup_still_drops_line() {
        let lines = clean_lines("<b>N/A</b>\nkeep");
        assert_eq!(lines, vec!["keep"]);
    }
}
