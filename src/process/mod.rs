// src/process/mod.rs
pub mod clean;
pub mod utils;

use csv::{ReaderBuilder, StringRecord, Trim};
use std::{fs, io::Cursor, path::Path};
use tracing::{debug, instrument, trace};

use crate::error::IngestError;
use utils::{coerce_vhi, coerce_week, coerce_year, file_name_of, region_id_from_file_name};

/// Contents of one source file, tagged with the region it belongs to.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub region_id: u8,
    /// Where the contents came from (file name or caller label), for logging.
    pub source: String,
    pub contents: String,
}

impl RawRecord {
    pub fn new(region_id: u8, source: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            region_id,
            source: source.into(),
            contents: contents.into(),
        }
    }

    /// Read a raw file, taking the region id from its `{prefix}_id_{id}_...` name.
    pub fn read<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let file = file_name_of(path);
        let region_id = region_id_from_file_name(&file, prefix)
            .ok_or_else(|| IngestError::Naming { file: file.clone() })?;
        let bytes = fs::read(path).map_err(|source| IngestError::Io {
            file: file.clone(),
            source,
        })?;
        Ok(Self {
            region_id,
            source: file,
            contents: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// One weekly reading, before the region name is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedRow {
    pub year: i32,
    /// `None` when the week field is blank or not a period number.
    pub week: Option<u16>,
    pub vhi: f64,
}

/// Cleaned output of one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTable {
    pub region_id: u8,
    pub source: String,
    pub rows: Vec<ParsedRow>,
    /// Data rows dropped because year or VHI did not coerce.
    pub dropped: usize,
}

/// Header positions of the columns we keep.
struct Columns {
    year: usize,
    week: usize,
    vhi: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, String> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| format!("missing `{}` column", name))
        };
        Ok(Self {
            year: find("year")?,
            week: find("week")?,
            vhi: find("VHI")?,
        })
    }

    fn coerce(&self, record: &StringRecord) -> Option<ParsedRow> {
        let vhi = coerce_vhi(record.get(self.vhi)?)?;
        let year = coerce_year(record.get(self.year)?)?;
        let week = record.get(self.week).and_then(coerce_week);
        Some(ParsedRow { year, week, vhi })
    }
}

/// Parse a raw record into a typed table.
///
/// Cleaning runs on whole lines first (sentinel lines dropped, markup
/// stripped), then the first line is discarded as metadata and the second is
/// read as the header. Rows whose VHI or year fail coercion are counted and
/// skipped; only structural problems fail the file.
#[instrument(level = "debug", skip(record), fields(source = %record.source, region = record.region_id))]
pub fn parse_record(record: &RawRecord) -> Result<RegionTable, IngestError> {
    let parse_err = |reason: String| IngestError::Parse {
        file: record.source.clone(),
        reason,
    };

    let lines = clean::clean_lines(&record.contents);
    let mut table = RegionTable {
        region_id: record.region_id,
        source: record.source.clone(),
        rows: Vec::new(),
        dropped: 0,
    };
    // metadata line only, or nothing at all
    if lines.len() < 2 {
        debug!(lines = lines.len(), "no header after cleaning");
        return Ok(table);
    }

    let body = lines[1..].join("\n");
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(Cursor::new(body.as_bytes()));

    let headers = rdr
        .headers()
        .map_err(|e| parse_err(format!("reading header: {}", e)))?
        .clone();
    let columns = Columns::locate(&headers).map_err(parse_err)?;

    for (idx, result) in rdr.records().enumerate() {
        let fields = result.map_err(|e| parse_err(format!("record {}: {}", idx, e)))?;
        match columns.coerce(&fields) {
            Some(row) => table.rows.push(row),
            None => {
                trace!(idx, "row skipped");
                table.dropped += 1;
            }
        }
    }

    debug!(rows = table.rows.len(), dropped = table.dropped, "parsed");
    Ok(table)
}

/// Read and parse one file from disk.
pub fn parse_file<P: AsRef<Path>>(path: P, prefix: &str) -> Result<RegionTable, IngestError> {
    let record = RawRecord::read(path, prefix)?;
    parse_record(&record)
}
