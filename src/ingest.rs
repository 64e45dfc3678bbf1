//! Tab-delimited well-telemetry ingestion.
//!
//! The raw treatment exports are tab-separated text files with a three-line
//! preamble (column names, measurement units, a separator rule) followed by
//! one record per line. Timestamps use the `MM:dd:yyyy:HH:mm:ss` layout with
//! no timezone. Depending on the acquisition system a row carries 19 to 21
//! data columns; 21-column rows include the optional B600-3050 total, and the
//! trailing J218 column may be absent entirely (the additive was not pumped).
//!
//! Unparseable lines are skipped, never fatal; the per-file [`ParseReport`]
//! keeps an explicit count so callers can surface data quality instead of
//! silently discarding rows.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::warn;

use crate::record::{Dataset, WellReading};

/// Timestamp layout used by the export format.
pub const TIMESTAMP_FORMAT: &str = "%m:%d:%Y:%H:%M:%S";

/// Lines of preamble before the data rows.
const PREAMBLE_LINES: usize = 3;

/// Minimum data columns for a parseable row.
const MIN_COLUMNS: usize = 19;

/// Errors from file-level ingestion. Individual bad lines are not errors;
/// they are counted in the [`ParseReport`].
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The file could not be opened or read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The tab-delimited reader failed at the transport level.
    #[error("malformed delimited data in {path}: {source}")]
    Csv {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        source: csv::Error,
    },
    /// A directory was expected.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    /// A directory scan produced no datasets.
    #[error("no telemetry exports found in {0}")]
    NoData(PathBuf),
}

/// Per-file accounting of parsed and skipped lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ParseReport {
    /// Data lines read (preamble excluded).
    pub lines_read: usize,
    /// Lines that produced a record.
    pub records_parsed: usize,
    /// Lines dropped as unparseable.
    pub lines_skipped: usize,
}

impl std::fmt::Display for ParseReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records from {} lines ({} skipped)",
            self.records_parsed, self.lines_read, self.lines_skipped
        )
    }
}

/// Parse one tab-separated data line into a reading.
///
/// Returns `None` for rows with too few columns, a malformed timestamp, or a
/// non-numeric field. Never panics, whatever the input.
pub fn parse_line(line: &str) -> Option<WellReading> {
    let fields: Vec<&str> = line.split('\t').collect();
    parse_fields(&fields)
}

fn parse_fields(fields: &[&str]) -> Option<WellReading> {
    if fields.len() < MIN_COLUMNS {
        return None;
    }

    let time = NaiveDateTime::parse_from_str(fields[0].trim(), TIMESTAMP_FORMAT).ok()?;

    // 21-column rows carry the optional B600-3050 total; everything after it
    // shifts by one.
    let (total_b600_3050, offset) = if fields.len() == 21 {
        (Some(number(fields[9])?), 1)
    } else {
        (None, 0)
    };

    // The trailing J218 column is absent when the additive was not pumped.
    let j218_conc = match fields.get(19 + offset) {
        Some(field) => number(field)?,
        None => 0.0,
    };

    Some(WellReading {
        time,
        treating_pressure: number(fields[1])?,
        annulus_pressure: number(fields[2])?,
        bottomhole_pressure: number(fields[3])?,
        slurry_rate: number(fields[4])?,
        clean_fluid_rate: number(fields[5])?,
        proppant_conc: number(fields[6])?,
        bottomhole_proppant_conc: number(fields[7])?,
        net_pressure: number(fields[8])?,
        total_b600_3050,
        total_proppant: number(fields[9 + offset])?,
        total_clean_fluid: number(fields[10 + offset])?,
        total_slurry: number(fields[11 + offset])?,
        b525_conc: number(fields[12 + offset])?,
        b534_conc: number(fields[13 + offset])?,
        j604_conc: number(fields[14 + offset])?,
        u028_conc: number(fields[15 + offset])?,
        j627_conc: number(fields[16 + offset])?,
        pcm_guar_conc: number(fields[17 + offset])?,
        j475_conc: number(fields[18 + offset])?,
        j218_conc,
    })
}

/// Numeric field parser: blank fields read as zero, anything else must parse.
fn number(field: &str) -> Option<f64> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse().ok()
}

/// Read one telemetry export into a dataset named after the file stem.
pub fn read_well_file(path: &Path) -> Result<(Dataset, ParseReport), IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut buffered = BufReader::new(file);

    // Consume the preamble: column names, units, separator rule.
    let mut preamble = String::new();
    for _ in 0..PREAMBLE_LINES {
        preamble.clear();
        let read = buffered
            .read_line(&mut preamble)
            .map_err(|source| IngestError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
    }

    // Fields split purely on tabs; a quote character is data, never a field
    // delimiter. With quoting on, a stray `"` in a corrupt line would open a
    // quoted field that swallows every following line.
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(buffered);

    let mut readings = Vec::new();
    let mut report = ParseReport::default();

    for record in reader.records() {
        let record = record.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        report.lines_read += 1;
        let fields: Vec<&str> = record.iter().collect();
        match parse_fields(&fields) {
            Some(reading) => {
                readings.push(reading);
                report.records_parsed += 1;
            }
            None => report.lines_skipped += 1,
        }
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok((Dataset::new(name, readings), report))
}

/// Read every `.txt` export in `dir`, ordered by embedded stage number.
///
/// File names carry a `_STG <n>` marker; files without one sort last, by
/// name. Files that fail to read are logged and skipped rather than failing
/// the batch, but a scan that yields no datasets at all is an
/// [`IngestError::NoData`] error.
pub fn read_well_directory(dir: &Path) -> Result<Vec<(Dataset, ParseReport)>, IngestError> {
    if !dir.is_dir() {
        return Err(IngestError::NotADirectory(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("txt"))
                .unwrap_or(false)
        })
        .collect();

    paths.sort_by_key(|path| {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        (stage_number(&name).unwrap_or(u32::MAX), name)
    });

    let mut out = Vec::new();
    for path in paths {
        match read_well_file(&path) {
            Ok(loaded) => out.push(loaded),
            Err(e) => warn!("failed to read {}: {e}", path.display()),
        }
    }

    if out.is_empty() {
        return Err(IngestError::NoData(dir.to_path_buf()));
    }

    Ok(out)
}

/// Extract the stage number from a `..._STG <n>...` file stem.
fn stage_number(stem: &str) -> Option<u32> {
    let rest = &stem[stem.find("_STG ")? + "_STG ".len()..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
