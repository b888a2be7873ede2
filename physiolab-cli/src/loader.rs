//! CSV input and output for recordings.

use anyhow::{bail, Context, Result};
use physiolab_core::config::ColumnSettings;
use physiolab_core::Signal;
use std::io::Write;
use std::path::Path;

/// Which columns to read and how the file is delimited.
#[derive(Debug, Clone)]
pub struct CsvLayout {
    pub signal: String,
    pub time: Option<String>,
    pub separator: u8,
}

impl CsvLayout {
    pub fn from_settings(columns: &ColumnSettings) -> Result<Self> {
        Ok(Self {
            signal: columns.signal.clone(),
            time: columns.time.clone(),
            separator: separator_byte(columns.separator)?,
        })
    }
}

pub fn separator_byte(c: char) -> Result<u8> {
    if !c.is_ascii() {
        bail!("separator must be a single ASCII character, got '{c}'");
    }
    Ok(c as u8)
}

/// Load one signal from a delimited file with a header row.
///
/// With a time column the samples carry explicit timestamps; otherwise
/// `fs` must be given.
pub fn load_signal(path: &Path, layout: &CsvLayout, fs: Option<f64>) -> Result<Signal> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(layout.separator)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("column '{name}' not found in {}", path.display()))
    };
    let value_col = column(&layout.signal)?;
    let time_col = layout.time.as_deref().map(column).transpose()?;

    let mut values = Vec::new();
    let mut times = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read row {}", row + 1))?;
        values.push(parse_field(&record, value_col, row)?);
        if let Some(col) = time_col {
            times.push(parse_field(&record, col, row)?);
        }
    }
    log::debug!("loaded {} samples from {}", values.len(), path.display());

    let signal = match (time_col, fs) {
        (Some(_), _) => Signal::with_times(values, times)?,
        (None, Some(fs)) => Signal::new(values, fs)?,
        (None, None) => bail!("no time column configured: pass --fs or set sampling_rate"),
    };
    Ok(signal)
}

fn parse_field(record: &csv::StringRecord, col: usize, row: usize) -> Result<f64> {
    let field = record
        .get(col)
        .with_context(|| format!("row {} has no column {}", row + 1, col + 1))?;
    field
        .parse::<f64>()
        .with_context(|| format!("row {}: '{field}' is not a number", row + 1))
}

/// Write inter-beat intervals as `beat,ibi_s` rows.
pub fn write_ibi<W: Write>(writer: W, ibi: &[f64]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["beat", "ibi_s"])?;
    for (i, interval) in ibi.iter().enumerate() {
        out.write_record([(i + 1).to_string(), interval.to_string()])?;
    }
    out.flush()?;
    Ok(())
}
