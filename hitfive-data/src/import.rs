use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use crate::history::History;
use crate::models::{Combo, Draw, Universe, DRAW_SIZE};

const NUMBER_COLUMNS: [&str; DRAW_SIZE] = ["Num1", "Num2", "Num3", "Num4", "Num5"];
const DATE_COLUMNS: [&str; 3] = ["Date", "DrawDate", "draw_date"];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%a, %b %d, %Y", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub total_records: u32,
    pub kept: u32,
    pub duplicates: u32,
    pub errors: u32,
}

struct Columns {
    numbers: [usize; DRAW_SIZE],
    date: Option<usize>,
}

/// Accepts ISO dates, US `MM/DD/YYYY` and the lottery site's
/// `Tue, Jan 02, 2024` form.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
        if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(raw, format) {
            return Ok(datetime.date());
        }
    }
    bail!("unrecognized date: '{}'", raw)
}

fn locate_columns(headers: &csv::StringRecord) -> Result<Columns> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let mut numbers = [0usize; DRAW_SIZE];
    for (slot, name) in numbers.iter_mut().zip(NUMBER_COLUMNS) {
        *slot = find(name).with_context(|| format!("missing column {}", name))?;
    }
    let date = DATE_COLUMNS.iter().find_map(|&name| find(name));

    Ok(Columns { numbers, date })
}

fn parse_record(record: &csv::StringRecord, columns: &Columns, universe: Universe) -> Result<Draw> {
    let mut numbers = [0u8; DRAW_SIZE];
    for (slot, &idx) in numbers.iter_mut().zip(columns.numbers.iter()) {
        let raw = record
            .get(idx)
            .with_context(|| format!("missing field at index {}", idx))?
            .trim();
        *slot = parse_number(raw).with_context(|| format!("cannot parse '{}' (index {})", raw, idx))?;
    }

    let mut draw = Draw::new(&numbers, universe)?;

    if let Some(idx) = columns.date {
        let raw = record.get(idx).unwrap_or_default().trim();
        if !raw.is_empty() {
            match parse_date(raw) {
                Ok(date) => draw = draw.with_date(date),
                Err(e) => log::warn!("{}; draw kept undated", e),
            }
        }
    }

    Ok(draw)
}

/// Numbers sometimes come through spreadsheets as `7.0`.
fn parse_number(raw: &str) -> Result<u8> {
    if let Ok(n) = raw.parse::<u8>() {
        return Ok(n);
    }
    let value: f64 = raw.parse()?;
    if value.fract() != 0.0 || !(0.0..=255.0).contains(&value) {
        bail!("not a ball number: {}", value);
    }
    Ok(value as u8)
}

/// Reads draws from CSV, skipping malformed rows and dropping repeated
/// rows (same date and same five numbers, first occurrence kept). Undated
/// rows only match other undated rows.
pub fn read_history<R: Read>(reader: R, universe: Universe) -> Result<(History, ImportReport)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = locate_columns(reader.headers().context("cannot read CSV header")?)?;

    let mut report = ImportReport::default();
    let mut seen: HashSet<(Option<NaiveDate>, Combo)> = HashSet::new();
    let mut draws = Vec::new();

    for record_result in reader.records() {
        report.total_records += 1;
        let record = match record_result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("read error on row {}: {}", report.total_records, e);
                report.errors += 1;
                continue;
            }
        };
        match parse_record(&record, &columns, universe) {
            Ok(draw) => {
                if seen.insert((draw.date(), *draw.numbers())) {
                    draws.push(draw);
                    report.kept += 1;
                } else {
                    report.duplicates += 1;
                }
            }
            Err(e) => {
                log::warn!("skipping row {}: {:#}", report.total_records, e);
                report.errors += 1;
            }
        }
    }

    log::info!(
        "imported {} draws ({} duplicates, {} errors)",
        report.kept,
        report.duplicates,
        report.errors
    );

    let history = History::new(universe, draws)?;
    Ok((history, report))
}

pub fn load_history(path: &Path, universe: Universe) -> Result<(History, ImportReport)> {
    let file = std::fs::File::open(path).with_context(|| format!("cannot open {:?}", path))?;
    read_history(file, universe).with_context(|| format!("cannot import {:?}", path))
}
