use std::path::Path;

use log::info;

use crate::error::{DashError, Result};
use crate::models::{CellValue, RawRow};

/// The parsed contents of one uploaded file.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub sheet: Option<String>,
}

impl RawTable {
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}

// ---------------------------------------------------------------------------
// Format dispatch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceKind {
    Delimited { tab: bool },
    #[cfg(feature = "xlsx")]
    Workbook,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Delimited { tab: false }),
            "tsv" => Ok(Self::Delimited { tab: true }),
            #[cfg(feature = "xlsx")]
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            _ => Err(DashError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub fn load_table(path: &Path) -> Result<RawTable> {
    let table = match SourceKind::from_path(path)? {
        SourceKind::Delimited { tab } => {
            let bytes = std::fs::read(path)?;
            let delimiter = if tab { b'\t' } else { sniff_delimiter(&bytes) };
            from_grid(read_delimited(&bytes, delimiter)?, None)
        }
        #[cfg(feature = "xlsx")]
        SourceKind::Workbook => {
            let (sheet, grid) = read_workbook(path)?;
            from_grid(grid, Some(sheet))
        }
    };
    info!(
        "Loaded {} row(s) with {} column(s) from {}{}",
        table.rows.len(),
        table.headers.len(),
        path.display(),
        table
            .sheet
            .as_deref()
            .map(|s| format!(" (sheet '{s}')"))
            .unwrap_or_default()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Grid → table
// ---------------------------------------------------------------------------

/// First row is the header row; the rest become `RawRow`s.
pub fn from_grid(grid: Vec<Vec<CellValue>>, sheet: Option<String>) -> RawTable {
    let mut grid = grid.into_iter();
    let Some(header_row) = grid.next() else {
        return RawTable {
            sheet,
            ..RawTable::default()
        };
    };
    let headers = unique_headers(&header_row);

    let rows = grid
        .map(|cells| {
            let mut cells = cells.into_iter();
            RawRow::from_pairs(
                headers
                    .iter()
                    .map(|h| (h.clone(), cells.next().unwrap_or(CellValue::Empty))),
            )
        })
        .filter(|row| !row.is_blank())
        .collect();

    RawTable {
        headers,
        rows,
        sheet,
    }
}

/// Blank headers become `__EMPTY`, `__EMPTY_1`, ...; repeats get `_1`, `_2`, ...
pub fn unique_headers(cells: &[CellValue]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(cells.len());
    for cell in cells {
        let base = match cell.to_string() {
            s if s.is_empty() => "__EMPTY".to_string(),
            s => s,
        };
        let mut name = base.clone();
        let mut n = 0;
        while headers.contains(&name) {
            n += 1;
            name = format!("{base}_{n}");
        }
        headers.push(name);
    }
    headers
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

pub fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes
        .split(|b| *b == b'\n')
        .find(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
        .unwrap_or_default();
    let mut best = (b',', 0usize);
    for d in DELIMITERS {
        let count = first_line.iter().filter(|b| **b == d).count();
        if count > best.1 {
            best = (d, count);
        }
    }
    best.0
}

fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<Vec<Vec<CellValue>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);
    let mut grid = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        grid.push(
            record
                .iter()
                .map(|field| infer_cell(&String::from_utf8_lossy(field)))
                .collect(),
        );
    }
    Ok(grid)
}

fn is_plain_number(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let mantissa = digits.split(['e', 'E']).next().unwrap_or("");
    !mantissa.is_empty()
        && mantissa.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
        && s.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

/// Text cells from delimited files are typed the way spreadsheet apps do.
pub fn infer_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    if is_plain_number(trimmed) {
        if let Ok(n) = trimmed.parse::<f64>() {
            return CellValue::Number(n);
        }
    }
    CellValue::Text(raw.to_string())
}

// ---------------------------------------------------------------------------
// Workbooks (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn read_workbook(path: &Path) -> Result<(String, Vec<Vec<CellValue>>)> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| DashError::Workbook(format!("Failed to open {}: {e}", path.display())))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| DashError::Workbook(format!("{} has no sheets", path.display())))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| DashError::Workbook(format!("Failed to read sheet '{sheet}': {e}")))?;

    let grid = range
        .rows()
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();
    Ok((sheet, grid))
}

#[cfg(feature = "xlsx")]
fn workbook_cell(cell: &calamine::Data) -> CellValue {
    use calamine::Data;

    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        // Dates stay as day serials; the normalizer converts them.
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}
