use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime};
use log::debug;

use crate::models::{CellValue, ColumnMapping, NormalizedRecord, RawRow};

/// Placeholder for an unmapped category or product.
pub const UNMAPPED: &str = "\u{2014}";

/// Days between the spreadsheet epoch (1899-12-30) and 1970-01-01.
pub const SERIAL_EPOCH_OFFSET: f64 = 25569.0;

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Parse a loosely formatted amount. Anything unparsable is 0.
///
/// Only digits, `,`, `.` and `-` survive. When both separators appear the
/// last one is the decimal mark; a lone separator is decimal when it occurs
/// once and grouping otherwise. So `1.234,56`, `1,234.56` and `R$ 1234,56`
/// all read as 1234.56.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) if cleaned.matches(',').count() == 1 => cleaned.replace(',', "."),
        (Some(_), None) => cleaned.replace(',', ""),
        (None, Some(_)) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

pub fn cell_amount(cell: &CellValue) -> f64 {
    match cell {
        CellValue::Number(n) if n.is_finite() => *n,
        other => parse_amount(&other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

const YEAR_FIRST: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const DAY_FIRST: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const MONTH_FIRST: &[&str] = &["%m/%d/%Y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

fn has_four_digit_year(date: &str, year_first: bool) -> bool {
    let part = if year_first {
        date.split(['-', '/', '.']).next()
    } else {
        date.rsplit(['-', '/', '.']).next()
    };
    part.is_some_and(|p| p.len() == 4 && p.chars().all(|c| c.is_ascii_digit()))
}

fn parse_date_part(date: &str) -> Option<NaiveDate> {
    let attempt = |formats: &[&str], year_first: bool| {
        if !has_four_digit_year(date, year_first) {
            return None;
        }
        formats
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(date, f).ok())
    };
    attempt(YEAR_FIRST, true)
        .or_else(|| attempt(DAY_FIRST, false))
        .or_else(|| attempt(MONTH_FIRST, false))
        .or_else(|| {
            // "2024-03" reads as the first of the month.
            let (y, m) = date.split_once('-')?;
            if y.len() != 4 || m.is_empty() || m.len() > 2 {
                return None;
            }
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)
        })
}

fn is_time_of_day(raw: &str) -> bool {
    let raw = raw.trim().trim_end_matches(['Z', 'z']);
    TIME_FORMATS
        .iter()
        .any(|f| NaiveTime::parse_from_str(raw, f).is_ok())
}

/// Calendar parsing of a date string. Any time of day is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    let (date, time) = match raw.split_once(|c: char| c == 'T' || c.is_whitespace()) {
        Some((date, time)) => (date, Some(time)),
        None => (raw, None),
    };
    if let Some(time) = time {
        if !is_time_of_day(time) {
            return None;
        }
    }
    parse_date_part(date)
}

/// Spreadsheet day serial → calendar date, truncating any time fraction.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = (serial - SERIAL_EPOCH_OFFSET).floor();
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    if days >= 0.0 {
        epoch.checked_add_days(Days::new(days as u64))
    } else {
        epoch.checked_sub_days(Days::new((-days) as u64))
    }
}

/// Generic parse first; numeric cells fall back to the day serial.
pub fn cell_date(cell: &CellValue) -> Option<NaiveDate> {
    parse_date(&cell.to_string()).or_else(|| cell.as_number().and_then(serial_to_date))
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

fn text_or_unmapped(row: &RawRow, column: Option<&str>) -> String {
    match column {
        Some(col) => row.get(col).to_string().trim().to_string(),
        None => UNMAPPED.to_string(),
    }
}

fn amount_or_zero(row: &RawRow, column: Option<&str>) -> f64 {
    column.map(|col| cell_amount(row.get(col))).unwrap_or(0.0)
}

/// Normalize one row. `None` when it has no company or no usable date.
pub fn normalize_row(index: usize, row: &RawRow, mapping: &ColumnMapping) -> Option<NormalizedRecord> {
    let (id_col, date_col, value_col) = (
        mapping.id_col.as_deref()?,
        mapping.date_col.as_deref()?,
        mapping.value_col.as_deref()?,
    );

    let company = row.get(id_col).to_string().trim().to_string();
    if company.is_empty() {
        return None;
    }
    let date = cell_date(row.get(date_col))?;

    Some(NormalizedRecord {
        company,
        date: date.format("%Y-%m-%d").to_string(),
        month: format!("{:04}-{:02}", date.year(), date.month()),
        value: cell_amount(row.get(value_col)),
        category: text_or_unmapped(row, mapping.category_col.as_deref()),
        product: text_or_unmapped(row, mapping.product_col.as_deref()),
        quantity: amount_or_zero(row, mapping.quantity_col.as_deref()),
        unit_price: amount_or_zero(row, mapping.unit_price_col.as_deref()),
        stock: amount_or_zero(row, mapping.stock_col.as_deref()),
        row: index,
    })
}

/// Normalize every row, keeping original order. Rows without a company or a
/// valid date are dropped; an incomplete mapping yields nothing.
pub fn normalize(rows: &[RawRow], mapping: &ColumnMapping) -> Vec<NormalizedRecord> {
    if rows.is_empty() || !mapping.is_complete() {
        return Vec::new();
    }
    let records: Vec<NormalizedRecord> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| normalize_row(i, row, mapping))
        .collect();
    let dropped = rows.len() - records.len();
    if dropped > 0 {
        debug!("Dropped {dropped} row(s) without a company or a valid date");
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn mapping(id: &str, date: &str, value: &str) -> ColumnMapping {
        let mut m = ColumnMapping::default();
        m.set(Field::Company, Some(id.to_string()));
        m.set(Field::Date, Some(date.to_string()));
        m.set(Field::Value, Some(value.to_string()));
        m
    }

    fn sale(company: &str, date: CellValue, value: &str) -> RawRow {
        RawRow::from_pairs([
            ("Empresa", text(company)),
            ("Data", date),
            ("Valor", text(value)),
        ])
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1.234,56"), 1234.56);
        assert_eq!(parse_amount("1,234.56"), 1234.56);
        assert_eq!(parse_amount("R$ 1.234,56"), 1234.56);
        assert_eq!(parse_amount("12,5"), 12.5);
        assert_eq!(parse_amount("1.234.567"), 1234567.0);
        assert_eq!(parse_amount("1,234,567"), 1234567.0);
        assert_eq!(parse_amount("-42.50"), -42.5);
        assert_eq!(parse_amount("3.5"), 3.5);
        assert_eq!(parse_amount("100"), 100.0);
    }

    #[test]
    fn test_parse_amount_defaults_to_zero() {
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("-"), 0.0);
        assert_eq!(parse_amount("12-3"), 0.0);
        assert_eq!(parse_amount("1,2.3,4"), 0.0);
    }

    #[test]
    fn test_cell_amount() {
        assert_eq!(cell_amount(&CellValue::Number(7.25)), 7.25);
        assert_eq!(cell_amount(&CellValue::Number(f64::NAN)), 0.0);
        assert_eq!(cell_amount(&CellValue::Bool(true)), 0.0);
        assert_eq!(cell_amount(&CellValue::Empty), 0.0);
        assert_eq!(cell_amount(&text("2.000,10")), 2000.1);
    }

    #[test]
    fn test_parse_date_formats() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day);
        assert_eq!(parse_date("2024-01-15"), d(2024, 1, 15));
        assert_eq!(parse_date(" 2024/1/5 "), d(2024, 1, 5));
        assert_eq!(parse_date("2024-01-15T10:30:00"), d(2024, 1, 15));
        assert_eq!(parse_date("2024-01-15 10:30"), d(2024, 1, 15));
        assert_eq!(parse_date("2024-01-15T10:30:00Z"), d(2024, 1, 15));
        assert_eq!(parse_date("2024-01-15T23:30:00-03:00"), d(2024, 1, 15));
        assert_eq!(parse_date("2024-03"), d(2024, 3, 1));
        assert_eq!(parse_date("15/01/2024"), d(2024, 1, 15));
        assert_eq!(parse_date("05/02/2024"), d(2024, 2, 5));
        assert_eq!(parse_date("01/15/2024"), d(2024, 1, 15));
        assert_eq!(parse_date("15.01.2024 08:00:00"), d(2024, 1, 15));
    }

    #[test]
    fn test_parse_date_rejects_invalid() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("abc"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("15/01/24"), None);
        assert_eq!(parse_date("2024-01-15 later"), None);
        assert_eq!(parse_date("45292"), None);
    }

    #[test]
    fn test_parse_date_multibyte_time_separator() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(parse_date("15/01/2024\u{00A0}10:30"), d);
        assert_eq!(parse_date("2024-01-15\u{3000}08:00"), d);
        assert_eq!(parse_date("2024-01-15\u{00A0}depois"), None);

        let rows = vec![sale("A", text("2024-01-15\u{00A0}08:00"), "10")];
        let out = normalize(&rows, &mapping("Empresa", "Data", "Valor"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, "2024-01-15");
    }

    #[test]
    fn test_serial_to_date() {
        assert_eq!(serial_to_date(45292.0), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(serial_to_date(45292.75), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(serial_to_date(25569.0), NaiveDate::from_ymd_opt(1970, 1, 1));
        assert_eq!(serial_to_date(25568.0), NaiveDate::from_ymd_opt(1969, 12, 31));
        assert_eq!(serial_to_date(f64::INFINITY), None);
        assert_eq!(serial_to_date(1e300), None);
    }

    #[test]
    fn test_numeric_serial_fallback() {
        let rows = vec![sale("A", CellValue::Number(45292.0), "10")];
        let out = normalize(&rows, &mapping("Empresa", "Data", "Valor"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, "2024-01-01");
        assert_eq!(out[0].month, "2024-01");
    }

    #[test]
    fn test_scenario_pt_br_amount() {
        let rows = vec![sale("A", text("2024-01-15"), "1.234,56")];
        let out = normalize(&rows, &mapping("Empresa", "Data", "Valor"));
        assert_eq!(out.len(), 1);
        let r = &out[0];
        assert_eq!(r.company, "A");
        assert_eq!(r.date, "2024-01-15");
        assert_eq!(r.month, "2024-01");
        assert_eq!(r.value, 1234.56);
        assert_eq!(r.category, UNMAPPED);
        assert_eq!(r.product, UNMAPPED);
        assert_eq!(r.quantity, 0.0);
        assert_eq!(r.unit_price, 0.0);
        assert_eq!(r.stock, 0.0);
        assert_eq!(r.row, 0);
    }

    #[test]
    fn test_scenario_bad_amount_keeps_record() {
        let rows = vec![sale("A", text("2024-01-15"), "abc")];
        let out = normalize(&rows, &mapping("Empresa", "Data", "Valor"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 0.0);
    }

    #[test]
    fn test_missing_required_mapping_yields_nothing() {
        let rows = vec![sale("A", text("2024-01-15"), "10")];
        let mut m = mapping("Empresa", "Data", "Valor");
        m.set(Field::Company, None);
        assert!(normalize(&rows, &m).is_empty());
        let mut m = mapping("Empresa", "Data", "Valor");
        m.set(Field::Value, None);
        assert!(normalize(&rows, &m).is_empty());
        assert!(normalize(&[], &mapping("Empresa", "Data", "Valor")).is_empty());
    }

    #[test]
    fn test_drops_rows_without_company_or_date() {
        let rows = vec![
            sale("  ", text("2024-01-15"), "10"),
            sale("B", text("not a date"), "10"),
            sale("C", CellValue::Empty, "10"),
            sale(" D ", text("2024-02-01"), "10"),
        ];
        let out = normalize(&rows, &mapping("Empresa", "Data", "Valor"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].company, "D");
        assert_eq!(out[0].row, 3);
        assert!(out.iter().all(|r| !r.company.is_empty() && parse_date(&r.date).is_some()));
    }

    #[test]
    fn test_optional_columns() {
        let row = RawRow::from_pairs([
            ("Empresa", CellValue::Number(12345678000190.0)),
            ("Data", text("2024-05-10")),
            ("Valor", CellValue::Number(99.9)),
            ("Categoria", text("  Bebidas ")),
            ("Produto", CellValue::Empty),
            ("Qtd", text("3")),
            ("Preco", text("33,30")),
            ("Estoque", text("n/d")),
        ]);
        let mut m = mapping("Empresa", "Data", "Valor");
        m.set(Field::Category, Some("Categoria".into()));
        m.set(Field::Product, Some("Produto".into()));
        m.set(Field::Quantity, Some("Qtd".into()));
        m.set(Field::UnitPrice, Some("Preco".into()));
        m.set(Field::Stock, Some("Estoque".into()));
        let out = normalize(&[row], &m);
        let r = &out[0];
        assert_eq!(r.company, "12345678000190");
        assert_eq!(r.value, 99.9);
        assert_eq!(r.category, "Bebidas");
        // Mapped but blank stays blank rather than the placeholder.
        assert_eq!(r.product, "");
        assert_eq!(r.quantity, 3.0);
        assert_eq!(r.unit_price, 33.3);
        assert_eq!(r.stock, 0.0);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let rows = vec![
            sale("A", text("2024-01-15"), "1.234,56"),
            sale("B", CellValue::Number(45300.0), "7"),
            sale("", text("2024-01-15"), "1"),
        ];
        let m = mapping("Empresa", "Data", "Valor");
        assert_eq!(normalize(&rows, &m), normalize(&rows, &m));
    }
}
