/// Group an unsigned digit string in thousands with dots: 1234567 -> 1.234.567
fn group_thousands(int_part: &str) -> String {
    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped.chars().rev().collect()
}

/// Format a float as Brazilian currency: R$ 1.234,56
pub fn money(val: f64) -> String {
    let negative = val < 0.0 && (val * 100.0).round() != 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let grouped = group_thousands(int_part);

    if negative {
        format!("-R$ {grouped},{dec_part}")
    } else {
        format!("R$ {grouped},{dec_part}")
    }
}

/// Format a quantity with pt-BR separators, dropping a zero fraction:
/// 1234 -> 1.234, 12.5 -> 12,5
pub fn number(val: f64) -> String {
    let fixed = format!("{:.2}", val.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let dec_part = dec_part.trim_end_matches('0');
    let sign = if val < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    let grouped = group_thousands(int_part);
    if dec_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped},{dec_part}")
    }
}

/// Horizontal bar scaled so `max` fills `width` cells.
pub fn bar(val: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || val <= 0.0 || width == 0 {
        return String::new();
    }
    let cells = ((val / max) * width as f64).round() as usize;
    "\u{2588}".repeat(cells.clamp(1, width))
}

/// Share of `part` in `total` as a percentage, 0 when the total is 0.
pub fn percent(part: f64, total: f64) -> String {
    let pct = if total == 0.0 { 0.0 } else { part / total * 100.0 };
    format!("{:.1}%", pct).replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "R$ 1.234,56");
        assert_eq!(money(-500.00), "-R$ 500,00");
        assert_eq!(money(0.0), "R$ 0,00");
        assert_eq!(money(1000000.99), "R$ 1.000.000,99");
        assert_eq!(money(42.10), "R$ 42,10");
        assert_eq!(money(-0.001), "R$ 0,00");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(1234.0), "1.234");
        assert_eq!(number(12.5), "12,5");
        assert_eq!(number(0.0), "0");
        assert_eq!(number(-3.25), "-3,25");
        assert_eq!(number(1234567.891), "1.234.567,89");
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(10.0, 10.0, 5), "\u{2588}".repeat(5));
        assert_eq!(bar(5.0, 10.0, 4), "\u{2588}".repeat(2));
        // Tiny but positive values stay visible.
        assert_eq!(bar(0.01, 10.0, 4), "\u{2588}");
        assert_eq!(bar(0.0, 10.0, 4), "");
        assert_eq!(bar(-1.0, 10.0, 4), "");
        assert_eq!(bar(1.0, 0.0, 4), "");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1.0, 4.0), "25,0%");
        assert_eq!(percent(1.0, 0.0), "0,0%");
    }
}
