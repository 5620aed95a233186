use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{DashError, Result};
use crate::fmt::money;

pub const DEFAULT_FILE_NAME: &str = "vendas-demo.csv";

const HEADERS: [&str; 8] = [
    "Empresa",
    "Data",
    "Produto",
    "Categoria",
    "Quantidade",
    "Valor Total",
    "Preco Unitario",
    "Estoque",
];

const COMPANIES: &[&str] = &["Loja Centro", "Loja Norte", "Loja Sul"];

struct DemoProduct {
    name: &'static str,
    category: &'static str,
    unit_price: f64,
}

const PRODUCTS: &[DemoProduct] = &[
    DemoProduct { name: "Café Especial 500g", category: "Mercearia", unit_price: 34.90 },
    DemoProduct { name: "Chá Verde", category: "Mercearia", unit_price: 12.50 },
    DemoProduct { name: "Caneca Cerâmica", category: "Utilidades", unit_price: 29.00 },
    DemoProduct { name: "Moedor Manual", category: "Utilidades", unit_price: 189.90 },
    DemoProduct { name: "Cafeteira Italiana", category: "Eletroportáteis", unit_price: 249.00 },
    DemoProduct { name: "Filtro de Papel", category: "Mercearia", unit_price: 8.75 },
];

/// One sale in the generated sheet.
struct DemoSale {
    company: &'static str,
    date: NaiveDate,
    product: &'static DemoProduct,
    quantity: u32,
    stock: u32,
}

/// Twelve months of sales for every store. The pattern depends only on the
/// indices, so the same year always yields the same file.
fn generate_sales(year: i32) -> Vec<DemoSale> {
    let mut sales = Vec::new();
    for month in 1..=12u32 {
        for (c, company) in COMPANIES.iter().enumerate() {
            for (p, product) in PRODUCTS.iter().enumerate() {
                let (m, c, p) = (month as usize, c, p);
                if (m + c + p) % 3 == 0 {
                    continue;
                }
                let day = 1 + ((c * 9 + p * 4 + m) % 28) as u32;
                let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                    continue;
                };
                sales.push(DemoSale {
                    company: *company,
                    date,
                    product,
                    quantity: 1 + ((m * 7 + c * 3 + p * 5) % 20) as u32,
                    stock: 5 + ((c * 11 + p * 17) % 60) as u32,
                });
            }
        }
    }
    sales
}

/// Amounts are written the way a Brazilian spreadsheet exports them.
fn pt_amount(val: f64) -> String {
    money(val).replacen("R$ ", "", 1)
}

pub fn write_demo_csv(path: &Path, year: i32) -> Result<usize> {
    if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
        return Err(DashError::Other(format!("invalid year: {year}")));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let sales = generate_sales(year);
    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
    wtr.write_record(HEADERS)?;
    for s in &sales {
        let total = f64::from(s.quantity) * s.product.unit_price;
        wtr.write_record([
            s.company.to_string(),
            s.date.format("%d/%m/%Y").to_string(),
            s.product.name.to_string(),
            s.product.category.to_string(),
            s.quantity.to_string(),
            pt_amount(total),
            pt_amount(s.product.unit_price),
            s.stock.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(sales.len())
}

pub fn run(output: Option<String>, year: i32) -> Result<()> {
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME));
    let count = write_demo_csv(&path, year)?;
    println!("Wrote {} ({count} sales)", path.display());
    println!("Try: sheetdash report {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use crate::session::Session;

    #[test]
    fn test_generation_is_deterministic() {
        let a: Vec<(String, u32)> = generate_sales(2024)
            .iter()
            .map(|s| (s.date.to_string(), s.quantity))
            .collect();
        let b: Vec<(String, u32)> = generate_sales(2024)
            .iter()
            .map(|s| (s.date.to_string(), s.quantity))
            .collect();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_pt_amount() {
        assert_eq!(pt_amount(1234.5), "1.234,50");
        assert_eq!(pt_amount(8.75), "8,75");
    }

    #[test]
    fn test_demo_file_loads_with_suggested_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.csv");
        let count = write_demo_csv(&path, 2024).unwrap();

        let session = Session::open(&path).unwrap();
        for field in Field::ALL {
            assert!(session.mapping().get(field).is_some(), "{field:?} not suggested");
        }
        let records = session.records();
        assert_eq!(records.len(), count);
        assert!(records.iter().all(|r| r.date.starts_with("2024-")));
        assert_eq!(session.companies().len(), COMPANIES.len());

        let d = session.dashboard(10);
        assert_eq!(d.value_by_month.len(), 12);
        assert!(d.kpis.total_value > 0.0);
        assert!(!d.stock_turnover.is_empty());
    }

    #[test]
    fn test_invalid_year_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_demo_csv(&dir.path().join("x.csv"), 999_999).is_err());
    }
}
