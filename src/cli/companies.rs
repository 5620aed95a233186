use comfy_table::{Cell, Table};

use crate::cli::{open_session, MappingArgs};
use crate::error::Result;
use crate::reports::CompanyCount;

pub fn run(file: &str, mapping: &MappingArgs) -> Result<()> {
    let session = open_session(file, mapping)?;
    let status = session.status();
    if !status.complete {
        println!("{}", status.message());
        return Ok(());
    }
    println!("{}", format_companies(&session.companies()));
    Ok(())
}

pub fn format_companies(companies: &[CompanyCount]) -> String {
    if companies.is_empty() {
        return "sem dados".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Empresa", "Registros"]);
    for c in companies {
        table.add_row(vec![Cell::new(&c.company), Cell::new(c.records)]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_companies() {
        let out = format_companies(&[
            CompanyCount { company: "Loja Norte".into(), records: 3 },
            CompanyCount { company: "Loja Sul".into(), records: 1 },
        ]);
        assert!(out.contains("Loja Norte"));
        assert!(out.contains("Loja Sul"));
    }

    #[test]
    fn test_format_companies_empty() {
        assert_eq!(format_companies(&[]), "sem dados");
    }
}
