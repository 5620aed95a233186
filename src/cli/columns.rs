use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::models::Field;
use crate::session::Session;
use crate::suggester::matching_fields;

pub fn run(file: &str) -> Result<()> {
    let session = Session::open(Path::new(file))?;
    println!("{}", format_columns(&session));
    Ok(())
}

pub fn format_columns(session: &Session) -> String {
    let table = session.table();
    let mut out = String::new();
    match &table.sheet {
        Some(sheet) => out.push_str(&format!(
            "{} linha(s), planilha '{sheet}'\n",
            table.rows.len()
        )),
        None => out.push_str(&format!("{} linha(s)\n", table.rows.len())),
    }

    let mut headers = Table::new();
    headers.set_header(vec!["#", "Coluna", "Campos compatíveis"]);
    for (i, h) in session.headers().iter().enumerate() {
        let fields: Vec<&str> = matching_fields(h).iter().map(|f| f.label()).collect();
        headers.add_row(vec![
            Cell::new(i + 1),
            Cell::new(h),
            Cell::new(fields.join(", ")),
        ]);
    }
    out.push_str(&format!("{headers}\n"));

    let mut mapping = Table::new();
    mapping.set_header(vec!["Campo", "Coluna", "Flag"]);
    for field in Field::ALL {
        let label = if field.is_required() {
            format!("{} *", field.label())
        } else {
            field.label().to_string()
        };
        let column = match session.mapping().get(field) {
            Some(c) => Cell::new(c),
            None => Cell::new("—".dimmed()),
        };
        let flag = format!("--{}-col", field.key().replace('_', "-"));
        mapping.add_row(vec![Cell::new(label), column, Cell::new(flag.dimmed())]);
    }
    out.push_str(&format!("{mapping}\n"));

    let status = session.status();
    if status.complete {
        out.push_str(&status.message().green().to_string());
    } else {
        out.push_str(&status.message().yellow().to_string());
    }
    out.push_str(&format!("\nAnálises extras: {}", status.extras));
    out
}
