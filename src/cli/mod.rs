pub mod columns;
pub mod companies;
pub mod config;
pub mod demo;
#[cfg(feature = "pdf")]
pub mod export;
pub mod report;

use std::path::Path;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::models::Field;
use crate::session::Session;

#[derive(Parser)]
#[command(
    name = "sheetdash",
    version,
    about = "Turn a sales/finance spreadsheet into KPIs, charts and a PDF report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Column overrides shared by every command that reads a sheet.
/// Explicit flags win over the suggested mapping; an empty value unsets.
#[derive(Args, Debug, Clone, Default)]
pub struct MappingArgs {
    /// Column identifying the company/store (required)
    #[arg(long = "id-col")]
    pub id_col: Option<String>,
    /// Column holding the sale date (required)
    #[arg(long = "date-col")]
    pub date_col: Option<String>,
    /// Column holding the total value (required)
    #[arg(long = "value-col")]
    pub value_col: Option<String>,
    #[arg(long = "category-col")]
    pub category_col: Option<String>,
    #[arg(long = "product-col")]
    pub product_col: Option<String>,
    #[arg(long = "quantity-col")]
    pub quantity_col: Option<String>,
    #[arg(long = "unit-price-col")]
    pub unit_price_col: Option<String>,
    #[arg(long = "stock-col")]
    pub stock_col: Option<String>,
    /// Start from an empty mapping instead of the suggested one
    #[arg(long = "no-suggest")]
    pub no_suggest: bool,
}

impl MappingArgs {
    fn overrides(&self) -> [(Field, Option<&String>); 8] {
        [
            (Field::Company, self.id_col.as_ref()),
            (Field::Date, self.date_col.as_ref()),
            (Field::Value, self.value_col.as_ref()),
            (Field::Category, self.category_col.as_ref()),
            (Field::Product, self.product_col.as_ref()),
            (Field::Quantity, self.quantity_col.as_ref()),
            (Field::UnitPrice, self.unit_price_col.as_ref()),
            (Field::Stock, self.stock_col.as_ref()),
        ]
    }
}

/// Load `file` and apply the mapping flags on top of the suggestion.
pub(crate) fn open_session(file: &str, mapping: &MappingArgs) -> Result<Session> {
    let mut session = Session::open(Path::new(file))?;
    if mapping.no_suggest {
        session.clear_mapping();
    }
    for (field, column) in mapping.overrides() {
        if let Some(column) = column {
            session.set_column(field, column)?;
        }
    }
    Ok(session)
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the sheet's columns and the suggested field mapping.
    Columns {
        /// CSV/TSV/TXT or workbook file
        file: String,
    },
    /// List the companies found in the sheet.
    Companies {
        file: String,
        #[command(flatten)]
        mapping: MappingArgs,
    },
    /// Show the dashboard: KPIs, monthly charts, rankings and a preview.
    Report {
        file: String,
        #[command(flatten)]
        mapping: MappingArgs,
        /// Only include this company
        #[arg(long)]
        company: Option<String>,
        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
        /// Number of preview rows (default: settings.preview_rows)
        #[arg(long)]
        preview: Option<usize>,
    },
    /// Export the report to PDF.
    #[cfg(feature = "pdf")]
    Export {
        file: String,
        #[command(flatten)]
        mapping: MappingArgs,
        /// Only include this company
        #[arg(long)]
        company: Option<String>,
        /// Output file path (default: <export_dir>/relatorio-demo.pdf)
        #[arg(long)]
        output: Option<String>,
        /// Also list categories, top products and stock turnover
        #[arg(long)]
        detailed: bool,
    },
    /// Write a sample spreadsheet to try the other commands on.
    Demo {
        /// Output file path (default: ./vendas-demo.csv)
        #[arg(long)]
        output: Option<String>,
        /// Year the sample sales fall in
        #[arg(long, default_value_t = 2024)]
        year: i32,
    },
    /// Show or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current settings.
    Show,
    /// Update one or more settings.
    Set {
        /// Default directory for PDF exports
        #[arg(long = "export-dir")]
        export_dir: Option<String>,
        /// Rows shown in the dashboard preview
        #[arg(long = "preview-rows")]
        preview_rows: Option<usize>,
        /// Width of the terminal bar charts
        #[arg(long = "chart-width")]
        chart_width: Option<usize>,
    },
}
