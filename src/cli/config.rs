use comfy_table::{Cell, Table};

use crate::cli::ConfigCommands;
use crate::error::{DashError, Result};
use crate::settings::{load_settings, save_settings, settings_path, Settings};

pub fn run(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("{}", format_settings(&load_settings()));
            println!("{}", settings_path().display());
            Ok(())
        }
        ConfigCommands::Set {
            export_dir,
            preview_rows,
            chart_width,
        } => {
            let settings = apply(load_settings(), export_dir, preview_rows, chart_width)?;
            save_settings(&settings)?;
            println!("Saved {}", settings_path().display());
            Ok(())
        }
    }
}

fn apply(
    mut settings: Settings,
    export_dir: Option<String>,
    preview_rows: Option<usize>,
    chart_width: Option<usize>,
) -> Result<Settings> {
    if export_dir.is_none() && preview_rows.is_none() && chart_width.is_none() {
        return Err(DashError::Settings(
            "nothing to set (use --export-dir, --preview-rows or --chart-width)".into(),
        ));
    }
    if let Some(dir) = export_dir {
        settings.export_dir = dir;
    }
    if let Some(n) = preview_rows {
        settings.preview_rows = n;
    }
    if let Some(w) = chart_width {
        if w == 0 {
            return Err(DashError::Settings("chart width must be at least 1".into()));
        }
        settings.chart_width = w;
    }
    Ok(settings)
}

pub fn format_settings(settings: &Settings) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![Cell::new("export_dir"), Cell::new(&settings.export_dir)]);
    table.add_row(vec![Cell::new("preview_rows"), Cell::new(settings.preview_rows)]);
    table.add_row(vec![Cell::new("chart_width"), Cell::new(settings.chart_width)]);
    table.to_string()
}
