pub mod text;

use serde::Serialize;

use crate::cli::{open_session, MappingArgs};
use crate::error::Result;
use crate::models::ColumnMapping;
use crate::reports::Dashboard;
use crate::session::MappingStatus;
use crate::settings::load_settings;

/// JSON form of `report`: the mapping in effect plus the computed dashboard.
#[derive(Serialize)]
pub struct ReportDocument<'a> {
    pub mapping: &'a ColumnMapping,
    pub status: &'a MappingStatus,
    #[serde(flatten)]
    pub dashboard: &'a Dashboard,
}

pub fn run(
    file: &str,
    mapping: &MappingArgs,
    company: Option<String>,
    json: bool,
    preview: Option<usize>,
) -> Result<()> {
    let settings = load_settings();
    let mut session = open_session(file, mapping)?;
    session.set_company(company.as_deref());

    let dashboard = session.dashboard(preview.unwrap_or(settings.preview_rows));
    let status = session.status();

    if json {
        let doc = ReportDocument {
            mapping: session.mapping(),
            status: &status,
            dashboard: &dashboard,
        };
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!(
            "{}",
            text::format_dashboard(&dashboard, session.mapping(), &status, settings.chart_width)
        );
    }
    Ok(())
}
