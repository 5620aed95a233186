use std::path::{Path, PathBuf};

use log::warn;

use crate::cli::{open_session, MappingArgs};
use crate::error::Result;
use crate::settings::{load_settings, shellexpand_path};

pub const DEFAULT_FILE_NAME: &str = "relatorio-demo.pdf";

fn default_path(export_dir: &str) -> PathBuf {
    shellexpand_path(export_dir).join(DEFAULT_FILE_NAME)
}

fn write_pdf(bytes: &[u8], path: &Path) -> Result<String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    let display = format!("{}", path.display());
    println!("Wrote {display}");
    Ok(display)
}

/// Render the (optionally filtered) report and write it. Returns the path.
pub fn run(
    file: &str,
    mapping: &MappingArgs,
    company: Option<String>,
    output: Option<String>,
    detailed: bool,
) -> Result<String> {
    let settings = load_settings();
    let mut session = open_session(file, mapping)?;
    session.set_company(company.as_deref());

    let status = session.status();
    if !status.complete {
        warn!("{}; exporting an empty report", status.message());
    }

    let dashboard = session.dashboard(settings.preview_rows);
    let bytes = crate::pdf::render_report(&dashboard, detailed)?;
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&settings.export_dir));
    write_pdf(&bytes, &path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_uses_export_dir() {
        assert_eq!(
            default_path("/tmp/reports"),
            PathBuf::from("/tmp/reports/relatorio-demo.pdf")
        );
    }

    #[test]
    fn test_write_pdf_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("r.pdf");
        let shown = write_pdf(b"%PDF-1.3", &path).unwrap();
        assert!(path.exists());
        assert!(shown.ends_with("r.pdf"));
    }
}
