use std::path::Path;

use log::warn;
use serde::Serialize;

use crate::error::{DashError, Result};
use crate::loader::{load_table, RawTable};
use crate::models::{ColumnMapping, Field, NormalizedRecord};
use crate::normalizer::normalize;
use crate::reports::{build_dashboard, companies, CompanyCount, Dashboard};
use crate::suggester::suggest_mapping;

/// Whether the current mapping is usable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingStatus {
    pub complete: bool,
    pub missing: Vec<Field>,
    pub extras: usize,
}

impl MappingStatus {
    pub fn message(&self) -> String {
        if self.complete {
            "\u{2705} Configuração válida".to_string()
        } else {
            let names: Vec<&str> = self.missing.iter().map(|f| f.label()).collect();
            format!(
                "\u{26a0}\u{fe0f} Preencha os campos obrigatórios: {}",
                names.join(", ")
            )
        }
    }
}

/// One loaded sheet plus the user's current choices. Everything derived is
/// recomputed from this state on demand.
#[derive(Debug, Clone)]
pub struct Session {
    table: RawTable,
    mapping: ColumnMapping,
    company: Option<String>,
}

impl Session {
    /// Start from the suggested mapping for the table's headers.
    pub fn new(table: RawTable) -> Self {
        let mapping = suggest_mapping(&table.headers);
        Self {
            table,
            mapping,
            company: None,
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(load_table(path)?))
    }

    pub fn table(&self) -> &RawTable {
        &self.table
    }

    pub fn headers(&self) -> &[String] {
        &self.table.headers
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn clear_mapping(&mut self) {
        self.mapping = ColumnMapping::default();
    }

    /// Point `field` at `column`. An empty column unsets the field.
    pub fn set_column(&mut self, field: Field, column: &str) -> Result<()> {
        if !column.is_empty() && !self.table.has_header(column) {
            return Err(DashError::UnknownColumn(format!(
                "'{column}' (available: {})",
                self.table.headers.join(", ")
            )));
        }
        self.mapping.set(field, Some(column.to_string()));
        Ok(())
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    /// Select a company, or clear the filter with `None` or an empty name.
    pub fn set_company(&mut self, company: Option<&str>) {
        self.company = company.filter(|c| !c.is_empty()).map(str::to_string);
    }

    pub fn records(&self) -> Vec<NormalizedRecord> {
        normalize(&self.table.rows, &self.mapping)
    }

    pub fn companies(&self) -> Vec<CompanyCount> {
        companies(&self.records())
    }

    pub fn dashboard(&self, preview_rows: usize) -> Dashboard {
        let records = self.records();
        if let Some(c) = self.company() {
            if !records.iter().any(|r| r.company == c) {
                warn!("company '{c}' not found in the data");
            }
        }
        build_dashboard(&records, self.company(), preview_rows)
    }

    pub fn status(&self) -> MappingStatus {
        MappingStatus {
            complete: self.mapping.is_complete(),
            missing: self.mapping.missing_required(),
            extras: self.mapping.extras_count(),
        }
    }
}
