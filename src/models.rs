use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell as read from the uploaded sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// One spreadsheet row keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRow {
    cells: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, CellValue)>) -> Self {
        Self {
            cells: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Missing headers read as an empty cell.
    pub fn get(&self, header: &str) -> &CellValue {
        self.cells.get(header).unwrap_or(&EMPTY_CELL)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_empty)
    }
}

/// Semantic fields a column can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Company,
    Date,
    Value,
    Category,
    Product,
    Quantity,
    UnitPrice,
    Stock,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Company,
        Field::Date,
        Field::Value,
        Field::Category,
        Field::Product,
        Field::Quantity,
        Field::UnitPrice,
        Field::Stock,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Company => "id",
            Self::Date => "date",
            Self::Value => "value",
            Self::Category => "category",
            Self::Product => "product",
            Self::Quantity => "quantity",
            Self::UnitPrice => "unit_price",
            Self::Stock => "stock",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Company => "Empresa/Loja",
            Self::Date => "Data da venda",
            Self::Value => "Valor total",
            Self::Category => "Categoria",
            Self::Product => "Produto/Item",
            Self::Quantity => "Quantidade vendida",
            Self::UnitPrice => "Valor unitário",
            Self::Stock => "Estoque atual",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::Company | Self::Date | Self::Value)
    }
}

/// Which header feeds each semantic field. `None` means unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub id_col: Option<String>,
    pub date_col: Option<String>,
    pub value_col: Option<String>,
    pub category_col: Option<String>,
    pub product_col: Option<String>,
    pub quantity_col: Option<String>,
    pub unit_price_col: Option<String>,
    pub stock_col: Option<String>,
}

impl ColumnMapping {
    pub fn get(&self, field: Field) -> Option<&str> {
        let col = match field {
            Field::Company => &self.id_col,
            Field::Date => &self.date_col,
            Field::Value => &self.value_col,
            Field::Category => &self.category_col,
            Field::Product => &self.product_col,
            Field::Quantity => &self.quantity_col,
            Field::UnitPrice => &self.unit_price_col,
            Field::Stock => &self.stock_col,
        };
        col.as_deref()
    }

    /// An empty column name clears the field.
    pub fn set(&mut self, field: Field, column: Option<String>) {
        let column = column.filter(|c| !c.is_empty());
        let slot = match field {
            Field::Company => &mut self.id_col,
            Field::Date => &mut self.date_col,
            Field::Value => &mut self.value_col,
            Field::Category => &mut self.category_col,
            Field::Product => &mut self.product_col,
            Field::Quantity => &mut self.quantity_col,
            Field::UnitPrice => &mut self.unit_price_col,
            Field::Stock => &mut self.stock_col,
        };
        *slot = column;
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    pub fn missing_required(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| f.is_required() && self.get(*f).is_none())
            .collect()
    }

    /// Number of optional analyses switched on.
    pub fn extras_count(&self) -> usize {
        Field::ALL
            .into_iter()
            .filter(|f| !f.is_required() && self.get(*f).is_some())
            .count()
    }
}

/// A row after type coercion. Only rows with a company and a valid date
/// become records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub company: String,
    pub date: String,
    pub month: String,
    pub value: f64,
    pub category: String,
    pub product: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub stock: f64,
    /// Index of the originating row in the loaded table.
    pub row: usize,
}
