use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::fmt::{bar, money, number, percent};
use crate::models::{ColumnMapping, Field};
use crate::reports::{Dashboard, Kpis, MonthQuantity, MonthValue, NamedTotal, StockItem};
use crate::session::MappingStatus;

fn right(s: String) -> Cell {
    Cell::new(s).set_alignment(CellAlignment::Right)
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, f64::max)
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

pub fn format_kpis(k: &Kpis) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Registros", "Faturamento", "Qtd. Vendida", "Ticket Médio", "Empresas"]);
    table.add_row(vec![
        right(k.records.to_string()),
        right(money(k.total_value)),
        right(number(k.total_quantity)),
        right(money(k.average_ticket)),
        right(k.companies.to_string()),
    ]);
    table.to_string()
}

pub fn format_value_by_month(months: &[MonthValue], width: usize) -> String {
    let max = max_of(months.iter().map(|m| m.value));
    let mut table = Table::new();
    table.set_header(vec!["Mês", "Valor", ""]);
    for m in months {
        table.add_row(vec![
            Cell::new(&m.month),
            right(money(m.value)),
            Cell::new(bar(m.value, max, width).cyan()),
        ]);
    }
    format!("Faturamento por mês\n{table}")
}

pub fn format_quantity_by_month(months: &[MonthQuantity], width: usize) -> String {
    let max = max_of(months.iter().map(|m| m.quantity));
    let mut table = Table::new();
    table.set_header(vec!["Mês", "Quantidade", ""]);
    for m in months {
        table.add_row(vec![
            Cell::new(&m.month),
            right(number(m.quantity)),
            Cell::new(bar(m.quantity, max, width).blue()),
        ]);
    }
    format!("Quantidade vendida por mês\n{table}")
}

pub fn format_categories(categories: &[NamedTotal], width: usize) -> String {
    let total: f64 = categories.iter().map(|c| c.value).sum();
    let max = max_of(categories.iter().map(|c| c.value));
    let mut table = Table::new();
    table.set_header(vec!["Categoria", "Valor", "%", ""]);
    for c in categories {
        table.add_row(vec![
            Cell::new(&c.name),
            right(money(c.value)),
            right(percent(c.value, total)),
            Cell::new(bar(c.value, max, width).magenta()),
        ]);
    }
    format!("Vendas por categoria\n{table}")
}

pub fn format_top_products(products: &[NamedTotal], width: usize) -> String {
    let max = max_of(products.iter().map(|p| p.value));
    let mut table = Table::new();
    table.set_header(vec!["#", "Produto", "Valor", ""]);
    for (i, p) in products.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&p.name),
            right(money(p.value)),
            Cell::new(bar(p.value, max, width).green()),
        ]);
    }
    format!("Top produtos\n{table}")
}

pub fn format_stock(items: &[StockItem]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Produto", "Estoque", "Vendas", "Estoque/Vendas"]);
    for s in items {
        table.add_row(vec![
            Cell::new(&s.product),
            right(number(s.stock)),
            right(number(s.sales)),
            right(number(s.ratio)),
        ]);
    }
    format!("Giro de estoque (menor razão gira mais rápido)\n{table}")
}

pub fn format_preview(d: &Dashboard) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "Empresa", "Data", "Produto", "Qtd", "Valor Unit.", "Valor Total", "Categoria", "Estoque",
    ]);
    for r in &d.preview {
        table.add_row(vec![
            Cell::new(&r.company),
            Cell::new(&r.date),
            Cell::new(&r.product),
            right(number(r.quantity)),
            right(money(r.unit_price)),
            right(money(r.value)),
            Cell::new(&r.category),
            right(number(r.stock)),
        ]);
    }
    format!(
        "Prévia ({} de {} registros)\n{table}",
        d.preview.len(),
        d.kpis.records
    )
}

// ---------------------------------------------------------------------------
// Full dashboard
// ---------------------------------------------------------------------------

/// Optional sections appear only when their column is mapped.
pub fn format_dashboard(
    d: &Dashboard,
    mapping: &ColumnMapping,
    status: &MappingStatus,
    width: usize,
) -> String {
    if !status.complete {
        let names: Vec<&str> = status.missing.iter().map(|f| f.label()).collect();
        return format!(
            "{} faltando: {}",
            "configuração incompleta".yellow().bold(),
            names.join(", ")
        );
    }

    let company = d.company.as_deref().unwrap_or("Todas");
    let mut sections = vec![
        format!("Empresa: {}", company.bold()),
        format_kpis(&d.kpis),
    ];

    if d.kpis.records == 0 {
        sections.push("sem dados".dimmed().to_string());
        return sections.join("\n\n");
    }

    sections.push(format_value_by_month(&d.value_by_month, width));
    if mapping.get(Field::Quantity).is_some() {
        sections.push(format_quantity_by_month(&d.quantity_by_month, width));
    }
    if mapping.get(Field::Category).is_some() {
        sections.push(format_categories(&d.by_category, width));
    }
    if mapping.get(Field::Product).is_some() {
        sections.push(format_top_products(&d.top_products, width));
    }
    if mapping.get(Field::Stock).is_some() && !d.stock_turnover.is_empty() {
        sections.push(format_stock(&d.stock_turnover));
    }
    if !d.preview.is_empty() {
        sections.push(format_preview(d));
    }
    sections.join("\n\n")
}
