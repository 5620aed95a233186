use std::io::BufWriter;

use printpdf::*;

use crate::error::{DashError, Result};
use crate::fmt::{money, number};
use crate::reports::Dashboard;

pub const REPORT_TITLE: &str = "Relatório Financeiro (Demo)";
const BULLET: &str = "\u{2022} ";

// A4 dimensions (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 14.0;
const TOP: f32 = 20.0;
const BOTTOM: f32 = 20.0;
const ROW_H: f32 = 6.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;

// ---------------------------------------------------------------------------
// Summary text
// ---------------------------------------------------------------------------

/// The summary block shared by every export: company, record count, total
/// and one bullet per month.
pub fn summary_lines(report: &Dashboard) -> Vec<String> {
    let company = report.company.as_deref().unwrap_or("Todas");
    let mut lines = vec![
        format!("Empresa: {company}"),
        format!("Registros: {}", report.kpis.records),
        format!("Total: {}", money(report.kpis.total_value)),
        "Mensal:".to_string(),
    ];
    lines.extend(
        report
            .value_by_month
            .iter()
            .map(|m| format!("{BULLET}{}: {}", m.month, money(m.value))),
    );
    lines
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

/// A titled ranking table: column headers with width and alignment, then
/// preformatted cells.
struct Ranking<'a> {
    title: &'a str,
    columns: &'a [(&'a str, f32, Align)],
    rows: Vec<Vec<String>>,
}

/// Top-down cursor over an A4 document. `cursor` is the distance from the
/// top edge of the current page.
struct Canvas {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    cursor: f32,
}

impl Canvas {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| DashError::Pdf(format!("{e:?}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| DashError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            regular,
            bold,
            page,
            layer,
            cursor: TOP,
        })
    }

    fn layer(&self) -> PdfLayerReference {
        self.doc.get_page(self.page).get_layer(self.layer)
    }

    /// Break to a fresh page unless `height` still fits above the bottom margin.
    fn reserve(&mut self, height: f32) {
        if self.cursor + height <= PAGE_H - BOTTOM {
            return;
        }
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.page = page;
        self.layer = layer;
        self.cursor = TOP;
    }

    fn put(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer()
            .use_text(s, size, Mm(x), Mm(PAGE_H - self.cursor), font);
    }

    fn rule(&self) {
        let y = Mm(PAGE_H - self.cursor);
        let layer = self.layer();
        layer.set_outline_thickness(0.5);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), y), false),
                (Point::new(Mm(PAGE_W - MARGIN), y), false),
            ],
            is_closed: false,
        });
    }

    fn title_block(&mut self) {
        self.put(REPORT_TITLE, MARGIN, TITLE_SIZE, true);
        self.cursor += 8.0;
        let stamp = chrono::Local::now().format("Gerado em %d/%m/%Y %H:%M");
        self.put(&stamp.to_string(), MARGIN, 8.0, false);
        self.cursor += 5.0;
        self.rule();
        self.cursor += 7.0;
    }

    /// One summary line. Bullets are indented, labels ending in `:` are bold.
    fn summary(&mut self, line: &str) {
        self.reserve(ROW_H);
        if line.starts_with(BULLET) {
            self.put(line, MARGIN + 4.0, FONT_SIZE, false);
        } else if line.ends_with(':') {
            self.cursor += ROW_H / 2.0;
            self.put(line, MARGIN, FONT_SIZE, true);
        } else {
            self.put(line, MARGIN, FONT_SIZE, false);
        }
        self.cursor += ROW_H;
    }

    fn row(&mut self, columns: &[(&str, f32, Align)], cells: &[&str], bold: bool) {
        self.reserve(ROW_H);
        let mut x = MARGIN;
        for (&(_, width, align), cell) in columns.iter().zip(cells) {
            let left = match align {
                Align::Left => x,
                // Helvetica averages a little under 0.18 mm per point per glyph.
                Align::Right => x + width - cell.chars().count() as f32 * FONT_SIZE * 0.18,
            };
            self.put(cell, left, FONT_SIZE, bold);
            x += width;
        }
        self.cursor += ROW_H;
    }

    fn ranking(&mut self, table: &Ranking) {
        if table.rows.is_empty() {
            return;
        }
        self.reserve(ROW_H * 3.0);
        self.cursor += ROW_H / 2.0;
        self.put(table.title, MARGIN, FONT_SIZE, true);
        self.cursor += ROW_H;

        let headers: Vec<&str> = table.columns.iter().map(|c| c.0).collect();
        self.row(table.columns, &headers, true);
        self.rule();
        self.cursor += 2.0;
        for cells in &table.rows {
            let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
            self.row(table.columns, &cells, false);
        }
    }

    fn finish(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| DashError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| DashError::Pdf(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

/// Render the dashboard summary. `detailed` adds the category, product and
/// stock rankings after the monthly listing.
pub fn render_report(report: &Dashboard, detailed: bool) -> Result<Vec<u8>> {
    let mut canvas = Canvas::new(REPORT_TITLE)?;
    canvas.title_block();
    for line in summary_lines(report) {
        canvas.summary(&line);
    }

    if detailed {
        for table in rankings(report) {
            canvas.ranking(&table);
        }
    }
    canvas.finish()
}

fn rankings(report: &Dashboard) -> [Ranking<'static>; 3] {
    const CATEGORY: &[(&str, f32, Align)] =
        &[("Categoria", 130.0, Align::Left), ("Valor", 52.0, Align::Right)];
    const PRODUCT: &[(&str, f32, Align)] =
        &[("Produto", 130.0, Align::Left), ("Valor", 52.0, Align::Right)];
    const STOCK: &[(&str, f32, Align)] = &[
        ("Produto", 92.0, Align::Left),
        ("Estoque", 30.0, Align::Right),
        ("Vendas", 30.0, Align::Right),
        ("Razão", 30.0, Align::Right),
    ];
    [
        Ranking {
            title: "Por categoria",
            columns: CATEGORY,
            rows: report
                .by_category
                .iter()
                .map(|c| vec![c.name.clone(), money(c.value)])
                .collect(),
        },
        Ranking {
            title: "Top produtos",
            columns: PRODUCT,
            rows: report
                .top_products
                .iter()
                .map(|p| vec![p.name.clone(), money(p.value)])
                .collect(),
        },
        Ranking {
            title: "Giro de estoque",
            columns: STOCK,
            rows: report
                .stock_turnover
                .iter()
                .map(|s| {
                    vec![
                        s.product.clone(),
                        number(s.stock),
                        number(s.sales),
                        number(s.ratio),
                    ]
                })
                .collect(),
        },
    ]
}
