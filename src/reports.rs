use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::NormalizedRecord;

/// Rankings never list more than this many entries.
pub const TOP_N: usize = 10;

pub fn round2(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Company filter
// ---------------------------------------------------------------------------

/// Exact-match company filter. `None` or an empty name keeps everything.
pub fn filter_by_company<'a>(
    records: &'a [NormalizedRecord],
    company: Option<&str>,
) -> Vec<&'a NormalizedRecord> {
    match company.filter(|c| !c.is_empty()) {
        Some(c) => records.iter().filter(|r| r.company == c).collect(),
        None => records.iter().collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyCount {
    pub company: String,
    pub records: usize,
}

/// Distinct companies in order of first appearance.
pub fn companies(records: &[NormalizedRecord]) -> Vec<CompanyCount> {
    let mut out: Vec<CompanyCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for r in records {
        match index.get(r.company.as_str()) {
            Some(&i) => out[i].records += 1,
            None => {
                index.insert(&r.company, out.len());
                out.push(CompanyCount {
                    company: r.company.clone(),
                    records: 1,
                });
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Grouped totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthValue {
    pub month: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthQuantity {
    pub month: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedTotal {
    pub name: String,
    pub value: f64,
}

fn sum_by_month<F>(records: &[&NormalizedRecord], amount: F) -> BTreeMap<String, f64>
where
    F: Fn(&NormalizedRecord) -> f64,
{
    let mut totals = BTreeMap::new();
    for &r in records {
        *totals.entry(r.month.clone()).or_insert(0.0) += amount(r);
    }
    totals
}

/// Sum per key, keeping the order keys first appear in.
fn sum_in_order<K, F>(records: &[&NormalizedRecord], key: K, amount: F) -> Vec<(String, f64)>
where
    K: Fn(&NormalizedRecord) -> &str,
    F: Fn(&NormalizedRecord) -> f64,
{
    let mut totals: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for &r in records {
        let k = key(r);
        match index.get(k) {
            Some(&i) => totals[i].1 += amount(r),
            None => {
                index.insert(k, totals.len());
                totals.push((k.to_string(), amount(r)));
            }
        }
    }
    totals
}

/// Month totals of `value`, oldest first.
pub fn value_by_month(records: &[&NormalizedRecord]) -> Vec<MonthValue> {
    sum_by_month(records, |r| r.value)
        .into_iter()
        .map(|(month, total)| MonthValue {
            month,
            value: round2(total),
        })
        .collect()
}

/// Month totals of `quantity`, oldest first, in whole units.
pub fn quantity_by_month(records: &[&NormalizedRecord]) -> Vec<MonthQuantity> {
    sum_by_month(records, |r| r.quantity)
        .into_iter()
        .map(|(month, total)| MonthQuantity {
            month,
            quantity: total.round(),
        })
        .collect()
}

/// Category totals in order of first appearance.
pub fn value_by_category(records: &[&NormalizedRecord]) -> Vec<NamedTotal> {
    sum_in_order(records, |r| r.category.as_str(), |r| r.value)
        .into_iter()
        .map(|(name, total)| NamedTotal {
            name,
            value: round2(total),
        })
        .collect()
}

/// Best-selling products by value, at most `TOP_N`.
pub fn top_products(records: &[&NormalizedRecord]) -> Vec<NamedTotal> {
    let mut totals = sum_in_order(records, |r| r.product.as_str(), |r| r.value);
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals
        .into_iter()
        .take(TOP_N)
        .map(|(name, total)| NamedTotal {
            name,
            value: round2(total),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Stock turnover
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockItem {
    pub product: String,
    pub stock: f64,
    pub sales: f64,
    /// stock / max(sales, 1); lower turns over faster.
    pub ratio: f64,
}

/// Products ranked by stock-to-sales ratio, fastest movers first.
/// Stock comes from a product's first record; sales sum its quantities.
pub fn stock_turnover(records: &[&NormalizedRecord]) -> Vec<StockItem> {
    let mut items: Vec<StockItem> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for &r in records {
        match index.get(r.product.as_str()) {
            Some(&i) => items[i].sales += r.quantity,
            None => {
                index.insert(&r.product, items.len());
                items.push(StockItem {
                    product: r.product.clone(),
                    stock: r.stock,
                    sales: r.quantity,
                    ratio: 0.0,
                });
            }
        }
    }

    let mut ranked: Vec<StockItem> = items
        .into_iter()
        .filter(|i| i.stock > 0.0)
        .map(|mut i| {
            i.ratio = i.stock / i.sales.max(1.0);
            i
        })
        .collect();
    ranked.sort_by(|a, b| a.ratio.total_cmp(&b.ratio));
    ranked.truncate(TOP_N);
    ranked
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub records: usize,
    pub total_value: f64,
    pub total_quantity: f64,
    pub average_ticket: f64,
    pub companies: usize,
}

/// `company_count` is taken over the unfiltered set.
pub fn kpis(records: &[&NormalizedRecord], company_count: usize) -> Kpis {
    let total_value: f64 = records.iter().map(|r| r.value).sum();
    let total_quantity: f64 = records.iter().map(|r| r.quantity).sum();
    let average_ticket = if records.is_empty() {
        0.0
    } else {
        total_value / records.len() as f64
    };
    Kpis {
        records: records.len(),
        total_value: round2(total_value),
        total_quantity,
        average_ticket: round2(average_ticket),
        companies: company_count,
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub company: Option<String>,
    pub kpis: Kpis,
    pub value_by_month: Vec<MonthValue>,
    pub quantity_by_month: Vec<MonthQuantity>,
    pub by_category: Vec<NamedTotal>,
    pub top_products: Vec<NamedTotal>,
    pub stock_turnover: Vec<StockItem>,
    pub preview: Vec<NormalizedRecord>,
}

pub fn build_dashboard(
    records: &[NormalizedRecord],
    company: Option<&str>,
    preview_rows: usize,
) -> Dashboard {
    let company = company.filter(|c| !c.is_empty());
    let filtered = filter_by_company(records, company);
    Dashboard {
        company: company.map(str::to_string),
        kpis: kpis(&filtered, companies(records).len()),
        value_by_month: value_by_month(&filtered),
        quantity_by_month: quantity_by_month(&filtered),
        by_category: value_by_category(&filtered),
        top_products: top_products(&filtered),
        stock_turnover: stock_turnover(&filtered),
        preview: filtered.iter().take(preview_rows).map(|r| (*r).clone()).collect(),
    }
}
