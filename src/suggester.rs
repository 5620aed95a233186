use regex::RegexBuilder;

use crate::models::{ColumnMapping, Field};

/// Header patterns per field. Matching is case-insensitive and unanchored.
pub const SUGGESTION_TABLE: &[(Field, &[&str])] = &[
    (Field::Company, &["cnpj", "empresa", "cliente", "id"]),
    (Field::Date, &["data", "date", "competencia", "datavenda"]),
    (
        Field::Value,
        &["valor", "valor_total", "valortotal", "receita", "despesa", "amount"],
    ),
    (
        Field::Category,
        &["categoria", "tipo", "descrição", "descricao", "categoria_despesa"],
    ),
    (Field::Product, &["produto", "product", "item", "descricao"]),
    (Field::Quantity, &["quantidade", "quantity", "qty", "qtd"]),
    (
        Field::UnitPrice,
        &["valor_unitario", "valorunitario", "unit_price", "preco"],
    ),
    (Field::Stock, &["estoque", "stock", "estoqueatual"]),
];

pub fn patterns_for(field: Field) -> &'static [&'static str] {
    SUGGESTION_TABLE
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, p)| *p)
        .unwrap_or(&[])
}

fn matches(header: &str, pattern: &str) -> bool {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(header))
        .unwrap_or(false)
}

pub fn header_matches(header: &str, field: Field) -> bool {
    patterns_for(field).iter().any(|p| matches(header, p))
}

/// Every field whose patterns this header satisfies.
pub fn matching_fields(header: &str) -> Vec<Field> {
    SUGGESTION_TABLE
        .iter()
        .filter(|(_, patterns)| patterns.iter().any(|p| matches(header, p)))
        .map(|(field, _)| *field)
        .collect()
}

/// Guess a mapping: each field gets the first header (in header order) that
/// matches one of its patterns. A header may land in several fields.
pub fn suggest_mapping<S: AsRef<str>>(headers: &[S]) -> ColumnMapping {
    let headers: Vec<&str> = headers.iter().map(|h| h.as_ref()).collect();
    let mut mapping = ColumnMapping::default();
    for (field, _) in SUGGESTION_TABLE {
        let hit = headers.iter().find(|h| header_matches(h, *field));
        mapping.set(*field, hit.map(|h| h.to_string()));
    }
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_has_patterns() {
        for field in Field::ALL {
            assert!(!patterns_for(field).is_empty(), "{field:?} has no patterns");
        }
    }

    #[test]
    fn test_suggest_portuguese_headers() {
        let headers = [
            "Empresa", "Data", "Produto", "Categoria", "Quantidade", "Valor Total",
            "Preco Unitario", "Estoque",
        ];
        let m = suggest_mapping(&headers);
        assert_eq!(m.get(Field::Company), Some("Empresa"));
        assert_eq!(m.get(Field::Date), Some("Data"));
        assert_eq!(m.get(Field::Value), Some("Valor Total"));
        assert_eq!(m.get(Field::Category), Some("Categoria"));
        assert_eq!(m.get(Field::Product), Some("Produto"));
        assert_eq!(m.get(Field::Quantity), Some("Quantidade"));
        assert_eq!(m.get(Field::UnitPrice), Some("Preco Unitario"));
        assert_eq!(m.get(Field::Stock), Some("Estoque"));
    }

    #[test]
    fn test_suggest_english_headers_case_insensitive() {
        let headers = ["CUSTOMER_ID", "Sale Date", "AMOUNT", "Product", "QTY", "Unit_Price", "STOCK"];
        let m = suggest_mapping(&headers);
        assert_eq!(m.get(Field::Company), Some("CUSTOMER_ID"));
        assert_eq!(m.get(Field::Date), Some("Sale Date"));
        assert_eq!(m.get(Field::Value), Some("AMOUNT"));
        assert_eq!(m.get(Field::Product), Some("Product"));
        assert_eq!(m.get(Field::Quantity), Some("QTY"));
        assert_eq!(m.get(Field::UnitPrice), Some("Unit_Price"));
        assert_eq!(m.get(Field::Stock), Some("STOCK"));
        assert_eq!(m.get(Field::Category), None);
    }

    #[test]
    fn test_first_header_wins() {
        let headers = ["Receita", "Valor"];
        assert_eq!(suggest_mapping(&headers).get(Field::Value), Some("Receita"));
    }

    #[test]
    fn test_header_can_fill_several_fields() {
        let headers = ["Descricao", "Valor"];
        let m = suggest_mapping(&headers);
        assert_eq!(m.get(Field::Category), Some("Descricao"));
        assert_eq!(m.get(Field::Product), Some("Descricao"));
        assert_eq!(matching_fields("Descricao"), vec![Field::Category, Field::Product]);
    }

    #[test]
    fn test_accented_pattern() {
        assert!(header_matches("DESCRIÇÃO", Field::Category));
    }

    #[test]
    fn test_no_match_leaves_field_empty() {
        let m = suggest_mapping(&["foo", "bar"]);
        assert_eq!(m, ColumnMapping::default());
        let empty: [&str; 0] = [];
        assert_eq!(suggest_mapping(&empty), ColumnMapping::default());
    }

    #[test]
    fn test_deterministic() {
        let headers = vec!["Cliente".to_string(), "Competencia".to_string(), "Despesa".to_string()];
        assert_eq!(suggest_mapping(&headers), suggest_mapping(&headers));
    }
}
