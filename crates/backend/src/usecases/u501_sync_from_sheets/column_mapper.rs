use std::collections::BTreeMap;
use std::fmt;

use contracts::domain::a001_ticket::TicketField;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::sheets_api_client::CellValue;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Header rules in priority order; the first rule a header satisfies wins
static HEADER_RULES: &[(fn(&str) -> bool, TicketField)] = &[
    (|h| h.contains("id") && h.contains("chamado"), TicketField::TicketId),
    (|h| h.contains("data") && h.contains("abertura"), TicketField::OpenedOn),
    (|h| h.contains("data") && h.contains("fechamento"), TicketField::ClosedOn),
    (|h| h == "status", TicketField::Status),
    (|h| h == "prioridade", TicketField::Priority),
    (|h| h.contains("motivo") || h == "categoria", TicketField::Category),
    (|h| h.contains("solucao"), TicketField::Solution),
    (|h| h.contains("solicitante"), TicketField::Requester),
    (
        |h| h.contains("agente") || h.contains("responsavel") || h == "tecnico",
        TicketField::Technician,
    ),
    (|h| h.contains("departamento"), TicketField::Department),
    (|h| h.contains("tma") && h.contains("minutos"), TicketField::ResolutionTime),
    (|h| h.contains("frt") && h.contains("minutos"), TicketField::FirstResponseTime),
    (|h| h.contains("satisfacao"), TicketField::Satisfaction),
];

/// Lowercase, strip diacritics, collapse every non-alphanumeric run into `_`
/// and trim leading/trailing `_`. "Data de Abertura" → "data_de_abertura".
pub fn normalize_header(header: &str) -> String {
    let stripped: String = header
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    NON_ALNUM
        .replace_all(&stripped, "_")
        .trim_matches('_')
        .to_string()
}

/// Field a normalized header maps to, if any
pub fn classify_header(normalized: &str) -> Option<TicketField> {
    HEADER_RULES
        .iter()
        .find(|(matches, _)| matches(normalized))
        .map(|(_, field)| *field)
}

/// Canonical field → column index for one sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: BTreeMap<TicketField, usize>,
}

impl ColumnMap {
    /// Map a header row. When several headers land on the same field the
    /// rightmost one is kept; unmatched headers are ignored.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut indices = BTreeMap::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(field) = classify_header(&normalize_header(header.as_ref())) {
                indices.insert(field, index);
            }
        }
        Self { indices }
    }

    pub fn get(&self, field: TicketField) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    /// Cell of `row` for `field`; `None` when the column is unmapped or the
    /// row is shorter than the header
    pub fn cell<'a>(&self, row: &'a [CellValue], field: TicketField) -> Option<&'a CellValue> {
        self.get(field).and_then(|index| row.get(index))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn missing_fields(&self) -> Vec<TicketField> {
        TicketField::ALL
            .iter()
            .copied()
            .filter(|f| !self.indices.contains_key(f))
            .collect()
    }
}

impl fmt::Display for ColumnMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .indices
            .iter()
            .map(|(field, index)| format!("{}={}", field, index))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Data de Abertura"), "data_de_abertura");
        assert_eq!(normalize_header("  ID do Chamado  "), "id_do_chamado");
        assert_eq!(normalize_header("Satisfação"), "satisfacao");
        assert_eq!(normalize_header("TMA (minutos)"), "tma_minutos");
        assert_eq!(normalize_header("Técnico"), "tecnico");
        assert_eq!(normalize_header("---"), "");
    }

    #[test]
    fn test_normalize_header_is_idempotent() {
        for header in [
            "Data de Abertura",
            "DATA_ABERTURA",
            "Solução / Observações",
            "FRT (Minutos)",
            "__x__y__",
            "",
        ] {
            let once = normalize_header(header);
            assert_eq!(normalize_header(&once), once, "header {:?}", header);
        }
    }

    #[test]
    fn test_header_spellings_map_to_same_field() {
        let a = ColumnMap::from_headers(&["Data de Abertura"]);
        let b = ColumnMap::from_headers(&["DATA_ABERTURA"]);
        assert_eq!(a.get(TicketField::OpenedOn), Some(0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_typical_sheet_header() {
        let headers = [
            "ID Chamado",
            "Data Abertura",
            "Data Fechamento",
            "Status",
            "Prioridade",
            "Motivo",
            "Solução",
            "Solicitante",
            "Agente",
            "Departamento",
            "TMA (minutos)",
            "FRT (minutos)",
            "Satisfação",
            "Observações",
        ];
        let map = ColumnMap::from_headers(&headers);
        assert_eq!(map.len(), 13);
        assert!(map.missing_fields().is_empty());
        assert_eq!(map.get(TicketField::Category), Some(5));
        assert_eq!(map.get(TicketField::Technician), Some(8));
        assert_eq!(map.get(TicketField::ResolutionTime), Some(10));
        assert_eq!(map.get(TicketField::FirstResponseTime), Some(11));
    }

    #[test]
    fn test_exact_match_rules() {
        // "status" must match exactly, "tecnico" exactly unless agente/responsavel
        let map = ColumnMap::from_headers(&["Status do Chamado", "Técnico Responsável", "Técnico"]);
        assert_eq!(map.get(TicketField::Status), None);
        assert_eq!(map.get(TicketField::Technician), Some(2));
    }

    #[test]
    fn test_first_rule_wins_for_a_header() {
        // Matches both the id rule and the open-date rule; id comes first
        assert_eq!(
            classify_header("id_chamado_data_abertura"),
            Some(TicketField::TicketId)
        );
    }

    #[test]
    fn test_last_header_wins_for_a_field() {
        let map = ColumnMap::from_headers(&["Responsável", "Status", "Agente"]);
        assert_eq!(map.get(TicketField::Technician), Some(2));
    }

    #[test]
    fn test_unmatched_headers_are_absent() {
        let map = ColumnMap::from_headers(&["Coluna A", "TMA", "Minutos"]);
        assert!(map.is_empty());
        assert_eq!(map.missing_fields().len(), 13);
    }

    #[test]
    fn test_cell_handles_short_rows() {
        let map = ColumnMap::from_headers(&["ID Chamado", "Status"]);
        let row = vec![CellValue::from("TH1")];
        assert_eq!(map.cell(&row, TicketField::TicketId), Some(&CellValue::from("TH1")));
        assert_eq!(map.cell(&row, TicketField::Status), None);
        assert_eq!(map.cell(&row, TicketField::Priority), None);
    }

    #[test]
    fn test_display() {
        let map = ColumnMap::from_headers(&["Status", "ID Chamado"]);
        assert_eq!(map.to_string(), "{id_chamado=1, status=0}");
    }
}
