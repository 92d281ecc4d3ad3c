use contracts::domain::a001_ticket::{Ticket, TicketField};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::column_mapper::ColumnMap;
use super::sheets_api_client::CellValue;

/// Resolution times above this are taken as minutes and converted to hours
const RESOLUTION_MINUTES_THRESHOLD: f64 = 100.0;

static BR_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})").unwrap());
static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}").unwrap());
static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").unwrap()
});

/// Turn one data row into a ticket. Rows without an identifier yield `None`;
/// every other anomaly degrades to a null field.
pub fn normalize_row(row: &[CellValue], columns: &ColumnMap) -> Option<Ticket> {
    let ticket_id = text_field(row, columns, TicketField::TicketId)?;

    let text = |field| text_field(row, columns, field);
    let cell = |field| columns.cell(row, field);

    Some(Ticket {
        ticket_id,
        opened_on: text(TicketField::OpenedOn).and_then(|v| parse_date(&v)),
        closed_on: text(TicketField::ClosedOn).and_then(|v| parse_date(&v)),
        status: text(TicketField::Status),
        priority: text(TicketField::Priority),
        category: text(TicketField::Category),
        solution: text(TicketField::Solution),
        requester: text(TicketField::Requester),
        technician: text(TicketField::Technician),
        department: text(TicketField::Department),
        resolution_hours: cell(TicketField::ResolutionTime).and_then(resolution_hours),
        first_response_minutes: cell(TicketField::FirstResponseTime).and_then(number),
        satisfaction: cell(TicketField::Satisfaction).and_then(satisfaction_score),
    })
}

/// Trimmed text of a mapped cell; blank counts as absent
fn text_field(row: &[CellValue], columns: &ColumnMap, field: TicketField) -> Option<String> {
    let cell = columns.cell(row, field).filter(|c| !c.is_blank())?;
    Some(cell.as_text().trim().to_string())
}

/// `DD/MM/YYYY...` → `YYYY-MM-DD`; a value starting with `YYYY-MM-DD` is
/// kept as given; anything else is `None`
pub fn parse_date(value: &str) -> Option<String> {
    if let Some(caps) = BR_DATE.captures(value) {
        return Some(format!("{}-{}-{}", &caps[3], &caps[2], &caps[1]));
    }
    if ISO_DATE.is_match(value) {
        return Some(value.to_string());
    }
    None
}

/// Longest leading decimal number, ignoring leading whitespace:
/// "150 min" → 150, "2,5" → 2, "abc" → None
pub fn parse_float_prefix(value: &str) -> Option<f64> {
    let found = LEADING_NUMBER.find(value.trim_start())?;
    found.as_str().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(s) => parse_float_prefix(s),
        _ => None,
    }
}

fn resolution_hours(cell: &CellValue) -> Option<f64> {
    number(cell).map(|value| {
        if value > RESOLUTION_MINUTES_THRESHOLD {
            value / 60.0
        } else {
            value
        }
    })
}

/// Numeric scores pass through; Portuguese ratings map onto 1..=5
fn satisfaction_score(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(s) => {
            let key: String = s.nfc().collect::<String>().to_lowercase();
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            if let Ok(n) = key.parse::<f64>() {
                return n.is_finite().then_some(n);
            }
            rating_from_text(key)
        }
        _ => None,
    }
}

fn rating_from_text(key: &str) -> Option<f64> {
    let score = match key {
        "ruim" | "péssimo" | "pessimo" => 1.0,
        "regular" => 2.0,
        "médio" | "medio" => 3.0,
        "bom" => 4.0,
        "ótimo" | "otimo" | "excelente" => 5.0,
        _ => return None,
    };
    Some(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_map() -> ColumnMap {
        ColumnMap::from_headers(&[
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
        ])
    }

    fn row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| CellValue::from(*c)).collect()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("15/03/2024").as_deref(), Some("2024-03-15"));
        assert_eq!(parse_date("15/03/2024 10:30").as_deref(), Some("2024-03-15"));
        assert_eq!(parse_date("2024-03-15").as_deref(), Some("2024-03-15"));
        assert_eq!(parse_date("March 15 2024"), None);
        assert_eq!(parse_date("5/3/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("150"), Some(150.0));
        assert_eq!(parse_float_prefix("  80.5 horas"), Some(80.5));
        assert_eq!(parse_float_prefix("2,5"), Some(2.0));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("-3"), Some(-3.0));
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix(""), None);
    }

    #[test]
    fn test_full_row() {
        let cells = row(&[
            " TH0001 ",
            "15/03/2024",
            "2024-03-16",
            "Fechado",
            "Alta",
            "Rede",
            "Cabo trocado",
            "João",
            "Maria Santos",
            "TI",
            "150",
            "12",
            "Excelente",
        ]);
        let ticket = normalize_row(&cells, &full_map()).unwrap();
        assert_eq!(ticket.ticket_id, "TH0001");
        assert_eq!(ticket.opened_on.as_deref(), Some("2024-03-15"));
        assert_eq!(ticket.closed_on.as_deref(), Some("2024-03-16"));
        assert_eq!(ticket.technician.as_deref(), Some("Maria Santos"));
        assert_eq!(ticket.category.as_deref(), Some("Rede"));
        assert_eq!(ticket.resolution_hours, Some(2.5));
        assert_eq!(ticket.first_response_minutes, Some(12.0));
        assert_eq!(ticket.satisfaction, Some(5.0));
    }

    #[test]
    fn test_missing_identifier_rejects_row() {
        let map = full_map();
        assert!(normalize_row(&row(&["", "15/03/2024"]), &map).is_none());
        assert!(normalize_row(&row(&["   "]), &map).is_none());
        assert!(normalize_row(&[], &map).is_none());

        let no_id_column = ColumnMap::from_headers(&["Status"]);
        assert!(normalize_row(&row(&["Aberto"]), &no_id_column).is_none());
    }

    #[test]
    fn test_resolution_unit_heuristic() {
        let map = ColumnMap::from_headers(&["ID Chamado", "TMA (minutos)"]);
        let hours = |v: CellValue| {
            normalize_row(&[CellValue::from("1"), v], &map)
                .unwrap()
                .resolution_hours
        };
        assert_eq!(hours(CellValue::from("150")), Some(2.5));
        assert_eq!(hours(CellValue::from("80")), Some(80.0));
        assert_eq!(hours(CellValue::from("100")), Some(100.0));
        assert_eq!(hours(CellValue::Number(120.0)), Some(2.0));
        assert_eq!(hours(CellValue::from("n/a")), None);
        assert_eq!(hours(CellValue::Empty), None);
    }

    #[test]
    fn test_first_response_has_no_unit_correction() {
        let map = ColumnMap::from_headers(&["ID Chamado", "FRT (minutos)"]);
        let frt = |v: &str| {
            normalize_row(&row(&["1", v]), &map)
                .unwrap()
                .first_response_minutes
        };
        assert_eq!(frt("240"), Some(240.0));
        assert_eq!(frt("0"), Some(0.0));
        assert_eq!(frt("-"), None);
    }

    #[test]
    fn test_satisfaction_vocabulary() {
        let cases = [
            ("Ruim", Some(1.0)),
            ("péssimo", Some(1.0)),
            ("PESSIMO", Some(1.0)),
            ("Regular", Some(2.0)),
            ("Médio", Some(3.0)),
            ("medio", Some(3.0)),
            (" Bom ", Some(4.0)),
            ("Ótimo", Some(5.0)),
            ("otimo", Some(5.0)),
            ("Excelente", Some(5.0)),
            ("n/a", None),
            ("muito bom", None),
            ("", None),
        ];
        for (text, expected) in cases {
            assert_eq!(
                satisfaction_score(&CellValue::from(text)),
                expected,
                "rating {:?}",
                text
            );
        }
    }

    #[test]
    fn test_satisfaction_decomposed_accents() {
        // "Ótimo" typed with a combining acute accent
        let decomposed = "O\u{301}timo";
        assert_eq!(satisfaction_score(&CellValue::from(decomposed)), Some(5.0));
    }

    #[test]
    fn test_numeric_satisfaction_passes_through() {
        assert_eq!(satisfaction_score(&CellValue::Number(3.0)), Some(3.0));
        assert_eq!(satisfaction_score(&CellValue::Number(4.5)), Some(4.5));
        assert_eq!(satisfaction_score(&CellValue::from("4")), Some(4.0));
        assert_eq!(satisfaction_score(&CellValue::Bool(true)), None);
    }

    #[test]
    fn test_short_row_yields_nulls() {
        let ticket = normalize_row(&row(&["TH9", "01/02/2024"]), &full_map()).unwrap();
        assert_eq!(ticket.opened_on.as_deref(), Some("2024-02-01"));
        assert_eq!(ticket.status, None);
        assert_eq!(ticket.satisfaction, None);
        assert_eq!(ticket.resolution_hours, None);
    }

    #[test]
    fn test_whitespace_cells_become_null() {
        let mut cells = row(&["TH5", "", "", "  ", "\t", "Rede"]);
        cells.push(CellValue::Empty);
        cells.push(CellValue::Number(42.0));
        let ticket = normalize_row(&cells, &full_map()).unwrap();
        assert_eq!(ticket.status, None);
        assert_eq!(ticket.priority, None);
        assert_eq!(ticket.category.as_deref(), Some("Rede"));
        assert_eq!(ticket.solution, None);
        assert_eq!(ticket.requester.as_deref(), Some("42"));
    }

    #[test]
    fn test_same_row_normalizes_identically() {
        let cells = row(&["A1", "bad date", "", "Aberto", "", "", "", "", "", "", "90", "", "bom"]);
        let map = full_map();
        assert_eq!(normalize_row(&cells, &map), normalize_row(&cells, &map));
        let ticket = normalize_row(&cells, &map).unwrap();
        assert_eq!(ticket.opened_on, None);
        assert_eq!(ticket.closed_on, None);
        assert_eq!(ticket.priority, None);
    }
}
