use serde::{Deserialize, Serialize};

/// Helpdesk ticket ("chamado") as stored in the `chamados` table.
///
/// Serialized field names are the destination column names, so the same
/// value goes to the PostgREST upsert body and comes back from the dashboard
/// API unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket number from the spreadsheet, unique upsert key
    #[serde(rename = "id_chamado")]
    pub ticket_id: String,

    /// Open date (YYYY-MM-DD)
    #[serde(rename = "data_abertura", default)]
    pub opened_on: Option<String>,

    /// Close date (YYYY-MM-DD)
    #[serde(rename = "data_fechamento", default)]
    pub closed_on: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(rename = "prioridade", default)]
    pub priority: Option<String>,

    #[serde(rename = "categoria", default)]
    pub category: Option<String>,

    #[serde(rename = "solucao", default)]
    pub solution: Option<String>,

    #[serde(rename = "solicitante", default)]
    pub requester: Option<String>,

    #[serde(rename = "tecnico", default)]
    pub technician: Option<String>,

    #[serde(rename = "departamento", default)]
    pub department: Option<String>,

    /// Resolution time in hours (TMA)
    #[serde(rename = "tempo_resolucao", default)]
    pub resolution_hours: Option<f64>,

    /// First response time in minutes (FRT)
    #[serde(rename = "frt_minutos", default)]
    pub first_response_minutes: Option<f64>,

    /// Satisfaction on a 1..=5 scale
    #[serde(rename = "satisfacao", default)]
    pub satisfaction: Option<f64>,
}

impl Ticket {
    /// Ticket with only the identifier filled in
    pub fn new(ticket_id: impl Into<String>) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            opened_on: None,
            closed_on: None,
            status: None,
            priority: None,
            category: None,
            solution: None,
            requester: None,
            technician: None,
            department: None,
            resolution_hours: None,
            first_response_minutes: None,
            satisfaction: None,
        }
    }
}

/// Canonical ticket fields a spreadsheet column can be mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketField {
    TicketId,
    OpenedOn,
    ClosedOn,
    Status,
    Priority,
    Category,
    Solution,
    Requester,
    Technician,
    Department,
    ResolutionTime,
    FirstResponseTime,
    Satisfaction,
}

impl TicketField {
    pub const ALL: [TicketField; 13] = [
        TicketField::TicketId,
        TicketField::OpenedOn,
        TicketField::ClosedOn,
        TicketField::Status,
        TicketField::Priority,
        TicketField::Category,
        TicketField::Solution,
        TicketField::Requester,
        TicketField::Technician,
        TicketField::Department,
        TicketField::ResolutionTime,
        TicketField::FirstResponseTime,
        TicketField::Satisfaction,
    ];

    /// Destination column name
    pub fn column_name(&self) -> &'static str {
        match self {
            TicketField::TicketId => "id_chamado",
            TicketField::OpenedOn => "data_abertura",
            TicketField::ClosedOn => "data_fechamento",
            TicketField::Status => "status",
            TicketField::Priority => "prioridade",
            TicketField::Category => "categoria",
            TicketField::Solution => "solucao",
            TicketField::Requester => "solicitante",
            TicketField::Technician => "tecnico",
            TicketField::Department => "departamento",
            TicketField::ResolutionTime => "tempo_resolucao",
            TicketField::FirstResponseTime => "frt_minutos",
            TicketField::Satisfaction => "satisfacao",
        }
    }
}

impl std::fmt::Display for TicketField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_serializes_with_column_names() {
        let mut ticket = Ticket::new("TH0001");
        ticket.technician = Some("Maria Santos".into());
        ticket.resolution_hours = Some(2.5);

        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["id_chamado"], "TH0001");
        assert_eq!(json["tecnico"], "Maria Santos");
        assert_eq!(json["tempo_resolucao"], 2.5);
        assert!(json["satisfacao"].is_null());
    }

    #[test]
    fn test_ticket_deserializes_partial_row() {
        let ticket: Ticket =
            serde_json::from_str(r#"{"id_chamado": "42", "status": "Aberto"}"#).unwrap();
        assert_eq!(ticket.ticket_id, "42");
        assert_eq!(ticket.status.as_deref(), Some("Aberto"));
        assert_eq!(ticket.opened_on, None);
    }

    #[test]
    fn test_column_names_are_unique() {
        let mut names: Vec<&str> = TicketField::ALL.iter().map(|f| f.column_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TicketField::ALL.len());
    }
}
