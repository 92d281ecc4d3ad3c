pub mod dto;

pub use dto::{HelpdeskSummaryResponse, Insights, TechnicianPerformance, TicketTableRow};
