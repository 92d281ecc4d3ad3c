use serde::{Deserialize, Serialize};

/// KPI summary rendered by the dashboard front-end (`GET /api/chamados`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpdeskSummaryResponse {
    pub total_chamados: usize,
    pub total_abertos: usize,
    pub total_fechados: usize,
    /// "12.3 horas" or "N/A"
    pub tempo_medio_resolucao: String,
    /// (technician, ticket count), most tickets first
    pub chamados_por_tecnico: Vec<(String, usize)>,
    /// (category, ticket count), most tickets first
    pub categorias: Vec<(String, usize)>,
    pub desempenho_tecnicos: Vec<TechnicianPerformance>,
    /// Most recently opened tickets
    pub tabela: Vec<TicketTableRow>,
    pub insights: Insights,
    /// "%d/%m/%Y %H:%M"
    pub ultima_atualizacao: String,
    pub fonte: String,
    /// Set when a stale cached summary is served because recomputing failed
    #[serde(default)]
    pub cache_stale: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicianPerformance {
    pub tecnico: String,
    pub total_chamados: usize,
    pub satisfacao_media: Option<f64>,
    pub tempo_medio_horas: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketTableRow {
    pub id: String,
    pub tecnico: String,
    pub categoria: String,
    pub status: String,
    pub satisfacao: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub melhor_tecnico: String,
    pub categoria_predominante: String,
    pub tendencia_satisfacao: String,
}
