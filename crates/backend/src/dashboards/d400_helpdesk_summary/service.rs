use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use contracts::dashboards::d400_helpdesk_summary::{
    HelpdeskSummaryResponse, Insights, TechnicianPerformance, TicketTableRow,
};
use contracts::domain::a001_ticket::Ticket;
use std::collections::HashMap;
use std::future::Future;

use super::cache::SummaryCache;
use crate::domain::a001_ticket::StoreConnector;
use crate::shared::config::Credentials;
use crate::shared::format::{format_hours, percent};

const OPEN_STATUSES: [&str; 3] = ["aberto", "em andamento", "pendente"];
const CLOSED_STATUSES: [&str; 4] = ["fechado", "resolvido", "concluido", "concluído"];
const UNKNOWN: &str = "N/A";

/// Serve the cached summary while fresh; otherwise run `load`. When `load`
/// fails and an older summary exists, that one is returned marked stale.
pub async fn cached_summary<Fut>(cache: &SummaryCache, load: Fut) -> Result<HelpdeskSummaryResponse>
where
    Fut: Future<Output = Result<HelpdeskSummaryResponse>>,
{
    if let Some(summary) = cache.fresh() {
        return Ok(summary);
    }

    match load.await {
        Ok(summary) => {
            cache.put(summary.clone());
            Ok(summary)
        }
        Err(e) => match cache.stale() {
            Some(stale) => {
                tracing::warn!("Dashboard refresh failed, serving stale summary: {}", e);
                Ok(stale)
            }
            None => Err(e),
        },
    }
}

/// Recompute unconditionally and replace the cached summary. Unlike
/// [`cached_summary`] a failure is never masked by a stale entry.
pub async fn refresh_summary<Fut>(cache: &SummaryCache, load: Fut) -> Result<HelpdeskSummaryResponse>
where
    Fut: Future<Output = Result<HelpdeskSummaryResponse>>,
{
    let summary = load.await?;
    cache.put(summary.clone());
    Ok(summary)
}

/// Read every ticket from the configured datastore and summarize it
pub async fn load_summary(
    stores: &StoreConnector,
    credentials: &Credentials,
    table_limit: usize,
) -> Result<HelpdeskSummaryResponse> {
    let datastore = credentials.require_datastore()?;
    let store = stores.connect(&datastore).await?;
    let tickets = store.list_tickets().await?;
    tracing::info!("Dashboard: loaded {} tickets from {}", tickets.len(), store.backend_name());

    let source = match store.backend_name() {
        "sqlite" => "SQLite",
        _ => "Supabase",
    };
    Ok(build_summary(
        &tickets,
        table_limit,
        source,
        chrono::Local::now().naive_local(),
    ))
}

pub fn build_summary(
    tickets: &[Ticket],
    table_limit: usize,
    source: &str,
    updated_at: NaiveDateTime,
) -> HelpdeskSummaryResponse {
    let status_of = |t: &Ticket| t.status.as_deref().map(|s| s.trim().to_lowercase());
    let total_abertos = tickets
        .iter()
        .filter(|t| status_of(t).is_some_and(|s| OPEN_STATUSES.contains(&s.as_str())))
        .count();
    let total_fechados = tickets
        .iter()
        .filter(|t| status_of(t).is_some_and(|s| CLOSED_STATUSES.contains(&s.as_str())))
        .count();

    let chamados_por_tecnico = count_by(tickets, |t| t.technician.as_deref());
    let categorias = count_by(tickets, |t| t.category.as_deref());

    let satisfaction = mean(tickets.iter().filter_map(|t| t.satisfaction));

    HelpdeskSummaryResponse {
        total_chamados: tickets.len(),
        total_abertos,
        total_fechados,
        tempo_medio_resolucao: format_hours(average_resolution_hours(tickets)),
        desempenho_tecnicos: technician_performance(tickets),
        tabela: recent_table(tickets, table_limit),
        insights: insights(tickets.len(), &chamados_por_tecnico, &categorias, satisfaction),
        chamados_por_tecnico,
        categorias,
        ultima_atualizacao: updated_at.format("%d/%m/%Y %H:%M").to_string(),
        fonte: source.to_string(),
        cache_stale: false,
    }
}

fn label(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Counts per value, most frequent first, ties by name
fn count_by<F>(tickets: &[Ticket], key: F) -> Vec<(String, usize)>
where
    F: Fn(&Ticket) -> Option<&str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for ticket in tickets {
        *counts.entry(label(key(ticket))).or_insert(0) += 1;
    }
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

fn mean<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

fn date_of(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?;
    NaiveDate::parse_from_str(value.get(..10)?, "%Y-%m-%d").ok()
}

/// Mean of recorded resolution hours; falls back to close minus open date
fn average_resolution_hours(tickets: &[Ticket]) -> Option<f64> {
    mean(tickets.iter().filter_map(|t| t.resolution_hours)).or_else(|| {
        mean(tickets.iter().filter_map(|t| {
            let opened = date_of(t.opened_on.as_deref())?;
            let closed = date_of(t.closed_on.as_deref())?;
            let hours = (closed - opened).num_hours() as f64;
            (hours >= 0.0).then_some(hours)
        }))
    })
}

fn technician_performance(tickets: &[Ticket]) -> Vec<TechnicianPerformance> {
    let mut groups: HashMap<String, Vec<&Ticket>> = HashMap::new();
    for ticket in tickets {
        groups
            .entry(label(ticket.technician.as_deref()))
            .or_default()
            .push(ticket);
    }

    let mut rows: Vec<TechnicianPerformance> = groups
        .into_iter()
        .map(|(tecnico, group)| TechnicianPerformance {
            total_chamados: group.len(),
            satisfacao_media: mean(group.iter().filter_map(|t| t.satisfaction)),
            tempo_medio_horas: mean(group.iter().filter_map(|t| t.resolution_hours)),
            tecnico,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_chamados
            .cmp(&a.total_chamados)
            .then_with(|| a.tecnico.cmp(&b.tecnico))
    });
    rows
}

/// Most recently opened first; tickets without an open date go last
fn recent_table(tickets: &[Ticket], limit: usize) -> Vec<TicketTableRow> {
    let mut sorted: Vec<&Ticket> = tickets.iter().collect();
    sorted.sort_by(|a, b| match (&a.opened_on, &b.opened_on) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    sorted
        .into_iter()
        .take(limit)
        .map(|t| TicketTableRow {
            id: t.ticket_id.clone(),
            tecnico: label(t.technician.as_deref()),
            categoria: label(t.category.as_deref()),
            status: label(t.status.as_deref()),
            satisfacao: t.satisfaction,
        })
        .collect()
}

fn insights(
    total: usize,
    by_technician: &[(String, usize)],
    by_category: &[(String, usize)],
    satisfaction: Option<f64>,
) -> Insights {
    let melhor_tecnico = by_technician
        .iter()
        .find(|(name, _)| name != UNKNOWN)
        .map(|(name, n)| {
            format!("{} foi o técnico mais produtivo com {} chamados.", name, n)
        })
        .unwrap_or_else(|| "Dados de técnicos não disponíveis.".to_string());

    let categoria_predominante = by_category
        .iter()
        .find(|(name, _)| name != UNKNOWN)
        .map(|(name, n)| {
            format!(
                "{} representa {:.1}% dos chamados ({} ocorrências).",
                name,
                percent(*n, total),
                n
            )
        })
        .unwrap_or_else(|| "Dados de categorias não disponíveis.".to_string());

    let tendencia_satisfacao = match satisfaction {
        Some(avg) if avg >= 4.0 => format!(
            "Excelente! Satisfação média de {:.1}/5 - clientes muito satisfeitos.",
            avg
        ),
        Some(avg) if avg >= 3.0 => {
            format!("Satisfação média de {:.1}/5 - há espaço para melhorias.", avg)
        }
        Some(avg) => format!("Atenção! Satisfação baixa de {:.1}/5 - revisar processos.", avg),
        None => "Dados de satisfação não disponíveis.".to_string(),
    };

    Insights {
        melhor_tecnico,
        categoria_predominante,
        tendencia_satisfacao,
    }
}
