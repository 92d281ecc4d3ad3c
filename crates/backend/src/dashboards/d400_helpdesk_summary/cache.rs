use contracts::dashboards::d400_helpdesk_summary::HelpdeskSummaryResponse;
use std::sync::RwLock;
use std::time::{Duration, Instant};

struct Entry {
    stored_at: Instant,
    /// Set after a sync changed the table; the entry then only serves as stale
    invalidated: bool,
    summary: HelpdeskSummaryResponse,
}

/// Last computed dashboard summary, reused for `ttl`
pub struct SummaryCache {
    ttl: Duration,
    entry: RwLock<Option<Entry>>,
}

impl SummaryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    /// Cached summary if it is younger than the TTL
    pub fn fresh(&self) -> Option<HelpdeskSummaryResponse> {
        let entry = self.entry.read().unwrap_or_else(|e| e.into_inner());
        entry
            .as_ref()
            .filter(|e| !e.invalidated && e.stored_at.elapsed() < self.ttl)
            .map(|e| e.summary.clone())
    }

    /// Cached summary regardless of age, flagged as stale
    pub fn stale(&self) -> Option<HelpdeskSummaryResponse> {
        let entry = self.entry.read().unwrap_or_else(|e| e.into_inner());
        entry.as_ref().map(|e| HelpdeskSummaryResponse {
            cache_stale: true,
            ..e.summary.clone()
        })
    }

    pub fn put(&self, summary: HelpdeskSummaryResponse) {
        let mut entry = self.entry.write().unwrap_or_else(|e| e.into_inner());
        *entry = Some(Entry {
            stored_at: Instant::now(),
            invalidated: false,
            summary,
        });
    }

    /// Force the next read to recompute
    pub fn invalidate(&self) {
        let mut entry = self.entry.write().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entry.as_mut() {
            entry.invalidated = true;
        }
    }

    pub fn is_warm(&self) -> bool {
        self.fresh().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::dashboards::d400_helpdesk_summary::Insights;

    fn summary(total: usize) -> HelpdeskSummaryResponse {
        HelpdeskSummaryResponse {
            total_chamados: total,
            total_abertos: 0,
            total_fechados: 0,
            tempo_medio_resolucao: "N/A".to_string(),
            chamados_por_tecnico: Vec::new(),
            categorias: Vec::new(),
            desempenho_tecnicos: Vec::new(),
            tabela: Vec::new(),
            insights: Insights {
                melhor_tecnico: String::new(),
                categoria_predominante: String::new(),
                tendencia_satisfacao: String::new(),
            },
            ultima_atualizacao: "01/01/2024 00:00".to_string(),
            fonte: "Supabase".to_string(),
            cache_stale: false,
        }
    }

    #[test]
    fn test_empty_cache() {
        let cache = SummaryCache::new(Duration::from_secs(300));
        assert!(cache.fresh().is_none());
        assert!(cache.stale().is_none());
        assert!(!cache.is_warm());
    }

    #[test]
    fn test_fresh_within_ttl() {
        let cache = SummaryCache::new(Duration::from_secs(300));
        cache.put(summary(7));
        assert!(cache.is_warm());
        let fresh = cache.fresh().unwrap();
        assert_eq!(fresh.total_chamados, 7);
        assert!(!fresh.cache_stale);
    }

    #[test]
    fn test_expired_entry_is_only_stale() {
        let cache = SummaryCache::new(Duration::ZERO);
        cache.put(summary(3));
        assert!(cache.fresh().is_none());
        let stale = cache.stale().unwrap();
        assert_eq!(stale.total_chamados, 3);
        assert!(stale.cache_stale);
    }

    #[test]
    fn test_invalidate_keeps_stale_fallback() {
        let cache = SummaryCache::new(Duration::from_secs(300));
        cache.invalidate();
        assert!(cache.stale().is_none());

        cache.put(summary(4));
        cache.invalidate();
        assert!(cache.fresh().is_none());
        assert!(!cache.is_warm());
        assert_eq!(cache.stale().unwrap().total_chamados, 4);

        cache.put(summary(6));
        assert_eq!(cache.fresh().unwrap().total_chamados, 6);
    }
}
