use async_trait::async_trait;
use contracts::domain::a001_ticket::Ticket;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, EntityTrait, PaginatorTrait, Set, Statement,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};

use super::store::{StoreDescription, StoreError, TicketStore};

/// Rows per INSERT statement, well under SQLite's bound-parameter limit
const INSERT_BATCH: usize = 500;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chamados")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_chamado: String,
    pub data_abertura: Option<String>,
    pub data_fechamento: Option<String>,
    pub status: Option<String>,
    pub prioridade: Option<String>,
    pub categoria: Option<String>,
    pub solucao: Option<String>,
    pub solicitante: Option<String>,
    pub tecnico: Option<String>,
    pub departamento: Option<String>,
    pub tempo_resolucao: Option<f64>,
    pub frt_minutos: Option<f64>,
    pub satisfacao: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Ticket {
    fn from(m: Model) -> Self {
        Ticket {
            ticket_id: m.id_chamado,
            opened_on: m.data_abertura,
            closed_on: m.data_fechamento,
            status: m.status,
            priority: m.prioridade,
            category: m.categoria,
            solution: m.solucao,
            requester: m.solicitante,
            technician: m.tecnico,
            department: m.departamento,
            resolution_hours: m.tempo_resolucao,
            first_response_minutes: m.frt_minutos,
            satisfaction: m.satisfacao,
        }
    }
}

impl From<&Ticket> for ActiveModel {
    fn from(t: &Ticket) -> Self {
        ActiveModel {
            id_chamado: Set(t.ticket_id.clone()),
            data_abertura: Set(t.opened_on.clone()),
            data_fechamento: Set(t.closed_on.clone()),
            status: Set(t.status.clone()),
            prioridade: Set(t.priority.clone()),
            categoria: Set(t.category.clone()),
            solucao: Set(t.solution.clone()),
            solicitante: Set(t.requester.clone()),
            tecnico: Set(t.technician.clone()),
            departamento: Set(t.department.clone()),
            tempo_resolucao: Set(t.resolution_hours),
            frt_minutos: Set(t.first_response_minutes),
            satisfacao: Set(t.satisfaction),
        }
    }
}

/// Every column except the key is overwritten on conflict
fn overwrite_on_conflict() -> OnConflict {
    OnConflict::column(Column::IdChamado)
        .update_columns([
            Column::DataAbertura,
            Column::DataFechamento,
            Column::Status,
            Column::Prioridade,
            Column::Categoria,
            Column::Solucao,
            Column::Solicitante,
            Column::Tecnico,
            Column::Departamento,
            Column::TempoResolucao,
            Column::FrtMinutos,
            Column::Satisfacao,
        ])
        .to_owned()
}

/// Tickets table in a local SQLite database
pub struct SqliteTicketStore {
    db: DatabaseConnection,
}

impl SqliteTicketStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TicketStore for SqliteTicketStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn upsert_tickets(&self, tickets: &[Ticket]) -> Result<usize, StoreError> {
        if tickets.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;
        for batch in tickets.chunks(INSERT_BATCH) {
            Entity::insert_many(batch.iter().map(ActiveModel::from))
                .on_conflict(overwrite_on_conflict())
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;

        Ok(tickets.len())
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        let models = Entity::find().all(&self.db).await?;
        Ok(models.into_iter().map(Ticket::from).collect())
    }

    async fn describe(&self) -> Result<StoreDescription, StoreError> {
        let row_count = Entity::find().count(&self.db).await?;

        let rows = self
            .db
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "PRAGMA table_info(chamados);".to_string(),
            ))
            .await?;
        let columns = rows
            .into_iter()
            .filter_map(|row| row.try_get::<String>("", "name").ok())
            .collect();

        Ok(StoreDescription {
            backend: self.backend_name(),
            row_count,
            columns,
        })
    }
}
