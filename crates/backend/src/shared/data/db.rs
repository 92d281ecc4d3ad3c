use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    Statement,
};

/// Schema of the destination table, mirroring the Supabase `chamados` table
const CREATE_TICKETS_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS chamados (
        id_chamado TEXT PRIMARY KEY NOT NULL,
        data_abertura TEXT,
        data_fechamento TEXT,
        status TEXT,
        prioridade TEXT,
        categoria TEXT,
        solucao TEXT,
        solicitante TEXT,
        tecnico TEXT,
        departamento TEXT,
        tempo_resolucao REAL,
        frt_minutos REAL,
        satisfacao REAL
    );
"#;

/// Open a SQLite database from a `sqlite:` URL and make sure the tickets
/// table exists.
pub async fn open_sqlite(url: &str) -> Result<DatabaseConnection, DbErr> {
    let db_url = with_create_mode(url);
    if let Some(path) = sqlite_file_path(&db_url) {
        if let Some(parent) = std::path::Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DbErr::Custom(format!("cannot create {}: {}", parent.display(), e)))?;
            }
        }
    }

    let mut options = ConnectOptions::new(db_url.clone());
    // One connection: keeps an in-memory database alive and serializes writes
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let conn = Database::connect(options).await?;
    ensure_schema(&conn).await?;
    tracing::info!("SQLite datastore ready at {}", db_url);
    Ok(conn)
}

pub async fn ensure_schema(conn: &DatabaseConnection) -> Result<(), DbErr> {
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        CREATE_TICKETS_TABLE_SQL.to_string(),
    ))
    .await?;
    Ok(())
}

/// Append `mode=rwc` to file URLs so a missing database file gets created
fn with_create_mode(url: &str) -> String {
    if url.contains(":memory:") || url.contains("mode=") {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&mode=rwc", url)
    } else {
        format!("{}?mode=rwc", url)
    }
}

fn sqlite_file_path(url: &str) -> Option<String> {
    if url.contains(":memory:") {
        return None;
    }
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}
