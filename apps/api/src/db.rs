use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Tables owned by this service. Each statement is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS content (
        id UUID PRIMARY KEY,
        category TEXT NOT NULL,
        topic TEXT NOT NULL,
        body TEXT NOT NULL,
        metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
        quality_score DOUBLE PRECISION NOT NULL,
        seo_score DOUBLE PRECISION NOT NULL,
        status TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_content_created_at ON content (created_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS api_usage (
        id UUID PRIMARY KEY,
        model TEXT NOT NULL,
        tokens_used INTEGER NOT NULL DEFAULT 0,
        cost DOUBLE PRECISION NOT NULL DEFAULT 0,
        category TEXT NOT NULL,
        success BOOLEAN NOT NULL,
        error_message TEXT,
        content_id UUID REFERENCES content (id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_api_usage_created_at ON api_usage (created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS variant_sets (
        id UUID PRIMARY KEY,
        original_id UUID NOT NULL REFERENCES content (id),
        variant_ids UUID[] NOT NULL,
        parameter TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        winner_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS analytics_events (
        id UUID PRIMARY KEY,
        event_type TEXT NOT NULL,
        content_id UUID,
        data JSONB NOT NULL DEFAULT '{}'::jsonb,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates any missing tables and indexes.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Schema statement failed: {}", statement.trim()))?;
    }
    info!("Database schema ready ({} statements)", SCHEMA.len());
    Ok(())
}
