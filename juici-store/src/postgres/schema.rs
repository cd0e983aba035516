//! Schema bootstrap for the fallback database

use sqlx::PgPool;

use crate::intent::TABLE_EXISTS_SQL;

pub async fn table_exists(pool: &PgPool, table: &str) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as(TABLE_EXISTS_SQL)
        .bind(table)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Create `favorites` (and its user index) if missing, plus `profiles`.
pub async fn bootstrap(pool: &PgPool) -> Result<(), sqlx::Error> {
    if !table_exists(pool, "favorites").await? {
        tracing::info!("favorites table missing, creating it");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS favorites (
                id SERIAL PRIMARY KEY,
                user_id TEXT NOT NULL,
                prompt TEXT NOT NULL,
                categories JSONB,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_favorites_user_id ON favorites (user_id)")
            .execute(pool)
            .await?;
    }

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            username TEXT,
            full_name TEXT,
            avatar_url TEXT,
            updated_at TIMESTAMPTZ DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::postgres::pool::{connect_options, create_pool};
    use std::time::Duration;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn bootstrap_is_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let options = connect_options(&url, Environment::Development).unwrap();
        let pool = create_pool(options, 2, Duration::from_secs(5)).await.unwrap();

        bootstrap(&pool).await.unwrap();
        bootstrap(&pool).await.unwrap();

        assert!(table_exists(&pool, "favorites").await.unwrap());
        assert!(table_exists(&pool, "profiles").await.unwrap());
        assert!(!table_exists(&pool, "no_such_table_here").await.unwrap());
    }
}
