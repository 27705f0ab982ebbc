use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

pub struct NewArticle<'a> {
    pub id: &'a str,
    pub source_name: &'a str,
    pub url: &'a str,
    pub title: &'a str,
    pub category: Option<&'a str>,
    pub published_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
}

// Runs on the source's open transaction so rows staged earlier in the same feed are visible.
pub async fn article_exists(conn: &mut SqliteConnection, id: &str) -> Result<bool> {
    let hit: Option<i64> = sqlx::query_scalar("SELECT 1 FROM articles WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(hit.is_some())
}

pub async fn insert_article(conn: &mut SqliteConnection, a: &NewArticle<'_>) -> Result<bool> {
    let exec = sqlx::query(
        r#"
        INSERT INTO articles (id, source_name, url, title, category, published_at, fetched_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(a.id)
    .bind(a.source_name)
    .bind(a.url)
    .bind(a.title)
    .bind(a.category)
    .bind(a.published_at)
    .bind(a.fetched_at)
    .execute(&mut *conn)
    .await?;
    Ok(exec.rows_affected() == 1)
}
