use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

pub struct NewVideo<'a> {
    pub video_id: &'a str,
    pub channel_name: &'a str,
    pub url: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub published_at: DateTime<Utc>,
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://youtu.be/{}", video_id)
}

pub async fn video_exists(conn: &mut SqliteConnection, video_id: &str) -> Result<bool> {
    let hit: Option<i64> = sqlx::query_scalar("SELECT 1 FROM videos WHERE video_id = ?1")
        .bind(video_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(hit.is_some())
}

pub async fn insert_video(conn: &mut SqliteConnection, v: &NewVideo<'_>) -> Result<bool> {
    let exec = sqlx::query(
        r#"
        INSERT INTO videos (video_id, channel_name, url, title, description, published_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT (video_id) DO NOTHING
        "#,
    )
    .bind(v.video_id)
    .bind(v.channel_name)
    .bind(v.url)
    .bind(v.title)
    .bind(v.description)
    .bind(v.published_at)
    .execute(&mut *conn)
    .await?;
    Ok(exec.rows_affected() == 1)
}
