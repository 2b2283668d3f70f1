//! Database operations for the `articles` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `articles` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct ArticleRow {
    pub id: i64,
    pub publisher_id: i64,
    pub url: String,
    pub in_article_tags: Option<String>,
    pub out_article_tags: Option<String>,
    pub in_article_date: Option<DateTime<Utc>>,
    pub out_article_date: Option<DateTime<Utc>>,
    pub links: Option<String>,
    pub article_content: Option<String>,
    pub article_format: Option<String>,
    pub extraction_version: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewArticle {
    pub publisher_id: i64,
    pub url: String,
    pub in_article_tags: Option<String>,
    pub out_article_tags: Option<String>,
    pub in_article_date: Option<DateTime<Utc>>,
    pub out_article_date: Option<DateTime<Utc>>,
    pub links: Option<String>,
    pub article_content: Option<String>,
    pub article_format: Option<String>,
    pub extraction_version: Option<String>,
    pub remarks: Option<String>,
}

/// Fields of a `PUT`; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleUpdate {
    pub publisher_id: Option<i64>,
    pub url: Option<String>,
    pub in_article_tags: Option<String>,
    pub out_article_tags: Option<String>,
    pub in_article_date: Option<DateTime<Utc>>,
    pub out_article_date: Option<DateTime<Utc>>,
    pub links: Option<String>,
    pub article_content: Option<String>,
    pub article_format: Option<String>,
    pub extraction_version: Option<String>,
    pub remarks: Option<String>,
}

/// Returns up to `limit` articles, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_articles(pool: &PgPool, limit: i64) -> Result<Vec<ArticleRow>, DbError> {
    let rows = sqlx::query_as::<_, ArticleRow>(
        "SELECT id, publisher_id, url, in_article_tags, out_article_tags, in_article_date, \
                out_article_date, links, article_content, article_format, extraction_version, \
                remarks, created_at, updated_at \
         FROM articles \
         ORDER BY id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_article(pool: &PgPool, id: i64) -> Result<Option<ArticleRow>, DbError> {
    let row = sqlx::query_as::<_, ArticleRow>(
        "SELECT id, publisher_id, url, in_article_tags, out_article_tags, in_article_date, \
                out_article_date, links, article_content, article_format, extraction_version, \
                remarks, created_at, updated_at \
         FROM articles \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts an article.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails: a foreign-key violation
/// when the publisher does not exist, a unique violation for a known url.
pub async fn create_article(pool: &PgPool, article: &NewArticle) -> Result<ArticleRow, DbError> {
    let row = sqlx::query_as::<_, ArticleRow>(
        "INSERT INTO articles (publisher_id, url, in_article_tags, out_article_tags, \
                               in_article_date, out_article_date, links, article_content, \
                               article_format, extraction_version, remarks) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING id, publisher_id, url, in_article_tags, out_article_tags, in_article_date, \
                   out_article_date, links, article_content, article_format, \
                   extraction_version, remarks, created_at, updated_at",
    )
    .bind(article.publisher_id)
    .bind(&article.url)
    .bind(&article.in_article_tags)
    .bind(&article.out_article_tags)
    .bind(article.in_article_date)
    .bind(article.out_article_date)
    .bind(&article.links)
    .bind(&article.article_content)
    .bind(&article.article_format)
    .bind(&article.extraction_version)
    .bind(&article.remarks)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Applies the supplied fields of `update` to an article.
///
/// Returns `None` if the article does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails: a foreign-key violation
/// for an unknown publisher, a unique violation when another article has
/// the url.
pub async fn update_article(
    pool: &PgPool,
    id: i64,
    update: &ArticleUpdate,
) -> Result<Option<ArticleRow>, DbError> {
    let row = sqlx::query_as::<_, ArticleRow>(
        "UPDATE articles \
         SET publisher_id = COALESCE($2, publisher_id), \
             url = COALESCE($3, url), \
             in_article_tags = COALESCE($4, in_article_tags), \
             out_article_tags = COALESCE($5, out_article_tags), \
             in_article_date = COALESCE($6, in_article_date), \
             out_article_date = COALESCE($7, out_article_date), \
             links = COALESCE($8, links), \
             article_content = COALESCE($9, article_content), \
             article_format = COALESCE($10, article_format), \
             extraction_version = COALESCE($11, extraction_version), \
             remarks = COALESCE($12, remarks), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, publisher_id, url, in_article_tags, out_article_tags, in_article_date, \
                   out_article_date, links, article_content, article_format, \
                   extraction_version, remarks, created_at, updated_at",
    )
    .bind(id)
    .bind(update.publisher_id)
    .bind(&update.url)
    .bind(&update.in_article_tags)
    .bind(&update.out_article_tags)
    .bind(update.in_article_date)
    .bind(update.out_article_date)
    .bind(&update.links)
    .bind(&update.article_content)
    .bind(&update.article_format)
    .bind(&update.extraction_version)
    .bind(&update.remarks)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Deletes an article and the sentiments judged from it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_article(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM articles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
