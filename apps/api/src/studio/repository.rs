use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::content::ContentItemRow;
use crate::pagination::PageParams;
use crate::studio::prompts::ContentCategory;
use crate::studio::similarity::ContentSample;

/// Content fields written when a generated draft is saved.
pub struct NewContentItem<'a> {
    pub category: ContentCategory,
    pub title: &'a str,
    pub slug: &'a str,
    pub meta_description: &'a str,
    pub body: &'a str,
    pub keywords: &'a [String],
    pub max_similarity: f64,
    pub created_by: Uuid,
}

impl From<&ContentItemRow> for ContentSample {
    fn from(row: &ContentItemRow) -> Self {
        ContentSample {
            id: Some(row.id),
            category: row.category.clone(),
            title: row.title.clone(),
            body: row.body.clone(),
        }
    }
}

/// All stored content in a category, newest first.
pub async fn content_in_category(
    pool: &PgPool,
    category: ContentCategory,
) -> Result<Vec<ContentItemRow>, AppError> {
    let rows = sqlx::query_as::<_, ContentItemRow>(
        "SELECT * FROM content_items WHERE category = $1 ORDER BY created_at DESC",
    )
    .bind(category.as_str())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_content(
    pool: &PgPool,
    category: Option<ContentCategory>,
    status: Option<&str>,
    page: PageParams,
) -> Result<Vec<ContentItemRow>, AppError> {
    let rows = sqlx::query_as::<_, ContentItemRow>(
        r#"
        SELECT * FROM content_items
        WHERE ($1::text IS NULL OR category = $1)
          AND ($2::text IS NULL OR status = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(category.map(|c| c.as_str()))
    .bind(status)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn published_content(pool: &PgPool) -> Result<Vec<ContentItemRow>, AppError> {
    let rows = sqlx::query_as::<_, ContentItemRow>(
        "SELECT * FROM content_items WHERE status = 'published' ORDER BY updated_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn published_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<ContentItemRow>, AppError> {
    let row = sqlx::query_as::<_, ContentItemRow>(
        "SELECT * FROM content_items WHERE slug = $1 AND status = 'published'",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn get_content(pool: &PgPool, id: Uuid) -> Result<Option<ContentItemRow>, AppError> {
    let row = sqlx::query_as::<_, ContentItemRow>("SELECT * FROM content_items WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn delete_content(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM content_items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Slugs equal to `base` or of the form `base-N`.
pub async fn slugs_like(pool: &PgPool, base: &str) -> Result<Vec<String>, AppError> {
    let slugs: Vec<String> = sqlx::query_scalar(
        "SELECT slug FROM content_items WHERE slug = $1 OR slug LIKE $1 || '-%'",
    )
    .bind(base)
    .fetch_all(pool)
    .await?;
    Ok(slugs)
}

/// First of `base`, `base-2`, `base-3`, ... not in `taken`.
pub fn unique_slug(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|s| s == base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

pub async fn insert_content(
    pool: &PgPool,
    item: NewContentItem<'_>,
) -> Result<ContentItemRow, AppError> {
    let row = sqlx::query_as::<_, ContentItemRow>(
        r#"
        INSERT INTO content_items
            (id, category, title, slug, meta_description, body, keywords, status, max_similarity, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'draft', $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(item.category.as_str())
    .bind(item.title)
    .bind(item.slug)
    .bind(item.meta_description)
    .bind(item.body)
    .bind(item.keywords)
    .bind(item.max_similarity)
    .bind(item.created_by)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn mark_published(
    pool: &PgPool,
    id: Uuid,
    key: &str,
) -> Result<ContentItemRow, AppError> {
    let row = sqlx::query_as::<_, ContentItemRow>(
        r#"
        UPDATE content_items
        SET status = 'published', published_key = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(key)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Content {id} not found")))?;
    Ok(row)
}
