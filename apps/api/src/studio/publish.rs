//! Publishing: render a stored draft to markdown with front matter and upload it.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::content::ContentItemRow;
use crate::studio::repository::{get_content, mark_published};

pub fn object_key(item: &ContentItemRow) -> String {
    format!("content/{}/{}.md", item.category, item.slug)
}

/// Front-matter values are emitted as JSON strings, which YAML accepts verbatim.
fn front_matter_value(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Renders the item as a markdown document with a YAML front-matter block.
pub fn render_markdown(item: &ContentItemRow) -> String {
    let mut out = String::from("---\n");
    out.push_str(&format!("title: {}\n", front_matter_value(&item.title)));
    out.push_str(&format!("slug: {}\n", front_matter_value(&item.slug)));
    out.push_str(&format!("category: {}\n", front_matter_value(&item.category)));
    out.push_str(&format!(
        "description: {}\n",
        front_matter_value(&item.meta_description)
    ));
    if item.keywords.is_empty() {
        out.push_str("keywords: []\n");
    } else {
        out.push_str("keywords:\n");
        for keyword in &item.keywords {
            out.push_str(&format!("  - {}\n", front_matter_value(keyword)));
        }
    }
    out.push_str(&format!("date: {}\n", item.created_at.format("%Y-%m-%d")));
    out.push_str(&format!("updated: {}\n", item.updated_at.to_rfc3339()));
    out.push_str("---\n\n");
    out.push_str(item.body.trim());
    out.push('\n');
    out
}

/// Uploads the rendered item and marks it published. Republishing overwrites the object.
pub async fn publish_content(
    pool: &PgPool,
    s3: &S3Client,
    bucket: &str,
    id: uuid::Uuid,
) -> Result<ContentItemRow, AppError> {
    let item = get_content(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {id} not found")))?;

    let key = object_key(&item);
    let markdown = render_markdown(&item);

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(markdown.into_bytes()))
        .content_type("text/markdown")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Upload of {key} failed: {e}")))?;

    info!("Published content {} to s3://{}/{}", item.id, bucket, key);

    mark_published(pool, item.id, &key).await
}
