//! Public SEO endpoints: crawler files, page metadata, and structured data.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::SiteConfig;
use crate::crm::handlers::active_packages;
use crate::errors::AppError;
use crate::models::content::ContentItemRow;
use crate::seo::metadata::{
    absolute_url, article_metadata, article_path, page_metadata, PageMetadata, StaticPage,
};
use crate::seo::schema;
use crate::state::AppState;
use crate::studio::prompts::ContentCategory;
use crate::studio::repository::{published_by_slug, published_content};

const DISALLOWED_PATHS: &[&str] = &["/admin", "/api"];

#[derive(Debug, Serialize)]
pub struct ArticleSeo {
    pub metadata: PageMetadata,
    pub schema: Vec<Value>,
}

// ────────────────────────────────────────────────────────────────────────────
// Renderers
// ────────────────────────────────────────────────────────────────────────────

pub fn render_robots(site: &SiteConfig) -> String {
    let mut out = String::from("User-agent: *\nAllow: /\n");
    for path in DISALLOWED_PATHS {
        out.push_str(&format!("Disallow: {path}\n"));
    }
    out.push_str(&format!("\nSitemap: {}\n", absolute_url(site, "/sitemap.xml")));
    out
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Sitemap of the static pages followed by published articles.
pub fn render_sitemap(site: &SiteConfig, articles: &[ContentItemRow]) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
        <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for page in StaticPage::ALL {
        out.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <changefreq>weekly</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
            xml_escape(&absolute_url(site, page.path())),
            page.priority()
        ));
    }
    for item in articles {
        out.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>monthly</changefreq>\n    <priority>0.6</priority>\n  </url>\n",
            xml_escape(&absolute_url(site, &article_path(item))),
            item.updated_at.format("%Y-%m-%d")
        ));
    }
    out.push_str("</urlset>\n");
    out
}

pub fn manifest(site: &SiteConfig) -> Value {
    json!({
        "name": site.name,
        "short_name": site.name.split_whitespace().next().unwrap_or(&site.name),
        "description": format!("{} - local marketing in {}", site.name, site.city),
        "start_url": "/",
        "display": "standalone",
        "background_color": "#ffffff",
        "theme_color": "#0f172a",
        "icons": [
            { "src": "/icon-192.png", "sizes": "192x192", "type": "image/png" },
            { "src": "/icon-512.png", "sizes": "512x512", "type": "image/png" },
        ],
    })
}

pub fn article_seo(site: &SiteConfig, item: &ContentItemRow) -> ArticleSeo {
    let path = article_path(item);
    let mut docs = vec![
        schema::article(site, item),
        schema::breadcrumb_list(
            site,
            &[
                ("Home", "/"),
                ("Blog", "/blog"),
                (item.title.as_str(), path.as_str()),
            ],
        ),
    ];
    if item.category == ContentCategory::Faq.as_str() {
        let entries = schema::faq_entries_from_markdown(&item.body);
        if !entries.is_empty() {
            docs.push(schema::faq_page(&entries));
        }
    }
    ArticleSeo {
        metadata: article_metadata(site, item),
        schema: docs,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /robots.txt
pub async fn handle_robots(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_robots(&state.config.site),
    )
}

/// GET /sitemap.xml
pub async fn handle_sitemap(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let articles = published_content(&state.db).await?;
    Ok((
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        render_sitemap(&state.config.site, &articles),
    ))
}

/// GET /manifest.webmanifest
pub async fn handle_manifest(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/manifest+json")],
        manifest(&state.config.site).to_string(),
    )
}

/// GET /api/v1/seo/pages/:page
pub async fn handle_page_metadata(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Json<PageMetadata>, AppError> {
    let page: StaticPage = page.parse()?;
    Ok(Json(page_metadata(&state.config.site, page)))
}

/// GET /api/v1/seo/schema
/// Site-wide JSON-LD: organization, local business, website, and one service per active package.
pub async fn handle_site_schema(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let site = &state.config.site;
    let mut docs = vec![
        schema::organization(site),
        schema::professional_service(site),
        schema::website(site),
    ];
    docs.extend(
        active_packages(&state.db)
            .await?
            .iter()
            .map(|p| schema::service(site, p)),
    );
    Ok(Json(docs))
}

/// GET /api/v1/seo/articles/:slug
pub async fn handle_article_seo(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ArticleSeo>, AppError> {
    let item = published_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No published article '{slug}'")))?;
    Ok(Json(article_seo(&state.config.site, &item)))
}
