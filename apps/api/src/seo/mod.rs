//! Marketing-site SEO: per-page metadata, schema.org JSON-LD, and crawler files.

pub mod handlers;
pub mod metadata;
pub mod schema;
