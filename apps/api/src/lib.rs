//! Agency API: marketing-site SEO, lead intake, CRM admin, and the content studio.

pub mod auth;
pub mod config;
pub mod crm;
pub mod db;
pub mod errors;
pub mod leads;
pub mod llm_client;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod seo;
pub mod slug;
pub mod state;
pub mod studio;
