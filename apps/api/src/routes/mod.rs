pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::crm::handlers as crm;
use crate::leads::handlers as leads;
use crate::seo::handlers as seo;
use crate::state::AppState;
use crate::studio::handlers as studio;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Public site
        .route("/robots.txt", get(seo::handle_robots))
        .route("/sitemap.xml", get(seo::handle_sitemap))
        .route("/manifest.webmanifest", get(seo::handle_manifest))
        .route("/api/v1/seo/pages/:page", get(seo::handle_page_metadata))
        .route("/api/v1/seo/schema", get(seo::handle_site_schema))
        .route("/api/v1/seo/articles/:slug", get(seo::handle_article_seo))
        .route("/api/v1/packages", get(crm::handle_public_packages))
        .route("/api/v1/leads", post(leads::handle_submit_lead))
        // Auth
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/auth/me", get(auth::handle_me))
        .route(
            "/api/v1/admin/admins",
            get(auth::handle_list_admins).post(auth::handle_create_admin),
        )
        // Leads admin
        .route("/api/v1/admin/leads", get(leads::handle_list_leads))
        .route(
            "/api/v1/admin/leads/:id",
            get(leads::handle_get_lead)
                .patch(leads::handle_update_lead_status)
                .delete(leads::handle_delete_lead),
        )
        .route(
            "/api/v1/admin/leads/:id/convert",
            post(leads::handle_convert_lead),
        )
        .route(
            "/api/v1/admin/blacklist",
            get(leads::handle_list_blacklist).post(leads::handle_add_blacklist),
        )
        .route(
            "/api/v1/admin/blacklist/:id",
            delete(leads::handle_remove_blacklist),
        )
        // CRM admin
        .route(
            "/api/v1/admin/clients",
            get(crm::handle_list_clients).post(crm::handle_create_client),
        )
        .route(
            "/api/v1/admin/clients/:id",
            get(crm::handle_get_client)
                .put(crm::handle_update_client)
                .delete(crm::handle_delete_client),
        )
        .route(
            "/api/v1/admin/users",
            get(crm::handle_list_users).post(crm::handle_create_user),
        )
        .route("/api/v1/admin/users/:id", get(crm::handle_get_user))
        .route(
            "/api/v1/admin/packages",
            get(crm::handle_list_packages).post(crm::handle_create_package),
        )
        .route(
            "/api/v1/admin/contracts",
            get(crm::handle_list_contracts).post(crm::handle_create_contract),
        )
        .route(
            "/api/v1/admin/contracts/:id",
            get(crm::handle_get_contract)
                .patch(crm::handle_update_contract_status)
                .delete(crm::handle_delete_contract),
        )
        // Content studio
        .route("/api/v1/studio/categories", get(studio::handle_list_categories))
        .route("/api/v1/studio/prompt-preview", post(studio::handle_prompt_preview))
        .route(
            "/api/v1/studio/check-duplicates",
            post(studio::handle_check_duplicates),
        )
        .route("/api/v1/studio/duplicates", get(studio::handle_scan_duplicates))
        .route("/api/v1/studio/validate", post(studio::handle_validate))
        .route("/api/v1/studio/generate", post(studio::handle_generate))
        .route("/api/v1/studio/content", get(studio::handle_list_content))
        .route(
            "/api/v1/studio/content/:id",
            get(studio::handle_get_content).delete(studio::handle_delete_content),
        )
        .route(
            "/api/v1/studio/content/:id/publish",
            post(studio::handle_publish_content),
        )
        .with_state(state)
}
