//! schema.org JSON-LD builders for the marketing site.
//!
//! Each builder returns a standalone document carrying its own `@context`, ready to
//! embed in a `<script type="application/ld+json">` tag.

use serde_json::{json, Value};

use crate::config::SiteConfig;
use crate::models::content::ContentItemRow;
use crate::models::crm::PackageRow;
use crate::seo::metadata::{absolute_url, article_path};

const SCHEMA_CONTEXT: &str = "https://schema.org";

fn organization_id(site: &SiteConfig) -> String {
    format!("{}/#organization", site.url)
}

pub fn organization(site: &SiteConfig) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Organization",
        "@id": organization_id(site),
        "name": site.name,
        "url": absolute_url(site, "/"),
        "logo": absolute_url(site, "/logo.png"),
        "contactPoint": {
            "@type": "ContactPoint",
            "telephone": site.phone,
            "contactType": "customer service",
            "areaServed": site.city,
        },
    })
}

/// Local-business listing for the agency itself.
pub fn professional_service(site: &SiteConfig) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "ProfessionalService",
        "name": site.name,
        "url": absolute_url(site, "/"),
        "telephone": site.phone,
        "image": absolute_url(site, "/og-image.png"),
        "priceRange": "$$",
        "address": {
            "@type": "PostalAddress",
            "addressLocality": site.city,
        },
        "areaServed": { "@type": "City", "name": site.city },
    })
}

pub fn website(site: &SiteConfig) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "WebSite",
        "name": site.name,
        "url": absolute_url(site, "/"),
        "publisher": { "@id": organization_id(site) },
    })
}

/// One `Service` per package, priced monthly in USD.
pub fn service(site: &SiteConfig, package: &PackageRow) -> Value {
    let price = format!(
        "{}.{:02}",
        package.monthly_price_cents / 100,
        package.monthly_price_cents % 100
    );
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Service",
        "name": package.name,
        "description": package.description,
        "serviceType": "Marketing",
        "provider": { "@id": organization_id(site) },
        "areaServed": { "@type": "City", "name": site.city },
        "offers": {
            "@type": "Offer",
            "url": absolute_url(site, "/pricing"),
            "priceCurrency": "USD",
            "price": price,
            "priceSpecification": {
                "@type": "UnitPriceSpecification",
                "price": price,
                "priceCurrency": "USD",
                "unitText": "MONTH",
            },
        },
    })
}

pub fn faq_page(entries: &[(String, String)]) -> Value {
    let main_entity: Vec<Value> = entries
        .iter()
        .map(|(question, answer)| {
            json!({
                "@type": "Question",
                "name": question,
                "acceptedAnswer": { "@type": "Answer", "text": answer },
            })
        })
        .collect();
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "FAQPage",
        "mainEntity": main_entity,
    })
}

/// `crumbs` are (name, path) pairs from the root down.
pub fn breadcrumb_list(site: &SiteConfig, crumbs: &[(&str, &str)]) -> Value {
    let items: Vec<Value> = crumbs
        .iter()
        .enumerate()
        .map(|(i, (name, path))| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": name,
                "item": absolute_url(site, path),
            })
        })
        .collect();
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "BreadcrumbList",
        "itemListElement": items,
    })
}

pub fn article(site: &SiteConfig, item: &ContentItemRow) -> Value {
    let url = absolute_url(site, &article_path(item));
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Article",
        "headline": item.title,
        "description": item.meta_description,
        "keywords": item.keywords.join(", "),
        "datePublished": item.created_at.to_rfc3339(),
        "dateModified": item.updated_at.to_rfc3339(),
        "mainEntityOfPage": { "@type": "WebPage", "@id": url },
        "url": url,
        "author": { "@id": organization_id(site) },
        "publisher": {
            "@type": "Organization",
            "name": site.name,
            "logo": { "@type": "ImageObject", "url": absolute_url(site, "/logo.png") },
        },
    })
}

/// Question/answer pairs from a markdown FAQ: each `## ` heading is a question and the
/// text up to the next heading is its answer. Headings with no answer are skipped.
pub fn faq_entries_from_markdown(body: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    let mut flush = |current: Option<(String, Vec<&str>)>| {
        if let Some((question, lines)) = current {
            let answer = lines.join(" ").split_whitespace().collect::<Vec<_>>().join(" ");
            if !answer.is_empty() {
                entries.push((question, answer));
            }
        }
    };

    for line in body.lines() {
        let trimmed = line.trim();
        if let Some(question) = trimmed.strip_prefix("## ") {
            flush(current.take());
            current = Some((question.trim().to_string(), Vec::new()));
        } else if trimmed.starts_with('#') {
            flush(current.take());
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(trimmed);
        }
    }
    flush(current);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seo::metadata::tests::{published_item, site};
    use chrono::Utc;
    use uuid::Uuid;

    fn package(cents: i64) -> PackageRow {
        PackageRow {
            id: Uuid::new_v4(),
            name: "Local Growth".to_string(),
            slug: "local-growth".to_string(),
            description: "SEO and content every month.".to_string(),
            monthly_price_cents: cents,
            features: vec![],
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_every_builder_sets_context() {
        let site = site();
        let docs = [
            organization(&site),
            professional_service(&site),
            website(&site),
            service(&site, &package(49900)),
            faq_page(&[]),
            breadcrumb_list(&site, &[("Home", "/")]),
            article(&site, &published_item("a")),
        ];
        for doc in docs {
            assert_eq!(doc["@context"], SCHEMA_CONTEXT);
            assert!(doc["@type"].is_string());
        }
    }

    #[test]
    fn test_service_price_formatting() {
        let doc = service(&site(), &package(49905));
        assert_eq!(doc["offers"]["price"], "499.05");
        assert_eq!(doc["offers"]["priceCurrency"], "USD");
    }

    #[test]
    fn test_breadcrumb_positions_are_one_based() {
        let doc = breadcrumb_list(&site(), &[("Home", "/"), ("Blog", "/blog")]);
        let items = doc["itemListElement"].as_array().unwrap();
        assert_eq!(items[0]["position"], 1);
        assert_eq!(items[1]["position"], 2);
        assert_eq!(items[1]["item"], "https://brightside.example/blog");
    }

    #[test]
    fn test_article_links_canonical_page() {
        let doc = article(&site(), &published_item("five-local-seo-wins"));
        assert_eq!(
            doc["mainEntityOfPage"]["@id"],
            "https://brightside.example/blog/five-local-seo-wins"
        );
        assert_eq!(doc["headline"], "Five Local SEO Wins");
    }

    #[test]
    fn test_faq_entries_from_markdown() {
        let body = "Intro text.\n\n## How long does SEO take?\n\nMost clients see movement\nin three months.\n\n## Empty question?\n\n## Do you write content?\nYes, every month.\n";
        let entries = faq_entries_from_markdown(body);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "How long does SEO take?");
        assert_eq!(entries[0].1, "Most clients see movement in three months.");
        assert_eq!(entries[1].1, "Yes, every month.");

        let doc = faq_page(&entries);
        assert_eq!(doc["mainEntity"].as_array().unwrap().len(), 2);
    }
}
