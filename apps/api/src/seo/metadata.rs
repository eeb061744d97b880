use std::str::FromStr;

use serde::Serialize;

use crate::config::SiteConfig;
use crate::errors::AppError;
use crate::models::content::ContentItemRow;

const DEFAULT_OG_IMAGE: &str = "/og-image.png";

/// Static pages of the marketing site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticPage {
    Home,
    Services,
    Pricing,
    About,
    Contact,
    Blog,
}

impl StaticPage {
    pub const ALL: [StaticPage; 6] = [
        StaticPage::Home,
        StaticPage::Services,
        StaticPage::Pricing,
        StaticPage::About,
        StaticPage::Contact,
        StaticPage::Blog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StaticPage::Home => "home",
            StaticPage::Services => "services",
            StaticPage::Pricing => "pricing",
            StaticPage::About => "about",
            StaticPage::Contact => "contact",
            StaticPage::Blog => "blog",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            StaticPage::Home => "/",
            StaticPage::Services => "/services",
            StaticPage::Pricing => "/pricing",
            StaticPage::About => "/about",
            StaticPage::Contact => "/contact",
            StaticPage::Blog => "/blog",
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            StaticPage::Home => "Home",
            StaticPage::Services => "Services",
            StaticPage::Pricing => "Pricing",
            StaticPage::About => "About",
            StaticPage::Contact => "Contact",
            StaticPage::Blog => "Blog",
        }
    }

    /// Sitemap priority, highest for the home page.
    pub fn priority(&self) -> f32 {
        match self {
            StaticPage::Home => 1.0,
            StaticPage::Services | StaticPage::Pricing => 0.9,
            StaticPage::Blog => 0.8,
            StaticPage::About | StaticPage::Contact => 0.7,
        }
    }

    fn description(&self, site: &SiteConfig) -> String {
        let SiteConfig { name, city, .. } = site;
        match self {
            StaticPage::Home => format!(
                "{name} helps {city} small businesses win local customers with websites, \
                local SEO, and content that converts."
            ),
            StaticPage::Services => format!(
                "Web design, local SEO, content marketing, and review management for \
                {city} businesses. See what {name} can do for you."
            ),
            StaticPage::Pricing => format!(
                "Simple monthly marketing packages from {name}. No long-term lock-in, \
                clear deliverables, and local support in {city}."
            ),
            StaticPage::About => format!(
                "Meet {name}, a {city} marketing agency focused on measurable growth \
                for local service businesses."
            ),
            StaticPage::Contact => format!(
                "Get a free marketing review from {name}. Call {} or send us a message.",
                site.phone
            ),
            StaticPage::Blog => format!(
                "Practical marketing advice for {city} small businesses from the {name} team."
            ),
        }
    }
}

impl FromStr for StaticPage {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StaticPage::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| AppError::NotFound(format!("No page named '{s}'")))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    pub url: String,
    pub site_name: String,
    #[serde(rename = "type")]
    pub og_type: &'static str,
    pub image: String,
    pub locale: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TwitterCard {
    pub card: &'static str,
    pub title: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub canonical_url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
}

pub fn absolute_url(site: &SiteConfig, path: &str) -> String {
    if path == "/" {
        format!("{}/", site.url)
    } else {
        format!("{}{}", site.url, path)
    }
}

fn build(
    site: &SiteConfig,
    title: String,
    description: String,
    path: &str,
    og_type: &'static str,
    keywords: Vec<String>,
) -> PageMetadata {
    let url = absolute_url(site, path);
    let image = absolute_url(site, DEFAULT_OG_IMAGE);
    PageMetadata {
        open_graph: OpenGraph {
            title: title.clone(),
            description: description.clone(),
            url: url.clone(),
            site_name: site.name.clone(),
            og_type,
            image: image.clone(),
            locale: "en_US",
        },
        twitter: TwitterCard {
            card: "summary_large_image",
            title: title.clone(),
            description: description.clone(),
            image,
        },
        title,
        description,
        canonical_url: url,
        keywords,
    }
}

pub fn page_metadata(site: &SiteConfig, page: StaticPage) -> PageMetadata {
    let title = match page {
        StaticPage::Home => format!("{} | Local Marketing in {}", site.name, site.city),
        other => format!("{} | {}", other.heading(), site.name),
    };
    build(
        site,
        title,
        page.description(site),
        page.path(),
        "website",
        Vec::new(),
    )
}

pub fn article_path(item: &ContentItemRow) -> String {
    format!("/blog/{}", item.slug)
}

pub fn article_metadata(site: &SiteConfig, item: &ContentItemRow) -> PageMetadata {
    build(
        site,
        format!("{} | {}", item.title, site.name),
        item.meta_description.clone(),
        &article_path(item),
        "article",
        item.keywords.clone(),
    )
}
