use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

use nzn_core::{Article, Result};

use crate::scrapers::support::{self, collapse_ws, word_count, CategoryRule};
use crate::scrapers::{Scraper, SourceConfig};

/// NZ Herald publishes no feed, so this scraper walks the `<article>`
/// containers on the latest-news page.
pub struct NzHeraldScraper {
    config: SourceConfig,
    client: reqwest::Client,
    heuristics: LinkHeuristics,
}

/// Parameters of the "which link is the real article" guess. Site redesigns
/// move these, so they are data on the scraper rather than fixed logic.
#[derive(Debug, Clone)]
pub struct LinkHeuristics {
    /// Article links on the site are long; anything shorter is navigation.
    pub min_href_len: usize,
    /// Path fragments that mark navigational or meta pages.
    pub blocklist: &'static [&'static str],
}

const BLOCKLIST: &[&str] = &[
    "/photo-sales",
    "/about-",
    "/help-",
    "/terms",
    "/privacy",
    "/subscribe",
    "/newsletters",
    "/connect/",
    "/topic/",
    "/section/",
];

impl Default for LinkHeuristics {
    fn default() -> Self {
        Self { min_href_len: 80, blocklist: BLOCKLIST }
    }
}

const BROWSER_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const RULES: [CategoryRule; 18] = [
    CategoryRule { pattern: "/nz/", category: "New Zealand" },
    CategoryRule { pattern: "/sport/", category: "Sport" },
    CategoryRule { pattern: "/world/", category: "World" },
    CategoryRule { pattern: "/business/", category: "Business" },
    CategoryRule { pattern: "/entertainment/", category: "Entertainment" },
    CategoryRule { pattern: "/lifestyle/", category: "Lifestyle" },
    CategoryRule { pattern: "/travel/", category: "Travel" },
    CategoryRule { pattern: "/politics/", category: "Politics" },
    CategoryRule { pattern: "/opinion/", category: "Opinion" },
    CategoryRule { pattern: "/auckland/", category: "Auckland" },
    CategoryRule { pattern: "/wellington/", category: "Wellington" },
    CategoryRule { pattern: "/sport/rugby/", category: "Rugby" },
    CategoryRule { pattern: "/sport/cricket/", category: "Cricket" },
    CategoryRule { pattern: "/sport/tennis/", category: "Tennis" },
    CategoryRule { pattern: "/sport/boxing/", category: "Boxing" },
    CategoryRule { pattern: "/sport/racing/", category: "Racing" },
    CategoryRule { pattern: "/viva/", category: "Lifestyle" },
    CategoryRule { pattern: "/kahu/", category: "Kahu" },
];

impl NzHeraldScraper {
    pub fn new() -> Result<Self> {
        let config = SourceConfig::new(
            "NZ Herald",
            "https://www.nzherald.co.nz/latest-news/",
            "General",
        );
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(BROWSER_UA)
            .build()?;
        Ok(Self { config, client, heuristics: LinkHeuristics::default() })
    }

    pub fn with_heuristics(mut self, heuristics: LinkHeuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    fn parse_page(&self, body: &str) -> Vec<Article> {
        let document = Html::parse_document(body);
        let container_selector = Selector::parse("article").unwrap();

        let mut articles = Vec::new();
        let mut seen = HashSet::new();
        for container in document.select(&container_selector) {
            if articles.len() >= self.config.max_articles {
                break;
            }
            let Some(article) = self.extract_from_container(&container) else {
                continue;
            };
            if seen.insert(article.url.clone()) {
                articles.push(article);
            }
        }
        articles
    }

    fn extract_from_container(&self, container: &ElementRef<'_>) -> Option<Article> {
        let link_selector = Selector::parse("a[href]").unwrap();

        // The longest qualifying href among the container's links is the
        // article; everything else is navigation.
        let mut best: Option<(ElementRef<'_>, String)> = None;
        for link in container.select(&link_selector) {
            let href = link.value().attr("href").unwrap_or("").trim();
            if href.len() < self.heuristics.min_href_len {
                continue;
            }
            if self.heuristics.blocklist.iter().any(|frag| href.contains(frag)) {
                debug!(href, "skipping blocklisted link");
                continue;
            }
            if best.as_ref().map_or(true, |(_, current)| href.len() > current.len()) {
                best = Some((link, href.to_string()));
            }
        }
        let (link, href) = best?;

        let url = self.absolute_url(&href)?;
        let title = self.resolve_title(container, &link, &url)?;
        if !support::is_valid_article(&title, &url) {
            return None;
        }

        let description = self.extract_description(container, &title);
        let category = support::categorize_longest(&url, &RULES, &self.config.category);
        let published = container
            .select(&Selector::parse("time[datetime]").unwrap())
            .next()
            .and_then(|el| el.value().attr("datetime"))
            .and_then(support::parse_date);

        Some(support::create_article(
            &self.config,
            &title,
            &description,
            &url,
            published,
            Some(category),
        ))
    }

    fn absolute_url(&self, href: &str) -> Option<String> {
        if href.starts_with("http") {
            return Some(href.to_string());
        }
        let base = Url::parse(&self.config.base_url).ok()?;
        base.join(href).ok().map(String::from)
    }

    /// Title fallback chain: link text, a heading in the container, a
    /// heading nested inside the link, finally the URL slug. Anything
    /// under two words is rejected.
    fn resolve_title(
        &self,
        container: &ElementRef<'_>,
        link: &ElementRef<'_>,
        url: &str,
    ) -> Option<String> {
        let text = collapse_ws(&link.text().collect::<String>());
        if word_count(&text) >= 2 {
            return Some(text);
        }
        if let Some(title) = heading_title(container) {
            return Some(title);
        }
        if let Some(title) = heading_title(link) {
            return Some(title);
        }
        let slug = title_from_slug(url)?;
        (word_count(&slug) >= 2).then_some(slug)
    }

    fn extract_description(&self, container: &ElementRef<'_>, title: &str) -> String {
        let summary_selector = Selector::parse("p.story-card-body, p.summary").unwrap();
        container
            .select(&summary_selector)
            .next()
            .map(|el| collapse_ws(&el.text().collect::<String>()))
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| title.to_string())
    }
}

fn heading_title(scope: &ElementRef<'_>) -> Option<String> {
    for tag in ["h1", "h2", "h3", "h4"] {
        let selector = Selector::parse(tag).unwrap();
        if let Some(heading) = scope.select(&selector).next() {
            let text = collapse_ws(&heading.text().collect::<String>());
            if word_count(&text) >= 2 {
                return Some(text);
            }
        }
    }
    None
}

/// Derive a readable title from the URL path slug. Herald article paths end
/// with an uppercase id segment, so the slug is usually second to last.
fn title_from_slug(url: &str) -> Option<String> {
    let parts: Vec<&str> = url.trim_end_matches('/').split('/').collect();
    let last = *parts.last()?;
    let slug = if is_upper(last) && parts.len() >= 2 {
        parts[parts.len() - 2]
    } else {
        last
    };
    if slug.is_empty() || !slug.contains('-') || is_upper(slug) {
        return None;
    }
    Some(
        slug.split('-')
            .filter(|word| !word.is_empty())
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn is_upper(s: &str) -> bool {
    let mut has_cased = false;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[async_trait]
impl Scraper for NzHeraldScraper {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn scrape(&self) -> Result<Vec<Article>> {
        let body = self
            .client
            .get(&self.config.base_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let articles = self.parse_page(&body);
        if articles.is_empty() {
            warn!(source = %self.config.source, "no article containers found");
        } else {
            info!(source = %self.config.source, count = articles.len(), "scraped articles");
        }
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_HREF: &str = "/nz/politics/government-announces-sweeping-reforms-to-public-health-system-after-independent-review/HG7TVN3ABCDEFG/";

    fn scraper() -> NzHeraldScraper {
        NzHeraldScraper::new().unwrap()
    }

    #[test]
    fn picks_longest_qualifying_link_and_resolves_it() {
        let html = format!(
            r#"<html><body>
            <article>
              <a href="/nz/">Short nav</a>
              <a href="{ARTICLE_HREF}"><h3>Government announces sweeping health reforms</h3></a>
              <p class="story-card-body">The reforms follow an independent review.</p>
            </article>
            </body></html>"#
        );
        let articles = scraper().parse_page(&html);

        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(
            article.url,
            format!("https://www.nzherald.co.nz{ARTICLE_HREF}")
        );
        assert_eq!(article.title, "Government announces sweeping health reforms");
        assert_eq!(article.description, "The reforms follow an independent review.");
        assert_eq!(article.category, "Politics");
        assert_eq!(article.source, "NZ Herald");
    }

    #[test]
    fn blocklisted_links_are_never_articles() {
        let html = r#"<article>
            <a href="/subscribe/offers/special-promotional-pricing-for-new-digital-subscribers-this-month-only/PROMO/">
              Subscribe now for unlimited access to premium journalism
            </a>
        </article>"#;
        assert!(scraper().parse_page(html).is_empty());
    }

    #[test]
    fn short_links_are_skipped() {
        let html = r#"<article><a href="/nz/short/">Two words here</a></article>"#;
        assert!(scraper().parse_page(html).is_empty());
    }

    #[test]
    fn title_falls_back_to_container_heading() {
        let html = format!(
            r#"<article>
              <h2>Container heading carries the story title</h2>
              <a href="{ARTICLE_HREF}"></a>
            </article>"#
        );
        let articles = scraper().parse_page(&html);
        assert_eq!(articles[0].title, "Container heading carries the story title");
    }

    #[test]
    fn title_falls_back_to_url_slug() {
        let html = format!(r#"<article><a href="{ARTICLE_HREF}"></a></article>"#);
        let articles = scraper().parse_page(&html);
        assert_eq!(
            articles[0].title,
            "Government Announces Sweeping Reforms To Public Health System After Independent Review"
        );
    }

    #[test]
    fn description_defaults_to_title() {
        let html = format!(
            r#"<article><a href="{ARTICLE_HREF}"><h3>Health reforms announced today</h3></a></article>"#
        );
        let articles = scraper().parse_page(&html);
        assert_eq!(articles[0].description, articles[0].title);
    }

    #[test]
    fn duplicate_urls_collapse_within_one_page() {
        let html = format!(
            r#"<article><a href="{ARTICLE_HREF}"><h3>Health reforms announced today</h3></a></article>
               <article><a href="{ARTICLE_HREF}"><h3>Health reforms announced today</h3></a></article>"#
        );
        assert_eq!(scraper().parse_page(&html).len(), 1);
    }

    #[test]
    fn longest_category_rule_wins() {
        assert_eq!(
            support::categorize_longest(
                "https://www.nzherald.co.nz/sport/rugby/all-blacks-name-squad/ABC/",
                &RULES,
                "General"
            ),
            "Rugby"
        );
        assert_eq!(
            support::categorize_longest(
                "https://www.nzherald.co.nz/sport/netball/anz-premiership/ABC/",
                &RULES,
                "General"
            ),
            "Sport"
        );
    }

    #[test]
    fn container_time_attribute_sets_published_date() {
        let html = format!(
            r#"<article>
              <time datetime="2024-01-05T08:00:00Z">5 Jan</time>
              <a href="{ARTICLE_HREF}"><h3>Health reforms announced today</h3></a>
            </article>"#
        );
        let articles = scraper().parse_page(&html);
        assert_eq!(
            articles[0].published_date.to_rfc3339(),
            "2024-01-05T08:00:00+00:00"
        );
    }

    #[test]
    fn heuristics_are_swappable() {
        let html = r#"<article><a href="/nz/a-much-shorter-article-path/ABCDE12345/"><h3>Shorter paths still count</h3></a></article>"#;
        let relaxed = scraper().with_heuristics(LinkHeuristics {
            min_href_len: 20,
            blocklist: BLOCKLIST,
        });
        assert_eq!(relaxed.parse_page(html).len(), 1);
        assert!(scraper().parse_page(html).is_empty());
    }

    #[test]
    fn slug_titles_skip_uppercase_id_segments() {
        assert_eq!(
            title_from_slug("https://www.nzherald.co.nz/nz/big-story-here/ABCDEF/"),
            Some("Big Story Here".to_string())
        );
        assert_eq!(
            title_from_slug("https://www.nzherald.co.nz/nz/big-story-here"),
            Some("Big Story Here".to_string())
        );
        assert_eq!(title_from_slug("https://www.nzherald.co.nz/nz/ABCDEF/"), None);
    }
}
