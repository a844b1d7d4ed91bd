use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use nzn_core::Result;

const USER_AGENT: &str = "nzn-scraper/0.1";
const DEFAULT_MAX_CHARS: usize = 20_000;

/// Tags whose text is never article content.
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "iframe"];

/// Best-effort full-text fetch for a single URL. Any failure (network,
/// status, parse) yields `None`; the caller simply skips the content field.
pub struct ContentExtractor {
    client: reqwest::Client,
    max_chars: usize,
}

impl ContentExtractor {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, max_chars: DEFAULT_MAX_CHARS })
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub async fn extract(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url, error = %e, "content fetch failed");
                return None;
            }
        };
        let body = match response.error_for_status() {
            Ok(response) => match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(url, error = %e, "content body read failed");
                    return None;
                }
            },
            Err(e) => {
                debug!(url, error = %e, "content fetch returned error status");
                return None;
            }
        };
        extract_from_html(&body, self.max_chars)
    }
}

/// Strategy chain: the first semantic `article`/`main` container, else the
/// largest text-bearing `div`/`section`/`article`/`p`, else page title plus
/// meta description. Script-like tags never contribute text.
fn extract_from_html(body: &str, max_chars: usize) -> Option<String> {
    let document = Html::parse_document(body);

    let main_selector = Selector::parse("article, main").unwrap();
    if let Some(main) = document.select(&main_selector).next() {
        let text = element_text(main);
        return (!text.is_empty()).then(|| cap_chars(text, max_chars));
    }

    let candidate_selector = Selector::parse("div, section, article, p").unwrap();
    let best = document
        .select(&candidate_selector)
        .map(element_text)
        .max_by_key(String::len)
        .unwrap_or_default();
    if !best.is_empty() {
        return Some(cap_chars(best, max_chars));
    }

    let title = document
        .select(&Selector::parse("title").unwrap())
        .next()
        .map(element_text)
        .unwrap_or_default();
    let meta_selector =
        Selector::parse(r#"meta[name="description"], meta[property="og:description"]"#).unwrap();
    let meta = document
        .select(&meta_selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .unwrap_or("");

    let combined = collapse_ws(&format!("{title} {meta}"));
    (!combined.is_empty()).then(|| cap_chars(combined, max_chars))
}

/// Visible text of an element, skipping script/style/noscript/iframe
/// subtrees, with whitespace collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    visible_text(element, &mut out);
    collapse_ws(&out)
}

fn visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !SKIP_TAGS.contains(&child_element.value().name()) {
                visible_text(child_element, out);
            }
        }
    }
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cap_chars(s: String, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => s[..cut].to_string(),
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_the_semantic_article_container() {
        let html = r#"<html><body>
            <div>Enormous navigation block with lots and lots and lots of link text</div>
            <article>Actual story body.</article>
        </body></html>"#;
        assert_eq!(
            extract_from_html(html, DEFAULT_MAX_CHARS).unwrap(),
            "Actual story body."
        );
    }

    #[test]
    fn script_and_style_text_is_invisible() {
        let html = r#"<article>
            <script>var tracking = "noise";</script>
            <style>.x { color: red }</style>
            Visible sentence.
            <noscript>enable javascript</noscript>
        </article>"#;
        assert_eq!(
            extract_from_html(html, DEFAULT_MAX_CHARS).unwrap(),
            "Visible sentence."
        );
    }

    #[test]
    fn falls_back_to_largest_text_block() {
        let html = r#"<html><body>
            <div>small</div>
            <div>This much longer block of paragraph text should win the size comparison.</div>
        </body></html>"#;
        let text = extract_from_html(html, DEFAULT_MAX_CHARS).unwrap();
        assert!(text.contains("longer block of paragraph text"));
    }

    #[test]
    fn falls_back_to_title_and_meta_description() {
        let html = r#"<html><head>
            <title>Page title</title>
            <meta name="description" content="Meta description here.">
        </head><body></body></html>"#;
        assert_eq!(
            extract_from_html(html, DEFAULT_MAX_CHARS).unwrap(),
            "Page title Meta description here."
        );
    }

    #[test]
    fn collapses_whitespace_runs() {
        let html = "<article>Spaced   out\n\n   text</article>";
        assert_eq!(
            extract_from_html(html, DEFAULT_MAX_CHARS).unwrap(),
            "Spaced out text"
        );
    }

    #[test]
    fn output_is_capped_at_max_chars() {
        let html = format!("<article>{}</article>", "word ".repeat(100));
        let text = extract_from_html(&html, 12).unwrap();
        assert_eq!(text, "word word wo");
    }

    #[test]
    fn empty_page_yields_nothing() {
        assert!(extract_from_html("<html><head></head><body></body></html>", 100).is_none());
    }

    #[test]
    fn max_chars_is_configurable() {
        let extractor = ContentExtractor::new(Duration::from_secs(1))
            .unwrap()
            .with_max_chars(12);
        assert_eq!(extractor.max_chars, 12);
    }
}
