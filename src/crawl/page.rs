//! HTML page extraction
//!
//! Parses a fetched document and pulls out the three things the crawler
//! cares about: visible body text, outgoing links and media sources.
//! All URLs are resolved against the page URL (or its `<base href>`).

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref BODY: Selector = Selector::parse("body").unwrap();
    static ref BASE_HREF: Selector = Selector::parse("base[href]").unwrap();
    static ref LINKS: Selector = Selector::parse("a[href]").unwrap();
    static ref IMAGES: Selector = Selector::parse("img[src]").unwrap();
    static ref VIDEOS: Selector = Selector::parse("video").unwrap();
    static ref VIDEO_SOURCES: Selector = Selector::parse("source[src]").unwrap();
}

/// Elements whose contents are never visible text
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that separate words when rendered
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Kind of media referenced by a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Short label, also used as the file suffix (`.img`, `.video`)
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Image => "img",
            MediaKind::Video => "video",
        }
    }

    pub fn extension(&self) -> String {
        format!(".{}", self.label())
    }
}

/// A media source found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub url: Url,
}

/// A parsed HTML page
pub struct Page {
    base: Url,
    document: Html,
}

impl Page {
    /// Parse `html` fetched from `url`
    pub fn parse(url: &Url, html: &str) -> Self {
        let document = Html::parse_document(html);

        let base = document
            .select(&BASE_HREF)
            .next()
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| url.join(href.trim()).ok())
            .unwrap_or_else(|| url.clone());

        Self {
            base,
            document,
        }
    }

    /// Visible text of `<body>`, whitespace-normalized
    pub fn text(&self) -> String {
        let mut raw = String::new();
        match self.document.select(&BODY).next() {
            Some(body) => collect_text(body, &mut raw),
            None => collect_text(self.document.root_element(), &mut raw),
        }
        WHITESPACE.replace_all(&raw, " ").trim().to_string()
    }

    /// Absolute http(s) targets of every `<a href>`, in document order
    pub fn links(&self) -> Vec<Url> {
        self.document
            .select(&LINKS)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| self.resolve(href))
            .collect()
    }

    /// Image sources followed by video sources
    pub fn media(&self) -> Vec<MediaRef> {
        let mut media: Vec<MediaRef> = self
            .document
            .select(&IMAGES)
            .filter_map(|el| el.value().attr("src"))
            .filter_map(|src| self.resolve(src))
            .map(|url| MediaRef {
                kind: MediaKind::Image,
                url,
            })
            .collect();

        for video in self.document.select(&VIDEOS) {
            let own = video.value().attr("src");
            let sources = video
                .select(&VIDEO_SOURCES)
                .filter_map(|el| el.value().attr("src"));

            for src in own.into_iter().chain(sources) {
                if let Some(url) = self.resolve(src) {
                    media.push(MediaRef {
                        kind: MediaKind::Video,
                        url,
                    });
                }
            }
        }

        media
    }

    /// Resolve a reference against the document base, keeping only http(s)
    fn resolve(&self, reference: &str) -> Option<Url> {
        let reference = reference.trim();
        let mut resolved = self.base.join(reference).ok()?;
        if !matches!(resolved.scheme(), "http" | "https") {
            return None;
        }
        resolved.set_fragment(None);
        Some(resolved)
    }
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if HIDDEN_ELEMENTS.contains(&name) {
                continue;
            }
            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push(' ');
            }
            collect_text(child_el, out);
            if block {
                out.push(' ');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> Page {
        let url = Url::parse("https://example.com/docs/index.html").unwrap();
        Page::parse(&url, html)
    }

    #[test]
    fn test_text_collapses_whitespace() {
        let p = page("<html><body><h1>Title</h1>\n\n<p>Hello   <b>big</b>\tworld</p></body></html>");
        assert_eq!(p.text(), "Title Hello big world");
    }

    #[test]
    fn test_text_skips_scripts_and_styles() {
        let p = page(
            "<html><head><title>T</title><style>p{}</style></head>\
             <body><script>var x = 1;</script><p>visible</p><noscript>no</noscript></body></html>",
        );
        assert_eq!(p.text(), "visible");
    }

    #[test]
    fn test_block_elements_separate_words() {
        let p = page("<body><div>one</div><div>two</div><span>th</span><span>ree</span></body>");
        assert_eq!(p.text(), "one two three");
    }

    #[test]
    fn test_empty_body_has_no_text() {
        assert_eq!(page("<html><body></body></html>").text(), "");
    }

    #[test]
    fn test_links_are_absolute() {
        let p = page(
            r##"<body>
                <a href="/about">About</a>
                <a href="guide.html#install">Guide</a>
                <a href="https://other.org/x">Other</a>
                <a href="mailto:me@example.com">Mail</a>
                <a href="javascript:void(0)">JS</a>
                <a>no href</a>
            </body>"##,
        );
        let links: Vec<String> = p.links().iter().map(|u| u.to_string()).collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/about",
                "https://example.com/docs/guide.html",
                "https://other.org/x",
            ]
        );
    }

    #[test]
    fn test_base_href_overrides_page_url() {
        let p = page(r#"<head><base href="https://cdn.example.net/root/"></head><body><a href="a">A</a></body>"#);
        assert_eq!(p.links()[0].as_str(), "https://cdn.example.net/root/a");
    }

    #[test]
    fn test_media_images_before_videos() {
        let p = page(
            r#"<body>
                <video src="/v/intro.mp4"></video>
                <img src="/img/logo.png">
                <video><source src="clip.webm"><source src="clip.mp4"></video>
                <img alt="no src">
            </body>"#,
        );
        let media = p.media();
        assert_eq!(media.len(), 4);
        assert_eq!(media[0].kind, MediaKind::Image);
        assert_eq!(media[0].url.as_str(), "https://example.com/img/logo.png");
        assert_eq!(media[1].url.as_str(), "https://example.com/v/intro.mp4");
        assert_eq!(media[2].url.as_str(), "https://example.com/docs/clip.webm");
        assert_eq!(media[3].kind, MediaKind::Video);
    }

    #[test]
    fn test_media_kind_extension() {
        assert_eq!(MediaKind::Image.extension(), ".img");
        assert_eq!(MediaKind::Video.extension(), ".video");
    }
}
