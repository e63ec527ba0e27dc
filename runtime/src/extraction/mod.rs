//! Field extractors, one per input source.
//!
//! Each extractor maps one raw input (a URL, a rendered page, an HTML
//! snapshot) to named fields and hands them to [`webcheck::verify`]. An
//! element that cannot be found becomes an absent field; only genuinely
//! exceptional conditions (load timeout, unparseable values, invalid
//! selectors) are returned as [`ExtractError`].

pub mod live_page;
pub mod search_url;
pub mod snapshot;

use regex::Regex;
use scraper::{ElementRef, Node, Selector};
use std::sync::OnceLock;
use webcheck::ExtractError;

/// Parse a CSS selector from configuration.
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| {
        ExtractError::system("Invalid selector", format!("{selector}: {e:?}"))
            .with_evidence("selector", selector)
    })
}

/// Collapse embedded line breaks (and the whitespace around them) to a
/// single space, then trim.
pub fn normalize_text(raw: &str) -> String {
    static LINE_BREAKS: OnceLock<Regex> = OnceLock::new();
    let re = LINE_BREAKS.get_or_init(|| {
        Regex::new(r"[ \t]*(?:\r\n|\r|\n)+\s*").expect("static regex is valid")
    });
    re.replace_all(raw, " ").trim().to_string()
}

/// Visible text of an element, with line breaks where a browser would put
/// them. Text under `script` and `style` is skipped.
pub fn inner_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node
                    .parent()
                    .and_then(|p| p.value().as_element())
                    .is_some_and(|e| matches!(e.name(), "script" | "style"));
                if !hidden {
                    out.push_str(text);
                }
            }
            Node::Element(el) if matches!(el.name(), "br" | "p" | "div" | "li" | "tr") => {
                out.push('\n');
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_normalize_collapses_line_breaks() {
        assert_eq!(
            normalize_text("  Agra,\nUttar Pradesh\r\n\n India "),
            "Agra, Uttar Pradesh India"
        );
        assert_eq!(normalize_text("Taj Mahal"), "Taj Mahal");
        assert_eq!(normalize_text("\n\n"), "");
    }

    #[test]
    fn test_inner_text_breaks_and_hidden_text() {
        let html = Html::parse_fragment(
            "<table><tr><td><style>.x{color:red}</style>Agra, <a>Uttar Pradesh</a>,<br>India</td></tr></table>",
        );
        let td = html.select(&Selector::parse("td").unwrap()).next().unwrap();
        let text = inner_text(td);
        assert_eq!(text, "Agra, Uttar Pradesh,\nIndia");
        assert_eq!(normalize_text(&text), "Agra, Uttar Pradesh, India");
    }

    #[test]
    fn test_invalid_selector_is_system_error() {
        let err = parse_selector("table[").unwrap_err();
        assert!(matches!(err, ExtractError::System { .. }));
        assert_eq!(err.reason(), "Invalid selector");
    }
}
