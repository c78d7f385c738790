//! Lenient HTML to DOM parse
//!
//! quick-xml does the tokenizing with its strict checks turned off; the
//! HTML-specific rules it does not know about (void elements, implicitly
//! closed paragraphs, list items and table cells) are applied while the
//! element stack is built.

use crate::{ImportWarning, WarningKind};
use doc_model::DomElement;
use std::borrow::Cow;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A parsed HTML node
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DomNode {
    Element(DomTree),
    Text(String),
}

/// An element with its parsed children
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DomTree {
    pub element: DomElement,
    pub children: Vec<DomNode>,
}

impl DomTree {
    fn new(element: DomElement) -> Self {
        Self {
            element,
            children: Vec::new(),
        }
    }
}

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Starting one of these closes an open `p`
const PARAGRAPH_CLOSERS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre",
    "section", "table", "ul",
];

/// Open elements beyond this depth are passed through: their content is
/// kept, the element itself is not
const MAX_DEPTH: usize = 256;

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements an implicit close never reaches past
const SCOPE_BOUNDARIES: &[&str] = &[
    "article", "aside", "blockquote", "body", "div", "li", "section", "table", "td", "th", "ol",
    "ul",
];

/// Parse `html` into a list of top-level nodes.
///
/// Never fails: when the tokenizer gives up, what was read so far is kept
/// and a `MalformedHtml` warning is recorded.
pub(crate) fn parse_dom(html: &str, warnings: &mut Vec<ImportWarning>) -> Vec<DomNode> {
    let html = escape_stray_angles(html);
    let mut reader = Reader::from_str(&html);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.check_comments = false;

    let mut builder = DomBuilder::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let element = element_from(&e);
                if VOID_TAGS.contains(&element.tag.as_str()) {
                    builder.leaf(element);
                } else {
                    builder.open(element);
                }
            }
            Ok(Event::Empty(e)) => builder.leaf(element_from(&e)),
            Ok(Event::End(e)) => builder.close(&lower(e.name().as_ref())),
            Ok(Event::Text(e)) => builder.text(decode(&String::from_utf8_lossy(&e))),
            Ok(Event::CData(e)) => builder.text(String::from_utf8_lossy(&e).into_owned()),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                let message = format!("parsing stopped at byte {}: {e}", reader.error_position());
                tracing::warn!("{message}");
                warnings.push(ImportWarning::new(WarningKind::MalformedHtml, message));
                break;
            }
        }
        buf.clear();
    }
    builder.finish()
}

/// Escape every `<` that cannot start a tag, comment or declaration, as an
/// HTML parser would read it as text (`p < 0.05`, `a<3`)
fn escape_stray_angles(html: &str) -> Cow<'_, str> {
    let starts_markup = |next: Option<char>| {
        next.is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
    };
    let mut chars = html.chars().peekable();
    let mut out: Option<String> = None;
    let mut offset = 0;
    while let Some(ch) = chars.next() {
        if ch == '<' && !starts_markup(chars.peek().copied()) {
            out.get_or_insert_with(|| html[..offset].to_string()).push_str("&lt;");
        } else if let Some(out) = out.as_mut() {
            out.push(ch);
        }
        offset += ch.len_utf8();
    }
    match out {
        Some(escaped) => Cow::Owned(escaped),
        None => Cow::Borrowed(html),
    }
}

fn lower(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_ascii_lowercase()
}

/// Resolve character and HTML5 named references; text with a stray `&`
/// is kept as written
fn decode(raw: &str) -> String {
    match unescape_with(raw, resolve_html5_entity) {
        Ok(text) => text.into_owned(),
        Err(_) => raw.to_string(),
    }
}

fn element_from(start: &BytesStart<'_>) -> DomElement {
    let mut element = DomElement::new(lower(start.name().as_ref()));
    for attr in start.html_attributes().flatten() {
        let name = lower(attr.key.as_ref());
        let value = decode(&String::from_utf8_lossy(&attr.value));
        element.attributes.push((name, value));
    }
    element
}

#[derive(Default)]
struct DomBuilder {
    root: DomTree,
    open: Vec<DomTree>,
    /// Start tags dropped for exceeding `MAX_DEPTH`, still awaiting their end tags
    passed_through: usize,
}

impl DomBuilder {
    fn current(&mut self) -> &mut DomTree {
        match self.open.last_mut() {
            Some(node) => node,
            None => &mut self.root,
        }
    }

    fn open(&mut self, element: DomElement) {
        if self.open.len() >= MAX_DEPTH {
            self.passed_through += 1;
            return;
        }
        self.close_implied(&element.tag);
        self.open.push(DomTree::new(element));
    }

    fn leaf(&mut self, element: DomElement) {
        self.close_implied(&element.tag);
        self.current().children.push(DomNode::Element(DomTree::new(element)));
    }

    fn text(&mut self, text: String) {
        if !text.is_empty() {
            self.current().children.push(DomNode::Text(text));
        }
    }

    /// Close the innermost open element named `tag` and everything opened
    /// after it; an end tag with no open match is ignored
    fn close(&mut self, tag: &str) {
        if self.passed_through > 0 {
            self.passed_through -= 1;
            return;
        }
        if let Some(index) = self.open.iter().rposition(|n| n.element.tag == tag) {
            self.pop_to(index);
        }
    }

    fn close_implied(&mut self, tag: &str) {
        if PARAGRAPH_CLOSERS.contains(&tag) {
            self.close_within_scope(&["p"], SCOPE_BOUNDARIES);
        }
        if HEADINGS.contains(&tag) {
            self.close_within_scope(HEADINGS, SCOPE_BOUNDARIES);
        }
        match tag {
            "li" => self.close_within_scope(&["li"], &["ol", "ul"]),
            "tr" => self.close_within_scope(&["tr"], &["table", "tbody", "thead", "tfoot"]),
            "td" | "th" => self.close_within_scope(&["td", "th"], &["tr", "table"]),
            "tbody" | "thead" | "tfoot" => {
                self.close_within_scope(&["tbody", "thead", "tfoot"], &["table"])
            }
            _ => {}
        }
    }

    /// Close the innermost open element among `targets`, unless one of
    /// `boundaries` is opened after it
    fn close_within_scope(&mut self, targets: &[&str], boundaries: &[&str]) {
        let found = self.open.iter().rposition(|n| {
            let tag = n.element.tag.as_str();
            targets.contains(&tag) || boundaries.contains(&tag)
        });
        if let Some(index) = found {
            if targets.contains(&self.open[index].element.tag.as_str()) {
                self.pop_to(index);
            }
        }
    }

    fn pop_to(&mut self, index: usize) {
        while self.open.len() > index {
            if let Some(node) = self.open.pop() {
                self.current().children.push(DomNode::Element(node));
            }
        }
    }

    fn finish(mut self) -> Vec<DomNode> {
        self.pop_to(0);
        self.root.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Vec<DomNode> {
        let mut warnings = Vec::new();
        let dom = parse_dom(html, &mut warnings);
        assert!(warnings.is_empty(), "{warnings:?}");
        dom
    }

    fn tags(nodes: &[DomNode]) -> Vec<String> {
        nodes
            .iter()
            .filter_map(|n| match n {
                DomNode::Element(e) => Some(e.element.tag.clone()),
                DomNode::Text(_) => None,
            })
            .collect()
    }

    fn element(node: &DomNode) -> &DomTree {
        match node {
            DomNode::Element(e) => e,
            DomNode::Text(t) => panic!("expected element, got text {t:?}"),
        }
    }

    #[test]
    fn test_nested_elements_and_attributes() {
        let dom = parse(r#"<P CLASS="bibliography-entry">A <B>b</B></P>"#);
        assert_eq!(tags(&dom), vec!["p"]);
        let p = element(&dom[0]);
        assert_eq!(p.element.attr("class"), Some("bibliography-entry"));
        assert_eq!(tags(&p.children), vec!["b"]);
    }

    #[test]
    fn test_void_and_unclosed_elements() {
        let dom = parse("<p>one<br>two<img src=a.png alt=x><p>three");
        assert_eq!(tags(&dom), vec!["p", "p"]);
        let first = element(&dom[0]);
        assert_eq!(tags(&first.children), vec!["br", "img"]);
        assert_eq!(element(&first.children[3]).element.attr("src"), Some("a.png"));
    }

    #[test]
    fn test_list_items_close_each_other() {
        let dom = parse("<ul><li>a<li>b</ul>");
        let list = element(&dom[0]);
        assert_eq!(tags(&list.children), vec!["li", "li"]);
    }

    #[test]
    fn test_stray_end_tags_are_ignored() {
        let dom = parse("<p>text</span></p></div>");
        assert_eq!(tags(&dom), vec!["p"]);
        assert_eq!(element(&dom[0]).children, vec![DomNode::Text("text".into())]);
    }

    #[test]
    fn test_entities_are_decoded() {
        let dom = parse("<p>caf&eacute; &amp; &#8220;quotes&#8221;&nbsp;</p>");
        assert_eq!(
            element(&dom[0]).children,
            vec![DomNode::Text("café & \u{201c}quotes\u{201d}\u{a0}".into())]
        );
    }

    fn text_of(nodes: &[DomNode]) -> String {
        nodes
            .iter()
            .map(|n| match n {
                DomNode::Text(t) => t.clone(),
                DomNode::Element(e) => text_of(&e.children),
            })
            .collect()
    }

    fn depth(nodes: &[DomNode]) -> usize {
        nodes
            .iter()
            .map(|n| match n {
                DomNode::Text(_) => 0,
                DomNode::Element(e) => 1 + depth(&e.children),
            })
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_less_than_in_text_is_not_a_tag() {
        let dom = parse("<p>We find p < 0.05 in all trials.</p><p>a<3 and b <= c</p>");
        assert_eq!(tags(&dom), vec!["p", "p"]);
        assert_eq!(text_of(&element(&dom[0]).children), "We find p < 0.05 in all trials.");
        assert_eq!(text_of(&element(&dom[1]).children), "a<3 and b <= c");
    }

    #[test]
    fn test_trailing_less_than_is_kept() {
        let dom = parse("<p>x <</p>");
        assert_eq!(text_of(&dom), "x <");
    }

    #[test]
    fn test_stray_angle_escape_leaves_markup_alone() {
        assert!(matches!(escape_stray_angles("<p>a</p><!-- c --><br/>"), Cow::Borrowed(_)));
        assert_eq!(escape_stray_angles("é < ü"), "é &lt; ü");
    }

    #[test]
    fn test_deep_nesting_is_capped_and_keeps_text() {
        let levels = 20_000;
        let html = format!(
            "<p>{}x{}</p><p>after</p>",
            "<span>".repeat(levels),
            "</span>".repeat(levels)
        );
        let dom = parse(&html);
        assert_eq!(tags(&dom), vec!["p", "p"]);
        assert!(depth(&dom) <= MAX_DEPTH);
        assert_eq!(text_of(&dom), "xafter");
    }

    #[test]
    fn test_bare_ampersand_survives() {
        let dom = parse("<p>Tom & Jerry</p>");
        assert_eq!(element(&dom[0]).children, vec![DomNode::Text("Tom & Jerry".into())]);
    }
}
