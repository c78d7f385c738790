//! Parsed HTML to document fragments
//!
//! Elements go through the registry's DOM matchers; anything no type claims
//! is passed through so its content survives. The result is then fitted to
//! the content model of whatever holds it.

use super::keeps_whitespace;
use super::reader::{DomNode, DomTree};
use doc_model::nodes::{create_list_item, create_table_cell, create_table_row, paragraph};
use doc_model::{
    ContentModel, DomConversion, Fragment, FragmentNode, NodeBody, NodeRegistry, NodeType,
    Placement, TextBody, TextFormat,
};

/// Dropped together with their content
const SKIP_TAGS: &[&str] = &[
    "head", "iframe", "link", "meta", "noscript", "object", "script", "style", "template", "title",
];

/// Unclaimed containers that still separate paragraphs
const BLOCK_CONTAINERS: &[&str] = &[
    "address", "article", "aside", "body", "center", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "header", "html", "main", "nav", "pre", "section",
];

enum Item {
    Node(FragmentNode),
    /// Boundary of an unclaimed block container
    Break,
}

pub(crate) struct Converter<'a> {
    registry: &'a NodeRegistry,
}

impl<'a> Converter<'a> {
    pub(crate) fn new(registry: &'a NodeRegistry) -> Self {
        Self { registry }
    }

    /// Convert top-level nodes. Content with no block structure at all
    /// comes back as inline nodes; anything else as blocks.
    pub(crate) fn convert_document(&self, dom: &[DomNode]) -> Fragment {
        let mut items = Vec::new();
        self.convert_children(dom, TextFormat::empty(), false, &mut items);

        let inline_only = items
            .iter()
            .all(|item| matches!(item, Item::Node(n) if self.placement(n) == Placement::Inline));
        if inline_only {
            let mut inlines: Vec<FragmentNode> = items
                .into_iter()
                .filter_map(|item| match item {
                    Item::Node(node) => Some(node),
                    Item::Break => None,
                })
                .collect();
            tidy_inlines(&mut inlines);
            Fragment::new(inlines)
        } else {
            Fragment::new(self.fit_blocks(items))
        }
    }

    fn placement(&self, node: &FragmentNode) -> Placement {
        self.registry
            .placement(&node.node_type)
            .unwrap_or(Placement::Inline)
    }

    /// `preserve` keeps text spacing as written instead of collapsing it
    fn convert_children(
        &self,
        children: &[DomNode],
        format: TextFormat,
        preserve: bool,
        out: &mut Vec<Item>,
    ) {
        for child in children {
            match child {
                DomNode::Text(text) => {
                    let text = if preserve {
                        text.clone()
                    } else {
                        collapse_whitespace(text)
                    };
                    if !text.is_empty() {
                        out.push(Item::Node(text_node(text, format)));
                    }
                }
                DomNode::Element(element) => self.convert_element(element, format, preserve, out),
            }
        }
    }

    fn convert_element(
        &self,
        dom: &DomTree,
        format: TextFormat,
        preserve: bool,
        out: &mut Vec<Item>,
    ) {
        let tag = dom.element.tag.as_str();
        let preserve = preserve || keeps_whitespace(&dom.element);
        if SKIP_TAGS.contains(&tag) {
            return;
        }
        if tag == "br" {
            out.push(Item::Node(text_node(" ".into(), format)));
            return;
        }

        match self.registry.convert_dom(&dom.element) {
            Some(DomConversion::Node(node)) => {
                let content = self
                    .registry
                    .content(node.node_type())
                    .unwrap_or(ContentModel::Empty);
                let mut fragment = FragmentNode::from_node(&node);
                if content != ContentModel::Empty {
                    let mut items = Vec::new();
                    self.convert_children(&dom.children, format, preserve, &mut items);
                    fragment.children = self.fit(items, content, preserve);
                    if content == ContentModel::Blocks && fragment.children.is_empty() {
                        fragment.push(FragmentNode::from_node(&paragraph()));
                    }
                }
                out.push(Item::Node(fragment));
            }
            Some(DomConversion::Format(flag)) => {
                self.convert_children(&dom.children, format | flag, preserve, out)
            }
            Some(DomConversion::Skip) => {}
            None => {
                let breaks = BLOCK_CONTAINERS.contains(&tag);
                if breaks {
                    out.push(Item::Break);
                }
                self.convert_children(&dom.children, format, preserve, out);
                if breaks {
                    out.push(Item::Break);
                }
            }
        }
    }

    fn fit(&self, items: Vec<Item>, content: ContentModel, preserve: bool) -> Vec<FragmentNode> {
        match content {
            ContentModel::Blocks => self.fit_blocks(items),
            ContentModel::Inlines => self.fit_inlines(items, preserve),
            ContentModel::ListItems => self.fit_list_items(items),
            ContentModel::TableRows => self.fit_rows(items),
            ContentModel::TableCells => self.fit_cells(items),
            ContentModel::Empty => Vec::new(),
        }
    }

    /// Inline runs become paragraphs; stray list items and table parts are
    /// unwrapped to blocks
    fn fit_blocks(&self, items: Vec<Item>) -> Vec<FragmentNode> {
        let mut blocks = Vec::new();
        let mut run = Vec::new();
        for item in items {
            let node = match item {
                Item::Break => {
                    flush_paragraph(&mut run, &mut blocks);
                    continue;
                }
                Item::Node(node) => node,
            };
            match self.placement(&node) {
                Placement::Inline => run.push(node),
                Placement::Block => {
                    flush_paragraph(&mut run, &mut blocks);
                    blocks.push(node);
                }
                Placement::ListItem => {
                    flush_paragraph(&mut run, &mut blocks);
                    blocks.push(FragmentNode::from_node(&paragraph()).with_children(node.children));
                }
                Placement::TableRow | Placement::TableCell | Placement::Root => {
                    flush_paragraph(&mut run, &mut blocks);
                    let inner = node.children.into_iter().map(Item::Node).collect();
                    blocks.extend(self.fit_blocks(inner));
                }
            }
        }
        flush_paragraph(&mut run, &mut blocks);
        blocks
    }

    /// Block content in inline context keeps its inline leaves, separated
    /// by spaces
    fn fit_inlines(&self, items: Vec<Item>, preserve: bool) -> Vec<FragmentNode> {
        let mut inlines = Vec::new();
        for item in items {
            match item {
                Item::Break => inlines.push(text_node(" ".into(), TextFormat::empty())),
                Item::Node(node) if self.placement(&node) == Placement::Inline => inlines.push(node),
                Item::Node(node) => self.flatten_inline(node, &mut inlines),
            }
        }
        if preserve {
            drop_empty_text(&mut inlines);
        } else {
            tidy_inlines(&mut inlines);
        }
        inlines
    }

    fn flatten_inline(&self, node: FragmentNode, out: &mut Vec<FragmentNode>) {
        out.push(text_node(" ".into(), TextFormat::empty()));
        for child in node.children {
            if self.placement(&child) == Placement::Inline {
                out.push(child);
            } else {
                self.flatten_inline(child, out);
            }
        }
        out.push(text_node(" ".into(), TextFormat::empty()));
    }

    fn fit_list_items(&self, items: Vec<Item>) -> Vec<FragmentNode> {
        let mut list_items = Vec::new();
        let mut run = Vec::new();
        for item in items {
            let node = match item {
                Item::Break => {
                    self.flush_list_item(&mut run, &mut list_items);
                    continue;
                }
                Item::Node(node) => node,
            };
            match self.placement(&node) {
                Placement::ListItem => {
                    self.flush_list_item(&mut run, &mut list_items);
                    list_items.push(node);
                }
                Placement::Inline => run.push(node),
                _ if node.node_type == NodeType::LIST => {
                    self.flush_list_item(&mut run, &mut list_items);
                    list_items.extend(node.children);
                }
                _ => {
                    self.flush_list_item(&mut run, &mut list_items);
                    let mut inlines = Vec::new();
                    self.flatten_inline(node, &mut inlines);
                    run = inlines;
                    self.flush_list_item(&mut run, &mut list_items);
                }
            }
        }
        self.flush_list_item(&mut run, &mut list_items);
        list_items
    }

    fn flush_list_item(&self, run: &mut Vec<FragmentNode>, list_items: &mut Vec<FragmentNode>) {
        let mut inlines = std::mem::take(run);
        tidy_inlines(&mut inlines);
        if !inlines.is_empty() {
            list_items.push(FragmentNode::from_node(&create_list_item()).with_children(inlines));
        }
    }

    fn fit_rows(&self, items: Vec<Item>) -> Vec<FragmentNode> {
        let mut rows = Vec::new();
        let mut pending = Vec::new();
        for item in items {
            match item {
                Item::Node(node) if self.placement(&node) == Placement::TableRow => {
                    self.flush_row(&mut pending, &mut rows);
                    rows.push(node);
                }
                other => pending.push(other),
            }
        }
        self.flush_row(&mut pending, &mut rows);
        rows
    }

    fn flush_row(&self, pending: &mut Vec<Item>, rows: &mut Vec<FragmentNode>) {
        let cells = self.fit_cells(std::mem::take(pending));
        if !cells.is_empty() {
            rows.push(FragmentNode::from_node(&create_table_row()).with_children(cells));
        }
    }

    fn fit_cells(&self, items: Vec<Item>) -> Vec<FragmentNode> {
        let mut cells = Vec::new();
        let mut pending = Vec::new();
        for item in items {
            match item {
                Item::Node(node) if self.placement(&node) == Placement::TableCell => {
                    self.flush_cell(&mut pending, &mut cells);
                    cells.push(node);
                }
                Item::Node(node) if self.placement(&node) == Placement::TableRow => {
                    self.flush_cell(&mut pending, &mut cells);
                    cells.extend(node.children);
                }
                other => pending.push(other),
            }
        }
        self.flush_cell(&mut pending, &mut cells);
        cells
    }

    fn flush_cell(&self, pending: &mut Vec<Item>, cells: &mut Vec<FragmentNode>) {
        let blocks = self.fit_blocks(std::mem::take(pending));
        if !blocks.is_empty() {
            cells.push(FragmentNode::from_node(&create_table_cell(false)).with_children(blocks));
        }
    }
}

fn text_node(text: String, format: TextFormat) -> FragmentNode {
    FragmentNode::new(
        NodeType::TEXT,
        NodeBody::Text(TextBody::new(text).with_format(format)),
    )
}

fn flush_paragraph(run: &mut Vec<FragmentNode>, blocks: &mut Vec<FragmentNode>) {
    let mut inlines = std::mem::take(run);
    tidy_inlines(&mut inlines);
    if !inlines.is_empty() {
        blocks.push(FragmentNode::from_node(&paragraph()).with_children(inlines));
    }
}

/// Runs of HTML whitespace become one space. Non-breaking spaces are kept.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{0C}') {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Drop spaces at the edges of a line of inline content and doubled spaces
/// across sibling text nodes, then drop text left empty
fn tidy_inlines(nodes: &mut Vec<FragmentNode>) {
    let mut after_space = true;
    for node in nodes.iter_mut() {
        let plain = node.node_type == NodeType::TEXT;
        match &mut node.body {
            NodeBody::Text(t) if plain => {
                if after_space {
                    t.text = t.text.trim_start_matches(' ').to_string();
                }
                if !t.text.is_empty() {
                    after_space = t.text.ends_with(' ');
                }
            }
            _ => after_space = false,
        }
    }

    for node in nodes.iter_mut().rev() {
        let plain = node.node_type == NodeType::TEXT;
        match &mut node.body {
            NodeBody::Text(t) if plain => {
                let kept = t.text.trim_end_matches(' ').len();
                t.text.truncate(kept);
                if !t.text.is_empty() {
                    break;
                }
            }
            _ => break,
        }
    }

    drop_empty_text(nodes);
}

fn drop_empty_text(nodes: &mut Vec<FragmentNode>) {
    nodes.retain(|n| !matches!(&n.body, NodeBody::Text(t) if t.text.is_empty()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::reader::parse_dom;

    fn convert(html: &str) -> Fragment {
        let registry = NodeRegistry::with_defaults();
        let mut warnings = Vec::new();
        let dom = parse_dom(html, &mut warnings);
        Converter::new(&registry).convert_document(&dom)
    }

    fn types(nodes: &[FragmentNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.node_type.as_str()).collect()
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t b"), "a b");
        assert_eq!(collapse_whitespace("\u{a0}\u{a0}"), "\u{a0}\u{a0}");
    }

    #[test]
    fn test_pre_wrap_block_keeps_spacing() {
        let fragment = convert(
            r#"<p style="white-space: pre-wrap">  a  <b>b </b></p><p>  c  d </p>"#,
        );
        assert_eq!(types(&fragment.nodes), vec!["paragraph", "paragraph"]);
        assert_eq!(fragment.nodes[0].text_content(), "  a  b ");
        assert_eq!(fragment.nodes[1].text_content(), "c d");
    }

    #[test]
    fn test_inline_only_content_stays_inline() {
        let fragment = convert("  <b>AI</b> text ");
        assert_eq!(types(&fragment.nodes), vec!["text", "text"]);
        assert_eq!(fragment.text_content(), "AI text");
        match &fragment.nodes[0].body {
            NodeBody::Text(t) => assert_eq!(t.format, TextFormat::BOLD),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_divs_separate_paragraphs() {
        let fragment = convert("<div>one</div>\n<div>two <em>2</em></div>");
        assert_eq!(types(&fragment.nodes), vec!["paragraph", "paragraph"]);
        assert_eq!(fragment.nodes[1].text_content(), "two 2");
    }

    #[test]
    fn test_block_inside_paragraph_context_is_flattened() {
        let fragment = convert("<h2>Title <p>body</p></h2>");
        let blocks = &fragment.nodes;
        assert_eq!(types(blocks), vec!["heading"]);
        assert_eq!(blocks[0].text_content(), "Title body");
    }

    #[test]
    fn test_lists_and_tables() {
        let fragment = convert(
            "<ul><li>a</li>loose<li><p>b</p></li></ul>\
             <table><tbody><tr><th>H</th></tr><tr><td>x</td><td></td></tr></tbody></table>",
        );
        assert_eq!(types(&fragment.nodes), vec!["list", "table"]);
        let items = &fragment.nodes[0].children;
        assert_eq!(types(items), vec!["listitem", "listitem", "listitem"]);
        assert_eq!(items[2].text_content(), "b");

        let rows = &fragment.nodes[1].children;
        assert_eq!(types(rows), vec!["tablerow", "tablerow"]);
        let cells = &rows[1].children;
        assert_eq!(types(cells), vec!["tablecell", "tablecell"]);
        assert_eq!(types(&cells[1].children), vec!["paragraph"]);
    }

    #[test]
    fn test_scripts_are_dropped_and_unknown_inline_tags_pass_through() {
        let fragment = convert("<p><span class=\"citation\">(A, 1)</span><script>x()</script></p>");
        assert_eq!(types(&fragment.nodes), vec!["paragraph"]);
        let children = &fragment.nodes[0].children;
        assert_eq!(types(children), vec!["text"]);
        assert_eq!(children[0].text_content(), "(A, 1)");
    }

    #[test]
    fn test_domain_nodes_are_restored() {
        let fragment = convert(
            r#"<p class="bibliography-entry">Doe (1999)</p><p><mark class="review-comment" data-comment-id="c1" data-comment="why">x</mark><img src="f.png" alt="F"></p>"#,
        );
        assert_eq!(types(&fragment.nodes), vec!["bibliography", "paragraph"]);
        assert_eq!(types(&fragment.nodes[1].children), vec!["mark", "image"]);
    }
}
