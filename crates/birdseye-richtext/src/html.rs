//! HTML storage format.
//!
//! `to_html` produces the string persisted in `items.description`;
//! `from_html` reads stored descriptions back for display. Unknown tags
//! degrade to their text content.

use scraper::{ElementRef, Html, Node};
use std::collections::BTreeSet;

use crate::document::{normalize_runs, Block, Document, ListItem, ListKind, Mark, TextRun};

impl Document {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            write_block(&mut out, block);
        }
        out
    }

    pub fn from_html(html: &str) -> Self {
        let fragment = Html::parse_fragment(html);
        let mut parser = BlockParser::default();
        parser.children(fragment.root_element());
        parser.finish()
    }
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Paragraph(content) => {
            out.push_str("<p>");
            write_runs(out, content);
            out.push_str("</p>");
        }
        Block::Heading { level, content } => {
            out.push_str(&format!("<h{}>", level));
            write_runs(out, content);
            out.push_str(&format!("</h{}>", level));
        }
        Block::List { kind, items } => {
            let (open, close) = match kind {
                ListKind::Bullet => ("<ul>", "</ul>"),
                ListKind::Ordered => ("<ol>", "</ol>"),
                ListKind::Task => ("<ul data-task-list>", "</ul>"),
            };
            out.push_str(open);
            for item in items {
                match item.checked {
                    Some(checked) => out.push_str(&format!("<li data-checked=\"{}\">", checked)),
                    None => out.push_str("<li>"),
                }
                write_runs(out, &item.content);
                out.push_str("</li>");
            }
            out.push_str(close);
        }
        Block::CodeBlock { language, code } => {
            match language {
                Some(lang) => out.push_str(&format!(
                    "<pre><code class=\"language-{}\">",
                    html_escape::encode_double_quoted_attribute(lang)
                )),
                None => out.push_str("<pre><code>"),
            }
            out.push_str(&html_escape::encode_text(code));
            out.push_str("</code></pre>");
        }
        Block::Image { src, alt } => {
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">",
                html_escape::encode_double_quoted_attribute(src),
                html_escape::encode_double_quoted_attribute(alt)
            ));
        }
    }
}

fn write_runs(out: &mut String, runs: &[TextRun]) {
    for run in runs {
        for mark in &run.marks {
            out.push_str(&open_tag(mark));
        }
        for (i, line) in run.text.split('\n').enumerate() {
            if i > 0 {
                out.push_str("<br>");
            }
            out.push_str(&html_escape::encode_text(line));
        }
        for mark in run.marks.iter().rev() {
            out.push_str(close_tag(mark));
        }
    }
}

fn open_tag(mark: &Mark) -> String {
    match mark {
        Mark::Link { href } => format!(
            "<a href=\"{}\">",
            html_escape::encode_double_quoted_attribute(href)
        ),
        Mark::Bold => "<strong>".to_string(),
        Mark::Italic => "<em>".to_string(),
        Mark::Strike => "<s>".to_string(),
        Mark::Code => "<code>".to_string(),
    }
}

fn close_tag(mark: &Mark) -> &'static str {
    match mark {
        Mark::Link { .. } => "</a>",
        Mark::Bold => "</strong>",
        Mark::Italic => "</em>",
        Mark::Strike => "</s>",
        Mark::Code => "</code>",
    }
}

#[derive(Default)]
struct BlockParser {
    blocks: Vec<Block>,
    /// Loose inline content between block elements.
    pending: InlineCollector,
}

impl BlockParser {
    fn children(&mut self, element: ElementRef) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    let text: &str = text;
                    if !text.trim().is_empty() {
                        self.pending.push(text, &BTreeSet::new());
                    }
                }
                Node::Element(_) => {
                    if let Some(el) = ElementRef::wrap(child) {
                        self.element(el);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, el: ElementRef) {
        let name = el.value().name();
        match name {
            "p" => {
                self.flush();
                let mut inline = InlineCollector::default();
                inline.children(el, &BTreeSet::new());
                self.push_inline(inline, Block::paragraph);
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush();
                let level = name[1..].parse().unwrap_or(3);
                let mut inline = InlineCollector::default();
                inline.children(el, &BTreeSet::new());
                self.push_inline(inline, |content| Block::heading(level, content));
            }
            "ul" | "ol" => {
                self.flush();
                let kind = if name == "ol" {
                    ListKind::Ordered
                } else if el.value().attr("data-task-list").is_some() {
                    ListKind::Task
                } else {
                    ListKind::Bullet
                };
                let mut items = Vec::new();
                let mut images = Vec::new();
                collect_list_items(el, kind, &mut items, &mut images);
                self.blocks.push(Block::List { kind, items });
                self.blocks.extend(images);
            }
            "pre" => {
                self.flush();
                let language = el
                    .children()
                    .filter_map(ElementRef::wrap)
                    .find(|child| child.value().name() == "code")
                    .and_then(|code| {
                        code.value()
                            .classes()
                            .find_map(|class| class.strip_prefix("language-"))
                            .map(str::to_string)
                    });
                let code: String = el.text().collect();
                let code = code.strip_suffix('\n').unwrap_or(&code).to_string();
                self.blocks.push(Block::CodeBlock { language, code });
            }
            "img" => {
                self.flush();
                self.blocks.push(image_block(el));
            }
            "br" | "hr" => self.flush(),
            "div" | "section" | "article" | "blockquote" | "body" | "html" | "figure" => {
                self.flush();
                self.children(el);
                self.flush();
            }
            _ => self.pending.element(el, &BTreeSet::new()),
        }
    }

    fn push_inline(&mut self, inline: InlineCollector, build: impl FnOnce(Vec<TextRun>) -> Block) {
        let InlineCollector { runs, images } = inline;
        self.blocks.push(build(trim_runs(runs)));
        self.blocks.extend(images);
    }

    fn flush(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        if pending.runs.iter().any(|run| !run.text.trim().is_empty()) {
            self.push_inline(pending, Block::paragraph);
        } else {
            self.blocks.extend(pending.images);
        }
    }

    fn finish(mut self) -> Document {
        self.flush();
        Document::new(self.blocks)
    }
}

fn collect_list_items(
    list: ElementRef,
    kind: ListKind,
    items: &mut Vec<ListItem>,
    images: &mut Vec<Block>,
) {
    for li in list.children().filter_map(ElementRef::wrap) {
        if li.value().name() != "li" {
            continue;
        }
        let mut inline = InlineCollector::default();
        let mut nested = Vec::new();
        let mut checked = li.value().attr("data-checked") == Some("true");

        for child in li.children() {
            match ElementRef::wrap(child) {
                Some(el) if matches!(el.value().name(), "ul" | "ol") => nested.push(el),
                Some(el) if el.value().name() == "input" => {
                    checked |= el.value().attr("checked").is_some();
                }
                Some(el) => inline.element(el, &BTreeSet::new()),
                None => inline.node_text(child.value(), &BTreeSet::new()),
            }
        }

        let mut item = ListItem::new(kind, trim_runs(inline.runs));
        if kind == ListKind::Task {
            item.checked = Some(checked);
        }
        items.push(item);
        images.extend(inline.images);

        // Nested lists are flattened into the outer list.
        for sublist in nested {
            collect_list_items(sublist, kind, items, images);
        }
    }
}

fn image_block(el: ElementRef) -> Block {
    Block::Image {
        src: el.value().attr("src").unwrap_or_default().to_string(),
        alt: el.value().attr("alt").unwrap_or_default().to_string(),
    }
}

#[derive(Default)]
struct InlineCollector {
    runs: Vec<TextRun>,
    images: Vec<Block>,
}

impl InlineCollector {
    fn push(&mut self, text: &str, marks: &BTreeSet<Mark>) {
        self.runs.push(TextRun {
            text: text.to_string(),
            marks: marks.clone(),
        });
    }

    fn node_text(&mut self, node: &Node, marks: &BTreeSet<Mark>) {
        if let Node::Text(text) = node {
            let text: &str = text;
            self.push(text, marks);
        }
    }

    fn children(&mut self, el: ElementRef, marks: &BTreeSet<Mark>) {
        for child in el.children() {
            match ElementRef::wrap(child) {
                Some(child_el) => self.element(child_el, marks),
                None => self.node_text(child.value(), marks),
            }
        }
    }

    fn element(&mut self, el: ElementRef, marks: &BTreeSet<Mark>) {
        let mark = match el.value().name() {
            "strong" | "b" => Some(Mark::Bold),
            "em" | "i" => Some(Mark::Italic),
            "s" | "strike" | "del" => Some(Mark::Strike),
            "code" => Some(Mark::Code),
            "a" => Some(Mark::Link {
                href: el.value().attr("href").unwrap_or_default().to_string(),
            }),
            "br" => {
                self.push("\n", marks);
                return;
            }
            "img" => {
                self.images.push(image_block(el));
                return;
            }
            "input" | "script" | "style" => return,
            _ => None,
        };

        match mark {
            Some(mark) => {
                let mut inner = marks.clone();
                inner.insert(mark);
                self.children(el, &inner);
            }
            None => self.children(el, marks),
        }
    }
}

/// Normalises runs and strips whitespace left over from HTML indentation at
/// both ends.
fn trim_runs(runs: Vec<TextRun>) -> Vec<TextRun> {
    let mut runs = normalize_runs(runs);
    if let Some(first) = runs.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(last) = runs.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    normalize_runs(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_with_marks() {
        let doc = Document::from_html("<p>Ship <strong>now</strong> or <em>later</em></p>");
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph(vec![
                TextRun::plain("Ship "),
                TextRun::marked("now", [Mark::Bold]),
                TextRun::plain(" or "),
                TextRun::marked("later", [Mark::Italic]),
            ])]
        );
    }

    #[test]
    fn test_nested_marks() {
        let doc = Document::from_html("<p><a href=\"https://x.dev\"><strong>x</strong></a></p>");
        let Block::Paragraph(runs) = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(runs[0].has(&Mark::Bold));
        assert_eq!(runs[0].link(), Some("https://x.dev"));
    }

    #[test]
    fn test_bare_text_becomes_paragraph() {
        let doc = Document::from_html("just text");
        assert_eq!(doc.blocks, vec![Block::paragraph(vec![TextRun::plain("just text")])]);
    }

    #[test]
    fn test_task_list_checked_state() {
        let doc = Document::from_html(
            "<ul data-task-list><li data-checked=\"true\">done</li><li data-checked=\"false\">open</li></ul>",
        );
        let Block::List { kind, items } = &doc.blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(*kind, ListKind::Task);
        assert_eq!(items[0].checked, Some(true));
        assert_eq!(items[1].checked, Some(false));
    }

    #[test]
    fn test_list_items_with_paragraphs_and_nesting() {
        let doc = Document::from_html(
            "<ul>\n  <li><p>outer</p>\n    <ul><li>inner</li></ul>\n  </li>\n</ul>",
        );
        let Block::List { items, .. } = &doc.blocks[0] else {
            panic!("expected list");
        };
        let texts: Vec<String> = items
            .iter()
            .map(|item| item.content.iter().map(|r| r.text.as_str()).collect())
            .collect();
        assert_eq!(texts, vec!["outer", "inner"]);
    }

    #[test]
    fn test_code_block_language_and_escaping() {
        let doc = Document::new(vec![Block::CodeBlock {
            language: Some("rust".into()),
            code: "if a < b { }".into(),
        }]);
        let html = doc.to_html();
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\">if a &lt; b { }</code></pre>"
        );
        assert_eq!(Document::from_html(&html), doc);
    }

    #[test]
    fn test_inline_image_lifted_after_paragraph() {
        let doc = Document::from_html("<p>see <img src=\"/api/images/a.png\" alt=\"shot\"></p>");
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(
            doc.blocks[1],
            Block::Image {
                src: "/api/images/a.png".into(),
                alt: "shot".into()
            }
        );
    }

    #[test]
    fn test_unknown_tags_degrade_to_text() {
        let doc = Document::from_html("<p><span class=\"x\">plain</span> <u>under</u></p>");
        assert_eq!(doc.plain_text(), "plain under");
    }

    #[test]
    fn test_line_breaks_round_trip() {
        let doc = Document::new(vec![Block::paragraph(vec![TextRun::plain("a\nb")])]);
        assert_eq!(doc.to_html(), "<p>a<br>b</p>");
        assert_eq!(Document::from_html(&doc.to_html()), doc);
    }

    #[test]
    fn test_empty_html() {
        assert!(Document::from_html("").blocks.is_empty());
        assert!(Document::from_html("  \n ").blocks.is_empty());
    }
}
