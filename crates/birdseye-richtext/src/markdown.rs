//! Markdown editing surface.
//!
//! In the terminal, descriptions are edited as markdown in the user's
//! editor and converted back to the document model before being stored as
//! HTML.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use std::collections::BTreeSet;

use crate::document::{Block, Document, ListItem, ListKind, Mark, TextRun};

impl Document {
    pub fn from_markdown(text: &str) -> Self {
        let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        let mut builder = MarkdownBuilder::default();
        for event in Parser::new_ext(text, options) {
            builder.process_event(event);
        }
        builder.finish()
    }

    /// Edited markdown as the HTML to store. Blank input clears the
    /// description.
    pub fn markdown_to_stored_html(markdown: &str) -> String {
        let doc = Self::from_markdown(markdown);
        if doc.is_empty() {
            String::new()
        } else {
            doc.to_html()
        }
    }

    pub fn to_markdown(&self) -> String {
        self.blocks
            .iter()
            .map(block_markdown)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

struct OpenList {
    kind: ListKind,
    items: Vec<ListItem>,
}

#[derive(Default)]
struct MarkdownBuilder {
    blocks: Vec<Block>,
    runs: Vec<TextRun>,
    /// Marks of the spans currently open, innermost last. The same mark may
    /// be open more than once when spans nest.
    open_marks: Vec<Mark>,
    heading: Option<u8>,
    list: Option<OpenList>,
    list_depth: usize,
    item_checked: Option<bool>,
    in_item: bool,
    code: Option<(Option<String>, String)>,
    image: Option<(String, String)>,
    pending_images: Vec<Block>,
}

impl MarkdownBuilder {
    fn marks(&self) -> BTreeSet<Mark> {
        self.open_marks.iter().cloned().collect()
    }

    /// Closes the innermost open span matching `is_mark`.
    fn close_mark(&mut self, is_mark: impl Fn(&Mark) -> bool) {
        if let Some(index) = self.open_marks.iter().rposition(is_mark) {
            self.open_marks.remove(index);
        }
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.handle_tag_start(tag),
            Event::End(tag_end) => self.handle_tag_end(tag_end),
            Event::Text(text) => self.handle_text(&text),
            Event::Code(code) => {
                let mut marks = self.marks();
                marks.insert(Mark::Code);
                self.runs.push(TextRun {
                    text: code.to_string(),
                    marks,
                });
            }
            Event::SoftBreak => self.handle_text(" "),
            Event::HardBreak => self.handle_text("\n"),
            Event::TaskListMarker(checked) => {
                self.item_checked = Some(checked);
                if let Some(list) = self.list.as_mut() {
                    list.kind = ListKind::Task;
                }
            }
            _ => {}
        }
    }

    fn handle_tag_start(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.heading = Some(level as u8);
            }
            Tag::List(start) => {
                self.list_depth += 1;
                if self.list.is_none() {
                    let kind = if start.is_some() {
                        ListKind::Ordered
                    } else {
                        ListKind::Bullet
                    };
                    self.list = Some(OpenList {
                        kind,
                        items: Vec::new(),
                    });
                } else {
                    // A nested list closes the text of the item above it.
                    self.finish_item();
                }
            }
            Tag::Item => {
                self.in_item = true;
                self.item_checked = None;
            }
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::Emphasis => {
                self.open_marks.push(Mark::Italic);
            }
            Tag::Strong => {
                self.open_marks.push(Mark::Bold);
            }
            Tag::Strikethrough => {
                self.open_marks.push(Mark::Strike);
            }
            Tag::Link { dest_url, .. } => {
                self.open_marks.push(Mark::Link {
                    href: dest_url.to_string(),
                });
            }
            Tag::Image { dest_url, .. } => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            _ => {}
        }
    }

    fn handle_tag_end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.in_item {
                    return;
                }
                let runs = std::mem::take(&mut self.runs);
                if !runs.is_empty() || self.pending_images.is_empty() {
                    self.blocks.push(Block::paragraph(runs));
                }
                self.flush_images();
            }
            TagEnd::Heading(_) => {
                let runs = std::mem::take(&mut self.runs);
                let level = self.heading.take().unwrap_or(1);
                self.blocks.push(Block::heading(level, runs));
                self.flush_images();
            }
            TagEnd::Item => {
                self.finish_item();
                self.in_item = false;
            }
            TagEnd::List(_) => {
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    if let Some(list) = self.list.take() {
                        let kind = list.kind;
                        let items = list
                            .items
                            .into_iter()
                            .map(|mut item| {
                                item.checked = match kind {
                                    ListKind::Task => Some(item.checked.unwrap_or(false)),
                                    _ => None,
                                };
                                item
                            })
                            .collect();
                        self.blocks.push(Block::List { kind, items });
                    }
                    self.flush_images();
                } else {
                    self.in_item = true;
                }
            }
            TagEnd::CodeBlock => {
                if let Some((language, code)) = self.code.take() {
                    let code = code.strip_suffix('\n').unwrap_or(&code).to_string();
                    self.blocks.push(Block::CodeBlock { language, code });
                }
            }
            TagEnd::Emphasis => {
                self.close_mark(|mark| *mark == Mark::Italic);
            }
            TagEnd::Strong => {
                self.close_mark(|mark| *mark == Mark::Bold);
            }
            TagEnd::Strikethrough => {
                self.close_mark(|mark| *mark == Mark::Strike);
            }
            TagEnd::Link => {
                self.close_mark(Mark::is_link);
            }
            TagEnd::Image => {
                if let Some((src, alt)) = self.image.take() {
                    self.pending_images.push(Block::Image { src, alt });
                }
            }
            _ => {}
        }
    }

    fn handle_text(&mut self, text: &str) {
        if let Some((_, code)) = self.code.as_mut() {
            code.push_str(text);
        } else if let Some((_, alt)) = self.image.as_mut() {
            alt.push_str(text);
        } else {
            self.runs.push(TextRun {
                text: text.to_string(),
                marks: self.marks(),
            });
        }
    }

    fn finish_item(&mut self) {
        let runs = std::mem::take(&mut self.runs);
        if runs.is_empty() && self.item_checked.is_none() {
            return;
        }
        if let Some(list) = self.list.as_mut() {
            let mut item = ListItem::new(list.kind, runs);
            item.checked = self.item_checked.take();
            list.items.push(item);
        }
    }

    fn flush_images(&mut self) {
        self.blocks.append(&mut self.pending_images);
    }

    fn finish(mut self) -> Document {
        if !self.runs.is_empty() {
            let runs = std::mem::take(&mut self.runs);
            self.blocks.push(Block::paragraph(runs));
        }
        self.flush_images();
        Document::new(self.blocks)
    }
}

fn block_markdown(block: &Block) -> String {
    match block {
        Block::Paragraph(content) => runs_markdown(content),
        Block::Heading { level, content } => {
            format!("{} {}", "#".repeat(*level as usize), runs_markdown(content))
        }
        Block::List { kind, items } => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let bullet = match kind {
                    ListKind::Bullet => "- ".to_string(),
                    ListKind::Ordered => format!("{}. ", i + 1),
                    ListKind::Task if item.checked == Some(true) => "- [x] ".to_string(),
                    ListKind::Task => "- [ ] ".to_string(),
                };
                format!("{}{}", bullet, runs_markdown(&item.content))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Block::CodeBlock { language, code } => format!(
            "```{}\n{}\n```",
            language.as_deref().unwrap_or_default(),
            code
        ),
        Block::Image { src, alt } => format!("![{}]({})", alt, src),
    }
}

fn runs_markdown(runs: &[TextRun]) -> String {
    runs.iter()
        .map(|run| {
            if run.has(&Mark::Code) {
                let text = format!("`{}`", run.text);
                return match run.link() {
                    Some(href) => format!("[{}]({})", text, href),
                    None => text,
                };
            }
            let mut text = run.text.replace('\n', "  \n");
            if run.has(&Mark::Strike) {
                text = format!("~~{}~~", text);
            }
            if run.has(&Mark::Italic) {
                text = format!("*{}*", text);
            }
            if run.has(&Mark::Bold) {
                text = format!("**{}**", text);
            }
            if let Some(href) = run.link() {
                text = format!("[{}]({})", text, href);
            }
            text
        })
        .collect()
}
