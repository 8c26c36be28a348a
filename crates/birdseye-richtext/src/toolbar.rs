use birdseye_core::{BoardError, BoardResult};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::document::{explode, regroup, Block, Document, ListItem, ListKind, Mark, TextRun};
use crate::editor::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ToolbarCommand {
    Bold,
    Italic,
    Strike,
    Heading(u8),
    BulletList,
    OrderedList,
    TaskList,
    CodeBlock,
    InsertImage,
    EditLink,
}

impl ToolbarCommand {
    /// Toolbar order, left to right.
    pub const ALL: [ToolbarCommand; 12] = [
        ToolbarCommand::Bold,
        ToolbarCommand::Italic,
        ToolbarCommand::Strike,
        ToolbarCommand::Heading(1),
        ToolbarCommand::Heading(2),
        ToolbarCommand::Heading(3),
        ToolbarCommand::BulletList,
        ToolbarCommand::OrderedList,
        ToolbarCommand::TaskList,
        ToolbarCommand::CodeBlock,
        ToolbarCommand::InsertImage,
        ToolbarCommand::EditLink,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ToolbarCommand::Bold => "B",
            ToolbarCommand::Italic => "I",
            ToolbarCommand::Strike => "S",
            ToolbarCommand::Heading(1) => "H1",
            ToolbarCommand::Heading(2) => "H2",
            ToolbarCommand::Heading(_) => "H3",
            ToolbarCommand::BulletList => "•",
            ToolbarCommand::OrderedList => "1.",
            ToolbarCommand::TaskList => "☐",
            ToolbarCommand::CodeBlock => "</>",
            ToolbarCommand::InsertImage => "Img",
            ToolbarCommand::EditLink => "Link",
        }
    }

    fn mark(&self) -> Option<Mark> {
        match self {
            ToolbarCommand::Bold => Some(Mark::Bold),
            ToolbarCommand::Italic => Some(Mark::Italic),
            ToolbarCommand::Strike => Some(Mark::Strike),
            _ => None,
        }
    }

    fn list_kind(&self) -> Option<ListKind> {
        match self {
            ToolbarCommand::BulletList => Some(ListKind::Bullet),
            ToolbarCommand::OrderedList => Some(ListKind::Ordered),
            ToolbarCommand::TaskList => Some(ListKind::Task),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolbarItem {
    pub command: ToolbarCommand,
    pub active: bool,
    pub enabled: bool,
}

/// Formatting commands evaluated against a selection.
pub struct Toolbar;

impl Toolbar {
    pub fn state(doc: &Document, selection: &Selection) -> Vec<ToolbarItem> {
        ToolbarCommand::ALL
            .iter()
            .map(|&command| ToolbarItem {
                command,
                active: Self::is_active(doc, selection, command),
                enabled: Self::is_enabled(doc, selection, command),
            })
            .collect()
    }

    pub fn is_active(doc: &Document, selection: &Selection, command: ToolbarCommand) -> bool {
        let Some(block) = doc.blocks.get(selection.block) else {
            return false;
        };
        match command {
            ToolbarCommand::Bold | ToolbarCommand::Italic | ToolbarCommand::Strike => {
                let Some(mark) = command.mark() else {
                    return false;
                };
                match inline_runs(doc, selection) {
                    Some(runs) => mark_range(runs, selection, |marks| marks.contains(&mark))
                        .is_some_and(|(start, end)| {
                            all_carry(runs, start, end, |marks| marks.contains(&mark))
                        }),
                    None => false,
                }
            }
            ToolbarCommand::Heading(level) => {
                matches!(block, Block::Heading { level: current, .. } if *current == level)
            }
            ToolbarCommand::BulletList | ToolbarCommand::OrderedList | ToolbarCommand::TaskList => {
                matches!(block, Block::List { kind, .. } if Some(*kind) == command.list_kind())
            }
            ToolbarCommand::CodeBlock => matches!(block, Block::CodeBlock { .. }),
            ToolbarCommand::InsertImage => false,
            ToolbarCommand::EditLink => inline_runs(doc, selection).is_some_and(|runs| {
                mark_range(runs, selection, has_link)
                    .is_some_and(|(start, end)| all_carry(runs, start, end, has_link))
            }),
        }
    }

    pub fn is_enabled(doc: &Document, selection: &Selection, command: ToolbarCommand) -> bool {
        let Some(block) = doc.blocks.get(selection.block) else {
            return false;
        };
        let text_block = matches!(
            block,
            Block::Paragraph(_) | Block::Heading { .. } | Block::CodeBlock { .. }
        );
        match command {
            ToolbarCommand::Bold | ToolbarCommand::Italic | ToolbarCommand::Strike => {
                let Some(mark) = command.mark() else {
                    return false;
                };
                inline_runs(doc, selection)
                    .and_then(|runs| mark_range(runs, selection, |marks| marks.contains(&mark)))
                    .is_some()
            }
            ToolbarCommand::EditLink => inline_runs(doc, selection)
                .and_then(|runs| mark_range(runs, selection, has_link))
                .is_some(),
            ToolbarCommand::Heading(_) | ToolbarCommand::CodeBlock => text_block,
            ToolbarCommand::BulletList | ToolbarCommand::OrderedList | ToolbarCommand::TaskList => {
                matches!(
                    block,
                    Block::Paragraph(_) | Block::Heading { .. } | Block::List { .. }
                )
            }
            ToolbarCommand::InsertImage => {
                !matches!(block, Block::CodeBlock { .. } | Block::List { .. })
            }
        }
    }

    /// Toggles `command` at the selection and returns the selection adjusted
    /// to the rewritten block layout.
    ///
    /// `InsertImage` needs a source and `EditLink` a target, so through this
    /// entry point the former is rejected and the latter only removes an
    /// existing link. Use [`Toolbar::insert_image`] and [`Toolbar::set_link`].
    pub fn apply(
        doc: &mut Document,
        selection: &Selection,
        command: ToolbarCommand,
    ) -> BoardResult<Selection> {
        if !Self::is_enabled(doc, selection, command) {
            return Err(BoardError::Validation(format!(
                "{:?} is not available at the current selection",
                command
            )));
        }
        let active = Self::is_active(doc, selection, command);
        match command {
            ToolbarCommand::Bold | ToolbarCommand::Italic | ToolbarCommand::Strike => {
                let mark = command
                    .mark()
                    .ok_or_else(|| BoardError::Internal("mark command without a mark".into()))?;
                let has = |marks: &BTreeSet<Mark>| marks.contains(&mark);
                edit_marks(doc, selection, has, |marks| {
                    if active {
                        marks.remove(&mark);
                    } else {
                        marks.insert(mark.clone());
                    }
                })?;
                Ok(*selection)
            }
            ToolbarCommand::EditLink => {
                if !active {
                    return Err(BoardError::Validation("a link target is required".into()));
                }
                Self::set_link(doc, selection, None)
            }
            ToolbarCommand::InsertImage => Err(BoardError::Validation(
                "an image source is required".into(),
            )),
            ToolbarCommand::Heading(level) => {
                let block = &mut doc.blocks[selection.block];
                let content = block_runs(block);
                *block = if active {
                    Block::paragraph(content)
                } else {
                    Block::heading(level, content)
                };
                Ok(selection.in_item(0))
            }
            ToolbarCommand::CodeBlock => {
                let block = &mut doc.blocks[selection.block];
                *block = if active {
                    Block::paragraph(block_runs(block))
                } else {
                    Block::CodeBlock {
                        language: None,
                        code: block.plain_text(),
                    }
                };
                Ok(selection.in_item(0))
            }
            ToolbarCommand::BulletList | ToolbarCommand::OrderedList | ToolbarCommand::TaskList => {
                let kind = command
                    .list_kind()
                    .ok_or_else(|| BoardError::Internal("list command without a kind".into()))?;
                Ok(toggle_list(doc, selection, kind, active))
            }
        }
    }

    /// Inserts an image block after the selected block.
    pub fn insert_image(
        doc: &mut Document,
        selection: &Selection,
        src: &str,
        alt: &str,
    ) -> BoardResult<Selection> {
        if !Self::is_enabled(doc, selection, ToolbarCommand::InsertImage) {
            return Err(BoardError::Validation(
                "images cannot be inserted here".into(),
            ));
        }
        if src.trim().is_empty() {
            return Err(BoardError::Validation("image source cannot be empty".into()));
        }
        doc.blocks.insert(
            selection.block + 1,
            Block::Image {
                src: src.trim().to_string(),
                alt: alt.to_string(),
            },
        );
        Ok(*selection)
    }

    /// Sets or clears the link over the selection, or over the whole link
    /// around a collapsed cursor.
    pub fn set_link(
        doc: &mut Document,
        selection: &Selection,
        href: Option<&str>,
    ) -> BoardResult<Selection> {
        if !Self::is_enabled(doc, selection, ToolbarCommand::EditLink) {
            return Err(BoardError::Validation(
                "select text or place the cursor in a link".into(),
            ));
        }
        let href = href.map(str::trim).filter(|href| !href.is_empty());
        edit_marks(doc, selection, has_link, |marks| {
            marks.retain(|mark| !mark.is_link());
            if let Some(href) = href {
                marks.insert(Mark::Link {
                    href: href.to_string(),
                });
            }
        })?;
        Ok(*selection)
    }
}

fn has_link(marks: &BTreeSet<Mark>) -> bool {
    marks.iter().any(Mark::is_link)
}

/// The inline runs a selection points into. Code blocks and images have
/// none.
pub(crate) fn inline_runs<'a>(doc: &'a Document, selection: &Selection) -> Option<&'a [TextRun]> {
    match doc.blocks.get(selection.block)? {
        Block::Paragraph(content) | Block::Heading { content, .. } => Some(content),
        Block::List { items, .. } => items.get(selection.item).map(|item| &item.content[..]),
        Block::CodeBlock { .. } | Block::Image { .. } => None,
    }
}

fn inline_runs_mut<'a>(
    doc: &'a mut Document,
    selection: &Selection,
) -> Option<&'a mut Vec<TextRun>> {
    match doc.blocks.get_mut(selection.block)? {
        Block::Paragraph(content) | Block::Heading { content, .. } => Some(content),
        Block::List { items, .. } => items.get_mut(selection.item).map(|item| &mut item.content),
        Block::CodeBlock { .. } | Block::Image { .. } => None,
    }
}

/// The character range a mark command acts on: the selection itself, or
/// for a collapsed cursor the surrounding span whose marks satisfy `pred`.
fn mark_range(
    runs: &[TextRun],
    selection: &Selection,
    pred: impl Fn(&BTreeSet<Mark>) -> bool,
) -> Option<(usize, usize)> {
    let chars = explode(runs);
    let len = chars.len();
    if !selection.is_collapsed() {
        let start = selection.start.min(len);
        let end = selection.end.min(len);
        return (start < end).then_some((start, end));
    }
    let cursor = selection.start.min(len);
    let anchor = if cursor < len && pred(&chars[cursor].1) {
        cursor
    } else if cursor > 0 && pred(&chars[cursor - 1].1) {
        cursor - 1
    } else {
        return None;
    };
    let mut start = anchor;
    while start > 0 && pred(&chars[start - 1].1) {
        start -= 1;
    }
    let mut end = anchor + 1;
    while end < len && pred(&chars[end].1) {
        end += 1;
    }
    Some((start, end))
}

fn all_carry(
    runs: &[TextRun],
    start: usize,
    end: usize,
    pred: impl Fn(&BTreeSet<Mark>) -> bool,
) -> bool {
    explode(runs)[start..end].iter().all(|(_, marks)| pred(marks))
}

fn edit_marks(
    doc: &mut Document,
    selection: &Selection,
    pred: impl Fn(&BTreeSet<Mark>) -> bool,
    edit: impl Fn(&mut BTreeSet<Mark>),
) -> BoardResult<()> {
    let runs = inline_runs_mut(doc, selection)
        .ok_or_else(|| BoardError::Validation("selection is not in a text block".into()))?;
    let (start, end) = mark_range(runs, selection, pred)
        .ok_or_else(|| BoardError::Validation("nothing selected".into()))?;
    let mut chars = explode(runs);
    for (_, marks) in &mut chars[start..end] {
        edit(marks);
    }
    *runs = regroup(chars);
    Ok(())
}

/// Inline content of a block being converted to another block type.
fn block_runs(block: &Block) -> Vec<TextRun> {
    match block {
        Block::Paragraph(content) | Block::Heading { content, .. } => content.clone(),
        other => vec![TextRun::plain(other.plain_text())],
    }
}

fn toggle_list(doc: &mut Document, selection: &Selection, kind: ListKind, active: bool) -> Selection {
    let index = selection.block;
    let block = doc.blocks.remove(index);
    match block {
        Block::List { items, .. } if active => {
            // Unwrap the selected item, splitting the list around it.
            let item_index = selection.item.min(items.len().saturating_sub(1));
            let mut before = items;
            let after = before.split_off((item_index + 1).min(before.len()));
            let selected = before.pop();
            let mut replacement = Vec::new();
            if !before.is_empty() {
                replacement.push(Block::List {
                    kind,
                    items: before,
                });
            }
            let paragraph_index = index + replacement.len();
            replacement.push(Block::paragraph(
                selected.map(|item| item.content).unwrap_or_default(),
            ));
            if !after.is_empty() {
                replacement.push(Block::List { kind, items: after });
            }
            for (offset, block) in replacement.into_iter().enumerate() {
                doc.blocks.insert(index + offset, block);
            }
            Selection {
                block: paragraph_index,
                item: 0,
                ..*selection
            }
        }
        Block::List { items, .. } => {
            let items = items
                .into_iter()
                .map(|item| ListItem::new(kind, item.content))
                .collect();
            doc.blocks.insert(index, Block::List { kind, items });
            *selection
        }
        other => {
            let item = ListItem::new(kind, block_runs(&other));
            doc.blocks.insert(
                index,
                Block::List {
                    kind,
                    items: vec![item],
                },
            );
            selection.in_item(0)
        }
    }
}
