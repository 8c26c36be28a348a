use birdseye_core::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};

use crate::document::{Block, Document};
use crate::toolbar::{inline_runs, Toolbar, ToolbarCommand, ToolbarItem};

/// A position or range inside one block, in characters.
///
/// `item` picks the list item when the block is a list and is ignored
/// otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub block: usize,
    pub item: usize,
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn cursor(block: usize, offset: usize) -> Self {
        Self {
            block,
            item: 0,
            start: offset,
            end: offset,
        }
    }

    pub fn range(block: usize, start: usize, end: usize) -> Self {
        Self {
            block,
            item: 0,
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn in_item(self, item: usize) -> Self {
        Self { item, ..self }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// A description being edited, with the selection the toolbar acts on.
#[derive(Debug, Clone)]
pub struct Editor {
    doc: Document,
    selection: Selection,
    editable: bool,
}

impl Editor {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            selection: Selection::default(),
            editable: true,
        }
    }

    pub fn from_html(html: &str) -> Self {
        Self::new(Document::from_html(html))
    }

    /// Display-only editor: every toolbar command is disabled.
    pub fn read_only(doc: Document) -> Self {
        Self {
            editable: false,
            ..Self::new(doc)
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn to_html(&self) -> String {
        self.doc.to_html()
    }

    pub fn select(&mut self, selection: Selection) -> BoardResult<()> {
        let len = self.target_len(&selection).ok_or_else(|| {
            BoardError::Validation(format!(
                "no block {} item {} in the document",
                selection.block, selection.item
            ))
        })?;
        if selection.start > selection.end || selection.end > len {
            return Err(BoardError::Validation(format!(
                "selection {}..{} is outside 0..{}",
                selection.start, selection.end, len
            )));
        }
        self.selection = selection;
        Ok(())
    }

    pub fn toolbar(&self) -> Vec<ToolbarItem> {
        let mut items = Toolbar::state(&self.doc, &self.selection);
        if !self.editable {
            for item in &mut items {
                item.enabled = false;
            }
        }
        items
    }

    pub fn is_active(&self, command: ToolbarCommand) -> bool {
        Toolbar::is_active(&self.doc, &self.selection, command)
    }

    pub fn is_enabled(&self, command: ToolbarCommand) -> bool {
        self.editable && Toolbar::is_enabled(&self.doc, &self.selection, command)
    }

    pub fn toggle(&mut self, command: ToolbarCommand) -> BoardResult<()> {
        self.ensure_editable()?;
        self.selection = Toolbar::apply(&mut self.doc, &self.selection, command)?;
        Ok(())
    }

    pub fn insert_image(&mut self, src: &str, alt: &str) -> BoardResult<()> {
        self.ensure_editable()?;
        self.selection = Toolbar::insert_image(&mut self.doc, &self.selection, src, alt)?;
        Ok(())
    }

    /// `None` removes the link under the selection.
    pub fn set_link(&mut self, href: Option<&str>) -> BoardResult<()> {
        self.ensure_editable()?;
        self.selection = Toolbar::set_link(&mut self.doc, &self.selection, href)?;
        Ok(())
    }

    fn ensure_editable(&self) -> BoardResult<()> {
        if self.editable {
            Ok(())
        } else {
            Err(BoardError::Validation("description is read-only".into()))
        }
    }

    /// One selection per block, and per item inside lists, each spanning
    /// the whole target. Used to step through a description line by line.
    pub fn targets(&self) -> Vec<Selection> {
        let mut targets = Vec::new();
        for (block, content) in self.doc.blocks.iter().enumerate() {
            let items = match content {
                Block::List { items, .. } => items.len(),
                _ => 1,
            };
            for item in 0..items {
                let target = Selection::cursor(block, 0).in_item(item);
                let len = self.target_len(&target).unwrap_or(0);
                targets.push(Selection { end: len, ..target });
            }
        }
        targets
    }

    fn target_len(&self, selection: &Selection) -> Option<usize> {
        match self.doc.blocks.get(selection.block)? {
            Block::CodeBlock { code, .. } => Some(code.chars().count()),
            Block::Image { .. } => Some(0),
            _ => inline_runs(&self.doc, selection)
                .map(|runs| runs.iter().map(|run| run.text.chars().count()).sum()),
        }
    }
}
