use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inline formatting carried by a run of text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mark {
    Link { href: String },
    Bold,
    Italic,
    Strike,
    Code,
}

impl Mark {
    pub fn is_link(&self) -> bool {
        matches!(self, Mark::Link { .. })
    }
}

/// A run of text sharing one set of marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub marks: BTreeSet<Mark>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: BTreeSet::new(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: impl IntoIterator<Item = Mark>) -> Self {
        Self {
            text: text.into(),
            marks: marks.into_iter().collect(),
        }
    }

    pub fn has(&self, mark: &Mark) -> bool {
        self.marks.contains(mark)
    }

    pub fn link(&self) -> Option<&str> {
        self.marks.iter().find_map(|mark| match mark {
            Mark::Link { href } => Some(href.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    Bullet,
    Ordered,
    Task,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Only set for task lists.
    pub checked: Option<bool>,
    pub content: Vec<TextRun>,
}

impl ListItem {
    pub fn new(kind: ListKind, content: Vec<TextRun>) -> Self {
        Self {
            checked: (kind == ListKind::Task).then_some(false),
            content: normalize_runs(content),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(Vec<TextRun>),
    Heading {
        level: u8,
        content: Vec<TextRun>,
    },
    List {
        kind: ListKind,
        items: Vec<ListItem>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Image {
        src: String,
        alt: String,
    },
}

impl Block {
    pub fn paragraph(content: Vec<TextRun>) -> Self {
        Block::Paragraph(normalize_runs(content))
    }

    pub fn heading(level: u8, content: Vec<TextRun>) -> Self {
        Block::Heading {
            level: level.clamp(1, 3),
            content: normalize_runs(content),
        }
    }

    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(content) | Block::Heading { content, .. } => runs_text(content),
            Block::List { items, .. } => items
                .iter()
                .map(|item| runs_text(&item.content))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::CodeBlock { code, .. } => code.clone(),
            Block::Image { alt, .. } => alt.clone(),
        }
    }

    /// Blocks that hold formatted runs directly.
    pub fn is_rich_text(&self) -> bool {
        matches!(self, Block::Paragraph(_) | Block::Heading { .. })
    }
}

/// A rich-text card description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks
            .iter()
            .all(|block| !matches!(block, Block::Image { .. }) && block.plain_text().trim().is_empty())
    }

    /// Text content with one line per block, used for card previews.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub(crate) fn runs_text(runs: &[TextRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

/// Drops empty runs and joins neighbours carrying identical marks.
pub fn normalize_runs(runs: Vec<TextRun>) -> Vec<TextRun> {
    let mut out: Vec<TextRun> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.marks == run.marks => last.text.push_str(&run.text),
            _ => out.push(run),
        }
    }
    out
}

/// Splits runs into per-character mark sets.
pub(crate) fn explode(runs: &[TextRun]) -> Vec<(char, BTreeSet<Mark>)> {
    runs.iter()
        .flat_map(|run| run.text.chars().map(move |c| (c, run.marks.clone())))
        .collect()
}

pub(crate) fn regroup(chars: Vec<(char, BTreeSet<Mark>)>) -> Vec<TextRun> {
    let runs = chars
        .into_iter()
        .map(|(c, marks)| TextRun {
            text: c.to_string(),
            marks,
        })
        .collect();
    normalize_runs(runs)
}
