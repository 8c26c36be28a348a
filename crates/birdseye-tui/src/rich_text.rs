use crate::theme::{
    bold_highlight, code_text, highlight_text, label_text, link_text, normal_text,
    selected_item, toolbar_item,
};
use birdseye_richtext::{Block, Document, ListKind, Mark, Selection, TextRun, ToolbarItem};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use std::collections::BTreeSet;

/// Renders a card description for the detail view. The block (or list
/// item) under `highlight` is drawn with the selection background.
pub fn render_document(doc: &Document, highlight: Option<Selection>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (index, block) in doc.blocks.iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }
        let highlighted = highlight
            .filter(|selection| selection.block == index)
            .map(|selection| selection.item);
        match block {
            Block::Paragraph(content) => {
                let block_lines = runs_lines(content, Vec::new(), normal_text());
                push_highlighted(&mut lines, block_lines, highlighted.is_some());
            }
            Block::Heading { level, content } => {
                let prefix = vec![Span::styled(
                    format!("{} ", "#".repeat(*level as usize)),
                    label_text(),
                )];
                let block_lines = runs_lines(content, prefix, bold_highlight());
                push_highlighted(&mut lines, block_lines, highlighted.is_some());
            }
            Block::List { kind, items } => {
                for (i, item) in items.iter().enumerate() {
                    let bullet = match kind {
                        ListKind::Bullet => "  • ".to_string(),
                        ListKind::Ordered => format!("{:>3}. ", i + 1),
                        ListKind::Task if item.checked == Some(true) => "  [x] ".to_string(),
                        ListKind::Task => "  [ ] ".to_string(),
                    };
                    let prefix = vec![Span::styled(bullet, highlight_text())];
                    push_highlighted(
                        &mut lines,
                        runs_lines(&item.content, prefix, normal_text()),
                        highlighted == Some(i),
                    );
                }
            }
            Block::CodeBlock { language, code } => {
                let mut block_lines = vec![Line::from(Span::styled(
                    format!("```{}", language.as_deref().unwrap_or_default()),
                    label_text(),
                ))];
                block_lines.extend(
                    code.lines()
                        .map(|line| Line::from(Span::styled(line.to_string(), code_text()))),
                );
                block_lines.push(Line::from(Span::styled("```", label_text())));
                push_highlighted(&mut lines, block_lines, highlighted.is_some());
            }
            Block::Image { src, alt } => {
                let line = Line::from(vec![
                    Span::styled("[image] ", label_text()),
                    Span::styled(alt.clone(), highlight_text()),
                    Span::styled(format!(" {}", src), link_text()),
                ]);
                push_highlighted(&mut lines, vec![line], highlighted.is_some());
            }
        }
    }
    lines
}

/// The formatting toolbar as one line of labelled buttons.
pub fn toolbar_line(items: &[ToolbarItem]) -> Line<'static> {
    let mut spans = Vec::with_capacity(items.len() * 2);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!(" {} ", item.command.label()),
            toolbar_item(item.active, item.enabled),
        ));
    }
    Line::from(spans)
}

fn push_highlighted(lines: &mut Vec<Line<'static>>, block: Vec<Line<'static>>, highlighted: bool) {
    if highlighted {
        lines.extend(block.into_iter().map(|line| line.patch_style(selected_item(true))));
    } else {
        lines.extend(block);
    }
}

/// Splits runs into lines at hard breaks. `prefix` starts the first line.
fn runs_lines(runs: &[TextRun], prefix: Vec<Span<'static>>, base: Style) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current = prefix;
    for run in runs {
        let style = base.patch(mark_style(&run.marks));
        for (i, part) in run.text.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
            if !part.is_empty() {
                current.push(Span::styled(part.to_string(), style));
            }
        }
    }
    lines.push(Line::from(current));
    lines
}

fn mark_style(marks: &BTreeSet<Mark>) -> Style {
    let mut style = Style::default();
    for mark in marks {
        style = match mark {
            Mark::Bold => style.add_modifier(Modifier::BOLD),
            Mark::Italic => style.add_modifier(Modifier::ITALIC),
            Mark::Strike => style.add_modifier(Modifier::CROSSED_OUT),
            Mark::Code => style.patch(code_text()),
            Mark::Link { .. } => style.patch(link_text()),
        };
    }
    style
}
