//! Library-independent document model.
//!
//! # Responsibility
//! - Describe the output document as ordered headings, paragraphs and tables.
//! - Carry concrete styling (colors, sizes, spacing) so serializers stay dumb.
//!
//! # Invariants
//! - Lengths and font sizes are in points.
//! - A model is built once, handed to one serializer and then dropped.

use crate::palette::Rgb;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

/// One styled run of text inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    /// `None` inherits the document's default text color.
    pub color: Option<Rgb>,
}

impl TextRun {
    pub fn new(text: impl Into<String>, size: u32) -> Self {
        Self {
            text: text.into(),
            size,
            bold: false,
            italic: false,
            color: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Sets italics from a flag; used where italics is caller-controlled.
    pub fn italic_if(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub alignment: Alignment,
    pub indent_left: u32,
    pub space_before: u32,
    pub space_after: u32,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(mut self, run: TextRun) -> Self {
        self.runs.push(run);
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn indent(mut self, left: u32) -> Self {
        self.indent_left = left;
        self
    }

    pub fn spacing(mut self, before: u32, after: u32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    /// Concatenated run text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
    pub shading: Option<Rgb>,
    /// Single-line border on all four sides in this color.
    pub border: Option<Rgb>,
}

impl TableCell {
    /// Concatenated text of every paragraph, one line per paragraph.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub column_widths: Vec<u32>,
    pub rows: Vec<TableRow>,
    pub alignment: Alignment,
}

/// Top-level document element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading(Paragraph),
    Paragraph(Paragraph),
    Table(Table),
}

impl Block {
    /// Heading or paragraph text; `None` for tables.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Heading(paragraph) | Self::Paragraph(paragraph) => Some(paragraph.text()),
            Self::Table(_) => None,
        }
    }
}

/// Page geometry and defaults applied to the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSetup {
    pub margin: u32,
    pub font_family: String,
    pub font_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentModel {
    pub page: PageSetup,
    pub blocks: Vec<Block>,
}

impl DocumentModel {
    /// Heading texts in document order.
    pub fn headings(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading(paragraph) => Some(paragraph.text()),
                _ => None,
            })
            .collect()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table(table) => Some(table),
            _ => None,
        })
    }

    /// Blocks after the heading `title` up to the next heading.
    ///
    /// Returns `None` when no heading with that text exists.
    pub fn section(&self, title: &str) -> Option<&[Block]> {
        let start = self
            .blocks
            .iter()
            .position(|block| matches!(block, Block::Heading(p) if p.text() == title))?;
        let body = &self.blocks[start + 1..];
        let end = body
            .iter()
            .position(|block| matches!(block, Block::Heading(_)))
            .unwrap_or(body.len());
        Some(&body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::{Block, DocumentModel, PageSetup, Paragraph, TextRun};

    fn heading(text: &str) -> Block {
        Block::Heading(Paragraph::new().run(TextRun::new(text, 13)))
    }

    fn line(text: &str) -> Block {
        Block::Paragraph(Paragraph::new().run(TextRun::new(text, 11)))
    }

    #[test]
    fn section_returns_blocks_until_next_heading() {
        let model = DocumentModel {
            page: PageSetup {
                margin: 72,
                font_family: "Arial".to_string(),
                font_size: 11,
            },
            blocks: vec![
                heading("One"),
                line("a"),
                line("b"),
                heading("Two"),
                line("c"),
            ],
        };

        assert_eq!(model.headings(), vec!["One", "Two"]);
        assert_eq!(model.section("One").map(<[Block]>::len), Some(2));
        assert_eq!(model.section("Two").map(<[Block]>::len), Some(1));
        assert!(model.section("Three").is_none());
    }

    #[test]
    fn paragraph_text_concatenates_runs() {
        let paragraph = Paragraph::new()
            .run(TextRun::new("Label: ", 11).bold())
            .run(TextRun::new("value", 11));
        assert_eq!(paragraph.text(), "Label: value");
    }
}
