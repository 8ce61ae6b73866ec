//! Semantic document construction primitives.
//!
//! # Responsibility
//! - Append headings, label/value lines, text blocks and tables to an
//!   in-progress [`DocumentModel`].
//! - Apply palette styling so callers only speak in document semantics.
//!
//! # Invariants
//! - Builders read nothing but their palette; equal inputs on a fresh
//!   builder produce equal blocks.
//! - Missing values render as placeholders, never as empty blocks.

use crate::format::{display_or_default, has_text, NOT_SPECIFIED};
use crate::model::document::{
    Alignment, Block, DocumentModel, PageSetup, Paragraph, Table, TableCell, TableRow, TextRun,
};
use crate::palette::{Palette, Rgb};

pub const NO_ITEMS_RECORDED: &str = "No items recorded";
pub const NONE_RECORDED: &str = "None recorded";

const DIVIDER_WIDTH: usize = 60;

/// One row of the two-column assessment table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentItem {
    pub label: String,
    pub value: Option<String>,
    pub notes: Option<String>,
}

/// One row of an itemized list section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub name: String,
    pub description: Option<String>,
    pub note: Option<String>,
}

/// Appends styled blocks to a document under construction.
pub struct DocumentBuilder<'p> {
    palette: &'p Palette,
    blocks: Vec<Block>,
}

impl<'p> DocumentBuilder<'p> {
    pub fn new(palette: &'p Palette) -> Self {
        Self {
            palette,
            blocks: Vec::new(),
        }
    }

    /// Centered document title.
    pub fn add_title(&mut self, title: &str) {
        let run = TextRun::new(title, self.palette.title_size)
            .bold()
            .color(self.palette.header_text);
        self.push_paragraph(
            Paragraph::new()
                .align(Alignment::Center)
                .spacing(0, 6)
                .run(run),
        );
    }

    /// Centered italic status line under the title.
    pub fn add_status_line(&mut self, text: &str, color: Rgb) {
        let run = TextRun::new(text, self.palette.secondary_size)
            .italic()
            .color(color);
        self.push_paragraph(
            Paragraph::new()
                .align(Alignment::Center)
                .spacing(0, 15)
                .run(run),
        );
    }

    pub fn add_section_heading(&mut self, title: &str) {
        let run = TextRun::new(title, self.palette.heading_size)
            .bold()
            .color(self.palette.header_text);
        self.blocks
            .push(Block::Heading(Paragraph::new().spacing(15, 6).run(run)));
    }

    /// `Label: value` on one line; missing values read `Not specified`.
    pub fn add_label_value<T: ToString>(&mut self, label: &str, value: Option<T>, italic: bool) {
        let body = self.palette.body_size;
        let paragraph = Paragraph::new()
            .spacing(3, 3)
            .run(self.label_run(format!("{label}: ")))
            .run(TextRun::new(display_or_default(value), body).italic_if(italic));
        self.push_paragraph(paragraph);
    }

    /// Bold label line followed by one indented paragraph per line of `text`.
    pub fn add_text_block(&mut self, label: &str, text: Option<&str>) {
        let body = self.palette.body_size;
        let indent = self.palette.text_indent;
        self.push_paragraph(
            Paragraph::new()
                .spacing(6, 3)
                .run(self.label_run(format!("{label}:"))),
        );

        match text.filter(|text| has_text(Some(*text))) {
            Some(text) => {
                for line in text.split('\n') {
                    let line = line.trim_end_matches('\r');
                    // Blank lines keep their vertical space.
                    let content = if line.is_empty() { " " } else { line };
                    self.push_paragraph(
                        Paragraph::new()
                            .indent(indent)
                            .spacing(3, 3)
                            .run(TextRun::new(content, body)),
                    );
                }
            }
            None => self.push_paragraph(
                Paragraph::new()
                    .indent(indent)
                    .run(TextRun::new(NOT_SPECIFIED, body).italic()),
            ),
        }
    }

    /// Plain body paragraph, used for narrative text.
    pub fn add_body_paragraph(&mut self, text: &str) {
        let run = TextRun::new(text, self.palette.body_size);
        self.push_paragraph(Paragraph::new().spacing(0, 6).run(run));
    }

    /// Two-column `Assessment` / `Finding` table.
    pub fn add_assessment_table(&mut self, items: &[AssessmentItem]) {
        let body = self.palette.body_size;
        if items.is_empty() {
            self.push_paragraph(
                Paragraph::new().run(TextRun::new(NO_ITEMS_RECORDED, body).italic()),
            );
            return;
        }

        let header = TableRow {
            cells: ["Assessment", "Finding"]
                .into_iter()
                .map(|text| TableCell {
                    paragraphs: vec![Paragraph::new().run(TextRun::new(text, body).bold())],
                    shading: Some(self.palette.header_row_background),
                    border: Some(self.palette.border),
                })
                .collect(),
        };

        let mut rows = vec![header];
        rows.extend(items.iter().map(|item| self.assessment_row(item)));

        self.blocks.push(Block::Table(Table {
            column_widths: vec![
                self.palette.label_column_width,
                self.palette.value_column_width,
            ],
            rows,
            alignment: Alignment::Center,
        }));
    }

    /// Section heading plus a one-column item table, or `None recorded`.
    pub fn add_list_section(&mut self, title: &str, items: &[ListItem]) {
        self.add_section_heading(title);

        if items.is_empty() {
            let run = TextRun::new(NONE_RECORDED, self.palette.body_size).italic();
            self.push_paragraph(Paragraph::new().spacing(0, 6).run(run));
            return;
        }

        let rows = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let shading = (index % 2 == 1).then_some(self.palette.alternate_row_background);
                TableRow {
                    cells: vec![self.list_cell(item, shading)],
                }
            })
            .collect();

        self.blocks.push(Block::Table(Table {
            column_widths: vec![self.palette.list_table_width],
            rows,
            alignment: Alignment::Center,
        }));
    }

    /// Spacer, divider rule and a muted audit line.
    pub fn add_footer(&mut self, audit_line: &str) {
        self.push_paragraph(Paragraph::new());

        let rule = "\u{2500}".repeat(DIVIDER_WIDTH);
        self.push_paragraph(
            Paragraph::new().spacing(20, 0).run(
                TextRun::new(rule, self.palette.secondary_size).color(self.palette.border),
            ),
        );

        self.push_paragraph(
            Paragraph::new().spacing(6, 0).run(
                TextRun::new(audit_line, self.palette.footer_size).color(self.palette.label_text),
            ),
        );
    }

    pub fn finish(self) -> DocumentModel {
        DocumentModel {
            page: PageSetup {
                margin: self.palette.page_margin,
                font_family: self.palette.font_family.to_string(),
                font_size: self.palette.body_size,
            },
            blocks: self.blocks,
        }
    }

    fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    fn label_run(&self, text: String) -> TextRun {
        TextRun::new(text, self.palette.body_size)
            .bold()
            .color(self.palette.label_text)
    }

    fn assessment_row(&self, item: &AssessmentItem) -> TableRow {
        let body = self.palette.body_size;
        let secondary = self.palette.secondary_size;

        let label = TableCell {
            paragraphs: vec![Paragraph::new().run(TextRun::new(item.label.as_str(), body).bold())],
            shading: None,
            border: Some(self.palette.border),
        };

        let mut paragraphs = vec![Paragraph::new().run(TextRun::new(
            display_or_default(item.value.as_deref()),
            body,
        ))];
        if let Some(notes) = item.notes.as_deref().filter(|notes| has_text(Some(*notes))) {
            paragraphs.push(
                Paragraph::new()
                    .run(
                        TextRun::new("Notes: ", secondary)
                            .italic()
                            .color(self.palette.label_text),
                    )
                    .run(TextRun::new(notes, secondary).italic()),
            );
        }

        TableRow {
            cells: vec![
                label,
                TableCell {
                    paragraphs,
                    shading: None,
                    border: Some(self.palette.border),
                },
            ],
        }
    }

    fn list_cell(&self, item: &ListItem, shading: Option<Rgb>) -> TableCell {
        let secondary = self.palette.secondary_size;
        let mut paragraphs = vec![Paragraph::new().run(TextRun::new(
            item.name.as_str(),
            self.palette.body_size,
        ))];

        if let Some(description) = item
            .description
            .as_deref()
            .filter(|text| has_text(Some(*text)))
        {
            paragraphs.push(
                Paragraph::new().run(
                    TextRun::new(description, secondary)
                        .italic()
                        .color(self.palette.label_text),
                ),
            );
        }

        if let Some(note) = item.note.as_deref().filter(|text| has_text(Some(*text))) {
            paragraphs.push(
                Paragraph::new()
                    .run(TextRun::new("Note: ", secondary).bold())
                    .run(TextRun::new(note, secondary)),
            );
        }

        TableCell {
            paragraphs,
            shading,
            border: Some(self.palette.border),
        }
    }
}
