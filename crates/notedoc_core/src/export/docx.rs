//! `.docx` serialization of document models.
//!
//! # Responsibility
//! - Map model blocks onto `docx-rs` paragraphs, runs and tables.
//! - Convert point-based model units into OOXML units.
//!
//! # Invariants
//! - Serialization is in-memory; callers decide where bytes are written.
//! - Model semantics are not reinterpreted here, only translated.

use super::{ExportError, ExportResult};
use crate::model::document::{
    Alignment, Block, DocumentModel, Paragraph, Table, TableCell, TextRun,
};
use docx_rs::{
    AlignmentType, BorderType, BreakType, Docx, LineSpacing, PageMargin, Run, RunFonts, Shading,
    TableAlignmentType, TableCellBorder, TableCellBorderPosition, WidthType,
};
use std::io::Cursor;

const TWIPS_PER_POINT: u32 = 20;
const BORDER_EIGHTHS_OF_POINT: usize = 4;

/// Turns a finished document model into file bytes.
pub trait DocumentSerializer {
    /// File extension without the dot.
    fn extension(&self) -> &'static str;
    fn serialize(&self, model: &DocumentModel) -> ExportResult<Vec<u8>>;
}

/// Word (`.docx`) serializer backed by `docx-rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxSerializer;

impl DocumentSerializer for DocxSerializer {
    fn extension(&self) -> &'static str {
        "docx"
    }

    fn serialize(&self, model: &DocumentModel) -> ExportResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        build_docx(model)
            .build()
            .pack(&mut buffer)
            .map_err(|err| ExportError::Serialize(err.to_string()))?;
        Ok(buffer.into_inner())
    }
}

fn build_docx(model: &DocumentModel) -> Docx {
    let margin = twips(model.page.margin) as i32;
    let family = model.page.font_family.as_str();
    let mut docx = Docx::new()
        .page_margin(
            PageMargin::new()
                .top(margin)
                .bottom(margin)
                .left(margin)
                .right(margin),
        )
        .default_fonts(fonts(family))
        .default_size(half_points(model.page.font_size));

    for block in &model.blocks {
        docx = match block {
            Block::Heading(paragraph) | Block::Paragraph(paragraph) => {
                docx.add_paragraph(convert_paragraph(paragraph, family))
            }
            Block::Table(table) => docx.add_table(convert_table(table, family)),
        };
    }
    docx
}

fn convert_paragraph(paragraph: &Paragraph, family: &str) -> docx_rs::Paragraph {
    let mut converted = docx_rs::Paragraph::new().line_spacing(
        LineSpacing::new()
            .before(twips(paragraph.space_before))
            .after(twips(paragraph.space_after)),
    );

    if paragraph.alignment == Alignment::Center {
        converted = converted.align(AlignmentType::Center);
    }
    if paragraph.indent_left > 0 {
        converted = converted.indent(Some(twips(paragraph.indent_left) as i32), None, None, None);
    }

    paragraph
        .runs
        .iter()
        .fold(converted, |converted, run| {
            converted.add_run(convert_run(run, family))
        })
}

fn convert_run(run: &TextRun, family: &str) -> Run {
    let mut converted = Run::new().size(half_points(run.size)).fonts(fonts(family));
    // Embedded newlines become soft line breaks inside the same paragraph.
    for (index, line) in run.text.split('\n').enumerate() {
        if index > 0 {
            converted = converted.add_break(BreakType::TextWrapping);
        }
        converted = converted.add_text(line.trim_end_matches('\r'));
    }
    if run.bold {
        converted = converted.bold();
    }
    if run.italic {
        converted = converted.italic();
    }
    if let Some(color) = run.color {
        converted = converted.color(color.hex());
    }
    converted
}

fn convert_table(table: &Table, family: &str) -> docx_rs::Table {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let cells = row
                .cells
                .iter()
                .enumerate()
                .map(|(index, cell)| {
                    convert_cell(cell, table.column_widths.get(index).copied(), family)
                })
                .collect();
            docx_rs::TableRow::new(cells)
        })
        .collect();

    let grid = table
        .column_widths
        .iter()
        .map(|width| twips(*width) as usize)
        .collect();

    let converted = docx_rs::Table::new(rows).set_grid(grid);
    match table.alignment {
        Alignment::Center => converted.align(TableAlignmentType::Center),
        Alignment::Left => converted,
    }
}

fn convert_cell(cell: &TableCell, width: Option<u32>, family: &str) -> docx_rs::TableCell {
    let mut converted = cell
        .paragraphs
        .iter()
        .fold(docx_rs::TableCell::new(), |converted, paragraph| {
            converted.add_paragraph(convert_paragraph(paragraph, family))
        });

    if let Some(width) = width {
        converted = converted.width(twips(width) as usize, WidthType::Dxa);
    }
    if let Some(shading) = cell.shading {
        converted = converted.shading(Shading::new().fill(shading.hex()));
    }
    if let Some(color) = cell.border {
        for position in [
            TableCellBorderPosition::Top,
            TableCellBorderPosition::Left,
            TableCellBorderPosition::Bottom,
            TableCellBorderPosition::Right,
        ] {
            converted = converted.set_border(
                TableCellBorder::new(position)
                    .border_type(BorderType::Single)
                    .size(BORDER_EIGHTHS_OF_POINT)
                    .color(color.hex()),
            );
        }
    }
    converted
}

fn fonts(family: &str) -> RunFonts {
    RunFonts::new()
        .ascii(family)
        .hi_ansi(family)
        .cs(family)
        .east_asia(family)
}

fn twips(points: u32) -> u32 {
    points * TWIPS_PER_POINT
}

fn half_points(points: u32) -> usize {
    points as usize * 2
}
