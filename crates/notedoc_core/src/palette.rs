//! Fixed visual identity for exported notes.
//!
//! # Responsibility
//! - Name every color, size and spacing value used by the document builder.
//!
//! # Invariants
//! - The palette is an immutable value passed into builders; there is no
//!   process-wide style state.
//! - All lengths are in points. Serializers convert to their own units.

use serde::Serialize;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Upper-case hex without a leading `#`, e.g. `1A5276`.
    pub fn hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Named visual attributes shared by every rendered block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub header_text: Rgb,
    /// Muted color for labels, descriptions and the footer.
    pub label_text: Rgb,
    pub certified: Rgb,
    pub not_certified: Rgb,
    pub border: Rgb,
    pub header_row_background: Rgb,
    pub alternate_row_background: Rgb,
    pub font_family: &'static str,
    pub title_size: u32,
    pub heading_size: u32,
    pub body_size: u32,
    /// Certification line, notes and descriptions.
    pub secondary_size: u32,
    pub footer_size: u32,
    pub page_margin: u32,
    pub text_indent: u32,
    pub label_column_width: u32,
    pub value_column_width: u32,
    pub list_table_width: u32,
}

impl Palette {
    /// The compiled-in palette used for every export.
    pub const fn standard() -> Self {
        Self {
            header_text: Rgb(0x1A, 0x52, 0x76),
            label_text: Rgb(0x5D, 0x6D, 0x7E),
            certified: Rgb(0x27, 0xAE, 0x60),
            not_certified: Rgb(0xE7, 0x4C, 0x3C),
            border: Rgb(0xBD, 0xC3, 0xC7),
            header_row_background: Rgb(0xE8, 0xF4, 0xF8),
            alternate_row_background: Rgb(0xF8, 0xF9, 0xFA),
            font_family: "Arial",
            title_size: 18,
            heading_size: 13,
            body_size: 11,
            secondary_size: 10,
            footer_size: 9,
            page_margin: 72,
            text_indent: 18,
            label_column_width: 180,
            value_column_width: 288,
            list_table_width: 468,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}
