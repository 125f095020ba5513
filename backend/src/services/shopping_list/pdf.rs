//! Checklist document rendering for consolidated shopping lists.
//!
//! The document is a paginated checklist: a header block on page one (title
//! with the requester's name, the numbered recipe selection), one table row
//! per consolidated line (checkbox, right-aligned amount, ingredient name
//! with a muted provenance footnote) and a generation timestamp after the
//! last row. Row layout and pagination follow the table's rules: a row is as
//! tall as its tallest cell plus padding, and a row that does not fit the
//! remaining page moves to the next page whole.

use chrono::{DateTime, Utc};
use common::model::shopping_list::ConsolidatedLine;
use genpdf::elements::{
    Break, FrameCellDecorator, FramedElement, PaddedElement, Paragraph, TableLayout,
};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{Alignment, Document, Element, Margins};
use std::error::Error;
use std::fs;
use std::path::Path;

/// Relative column widths: checkbox, amount, ingredient. The amount column
/// is a quarter of the content width; the checkbox column stays narrow so
/// its frame reads as a box.
const COLUMN_WEIGHTS: [usize; 3] = [1, 5, 14];

const BODY_FONT_SIZE: u8 = 11;
const FOOTNOTE_FONT_SIZE: u8 = 8;
const MUTED: Color = Color::Rgb(128, 128, 128);

/// Header block data for page one.
pub struct ListHeader {
    pub username: String,
    /// Selected recipe names in display-index order; the footnotes on the
    /// rows refer to positions in this list.
    pub recipe_names: Vec<String>,
}

/// Load the font family for checklist documents.
fn load_font(
    fonts_dir: &str,
) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, Box<dyn Error>> {
    // Prefer Arial if the family TTFs were added to the fonts directory,
    // otherwise fall back to LiberationSans from the same directory.
    if let Ok(family) = genpdf::fonts::from_files(fonts_dir, "Arial", None) {
        return Ok(family);
    }
    genpdf::fonts::from_files(fonts_dir, "LiberationSans", None).map_err(Into::into)
}

/// Configure a document with font and page decorator set. The bottom margin
/// is the reserve a row must clear before a page break is forced.
fn configure_document(fonts_dir: &str, username: &str) -> Result<Document, Box<dyn Error>> {
    let font_family = load_font(fonts_dir)?;
    let mut doc = Document::new(font_family);
    doc.set_title(format!("Shopping list for {}", username));
    doc.set_font_size(BODY_FONT_SIZE);
    doc.set_line_spacing(1.0);

    let mut decorator = genpdf::SimplePageDecorator::new();
    // 40 layout units of bottom reserve, expressed in millimetres.
    decorator.set_margins(Margins::trbl(12.0, 12.0, 14.0, 12.0));
    doc.set_page_decorator(decorator);
    Ok(doc)
}

/// Pushes the page-one header block: title line, one numbered line per
/// selected recipe, then a gap before the first data row.
fn push_header(doc: &mut Document, header: &ListHeader) {
    doc.push(
        Paragraph::new(format!("Shopping list for {}", header.username))
            .styled(Style::new().bold().with_font_size(16)),
    );
    doc.push(Break::new(1));
    for (position, name) in header.recipe_names.iter().enumerate() {
        doc.push(Paragraph::new(format!("{}. {}", position + 1, name)));
    }
    doc.push(Break::new(1));
}

/// Formats the provenance footnote, e.g. "Recipes 1, 3".
fn recipes_footnote(recipes: &[usize]) -> String {
    let indices: Vec<String> = recipes.iter().map(|index| index.to_string()).collect();
    format!("Recipes {}", indices.join(", "))
}

/// Renders one checklist row: an empty framed box as the checkbox, the
/// amount right-aligned in its column, and the ingredient name followed on
/// the same text line by the muted footnote.
fn push_row(table: &mut TableLayout, line: &ConsolidatedLine) -> Result<(), Box<dyn Error>> {
    let mut row = table.row();
    row.push_element(PaddedElement::new(
        FramedElement::new(Paragraph::new(" ")),
        Margins::trbl(1.0, 3.0, 1.0, 0.5),
    ));
    row.push_element(PaddedElement::new(
        Paragraph::new(line.amount.as_str()).aligned(Alignment::Right),
        Margins::trbl(1.0, 2.0, 1.0, 0.0),
    ));

    let mut ingredient = Paragraph::new("");
    ingredient.push(StyledString::new(line.ingredient.clone(), Style::new()));
    if !line.recipes.is_empty() {
        ingredient.push(StyledString::new(
            format!("   {}", recipes_footnote(&line.recipes)),
            Style::new().with_font_size(FOOTNOTE_FONT_SIZE).with_color(MUTED),
        ));
    }
    row.push_element(PaddedElement::new(
        ingredient,
        Margins::trbl(1.0, 0.0, 1.0, 2.0),
    ));

    row.push().map_err(Into::into)
}

/// Renders the checklist and writes it to `output_path`.
///
/// The caller must treat a successful return as "the document exists on
/// disk": the generation record referencing the file is only persisted
/// afterwards.
pub fn write_list_document(
    fonts_dir: &str,
    header: &ListHeader,
    lines: &[ConsolidatedLine],
    generated_at: DateTime<Utc>,
    output_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut doc = configure_document(fonts_dir, &header.username)?;
    push_header(&mut doc, header);

    // A degraded consolidation yields no rows; the document then carries
    // only the header and the footer line.
    if !lines.is_empty() {
        let mut table = TableLayout::new(COLUMN_WEIGHTS.to_vec());
        table.set_cell_decorator(FrameCellDecorator::new(true, false, false));
        for line in lines {
            push_row(&mut table, line)?;
        }
        doc.push(table);
    }

    doc.push(Break::new(1));
    doc.push(
        Paragraph::new(format!(
            "Generated {}",
            generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ))
        .styled(Style::new().with_font_size(FOOTNOTE_FONT_SIZE).with_color(MUTED)),
    );

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out_file = fs::File::create(output_path)?;
    doc.render(&mut out_file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footnote_lists_indices_in_order() {
        assert_eq!(recipes_footnote(&[1]), "Recipes 1");
        assert_eq!(recipes_footnote(&[1, 3, 2]), "Recipes 1, 3, 2");
    }

    #[test]
    fn amount_column_is_a_quarter_of_the_content_width() {
        let total: usize = COLUMN_WEIGHTS.iter().sum();
        assert_eq!(COLUMN_WEIGHTS[1] * 4, total);
    }
}
