//! Terminal rendering of normalized tables (columns carry typed hints).

use comfy_table::{modifiers, presets, Attribute, Cell as DisplayCell, ContentArrangement};
use wallet_lens::normalize::format_grouped;
use wallet_lens::table::{Cell, Column, ColumnKind, Table};

/// Render a normalized table as text. Numeric columns are formatted at their
/// declared precision with thousands separators; image columns show the URL;
/// missing fields show "N/A" so the column set stays stable.
pub fn render_table(table: &Table) -> String {
    let mut out = comfy_table::Table::new();
    out.load_preset(presets::UTF8_FULL)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    out.set_header(
        table
            .columns
            .iter()
            .map(|c| DisplayCell::new(c.title).add_attribute(Attribute::Bold)),
    );
    for row in &table.rows {
        out.add_row(
            row.iter()
                .zip(table.columns.iter())
                .map(|(cell, column)| format_cell(cell, column)),
        );
    }
    out.to_string()
}

fn format_cell(cell: &Cell, column: &Column) -> String {
    match cell {
        Cell::Missing | Cell::Flag(None) => "N/A".to_string(),
        Cell::Flag(Some(true)) => "✅".to_string(),
        Cell::Flag(Some(false)) => "❌".to_string(),
        Cell::Text(text) => text.clone(),
        Cell::Number(value) => match column.kind {
            ColumnKind::Numeric { places } => format_grouped(*value, places),
            _ => format_grouped(*value, 4),
        },
    }
}
