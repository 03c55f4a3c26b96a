//! Row/column model handed to the presentation layer.
//!
//! Every normalizer produces rows with a stable column set: optional upstream
//! fields become `Cell::Missing` rather than disappearing, so renderers always
//! see the same shape.

/// Hint for how a renderer should treat a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    /// Value is an image URL (logo/thumbnail).
    Image,
    /// Numeric, rendered with thousands separators at `places` decimals.
    Numeric { places: usize },
}

#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub title: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn text(title: &'static str) -> Self {
        Column {
            title,
            kind: ColumnKind::Text,
        }
    }

    pub const fn image(title: &'static str) -> Self {
        Column {
            title,
            kind: ColumnKind::Image,
        }
    }

    pub const fn numeric(title: &'static str, places: usize) -> Self {
        Column {
            title,
            kind: ColumnKind::Numeric { places },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    /// Yes/no marker; `None` means the upstream omitted the field.
    Flag(Option<bool>),
    /// Explicit "not applicable" marker.
    Missing,
}

impl Cell {
    /// Text cell from an optional upstream field, `Missing` when absent.
    pub fn opt_text(value: Option<&str>) -> Cell {
        match value {
            Some(v) => Cell::Text(v.to_string()),
            None => Cell::Missing,
        }
    }

    pub fn opt_number(value: Option<f64>) -> Cell {
        match value {
            Some(v) => Cell::Number(v),
            None => Cell::Missing,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Table {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

/// Implemented by every normalized row type.
pub trait Tabular {
    fn columns() -> Vec<Column>;
    fn cells(&self) -> Vec<Cell>;
}

pub fn table_from<T: Tabular>(title: impl Into<String>, rows: &[T]) -> Table {
    Table {
        title: title.into(),
        columns: T::columns(),
        rows: rows.iter().map(Tabular::cells).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opt_text_maps_absence_to_missing() {
        assert_eq!(Cell::opt_text(None), Cell::Missing);
        assert_eq!(Cell::opt_text(Some("x")), Cell::Text("x".to_string()));
    }

    struct Row(f64);

    impl Tabular for Row {
        fn columns() -> Vec<Column> {
            vec![Column::numeric("Value", 2)]
        }

        fn cells(&self) -> Vec<Cell> {
            vec![Cell::Number(self.0)]
        }
    }

    #[test]
    fn table_from_preserves_row_order() {
        let table = table_from("T", &[Row(1.0), Row(2.0)]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Number(1.0));
        assert_eq!(table.columns[0].title, "Value");
    }
}
