//! Identifier lookup over parsed rows.

use crate::{Row, RowSet};

/// Returns the `id_column` value of the first row that matches `filters` exactly.
///
/// A row matches when it has `id_column`, carries every filter column with the
/// filter's value, and has no columns besides `id_column` and the filter columns.
pub fn resolve_id(rows: &RowSet, id_column: &str, filters: &[(&str, &str)]) -> Option<String> {
    rows.iter()
        .find_map(|row| matched_id(row, id_column, filters))
        .map(str::to_string)
}

/// The `id_column` value of `row` if it matches `filters` exactly.
pub(crate) fn matched_id<'r>(
    row: &'r Row,
    id_column: &str,
    filters: &[(&str, &str)],
) -> Option<&'r str> {
    let has_filters = filters
        .iter()
        .all(|(column, value)| row.get(column) == Some(*value));
    let no_extra_columns = row
        .columns()
        .all(|column| column == id_column || filters.iter().any(|(c, _)| *c == column));
    if has_filters && no_extra_columns {
        row.get(id_column)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Row;

    fn endpoint_row() -> Row {
        [
            ("id", "000d9c447d124754a197fc612f9d63d7"),
            ("region", "Region Two"),
            ("publicurl", "http://public"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn extra_columns_do_not_match() {
        let rows = RowSet::new(vec![[("id", "X"), ("other", "Y")].into_iter().collect()]);
        assert_eq!(resolve_id(&rows, "id", &[("id", "X")]), None);
    }

    #[test]
    fn exact_columns_match() {
        let rows = RowSet::new(vec![[("id", "X")].into_iter().collect()]);
        assert_eq!(resolve_id(&rows, "id", &[("id", "X")]), Some("X".to_string()));
    }

    #[test]
    fn every_filter_must_match() {
        let rows = RowSet::new(vec![endpoint_row()]);
        let filters = [
            ("id", "000d9c447d124754a197fc612f9d63d7"),
            ("region", "Region Two"),
            ("publicurl", "http://public"),
        ];
        assert_eq!(
            resolve_id(&rows, "id", &filters),
            Some("000d9c447d124754a197fc612f9d63d7".to_string())
        );

        let filters = [
            ("id", "000d9c447d124754a197fc612f9d63d7"),
            ("region", "Region One"),
            ("publicurl", "http://public"),
        ];
        assert_eq!(resolve_id(&rows, "id", &filters), None);
    }

    #[test]
    fn filter_column_absent_from_row() {
        let rows = RowSet::new(vec![endpoint_row()]);
        let filters = [
            ("id", "000d9c447d124754a197fc612f9d63d7"),
            ("region", "Region Two"),
            ("publicurl", "http://public"),
            ("key", "value"),
        ];
        assert_eq!(resolve_id(&rows, "id", &filters), None);
    }

    #[test]
    fn first_match_wins() {
        let rows = RowSet::new(vec![
            [("id", "first"), ("name", "role1")].into_iter().collect(),
            [("id", "second"), ("name", "role1")].into_iter().collect(),
        ]);
        assert_eq!(
            resolve_id(&rows, "id", &[("name", "role1")]),
            Some("first".to_string())
        );
    }

    #[test]
    fn row_without_id_column_is_skipped() {
        let rows = RowSet::new(vec![
            [("name", "role1")].into_iter().collect(),
            [("id", "abc"), ("name", "role1")].into_iter().collect(),
        ]);
        assert_eq!(
            resolve_id(&rows, "id", &[("name", "role1")]),
            Some("abc".to_string())
        );
    }

    #[test]
    fn empty_rows_resolve_nothing() {
        assert_eq!(resolve_id(&RowSet::default(), "id", &[("name", "x")]), None);
    }
}
