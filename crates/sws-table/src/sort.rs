//! Column ordering for table rows.
//!
//! A column sorts numerically only when every cell parses as a number.
//! Otherwise cells compare case-folded, with the raw text breaking ties so
//! the order is total.

use std::cmp::Ordering;

/// Cell text at `column`; rows shorter than the header read as empty.
fn cell_at(row: &[String], column: usize) -> &str {
    row.get(column).map_or("", String::as_str)
}

enum SortKeys {
    Numeric(Vec<f64>),
    Text(Vec<(String, String)>),
}

impl SortKeys {
    fn collect(rows: &[Vec<String>], column: usize) -> Self {
        let numeric: Option<Vec<f64>> = rows
            .iter()
            .map(|row| cell_at(row, column).trim().parse::<f64>().ok())
            .collect();
        match numeric {
            Some(values) if !values.is_empty() => Self::Numeric(values),
            _ => Self::Text(
                rows.iter()
                    .map(|row| {
                        let raw = cell_at(row, column);
                        (raw.to_lowercase(), raw.to_string())
                    })
                    .collect(),
            ),
        }
    }

    fn compare(&self, a: usize, b: usize) -> Ordering {
        match self {
            Self::Numeric(values) => values[a].total_cmp(&values[b]),
            Self::Text(keys) => keys[a].cmp(&keys[b]),
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }
}

/// Stable sort of `rows` by the cell at `column`.
///
/// Returns whether the numeric ordering was used.
pub fn sort_rows(rows: &mut Vec<Vec<String>>, column: usize, ascending: bool) -> bool {
    let keys = SortKeys::collect(rows, column);
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        let ordering = keys.compare(a, b);
        if ascending { ordering } else { ordering.reverse() }
    });

    let mut slots: Vec<Option<Vec<String>>> = std::mem::take(rows).into_iter().map(Some).collect();
    *rows = order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect();
    keys.is_numeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[&str]) -> Vec<Vec<String>> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| vec![i.to_string(), (*v).to_string()])
            .collect()
    }

    fn column(rows: &[Vec<String>], index: usize) -> Vec<&str> {
        rows.iter().map(|r| r[index].as_str()).collect()
    }

    #[test]
    fn test_numeric_column_sorts_by_value() {
        let mut data = rows(&["10", "9", "-1.5", "100"]);
        assert!(sort_rows(&mut data, 1, true));
        assert_eq!(column(&data, 1), vec!["-1.5", "9", "10", "100"]);
    }

    #[test]
    fn test_mixed_column_sorts_as_text() {
        let mut data = rows(&["10", "9", "n/a", "100"]);
        assert!(!sort_rows(&mut data, 1, true));
        assert_eq!(column(&data, 1), vec!["10", "100", "9", "n/a"]);
    }

    #[test]
    fn test_text_is_case_folded_with_raw_tie_break() {
        let mut data = rows(&["beta", "Alpha", "alpha", "Beta"]);
        sort_rows(&mut data, 1, true);
        assert_eq!(column(&data, 1), vec!["Alpha", "alpha", "Beta", "beta"]);
    }

    #[test]
    fn test_descending_is_stable() {
        let mut data = rows(&["2", "1", "2", "1"]);
        sort_rows(&mut data, 1, false);
        assert_eq!(column(&data, 0), vec!["0", "2", "1", "3"]);
    }

    #[test]
    fn test_cell_at_reads_missing_cells_as_empty() {
        let row = vec!["x".to_string()];
        assert_eq!(cell_at(&row, 0), "x");
        assert_eq!(cell_at(&row, 3), "");
    }

    #[test]
    fn test_short_rows_sort_as_empty_text() {
        let mut data = vec![
            vec!["b".to_string(), "2".to_string()],
            vec!["a".to_string()],
        ];
        assert!(!sort_rows(&mut data, 1, true));
        assert_eq!(data[0], vec!["a".to_string()]);
    }
}
