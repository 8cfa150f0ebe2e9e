use std::cmp::Ordering;
use tabula_core::DecodedRow;

/// Stable in-memory sort of a decoded page by `sort_by`.
///
/// Comparison dispatches on the decoded value's kind. Rows whose sort key is
/// absent or null sort last in both directions. The database-side ORDER BY
/// already orders across pages; this pass is the mandatory in-page guarantee
/// and runs even when that clause was emitted.
pub fn sort_rows(rows: &mut [DecodedRow], sort_by: &str, ascending: bool) {
    if sort_by.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        let left = a.get(sort_by).filter(|v| !v.is_null());
        let right = b.get(sort_by).filter(|v| !v.is_null());
        match (left, right) {
            (Some(x), Some(y)) => {
                let ord = x.compare(y);
                if ascending {
                    ord
                } else {
                    ord.reverse()
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::Value;

    fn row(pairs: &[(&str, Value)]) -> DecodedRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_ascending_by_int() {
        let mut rows = vec![
            row(&[("size", Value::Int(30))]),
            row(&[("size", Value::Int(10))]),
            row(&[("size", Value::Int(20))]),
        ];
        sort_rows(&mut rows, "size", true);
        let sizes: Vec<_> = rows.iter().map(|r| r["size"].clone()).collect();
        assert_eq!(sizes, vec![Value::Int(10), Value::Int(20), Value::Int(30)]);
    }

    #[test]
    fn test_descending_by_string() {
        let mut rows = vec![
            row(&[("name", Value::String("alpha".into()))]),
            row(&[("name", Value::String("gamma".into()))]),
            row(&[("name", Value::String("beta".into()))]),
        ];
        sort_rows(&mut rows, "name", false);
        let names: Vec<_> = rows.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(
            names,
            vec![
                Value::String("gamma".into()),
                Value::String("beta".into()),
                Value::String("alpha".into()),
            ]
        );
    }

    #[test]
    fn test_nulls_sort_last_both_directions() {
        let make = || {
            vec![
                row(&[("size", Value::Null)]),
                row(&[("size", Value::Int(2))]),
                row(&[("size", Value::Int(1))]),
            ]
        };
        let mut asc = make();
        sort_rows(&mut asc, "size", true);
        assert_eq!(asc[0]["size"], Value::Int(1));
        assert_eq!(asc[2]["size"], Value::Null);

        let mut desc = make();
        sort_rows(&mut desc, "size", false);
        assert_eq!(desc[0]["size"], Value::Int(2));
        assert_eq!(desc[2]["size"], Value::Null);
    }

    #[test]
    fn test_missing_key_sorts_last() {
        let mut rows = vec![
            row(&[("other", Value::Int(9))]),
            row(&[("size", Value::Int(5))]),
        ];
        sort_rows(&mut rows, "size", true);
        assert_eq!(rows[0].get("size"), Some(&Value::Int(5)));
        assert!(rows[1].get("size").is_none());
    }

    #[test]
    fn test_stability_for_equal_keys() {
        let mut rows = vec![
            row(&[("size", Value::Int(1)), ("tag", Value::String("first".into()))]),
            row(&[("size", Value::Int(1)), ("tag", Value::String("second".into()))]),
            row(&[("size", Value::Int(0)), ("tag", Value::String("third".into()))]),
        ];
        sort_rows(&mut rows, "size", true);
        assert_eq!(rows[0]["tag"], Value::String("third".into()));
        assert_eq!(rows[1]["tag"], Value::String("first".into()));
        assert_eq!(rows[2]["tag"], Value::String("second".into()));
    }

    #[test]
    fn test_empty_sort_key_is_noop() {
        let mut rows = vec![
            row(&[("size", Value::Int(2))]),
            row(&[("size", Value::Int(1))]),
        ];
        sort_rows(&mut rows, "", true);
        assert_eq!(rows[0]["size"], Value::Int(2));
    }
}
