//! Deterministic ordering of nested table rows
//!
//! The API returns subtables (ports, members, tags) in server-defined order
//! which can change between reads. With `dynamic_sort_subtable` enabled the
//! rows are sorted by a key attribute so reordering alone never shows up as a
//! diff.

use std::cmp::Ordering;

use serde_json::Value;

use crate::api::AttributeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Keep API order
    #[default]
    Disabled,
    /// Numbers numerically, everything else lexicographically
    Ascending,
    /// Like `Ascending`, but digit runs inside strings compare numerically
    Natural,
}

impl SortMode {
    /// Mode for a `dynamic_sort_subtable` setting. Unknown values disable sorting
    pub fn from_setting(setting: Option<&str>) -> Self {
        match setting.map(str::trim) {
            Some("true") => SortMode::Ascending,
            Some("natural") => SortMode::Natural,
            _ => SortMode::Disabled,
        }
    }
}

/// Sort `rows` by `key_field`. Stable; rows missing the key sort first
pub fn sort_subtable(mut rows: Vec<AttributeMap>, key_field: &str, mode: SortMode) -> Vec<AttributeMap> {
    if mode == SortMode::Disabled {
        return rows;
    }

    rows.sort_by(|a, b| compare_keys(a.get(key_field), b.get(key_field), mode));
    rows
}

enum SortKey<'a> {
    Missing,
    Number(f64),
    Text(&'a str),
}

impl<'a> SortKey<'a> {
    fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => SortKey::Missing,
            Some(Value::Number(n)) => n.as_f64().map_or(SortKey::Missing, SortKey::Number),
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => SortKey::Number(n),
                _ => SortKey::Text(s),
            },
            Some(Value::Bool(true)) => SortKey::Text("true"),
            Some(Value::Bool(false)) => SortKey::Text("false"),
            // nested values have no meaningful order
            Some(_) => SortKey::Missing,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Missing => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
        }
    }
}

fn compare_keys(a: Option<&Value>, b: Option<&Value>, mode: SortMode) -> Ordering {
    let (a, b) = (SortKey::of(a), SortKey::of(b));
    match (&a, &b) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
        (SortKey::Text(x), SortKey::Text(y)) => match mode {
            SortMode::Natural => natural_cmp(x, y),
            _ => x.cmp(y),
        },
        _ => a.rank().cmp(&b.rank()),
    }
}

/// Compare strings treating each run of ASCII digits as one number, so
/// `port2 < port10`. Falls back to plain comparison on ties
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let l = take_digits(&mut left);
                let r = take_digits(&mut right);
                let ord = l
                    .trim_start_matches('0')
                    .len()
                    .cmp(&r.trim_start_matches('0').len())
                    .then_with(|| l.trim_start_matches('0').cmp(r.trim_start_matches('0')));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rows(value: Value) -> Vec<AttributeMap> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row.as_object().unwrap().clone())
            .collect()
    }

    fn column(rows: &[AttributeMap], field: &str) -> Vec<Value> {
        rows.iter()
            .map(|row| row.get(field).cloned().unwrap_or(Value::Null))
            .collect()
    }

    #[test]
    fn equal_keys_keep_relative_order() {
        let input = rows(json!([
            {"id": 2, "x": "a"},
            {"id": 1, "x": "b"},
            {"id": 1, "x": "c"}
        ]));

        let sorted = sort_subtable(input, "id", SortMode::Ascending);
        assert_eq!(
            sorted,
            rows(json!([
                {"id": 1, "x": "b"},
                {"id": 1, "x": "c"},
                {"id": 2, "x": "a"}
            ]))
        );
    }

    #[test]
    fn disabled_passes_rows_through() {
        let input = rows(json!([{"id": 3}, {"id": 1}, {"name": "x"}, {"id": 2}]));
        let sorted = sort_subtable(input.clone(), "id", SortMode::Disabled);
        assert_eq!(sorted, input);
    }

    #[test]
    fn numbers_compare_numerically() {
        let input = rows(json!([{"seq_num": 10}, {"seq_num": 9}, {"seq_num": "100"}, {"seq_num": 2}]));
        let sorted = sort_subtable(input, "seq_num", SortMode::Ascending);
        assert_eq!(
            column(&sorted, "seq_num"),
            vec![json!(2), json!(9), json!(10), json!("100")]
        );
    }

    #[test]
    fn strings_compare_lexicographically() {
        let input = rows(json!([{"name": "port10"}, {"name": "port2"}, {"name": "internal"}]));
        let sorted = sort_subtable(input, "name", SortMode::Ascending);
        assert_eq!(
            column(&sorted, "name"),
            vec![json!("internal"), json!("port10"), json!("port2")]
        );
    }

    #[test]
    fn natural_mode_orders_digit_runs() {
        let input = rows(json!([{"name": "port10"}, {"name": "port2"}, {"name": "port1"}, {"name": "internal"}]));
        let sorted = sort_subtable(input, "name", SortMode::Natural);
        assert_eq!(
            column(&sorted, "name"),
            vec![json!("internal"), json!("port1"), json!("port2"), json!("port10")]
        );
    }

    #[test]
    fn missing_keys_sort_first() {
        let input = rows(json!([{"id": 1}, {"other": true}, {"id": null}, {"id": 0}]));
        let sorted = sort_subtable(input, "id", SortMode::Ascending);
        assert_eq!(
            sorted,
            rows(json!([{"other": true}, {"id": null}, {"id": 0}, {"id": 1}]))
        );
    }

    #[test]
    fn mixed_keys_order_numbers_before_text() {
        let input = rows(json!([{"k": "b"}, {"k": 5}, {"k": "a"}, {"k": 1}]));
        let sorted = sort_subtable(input, "k", SortMode::Ascending);
        assert_eq!(column(&sorted, "k"), vec![json!(1), json!(5), json!("a"), json!("b")]);

        let sorted = sort_subtable(rows(json!([{"k": "1a"}, {"k": 5}])), "k", SortMode::Ascending);
        assert_eq!(column(&sorted, "k"), vec![json!(5), json!("1a")]);
    }

    #[test]
    fn setting_selects_mode() {
        assert_eq!(SortMode::from_setting(Some("true")), SortMode::Ascending);
        assert_eq!(SortMode::from_setting(Some("natural")), SortMode::Natural);
        assert_eq!(SortMode::from_setting(Some("false")), SortMode::Disabled);
        assert_eq!(SortMode::from_setting(None), SortMode::Disabled);
    }

    #[test]
    fn natural_cmp_handles_leading_zeros() {
        assert_eq!(natural_cmp("port02", "port2"), "port02".cmp("port2"));
        assert_eq!(natural_cmp("port9", "port010"), Ordering::Less);
        assert_eq!(natural_cmp("a", "a1"), Ordering::Less);
    }
}
