//! Score extraction and top-student ranking.

use crate::dataset::{Dataset, StudentRecord};
use std::cmp::Ordering;

/// Default leaderboard length.
pub const DEFAULT_TOP_N: usize = 10;

/// A record with its exam number and parsed score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub exam_number: String,
    pub record: StudentRecord,
    pub score: f64,
}

/// Numeric score from a "score/maximum" total string.
///
/// Takes the part before the first `/`, trims it, and reads the longest
/// leading decimal number. Missing, unparsable, or non-finite values give 0.
///
/// ```
/// use exam_results::ranking::extract_total_value;
/// assert_eq!(extract_total_value(Some("450/500")), 450.0);
/// assert_eq!(extract_total_value(Some("abc/500")), 0.0);
/// assert_eq!(extract_total_value(None), 0.0);
/// ```
pub fn extract_total_value(total: Option<&str>) -> f64 {
    let total = match total {
        Some(t) if !t.is_empty() => t,
        _ => return 0.0,
    };
    let score = total.split('/').next().unwrap_or("").trim();
    match parse_float_prefix(score) {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Longest prefix of `s` that reads as a decimal number, e.g. "12.5kg" -> 12.5.
fn parse_float_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut i = 0;

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    if s[i..].starts_with("Infinity") {
        return Some(if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        i = j;
    }
    if digits == 0 {
        return None;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    s[..i].parse().ok()
}

/// Top `limit` entries by descending score. Ties keep dataset order.
pub fn rank(dataset: &Dataset, limit: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = dataset
        .iter()
        .map(|(exam_number, record)| RankedEntry {
            exam_number: exam_number.to_string(),
            record: record.clone(),
            score: extract_total_value(Some(&record.total)),
        })
        .collect();

    // sort_by is stable
    entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: &[(&str, &str, &str)]) -> Dataset {
        Dataset::from_entries(rows.iter().map(|(exam, name, total)| {
            (
                exam.to_string(),
                StudentRecord {
                    name: name.to_string(),
                    total: total.to_string(),
                    ..Default::default()
                },
            )
        }))
    }

    #[test]
    fn test_extract_total_value() {
        assert_eq!(extract_total_value(Some("450/500")), 450.0);
        assert_eq!(extract_total_value(Some("")), 0.0);
        assert_eq!(extract_total_value(None), 0.0);
        assert_eq!(extract_total_value(Some("abc/500")), 0.0);
        assert_eq!(extract_total_value(Some(" 398.5 / 500")), 398.5);
        assert_eq!(extract_total_value(Some("410")), 410.0);
        assert_eq!(extract_total_value(Some("12abc/500")), 12.0);
        assert_eq!(extract_total_value(Some("1e2/500")), 100.0);
        assert_eq!(extract_total_value(Some("5e/500")), 5.0);
        assert_eq!(extract_total_value(Some(".5/1")), 0.5);
        assert_eq!(extract_total_value(Some("-20/500")), -20.0);
        assert_eq!(extract_total_value(Some("Infinity/500")), 0.0);
        assert_eq!(extract_total_value(Some("1e999/500")), 0.0);
        assert_eq!(extract_total_value(Some("/500")), 0.0);
    }

    #[test]
    fn test_rank_orders_by_score() {
        let data = dataset(&[("1001", "A", "300/500"), ("1002", "B", "450/500")]);
        let ranked = rank(&data, DEFAULT_TOP_N);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].record.name, "B");
        assert_eq!(ranked[0].exam_number, "1002");
        assert_eq!(ranked[1].record.name, "A");
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let data = dataset(&[
            ("1", "first", "400/500"),
            ("2", "second", "400/500"),
            ("3", "top", "480/500"),
            ("4", "third", "400/500"),
        ]);
        let names: Vec<String> = rank(&data, DEFAULT_TOP_N)
            .into_iter()
            .map(|e| e.record.name)
            .collect();
        assert_eq!(names, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_rank_caps_at_limit() {
        let rows: Vec<(String, String, String)> = (0..25)
            .map(|i| (format!("{}", 1000 + i), format!("S{}", i), format!("{}/500", i * 10)))
            .collect();
        let data = Dataset::from_entries(rows.iter().map(|(e, n, t)| {
            (
                e.clone(),
                StudentRecord {
                    name: n.clone(),
                    total: t.clone(),
                    ..Default::default()
                },
            )
        }));
        let ranked = rank(&data, DEFAULT_TOP_N);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].record.name, "S24");
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_rank_unparsable_scores_count_as_zero() {
        let data = dataset(&[("1", "blank", ""), ("2", "low", "1/500"), ("3", "word", "n/a")]);
        let ranked = rank(&data, DEFAULT_TOP_N);
        assert_eq!(ranked[0].record.name, "low");
        assert_eq!(ranked[1].record.name, "blank");
        assert_eq!(ranked[2].record.name, "word");
        assert_eq!(ranked[2].score, 0.0);
    }

    #[test]
    fn test_rank_empty_dataset() {
        assert!(rank(&Dataset::default(), DEFAULT_TOP_N).is_empty());
    }
}
