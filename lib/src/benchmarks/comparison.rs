use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::benchmarks::{BenchmarkDocument, Results};

/// A chart label for a test. Names with a parenthesized qualifier are split
/// so the qualifier renders on its own line.
///
/// ```rust
/// use sitetags::benchmarks::Label;
///
/// assert_eq!(Label::new("Filter (FM)"), Label::Split("Filter".into(), "(FM)".into()));
/// assert_eq!(Label::new("Filter"), Label::Single("Filter".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Label {
    Single(String),
    Split(String, String),
}

impl Label {
    pub fn new(name: &str) -> Label {
        match name.split_once(" (") {
            Some((head, qualifier)) => Label::Split(head.into(), format!("({qualifier}")),
            None => Label::Single(name.into()),
        }
    }
}

/// A test present in both documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub name: String,
    pub label: Label,
    /// Candidate throughput as a percentage of reference throughput.
    pub ratio: f64,
    pub candidate: Results,
    pub reference: Results,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Comparison {
    /// Rows by descending ratio. Ties keep the candidate document's order.
    pub rows: Vec<ComparisonRow>,
    /// Tests present in both documents whose reference throughput is zero,
    /// negative, or not a number, in candidate document order.
    pub skipped: Vec<String>,
}

/// Joins `candidate` and `reference` by test name and computes each common
/// test's throughput ratio. Tests missing from either side are left out.
pub fn compare(candidate: &BenchmarkDocument, reference: &BenchmarkDocument) -> Comparison {
    let by_name: FxHashMap<&str, &Results> = reference.results().into_iter().collect();

    let mut comparison = Comparison::default();
    for (name, candidate) in candidate.results() {
        let Some(&reference) = by_name.get(name) else {
            continue;
        };

        if !(reference.samples_per_second > 0.0) {
            comparison.skipped.push(name.to_string());
            continue;
        }

        comparison.rows.push(ComparisonRow {
            name: name.to_string(),
            label: Label::new(name),
            ratio: 100.0 * candidate.samples_per_second / reference.samples_per_second,
            candidate: *candidate,
            reference: *reference,
        });
    }

    // No ratio is NaN: JSON has no NaN and unusable references were skipped.
    comparison.rows.sort_by(|a, b| b.ratio.partial_cmp(&a.ratio).unwrap_or(Ordering::Equal));
    comparison
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(entries: &[(&str, f64)]) -> BenchmarkDocument {
        let benchmarks: Vec<_> = entries.iter()
            .map(|(name, sps)| serde_json::json!({
                "name": name,
                "results": { "samples_per_second": sps, "samples_per_second_stdev": sps / 100.0 }
            }))
            .collect();

        let json = serde_json::json!({
            "version": "1.0",
            "platform": { "cpu_count": 1, "cpu_model": "ARM", "arch": "arm", "os": "Linux", "features": {} },
            "benchmarks": benchmarks,
        }).to_string();
        BenchmarkDocument::parse("test.json", &json).unwrap()
    }

    #[test]
    fn single_common_test() {
        let reference = document(&[("A", 1000.0)]);
        let candidate = document(&[("A", 2000.0)]);
        let comparison = compare(&candidate, &reference);

        assert_eq!(comparison.rows.len(), 1);
        assert_eq!(comparison.rows[0].ratio, 200.0);
        assert_eq!(comparison.rows[0].candidate.samples_per_second_stdev, 20.0);
        assert_eq!(comparison.rows[0].reference.samples_per_second_stdev, 10.0);
        assert!(comparison.skipped.is_empty());
    }

    #[test]
    fn labels_are_the_name_intersection() {
        let reference = document(&[("A", 1.0), ("B", 1.0), ("C", 1.0), ("R only", 1.0)]);
        let candidate = document(&[("C only", 1.0), ("C", 3.0), ("A", 1.0), ("B", 2.0)]);
        let comparison = compare(&candidate, &reference);

        let mut names: Vec<_> = comparison.rows.iter().map(|r| r.name.as_str()).collect();
        names.sort();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn sorted_descending_and_stable() {
        let reference = document(&[("a", 100.0), ("b", 100.0), ("c", 100.0), ("d", 100.0), ("e", 100.0)]);
        let candidate = document(&[("a", 50.0), ("b", 150.0), ("c", 50.0), ("d", 400.0), ("e", 150.0)]);
        let comparison = compare(&candidate, &reference);

        let order: Vec<_> = comparison.rows.iter().map(|r| (r.name.as_str(), r.ratio)).collect();
        assert_eq!(order, [("d", 400.0), ("b", 150.0), ("e", 150.0), ("a", 50.0), ("c", 50.0)]);
        assert!(comparison.rows.windows(2).all(|w| w[0].ratio >= w[1].ratio));
    }

    #[test]
    fn signed_zero_ratios_tie() {
        let reference = document(&[("A", 10.0), ("B", 10.0)]);
        let candidate = document(&[("A", -0.0), ("B", 0.0)]);
        let comparison = compare(&candidate, &reference);

        let order: Vec<_> = comparison.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, ["A", "B"]);
    }

    #[test]
    fn unusable_reference_rows_are_skipped() {
        let reference = document(&[("zero", 0.0), ("ok", 10.0), ("negative", -5.0)]);
        let candidate = document(&[("negative", 1.0), ("ok", 5.0), ("zero", 1.0)]);
        let comparison = compare(&candidate, &reference);

        assert_eq!(comparison.rows.len(), 1);
        assert_eq!(comparison.rows[0].name, "ok");
        assert_eq!(comparison.rows[0].ratio, 50.0);
        assert_eq!(comparison.skipped, ["negative", "zero"]);
    }

    #[test]
    fn ratios_are_non_negative_for_non_negative_inputs() {
        let reference = document(&[("a", 3.0), ("b", 7.5), ("c", 1e9)]);
        let candidate = document(&[("a", 0.0), ("b", 7.5), ("c", 1.0)]);
        let comparison = compare(&candidate, &reference);
        assert!(comparison.rows.iter().all(|r| r.ratio >= 0.0));
        assert_eq!(comparison.rows.last().unwrap().ratio, 0.0);
    }

    #[test]
    fn labels_split_on_first_qualifier() {
        assert_eq!(Label::new("Decoder (QPSK)"), Label::Split("Decoder".into(), "(QPSK)".into()));
        assert_eq!(Label::new("A (B) (C)"), Label::Split("A".into(), "(B) (C)".into()));
        assert_eq!(Label::new("NoSpace(x)"), Label::Single("NoSpace(x)".into()));

        let split = serde_json::to_string(&Label::new("Filter (FM)")).unwrap();
        assert_eq!(split, r#"["Filter","(FM)"]"#);
        assert_eq!(serde_json::to_string(&Label::new("Filter")).unwrap(), r#""Filter""#);
    }
}
