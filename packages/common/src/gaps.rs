//! Protocol-number sequence-gap detection.
//!
//! The caja dashboard audits whether any filing numbers were skipped: all
//! known protocol codes are grouped by prefix and each group's observed
//! sequence range is checked for missing integers. This is a pure view over
//! the current document rows — nothing here is persisted.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::protocol::split_protocol;

/// A closed interval of missing sequence numbers inside a group.
///
/// A run of exactly one missing value is reported as `{from}` with `to`
/// omitted; a run of two or more as `{from, to}`. This is the canonical
/// wire form the gap dialog consumes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MissingRange {
    /// First missing sequence number of the run.
    pub from: u64,
    /// Last missing sequence number, present only for runs of length >= 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<u64>,
}

impl MissingRange {
    fn new(from: u64, to: u64) -> Self {
        Self {
            from,
            to: (to > from).then_some(to),
        }
    }

    /// Number of missing integers covered by this run.
    pub fn count(&self) -> u64 {
        self.to.map_or(1, |to| to - self.from + 1)
    }
}

/// Per-prefix gap report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SequenceGroup {
    /// The shared non-numeric (or mixed) prefix of the group's codes.
    pub prefix: String,
    /// Smallest observed sequence number.
    pub min_seq: u64,
    /// Largest observed sequence number.
    pub max_seq: u64,
    /// Count of *distinct* sequence numbers observed (duplicates collapse).
    pub document_count: u64,
    /// Total count of missing integers across all ranges.
    pub missing_count: u64,
    /// Ordered runs of missing sequence numbers between min and max.
    pub missing_ranges: Vec<MissingRange>,
}

/// Aggregate over all groups of one analysis pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    /// Number of distinct prefixes that contributed at least one valid code.
    pub groups: u64,
    /// Sum of `document_count` over all groups.
    pub total_documents: u64,
    /// Sum of `missing_count` over all groups.
    pub total_missing: u64,
    /// Codes with no trailing digit run (or an unparseable one). Counted,
    /// never grouped and never dropped silently.
    pub invalid_codes: u64,
}

/// Full result of a gap analysis: the shape serialized to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GapAnalysis {
    pub summary: AnalysisSummary,
    pub groups: Vec<SequenceGroup>,
}

/// Analyze a collection of raw protocol-number strings.
///
/// Total and side-effect free: any input, including an empty one, yields a
/// well-formed result. Groups are ordered lexicographically by prefix so the
/// output is deterministic regardless of input order.
pub fn analyze<I, S>(codes: I) -> GapAnalysis
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut by_prefix: BTreeMap<String, BTreeSet<u64>> = BTreeMap::new();
    let mut invalid_codes = 0u64;

    for code in codes {
        match split_protocol(code.as_ref()) {
            Some((prefix, seq)) => {
                by_prefix.entry(prefix.to_string()).or_default().insert(seq);
            }
            None => invalid_codes += 1,
        }
    }

    let groups: Vec<SequenceGroup> = by_prefix
        .into_iter()
        .filter_map(|(prefix, seqs)| build_group(prefix, &seqs))
        .collect();

    let summary = AnalysisSummary {
        groups: groups.len() as u64,
        total_documents: groups.iter().map(|g| g.document_count).sum(),
        total_missing: groups.iter().map(|g| g.missing_count).sum(),
        invalid_codes,
    };

    GapAnalysis { summary, groups }
}

fn build_group(prefix: String, seqs: &BTreeSet<u64>) -> Option<SequenceGroup> {
    // A prefix only becomes a group once a valid code contributed a
    // sequence number, so the set is never empty here.
    let mut iter = seqs.iter().copied();
    let min_seq = iter.next()?;

    let mut max_seq = min_seq;
    let mut missing_ranges = Vec::new();
    let mut missing_count = 0u64;

    for seq in iter {
        if seq > max_seq + 1 {
            missing_ranges.push(MissingRange::new(max_seq + 1, seq - 1));
            missing_count += seq - 1 - max_seq;
        }
        max_seq = seq;
    }

    Some(SequenceGroup {
        prefix,
        min_seq,
        max_seq,
        document_count: seqs.len() as u64,
        missing_count,
        missing_ranges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn example_end_to_end() {
        let result = analyze(["A001", "A003", "A004", "B010"]);

        assert_eq!(
            result.summary,
            AnalysisSummary {
                groups: 2,
                total_documents: 4,
                total_missing: 1,
                invalid_codes: 0,
            }
        );

        let a = &result.groups[0];
        assert_eq!(a.prefix, "A");
        assert_eq!((a.min_seq, a.max_seq), (1, 4));
        assert_eq!(a.document_count, 3);
        assert_eq!(a.missing_count, 1);
        assert_eq!(a.missing_ranges, vec![MissingRange { from: 2, to: None }]);

        let b = &result.groups[1];
        assert_eq!(b.prefix, "B");
        assert_eq!((b.min_seq, b.max_seq), (10, 10));
        assert_eq!(b.missing_count, 0);
        assert!(b.missing_ranges.is_empty());
    }

    #[test]
    fn code_without_trailing_digits_is_counted_invalid() {
        let result = analyze(["X"]);
        assert_eq!(
            result.summary,
            AnalysisSummary {
                groups: 0,
                total_documents: 0,
                total_missing: 0,
                invalid_codes: 1,
            }
        );
        assert!(result.groups.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let result = analyze(Vec::<String>::new());
        assert_eq!(result.summary.groups, 0);
        assert_eq!(result.summary.invalid_codes, 0);
        assert!(result.groups.is_empty());
    }

    #[test]
    fn duplicates_collapse_to_one_document() {
        let result = analyze(["A005", "A005", "A0005"]);
        let group = &result.groups[0];
        assert_eq!(group.document_count, 1);
        assert_eq!((group.min_seq, group.max_seq), (5, 5));
        assert_eq!(group.missing_count, 0);
        assert_eq!(result.summary.total_documents, 1);
    }

    #[test]
    fn output_is_independent_of_input_order() {
        let forward = analyze(["A001", "B010", "A003", "C07", "A004"]);
        let backward = analyze(["A004", "C07", "A003", "B010", "A001"]);
        assert_eq!(forward, backward);

        let prefixes: Vec<&str> = forward.groups.iter().map(|g| g.prefix.as_str()).collect();
        assert_eq!(prefixes, ["A", "B", "C"]);
    }

    #[test]
    fn runs_of_two_or_more_get_a_to_bound() {
        let result = analyze(["P001", "P005", "P006", "P009"]);
        let group = &result.groups[0];
        assert_eq!(
            group.missing_ranges,
            vec![
                MissingRange {
                    from: 2,
                    to: Some(4)
                },
                MissingRange {
                    from: 7,
                    to: Some(8)
                },
            ]
        );
        assert_eq!(group.missing_count, 5);
    }

    #[test]
    fn observed_and_missing_partition_the_full_interval() {
        let codes = ["Q03", "Q08", "Q09", "Q15", "Q21"];
        let result = analyze(codes);
        let group = &result.groups[0];

        let observed: std::collections::BTreeSet<u64> = codes
            .iter()
            .map(|c| crate::protocol::split_protocol(c).unwrap().1)
            .collect();
        let mut missing = std::collections::BTreeSet::new();
        for range in &group.missing_ranges {
            for n in range.from..=range.to.unwrap_or(range.from) {
                missing.insert(n);
            }
        }

        assert!(observed.is_disjoint(&missing));
        let union: Vec<u64> = observed.union(&missing).copied().collect();
        let full: Vec<u64> = (group.min_seq..=group.max_seq).collect();
        assert_eq!(union, full);
        assert_eq!(group.missing_count, missing.len() as u64);
    }

    #[test]
    fn single_document_group_has_no_gaps() {
        let result = analyze(["Z042"]);
        let group = &result.groups[0];
        assert_eq!(group.min_seq, group.max_seq);
        assert_eq!(group.missing_count, 0);
        assert!(group.missing_ranges.is_empty());
    }

    #[test]
    fn mixed_valid_and_invalid_codes() {
        let result = analyze(["A001", "NOPE", "A002", "-", ""]);
        assert_eq!(result.summary.invalid_codes, 3);
        assert_eq!(result.summary.groups, 1);
        assert_eq!(result.groups[0].document_count, 2);
    }

    #[test]
    fn wire_shape_omits_to_for_single_runs() {
        let result = analyze(["A001", "A003", "A007"]);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(
            value["groups"][0]["missingRanges"],
            json!([{"from": 2}, {"from": 4, "to": 6}])
        );
        assert_eq!(
            value["summary"],
            json!({
                "groups": 1,
                "totalDocuments": 3,
                "totalMissing": 4,
                "invalidCodes": 0
            })
        );
        assert_eq!(value["groups"][0]["minSeq"], json!(1));
        assert_eq!(value["groups"][0]["maxSeq"], json!(7));
    }

    #[test]
    fn missing_range_count() {
        assert_eq!(MissingRange { from: 2, to: None }.count(), 1);
        assert_eq!(
            MissingRange {
                from: 2,
                to: Some(6)
            }
            .count(),
            5
        );
    }
}
