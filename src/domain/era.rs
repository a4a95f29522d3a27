//! Fixed historical eras and partitioning of the dataset across them.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::domain::error::ConfigError;
use crate::domain::ohlcv::Record;

/// A named date interval with inclusive bounds. `None` leaves that side open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Era {
    pub label: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Era {
    pub fn new(label: impl Into<String>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }

    fn overlaps(&self, other: &Era) -> bool {
        // Two intervals overlap unless one ends before the other starts.
        let self_before = matches!((self.end, other.start), (Some(e), Some(s)) if e < s);
        let other_before = matches!((other.end, self.start), (Some(e), Some(s)) if e < s);
        !self_before && !other_before
    }
}

/// An ordered set of eras that is guaranteed pairwise disjoint.
///
/// Records are never double-counted across eras built through this type.
/// Gaps between eras are allowed; records in a gap belong to no era.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraSet {
    eras: Vec<Era>,
}

impl EraSet {
    pub fn new(eras: Vec<Era>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for era in &eras {
            if let (Some(s), Some(e)) = (era.start, era.end) {
                if s > e {
                    return Err(ConfigError::InvertedEra {
                        label: era.label.clone(),
                    });
                }
            }
            if !seen.insert(era.label.as_str()) {
                return Err(ConfigError::DuplicateEraLabel(era.label.clone()));
            }
        }

        for (i, a) in eras.iter().enumerate() {
            for b in &eras[i + 1..] {
                if a.overlaps(b) {
                    return Err(ConfigError::OverlappingEras {
                        first: a.label.clone(),
                        second: b.label.clone(),
                    });
                }
            }
        }

        Ok(Self { eras })
    }

    pub fn eras(&self) -> &[Era] {
        &self.eras
    }

    pub fn labels(&self) -> Vec<String> {
        self.eras.iter().map(|e| e.label.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.eras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eras.is_empty()
    }
}

impl Default for EraSet {
    /// 1970-1989, 1990-1999 and 2000 onward.
    fn default() -> Self {
        let ymd = NaiveDate::from_ymd_opt;
        Self {
            eras: vec![
                Era::new("1970-1989", ymd(1970, 1, 1), ymd(1989, 12, 31)),
                Era::new("1990-1999", ymd(1990, 1, 1), ymd(1999, 12, 31)),
                Era::new("2000-present", ymd(2000, 1, 1), None),
            ],
        }
    }
}

/// The records of one era, borrowed from the dataset.
#[derive(Debug, Clone)]
pub struct EraSubset<'a> {
    pub era: &'a Era,
    pub records: Vec<&'a Record>,
}

impl EraSubset<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per-era subsets in era order.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    pub subsets: Vec<EraSubset<'a>>,
}

impl<'a> Partition<'a> {
    pub fn get(&self, label: &str) -> Option<&EraSubset<'a>> {
        self.subsets.iter().find(|s| s.era.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EraSubset<'a>> {
        self.subsets.iter()
    }
}

pub fn partition<'a>(records: &'a [Record], eras: &'a EraSet) -> Partition<'a> {
    let subsets = eras
        .eras()
        .iter()
        .map(|era| EraSubset {
            era,
            records: records.iter().filter(|r| era.contains(r.date)).collect(),
        })
        .collect();
    Partition { subsets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(d: NaiveDate, volume: u64) -> Record {
        Record {
            date: d,
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume,
        }
    }

    #[test]
    fn contains_respects_inclusive_and_open_bounds() {
        let closed = Era::new("a", Some(date(1990, 1, 1)), Some(date(1999, 12, 31)));
        assert!(closed.contains(date(1990, 1, 1)));
        assert!(closed.contains(date(1999, 12, 31)));
        assert!(!closed.contains(date(1989, 12, 31)));
        assert!(!closed.contains(date(2000, 1, 1)));

        let open_end = Era::new("b", Some(date(2000, 1, 1)), None);
        assert!(open_end.contains(date(2999, 1, 1)));

        let open_start = Era::new("c", None, Some(date(1969, 12, 31)));
        assert!(open_start.contains(date(1900, 1, 1)));
        assert!(!open_start.contains(date(1970, 1, 1)));
    }

    #[test]
    fn default_eras_are_valid() {
        let eras = EraSet::default();
        assert_eq!(EraSet::new(eras.eras().to_vec()), Ok(eras.clone()));
        assert_eq!(eras.labels(), vec!["1970-1989", "1990-1999", "2000-present"]);
    }

    #[test]
    fn rejects_overlapping_eras() {
        let err = EraSet::new(vec![
            Era::new("a", Some(date(1970, 1, 1)), Some(date(1990, 6, 30))),
            Era::new("b", Some(date(1990, 1, 1)), None),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::OverlappingEras {
                first: "a".into(),
                second: "b".into()
            }
        );
    }

    #[test]
    fn rejects_two_open_ended_eras() {
        let err = EraSet::new(vec![
            Era::new("a", Some(date(1970, 1, 1)), None),
            Era::new("b", Some(date(2000, 1, 1)), None),
        ]);
        assert!(matches!(err, Err(ConfigError::OverlappingEras { .. })));
    }

    #[test]
    fn rejects_inverted_and_duplicate_eras() {
        let err = EraSet::new(vec![Era::new(
            "a",
            Some(date(2000, 1, 1)),
            Some(date(1990, 1, 1)),
        )]);
        assert!(matches!(err, Err(ConfigError::InvertedEra { .. })));

        let err = EraSet::new(vec![
            Era::new("a", Some(date(1970, 1, 1)), Some(date(1979, 12, 31))),
            Era::new("a", Some(date(1980, 1, 1)), Some(date(1989, 12, 31))),
        ]);
        assert_eq!(err, Err(ConfigError::DuplicateEraLabel("a".into())));
    }

    #[test]
    fn gaps_between_eras_are_allowed() {
        let eras = EraSet::new(vec![
            Era::new("a", Some(date(1970, 1, 1)), Some(date(1979, 12, 31))),
            Era::new("b", Some(date(1990, 1, 1)), Some(date(1999, 12, 31))),
        ])
        .unwrap();
        let records = vec![record(date(1985, 1, 1), 1)];
        let p = partition(&records, &eras);
        assert!(p.iter().all(|s| s.is_empty()));
    }

    #[test]
    fn three_record_scenario_yields_one_per_era() {
        let records = vec![
            record(date(1985, 6, 1), 10),
            record(date(1995, 3, 1), 20),
            record(date(2005, 12, 1), 30),
        ];
        let eras = EraSet::default();
        let p = partition(&records, &eras);

        assert_eq!(p.subsets.len(), 3);
        assert_eq!(p.get("1970-1989").unwrap().records[0].volume, 10);
        assert_eq!(p.get("1990-1999").unwrap().records[0].volume, 20);
        assert_eq!(p.get("2000-present").unwrap().records[0].volume, 30);
        assert!(p.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn records_before_first_era_are_excluded() {
        let records = vec![record(date(1962, 1, 2), 5), record(date(1971, 1, 4), 6)];
        let eras = EraSet::default();
        let p = partition(&records, &eras);
        let total: usize = p.iter().map(|s| s.len()).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn empty_era_gives_empty_subset() {
        let records = vec![record(date(1995, 3, 1), 20)];
        let eras = EraSet::default();
        let p = partition(&records, &eras);
        assert!(p.get("1970-1989").unwrap().is_empty());
        assert!(p.get("missing").is_none());
    }

    proptest! {
        #[test]
        fn default_eras_cover_post_1970_records_exactly_once(
            days in proptest::collection::vec(0i64..30_000, 1..200)
        ) {
            let base = date(1970, 1, 1);
            let records: Vec<Record> = days
                .iter()
                .map(|&d| record(base + chrono::Duration::days(d), d as u64))
                .collect();
            let eras = EraSet::default();
            let p = partition(&records, &eras);

            for r in &records {
                let hits = p
                    .iter()
                    .filter(|s| s.records.iter().any(|x| std::ptr::eq(*x, r)))
                    .count();
                prop_assert_eq!(hits, 1);
            }

            let mut rejoined: Vec<&Record> =
                p.iter().flat_map(|s| s.records.iter().copied()).collect();
            rejoined.sort_by_key(|r| (r.date, r.volume));
            let mut expected: Vec<&Record> = records.iter().collect();
            expected.sort_by_key(|r| (r.date, r.volume));
            prop_assert_eq!(rejoined, expected);
        }
    }
}
