//! Turns sparse per-date snapshot records into dense, key-aligned series.
//!
//! Every function here is pure. Inputs are expected in ascending date order;
//! nothing here sorts, and shares are not checked to sum to 100.

use anyhow::anyhow;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::str::FromStr;

/// Opaque identifier of an asset (coin, fund, account) inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Percentage of the record's total, 0..=100.
    pub value_share: f64,
    #[serde(default)]
    pub value_absolute: f64,
}

/// A point-in-time record of portfolio value and its split across assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub date: NaiveDate,
    pub total_value: f64,
    #[serde(default)]
    pub allocations: BTreeMap<AssetId, Allocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeriesPoint {
    pub date: NaiveDate,
    /// Holds an entry for every key of the owning [`AlignedSeries`].
    pub values: BTreeMap<AssetId, f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedSeries {
    pub points: Vec<AlignedSeriesPoint>,
    pub keys: BTreeSet<AssetId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledValuePoint {
    pub date: NaiveDate,
    pub converted_value: f64,
}

/// Aligns allocation shares so every point carries every asset seen in `records`.
pub fn align_allocation_series(records: &[SnapshotRecord]) -> AlignedSeries {
    align_with(records, |allocation| allocation.value_share)
}

/// Same alignment over absolute holding values (balances rather than shares).
pub fn align_holding_series(records: &[SnapshotRecord]) -> AlignedSeries {
    align_with(records, |allocation| allocation.value_absolute)
}

fn align_with(records: &[SnapshotRecord], select: impl Fn(&Allocation) -> f64) -> AlignedSeries {
    let mut keys = BTreeSet::new();
    for record in records {
        keys.extend(record.allocations.keys().cloned());
    }

    let points = records
        .iter()
        .map(|record| AlignedSeriesPoint {
            date: record.date,
            values: keys
                .iter()
                .map(|key| {
                    let value = record.allocations.get(key).map_or(0.0, &select);
                    (key.clone(), value)
                })
                .collect(),
        })
        .collect();

    AlignedSeries { points, keys }
}

/// Converts each record's total with `exchange_rate`, which must be positive.
pub fn scale_value_series(records: &[SnapshotRecord], exchange_rate: f64) -> Vec<ScaledValuePoint> {
    records
        .iter()
        .map(|record| ScaledValuePoint {
            date: record.date,
            converted_value: record.total_value * exchange_rate,
        })
        .collect()
}

/// Percentage change from the first to the last point.
///
/// `None` with fewer than two points or a zero starting value.
pub fn percent_change(series: &[ScaledValuePoint]) -> Option<f64> {
    let (first, last) = (series.first()?, series.last()?);
    if series.len() < 2 || first.converted_value == 0.0 {
        return None;
    }
    Some((last.converted_value - first.converted_value) * 100.0 / first.converted_value.abs())
}

/// Chart window selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateRange {
    SevenDays,
    #[default]
    ThirtyDays,
    SixtyDays,
    OneYear,
    All,
}

impl DateRange {
    fn days(&self) -> Option<u64> {
        match self {
            DateRange::SevenDays => Some(7),
            DateRange::ThirtyDays => Some(30),
            DateRange::SixtyDays => Some(60),
            DateRange::OneYear => Some(365),
            DateRange::All => None,
        }
    }

    /// Earliest date kept by this range, or `None` when nothing is cut.
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.days()
            .and_then(|days| today.checked_sub_days(Days::new(days)))
    }

    /// Drops records dated strictly before the cutoff, keeping input order.
    pub fn filter(&self, records: &[SnapshotRecord], today: NaiveDate) -> Vec<SnapshotRecord> {
        let cutoff = self.cutoff(today);
        records
            .iter()
            .filter(|record| cutoff.is_none_or(|cutoff| record.date >= cutoff))
            .cloned()
            .collect()
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DateRange::SevenDays => "7d",
                DateRange::ThirtyDays => "30d",
                DateRange::SixtyDays => "60d",
                DateRange::OneYear => "1y",
                DateRange::All => "all",
            }
        )
    }
}

impl FromStr for DateRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "7d" => Ok(DateRange::SevenDays),
            "30d" => Ok(DateRange::ThirtyDays),
            "60d" => Ok(DateRange::SixtyDays),
            "1y" => Ok(DateRange::OneYear),
            "all" => Ok(DateRange::All),
            _ => Err(anyhow!("Invalid date range: {s} (expected 7d, 30d, 60d, 1y or all)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(day: &str, total: f64, allocations: &[(&str, f64, f64)]) -> SnapshotRecord {
        SnapshotRecord {
            date: date(day),
            total_value: total,
            allocations: allocations
                .iter()
                .map(|(id, share, absolute)| {
                    (
                        AssetId::from(*id),
                        Allocation {
                            value_share: *share,
                            value_absolute: *absolute,
                        },
                    )
                })
                .collect(),
        }
    }

    fn sample() -> Vec<SnapshotRecord> {
        vec![
            record("2026-01-01", 1000.0, &[("btc", 60.0, 600.0), ("eth", 40.0, 400.0)]),
            record("2026-01-02", 1200.0, &[("btc", 50.0, 600.0), ("sol", 50.0, 600.0)]),
            record("2026-01-03", 900.0, &[]),
        ]
    }

    #[test]
    fn test_align_fills_missing_keys_with_zero() {
        let aligned = align_allocation_series(&sample());

        let keys: Vec<_> = aligned.keys.iter().map(AssetId::as_str).collect();
        assert_eq!(keys, vec!["btc", "eth", "sol"]);
        assert_eq!(aligned.points.len(), 3);

        let first = &aligned.points[0].values;
        assert_eq!(first[&AssetId::from("btc")], 60.0);
        assert_eq!(first[&AssetId::from("eth")], 40.0);
        assert_eq!(first[&AssetId::from("sol")], 0.0);

        let second = &aligned.points[1].values;
        assert_eq!(second[&AssetId::from("eth")], 0.0);
        assert_eq!(second[&AssetId::from("sol")], 50.0);

        let empty = &aligned.points[2].values;
        assert_eq!(empty.len(), 3);
        assert!(empty.values().all(|v| *v == 0.0));
    }

    #[test]
    fn test_align_preserves_input_order() {
        let mut records = sample();
        records.reverse();

        let aligned = align_allocation_series(&records);
        let dates: Vec<_> = aligned.points.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![date("2026-01-03"), date("2026-01-02"), date("2026-01-01")]
        );
    }

    #[test]
    fn test_align_is_idempotent() {
        let aligned = align_allocation_series(&sample());

        let reapplied: Vec<SnapshotRecord> = aligned
            .points
            .iter()
            .map(|point| SnapshotRecord {
                date: point.date,
                total_value: 0.0,
                allocations: point
                    .values
                    .iter()
                    .map(|(k, v)| {
                        (
                            k.clone(),
                            Allocation {
                                value_share: *v,
                                value_absolute: 0.0,
                            },
                        )
                    })
                    .collect(),
            })
            .collect();

        assert_eq!(align_allocation_series(&reapplied), aligned);
    }

    #[test]
    fn test_align_holding_series_uses_absolute_values() {
        let aligned = align_holding_series(&sample());

        assert_eq!(aligned.points[1].values[&AssetId::from("sol")], 600.0);
        assert_eq!(aligned.points[1].values[&AssetId::from("eth")], 0.0);
    }

    #[test]
    fn test_empty_inputs_give_empty_outputs() {
        let aligned = align_allocation_series(&[]);
        assert!(aligned.points.is_empty());
        assert!(aligned.keys.is_empty());

        assert!(scale_value_series(&[], 83.0).is_empty());
    }

    #[test]
    fn test_scale_value_series() {
        let scaled = scale_value_series(&sample(), 2.5);

        assert_eq!(
            scaled,
            vec![
                ScaledValuePoint {
                    date: date("2026-01-01"),
                    converted_value: 2500.0
                },
                ScaledValuePoint {
                    date: date("2026-01-02"),
                    converted_value: 3000.0
                },
                ScaledValuePoint {
                    date: date("2026-01-03"),
                    converted_value: 2250.0
                },
            ]
        );
    }

    #[test]
    fn test_percent_change() {
        let scaled = scale_value_series(&sample(), 1.0);
        assert_eq!(percent_change(&scaled), Some(-10.0));
        assert_eq!(percent_change(&scaled[..1]), None);
        assert_eq!(percent_change(&[]), None);

        let from_zero = scale_value_series(
            &[record("2026-01-01", 0.0, &[]), record("2026-01-02", 5.0, &[])],
            1.0,
        );
        assert_eq!(percent_change(&from_zero), None);
    }

    #[test]
    fn test_range_filter_windows() {
        let today = date("2026-10-19");
        let days_ago = |n: u64| today.checked_sub_days(Days::new(n)).unwrap();
        let records: Vec<_> = [90, 10, 1, 0]
            .into_iter()
            .map(|n| SnapshotRecord {
                date: days_ago(n),
                total_value: n as f64,
                allocations: BTreeMap::new(),
            })
            .collect();

        let kept = |range: DateRange| -> Vec<NaiveDate> {
            range.filter(&records, today).iter().map(|r| r.date).collect()
        };

        assert_eq!(kept(DateRange::SevenDays), vec![days_ago(1), today]);
        assert_eq!(
            kept(DateRange::ThirtyDays),
            vec![days_ago(10), days_ago(1), today]
        );
        assert_eq!(
            kept(DateRange::SixtyDays),
            vec![days_ago(10), days_ago(1), today]
        );
        assert_eq!(
            kept(DateRange::OneYear),
            vec![days_ago(90), days_ago(10), days_ago(1), today]
        );
        assert_eq!(kept(DateRange::All).len(), 4);
    }

    #[test]
    fn test_range_cutoff_is_inclusive() {
        let today = date("2026-10-19");
        let records = vec![record("2026-10-12", 1.0, &[]), record("2026-10-11", 2.0, &[])];

        assert_eq!(DateRange::SevenDays.cutoff(today), Some(date("2026-10-12")));
        let kept = DateRange::SevenDays.filter(&records, today);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].date, date("2026-10-12"));
        assert_eq!(DateRange::All.cutoff(today), None);
    }

    #[test]
    fn test_filter_to_nothing_then_aggregate() {
        let today = date("2026-10-19");
        let kept = DateRange::SevenDays.filter(&sample(), today);

        assert!(kept.is_empty());
        assert!(align_allocation_series(&kept).points.is_empty());
        assert!(scale_value_series(&kept, 83.0).is_empty());
    }

    #[test]
    fn test_date_range_parsing() {
        for tag in ["7d", "30d", "60d", "1y", "all"] {
            let range: DateRange = tag.parse().unwrap();
            assert_eq!(range.to_string(), tag);
        }
        assert_eq!("ALL".parse::<DateRange>().unwrap(), DateRange::All);
        assert!("2w".parse::<DateRange>().is_err());
    }

    #[test]
    fn test_snapshot_record_deserialization() {
        let yaml = r#"
- date: 2026-01-01
  total_value: 1500.0
  allocations:
    bitcoin:
      value_share: 70.0
      value_absolute: 1050.0
    ethereum:
      value_share: 30.0
- date: 2026-01-02
  total_value: 0.0
"#;
        let records: Vec<SnapshotRecord> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].allocations[&AssetId::from("bitcoin")].value_absolute, 1050.0);
        assert_eq!(records[0].allocations[&AssetId::from("ethereum")].value_absolute, 0.0);
        assert!(records[1].allocations.is_empty());
    }
}
