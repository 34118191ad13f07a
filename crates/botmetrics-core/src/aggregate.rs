//! Grouped metrics over filtered records
//!
//! Group percentages follow a fixed rounding policy: every group but the last
//! is rounded to one decimal, the last gets `100 - sum(previous)`, so the
//! displayed shares always add up to 100.

use botmetrics_records::LogRecord;
use chrono::{Datelike, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Attribute records are grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Hour,
    Date,
    Week,
    Month,
    Category,
    Subcategory,
    Campus,
    EducationLevel,
    ErrorCategory,
}

impl Dimension {
    pub const ALL: [Dimension; 9] = [
        Dimension::Hour,
        Dimension::Date,
        Dimension::Week,
        Dimension::Month,
        Dimension::Category,
        Dimension::Subcategory,
        Dimension::Campus,
        Dimension::EducationLevel,
        Dimension::ErrorCategory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Hour => "hour",
            Dimension::Date => "date",
            Dimension::Week => "week",
            Dimension::Month => "month",
            Dimension::Category => "category",
            Dimension::Subcategory => "subcategory",
            Dimension::Campus => "campus",
            Dimension::EducationLevel => "education_level",
            Dimension::ErrorCategory => "error_category",
        }
    }

    /// Group key of a record; time keys are zero-padded so they sort chronologically
    pub fn key(self, record: &LogRecord) -> String {
        let ts = record.timestamp;
        match self {
            Dimension::Hour => format!("{:02}", ts.hour()),
            Dimension::Date => ts.format("%Y-%m-%d").to_string(),
            Dimension::Week => {
                let week = ts.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Dimension::Month => ts.format("%Y-%m").to_string(),
            Dimension::Category => record.category.clone(),
            Dimension::Subcategory => record.subcategory.clone(),
            Dimension::Campus => record.campus.clone(),
            Dimension::EducationLevel => record.education_level.clone(),
            Dimension::ErrorCategory => record.error_category.as_str().to_string(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown dimension `{0}` (expected one of: hour, date, week, month, category, subcategory, campus, education_level, error_category)")]
pub struct UnknownDimension(pub String);

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Dimension::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| UnknownDimension(s.to_string()))
    }
}

/// Metrics of one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub group_key: String,
    pub count: usize,
    pub success_count: usize,
    /// Percent of the group's records that were satisfied
    pub success_rate: f64,
    pub error_rate: f64,
    /// Mean over records that have a response time; `None` if none do
    pub avg_response_time: Option<f64>,
    /// Share of all grouped records
    pub percentage: f64,
}

#[derive(Default)]
struct GroupAcc {
    count: usize,
    success: usize,
    response_sum: u64,
    response_count: usize,
}

/// Group `records` by `dimension`, in ascending key order
pub fn aggregate(records: &[&LogRecord], dimension: Dimension) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<String, GroupAcc> = BTreeMap::new();

    for record in records {
        let acc = groups.entry(dimension.key(record)).or_default();
        acc.count += 1;
        if record.satisfaction {
            acc.success += 1;
        }
        if let Some(seconds) = record.response_time {
            acc.response_sum += u64::from(seconds);
            acc.response_count += 1;
        }
    }

    let counts: Vec<usize> = groups.values().map(|g| g.count).collect();
    let percentages = distribute_percentages(&counts);

    groups
        .into_iter()
        .zip(percentages)
        .map(|((group_key, acc), percentage)| AggregateRow {
            group_key,
            count: acc.count,
            success_count: acc.success,
            success_rate: rate(acc.success, acc.count),
            error_rate: rate(acc.count - acc.success, acc.count),
            avg_response_time: mean(acc.response_sum, acc.response_count),
            percentage,
        })
        .collect()
}

/// Shares of `counts` in percent, summing to exactly 100 unless all are zero
pub fn distribute_percentages(counts: &[usize]) -> Vec<f64> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0.0; counts.len()];
    }

    let mut assigned = 0.0;
    let mut percentages = Vec::with_capacity(counts.len());
    for (i, &count) in counts.iter().enumerate() {
        if i + 1 == counts.len() {
            percentages.push(100.0 - assigned);
        } else {
            let share = round1(rate(count, total));
            assigned += share;
            percentages.push(share);
        }
    }
    percentages
}

/// Headline numbers over a record set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub satisfied: usize,
    pub unsatisfied: usize,
    pub success_rate: f64,
    pub error_rate: f64,
    /// Incorrect answers as a percent of unsatisfied interactions
    pub incorrect_answer_share: f64,
    /// Hallucinations as a percent of unsatisfied interactions
    pub hallucination_share: f64,
    pub avg_response_time: Option<f64>,
}

pub fn summarize(records: &[&LogRecord]) -> Summary {
    use botmetrics_records::ErrorCategory;

    let total = records.len();
    let satisfied = records.iter().filter(|r| r.satisfaction).count();
    let unsatisfied = total - satisfied;
    let count_of = |category: &ErrorCategory| {
        records
            .iter()
            .filter(|r| !r.satisfaction && &r.error_category == category)
            .count()
    };

    let times: Vec<u32> = records.iter().filter_map(|r| r.response_time).collect();
    let time_sum: u64 = times.iter().map(|&t| u64::from(t)).sum();

    Summary {
        total,
        satisfied,
        unsatisfied,
        success_rate: rate(satisfied, total),
        error_rate: rate(unsatisfied, total),
        incorrect_answer_share: rate(count_of(&ErrorCategory::IncorrectAnswer), unsatisfied),
        hallucination_share: rate(count_of(&ErrorCategory::Hallucination), unsatisfied),
        avg_response_time: mean(time_sum, times.len()),
    }
}

/// `100 * part / whole`, zero for an empty whole
pub(crate) fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100.0 * part as f64 / whole as f64
}

fn mean(sum: u64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum as f64 / count as f64)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use botmetrics_records::ErrorCategory;
    use chrono::NaiveDate;

    fn record(day: u32, hour: u32, category: &str, ok: bool, rt: Option<u32>) -> LogRecord {
        LogRecord {
            timestamp: NaiveDate::from_ymd_opt(2025, 6, day)
                .unwrap()
                .and_hms_opt(hour, 30, 0)
                .unwrap(),
            question_time: None,
            answer_time: None,
            query: "q".to_string(),
            response: "r".to_string(),
            satisfaction: ok,
            category: category.to_string(),
            subcategory: "Не указано".to_string(),
            campus: "Москва".to_string(),
            education_level: "Бакалавриат".to_string(),
            name: "Не указано".to_string(),
            error_category: if ok {
                ErrorCategory::Success
            } else {
                ErrorCategory::Hallucination
            },
            response_time: rt,
        }
    }

    fn refs(records: &[LogRecord]) -> Vec<&LogRecord> {
        records.iter().collect()
    }

    #[test]
    fn test_success_rate_seven_of_ten() {
        let records: Vec<LogRecord> = (0..10)
            .map(|i| record(2, 9, "Учеба", i < 7, None))
            .collect();
        let rows = aggregate(&refs(&records), Dimension::Category);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].success_rate, 70.0);
        assert!((rows[0].error_rate - 30.0).abs() < 1e-9);
        assert_eq!(rows[0].percentage, 100.0);
    }

    #[test]
    fn test_thirds_sum_to_hundred() {
        let records = vec![
            record(1, 9, "A", true, None),
            record(1, 9, "B", true, None),
            record(1, 9, "C", true, None),
        ];
        let rows = aggregate(&refs(&records), Dimension::Category);
        let percentages: Vec<f64> = rows.iter().map(|r| r.percentage).collect();
        assert_eq!(percentages[0], 33.3);
        assert_eq!(percentages[1], 33.3);
        assert!((percentages[2] - 33.4).abs() < 1e-9);
        assert!((percentages.iter().sum::<f64>() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentages_sum_for_every_dimension() {
        let records: Vec<LogRecord> = (0..37)
            .map(|i| {
                let category = ["Учеба", "Общежитие", "Стипендия"][i % 3];
                record(1 + (i as u32 % 28), (i as u32 * 7) % 24, category, i % 4 != 0, None)
            })
            .collect();
        for dimension in Dimension::ALL {
            let rows = aggregate(&refs(&records), dimension);
            let sum: f64 = rows.iter().map(|r| r.percentage).sum();
            assert!((sum - 100.0).abs() < 1e-9, "{dimension}: {sum}");
            assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), 37);
        }
    }

    #[test]
    fn test_avg_response_time_skips_unknown() {
        let records = vec![
            record(1, 9, "A", true, Some(4)),
            record(1, 9, "A", false, None),
            record(1, 9, "A", true, Some(0)),
            record(1, 10, "B", true, None),
        ];
        let rows = aggregate(&refs(&records), Dimension::Category);
        assert_eq!(rows[0].avg_response_time, Some(2.0));
        assert_eq!(rows[1].avg_response_time, None);
    }

    #[test]
    fn test_time_keys_sorted() {
        let records = vec![
            record(3, 14, "A", true, None),
            record(1, 9, "A", true, None),
            record(2, 23, "A", true, None),
        ];
        let hours: Vec<String> = aggregate(&refs(&records), Dimension::Hour)
            .into_iter()
            .map(|r| r.group_key)
            .collect();
        assert_eq!(hours, vec!["09", "14", "23"]);

        let dates: Vec<String> = aggregate(&refs(&records), Dimension::Date)
            .into_iter()
            .map(|r| r.group_key)
            .collect();
        assert_eq!(dates, vec!["2025-06-01", "2025-06-02", "2025-06-03"]);
    }

    #[test]
    fn test_week_and_month_keys() {
        let r = record(2, 9, "A", true, None);
        assert_eq!(Dimension::Week.key(&r), "2025-W23");
        assert_eq!(Dimension::Month.key(&r), "2025-06");
        assert_eq!(Dimension::ErrorCategory.key(&r), "success");
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[], Dimension::Hour).is_empty());
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[test]
    fn test_distribute_all_zero() {
        assert_eq!(distribute_percentages(&[0, 0]), vec![0.0, 0.0]);
        assert!(distribute_percentages(&[]).is_empty());
    }

    #[test]
    fn test_dimension_from_str() {
        assert_eq!("hour".parse::<Dimension>(), Ok(Dimension::Hour));
        assert_eq!(
            "Education-Level".parse::<Dimension>(),
            Ok(Dimension::EducationLevel)
        );
        assert!("weekday".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_summary_shares_of_errors() {
        let mut records: Vec<LogRecord> = (0..6).map(|_| record(1, 9, "A", true, None)).collect();
        records.push(record(1, 9, "A", false, Some(10)));
        let mut incorrect = record(1, 9, "A", false, Some(20));
        incorrect.error_category = ErrorCategory::IncorrectAnswer;
        records.push(incorrect);
        let mut other = record(1, 9, "A", false, None);
        other.error_category = ErrorCategory::OtherError;
        records.push(other);
        records.push(record(1, 9, "A", false, None));

        let summary = summarize(&refs(&records));
        assert_eq!(summary.total, 10);
        assert_eq!(summary.unsatisfied, 4);
        assert_eq!(summary.success_rate, 60.0);
        assert_eq!(summary.error_rate, 40.0);
        assert_eq!(summary.incorrect_answer_share, 25.0);
        assert_eq!(summary.hallucination_share, 50.0);
        assert_eq!(summary.avg_response_time, Some(15.0));
    }
}
