//! Error-type, hourly, heatmap and text-length analyses

use crate::aggregate::{distribute_percentages, rate};
use crate::classifier::Classifier;
use botmetrics_records::{ErrorCategory, LogRecord};
use chrono::{NaiveDate, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;

/// Display order of keyword-derived error types
const ERROR_TYPE_ORDER: [ErrorCategory; 4] = [
    ErrorCategory::OutOfScope,
    ErrorCategory::InappropriateQuestion,
    ErrorCategory::SystemNotResponding,
    ErrorCategory::OtherError,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorTypeShare {
    pub error_type: ErrorCategory,
    pub count: usize,
    pub percentage: f64,
}

/// Unsatisfied records split by what their response text says, ignoring tags
pub fn error_type_breakdown(records: &[&LogRecord], classifier: &Classifier) -> Vec<ErrorTypeShare> {
    let mut counts = [0usize; ERROR_TYPE_ORDER.len()];
    for record in records.iter().filter(|r| !r.satisfaction) {
        let error_type = classifier.classify_response(&record.response);
        if let Some(slot) = ERROR_TYPE_ORDER.iter().position(|t| *t == error_type) {
            counts[slot] += 1;
        }
    }

    let present: Vec<(ErrorCategory, usize)> = ERROR_TYPE_ORDER
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .collect();
    let percentages = distribute_percentages(&present.iter().map(|(_, c)| *c).collect::<Vec<_>>());

    present
        .into_iter()
        .zip(percentages)
        .map(|((error_type, count), percentage)| ErrorTypeShare {
            error_type,
            count,
            percentage,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourStat {
    pub hour: u32,
    pub requests: usize,
    pub success_rate: f64,
}

/// Busiest hour and the hour with the best success rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyHighlights {
    pub peak: HourStat,
    pub best: HourStat,
}

pub fn hourly_highlights(records: &[&LogRecord]) -> Option<HourlyHighlights> {
    let mut hours: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = hours.entry(record.timestamp.hour()).or_default();
        entry.0 += 1;
        if record.satisfaction {
            entry.1 += 1;
        }
    }

    let stats: Vec<HourStat> = hours
        .into_iter()
        .map(|(hour, (requests, success))| HourStat {
            hour,
            requests,
            success_rate: rate(success, requests),
        })
        .collect();

    // Ties go to the earliest hour
    let peak = stats
        .iter()
        .fold(None::<&HourStat>, |best, s| match best {
            Some(b) if b.requests >= s.requests => Some(b),
            _ => Some(s),
        })?
        .clone();
    let best = stats
        .iter()
        .fold(None::<&HourStat>, |best, s| match best {
            Some(b) if b.success_rate >= s.success_rate => Some(b),
            _ => Some(s),
        })?
        .clone();

    Some(HourlyHighlights { peak, best })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatCell {
    pub date: NaiveDate,
    pub hour: u32,
    pub errors: usize,
}

/// Unsatisfied interactions per (date, hour), ascending
pub fn error_heatmap(records: &[&LogRecord]) -> Vec<HeatCell> {
    let mut cells: BTreeMap<(NaiveDate, u32), usize> = BTreeMap::new();
    for record in records.iter().filter(|r| !r.satisfaction) {
        *cells
            .entry((record.timestamp.date(), record.timestamp.hour()))
            .or_default() += 1;
    }
    cells
        .into_iter()
        .map(|((date, hour), errors)| HeatCell { date, hour, errors })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextStats {
    pub mean_query_len: f64,
    pub median_query_len: f64,
    pub mean_response_len: f64,
    pub median_response_len: f64,
    /// Records with both texts non-empty
    pub analyzed: usize,
    /// Records left out for an empty query or response
    pub excluded: usize,
}

/// Length statistics in characters
pub fn text_stats(records: &[&LogRecord]) -> TextStats {
    let (mut queries, mut responses): (Vec<usize>, Vec<usize>) = records
        .iter()
        .map(|r| (r.query.chars().count(), r.response.chars().count()))
        .filter(|(q, a)| *q > 0 && *a > 0)
        .unzip();

    TextStats {
        mean_query_len: mean_len(&queries),
        median_query_len: median_len(&mut queries),
        mean_response_len: mean_len(&responses),
        median_response_len: median_len(&mut responses),
        analyzed: queries.len(),
        excluded: records.len() - queries.len(),
    }
}

/// The last `n` records in input order
pub fn recent<'a>(records: &[&'a LogRecord], n: usize) -> Vec<&'a LogRecord> {
    records[records.len().saturating_sub(n)..].to_vec()
}

fn mean_len(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<usize>() as f64 / values.len() as f64
}

fn median_len(values: &mut [usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) as f64 / 2.0
    } else {
        values[mid] as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hour: u32, ok: bool, query: &str, response: &str) -> LogRecord {
        LogRecord {
            timestamp: NaiveDate::from_ymd_opt(2025, 6, 2)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            question_time: None,
            answer_time: None,
            query: query.to_string(),
            response: response.to_string(),
            satisfaction: ok,
            category: "Другое".to_string(),
            subcategory: "Не указано".to_string(),
            campus: "Не указан".to_string(),
            education_level: "Не указан".to_string(),
            name: "Не указано".to_string(),
            error_category: if ok {
                ErrorCategory::Success
            } else {
                ErrorCategory::IncorrectAnswer
            },
            response_time: None,
        }
    }

    #[test]
    fn test_error_types_in_display_order() {
        let records = vec![
            record(9, false, "q", "Система не отвечает"),
            record(9, false, "q", "не знаю"),
            record(9, false, "q", "Вопрос не относится к ВШЭ"),
            record(9, true, "q", "Система не отвечает"),
            record(9, false, "q", "не относится к вшэ"),
        ];
        let refs: Vec<&LogRecord> = records.iter().collect();
        let shares = error_type_breakdown(&refs, &Classifier::default());

        let types: Vec<ErrorCategory> = shares.iter().map(|s| s.error_type.clone()).collect();
        assert_eq!(
            types,
            vec![
                ErrorCategory::OutOfScope,
                ErrorCategory::SystemNotResponding,
                ErrorCategory::OtherError
            ]
        );
        assert_eq!(shares[0].count, 2);
        assert_eq!(shares[0].percentage, 50.0);
        let sum: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_hourly_highlights() {
        let records = vec![
            record(9, false, "q", "r"),
            record(9, true, "q", "r"),
            record(9, false, "q", "r"),
            record(14, true, "q", "r"),
            record(16, true, "q", "r"),
        ];
        let refs: Vec<&LogRecord> = records.iter().collect();
        let highlights = hourly_highlights(&refs).unwrap();
        assert_eq!(highlights.peak.hour, 9);
        assert_eq!(highlights.peak.requests, 3);
        assert_eq!(highlights.best.hour, 14);
        assert_eq!(highlights.best.success_rate, 100.0);
    }

    #[test]
    fn test_hourly_highlights_empty() {
        assert_eq!(hourly_highlights(&[]), None);
    }

    #[test]
    fn test_heatmap_counts_errors_only() {
        let records = vec![
            record(9, false, "q", "r"),
            record(9, false, "q", "r"),
            record(9, true, "q", "r"),
            record(11, false, "q", "r"),
        ];
        let refs: Vec<&LogRecord> = records.iter().collect();
        let cells = error_heatmap(&refs);
        assert_eq!(cells.len(), 2);
        assert_eq!((cells[0].hour, cells[0].errors), (9, 2));
        assert_eq!((cells[1].hour, cells[1].errors), (11, 1));
    }

    #[test]
    fn test_text_stats_excludes_empty() {
        let records = vec![
            record(9, true, "абв", "ответ"),
            record(9, true, "a", "ab"),
            record(9, true, "abcde", "abcdefgh"),
            record(9, true, "", "ответ"),
        ];
        let refs: Vec<&LogRecord> = records.iter().collect();
        let stats = text_stats(&refs);
        assert_eq!(stats.analyzed, 3);
        assert_eq!(stats.excluded, 1);
        assert_eq!(stats.mean_query_len, 3.0);
        assert_eq!(stats.median_query_len, 3.0);
        assert_eq!(stats.median_response_len, 5.0);
    }

    #[test]
    fn test_recent_takes_tail() {
        let records: Vec<LogRecord> = (0..7).map(|h| record(h, true, "q", "r")).collect();
        let refs: Vec<&LogRecord> = records.iter().collect();
        let tail = recent(&refs, 5);
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0].timestamp.hour(), 2);
        assert_eq!(recent(&refs, 50).len(), 7);
    }
}
