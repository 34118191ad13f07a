//! Declarative record filtering

use botmetrics_records::LogRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Selector value meaning "no filter"
pub const ALL: &str = "Все";

/// Conjunction of optional predicates over [`LogRecord`]s
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Inclusive lower bound on the record date
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the record date
    pub date_to: Option<NaiveDate>,
    pub category: Option<String>,
    /// Only applied while `category` is the study category
    pub subcategory: Option<String>,
    pub campus: Option<String>,
    pub education_level: Option<String>,
    /// Restrict to satisfied (`true`) or unsatisfied (`false`) interactions
    pub satisfied: Option<bool>,
}

impl FilterSpec {
    /// Records matching every set predicate, in input order
    pub fn apply<'a>(&self, records: &'a [LogRecord], study_category: &str) -> Vec<&'a LogRecord> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Vec::new();
            }
        }

        let category = selected(&self.category);
        let subcategory = match category {
            Some(c) if c == study_category => selected(&self.subcategory),
            _ => None,
        };
        let campus = selected(&self.campus);
        let education_level = selected(&self.education_level);

        records
            .iter()
            .filter(|r| {
                let date = r.timestamp.date();
                if self.date_from.is_some_and(|from| date < from) {
                    return false;
                }
                if self.date_to.is_some_and(|to| date > to) {
                    return false;
                }
                if category.is_some_and(|c| r.category != c) {
                    return false;
                }
                if subcategory.is_some_and(|s| r.subcategory != s) {
                    return false;
                }
                if campus.is_some_and(|c| r.campus != c) {
                    return false;
                }
                if education_level.is_some_and(|e| r.education_level != e) {
                    return false;
                }
                if self.satisfied.is_some_and(|s| r.satisfaction != s) {
                    return false;
                }
                true
            })
            .collect()
    }
}

/// Unset, blank and "Все" all mean no constraint
fn selected(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != ALL)
}
