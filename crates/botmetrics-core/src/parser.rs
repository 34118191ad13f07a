//! Pipe-log line and tabular row parsing
//!
//! Pipe grammar:
//! `YYYY-MM-DD HH:MM:SS | query: TEXT | response: TEXT | satisfaction: 0|1[ | ERROR_TAG]`

use crate::error::{ParseError, ParseErrorKind, RowError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

const SEPARATOR: &str = " | ";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static FIELD_RE: OnceLock<Regex> = OnceLock::new();
static LINE_RE: OnceLock<Regex> = OnceLock::new();

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"];

/// Header names of the tabular format, canonical ASCII spelling
pub const TABULAR_COLUMNS: [(&str, &str); 11] = [
    ("date", "Дата"),
    ("question_time", "Время вопроса"),
    ("answer_time", "Время ответа"),
    ("name", "Имя"),
    ("campus", "Кампус"),
    ("education_level", "Уровень образования"),
    ("category", "Категория"),
    ("subcategory", "Подкатегория"),
    ("query", "Запрос"),
    ("response", "Ответ"),
    ("satisfaction", "Доволен"),
];

/// Fields extracted from one pipe-log line
#[derive(Debug, Clone, PartialEq)]
pub struct PipeEntry {
    pub timestamp: NaiveDateTime,
    pub query: String,
    pub response: String,
    pub satisfaction: bool,
    pub error_tag: Option<String>,
}

/// One CSV row as read, before type coercion
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TabularRow {
    #[serde(alias = "Дата")]
    pub date: String,
    #[serde(alias = "Время вопроса")]
    pub question_time: String,
    #[serde(alias = "Время ответа")]
    pub answer_time: String,
    #[serde(alias = "Имя")]
    pub name: Option<String>,
    #[serde(alias = "Кампус")]
    pub campus: Option<String>,
    #[serde(alias = "Уровень образования")]
    pub education_level: Option<String>,
    #[serde(alias = "Категория")]
    pub category: Option<String>,
    #[serde(alias = "Подкатегория")]
    pub subcategory: Option<String>,
    #[serde(alias = "Запрос")]
    pub query: String,
    #[serde(alias = "Ответ")]
    pub response: String,
    #[serde(alias = "Доволен")]
    pub satisfaction: String,
}

/// Fields of one tabular row after type coercion
#[derive(Debug, Clone, PartialEq)]
pub struct TabularEntry {
    pub date: NaiveDate,
    pub question_time: NaiveTime,
    pub answer_time: NaiveTime,
    pub name: Option<String>,
    pub campus: Option<String>,
    pub education_level: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub query: String,
    pub response: String,
    pub satisfaction: bool,
}

/// A parsed input of either format, not yet normalized
#[derive(Debug, Clone, PartialEq)]
pub enum RawEntry {
    Pipe(PipeEntry),
    Tabular(TabularEntry),
}

/// Blank lines and `//` comments carry no interaction
pub fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with("//")
}

/// Parse one pipe-log line; `line_no` is only used for error reporting
pub fn parse_pipe_line(line_no: usize, line: &str) -> Result<PipeEntry, ParseError> {
    let trimmed = line.trim();
    let fail = |kind| ParseError::new(line_no, trimmed, kind);

    let segments: Vec<&str> = trimmed.split(SEPARATOR).collect();
    if segments.len() < 4 {
        return Err(fail(ParseErrorKind::SegmentCount(segments.len())));
    }

    let timestamp = NaiveDateTime::parse_from_str(segments[0].trim(), TIMESTAMP_FORMAT)
        .map_err(|_| fail(ParseErrorKind::Timestamp(segments[0].trim().to_string())))?;

    // Labels locate the fields, so texts may contain the separator themselves
    let fields = match labelled_fields(&segments[1..].join(SEPARATOR)) {
        Some(fields) => fields,
        None => positional_fields(&segments[1..]).map_err(fail)?,
    };

    let satisfaction = match fields.satisfaction.trim().trim_end_matches('|').trim_end() {
        "1" => true,
        "0" => false,
        other => return Err(fail(ParseErrorKind::Satisfaction(other.to_string()))),
    };

    let error_tag = fields
        .tag
        .map(|tag| tag.trim().trim_matches('|').trim().to_string())
        .filter(|tag| !tag.is_empty());

    Ok(PipeEntry {
        timestamp,
        query: fields.query,
        response: fields.response,
        satisfaction,
        error_tag,
    })
}

struct PipeFields {
    query: String,
    response: String,
    satisfaction: String,
    tag: Option<String>,
}

/// Fields found by their labels; query and response end at the first following label
fn labelled_fields(rest: &str) -> Option<PipeFields> {
    let re = LINE_RE.get_or_init(|| {
        Regex::new(
            r"(?s)^\s*(?i:query)\s*:\s?(?P<query>.*?) \| (?i:response)\s*:\s?(?P<response>.*?) \| (?i:satisfaction)\s*:\s?(?P<satisfaction>[^|]*)(?:\|(?P<tag>.*))?$",
        )
        .expect("static line pattern")
    });
    let caps = re.captures(rest)?;
    Some(PipeFields {
        query: caps["query"].to_string(),
        response: caps["response"].to_string(),
        satisfaction: caps["satisfaction"].to_string(),
        tag: caps.name("tag").map(|m| m.as_str().to_string()),
    })
}

/// One field per segment, reporting the first segment with a wrong label
fn positional_fields(segments: &[&str]) -> Result<PipeFields, ParseErrorKind> {
    let query = field_value(segments[0], "query").ok_or_else(|| field_kind(segments[0]))?;
    let response = field_value(segments[1], "response").ok_or_else(|| field_kind(segments[1]))?;
    let satisfaction =
        field_value(segments[2], "satisfaction").ok_or_else(|| field_kind(segments[2]))?;

    Ok(PipeFields {
        query: query.to_string(),
        response: response.to_string(),
        satisfaction: satisfaction.to_string(),
        tag: Some(segments[3..].join(SEPARATOR)),
    })
}

fn field_kind(segment: &str) -> ParseErrorKind {
    ParseErrorKind::Field(segment.trim().to_string())
}

/// Value of a `label: value` segment when the label matches
fn field_value<'a>(segment: &'a str, label: &str) -> Option<&'a str> {
    let re = FIELD_RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<label>[A-Za-z_]+)\s*:\s?(?P<value>.*)$").expect("static field pattern")
    });
    let caps = re.captures(segment)?;
    if !caps["label"].eq_ignore_ascii_case(label) {
        return None;
    }
    caps.name("value").map(|m| m.as_str())
}

/// Coerce a raw CSV row; `row_no` is only used for error reporting
pub fn parse_row(row_no: usize, row: &TabularRow) -> Result<TabularEntry, RowError> {
    let fail = |reason: String| RowError { row: row_no, reason };

    let date = parse_date(&row.date).ok_or_else(|| fail(format!("invalid date `{}`", row.date)))?;
    let question_time = parse_time(&row.question_time)
        .ok_or_else(|| fail(format!("invalid question time `{}`", row.question_time)))?;
    let answer_time = parse_time(&row.answer_time)
        .ok_or_else(|| fail(format!("invalid answer time `{}`", row.answer_time)))?;
    let satisfaction = parse_satisfaction(&row.satisfaction)
        .ok_or_else(|| fail(format!("invalid satisfaction `{}`", row.satisfaction)))?;

    Ok(TabularEntry {
        date,
        question_time,
        answer_time,
        name: row.name.clone(),
        campus: row.campus.clone(),
        education_level: row.education_level.clone(),
        category: row.category.clone(),
        subcategory: row.subcategory.clone(),
        query: row.query.clone(),
        response: row.response.clone(),
        satisfaction,
    })
}

/// Required columns absent from a header row, by canonical name
pub fn missing_columns<'a>(headers: impl IntoIterator<Item = &'a str>) -> Vec<&'static str> {
    let present: Vec<&str> = headers.into_iter().map(str::trim).collect();
    TABULAR_COLUMNS
        .iter()
        .filter(|(ascii, russian)| !present.contains(ascii) && !present.contains(russian))
        .map(|(ascii, _)| *ascii)
        .collect()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_datetime(raw).map(|dt| dt.date()))
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_datetime(raw).map(|dt| dt.time()))
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn parse_satisfaction(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "1.0" | "true" | "да" => Some(true),
        "0" | "0.0" | "false" | "нет" => Some(false),
        _ => None,
    }
}
