//! Canonical interaction record types

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an interaction was unsatisfactory, or `Success`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCategory {
    Success,
    IncorrectAnswer,
    Hallucination,
    SystemNotResponding,
    OutOfScope,
    InappropriateQuestion,
    OtherError,
    /// Tag supplied by the log that matches no known category
    Custom(String),
}

impl ErrorCategory {
    /// Stable snake_case identifier used in logs and exports
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCategory::Success => "success",
            ErrorCategory::IncorrectAnswer => "incorrect_answer",
            ErrorCategory::Hallucination => "hallucination",
            ErrorCategory::SystemNotResponding => "system_not_responding",
            ErrorCategory::OutOfScope => "out_of_scope",
            ErrorCategory::InappropriateQuestion => "inappropriate_question",
            ErrorCategory::OtherError => "other_error",
            ErrorCategory::Custom(tag) => tag,
        }
    }

    /// Human-readable label for reports
    pub fn label(&self) -> &str {
        match self {
            ErrorCategory::Success => "Успешно",
            ErrorCategory::IncorrectAnswer => "Некорректный ответ",
            ErrorCategory::Hallucination => "Галлюцинация",
            ErrorCategory::SystemNotResponding => "Система не отвечает",
            ErrorCategory::OutOfScope => "Вопрос не относится к ВШЭ",
            ErrorCategory::InappropriateQuestion => "Неуместный вопрос",
            ErrorCategory::OtherError => "Другие ошибки",
            ErrorCategory::Custom(tag) => tag,
        }
    }

    /// Resolve a known identifier; unknown names are kept verbatim as `Custom`
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "success" => ErrorCategory::Success,
            "incorrect_answer" => ErrorCategory::IncorrectAnswer,
            "hallucination" => ErrorCategory::Hallucination,
            "system_not_responding" => ErrorCategory::SystemNotResponding,
            "out_of_scope" => ErrorCategory::OutOfScope,
            "inappropriate_question" => ErrorCategory::InappropriateQuestion,
            "other_error" => ErrorCategory::OtherError,
            other => ErrorCategory::Custom(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ErrorCategory::Success)
    }
}

impl From<String> for ErrorCategory {
    fn from(tag: String) -> Self {
        ErrorCategory::from_tag(&tag)
    }
}

impl From<ErrorCategory> for String {
    fn from(category: ErrorCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized, fully classified chat-bot interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub question_time: Option<NaiveTime>,
    #[serde(default)]
    pub answer_time: Option<NaiveTime>,
    pub query: String,
    pub response: String,
    #[serde(with = "satisfaction_flag")]
    pub satisfaction: bool,
    pub category: String,
    pub subcategory: String,
    pub campus: String,
    pub education_level: String,
    pub name: String,
    pub error_category: ErrorCategory,
    /// Seconds between question and answer; `None` when either time is unknown
    #[serde(default)]
    pub response_time: Option<u32>,
}

/// Satisfaction is stored as 0/1 in the record store
mod satisfaction_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        Ok(raw == 1)
    }
}
