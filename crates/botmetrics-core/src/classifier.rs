//! Ordered keyword classification of unsatisfied interactions

use botmetrics_records::ErrorCategory;

const SYSTEM_NOT_RESPONDING: &str = "система не отвечает";
const INAPPROPRIATE: &str = "неуместно";

/// Maps an interaction outcome to an [`ErrorCategory`].
///
/// Rules are evaluated top to bottom and the first match wins:
/// satisfied, explicit tag, "система не отвечает", institution marker,
/// "неуместно", then `OtherError`.
#[derive(Debug, Clone)]
pub struct Classifier {
    keyword_rules: Vec<(String, ErrorCategory)>,
}

impl Classifier {
    pub fn new(institution_marker: &str) -> Self {
        let keyword_rules = vec![
            (SYSTEM_NOT_RESPONDING.to_string(), ErrorCategory::SystemNotResponding),
            (institution_marker.to_lowercase(), ErrorCategory::OutOfScope),
            (INAPPROPRIATE.to_string(), ErrorCategory::InappropriateQuestion),
        ];
        Self { keyword_rules }
    }

    pub fn classify(&self, satisfied: bool, response: &str, tag: Option<&str>) -> ErrorCategory {
        if satisfied {
            return ErrorCategory::Success;
        }

        if let Some(tag) = tag.map(str::trim).filter(|t| !t.is_empty()) {
            let tagged = ErrorCategory::from_tag(tag);
            // An unsatisfied interaction can't be tagged into success
            if !tagged.is_success() {
                return tagged;
            }
        }

        self.classify_response(response)
    }

    /// Keyword rules only, ignoring satisfaction and tags
    pub fn classify_response(&self, response: &str) -> ErrorCategory {
        let response = response.to_lowercase();
        self.keyword_rules
            .iter()
            .filter(|(keyword, _)| !keyword.is_empty())
            .find(|(keyword, _)| response.contains(keyword.as_str()))
            .map(|(_, category)| category.clone())
            .unwrap_or(ErrorCategory::OtherError)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&crate::Config::new().institution_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfied_overrides_tag_and_keywords() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify(true, "Система не отвечает", Some("hallucination")),
            ErrorCategory::Success
        );
    }

    #[test]
    fn test_tag_beats_keywords() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify(false, "система не отвечает", Some("hallucination")),
            ErrorCategory::Hallucination
        );
        assert_eq!(
            classifier.classify(false, "", Some("timeout")),
            ErrorCategory::Custom("timeout".to_string())
        );
    }

    #[test]
    fn test_blank_tag_ignored() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify(false, "Это неуместно", Some("  ")),
            ErrorCategory::InappropriateQuestion
        );
    }

    #[test]
    fn test_success_tag_on_failure_ignored() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify(false, "ответ", Some("success")),
            ErrorCategory::OtherError
        );
    }

    #[test]
    fn test_keyword_case_insensitive() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify(false, "Вопрос НЕ ОТНОСИТСЯ К ВШЭ", None),
            ErrorCategory::OutOfScope
        );
    }

    #[test]
    fn test_rule_order_on_multiple_matches() {
        let classifier = Classifier::default();
        // Matches all three keywords; the system rule comes first
        let text = "Система не отвечает: вопрос не относится к ВШЭ и неуместно";
        assert_eq!(
            classifier.classify(false, text, None),
            ErrorCategory::SystemNotResponding
        );
        // Institution marker precedes the inappropriate rule
        assert_eq!(
            classifier.classify(false, "неуместно, не относится к вшэ", None),
            ErrorCategory::OutOfScope
        );
    }

    #[test]
    fn test_custom_institution_marker() {
        let classifier = Classifier::new("Не относится к МГУ");
        assert_eq!(
            classifier.classify(false, "не относится к мгу", None),
            ErrorCategory::OutOfScope
        );
        assert_eq!(
            classifier.classify(false, "не относится к вшэ", None),
            ErrorCategory::OtherError
        );
    }

    #[test]
    fn test_fallback_other_error() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify(false, "Не знаю", None),
            ErrorCategory::OtherError
        );
    }
}
