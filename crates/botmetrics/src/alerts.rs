//! Threshold alerts over summary metrics

use botmetrics_core::Summary;
use serde::Serialize;

/// Upper limits in percent; exceeding one raises an alert
#[derive(Debug, Clone, Copy)]
pub struct AlertThresholds {
    pub error_rate: f64,
    pub incorrect_answer_share: f64,
    pub hallucination_share: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            error_rate: 30.0,
            incorrect_answer_share: 30.0,
            hallucination_share: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub metric: &'static str,
    pub value: f64,
    pub threshold: f64,
    pub message: &'static str,
}

impl AlertThresholds {
    pub fn evaluate(&self, summary: &Summary) -> Vec<Alert> {
        let checks = [
            (
                "error_rate",
                summary.error_rate,
                self.error_rate,
                "Высокий уровень ошибок!",
            ),
            (
                "incorrect_answer_share",
                summary.incorrect_answer_share,
                self.incorrect_answer_share,
                "Высокий уровень некорректных ответов!",
            ),
            (
                "hallucination_share",
                summary.hallucination_share,
                self.hallucination_share,
                "Высокий уровень галлюцинаций!",
            ),
        ];

        checks
            .into_iter()
            .filter(|(_, value, threshold, _)| value > threshold)
            .map(|(metric, value, threshold, message)| Alert {
                metric,
                value,
                threshold,
                message,
            })
            .collect()
    }
}
