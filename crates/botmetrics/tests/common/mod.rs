#![allow(dead_code)]

use botmetrics_core::Normalizer;
use botmetrics_records::LogRecord;

pub fn pipe_line(timestamp: &str, response: &str, satisfied: bool) -> String {
    format!(
        "{} | query: вопрос | response: {} | satisfaction: {}",
        timestamp,
        response,
        u8::from(satisfied)
    )
}

/// Ten interactions on one day, seven of them satisfied
pub fn ten_records() -> Vec<LogRecord> {
    let normalizer = Normalizer::default();
    (0..10)
        .map(|i| {
            let line = pipe_line(&format!("2025-06-02 {:02}:00:00", 8 + i), "ответ", i < 7);
            normalizer.parse_line(i + 1, &line).unwrap()
        })
        .collect()
}

/// A pipe log of `total` lines where every line listed in `garbage` is unparsable
pub fn pipe_log(total: usize, garbage: &[usize]) -> String {
    (0..total)
        .map(|i| {
            if garbage.contains(&i) {
                "garbage text".to_string()
            } else {
                pipe_line(
                    &format!("2025-06-{:02} {:02}:{:02}:00", 1 + i % 28, i % 24, i % 60),
                    "ответ",
                    i % 3 != 0,
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub const TABLE_HEADER: &str = "Дата,Время вопроса,Время ответа,Имя,Кампус,Уровень образования,Категория,Подкатегория,Запрос,Ответ,Доволен";
