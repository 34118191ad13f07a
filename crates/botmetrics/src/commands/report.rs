use crate::alerts::{Alert, AlertThresholds};
use crate::context::ViewContext;
use botmetrics_core::{
    aggregate, error_heatmap, hourly_highlights, summarize, text_stats, AggregateRow, Dimension,
    HeatCell, HourlyHighlights, Summary, TextStats,
};
use botmetrics_records::LogRecord;
use serde::Serialize;

pub fn run(ctx: &ViewContext, by: Dimension, json: bool, detailed: bool) -> anyhow::Result<()> {
    let records = ctx.records()?;
    let selected = ctx.select(&records);
    let report = Report::build(&selected, by, detailed, &AlertThresholds::default());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct Detail {
    hourly: Option<HourlyHighlights>,
    heatmap: Vec<HeatCell>,
    text: TextStats,
}

#[derive(Debug, Serialize)]
struct Report {
    dimension: Dimension,
    summary: Summary,
    groups: Vec<AggregateRow>,
    alerts: Vec<Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Detail>,
}

impl Report {
    fn build(
        records: &[&LogRecord],
        dimension: Dimension,
        detailed: bool,
        thresholds: &AlertThresholds,
    ) -> Self {
        let summary = summarize(records);
        let alerts = thresholds.evaluate(&summary);
        let detail = detailed.then(|| Detail {
            hourly: hourly_highlights(records),
            heatmap: error_heatmap(records),
            text: text_stats(records),
        });

        Self {
            dimension,
            groups: aggregate(records, dimension),
            summary,
            alerts,
            detail,
        }
    }

    fn render(&self) -> String {
        if self.summary.total == 0 {
            return "No records match the current filter.".to_string();
        }

        let s = &self.summary;
        let mut sections = vec![format!(
            "Summary\n=======\n\
             Total requests: {}\n\
             Success rate: {:.1}%\n\
             Errors: {} ({:.1}%)\n\
             Incorrect answers: {:.1}% of errors\n\
             Hallucinations: {:.1}% of errors\n\
             Satisfied / unsatisfied: {} / {}\n\
             Avg response time: {}",
            s.total,
            s.success_rate,
            s.unsatisfied,
            s.error_rate,
            s.incorrect_answer_share,
            s.hallucination_share,
            s.satisfied,
            s.unsatisfied,
            format_seconds(s.avg_response_time),
        )];

        if !self.alerts.is_empty() {
            let lines: Vec<String> = self
                .alerts
                .iter()
                .map(|a| format!("  ! {} {:.1}% > {:.0}%", a.message, a.value, a.threshold))
                .collect();
            sections.push(format!("\nAlerts\n------\n{}", lines.join("\n")));
        }

        sections.push(format!(
            "\nBy {}\n{}\n{}",
            self.dimension,
            "-".repeat(3 + self.dimension.as_str().len()),
            render_groups(&self.groups)
        ));

        if let Some(detail) = &self.detail {
            sections.push(render_detail(detail));
        }

        sections.join("\n")
    }
}

fn render_groups(groups: &[AggregateRow]) -> String {
    let width = groups
        .iter()
        .map(|g| g.group_key.chars().count())
        .max()
        .unwrap_or(0)
        .max(5);

    let mut lines = vec![format!(
        "  {:<width$}  {:>6}  {:>7}  {:>7}  {:>8}  {:>6}",
        "group", "count", "success", "errors", "avg time", "share"
    )];
    for g in groups {
        lines.push(format!(
            "  {:<width$}  {:>6}  {:>6.1}%  {:>6.1}%  {:>8}  {:>5.1}%",
            g.group_key,
            g.count,
            g.success_rate,
            g.error_rate,
            format_seconds(g.avg_response_time),
            g.percentage
        ));
    }
    lines.join("\n")
}

fn render_detail(detail: &Detail) -> String {
    let mut out = String::from("\nDetail\n------");

    if let Some(hourly) = &detail.hourly {
        out.push_str(&format!(
            "\nPeak hour: {:02}:00 ({} requests, {:.1}% success)\
             \nBest hour: {:02}:00 ({} requests, {:.1}% success)",
            hourly.peak.hour,
            hourly.peak.requests,
            hourly.peak.success_rate,
            hourly.best.hour,
            hourly.best.requests,
            hourly.best.success_rate
        ));
    }

    if !detail.heatmap.is_empty() {
        out.push_str("\nErrors by date and hour:");
        for cell in &detail.heatmap {
            out.push_str(&format!(
                "\n  {} {:02}:00  {}",
                cell.date, cell.hour, cell.errors
            ));
        }
    }

    let text = &detail.text;
    out.push_str(&format!(
        "\nQuery length: mean {:.0}, median {:.0} chars\
         \nResponse length: mean {:.0}, median {:.0} chars",
        text.mean_query_len, text.median_query_len, text.mean_response_len, text.median_response_len
    ));
    if text.excluded > 0 {
        out.push_str(&format!(
            "\n{} records with an empty query or response left out",
            text.excluded
        ));
    }
    out
}

fn format_seconds(value: Option<f64>) -> String {
    match value {
        Some(seconds) => format!("{:.1}s", seconds),
        None => "n/a".to_string(),
    }
}
