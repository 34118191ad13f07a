use crate::context::ViewContext;
use botmetrics_core::{
    aggregate, error_type_breakdown, summarize, AggregateRow, Classifier, Dimension,
    ErrorTypeShare,
};
use botmetrics_records::LogRecord;
use serde::Serialize;

pub fn run(ctx: &ViewContext, json: bool) -> anyhow::Result<()> {
    let records = ctx.records()?;
    let all = ctx.select(&records);
    let errors = ctx.errors_only().select(&records);
    let classifier = Classifier::new(&ctx.config.institution_marker);

    let analysis = ErrorAnalysis::build(&all, &errors, &ctx.config.study_category, &classifier);
    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("{}", analysis.render());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ErrorAnalysis {
    total_requests: usize,
    total_errors: usize,
    error_rate: f64,
    by_category: Vec<AggregateRow>,
    by_study_subcategory: Vec<AggregateRow>,
    by_type: Vec<ErrorTypeShare>,
}

impl ErrorAnalysis {
    fn build(
        all: &[&LogRecord],
        errors: &[&LogRecord],
        study_category: &str,
        classifier: &Classifier,
    ) -> Self {
        let study_errors: Vec<&LogRecord> = errors
            .iter()
            .copied()
            .filter(|r| r.category == study_category)
            .collect();

        let summary = summarize(all);

        Self {
            total_requests: summary.total,
            total_errors: errors.len(),
            error_rate: summary.error_rate,
            by_category: aggregate(errors, Dimension::Category),
            by_study_subcategory: aggregate(&study_errors, Dimension::Subcategory),
            by_type: error_type_breakdown(errors, classifier),
        }
    }

    fn render(&self) -> String {
        let mut sections = vec![format!(
            "Error Analysis\n==============\n\
             Unsatisfied responses: {}\n\
             Share of requests: {:.1}%\n\
             Total requests: {}",
            self.total_errors, self.error_rate, self.total_requests
        )];

        if self.total_errors == 0 {
            return sections.join("\n");
        }

        sections.push(format!(
            "\nBy category\n-----------\n{}",
            render_counts(&self.by_category)
        ));
        if !self.by_study_subcategory.is_empty() {
            sections.push(format!(
                "\nStudy subcategories\n-------------------\n{}",
                render_counts(&self.by_study_subcategory)
            ));
        }

        let types: Vec<String> = self
            .by_type
            .iter()
            .map(|t| format!("  {}: {} ({:.1}%)", t.error_type.label(), t.count, t.percentage))
            .collect();
        sections.push(format!("\nBy type\n-------\n{}", types.join("\n")));

        sections.join("\n")
    }
}

fn render_counts(rows: &[AggregateRow]) -> String {
    let mut sorted: Vec<&AggregateRow> = rows.iter().collect();
    sorted.sort_by_key(|r| std::cmp::Reverse(r.count));
    sorted
        .iter()
        .map(|r| format!("  {}: {} ({:.1}%)", r.group_key, r.count, r.percentage))
        .collect::<Vec<_>>()
        .join("\n")
}
