use crate::context::ViewContext;
use anyhow::Context;
use botmetrics_records::LogRecord;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 13] = [
    "timestamp",
    "query",
    "response",
    "satisfaction",
    "category",
    "subcategory",
    "campus",
    "education_level",
    "error_category",
    "response_time",
    "name",
    "question_time",
    "answer_time",
];

fn write_records<W: Write>(out: W, records: &[&LogRecord]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;

    for r in records {
        let time = |t: Option<chrono::NaiveTime>| {
            t.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_default()
        };
        writer.write_record([
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.query.clone(),
            r.response.clone(),
            if r.satisfaction { "1" } else { "0" }.to_string(),
            r.category.clone(),
            r.subcategory.clone(),
            r.campus.clone(),
            r.education_level.clone(),
            r.error_category.as_str().to_string(),
            r.response_time.map(|s| s.to_string()).unwrap_or_default(),
            r.name.clone(),
            time(r.question_time),
            time(r.answer_time),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn run(ctx: &ViewContext, output: &str) -> anyhow::Result<()> {
    let records = ctx.records()?;
    let selected = ctx.select(&records);
    let path = Path::new(output);

    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_records(file, &selected).with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(output = %path.display(), rows = selected.len(), "export finished");
    println!("Exported {} records to {}", selected.len(), path.display());
    Ok(())
}
