use crate::context::ViewContext;
use botmetrics_core::recent;
use botmetrics_records::LogRecord;

fn render_history(records: &[&LogRecord], limit: usize) -> String {
    if records.is_empty() {
        return "No records match the current filter.".to_string();
    }

    let tail = recent(records, limit);
    let mut lines = vec![
        format!("Recent Queries (last {})", tail.len()),
        "======================".to_string(),
    ];
    for record in tail {
        let status = if record.satisfaction {
            "✅ Успешно"
        } else {
            "❌ Ошибка"
        };
        lines.push(format!(
            "  {} | {} | {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            status,
            record.query
        ));
    }
    lines.join("\n")
}

pub fn run(ctx: &ViewContext, limit: usize) -> anyhow::Result<()> {
    let records = ctx.records()?;
    let selected = ctx.select(&records);
    println!("{}", render_history(&selected, limit));
    Ok(())
}
