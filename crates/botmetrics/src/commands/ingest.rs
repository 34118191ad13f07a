use crate::context::ViewContext;
use anyhow::Context;
use botmetrics_core::{IngestReport, Ingestor, InputFormat};
use botmetrics_records::{append_jsonl_batch, write_jsonl, LogRecord};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn run(ctx: &ViewContext, file: &str, format: Option<InputFormat>, replace: bool) -> anyhow::Result<()> {
    let source = Path::new(file);
    let report = ingest_file(ctx, source, format, replace)?;

    for failure in &report.failures {
        println!("  {}", failure);
    }
    if report.failed > report.failures.len() {
        println!("  ... and {} more", report.failed - report.failures.len());
    }
    println!("{}", report.summary());
    Ok(())
}

fn ingest_file(
    ctx: &ViewContext,
    source: &Path,
    format: Option<InputFormat>,
    replace: bool,
) -> anyhow::Result<IngestReport> {
    let input =
        File::open(source).with_context(|| format!("failed to open {}", source.display()))?;
    let format = format.unwrap_or_else(|| InputFormat::detect(source));
    let store = ctx.paths.records_file();

    // A replacing run writes aside and only swaps in once the source was read
    let target = if replace {
        let staging = store.with_extension("jsonl.tmp");
        write_jsonl::<LogRecord>(&staging, &[])?;
        staging
    } else {
        store.clone()
    };

    let ingestor = Ingestor::new(&ctx.config);
    let sink = |batch: &[LogRecord]| append_jsonl_batch(&target, batch);
    let result = match format {
        InputFormat::Pipe => ingestor.ingest_lines(BufReader::new(input), sink),
        InputFormat::Csv => ingestor.ingest_csv(input, sink),
    };

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            if replace {
                let _ = std::fs::remove_file(&target);
            }
            return Err(err).with_context(|| format!("failed to ingest {}", source.display()));
        }
    };

    if replace {
        std::fs::rename(&target, &store)
            .with_context(|| format!("failed to replace {}", store.display()))?;
        tracing::info!(store = %store.display(), "replaced record store");
    }

    tracing::info!(
        source = %source.display(),
        succeeded = report.succeeded,
        failed = report.failed,
        "ingestion finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use botmetrics_core::FilterSpec;

    fn context(home: &Path) -> ViewContext {
        ViewContext::load(home.to_str(), FilterSpec::default()).unwrap()
    }

    #[test]
    fn test_ingest_pipe_log_into_store() {
        let temp = tempfile::TempDir::new().unwrap();
        let log = temp.path().join("chatbot.log");
        std::fs::write(
            &log,
            "2025-06-02 09:00:00 | query: a | response: b | satisfaction: 1\n\
             garbage text\n\
             2025-06-02 09:05:00 | query: c | response: Система не отвечает | satisfaction: 0\n",
        )
        .unwrap();

        let ctx = context(&temp.path().join("home"));
        let report = ingest_file(&ctx, &log, None, false).unwrap();
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(ctx.records().unwrap().len(), 2);
    }

    #[test]
    fn test_replace_clears_previous_records() {
        let temp = tempfile::TempDir::new().unwrap();
        let log = temp.path().join("chatbot.log");
        std::fs::write(
            &log,
            "2025-06-02 09:00:00 | query: a | response: b | satisfaction: 1\n",
        )
        .unwrap();

        let ctx = context(&temp.path().join("home"));
        ingest_file(&ctx, &log, None, false).unwrap();
        ingest_file(&ctx, &log, None, false).unwrap();
        assert_eq!(ctx.records().unwrap().len(), 2);

        ingest_file(&ctx, &log, Some(InputFormat::Pipe), true).unwrap();
        assert_eq!(ctx.records().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_replace_keeps_previous_records() {
        let temp = tempfile::TempDir::new().unwrap();
        let log = temp.path().join("chatbot.log");
        std::fs::write(
            &log,
            "2025-06-02 09:00:00 | query: a | response: b | satisfaction: 1\n",
        )
        .unwrap();

        let ctx = context(&temp.path().join("home"));
        ingest_file(&ctx, &log, None, false).unwrap();

        // A directory opens but cannot be read
        let unreadable = temp.path().join("logs");
        std::fs::create_dir(&unreadable).unwrap();
        let result = ingest_file(&ctx, &unreadable, Some(InputFormat::Pipe), true);

        assert!(result.is_err());
        assert_eq!(ctx.records().unwrap().len(), 1);
        assert!(!ctx.paths.records_file().with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let temp = tempfile::TempDir::new().unwrap();
        let ctx = context(temp.path());
        let result = ingest_file(&ctx, &temp.path().join("absent.log"), None, false);
        assert!(result.is_err());
    }
}
