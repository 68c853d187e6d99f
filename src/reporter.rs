use crate::cli::OutputFormat;
use crate::error::AppResult;
use crate::prometheus::ReportGauges;
use crate::report::MetricsReport;
use serde::Serialize;
use std::io::{self, Stdout, Write};

/// Top-level record: `{"metrics": {...}}`.
#[derive(Serialize)]
struct Envelope<'a> {
    metrics: &'a MetricsReport,
}

/// Writes the report to its sink (stdout in production) and logs a summary.
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl Reporter<Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn emit(&mut self, report: &MetricsReport) -> AppResult<()> {
        let envelope = Envelope { metrics: report };

        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &envelope)?;
                self.out.write_all(b"\n")?;
            }
            OutputFormat::Pretty => {
                serde_json::to_writer_pretty(&mut self.out, &envelope)?;
                self.out.write_all(b"\n")?;
            }
            OutputFormat::Prometheus => {
                let text = ReportGauges::new(report)?.encode_text()?;
                self.out.write_all(text.as_bytes())?;
            }
        }
        self.out.flush()?;

        tracing::info!(
            connected_clients = report.connections.connected_clients,
            used_memory = report.memory_usage.used_memory,
            ops_per_sec = report.performance.instantaneous_ops_per_sec,
            "redis metrics collected"
        );
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
