use crate::error::{AppError, AppResult};
use crate::report::{FIELD_MAP, MetricsReport, section};

use prometheus::{Encoder, Gauge, Opts, Registry, TextEncoder};

/// Report rendered as Prometheus gauges (for node_exporter's textfile
/// collector or a pushgateway).
///
/// One gauge per report field, named `redis_<category>_<field>`; the help
/// text names the INFO key it came from.
#[derive(Clone, Debug)]
pub struct ReportGauges {
    registry: Registry,
}

impl ReportGauges {
    pub fn new(report: &MetricsReport) -> AppResult<Self> {
        let registry = Registry::new();
        let values = serde_json::to_value(report)?;

        for (category, fields) in FIELD_MAP {
            for (field, source) in fields {
                let value = section(&values, category)[field].as_f64().ok_or_else(|| {
                    AppError::Internal(format!("{category}.{field} is not numeric"))
                })?;

                let gauge = Gauge::with_opts(Opts::new(
                    format!("redis_{category}_{field}"),
                    format!("Redis INFO {source}"),
                ))?;
                gauge.set(value);
                registry.register(Box::new(gauge))?;
            }
        }

        Ok(Self { registry })
    }

    pub fn encode_text(&self) -> AppResult<String> {
        let mf = self.registry.gather();
        let mut buf = Vec::new();
        TextEncoder::new().encode(&mf, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
