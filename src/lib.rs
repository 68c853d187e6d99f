//! One-shot Redis INFO collector: connect, read `INFO`, map a fixed set of
//! fields into a nested report and print it as JSON (or Prometheus text).
//! Meant to be run by cron / a Kubernetes CronJob.

pub mod appconfig;
pub mod cli;
pub mod collector;
pub mod error;
pub mod logging;
pub mod prometheus;
pub mod redis;
pub mod report;
pub mod reporter;
