pub mod exposition;

pub use exposition::ReportGauges;
