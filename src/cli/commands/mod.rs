pub mod report;

pub use report::{ReportOptions, resolve_config, run};
