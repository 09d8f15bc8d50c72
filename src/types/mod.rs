pub mod error;
pub mod label;
pub mod record;

pub use error::{PulseError, RejectReason, Result, ResultExt, Stage};
pub use label::{Classification, Fallback, Sentiment, Topic};
pub use record::{ClassifiedRecord, NormalizedRecord, RawRecord, UNSPECIFIED_DEPARTMENT};
