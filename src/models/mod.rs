mod batch;
mod key_record;
mod unit;

pub(crate) use batch::BatchCsvRow;
pub use batch::{BatchRecord, GenerateRequest, RunSummary};
pub use key_record::{InvalidReason, KeyRecord, Validation};
pub use unit::DurationUnit;
