mod log;
mod record;

pub use log::{SessionEntry, SessionLog};
pub use record::{check_timestamp_format, SessionRecord, DEFAULT_TIMESTAMP_FORMAT};
