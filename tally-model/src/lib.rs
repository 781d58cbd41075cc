//! Core data model definitions shared across Tally crates.

pub mod media_type;
pub mod record;
pub mod request_id;

pub use media_type::{MediaType, UnknownMediaType};
pub use record::{LedgerRecord, TitleMeta};
pub use request_id::{ID_DELIMITER, RequestId};
