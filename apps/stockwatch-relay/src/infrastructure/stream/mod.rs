//! Change Stream Codec
//!
//! Decodes change-stream batches (DynamoDB Streams JSON) into
//! [`ChangeRecord`](crate::domain::change_record::ChangeRecord)s, and
//! encodes typed attribute values for store writes.

mod attribute;
mod codec;

pub use attribute::WireAttributeValue;
pub use codec::{StreamBatch, StreamChange, StreamDecodeError, StreamRecord, decode_batch};
