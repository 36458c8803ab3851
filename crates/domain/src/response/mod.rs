//! Response-side types: status codes, raw responses, envelope decoding.

mod envelope;
mod raw;
mod status;

pub use envelope::{ApiEnvelope, PayloadError, decode_payload, error_message};
pub use raw::ApiResponse;
pub use status::StatusCode;
