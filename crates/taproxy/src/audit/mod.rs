//! Traffic audit trail.
//!
//! Every proxied exchange is written to an append-only log as two records:
//! a full request dump and a full response dump. Dumps are rendered from
//! buffered copies of the traffic, so recording never disturbs the bytes
//! that are forwarded or delivered.
//!
//! # Module Structure
//!
//! - `dump` - wire-format rendering of requests and responses
//! - `sink` - serialized append-only log file writer

mod dump;
mod sink;

pub use dump::{render_request, render_response};
pub use sink::{AuditLog, REQUEST_LABEL, RESPONSE_LABEL};
