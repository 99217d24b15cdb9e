//! Response rewriting: the host-substitution pipeline.
//!
//! # Module Structure
//!
//! - `classify` - decides whether a response body is eligible for rewriting
//! - `codec` - exposes the decoded text of a (possibly gzip-compressed) body
//! - `substitute` - the ordered origin-to-alias string replacement
//! - `pipeline` - orchestrates the above over a received upstream response

mod classify;
mod codec;
mod pipeline;
mod substitute;

pub use classify::is_textual;
pub use codec::decode;
pub use pipeline::{rewrite_headers, rewrite_response};
pub use substitute::rewrite_hosts;
