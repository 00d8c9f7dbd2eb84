//! Small shared helpers.
//!
//! - CSS selector parsing that logs instead of panicking
//! - Epoch-millisecond timestamps and duration conversion

mod selector;
mod timing;

pub(crate) use selector::{matches_any, parse_selector_with_fallback};
pub use timing::{duration_to_ms, now_millis};
