//! Pure, side-effect-free transforms over event lists: the algebra used
//! to build query functions on top of raw bucket data.

mod chunk;
mod classify;
mod error;
mod filter;
mod heartbeat;
mod merge;
mod period;
mod simplify;
mod sort;
mod union_no_overlap;
mod url_split;

pub use chunk::chunk_events_by_key;
pub use classify::{categorize, tag, Category, Rule, Tag};
pub use error::{Result, TransformError};
pub use filter::{filter_keyvals, filter_keyvals_regex};
pub use heartbeat::{heartbeat_merge, heartbeat_reduce};
pub use merge::merge_events_by_keys;
pub use period::{filter_period_intersect, period_union};
pub use simplify::simplify_string;
pub use sort::{concat, flood, limit_events, sort_by_duration, sort_by_timestamp, sum_durations};
pub use union_no_overlap::union_no_overlap;
pub use url_split::split_url_events;
