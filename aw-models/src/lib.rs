//! Data model for the Sundial activity datastore: events, buckets,
//! applications and settings, plus the timestamp/interval primitives
//! shared across the transform and query layers.

pub mod application;
pub mod bucket;
pub mod error;
pub mod event;
pub mod setting;
pub mod time;

pub use application::{Application, ApplicationType};
pub use bucket::Bucket;
pub use error::{ModelError, Result};
pub use event::Event;
pub use setting::{Setting, WeekdaysSchedule};
pub use time::{round_up_to_next_ms, TimeSlot};
