//! Core domain logic for the live tagger.
//!
//! This crate contains the fundamental types and logic for:
//! - Timecode: rendering second offsets as `[-][H:]MM:SS` strings
//! - Tag store: the ordered, collision-free offset-to-text mapping
//! - Session clock: elapsed time against a correctable start instant

pub mod clock;
pub mod key;
pub mod store;
pub mod timecode;

pub use clock::{CORRECTION_NOISE_SECONDS, SessionClock};
pub use key::TagKey;
pub use store::{Adjustment, MAX_OFFSET_SECONDS, StoreError, TagStore};
