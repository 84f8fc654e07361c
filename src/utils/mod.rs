//! Small helpers shared across modules

pub mod helper;

pub use helper::{dedupe_skus, round_to_cents, same_cents, truncate_string};
