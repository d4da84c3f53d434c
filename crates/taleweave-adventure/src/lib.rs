//! Read-only adventure catalog for Taleweave.
//!
//! An adventure is an ordered narrative: rounds of text, each with a
//! fixed list of choices and a transition table mapping a chosen index
//! to the next round (or to the end of the story). The lobby engine
//! only ever reads from the catalog — it is immutable after load.
//!
//! # Key types
//!
//! - [`Adventure`], [`Round`] — the narrative definition
//! - [`RoundOutcome`] — where a resolved choice leads
//! - [`AdventureCatalog`] — lookup by id, loaded from JSON or builtin

mod catalog;
mod error;
mod story;

pub use catalog::{AdventureCatalog, AdventureSummary};
pub use error::CatalogError;
pub use story::{Adventure, Round, RoundOutcome};
