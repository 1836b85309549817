#![deny(clippy::mod_module_files)]
//! Delivery progress tracking for order records.
//!
//! A backend hands over a loosely shaped payload describing an order's delivery
//! lines. [`normalize`](normalize::normalize) turns any version of that payload
//! into a [`NormalizedModel`], [`DeliveryTracker`] keeps it together with the
//! user's expand/collapse choices, and [`picking`] builds the payload itself
//! from stock pickings.

pub mod badge;
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod navigation;
pub mod normalize;
pub mod picking;
pub mod store;
pub mod summary;
pub mod tracker;
pub mod view_state;

pub use error::{Error, Result};
pub use model::{DeliveryLine, LineState, NormalizedModel, TypeCode};
pub use normalize::{normalize, normalize_text};
pub use summary::{aggregate, Summary};
pub use tracker::DeliveryTracker;
pub use view_state::{ExpandState, ViewStateController};
