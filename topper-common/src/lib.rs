//! # Topper Common Library
//!
//! Shared code for the Topper rating service and its clients:
//! - Item and rating event models
//! - Flat-file JSON store and the append-only rating ledger
//! - Score updates and rating submission
//! - Preference model and next-item selection strategies
//! - Localization, session view-model and user statistics
//! - Configuration loading and legacy import translation

pub mod config;
pub mod error;
pub mod filters;
pub mod ledger;
pub mod legacy;
pub mod localize;
pub mod models;
pub mod preference;
pub mod rating;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod stats;
pub mod store;
pub mod validation;

pub use error::{Error, Result};
pub use models::{Item, Locale, RatingEvent, RatingValue};
pub use selector::{Direction, NextItemStrategy};
