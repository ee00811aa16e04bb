//! Append-only rating ledger
//!
//! Wraps the list of rating events read from the store. The only mutation is
//! [`RatingLedger::append`]; existing events are never changed or removed.

use crate::models::{RatingEvent, RatingValue};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingLedger {
    events: Vec<RatingEvent>,
}

impl RatingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap events loaded from storage, keeping their order
    pub fn from_events(events: Vec<RatingEvent>) -> Self {
        Self { events }
    }

    pub fn append(&mut self, event: RatingEvent) {
        self.events.push(event);
    }

    /// Events in insertion (chronological) order
    pub fn events(&self) -> &[RatingEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// (positive, negative) counts across the whole ledger
    pub fn tally(&self) -> (usize, usize) {
        self.events.iter().fold((0, 0), |(up, down), e| match e.value {
            RatingValue::Up => (up + 1, down),
            RatingValue::Down => (up, down + 1),
        })
    }
}
