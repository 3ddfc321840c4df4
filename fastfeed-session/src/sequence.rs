/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Sequence number tracking.
//!
//! This module detects gaps and duplicates on the channel-level sequence and
//! on each instrument's own sequence (RptSeq).

use fastfeed_core::{MarketEvent, Symbol};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// A detected range of missing sequence numbers, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapEvent {
    /// Instrument the gap belongs to, `None` for the channel sequence.
    pub symbol: Option<Symbol>,
    /// First missing sequence number.
    pub from_seq: u64,
    /// Last missing sequence number.
    pub to_seq: u64,
}

impl GapEvent {
    /// Returns the number of missing sequence numbers.
    #[must_use]
    pub const fn missing(&self) -> u64 {
        self.to_seq - self.from_seq + 1
    }
}

impl fmt::Display for GapEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{symbol} gap {}..={}", self.from_seq, self.to_seq),
            None => write!(f, "channel gap {}..={}", self.from_seq, self.to_seq),
        }
    }
}

/// Result of checking one sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceCheck {
    /// In order, or the first number seen.
    Accepted,
    /// Numbers were skipped; the message itself is accepted.
    Gap(GapEvent),
    /// At or below the last accepted number.
    Duplicate {
        /// Last accepted number.
        last: u64,
        /// Number received.
        received: u64,
    },
}

/// Result of observing a decoded event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    /// False if the event is a duplicate and should be discarded.
    pub accepted: bool,
    /// Gaps found on the channel or instrument sequence.
    pub gaps: SmallVec<[GapEvent; 2]>,
}

/// Tracks the last accepted sequence per channel and per instrument.
#[derive(Debug, Default)]
pub struct SequenceTracker {
    last_channel: Option<u64>,
    instruments: HashMap<Symbol, u64>,
    gaps: u64,
    duplicates: u64,
}

impl SequenceTracker {
    /// Creates an empty tracker; the first number seen sets the baseline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker whose channel sequence starts after `last`.
    #[must_use]
    pub fn with_initial(last: u64) -> Self {
        Self {
            last_channel: Some(last),
            ..Self::default()
        }
    }

    /// Checks a channel-level sequence number.
    pub fn check_channel(&mut self, received: u64) -> SequenceCheck {
        let check = advance(&mut self.last_channel, None, received);
        self.count(&check);
        check
    }

    /// Checks an instrument-level sequence number.
    pub fn check_instrument(&mut self, symbol: Symbol, received: u64) -> SequenceCheck {
        let mut last = self.instruments.get(&symbol).copied();
        let check = advance(&mut last, Some(symbol), received);
        if let Some(last) = last {
            self.instruments.insert(symbol, last);
        }
        self.count(&check);
        check
    }

    /// Runs both checks for a decoded event.
    ///
    /// A channel duplicate discards the event before the instrument check.
    pub fn observe(&mut self, event: &MarketEvent) -> Observation {
        let mut observation = Observation {
            accepted: true,
            gaps: SmallVec::new(),
        };

        if let Some(seq) = event.sequence_number {
            match self.check_channel(seq) {
                SequenceCheck::Accepted => {}
                SequenceCheck::Gap(gap) => observation.gaps.push(gap),
                SequenceCheck::Duplicate { .. } => {
                    observation.accepted = false;
                    return observation;
                }
            }
        }

        if let (Some(symbol), Some(seq)) = (event.symbol, event.instrument_sequence) {
            match self.check_instrument(symbol, seq) {
                SequenceCheck::Accepted => {}
                SequenceCheck::Gap(gap) => observation.gaps.push(gap),
                SequenceCheck::Duplicate { .. } => observation.accepted = false,
            }
        }

        observation
    }

    /// Returns the last accepted channel sequence number.
    #[must_use]
    pub const fn last_channel(&self) -> Option<u64> {
        self.last_channel
    }

    /// Returns the last accepted sequence number for `symbol`.
    #[must_use]
    pub fn last_instrument(&self, symbol: &Symbol) -> Option<u64> {
        self.instruments.get(symbol).copied()
    }

    /// Returns the number of gaps detected.
    #[must_use]
    pub const fn gap_count(&self) -> u64 {
        self.gaps
    }

    /// Returns the number of duplicates discarded.
    #[must_use]
    pub const fn duplicate_count(&self) -> u64 {
        self.duplicates
    }

    /// Forgets every baseline.
    pub fn reset(&mut self) {
        self.last_channel = None;
        self.instruments.clear();
    }

    fn count(&mut self, check: &SequenceCheck) {
        match check {
            SequenceCheck::Accepted => {}
            SequenceCheck::Gap(gap) => {
                self.gaps += 1;
                warn!(%gap, missing = gap.missing(), "sequence gap");
            }
            SequenceCheck::Duplicate { last, received } => {
                self.duplicates += 1;
                debug!(last, received, "duplicate sequence discarded");
            }
        }
    }
}

fn advance(last: &mut Option<u64>, symbol: Option<Symbol>, received: u64) -> SequenceCheck {
    let Some(prev) = *last else {
        *last = Some(received);
        return SequenceCheck::Accepted;
    };
    if received <= prev {
        return SequenceCheck::Duplicate {
            last: prev,
            received,
        };
    }
    *last = Some(received);
    if received == prev + 1 {
        SequenceCheck::Accepted
    } else {
        SequenceCheck::Gap(GapEvent {
            symbol,
            from_seq: prev + 1,
            to_seq: received - 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(seq: Option<u64>, symbol: Option<&str>, rpt_seq: Option<u64>) -> MarketEvent {
        let mut event = MarketEvent::new(1, Utc::now());
        event.sequence_number = seq;
        event.symbol = symbol.and_then(Symbol::new);
        event.instrument_sequence = rpt_seq;
        event
    }

    #[test]
    fn test_single_gap_all_accepted() {
        let mut tracker = SequenceTracker::new();
        let mut gaps = Vec::new();
        for seq in [1, 2, 3, 7, 8] {
            let observation = tracker.observe(&event(Some(seq), None, None));
            assert!(observation.accepted);
            gaps.extend(observation.gaps);
        }
        assert_eq!(
            gaps,
            vec![GapEvent {
                symbol: None,
                from_seq: 4,
                to_seq: 6
            }]
        );
        assert_eq!(tracker.last_channel(), Some(8));
        assert_eq!(tracker.gap_count(), 1);
    }

    #[test]
    fn test_duplicate_does_not_advance() {
        let mut tracker = SequenceTracker::with_initial(10);
        assert_eq!(tracker.check_channel(11), SequenceCheck::Accepted);
        assert_eq!(
            tracker.check_channel(11),
            SequenceCheck::Duplicate {
                last: 11,
                received: 11
            }
        );
        assert!(matches!(
            tracker.check_channel(5),
            SequenceCheck::Duplicate { .. }
        ));
        assert_eq!(tracker.last_channel(), Some(11));
        assert_eq!(tracker.duplicate_count(), 2);
    }

    #[test]
    fn test_seeded_baseline_reports_gap() {
        let mut tracker = SequenceTracker::with_initial(0);
        let SequenceCheck::Gap(gap) = tracker.check_channel(3) else {
            panic!("expected a gap");
        };
        assert_eq!((gap.from_seq, gap.to_seq, gap.missing()), (1, 2, 2));
    }

    #[test]
    fn test_instruments_tracked_independently() {
        let mut tracker = SequenceTracker::new();
        let a = Symbol::new("AAA-EQ").unwrap();
        let b = Symbol::new("BBB-EQ").unwrap();

        assert_eq!(tracker.check_instrument(a, 5), SequenceCheck::Accepted);
        assert_eq!(tracker.check_instrument(b, 100), SequenceCheck::Accepted);
        assert_eq!(
            tracker.check_instrument(a, 8),
            SequenceCheck::Gap(GapEvent {
                symbol: Some(a),
                from_seq: 6,
                to_seq: 7
            })
        );
        assert_eq!(tracker.check_instrument(b, 101), SequenceCheck::Accepted);
        assert_eq!(tracker.last_instrument(&a), Some(8));
        assert_eq!(tracker.last_instrument(&b), Some(101));
    }

    #[test]
    fn test_channel_duplicate_skips_instrument_check() {
        let mut tracker = SequenceTracker::new();
        tracker.observe(&event(Some(1), Some("AAA-EQ"), Some(1)));

        let observation = tracker.observe(&event(Some(1), Some("AAA-EQ"), Some(9)));
        assert!(!observation.accepted);
        assert!(observation.gaps.is_empty());

        let symbol = Symbol::new("AAA-EQ").unwrap();
        assert_eq!(tracker.last_instrument(&symbol), Some(1));
    }

    #[test]
    fn test_observe_reports_both_levels() {
        let mut tracker = SequenceTracker::new();
        tracker.observe(&event(Some(1), Some("AAA-EQ"), Some(1)));

        let observation = tracker.observe(&event(Some(3), Some("AAA-EQ"), Some(4)));
        assert!(observation.accepted);
        assert_eq!(observation.gaps.len(), 2);
        assert_eq!(observation.gaps[0].symbol, None);
        assert_eq!(observation.gaps[1].symbol.map(|s| s.to_string()), Some("AAA-EQ".to_string()));
    }

    #[test]
    fn test_reset_clears_baselines() {
        let mut tracker = SequenceTracker::with_initial(50);
        tracker.reset();
        assert_eq!(tracker.check_channel(1), SequenceCheck::Accepted);
    }
}
