//! Event types and sinks for observing balance operations.
//!
//! This module defines [`BalanceEvent`] and a set of sinks and adapters to emit,
//! collect, or forward events while seeding a population with
//! [`crate::spawn::distributor::InitialDistributor`] or while handling removals
//! through [`crate::balance::BalanceEngine::remove_and_rebalance_with_events`].
use crate::balance::{Dimension, PassOutcome};
use crate::descriptor::DescriptorPair;
use crate::pool::{InstanceHandle, InstanceTransform};
use crate::spawn::distributor::DistributionSummary;

/// Describes events emitted by balance operations.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum BalanceEvent {
    /// Emitted when an instance is appended to a pool.
    InstanceAdded {
        pair: DescriptorPair,
        handle: InstanceHandle,
        transform: InstanceTransform,
    },

    /// Emitted when an instance is removed by an external strike.
    InstanceRemoved {
        pair: DescriptorPair,
        handle: InstanceHandle,
    },

    /// Emitted when a corrective swap moves an instance between pools.
    InstanceMoved {
        from: DescriptorPair,
        to: DescriptorPair,
        handle: InstanceHandle,
    },

    /// Emitted after each rebalance pass.
    PassFinished {
        /// Dimension the pass corrected.
        dimension: Dimension,
        /// What the pass did.
        outcome: PassOutcome,
    },

    /// Emitted when an initial distribution finishes.
    DistributionFinished { summary: DistributionSummary },

    /// Non-fatal warning.
    Warning {
        /// Context string (e.g. a pair or an operation name).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`BalanceEvent`], used by sinks to opt out of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BalanceEventKind {
    InstanceAdded,
    InstanceRemoved,
    InstanceMoved,
    PassFinished,
    DistributionFinished,
    Warning,
}

impl BalanceEvent {
    pub fn kind(&self) -> BalanceEventKind {
        match self {
            BalanceEvent::InstanceAdded { .. } => BalanceEventKind::InstanceAdded,
            BalanceEvent::InstanceRemoved { .. } => BalanceEventKind::InstanceRemoved,
            BalanceEvent::InstanceMoved { .. } => BalanceEventKind::InstanceMoved,
            BalanceEvent::PassFinished { .. } => BalanceEventKind::PassFinished,
            BalanceEvent::DistributionFinished { .. } => BalanceEventKind::DistributionFinished,
            BalanceEvent::Warning { .. } => BalanceEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`BalanceEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: BalanceEvent);

    /// Whether the sink wants events of `kind`. Emitters skip building
    /// events nobody listens to.
    #[inline]
    fn wants(&self, _kind: BalanceEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = BalanceEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: BalanceEvent) {}

    #[inline]
    fn wants(&self, _kind: BalanceEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(BalanceEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(BalanceEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(BalanceEvent),
{
    #[inline]
    fn send(&mut self, event: BalanceEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<BalanceEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
        }
    }

    pub fn into_inner(self) -> Vec<BalanceEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[BalanceEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of collected events of `kind`.
    pub fn count_of(&self, kind: BalanceEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: BalanceEvent) {
        self.events.push(event);
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: BalanceEvent) {
        if self.sinks.is_empty() {
            return;
        }
        let last_idx = self.sinks.len() - 1;
        for i in 0..last_idx {
            if self.sinks[i].wants(event.kind()) {
                self.sinks[i].send(event.clone());
            }
        }
        if self.sinks[last_idx].wants(event.kind()) {
            self.sinks[last_idx].send(event);
        }
    }

    fn wants(&self, kind: BalanceEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
