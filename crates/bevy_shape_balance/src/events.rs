use std::collections::HashSet;

use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use shape_balance::prelude::{BalanceEvent, BalanceEventKind, DescriptorPair, EventSink};

/// Bevy message carrying the entity that owns the spawner and the underlying [`BalanceEvent`].
#[derive(Message, Debug, Clone)]
pub struct BalanceMessage {
    pub owner: Entity,
    pub event: BalanceEvent,
}

/// Request to remove one instance and rebalance around it.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrikeInstance {
    pub pair: DescriptorPair,
    pub index: usize,
}

impl StrikeInstance {
    pub fn new(pair: DescriptorPair, index: usize) -> Self {
        Self { pair, index }
    }
}

/// Restricts which event kinds reach the bus. An empty filter forwards everything.
#[derive(Resource, Debug, Clone, Default)]
pub struct BalanceEventFilter {
    kinds: HashSet<BalanceEventKind>,
}

impl BalanceEventFilter {
    /// Forward only the given kinds.
    pub fn only(kinds: impl IntoIterator<Item = BalanceEventKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn allows(&self, kind: BalanceEventKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }
}

/// Channel that collects balance events until they are drained into [`BalanceMessage`]s.
#[derive(Resource)]
pub struct BalanceBus {
    tx: Sender<BalanceMessage>,
    rx: Receiver<BalanceMessage>,
}

impl Default for BalanceBus {
    fn default() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }
}

impl BalanceBus {
    pub fn sender(&self) -> &Sender<BalanceMessage> {
        &self.tx
    }

    pub fn receiver(&self) -> &Receiver<BalanceMessage> {
        &self.rx
    }

    /// Sink tagging every event with `owner`.
    pub fn sink(&self, owner: Entity, filter: &BalanceEventFilter) -> ChannelSink {
        ChannelSink {
            owner,
            tx: self.tx.clone(),
            filter: filter.clone(),
        }
    }
}

/// Event sink that forwards events to the [`BalanceBus`].
pub struct ChannelSink {
    pub owner: Entity,
    pub tx: Sender<BalanceMessage>,
    pub filter: BalanceEventFilter,
}

impl EventSink for ChannelSink {
    #[inline]
    fn wants(&self, kind: BalanceEventKind) -> bool {
        self.filter.allows(kind)
    }

    #[inline]
    fn send(&mut self, event: BalanceEvent) {
        let _ = self.tx.send(BalanceMessage {
            owner: self.owner,
            event,
        });
    }
}

#[cfg(test)]
mod tests {
    use shape_balance::prelude::{InstanceHandle, MaterialKind, MeshKind};

    use super::*;

    #[test]
    fn filter_limits_forwarded_kinds() {
        let bus = BalanceBus::default();
        let filter = BalanceEventFilter::only([BalanceEventKind::Warning]);
        let mut sink = bus.sink(Entity::PLACEHOLDER, &filter);

        assert!(sink.wants(BalanceEventKind::Warning));
        assert!(!sink.wants(BalanceEventKind::InstanceAdded));

        sink.send(BalanceEvent::InstanceRemoved {
            pair: DescriptorPair::new(MeshKind(0), MaterialKind(0)),
            handle: InstanceHandle(7),
        });
        let received: Vec<_> = bus.receiver().try_iter().collect();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].owner, Entity::PLACEHOLDER);
    }

    #[test]
    fn empty_filter_allows_everything() {
        let filter = BalanceEventFilter::default();
        assert!(filter.allows(BalanceEventKind::InstanceMoved));
        assert!(filter.allows(BalanceEventKind::DistributionFinished));
    }
}
