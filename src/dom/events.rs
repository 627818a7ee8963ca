use super::NodeId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Change,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventType,
    pub target: NodeId,
}

impl Event {
    pub fn new(kind: EventType, target: NodeId) -> Self {
        Self { kind, target }
    }

    pub fn click(target: NodeId) -> Self {
        Self::new(EventType::Click, target)
    }

    pub fn change(target: NodeId) -> Self {
        Self::new(EventType::Change, target)
    }
}

/// Listeners per (node, event type). Registering an identical listener twice is a
/// no-op, like `addEventListener`.
#[derive(Debug, Clone)]
pub struct EventRegistry<L> {
    listeners: HashMap<(NodeId, EventType), Vec<L>>,
}

impl<L> Default for EventRegistry<L> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }
}

impl<L: Clone + PartialEq> EventRegistry<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event_listener(&mut self, target: NodeId, kind: EventType, listener: L) -> bool {
        let entry = self.listeners.entry((target, kind)).or_default();
        if entry.contains(&listener) {
            return false;
        }
        entry.push(listener);
        true
    }

    pub fn remove_event_listener(&mut self, target: NodeId, kind: EventType, listener: &L) -> bool {
        let Some(entry) = self.listeners.get_mut(&(target, kind)) else {
            return false;
        };
        let before = entry.len();
        entry.retain(|existing| existing != listener);
        let removed = entry.len() != before;
        if entry.is_empty() {
            self.listeners.remove(&(target, kind));
        }
        removed
    }

    pub fn listeners(&self, target: NodeId, kind: EventType) -> Vec<L> {
        self.listeners
            .get(&(target, kind))
            .cloned()
            .unwrap_or_default()
    }

    pub fn listener_count(&self, kind: EventType) -> usize {
        self.listeners
            .iter()
            .filter(|((_, registered), _)| *registered == kind)
            .map(|(_, entry)| entry.len())
            .sum()
    }
}
