//! Playback events and the dispatcher a layer owns.
//!
//! Detection and delivery are split: `AnimationLayer::update_state` only
//! queues due events, `trigger_events` hands the queue to listeners.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Authored event families.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AnimationEventType {
    /// Fires once per cycle when playback crosses `trigger_time`.
    FrameEvent,
    /// Fires when a looping clip crosses its end.
    LoopEnd,
    /// Fires once when a non-looping clip reaches its end.
    Finished,
}

/// Listener key. Frame events are numbered in authored order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKey {
    Frame(usize),
    LoopEnd,
    Finished,
}

impl EventKey {
    #[inline]
    pub fn kind(&self) -> AnimationEventType {
        match self {
            Self::Frame(_) => AnimationEventType::FrameEvent,
            Self::LoopEnd => AnimationEventType::LoopEnd,
            Self::Finished => AnimationEventType::Finished,
        }
    }
}

/// Delivered payload.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayerEvent {
    pub key: EventKey,
    /// Frame time of the tracked channel when the event was detected (seconds).
    pub frame_time: f32,
}

/// Per-play frame event state.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameEvent {
    pub key: EventKey,
    pub trigger_time: f32,
    pub triggered: bool,
}

pub type EventCallback = Box<dyn FnMut(&LayerEvent)>;

/// Callback carried by authored options; shared so the options can be played again.
pub type SharedEventCallback = Rc<RefCell<dyn FnMut(&LayerEvent)>>;

/// Listener registry plus the queue of activated events.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: HashMap<EventKey, Vec<EventCallback>>,
    queued: Vec<LayerEvent>,
    // Swapped with `queued` while listeners run so the queue keeps its capacity.
    delivering: Vec<LayerEvent>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .field("queued", &self.queued)
            .finish()
    }
}

impl EventDispatcher {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            listeners: HashMap::new(),
            queued: Vec::with_capacity(capacity),
            delivering: Vec::with_capacity(capacity),
        }
    }

    pub fn add_listener(&mut self, key: EventKey, callback: EventCallback) {
        self.listeners.entry(key).or_default().push(callback);
    }

    pub fn remove_all(&mut self) {
        self.listeners.clear();
    }

    #[inline]
    pub fn has_listener(&self, key: EventKey) -> bool {
        self.listeners.get(&key).is_some_and(|l| !l.is_empty())
    }

    #[inline]
    pub fn queue(&mut self, event: LayerEvent) {
        self.queued.push(event);
    }

    #[inline]
    pub fn queued(&self) -> &[LayerEvent] {
        &self.queued
    }

    /// Deliver everything queued so far, in detection order, then empty the queue.
    pub fn dispatch_queued(&mut self) -> usize {
        std::mem::swap(&mut self.queued, &mut self.delivering);
        let delivered = self.delivering.len();
        for event in self.delivering.iter() {
            if let Some(callbacks) = self.listeners.get_mut(&event.key) {
                for cb in callbacks.iter_mut() {
                    cb(event);
                }
            }
        }
        self.delivering.clear();
        delivered
    }

    pub fn clear_queue(&mut self) {
        self.queued.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_delivers_in_order_and_empties_queue() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut d = EventDispatcher::with_capacity(4);
        let sink = seen.clone();
        d.add_listener(EventKey::LoopEnd, Box::new(move |e: &LayerEvent| sink.borrow_mut().push(e.frame_time)));
        d.queue(LayerEvent { key: EventKey::LoopEnd, frame_time: 1.0 });
        d.queue(LayerEvent { key: EventKey::Finished, frame_time: 2.0 });
        d.queue(LayerEvent { key: EventKey::LoopEnd, frame_time: 3.0 });
        assert_eq!(d.dispatch_queued(), 3);
        assert_eq!(*seen.borrow(), vec![1.0, 3.0]);
        assert!(d.queued().is_empty());
        assert_eq!(d.dispatch_queued(), 0);
    }

    #[test]
    fn has_listener_tracks_registration() {
        let mut d = EventDispatcher::default();
        assert!(!d.has_listener(EventKey::Finished));
        d.add_listener(EventKey::Finished, Box::new(|_: &LayerEvent| {}));
        assert!(d.has_listener(EventKey::Finished));
        d.remove_all();
        assert!(!d.has_listener(EventKey::Finished));
    }
}
