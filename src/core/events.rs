use crate::core::geo::{LatLng, Point};
use std::collections::VecDeque;

/// Map event types that can be emitted by the map host
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Map view has changed (center or zoom)
    ViewChanged { center: LatLng, zoom: f64 },
    /// Click on the map surface
    Click { lat_lng: LatLng, pixel: Point },
    /// Layer was added to the active layer list
    LayerAdded { layer_id: String },
    /// Layer was removed from the active layer list
    LayerRemoved { layer_id: String },
}

/// FIFO queue of map events, drained once per frame by the embedding app
#[derive(Debug, Default)]
pub struct EventQueue {
    queue: VecDeque<MapEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event to the queue
    pub fn emit(&mut self, event: MapEvent) {
        self.queue.push_back(event);
    }

    /// Drains and returns all queued events in emission order
    pub fn drain(&mut self) -> Vec<MapEvent> {
        self.queue.drain(..).collect()
    }

    /// Gets the number of pending events
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Clears all events from the queue
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_drain_in_order() {
        let mut queue = EventQueue::new();
        queue.emit(MapEvent::LayerAdded {
            layer_id: "a".to_string(),
        });
        queue.emit(MapEvent::LayerRemoved {
            layer_id: "a".to_string(),
        });
        assert_eq!(queue.pending(), 2);

        let events = queue.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            MapEvent::LayerAdded {
                layer_id: "a".to_string()
            }
        );
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_clear() {
        let mut queue = EventQueue::new();
        queue.emit(MapEvent::ViewChanged {
            center: LatLng::new(59.0, 10.0),
            zoom: 8.0,
        });
        queue.clear();
        assert_eq!(queue.pending(), 0);
        assert!(queue.drain().is_empty());
    }
}
