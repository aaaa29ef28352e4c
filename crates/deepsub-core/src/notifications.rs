//! User-visible notifications emitted by the simulation.
//!
//! The engine queues them during a tick; the host drains and renders them
//! through its own channel. Derived-value *changes* notify, steady state
//! never does.

use hecs::Entity;

/// A single user-visible message.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Engine power rating changed (e.g. an efficiency module was added or
    /// removed).
    PowerRatingChanged {
        vehicle: Entity,
        previous: f32,
        rating: f32,
    },
    /// Total crush depth changed via the hull tier.
    CrushDepthChanged { vehicle: Entity, crush_depth: u16 },
}

impl Notification {
    /// Message text the host shows verbatim.
    pub fn message(&self) -> String {
        match self {
            Notification::PowerRatingChanged { rating, .. } => {
                format!("Power rating is now {:.0}", rating)
            }
            Notification::CrushDepthChanged { crush_depth, .. } => {
                format!("Crush depth is now {}m", crush_depth)
            }
        }
    }
}

/// Engine-owned notification queue, drained by the host after each tick.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    items: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        self.items.push(notification);
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
