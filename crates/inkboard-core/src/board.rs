//! Canonical board state held by each replica.

use crate::geometry::union_bounds;
use crate::items::{Item, ItemId};
use kurbo::{Point, Rect};
use std::collections::HashMap;

/// A mutation applied to the board, local or remote.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    /// Insert a new item or replace the one with the same id.
    Upsert(Item),
    /// Remove an item by id.
    Delete(ItemId),
    /// Remove every item.
    Clear,
    /// Replace the whole board with a replayed history, in order.
    History(Vec<Item>),
}

/// The set of items on a board, keyed by id, plus their drawing order.
///
/// Applying the same event twice yields the same state, which lets replicas
/// converge on a full history resync regardless of what arrived before it.
#[derive(Debug, Clone, Default)]
pub struct BoardStore {
    items: HashMap<ItemId, Item>,
    /// Drawing order (back to front).
    order: Vec<ItemId>,
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a mutation.
    ///
    /// An upsert of a known id moves the item to the top of the drawing
    /// order, so a re-sent item is redrawn over everything received since.
    pub fn apply(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::Upsert(item) => self.upsert(item),
            BoardEvent::Delete(id) => {
                self.remove(id);
            }
            BoardEvent::Clear => self.clear(),
            BoardEvent::History(items) => {
                self.clear();
                for item in items {
                    self.upsert(item);
                }
            }
        }
    }

    fn upsert(&mut self, item: Item) {
        let id = item.id();
        if self.items.insert(id, item).is_some() {
            self.order.retain(|&existing| existing != id);
        }
        self.order.push(id);
    }

    fn remove(&mut self, id: ItemId) -> Option<Item> {
        let removed = self.items.remove(&id)?;
        self.order.retain(|&existing| existing != id);
        Some(removed)
    }

    fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }

    /// Items in drawing order (back to front).
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    /// Owned copy of the items in drawing order.
    pub fn snapshot(&self) -> Vec<Item> {
        self.iter().cloned().collect()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The front-most item hit at `point` (world coordinates).
    pub fn topmost_at(&self, point: Point, tolerance: f64) -> Option<ItemId> {
        self.order.iter().rev().copied().find(|id| {
            self.items
                .get(id)
                .is_some_and(|item| item.hit_test(point, tolerance))
        })
    }

    /// Union of the bounds of every item that has geometry.
    pub fn bounds(&self) -> Option<Rect> {
        union_bounds(self.iter().filter(|i| i.has_geometry()).map(Item::bounds))
    }
}
