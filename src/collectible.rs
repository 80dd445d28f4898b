use std::collections::HashMap;

use crate::components::Pos;
use crate::level::Maze;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectibleKind {
    Dot,
    Power,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collectible {
    pub pos: Pos,
    pub kind: CollectibleKind,
    pub points: u32,
    pub collected: bool,
    /// Pulse phase for power pellets. Cosmetic only.
    pub phase: u32,
}

/// The collected overlay for one level.
#[derive(Debug, Clone, Default)]
pub struct CollectibleSet {
    items: Vec<Collectible>,
    by_pos: HashMap<Pos, usize>,
    remaining: usize,
}

impl CollectibleSet {
    pub fn from_maze(maze: &Maze, dot_points: u32, power_points: u32) -> Self {
        let dots = maze
            .collectible_positions()
            .into_iter()
            .map(|pos| (pos, CollectibleKind::Dot, dot_points));
        let powers = maze
            .power_collectible_positions()
            .into_iter()
            .map(|pos| (pos, CollectibleKind::Power, power_points));

        let mut set = CollectibleSet::default();
        for (pos, kind, points) in dots.chain(powers) {
            set.by_pos.insert(pos, set.items.len());
            set.items.push(Collectible {
                pos,
                kind,
                points,
                collected: false,
                phase: 0,
            });
        }
        set.remaining = set.items.len();
        set
    }

    /// Marks the collectible at `pos` as eaten. Returns it only the first time.
    pub fn collect_at(&mut self, pos: Pos) -> Option<&Collectible> {
        let idx = *self.by_pos.get(&pos)?;
        let item = &mut self.items[idx];
        if item.collected {
            return None;
        }
        item.collected = true;
        self.remaining -= 1;
        Some(item)
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collectible> {
        self.items.iter()
    }

    pub fn advance_animation(&mut self) {
        for item in &mut self.items {
            if item.kind == CollectibleKind::Power && !item.collected {
                item.phase = item.phase.wrapping_add(1);
            }
        }
    }
}
