//! Grid World
//!
//! Bounded rectangular grid with blocked terrain, an agent occupancy index
//! and a food table. Hosted as an ECS resource; systems drain its removal
//! queue to despawn eaten food.

use bevy_ecs::prelude::*;
use std::collections::{HashMap, HashSet};

use super::pathfinding::find_path;
use super::{FoodView, FoodWorld, GridBounds, GridPosition, GridService, Nutrition};

#[derive(Debug, Clone)]
struct FoodRecord {
    food_type: String,
    cell: GridPosition,
    nutrition: Option<Nutrition>,
}

/// Resource holding all spatial state
#[derive(Resource, Debug, Clone)]
pub struct GridWorld {
    bounds: GridBounds,
    cell_size: f32,
    blocked: HashSet<GridPosition>,
    agents: HashMap<Entity, GridPosition>,
    occupancy: HashMap<GridPosition, Entity>,
    foods: HashMap<Entity, FoodRecord>,
    food_at: HashMap<GridPosition, Vec<Entity>>,
    removed_food: Vec<Entity>,
}

impl GridWorld {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            bounds: GridBounds::from_size(width.max(1), height.max(1)),
            cell_size: 1.0,
            blocked: HashSet::new(),
            agents: HashMap::new(),
            occupancy: HashMap::new(),
            foods: HashMap::new(),
            food_at: HashMap::new(),
            removed_food: Vec::new(),
        }
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        if cell_size > 0.0 {
            self.cell_size = cell_size;
        }
        self
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn in_bounds(&self, cell: GridPosition) -> bool {
        self.bounds.contains(cell)
    }

    /// Mark a tile as impassable terrain.
    pub fn block(&mut self, cell: GridPosition) {
        self.blocked.insert(cell);
    }

    pub fn unblock(&mut self, cell: GridPosition) {
        self.blocked.remove(&cell);
    }

    pub fn is_terrain_blocked(&self, cell: GridPosition) -> bool {
        self.blocked.contains(&cell)
    }

    /// Register a food item. Food can share a tile with other food.
    pub fn add_food(
        &mut self,
        entity: Entity,
        food_type: impl Into<String>,
        cell: GridPosition,
        nutrition: Option<Nutrition>,
    ) -> bool {
        if !self.is_valid(cell) || self.foods.contains_key(&entity) {
            return false;
        }
        self.foods.insert(
            entity,
            FoodRecord {
                food_type: food_type.into(),
                cell,
                nutrition,
            },
        );
        self.food_at.entry(cell).or_default().push(entity);
        true
    }

    pub fn food_count(&self) -> usize {
        self.foods.len()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn occupant(&self, cell: GridPosition) -> Option<Entity> {
        self.occupancy.get(&cell).copied()
    }

    /// Food entities removed since the last drain, in removal order.
    pub fn drain_removed_food(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.removed_food)
    }

    fn is_food_tile(&self, cell: GridPosition) -> bool {
        self.food_at.get(&cell).is_some_and(|v| !v.is_empty())
    }
}

impl GridService for GridWorld {
    fn is_valid(&self, cell: GridPosition) -> bool {
        self.bounds.contains(cell) && !self.blocked.contains(&cell)
    }

    fn is_occupied(&self, cell: GridPosition) -> bool {
        self.occupancy.contains_key(&cell)
    }

    fn is_movement_blocked(&self, cell: GridPosition) -> bool {
        self.blocked.contains(&cell) || self.is_food_tile(cell)
    }

    fn entities_at(&self, cell: GridPosition) -> Vec<Entity> {
        let mut entities = Vec::new();
        if let Some(agent) = self.occupancy.get(&cell) {
            entities.push(*agent);
        }
        if let Some(foods) = self.food_at.get(&cell) {
            entities.extend(foods.iter().copied());
        }
        entities
    }

    fn entities_in_radius(&self, center: GridPosition, radius: i32, use_circle: bool) -> Vec<Entity> {
        let mut entities = Vec::new();
        if radius < 0 {
            return entities;
        }
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let inside = if use_circle {
                    dx * dx + dy * dy <= radius * radius
                } else {
                    dx.abs() + dy.abs() <= radius
                };
                if !inside {
                    continue;
                }
                let cell = GridPosition::new(center.x + dx, center.y + dy);
                if self.bounds.contains(cell) {
                    entities.extend(self.entities_at(cell));
                }
            }
        }
        entities
    }

    fn shortest_path(&self, from: GridPosition, to: GridPosition) -> Vec<GridPosition> {
        let passable = |cell: GridPosition| {
            self.is_valid(cell) && !self.is_occupied(cell) && !self.is_movement_blocked(cell)
        };
        let goal_ok = |cell: GridPosition| self.is_valid(cell);
        find_path(from, to, passable, goal_ok)
    }

    fn position_of(&self, entity: Entity) -> Option<GridPosition> {
        self.agents.get(&entity).copied()
    }

    fn commit_position(&mut self, entity: Entity, cell: GridPosition) -> bool {
        if !self.is_valid(cell) {
            return false;
        }
        match self.occupancy.get(&cell) {
            Some(other) if *other != entity => return false,
            _ => {}
        }
        if let Some(old) = self.agents.insert(entity, cell) {
            self.occupancy.remove(&old);
        }
        self.occupancy.insert(cell, entity);
        true
    }

    fn release(&mut self, entity: Entity) {
        if let Some(cell) = self.agents.remove(&entity) {
            self.occupancy.remove(&cell);
        }
    }

    fn world_to_grid(&self, world: (f32, f32)) -> GridPosition {
        GridPosition::new(
            (world.0 / self.cell_size).floor() as i32,
            (world.1 / self.cell_size).floor() as i32,
        )
    }

    fn grid_to_world(&self, cell: GridPosition) -> (f32, f32) {
        (
            (cell.x as f32 + 0.5) * self.cell_size,
            (cell.y as f32 + 0.5) * self.cell_size,
        )
    }
}

impl FoodWorld for GridWorld {
    fn food(&self, entity: Entity) -> Option<FoodView> {
        self.foods.get(&entity).map(|record| FoodView {
            entity,
            food_type: record.food_type.clone(),
            cell: record.cell,
            nutrition: record.nutrition,
        })
    }

    fn remove_food(&mut self, entity: Entity) -> bool {
        let Some(record) = self.foods.remove(&entity) else {
            return false;
        };
        if let Some(list) = self.food_at.get_mut(&record.cell) {
            list.retain(|e| *e != entity);
            if list.is_empty() {
                self.food_at.remove(&record.cell);
            }
        }
        self.removed_food.push(entity);
        true
    }
}
