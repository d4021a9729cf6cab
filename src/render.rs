//! Draws a session onto an abstract surface.
//!
//! Drawing only reads the world. A [`RenderSurface`] implementation decides what
//! the primitives turn into: an SDL canvas on desktop, a recorder in tests.

use std::f32::consts::{PI, TAU};

use bevy_ecs::{query::With, world::World};
use glam::Vec2;

use crate::{
    config::GameConfig,
    constants::{MapTile, TILE_LENGTH},
    map::Board,
    systems::{
        components::{Collectible, Collider, Eaten, Ghost, Mouth, PlayerControlled, Position},
        ghost::{GhostLook, GhostSprite},
        state::GameStage,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const WALL: Color = Color::rgb(33, 33, 222);
    pub const PELLET: Color = Color::rgb(255, 184, 174);
    pub const PLAYER: Color = Color::rgb(255, 255, 0);
    pub const SCARED: Color = Color::rgb(33, 33, 255);
    pub const PUPIL: Color = Color::rgb(33, 33, 160);
}

/// The drawing primitives the game needs. Coordinates are logical canvas pixels;
/// angles are radians, clockwise from the positive x axis.
pub trait RenderSurface {
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    /// A filled wedge swept clockwise from `start` to `end`.
    fn fill_pie(&mut self, center: Vec2, radius: f32, start: f32, end: f32, color: Color);
}

/// Draws the whole session: board, collectibles, ghosts, then the player on top.
pub fn draw_world(world: &mut World, surface: &mut dyn RenderSurface) {
    surface.clear(Color::BLACK);

    if let Some(board) = world.get_resource::<Board>() {
        for cell in board.cells_of(MapTile::Wall) {
            surface.fill_rect(cell.as_vec2() * TILE_LENGTH, Vec2::splat(TILE_LENGTH), Color::WALL);
        }
    }

    let mut collectibles = world.query::<(&Collectible, &Position, &Collider, &Eaten)>();
    for (_, position, collider, eaten) in collectibles.iter(world) {
        if !eaten.0 {
            surface.fill_circle(position.0, collider.radius, Color::PELLET);
        }
    }

    let mut ghosts = world.query::<(&Ghost, &Position, &Collider, &GhostSprite)>();
    for (ghost, position, collider, sprite) in ghosts.iter(world) {
        draw_ghost(surface, *ghost, position.0, collider.radius, sprite);
    }

    let death_progress = death_progress(world);
    let mut player = world.query_filtered::<(&Position, &Collider, &Mouth), With<PlayerControlled>>();
    if let Ok((position, collider, mouth)) = player.single(world) {
        draw_player(surface, position.0, collider.radius, mouth, death_progress);
    }
}

/// How far along the death animation is, from 0 to 1, if it is running.
fn death_progress(world: &World) -> Option<f32> {
    let GameStage::Dying { remaining_ticks, .. } = *world.get_resource::<GameStage>()? else {
        return None;
    };
    let total = world.get_resource::<GameConfig>()?.death_animation_ticks.max(1);
    Some(1.0 - remaining_ticks.min(total) as f32 / total as f32)
}

fn draw_player(surface: &mut dyn RenderSurface, center: Vec2, radius: f32, mouth: &Mouth, death_progress: Option<f32>) {
    // Dying, the mouth opens until the avatar folds away entirely
    let opening = match death_progress {
        Some(progress) => PI * progress,
        None => mouth.opening,
    };

    if opening <= f32::EPSILON {
        surface.fill_circle(center, radius, Color::PLAYER);
    } else if opening < PI {
        let heading = mouth.facing.angle();
        surface.fill_pie(center, radius, heading + opening, heading + TAU - opening, Color::PLAYER);
    }
}

fn draw_ghost(surface: &mut dyn RenderSurface, ghost: Ghost, center: Vec2, radius: f32, sprite: &GhostSprite) {
    let body = match sprite.look {
        GhostLook::Body => Some(ghost.color()),
        GhostLook::Scared => Some(Color::SCARED),
        GhostLook::Eyes => None,
    };

    if let Some(color) = body {
        surface.fill_circle(center, radius, color);
        surface.fill_rect(
            Vec2::new(center.x - radius, center.y),
            Vec2::new(radius * 2.0, radius),
            color,
        );
    }

    if sprite.look == GhostLook::Scared {
        return;
    }

    let look = sprite.facing.as_vec2() * radius * 0.15;
    for side in [-1.0, 1.0] {
        let eye = center + Vec2::new(side * radius * 0.4, -radius * 0.2);
        surface.fill_circle(eye + look, radius * 0.28, Color::WHITE);
        surface.fill_circle(eye + look * 2.0, radius * 0.14, Color::PUPIL);
    }
}
