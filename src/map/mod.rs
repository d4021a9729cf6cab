//! This module defines the game board and provides functions for interacting with it.

pub mod direction;
pub mod parser;

use bevy_ecs::resource::Resource;
use glam::{IVec2, Vec2};
use smallvec::SmallVec;
use tracing::debug;

use crate::constants::{MapTile, BOARD_CELL_SIZE, CANVAS_SIZE, RAW_BOARD, TILE_LENGTH};
use crate::error::ParseError;
use crate::map::direction::Direction;
use crate::map::parser::{MapTileParser, RawBoard, GHOST_SPAWN_COUNT};

/// The maze the session is played on.
///
/// Cells are addressed by `IVec2` grid coordinates. Horizontal coordinates wrap
/// around the board edges, so the tunnel row connects both sides.
#[derive(Resource, Debug, Clone)]
pub struct Board {
    tiles: [[MapTile; BOARD_CELL_SIZE.y as usize]; BOARD_CELL_SIZE.x as usize],
    player_start: IVec2,
    ghost_spawns: [IVec2; GHOST_SPAWN_COUNT],
    tunnel_ends: [Option<IVec2>; 2],
}

impl Board {
    /// Builds the standard board.
    pub fn new() -> Result<Self, ParseError> {
        Self::from_layout(RAW_BOARD)
    }

    /// Builds a board from a custom layout.
    pub fn from_layout(layout: RawBoard<'_>) -> Result<Self, ParseError> {
        let parsed = MapTileParser::parse_board(layout)?;
        debug!(
            player_start = ?parsed.player_start,
            ghost_spawns = ?parsed.ghost_spawns,
            "Parsed board layout"
        );

        Ok(Self {
            tiles: parsed.tiles,
            player_start: parsed.player_start,
            ghost_spawns: parsed.ghost_spawns,
            tunnel_ends: parsed.tunnel_ends,
        })
    }

    pub fn player_start(&self) -> IVec2 {
        self.player_start
    }

    pub fn ghost_spawns(&self) -> [IVec2; GHOST_SPAWN_COUNT] {
        self.ghost_spawns
    }

    pub fn tunnel_ends(&self) -> [Option<IVec2>; 2] {
        self.tunnel_ends
    }

    /// The tile at `cell`. Columns wrap; rows outside the board read as walls.
    pub fn tile(&self, cell: IVec2) -> MapTile {
        if cell.y < 0 || cell.y >= BOARD_CELL_SIZE.y as i32 {
            return MapTile::Wall;
        }
        let x = cell.x.rem_euclid(BOARD_CELL_SIZE.x as i32);
        self.tiles[x as usize][cell.y as usize]
    }

    /// Whether an actor may occupy `cell`.
    pub fn is_walkable(&self, cell: IVec2) -> bool {
        self.tile(cell) != MapTile::Wall
    }

    /// Directions leading out of `cell` into walkable cells.
    pub fn open_directions(&self, cell: IVec2) -> SmallVec<[Direction; 4]> {
        Direction::DIRECTIONS
            .into_iter()
            .filter(|direction| self.is_walkable(cell + direction.as_ivec2()))
            .collect()
    }

    /// Every cell of the given tile type, column by column.
    pub fn cells_of(&self, tile: MapTile) -> impl Iterator<Item = IVec2> + '_ {
        self.tiles.iter().enumerate().flat_map(move |(x, column)| {
            column
                .iter()
                .enumerate()
                .filter(move |(_, t)| **t == tile)
                .map(move |(y, _)| IVec2::new(x as i32, y as i32))
        })
    }

    /// The grid cell containing a canvas position.
    pub fn cell_at(position: Vec2) -> IVec2 {
        (position / TILE_LENGTH).floor().as_ivec2()
    }

    /// The canvas position of a cell's center.
    pub fn tile_center(cell: IVec2) -> Vec2 {
        (cell.as_vec2() + Vec2::splat(0.5)) * TILE_LENGTH
    }

    /// Brings a position that ran off either side of the board back onto the canvas.
    pub fn wrap_position(position: Vec2) -> Vec2 {
        Vec2::new(position.x.rem_euclid(CANVAS_SIZE.x as f32), position.y)
    }
}
