//! Map parsing functionality for converting raw board layouts into structured data.

use crate::constants::{MapTile, BOARD_CELL_SIZE};
use crate::error::ParseError;
use glam::IVec2;

/// Number of ghost spawn markers a board must carry, one per roster ghost.
pub const GHOST_SPAWN_COUNT: usize = 4;

/// A raw board layout: one string per row, one character per cell.
pub type RawBoard<'a> = [&'a str; BOARD_CELL_SIZE.y as usize];

/// Represents the parsed data from a raw board layout.
#[derive(Debug, Clone)]
pub struct ParsedMap {
    /// The parsed tile layout, indexed `[x][y]`.
    pub tiles: [[MapTile; BOARD_CELL_SIZE.y as usize]; BOARD_CELL_SIZE.x as usize],
    /// The positions of the tunnel end tiles.
    pub tunnel_ends: [Option<IVec2>; 2],
    /// The player's starting cell.
    pub player_start: IVec2,
    /// Ghost spawn cells, in row-major order.
    pub ghost_spawns: [IVec2; GHOST_SPAWN_COUNT],
}

/// Parser for converting raw board layouts into structured map data.
pub struct MapTileParser;

impl MapTileParser {
    /// Parses a single character into a map tile.
    ///
    /// Spawn markers (`P` for the player, `G` for ghosts) are open floor.
    pub fn parse_character(c: char) -> Result<MapTile, ParseError> {
        match c {
            '#' => Ok(MapTile::Wall),
            '.' => Ok(MapTile::Pellet),
            'o' => Ok(MapTile::PowerUp),
            ' ' => Ok(MapTile::Empty),
            'T' => Ok(MapTile::Tunnel),
            'P' | 'G' => Ok(MapTile::Empty),
            _ => Err(ParseError::UnknownCharacter(c)),
        }
    }

    /// Parses a raw board layout into structured map data.
    ///
    /// # Errors
    ///
    /// Returns an error if a row has the wrong width, the board contains unknown
    /// characters, or the spawn and tunnel markers don't add up.
    pub fn parse_board(raw_board: RawBoard<'_>) -> Result<ParsedMap, ParseError> {
        let mut tiles = [[MapTile::Empty; BOARD_CELL_SIZE.y as usize]; BOARD_CELL_SIZE.x as usize];
        let mut tunnel_ends = Vec::with_capacity(2);
        let mut player_starts = Vec::with_capacity(1);
        let mut ghost_spawns = Vec::with_capacity(GHOST_SPAWN_COUNT);

        for (y, line) in raw_board.iter().enumerate() {
            let width = line.chars().count();
            if width != BOARD_CELL_SIZE.x as usize {
                return Err(ParseError::ParseFailed(format!(
                    "row {y} is {width} cells wide, expected {}",
                    BOARD_CELL_SIZE.x
                )));
            }

            for (x, character) in line.chars().enumerate() {
                let tile = Self::parse_character(character)?;
                let cell = IVec2::new(x as i32, y as i32);

                match character {
                    'T' => tunnel_ends.push(cell),
                    'P' => player_starts.push(cell),
                    'G' => ghost_spawns.push(cell),
                    _ => {}
                }

                tiles[x][y] = tile;
            }
        }

        if player_starts.len() != 1 {
            return Err(ParseError::InvalidPlayerStartCount(player_starts.len()));
        }

        let ghost_spawns: [IVec2; GHOST_SPAWN_COUNT] =
            ghost_spawns
                .try_into()
                .map_err(|found: Vec<IVec2>| ParseError::InvalidGhostSpawnCount {
                    expected: GHOST_SPAWN_COUNT,
                    found: found.len(),
                })?;

        let tunnel_ends = match tunnel_ends.as_slice() {
            [] => [None, None],
            [a, b] => [Some(*a), Some(*b)],
            other => return Err(ParseError::InvalidTunnelCount(other.len())),
        };

        Ok(ParsedMap {
            tiles,
            tunnel_ends,
            player_start: player_starts[0],
            ghost_spawns,
        })
    }
}
