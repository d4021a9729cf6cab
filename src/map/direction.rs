use glam::{IVec2, Vec2};
use strum_macros::AsRefStr;

/// The four cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    #[default]
    Left,
    Right,
}

impl Direction {
    /// The four cardinal directions, in the order ghosts break ties between equally good moves.
    pub const DIRECTIONS: [Direction; 4] = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];

    /// Returns the opposite direction. Constant time.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Returns the direction as a unit step in grid cells. Screen space: `y` grows downwards.
    pub fn as_ivec2(self) -> IVec2 {
        self.into()
    }

    /// Returns the direction as a unit vector.
    pub fn as_vec2(self) -> Vec2 {
        self.as_ivec2().as_vec2()
    }

    /// Angle of the direction in radians, clockwise from the positive x axis.
    pub fn angle(self) -> f32 {
        use std::f32::consts::{FRAC_PI_2, PI};
        match self {
            Direction::Right => 0.0,
            Direction::Down => FRAC_PI_2,
            Direction::Left => PI,
            Direction::Up => PI + FRAC_PI_2,
        }
    }

    /// Picks the facing for a velocity vector.
    ///
    /// Vertical-upward motion wins, then left, then right, then down. A zero
    /// vector has no facing.
    pub fn from_vector(velocity: Vec2) -> Option<Direction> {
        if velocity.y < 0.0 {
            Some(Direction::Up)
        } else if velocity.x < 0.0 {
            Some(Direction::Left)
        } else if velocity.x > 0.0 {
            Some(Direction::Right)
        } else if velocity.y > 0.0 {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

impl From<Direction> for IVec2 {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => -IVec2::Y,
            Direction::Down => IVec2::Y,
            Direction::Left => -IVec2::X,
            Direction::Right => IVec2::X,
        }
    }
}
