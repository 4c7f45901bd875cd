//! Grid lattice and cardinal directions

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Integer cell on an unbounded lattice
pub type GridPos = IVec2;

/// Cardinal movement direction (screen space: Up is -y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit grid vector
    pub fn delta(&self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// True when turning from `other` to `self` changes axis
    pub fn is_perpendicular_to(&self, other: Direction) -> bool {
        self.is_horizontal() != other.is_horizontal()
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Map a keyboard key (arrows or WASD) to a direction
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "arrowup" | "w" => Some(Direction::Up),
            "arrowdown" | "s" => Some(Direction::Down),
            "arrowleft" | "a" => Some(Direction::Left),
            "arrowright" | "d" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// True when `pos` lies in `[-radius, radius)` on both axes
#[inline]
pub fn in_bounds(pos: GridPos, radius: f32) -> bool {
    let inside = |v: i32| {
        let v = v as f32;
        v >= -radius && v < radius
    };
    inside(pos.x) && inside(pos.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perpendicular() {
        assert!(Direction::Up.is_perpendicular_to(Direction::Right));
        assert!(!Direction::Left.is_perpendicular_to(Direction::Right));
        assert!(!Direction::Right.is_perpendicular_to(Direction::Right));
        for dir in Direction::ALL {
            assert_eq!(dir.delta() + dir.opposite().delta(), IVec2::ZERO);
        }
    }

    #[test]
    fn test_in_bounds_half_open() {
        assert!(in_bounds(IVec2::new(-10, 9), 10.0));
        assert!(!in_bounds(IVec2::new(10, 0), 10.0));
        assert!(!in_bounds(IVec2::new(0, -11), 10.0));
        assert!(in_bounds(IVec2::new(8, -8), 8.5));
        assert!(!in_bounds(IVec2::new(-9, 0), 8.5));
    }

    #[test]
    fn test_from_key() {
        assert_eq!(Direction::from_key("ArrowUp"), Some(Direction::Up));
        assert_eq!(Direction::from_key("D"), Some(Direction::Right));
        assert_eq!(Direction::from_key("p"), None);
    }
}
