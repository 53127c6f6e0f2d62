use serde::Serialize;

pub type SnakeId = u16;

pub const CHANGE_POS: u8 = 1 << 0;
pub const CHANGE_ANGLE: u8 = 1 << 1;
pub const CHANGE_WANTED_ANGLE: u8 = 1 << 2;
pub const CHANGE_SPEED: u8 = 1 << 3;
pub const CHANGE_FULLNESS: u8 = 1 << 4;
pub const CHANGE_DYING: u8 = 1 << 5;
pub const CHANGE_DEAD: u8 = 1 << 6;

/// Bits that survive a drain of the change mask.
pub const CHANGE_STICKY: u8 = CHANGE_DYING | CHANGE_DEAD;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point {
            x: self.x + (other.x - self.x) / 2.0,
            y: self.y + (other.y - self.y) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }

    pub fn around(center: Point, r: f64) -> Self {
        Self {
            x: center.x,
            y: center.y,
            r,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    pub fn intersects(&self, other: &Circle) -> bool {
        super::geometry::circles_intersect(*self, *other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Food {
    pub x: u16,
    pub y: u16,
    pub size: u8,
    pub color: u8,
}

/// Integer grid cell; may lie outside the grid, callers check with `SectorGrid::index_of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}
