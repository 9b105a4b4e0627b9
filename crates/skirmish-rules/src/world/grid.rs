//! The tile map.

use rand::Rng;
use serde::{Serialize, Serializer};

/// What occupies a map cell.
///
/// Serialized as its integer code so the map goes on the wire as
/// `[[0,1,0,...],...]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tile {
    Empty = 0,
    Resource = 1,
    Base = 2,
    Tower = 3,
}

impl Serialize for Tile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// A map coordinate. Signed so that neighbour arithmetic can step off the
/// edge and be rejected by [`Grid::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance.
    pub fn distance(self, other: Point) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
    }
}

/// A `width x height` grid indexed `[y][x]`.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    rows: Vec<Vec<Tile>>,
}

impl Grid {
    /// An all-empty grid.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: vec![vec![Tile::Empty; width]; height],
        }
    }

    /// A grid where each cell independently becomes a resource with
    /// probability `resource_percent / 100`.
    pub fn generate<R: Rng>(width: usize, height: usize, resource_percent: u8, rng: &mut R) -> Self {
        let rows = (0..height)
            .map(|_| {
                (0..width)
                    .map(|_| {
                        if rng.random_range(0..100u8) < resource_percent {
                            Tile::Resource
                        } else {
                            Tile::Empty
                        }
                    })
                    .collect()
            })
            .collect();
        Self { width, height, rows }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, at: Point) -> Option<(usize, usize)> {
        let x = usize::try_from(at.x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(at.y).ok().filter(|&y| y < self.height)?;
        Some((x, y))
    }

    pub fn in_bounds(&self, at: Point) -> bool {
        self.index(at).is_some()
    }

    /// The tile at `at`, or `None` off the map.
    pub fn get(&self, at: Point) -> Option<Tile> {
        self.index(at).map(|(x, y)| self.rows[y][x])
    }

    /// Overwrites the tile at `at`. Returns `false` off the map.
    pub fn set(&mut self, at: Point, tile: Tile) -> bool {
        match self.index(at) {
            Some((x, y)) => {
                self.rows[y][x] = tile;
                true
            }
            None => false,
        }
    }

    /// Rows, top to bottom.
    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.rows
    }
}
