//! Axial hex coordinates and the six clockwise neighbor directions.

use std::fmt;

/// An axial coordinate `(q, r)` on a hexagonal grid of pointy-top cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

impl Axial {
    pub fn new(q: i32, r: i32) -> Self {
        Axial { q, r }
    }

    /// Whether this coordinate lies within a hex grid of the given radius.
    pub fn in_bounds(self, radius: u32) -> bool {
        let radius = radius as i64;
        let q = self.q as i64;
        let r = self.r as i64;
        q.abs() <= radius && r.abs() <= radius && (q + r).abs() <= radius
    }

    /// The neighbor in the given direction.
    pub fn neighbor(self, dir: Direction) -> Axial {
        let (dq, dr) = dir.offset();
        Axial::new(self.q + dq, self.r + dr)
    }

    /// All in-bounds coordinates of a radius-`radius` hex grid, in `(q, r)`
    /// lexicographic order.
    pub fn all_in_bounds(radius: u32) -> Vec<Axial> {
        let r = radius as i32;
        let mut coords = Vec::new();
        for q in -r..=r {
            for rr in -r..=r {
                let a = Axial::new(q, rr);
                if a.in_bounds(radius) {
                    coords.push(a);
                }
            }
        }
        coords
    }
}

impl fmt::Display for Axial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// One of the six hex neighbor directions, numbered clockwise `1..=6` from
/// upper-right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Direction(u8);

impl Direction {
    /// Builds a direction from a literal `1..=6`. Returns `None` out of range.
    pub fn new(d: u32) -> Option<Self> {
        if (1..=6).contains(&d) {
            Some(Direction(d as u8))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// All six directions in clockwise order.
    pub fn all() -> [Direction; 6] {
        [
            Direction(1),
            Direction(2),
            Direction(3),
            Direction(4),
            Direction(5),
            Direction(6),
        ]
    }

    /// Rotates this direction clockwise by `k` steps (`k` taken mod 6,
    /// negative allowed). Implements invariant I5: `new = ((d-1+k) mod 6)+1`.
    pub fn rotate(self, k: i32) -> Direction {
        let d = self.0 as i32 - 1;
        let k = k.rem_euclid(6);
        let new = (d + k).rem_euclid(6);
        Direction((new + 1) as u8)
    }

    /// The back-direction: the direction a neighbor at this position would
    /// need to point to face the center.
    pub fn back(self) -> Direction {
        self.rotate(3)
    }

    /// The clockwise axial offset `(dq, dr)` for this direction.
    pub fn offset(self) -> (i32, i32) {
        match self.0 {
            1 => (1, -1),  // upper-right (NE)
            2 => (1, 0),   // right (E)
            3 => (0, 1),   // lower-right (SE)
            4 => (-1, 1),  // lower-left (SW)
            5 => (-1, 0),  // left (W)
            6 => (0, -1),  // upper-left (NW)
            _ => unreachable!("Direction is always 1..=6"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_radius_one() {
        let coords = Axial::all_in_bounds(1);
        assert_eq!(coords.len(), 7);
        assert!(coords.contains(&Axial::new(0, 0)));
        assert!(!Axial::new(2, 0).in_bounds(1));
    }

    #[test]
    fn rotation_wraps() {
        let d6 = Direction::new(6).unwrap();
        assert_eq!(d6.rotate(1), Direction::new(1).unwrap());
        assert_eq!(d6.rotate(3).rotate(3), d6);
    }

    #[test]
    fn back_direction_is_opposite() {
        for d in Direction::all() {
            assert_eq!(d.back().back(), d);
            assert_ne!(d.back(), d);
        }
    }

    #[test]
    fn neighbor_offsets_are_distinct_and_closed() {
        let offsets: Vec<_> = Direction::all().iter().map(|d| d.offset()).collect();
        for (i, a) in offsets.iter().enumerate() {
            for (j, b) in offsets.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b);
                }
            }
        }
        let sum: (i32, i32) = offsets
            .iter()
            .fold((0, 0), |(sq, sr), (dq, dr)| (sq + dq, sr + dr));
        assert_eq!(sum, (0, 0));
    }
}
