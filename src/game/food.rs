//! Food placement on a free cell

use std::collections::HashSet;

use rand::Rng;

use super::grid::{Cell, Grid};
use crate::config::FOOD_PLACEMENT_ATTEMPTS;

/// Pick a random cell not in `occupied`.
///
/// Samples uniformly up to [`FOOD_PLACEMENT_ATTEMPTS`] times, then scans the
/// free cells and picks one of them, so the call always terminates. Returns
/// `None` only when the board is full.
pub fn place<R: Rng + ?Sized>(grid: &Grid, occupied: &HashSet<Cell>, rng: &mut R) -> Option<Cell> {
    if grid.area() == 0 {
        return None;
    }

    for _ in 0..FOOD_PLACEMENT_ATTEMPTS {
        let cell = Cell::new(rng.gen_range(0..grid.width), rng.gen_range(0..grid.height));
        if !occupied.contains(&cell) {
            return Some(cell);
        }
    }

    let free: Vec<Cell> = grid.cells().filter(|c| !occupied.contains(c)).collect();
    if free.is_empty() {
        None
    } else {
        Some(free[rng.gen_range(0..free.len())])
    }
}
