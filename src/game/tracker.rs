use super::sector::{Sector, SectorGrid};
use super::types::{Cell, Circle, SnakeId};

/// A moving circle that incrementally tracks which sectors it overlaps.
///
/// Membership is a sorted, duplicate-free list of sector indices. Growth scans a
/// window of cells around a probe circle and is skipped while the probe stays
/// in the same cell; shrink drops every member that no longer intersects the
/// tracker's own circle. What entering or leaving a sector means is supplied by
/// the caller, see [`CollisionBox`] and [`Viewport`].
#[derive(Debug, Clone)]
pub struct RegionTracker {
    pub owner: SnakeId,
    pub circle: Circle,
    sectors: Vec<usize>,
}

impl RegionTracker {
    pub fn new(owner: SnakeId, circle: Circle) -> Self {
        Self {
            owner,
            circle,
            sectors: Vec::new(),
        }
    }

    pub fn sectors(&self) -> &[usize] {
        &self.sectors
    }

    pub fn contains(&self, index: usize) -> bool {
        self.sectors.binary_search(&index).is_ok()
    }

    /// Adds sectors around `probe` when it moved from `from` into a different cell.
    /// Returns how many sectors were added.
    pub fn grow<F>(
        &mut self,
        grid: &mut SectorGrid,
        probe: Circle,
        from: Cell,
        to: Cell,
        on_enter: F,
    ) -> usize
    where
        F: FnMut(&mut Sector, usize),
    {
        if from == to {
            return 0;
        }
        self.fill(grid, probe, on_enter)
    }

    /// Growth without the same-cell shortcut.
    pub fn fill<F>(&mut self, grid: &mut SectorGrid, probe: Circle, mut on_enter: F) -> usize
    where
        F: FnMut(&mut Sector, usize),
    {
        let center = grid.cell_of(probe.center());
        let reach = grid.window_reach(probe.r);
        let mut added = 0;
        for row in center.row - reach..=center.row + reach {
            for col in center.col - reach..=center.col + reach {
                let Some(index) = grid.index_of(Cell { col, row }) else {
                    continue;
                };
                let Err(position) = self.sectors.binary_search(&index) else {
                    continue;
                };
                let Some(sector) = grid.get_mut(index) else { continue };
                if !sector.intersects(&probe) {
                    continue;
                }
                self.sectors.insert(position, index);
                on_enter(sector, index);
                added += 1;
            }
        }
        added
    }

    /// Drops every member whose sector no longer intersects `self.circle`.
    /// Returns how many sectors were removed.
    pub fn shrink<F>(&mut self, grid: &mut SectorGrid, mut on_leave: F) -> usize
    where
        F: FnMut(&mut Sector, usize),
    {
        let circle = self.circle;
        let before = self.sectors.len();
        self.sectors.retain(|&index| {
            let Some(sector) = grid.get_mut(index) else {
                return false;
            };
            if sector.intersects(&circle) {
                return true;
            }
            on_leave(sector, index);
            false
        });
        before - self.sectors.len()
    }

    fn take_sectors(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.sectors)
    }
}

/// Tracker that registers its owner in every overlapped sector so peers can find it.
#[derive(Debug, Clone)]
pub struct CollisionBox {
    tracker: RegionTracker,
}

impl CollisionBox {
    pub fn new(owner: SnakeId, circle: Circle) -> Self {
        Self {
            tracker: RegionTracker::new(owner, circle),
        }
    }

    pub fn tracker(&self) -> &RegionTracker {
        &self.tracker
    }

    pub fn circle(&self) -> Circle {
        self.tracker.circle
    }

    pub fn set_circle(&mut self, circle: Circle) {
        self.tracker.circle = circle;
    }

    pub fn sectors(&self) -> &[usize] {
        self.tracker.sectors()
    }

    pub fn grow(&mut self, grid: &mut SectorGrid, probe: Circle, from: Cell, to: Cell) -> usize {
        let owner = self.tracker.owner;
        self.tracker
            .grow(grid, probe, from, to, |sector, _| sector.add_occupant(owner))
    }

    pub fn fill(&mut self, grid: &mut SectorGrid, probe: Circle) -> usize {
        let owner = self.tracker.owner;
        self.tracker
            .fill(grid, probe, |sector, _| sector.add_occupant(owner))
    }

    pub fn shrink(&mut self, grid: &mut SectorGrid) -> usize {
        let owner = self.tracker.owner;
        self.tracker
            .shrink(grid, |sector, _| sector.remove_occupant(owner))
    }

    /// Removes the owner from every sector it was registered in.
    pub fn unregister(&mut self, grid: &mut SectorGrid) {
        let owner = self.tracker.owner;
        for index in self.tracker.take_sectors() {
            if let Some(sector) = grid.get_mut(index) {
                sector.remove_occupant(owner);
            }
        }
    }
}

/// Per-client tracker that records sector enter/leave events since the last drain.
///
/// `entered` and `left` are always exact set differences between the membership
/// at the last drain and the current membership: a sector that comes and goes
/// between drains appears in neither.
#[derive(Debug, Clone)]
pub struct Viewport {
    tracker: RegionTracker,
    entered: Vec<usize>,
    left: Vec<usize>,
}

impl Viewport {
    pub fn new(owner: SnakeId, circle: Circle) -> Self {
        Self {
            tracker: RegionTracker::new(owner, circle),
            entered: Vec::new(),
            left: Vec::new(),
        }
    }

    pub fn tracker(&self) -> &RegionTracker {
        &self.tracker
    }

    pub fn circle(&self) -> Circle {
        self.tracker.circle
    }

    pub fn set_circle(&mut self, circle: Circle) {
        self.tracker.circle = circle;
    }

    pub fn sectors(&self) -> &[usize] {
        self.tracker.sectors()
    }

    pub fn entered(&self) -> &[usize] {
        &self.entered
    }

    pub fn left(&self) -> &[usize] {
        &self.left
    }

    pub fn grow(&mut self, grid: &mut SectorGrid, from: Cell, to: Cell) -> usize {
        let probe = self.tracker.circle;
        let entered = &mut self.entered;
        let left = &mut self.left;
        self.tracker.grow(grid, probe, from, to, |_, index| {
            record(entered, left, index)
        })
    }

    pub fn fill(&mut self, grid: &mut SectorGrid) -> usize {
        let probe = self.tracker.circle;
        let entered = &mut self.entered;
        let left = &mut self.left;
        self.tracker
            .fill(grid, probe, |_, index| record(entered, left, index))
    }

    pub fn shrink(&mut self, grid: &mut SectorGrid) -> usize {
        let entered = &mut self.entered;
        let left = &mut self.left;
        self.tracker
            .shrink(grid, |_, index| record(left, entered, index))
    }

    pub fn take_entered(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.entered)
    }

    pub fn take_left(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.left)
    }

    pub fn clear_deltas(&mut self) {
        self.entered.clear();
        self.left.clear();
    }
}

/// Notes `index` in `gained` unless it cancels a pending entry in `lost`.
fn record(gained: &mut Vec<usize>, lost: &mut Vec<usize>, index: usize) {
    if let Some(position) = lost.iter().position(|&pending| pending == index) {
        lost.swap_remove(position);
        return;
    }
    if !gained.contains(&index) {
        gained.push(index);
    }
}
