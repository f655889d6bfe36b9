//! The client's mirror of the shared board.

use crate::color::Rgb;
use crate::config::GridConfig;
use crate::protocol::{Snapshot, SnapshotResult};

/// A cell is either unset or holds a color.
///
/// Black is a legal color distinct from unset here. The wire format encodes
/// unset as `0`, so a black cell reads back as unset after it round-trips
/// through a [`Snapshot`].
pub type Cell = Option<Rgb>;

/// Row/column address of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Fixed-size grid of cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl GridState {
    /// Create an all-unset grid.
    pub fn new(config: GridConfig) -> Self {
        Self {
            rows: config.rows(),
            cols: config.cols(),
            cells: vec![None; config.cell_count()],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: CellPos) -> Option<usize> {
        self.contains(pos).then(|| pos.row * self.cols + pos.col)
    }

    /// Color of a cell, or `None` when unset or out of bounds.
    pub fn get(&self, pos: CellPos) -> Cell {
        self.index(pos).and_then(|i| self.cells[i])
    }

    /// Whether the cell holds a color.
    pub fn is_active(&self, pos: CellPos) -> bool {
        self.get(pos).is_some()
    }

    /// Set a cell. Returns false if `pos` is out of bounds.
    pub fn set(&mut self, pos: CellPos, cell: Cell) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Unset every cell.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Number of cells holding a color.
    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Iterate rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols.max(1))
    }

    /// Packed wire representation, `0` for unset.
    pub fn to_packed(&self) -> Vec<Vec<u32>> {
        self.iter_rows()
            .map(|row| row.iter().map(|&c| c.map_or(0, Rgb::to_packed)).collect())
            .collect()
    }

    /// Replace the whole grid with a snapshot.
    ///
    /// The snapshot is validated first; on error the grid is left untouched.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> SnapshotResult<()> {
        snapshot.validate(self.rows, self.cols)?;

        for (dst, &value) in self.cells.iter_mut().zip(snapshot.rows.iter().flatten()) {
            *dst = match value {
                0 => None,
                packed => Rgb::from_packed(packed),
            };
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SnapshotError;

    fn grid(rows: usize, cols: usize) -> GridState {
        GridState::new(GridConfig::new(rows, cols).unwrap())
    }

    #[test]
    fn test_new_grid_is_unset() {
        let g = grid(16, 32);
        assert_eq!(g.rows(), 16);
        assert_eq!(g.cols(), 32);
        assert_eq!(g.active_count(), 0);
        assert!(g.to_packed().iter().flatten().all(|&v| v == 0));
    }

    #[test]
    fn test_set_and_get() {
        let mut g = grid(2, 3);
        let red = Rgb::new(255, 0, 0);
        assert!(g.set(CellPos::new(1, 2), Some(red)));
        assert_eq!(g.get(CellPos::new(1, 2)), Some(red));
        assert!(g.is_active(CellPos::new(1, 2)));
        assert!(!g.is_active(CellPos::new(0, 0)));
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut g = grid(2, 2);
        assert!(!g.set(CellPos::new(2, 0), Some(Rgb::WHITE)));
        assert!(!g.set(CellPos::new(0, 2), Some(Rgb::WHITE)));
        assert_eq!(g.get(CellPos::new(5, 5)), None);
        assert_eq!(g.active_count(), 0);
    }

    #[test]
    fn test_apply_snapshot_overwrites_everything() {
        let mut g = grid(2, 2);
        g.set(CellPos::new(0, 0), Some(Rgb::new(255, 0, 0)));
        g.set(CellPos::new(1, 1), Some(Rgb::new(0, 0, 255)));

        let snapshot = Snapshot::new(vec![vec![0, 16_711_680], vec![0, 0]]);
        g.apply_snapshot(&snapshot).unwrap();

        assert_eq!(g.to_packed(), snapshot.rows);
        assert!(!g.is_active(CellPos::new(0, 0)));
        assert!(!g.is_active(CellPos::new(1, 1)));
    }

    #[test]
    fn test_apply_snapshot_totality_over_prior_states() {
        let target = Snapshot::new(vec![vec![0x123456, 0], vec![0, 0xFFFFFF]]);
        let priors = [
            Snapshot::empty(2, 2),
            Snapshot::new(vec![vec![1, 2], vec![3, 4]]),
            target.clone(),
        ];

        for prior in &priors {
            let mut g = grid(2, 2);
            g.apply_snapshot(prior).unwrap();
            g.apply_snapshot(&target).unwrap();
            assert_eq!(g.to_packed(), target.rows);
        }
    }

    #[test]
    fn test_malformed_snapshot_keeps_previous_state() {
        let mut g = grid(2, 2);
        g.set(CellPos::new(0, 1), Some(Rgb::new(1, 2, 3)));
        let before = g.clone();

        let wrong_rows = Snapshot::new(vec![vec![0, 0]]);
        assert!(matches!(
            g.apply_snapshot(&wrong_rows),
            Err(SnapshotError::RowCount { .. })
        ));

        // First row valid, second row too wide: nothing may be applied.
        let half_valid = Snapshot::new(vec![vec![0xFF, 0xFF], vec![0x0100_0000, 0]]);
        assert!(g.apply_snapshot(&half_valid).is_err());

        assert_eq!(g, before);
    }

    #[test]
    fn test_black_is_distinct_locally_but_conflated_on_the_wire() {
        let mut g = grid(1, 1);
        let pos = CellPos::new(0, 0);

        g.set(pos, Some(Rgb::BLACK));
        assert!(g.is_active(pos));
        assert_eq!(g.to_packed(), vec![vec![0]]);

        let echoed = Snapshot::new(g.to_packed());
        g.apply_snapshot(&echoed).unwrap();
        assert!(!g.is_active(pos));
    }

    #[test]
    fn test_packed_shape_matches_dimensions() {
        let g = grid(2, 3);
        let packed = g.to_packed();
        assert_eq!(packed.len(), g.rows());
        assert!(packed.iter().all(|row| row.len() == g.cols()));
    }

    #[test]
    fn test_clear() {
        let mut g = grid(2, 2);
        g.set(CellPos::new(0, 0), Some(Rgb::WHITE));
        g.set(CellPos::new(1, 0), Some(Rgb::WHITE));
        g.clear();
        assert_eq!(g.active_count(), 0);
    }
}
