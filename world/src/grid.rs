//! Playable-area grid derived from the room layout.

use whispers_core::{CellCoord, RoomLayout, Vec2};

/// Dense walkability grid quantised from the room layout.
///
/// A cell is walkable when its centre lies inside at least one room. The
/// grid is immutable once built; a new layout produces a new grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayableGrid {
    columns: u32,
    rows: u32,
    cell_size: f32,
    walkable: Vec<bool>,
}

impl PlayableGrid {
    /// Builds the grid covering `arena` (width, height) in world units.
    #[must_use]
    pub fn build(layout: &RoomLayout, cell_size: f32, arena: Vec2) -> Self {
        if cell_size <= 0.0 || !arena.is_finite() || arena.x <= 0.0 || arena.y <= 0.0 {
            return Self {
                cell_size,
                ..Self::default()
            };
        }

        let columns = (arena.x / cell_size).ceil() as u32;
        let rows = (arena.y / cell_size).ceil() as u32;
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        let mut walkable = Vec::with_capacity(capacity);

        for row in 0..rows {
            for column in 0..columns {
                let center = CellCoord::new(column, row).center(cell_size);
                walkable.push(layout.is_position_playable(center));
            }
        }

        Self {
            columns,
            rows,
            cell_size,
            walkable,
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Reports whether the cell lies inside the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell is walkable. Out-of-bounds cells never are.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.walkable.get(index).copied())
            .unwrap_or(false)
    }

    /// Reports whether the cell containing `position` is walkable.
    #[must_use]
    pub fn is_position_walkable(&self, position: Vec2) -> bool {
        self.cell_of(position)
            .map_or(false, |cell| self.is_walkable(cell))
    }

    /// Cell containing `position`, if it lies inside the grid.
    #[must_use]
    pub fn cell_of(&self, position: Vec2) -> Option<CellCoord> {
        CellCoord::from_position(position, self.cell_size).filter(|cell| self.contains(*cell))
    }

    /// Centre point of `cell` in world units.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        cell.center(self.cell_size)
    }

    /// Walkable cells in row-major order.
    pub fn walkable_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.columns;
        self.walkable
            .iter()
            .enumerate()
            .filter(|(_, walkable)| **walkable)
            .filter_map(move |(index, _)| {
                let index = u32::try_from(index).ok()?;
                Some(CellCoord::new(index % columns, index / columns))
            })
    }

    /// Walkable cells sharing an edge with `cell`, in N, E, S, W order.
    pub fn walkable_neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        neighbors(cell, self.columns, self.rows).filter(move |neighbor| self.is_walkable(*neighbor))
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let width = usize::try_from(self.columns).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.walkable.len()
    }
}

fn neighbors(cell: CellCoord, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < width {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < height {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}
