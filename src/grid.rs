use crate::error::PlanError;

/// Occupancy of a single seat. Matrix encoding is 0 = free, 1 = occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Free,
    Occupied,
}

impl Occupancy {
    pub fn flipped(self) -> Self {
        match self {
            Occupancy::Free => Occupancy::Occupied,
            Occupancy::Occupied => Occupancy::Free,
        }
    }

    fn from_matrix_value(v: u8) -> Self {
        if v == 1 {
            Occupancy::Occupied
        } else {
            Occupancy::Free
        }
    }
}

/// Occupancy bitmap for an N x N seating grid, row-major, index = row*n + col.
///
/// Created once at mount and discarded at teardown; only the input controller
/// mutates it, through `toggle`. Out-of-range indices are a precondition
/// violation here, never clamped (clamping happens in the coordinate mapper).
#[derive(Debug, Clone)]
pub struct GridState {
    n: usize,
    cells: Vec<Occupancy>,
}

impl GridState {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![Occupancy::Free; n * n],
        }
    }

    /// Builds state from the occupancy-source matrix. The provider contract
    /// guarantees the shape; rows beyond `n` or short rows are not checked.
    pub fn from_rows(n: usize, rows: &[Vec<u8>]) -> Self {
        let mut state = Self::new(n);
        for (row, values) in rows.iter().enumerate().take(n) {
            for (col, &v) in values.iter().enumerate().take(n) {
                state.cells[row * n + col] = Occupancy::from_matrix_value(v);
            }
        }
        state
    }

    pub fn dimension(&self) -> usize {
        self.n
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Occupancy, PlanError> {
        let idx = self.index(row, col)?;
        Ok(self.cells[idx])
    }

    /// Flips the cell and returns the new value.
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<Occupancy, PlanError> {
        let idx = self.index(row, col)?;
        self.cells[idx] = self.cells[idx].flipped();
        Ok(self.cells[idx])
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, PlanError> {
        if row >= self.n || col >= self.n {
            return Err(PlanError::InvalidIndex {
                row,
                col,
                n: self.n,
            });
        }
        Ok(row * self.n + col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_an_involution() {
        let mut grid = GridState::new(15);
        for row in 0..15 {
            for col in 0..15 {
                let before = grid.get(row, col).unwrap();
                grid.toggle(row, col).unwrap();
                grid.toggle(row, col).unwrap();
                assert_eq!(grid.get(row, col).unwrap(), before);
            }
        }
    }

    #[test]
    fn toggle_returns_new_value() {
        let mut grid = GridState::new(3);
        assert_eq!(grid.toggle(1, 2).unwrap(), Occupancy::Occupied);
        assert_eq!(grid.toggle(1, 2).unwrap(), Occupancy::Free);
    }

    #[test]
    fn out_of_range_is_an_error() {
        let mut grid = GridState::new(4);
        assert!(matches!(
            grid.toggle(4, 0),
            Err(PlanError::InvalidIndex { row: 4, col: 0, n: 4 })
        ));
        assert!(grid.get(0, 4).is_err());
        assert!(grid.get(0, 3).is_ok());
    }

    #[test]
    fn from_rows_reads_zero_as_free_one_as_occupied() {
        let rows = vec![vec![0, 1], vec![1, 0]];
        let grid = GridState::from_rows(2, &rows);
        assert_eq!(grid.get(0, 0).unwrap(), Occupancy::Free);
        assert_eq!(grid.get(0, 1).unwrap(), Occupancy::Occupied);
        assert_eq!(grid.get(1, 0).unwrap(), Occupancy::Occupied);
        assert_eq!(grid.get(1, 1).unwrap(), Occupancy::Free);
    }
}
