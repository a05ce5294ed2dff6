use anyhow::Result;
use rayon::prelude::*;
use stigmergy_common::DiffusionMode;

/// Square toroidal grid holding the pheromone trace.
///
/// Values live in `[0, 1]`. Only deposition and diffusion mutate it; potential from
/// resources and adversaries is layered on by callers, never stored here.
#[derive(Debug, Clone)]
pub struct PheromoneField {
    size: usize,
    cells: Vec<f32>,
    mode: DiffusionMode,
    // Read buffer for double-buffered diffusion; empty in in-place mode.
    scratch: Vec<f32>,
}

// Floors a continuous coordinate and wraps it onto the torus.
// `as i64` saturates infinities and maps NaN to 0, so the result is always in range.
#[inline(always)]
fn wrap_cell(v: f32, size: usize) -> usize {
    let cell = v.floor() as i64;
    cell.rem_euclid(size as i64) as usize
}

// Mean of a cell and its four axis neighbours, scaled by `decay`.
// Accumulates in f64 and rounds once when the result is stored.
#[inline(always)]
fn stencil(center: f32, up: f32, down: f32, left: f32, right: f32, decay: f32) -> f32 {
    let sum = center as f64 + up as f64 + down as f64 + left as f64 + right as f64;
    ((sum / 5.0) * decay as f64) as f32
}

impl PheromoneField {
    /// Allocates a zeroed field of `size * size` cells.
    pub fn new(size: usize, mode: DiffusionMode) -> Result<Self> {
        if size == 0 {
            anyhow::bail!("Pheromone field size must be positive.");
        }
        let num_cells = size
            .checked_mul(size)
            .ok_or_else(|| anyhow::anyhow!("Pheromone field size {} overflows.", size))?;
        let scratch = match mode {
            DiffusionMode::InPlace => Vec::new(),
            DiffusionMode::DoubleBuffered => vec![0.0; num_cells],
        };
        Ok(Self {
            size,
            cells: vec![0.0; num_cells],
            mode,
            scratch,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn mode(&self) -> DiffusionMode {
        self.mode
    }

    /// Row-major cell values (`iy * size + ix`).
    pub fn values(&self) -> &[f32] {
        &self.cells
    }

    /// Resets every cell to 0.
    pub fn clear(&mut self) {
        self.cells.fill(0.0);
    }

    /// Cell coordinates enclosing a continuous point, after toroidal wrap.
    #[inline(always)]
    pub fn cell_coords(&self, x: f32, y: f32) -> (usize, usize) {
        (wrap_cell(x, self.size), wrap_cell(y, self.size))
    }

    #[inline(always)]
    fn index(&self, x: f32, y: f32) -> usize {
        let (ix, iy) = self.cell_coords(x, y);
        iy * self.size + ix
    }

    /// Value at integer cell coordinates; coordinates are wrapped first.
    #[inline(always)]
    pub fn value_at(&self, ix: usize, iy: usize) -> f32 {
        self.cells[(iy % self.size) * self.size + ix % self.size]
    }

    /// Raw trace value at a continuous point.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        self.cells[self.index(x, y)]
    }

    /// Adds `amount` to the enclosing cell, saturating at 1.
    pub fn deposit(&mut self, x: f32, y: f32, amount: f32) {
        if !amount.is_finite() {
            log::warn!("Ignoring non-finite deposit amount {} at ({}, {}).", amount, x, y);
            return;
        }
        let idx = self.index(x, y);
        self.cells[idx] = (self.cells[idx] + amount).clamp(0.0, 1.0);
    }

    /// One diffusion pass: each cell becomes the mean of itself and its four axis
    /// neighbours, scaled by `decay`.
    ///
    /// In [`DiffusionMode::InPlace`] the pass walks rows top to bottom and writes back
    /// immediately, so the up and left neighbours have already been diffused this tick.
    /// [`DiffusionMode::DoubleBuffered`] reads only last tick's values.
    pub fn diffuse_and_decay(&mut self, decay: f32) {
        match self.mode {
            DiffusionMode::InPlace => self.diffuse_in_place(decay),
            DiffusionMode::DoubleBuffered => self.diffuse_double_buffered(decay),
        }
    }

    fn diffuse_in_place(&mut self, decay: f32) {
        let n = self.size;
        let cells = &mut self.cells;
        for y in 0..n {
            let up = if y == 0 { n - 1 } else { y - 1 };
            let down = if y + 1 == n { 0 } else { y + 1 };
            for x in 0..n {
                let left = if x == 0 { n - 1 } else { x - 1 };
                let right = if x + 1 == n { 0 } else { x + 1 };
                let i = y * n + x;
                cells[i] = stencil(
                    cells[i],
                    cells[up * n + x],
                    cells[down * n + x],
                    cells[y * n + left],
                    cells[y * n + right],
                    decay,
                );
            }
        }
    }

    fn diffuse_double_buffered(&mut self, decay: f32) {
        let n = self.size;
        if self.scratch.len() != self.cells.len() {
            self.scratch = vec![0.0; self.cells.len()];
        }
        self.scratch.copy_from_slice(&self.cells);
        let prev = &self.scratch;

        // Rows only read `prev`, so they can be computed independently.
        self.cells
            .par_chunks_mut(n)
            .enumerate()
            .for_each(|(y, row)| {
                let up = if y == 0 { n - 1 } else { y - 1 };
                let down = if y + 1 == n { 0 } else { y + 1 };
                for (x, out) in row.iter_mut().enumerate() {
                    let left = if x == 0 { n - 1 } else { x - 1 };
                    let right = if x + 1 == n { 0 } else { x + 1 };
                    *out = stencil(
                        prev[y * n + x],
                        prev[up * n + x],
                        prev[down * n + x],
                        prev[y * n + left],
                        prev[y * n + right],
                        decay,
                    );
                }
            });
    }

    /// Largest cell value.
    pub fn max_value(&self) -> f32 {
        self.cells.iter().copied().fold(0.0, f32::max)
    }

    /// Sum over all cells.
    pub fn total(&self) -> f32 {
        self.cells.iter().sum()
    }

    /// Number of cells holding any trace.
    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|&&v| v > 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(PheromoneField::new(0, DiffusionMode::InPlace).is_err());
    }

    #[test]
    fn deposit_saturates_at_one() {
        let mut field = PheromoneField::new(8, DiffusionMode::InPlace).unwrap();
        for _ in 0..5 {
            field.deposit(3.2, 4.9, 0.5);
        }
        assert_eq!(field.sample(3.0, 4.0), 1.0);
        field.deposit(3.2, 4.9, -4.0);
        assert_eq!(field.sample(3.0, 4.0), 0.0);
    }

    #[test]
    fn deposit_wraps_toroidally() {
        let n = 200usize;
        let mut a = PheromoneField::new(n, DiffusionMode::InPlace).unwrap();
        let mut b = PheromoneField::new(n, DiffusionMode::InPlace).unwrap();
        a.deposit(n as f32 + 1.0, -1.0, 0.3);
        b.deposit(1.0, n as f32 - 1.0, 0.3);
        assert_eq!(a.values(), b.values());
        assert_eq!(a.value_at(1, n - 1), 0.3);
    }

    #[test]
    fn sampling_never_leaves_the_grid() {
        let field = PheromoneField::new(16, DiffusionMode::InPlace).unwrap();
        for &(x, y) in &[
            (f32::NAN, 3.0),
            (f32::INFINITY, f32::NEG_INFINITY),
            (-1e30, 1e30),
            (-0.0001, 15.9999),
            (-33.5, 47.2),
        ] {
            let (ix, iy) = field.cell_coords(x, y);
            assert!(ix < 16 && iy < 16);
            assert_eq!(field.sample(x, y), 0.0);
        }
        assert_eq!(field.cell_coords(-0.5, 16.5), (15, 0));
    }

    #[test]
    fn in_place_pass_reads_updated_neighbours() {
        let mut field = PheromoneField::new(3, DiffusionMode::InPlace).unwrap();
        field.deposit(0.0, 0.0, 1.0);
        field.diffuse_and_decay(1.0);

        assert!(close(field.value_at(0, 0), 0.2));
        assert!(close(field.value_at(1, 0), 0.04));
        assert!(close(field.value_at(2, 0), 0.048));
        assert!(close(field.value_at(0, 1), 0.04));
        assert!(close(field.value_at(1, 1), 0.016));
        assert!(close(field.value_at(2, 2), 0.02752));
    }

    #[test]
    fn double_buffered_pass_is_isotropic() {
        let mut field = PheromoneField::new(3, DiffusionMode::DoubleBuffered).unwrap();
        field.deposit(0.0, 0.0, 1.0);
        field.diffuse_and_decay(1.0);

        for (ix, iy) in [(0, 0), (1, 0), (2, 0), (0, 1), (0, 2)] {
            assert!(close(field.value_at(ix, iy), 0.2));
        }
        for (ix, iy) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            assert_eq!(field.value_at(ix, iy), 0.0);
        }
        assert!(close(field.total(), 1.0));
    }

    #[test]
    fn uniform_field_decays() {
        let mut buffered = PheromoneField::new(10, DiffusionMode::DoubleBuffered).unwrap();
        let mut in_place = PheromoneField::new(10, DiffusionMode::InPlace).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                buffered.deposit(x as f32, y as f32, 0.5);
                in_place.deposit(x as f32, y as f32, 0.5);
            }
        }
        buffered.diffuse_and_decay(0.9);
        in_place.diffuse_and_decay(0.9);

        assert!(buffered.values().iter().all(|&v| close(v, 0.45)));
        assert!(close(in_place.value_at(0, 0), 0.45));
        assert!(in_place.values().iter().all(|&v| v > 0.0 && v <= 0.45 + 1e-6));
    }

    #[test]
    fn in_place_pass_rounds_once_per_cell() {
        let n = 20usize;
        let mut field = PheromoneField::new(n, DiffusionMode::InPlace).unwrap();
        let mut expected = vec![0.0f32; n * n];
        for (i, (x, y)) in [(3, 4), (17, 0), (0, 19), (10, 10), (11, 10)].into_iter().enumerate() {
            let amount = 0.13 + 0.17 * i as f32;
            field.deposit(x as f32, y as f32, amount);
            expected[y * n + x] = amount;
        }

        for _ in 0..5 {
            field.diffuse_and_decay(0.93);
            for y in 0..n {
                for x in 0..n {
                    let at = |xx: usize, yy: usize| expected[yy * n + xx] as f64;
                    let sum = at(x, y)
                        + at(x, (y + n - 1) % n)
                        + at(x, (y + 1) % n)
                        + at((x + n - 1) % n, y)
                        + at((x + 1) % n, y);
                    expected[y * n + x] = ((sum / 5.0) * 0.93f32 as f64) as f32;
                }
            }
        }
        assert_eq!(field.values(), expected.as_slice());
    }

    #[test]
    fn single_cell_field_only_decays() {
        let mut field = PheromoneField::new(1, DiffusionMode::InPlace).unwrap();
        field.deposit(0.4, 0.7, 0.5);
        field.diffuse_and_decay(0.8);
        assert!(close(field.value_at(0, 0), 0.4));
    }

    #[test]
    fn clear_and_stats() {
        let mut field = PheromoneField::new(4, DiffusionMode::InPlace).unwrap();
        assert_eq!(field.size(), 4);
        assert_eq!(field.mode(), DiffusionMode::InPlace);
        field.deposit(0.0, 0.0, 0.25);
        field.deposit(2.0, 3.0, 0.75);
        assert_eq!(field.max_value(), 0.75);
        assert_eq!(field.total(), 1.0);
        assert_eq!(field.occupied_cells(), 2);
        field.clear();
        assert_eq!(field.total(), 0.0);
        assert_eq!(field.occupied_cells(), 0);
    }
}
