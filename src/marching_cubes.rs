//! Parallel Marching Cubes density estimator over the particle field.
//!
//! Ported from `marching_cubes.h`'s two-grid design: a
//! [`DensityEstimatorGrid`] that counts particles per cell and pads
//! the simulation space by one cell in every direction (so density
//! reads zero just outside the fluid volume), and the marching-cube
//! lattice itself, which has one fewer cell per axis and is shifted by
//! half a cube edge so each cube's corners land on density-grid cell
//! centers. The OpenGL buffer/shader half of the original is external
//! collaborator territory and is not part of this core.

use crate::cuboid::Cuboid;
use crate::diagnostics::Diagnostics;
use crate::dispatch::Dispatcher;
use crate::particle::Particle;
use glam::Vec3;
use std::sync::Mutex;

pub const CUBE_EDGE_LENGTH_DEFAULT: f32 = 0.1;
pub const CUBE_EDGE_LENGTH_MIN: f32 = 0.01;
pub const CUBE_EDGE_LENGTH_MAX: f32 = 0.3;

pub const ISOVALUE_DEFAULT: f32 = 0.5;
pub const ISOVALUE_MIN: f32 = 0.1;
pub const ISOVALUE_MAX: f32 = 20.0;

/// Corner offsets in cube-local coordinates, indexed to match the
/// vertex numbering used by the geometry shader: 0=(0,0,0), 1=(1,0,0),
/// 2=(1,0,1), 3=(0,0,1), 4=(0,1,0), 5=(1,1,0), 6=(1,1,1), 7=(0,1,1).
const CORNER_OFFSETS: [(i64, i64, i64); 8] = [
    (0, 0, 0),
    (1, 0, 0),
    (1, 0, 1),
    (0, 0, 1),
    (0, 1, 0),
    (1, 1, 0),
    (1, 1, 1),
    (0, 1, 1),
];

/// One cell of the marching-cube lattice: its minimum corner in world
/// space, the density-estimator count at that same position, and the
/// density value at each of its 8 corners (spec §4.6's `valueVertex0..7`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchingCube {
    pub corner_min: Vec3,
    pub particle_count: i32,
    pub vertex_values: [i32; 8],
}

impl MarchingCube {
    fn at(corner_min: Vec3) -> Self {
        Self {
            corner_min,
            particle_count: 0,
            vertex_values: [0; 8],
        }
    }
}

/// Counts particles per cell of a grid padded by one cell beyond the
/// simulation space in every direction.
struct DensityEstimatorGrid {
    cell_size: f32,
    nx: usize,
    ny: usize,
    nz: usize,
    offset: Vec3,
    counts: Vec<Mutex<i32>>,
}

impl DensityEstimatorGrid {
    fn new(space: &Cuboid, cell_size: f32) -> Self {
        let extent = space.extent();
        let nx = ((extent.x / cell_size).ceil() as usize).max(1) + 2;
        let ny = ((extent.y / cell_size).ceil() as usize).max(1) + 2;
        let nz = ((extent.z / cell_size).ceil() as usize).max(1) + 2;
        let offset = Vec3::new(
            space.x_min - cell_size,
            space.y_min - cell_size,
            space.z_min - cell_size,
        );

        let mut counts = Vec::with_capacity(nx * ny * nz);
        counts.resize_with(nx * ny * nz, || Mutex::new(0));

        Self {
            cell_size,
            nx,
            ny,
            nz,
            offset,
            counts,
        }
    }

    fn discretize(&self, value: f32, origin: f32) -> Option<i64> {
        let rel = (value - origin) / self.cell_size;
        if !rel.is_finite() {
            return None;
        }
        Some(rel.floor() as i64)
    }

    fn axis_indices(&self, pos: Vec3) -> Option<(i64, i64, i64)> {
        Some((
            self.discretize(pos.x, self.offset.x)?,
            self.discretize(pos.y, self.offset.y)?,
            self.discretize(pos.z, self.offset.z)?,
        ))
    }

    fn key_from_indices(&self, ix: i64, iy: i64, iz: i64) -> Option<usize> {
        if ix < 0 || iy < 0 || iz < 0 || ix as usize >= self.nx || iy as usize >= self.ny || iz as usize >= self.nz {
            return None;
        }
        Some(iy as usize + ix as usize * self.ny + iz as usize * self.nx * self.ny)
    }

    fn grid_key(&self, pos: Vec3) -> Option<usize> {
        let (ix, iy, iz) = self.axis_indices(pos)?;
        self.key_from_indices(ix, iy, iz)
    }

    /// World-space position of the center of cell `(ix, iy, iz)`.
    fn cell_center(&self, ix: i64, iy: i64, iz: i64) -> Vec3 {
        self.offset
            + Vec3::new(ix as f32, iy as f32, iz as f32) * self.cell_size
            + Vec3::splat(self.cell_size * 0.5)
    }

    fn count_at(&self, ix: i64, iy: i64, iz: i64) -> i32 {
        match self.key_from_indices(ix, iy, iz) {
            Some(key) => *self.counts[key].lock().unwrap(),
            None => 0,
        }
    }

    fn reset(&self) {
        for c in &self.counts {
            *c.lock().unwrap() = 0;
        }
    }
}

/// Generates marching cubes over the particle field for an external
/// renderer to polygonize.
///
/// Holds a dirty flag so cube positions (and the density grid itself)
/// are only recomputed when the resolution or simulation space
/// changes; `generate` always recomputes vertex values, since the
/// particle field moves every step.
pub struct MarchingCubesGenerator {
    cube_edge_length: f32,
    isovalue: f32,
    density_grid: Option<DensityEstimatorGrid>,
    cubes: Vec<MarchingCube>,
    mc_nx: usize,
    mc_ny: usize,
    mc_nz: usize,
    dirty: bool,
    diagnostics: Option<Diagnostics>,
}

impl Default for MarchingCubesGenerator {
    fn default() -> Self {
        Self {
            cube_edge_length: CUBE_EDGE_LENGTH_DEFAULT,
            isovalue: ISOVALUE_DEFAULT,
            density_grid: None,
            cubes: Vec::new(),
            mc_nx: 0,
            mc_ny: 0,
            mc_nz: 0,
            dirty: true,
            diagnostics: None,
        }
    }
}

impl MarchingCubesGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cube_edge_length(&self) -> f32 {
        self.cube_edge_length
    }

    pub fn isovalue(&self) -> f32 {
        self.isovalue
    }

    /// Sets resolution, clamped to its documented domain. Marks the
    /// generator dirty so the next `generate` reallocates both grids.
    pub fn set_cube_edge_length(&mut self, length: f32) {
        let clamped = length.clamp(CUBE_EDGE_LENGTH_MIN, CUBE_EDGE_LENGTH_MAX);
        if clamped != self.cube_edge_length {
            self.cube_edge_length = clamped;
            self.dirty = true;
        }
    }

    /// Sets the particle-count threshold for "inside the surface".
    /// Does not require regenerating the grids — only `generate`'s
    /// corner-value comparison changes, which happens externally in
    /// the polygonizer this core hands values to.
    pub fn set_isovalue(&mut self, isovalue: f32) {
        self.isovalue = isovalue.clamp(ISOVALUE_MIN, ISOVALUE_MAX);
    }

    /// Marks the generator dirty: call whenever the particle system's
    /// simulation space changes.
    pub fn on_simulation_space_changed(&mut self) {
        self.dirty = true;
    }

    pub fn cubes(&self) -> &[MarchingCube] {
        &self.cubes
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.mc_nx, self.mc_ny, self.mc_nz)
    }

    /// Recomputes density counts and, if dirty, cube positions; always
    /// recomputes the per-cube vertex values against the current
    /// particle field.
    pub fn generate(&mut self, particles: &[Particle], space: &Cuboid, dispatcher: &Dispatcher) {
        if self.dirty || self.density_grid.is_none() {
            self.reallocate(space);
            self.dirty = false;
        }
        self.density_grid.as_ref().unwrap().reset();

        let mut diagnostics = self.diagnostics.take();
        if let Some(diag) = diagnostics.as_mut() {
            diag.measure("mc_density_pass", || self.density_pass(particles, dispatcher));
            diag.measure("mc_vertex_pass", || self.vertex_pass(dispatcher));
        } else {
            self.density_pass(particles, dispatcher);
            self.vertex_pass(dispatcher);
        }
        self.diagnostics = diagnostics;
    }

    /// Turns on per-call timing for the density and vertex passes. Zero
    /// overhead when left off.
    pub fn enable_diagnostics(&mut self) {
        self.diagnostics.get_or_insert_with(Diagnostics::new);
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }

    /// Bucket-counts particles into the density grid (spec §4.6 step 1).
    fn density_pass(&self, particles: &[Particle], dispatcher: &Dispatcher) {
        let grid = self.density_grid.as_ref().unwrap();
        dispatcher.parallel_for_range(particles.len(), |start, end_inclusive| {
            for i in start..=end_inclusive {
                if let Some(key) = grid.grid_key(particles[i].position) {
                    *grid.counts[key].lock().unwrap() += 1;
                }
            }
        });
    }

    /// Samples each cube's 8 corner density cells (spec §4.6 step 2).
    fn vertex_pass(&mut self, dispatcher: &Dispatcher) {
        let grid = self.density_grid.as_ref().unwrap();
        let n = self.cubes.len();
        let cubes = &self.cubes;
        let cube_edge = self.cube_edge_length;

        let mut updated = cubes.clone();
        let updated_mutex = Mutex::new(&mut updated);

        dispatcher.parallel_for_range(n, |start, end_inclusive| {
            let mut local = Vec::with_capacity(end_inclusive + 1 - start);
            for i in start..=end_inclusive {
                let mut cube = cubes[i];
                let Some((ix, iy, iz)) = grid.axis_indices(cube.corner_min + Vec3::splat(cube_edge * 0.5)) else {
                    local.push(cube);
                    continue;
                };
                // the cube's own min-corner maps to density cell (ix, iy, iz)
                let mut values = [0i32; 8];
                for (slot, (dx, dy, dz)) in CORNER_OFFSETS.iter().enumerate() {
                    values[slot] = grid.count_at(ix + dx, iy + dy, iz + dz);
                }
                cube.particle_count = grid.count_at(ix, iy, iz);
                cube.vertex_values = values;
                local.push(cube);
            }
            let mut guard = updated_mutex.lock().unwrap();
            for (offset, cube) in local.into_iter().enumerate() {
                guard[start + offset] = cube;
            }
        });

        self.cubes = updated;
    }

    fn reallocate(&mut self, space: &Cuboid) {
        let grid = DensityEstimatorGrid::new(space, self.cube_edge_length);
        let mc_nx = grid.nx.saturating_sub(1).max(1);
        let mc_ny = grid.ny.saturating_sub(1).max(1);
        let mc_nz = grid.nz.saturating_sub(1).max(1);

        let mut cubes = Vec::with_capacity(mc_nx * mc_ny * mc_nz);
        for ix in 0..mc_nx {
            for iy in 0..mc_ny {
                for iz in 0..mc_nz {
                    let center = grid.cell_center(ix as i64, iy as i64, iz as i64);
                    let corner_min = center - Vec3::splat(self.cube_edge_length * 0.5);
                    cubes.push(MarchingCube::at(corner_min));
                }
            }
        }

        self.mc_nx = mc_nx;
        self.mc_ny = mc_ny;
        self.mc_nz = mc_nz;
        self.cubes = cubes;
        self.density_grid = Some(grid);
    }
}
