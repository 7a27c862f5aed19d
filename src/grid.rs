use crate::cuboid::Cuboid;
use crate::particle::Particle;
use glam::Vec3;
use std::sync::Mutex;

/// Bucket-partitioned spatial grid over a fixed simulation box, cell
/// edge length `h` (kernel radius).
///
/// Restructured from the teacher's `SpatialHashGrid` (an open hash
/// table of unbounded size) into the bucket array spec §3/§4.2
/// describe: a flat `Vec` of buckets sized to `(nx, ny, nz)` derived
/// from the simulation-space extents, each bucket an ordered
/// collection of particle copies, keyed with the Y-major formula
/// `iy + ix*ny + iz*nx*ny`.
///
/// `gridKey` returns `None` (the spec's `-1`) for any position outside
/// the grid volume: this resolves spec §9's open question on whether
/// out-of-range keys should wrap. They do not — out-of-range is
/// always rejected, never folded back in with modulo arithmetic.
pub struct SpatialGrid {
    cell_size: f32,
    nx: usize,
    ny: usize,
    nz: usize,
    /// World-to-grid offset: `grid_coord = floor((pos - offset) / cell_size)`.
    offset: Vec3,
    buckets: Vec<Mutex<Vec<Particle>>>,
}

impl SpatialGrid {
    /// Build an (empty) grid sized to cover `space` with cells of edge
    /// `cell_size` (the kernel radius `h`). Dimensions are rounded up
    /// so every point in `space` maps to a valid cell.
    pub fn new(space: &Cuboid, cell_size: f32) -> Self {
        let extent = space.extent();
        let nx = ((extent.x / cell_size).ceil() as usize).max(1);
        let ny = ((extent.y / cell_size).ceil() as usize).max(1);
        let nz = ((extent.z / cell_size).ceil() as usize).max(1);
        let offset = Vec3::new(space.x_min, space.y_min, space.z_min);

        let bucket_count = nx * ny * nz;
        let mut buckets = Vec::with_capacity(bucket_count);
        buckets.resize_with(bucket_count, || Mutex::new(Vec::new()));

        Self {
            cell_size,
            nx,
            ny,
            nz,
            offset,
            buckets,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    #[inline]
    fn discretize(&self, value: f32, origin: f32) -> Option<i64> {
        let rel = (value - origin) / self.cell_size;
        if !rel.is_finite() {
            return None;
        }
        Some(rel.floor() as i64)
    }

    #[inline]
    fn axis_indices(&self, pos: Vec3) -> Option<(i64, i64, i64)> {
        let ix = self.discretize(pos.x, self.offset.x)?;
        let iy = self.discretize(pos.y, self.offset.y)?;
        let iz = self.discretize(pos.z, self.offset.z)?;
        Some((ix, iy, iz))
    }

    /// Returns the grid key for `pos`, or `None` if `pos` lies outside
    /// the grid volume (spec's `-1`).
    pub fn grid_key(&self, pos: Vec3) -> Option<usize> {
        let (ix, iy, iz) = self.axis_indices(pos)?;
        self.key_from_indices(ix, iy, iz)
    }

    fn key_from_indices(&self, ix: i64, iy: i64, iz: i64) -> Option<usize> {
        if ix < 0
            || iy < 0
            || iz < 0
            || ix as usize >= self.nx
            || iy as usize >= self.ny
            || iz as usize >= self.nz
        {
            return None;
        }
        Some(iy as usize + ix as usize * self.ny + iz as usize * self.nx * self.ny)
    }

    /// Clears all buckets, then inserts every particle into the bucket
    /// for its own position. Particles outside the grid volume are
    /// silently dropped from the grid (the boundary resolver clamps
    /// them back inside before the next rebuild — see spec §4.2).
    ///
    /// Runs concurrently over disjoint ranges of `particles`; per-bucket
    /// inserts are serialized by the bucket's own mutex.
    pub fn rebuild(&self, particles: &[Particle], dispatch: &crate::dispatch::Dispatcher) {
        for bucket in &self.buckets {
            bucket.lock().unwrap().clear();
        }

        dispatch.parallel_for_range(particles.len(), |start, end_inclusive| {
            if particles.is_empty() {
                return;
            }
            for i in start..=end_inclusive {
                let p = particles[i];
                if let Some(key) = self.grid_key(p.position) {
                    self.buckets[key].lock().unwrap().push(p);
                }
            }
        });
    }

    /// The up-to-27 keys of the 3x3x3 neighborhood around `pos`'s cell,
    /// dropping any candidate outside the grid.
    pub fn neighbor_keys(&self, pos: Vec3) -> Vec<usize> {
        let mut keys = Vec::with_capacity(27);
        let Some((ix, iy, iz)) = self.axis_indices(pos) else {
            return keys;
        };
        for dx in -1..=1_i64 {
            for dy in -1..=1_i64 {
                for dz in -1..=1_i64 {
                    if let Some(key) = self.key_from_indices(ix + dx, iy + dy, iz + dz) {
                        keys.push(key);
                    }
                }
            }
        }
        keys
    }

    /// Calls `f` once for each particle found in `pos`'s 3x3x3
    /// neighborhood (its own cell plus up to 26 neighbors).
    pub fn for_each_neighbor(&self, pos: Vec3, mut f: impl FnMut(&Particle)) {
        for key in self.neighbor_keys(pos) {
            for p in self.buckets[key].lock().unwrap().iter() {
                f(p);
            }
        }
    }

    /// Total number of live particles currently stored across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.lock().unwrap().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
