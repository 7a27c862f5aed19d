use glam::Vec3;

/// Axis-aligned box used both as the simulation space and as a
/// fluid-source volume.
///
/// Ported from the original program's `Cuboid` (`utils/cuboid.cpp`);
/// the GPU vertex/index-buffer fields that class carried for debug
/// rendering are dropped, since rendering is an external collaborator
/// per the core's scope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cuboid {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

impl Cuboid {
    pub fn new(x_min: f32, x_max: f32, y_min: f32, y_max: f32, z_min: f32, z_max: f32) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            z_min,
            z_max,
        }
    }

    /// True if `pos` lies within this cuboid (inclusive of the boundary).
    pub fn contains_point(&self, pos: Vec3) -> bool {
        pos.x >= self.x_min
            && pos.x <= self.x_max
            && pos.y >= self.y_min
            && pos.y <= self.y_max
            && pos.z >= self.z_min
            && pos.z <= self.z_max
    }

    /// True if `other` is fully contained within this cuboid.
    pub fn contains_cuboid(&self, other: &Cuboid) -> bool {
        other.x_min >= self.x_min
            && other.x_max <= self.x_max
            && other.y_min >= self.y_min
            && other.y_max <= self.y_max
            && other.z_min >= self.z_min
            && other.z_max <= self.z_max
    }

    pub fn volume(&self) -> f32 {
        (self.x_max - self.x_min) * (self.y_max - self.y_min) * (self.z_max - self.z_min)
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.x_min + self.x_max) * 0.5,
            (self.y_min + self.y_max) * 0.5,
            (self.z_min + self.z_max) * 0.5,
        )
    }

    pub fn extent(&self) -> Vec3 {
        Vec3::new(
            self.x_max - self.x_min,
            self.y_max - self.y_min,
            self.z_max - self.z_min,
        )
    }

    /// Generate regularly-spaced points at spacing `d` inside the cuboid,
    /// shrunk by `d/2` on each face so no point sits exactly on the
    /// boundary.
    pub fn generate_points(&self, d: f32) -> Vec<Vec3> {
        let mut points = Vec::new();
        let half = d * 0.5;

        let mut x = self.x_min + half;
        while x < self.x_max {
            let mut y = self.y_min + half;
            while y < self.y_max {
                let mut z = self.z_min + half;
                while z < self.z_max {
                    points.push(Vec3::new(x, y, z));
                    z += d;
                }
                y += d;
            }
            x += d;
        }

        points
    }
}
