use crate::scene::{Camera, MeshId, Projection, Scene};
use glam::{Quat, Vec2, Vec3};
use parry3d::na::{self, Isometry3, Quaternion, Translation3, UnitQuaternion};
use parry3d::query::{Ray as ParryRay, RayCast};
use parry3d::shape::Cuboid;

/// Maps a pointer position in client pixels to `[-1, 1]` on both axes,
/// Y pointing up. `None` for a container with no area.
pub fn normalize_pointer(
    client_x: f64,
    client_y: f64,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
) -> Option<Vec2> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let x = ((client_x - left) / width) * 2.0 - 1.0;
    let y = -((client_y - top) / height) * 2.0 + 1.0;
    Some(Vec2::new(x as f32, y as f32))
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Hit {
    pub mesh: MeshId,
    pub distance: f32,
}

impl Ray {
    pub fn from_camera(camera: &Camera, ndc: Vec2) -> Option<Self> {
        let inverse = camera.view_projection().inverse();
        if !inverse.is_finite() {
            return None;
        }

        match camera.projection() {
            Projection::Perspective { .. } => {
                let through = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
                let direction = (through - camera.position).normalize_or_zero();
                (direction != Vec3::ZERO).then_some(Self {
                    origin: camera.position,
                    direction,
                })
            }
            Projection::Orthographic { .. } => {
                let near = camera.near();
                let far = camera.far();
                // NDC depth of the camera plane itself.
                let z = (near + far) / (near - far);
                let origin = inverse.project_point3(Vec3::new(ndc.x, ndc.y, z));
                let direction = camera.direction().normalize_or_zero();
                (direction != Vec3::ZERO).then_some(Self { origin, direction })
            }
        }
    }

    #[cfg(test)]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Distance along the ray to a box of `half_extents` rotated by
    /// `rotation` and centred on `position`. An origin inside the box hits
    /// at zero.
    pub fn intersect_box(&self, position: Vec3, rotation: Quat, half_extents: Vec3) -> Option<f32> {
        if half_extents.min_element() <= 0.0 || !half_extents.is_finite() {
            return None;
        }
        let cuboid = Cuboid::new(na::Vector3::new(half_extents.x, half_extents.y, half_extents.z));
        let pose = Isometry3::from_parts(
            Translation3::new(position.x, position.y, position.z),
            UnitQuaternion::new_normalize(Quaternion::new(rotation.w, rotation.x, rotation.y, rotation.z)),
        );
        let ray = ParryRay::new(
            na::Point3::new(self.origin.x, self.origin.y, self.origin.z),
            na::Vector3::new(self.direction.x, self.direction.y, self.direction.z),
        );
        cuboid.cast_ray(&pose, &ray, f32::MAX, true)
    }
}

pub fn nearest_hit(scene: &Scene, ray: &Ray) -> Option<Hit> {
    let mut nearest: Option<Hit> = None;

    for (id, mesh) in scene.meshes() {
        let Some(geometry) = scene.geometry(mesh.geometry) else {
            continue;
        };
        // Scale is applied before rotation, so the scaled box is still a cuboid.
        let half_extents = geometry.half_extents() * mesh.scale.abs();
        let Some(distance) = ray.intersect_box(mesh.position, mesh.orientation(), half_extents) else {
            continue;
        };
        if nearest.map_or(true, |hit| distance < hit.distance) {
            nearest = Some(Hit { mesh: id, distance });
        }
    }

    nearest
}
