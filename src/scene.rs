use glam::{EulerRot, Mat4, Quat, Vec3};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct GeometryId(usize);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MaterialId(usize);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TextureId(usize);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MeshId(usize);

impl MeshId {
    pub fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

pub fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Projection {
    Perspective { fov_y_degrees: f32 },
    /// `frustum` is the visible height in world units.
    Orthographic { frustum: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub up: Vec3,
    direction: Vec3,
    projection: Projection,
    aspect: f32,
    near: f32,
    far: f32,
}

impl Camera {
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Perspective { fov_y_degrees }, aspect, near, far)
    }

    pub fn orthographic(frustum: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Orthographic { frustum }, aspect, near, far)
    }

    fn new(projection: Projection, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            up: Vec3::Y,
            direction: Vec3::NEG_Z,
            projection,
            aspect,
            near,
            far,
        }
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn look_at(&mut self, target: Vec3) {
        let direction = (target - self.position).normalize_or_zero();
        if direction != Vec3::ZERO {
            self.direction = direction;
        }
    }

    #[cfg(test)]
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        match self.projection {
            Projection::Orthographic { frustum } => {
                let half_width = frustum * self.aspect / 2.0;
                let half_height = frustum / 2.0;
                Some((-half_width, half_width, half_height, -half_height))
            }
            Projection::Perspective { .. } => None,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.direction, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective { fov_y_degrees } => Mat4::perspective_rh_gl(
                fov_y_degrees.to_radians(),
                self.aspect,
                self.near,
                self.far,
            ),
            Projection::Orthographic { frustum } => {
                let half_width = frustum * self.aspect / 2.0;
                let half_height = frustum / 2.0;
                Mat4::orthographic_rh_gl(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum LightKind {
    Ambient,
    /// Lights everything from `toward`, a direction pointing at the light.
    Directional { toward: Vec3 },
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Light {
    pub kind: LightKind,
    pub color: u32,
    pub intensity: f32,
}

impl Light {
    pub fn ambient(color: u32, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity,
        }
    }

    /// A directional light placed at `position`, aimed at the origin.
    pub fn directional(color: u32, intensity: f32, position: Vec3) -> Self {
        Self {
            kind: LightKind::Directional {
                toward: position.normalize_or_zero(),
            },
            color,
            intensity,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Geometry {
    pub size: Vec3,
}

impl Geometry {
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self {
            size: Vec3::new(width, height, depth),
        }
    }

    pub fn half_extents(&self) -> Vec3 {
        self.size * 0.5
    }

    /// Interleaved `position, normal, uv` vertices (8 floats each) and
    /// triangle indices, four vertices and six indices per face in
    /// [`FACE_COUNT`] order. Triangles wind counter-clockwise seen from
    /// outside.
    pub fn box_buffers(&self) -> (Vec<f32>, Vec<u16>) {
        const FACES: [(Vec3, Vec3, Vec3); FACE_COUNT] = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let half = self.half_extents();
        let mut vertices = Vec::with_capacity(FACE_COUNT * 4 * 8);
        let mut indices = Vec::with_capacity(FACE_COUNT * 6);

        for (face, (normal, right, up)) in FACES.iter().enumerate() {
            for (x, y) in CORNERS {
                let position = (*normal + *right * x + *up * y) * half;
                vertices.extend_from_slice(&position.to_array());
                vertices.extend_from_slice(&normal.to_array());
                vertices.extend_from_slice(&[(x + 1.0) / 2.0, (y + 1.0) / 2.0]);
            }
            let base = (face * 4) as u16;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        (vertices, indices)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Shading {
    Basic,
    Lambert,
    Standard { roughness: f32, metalness: f32 },
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Material {
    pub shading: Shading,
    pub color: u32,
    pub emissive: u32,
    pub map: Option<TextureId>,
}

impl Material {
    pub fn new(shading: Shading) -> Self {
        Self {
            shading,
            color: 0xffffff,
            emissive: 0x000000,
            map: None,
        }
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn with_map(mut self, map: TextureId) -> Self {
        self.map = Some(map);
        self
    }
}

/// A texture backed by an off-screen 2D surface. `version` moves forward
/// every time the surface is redrawn so the renderer knows to upload again.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    version: u64,
}

impl Texture {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn mark_dirty(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

/// Box faces in the order `+x, -x, +y, -y, +z, -z`.
pub const FACE_COUNT: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub enum MeshMaterials {
    Single(MaterialId),
    /// Face `n` uses entry `n`; faces past the end are not drawn.
    PerFace(Vec<MaterialId>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub geometry: GeometryId,
    pub materials: MeshMaterials,
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Mesh {
    pub fn new(geometry: GeometryId, material: MaterialId) -> Self {
        Self::with_materials(geometry, MeshMaterials::Single(material))
    }

    pub fn with_face_materials(geometry: GeometryId, materials: Vec<MaterialId>) -> Self {
        Self::with_materials(geometry, MeshMaterials::PerFace(materials))
    }

    fn with_materials(geometry: GeometryId, materials: MeshMaterials) -> Self {
        Self {
            geometry,
            materials,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn material_for_face(&self, face: usize) -> Option<MaterialId> {
        match &self.materials {
            MeshMaterials::Single(id) => Some(*id),
            MeshMaterials::PerFace(ids) => ids.get(face).copied(),
        }
    }

    pub fn primary_material(&self) -> Option<MaterialId> {
        match &self.materials {
            MeshMaterials::Single(id) => Some(*id),
            MeshMaterials::PerFace(ids) => ids.first().copied(),
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }
}

pub const MAX_DIRECTIONAL_LIGHTS: usize = 2;

/// Scene lights folded into what a forward shader consumes. Directional
/// colors are pre-multiplied by `intensity / PI`, the physically based
/// convention for punctual lights.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightRig {
    pub ambient: Vec3,
    pub directional: Vec<(Vec3, Vec3)>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Resource {
    Geometry(GeometryId),
    Material(MaterialId),
    Texture(TextureId),
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct DisposeSummary {
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

pub trait RenderSurface {
    fn size(&self) -> (u32, u32);
    fn set_size(&mut self, width: u32, height: u32);
    fn render(&mut self, scene: &Scene, camera: &Camera);
    fn release(&mut self, resource: Resource);
    fn dispose(&mut self);
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub background: Option<u32>,
    lights: Vec<Light>,
    meshes: Vec<Mesh>,
    geometries: Vec<Geometry>,
    materials: Vec<Material>,
    textures: Vec<Texture>,
}

impl Scene {
    pub fn new(background: Option<u32>) -> Self {
        Self {
            background,
            ..Self::default()
        }
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    #[cfg(test)]
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn light_rig(&self) -> LightRig {
        let mut rig = LightRig::default();
        for light in &self.lights {
            let color = Vec3::from(rgb(light.color)) * light.intensity;
            match light.kind {
                LightKind::Ambient => rig.ambient += color,
                LightKind::Directional { toward } => {
                    if rig.directional.len() < MAX_DIRECTIONAL_LIGHTS {
                        rig.directional.push((toward, color / std::f32::consts::PI));
                    }
                }
            }
        }
        rig
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &Mesh)> + '_ {
        self.meshes
            .iter()
            .enumerate()
            .map(|(index, mesh)| (MeshId(index), mesh))
    }

    #[cfg(test)]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.0)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id.0)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    pub fn texture_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
        self.textures.get_mut(id.0)
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureId, &Texture)> + '_ {
        self.textures
            .iter()
            .enumerate()
            .map(|(index, texture)| (TextureId(index), texture))
    }

    pub fn emissive_of(&self, mesh: MeshId) -> Option<u32> {
        let material = self.mesh(mesh)?.primary_material()?;
        self.material(material).map(|material| material.emissive)
    }

    pub fn set_emissive(&mut self, mesh: MeshId, emissive: u32) -> bool {
        let Some(material) = self.mesh(mesh).and_then(Mesh::primary_material) else {
            return false;
        };
        match self.material_mut(material) {
            Some(material) => {
                material.emissive = emissive;
                true
            }
            None => false,
        }
    }

    /// Releases every texture, material and geometry exactly once and
    /// empties the scene. A second call releases nothing.
    pub fn dispose<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> DisposeSummary {
        let summary = DisposeSummary {
            geometries: self.geometries.len(),
            materials: self.materials.len(),
            textures: self.textures.len(),
        };

        for index in 0..self.textures.len() {
            surface.release(Resource::Texture(TextureId(index)));
        }
        for index in 0..self.materials.len() {
            surface.release(Resource::Material(MaterialId(index)));
        }
        for index in 0..self.geometries.len() {
            surface.release(Resource::Geometry(GeometryId(index)));
        }

        self.meshes.clear();
        self.lights.clear();
        self.textures.clear();
        self.materials.clear();
        self.geometries.clear();

        summary
    }
}

/// Matches the camera projection and the surface to a `width` x `height`
/// container. Returns `false` and changes nothing for an empty container.
pub fn apply_resize<S: RenderSurface + ?Sized>(
    camera: &mut Camera,
    surface: &mut S,
    width: u32,
    height: u32,
) -> bool {
    if width == 0 || height == 0 {
        return false;
    }
    camera.set_aspect(width as f32 / height as f32);
    surface.set_size(width, height);
    true
}
