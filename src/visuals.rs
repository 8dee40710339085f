use crate::content::SkillFace;
use crate::face::{static_face, typing_face, FaceContent, FACE_SIZE};
use crate::hover::{HoverChange, HoverHighlight, HIGHLIGHT_COLOR};
use crate::raycast::{nearest_hit, Ray};
use crate::scene::{
    Camera, Geometry, Light, Material, Mesh, MeshId, Scene, Shading, Texture, TextureId,
    FACE_COUNT,
};
use glam::{Vec2, Vec3};
use std::f64::consts::PI;

pub const DEFAULT_CUBE_WORDS: [&str; 6] = ["Java", "JavaScript", "SQL", "AI", "React", "Python"];

const SPINNING_FOV: f32 = 50.0;
const SPINNING_FAR: f32 = 1000.0;
const SPINNING_STEP: f32 = 0.01;
const SPINNING_SCALE: f32 = 1.2;

const TYPING_FOV: f32 = 50.0;
const TYPING_FAR: f32 = 10.0;
const TYPING_CAMERA_Z: f32 = 3.5;
const TYPING_BACKGROUND: u32 = 0x111111;
const TYPING_PROGRESS_STEP: f64 = 0.01;
const TYPING_STEP_X: f32 = 0.006;
const TYPING_STEP_Y: f32 = 0.01;

pub const FIELD_CUBE_COUNT: usize = 2000;
const FIELD_RADIUS: f32 = 25.0;
const FIELD_FRUSTUM: f32 = 75.0;
const FIELD_FAR: f32 = 100.0;
const FIELD_SPREAD: f64 = 40.0;
const FIELD_THETA_STEP_DEGREES: f64 = 0.1;
const FIELD_TARGET: Vec3 = Vec3::new(-10.0, -5.0, 0.0);

const NEAR: f32 = 0.1;

pub trait Visual {
    fn name(&self) -> &'static str;
    fn scene(&self) -> &Scene;
    fn scene_mut(&mut self) -> &mut Scene;
    fn camera(&self) -> &Camera;
    fn camera_mut(&mut self) -> &mut Camera;

    /// Moves animation state forward by one frame, including any camera
    /// motion and hover sampling that depends on it.
    fn advance(&mut self);

    fn animated_faces(&self) -> Vec<(TextureId, FaceContent)> {
        Vec::new()
    }

    fn initial_faces(&self) -> Vec<(TextureId, FaceContent)> {
        self.animated_faces()
    }

    fn tracks_pointer(&self) -> bool {
        false
    }

    fn set_pointer(&mut self, _ndc: Vec2) {}

    /// The last hover transition since this was called.
    fn take_hover_change(&mut self) -> HoverChange {
        HoverChange::Unchanged
    }

    /// Forgets interaction state that points into the scene.
    fn release_interaction(&mut self) {}
}

pub struct SpinningCube {
    scene: Scene,
    camera: Camera,
    cube: MeshId,
    faces: Vec<(TextureId, FaceContent)>,
}

impl SpinningCube {
    pub fn new(faces: &[SkillFace], aspect: f32) -> Self {
        let mut scene = Scene::new(None);
        let mut camera = Camera::perspective(SPINNING_FOV, aspect, NEAR, SPINNING_FAR);
        camera.position = Vec3::new(-1.0, 0.3, 5.0);

        let mut painted = Vec::with_capacity(FACE_COUNT);
        let mut materials = Vec::with_capacity(FACE_COUNT);
        for face in faces.iter().take(FACE_COUNT) {
            let texture = scene.add_texture(Texture::new(FACE_SIZE, FACE_SIZE));
            materials.push(scene.add_material(Material::new(Shading::Basic).with_map(texture)));
            painted.push((texture, static_face(&face.label, &face.background)));
        }

        let geometry = scene.add_geometry(Geometry::cuboid(2.0, 2.0, 2.0));
        let mut mesh = Mesh::with_face_materials(geometry, materials);
        mesh.scale = Vec3::splat(SPINNING_SCALE);
        mesh.position = Vec3::new(1.0, -0.3, 0.0);
        let cube = scene.add_mesh(mesh);

        Self {
            scene,
            camera,
            cube,
            faces: painted,
        }
    }
}

impl Visual for SpinningCube {
    fn name(&self) -> &'static str {
        "spinning_cube"
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    fn advance(&mut self) {
        if let Some(cube) = self.scene.mesh_mut(self.cube) {
            cube.rotation.x += SPINNING_STEP;
            cube.rotation.y += SPINNING_STEP;
        }
    }

    fn initial_faces(&self) -> Vec<(TextureId, FaceContent)> {
        self.faces.clone()
    }
}

pub struct AnimatedCube {
    scene: Scene,
    camera: Camera,
    cube: MeshId,
    words: Vec<(TextureId, String)>,
    progress: f64,
}

impl AnimatedCube {
    pub fn new(words: &[String], aspect: f32) -> Self {
        let mut scene = Scene::new(Some(TYPING_BACKGROUND));
        let mut camera = Camera::perspective(TYPING_FOV, aspect, NEAR, TYPING_FAR);
        camera.position = Vec3::new(0.0, 0.0, TYPING_CAMERA_Z);

        let mut faces = Vec::with_capacity(words.len());
        let mut materials = Vec::with_capacity(words.len());
        for word in words {
            let texture = scene.add_texture(Texture::new(FACE_SIZE, FACE_SIZE));
            let material = Material::new(Shading::Standard {
                roughness: 0.5,
                metalness: 0.1,
            })
            .with_map(texture);
            materials.push(scene.add_material(material));
            faces.push((texture, word.clone()));
        }

        let geometry = scene.add_geometry(Geometry::cuboid(1.0, 1.0, 1.0));
        let cube = scene.add_mesh(Mesh::with_face_materials(geometry, materials));

        scene.add_light(Light::ambient(0xffffff, 0.4));
        scene.add_light(Light::directional(0xffffff, 0.8, Vec3::new(5.0, 5.0, 5.0)));
        scene.add_light(Light::directional(0x8888ff, 0.3, Vec3::new(-3.0, 0.0, -3.0)));

        Self {
            scene,
            camera,
            cube,
            words: faces,
            progress: 0.0,
        }
    }

    #[cfg(test)]
    pub fn progress(&self) -> f64 {
        self.progress
    }
}

impl Visual for AnimatedCube {
    fn name(&self) -> &'static str {
        "animated_cube"
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    fn advance(&mut self) {
        self.progress += TYPING_PROGRESS_STEP;
        if self.progress > 1.0 {
            self.progress = 0.0;
        }

        if let Some(cube) = self.scene.mesh_mut(self.cube) {
            cube.rotation.x += TYPING_STEP_X;
            cube.rotation.y += TYPING_STEP_Y;
        }
    }

    fn animated_faces(&self) -> Vec<(TextureId, FaceContent)> {
        self.words
            .iter()
            .map(|(texture, word)| (*texture, typing_face(word, self.progress)))
            .collect()
    }
}

pub struct InteractiveCubes {
    scene: Scene,
    camera: Camera,
    theta_degrees: f64,
    pointer: Vec2,
    hover: HoverHighlight,
    hover_change: HoverChange,
}

impl InteractiveCubes {
    /// `random` yields values in `[0, 1)`.
    pub fn new(aspect: f32, mut random: impl FnMut() -> f64) -> Self {
        let mut scene = Scene::new(Some(0x000000));
        scene.add_light(Light::directional(0xffffff, 3.0, Vec3::ONE));

        let geometry = scene.add_geometry(Geometry::cuboid(1.0, 1.0, 1.0));
        for _ in 0..FIELD_CUBE_COUNT {
            let color = (random() * f64::from(0xffffff_u32)) as u32;
            let material = scene.add_material(Material::new(Shading::Lambert).with_color(color));

            let mut mesh = Mesh::new(geometry, material);
            mesh.position = random_vec3(&mut random, |value| value * FIELD_SPREAD - FIELD_SPREAD / 2.0);
            mesh.rotation = random_vec3(&mut random, |value| value * 2.0 * PI);
            mesh.scale = random_vec3(&mut random, |value| value + 0.5);
            scene.add_mesh(mesh);
        }

        let camera = Camera::orthographic(FIELD_FRUSTUM, aspect, NEAR, FIELD_FAR);
        let mut cubes = Self {
            scene,
            camera,
            theta_degrees: 0.0,
            pointer: Vec2::ZERO,
            hover: HoverHighlight::new(HIGHLIGHT_COLOR),
            hover_change: HoverChange::Unchanged,
        };
        cubes.place_camera();
        cubes
    }

    #[cfg(test)]
    pub fn hovered(&self) -> Option<MeshId> {
        self.hover.hovered()
    }

    #[cfg(test)]
    pub fn theta_degrees(&self) -> f64 {
        self.theta_degrees
    }

    fn place_camera(&mut self) {
        let theta = self.theta_degrees.to_radians() as f32;
        self.camera.position = Vec3::new(
            FIELD_RADIUS * theta.sin() - 10.0,
            FIELD_RADIUS * theta.sin() - 5.0,
            FIELD_RADIUS * theta.cos(),
        );
        self.camera.look_at(FIELD_TARGET);
    }

    fn sample_hover(&mut self) -> HoverChange {
        let nearest = Ray::from_camera(&self.camera, self.pointer)
            .and_then(|ray| nearest_hit(&self.scene, &ray))
            .map(|hit| hit.mesh);
        self.hover.update(&mut self.scene, nearest)
    }
}

fn random_vec3(random: &mut impl FnMut() -> f64, map: impl Fn(f64) -> f64) -> Vec3 {
    let x = map(random());
    let y = map(random());
    let z = map(random());
    Vec3::new(x as f32, y as f32, z as f32)
}

impl Visual for InteractiveCubes {
    fn name(&self) -> &'static str {
        "interactive_cubes"
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    fn advance(&mut self) {
        self.theta_degrees += FIELD_THETA_STEP_DEGREES;
        self.place_camera();
        // The camera moves every frame, so a still pointer can land on a new cube.
        let change = self.sample_hover();
        if change != HoverChange::Unchanged {
            self.hover_change = change;
        }
    }

    fn tracks_pointer(&self) -> bool {
        true
    }

    fn set_pointer(&mut self, ndc: Vec2) {
        self.pointer = ndc;
    }

    fn take_hover_change(&mut self) -> HoverChange {
        std::mem::replace(&mut self.hover_change, HoverChange::Unchanged)
    }

    fn release_interaction(&mut self) {
        self.hover.clear();
        self.hover_change = HoverChange::Unchanged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::testing::RecordingCanvas;
    use crate::face::{paint_face, FacePainter};
    use crate::frame_loop::testing::ManualScheduler;
    use crate::frame_loop::{render_frame, FrameLoop};
    use crate::lifecycle::{Lifecycle, TeardownHooks};
    use crate::scene::testing::RecordingSurface;
    use crate::scene::{apply_resize, RenderSurface};

    impl FacePainter for RecordingSurface {
        fn paint(&mut self, _texture: TextureId, content: &FaceContent) {
            paint_face(&mut RecordingCanvas::default(), content);
        }
    }

    fn skill_faces() -> Vec<SkillFace> {
        [
            ("Java", "#5382a1"),
            ("JavaScript", "#F0DB4F"),
            ("Spring", "#00FF7F"),
            ("React", "#61DAFB"),
            ("SQL", "#F29111"),
            ("AI", "#5200ff"),
        ]
        .iter()
        .map(|(label, background)| SkillFace {
            label: label.to_string(),
            background: background.to_string(),
        })
        .collect()
    }

    fn default_words() -> Vec<String> {
        DEFAULT_CUBE_WORDS.iter().map(|word| word.to_string()).collect()
    }

    fn seeded(mut state: u64) -> impl FnMut() -> f64 {
        move || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        }
    }

    #[test]
    fn spinning_cube_builds_one_textured_face_per_skill() {
        let cube = SpinningCube::new(&skill_faces(), 1.5);
        assert_eq!(cube.scene().mesh_count(), 1);
        assert_eq!(cube.scene().textures().count(), 6);
        assert_eq!(cube.scene().background, None);
        assert_eq!(cube.camera().position, Vec3::new(-1.0, 0.3, 5.0));

        let faces = cube.initial_faces();
        assert_eq!(faces.len(), 6);
        assert_eq!(faces[2].1.text, "Spring");
        assert!(cube.animated_faces().is_empty());
    }

    #[test]
    fn spinning_cube_rotates_a_fixed_step_per_frame() {
        let mut cube = SpinningCube::new(&skill_faces(), 1.0);
        for _ in 0..10 {
            cube.advance();
        }
        let (_, mesh) = cube.scene().meshes().next().expect("one cube");
        assert!((mesh.rotation.x - 0.1).abs() < 1e-5);
        assert!((mesh.rotation.y - 0.1).abs() < 1e-5);
        assert_eq!(mesh.scale, Vec3::splat(1.2));
    }

    #[test]
    fn typing_progress_wraps_after_passing_one() {
        let mut cube = AnimatedCube::new(&default_words(), 1.0);
        let mut wrapped = false;
        for _ in 0..120 {
            cube.advance();
            assert!((0.0..=1.0).contains(&cube.progress()));
            if cube.progress() == 0.0 {
                wrapped = true;
            }
        }
        assert!(wrapped);
    }

    #[test]
    fn typing_cube_has_three_lights_and_one_face_per_word() {
        let cube = AnimatedCube::new(&default_words(), 1.0);
        assert_eq!(cube.scene().lights().len(), 3);
        assert_eq!(cube.scene().background, Some(0x111111));
        assert_eq!(cube.animated_faces().len(), 6);
        assert_eq!(cube.initial_faces().len(), 6);
    }

    #[test]
    fn one_word_cube_draws_only_its_first_face() {
        let cube = AnimatedCube::new(&["AI".to_string()], 1.0);
        let (_, mesh) = cube.scene().meshes().next().expect("one cube");

        assert!(mesh.material_for_face(0).is_some());
        assert!((1..FACE_COUNT).all(|face| mesh.material_for_face(face).is_none()));
        assert_eq!(cube.animated_faces().len(), 1);
    }

    #[test]
    fn render_sees_the_state_advanced_in_the_same_frame() {
        let mut cube = AnimatedCube::new(&default_words(), 1.0);
        let mut surface = RecordingSurface::default();

        render_frame(&mut cube, &mut surface);
        render_frame(&mut cube, &mut surface);

        assert_eq!(surface.renders.len(), 2);
        let first = &surface.renders[0];
        let second = &surface.renders[1];
        assert!((first.first_mesh_rotation.expect("cube").y - 0.01).abs() < 1e-6);
        assert!((second.first_mesh_rotation.expect("cube").y - 0.02).abs() < 1e-6);
        assert_eq!(first.texture_versions, vec![1; 6]);
        assert_eq!(second.texture_versions, vec![2; 6]);
    }

    #[test]
    fn field_has_two_thousand_cubes_sharing_one_geometry() {
        let cubes = InteractiveCubes::new(1.0, seeded(7));
        let scene = cubes.scene();
        assert_eq!(scene.mesh_count(), FIELD_CUBE_COUNT);
        assert_eq!(scene.lights().len(), 1);

        let geometry = scene.meshes().next().map(|(_, mesh)| mesh.geometry).expect("cubes");
        for (_, mesh) in scene.meshes() {
            assert_eq!(mesh.geometry, geometry);
            assert!(mesh.position.abs().max_element() <= 20.0);
            assert!(mesh.scale.min_element() >= 0.5 && mesh.scale.max_element() < 1.5);
        }
    }

    #[test]
    fn orbit_follows_the_sine_cosine_path() {
        let mut cubes = InteractiveCubes::new(1.0, seeded(3));
        for _ in 0..900 {
            cubes.advance();
        }
        let theta = (cubes.theta_degrees() as f32).to_radians();
        let expected = Vec3::new(25.0 * theta.sin() - 10.0, 25.0 * theta.sin() - 5.0, 25.0 * theta.cos());
        assert!((cubes.camera().position - expected).length() < 1e-3);

        let toward_target = (FIELD_TARGET - cubes.camera().position).normalize();
        assert!((cubes.camera().direction() - toward_target).length() < 1e-5);
    }

    #[test]
    fn pointer_over_a_cube_then_empty_space_restores_its_emissive() {
        let mut cubes = InteractiveCubes::new(1.0, || 0.5);
        cubes.set_pointer(Vec2::new(5.0, 5.0));
        cubes.advance();
        assert_eq!(cubes.hovered(), None);

        let over_origin = cubes.camera().view_projection().project_point3(Vec3::ZERO);
        cubes.set_pointer(Vec2::new(over_origin.x, over_origin.y));
        cubes.advance();

        let hovered = cubes.hovered().expect("every cube sits at the origin");
        assert_eq!(cubes.scene().emissive_of(hovered), Some(HIGHLIGHT_COLOR));

        cubes.set_pointer(Vec2::new(5.0, 5.0));
        cubes.advance();
        assert_eq!(cubes.hovered(), None);
        assert_eq!(cubes.scene().emissive_of(hovered), Some(0x000000));
    }

    #[test]
    fn hover_transitions_are_handed_out_once() {
        let mut cubes = InteractiveCubes::new(1.0, || 0.5);
        cubes.advance();
        assert_eq!(cubes.take_hover_change(), HoverChange::Unchanged);

        let over_origin = cubes.camera().view_projection().project_point3(Vec3::ZERO);
        cubes.set_pointer(Vec2::new(over_origin.x, over_origin.y));
        cubes.advance();
        let hovered = cubes.hovered().expect("every cube sits at the origin");
        assert_eq!(cubes.take_hover_change(), HoverChange::Entered(hovered));
        assert_eq!(cubes.take_hover_change(), HoverChange::Unchanged);

        cubes.set_pointer(Vec2::new(5.0, 5.0));
        cubes.advance();
        assert_eq!(cubes.take_hover_change(), HoverChange::Left(hovered));
    }

    struct TestMount<V: Visual> {
        visual: Option<V>,
        surface: RecordingSurface,
        scheduler: ManualScheduler,
        frame_loop: FrameLoop,
        listeners: usize,
        attached: bool,
        lifecycle: Lifecycle,
    }

    impl<V: Visual> TestMount<V> {
        fn mount(mut visual: V) -> Self {
            let mut surface = RecordingSurface::default();
            for (texture, content) in visual.initial_faces() {
                surface.paint(texture, &content);
            }
            apply_resize(visual.camera_mut(), &mut surface, 800, 600);

            let mut scheduler = ManualScheduler::default();
            let mut frame_loop = FrameLoop::new();
            frame_loop.start(&mut scheduler);

            Self {
                visual: Some(visual),
                surface,
                scheduler,
                frame_loop,
                listeners: 2,
                attached: true,
                lifecycle: Lifecycle::new(),
            }
        }

        fn frame(&mut self) {
            if !self.frame_loop.begin_frame() {
                return;
            }
            if let Some(visual) = self.visual.as_mut() {
                render_frame(visual, &mut self.surface);
            }
            self.frame_loop.end_frame(&mut self.scheduler);
        }

        fn unmount(&mut self) -> bool {
            let mut lifecycle = self.lifecycle;
            let ran = lifecycle.teardown(self);
            self.lifecycle = lifecycle;
            ran
        }
    }

    impl<V: Visual> TeardownHooks for TestMount<V> {
        fn stop_loop(&mut self) {
            self.frame_loop.stop(&mut self.scheduler);
        }

        fn remove_listeners(&mut self) {
            self.listeners = 0;
        }

        fn dispose_resources(&mut self) {
            if let Some(visual) = self.visual.as_mut() {
                visual.release_interaction();
                visual.scene_mut().dispose(&mut self.surface);
            }
        }

        fn release_surface(&mut self) {
            self.surface.dispose();
        }

        fn detach_surface(&mut self) {
            self.attached = false;
        }

        fn clear_references(&mut self) {
            self.visual = None;
        }
    }

    #[test]
    fn teardown_stops_frames_and_releases_everything_once() {
        let mut mount = TestMount::mount(InteractiveCubes::new(4.0 / 3.0, seeded(11)));
        mount.frame();
        mount.frame();
        assert_eq!(mount.surface.renders.len(), 2);
        assert_eq!(mount.visual.as_ref().map(|visual| visual.camera().aspect()), Some(800.0 / 600.0));

        assert!(mount.unmount());
        assert!(!mount.frame_loop.is_running());
        assert_eq!(mount.scheduler.cancelled.len(), 1);
        assert_eq!(mount.listeners, 0);
        assert!(!mount.attached);
        assert!(mount.visual.is_none());
        assert_eq!(mount.surface.disposed, 1);
        // one geometry, 2000 materials, no textures
        assert_eq!(mount.surface.released.len(), 1 + FIELD_CUBE_COUNT);

        mount.frame();
        assert_eq!(mount.surface.renders.len(), 2);

        assert!(!mount.unmount());
        assert_eq!(mount.surface.disposed, 1);
        assert_eq!(mount.surface.released.len(), 1 + FIELD_CUBE_COUNT);
    }

    #[test]
    fn remount_starts_from_a_clean_state() {
        let mut first = TestMount::mount(AnimatedCube::new(&default_words(), 1.0));
        first.frame();
        first.unmount();

        let second = TestMount::mount(AnimatedCube::new(&default_words(), 1.0));
        let visual = second.visual.as_ref().expect("mounted");
        assert_eq!(visual.progress(), 0.0);
        assert_eq!(second.frame_loop.frames(), 0);
        assert_eq!(second.surface.size(), (800, 600));
    }
}
