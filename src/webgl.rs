use std::collections::HashMap;

use glam::Mat3;
use js_sys::{Float32Array, Object, Reflect, Uint16Array};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, WebGl2RenderingContext as GL,
    WebGlBuffer, WebGlProgram, WebGlShader, WebGlTexture, WebGlUniformLocation,
    WebGlVertexArrayObject,
};

use crate::face::{paint_face, FaceCanvas, FaceContent, FacePainter, FACE_SIZE};
use crate::lifecycle::SetupError;
use crate::scene::{
    rgb, Camera, Geometry, GeometryId, MeshMaterials, RenderSurface, Resource, Scene, Shading, TextureId,
    FACE_COUNT, MAX_DIRECTIONAL_LIGHTS,
};

const MAX_PIXEL_RATIO: f64 = 2.0;
const FLOATS_PER_VERTEX: i32 = 8;
const INDICES_PER_FACE: i32 = 6;

const VERT_SRC: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec2 a_uv;
uniform mat4 u_view_projection;
uniform mat4 u_model;
uniform mat3 u_normal_matrix;
out vec3 v_normal;
out vec2 v_uv;
void main() {
    v_normal = normalize(u_normal_matrix * a_normal);
    v_uv = a_uv;
    gl_Position = u_view_projection * u_model * vec4(a_position, 1.0);
}
"#;

const FRAG_SRC: &str = r#"#version 300 es
precision mediump float;
in vec3 v_normal;
in vec2 v_uv;
uniform vec3 u_color;
uniform vec3 u_emissive;
uniform bool u_use_map;
uniform sampler2D u_map;
uniform bool u_lit;
uniform vec3 u_ambient;
uniform vec3 u_light_directions[2];
uniform vec3 u_light_colors[2];
uniform int u_light_count;
out vec4 out_color;
void main() {
    vec4 base = vec4(u_color, 1.0);
    if (u_use_map) {
        base *= texture(u_map, v_uv);
    }
    vec3 shaded = base.rgb;
    if (u_lit) {
        vec3 normal = normalize(v_normal);
        vec3 light = u_ambient;
        for (int i = 0; i < 2; i++) {
            if (i >= u_light_count) {
                break;
            }
            light += u_light_colors[i] * max(dot(normal, u_light_directions[i]), 0.0);
        }
        shaded *= light;
    }
    out_color = vec4(shaded + u_emissive, base.a);
}
"#;

fn compile_shader(gl: &GL, src: &str, shader_type: u32) -> Result<WebGlShader, SetupError> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or(SetupError::ShaderCompile)?;
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);
    if !gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        gl.delete_shader(Some(&shader));
        return Err(SetupError::ShaderCompile);
    }
    Ok(shader)
}

fn link_program(gl: &GL, vert_src: &str, frag_src: &str) -> Result<WebGlProgram, SetupError> {
    let vert = compile_shader(gl, vert_src, GL::VERTEX_SHADER)?;
    let frag = compile_shader(gl, frag_src, GL::FRAGMENT_SHADER)?;
    let program = gl.create_program().ok_or(SetupError::ProgramLink)?;
    gl.attach_shader(&program, &vert);
    gl.attach_shader(&program, &frag);
    gl.link_program(&program);
    gl.delete_shader(Some(&vert));
    gl.delete_shader(Some(&frag));
    if !gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        gl.delete_program(Some(&program));
        return Err(SetupError::ProgramLink);
    }
    Ok(program)
}

struct Uniforms {
    view_projection: Option<WebGlUniformLocation>,
    model: Option<WebGlUniformLocation>,
    normal_matrix: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    emissive: Option<WebGlUniformLocation>,
    use_map: Option<WebGlUniformLocation>,
    map: Option<WebGlUniformLocation>,
    lit: Option<WebGlUniformLocation>,
    ambient: Option<WebGlUniformLocation>,
    light_directions: Option<WebGlUniformLocation>,
    light_colors: Option<WebGlUniformLocation>,
    light_count: Option<WebGlUniformLocation>,
}

impl Uniforms {
    fn locate(gl: &GL, program: &WebGlProgram) -> Self {
        let at = |name: &str| gl.get_uniform_location(program, name);
        Self {
            view_projection: at("u_view_projection"),
            model: at("u_model"),
            normal_matrix: at("u_normal_matrix"),
            color: at("u_color"),
            emissive: at("u_emissive"),
            use_map: at("u_use_map"),
            map: at("u_map"),
            lit: at("u_lit"),
            ambient: at("u_ambient"),
            light_directions: at("u_light_directions[0]"),
            light_colors: at("u_light_colors[0]"),
            light_count: at("u_light_count"),
        }
    }
}

struct BoxBuffers {
    vao: WebGlVertexArrayObject,
    vertices: WebGlBuffer,
    indices: WebGlBuffer,
}

impl BoxBuffers {
    fn upload(gl: &GL, geometry: &Geometry) -> Option<Self> {
        let (vertices, indices) = geometry.box_buffers();
        let vao = gl.create_vertex_array()?;
        let vertex_buffer = gl.create_buffer()?;
        let index_buffer = gl.create_buffer()?;

        gl.bind_vertex_array(Some(&vao));

        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&vertex_buffer));
        let vertex_array = Float32Array::from(vertices.as_slice());
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &vertex_array, GL::STATIC_DRAW);

        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&index_buffer));
        let index_array = Uint16Array::from(indices.as_slice());
        gl.buffer_data_with_array_buffer_view(GL::ELEMENT_ARRAY_BUFFER, &index_array, GL::STATIC_DRAW);

        let stride = FLOATS_PER_VERTEX * 4;
        for (location, size, offset) in [(0, 3, 0), (1, 3, 12), (2, 2, 24)] {
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_with_i32(location, size, GL::FLOAT, false, stride, offset);
        }

        gl.bind_vertex_array(None);

        Some(Self {
            vao,
            vertices: vertex_buffer,
            indices: index_buffer,
        })
    }

    fn delete(self, gl: &GL) {
        gl.delete_vertex_array(Some(&self.vao));
        gl.delete_buffer(Some(&self.vertices));
        gl.delete_buffer(Some(&self.indices));
    }
}

struct FaceTexture {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    texture: WebGlTexture,
    uploaded: Option<u64>,
}

impl FaceTexture {
    fn create(document: &Document, gl: &GL) -> Option<Self> {
        let canvas = document
            .create_element("canvas")
            .ok()?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        canvas.set_width(FACE_SIZE);
        canvas.set_height(FACE_SIZE);
        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        let texture = gl.create_texture()?;

        Some(Self {
            canvas,
            context,
            texture,
            uploaded: None,
        })
    }

    fn upload(&mut self, gl: &GL, version: u64) {
        if self.uploaded == Some(version) {
            return;
        }

        gl.bind_texture(GL::TEXTURE_2D, Some(&self.texture));
        gl.pixel_storei(GL::UNPACK_FLIP_Y_WEBGL, 1);
        let uploaded = gl.tex_image_2d_with_u32_and_u32_and_html_canvas_element(
            GL::TEXTURE_2D,
            0,
            GL::RGBA as i32,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            &self.canvas,
        );
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);

        if uploaded.is_ok() {
            self.uploaded = Some(version);
        }
    }
}

fn ctx_set_fill_style(ctx: &CanvasRenderingContext2d, value: &str) {
    let _ = Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("fillStyle"),
        &JsValue::from_str(value),
    );
}

struct Canvas2d<'a>(&'a CanvasRenderingContext2d);

impl FaceCanvas for Canvas2d<'_> {
    fn fill_rect(&mut self, style: &str, x: f64, y: f64, width: f64, height: f64, alpha: f64) {
        self.0.set_global_alpha(alpha);
        ctx_set_fill_style(self.0, style);
        self.0.fill_rect(x, y, width, height);
        self.0.set_global_alpha(1.0);
    }

    fn fill_text_centered(&mut self, text: &str, font: &str, style: &str, x: f64, y: f64) {
        self.0.set_font(font);
        self.0.set_text_align("center");
        self.0.set_text_baseline("middle");
        ctx_set_fill_style(self.0, style);
        let _ = self.0.fill_text(text, x, y);
    }

    fn measure_text(&mut self, text: &str, font: &str) -> f64 {
        self.0.set_font(font);
        self.0
            .measure_text(text)
            .map(|metrics| metrics.width())
            .unwrap_or(0.0)
    }
}

pub struct WebGlSurface {
    document: Document,
    canvas: HtmlCanvasElement,
    gl: GL,
    program: Option<WebGlProgram>,
    uniforms: Uniforms,
    boxes: HashMap<GeometryId, BoxBuffers>,
    faces: HashMap<TextureId, FaceTexture>,
    pixel_ratio: f64,
    size: (u32, u32),
}

impl WebGlSurface {
    pub fn new(document: &Document) -> Result<Self, SetupError> {
        let canvas = document
            .create_element("canvas")
            .ok()
            .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or(SetupError::CanvasUnavailable)?;

        let options = Object::new();
        let _ = Reflect::set(&options, &JsValue::from_str("antialias"), &JsValue::TRUE);
        let _ = Reflect::set(&options, &JsValue::from_str("alpha"), &JsValue::TRUE);
        let gl = canvas
            .get_context_with_context_options("webgl2", &options)
            .ok()
            .flatten()
            .and_then(|context| context.dyn_into::<GL>().ok())
            .ok_or(SetupError::ContextUnavailable)?;

        let program = link_program(&gl, VERT_SRC, FRAG_SRC)?;
        let uniforms = Uniforms::locate(&gl, &program);
        gl.enable(GL::DEPTH_TEST);
        gl.enable(GL::CULL_FACE);

        let pixel_ratio = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0)
            .min(MAX_PIXEL_RATIO);

        Ok(Self {
            document: document.clone(),
            canvas,
            gl,
            program: Some(program),
            uniforms,
            boxes: HashMap::new(),
            faces: HashMap::new(),
            pixel_ratio,
            size: (0, 0),
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn apply_lights(&self, scene: &Scene) {
        let gl = &self.gl;
        let rig = scene.light_rig();
        gl.uniform3fv_with_f32_array(self.uniforms.ambient.as_ref(), &rig.ambient.to_array());

        let mut directions = [0.0f32; MAX_DIRECTIONAL_LIGHTS * 3];
        let mut colors = [0.0f32; MAX_DIRECTIONAL_LIGHTS * 3];
        for (index, (toward, color)) in rig.directional.iter().enumerate() {
            directions[index * 3..index * 3 + 3].copy_from_slice(&toward.to_array());
            colors[index * 3..index * 3 + 3].copy_from_slice(&color.to_array());
        }
        gl.uniform3fv_with_f32_array(self.uniforms.light_directions.as_ref(), &directions);
        gl.uniform3fv_with_f32_array(self.uniforms.light_colors.as_ref(), &colors);
        gl.uniform1i(self.uniforms.light_count.as_ref(), rig.directional.len() as i32);
    }
}

impl RenderSurface for WebGlSurface {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn set_size(&mut self, width: u32, height: u32) {
        let pixel_width = (f64::from(width) * self.pixel_ratio).round() as u32;
        let pixel_height = (f64::from(height) * self.pixel_ratio).round() as u32;
        self.canvas.set_width(pixel_width);
        self.canvas.set_height(pixel_height);
        let _ = self.canvas.set_attribute(
            "style",
            &format!("display: block; width: {width}px; height: {height}px;"),
        );
        self.gl.viewport(0, 0, pixel_width as i32, pixel_height as i32);
        self.size = (width, height);
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) {
        let Some(program) = self.program.as_ref() else {
            return;
        };

        for (id, texture) in scene.textures() {
            if let Some(face) = self.faces.get_mut(&id) {
                face.upload(&self.gl, texture.version());
            }
        }
        for (_, mesh) in scene.meshes() {
            if self.boxes.contains_key(&mesh.geometry) {
                continue;
            }
            let Some(geometry) = scene.geometry(mesh.geometry) else {
                continue;
            };
            if let Some(buffers) = BoxBuffers::upload(&self.gl, geometry) {
                self.boxes.insert(mesh.geometry, buffers);
            }
        }

        let gl = &self.gl;
        match scene.background {
            Some(hex) => {
                let [r, g, b] = rgb(hex);
                gl.clear_color(r, g, b, 1.0);
            }
            None => gl.clear_color(0.0, 0.0, 0.0, 0.0),
        }
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);

        gl.use_program(Some(program));
        gl.uniform_matrix4fv_with_f32_array(
            self.uniforms.view_projection.as_ref(),
            false,
            &camera.view_projection().to_cols_array(),
        );
        gl.uniform1i(self.uniforms.map.as_ref(), 0);
        gl.active_texture(GL::TEXTURE0);
        self.apply_lights(scene);

        for (_, mesh) in scene.meshes() {
            let Some(buffers) = self.boxes.get(&mesh.geometry) else {
                continue;
            };
            gl.bind_vertex_array(Some(&buffers.vao));

            let model = mesh.world_matrix();
            let normal_matrix = Mat3::from_mat4(model).inverse().transpose();
            gl.uniform_matrix4fv_with_f32_array(self.uniforms.model.as_ref(), false, &model.to_cols_array());
            gl.uniform_matrix3fv_with_f32_array(
                self.uniforms.normal_matrix.as_ref(),
                false,
                &normal_matrix.to_cols_array(),
            );

            let (groups, indices_per_group) = match mesh.materials {
                MeshMaterials::Single(_) => (1, INDICES_PER_FACE * FACE_COUNT as i32),
                MeshMaterials::PerFace(_) => (FACE_COUNT, INDICES_PER_FACE),
            };

            for group in 0..groups {
                let Some(material) = mesh
                    .material_for_face(group)
                    .and_then(|id| scene.material(id))
                else {
                    continue;
                };

                gl.uniform3fv_with_f32_array(self.uniforms.color.as_ref(), &rgb(material.color));
                gl.uniform3fv_with_f32_array(self.uniforms.emissive.as_ref(), &rgb(material.emissive));
                let lit = !matches!(material.shading, Shading::Basic);
                gl.uniform1i(self.uniforms.lit.as_ref(), i32::from(lit));

                let map = material
                    .map
                    .and_then(|id| self.faces.get(&id))
                    .filter(|face| face.uploaded.is_some());
                gl.uniform1i(self.uniforms.use_map.as_ref(), i32::from(map.is_some()));
                gl.bind_texture(GL::TEXTURE_2D, map.map(|face| &face.texture));

                let offset = group as i32 * indices_per_group * 2;
                gl.draw_elements_with_i32(GL::TRIANGLES, indices_per_group, GL::UNSIGNED_SHORT, offset);
            }
        }

        gl.bind_vertex_array(None);
    }

    fn release(&mut self, resource: Resource) {
        match resource {
            Resource::Geometry(id) => {
                if let Some(buffers) = self.boxes.remove(&id) {
                    buffers.delete(&self.gl);
                }
            }
            Resource::Texture(id) => {
                if let Some(face) = self.faces.remove(&id) {
                    self.gl.delete_texture(Some(&face.texture));
                }
            }
            // Materials are plain uniforms; nothing lives on the GPU.
            Resource::Material(_) => {}
        }
    }

    fn dispose(&mut self) {
        for (_, buffers) in self.boxes.drain() {
            buffers.delete(&self.gl);
        }
        for (_, face) in self.faces.drain() {
            self.gl.delete_texture(Some(&face.texture));
        }
        if let Some(program) = self.program.take() {
            self.gl.delete_program(Some(&program));
        }
    }
}

impl FacePainter for WebGlSurface {
    fn paint(&mut self, texture: TextureId, content: &FaceContent) {
        if self.program.is_none() {
            return;
        }
        if !self.faces.contains_key(&texture) {
            let Some(face) = FaceTexture::create(&self.document, &self.gl) else {
                return;
            };
            self.faces.insert(texture, face);
        }
        if let Some(face) = self.faces.get(&texture) {
            paint_face(&mut Canvas2d(&face.context), content);
        }
    }
}
