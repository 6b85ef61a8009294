//! WebGL2 programs and GPU buffers for the two scenes.

use glam::Mat4;
use js_sys::{Float32Array, Uint32Array};
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::camera::Camera;
use crate::mesh::{normal_matrix, Mesh};
use crate::particles::ParticleCloud;
use crate::{Error, Result};

pub fn context(canvas: &HtmlCanvasElement) -> Result<GL> {
    let gl: GL = canvas
        .get_context("webgl2")?
        .ok_or(Error::ContextUnavailable)?
        .dyn_into()
        .map_err(|_| Error::ContextUnavailable)?;
    Ok(gl)
}

fn compile(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| Error::Shader("create_shader failed".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let info = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(Error::Shader(info))
    }
}

pub fn link(gl: &GL, vertex: &str, fragment: &str) -> Result<WebGlProgram> {
    let vs = compile(gl, GL::VERTEX_SHADER, vertex)?;
    let fs = match compile(gl, GL::FRAGMENT_SHADER, fragment) {
        Ok(fs) => fs,
        Err(err) => {
            gl.delete_shader(Some(&vs));
            return Err(err);
        }
    };
    let program = gl
        .create_program()
        .ok_or_else(|| Error::Shader("create_program failed".into()))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);
    // Linked programs keep their own copy.
    gl.delete_shader(Some(&vs));
    gl.delete_shader(Some(&fs));
    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let info = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(Error::Shader(info))
    }
}

fn uniform(gl: &GL, program: &WebGlProgram, name: &str) -> Result<WebGlUniformLocation> {
    gl.get_uniform_location(program, name)
        .ok_or_else(|| Error::Shader(format!("uniform {name} missing")))
}

fn upload_f32(gl: &GL, location: u32, size: i32, data: &[f32]) -> Result<WebGlBuffer> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| Error::Shader("create_buffer failed".into()))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &Float32Array::from(data), GL::STATIC_DRAW);
    gl.enable_vertex_attrib_array(location);
    gl.vertex_attrib_pointer_with_i32(location, size, GL::FLOAT, false, 0, 0);
    Ok(buffer)
}

/// Vertex attributes and indices of `mesh` into the bound vertex array.
fn fill(gl: &GL, mesh: &Mesh, buffers: &mut Vec<WebGlBuffer>) -> Result<()> {
    for (location, data) in [&mesh.positions, &mesh.normals, &mesh.colors].into_iter().enumerate() {
        buffers.push(upload_f32(gl, location as u32, 3, &flatten(data))?);
    }
    let indices = gl
        .create_buffer()
        .ok_or_else(|| Error::Shader("create_buffer failed".into()))?;
    gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&indices));
    gl.buffer_data_with_array_buffer_view(
        GL::ELEMENT_ARRAY_BUFFER,
        &Uint32Array::from(mesh.indices.as_slice()),
        GL::STATIC_DRAW,
    );
    buffers.push(indices);
    Ok(())
}

fn flatten(data: &[[f32; 3]]) -> Vec<f32> {
    data.iter().flatten().copied().collect()
}

/// Keeps the drawing buffer in step with the canvas' CSS size.
pub fn resize(gl: &GL, canvas: &HtmlCanvasElement, width: u32, height: u32) {
    if canvas.width() != width || canvas.height() != height {
        canvas.set_width(width);
        canvas.set_height(height);
    }
    gl.viewport(0, 0, width as i32, height as i32);
}

const POINTS_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;
uniform mat4 u_model_view;
uniform mat4 u_projection;
uniform float u_size;
uniform float u_scale;
out vec3 v_color;
void main() {
    vec4 mv = u_model_view * vec4(a_position, 1.0);
    gl_Position = u_projection * mv;
    gl_PointSize = max(u_size * (u_scale / -mv.z), 1.0);
    v_color = a_color;
}
"#;

const POINTS_FS: &str = r#"#version 300 es
precision mediump float;
uniform float u_opacity;
in vec3 v_color;
out vec4 o_color;
void main() {
    o_color = vec4(v_color, u_opacity);
}
"#;

/// Additively blended, size-attenuated point cloud.
pub struct PointsRenderer {
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    buffers: [WebGlBuffer; 2],
    count: i32,
    model_view: WebGlUniformLocation,
    projection: WebGlUniformLocation,
    size: WebGlUniformLocation,
    scale: WebGlUniformLocation,
    opacity: WebGlUniformLocation,
}

impl PointsRenderer {
    pub fn new(gl: &GL, cloud: &ParticleCloud) -> Result<Self> {
        let program = link(gl, POINTS_VS, POINTS_FS)?;
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| Error::Shader("create_vertex_array failed".into()))?;
        gl.bind_vertex_array(Some(&vao));
        let positions = upload_f32(gl, 0, 3, &cloud.positions)?;
        let colors = upload_f32(gl, 1, 3, &cloud.colors)?;
        gl.bind_vertex_array(None);
        Ok(Self {
            model_view: uniform(gl, &program, "u_model_view")?,
            projection: uniform(gl, &program, "u_projection")?,
            size: uniform(gl, &program, "u_size")?,
            scale: uniform(gl, &program, "u_scale")?,
            opacity: uniform(gl, &program, "u_opacity")?,
            program,
            vao,
            buffers: [positions, colors],
            count: cloud.len() as i32,
        })
    }

    /// `scale` is half the drawing-buffer height, in device pixels.
    pub fn draw(&self, gl: &GL, camera: &Camera, model: Mat4, size: f32, scale: f32, opacity: f32) {
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE);
        gl.use_program(Some(&self.program));
        let model_view = camera.view() * model;
        gl.uniform_matrix4fv_with_f32_array(Some(&self.model_view), false, &model_view.to_cols_array());
        gl.uniform_matrix4fv_with_f32_array(Some(&self.projection), false, &camera.projection().to_cols_array());
        gl.uniform1f(Some(&self.size), size);
        gl.uniform1f(Some(&self.scale), scale);
        gl.uniform1f(Some(&self.opacity), opacity);
        gl.bind_vertex_array(Some(&self.vao));
        gl.draw_arrays(GL::POINTS, 0, self.count);
        gl.bind_vertex_array(None);
    }

    pub fn delete(&self, gl: &GL) {
        for buffer in &self.buffers {
            gl.delete_buffer(Some(buffer));
        }
        gl.delete_vertex_array(Some(&self.vao));
        gl.delete_program(Some(&self.program));
    }
}

const MESH_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;
uniform mat4 u_view_projection;
uniform mat4 u_model;
uniform mat3 u_normal;
out vec3 v_normal;
out vec3 v_color;
void main() {
    gl_Position = u_view_projection * u_model * vec4(a_position, 1.0);
    v_normal = normalize(u_normal * a_normal);
    v_color = a_color;
}
"#;

const MESH_FS: &str = r#"#version 300 es
precision mediump float;
uniform vec3 u_ambient;
uniform vec3 u_light_dir;
uniform vec3 u_light_color;
in vec3 v_normal;
in vec3 v_color;
out vec4 o_color;
void main() {
    float diffuse = max(dot(normalize(v_normal), -normalize(u_light_dir)), 0.0);
    o_color = vec4(v_color * (u_ambient + u_light_color * diffuse), 1.0);
}
"#;

/// Lighting shared by every mesh in a frame.
#[derive(Clone, Copy, Debug)]
pub struct Lights {
    pub ambient: [f32; 3],
    pub direction: [f32; 3],
    pub color: [f32; 3],
}

pub struct MeshProgram {
    program: WebGlProgram,
    view_projection: WebGlUniformLocation,
    model: WebGlUniformLocation,
    normal: WebGlUniformLocation,
    ambient: WebGlUniformLocation,
    light_dir: WebGlUniformLocation,
    light_color: WebGlUniformLocation,
}

impl MeshProgram {
    pub fn new(gl: &GL) -> Result<Self> {
        let program = link(gl, MESH_VS, MESH_FS)?;
        Ok(Self {
            view_projection: uniform(gl, &program, "u_view_projection")?,
            model: uniform(gl, &program, "u_model")?,
            normal: uniform(gl, &program, "u_normal")?,
            ambient: uniform(gl, &program, "u_ambient")?,
            light_dir: uniform(gl, &program, "u_light_dir")?,
            light_color: uniform(gl, &program, "u_light_color")?,
            program,
        })
    }

    /// Clears the frame and binds per-frame state.
    pub fn begin(&self, gl: &GL, camera: &Camera, lights: &Lights) {
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        gl.enable(GL::DEPTH_TEST);
        gl.disable(GL::BLEND);
        gl.use_program(Some(&self.program));
        gl.uniform_matrix4fv_with_f32_array(
            Some(&self.view_projection),
            false,
            &camera.view_projection().to_cols_array(),
        );
        gl.uniform3fv_with_f32_array(Some(&self.ambient), &lights.ambient);
        gl.uniform3fv_with_f32_array(Some(&self.light_dir), &lights.direction);
        gl.uniform3fv_with_f32_array(Some(&self.light_color), &lights.color);
    }

    pub fn draw(&self, gl: &GL, mesh: &GpuMesh, model: Mat4) {
        gl.uniform_matrix4fv_with_f32_array(Some(&self.model), false, &model.to_cols_array());
        gl.uniform_matrix3fv_with_f32_array(Some(&self.normal), false, &normal_matrix(model).to_cols_array());
        gl.bind_vertex_array(Some(&mesh.vao));
        gl.draw_elements_with_i32(GL::TRIANGLES, mesh.count, GL::UNSIGNED_INT, 0);
        gl.bind_vertex_array(None);
    }

    pub fn delete(&self, gl: &GL) {
        gl.delete_program(Some(&self.program));
    }
}

pub struct GpuMesh {
    vao: WebGlVertexArrayObject,
    buffers: Vec<WebGlBuffer>,
    count: i32,
}

impl GpuMesh {
    /// Uploads `mesh`. On failure nothing created so far is left behind.
    pub fn upload(gl: &GL, mesh: &Mesh) -> Result<Self> {
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| Error::Shader("create_vertex_array failed".into()))?;
        gl.bind_vertex_array(Some(&vao));
        let mut buffers = Vec::with_capacity(4);
        let filled = fill(gl, mesh, &mut buffers);
        gl.bind_vertex_array(None);
        if let Err(err) = filled {
            for buffer in &buffers {
                gl.delete_buffer(Some(buffer));
            }
            gl.delete_vertex_array(Some(&vao));
            return Err(err);
        }
        Ok(Self {
            vao,
            buffers,
            count: mesh.indices.len() as i32,
        })
    }

    pub fn delete(&self, gl: &GL) {
        for buffer in &self.buffers {
            gl.delete_buffer(Some(buffer));
        }
        gl.delete_vertex_array(Some(&self.vao));
    }
}
