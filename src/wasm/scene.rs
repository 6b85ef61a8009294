//! The two canvases of the page, built and torn down through [`SceneFactory`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::{Mat4, Vec3};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{window, Document, HtmlCanvasElement, WebGl2RenderingContext as GL};

use super::asset;
use super::gl::{self, GpuMesh, Lights, MeshProgram, PointsRenderer};
use super::raf::RafLoop;
use crate::animation::{Bob, FrameStep, Spin, Transform};
use crate::camera::{Camera, Viewport};
use crate::config::{BouquetConfig, ParticleConfig, SceneConfig};
use crate::lifecycle::{Disposer, SceneFactory, SceneHandle};
use crate::loader::{AssetSlot, LoadOutcome, LoadTicket, ReadinessPolicy, LOADED_OFFSET, LOADED_SCALE};
use crate::mesh::{fallback_bouquet, Model};
use crate::particles::ParticleCloud;
use crate::{Error, Result};

pub const BACKGROUND_CANVAS_ID: &str = "background-canvas";
pub const BOUQUET_CANVAS_ID: &str = "bouquet-canvas";

pub fn canvas_by_id(document: &Document, id: &str) -> Result<HtmlCanvasElement> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| Error::ElementMissing(id.to_string()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| Error::ElementMissing(id.to_string()))
}

fn viewport(canvas: &HtmlCanvasElement) -> Viewport {
    Viewport {
        css_width: f64::from(canvas.client_width()),
        css_height: f64::from(canvas.client_height()),
        pixel_ratio: window().map_or(1.0, |w| w.device_pixel_ratio()),
    }
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

/// Registers `on_resize` on the window and its removal on `disposer`.
fn watch_resize(disposer: &mut Disposer, on_resize: impl FnMut() + 'static) -> Result<()> {
    let window = window().ok_or(Error::NoWindow)?;
    let closure = Closure::wrap(Box::new(on_resize) as Box<dyn FnMut()>);
    window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    disposer.push(move || {
        let _ = window.remove_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        drop(closure);
    });
    Ok(())
}

/// Uploads every node of `model`, deleting the partial upload on failure.
fn upload_model(gl: &GL, model: &Model) -> Result<Vec<(GpuMesh, Mat4)>> {
    let mut meshes = Vec::with_capacity(model.mesh_count());
    for node in &model.nodes {
        match GpuMesh::upload(gl, &node.mesh) {
            Ok(mesh) => meshes.push((mesh, node.transform)),
            Err(err) => {
                for (mesh, _) in &meshes {
                    mesh.delete(gl);
                }
                return Err(err);
            }
        }
    }
    Ok(meshes)
}

struct Background {
    gl: GL,
    canvas: HtmlCanvasElement,
    camera: Camera,
    transform: Transform,
    spin: Spin,
    renderer: PointsRenderer,
    config: ParticleConfig,
    point_scale: f32,
}

impl Background {
    fn sync_size(&mut self) {
        let viewport = viewport(&self.canvas);
        viewport.sync(&mut self.camera);
        let (width, height) = viewport.buffer_size();
        gl::resize(&self.gl, &self.canvas, width, height);
        self.point_scale = height as f32 * 0.5;
    }

    fn frame(&mut self, step: FrameStep) {
        self.spin.apply(&mut self.transform, step);
        self.renderer.draw(
            &self.gl,
            &self.camera,
            self.transform.matrix(),
            self.config.size,
            self.point_scale,
            self.config.opacity,
        );
    }
}

struct Bouquet {
    gl: GL,
    canvas: HtmlCanvasElement,
    camera: Camera,
    lights: Lights,
    program: MeshProgram,
    slot: AssetSlot<Model>,
    meshes: Vec<(GpuMesh, Mat4)>,
    transform: Transform,
    spin: Spin,
    bob: Bob,
    boost: f32,
}

impl Bouquet {
    fn sync_size(&mut self) {
        let viewport = viewport(&self.canvas);
        viewport.sync(&mut self.camera);
        let (width, height) = viewport.buffer_size();
        gl::resize(&self.gl, &self.canvas, width, height);
    }

    /// Attaches the load outcome and uploads it. Returns whether the
    /// fallback was used. A loaded model the GPU rejects is replaced by the
    /// fallback.
    fn attach(&mut self, ticket: LoadTicket, outcome: LoadOutcome<Model>, config: &BouquetConfig) -> Result<bool> {
        let content = self.slot.resolve(
            ticket,
            outcome,
            |model| {
                model.place(LOADED_SCALE, LOADED_OFFSET);
                model.mark_shadows();
            },
            || fallback_bouquet(config),
        )?;
        let fallback = content.is_fallback();
        let meshes = match upload_model(&self.gl, content.asset()) {
            Ok(meshes) => meshes,
            Err(err) if !fallback => {
                log::warn!("bouquet model upload failed, using fallback: {err}");
                let content = self.slot.fall_back(|| fallback_bouquet(config))?;
                let meshes = upload_model(&self.gl, content.asset())?;
                self.meshes = meshes;
                return Ok(true);
            }
            Err(err) => return Err(err),
        };
        self.meshes = meshes;
        Ok(fallback)
    }

    fn frame(&mut self, step: FrameStep) {
        self.spin.apply(&mut self.transform, step);
        self.bob.apply(&mut self.transform, step);
        self.transform.rotation.y += std::mem::take(&mut self.boost);
        let root = self.transform.matrix();
        self.program.begin(&self.gl, &self.camera, &self.lights);
        for (mesh, local) in &self.meshes {
            self.program.draw(&self.gl, mesh, root * *local);
        }
    }

    fn release(&mut self) {
        self.slot.close();
        for (mesh, _) in self.meshes.drain(..) {
            mesh.delete(&self.gl);
        }
        self.program.delete(&self.gl);
    }
}

/// The live bouquet, as seen by the rest of the page.
///
/// Holds only a weak reference: once the scene is disposed every call is a
/// no-op.
#[derive(Clone)]
pub struct BouquetHandle {
    state: Weak<RefCell<Bouquet>>,
}

impl BouquetHandle {
    pub fn is_live(&self) -> bool {
        self.state.strong_count() > 0
    }

    /// Adds `radians` of extra spin on the next frame.
    pub fn boost(&self, radians: f32) -> bool {
        match self.state.upgrade() {
            Some(state) => {
                state.borrow_mut().boost += radians;
                true
            }
            None => false,
        }
    }
}

pub struct WebScenes {
    background: HtmlCanvasElement,
    bouquet: HtmlCanvasElement,
    policy: ReadinessPolicy,
}

impl WebScenes {
    pub fn from_document(document: &Document) -> Result<Self> {
        Ok(Self {
            background: canvas_by_id(document, BACKGROUND_CANVAS_ID)?,
            bouquet: canvas_by_id(document, BOUQUET_CANVAS_ID)?,
            policy: ReadinessPolicy::default(),
        })
    }

    pub fn bouquet_canvas(&self) -> &HtmlCanvasElement {
        &self.bouquet
    }
}

impl SceneFactory for WebScenes {
    type Background = ();
    type Bouquet = BouquetHandle;

    fn start_background(&mut self, config: &SceneConfig) -> Result<SceneHandle<()>> {
        let mut disposer = Disposer::new();
        let gl = gl::context(&self.background)?;
        let particles = &config.particles;
        let cloud = ParticleCloud::generate(particles, &mut SmallRng::seed_from_u64(random_seed()));
        let renderer = PointsRenderer::new(&gl, &cloud)?;

        let state = Rc::new(RefCell::new(Background {
            gl,
            canvas: self.background.clone(),
            camera: Camera::new(particles.fov_deg, Vec3::new(0.0, 0.0, particles.camera_distance)),
            transform: Transform::default(),
            spin: Spin(Vec3::new(particles.spin.0, particles.spin.1, 0.0)),
            renderer,
            config: particles.clone(),
            point_scale: 1.0,
        }));
        state.borrow_mut().sync_size();
        {
            let state = Rc::clone(&state);
            disposer.push(move || {
                let state = state.borrow();
                state.renderer.delete(&state.gl);
            });
        }

        let weak = Rc::downgrade(&state);
        watch_resize(&mut disposer, move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().sync_size();
            }
        })?;

        let weak = Rc::downgrade(&state);
        let raf = RafLoop::new(config.time_scaling, move |step| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().frame(step);
            }
        });
        raf.start()?;
        disposer.push(move || raf.cancel());

        log::info!("background started with {} particles", cloud.len());
        Ok(SceneHandle::new((), disposer))
    }

    fn start_bouquet(&mut self, config: &SceneConfig) -> Result<SceneHandle<BouquetHandle>> {
        let mut disposer = Disposer::new();
        let gl = gl::context(&self.bouquet)?;
        let program = MeshProgram::new(&gl)?;
        let bouquet = &config.bouquet;
        let mut slot = AssetSlot::new();
        let ticket = slot.begin()?;

        let state = Rc::new(RefCell::new(Bouquet {
            gl,
            canvas: self.bouquet.clone(),
            camera: Camera::new(bouquet.fov_deg, Vec3::from(bouquet.camera_position)),
            lights: Lights {
                ambient: bouquet.ambient,
                direction: bouquet.light_direction,
                color: bouquet.light_color,
            },
            program,
            slot,
            meshes: Vec::new(),
            transform: Transform::default(),
            spin: Spin(Vec3::new(0.0, bouquet.spin_y, 0.0)),
            bob: Bob {
                base_y: 0.0,
                amplitude: bouquet.bob_amplitude,
                frequency: bouquet.bob_frequency,
            },
            boost: 0.0,
        }));
        state.borrow_mut().sync_size();
        {
            let state = Rc::clone(&state);
            disposer.push(move || state.borrow_mut().release());
        }

        let weak = Rc::downgrade(&state);
        watch_resize(&mut disposer, move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().sync_size();
            }
        })?;

        // Filled in once content is attached; disposal may come first.
        let raf: Rc<RefCell<Option<RafLoop>>> = Rc::new(RefCell::new(None));
        {
            let raf = Rc::clone(&raf);
            disposer.push(move || {
                if let Some(raf) = raf.borrow_mut().take() {
                    raf.cancel();
                }
            });
        }

        let weak = Rc::downgrade(&state);
        let config = config.clone();
        let policy = self.policy;
        wasm_bindgen_futures::spawn_local(async move {
            let url = config.bouquet.model_url.clone();
            let outcome = asset::load_model(&url, policy, |progress| {
                if let Some(percent) = progress.percent() {
                    log::debug!("{url}: {percent:.0}%");
                }
            })
            .await;

            let Some(state) = weak.upgrade() else {
                log::debug!("bouquet disposed before its content resolved");
                return;
            };
            let attached = state.borrow_mut().attach(ticket, outcome, &config.bouquet);
            match attached {
                Ok(fallback) => {
                    log::info!("bouquet ready ({})", if fallback { "fallback" } else { "model" });
                    let frame_state = Rc::downgrade(&state);
                    let render = RafLoop::new(config.time_scaling, move |step| {
                        if let Some(state) = frame_state.upgrade() {
                            state.borrow_mut().frame(step);
                        }
                    });
                    if let Err(err) = render.start() {
                        log::error!("bouquet render loop failed to start: {err}");
                    }
                    *raf.borrow_mut() = Some(render);
                }
                Err(err) => log::warn!("bouquet content not attached: {err}"),
            }
        });

        let handle = BouquetHandle {
            state: Rc::downgrade(&state),
        };
        Ok(SceneHandle::new(handle, disposer))
    }
}
