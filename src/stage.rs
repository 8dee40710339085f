use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{window, Event, EventTarget, HtmlElement, PointerEvent};
use yew::NodeRef;

use crate::config::ClientConfig;
use crate::face::FacePainter;
use crate::frame_loop::{render_frame, FrameHandle, FrameLoop, FrameScheduler};
use crate::lifecycle::{Lifecycle, SetupError, TeardownHooks};
use crate::logging::{log_event, LogLevel};
use crate::raycast::normalize_pointer;
use crate::scene::{apply_resize, RenderSurface};
use crate::visuals::Visual;
use crate::webgl::WebGlSurface;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

struct AnimationFrames {
    callback: FrameCallback,
}

impl FrameScheduler for AnimationFrames {
    fn request(&mut self) -> Option<FrameHandle> {
        let callback = self.callback.borrow();
        let callback = callback.as_ref()?;
        window()?
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .ok()
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if let Some(win) = window() {
            let _ = win.cancel_animation_frame(handle);
        }
    }
}

struct Shared<V> {
    visual: Option<V>,
    surface: Option<WebGlSurface>,
    frame_loop: FrameLoop,
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Option<Self> {
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .ok()?;
        Some(Self {
            target,
            event,
            callback,
        })
    }

    fn detach(self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

pub struct Stage<V: Visual + 'static> {
    name: &'static str,
    container: HtmlElement,
    shared: Rc<RefCell<Shared<V>>>,
    frame_callback: FrameCallback,
    listeners: Vec<Listener>,
    lifecycle: Lifecycle,
    config: ClientConfig,
}

fn container_size(container: &HtmlElement) -> (u32, u32) {
    (
        container.client_width().max(0) as u32,
        container.client_height().max(0) as u32,
    )
}

impl<V: Visual + 'static> Stage<V> {
    pub fn mount(
        container: HtmlElement,
        config: ClientConfig,
        build: impl FnOnce(f32) -> V,
    ) -> Result<Self, SetupError> {
        let win = window().ok_or(SetupError::NoWindow)?;
        let document = win.document().ok_or(SetupError::NoDocument)?;

        let (width, height) = container_size(&container);
        let aspect = if width > 0 && height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };

        let mut visual = build(aspect);
        let mut surface = WebGlSurface::new(&document)?;
        for (texture, content) in visual.initial_faces() {
            surface.paint(texture, &content);
            if let Some(texture) = visual.scene_mut().texture_mut(texture) {
                texture.mark_dirty();
            }
        }
        apply_resize(visual.camera_mut(), &mut surface, width, height);

        if container.append_child(surface.canvas()).is_err() {
            surface.dispose();
            return Err(SetupError::AttachFailed);
        }

        let name = visual.name();
        let tracks_pointer = visual.tracks_pointer();
        let shared = Rc::new(RefCell::new(Shared {
            visual: Some(visual),
            surface: Some(surface),
            frame_loop: FrameLoop::new(),
        }));

        let frame_callback: FrameCallback = Rc::new(RefCell::new(None));
        {
            let shared = shared.clone();
            let callback = frame_callback.clone();
            *frame_callback.borrow_mut() = Some(Closure::<dyn FnMut()>::new(move || {
                let mut guard = shared.borrow_mut();
                let Shared {
                    visual,
                    surface,
                    frame_loop,
                } = &mut *guard;
                if !frame_loop.begin_frame() {
                    return;
                }
                if let (Some(visual), Some(surface)) = (visual.as_mut(), surface.as_mut()) {
                    if let Some(fields) = render_frame(visual, surface).fields() {
                        log_event(&config, LogLevel::Debug, "hover_changed", fields);
                    }
                }
                frame_loop.end_frame(&mut AnimationFrames {
                    callback: callback.clone(),
                });
            }));
        }

        let mut stage = Self {
            name,
            container,
            shared,
            frame_callback,
            listeners: Vec::new(),
            lifecycle: Lifecycle::new(),
            config,
        };

        stage.listen_for_resize(&win);
        if tracks_pointer {
            stage.listen_for_pointer(&win);
        }

        stage
            .shared
            .borrow_mut()
            .frame_loop
            .start(&mut AnimationFrames {
                callback: stage.frame_callback.clone(),
            });

        log_event(
            &stage.config,
            LogLevel::Info,
            "stage_mounted",
            json!({ "visual": name, "width": width, "height": height }),
        );

        Ok(stage)
    }

    fn listen_for_resize(&mut self, win: &web_sys::Window) {
        let shared = self.shared.clone();
        let container = self.container.clone();
        let callback = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            let (width, height) = container_size(&container);
            let mut guard = shared.borrow_mut();
            let Shared {
                visual, surface, ..
            } = &mut *guard;
            if let (Some(visual), Some(surface)) = (visual.as_mut(), surface.as_mut()) {
                apply_resize(visual.camera_mut(), surface, width, height);
            }
        });

        let target: EventTarget = win.clone().into();
        if let Some(listener) = Listener::attach(target, "resize", callback) {
            self.listeners.push(listener);
        }
    }

    /// The field sits behind the page content, so pointer moves are taken
    /// from the window and measured against the container's rectangle.
    fn listen_for_pointer(&mut self, win: &web_sys::Window) {
        let shared = self.shared.clone();
        let container = self.container.clone();
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let rect = container.get_bounding_client_rect();
            let Some(ndc) = normalize_pointer(
                f64::from(event.client_x()),
                f64::from(event.client_y()),
                rect.left(),
                rect.top(),
                rect.width(),
                rect.height(),
            ) else {
                return;
            };
            if let Some(visual) = shared.borrow_mut().visual.as_mut() {
                visual.set_pointer(ndc);
            }
        });

        let target: EventTarget = win.clone().into();
        if let Some(listener) = Listener::attach(target, "pointermove", callback) {
            self.listeners.push(listener);
        }
    }

    /// Stops the loop and frees everything the mount created. Only the first
    /// call does anything.
    pub fn teardown(&mut self) -> bool {
        let mut lifecycle = self.lifecycle;
        let ran = lifecycle.teardown(self);
        self.lifecycle = lifecycle;

        if ran {
            log_event(
                &self.config,
                LogLevel::Info,
                "stage_torn_down",
                json!({ "visual": self.name }),
            );
        }
        ran
    }
}

impl<V: Visual + 'static> TeardownHooks for Stage<V> {
    fn stop_loop(&mut self) {
        self.shared.borrow_mut().frame_loop.stop(&mut AnimationFrames {
            callback: self.frame_callback.clone(),
        });
    }

    fn remove_listeners(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
    }

    fn dispose_resources(&mut self) {
        let mut guard = self.shared.borrow_mut();
        let Shared {
            visual, surface, ..
        } = &mut *guard;
        let (Some(visual), Some(surface)) = (visual.as_mut(), surface.as_mut()) else {
            return;
        };
        visual.release_interaction();
        let summary = visual.scene_mut().dispose(surface);
        log_event(
            &self.config,
            LogLevel::Debug,
            "stage_resources_released",
            json!({
                "visual": self.name,
                "geometries": summary.geometries,
                "materials": summary.materials,
                "textures": summary.textures,
            }),
        );
    }

    fn release_surface(&mut self) {
        if let Some(surface) = self.shared.borrow_mut().surface.as_mut() {
            surface.dispose();
        }
    }

    fn detach_surface(&mut self) {
        let shared = self.shared.borrow();
        let Some(surface) = shared.surface.as_ref() else {
            return;
        };
        let canvas = surface.canvas();
        let attached_here = canvas
            .parent_node()
            .is_some_and(|parent| parent.is_same_node(Some(self.container.as_ref())));
        if attached_here {
            let _ = self.container.remove_child(canvas);
        }
    }

    fn clear_references(&mut self) {
        {
            let mut shared = self.shared.borrow_mut();
            shared.visual = None;
            shared.surface = None;
        }
        self.frame_callback.borrow_mut().take();
    }
}

impl<V: Visual + 'static> Drop for Stage<V> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Mounts into the element behind `node`, logging instead of failing. A
/// missing container or a setup error leaves the page without the visual.
pub fn mount_into<V: Visual + 'static>(
    node: &NodeRef,
    config: ClientConfig,
    build: impl FnOnce(f32) -> V,
) -> Option<Stage<V>> {
    let Some(container) = node.cast::<HtmlElement>() else {
        log_event(
            &config,
            LogLevel::Debug,
            "stage_container_missing",
            json!({}),
        );
        return None;
    };

    match Stage::mount(container, config, build) {
        Ok(stage) => Some(stage),
        Err(error) => {
            log_event(
                &config,
                LogLevel::Info,
                "stage_setup_failed",
                json!({ "reason": error.as_str() }),
            );
            None
        }
    }
}
