use crate::face::FacePainter;
use crate::hover::HoverChange;
use crate::scene::RenderSurface;
use crate::visuals::Visual;

pub type FrameHandle = i32;

pub trait FrameScheduler {
    fn request(&mut self) -> Option<FrameHandle>;
    fn cancel(&mut self, handle: FrameHandle);
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameLoop {
    running: bool,
    pending: Option<FrameHandle>,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    #[cfg(test)]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.running {
            return;
        }
        self.running = true;
        self.pending = scheduler.request();
    }

    /// Called when a requested frame fires. Returns whether the frame body
    /// should run.
    pub fn begin_frame(&mut self) -> bool {
        self.pending = None;
        if !self.running {
            return false;
        }
        self.frames += 1;
        true
    }

    pub fn end_frame<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.running && self.pending.is_none() {
            self.pending = scheduler.request();
        }
    }

    /// Returns `true` if this call stopped a running loop.
    pub fn stop<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> bool {
        let was_running = self.running;
        self.running = false;
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
        was_running
    }
}

/// One frame body: advance, repaint animated faces, render. Returns the
/// hover transition the frame produced.
pub fn render_frame<V, S>(visual: &mut V, surface: &mut S) -> HoverChange
where
    V: Visual + ?Sized,
    S: RenderSurface + FacePainter + ?Sized,
{
    visual.advance();

    for (texture, content) in visual.animated_faces() {
        surface.paint(texture, &content);
        if let Some(texture) = visual.scene_mut().texture_mut(texture) {
            texture.mark_dirty();
        }
    }

    surface.render(visual.scene(), visual.camera());
    visual.take_hover_change()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Default)]
    pub struct ManualScheduler {
        next: FrameHandle,
        pub requested: Vec<FrameHandle>,
        pub cancelled: Vec<FrameHandle>,
    }

    impl FrameScheduler for ManualScheduler {
        fn request(&mut self) -> Option<FrameHandle> {
            self.next += 1;
            self.requested.push(self.next);
            Some(self.next)
        }

        fn cancel(&mut self, handle: FrameHandle) {
            self.cancelled.push(handle);
        }
    }
}
