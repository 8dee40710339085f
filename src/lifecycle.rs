#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TeardownStep {
    StopLoop,
    RemoveListeners,
    DisposeResources,
    ReleaseSurface,
    DetachSurface,
    ClearReferences,
}

impl TeardownStep {
    #[cfg(test)]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StopLoop => "stop_loop",
            Self::RemoveListeners => "remove_listeners",
            Self::DisposeResources => "dispose_resources",
            Self::ReleaseSurface => "release_surface",
            Self::DetachSurface => "detach_surface",
            Self::ClearReferences => "clear_references",
        }
    }
}

pub const TEARDOWN_ORDER: [TeardownStep; 6] = [
    TeardownStep::StopLoop,
    TeardownStep::RemoveListeners,
    TeardownStep::DisposeResources,
    TeardownStep::ReleaseSurface,
    TeardownStep::DetachSurface,
    TeardownStep::ClearReferences,
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SetupError {
    NoWindow,
    NoDocument,
    CanvasUnavailable,
    ContextUnavailable,
    ShaderCompile,
    ProgramLink,
    BufferAllocation,
    AttachFailed,
}

impl SetupError {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoWindow => "no_window",
            Self::NoDocument => "no_document",
            Self::CanvasUnavailable => "canvas_unavailable",
            Self::ContextUnavailable => "context_unavailable",
            Self::ShaderCompile => "shader_compile",
            Self::ProgramLink => "program_link",
            Self::BufferAllocation => "buffer_allocation",
            Self::AttachFailed => "attach_failed",
        }
    }
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for SetupError {}

pub trait TeardownHooks {
    fn stop_loop(&mut self);
    fn remove_listeners(&mut self);
    fn dispose_resources(&mut self);
    fn release_surface(&mut self);
    fn detach_surface(&mut self);
    fn clear_references(&mut self);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lifecycle {
    torn_down: bool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Runs every step once. Later calls return `false` and touch nothing.
    pub fn teardown<H: TeardownHooks + ?Sized>(&mut self, hooks: &mut H) -> bool {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;

        for step in TEARDOWN_ORDER {
            match step {
                TeardownStep::StopLoop => hooks.stop_loop(),
                TeardownStep::RemoveListeners => hooks.remove_listeners(),
                TeardownStep::DisposeResources => hooks.dispose_resources(),
                TeardownStep::ReleaseSurface => hooks.release_surface(),
                TeardownStep::DetachSurface => hooks.detach_surface(),
                TeardownStep::ClearReferences => hooks.clear_references(),
            }
        }
        true
    }
}
