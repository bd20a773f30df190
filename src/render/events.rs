use crate::scheduler::Progress;

/// Events emitted during a run that renderers can handle
#[derive(Debug, Clone)]
pub enum RenderEvent {
    /// Generation started
    Started,

    /// A chunk was generated
    Progress(Progress),

    /// A source raster finished loading
    SourceLoaded,

    /// The mask is complete
    MaskComplete,

    /// The run finished and the final raster is available
    Completed,
}

/// Requests an interactive renderer raises for the app loop to act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    /// Move on to the next candidate source
    NextSource,

    /// Load one location directly, falling back to the candidate list
    LoadLocation(String),

    /// Throw the mask away and start a new run
    Regenerate,
}
