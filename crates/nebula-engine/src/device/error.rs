/// What the render loop does after `get_current_texture` fails.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Lost or outdated surface; it has been configured again at the current
    /// size and the next frame can draw.
    Reconfigured,
    /// Timeout or an unclassified error; this frame is dropped.
    SkipFrame,
    /// Out of memory; the window closes.
    Fatal,
}
