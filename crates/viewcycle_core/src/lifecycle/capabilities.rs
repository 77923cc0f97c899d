/// What the host platform can do for sub-containers.
///
/// Passed explicitly to [`FragmentDelegate`](super::FragmentDelegate) so that the
/// legacy branches are reachable from tests without faking a platform version.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HostCapabilities {
    /// The host reports window focus per content element.
    ///
    /// When false, a sub-container with content is assumed focused for as long as
    /// the content exists.
    pub window_focus_for_sub_containers: bool,

    /// The host never delivers the content-ready notification for sub-containers,
    /// so the delegate fires it right after instantiating the content element.
    pub emulate_content_ready: bool,
}

impl HostCapabilities {
    pub const MODERN: HostCapabilities = HostCapabilities {
        window_focus_for_sub_containers: true,
        emulate_content_ready: false,
    };

    pub const LEGACY: HostCapabilities = HostCapabilities {
        window_focus_for_sub_containers: false,
        emulate_content_ready: true,
    };
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self::MODERN
    }
}
