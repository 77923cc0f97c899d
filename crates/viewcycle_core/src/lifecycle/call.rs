/// Host notifications a delegate accepts.
///
/// These are the **host-invoked** entry points. The normalized controller
/// callbacks they produce are described on [`ViewController`](super::ViewController).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum HostCall {
    // Shared by both delegates
    Create,
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
    SaveInstanceState,
    WindowFocusChanged,

    // Top-level only
    Restart,
    Finish,

    // Sub-container only
    Attach,
    CreateView,
    ViewCreated,
    DestroyView,
    Detach,
    CreateDialog,
}

/// Internal, compact IDs used for error payloads.
impl HostCall {
    pub const fn id(self) -> u8 {
        match self {
            HostCall::Create => 1,
            HostCall::Start => 2,
            HostCall::Resume => 3,
            HostCall::Pause => 4,
            HostCall::Stop => 5,
            HostCall::Destroy => 6,
            HostCall::SaveInstanceState => 7,
            HostCall::WindowFocusChanged => 8,
            HostCall::Restart => 9,
            HostCall::Finish => 10,
            HostCall::Attach => 11,
            HostCall::CreateView => 12,
            HostCall::ViewCreated => 13,
            HostCall::DestroyView => 14,
            HostCall::Detach => 15,
            HostCall::CreateDialog => 16,
        }
    }

    /// Stable, human-readable label (matches the delegate method name).
    pub const fn label(self) -> &'static str {
        match self {
            HostCall::Create => "on_create",
            HostCall::Start => "on_start",
            HostCall::Resume => "on_resume",
            HostCall::Pause => "on_pause",
            HostCall::Stop => "on_stop",
            HostCall::Destroy => "on_destroy",
            HostCall::SaveInstanceState => "on_save_instance_state",
            HostCall::WindowFocusChanged => "on_window_focus_changed",
            HostCall::Restart => "on_restart",
            HostCall::Finish => "finish",
            HostCall::Attach => "on_attach",
            HostCall::CreateView => "on_create_view",
            HostCall::ViewCreated => "on_view_created",
            HostCall::DestroyView => "on_destroy_view",
            HostCall::Detach => "on_detach",
            HostCall::CreateDialog => "on_create_dialog",
        }
    }

    pub(crate) const fn tag(self) -> (u8, &'static str) {
        (self.id(), self.label())
    }
}
