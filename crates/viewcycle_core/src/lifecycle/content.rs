use std::fmt;
use std::rc::Rc;

/// Identifier of a layout the host knows how to instantiate.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct LayoutId(pub u32);

impl LayoutId {
    /// "No visual content": the delegate skips instantiation.
    pub const NONE: LayoutId = LayoutId(0);

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Identifier of an element inside an instantiated content tree.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ViewId(pub u32);

/// A content element handle supplied by the host.
///
/// Handles are cheap to clone (the host's own reference type). The delegate keeps
/// exactly one while content is installed and drops it on content teardown.
pub trait ContentView: Clone {
    /// Look up a descendant (or self) by identifier.
    fn find_view_by_id(&self, id: ViewId) -> Option<Self>;

    /// Hosts that can report window focus per element deliver changes through `listener`.
    fn add_window_focus_listener(&self, _listener: &WindowFocusListener) {}

    fn remove_window_focus_listener(&self, _listener: &WindowFocusListener) {}
}

/// Instantiates content for a layout, optionally inside a parent container.
pub trait Inflater<V> {
    fn inflate(&mut self, layout: LayoutId, container: Option<&V>) -> V;
}

impl<V, F> Inflater<V> for F
where
    F: FnMut(LayoutId, Option<&V>) -> V,
{
    fn inflate(&mut self, layout: LayoutId, container: Option<&V>) -> V {
        self(layout, container)
    }
}

/// Window-focus callback attached to a content element.
///
/// Each instance has its own identity ([`WindowFocusListener::ptr_eq`]); a host
/// must remove exactly the instance it was given.
#[derive(Clone)]
pub struct WindowFocusListener {
    callback: Rc<dyn Fn(bool)>,
}

impl WindowFocusListener {
    pub fn new(callback: impl Fn(bool) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Called by the host when the element's window gains or loses focus.
    pub fn on_window_focus_changed(&self, has_focus: bool) {
        (self.callback)(has_focus)
    }

    pub fn ptr_eq(&self, other: &WindowFocusListener) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.callback) as *const (),
            Rc::as_ptr(&other.callback) as *const (),
        )
    }
}

impl fmt::Debug for WindowFocusListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowFocusListener")
            .field("ptr", &(Rc::as_ptr(&self.callback) as *const ()))
            .finish()
    }
}
