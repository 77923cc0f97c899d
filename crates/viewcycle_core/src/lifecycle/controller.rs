use std::cell::RefCell;
use std::rc::Rc;

use super::content::{ContentView, LayoutId};

/// Normalized lifecycle callbacks shared by controllers and secondary observers.
///
/// Entering callbacks (`start`, `resume`, `focus`) are delivered to the controller
/// first and to observers second; leaving callbacks (`blur`, `pause`, `persist`,
/// `stop`) go to observers first.
///
/// Every method defaults to a no-op so observers only implement what they need.
pub trait LifecycleObserver {
    fn on_controller_start(&mut self) {}
    fn on_controller_resume(&mut self) {}
    fn on_controller_focus(&mut self) {}
    fn on_controller_blur(&mut self) {}
    fn on_controller_pause(&mut self) {}

    /// Last chance to write user data somewhere durable; always follows `pause`.
    fn on_controller_persist_user_data(&mut self) {}

    fn on_controller_stop(&mut self) {}
}

/// Shared, non-owning-in-spirit handle the registry keeps for an observer.
///
/// Identity is the allocation: adding the same `Rc` twice is a no-op.
pub type ObserverRef = Rc<RefCell<dyn LifecycleObserver>>;

pub(crate) fn same_observer(a: &ObserverRef, b: &ObserverRef) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

/// The application object a delegate drives.
///
/// Guarantees (for any valid host call sequence):
/// - create -> [restore] -> content_layout_id -> [content_view_created] -> start -> resume -> [focus]
/// - [blur] -> pause -> persist -> stop -> [save]
/// - each callback fires at most once per state entered or left
pub trait ViewController: LifecycleObserver {
    /// Opaque payload handed to `on_controller_create` (launch extras / arguments).
    type Extras;
    /// Opaque persisted state; the delegate never looks inside.
    type SavedState;
    /// Content element produced by the host's inflater.
    type View: ContentView;

    fn on_controller_create(&mut self, extras: Option<&Self::Extras>);

    fn on_controller_restore_instance_state(&mut self, _saved: &Self::SavedState) {}

    /// Layout to instantiate; [`LayoutId::NONE`] means "no visual content".
    fn on_controller_get_content_layout_id(&mut self) -> LayoutId;

    fn on_controller_content_view_created(&mut self, _view: &Self::View) {}

    fn on_controller_save_instance_state(&mut self, _out: &mut Self::SavedState) {}
}

/// Controllers hosted by dialog-style sub-containers.
pub trait DialogController: ViewController {
    type Dialog;

    fn on_controller_create_dialog(&mut self) -> Self::Dialog;
}
