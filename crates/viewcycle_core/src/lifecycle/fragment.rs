use std::cell::{Cell, RefCell, RefMut};
use std::rc::{Rc, Weak};

use crate::error::{CoreError, Result};

use super::call::HostCall;
use super::capabilities::HostCapabilities;
use super::content::{ContentView, Inflater, ViewId, WindowFocusListener};
use super::controller::{DialogController, ViewController};
use super::registry::{LifecycleOwner, LifecycleRegistry};
use super::state::{ControllerState, FragmentState};
use super::tracker::{LifecycleTracker, StateCell};

/// State reachable from both the delegate and the focus listener it hands out.
struct Shared<C> {
    controller: RefCell<C>,
    cell: Rc<StateCell<FragmentState>>,
    registry: Rc<LifecycleRegistry>,

    // Bumped on every content teardown; listeners from older content go inert.
    generation: Cell<u64>,

    // Set while a host call runs. Focus reports arriving then are staged.
    busy: Cell<bool>,
    pending_focus: Cell<Option<(u64, bool)>>,
}

impl<C: ViewController> Shared<C> {
    fn report_window_focus(&self, generation: u64, has_focus: bool) {
        if generation != self.generation.get() {
            tracing::trace!(generation, "focus report from stale content ignored");
            return;
        }

        if self.busy.get() {
            self.pending_focus.set(Some((generation, has_focus)));
            return;
        }

        self.busy.set(true);
        self.apply_window_focus(has_focus);
        self.drain_pending_focus();
        self.busy.set(false);
    }

    fn drain_pending_focus(&self) {
        while let Some((generation, has_focus)) = self.pending_focus.take() {
            if generation == self.generation.get() {
                self.apply_window_focus(has_focus);
            }
        }
    }

    fn apply_window_focus(&self, has_focus: bool) {
        if has_focus == self.cell.has_window_focus() {
            return;
        }

        self.cell.set_window_focus(has_focus);

        if self.cell.get() != FragmentState::Resumed {
            return;
        }

        if has_focus {
            self.perform_focus();
        } else {
            self.perform_blur();
        }
    }

    fn perform_focus(&self) {
        self.controller.borrow_mut().on_controller_focus();
        self.cell.announce(Some(ControllerState::Focused));
        self.registry.dispatch_focus();
    }

    /// Only undoes a focus that was actually handed out.
    fn perform_blur(&self) {
        if !self.registry.is_controller_state_at_least(ControllerState::Focused) {
            return;
        }

        self.cell.announce(Some(ControllerState::Resumed));
        self.registry.dispatch_blur();
        self.controller.borrow_mut().on_controller_blur();
    }

    fn perform_start(&self) {
        self.controller.borrow_mut().on_controller_start();
        self.cell.announce(Some(ControllerState::Started));
        self.registry.dispatch_start();
    }
}

/// Clears `busy` and applies staged focus reports when a host call returns.
struct BusyGuard<C: ViewController> {
    shared: Rc<Shared<C>>,
}

impl<C: ViewController> Drop for BusyGuard<C> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            self.shared.drain_pending_focus();
        }
        self.shared.busy.set(false);
    }
}

/// Lifecycle delegate for an embeddable sub-container.
///
/// Compared with [`ActivityDelegate`](super::ActivityDelegate) it adds an
/// attach/detach phase and a content phase that can be torn down and rebuilt
/// several times per attachment. Each rebuild resets focus tracking and binds a
/// fresh [`WindowFocusListener`] to the new content element.
pub struct FragmentDelegate<C: ViewController> {
    shared: Rc<Shared<C>>,
    capabilities: HostCapabilities,
    content: Option<C::View>,
    focus_listener: Option<WindowFocusListener>,
    content_ready_fired: bool,
}

/// Public API (host facing).
impl<C: ViewController + 'static> FragmentDelegate<C> {
    pub fn new(controller: C) -> Self {
        Self::with_capabilities(controller, HostCapabilities::default())
    }

    pub fn with_capabilities(controller: C, capabilities: HostCapabilities) -> Self {
        let cell = Rc::new(StateCell::new(FragmentState::Initialized));
        let registry = Rc::new(LifecycleRegistry::new(cell.clone()));

        Self {
            shared: Rc::new(Shared {
                controller: RefCell::new(controller),
                cell,
                registry,
                generation: Cell::new(0),
                busy: Cell::new(false),
                pending_focus: Cell::new(None),
            }),
            capabilities,
            content: None,
            focus_listener: None,
            content_ready_fired: false,
        }
    }

    pub fn on_attach(&mut self) -> Result<()> {
        let _busy = self.enter_call();

        match self.state() {
            // Some hosts attach twice.
            FragmentState::Destroyed | FragmentState::Attached => Ok(()),
            FragmentState::Initialized | FragmentState::InstanceStateSaved => {
                self.transition(HostCall::Attach, FragmentState::Attached);
                Ok(())
            }
            _ => Err(self.reject(HostCall::Attach, "Initialized or InstanceStateSaved")),
        }
    }

    pub fn on_create(
        &mut self,
        saved_state: Option<&C::SavedState>,
        arguments: Option<&C::Extras>,
    ) -> Result<()> {
        let _busy = self.enter_call();

        match self.state() {
            FragmentState::Destroyed => return Ok(()),
            FragmentState::Attached => {}
            _ => return Err(self.reject(HostCall::Create, "Attached")),
        }

        self.transition(HostCall::Create, FragmentState::Created);
        self.controller_mut().on_controller_create(arguments);

        if let Some(saved_state) = saved_state {
            self.controller_mut()
                .on_controller_restore_instance_state(saved_state);
        }

        Ok(())
    }

    /// Host `create content`: returns the new content element, or `None` when the
    /// controller has no visual content.
    pub fn on_create_view<I>(
        &mut self,
        inflater: &mut I,
        container: Option<&C::View>,
    ) -> Result<Option<C::View>>
    where
        I: Inflater<C::View> + ?Sized,
    {
        let _busy = self.enter_call();

        match self.state() {
            FragmentState::Destroyed => return Ok(None),
            // Attached: retained instances skip create.
            FragmentState::Attached
            | FragmentState::Created
            | FragmentState::Stopped
            | FragmentState::InstanceStateSaved => {}
            _ => {
                return Err(self.reject(
                    HostCall::CreateView,
                    "Attached, Created, Stopped or InstanceStateSaved",
                ))
            }
        }

        self.transition(HostCall::CreateView, FragmentState::ContentReady);
        self.release_content();
        self.shared.cell.set_window_focus(false);

        let layout = self.controller_mut().on_controller_get_content_layout_id();
        if layout.is_none() {
            // Nothing on screen that could lose focus.
            self.shared.cell.set_window_focus(true);
            return Ok(None);
        }

        let view = inflater.inflate(layout, container);
        self.content = Some(view.clone());

        if self.capabilities.emulate_content_ready {
            self.fire_content_ready();
        }

        if self.capabilities.window_focus_for_sub_containers {
            let listener = self.focus_listener_for_current_content();
            view.add_window_focus_listener(&listener);
            self.focus_listener = Some(listener);
        } else {
            self.shared.cell.set_window_focus(true);
        }

        Ok(Some(view))
    }

    /// Host `content ready`: the element returned by `on_create_view` is in place.
    pub fn on_view_created(&mut self) -> Result<()> {
        let _busy = self.enter_call();

        match self.state() {
            FragmentState::Destroyed => Ok(()),
            FragmentState::ContentReady => {
                self.fire_content_ready();
                Ok(())
            }
            _ => Err(self.reject(HostCall::ViewCreated, "ContentReady")),
        }
    }

    pub fn on_start(&mut self) -> Result<()> {
        let _busy = self.enter_call();

        match self.state() {
            FragmentState::Destroyed => return Ok(()),
            FragmentState::ContentReady
            | FragmentState::Stopped
            | FragmentState::InstanceStateSaved => {}
            _ => {
                return Err(self.reject(
                    HostCall::Start,
                    "ContentReady, Stopped or InstanceStateSaved",
                ))
            }
        }

        self.transition(HostCall::Start, FragmentState::Started);
        self.shared.perform_start();
        Ok(())
    }

    pub fn on_resume(&mut self) -> Result<()> {
        let _busy = self.enter_call();

        match self.state() {
            FragmentState::Destroyed => return Ok(()),
            // Resume observed without the preceding start.
            FragmentState::InstanceStateSaved => self.shared.perform_start(),
            FragmentState::Started => {}
            _ => return Err(self.reject(HostCall::Resume, "Started or InstanceStateSaved")),
        }

        self.transition(HostCall::Resume, FragmentState::Resumed);
        self.controller_mut().on_controller_resume();
        self.shared.cell.announce(Some(ControllerState::Resumed));
        self.shared.registry.dispatch_resume();

        if self.shared.cell.has_window_focus() {
            self.shared.perform_focus();
        }

        Ok(())
    }

    pub fn on_pause(&mut self) -> Result<()> {
        let _busy = self.enter_call();

        match self.state() {
            FragmentState::Destroyed | FragmentState::InstanceStateSaved => Ok(()),
            FragmentState::Resumed => {
                self.perform_pause();
                Ok(())
            }
            _ => Err(self.reject(HostCall::Pause, "Resumed")),
        }
    }

    pub fn on_stop(&mut self) -> Result<()> {
        let _busy = self.enter_call();

        match self.state() {
            FragmentState::Destroyed | FragmentState::InstanceStateSaved => Ok(()),
            FragmentState::Started => {
                self.perform_stop();
                Ok(())
            }
            _ => Err(self.reject(HostCall::Stop, "Started")),
        }
    }

    /// Host `content teardown`: detaches the focus listener and drops the element.
    pub fn on_destroy_view(&mut self) -> Result<()> {
        let _busy = self.enter_call();

        match self.state() {
            FragmentState::Destroyed => return Ok(()),
            FragmentState::Stopped
            | FragmentState::ContentReady
            | FragmentState::InstanceStateSaved => {}
            _ => {
                return Err(self.reject(
                    HostCall::DestroyView,
                    "Stopped, ContentReady or InstanceStateSaved",
                ))
            }
        }

        self.transition(HostCall::DestroyView, FragmentState::Created);
        self.release_content();
        Ok(())
    }

    pub fn on_destroy(&mut self) -> Result<()> {
        let _busy = self.enter_call();

        match self.state() {
            FragmentState::Destroyed => Ok(()),
            FragmentState::Created | FragmentState::InstanceStateSaved => {
                self.transition(HostCall::Destroy, FragmentState::Destroyed);
                self.release_content();
                Ok(())
            }
            _ => Err(self.reject(HostCall::Destroy, "Created or InstanceStateSaved")),
        }
    }

    /// Host `detach`: back to `Initialized`, either after destroy or, for retained
    /// instances, directly after content teardown.
    pub fn on_detach(&mut self) -> Result<()> {
        let _busy = self.enter_call();

        match self.state() {
            FragmentState::Created
            | FragmentState::Destroyed
            | FragmentState::InstanceStateSaved => {
                self.transition(HostCall::Detach, FragmentState::Initialized);
                self.release_content();
                Ok(())
            }
            _ => Err(self.reject(
                HostCall::Detach,
                "Created, Destroyed or InstanceStateSaved",
            )),
        }
    }

    pub fn on_save_instance_state(&mut self, out: &mut C::SavedState) -> Result<()> {
        let _busy = self.enter_call();

        if self.state() == FragmentState::Destroyed {
            return Ok(());
        }

        if self.state() == FragmentState::Resumed {
            self.perform_pause();
        }

        if self.state() == FragmentState::Started {
            self.perform_stop();
        }

        self.transition(HostCall::SaveInstanceState, FragmentState::InstanceStateSaved);
        self.controller_mut().on_controller_save_instance_state(out);
        Ok(())
    }

    pub fn state(&self) -> FragmentState {
        self.shared.cell.get()
    }

    pub fn has_window_focus(&self) -> bool {
        self.shared.cell.has_window_focus()
    }

    pub fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    /// Read the controller. Focus reports raised while `f` runs are applied after it.
    pub fn with_controller<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        let _busy = self.enter_call();
        // Borrow ends here, before the guard applies staged focus reports.
        let result = f(&self.shared.controller.borrow());
        result
    }

    /// Mutable counterpart of [`FragmentDelegate::with_controller`].
    pub fn with_controller_mut<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        let _busy = self.enter_call();
        let result = f(&mut self.shared.controller.borrow_mut());
        result
    }

    /// Current content element; `None` before creation and after teardown.
    pub fn content_view(&self) -> Option<&C::View> {
        self.content.as_ref()
    }

    pub fn find_view_by_id(&self, id: ViewId) -> Option<C::View> {
        self.content.as_ref().and_then(|view| view.find_view_by_id(id))
    }
}

impl<C: DialogController + 'static> FragmentDelegate<C> {
    /// Host `create dialog`: lets the controller build the dialog for dialog-style
    /// sub-containers. `None` once destroyed.
    pub fn on_create_dialog(&mut self) -> Result<Option<C::Dialog>> {
        let _busy = self.enter_call();

        match self.state() {
            FragmentState::Destroyed => Ok(None),
            FragmentState::Created
            | FragmentState::ContentReady
            | FragmentState::Started
            | FragmentState::InstanceStateSaved => {
                Ok(Some(self.controller_mut().on_controller_create_dialog()))
            }
            _ => Err(self.reject(
                HostCall::CreateDialog,
                "Created, ContentReady, Started or InstanceStateSaved",
            )),
        }
    }
}

/// Internal state machine plumbing.
impl<C: ViewController + 'static> FragmentDelegate<C> {
    fn controller_mut(&self) -> RefMut<'_, C> {
        self.shared.controller.borrow_mut()
    }

    fn enter_call(&self) -> BusyGuard<C> {
        self.shared.busy.set(true);
        BusyGuard {
            shared: Rc::clone(&self.shared),
        }
    }

    fn reject(&self, call: HostCall, expected: &'static str) -> CoreError {
        let state = self.state();
        CoreError::invalid_host_call(call.tag(), (state.id(), state.label()), expected)
    }

    fn transition(&self, call: HostCall, next: FragmentState) {
        tracing::debug!(
            call = call.label(),
            from = self.state().label(),
            to = next.label(),
            "fragment transition"
        );
        self.shared.cell.set(next);
    }

    fn fire_content_ready(&mut self) {
        if self.content_ready_fired {
            return;
        }

        if let Some(view) = self.content.clone() {
            self.content_ready_fired = true;
            self.controller_mut().on_controller_content_view_created(&view);
        }
    }

    fn focus_listener_for_current_content(&self) -> WindowFocusListener {
        let generation = self.shared.generation.get();
        let shared: Weak<Shared<C>> = Rc::downgrade(&self.shared);

        WindowFocusListener::new(move |has_focus| {
            if let Some(shared) = shared.upgrade() {
                shared.report_window_focus(generation, has_focus);
            }
        })
    }

    /// Detach this content's own listener, drop the element, retire its generation.
    fn release_content(&mut self) {
        let view = self.content.take();
        let listener = self.focus_listener.take();

        if let (Some(view), Some(listener)) = (view, listener) {
            view.remove_window_focus_listener(&listener);
        }

        self.content_ready_fired = false;
        self.shared.generation.set(self.shared.generation.get() + 1);
    }

    fn perform_pause(&mut self) {
        self.transition(HostCall::Pause, FragmentState::Started);
        self.shared.perform_blur();

        self.shared.cell.announce(Some(ControllerState::Started));
        self.shared.registry.dispatch_pause();
        self.controller_mut().on_controller_pause();

        self.shared.registry.dispatch_persist_user_data();
        self.controller_mut().on_controller_persist_user_data();
    }

    fn perform_stop(&mut self) {
        self.transition(HostCall::Stop, FragmentState::Stopped);

        self.shared.cell.announce(None);
        self.shared.registry.dispatch_stop();
        self.controller_mut().on_controller_stop();
    }
}

impl<C: ViewController> LifecycleOwner for FragmentDelegate<C> {
    fn controller_lifecycle(&self) -> Rc<LifecycleRegistry> {
        Rc::clone(&self.shared.registry)
    }
}
