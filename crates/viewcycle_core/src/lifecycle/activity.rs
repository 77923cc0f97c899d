use std::rc::Rc;

use crate::error::{CoreError, Result};

use super::call::HostCall;
use super::content::{ContentView, Inflater, ViewId};
use super::controller::ViewController;
use super::finish::FinishHandle;
use super::registry::{LifecycleOwner, LifecycleRegistry};
use super::state::{ActivityState, ControllerState};
use super::tracker::{LifecycleTracker, StateCell};

/// Lifecycle delegate for a top-level container.
///
/// The host-bound type owns one of these and forwards every host notification to
/// the matching `on_*` method. The delegate turns that stream into the ordered
/// [`ViewController`] callbacks and drives the secondary-observer registry.
///
/// Failure modes:
/// - a call the current state does not accept returns `InvalidTransition`
/// - any call after `Finished`/`Destroyed` is ignored
pub struct ActivityDelegate<C: ViewController> {
    controller: C,
    cell: Rc<StateCell<ActivityState>>,
    registry: Rc<LifecycleRegistry>,
    content: Option<C::View>,
    finish: FinishHandle,
}

/// Public API (host facing).
impl<C: ViewController> ActivityDelegate<C> {
    pub fn new(controller: C) -> Self {
        Self::with_finish_handle(controller, FinishHandle::new())
    }

    /// Build with a finish handle the controller already holds a clone of.
    pub fn with_finish_handle(controller: C, finish: FinishHandle) -> Self {
        let cell = Rc::new(StateCell::new(ActivityState::Initialized));
        let registry = Rc::new(LifecycleRegistry::new(cell.clone()));

        Self {
            controller,
            cell,
            registry,
            content: None,
            finish,
        }
    }

    /// Host `create`: create -> [restore] -> content layout -> [content view created].
    pub fn on_create<I>(
        &mut self,
        extras: Option<&C::Extras>,
        saved_state: Option<&C::SavedState>,
        inflater: &mut I,
    ) -> Result<()>
    where
        I: Inflater<C::View> + ?Sized,
    {
        if self.is_ignored(HostCall::Create) {
            return Ok(());
        }

        if self.state() != ActivityState::Initialized {
            return Err(self.reject(HostCall::Create, "Initialized"));
        }

        self.transition(HostCall::Create, ActivityState::Created);
        self.controller.on_controller_create(extras);
        if self.finish_if_requested() {
            return Ok(());
        }

        if let Some(saved_state) = saved_state {
            self.controller.on_controller_restore_instance_state(saved_state);
            if self.finish_if_requested() {
                return Ok(());
            }
        }

        let layout = self.controller.on_controller_get_content_layout_id();
        if self.finish_if_requested() {
            return Ok(());
        }

        if !layout.is_none() {
            let view = inflater.inflate(layout, None);
            self.content = Some(view.clone());
            self.controller.on_controller_content_view_created(&view);
        }

        self.finish_if_requested();
        Ok(())
    }

    /// Host `restart`: state repair only.
    pub fn on_restart(&mut self) -> Result<()> {
        if self.is_ignored(HostCall::Restart) {
            return Ok(());
        }

        match self.state() {
            ActivityState::InstanceStateSaved => {
                self.transition(HostCall::Restart, ActivityState::Created)
            }
            ActivityState::Created => {}
            _ => return Err(self.reject(HostCall::Restart, "Created or InstanceStateSaved")),
        }

        Ok(())
    }

    pub fn on_start(&mut self) -> Result<()> {
        if self.is_ignored(HostCall::Start) {
            return Ok(());
        }

        if self.state() != ActivityState::Created {
            return Err(self.reject(HostCall::Start, "Created"));
        }

        self.transition(HostCall::Start, ActivityState::Started);
        self.perform_start();

        self.finish_if_requested();
        Ok(())
    }

    pub fn on_resume(&mut self) -> Result<()> {
        if self.is_ignored(HostCall::Resume) {
            return Ok(());
        }

        match self.state() {
            // Some hosts resume straight out of a save without restart/start.
            ActivityState::InstanceStateSaved => self.perform_start(),
            ActivityState::Started => {}
            _ => return Err(self.reject(HostCall::Resume, "Started or InstanceStateSaved")),
        }

        self.transition(HostCall::Resume, ActivityState::Resumed);
        self.controller.on_controller_resume();
        self.cell.announce(Some(ControllerState::Resumed));
        self.registry.dispatch_resume();

        // A finish requested while resuming unwinds before focus is handed out.
        if self.finish_if_requested() {
            return Ok(());
        }

        if self.cell.has_window_focus() {
            self.perform_focus();
        }

        self.finish_if_requested();
        Ok(())
    }

    pub fn on_pause(&mut self) -> Result<()> {
        if self.is_ignored(HostCall::Pause) {
            return Ok(());
        }

        match self.state() {
            ActivityState::InstanceStateSaved => return Ok(()),
            ActivityState::Resumed => {}
            _ => return Err(self.reject(HostCall::Pause, "Resumed")),
        }

        self.perform_pause();
        self.finish_if_requested();
        Ok(())
    }

    pub fn on_stop(&mut self) -> Result<()> {
        if self.is_ignored(HostCall::Stop) {
            return Ok(());
        }

        match self.state() {
            ActivityState::InstanceStateSaved => return Ok(()),
            ActivityState::Started => {}
            _ => return Err(self.reject(HostCall::Stop, "Started")),
        }

        self.perform_stop();
        self.finish_if_requested();
        Ok(())
    }

    pub fn on_destroy(&mut self) -> Result<()> {
        if self.state() == ActivityState::Destroyed {
            return Ok(());
        }
        self.finish_if_requested();

        if !matches!(
            self.state(),
            ActivityState::Created | ActivityState::InstanceStateSaved | ActivityState::Finished
        ) {
            return Err(self.reject(
                HostCall::Destroy,
                "Created, InstanceStateSaved or Finished",
            ));
        }

        self.transition(HostCall::Destroy, ActivityState::Destroyed);
        self.content = None;
        Ok(())
    }

    /// Host `save state`: unwinds to stopped first, then hands `out` to the controller.
    pub fn on_save_instance_state(&mut self, out: &mut C::SavedState) -> Result<()> {
        if self.is_ignored(HostCall::SaveInstanceState) {
            return Ok(());
        }

        if self.state() == ActivityState::Resumed {
            self.perform_pause();
        }

        if self.state() == ActivityState::Started {
            self.perform_stop();
        }

        self.transition(HostCall::SaveInstanceState, ActivityState::InstanceStateSaved);
        self.controller.on_controller_save_instance_state(out);

        self.finish_if_requested();
        Ok(())
    }

    /// Edge-triggered: repeated values are ignored, focus/blur only fire while resumed.
    pub fn on_window_focus_changed(&mut self, has_focus: bool) -> Result<()> {
        if self.state() == ActivityState::Destroyed || has_focus == self.cell.has_window_focus() {
            return Ok(());
        }

        self.cell.set_window_focus(has_focus);

        if self.state() == ActivityState::Resumed {
            if has_focus {
                self.perform_focus();
            } else {
                self.perform_blur();
            }
        }

        self.finish_if_requested();
        Ok(())
    }

    /// Finish now: unwind pause/stop as needed and move to `Finished`.
    ///
    /// From inside a controller or observer callback use [`FinishHandle::request`]
    /// instead; the delegate picks the request up once the running call returns.
    pub fn finish(&mut self) {
        self.finish.take();
        self.perform_finish();
    }

    pub fn state(&self) -> ActivityState {
        self.cell.get()
    }

    pub fn has_window_focus(&self) -> bool {
        self.cell.has_window_focus()
    }

    /// True once finished, or when a finish request is waiting to be honoured.
    /// Host calls other than `on_destroy` are ignored from here on.
    pub fn is_finishing(&self) -> bool {
        self.state().is_terminal() || self.finish.is_requested()
    }

    pub fn finish_handle(&self) -> FinishHandle {
        self.finish.clone()
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    /// Installed content element, if the controller asked for one.
    pub fn content_view(&self) -> Option<&C::View> {
        self.content.as_ref()
    }

    pub fn find_view_by_id(&self, id: ViewId) -> Option<C::View> {
        self.content.as_ref().and_then(|view| view.find_view_by_id(id))
    }
}

/// Internal state machine plumbing.
impl<C: ViewController> ActivityDelegate<C> {
    fn is_ignored(&mut self, call: HostCall) -> bool {
        self.finish_if_requested();

        let state = self.state();
        if state.is_terminal() {
            tracing::debug!(call = call.label(), state = state.label(), "ignored after finish");
            return true;
        }

        false
    }

    fn reject(&self, call: HostCall, expected: &'static str) -> CoreError {
        let state = self.state();
        CoreError::invalid_host_call(call.tag(), (state.id(), state.label()), expected)
    }

    fn transition(&self, call: HostCall, next: ActivityState) {
        tracing::debug!(
            call = call.label(),
            from = self.state().label(),
            to = next.label(),
            "activity transition"
        );
        self.cell.set(next);
    }

    /// Drain a pending finish request; true if the delegate is now finished.
    fn finish_if_requested(&mut self) -> bool {
        if self.finish.take() {
            self.perform_finish();
        }

        self.state().is_terminal()
    }

    fn perform_start(&mut self) {
        self.controller.on_controller_start();
        self.cell.announce(Some(ControllerState::Started));
        self.registry.dispatch_start();
    }

    fn perform_focus(&mut self) {
        self.controller.on_controller_focus();
        self.cell.announce(Some(ControllerState::Focused));
        self.registry.dispatch_focus();
    }

    /// Only undoes a focus that was actually handed out.
    fn perform_blur(&mut self) {
        if !self.registry.is_controller_state_at_least(ControllerState::Focused) {
            return;
        }

        self.cell.announce(Some(ControllerState::Resumed));
        self.registry.dispatch_blur();
        self.controller.on_controller_blur();
    }

    fn perform_pause(&mut self) {
        self.transition(HostCall::Pause, ActivityState::Started);
        self.perform_blur();

        self.cell.announce(Some(ControllerState::Started));
        self.registry.dispatch_pause();
        self.controller.on_controller_pause();

        self.registry.dispatch_persist_user_data();
        self.controller.on_controller_persist_user_data();
    }

    fn perform_stop(&mut self) {
        self.transition(HostCall::Stop, ActivityState::Created);

        self.cell.announce(None);
        self.registry.dispatch_stop();
        self.controller.on_controller_stop();
    }

    fn perform_finish(&mut self) {
        if self.state().is_terminal() {
            return;
        }

        if self.state() == ActivityState::Resumed {
            self.perform_pause();
        }

        if self.state() == ActivityState::Started {
            self.perform_stop();
        }

        self.transition(HostCall::Finish, ActivityState::Finished);

        // Requests raised by the unwinding callbacks themselves are already satisfied.
        self.finish.take();
    }
}

impl<C: ViewController> LifecycleOwner for ActivityDelegate<C> {
    fn controller_lifecycle(&self) -> Rc<LifecycleRegistry> {
        Rc::clone(&self.registry)
    }
}
