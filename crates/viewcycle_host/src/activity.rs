use viewcycle_core::error::Result;
use viewcycle_core::lifecycle::{
    ActivityDelegate, ActivityState, HostCall, Inflater, ViewController,
};

use crate::config::HostConfig;
use crate::error::log_core_error;

/// One top-level host notification, as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent<E, S> {
    Create {
        extras: Option<E>,
        saved_state: Option<S>,
    },
    Restart,
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
    SaveInstanceState,
    WindowFocusChanged(bool),
    Finish,
}

impl<E, S> ActivityEvent<E, S> {
    /// Entry point this event maps onto.
    pub fn call(&self) -> HostCall {
        match self {
            ActivityEvent::Create { .. } => HostCall::Create,
            ActivityEvent::Restart => HostCall::Restart,
            ActivityEvent::Start => HostCall::Start,
            ActivityEvent::Resume => HostCall::Resume,
            ActivityEvent::Pause => HostCall::Pause,
            ActivityEvent::Stop => HostCall::Stop,
            ActivityEvent::Destroy => HostCall::Destroy,
            ActivityEvent::SaveInstanceState => HostCall::SaveInstanceState,
            ActivityEvent::WindowFocusChanged(_) => HostCall::WindowFocusChanged,
            ActivityEvent::Finish => HostCall::Finish,
        }
    }
}

/// Host-side owner of an [`ActivityDelegate`].
///
/// Responsibilities:
/// - Own the delegate and the inflater used to build content
/// - Forward each [`ActivityEvent`] to the matching delegate entry point
/// - Log rejected events and keep applied/rejected counters
/// - Keep the most recent saved state
pub struct ActivityHost<C: ViewController, I> {
    name: String,
    delegate: ActivityDelegate<C>,
    inflater: I,
    saved_state: Option<C::SavedState>,
    applied: usize,
    rejected: usize,
}

/// Public API (host facing).
impl<C, I> ActivityHost<C, I>
where
    C: ViewController,
    C::SavedState: Default,
    I: Inflater<C::View>,
{
    pub fn new(config: &HostConfig, controller: C, inflater: I) -> Self {
        Self::with_delegate(config, ActivityDelegate::new(controller), inflater)
    }

    /// Wrap a delegate built elsewhere, e.g. one sharing a finish handle.
    pub fn with_delegate(config: &HostConfig, delegate: ActivityDelegate<C>, inflater: I) -> Self {
        Self {
            name: config.name.clone(),
            delegate,
            inflater,
            saved_state: None,
            applied: 0,
            rejected: 0,
        }
    }

    /// Forward one event. Rejections are logged, counted and returned.
    pub fn handle(&mut self, event: ActivityEvent<C::Extras, C::SavedState>) -> Result<()> {
        let call = event.call();
        tracing::trace!(host = %self.name, call = call.label(), "activity event");

        match self.forward(event) {
            Ok(()) => {
                self.applied += 1;
                Ok(())
            }
            Err(err) => {
                self.rejected += 1;
                log_core_error(&err);
                Err(err)
            }
        }
    }

    /// Forward a batch in order, stopping at the first rejection.
    pub fn handle_all<T>(&mut self, events: T) -> Result<()>
    where
        T: IntoIterator<Item = ActivityEvent<C::Extras, C::SavedState>>,
    {
        for event in events {
            self.handle(event)?;
        }

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ActivityState {
        self.delegate.state()
    }

    pub fn delegate(&self) -> &ActivityDelegate<C> {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut ActivityDelegate<C> {
        &mut self.delegate
    }

    /// State captured by the last `SaveInstanceState` event.
    pub fn saved_state(&self) -> Option<&C::SavedState> {
        self.saved_state.as_ref()
    }

    pub fn applied_events(&self) -> usize {
        self.applied
    }

    pub fn rejected_events(&self) -> usize {
        self.rejected
    }
}

impl<C, I> ActivityHost<C, I>
where
    C: ViewController,
    C::SavedState: Default,
    I: Inflater<C::View>,
{
    fn forward(&mut self, event: ActivityEvent<C::Extras, C::SavedState>) -> Result<()> {
        let delegate = &mut self.delegate;

        match event {
            ActivityEvent::Create {
                extras,
                saved_state,
            } => delegate.on_create(extras.as_ref(), saved_state.as_ref(), &mut self.inflater),
            ActivityEvent::Restart => delegate.on_restart(),
            ActivityEvent::Start => delegate.on_start(),
            ActivityEvent::Resume => delegate.on_resume(),
            ActivityEvent::Pause => delegate.on_pause(),
            ActivityEvent::Stop => delegate.on_stop(),
            ActivityEvent::Destroy => delegate.on_destroy(),
            ActivityEvent::SaveInstanceState => {
                let ignored = delegate.is_finishing();
                let mut out = C::SavedState::default();
                delegate.on_save_instance_state(&mut out)?;

                if !ignored {
                    self.saved_state = Some(out);
                }
                Ok(())
            }
            ActivityEvent::WindowFocusChanged(has_focus) => {
                delegate.on_window_focus_changed(has_focus)
            }
            ActivityEvent::Finish => {
                delegate.finish();
                Ok(())
            }
        }
    }
}
