use viewcycle_core::error::Result;
use viewcycle_core::lifecycle::{
    DialogController, FragmentDelegate, FragmentState, HostCall, Inflater, ViewController,
};

use crate::config::HostConfig;
use crate::error::log_core_error;

/// One sub-container host notification.
///
/// Window focus is not an event here: the delegate listens on its own content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentEvent<E, S, V> {
    Attach,
    Create {
        saved_state: Option<S>,
        arguments: Option<E>,
    },
    CreateView {
        container: Option<V>,
    },
    ViewCreated,
    Start,
    Resume,
    Pause,
    Stop,
    SaveInstanceState,
    DestroyView,
    Destroy,
    Detach,
}

impl<E, S, V> FragmentEvent<E, S, V> {
    pub fn call(&self) -> HostCall {
        match self {
            FragmentEvent::Attach => HostCall::Attach,
            FragmentEvent::Create { .. } => HostCall::Create,
            FragmentEvent::CreateView { .. } => HostCall::CreateView,
            FragmentEvent::ViewCreated => HostCall::ViewCreated,
            FragmentEvent::Start => HostCall::Start,
            FragmentEvent::Resume => HostCall::Resume,
            FragmentEvent::Pause => HostCall::Pause,
            FragmentEvent::Stop => HostCall::Stop,
            FragmentEvent::SaveInstanceState => HostCall::SaveInstanceState,
            FragmentEvent::DestroyView => HostCall::DestroyView,
            FragmentEvent::Destroy => HostCall::Destroy,
            FragmentEvent::Detach => HostCall::Detach,
        }
    }
}

/// Event alias for a given controller type.
pub type FragmentEventFor<C> = FragmentEvent<
    <C as ViewController>::Extras,
    <C as ViewController>::SavedState,
    <C as ViewController>::View,
>;

/// Host-side owner of a [`FragmentDelegate`].
///
/// The delegate is built from the capabilities in [`HostConfig`].
pub struct FragmentHost<C: ViewController, I> {
    name: String,
    delegate: FragmentDelegate<C>,
    inflater: I,
    saved_state: Option<C::SavedState>,
    applied: usize,
    rejected: usize,
}

impl<C, I> FragmentHost<C, I>
where
    C: ViewController + 'static,
    C::SavedState: Default,
    I: Inflater<C::View>,
{
    pub fn new(config: &HostConfig, controller: C, inflater: I) -> Self {
        Self {
            name: config.name.clone(),
            delegate: FragmentDelegate::with_capabilities(controller, config.capabilities),
            inflater,
            saved_state: None,
            applied: 0,
            rejected: 0,
        }
    }

    /// Forward one event. Rejections are logged, counted and returned.
    pub fn handle(&mut self, event: FragmentEventFor<C>) -> Result<()> {
        let call = event.call();
        tracing::trace!(host = %self.name, call = call.label(), "fragment event");

        let outcome = self.forward(event);
        self.record(outcome)
    }

    /// Forward a batch in order, stopping at the first rejection.
    pub fn handle_all<T>(&mut self, events: T) -> Result<()>
    where
        T: IntoIterator<Item = FragmentEventFor<C>>,
    {
        for event in events {
            self.handle(event)?;
        }

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> FragmentState {
        self.delegate.state()
    }

    pub fn delegate(&self) -> &FragmentDelegate<C> {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut FragmentDelegate<C> {
        &mut self.delegate
    }

    pub fn saved_state(&self) -> Option<&C::SavedState> {
        self.saved_state.as_ref()
    }

    pub fn applied_events(&self) -> usize {
        self.applied
    }

    pub fn rejected_events(&self) -> usize {
        self.rejected
    }

    fn record(&mut self, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => self.applied += 1,
            Err(ref err) => {
                self.rejected += 1;
                log_core_error(err);
            }
        }

        outcome
    }

    fn forward(&mut self, event: FragmentEventFor<C>) -> Result<()> {
        let delegate = &mut self.delegate;

        match event {
            FragmentEvent::Attach => delegate.on_attach(),
            FragmentEvent::Create {
                saved_state,
                arguments,
            } => delegate.on_create(saved_state.as_ref(), arguments.as_ref()),
            FragmentEvent::CreateView { container } => delegate
                .on_create_view(&mut self.inflater, container.as_ref())
                .map(|_| ()),
            FragmentEvent::ViewCreated => delegate.on_view_created(),
            FragmentEvent::Start => delegate.on_start(),
            FragmentEvent::Resume => delegate.on_resume(),
            FragmentEvent::Pause => delegate.on_pause(),
            FragmentEvent::Stop => delegate.on_stop(),
            FragmentEvent::SaveInstanceState => {
                let ignored = delegate.state() == FragmentState::Destroyed;
                let mut out = C::SavedState::default();
                delegate.on_save_instance_state(&mut out)?;

                if !ignored {
                    self.saved_state = Some(out);
                }
                Ok(())
            }
            FragmentEvent::DestroyView => delegate.on_destroy_view(),
            FragmentEvent::Destroy => delegate.on_destroy(),
            FragmentEvent::Detach => delegate.on_detach(),
        }
    }
}

impl<C, I> FragmentHost<C, I>
where
    C: DialogController + 'static,
    C::SavedState: Default,
    I: Inflater<C::View>,
{
    /// Dialog-style sub-containers: ask the controller for its dialog.
    pub fn create_dialog(&mut self) -> Result<Option<<C as DialogController>::Dialog>> {
        tracing::trace!(host = %self.name, call = HostCall::CreateDialog.label(), "fragment event");

        let outcome = self.delegate.on_create_dialog();
        if let Err(ref err) = outcome {
            self.rejected += 1;
            log_core_error(err);
        } else {
            self.applied += 1;
        }

        outcome
    }
}
