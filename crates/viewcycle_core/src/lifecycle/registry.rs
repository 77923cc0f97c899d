use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use super::controller::{same_observer, LifecycleObserver, ObserverRef};
use super::state::ControllerState;
use super::tracker::LifecycleTracker;

/// Observer-facing view of a controller's lifecycle.
pub trait ControllerLifecycle: LifecycleTracker {
    /// Subscribe `observer`. If the owner is already started/resumed/focused the
    /// observer is caught up with synthetic start -> resume -> focus first.
    fn add_controller_lifecycle_observer(&self, observer: ObserverRef);

    /// Unsubscribe `observer`, unwinding it with blur -> pause -> stop as needed.
    fn remove_controller_lifecycle_observer(&self, observer: &ObserverRef);
}

/// Anything that can hand out its controller lifecycle.
pub trait LifecycleOwner {
    fn controller_lifecycle(&self) -> Rc<LifecycleRegistry>;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Event {
    Start,
    Resume,
    Focus,
    Blur,
    Pause,
    PersistUserData,
    Stop,
}

impl Event {
    fn deliver(self, observer: &mut dyn LifecycleObserver) {
        match self {
            Event::Start => observer.on_controller_start(),
            Event::Resume => observer.on_controller_resume(),
            Event::Focus => observer.on_controller_focus(),
            Event::Blur => observer.on_controller_blur(),
            Event::Pause => observer.on_controller_pause(),
            Event::PersistUserData => observer.on_controller_persist_user_data(),
            Event::Stop => observer.on_controller_stop(),
        }
    }
}

/// Resets the dispatching flag on every exit path, unwinding included.
struct DispatchGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> DispatchGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

/// Fan-out list of secondary observers for one delegate.
///
/// Observers may add or remove themselves (or others) from inside a callback.
/// Such requests are staged while a dispatch is running and drained right after
/// it, so every observer sees a consistent sequence:
/// - an observer is in at most one of active / pending-add / pending-remove
/// - adding a pending-remove observer cancels the removal
/// - removing a pending-add observer cancels the addition
///
/// In almost all cases this is created and driven by a delegate; it is public for
/// hosts that need to drive it directly.
pub struct LifecycleRegistry {
    tracker: Rc<dyn LifecycleTracker>,
    observers: RefCell<Vec<ObserverRef>>,
    pending_add: RefCell<VecDeque<ObserverRef>>,
    pending_remove: RefCell<VecDeque<ObserverRef>>,
    is_dispatching: Cell<bool>,
}

impl LifecycleRegistry {
    pub fn new(tracker: Rc<dyn LifecycleTracker>) -> Self {
        Self {
            tracker,
            observers: RefCell::new(Vec::new()),
            pending_add: RefCell::new(VecDeque::new()),
            pending_remove: RefCell::new(VecDeque::new()),
            is_dispatching: Cell::new(false),
        }
    }

    /// Number of active observers (staged requests excluded).
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn is_dispatching(&self) -> bool {
        self.is_dispatching.get()
    }

    /// Call right after the controller's `on_controller_start`.
    pub fn dispatch_start(&self) {
        self.dispatch(Event::Start);
    }

    /// Call right after the controller's `on_controller_resume`.
    pub fn dispatch_resume(&self) {
        self.dispatch(Event::Resume);
    }

    /// Call right after the controller's `on_controller_focus`.
    pub fn dispatch_focus(&self) {
        self.dispatch(Event::Focus);
    }

    /// Call immediately before the controller's `on_controller_blur`.
    pub fn dispatch_blur(&self) {
        self.dispatch(Event::Blur);
    }

    /// Call immediately before the controller's `on_controller_pause`.
    pub fn dispatch_pause(&self) {
        self.dispatch(Event::Pause);
    }

    /// Call immediately before the controller's `on_controller_persist_user_data`.
    pub fn dispatch_persist_user_data(&self) {
        self.dispatch(Event::PersistUserData);
    }

    /// Call immediately before the controller's `on_controller_stop`.
    pub fn dispatch_stop(&self) {
        self.dispatch(Event::Stop);
    }

    fn dispatch(&self, event: Event) {
        self.exclusive(|| {
            // Staged requests cannot touch `observers` while we are dispatching, but the
            // snapshot keeps the RefCell free for `contains` checks made by callbacks.
            let snapshot: Vec<ObserverRef> = self.observers.borrow().clone();
            tracing::trace!(?event, observers = snapshot.len(), "registry dispatch");

            for observer in &snapshot {
                event.deliver(&mut *observer.borrow_mut());
            }
        });
    }

    /// Run `work` with add/remove requests staged, then drain them.
    ///
    /// Only the outermost call drains.
    fn exclusive(&self, work: impl FnOnce()) {
        let guard = DispatchGuard::enter(&self.is_dispatching);

        work();

        if !guard.previous {
            self.execute_pending_actions();
        }
    }

    fn execute_pending_actions(&self) {
        loop {
            let removal = self.pending_remove.borrow_mut().pop_front();
            if let Some(observer) = removal {
                self.perform_remove(&observer);
                continue;
            }

            let addition = self.pending_add.borrow_mut().pop_front();
            if let Some(observer) = addition {
                self.perform_add(observer);
                continue;
            }

            break;
        }
    }

    fn perform_add(&self, observer: ObserverRef) {
        self.observers.borrow_mut().push(Rc::clone(&observer));
        tracing::trace!("registry add observer");

        let mut observer = observer.borrow_mut();
        if self.is_controller_state_at_least(ControllerState::Started) {
            observer.on_controller_start();
        }
        if self.is_controller_state_at_least(ControllerState::Resumed) {
            observer.on_controller_resume();
        }
        if self.is_controller_state_at_least(ControllerState::Focused) {
            observer.on_controller_focus();
        }
    }

    fn perform_remove(&self, observer: &ObserverRef) {
        tracing::trace!("registry remove observer");
        {
            let mut target = observer.borrow_mut();
            if self.is_controller_state_at_least(ControllerState::Focused) {
                target.on_controller_blur();
            }
            if self.is_controller_state_at_least(ControllerState::Resumed) {
                target.on_controller_pause();
            }
            if self.is_controller_state_at_least(ControllerState::Started) {
                target.on_controller_stop();
            }
        }

        self.observers
            .borrow_mut()
            .retain(|existing| !same_observer(existing, observer));
    }
}

fn take_from(queue: &RefCell<VecDeque<ObserverRef>>, observer: &ObserverRef) -> bool {
    let mut queue = queue.borrow_mut();
    match queue.iter().position(|queued| same_observer(queued, observer)) {
        Some(index) => {
            queue.remove(index);
            true
        }
        None => false,
    }
}

fn contains(list: &[ObserverRef], observer: &ObserverRef) -> bool {
    list.iter().any(|existing| same_observer(existing, observer))
}

impl LifecycleTracker for LifecycleRegistry {
    fn is_controller_state_at_least(&self, state: ControllerState) -> bool {
        self.tracker.is_controller_state_at_least(state)
    }
}

impl ControllerLifecycle for LifecycleRegistry {
    fn add_controller_lifecycle_observer(&self, observer: ObserverRef) {
        if take_from(&self.pending_remove, &observer) {
            return;
        }

        if contains(&self.observers.borrow(), &observer)
            || self
                .pending_add
                .borrow()
                .iter()
                .any(|queued| same_observer(queued, &observer))
        {
            return;
        }

        if self.is_dispatching.get() {
            self.pending_add.borrow_mut().push_back(observer);
        } else {
            self.exclusive(|| self.perform_add(observer));
        }
    }

    fn remove_controller_lifecycle_observer(&self, observer: &ObserverRef) {
        if take_from(&self.pending_add, observer) {
            return;
        }

        if !contains(&self.observers.borrow(), observer) {
            return;
        }

        let already_pending = self
            .pending_remove
            .borrow()
            .iter()
            .any(|queued| same_observer(queued, observer));
        if already_pending {
            return;
        }

        if self.is_dispatching.get() {
            self.pending_remove.borrow_mut().push_back(Rc::clone(observer));
        } else {
            self.exclusive(|| self.perform_remove(observer));
        }
    }
}

impl fmt::Debug for LifecycleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleRegistry")
            .field("observers", &self.observers.borrow().len())
            .field("pending_add", &self.pending_add.borrow().len())
            .field("pending_remove", &self.pending_remove.borrow().len())
            .field("is_dispatching", &self.is_dispatching.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Weak;

    type Log = Rc<RefCell<Vec<String>>>;

    struct FixedTracker {
        level: Cell<Option<ControllerState>>,
    }

    impl LifecycleTracker for FixedTracker {
        fn is_controller_state_at_least(&self, state: ControllerState) -> bool {
            self.level.get().is_some_and(|level| level >= state)
        }
    }

    #[derive(Default)]
    struct Recorder {
        name: &'static str,
        log: Log,
        on_start: Option<Box<dyn FnMut()>>,
        on_resume: Option<Box<dyn FnMut()>>,
    }

    impl Recorder {
        fn push(&self, what: &str) {
            self.log.borrow_mut().push(format!("{}.{}", self.name, what));
        }
    }

    impl LifecycleObserver for Recorder {
        fn on_controller_start(&mut self) {
            self.push("start");
            if let Some(hook) = self.on_start.as_mut() {
                hook();
            }
        }
        fn on_controller_resume(&mut self) {
            self.push("resume");
            if let Some(hook) = self.on_resume.as_mut() {
                hook();
            }
        }
        fn on_controller_focus(&mut self) {
            self.push("focus");
        }
        fn on_controller_blur(&mut self) {
            self.push("blur");
        }
        fn on_controller_pause(&mut self) {
            self.push("pause");
        }
        fn on_controller_persist_user_data(&mut self) {
            self.push("persist");
        }
        fn on_controller_stop(&mut self) {
            self.push("stop");
        }
    }

    fn setup(level: Option<ControllerState>) -> (Rc<FixedTracker>, Rc<LifecycleRegistry>, Log) {
        let tracker = Rc::new(FixedTracker {
            level: Cell::new(level),
        });
        let registry = Rc::new(LifecycleRegistry::new(tracker.clone()));
        (tracker, registry, Log::default())
    }

    fn recorder(name: &'static str, log: &Log) -> Rc<RefCell<Recorder>> {
        Rc::new(RefCell::new(Recorder {
            name,
            log: Rc::clone(log),
            ..Recorder::default()
        }))
    }

    fn taken(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn state_query_delegates_to_tracker() {
        let (_tracker, registry, _log) = setup(Some(ControllerState::Resumed));

        assert!(registry.is_controller_state_at_least(ControllerState::Started));
        assert!(registry.is_controller_state_at_least(ControllerState::Resumed));
        assert!(!registry.is_controller_state_at_least(ControllerState::Focused));
    }

    #[test]
    fn add_catches_up_to_current_state() {
        let cases: [(Option<ControllerState>, &[&str]); 4] = [
            (None, &[]),
            (Some(ControllerState::Started), &["a.start"]),
            (Some(ControllerState::Resumed), &["a.start", "a.resume"]),
            (
                Some(ControllerState::Focused),
                &["a.start", "a.resume", "a.focus"],
            ),
        ];

        for (level, expected) in cases {
            let (_tracker, registry, log) = setup(level);
            let observer: ObserverRef = recorder("a", &log);
            registry.add_controller_lifecycle_observer(observer);
            assert_eq!(taken(&log), expected, "level {level:?}");
            assert_eq!(registry.observer_count(), 1);
        }
    }

    #[test]
    fn remove_unwinds_in_reverse_order() {
        let cases: [(Option<ControllerState>, &[&str]); 4] = [
            (None, &[]),
            (Some(ControllerState::Started), &["a.stop"]),
            (Some(ControllerState::Resumed), &["a.pause", "a.stop"]),
            (
                Some(ControllerState::Focused),
                &["a.blur", "a.pause", "a.stop"],
            ),
        ];

        for (level, expected) in cases {
            let (tracker, registry, log) = setup(None);
            let observer: ObserverRef = recorder("a", &log);
            registry.add_controller_lifecycle_observer(observer.clone());

            tracker.level.set(level);
            registry.remove_controller_lifecycle_observer(&observer);
            assert_eq!(taken(&log), expected, "level {level:?}");
            assert_eq!(registry.observer_count(), 0);
        }
    }

    #[test]
    fn duplicate_add_and_unknown_remove_are_ignored() {
        let (tracker, registry, log) = setup(None);
        let observer: ObserverRef = recorder("a", &log);
        registry.add_controller_lifecycle_observer(observer.clone());

        tracker.level.set(Some(ControllerState::Focused));
        registry.add_controller_lifecycle_observer(observer.clone());
        assert!(taken(&log).is_empty());
        assert_eq!(registry.observer_count(), 1);

        let stranger: ObserverRef = recorder("b", &log);
        registry.remove_controller_lifecycle_observer(&stranger);
        assert!(taken(&log).is_empty());
    }

    #[test]
    fn dispatch_reaches_observers_in_insertion_order() {
        let (_tracker, registry, log) = setup(None);
        registry.add_controller_lifecycle_observer(recorder("a", &log));
        registry.add_controller_lifecycle_observer(recorder("b", &log));

        registry.dispatch_start();
        registry.dispatch_resume();
        registry.dispatch_focus();
        registry.dispatch_blur();
        registry.dispatch_pause();
        registry.dispatch_persist_user_data();
        registry.dispatch_stop();

        assert_eq!(
            taken(&log),
            [
                "a.start", "b.start", "a.resume", "b.resume", "a.focus", "b.focus", "a.blur",
                "b.blur", "a.pause", "b.pause", "a.persist", "b.persist", "a.stop", "b.stop",
            ]
        );
        assert!(!registry.is_dispatching());
    }

    #[test]
    fn observer_added_during_dispatch_is_caught_up_after_it() {
        let (tracker, registry, log) = setup(None);
        let first = recorder("a", &log);
        let late: ObserverRef = recorder("b", &log);

        let weak: Weak<LifecycleRegistry> = Rc::downgrade(&registry);
        let late_for_hook = late.clone();
        first.borrow_mut().on_start = Some(Box::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.add_controller_lifecycle_observer(late_for_hook.clone());
                assert_eq!(registry.observer_count(), 1);
            }
        }));
        registry.add_controller_lifecycle_observer(first);

        tracker.level.set(Some(ControllerState::Started));
        registry.dispatch_start();

        assert_eq!(taken(&log), ["a.start", "b.start"]);
        assert_eq!(registry.observer_count(), 2);
    }

    #[test]
    fn observer_removed_during_dispatch_still_sees_current_event() {
        let (tracker, registry, log) = setup(Some(ControllerState::Started));
        let first = recorder("a", &log);
        let second: ObserverRef = recorder("b", &log);
        registry.add_controller_lifecycle_observer(second.clone());

        let weak = Rc::downgrade(&registry);
        let victim = second.clone();
        first.borrow_mut().on_resume = Some(Box::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.remove_controller_lifecycle_observer(&victim);
            }
        }));
        // Added after `b`, so it runs second in the dispatch order.
        let first: ObserverRef = first;
        registry.add_controller_lifecycle_observer(first);
        taken(&log);

        tracker.level.set(Some(ControllerState::Resumed));
        registry.dispatch_resume();

        assert_eq!(taken(&log), ["b.resume", "a.resume", "b.pause", "b.stop"]);
        assert_eq!(registry.observer_count(), 1);
    }

    #[test]
    fn staged_add_then_remove_cancels_out() {
        let (_tracker, registry, log) = setup(Some(ControllerState::Started));
        let host = recorder("a", &log);
        let transient: ObserverRef = recorder("b", &log);

        let weak = Rc::downgrade(&registry);
        host.borrow_mut().on_start = Some(Box::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.add_controller_lifecycle_observer(transient.clone());
                registry.remove_controller_lifecycle_observer(&transient);
            }
        }));
        registry.add_controller_lifecycle_observer(host);
        taken(&log);

        registry.dispatch_start();

        assert_eq!(taken(&log), ["a.start"]);
        assert_eq!(registry.observer_count(), 1);
    }

    #[test]
    fn staged_remove_then_add_cancels_out() {
        let (_tracker, registry, log) = setup(Some(ControllerState::Started));
        let host = recorder("a", &log);
        let stable: ObserverRef = recorder("b", &log);
        registry.add_controller_lifecycle_observer(stable.clone());

        let weak = Rc::downgrade(&registry);
        let target = stable.clone();
        host.borrow_mut().on_start = Some(Box::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.remove_controller_lifecycle_observer(&target);
                registry.add_controller_lifecycle_observer(target.clone());
            }
        }));
        let host: ObserverRef = host;
        registry.add_controller_lifecycle_observer(host);
        taken(&log);

        registry.dispatch_start();

        assert_eq!(taken(&log), ["b.start", "a.start"]);
        assert_eq!(registry.observer_count(), 2);
    }

    #[test]
    fn dispatch_flag_is_released_when_an_observer_panics() {
        struct Exploding;
        impl LifecycleObserver for Exploding {
            fn on_controller_pause(&mut self) {
                panic!("observer failure");
            }
        }

        let (_tracker, registry, _log) = setup(None);
        registry.add_controller_lifecycle_observer(Rc::new(RefCell::new(Exploding)));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            registry.dispatch_pause();
        }));

        assert!(result.is_err());
        assert!(!registry.is_dispatching());
    }
}
