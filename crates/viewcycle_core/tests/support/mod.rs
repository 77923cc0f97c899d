#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use viewcycle_core::lifecycle::{
    ContentView, ControllerLifecycle, FinishHandle, LayoutId, LifecycleObserver,
    LifecycleRegistry, ObserverRef, ViewController, ViewId, WindowFocusListener,
};

pub type Log = Rc<RefCell<Vec<String>>>;

/// Route delegate transition logs to the test output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

pub fn new_log() -> Log {
    Log::default()
}

/// Drain and return everything recorded so far.
pub fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

#[derive(Default)]
struct ViewInner {
    layout: u32,
    children: Vec<u32>,
    listeners: RefCell<Vec<WindowFocusListener>>,
    listeners_added: Cell<usize>,
    listeners_removed: Cell<usize>,
    removed_foreign: Cell<usize>,
}

/// In-memory content element: a layout id plus a flat list of child ids.
#[derive(Clone)]
pub struct FakeView {
    id: Option<u32>,
    inner: Rc<ViewInner>,
}

impl FakeView {
    pub fn new(layout: LayoutId, children: &[u32]) -> Self {
        Self {
            id: None,
            inner: Rc::new(ViewInner {
                layout: layout.0,
                children: children.to_vec(),
                ..ViewInner::default()
            }),
        }
    }

    pub fn layout(&self) -> LayoutId {
        LayoutId(self.inner.layout)
    }

    pub fn id(&self) -> Option<u32> {
        self.id
    }

    pub fn same_tree(&self, other: &FakeView) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn listeners_added(&self) -> usize {
        self.inner.listeners_added.get()
    }

    pub fn listeners_removed(&self) -> usize {
        self.inner.listeners_removed.get()
    }

    /// Removals of listeners this element never had.
    pub fn foreign_removals(&self) -> usize {
        self.inner.removed_foreign.get()
    }

    pub fn listeners(&self) -> Vec<WindowFocusListener> {
        self.inner.listeners.borrow().clone()
    }

    /// Simulate the host reporting a window focus change for this element.
    pub fn fire_window_focus(&self, has_focus: bool) {
        for listener in self.listeners() {
            listener.on_window_focus_changed(has_focus);
        }
    }
}

impl ContentView for FakeView {
    fn find_view_by_id(&self, id: ViewId) -> Option<Self> {
        self.inner.children.contains(&id.0).then(|| FakeView {
            id: Some(id.0),
            inner: Rc::clone(&self.inner),
        })
    }

    fn add_window_focus_listener(&self, listener: &WindowFocusListener) {
        self.inner.listeners_added.set(self.inner.listeners_added.get() + 1);
        self.inner.listeners.borrow_mut().push(listener.clone());
    }

    fn remove_window_focus_listener(&self, listener: &WindowFocusListener) {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|existing| !existing.ptr_eq(listener));

        if listeners.len() == before {
            self.inner.removed_foreign.set(self.inner.removed_foreign.get() + 1);
        } else {
            self.inner
                .listeners_removed
                .set(self.inner.listeners_removed.get() + 1);
        }
    }
}

/// Inflater that records every element it creates.
#[derive(Default)]
pub struct FakeInflater {
    pub created: Vec<FakeView>,
    pub children: Vec<u32>,
}

impl FakeInflater {
    pub fn with_children(children: &[u32]) -> Self {
        Self {
            created: Vec::new(),
            children: children.to_vec(),
        }
    }

    pub fn last(&self) -> Option<&FakeView> {
        self.created.last()
    }
}

impl viewcycle_core::lifecycle::Inflater<FakeView> for FakeInflater {
    fn inflate(&mut self, layout: LayoutId, _container: Option<&FakeView>) -> FakeView {
        let view = FakeView::new(layout, &self.children);
        self.created.push(view.clone());
        view
    }
}

/// Controller that appends one entry per callback to a shared log.
pub struct RecordingController {
    pub log: Log,
    pub layout: LayoutId,
    pub finish: FinishHandle,
    /// Request finish from inside the named callback.
    pub finish_on: Option<&'static str>,
}

impl RecordingController {
    pub fn new(log: &Log, layout: LayoutId) -> Self {
        Self {
            log: Rc::clone(log),
            layout,
            finish: FinishHandle::new(),
            finish_on: None,
        }
    }

    pub fn finishing_on(mut self, callback: &'static str, finish: &FinishHandle) -> Self {
        self.finish_on = Some(callback);
        self.finish = finish.clone();
        self
    }

    fn record(&mut self, what: &'static str) {
        self.log.borrow_mut().push(what.to_string());
        if self.finish_on == Some(what) {
            self.finish.request();
        }
    }
}

impl LifecycleObserver for RecordingController {
    fn on_controller_start(&mut self) {
        self.record("start");
    }
    fn on_controller_resume(&mut self) {
        self.record("resume");
    }
    fn on_controller_focus(&mut self) {
        self.record("focus");
    }
    fn on_controller_blur(&mut self) {
        self.record("blur");
    }
    fn on_controller_pause(&mut self) {
        self.record("pause");
    }
    fn on_controller_persist_user_data(&mut self) {
        self.record("persist");
    }
    fn on_controller_stop(&mut self) {
        self.record("stop");
    }
}

impl ViewController for RecordingController {
    type Extras = String;
    type SavedState = Vec<String>;
    type View = FakeView;

    fn on_controller_create(&mut self, extras: Option<&String>) {
        self.record("create");
        if let Some(extras) = extras {
            self.log.borrow_mut().push(format!("extras={extras}"));
        }
    }

    fn on_controller_restore_instance_state(&mut self, saved: &Vec<String>) {
        self.record("restore");
        self.log
            .borrow_mut()
            .push(format!("restored={}", saved.join(",")));
    }

    fn on_controller_get_content_layout_id(&mut self) -> LayoutId {
        self.record("content_layout");
        self.layout
    }

    fn on_controller_content_view_created(&mut self, _view: &FakeView) {
        self.record("content_ready");
    }

    fn on_controller_save_instance_state(&mut self, out: &mut Vec<String>) {
        self.record("save");
        out.push("controller".to_string());
    }
}

/// Secondary observer that logs `<name>.<callback>` and can run a hook after one callback.
pub struct ObserverRecorder {
    pub name: &'static str,
    pub log: Log,
    hook_on: Option<&'static str>,
    hook: Option<Box<dyn FnMut()>>,
}

impl ObserverRecorder {
    pub fn shared(name: &'static str, log: &Log) -> Rc<RefCell<ObserverRecorder>> {
        Rc::new(RefCell::new(ObserverRecorder {
            name,
            log: Rc::clone(log),
            hook_on: None,
            hook: None,
        }))
    }

    pub fn hook(&mut self, callback: &'static str, hook: impl FnMut() + 'static) {
        self.hook_on = Some(callback);
        self.hook = Some(Box::new(hook));
    }

    fn record(&mut self, what: &'static str) {
        self.log.borrow_mut().push(format!("{}.{}", self.name, what));
        if self.hook_on == Some(what) {
            if let Some(hook) = self.hook.as_mut() {
                hook();
            }
        }
    }
}

impl LifecycleObserver for ObserverRecorder {
    fn on_controller_start(&mut self) {
        self.record("start");
    }
    fn on_controller_resume(&mut self) {
        self.record("resume");
    }
    fn on_controller_focus(&mut self) {
        self.record("focus");
    }
    fn on_controller_blur(&mut self) {
        self.record("blur");
    }
    fn on_controller_pause(&mut self) {
        self.record("pause");
    }
    fn on_controller_persist_user_data(&mut self) {
        self.record("persist");
    }
    fn on_controller_stop(&mut self) {
        self.record("stop");
    }
}

/// Make `observer` unsubscribe itself from `lifecycle` inside `callback`.
pub fn leave_on(
    observer: &Rc<RefCell<ObserverRecorder>>,
    lifecycle: Rc<LifecycleRegistry>,
    callback: &'static str,
) {
    let me = Rc::downgrade(observer);
    observer.borrow_mut().hook(callback, move || {
        if let Some(me) = me.upgrade() {
            let me: ObserverRef = me;
            lifecycle.remove_controller_lifecycle_observer(&me);
        }
    });
}

/// Make `observer` subscribe `newcomer` to `lifecycle` inside `callback`.
pub fn join_on(
    observer: &Rc<RefCell<ObserverRecorder>>,
    lifecycle: Rc<LifecycleRegistry>,
    callback: &'static str,
    newcomer: ObserverRef,
) {
    observer.borrow_mut().hook(callback, move || {
        lifecycle.add_controller_lifecycle_observer(Rc::clone(&newcomer));
    });
}
