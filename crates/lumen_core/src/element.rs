//! Element host and widget lifecycle
//!
//! An [`Element`] is one live instance of a custom tag. It owns the widget,
//! the attribute map the widget renders from, and the listener registry,
//! and it implements the lifecycle every widget shares:
//!
//! 1. **Attach**: [`Element::attach`] / [`Element::connect`] wait on the
//!    [`ReadinessGate`], then call [`Widget::initialize`] exactly once.
//!    Duplicate attach notifications are no-ops.
//! 2. **Mutate**: attribute changes before initialization are absorbed into
//!    the first render. After initialization an observed change reaches
//!    [`Widget::attribute_changed`] as a typed [`AttributeChange`] and the
//!    element re-renders.
//! 3. **Render**: the widget's whole markup is recomputed and replaced, then
//!    the enhancer reprocesses it (one retry, then a warning).
//! 4. **Detach**: [`Widget::teardown`] runs and every interval the widget
//!    spawned is cancelled. Attaching an initialized element again runs
//!    [`Widget::reconnected`] instead of `initialize`.
//!
//! Widget hooks run with the element locked. Events they emit are queued and
//! delivered after the lock is released, so listeners may drive the element
//! again from inside a callback.
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::prelude::*;
//!
//! struct Hello;
//!
//! impl Widget for Hello {
//!     const TAG: &'static str = "lumen-hello";
//!     type Attr = NameAttr;
//!
//!     fn initialize(&mut self, cx: &mut WidgetContext<'_, Self>) {
//!         cx.request_render();
//!     }
//!
//!     fn render(&self, attrs: &AttributeMap) -> Option<String> {
//!         Some(format!("Hello, {}", attrs.string_or("name", "world")))
//!     }
//! }
//!
//! let element = Element::builder(Hello).attribute("name", "Ada").build();
//! element.attach().await;
//! assert_eq!(element.markup(), "Hello, Ada");
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde_json::Value;
use smallvec::SmallVec;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::attributes::{AttributeChange, AttributeKey, AttributeMap};
use crate::config::LumenConfig;
use crate::enhance::{enhance_with_retry, Enhancer, NoopEnhancer};
use crate::events::{deliver, EventDispatcher, ListenerId, WidgetEvent};
use crate::readiness::{Readiness, ReadinessGate};

/// Hooks a concrete widget implements
pub trait Widget: Sized + Send + 'static {
    /// Custom element tag name
    const TAG: &'static str;

    /// Attributes this widget observes
    type Attr: AttributeKey;

    /// Compute initial state and request the first render
    ///
    /// Called once, after the readiness gate opens.
    fn initialize(&mut self, cx: &mut WidgetContext<'_, Self>) {
        let _ = cx;
        tracing::warn!(
            "<{}> does not override initialize(); the widget stays inert",
            Self::TAG
        );
    }

    /// Full markup for the current state, or `None` if the widget has no view
    fn render(&self, attrs: &AttributeMap) -> Option<String> {
        let _ = attrs;
        None
    }

    /// React to an observed attribute change; a re-render always follows
    fn attribute_changed(
        &mut self,
        change: &AttributeChange<Self::Attr>,
        cx: &mut WidgetContext<'_, Self>,
    ) {
        let _ = (change, cx);
    }

    /// Restore live resources when an initialized element is attached again
    fn reconnected(&mut self, cx: &mut WidgetContext<'_, Self>) {
        let _ = cx;
    }

    /// Release live resources when the element is removed
    fn teardown(&mut self, cx: &mut WidgetContext<'_, Self>) {
        let _ = cx;
    }
}

// ============================================================================
// Periodic tasks
// ============================================================================

#[derive(Clone)]
struct TaskSlot {
    cancelled: Arc<AtomicBool>,
    abort: AbortHandle,
}

impl TaskSlot {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.abort.abort();
    }

    fn is_live(&self) -> bool {
        !self.cancelled.load(Ordering::Acquire) && !self.abort.is_finished()
    }
}

/// Owner of one periodic callback; cancels it when dropped
#[derive(Default)]
pub struct TickHandle {
    slot: Option<TaskSlot>,
}

impl TickHandle {
    /// A handle that owns nothing
    pub fn inert() -> Self {
        Self::default()
    }

    /// Stop the callback; no tick runs after this returns
    pub fn cancel(&mut self) {
        if let Some(slot) = self.slot.take() {
            slot.cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.slot.as_ref().is_some_and(TaskSlot::is_live)
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickHandle")
            .field("active", &self.is_active())
            .finish()
    }
}

// ============================================================================
// Widget context
// ============================================================================

/// Capabilities handed to widget hooks
pub struct WidgetContext<'a, W: Widget> {
    element: &'a Weak<ElementInner<W>>,
    attributes: &'a AttributeMap,
    events: Vec<(String, Value)>,
    render_requested: bool,
    tasks: Vec<TaskSlot>,
}

impl<'a, W: Widget> WidgetContext<'a, W> {
    pub fn tag(&self) -> &'static str {
        W::TAG
    }

    pub fn attributes(&self) -> &AttributeMap {
        self.attributes
    }

    /// Queue an event; it is delivered once the hook returns
    pub fn dispatch(&mut self, name: impl Into<String>, detail: Value) {
        self.events.push((name.into(), detail));
    }

    /// Re-render once the hook returns
    pub fn request_render(&mut self) {
        self.render_requested = true;
    }

    /// Run `on_tick` every `period`, first after one full period
    ///
    /// Each tick runs with the element locked, like any other hook. The
    /// callback stops when the returned handle is cancelled or dropped, or
    /// when the element is detached.
    pub fn spawn_interval<F>(&mut self, period: Duration, mut on_tick: F) -> TickHandle
    where
        F: FnMut(&mut W, &mut WidgetContext<'_, W>) + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("<{}> cannot schedule ticks outside a runtime", W::TAG);
            return TickHandle::inert();
        };

        let period = period.max(Duration::from_millis(1));
        let element = self.element.clone();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(inner) = element.upgrade() else {
                    break;
                };
                let host = Element { inner };
                if !host.run_tick(&flag, &mut on_tick) {
                    break;
                }
            }
        });

        let slot = TaskSlot {
            cancelled,
            abort: task.abort_handle(),
        };
        self.tasks.push(slot.clone());
        TickHandle { slot: Some(slot) }
    }
}

// ============================================================================
// Element
// ============================================================================

struct ElementState<W> {
    widget: W,
    attributes: AttributeMap,
    initialized: bool,
    connected: bool,
    attach_pending: bool,
    attach_task: Option<AbortHandle>,
    enhanced: bool,
    rendering: bool,
    rerender: bool,
    markup: String,
    render_count: u64,
    tasks: Vec<TaskSlot>,
}

struct ElementInner<W: Widget> {
    this: Weak<ElementInner<W>>,
    state: Mutex<ElementState<W>>,
    listeners: Mutex<EventDispatcher>,
    gate: ReadinessGate,
    enhancer: Arc<dyn Enhancer>,
    retry_delay: Duration,
}

/// Work left over after a hook, performed without the element lock
struct HookOutput {
    events: Vec<(String, Value)>,
    rendered: Option<String>,
    enhance: bool,
}

/// Clears the pending flag if an attach future is dropped mid-wait
struct PendingAttach<'a, W: Widget> {
    element: &'a Element<W>,
    armed: bool,
}

impl<W: Widget> Drop for PendingAttach<'_, W> {
    fn drop(&mut self) {
        if self.armed {
            self.element.lock().attach_pending = false;
        }
    }
}

/// A live custom-element instance
pub struct Element<W: Widget> {
    inner: Arc<ElementInner<W>>,
}

impl<W: Widget> Clone for Element<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: Widget> Element<W> {
    /// Element with no attributes, an open gate and no enhancer
    pub fn new(widget: W) -> Self {
        Self::builder(widget).build()
    }

    pub fn builder(widget: W) -> ElementBuilder<W> {
        ElementBuilder::new(widget)
    }

    pub fn tag(&self) -> &'static str {
        W::TAG
    }

    fn lock(&self) -> MutexGuard<'_, ElementState<W>> {
        self.inner.state.lock().unwrap()
    }

    // ------------------------------------------------------------------------
    // Attach / detach
    // ------------------------------------------------------------------------

    /// Insert into the host document and wait for initialization
    ///
    /// Returns immediately if the element is already initialized or another
    /// attach is already waiting on the gate.
    pub async fn attach(&self) {
        if !self.begin_attach() {
            return;
        }
        let mut pending = PendingAttach {
            element: self,
            armed: true,
        };
        let readiness = self.inner.gate.wait().await;
        pending.armed = false;
        self.initialize(readiness);
    }

    /// Synchronous connected callback
    ///
    /// Initializes immediately if the gate is already open, otherwise spawns
    /// the wait on the current runtime. Returns whether an attach began.
    pub fn connect(&self) -> bool {
        if !self.begin_attach() {
            return false;
        }
        if let Some(readiness) = self.inner.gate.try_get() {
            self.initialize(readiness);
            return true;
        }

        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("<{}> connected outside a runtime; not initialized", W::TAG);
            self.lock().attach_pending = false;
            return false;
        };

        let element = self.clone();
        let task = runtime.spawn(async move {
            let readiness = element.inner.gate.wait().await;
            element.initialize(readiness);
        });
        let mut state = self.lock();
        if state.attach_pending {
            state.attach_task = Some(task.abort_handle());
        }
        true
    }

    fn begin_attach(&self) -> bool {
        let mut state = self.lock();
        let was_connected = std::mem::replace(&mut state.connected, true);
        if state.initialized && !was_connected {
            tracing::debug!("<{}> reconnected", W::TAG);
            let (out, ()) = self.run_hook(state, false, |widget, cx| widget.reconnected(cx));
            self.finish(out);
            return false;
        }
        if state.initialized || state.attach_pending {
            tracing::trace!("<{}> duplicate attach ignored", W::TAG);
            return false;
        }
        state.attach_pending = true;
        true
    }

    fn initialize(&self, readiness: Readiness) {
        let mut state = self.lock();
        state.attach_pending = false;
        state.attach_task = None;
        if state.initialized || !state.connected {
            return;
        }
        state.initialized = true;
        state.enhanced = readiness.is_enhanced();
        tracing::debug!("<{}> initializing ({:?})", W::TAG, readiness);

        let (out, ()) = self.run_hook(state, false, |widget, cx| widget.initialize(cx));
        self.finish(out);
    }

    /// Remove from the host document
    ///
    /// Runs the teardown hook, cancels a pending attach and every interval
    /// the widget spawned. The element keeps its state; attaching again runs
    /// the reconnected hook instead of initialization.
    pub fn detach(&self) {
        let mut state = self.lock();
        state.connected = false;
        state.attach_pending = false;
        if let Some(task) = state.attach_task.take() {
            task.abort();
        }

        let out = if state.initialized {
            let (out, ()) = self.run_hook(state, false, |widget, cx| widget.teardown(cx));
            Some(out)
        } else {
            drop(state);
            None
        };

        let mut state = self.lock();
        let cancelled = state.tasks.len();
        for slot in state.tasks.drain(..) {
            slot.cancel();
        }
        drop(state);
        tracing::debug!("<{}> detached, {} task(s) cancelled", W::TAG, cancelled);

        if let Some(out) = out {
            self.finish(out);
        }
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        self.mutate_attribute(name, Some(value.into()));
    }

    pub fn remove_attribute(&self, name: &str) {
        self.mutate_attribute(name, None);
    }

    /// Set or remove a boolean attribute
    pub fn toggle_attribute(&self, name: &str, present: bool) {
        if present {
            self.set_attribute(name, "");
        } else {
            self.remove_attribute(name);
        }
    }

    fn mutate_attribute(&self, name: &str, new: Option<String>) {
        let mut state = self.lock();
        let old = match &new {
            Some(value) => state.attributes.set(name, value.clone()),
            None => state.attributes.remove(name),
        };
        if old == new {
            return;
        }
        if !state.initialized {
            tracing::trace!("<{}> {} absorbed before initialization", W::TAG, name);
            return;
        }
        let Some(key) = W::Attr::from_name(name) else {
            return;
        };

        let change = AttributeChange { key, old, new };
        let (out, ()) = self.run_hook(state, true, |widget, cx| {
            widget.attribute_changed(&change, cx)
        });
        self.finish(out);
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.lock().attributes.get(name).map(str::to_string)
    }

    pub fn attributes(&self) -> AttributeMap {
        self.lock().attributes.clone()
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Re-render from current state; no-op before initialization
    ///
    /// Returns whether a render was produced. A refresh arriving while a
    /// render is in flight is coalesced into one follow-up render.
    pub fn refresh(&self) -> bool {
        let mut state = self.lock();
        if !state.initialized {
            return false;
        }
        let rendered = Self::render_locked(&mut state);
        let enhance = state.enhanced;
        drop(state);

        let produced = rendered.is_some();
        self.finish(HookOutput {
            events: Vec::new(),
            rendered,
            enhance,
        });
        produced
    }

    /// Run widget code with a hook context
    ///
    /// This is how element-level widget methods (start a timer, toggle a
    /// swap, ...) are exposed. Returns `None` before initialization.
    pub fn update<R>(
        &self,
        f: impl FnOnce(&mut W, &mut WidgetContext<'_, W>) -> R,
    ) -> Option<R> {
        let state = self.lock();
        if !state.initialized {
            return None;
        }
        let (out, result) = self.run_hook(state, false, f);
        self.finish(out);
        Some(result)
    }

    fn run_tick<F>(&self, cancelled: &AtomicBool, on_tick: &mut F) -> bool
    where
        F: FnMut(&mut W, &mut WidgetContext<'_, W>),
    {
        let state = self.lock();
        if cancelled.load(Ordering::Acquire) || !state.initialized || !state.connected {
            return false;
        }
        let (out, ()) = self.run_hook(state, false, |widget, cx| on_tick(widget, cx));
        self.finish(out);
        true
    }

    fn run_hook<R>(
        &self,
        mut guard: MutexGuard<'_, ElementState<W>>,
        force_render: bool,
        hook: impl FnOnce(&mut W, &mut WidgetContext<'_, W>) -> R,
    ) -> (HookOutput, R) {
        let state = &mut *guard;
        let mut cx = WidgetContext {
            element: &self.inner.this,
            attributes: &state.attributes,
            events: Vec::new(),
            render_requested: force_render,
            tasks: Vec::new(),
        };
        let result = hook(&mut state.widget, &mut cx);
        let WidgetContext {
            events,
            render_requested,
            tasks,
            ..
        } = cx;

        state.tasks.retain(TaskSlot::is_live);
        state.tasks.extend(tasks);

        let rendered = if render_requested {
            Self::render_locked(state)
        } else {
            None
        };
        let enhance = state.enhanced;
        drop(guard);

        (
            HookOutput {
                events,
                rendered,
                enhance,
            },
            result,
        )
    }

    fn render_locked(state: &mut ElementState<W>) -> Option<String> {
        if state.rendering {
            state.rerender = true;
            return None;
        }
        let markup = state.widget.render(&state.attributes)?;
        state.markup.clone_from(&markup);
        state.render_count += 1;
        state.rendering = true;
        Some(markup)
    }

    fn finish(&self, out: HookOutput) {
        let mut rendered = out.rendered;
        while let Some(markup) = rendered.take() {
            if out.enhance {
                enhance_with_retry(&self.inner.enhancer, W::TAG, &markup, self.inner.retry_delay);
            }
            let mut state = self.lock();
            state.rendering = false;
            if std::mem::take(&mut state.rerender) {
                rendered = Self::render_locked(&mut state);
            }
        }

        for (name, detail) in out.events {
            self.dispatch(name, detail);
        }
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Emit a bubbling, cancelable event
    ///
    /// Returns `false` if a listener called `prevent_default`.
    pub fn dispatch(&self, name: impl Into<String>, detail: Value) -> bool {
        let event = WidgetEvent::new(W::TAG, name, detail);
        let listeners = self.inner.listeners.lock().unwrap().listeners_for(&event.name);
        deliver(&event, &listeners)
    }

    pub fn add_event_listener<F>(&self, name: impl Into<String>, callback: F) -> ListenerId
    where
        F: Fn(&WidgetEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.lock().unwrap().add_listener(name, callback)
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.lock().unwrap().remove_listener(id)
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    /// Current rendered markup (empty before the first render)
    pub fn markup(&self) -> String {
        self.lock().markup.clone()
    }

    pub fn render_count(&self) -> u64 {
        self.lock().render_count
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    /// Number of live periodic tasks spawned by the widget
    pub fn active_tasks(&self) -> usize {
        self.lock().tasks.iter().filter(|slot| slot.is_live()).count()
    }

    /// Read-only access to the widget
    pub fn with_widget<R>(&self, f: impl FnOnce(&W) -> R) -> R {
        f(&self.lock().widget)
    }

    pub fn gate(&self) -> &ReadinessGate {
        &self.inner.gate
    }
}

impl<W: Widget> fmt::Debug for Element<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Element")
            .field("tag", &W::TAG)
            .field("initialized", &state.initialized)
            .field("connected", &state.connected)
            .field("attributes", &state.attributes)
            .field("render_count", &state.render_count)
            .finish()
    }
}

/// Builder for [`Element`]
pub struct ElementBuilder<W: Widget> {
    widget: W,
    attributes: AttributeMap,
    gate: Option<ReadinessGate>,
    enhancer: Option<Arc<dyn Enhancer>>,
    retry_delay: Duration,
}

impl<W: Widget> ElementBuilder<W> {
    pub fn new(widget: W) -> Self {
        Self {
            widget,
            attributes: AttributeMap::new(),
            gate: None,
            enhancer: None,
            retry_delay: LumenConfig::default().enhance.retry_delay(),
        }
    }

    /// Initial attribute (present at creation, before attach)
    pub fn attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.set(name, value);
        self
    }

    pub fn attributes(mut self, attributes: AttributeMap) -> Self {
        for (name, value) in attributes.iter() {
            self.attributes.set(name, value);
        }
        self
    }

    /// Readiness gate to wait on (default: already open)
    pub fn gate(mut self, gate: ReadinessGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn enhancer(mut self, enhancer: impl Enhancer) -> Self {
        self.enhancer = Some(Arc::new(enhancer));
        self
    }

    pub fn shared_enhancer(mut self, enhancer: Arc<dyn Enhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Apply host configuration
    pub fn config(mut self, config: &LumenConfig) -> Self {
        self.retry_delay = config.enhance.retry_delay();
        self
    }

    pub fn build(self) -> Element<W> {
        let state = ElementState {
            widget: self.widget,
            attributes: self.attributes,
            initialized: false,
            connected: false,
            attach_pending: false,
            attach_task: None,
            enhanced: false,
            rendering: false,
            rerender: false,
            markup: String::new(),
            render_count: 0,
            tasks: Vec::new(),
        };
        let gate = self.gate.unwrap_or_else(ReadinessGate::resolved);
        let enhancer = self
            .enhancer
            .unwrap_or_else(|| Arc::new(NoopEnhancer) as Arc<dyn Enhancer>);
        let retry_delay = self.retry_delay;

        Element {
            inner: Arc::new_cyclic(|this| ElementInner {
                this: this.clone(),
                state: Mutex::new(state),
                listeners: Mutex::new(EventDispatcher::new()),
                gate,
                enhancer,
                retry_delay,
            }),
        }
    }
}

// ============================================================================
// Type-erased elements
// ============================================================================

/// Boxed future returned by [`AnyElement::attach`]
pub type AttachFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Object-safe view of an element, for registries and demo hosts
pub trait AnyElement: Send + Sync {
    fn tag(&self) -> &'static str;
    fn observed_attributes(&self) -> SmallVec<[&'static str; 16]>;
    fn attach(&self) -> AttachFuture<'_>;
    fn connect(&self) -> bool;
    fn detach(&self);
    fn set_attribute(&self, name: &str, value: &str);
    fn remove_attribute(&self, name: &str);
    fn refresh(&self) -> bool;
    fn markup(&self) -> String;
    fn add_event_listener(
        &self,
        name: &str,
        callback: Box<dyn Fn(&WidgetEvent) + Send + Sync>,
    ) -> ListenerId;
}

impl<W: Widget> AnyElement for Element<W> {
    fn tag(&self) -> &'static str {
        W::TAG
    }

    fn observed_attributes(&self) -> SmallVec<[&'static str; 16]> {
        W::Attr::observed()
    }

    fn attach(&self) -> AttachFuture<'_> {
        Box::pin(Element::attach(self))
    }

    fn connect(&self) -> bool {
        Element::connect(self)
    }

    fn detach(&self) {
        Element::detach(self)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        Element::set_attribute(self, name, value)
    }

    fn remove_attribute(&self, name: &str) {
        Element::remove_attribute(self, name)
    }

    fn refresh(&self) -> bool {
        Element::refresh(self)
    }

    fn markup(&self) -> String {
        Element::markup(self)
    }

    fn add_event_listener(
        &self,
        name: &str,
        callback: Box<dyn Fn(&WidgetEvent) + Send + Sync>,
    ) -> ListenerId {
        Element::add_event_listener(self, name, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnhanceError;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum LabelAttr {
        Text,
        Tone,
    }

    impl AttributeKey for LabelAttr {
        fn all() -> &'static [Self] {
            &[LabelAttr::Text, LabelAttr::Tone]
        }

        fn name(&self) -> &'static str {
            match self {
                LabelAttr::Text => "text",
                LabelAttr::Tone => "tone",
            }
        }
    }

    #[derive(Default)]
    struct Label {
        inits: usize,
        reconnects: usize,
        changes: Vec<LabelAttr>,
        ticks: Arc<AtomicUsize>,
        ticker: Option<TickHandle>,
    }

    impl Widget for Label {
        const TAG: &'static str = "test-label";
        type Attr = LabelAttr;

        fn initialize(&mut self, cx: &mut WidgetContext<'_, Self>) {
            self.inits += 1;
            if cx.attributes().has("ticking") {
                let ticks = self.ticks.clone();
                self.ticker = Some(cx.spawn_interval(Duration::from_secs(1), move |_, cx| {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    cx.request_render();
                }));
            }
            cx.request_render();
        }

        fn render(&self, attrs: &AttributeMap) -> Option<String> {
            Some(format!(
                "<span class=\"label-{}\">{}</span>",
                attrs.string_or("tone", "neutral"),
                attrs.string_or("text", "")
            ))
        }

        fn attribute_changed(
            &mut self,
            change: &AttributeChange<LabelAttr>,
            cx: &mut WidgetContext<'_, Self>,
        ) {
            self.changes.push(change.key);
            cx.dispatch("changed", json!({ "attr": change.key.name() }));
        }

        fn reconnected(&mut self, _cx: &mut WidgetContext<'_, Self>) {
            self.reconnects += 1;
        }
    }

    /// A widget that forgot every override
    struct Inert;

    impl Widget for Inert {
        const TAG: &'static str = "test-inert";
        type Attr = LabelAttr;
    }

    #[tokio::test]
    async fn test_attach_is_idempotent() {
        let element = Element::builder(Label::default())
            .attribute("text", "Hi")
            .build();

        element.attach().await;
        element.attach().await;
        assert!(!element.connect());

        assert_eq!(element.render_count(), 1);
        assert_eq!(element.with_widget(|w| w.inits), 1);
        assert_eq!(element.markup(), "<span class=\"label-neutral\">Hi</span>");
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_attach_subscribes_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let probe_calls = calls.clone();
        let gate = ReadinessGate::new(move || {
            let n = probe_calls.fetch_add(1, Ordering::SeqCst) + 1;
            (n >= 3).then(|| "3.0".to_string())
        });
        let element = Element::builder(Label::default()).gate(gate).build();

        tokio::join!(element.attach(), element.attach());

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(element.with_widget(|w| w.inits), 1);
        assert_eq!(element.render_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_defers_until_gate_opens() {
        let ready = Arc::new(AtomicBool::new(false));
        let probe_ready = ready.clone();
        let gate = ReadinessGate::new(move || {
            probe_ready
                .load(Ordering::SeqCst)
                .then(|| "3.0".to_string())
        });
        let element = Element::builder(Label::default()).gate(gate).build();

        assert!(element.connect());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!element.is_initialized());
        assert_eq!(element.markup(), "");

        ready.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(element.is_initialized());
        assert_eq!(element.render_count(), 1);
    }

    #[tokio::test]
    async fn test_changes_before_init_are_absorbed() {
        let element = Element::new(Label::default());
        element.set_attribute("text", "one");
        element.set_attribute("text", "two");
        element.set_attribute("tone", "info");
        assert_eq!(element.render_count(), 0);

        element.attach().await;
        assert_eq!(element.render_count(), 1);
        assert_eq!(element.markup(), "<span class=\"label-info\">two</span>");
        assert!(element.with_widget(|w| w.changes.is_empty()));
    }

    #[tokio::test]
    async fn test_observed_change_rerenders_and_emits() {
        let element = Element::new(Label::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        element.add_event_listener("changed", move |e| {
            let attr = e.detail["attr"].as_str().unwrap_or_default();
            sink.lock().unwrap().push(attr.to_string());
        });
        element.attach().await;

        element.set_attribute("tone", "warning");
        element.set_attribute("tone", "warning");
        element.set_attribute("unobserved", "x");
        element.remove_attribute("tone");

        assert_eq!(element.render_count(), 3);
        assert_eq!(
            element.with_widget(|w| w.changes.clone()),
            vec![LabelAttr::Tone, LabelAttr::Tone]
        );
        assert_eq!(*seen.lock().unwrap(), vec!["tone", "tone"]);
        assert_eq!(element.attribute("unobserved").as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_listener_may_drive_element() {
        let element = Element::new(Label::default());
        let handle = element.clone();
        element.add_event_listener("changed", move |e| {
            if e.detail["attr"] == "text" {
                handle.set_attribute("tone", "success");
            }
        });
        element.attach().await;

        element.set_attribute("text", "saved");
        assert_eq!(element.markup(), "<span class=\"label-success\">saved</span>");
    }

    #[tokio::test]
    async fn test_missing_override_stays_inert() {
        let element = Element::new(Inert);
        element.attach().await;
        element.set_attribute("text", "ignored");

        assert!(element.is_initialized());
        assert_eq!(element.render_count(), 0);
        assert_eq!(element.markup(), "");
        assert!(!element.refresh());
    }

    #[tokio::test(start_paused = true)]
    async fn test_detach_cancels_intervals() {
        let element = Element::builder(Label::default())
            .attribute("ticking", "")
            .build();
        element.attach().await;
        let ticks = element.with_widget(|w| w.ticks.clone());
        assert_eq!(element.active_tasks(), 1);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        assert_eq!(element.render_count(), 4);

        element.detach();
        assert_eq!(element.active_tasks(), 0);
        assert!(!element.is_connected());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_reattach_runs_reconnected_hook() {
        let element = Element::new(Label::default());
        element.attach().await;
        element.attach().await;
        assert_eq!(element.with_widget(|w| w.reconnects), 0);

        element.detach();
        element.attach().await;
        assert!(element.is_connected());
        assert_eq!(element.with_widget(|w| (w.inits, w.reconnects)), (1, 1));

        assert!(!element.connect());
        assert_eq!(element.with_widget(|w| w.reconnects), 1);
    }

    #[tokio::test]
    async fn test_refresh_during_enhancement_is_coalesced() {
        let slot: Arc<Mutex<Option<Element<Label>>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicUsize::new(0));
        let nested = Arc::new(Mutex::new(Vec::new()));
        let (enhancer_slot, counter, results) = (slot.clone(), calls.clone(), nested.clone());

        let element = Element::builder(Label::default())
            .attribute("text", "live")
            .enhancer(move |_tag: &'static str, _markup: &str| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    let host = enhancer_slot.lock().unwrap().clone();
                    if let Some(host) = host {
                        results.lock().unwrap().push(host.refresh());
                    }
                }
                Ok(())
            })
            .build();
        *slot.lock().unwrap() = Some(element.clone());

        element.attach().await;

        // the nested refresh produced nothing itself but queued one follow-up
        assert_eq!(*nested.lock().unwrap(), vec![false]);
        assert_eq!(element.render_count(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert!(element.refresh());
        assert_eq!(element.render_count(), 3);
        slot.lock().unwrap().take();
    }

    #[tokio::test(start_paused = true)]
    async fn test_enhancement_failure_keeps_render() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let element = Element::builder(Label::default())
            .attribute("text", "hello")
            .enhancer(move |tag: &'static str, _markup: &str| {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(EnhanceError::new(tag, "not yet"))
            })
            .retry_delay(Duration::from_millis(100))
            .build();

        element.attach().await;
        assert_eq!(element.markup(), "<span class=\"label-neutral\">hello</span>");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_gate_skips_enhancement() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let config = crate::config::ReadinessConfig {
            poll_interval_ms: 10,
            timeout_ms: Some(30),
        };
        let element = Element::builder(Label::default())
            .gate(ReadinessGate::with_config(|| None::<String>, &config))
            .enhancer(move |_tag: &'static str, _markup: &str| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build();

        element.attach().await;
        assert_eq!(element.render_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_any_element_view() {
        let element: Box<dyn AnyElement> = Box::new(Element::new(Label::default()));
        assert_eq!(element.tag(), "test-label");
        assert_eq!(element.observed_attributes().as_slice(), &["text", "tone"]);

        element.set_attribute("text", "boxed");
        element.attach().await;
        assert!(element.markup().contains("boxed"));
    }
}
