//! Countdown timer component
//!
//! `<lumen-countdown>` counts down either to an absolute `target` instant or
//! through a relative `duration` in seconds, ticking once per second.
//! A shorter `tick_interval` only refreshes the display more often; time
//! still runs down at one second per second.
//!
//! Detaching stops the tick loop without changing the timer state. When a
//! running or paused countdown is attached again the loop is restarted.
//!
//! # Example
//!
//! ```ignore
//! use lumen_cn::prelude::*;
//!
//! let timer = cn::countdown()
//!     .attribute("duration", "90")
//!     .attribute("format", "minutes,seconds")
//!     .attribute("autostart", "")
//!     .build();
//!
//! timer.add_event_listener("completed", |event| println!("{}", event.detail));
//! timer.attach().await;
//! ```
//!
//! # Events
//!
//! `started`, `paused`, `resumed` and `reset` carry `{ "remaining": n }`;
//! `completed` carries `{ "remaining": 0, "completedAt": "<rfc3339>" }`.

pub mod config;
pub mod display;
pub mod engine;

use std::sync::Arc;
use std::time::Duration;

use lumen_core::prelude::*;
use lumen_core::{Clock, ElementBuilder, LumenConfig, SystemClock};

pub use config::{parse_target, CountdownAttr, CountdownConfig, Unit, UnitLabel};
pub use display::Breakdown;
pub use engine::{Mode, TickOutcome, TimerEngine, TimerEvent, TimerState};

/// Countdown widget state
pub struct Countdown {
    engine: TimerEngine,
    config: CountdownConfig,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    ticker: Option<TickHandle>,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            engine: TimerEngine::new(),
            config: CountdownConfig::default(),
            clock,
            tick_interval: LumenConfig::default().countdown.tick_interval(),
            ticker: None,
        }
    }

    /// Period of the tick loop (one second unless configured)
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn config(&self) -> &CountdownConfig {
        &self.config
    }

    /// Current display as plain text
    pub fn text(&self) -> String {
        display::to_text(&self.config, self.engine.remaining())
    }

    /// Whether a live tick loop exists
    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(TickHandle::is_active)
    }

    fn cancel_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    fn emit(cx: &mut WidgetContext<'_, Self>, event: TimerEvent) {
        tracing::debug!("<{}> {}", Self::TAG, event.name());
        cx.dispatch(event.name(), event.detail());
    }

    fn spawn_ticker(&mut self, cx: &mut WidgetContext<'_, Self>) {
        self.cancel_ticker();
        self.ticker = Some(cx.spawn_interval(self.tick_interval, |countdown, cx| {
            countdown.on_tick(cx)
        }));
    }

    /// Start ticking, replacing any existing tick loop
    pub fn start(&mut self, cx: &mut WidgetContext<'_, Self>) {
        let event = self.engine.start(&self.config, self.clock.now());
        self.spawn_ticker(cx);
        cx.request_render();
        Self::emit(cx, event);
    }

    pub fn pause(&mut self, cx: &mut WidgetContext<'_, Self>) {
        let event = self.engine.pause();
        Self::emit(cx, event);
    }

    pub fn resume(&mut self, cx: &mut WidgetContext<'_, Self>) {
        let event = self.engine.resume();
        Self::emit(cx, event);
    }

    /// Stop and recalculate; restarts when `autostart` is set
    pub fn reset(&mut self, cx: &mut WidgetContext<'_, Self>) {
        self.cancel_ticker();
        let event = self.engine.reset(&self.config, self.clock.now());
        cx.request_render();
        Self::emit(cx, event);
        if self.config.autostart {
            self.start(cx);
        }
    }

    /// End the current run
    pub fn complete(&mut self, cx: &mut WidgetContext<'_, Self>) {
        self.cancel_ticker();
        let event = self.engine.complete(self.clock.now());
        cx.request_render();
        Self::emit(cx, event);
    }

    fn on_tick(&mut self, cx: &mut WidgetContext<'_, Self>) {
        match self.engine.advance(self.clock.now(), self.tick_interval) {
            TickOutcome::Inactive | TickOutcome::Suppressed => {}
            TickOutcome::Advanced { .. } => cx.request_render(),
            TickOutcome::Expired => self.complete(cx),
        }
    }
}

impl Widget for Countdown {
    const TAG: &'static str = "lumen-countdown";
    type Attr = CountdownAttr;

    fn initialize(&mut self, cx: &mut WidgetContext<'_, Self>) {
        self.config = CountdownConfig::from_attributes(cx.attributes());
        self.engine.calculate_initial(&self.config, self.clock.now());
        cx.request_render();
        if self.config.autostart {
            self.start(cx);
        }
    }

    fn render(&self, _attrs: &AttributeMap) -> Option<String> {
        Some(display::render(&self.config, self.engine.remaining()))
    }

    fn attribute_changed(
        &mut self,
        change: &AttributeChange<CountdownAttr>,
        cx: &mut WidgetContext<'_, Self>,
    ) {
        self.config = CountdownConfig::from_attributes(cx.attributes());
        // autostart is only read on initialize and reset
        if change.key.affects_timing() {
            let remaining = self.engine.calculate_initial(&self.config, self.clock.now());
            tracing::debug!("<{}> recalculated: {}s", Self::TAG, remaining);
        }
    }

    fn reconnected(&mut self, cx: &mut WidgetContext<'_, Self>) {
        if matches!(
            self.engine.state(),
            TimerState::Running | TimerState::Paused
        ) {
            tracing::debug!("<{}> resuming tick loop", Self::TAG);
            self.spawn_ticker(cx);
            cx.request_render();
        }
    }

    fn teardown(&mut self, _cx: &mut WidgetContext<'_, Self>) {
        self.cancel_ticker();
    }
}

/// Timer controls on a countdown element
///
/// Each control returns `false` when the element is not initialized yet.
pub trait CountdownElement {
    fn start(&self) -> bool;
    fn pause(&self) -> bool;
    fn resume(&self) -> bool;
    fn reset(&self) -> bool;
    fn complete(&self) -> bool;
    fn remaining(&self) -> u64;
    fn timer_state(&self) -> TimerState;
}

impl CountdownElement for Element<Countdown> {
    fn start(&self) -> bool {
        self.update(|countdown, cx| countdown.start(cx)).is_some()
    }

    fn pause(&self) -> bool {
        self.update(|countdown, cx| countdown.pause(cx)).is_some()
    }

    fn resume(&self) -> bool {
        self.update(|countdown, cx| countdown.resume(cx)).is_some()
    }

    fn reset(&self) -> bool {
        self.update(|countdown, cx| countdown.reset(cx)).is_some()
    }

    fn complete(&self) -> bool {
        self.update(|countdown, cx| countdown.complete(cx)).is_some()
    }

    fn remaining(&self) -> u64 {
        self.with_widget(|countdown| countdown.engine().remaining())
    }

    fn timer_state(&self) -> TimerState {
        self.with_widget(|countdown| countdown.engine().state())
    }
}

/// Create a countdown element builder
pub fn countdown() -> ElementBuilder<Countdown> {
    Element::builder(Countdown::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use lumen_core::{ManualClock, ANY_EVENT};
    use std::sync::Mutex;

    fn manual_clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
    }

    fn timer(clock: &ManualClock, attrs: &[(&str, &str)]) -> Element<Countdown> {
        let mut builder = Element::builder(Countdown::with_clock(Arc::new(clock.clone())));
        for (name, value) in attrs {
            builder = builder.attribute(name, *value);
        }
        builder.build()
    }

    fn record_events(element: &Element<Countdown>) -> Arc<Mutex<Vec<String>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        element.add_event_listener(ANY_EVENT, move |event| {
            sink.lock().unwrap().push(event.name.clone());
        });
        log
    }

    fn count(log: &Arc<Mutex<Vec<String>>>, name: &str) -> usize {
        log.lock().unwrap().iter().filter(|n| *n == name).count()
    }

    async fn advance(millis: u64) {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_render_without_autostart() {
        let clock = manual_clock();
        let element = timer(&clock, &[("duration", "75")]);
        element.attach().await;

        assert_eq!(element.timer_state(), TimerState::Ready);
        assert_eq!(element.remaining(), 75);
        assert!(element.markup().contains("countdown-minutes"));
        assert_eq!(element.active_tasks(), 0);

        advance(3_000).await;
        assert_eq!(element.remaining(), 75);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_completes_exactly_once() {
        let clock = manual_clock();
        let element = timer(&clock, &[("duration", "3"), ("autostart", "")]);
        let events = record_events(&element);
        element.attach().await;
        assert_eq!(element.timer_state(), TimerState::Running);

        advance(3_500).await;
        assert_eq!(element.remaining(), 0);
        assert_eq!(element.timer_state(), TimerState::Completed);
        assert_eq!(count(&events, "completed"), 1);
        assert_eq!(element.active_tasks(), 0);
        assert!(element
            .markup()
            .contains("<span class=\"countdown-value\">0</span>"));

        advance(5_000).await;
        assert_eq!(count(&events, "completed"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_absolute_target_follows_wall_clock() {
        let clock = manual_clock();
        let target = (clock.now() + ChronoDuration::seconds(10)).to_rfc3339();
        let element = timer(&clock, &[("target", target.as_str()), ("autostart", "")]);
        element.attach().await;
        assert_eq!(element.remaining(), 10);

        clock.advance_secs(1);
        advance(1_500).await;
        assert_eq!(element.remaining(), 9);

        // three seconds pass on the wall clock before the next tick
        clock.advance_secs(3);
        advance(1_000).await;
        assert_eq!(element.remaining(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_freezes_remaining() {
        let clock = manual_clock();
        let element = timer(&clock, &[("duration", "10"), ("autostart", "")]);
        let events = record_events(&element);
        element.attach().await;

        advance(3_500).await;
        assert_eq!(element.remaining(), 7);

        assert!(element.pause());
        let renders = element.render_count();
        advance(5_000).await;
        assert_eq!(element.remaining(), 7);
        assert_eq!(element.render_count(), renders);
        assert_eq!(element.active_tasks(), 1);

        assert!(element.resume());
        advance(1_000).await;
        assert_eq!(element.remaining(), 6);
        assert_eq!(count(&events, "paused"), 1);
        assert_eq!(count(&events, "resumed"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restarts_with_autostart() {
        let clock = manual_clock();
        let element = timer(&clock, &[("duration", "2"), ("autostart", "")]);
        let events = record_events(&element);
        element.attach().await;

        advance(2_500).await;
        assert_eq!(element.timer_state(), TimerState::Completed);

        assert!(element.reset());
        assert_eq!(element.remaining(), 2);
        assert_eq!(element.timer_state(), TimerState::Running);

        advance(1_500).await;
        assert_eq!(element.remaining(), 1);
        assert_eq!(
            *events.lock().unwrap(),
            vec!["started", "completed", "reset", "started"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_without_autostart_stays_ready() {
        let clock = manual_clock();
        let element = timer(&clock, &[("duration", "5")]);
        element.attach().await;
        element.start();
        advance(2_500).await;
        assert_eq!(element.remaining(), 3);

        element.reset();
        assert_eq!(element.remaining(), 5);
        assert_eq!(element.timer_state(), TimerState::Ready);
        assert_eq!(element.active_tasks(), 0);

        advance(3_000).await;
        assert_eq!(element.remaining(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_one_tick_loop() {
        let clock = manual_clock();
        let element = timer(&clock, &[("duration", "10")]);
        let events = record_events(&element);
        element.attach().await;

        assert!(element.start());
        assert!(element.start());
        assert_eq!(element.active_tasks(), 1);
        assert!(element.with_widget(Countdown::is_running));

        advance(3_500).await;
        assert_eq!(element.remaining(), 7);
        assert_eq!(count(&events, "started"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_change_recalculates() {
        let clock = manual_clock();
        let element = timer(&clock, &[("duration", "10"), ("format", "seconds")]);
        element.attach().await;

        element.set_attribute("duration", "42");
        assert_eq!(element.remaining(), 42);
        assert!(element.markup().contains(">42</span>"));

        element.set_attribute("pad", "");
        element.set_attribute("duration", "5");
        assert!(element.markup().contains(">05</span>"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detach_stops_ticking() {
        let clock = manual_clock();
        let element = timer(&clock, &[("duration", "30"), ("autostart", "")]);
        element.attach().await;
        advance(2_500).await;
        assert_eq!(element.remaining(), 28);

        element.detach();
        assert_eq!(element.active_tasks(), 0);
        advance(10_000).await;
        assert_eq!(element.remaining(), 28);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reattach_restarts_tick_loop() {
        let clock = manual_clock();
        let element = timer(&clock, &[("duration", "10"), ("autostart", "")]);
        let events = record_events(&element);
        element.attach().await;
        advance(2_500).await;
        assert_eq!(element.remaining(), 8);

        element.detach();
        assert!(!element.with_widget(Countdown::is_running));

        element.attach().await;
        assert_eq!(element.timer_state(), TimerState::Running);
        assert!(element.with_widget(Countdown::is_running));
        assert_eq!(element.active_tasks(), 1);

        advance(3_200).await;
        assert_eq!(element.remaining(), 5);
        assert_eq!(count(&events, "started"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reattach_keeps_pause() {
        let clock = manual_clock();
        let element = timer(&clock, &[("duration", "10"), ("autostart", "")]);
        element.attach().await;
        advance(2_500).await;
        assert!(element.pause());

        element.detach();
        element.attach().await;
        assert_eq!(element.timer_state(), TimerState::Paused);
        assert_eq!(element.active_tasks(), 1);
        advance(1_800).await;
        assert_eq!(element.remaining(), 8);

        assert!(element.resume());
        advance(700).await;
        assert_eq!(element.remaining(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_refresh_keeps_real_seconds() {
        let clock = manual_clock();
        let widget = Countdown::with_clock(Arc::new(clock.clone()))
            .tick_interval(Duration::from_millis(500));
        let element = Element::builder(widget)
            .attribute("duration", "10")
            .attribute("autostart", "")
            .build();
        element.attach().await;

        advance(5_100).await;
        assert_eq!(element.remaining(), 5);
        assert_eq!(element.timer_state(), TimerState::Running);
    }

    #[tokio::test]
    async fn test_controls_before_attach_are_rejected() {
        let element = countdown().attribute("duration", "5").build();
        assert!(!element.start());
        assert_eq!(element.timer_state(), TimerState::Idle);
    }
}
