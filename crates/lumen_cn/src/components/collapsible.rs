//! Collapsible component for expandable/collapsible content sections
//!
//! The `open` attribute drives a four-state height transition:
//!
//! ```text
//! Collapsed ──open──▶ Expanding ──transition end──▶ Expanded
//!     ▲                                                │
//!     └──transition end── Collapsing ◀──not open───────┘
//! ```
//!
//! While expanding the content height is pinned to `content-height` so a
//! CSS transition has a concrete target; once expanded it is released to
//! `auto`. A reversal mid-transition restarts the timer in the new direction.
//!
//! # Events
//!
//! `show` and `hide` fire when a transition begins, `shown` and `hidden`
//! when it ends.
//!
//! # Example
//!
//! ```ignore
//! use lumen_cn::prelude::*;
//!
//! let section = cn::collapsible()
//!     .attribute("title", "Details")
//!     .attribute("body", "This content expands and collapses")
//!     .attribute("content-height", "120")
//!     .build();
//! section.attach().await;
//! section.toggle();
//! ```

use std::time::Duration;

use lumen_core::prelude::*;
use lumen_core::ElementBuilder;
use serde_json::json;

/// Chevron down SVG icon
const CHEVRON_DOWN_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><path d="m6 9 6 6 6-6"/></svg>"#;

const DEFAULT_TRANSITION_MS: u64 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollapsibleAttr {
    Open,
    Title,
    Body,
    /// Content height in pixels, the expanding transition target
    ContentHeight,
    /// Transition length in milliseconds
    TransitionMs,
}

impl AttributeKey for CollapsibleAttr {
    fn all() -> &'static [Self] {
        &[
            CollapsibleAttr::Open,
            CollapsibleAttr::Title,
            CollapsibleAttr::Body,
            CollapsibleAttr::ContentHeight,
            CollapsibleAttr::TransitionMs,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            CollapsibleAttr::Open => "open",
            CollapsibleAttr::Title => "title",
            CollapsibleAttr::Body => "body",
            CollapsibleAttr::ContentHeight => "content-height",
            CollapsibleAttr::TransitionMs => "transition-ms",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollapseState {
    #[default]
    Collapsed,
    Expanding,
    Expanded,
    Collapsing,
}

impl CollapseState {
    pub fn name(&self) -> &'static str {
        match self {
            CollapseState::Collapsed => "collapsed",
            CollapseState::Expanding => "expanding",
            CollapseState::Expanded => "expanded",
            CollapseState::Collapsing => "collapsing",
        }
    }

    /// Open or heading there
    pub fn is_opening(&self) -> bool {
        matches!(self, CollapseState::Expanding | CollapseState::Expanded)
    }
}

#[derive(Debug, Default)]
pub struct Collapsible {
    state: CollapseState,
    transition: Option<TickHandle>,
}

impl Collapsible {
    pub fn state(&self) -> CollapseState {
        self.state
    }

    fn transition_length(attrs: &AttributeMap) -> Duration {
        Duration::from_millis(attrs.parse_or(
            CollapsibleAttr::TransitionMs.name(),
            DEFAULT_TRANSITION_MS,
        ))
    }

    fn begin(&mut self, target: CollapseState, event: &str, cx: &mut WidgetContext<'_, Self>) {
        self.cancel_transition();
        self.state = target;
        cx.dispatch(event, json!({ "state": target.name() }));
        cx.request_render();

        let length = Self::transition_length(cx.attributes());
        if length.is_zero() {
            self.transition_end(cx);
            return;
        }
        // one-shot: transition_end cancels the handle on the first tick
        self.transition = Some(cx.spawn_interval(length, |collapsible, cx| {
            collapsible.transition_end(cx)
        }));
    }

    /// Start expanding; no-op when already open or opening
    pub fn show(&mut self, cx: &mut WidgetContext<'_, Self>) {
        if self.state.is_opening() {
            return;
        }
        self.begin(CollapseState::Expanding, "show", cx);
    }

    /// Start collapsing; no-op when already closed or closing
    pub fn hide(&mut self, cx: &mut WidgetContext<'_, Self>) {
        if !self.state.is_opening() {
            return;
        }
        self.begin(CollapseState::Collapsing, "hide", cx);
    }

    /// Settle a running transition
    pub fn transition_end(&mut self, cx: &mut WidgetContext<'_, Self>) {
        self.cancel_transition();
        let (settled, event) = match self.state {
            CollapseState::Expanding => (CollapseState::Expanded, "shown"),
            CollapseState::Collapsing => (CollapseState::Collapsed, "hidden"),
            _ => return,
        };
        self.state = settled;
        cx.dispatch(event, json!({ "state": settled.name() }));
        cx.request_render();
    }

    fn cancel_transition(&mut self) {
        if let Some(mut transition) = self.transition.take() {
            transition.cancel();
        }
    }

    fn height(&self, attrs: &AttributeMap) -> String {
        match self.state {
            CollapseState::Collapsed | CollapseState::Collapsing => "0px".to_string(),
            CollapseState::Expanded => "auto".to_string(),
            CollapseState::Expanding => {
                match attrs.parse_or::<u32>(CollapsibleAttr::ContentHeight.name(), 0) {
                    0 => "auto".to_string(),
                    px => format!("{}px", px),
                }
            }
        }
    }
}

impl Widget for Collapsible {
    const TAG: &'static str = "lumen-collapsible";
    type Attr = CollapsibleAttr;

    fn initialize(&mut self, cx: &mut WidgetContext<'_, Self>) {
        // the initial state never animates
        self.state = if cx.attributes().has(CollapsibleAttr::Open.name()) {
            CollapseState::Expanded
        } else {
            CollapseState::Collapsed
        };
        cx.request_render();
    }

    fn render(&self, attrs: &AttributeMap) -> Option<String> {
        let expanded = self.state.is_opening();
        let mut classes = ClassList::with("collapse");
        classes
            .add(&format!("collapse-{}", self.state.name()))
            .add_if(expanded, "collapse-open");

        let trigger = Tag::new("button")
            .class("collapse-title")
            .attr("type", "button")
            .attr("aria-expanded", if expanded { "true" } else { "false" })
            .text(&attrs.string_or(CollapsibleAttr::Title.name(), ""))
            .raw(CHEVRON_DOWN_SVG);

        let mut content = Tag::new("div")
            .class("collapse-content")
            .attr("style", &format!("height: {}", self.height(attrs)));
        if self.state == CollapseState::Collapsed {
            content = content.flag("hidden");
        }
        let content = content.text(&attrs.string_or(CollapsibleAttr::Body.name(), ""));

        Some(
            Tag::new("div")
                .classes(&classes)
                .child(trigger)
                .child(content)
                .build(),
        )
    }

    fn attribute_changed(
        &mut self,
        change: &AttributeChange<CollapsibleAttr>,
        cx: &mut WidgetContext<'_, Self>,
    ) {
        if change.key == CollapsibleAttr::Open && change.presence_changed() {
            if change.new.is_some() {
                self.show(cx);
            } else {
                self.hide(cx);
            }
        }
    }

    fn teardown(&mut self, _cx: &mut WidgetContext<'_, Self>) {
        self.cancel_transition();
    }
}

/// Element-level controls; each one reflects into the `open` attribute
pub trait CollapsibleElement {
    fn show(&self);
    fn hide(&self);
    fn toggle(&self);
    fn collapse_state(&self) -> CollapseState;
}

impl CollapsibleElement for Element<Collapsible> {
    fn show(&self) {
        self.toggle_attribute(CollapsibleAttr::Open.name(), true);
    }

    fn hide(&self) {
        self.toggle_attribute(CollapsibleAttr::Open.name(), false);
    }

    fn toggle(&self) {
        let open = self.attribute(CollapsibleAttr::Open.name()).is_some();
        self.toggle_attribute(CollapsibleAttr::Open.name(), !open);
    }

    fn collapse_state(&self) -> CollapseState {
        self.with_widget(Collapsible::state)
    }
}

/// Create a collapsible element builder
pub fn collapsible() -> ElementBuilder<Collapsible> {
    Element::builder(Collapsible::default())
}
