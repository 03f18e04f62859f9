//! Swap component
//!
//! Shows one of two contents (`on` / `off`) depending on the `active` flag,
//! optionally with a rotate or flip effect class for the CSS transition.
//!
//! # Example
//!
//! ```ignore
//! use lumen_cn::prelude::*;
//!
//! let theme = cn::swap()
//!     .attribute("on", "🌙")
//!     .attribute("off", "☀️")
//!     .attribute("effect", "rotate")
//!     .build();
//! theme.add_event_listener("toggle", |event| println!("dark: {}", event.detail["active"]));
//! theme.attach().await;
//! theme.toggle();
//! ```

use lumen_core::prelude::*;
use lumen_core::ElementBuilder;
use serde_json::json;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SwapEffect {
    #[default]
    None,
    Rotate,
    Flip,
}

impl SwapEffect {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "rotate" => SwapEffect::Rotate,
            "flip" => SwapEffect::Flip,
            _ => SwapEffect::None,
        }
    }

    fn class(&self) -> Option<&'static str> {
        match self {
            SwapEffect::None => None,
            SwapEffect::Rotate => Some("swap-rotate"),
            SwapEffect::Flip => Some("swap-flip"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapAttr {
    Active,
    /// Content shown while active
    On,
    /// Content shown while inactive
    Off,
    Effect,
}

impl AttributeKey for SwapAttr {
    fn all() -> &'static [Self] {
        &[SwapAttr::Active, SwapAttr::On, SwapAttr::Off, SwapAttr::Effect]
    }

    fn name(&self) -> &'static str {
        match self {
            SwapAttr::Active => "active",
            SwapAttr::On => "on",
            SwapAttr::Off => "off",
            SwapAttr::Effect => "effect",
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Swap;

impl Widget for Swap {
    const TAG: &'static str = "lumen-swap";
    type Attr = SwapAttr;

    fn initialize(&mut self, cx: &mut WidgetContext<'_, Self>) {
        cx.request_render();
    }

    fn render(&self, attrs: &AttributeMap) -> Option<String> {
        let active = attrs.has(SwapAttr::Active.name());
        let effect = attrs
            .get(SwapAttr::Effect.name())
            .map(SwapEffect::parse)
            .unwrap_or_default();

        let mut classes = ClassList::with("swap");
        classes.add_if(active, "swap-active");
        if let Some(class) = effect.class() {
            classes.add(class);
        }

        let on = Tag::new("span")
            .class("swap-on")
            .attr("aria-hidden", if active { "false" } else { "true" })
            .text(&attrs.string_or(SwapAttr::On.name(), ""));
        let off = Tag::new("span")
            .class("swap-off")
            .attr("aria-hidden", if active { "true" } else { "false" })
            .text(&attrs.string_or(SwapAttr::Off.name(), ""));

        Some(
            Tag::new("label")
                .classes(&classes)
                .attr("role", "switch")
                .attr("aria-checked", if active { "true" } else { "false" })
                .child(on)
                .child(off)
                .build(),
        )
    }

    fn attribute_changed(
        &mut self,
        change: &AttributeChange<SwapAttr>,
        cx: &mut WidgetContext<'_, Self>,
    ) {
        if change.key == SwapAttr::Active && change.presence_changed() {
            cx.dispatch("toggle", json!({ "active": change.new.is_some() }));
        }
    }
}

/// Element-level swap controls
pub trait SwapElement {
    fn is_active(&self) -> bool;
    fn set_active(&self, active: bool);
    /// Flip the state; returns the new state
    fn toggle(&self) -> bool;
}

impl SwapElement for Element<Swap> {
    fn is_active(&self) -> bool {
        self.attribute(SwapAttr::Active.name()).is_some()
    }

    fn set_active(&self, active: bool) {
        self.toggle_attribute(SwapAttr::Active.name(), active);
    }

    fn toggle(&self) -> bool {
        let active = !self.is_active();
        self.set_active(active);
        active
    }
}

/// Create a swap element builder
pub fn swap() -> ElementBuilder<Swap> {
    Element::builder(Swap)
}
