//! Dialog component for modal dialogs
//!
//! The `open` attribute is the single source of truth: [`DialogElement::show`]
//! and [`DialogElement::close`] only reflect into it. Closing first
//! dispatches a cancelable `close` event; a listener calling
//! `prevent_default` keeps the dialog open.
//!
//! # Events
//!
//! - `open` when the dialog opens
//! - `close` (cancelable) before [`DialogElement::close`] closes it
//! - `closed` once the dialog is closed, by any means
//!
//! # Example
//!
//! ```ignore
//! use lumen_cn::prelude::*;
//!
//! let dialog = cn::dialog()
//!     .attribute("title", "Confirm Action")
//!     .attribute("body", "Are you sure you want to proceed?")
//!     .attribute("closable", "")
//!     .build();
//!
//! dialog.add_event_listener("close", |event| {
//!     if unsaved_changes() {
//!         event.prevent_default();
//!     }
//! });
//! dialog.attach().await;
//! dialog.show();
//! ```

use lumen_core::prelude::*;
use lumen_core::ElementBuilder;
use serde_json::json;

/// Dialog size variants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DialogSize {
    /// Small dialog (max-width: 400px)
    Small,
    /// Medium dialog (max-width: 500px)
    #[default]
    Medium,
    /// Large dialog (max-width: 600px)
    Large,
    /// Full width dialog (max-width: 800px)
    Full,
}

impl DialogSize {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "sm" | "small" => Some(DialogSize::Small),
            "md" | "medium" => Some(DialogSize::Medium),
            "lg" | "large" => Some(DialogSize::Large),
            "full" => Some(DialogSize::Full),
            _ => None,
        }
    }

    /// Get the max width in pixels for this size
    pub fn max_width(&self) -> u32 {
        match self {
            DialogSize::Small => 400,
            DialogSize::Medium => 500,
            DialogSize::Large => 600,
            DialogSize::Full => 800,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogAttr {
    Open,
    Title,
    Body,
    /// Show a close button
    Closable,
    Size,
}

impl AttributeKey for DialogAttr {
    fn all() -> &'static [Self] {
        &[
            DialogAttr::Open,
            DialogAttr::Title,
            DialogAttr::Body,
            DialogAttr::Closable,
            DialogAttr::Size,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            DialogAttr::Open => "open",
            DialogAttr::Title => "title",
            DialogAttr::Body => "body",
            DialogAttr::Closable => "closable",
            DialogAttr::Size => "size",
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Dialog;

impl Widget for Dialog {
    const TAG: &'static str = "lumen-dialog";
    type Attr = DialogAttr;

    fn initialize(&mut self, cx: &mut WidgetContext<'_, Self>) {
        cx.request_render();
    }

    fn render(&self, attrs: &AttributeMap) -> Option<String> {
        let open = attrs.has(DialogAttr::Open.name());
        let size = attrs
            .get(DialogAttr::Size.name())
            .and_then(DialogSize::parse)
            .unwrap_or_default();

        let mut classes = ClassList::with("modal");
        classes.add_if(open, "modal-open");

        let mut panel = Tag::new("div")
            .class("modal-box")
            .attr("style", &format!("max-width: {}px", size.max_width()));
        if let Some(title) = attrs.non_empty(DialogAttr::Title.name()) {
            panel = panel.child(Tag::new("h3").class("modal-title").text(title));
        }
        if let Some(body) = attrs.non_empty(DialogAttr::Body.name()) {
            panel = panel.child(Tag::new("p").class("modal-body").text(body));
        }
        if attrs.has(DialogAttr::Closable.name()) {
            panel = panel.child(
                Tag::new("button")
                    .class("modal-close")
                    .attr("type", "button")
                    .attr("aria-label", "Close")
                    .attr("data-action", "close")
                    .text("\u{2715}"),
            );
        }

        let mut dialog = Tag::new("dialog")
            .classes(&classes)
            .attr("role", "dialog")
            .attr("aria-modal", "true");
        if open {
            dialog = dialog.flag("open");
        }
        Some(dialog.child(panel).build())
    }

    fn attribute_changed(
        &mut self,
        change: &AttributeChange<DialogAttr>,
        cx: &mut WidgetContext<'_, Self>,
    ) {
        if change.key == DialogAttr::Open && change.presence_changed() {
            let event = if change.new.is_some() { "open" } else { "closed" };
            cx.dispatch(event, json!({ "open": change.new.is_some() }));
        }
    }
}

/// Element-level dialog controls
pub trait DialogElement {
    fn is_open(&self) -> bool;
    fn show(&self);
    /// Request closing; returns `false` when a listener vetoed it
    fn close(&self) -> bool;
}

impl DialogElement for Element<Dialog> {
    fn is_open(&self) -> bool {
        self.attribute(DialogAttr::Open.name()).is_some()
    }

    fn show(&self) {
        self.toggle_attribute(DialogAttr::Open.name(), true);
    }

    fn close(&self) -> bool {
        if !self.is_open() {
            return true;
        }
        if !self.dispatch("close", json!({ "open": true })) {
            tracing::debug!("<{}> close vetoed by a listener", Dialog::TAG);
            return false;
        }
        self.remove_attribute(DialogAttr::Open.name());
        true
    }
}

/// Create a dialog element builder
pub fn dialog() -> ElementBuilder<Dialog> {
    Element::builder(Dialog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_dialog_size_values() {
        assert_eq!(DialogSize::default().max_width(), 500);
        assert_eq!(DialogSize::parse("lg"), Some(DialogSize::Large));
        assert_eq!(DialogSize::parse("huge"), None);
    }

    #[test]
    fn test_show_and_close() {
        let element = dialog()
            .attribute("title", "Delete file?")
            .attribute("closable", "")
            .attribute("size", "sm")
            .build();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        element.add_event_listener("*", move |event| {
            sink.lock().unwrap().push(event.name.clone());
        });
        element.connect();
        assert!(!element.markup().contains(" open"));
        assert!(element.markup().contains("max-width: 400px"));

        element.show();
        assert!(element.is_open());
        assert!(element.markup().contains("modal-open"));

        assert!(element.close());
        assert!(!element.is_open());
        assert_eq!(*events.lock().unwrap(), vec!["open", "close", "closed"]);
    }

    #[test]
    fn test_close_can_be_vetoed() {
        let element = dialog().attribute("open", "").build();
        let locked = Arc::new(AtomicBool::new(true));
        let guard = locked.clone();
        element.add_event_listener("close", move |event| {
            if guard.load(Ordering::SeqCst) {
                event.prevent_default();
            }
        });
        element.connect();
        assert!(element.markup().contains("modal-open"));

        assert!(!element.close());
        assert!(element.is_open());

        locked.store(false, Ordering::SeqCst);
        assert!(element.close());
        assert!(!element.markup().contains("modal-open"));
    }
}
