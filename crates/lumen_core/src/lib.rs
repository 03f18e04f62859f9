//! Lumen Core Runtime
//!
//! This crate provides the lifecycle every Lumen custom element shares:
//!
//! - **Attributes**: the permissive, string-typed configuration surface, with
//!   typed per-widget attribute keys
//! - **Readiness Gate**: one shared poll loop deferring first renders until
//!   the reactive-binding framework is loaded
//! - **Element Host**: attach/initialize once, re-render on attribute
//!   mutation, scoped periodic tasks, teardown on detach
//! - **Event Dispatch**: bubbling, cancelable widget notifications
//! - **Enhancement**: best-effort framework reprocessing after each render
//!
//! # Example
//!
//! ```rust
//! use lumen_core::prelude::*;
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq)]
//! enum GreetAttr {
//!     Name,
//! }
//!
//! impl AttributeKey for GreetAttr {
//!     fn all() -> &'static [Self] {
//!         &[GreetAttr::Name]
//!     }
//!     fn name(&self) -> &'static str {
//!         "name"
//!     }
//! }
//!
//! struct Greeting;
//!
//! impl Widget for Greeting {
//!     const TAG: &'static str = "lumen-greeting";
//!     type Attr = GreetAttr;
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
//! let element = Element::builder(Greeting).attribute("name", "Ada").build();
//! assert!(element.connect());
//! assert_eq!(element.markup(), "Hello, Ada");
//!
//! element.set_attribute("name", "Grace");
//! assert_eq!(element.markup(), "Hello, Grace");
//! ```

pub mod attributes;
pub mod clock;
pub mod config;
pub mod element;
pub mod enhance;
pub mod error;
pub mod events;
pub mod markup;
pub mod readiness;

pub use attributes::{AttributeChange, AttributeKey, AttributeMap};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CountdownDefaults, EnhanceConfig, LumenConfig, ReadinessConfig};
pub use element::{
    AnyElement, AttachFuture, Element, ElementBuilder, TickHandle, Widget, WidgetContext,
};
pub use enhance::{enhance_with_retry, EnhanceOutcome, Enhancer, NoopEnhancer};
pub use error::{EnhanceError, LumenError, Result};
pub use events::{EventDispatcher, ListenerId, WidgetEvent, ANY_EVENT};
pub use markup::{escape_attr, escape_text, ClassList, Tag};
pub use readiness::{shared_gate, FrameworkProbe, Readiness, ReadinessGate, FRAMEWORK_GATE};

/// Prelude for widget implementations
pub mod prelude {
    pub use crate::attributes::{AttributeChange, AttributeKey, AttributeMap};
    pub use crate::element::{Element, TickHandle, Widget, WidgetContext};
    pub use crate::events::WidgetEvent;
    pub use crate::markup::{ClassList, Tag};
    pub use crate::readiness::ReadinessGate;
}
