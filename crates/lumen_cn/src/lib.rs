//! # Lumen Component Library (lumen_cn)
//!
//! Attribute-driven custom elements built on the `lumen_core` lifecycle.
//!
//! ## Philosophy
//!
//! Every component is a [`lumen_core::Widget`]: it reads its configuration
//! from attributes, re-renders its whole markup when an observed attribute
//! changes and reports state transitions as events. Nothing is configured
//! through constructors, so the same components can be instantiated from
//! markup through the [`ComponentRegistry`].
//!
//! ## Example
//!
//! ```rust
//! use lumen_cn::prelude::*;
//!
//! let badge = cn::badge()
//!     .attribute("variant", "success")
//!     .attribute("label", "Shipped")
//!     .build();
//! badge.connect();
//! assert_eq!(
//!     badge.markup(),
//!     r#"<span class="badge badge-success badge-md">Shipped</span>"#
//! );
//!
//! let swap = cn::swap().attribute("on", "yes").attribute("off", "no").build();
//! swap.connect();
//! assert!(swap.toggle());
//! ```
//!
//! ## Components
//!
//! - **Countdown** - Timer counting to a target instant or through a duration
//! - **Badge** - Status indicator with variants and sizes
//! - **Breadcrumb** - Location trail with the current page marked
//! - **Card** - Content container with image, body and actions
//! - **Collapsible** - Height-transition expand/collapse section
//! - **Dialog** - Modal dialog with a cancelable close
//! - **Swap** - Two-state content toggle

pub mod components;
pub mod registry;

pub use components::*;
pub use registry::{ComponentRegistry, HostOptions};

/// Convenience module for accessing components with `cn::` prefix
pub mod cn {
    pub use crate::components::badge::badge;
    pub use crate::components::breadcrumb::breadcrumb;
    pub use crate::components::card::card;
    pub use crate::components::collapsible::collapsible;
    pub use crate::components::countdown::countdown;
    pub use crate::components::dialog::dialog;
    pub use crate::components::swap::swap;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cn;
    pub use crate::components::badge::{Badge, BadgeSize, BadgeVariant};
    pub use crate::components::collapsible::{CollapseState, CollapsibleElement};
    pub use crate::components::countdown::{Countdown, CountdownElement, TimerState};
    pub use crate::components::dialog::{DialogElement, DialogSize};
    pub use crate::components::swap::{SwapEffect, SwapElement};
    pub use crate::registry::{ComponentRegistry, HostOptions};
    // Re-export the lifecycle types every host needs
    pub use lumen_core::prelude::*;
    pub use lumen_core::{AnyElement, LumenConfig};
}
