//! Custom element components built on lumen_core
//!
//! Each component follows a consistent pattern:
//! - Builder function (e.g., `badge()`) returning an `ElementBuilder`
//! - Attribute enum (e.g., `BadgeAttr`) listing the observed attributes
//! - Variant/size enums parsed permissively from attribute values
//! - An element extension trait for components with controls
//!   (e.g., `CountdownElement`)

pub mod badge;
pub mod breadcrumb;
pub mod card;
pub mod collapsible;
pub mod countdown;
pub mod dialog;
pub mod swap;

pub use badge::{badge, Badge, BadgeAttr, BadgeSize, BadgeVariant};
pub use breadcrumb::{breadcrumb, Breadcrumb, BreadcrumbAttr, BreadcrumbItem};
pub use card::{card, Card, CardAttr};
pub use collapsible::{collapsible, CollapseState, Collapsible, CollapsibleAttr, CollapsibleElement};
pub use countdown::{countdown, Countdown, CountdownAttr, CountdownElement, TimerState};
pub use dialog::{dialog, Dialog, DialogAttr, DialogElement, DialogSize};
pub use swap::{swap, Swap, SwapAttr, SwapEffect, SwapElement};
