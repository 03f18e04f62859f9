//! Badge component for status indicators
//!
//! Small labeled indicators for status, counts, or categories.
//!
//! # Example
//!
//! ```ignore
//! use lumen_cn::prelude::*;
//!
//! // <lumen-badge variant="success" size="sm" label="Shipped">
//! let badge = cn::badge()
//!     .attribute("variant", "success")
//!     .attribute("size", "sm")
//!     .attribute("label", "Shipped")
//!     .build();
//! ```

use lumen_core::prelude::*;
use lumen_core::ElementBuilder;

/// Badge visual variants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BadgeVariant {
    /// Muted default
    #[default]
    Neutral,
    Primary,
    Secondary,
    Accent,
    Info,
    Success,
    Warning,
    Error,
    /// No background
    Ghost,
}

impl BadgeVariant {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "neutral" => Some(BadgeVariant::Neutral),
            "primary" => Some(BadgeVariant::Primary),
            "secondary" => Some(BadgeVariant::Secondary),
            "accent" => Some(BadgeVariant::Accent),
            "info" => Some(BadgeVariant::Info),
            "success" => Some(BadgeVariant::Success),
            "warning" => Some(BadgeVariant::Warning),
            "error" | "destructive" => Some(BadgeVariant::Error),
            "ghost" => Some(BadgeVariant::Ghost),
            _ => None,
        }
    }

    fn class(&self) -> &'static str {
        match self {
            BadgeVariant::Neutral => "badge-neutral",
            BadgeVariant::Primary => "badge-primary",
            BadgeVariant::Secondary => "badge-secondary",
            BadgeVariant::Accent => "badge-accent",
            BadgeVariant::Info => "badge-info",
            BadgeVariant::Success => "badge-success",
            BadgeVariant::Warning => "badge-warning",
            BadgeVariant::Error => "badge-error",
            BadgeVariant::Ghost => "badge-ghost",
        }
    }
}

/// Badge sizes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BadgeSize {
    ExtraSmall,
    Small,
    #[default]
    Medium,
    Large,
}

impl BadgeSize {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "xs" => Some(BadgeSize::ExtraSmall),
            "sm" => Some(BadgeSize::Small),
            "md" => Some(BadgeSize::Medium),
            "lg" => Some(BadgeSize::Large),
            _ => None,
        }
    }

    fn class(&self) -> &'static str {
        match self {
            BadgeSize::ExtraSmall => "badge-xs",
            BadgeSize::Small => "badge-sm",
            BadgeSize::Medium => "badge-md",
            BadgeSize::Large => "badge-lg",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BadgeAttr {
    Variant,
    Size,
    Outline,
    Label,
}

impl AttributeKey for BadgeAttr {
    fn all() -> &'static [Self] {
        &[
            BadgeAttr::Variant,
            BadgeAttr::Size,
            BadgeAttr::Outline,
            BadgeAttr::Label,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            BadgeAttr::Variant => "variant",
            BadgeAttr::Size => "size",
            BadgeAttr::Outline => "outline",
            BadgeAttr::Label => "label",
        }
    }
}

/// Badge widget; stateless, everything is read from attributes
#[derive(Clone, Copy, Debug, Default)]
pub struct Badge;

impl Widget for Badge {
    const TAG: &'static str = "lumen-badge";
    type Attr = BadgeAttr;

    fn initialize(&mut self, cx: &mut WidgetContext<'_, Self>) {
        cx.request_render();
    }

    fn render(&self, attrs: &AttributeMap) -> Option<String> {
        let variant = attrs
            .get(BadgeAttr::Variant.name())
            .and_then(BadgeVariant::parse)
            .unwrap_or_default();
        let size = attrs
            .get(BadgeAttr::Size.name())
            .and_then(BadgeSize::parse)
            .unwrap_or_default();

        let mut classes = ClassList::with("badge");
        classes
            .add(variant.class())
            .add(size.class())
            .add_if(attrs.has(BadgeAttr::Outline.name()), "badge-outline");

        Some(
            Tag::new("span")
                .classes(&classes)
                .text(&attrs.string_or(BadgeAttr::Label.name(), ""))
                .build(),
        )
    }
}

/// Create a badge element builder
pub fn badge() -> ElementBuilder<Badge> {
    Element::builder(Badge)
}
