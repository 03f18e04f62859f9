//! Breadcrumb navigation component
//!
//! Shows the user's current location in a site hierarchy.
//!
//! # Example
//!
//! ```ignore
//! use lumen_cn::prelude::*;
//!
//! // <lumen-breadcrumb items="Home|/,Products|/products,Lamps">
//! cn::breadcrumb()
//!     .attribute("items", "Home|/,Products|/products,Lamps")
//!     .build()
//!
//! // With a custom separator
//! cn::breadcrumb()
//!     .attribute("items", "Home|/,Settings")
//!     .attribute("separator", ">")
//!     .build()
//! ```

use lumen_core::prelude::*;
use lumen_core::{escape_text, ElementBuilder};

/// Default separator SVG (chevron right)
const CHEVRON_RIGHT_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><path d="m9 18 6-6-6-6"/></svg>"#;

/// A single breadcrumb item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreadcrumbItem {
    /// Display label
    pub label: String,
    /// Link target; items without one render as plain text
    pub href: Option<String>,
}

impl BreadcrumbItem {
    /// Parse `label|href` (the href part is optional)
    pub fn parse(entry: &str) -> Option<Self> {
        let (label, href) = match entry.split_once('|') {
            Some((label, href)) => (label.trim(), Some(href.trim())),
            None => (entry.trim(), None),
        };
        if label.is_empty() {
            return None;
        }
        Some(Self {
            label: label.to_string(),
            href: href.filter(|h| !h.is_empty()).map(str::to_string),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreadcrumbAttr {
    /// Comma separated `label|href` entries
    Items,
    /// Separator text; defaults to a chevron icon
    Separator,
}

impl AttributeKey for BreadcrumbAttr {
    fn all() -> &'static [Self] {
        &[BreadcrumbAttr::Items, BreadcrumbAttr::Separator]
    }

    fn name(&self) -> &'static str {
        match self {
            BreadcrumbAttr::Items => "items",
            BreadcrumbAttr::Separator => "separator",
        }
    }
}

/// Breadcrumb widget; the last item is the current page
#[derive(Clone, Debug, Default)]
pub struct Breadcrumb {
    items: Vec<BreadcrumbItem>,
}

impl Breadcrumb {
    pub fn items(&self) -> &[BreadcrumbItem] {
        &self.items
    }

    fn parse_items(&mut self, attrs: &AttributeMap) {
        self.items = attrs
            .list(BreadcrumbAttr::Items.name())
            .iter()
            .filter_map(|entry| BreadcrumbItem::parse(entry))
            .collect();
    }
}

impl Widget for Breadcrumb {
    const TAG: &'static str = "lumen-breadcrumb";
    type Attr = BreadcrumbAttr;

    fn initialize(&mut self, cx: &mut WidgetContext<'_, Self>) {
        self.parse_items(cx.attributes());
        cx.request_render();
    }

    fn render(&self, attrs: &AttributeMap) -> Option<String> {
        let separator = match attrs.non_empty(BreadcrumbAttr::Separator.name()) {
            Some(text) => escape_text(text),
            None => CHEVRON_RIGHT_SVG.to_string(),
        };

        let mut list = Tag::new("ol").class("breadcrumb-list");
        let last = self.items.len().saturating_sub(1);
        for (index, item) in self.items.iter().enumerate() {
            let current = index == last;
            let entry = match (&item.href, current) {
                (Some(href), false) => Tag::new("a")
                    .class("breadcrumb-link")
                    .attr("href", href)
                    .text(&item.label),
                _ => {
                    let mut page = Tag::new("span").class("breadcrumb-page");
                    if current {
                        page = page.attr("aria-current", "page");
                    }
                    page.text(&item.label)
                }
            };
            list = list.child(Tag::new("li").class("breadcrumb-item").child(entry));
            if !current {
                list = list.child(
                    Tag::new("li")
                        .class("breadcrumb-separator")
                        .attr("aria-hidden", "true")
                        .raw(&separator),
                );
            }
        }

        Some(
            Tag::new("nav")
                .class("breadcrumb")
                .attr("aria-label", "breadcrumb")
                .child(list)
                .build(),
        )
    }

    fn attribute_changed(
        &mut self,
        change: &AttributeChange<BreadcrumbAttr>,
        cx: &mut WidgetContext<'_, Self>,
    ) {
        if change.key == BreadcrumbAttr::Items {
            self.parse_items(cx.attributes());
        }
    }
}

/// Create a breadcrumb element builder
pub fn breadcrumb() -> ElementBuilder<Breadcrumb> {
    Element::builder(Breadcrumb::default())
}
