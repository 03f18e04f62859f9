//! Card component for content containers
//!
//! A bordered container grouping a title, body text, an optional image and
//! a row of action buttons.
//!
//! # Example
//!
//! ```ignore
//! use lumen_cn::prelude::*;
//!
//! cn::card()
//!     .attribute("title", "Card Title")
//!     .attribute("body", "Main content goes here")
//!     .attribute("actions", "Cancel,Save")
//!     .attribute("bordered", "")
//!     .build()
//! ```

use lumen_core::prelude::*;
use lumen_core::ElementBuilder;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardAttr {
    Title,
    Body,
    /// Image URL rendered as a figure above (or beside) the body
    Image,
    ImageAlt,
    /// Tighter padding
    Compact,
    Bordered,
    /// Image beside the body instead of above it
    Side,
    /// Comma separated button labels
    Actions,
}

impl AttributeKey for CardAttr {
    fn all() -> &'static [Self] {
        &[
            CardAttr::Title,
            CardAttr::Body,
            CardAttr::Image,
            CardAttr::ImageAlt,
            CardAttr::Compact,
            CardAttr::Bordered,
            CardAttr::Side,
            CardAttr::Actions,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            CardAttr::Title => "title",
            CardAttr::Body => "body",
            CardAttr::Image => "image",
            CardAttr::ImageAlt => "image-alt",
            CardAttr::Compact => "compact",
            CardAttr::Bordered => "bordered",
            CardAttr::Side => "side",
            CardAttr::Actions => "actions",
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Card;

impl Widget for Card {
    const TAG: &'static str = "lumen-card";
    type Attr = CardAttr;

    fn initialize(&mut self, cx: &mut WidgetContext<'_, Self>) {
        cx.request_render();
    }

    fn render(&self, attrs: &AttributeMap) -> Option<String> {
        let mut classes = ClassList::with("card");
        classes
            .add_if(attrs.has(CardAttr::Compact.name()), "card-compact")
            .add_if(attrs.has(CardAttr::Bordered.name()), "card-bordered")
            .add_if(attrs.has(CardAttr::Side.name()), "card-side");

        let mut card = Tag::new("div").classes(&classes);

        if let Some(src) = attrs.non_empty(CardAttr::Image.name()) {
            card = card.child(
                Tag::new("figure").child(
                    Tag::new("img")
                        .attr("src", src)
                        .attr("alt", &attrs.string_or(CardAttr::ImageAlt.name(), "")),
                ),
            );
        }

        let mut body = Tag::new("div").class("card-body");
        if let Some(title) = attrs.non_empty(CardAttr::Title.name()) {
            body = body.child(Tag::new("h2").class("card-title").text(title));
        }
        if let Some(text) = attrs.non_empty(CardAttr::Body.name()) {
            body = body.child(Tag::new("p").text(text));
        }

        let actions = attrs.list(CardAttr::Actions.name());
        if !actions.is_empty() {
            let mut row = Tag::new("div").class("card-actions");
            for (index, label) in actions.iter().enumerate() {
                // the last action is the primary one
                let class = if index + 1 == actions.len() {
                    "btn btn-primary"
                } else {
                    "btn"
                };
                row = row.child(
                    Tag::new("button")
                        .class(class)
                        .attr("type", "button")
                        .attr("data-action", label)
                        .text(label),
                );
            }
            body = body.child(row);
        }

        Some(card.child(body).build())
    }
}

/// Create a card element builder
pub fn card() -> ElementBuilder<Card> {
    Element::builder(Card)
}
