//! Markup helpers
//!
//! Widgets re-render by replacing their whole subtree with a freshly built
//! string. These helpers keep that string assembly consistent: classes are
//! de-duplicated in insertion order and every attribute-sourced value is
//! escaped before it reaches markup.

use std::fmt::Write;

use smallvec::SmallVec;

/// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "hr", "img", "input", "meta", "source", "wbr"];

/// Escape text content
pub fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escape a double-quoted attribute value
pub fn escape_attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Ordered, de-duplicated CSS class list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassList {
    classes: SmallVec<[String; 8]>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a base class
    pub fn with(base: &str) -> Self {
        let mut list = Self::new();
        list.add(base);
        list
    }

    /// Add every whitespace-separated class in `classes`
    pub fn add(&mut self, classes: &str) -> &mut Self {
        for class in classes.split_whitespace() {
            if !self.classes.iter().any(|c| c == class) {
                self.classes.push(class.to_string());
            }
        }
        self
    }

    /// Add when `condition` holds
    pub fn add_if(&mut self, condition: bool, classes: &str) -> &mut Self {
        if condition {
            self.add(classes);
        }
        self
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Space-joined class attribute value
    pub fn to_attr(&self) -> String {
        self.classes.join(" ")
    }
}

/// Minimal element builder
///
/// ```rust
/// use lumen_core::markup::Tag;
///
/// let html = Tag::new("span")
///     .class("badge badge-primary")
///     .attr("title", "a \"quoted\" title")
///     .text("New & shiny")
///     .build();
///
/// assert_eq!(
///     html,
///     r#"<span class="badge badge-primary" title="a &quot;quoted&quot; title">New &amp; shiny</span>"#
/// );
/// ```
#[derive(Clone, Debug)]
pub struct Tag {
    name: &'static str,
    classes: ClassList,
    attrs: Vec<(String, Option<String>)>,
    children: String,
}

impl Tag {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            classes: ClassList::new(),
            attrs: Vec::new(),
            children: String::new(),
        }
    }

    pub fn class(mut self, classes: &str) -> Self {
        self.classes.add(classes);
        self
    }

    pub fn classes(mut self, list: &ClassList) -> Self {
        self.classes.add(&list.to_attr());
        self
    }

    /// Attribute with an escaped value
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), Some(escape_attr(value))));
        self
    }

    /// Valueless attribute (`hidden`, `open`, ...)
    pub fn flag(mut self, name: &str) -> Self {
        self.attrs.push((name.to_string(), None));
        self
    }

    /// Escaped text child
    pub fn text(mut self, text: &str) -> Self {
        self.children.push_str(&escape_text(text));
        self
    }

    /// Pre-built markup child, inserted as-is
    pub fn raw(mut self, markup: &str) -> Self {
        self.children.push_str(markup);
        self
    }

    pub fn child(mut self, tag: Tag) -> Self {
        self.children.push_str(&tag.build());
        self
    }

    pub fn build(self) -> String {
        let mut out = String::with_capacity(32 + self.children.len());
        let _ = write!(out, "<{}", self.name);
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_attr(&self.classes.to_attr()));
        }
        for (name, value) in &self.attrs {
            match value {
                Some(value) => {
                    let _ = write!(out, " {}=\"{}\"", name, value);
                }
                None => {
                    let _ = write!(out, " {}", name);
                }
            }
        }
        if VOID_ELEMENTS.contains(&self.name) {
            out.push('>');
        } else {
            let _ = write!(out, ">{}</{}>", self.children, self.name);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_list_dedup_and_order() {
        let mut classes = ClassList::with("badge");
        classes
            .add("badge-primary badge")
            .add_if(false, "badge-outline")
            .add_if(true, "badge-lg");

        assert_eq!(classes.to_attr(), "badge badge-primary badge-lg");
        assert!(classes.contains("badge-lg"));
        assert!(!classes.contains("badge-outline"));
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_text("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");
        assert_eq!(escape_attr("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn test_nested_tags_and_flags() {
        let html = Tag::new("div")
            .class("card")
            .flag("hidden")
            .child(Tag::new("h2").class("card-title").text("Hi"))
            .raw("<p>ok</p>")
            .build();

        assert_eq!(
            html,
            r#"<div class="card" hidden><h2 class="card-title">Hi</h2><p>ok</p></div>"#
        );
        assert_eq!(Tag::new("img").attr("src", "a.png").build(), r#"<img src="a.png">"#);
    }
}
