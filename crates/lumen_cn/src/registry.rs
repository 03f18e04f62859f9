//! Component registry
//!
//! Maps custom element tags to constructors producing type-erased
//! [`AnyElement`]s, so hosts (and the demo harness) can instantiate widgets
//! from markup-like input without naming their types.

use std::sync::Arc;

use indexmap::IndexMap;
use lumen_core::{
    AnyElement, AttributeKey, AttributeMap, Element, Enhancer, LumenConfig, LumenError,
    ReadinessGate, Result, Widget,
};
use smallvec::SmallVec;

use crate::components::{Badge, Breadcrumb, Card, Collapsible, Countdown, Dialog, Swap};

/// Names the HTML standard reserves even though they contain a hyphen
const RESERVED_NAMES: [&str; 8] = [
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// Host-wide settings applied to every created element
#[derive(Clone, Default)]
pub struct HostOptions {
    /// Gate elements wait on; `None` means already open
    pub gate: Option<ReadinessGate>,
    pub enhancer: Option<Arc<dyn Enhancer>>,
    pub config: LumenConfig,
}

impl HostOptions {
    pub fn new(config: LumenConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn gate(mut self, gate: ReadinessGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn enhancer(mut self, enhancer: Arc<dyn Enhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }
}

type Constructor = Box<dyn Fn(AttributeMap, &HostOptions) -> Box<dyn AnyElement> + Send + Sync>;

struct Definition {
    observed: SmallVec<[&'static str; 16]>,
    construct: Constructor,
}

/// Tag -> constructor table
#[derive(Default)]
pub struct ComponentRegistry {
    definitions: IndexMap<&'static str, Definition>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in component
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let defaults: [Result<()>; 7] = [
            registry.define(|_| Badge),
            registry.define(|_| Breadcrumb::default()),
            registry.define(|_| Card),
            registry.define(|_| Collapsible::default()),
            registry.define(|options| {
                Countdown::new().tick_interval(options.config.countdown.tick_interval())
            }),
            registry.define(|_| Dialog),
            registry.define(|_| Swap),
        ];
        for result in defaults {
            if let Err(err) = result {
                tracing::error!("built-in component rejected: {}", err);
            }
        }
        registry
    }

    /// Register `W` under `W::TAG`
    pub fn define<W, F>(&mut self, factory: F) -> Result<()>
    where
        W: Widget,
        F: Fn(&HostOptions) -> W + Send + Sync + 'static,
    {
        let tag = W::TAG;
        if !is_valid_name(tag) {
            return Err(LumenError::InvalidTag(tag.to_string()));
        }
        if self.definitions.contains_key(tag) {
            return Err(LumenError::AlreadyDefined(tag.to_string()));
        }

        let construct: Constructor = Box::new(move |attributes, options| {
            let mut builder = Element::builder(factory(options))
                .attributes(attributes)
                .config(&options.config);
            if let Some(gate) = &options.gate {
                builder = builder.gate(gate.clone());
            }
            if let Some(enhancer) = &options.enhancer {
                builder = builder.shared_enhancer(enhancer.clone());
            }
            Box::new(builder.build())
        });

        tracing::debug!("defined <{}>", tag);
        self.definitions.insert(
            tag,
            Definition {
                observed: W::Attr::observed(),
                construct,
            },
        );
        Ok(())
    }

    /// Instantiate a registered tag with initial attributes
    pub fn create(
        &self,
        tag: &str,
        attributes: AttributeMap,
        options: &HostOptions,
    ) -> Result<Box<dyn AnyElement>> {
        let definition = self
            .definitions
            .get(tag)
            .ok_or_else(|| LumenError::UnknownTag(tag.to_string()))?;
        Ok((definition.construct)(attributes, options))
    }

    pub fn is_defined(&self, tag: &str) -> bool {
        self.definitions.contains_key(tag)
    }

    /// Registered tags in definition order
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.definitions.keys().copied()
    }

    pub fn observed_attributes(&self, tag: &str) -> Option<&[&'static str]> {
        self.definitions
            .get(tag)
            .map(|definition| definition.observed.as_slice())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Custom element name rules: lowercase first letter, a hyphen, not reserved
pub fn is_valid_name(name: &str) -> bool {
    if !name.contains('-') {
        return false;
    }
    if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
        return false;
    }
    if name.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace()) {
        return false;
    }
    !RESERVED_NAMES.contains(&name)
}
