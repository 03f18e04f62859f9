//! Post-render enhancement
//!
//! After a widget replaces its markup, the reactive-binding framework is
//! asked to reprocess the new subtree so declarative bindings inside it come
//! alive. Rendering has already happened at that point, so a failure here
//! only degrades live bindings: it is retried once after a fixed delay and
//! then logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use crate::error::EnhanceError;

/// Reprocesses a freshly rendered subtree
pub trait Enhancer: Send + Sync + 'static {
    fn enhance(&self, tag: &'static str, markup: &str) -> Result<(), EnhanceError>;
}

impl<F> Enhancer for F
where
    F: Fn(&'static str, &str) -> Result<(), EnhanceError> + Send + Sync + 'static,
{
    fn enhance(&self, tag: &'static str, markup: &str) -> Result<(), EnhanceError> {
        self(tag, markup)
    }
}

/// Enhancer for hosts with nothing to reprocess
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEnhancer;

impl Enhancer for NoopEnhancer {
    fn enhance(&self, _tag: &'static str, _markup: &str) -> Result<(), EnhanceError> {
        Ok(())
    }
}

/// What happened to one enhancement request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnhanceOutcome {
    /// First attempt succeeded
    Enhanced,
    /// First attempt failed; one retry is scheduled on the runtime
    RetryScheduled,
    /// First attempt failed and no runtime was available to retry on
    Dropped,
}

/// Run the enhancer with the single-retry policy
pub fn enhance_with_retry(
    enhancer: &Arc<dyn Enhancer>,
    tag: &'static str,
    markup: &str,
    retry_delay: Duration,
) -> EnhanceOutcome {
    let Err(first) = enhancer.enhance(tag, markup) else {
        return EnhanceOutcome::Enhanced;
    };
    tracing::debug!("{}; retrying in {:?}", first, retry_delay);

    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!("{}; no runtime to retry on, live bindings disabled", first);
        return EnhanceOutcome::Dropped;
    };

    let enhancer = Arc::clone(enhancer);
    let markup = markup.to_string();
    runtime.spawn(async move {
        tokio::time::sleep(retry_delay).await;
        if let Err(err) = enhancer.enhance(tag, &markup) {
            tracing::warn!("{} after retry, live bindings disabled", err);
        }
    });
    EnhanceOutcome::RetryScheduled
}
