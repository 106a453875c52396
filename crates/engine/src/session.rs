//! Session glue between the controller, a provider, and the Tokio runtime.
//!
//! A [`TrialSession`] owns the completion channel. Fetch results are applied
//! one at a time on the session's own task, so the controller never needs a
//! lock.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time::timeout,
};
use tracing::{debug, warn};
use trialview_types::{DisplayState, Selection};
use trialview_util::ViewerConfig;

use crate::{
    artifacts::ArtifactStore,
    controller::TrialStatusController,
    dispatch::run_effects,
    effect::FetchCompletion,
    provider::StatusProvider,
};

/// Timing knobs for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Bound for each artifact fetch; `None` waits indefinitely.
    pub fetch_timeout: Option<Duration>,
    /// How long [`TrialSession::settle`] waits for outstanding fetches.
    pub settle_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

impl From<&ViewerConfig> for SessionConfig {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            fetch_timeout: config.fetch_timeout(),
            settle_timeout: config.settle_timeout(),
        }
    }
}

pub struct TrialSession {
    controller: TrialStatusController,
    provider: Arc<dyn StatusProvider>,
    completions_tx: UnboundedSender<FetchCompletion>,
    completions_rx: UnboundedReceiver<FetchCompletion>,
    config: SessionConfig,
}

impl TrialSession {
    pub fn new(provider: Arc<dyn StatusProvider>, config: SessionConfig) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            controller: TrialStatusController::new(),
            provider,
            completions_tx,
            completions_rx,
            config,
        }
    }

    pub fn provider(&self) -> &Arc<dyn StatusProvider> {
        &self.provider
    }

    pub fn controller(&self) -> &TrialStatusController {
        &self.controller
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        self.controller.artifacts()
    }

    /// Evaluate `selection` and dispatch any fetches the evaluation requires.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn observe(&mut self, selection: &Selection) -> DisplayState {
        self.drain();
        let observation = self.controller.observe(selection, self.provider.as_ref());
        if !observation.effects.is_empty() {
            run_effects(
                observation.effects,
                Arc::clone(&self.provider),
                self.completions_tx.clone(),
                self.config.fetch_timeout,
            );
        }
        observation.state
    }

    /// Trigger the process action for `state`, if it offers one.
    ///
    /// The returned handle only exists so callers can wait for the command to
    /// reach the provider; dropping it keeps the call fire-and-forget.
    pub fn process(&self, state: &DisplayState) -> Option<JoinHandle<()>> {
        let effect = self.controller.process_action(state)?;
        run_effects(vec![effect], Arc::clone(&self.provider), self.completions_tx.clone(), None).pop()
    }

    /// Apply every completion that has already arrived. Returns how many were
    /// current.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            if self.controller.apply(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait until no fetch for the current selection is pending.
    ///
    /// Returns `false` when the settle timeout elapsed first; whatever loaded
    /// by then stays in place.
    pub async fn settle(&mut self) -> bool {
        let settle_timeout = self.config.settle_timeout;
        let controller = &mut self.controller;
        let completions_rx = &mut self.completions_rx;
        let drained = timeout(settle_timeout, async {
            while controller.artifacts().is_pending() {
                match completions_rx.recv().await {
                    Some(completion) => {
                        controller.apply(completion);
                    }
                    None => break,
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                settle_timeout_ms = u64::try_from(settle_timeout.as_millis()).unwrap_or(u64::MAX),
                "artifact fetches still pending after settle timeout"
            );
            return false;
        }
        debug!(generation = self.controller.generation(), "artifacts settled");
        true
    }
}
