//! # Effect Dispatch
//!
//! Translates controller [`Effect`]s into provider calls on background Tokio
//! tasks. This is the boundary where the pure controller meets I/O:
//! - artifact fetches are bounded by an optional timeout and their outcome is
//!   sent back over the completion channel, tagged with the issuing ticket;
//! - the processing command is fire-and-forget: failures are logged and never
//!   reported back.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tracing::{debug, info, warn};
use trialview_types::ArtifactError;

use crate::{
    effect::{ArtifactOutcome, Effect, FetchCompletion, FetchTicket},
    provider::StatusProvider,
};

/// Spawn one task per effect. Must be called from within a Tokio runtime.
pub fn run_effects(
    effects: Vec<Effect>,
    provider: Arc<dyn StatusProvider>,
    completions: UnboundedSender<FetchCompletion>,
    fetch_timeout: Option<Duration>,
) -> Vec<JoinHandle<()>> {
    effects
        .into_iter()
        .map(|effect| run_effect(effect, Arc::clone(&provider), completions.clone(), fetch_timeout))
        .collect()
}

fn run_effect(
    effect: Effect,
    provider: Arc<dyn StatusProvider>,
    completions: UnboundedSender<FetchCompletion>,
    fetch_timeout: Option<Duration>,
) -> JoinHandle<()> {
    match effect {
        Effect::FetchLog(ticket) => tokio::spawn(async move {
            let result = bounded(fetch_timeout, provider.get_log_text(&ticket.key)).await;
            send_completion(&completions, ticket, ArtifactOutcome::Log(result));
        }),
        Effect::FetchResults(ticket) => tokio::spawn(async move {
            let result = bounded(fetch_timeout, provider.get_results_text(&ticket.key)).await;
            send_completion(&completions, ticket, ArtifactOutcome::Results(result));
        }),
        Effect::MarkReadyForProcessing { key } => tokio::spawn(async move {
            match provider.mark_ready_for_processing(&key).await {
                Ok(()) => info!(trial = %key, "processing requested"),
                Err(error) => warn!(trial = %key, error = %error, "processing request failed"),
            }
        }),
    }
}

async fn bounded<F>(limit: Option<Duration>, fetch: F) -> Result<String, ArtifactError>
where
    F: Future<Output = Result<String, ArtifactError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fetch)
            .await
            .unwrap_or_else(|_| {
                Err(ArtifactError::Timeout {
                    millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })
            }),
        None => fetch.await,
    }
}

fn send_completion(completions: &UnboundedSender<FetchCompletion>, ticket: FetchTicket, outcome: ArtifactOutcome) {
    if completions.send(FetchCompletion::new(ticket, outcome)).is_err() {
        debug!("completion receiver dropped; discarding artifact fetch result");
    }
}
