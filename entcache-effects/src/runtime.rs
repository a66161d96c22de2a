//! Runs the effects as background tasks.
//!
//! ```text
//!            dispatch                       persist queue (FIFO)
//! caller ──► [input] ──► resolver task ──► [queue] ──► pipeline task
//!                           │                              │
//!                           └── resolved deletes ──► [output] ◄── results
//! ```
//!
//! The pipeline task holds a single slot: it receives one action, awaits
//! its persistence, sends the derived action, and only then receives the
//! next. Actions that are neither persist ops nor delete intents are for
//! the reducer alone and produce nothing here.
//!
//! The input and persist queues are bounded, so `dispatch` waits only for
//! the pipeline to make progress. The output is unbounded: a caller may
//! dispatch any number of actions before it starts reading results.

use entcache_actions::EntityAction;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::EffectsConfig;
use crate::error::{EffectsError, EffectsResult};
use crate::persist::EntityEffects;
use crate::pre_persist::EntityPrePersistEffects;

/// Cloneable handle for dispatching actions into a running runtime.
#[derive(Debug, Clone)]
pub struct ActionSender {
    tx: mpsc::Sender<EntityAction>,
}

impl ActionSender {
    /// Enqueues an action. Waits while the input queue is full.
    pub async fn dispatch(&self, action: EntityAction) -> EffectsResult<()> {
        self.tx
            .send(action)
            .await
            .map_err(|_| EffectsError::ChannelClosed)
    }
}

/// A running effects runtime.
pub struct EffectsHandle {
    sender: ActionSender,
    output: mpsc::UnboundedReceiver<EntityAction>,
    resolver: JoinHandle<()>,
    pipeline: JoinHandle<()>,
}

/// Starts the resolver and pipeline tasks. Must be called from within a
/// tokio runtime.
pub fn spawn_effects(
    config: &EffectsConfig,
    effects: Arc<EntityEffects>,
    pre_persist: Arc<EntityPrePersistEffects>,
) -> EffectsHandle {
    let capacity = config.queue_capacity.max(1);
    let (input_tx, input_rx) = mpsc::channel(capacity);
    let (persist_tx, persist_rx) = mpsc::channel(capacity);
    let (output_tx, output_rx) = mpsc::unbounded_channel();

    let resolver = tokio::spawn(run_resolver(
        input_rx,
        persist_tx,
        output_tx.clone(),
        pre_persist,
    ));
    let pipeline = tokio::spawn(run_pipeline(persist_rx, output_tx, effects));

    info!("Entity effects started (queue capacity {})", capacity);

    EffectsHandle {
        sender: ActionSender { tx: input_tx },
        output: output_rx,
        resolver,
        pipeline,
    }
}

impl EffectsHandle {
    /// Enqueues an action.
    pub async fn dispatch(&self, action: EntityAction) -> EffectsResult<()> {
        self.sender.dispatch(action).await
    }

    /// Returns a sender that can outlive borrows of this handle.
    pub fn sender(&self) -> ActionSender {
        self.sender.clone()
    }

    /// Receives the next derived action. `None` once the runtime has
    /// stopped and every derived action has been received.
    pub async fn next_action(&mut self) -> Option<EntityAction> {
        self.output.recv().await
    }

    /// Closes the input and waits for every queued action to be processed.
    ///
    /// Returns the derived actions that had not been received yet. Senders
    /// obtained from [`sender`](Self::sender) keep the input open; drop them
    /// first.
    pub async fn shutdown(self) -> EffectsResult<Vec<EntityAction>> {
        let Self {
            sender,
            mut output,
            resolver,
            pipeline,
        } = self;
        drop(sender);

        let mut remaining = Vec::new();
        while let Some(action) = output.recv().await {
            remaining.push(action);
        }

        resolver
            .await
            .map_err(|e| EffectsError::TaskFailed(e.to_string()))?;
        pipeline
            .await
            .map_err(|e| EffectsError::TaskFailed(e.to_string()))?;

        info!("Entity effects stopped");
        Ok(remaining)
    }
}

async fn run_resolver(
    mut input: mpsc::Receiver<EntityAction>,
    persist: mpsc::Sender<EntityAction>,
    output: mpsc::UnboundedSender<EntityAction>,
    pre_persist: Arc<EntityPrePersistEffects>,
) {
    while let Some(action) = input.recv().await {
        let op = action.entity_op();
        if op.is_delete_intent() {
            for resolved in pre_persist.pre_delete(&action).await {
                if output.send(resolved).is_err() {
                    warn!("Output closed; resolver stopping");
                    return;
                }
            }
        } else if op.is_persist_op() {
            if persist.send(action).await.is_err() {
                warn!("Persist queue closed; resolver stopping");
                return;
            }
        } else {
            debug!("No effect for {}", action.action_type());
        }
    }
}

async fn run_pipeline(
    mut queue: mpsc::Receiver<EntityAction>,
    output: mpsc::UnboundedSender<EntityAction>,
    effects: Arc<EntityEffects>,
) {
    while let Some(action) = queue.recv().await {
        let derived = effects.persist(action).await;
        if output.send(derived).is_err() {
            warn!("Output closed; pipeline stopping");
            return;
        }
    }
}
