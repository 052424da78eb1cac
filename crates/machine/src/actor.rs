//! Picker actor: owns one snapshot, serializes its inbox through the pure
//! transition function and executes the resulting effects.

use std::sync::Arc;
use std::time::Instant;

use picker_api::{report_invoke_error, Handlers, InvokeError, NotificationSink};
use picker_core::{ResourceSettings, Selection, Tunables, UiSettings};
use rustc_hash::FxHashMap;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::context::PickerSnapshot;
use crate::event::{Effect, PageMode, PickerEvent, PickerInput};
use crate::id::PickerId;
use crate::transition::{Outcome, PickerMachine};

/// Complete configuration of one picker: the resource-type preset merged with
/// the staged UI choices.
#[derive(Debug, Clone)]
pub struct PickerSetup {
    pub resource: ResourceSettings,
    pub ui: UiSettings,
    pub handlers: Handlers,
    pub tunables: Tunables,
}

/// Finished selection round, addressed to the picker's parent.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionReport {
    pub sender: PickerId,
    pub selection: Selection,
    pub resource: ResourceSettings,
}

/// Handle to a running picker. Cheap to clone; sends to a stopped picker are dropped.
#[derive(Debug, Clone)]
pub struct PickerRef {
    id: PickerId,
    tx: mpsc::UnboundedSender<PickerInput>,
    state: watch::Receiver<PickerSnapshot>,
    cancel: CancellationToken,
}

impl PickerRef {
    pub fn id(&self) -> &PickerId { &self.id }

    /// Deliver an event. Returns false when the picker is no longer running.
    pub fn send(&self, event: PickerEvent) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.tx.send(PickerInput::Event(event)).is_ok()
    }

    pub fn snapshot(&self) -> PickerSnapshot { self.state.borrow().clone() }

    /// Wait until the published snapshot satisfies `pred`. `None` once the picker is gone.
    pub async fn wait_for(&self, pred: impl FnMut(&PickerSnapshot) -> bool) -> Option<PickerSnapshot> {
        let mut rx = self.state.clone();
        let snap = rx.wait_for(pred).await.ok().map(|s| s.clone());
        snap
    }

    /// Terminate the picker together with its outstanding fetches and timers.
    pub fn stop(&self) { self.cancel.cancel(); }

    pub fn is_stopped(&self) -> bool { self.cancel.is_cancelled() }
}

/// Start a picker actor on the current runtime.
///
/// The actor stops when `parent_token` (or its own token, via [`PickerRef::stop`])
/// is cancelled. Selection reports go to `parent` when one is given.
pub fn spawn_picker(
    id: PickerId,
    setup: PickerSetup,
    parent: Option<mpsc::UnboundedSender<SelectionReport>>,
    notifier: Arc<dyn NotificationSink>,
    parent_token: &CancellationToken,
) -> (PickerRef, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let snapshot = PickerSnapshot::initial(setup.resource, setup.ui, &setup.tunables);
    let (state_tx, state_rx) = watch::channel(snapshot.clone());
    let cancel = parent_token.child_token();

    let actor = PickerActor {
        id: id.clone(),
        machine: PickerMachine::new(&setup.tunables),
        handlers: setup.handlers,
        snapshot,
        state_tx,
        self_tx: tx.clone(),
        parent,
        notifier,
        cancel: cancel.clone(),
        inflight: FxHashMap::default(),
    };
    info!(picker = %id, resource_type = %setup.resource.resource_type, "picker: started");
    let join = tokio::spawn(actor.run(rx));
    (PickerRef { id, tx, state: state_rx, cancel }, join)
}

struct PickerActor {
    id: PickerId,
    machine: PickerMachine,
    handlers: Handlers,
    snapshot: PickerSnapshot,
    state_tx: watch::Sender<PickerSnapshot>,
    self_tx: mpsc::UnboundedSender<PickerInput>,
    parent: Option<mpsc::UnboundedSender<SelectionReport>>,
    notifier: Arc<dyn NotificationSink>,
    cancel: CancellationToken,
    /// Child tokens of running fetches and timers, keyed by their stamp.
    inflight: FxHashMap<u64, CancellationToken>,
}

impl PickerActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<PickerInput>) {
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                maybe = rx.recv() => match maybe {
                    Some(input) => self.dispatch(input),
                    None => break,
                },
            }
        }
        rx.close();
        for (_, token) in self.inflight.drain() {
            token.cancel();
        }
        info!(picker = %self.id, "picker: stopped");
    }

    fn dispatch(&mut self, input: PickerInput) {
        match &input {
            PickerInput::FiltersLoaded { request, .. } | PickerInput::PageLoaded { request, .. } => {
                self.inflight.remove(&request.0);
            }
            PickerInput::TimerFired { timer } => {
                self.inflight.remove(&timer.0);
            }
            PickerInput::Event(_) => {}
        }
        let name = input.name();
        let step = match self.machine.transition(&self.snapshot, input) {
            Ok(step) => step,
            Err(e) => {
                error!(picker = %self.id, state = %self.snapshot.state, error = %e, "picker: invariant violated");
                return;
            }
        };
        match step.outcome {
            Outcome::Dropped => {
                debug!(picker = %self.id, state = %self.snapshot.state, event = name, "picker: no transition, dropped");
                metrics::counter!("picker_events_dropped_total", 1u64, "event" => name);
                return;
            }
            Outcome::Stale => {
                debug!(picker = %self.id, state = %self.snapshot.state, input = name, "picker: stale resolution ignored");
                metrics::counter!("picker_stale_responses_total", 1u64);
                return;
            }
            Outcome::Applied => {}
        }
        debug!(picker = %self.id, event = name, from = %self.snapshot.state, to = %step.snapshot.state, effects = step.effects.len(), "picker: transition");
        metrics::counter!("picker_transitions_total", 1u64, "event" => name);
        self.snapshot = step.snapshot;
        self.state_tx.send_replace(self.snapshot.clone());
        for effect in step.effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        trace!(picker = %self.id, ?effect, "picker: effect");
        match effect {
            Effect::FetchFilters { request, resource_type } => {
                let Some(handler) = self.handlers.filters().cloned() else {
                    let err = InvokeError::Message(format!("filters not implemented for {resource_type} resources"));
                    let _ = self.self_tx.send(PickerInput::FiltersLoaded { request, result: Err(err) });
                    return;
                };
                let token = self.track(request.0);
                let tx = self.self_tx.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {}
                        result = handler.filters(resource_type) => {
                            let _ = tx.send(PickerInput::FiltersLoaded { request, result });
                        }
                    }
                });
            }
            Effect::FetchPage { request, query, mode } => {
                let handler = Arc::clone(self.handlers.search());
                let token = self.track(request.0);
                let tx = self.self_tx.clone();
                let id = self.id.clone();
                debug!(picker = %id, %request, namespace = %handler.namespace(), "picker: page fetch");
                let mode = match mode {
                    PageMode::Replace => "replace",
                    PageMode::Append => "append",
                };
                tokio::spawn(async move {
                    let t0 = Instant::now();
                    tokio::select! {
                        _ = token.cancelled() => {
                            debug!(picker = %id, %request, "picker: fetch cancelled");
                        }
                        result = handler.search(query) => {
                            let ms = t0.elapsed().as_secs_f64() * 1000.0;
                            metrics::histogram!("picker_fetch_ms", ms, "mode" => mode);
                            let _ = tx.send(PickerInput::PageLoaded { request, result });
                        }
                    }
                });
            }
            Effect::StartTimer { timer, after } => {
                let token = self.track(timer.0);
                let tx = self.self_tx.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {}
                        _ = tokio::time::sleep(after) => {
                            let _ = tx.send(PickerInput::TimerFired { timer });
                        }
                    }
                });
            }
            Effect::CancelTimer { timer } => self.untrack(timer.0),
            Effect::CancelRequest { request } => self.untrack(request.0),
            Effect::Notify(err) => report_invoke_error(self.notifier.as_ref(), &err),
            Effect::EmitSelection { selection, resource } => {
                info!(picker = %self.id, items = selection.len(), "picker: selection done");
                match &self.parent {
                    Some(parent) => {
                        let report = SelectionReport { sender: self.id.clone(), selection, resource };
                        if parent.send(report).is_err() {
                            debug!(picker = %self.id, "picker: parent gone; selection dropped");
                        }
                    }
                    None => debug!(picker = %self.id, "picker: no parent; selection dropped"),
                }
            }
        }
    }

    fn track(&mut self, stamp: u64) -> CancellationToken {
        let token = self.cancel.child_token();
        self.inflight.insert(stamp, token.clone());
        token
    }

    fn untrack(&mut self, stamp: u64) {
        if let Some(token) = self.inflight.remove(&stamp) {
            token.cancel();
        }
    }
}
