//! Root actor: routes open/kill/spawn commands to pickers and records the
//! selections they report back. Readers observe it through [`RootView`] snapshots.

use std::sync::Arc;

use arc_swap::ArcSwap;
use picker_api::{Notification, NotificationSink, Sources};
use picker_core::{ResourceSettings, Selection, Tunables, UiSettings};
use picker_machine::{spawn_picker, PickerEvent, PickerId, PickerRef, PickerSetup, SelectionReport};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::RootError;
use crate::form::{SpawnForm, SpawnFormEdit};
use crate::registry::{PickerEntry, Registry};

#[derive(Debug)]
pub enum RootCommand {
    Spawn { reply: Option<oneshot::Sender<PickerId>> },
    Open { id: PickerId },
    Kill { id: PickerId },
    EditForm(SpawnFormEdit),
}

/// Registry row as seen by readers.
#[derive(Debug, Clone)]
pub struct PickerView {
    pub id: PickerId,
    pub picker: PickerRef,
    pub resource: ResourceSettings,
    pub ui: UiSettings,
    pub selection: Selection,
}

/// Immutable picture of the root state, swapped after every change.
#[derive(Debug, Clone, Default)]
pub struct RootView {
    pub epoch: u64,
    pub form: SpawnForm,
    /// Pickers in spawn order.
    pub pickers: Vec<PickerView>,
}

impl RootView {
    pub fn get(&self, id: &PickerId) -> Option<&PickerView> { self.pickers.iter().find(|p| &p.id == id) }

    pub fn contains(&self, id: &PickerId) -> bool { self.get(id).is_some() }
}

/// Handle to the root actor. Every operation is fire-and-forget except `spawn`,
/// which waits for the allocated id.
#[derive(Clone)]
pub struct RootHandle {
    tx: mpsc::UnboundedSender<RootCommand>,
    view: Arc<ArcSwap<RootView>>,
    epoch_rx: watch::Receiver<u64>,
    cancel: CancellationToken,
}

impl RootHandle {
    pub async fn spawn(&self) -> Result<PickerId, RootError> {
        let (reply, rx) = oneshot::channel();
        self.send(RootCommand::Spawn { reply: Some(reply) })?;
        rx.await.map_err(|_| RootError::Stopped)
    }

    pub fn open(&self, id: &PickerId) -> Result<(), RootError> {
        self.send(RootCommand::Open { id: id.clone() })
    }

    pub fn kill(&self, id: &PickerId) -> Result<(), RootError> {
        self.send(RootCommand::Kill { id: id.clone() })
    }

    pub fn edit_form(&self, edit: SpawnFormEdit) -> Result<(), RootError> {
        self.send(RootCommand::EditForm(edit))
    }

    pub fn send(&self, cmd: RootCommand) -> Result<(), RootError> {
        self.tx.send(cmd).map_err(|_| RootError::Stopped)
    }

    pub fn current(&self) -> Arc<RootView> { self.view.load_full() }

    pub fn subscribe_epoch(&self) -> watch::Receiver<u64> { self.epoch_rx.clone() }

    /// Handle of a registered picker, for driving it directly.
    pub fn picker(&self, id: &PickerId) -> Option<PickerRef> {
        self.current().get(id).map(|p| p.picker.clone())
    }

    /// Wait until a published view satisfies `pred`. `None` once the root is gone.
    pub async fn wait_for(&self, mut pred: impl FnMut(&RootView) -> bool) -> Option<Arc<RootView>> {
        let mut rx = self.epoch_rx.clone();
        loop {
            rx.borrow_and_update();
            let view = self.current();
            if pred(&view) {
                return Some(view);
            }
            rx.changed().await.ok()?;
        }
    }

    /// Stop the root actor and every picker it spawned.
    pub fn shutdown(&self) { self.cancel.cancel(); }
}

/// Start the root actor. Pickers it spawns take their handlers from `sources`
/// and report notifications to `notifier`.
pub fn spawn_root(sources: Sources, tunables: Tunables, notifier: Arc<dyn NotificationSink>) -> RootHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let (reports_tx, reports_rx) = mpsc::unbounded_channel();
    let view = Arc::new(ArcSwap::from_pointee(RootView::default()));
    let (epoch_tx, epoch_rx) = watch::channel(0u64);
    let cancel = CancellationToken::new();

    let mut actor = RootActor {
        form: SpawnForm::default(),
        registry: Registry::default(),
        sources,
        tunables,
        notifier,
        reports_tx,
        cancel: cancel.clone(),
        view: Arc::clone(&view),
        epoch_tx,
        epoch: 0,
    };
    actor.publish();
    tokio::spawn(actor.run(rx, reports_rx));
    RootHandle { tx, view, epoch_rx, cancel }
}

struct RootActor {
    form: SpawnForm,
    registry: Registry,
    sources: Sources,
    tunables: Tunables,
    notifier: Arc<dyn NotificationSink>,
    reports_tx: mpsc::UnboundedSender<SelectionReport>,
    cancel: CancellationToken,
    view: Arc<ArcSwap<RootView>>,
    epoch_tx: watch::Sender<u64>,
    epoch: u64,
}

impl RootActor {
    async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<RootCommand>,
        mut reports: mpsc::UnboundedReceiver<SelectionReport>,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                maybe = rx.recv() => match maybe {
                    Some(cmd) => self.handle(cmd),
                    None => {
                        debug!("root: command channel closed");
                        break;
                    }
                },
                Some(report) = reports.recv() => self.on_selected(report),
            }
        }
        self.cancel.cancel();
        let entries: Vec<_> = self.registry.drain().collect();
        for (id, entry) in entries {
            entry.picker.stop();
            if entry.join.await.is_err() {
                debug!(picker = %id, "root: picker task panicked");
            }
        }
        info!("root: stopped");
    }

    fn handle(&mut self, cmd: RootCommand) {
        match cmd {
            RootCommand::Spawn { reply } => {
                let id = self.spawn_picker();
                if let Some(reply) = reply {
                    let _ = reply.send(id);
                }
            }
            RootCommand::Open { id } => self.open(&id),
            RootCommand::Kill { id } => self.kill(&id),
            RootCommand::EditForm(edit) => {
                debug!(path = edit.path(), ?edit, "root: spawn form edited");
                self.form.apply(edit);
                self.publish();
            }
        }
    }

    fn spawn_picker(&mut self) -> PickerId {
        let id = PickerId::generate();
        let preset = self.sources.preset(self.form.resource_type);
        let resource = ResourceSettings::new(preset.resource_type, self.form.resource_selection_type);
        let setup = PickerSetup {
            resource,
            ui: self.form.ui_settings,
            handlers: preset.handlers,
            tunables: self.tunables.clone(),
        };
        let (picker, join) = spawn_picker(
            id.clone(),
            setup,
            Some(self.reports_tx.clone()),
            Arc::clone(&self.notifier),
            &self.cancel,
        );
        self.registry.insert(
            id.clone(),
            PickerEntry { picker, resource, ui: self.form.ui_settings, selection: Selection::new(), join },
        );
        info!(picker = %id, resource_type = %resource.resource_type, selection_type = ?resource.selection_type, "root: picker spawned");
        metrics::counter!("root_pickers_spawned_total", 1u64, "resource_type" => resource.resource_type.as_str());
        metrics::gauge!("root_pickers", self.registry.len() as f64);
        self.notifier.notify(Notification::success("Resource picker spawned from root actor"));
        self.publish();
        id
    }

    fn open(&mut self, id: &PickerId) {
        let Some(entry) = self.registry.get(id) else {
            debug!(picker = %id, "root: open for unknown picker ignored");
            return;
        };
        let selection = entry.selection.clone();
        let items = selection.len();
        // An already open picker drops the event, so it gets no toast either.
        let was_open = entry.picker.snapshot().state.is_open();
        if !entry.picker.send(PickerEvent::Open { selection: Some(selection) }) {
            return;
        }
        if was_open {
            debug!(picker = %id, "root: picker already open");
            return;
        }
        info!(picker = %id, seeded = items, "root: picker opened");
        self.notifier.notify(Notification::success(format!("Resource picker {id} opened from root actor")));
    }

    fn kill(&mut self, id: &PickerId) {
        let Some(entry) = self.registry.remove(id) else {
            debug!(picker = %id, "root: kill for unknown picker ignored");
            return;
        };
        entry.picker.stop();
        info!(picker = %id, "root: picker killed");
        metrics::counter!("root_pickers_killed_total", 1u64);
        metrics::gauge!("root_pickers", self.registry.len() as f64);
        if self.registry.is_empty() {
            debug!("root: no pickers left");
        }
        self.notifier.notify(Notification::error(format!("Resource Picker {id} killed from root actor")));
        self.publish();
    }

    fn on_selected(&mut self, report: SelectionReport) {
        let SelectionReport { sender, selection, resource } = report;
        let items = selection.len();
        if !self.registry.record_selection(&sender, selection) {
            debug!(picker = %sender, "root: selection from unknown picker dropped");
            return;
        }
        info!(picker = %sender, items, resource_type = %resource.resource_type, "root: items selected");
        self.notifier.notify(Notification::success(format!(
            "Root actor received the selected items ids from {sender}"
        )));
        self.publish();
    }

    fn publish(&mut self) {
        self.epoch = self.epoch.saturating_add(1);
        let epoch = self.epoch;
        let pickers = self
            .registry
            .iter()
            .map(|(id, e)| PickerView {
                id: id.clone(),
                picker: e.picker.clone(),
                resource: e.resource,
                ui: e.ui,
                selection: e.selection.clone(),
            })
            .collect();
        self.view.store(Arc::new(RootView { epoch, form: self.form, pickers }));
        self.epoch_tx.send_replace(epoch);
    }
}
