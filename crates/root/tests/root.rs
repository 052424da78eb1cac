use std::sync::{Arc, Mutex};
use std::time::Duration;

use picker_api::{Level, Notification, NotificationSink, Sources, ToastQueue};
use picker_catalog::FixtureCatalog;
use picker_core::{ModalSize, ResourceType, SelectionType, Tunables};
use picker_machine::{PickerEvent, PickerState};
use picker_root::{spawn_root, RootHandle, SpawnFormEdit};
use picker_search::{demo, LibrarySource};

fn root() -> (RootHandle, Arc<ToastQueue>) {
    let sources = Sources::new(
        Arc::new(LibrarySource::new(demo::static_images(25))),
        Arc::new(FixtureCatalog::demo(5, 5)),
    );
    let toasts = Arc::new(ToastQueue::new());
    let sink: Arc<dyn NotificationSink> = toasts.clone();
    (spawn_root(sources, Tunables::default(), sink), toasts)
}

fn messages(toasts: &ToastQueue) -> Vec<String> {
    toasts.visible().into_iter().map(|n| n.message).collect()
}

#[tokio::test(start_paused = true)]
async fn spawn_uses_the_staged_form() {
    let (root, _toasts) = root();
    root.edit_form(SpawnFormEdit::ResourceType(ResourceType::Collection)).unwrap();
    root.edit_form(SpawnFormEdit::SelectionType(SelectionType::Single)).unwrap();
    root.edit_form(SpawnFormEdit::ModalSize(ModalSize::Fullscreen)).unwrap();
    let id = root.spawn().await.unwrap();

    let view = root.current();
    let entry = view.get(&id).unwrap();
    assert_eq!(entry.resource.resource_type, ResourceType::Collection);
    assert_eq!(entry.resource.selection_type, SelectionType::Single);
    assert_eq!(entry.ui.modal_size, ModalSize::Fullscreen);
    assert!(entry.selection.is_empty());
    assert_eq!(view.form.ui_settings.modal_size, ModalSize::Fullscreen);
}

#[tokio::test(start_paused = true)]
async fn killed_picker_is_gone_and_open_is_a_no_op() {
    let (root, toasts) = root();
    let id = root.spawn().await.unwrap();
    let picker = root.picker(&id).unwrap();

    root.kill(&id).unwrap();
    root.wait_for(|v| !v.contains(&id)).await.unwrap();
    root.open(&id).unwrap();
    root.kill(&id).unwrap();
    let other = root.spawn().await.unwrap();

    let view = root.current();
    assert_eq!(view.pickers.len(), 1);
    assert_eq!(view.pickers[0].id, other);
    assert!(picker.is_stopped());
    assert!(!picker.send(PickerEvent::Close));
    assert_eq!(picker.snapshot().state, PickerState::Closed);

    let errors: Vec<_> = toasts.visible().into_iter().filter(|n| n.level == Level::Error).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("killed"));
    assert!(!messages(&toasts).iter().any(|m| m.contains("opened")));
}

#[tokio::test(start_paused = true)]
async fn reopening_seeds_the_last_reported_selection() {
    let (root, toasts) = root();
    root.edit_form(SpawnFormEdit::ResourceType(ResourceType::LibraryStaticImage)).unwrap();
    let id = root.spawn().await.unwrap();
    let picker = root.picker(&id).unwrap();

    root.open(&id).unwrap();
    picker.wait_for(|s| s.state == PickerState::SELECTING).await.unwrap();
    picker.send(PickerEvent::Select { id: "img-001".into() });
    picker.send(PickerEvent::Select { id: "img-002".into() });
    picker.send(PickerEvent::Done);

    let view = root.wait_for(|v| v.get(&id).is_some_and(|p| p.selection.len() == 2)).await.unwrap();
    let recorded = view.get(&id).unwrap().selection.clone();
    assert_eq!(recorded.ids().collect::<Vec<_>>(), vec!["img-001", "img-002"]);
    assert!(picker.snapshot().context.selection.is_empty());

    root.open(&id).unwrap();
    let snap = picker
        .wait_for(|s| s.state == PickerState::SELECTING && !s.context.selection.is_empty())
        .await
        .unwrap();
    assert_eq!(snap.context.selection, recorded);
    assert!(messages(&toasts).iter().any(|m| m.starts_with("Root actor received the selected items ids from")));
}

#[tokio::test(start_paused = true)]
async fn selection_from_a_killed_picker_is_dropped() {
    let (root, toasts) = root();
    root.edit_form(SpawnFormEdit::ResourceType(ResourceType::Product)).unwrap();
    root.edit_form(SpawnFormEdit::SelectionType(SelectionType::Single)).unwrap();
    let id = root.spawn().await.unwrap();
    let picker = root.picker(&id).unwrap();
    root.open(&id).unwrap();
    picker.wait_for(|s| s.state == PickerState::SELECTING).await.unwrap();

    picker.send(PickerEvent::Select { id: "gid://catalog/Product/1".into() });
    root.kill(&id).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(root.current().pickers.is_empty());
    assert!(!messages(&toasts).iter().any(|m| m.starts_with("Root actor received")));
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_every_picker() {
    let (root, _toasts) = root();
    let a = root.spawn().await.unwrap();
    let b = root.spawn().await.unwrap();
    let (pa, pb) = (root.picker(&a).unwrap(), root.picker(&b).unwrap());

    root.shutdown();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(pa.is_stopped() && pb.is_stopped());
    assert!(root.spawn().await.is_err());
}

/// Sink keeping every notification, duplicates included.
#[derive(Default)]
struct Recorder(Mutex<Vec<Notification>>);

impl NotificationSink for Recorder {
    fn notify(&self, n: Notification) { self.0.lock().unwrap().push(n); }
}

#[tokio::test(start_paused = true)]
async fn opening_an_open_picker_sends_no_second_toast() {
    let sources = Sources::new(
        Arc::new(LibrarySource::new(demo::static_images(5))),
        Arc::new(FixtureCatalog::demo(5, 5)),
    );
    let recorder = Arc::new(Recorder::default());
    let root = spawn_root(sources, Tunables::default(), recorder.clone());
    let id = root.spawn().await.unwrap();
    let picker = root.picker(&id).unwrap();

    root.open(&id).unwrap();
    picker.wait_for(|s| s.state == PickerState::SELECTING).await.unwrap();
    root.open(&id).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let opened = recorder.0.lock().unwrap().iter().filter(|n| n.message.contains("opened")).count();
    assert_eq!(opened, 1);
    assert!(picker.snapshot().state.is_open());
}
