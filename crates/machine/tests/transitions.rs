use picker_api::InvokeError;
use picker_core::{
    FilterMap, FilterSet, PageInfo, Resource, ResourceSettings, ResourceType, SearchPage, SelectionType, Tunables,
    UiSettings,
};
use picker_machine::{
    Effect, EditState, MachineError, OpenState, Outcome, PageMode, PickerEvent, PickerInput, PickerMachine,
    PickerSnapshot, PickerState, RequestId, TimerId,
};
use picker_search::demo;

struct Harness {
    machine: PickerMachine,
    snap: PickerSnapshot,
}

impl Harness {
    fn new(resource_type: ResourceType, selection: SelectionType) -> Self {
        let tunables = Tunables::default();
        Self {
            machine: PickerMachine::new(&tunables),
            snap: PickerSnapshot::initial(ResourceSettings::new(resource_type, selection), UiSettings::default(), &tunables),
        }
    }

    fn feed(&mut self, input: impl Into<PickerInput>) -> Vec<Effect> {
        let step = self.machine.transition(&self.snap, input.into()).unwrap();
        assert_eq!(step.outcome, Outcome::Applied, "input not applied in {}", self.snap.state);
        self.snap = step.snapshot;
        step.effects
    }

    fn outcome(&self, input: impl Into<PickerInput>) -> Outcome {
        self.machine.transition(&self.snap, input.into()).unwrap().outcome
    }

    fn state(&self) -> PickerState { self.snap.state }

    /// Open a library picker and resolve the filter and first page fetches.
    fn open_library(&mut self, n: usize) {
        let fx = self.feed(PickerEvent::Open { selection: None });
        let request = fetch_filters(&fx);
        let fx = self.feed(PickerInput::FiltersLoaded { request, result: Ok(tag_facets()) });
        let (request, _, _) = fetch_page(&fx);
        self.feed(PickerInput::PageLoaded { request, result: Ok(page(0, n, true)) });
        assert_eq!(self.state(), PickerState::SELECTING);
    }
}

fn tag_facets() -> FilterSet {
    let mut filters = FilterMap::new();
    filters.insert("tags".into(), vec!["red".into(), "blue".into()]);
    FilterSet { filters }
}

fn page(skip: usize, n: usize, has_next: bool) -> SearchPage {
    let items: Vec<Resource> = demo::static_images(skip + n).into_iter().skip(skip).map(Resource::Library).collect();
    SearchPage {
        page_info: PageInfo {
            has_next_page: has_next,
            has_previous_page: skip > 0,
            start_cursor: Some((skip + 1).to_string()),
            end_cursor: Some((skip + n).to_string()),
        },
        items,
    }
}

fn fetch_filters(fx: &[Effect]) -> RequestId {
    fx.iter()
        .find_map(|e| match e {
            Effect::FetchFilters { request, .. } => Some(*request),
            _ => None,
        })
        .expect("filter fetch requested")
}

fn fetch_page(fx: &[Effect]) -> (RequestId, picker_core::Query, PageMode) {
    fx.iter()
        .find_map(|e| match e {
            Effect::FetchPage { request, query, mode } => Some((*request, query.clone(), *mode)),
            _ => None,
        })
        .expect("page fetch requested")
}

fn start_timer(fx: &[Effect]) -> TimerId {
    fx.iter()
        .find_map(|e| match e {
            Effect::StartTimer { timer, .. } => Some(*timer),
            _ => None,
        })
        .expect("timer started")
}

#[test]
fn library_open_loads_filters_then_first_page() {
    let mut h = Harness::new(ResourceType::LibraryStaticImage, SelectionType::Multiple);
    let fx = h.feed(PickerEvent::Open { selection: None });
    assert!(matches!(h.state(), PickerState::Open(OpenState::LoadFilters { .. })));
    let request = fetch_filters(&fx);

    let fx = h.feed(PickerInput::FiltersLoaded { request, result: Ok(tag_facets()) });
    assert!(matches!(h.state(), PickerState::Open(OpenState::Loading { .. })));
    let filters = h.snap.context.query.filters().unwrap();
    assert_eq!(filters["tags"], Vec::<String>::new());
    let (request, query, mode) = fetch_page(&fx);
    assert_eq!(mode, PageMode::Replace);
    assert_eq!(query.end_cursor(), None);

    h.feed(PickerInput::PageLoaded { request, result: Ok(page(0, 10, true)) });
    assert_eq!(h.state(), PickerState::SELECTING);
    assert_eq!(h.snap.context.results.len(), 10);
    assert_eq!(h.snap.context.query.end_cursor(), Some("10"));
}

#[test]
fn catalog_open_skips_filters() {
    let mut h = Harness::new(ResourceType::Product, SelectionType::Multiple);
    let fx = h.feed(PickerEvent::Open { selection: None });
    assert!(matches!(h.state(), PickerState::Open(OpenState::Loading { .. })));
    assert!(fx.iter().all(|e| !matches!(e, Effect::FetchFilters { .. })));
}

#[test]
fn reopening_with_results_goes_straight_to_edit() {
    let mut h = Harness::new(ResourceType::LibraryStaticImage, SelectionType::Multiple);
    h.open_library(10);
    h.feed(PickerEvent::Close);
    assert_eq!(h.state(), PickerState::Closed);

    let prior: picker_core::Selection = h.snap.context.results.iter().take(2).cloned().collect();
    let fx = h.feed(PickerEvent::Open { selection: Some(prior.clone()) });
    assert!(fx.is_empty());
    assert_eq!(h.state(), PickerState::SELECTING);
    assert_eq!(h.snap.context.selection, prior);
}

#[test]
fn filter_fetch_failure_lands_in_edit_with_one_notification() {
    let mut h = Harness::new(ResourceType::LibraryStaticImage, SelectionType::Multiple);
    let request = fetch_filters(&h.feed(PickerEvent::Open { selection: None }));
    let fx = h.feed(PickerInput::FiltersLoaded { request, result: Err(InvokeError::Message("boom".into())) });
    assert_eq!(h.state(), PickerState::SELECTING);
    assert_eq!(fx.iter().filter(|e| matches!(e, Effect::Notify(_))).count(), 1);
    assert!(h.snap.context.filters.is_none());
}

#[test]
fn page_failure_keeps_previous_results() {
    let mut h = Harness::new(ResourceType::LibraryStaticImage, SelectionType::Multiple);
    h.open_library(10);
    let timer = start_timer(&h.feed(PickerEvent::EditQuery { text: "red".into() }));
    let (request, _, _) = fetch_page(&h.feed(PickerInput::TimerFired { timer }));
    let fx = h.feed(PickerInput::PageLoaded { request, result: Err(InvokeError::Message("down".into())) });
    assert_eq!(h.state(), PickerState::SELECTING);
    assert!(matches!(fx.as_slice(), [Effect::Notify(_)]));
    assert_eq!(h.snap.context.results.len(), 10);
}

#[test]
fn single_select_finishes_and_reports_exactly_one_item() {
    let mut h = Harness::new(ResourceType::LibraryStaticImage, SelectionType::Single);
    h.open_library(10);
    h.snap.context.selection = h.snap.context.results.iter().take(1).cloned().collect();

    let fx = h.feed(PickerEvent::Select { id: "img-004".into() });
    assert_eq!(h.state(), PickerState::Closed);
    let emitted = fx
        .iter()
        .find_map(|e| match e {
            Effect::EmitSelection { selection, resource } => Some((selection.clone(), *resource)),
            _ => None,
        })
        .unwrap();
    assert_eq!(emitted.0.ids().collect::<Vec<_>>(), vec!["img-004"]);
    assert_eq!(emitted.1.selection_type, SelectionType::Single);
    assert!(h.snap.context.selection.is_empty());
}

#[test]
fn multiple_select_then_unselect_restores_selection() {
    let mut h = Harness::new(ResourceType::LibraryStaticImage, SelectionType::Multiple);
    h.open_library(10);
    h.feed(PickerEvent::Select { id: "img-001".into() });
    let before = h.snap.context.selection.clone();

    h.feed(PickerEvent::Select { id: "img-002".into() });
    assert_eq!(h.state(), PickerState::SELECTING);
    assert_eq!(h.snap.context.selection.len(), 2);
    h.feed(PickerEvent::Unselect { id: "img-002".into() });
    assert_eq!(h.snap.context.selection, before);

    let fx = h.feed(PickerEvent::Done);
    assert_eq!(h.state(), PickerState::Closed);
    assert!(fx.iter().any(|e| matches!(e, Effect::EmitSelection { selection, .. } if selection.len() == 1)));
}

#[test]
fn selecting_an_unknown_item_is_an_error() {
    let mut h = Harness::new(ResourceType::LibraryStaticImage, SelectionType::Multiple);
    h.open_library(3);
    let err = h.machine.transition(&h.snap, PickerEvent::Select { id: "img-999".into() }.into()).unwrap_err();
    assert_eq!(err, MachineError::UnknownItem { id: "img-999".into() });
}

#[test]
fn events_without_a_transition_are_dropped() {
    let mut h = Harness::new(ResourceType::LibraryStaticImage, SelectionType::Multiple);
    assert_eq!(h.outcome(PickerEvent::Close), Outcome::Dropped);
    h.feed(PickerEvent::Open { selection: None });
    assert_eq!(h.outcome(PickerEvent::Select { id: "img-001".into() }), Outcome::Dropped);
    assert_eq!(h.outcome(PickerEvent::Open { selection: None }), Outcome::Dropped);
}

#[test]
fn query_edits_restart_the_debounce_timer() {
    let mut h = Harness::new(ResourceType::LibraryStaticImage, SelectionType::Multiple);
    h.open_library(10);
    let first = start_timer(&h.feed(PickerEvent::EditQuery { text: "re".into() }));
    let fx = h.feed(PickerEvent::EditQuery { text: "red".into() });
    let second = start_timer(&fx);
    assert_ne!(first, second);
    assert!(fx.iter().any(|e| matches!(e, Effect::CancelTimer { timer } if *timer == first)));
    assert_eq!(h.state(), PickerState::Open(OpenState::Edit(EditState::Searching { timer: second })));

    assert_eq!(h.outcome(PickerInput::TimerFired { timer: first }), Outcome::Stale);
    let (_, query, _) = fetch_page(&h.feed(PickerInput::TimerFired { timer: second }));
    assert_eq!(query.text(), Some("red"));
    assert_eq!(query.end_cursor(), None);
}

#[test]
fn clear_filters_empties_every_key_and_refetches_from_the_start() {
    let mut h = Harness::new(ResourceType::LibraryStaticImage, SelectionType::Multiple);
    h.open_library(10);
    let (request, _, _) = fetch_page(&h.feed(PickerEvent::EditFilter { filter_id: "tags".into(), values: vec!["red".into()] }));
    h.feed(PickerInput::PageLoaded { request, result: Ok(page(0, 2, false)) });
    assert_eq!(h.snap.context.query.filters().unwrap()["tags"], vec!["red".to_string()]);

    let (_, query, mode) = fetch_page(&h.feed(PickerEvent::ClearFilters));
    assert_eq!(mode, PageMode::Replace);
    assert_eq!(query.end_cursor(), None);
    assert!(query.filters().unwrap().values().all(Vec::is_empty));
    assert!(matches!(h.state(), PickerState::Open(OpenState::Loading { .. })));
}

#[test]
fn load_more_appends_then_settles_back_to_edit() {
    let mut h = Harness::new(ResourceType::LibraryStaticImage, SelectionType::Multiple);
    h.open_library(10);
    let (request, query, mode) = fetch_page(&h.feed(PickerEvent::LoadMore));
    assert_eq!(mode, PageMode::Append);
    assert_eq!(query.end_cursor(), Some("10"));

    let fx = h.feed(PickerInput::PageLoaded { request, result: Ok(page(10, 10, true)) });
    assert_eq!(h.snap.context.results.len(), 20);
    assert!(h.snap.context.page_info.has_next_page);
    assert_eq!(h.snap.context.query.end_cursor(), Some("20"));
    let timer = start_timer(&fx);
    assert!(h.state().matches("Open.LoadMore.Retrieved"));

    h.feed(PickerInput::TimerFired { timer });
    assert_eq!(h.state(), PickerState::SELECTING);
}

#[test]
fn superseded_responses_are_stale() {
    let mut h = Harness::new(ResourceType::LibraryStaticImage, SelectionType::Multiple);
    h.open_library(10);
    let (old, _, _) = fetch_page(&h.feed(PickerEvent::EditFilter { filter_id: "tags".into(), values: vec!["red".into()] }));
    let fx = h.feed(PickerEvent::Close);
    assert!(fx.iter().any(|e| matches!(e, Effect::CancelRequest { request } if *request == old)));

    h.feed(PickerEvent::Open { selection: None });
    assert_eq!(h.outcome(PickerInput::PageLoaded { request: old, result: Ok(page(0, 1, false)) }), Outcome::Stale);
}

#[test]
fn load_more_failure_keeps_results_and_returns_to_edit() {
    let mut h = Harness::new(ResourceType::LibraryStaticImage, SelectionType::Multiple);
    h.open_library(3);
    let (request, _, mode) = fetch_page(&h.feed(PickerEvent::LoadMore));
    assert_eq!(mode, PageMode::Append);

    let fx = h.feed(PickerInput::PageLoaded { request, result: Err(InvokeError::Message("timeout".into())) });
    assert_eq!(h.state(), PickerState::SELECTING);
    assert_eq!(fx.iter().filter(|e| matches!(e, Effect::Notify(_))).count(), 1);
    assert!(fx.iter().all(|e| !matches!(e, Effect::StartTimer { .. })));
    assert_eq!(h.snap.context.results.len(), 3);
    assert_eq!(h.snap.context.query.end_cursor(), Some("3"));
}

#[test]
fn catalog_filter_events_reload_from_the_start() {
    let mut h = Harness::new(ResourceType::Product, SelectionType::Multiple);
    let (request, _, _) = fetch_page(&h.feed(PickerEvent::Open { selection: None }));
    h.feed(PickerInput::PageLoaded { request, result: Ok(page(0, 3, true)) });
    assert_eq!(h.state(), PickerState::SELECTING);

    let fx = h.feed(PickerEvent::EditFilter { filter_id: "tags".into(), values: vec![] });
    assert!(matches!(h.state(), PickerState::Open(OpenState::Loading { .. })));
    let (request, query, mode) = fetch_page(&fx);
    assert_eq!(mode, PageMode::Replace);
    assert_eq!(query.end_cursor(), None);
    assert!(query.filters().is_none());

    h.feed(PickerInput::PageLoaded { request, result: Ok(page(0, 3, true)) });
    fetch_page(&h.feed(PickerEvent::ClearFilters));
    assert!(matches!(h.state(), PickerState::Open(OpenState::Loading { .. })));
}
