//! Pure picker transition function.
//!
//! `(snapshot, input) -> (snapshot, effects)`. Nothing here performs I/O or reads
//! the clock: fetches and timers are requested as [`Effect`]s and their
//! resolutions come back as [`PickerInput`]s stamped with the id they were
//! issued under. Transient states (`Check`, `AnalyzeSelection`, `Done`) are
//! resolved within the same step, so they are never observed at rest.

use std::time::Duration;

use picker_core::{Namespace, SelectionType, Tunables};

use crate::context::{PickerContext, PickerSnapshot};
use crate::event::{Effect, PageMode, PickerEvent, PickerInput};
use crate::state::{EditState, LoadMoreState, OpenState, PickerState};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    /// `item.select` for an id absent from the current results.
    #[error("item {id} is not in the current results")]
    UnknownItem { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// No transition for this event in the active state.
    Dropped,
    /// Resolution of a fetch or timer the active state no longer awaits.
    Stale,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub snapshot: PickerSnapshot,
    pub effects: Vec<Effect>,
    pub outcome: Outcome,
}

impl Step {
    pub fn applied(&self) -> bool { self.outcome == Outcome::Applied }
}

/// Timing parameters of the picker protocol.
#[derive(Debug, Clone, Copy)]
pub struct PickerMachine {
    debounce: Duration,
    settle: Duration,
}

impl PickerMachine {
    pub fn new(tunables: &Tunables) -> Self {
        Self { debounce: tunables.debounce(), settle: tunables.settle() }
    }

    pub fn debounce(&self) -> Duration { self.debounce }
    pub fn settle(&self) -> Duration { self.settle }

    pub fn transition(&self, current: &PickerSnapshot, input: PickerInput) -> Result<Step, MachineError> {
        let mut next = current.clone();
        let mut entered = Vec::new();
        let mut resolved = None;
        let outcome = self.apply(&mut next, &mut entered, &mut resolved, input)?;
        if outcome != Outcome::Applied {
            return Ok(Step { snapshot: next, effects: Vec::new(), outcome });
        }
        self.resolve_transient(&mut next, &mut entered);

        let mut effects = exit_effects(current.state, next.state, resolved);
        effects.extend(entered);
        Ok(Step { snapshot: next, effects, outcome })
    }

    fn apply(
        &self,
        s: &mut PickerSnapshot,
        fx: &mut Vec<Effect>,
        resolved: &mut Option<u64>,
        input: PickerInput,
    ) -> Result<Outcome, MachineError> {
        let ctx = &mut s.context;
        match input {
            PickerInput::Event(ev) => return self.on_event(s, fx, ev),
            PickerInput::FiltersLoaded { request, result } => {
                if s.state != PickerState::Open(OpenState::LoadFilters { request }) {
                    return Ok(Outcome::Stale);
                }
                *resolved = Some(request.0);
                s.state = match result {
                    Ok(set) => {
                        ctx.query.register_filter_keys(set.filters.keys());
                        ctx.filters = Some(set.filters);
                        PickerState::Open(OpenState::Check)
                    }
                    Err(e) => {
                        fx.push(Effect::Notify(e));
                        PickerState::SELECTING
                    }
                };
            }
            PickerInput::PageLoaded { request, result } => {
                let mode = match s.state {
                    PickerState::Open(OpenState::Loading { request: r }) if r == request => PageMode::Replace,
                    PickerState::Open(OpenState::LoadMore(LoadMoreState::Retrieve { request: r })) if r == request => {
                        PageMode::Append
                    }
                    _ => return Ok(Outcome::Stale),
                };
                *resolved = Some(request.0);
                s.state = match result {
                    Ok(page) => {
                        ctx.query.set_end_cursor(page.page_info.end_cursor.clone());
                        ctx.page_info = page.page_info;
                        match mode {
                            PageMode::Replace => {
                                ctx.replace_results(page.items);
                                PickerState::SELECTING
                            }
                            PageMode::Append => {
                                ctx.append_results(page.items);
                                self.enter_retrieved(ctx, fx)
                            }
                        }
                    }
                    Err(e) => {
                        fx.push(Effect::Notify(e));
                        PickerState::SELECTING
                    }
                };
            }
            PickerInput::TimerFired { timer } => {
                s.state = match s.state {
                    PickerState::Open(OpenState::Edit(EditState::Searching { timer: t })) if t == timer => {
                        self.enter_loading(ctx, fx)
                    }
                    PickerState::Open(OpenState::LoadMore(LoadMoreState::Retrieved { timer: t })) if t == timer => {
                        PickerState::SELECTING
                    }
                    _ => return Ok(Outcome::Stale),
                };
                *resolved = Some(timer.0);
            }
        }
        Ok(Outcome::Applied)
    }

    fn on_event(&self, s: &mut PickerSnapshot, fx: &mut Vec<Effect>, ev: PickerEvent) -> Result<Outcome, MachineError> {
        use EditState::Selecting;
        use OpenState::Edit;

        let ctx = &mut s.context;
        s.state = match (s.state, ev) {
            (PickerState::Closed, PickerEvent::Open { selection }) => {
                ctx.selection = selection.unwrap_or_default();
                PickerState::Open(OpenState::Check)
            }
            (PickerState::Open(_), PickerEvent::Close) => PickerState::Closed,
            (PickerState::Open(Edit(_)), PickerEvent::EditQuery { text }) => {
                ctx.query.set_text(text);
                ctx.query.reset_cursor();
                self.enter_searching(ctx, fx)
            }
            (PickerState::Open(Edit(_)), PickerEvent::LoadMore) => self.enter_retrieve(ctx, fx),
            (PickerState::Open(Edit(Selecting)), PickerEvent::Select { id }) => {
                let item = match ctx.result(&id) {
                    Some(item) => item.clone(),
                    None => return Err(MachineError::UnknownItem { id }),
                };
                if ctx.resource.selection_type == SelectionType::Single {
                    ctx.selection.clear();
                }
                ctx.selection.insert(item);
                PickerState::Open(Edit(EditState::AnalyzeSelection))
            }
            (PickerState::Open(Edit(Selecting)), PickerEvent::Unselect { id }) => {
                ctx.selection.remove(&id);
                PickerState::SELECTING
            }
            (PickerState::Open(Edit(Selecting)), PickerEvent::EditFilter { filter_id, values }) => {
                // Catalog queries carry no filters; the edit still reloads.
                ctx.query.set_filter(&filter_id, values);
                ctx.query.reset_cursor();
                self.enter_loading(ctx, fx)
            }
            (PickerState::Open(Edit(Selecting)), PickerEvent::ClearFilters) => {
                ctx.query.clear_filters();
                ctx.query.reset_cursor();
                self.enter_loading(ctx, fx)
            }
            (PickerState::Open(Edit(Selecting)), PickerEvent::Done) => PickerState::Done,
            _ => return Ok(Outcome::Dropped),
        };
        Ok(Outcome::Applied)
    }

    /// Follow eventless transitions until the state is stable.
    fn resolve_transient(&self, s: &mut PickerSnapshot, fx: &mut Vec<Effect>) {
        loop {
            let ctx = &mut s.context;
            s.state = match s.state {
                PickerState::Open(OpenState::Check) => {
                    if ctx.filters.is_none() && ctx.resource.resource_namespace == Namespace::Library {
                        self.enter_load_filters(ctx, fx)
                    } else if !ctx.results.is_empty() {
                        PickerState::SELECTING
                    } else {
                        self.enter_loading(ctx, fx)
                    }
                }
                PickerState::Open(OpenState::Edit(EditState::AnalyzeSelection)) => {
                    match ctx.resource.selection_type {
                        SelectionType::Single => PickerState::Done,
                        SelectionType::Multiple => PickerState::SELECTING,
                    }
                }
                PickerState::Done => {
                    fx.push(Effect::EmitSelection {
                        selection: std::mem::take(&mut ctx.selection),
                        resource: ctx.resource,
                    });
                    PickerState::Closed
                }
                _ => return,
            };
        }
    }

    fn enter_load_filters(&self, ctx: &mut PickerContext, fx: &mut Vec<Effect>) -> PickerState {
        let request = ctx.next_request();
        fx.push(Effect::FetchFilters { request, resource_type: ctx.resource.resource_type });
        PickerState::Open(OpenState::LoadFilters { request })
    }

    fn enter_loading(&self, ctx: &mut PickerContext, fx: &mut Vec<Effect>) -> PickerState {
        let request = ctx.next_request();
        fx.push(Effect::FetchPage { request, query: ctx.query.clone(), mode: PageMode::Replace });
        PickerState::Open(OpenState::Loading { request })
    }

    fn enter_searching(&self, ctx: &mut PickerContext, fx: &mut Vec<Effect>) -> PickerState {
        let timer = ctx.next_timer();
        fx.push(Effect::StartTimer { timer, after: self.debounce });
        PickerState::Open(OpenState::Edit(EditState::Searching { timer }))
    }

    fn enter_retrieve(&self, ctx: &mut PickerContext, fx: &mut Vec<Effect>) -> PickerState {
        let request = ctx.next_request();
        fx.push(Effect::FetchPage { request, query: ctx.query.clone(), mode: PageMode::Append });
        PickerState::Open(OpenState::LoadMore(LoadMoreState::Retrieve { request }))
    }

    fn enter_retrieved(&self, ctx: &mut PickerContext, fx: &mut Vec<Effect>) -> PickerState {
        let timer = ctx.next_timer();
        fx.push(Effect::StartTimer { timer, after: self.settle });
        PickerState::Open(OpenState::LoadMore(LoadMoreState::Retrieved { timer }))
    }
}

/// Cancellations for work owned by `prev` that `next` no longer holds. The work
/// that just resolved needs none.
fn exit_effects(prev: PickerState, next: PickerState, resolved: Option<u64>) -> Vec<Effect> {
    let mut out = Vec::new();
    if let Some(request) = prev.awaited_request() {
        if next.awaited_request() != Some(request) && resolved != Some(request.0) {
            out.push(Effect::CancelRequest { request });
        }
    }
    if let Some(timer) = prev.owned_timer() {
        if next.owned_timer() != Some(timer) && resolved != Some(timer.0) {
            out.push(Effect::CancelTimer { timer });
        }
    }
    out
}
