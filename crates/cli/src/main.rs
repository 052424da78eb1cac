use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use picker_api::{NotificationSink, Sources, ToastQueue};
use picker_catalog::{fetch_page, CatalogOperation, FixtureCatalog, PageVariables};
use picker_core::{ResourceType, Selection, SelectionType, Tunables};
use picker_machine::{PickerEvent, PickerRef, PickerState};
use picker_root::{spawn_root, SpawnFormEdit};
use picker_search::{demo, LibrarySource, ListRequest};
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "pickerctl", version, about = "Resource picker CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(flatten)]
    tunables: TunableArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

/// Overrides for the `PICKER_*` tunables.
#[derive(Args, Debug)]
struct TunableArgs {
    /// Quiet period after the last query edit, in ms
    #[arg(long = "debounce-ms", env = "PICKER_DEBOUNCE_MS", global = true)]
    debounce_ms: Option<u64>,
    /// Pause after a load-more page lands, in ms
    #[arg(long = "settle-ms", env = "PICKER_SETTLE_MS", global = true)]
    settle_ms: Option<u64>,
    /// Page size
    #[arg(long = "page-size", env = "PICKER_PAGE_SIZE", global = true)]
    page_size: Option<u32>,
    /// Locale used for titles
    #[arg(long = "locale", env = "PICKER_LOCALE", global = true)]
    locale: Option<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CatalogKind { Products, Collections }

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Cardinality { Single, Multiple }

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the demo library
    Search {
        /// Free-text title filter
        #[arg(short = 'q', long = "query")]
        query: Option<String>,
        /// Required tag (repeatable)
        #[arg(long = "tag", action = ArgAction::Append)]
        tags: Vec<String>,
        /// Cursor of the last item already seen
        #[arg(long = "after")]
        after: Option<u64>,
        /// Size of the demo dataset
        #[arg(long = "items", default_value_t = 25)]
        items: usize,
        /// Print candidate counts per filtering stage
        #[arg(long = "explain", action = ArgAction::SetTrue)]
        explain: bool,
    },
    /// Print the demo library's filter facets
    Filters {
        #[arg(long = "items", default_value_t = 25)]
        items: usize,
    },
    /// List fixture catalog products or collections
    Catalog {
        #[arg(value_enum)]
        kind: CatalogKind,
        #[arg(short = 'q', long = "query")]
        query: Option<String>,
        /// Opaque cursor returned by a previous page
        #[arg(long = "after")]
        after: Option<String>,
        /// Number of fixture nodes of each kind
        #[arg(long = "fixture-size", default_value_t = 12)]
        fixture_size: usize,
    },
    /// Scripted session through the root actor: spawn, open, type, select
    Demo {
        /// libraryStaticImage, product or collection
        #[arg(long = "resource-type", default_value = "libraryStaticImage", value_parser = ResourceType::from_str)]
        resource_type: ResourceType,
        #[arg(long = "selection", value_enum, default_value_t = Cardinality::Multiple)]
        selection: Cardinality,
        /// Query typed one character at a time
        #[arg(short = 'q', long = "query")]
        query: Option<String>,
        /// Fetch one more page before selecting
        #[arg(long = "load-more", action = ArgAction::SetTrue)]
        load_more: bool,
        /// Ids to select; defaults to the first result
        #[arg(long = "select", action = ArgAction::Append)]
        select: Vec<String>,
        /// Spawn-form edits as path=value, e.g. uiSettings.modalSize=small
        #[arg(long = "set", action = ArgAction::Append)]
        set: Vec<String>,
        #[arg(long = "items", default_value_t = 25)]
        items: usize,
    },
}

fn init_tracing() {
    let env = std::env::var("PICKER_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("PICKER_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            warn!(addr = %addr, "invalid PICKER_METRICS_ADDR; expected host:port");
        }
    }
}

impl TunableArgs {
    fn resolve(&self) -> Result<Tunables> {
        let mut t = Tunables::from_env().context("reading PICKER_* tunables")?;
        if let Some(v) = self.debounce_ms { t.debounce_ms = v; }
        if let Some(v) = self.settle_ms { t.settle_ms = v; }
        if let Some(v) = self.page_size {
            if v == 0 { bail!("--page-size must be positive"); }
            t.page_size = v;
        }
        if let Some(v) = &self.locale { t.locale = v.clone(); }
        Ok(t)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();
    let tunables = cli.tunables.resolve()?;

    match cli.command {
        Commands::Search { query, tags, after, items, explain } => {
            let source = LibrarySource::with_locale(demo::static_images(items), &tunables.locale);
            let mut filters = picker_core::FilterMap::new();
            if !tags.is_empty() {
                filters.insert(picker_search::TAGS.to_string(), tags);
            }
            info!(items, query = ?query, after = ?after, "search invoked");
            let req = ListRequest {
                first: tunables.page_size as usize,
                after,
                filters: Some(&filters),
                query: query.as_deref(),
            };
            let (page, dbg) = source.list_with_debug(&req);
            match cli.output {
                Output::Human => {
                    println!("{:<7} {:<9} {:<26} TAGS", "CURSOR", "ID", "TITLE");
                    for r in &page.items {
                        let title = r.title.get(&tunables.locale).unwrap_or("");
                        let tags = r.tags.as_ref().map(|t| t.join(",")).unwrap_or_default();
                        println!("{:<7} {:<9} {:<26} {}", r.cursor, r.id, title, tags);
                    }
                    println!(
                        "next={} prev={} endCursor={}",
                        page.has_next_page,
                        page.has_previous_page,
                        page.end_cursor.map(|c| c.to_string()).unwrap_or_else(|| "-".into())
                    );
                    if explain {
                        eprintln!("debug: total={} after_filters={} after_text={}", dbg.total, dbg.after_filters, dbg.after_text);
                    }
                }
                Output::Json => {
                    if explain {
                        #[derive(serde::Serialize)]
                        struct Explain<'a, T> { page: T, debug: &'a picker_search::ListDebugInfo }
                        println!("{}", serde_json::to_string_pretty(&Explain { page: &page, debug: &dbg })?);
                    } else {
                        println!("{}", serde_json::to_string_pretty(&page)?);
                    }
                }
            }
        }
        Commands::Filters { items } => {
            let source = LibrarySource::new(demo::static_images(items));
            let facets = source.available_filters();
            match cli.output {
                Output::Human => {
                    for (id, values) in &facets {
                        println!("{id}: {}", values.join(", "));
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&facets)?),
            }
        }
        Commands::Catalog { kind, query, after, fixture_size } => {
            let catalog = FixtureCatalog::demo(fixture_size, fixture_size);
            let op = match kind {
                CatalogKind::Products => CatalogOperation::Products,
                CatalogKind::Collections => CatalogOperation::Collections,
            };
            info!(op = op.operation_name(), query = ?query, "catalog invoked");
            let vars = PageVariables { first: tunables.page_size, after, query };
            let page = fetch_page(&catalog, op, vars).await.context("catalog request failed")?;
            match cli.output {
                Output::Human => {
                    for r in &page.items {
                        println!("{:<34} {:<16} {}", r.id(), r.title(&tunables.locale), r.preview().unwrap_or("-"));
                    }
                    println!(
                        "next={} endCursor={}",
                        page.page_info.has_next_page,
                        page.page_info.end_cursor.as_deref().unwrap_or("-")
                    );
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&page)?),
            }
        }
        Commands::Demo { resource_type, selection, query, load_more, select, set, items } => {
            let session = DemoSession {
                resource_type,
                selection: match selection {
                    Cardinality::Single => SelectionType::Single,
                    Cardinality::Multiple => SelectionType::Multiple,
                },
                query,
                load_more,
                select,
                set,
                items,
            };
            let selected = tokio::select! {
                res = session.run(tunables.clone()) => res?,
                _ = signal::ctrl_c() => {
                    warn!("interrupted");
                    return Ok(());
                }
            };
            match cli.output {
                Output::Human => {
                    for r in selected.iter() {
                        println!("{:<34} {}", r.id(), r.title(&tunables.locale));
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&selected)?),
            }
        }
    }

    Ok(())
}

struct DemoSession {
    resource_type: ResourceType,
    selection: SelectionType,
    query: Option<String>,
    load_more: bool,
    select: Vec<String>,
    set: Vec<String>,
    items: usize,
}

impl DemoSession {
    async fn run(self, tunables: Tunables) -> Result<Selection> {
        let sources = Sources::new(
            Arc::new(LibrarySource::with_locale(demo::static_images(self.items), &tunables.locale)),
            Arc::new(FixtureCatalog::demo(self.items, self.items)),
        );
        let toasts = Arc::new(ToastQueue::new());
        let sink: Arc<dyn NotificationSink> = toasts.clone();
        let root = spawn_root(sources, tunables, sink);

        root.edit_form(SpawnFormEdit::ResourceType(self.resource_type))?;
        root.edit_form(SpawnFormEdit::SelectionType(self.selection))?;
        for kv in &self.set {
            let (path, value) = kv.split_once('=').with_context(|| format!("--set expects path=value, got {kv:?}"))?;
            root.edit_form(SpawnFormEdit::parse(path, value)?)?;
        }
        let id = root.spawn().await?;
        let picker = root.picker(&id).context("spawned picker missing from registry")?;
        root.open(&id)?;
        settle("first page", picker.wait_for(|s| s.state == PickerState::SELECTING)).await?;

        if let Some(q) = &self.query {
            type_query(&picker, q).await;
            let q = q.clone();
            settle(
                "search results",
                picker.wait_for(move |s| s.state == PickerState::SELECTING && s.context.query.text() == Some(q.as_str())),
            )
            .await?;
        }
        if self.load_more {
            let snap = picker.snapshot();
            if snap.context.page_info.has_next_page {
                let before = snap.context.results.len();
                picker.send(PickerEvent::LoadMore);
                settle(
                    "next page",
                    picker.wait_for(move |s| s.state == PickerState::SELECTING && s.context.results.len() > before),
                )
                .await?;
            } else {
                info!("no next page; load-more skipped");
            }
        }

        let snap = picker.snapshot();
        info!(results = snap.context.results.len(), "picker settled");
        let ids: Vec<String> = if self.select.is_empty() {
            snap.context.results.first().map(|r| r.id().to_string()).into_iter().collect()
        } else {
            self.select.clone()
        };
        if ids.is_empty() {
            bail!("nothing to select: the search returned no results");
        }
        for id in &ids {
            picker.send(PickerEvent::Select { id: id.clone() });
            if self.selection == SelectionType::Single {
                break;
            }
        }
        if self.selection == SelectionType::Multiple {
            picker.send(PickerEvent::Done);
        }

        let view = settle(
            "selection report",
            root.wait_for(|v| v.get(&id).is_some_and(|p| !p.selection.is_empty())),
        )
        .await?;
        let selected = view.get(&id).map(|p| p.selection.clone()).unwrap_or_default();
        for n in toasts.visible() {
            info!(level = ?n.level, "toast: {}", n.message);
        }
        root.shutdown();
        Ok(selected)
    }
}

/// Send the query one character at a time, faster than the debounce window.
async fn type_query(picker: &PickerRef, query: &str) {
    let mut typed = String::new();
    for c in query.chars() {
        typed.push(c);
        picker.send(PickerEvent::EditQuery { text: typed.clone() });
        tokio::time::sleep(Duration::from_millis(60)).await;
    }
}

async fn settle<T>(what: &str, fut: impl Future<Output = Option<T>>) -> Result<T> {
    tokio::time::timeout(Duration::from_secs(10), fut)
        .await
        .with_context(|| format!("timed out waiting for {what}"))?
        .with_context(|| format!("actor stopped while waiting for {what}"))
}
