use anyhow::bail;
use taskboard_shared::{Selection, Tab, TaskDraft, TaskFilters, TaskPatch};
use tracing::{debug, info, instrument, warn};

use crate::api::TodoApi;
use crate::cli::{AddArgs, Command, EditArgs, ListArgs};
use crate::config::Config;
use crate::error::StoreError;
use crate::notice::{Action, Notice};
use crate::render::Renderer;
use crate::store::TaskStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Failed,
}

#[instrument(skip(store, cfg, renderer, command))]
pub async fn dispatch<A: TodoApi>(
    store: &mut TaskStore<A>,
    cfg: &Config,
    renderer: &mut Renderer,
    command: Command,
) -> anyhow::Result<Outcome> {
    debug!(?command, "dispatching command");

    if command.needs_fetch()
        && let Err(err) = store.load().await
    {
        warn!(error = %err, "initial fetch failed");
        renderer.print_notice(&Notice::failure(Action::Fetch, &StoreError::from(err)))?;
        return Ok(Outcome::Failed);
    }

    match command {
        Command::List(args) => cmd_list(store, cfg, renderer, args),
        Command::Add(args) => cmd_add(store, cfg, renderer, args).await,
        Command::Edit(args) => cmd_edit(store, renderer, args).await,
        Command::Toggle { id } => {
            info!(%id, "command toggle");
            match store.toggle_completion(&id).await {
                Ok(task) => {
                    let notice = Notice::toggled(task);
                    renderer.print_notice(&notice)?;
                    Ok(Outcome::Done)
                }
                Err(err) => fail(renderer, Action::Toggle, &err),
            }
        }
        Command::Delete { id } => {
            info!(%id, "command delete");
            match store.remove(&id).await {
                Ok(removed) => {
                    debug!(removed_locally = removed.is_some(), "delete acknowledged");
                    succeed(renderer, Action::Delete)
                }
                Err(err) => fail(renderer, Action::Delete, &StoreError::from(err)),
            }
        }
        Command::Summary => {
            renderer.print_summary(store.summary())?;
            Ok(Outcome::Done)
        }
        Command::Show => {
            renderer.print_config(cfg)?;
            Ok(Outcome::Done)
        }
    }
}

fn cmd_list<A: TodoApi>(
    store: &TaskStore<A>,
    cfg: &Config,
    renderer: &mut Renderer,
    args: ListArgs,
) -> anyhow::Result<Outcome> {
    let filters = list_filters(cfg, args)?;
    debug!(?filters, "command list");

    renderer.print_task_table(&store.visible(&filters))?;
    renderer.print_summary(store.summary())?;
    Ok(Outcome::Done)
}

fn list_filters(cfg: &Config, args: ListArgs) -> anyhow::Result<TaskFilters> {
    let tab = if args.complete {
        Tab::Complete
    } else {
        cfg.default_tab()?
    };

    Ok(TaskFilters::default()
        .tab(tab)
        .search(args.search.unwrap_or_default())
        .priority(args.priority.unwrap_or(Selection::All))
        .category(args.category.unwrap_or(Selection::All)))
}

async fn cmd_add<A: TodoApi>(
    store: &mut TaskStore<A>,
    cfg: &Config,
    renderer: &mut Renderer,
    args: AddArgs,
) -> anyhow::Result<Outcome> {
    let priority = match args.priority {
        Some(priority) => priority,
        None => cfg.default_priority()?,
    };
    let category = match args.category {
        Some(category) => category,
        None => cfg.default_category()?,
    };
    let draft = TaskDraft::new(args.text.join(" "))
        .with_priority(priority)
        .with_category(category);
    info!(text_len = draft.text.len(), "command add");

    match store.create(draft).await {
        Ok(task) => {
            let task = task.clone();
            let outcome = succeed(renderer, Action::Add)?;
            renderer.print_task(&task)?;
            Ok(outcome)
        }
        Err(err) => fail(renderer, Action::Add, &err),
    }
}

async fn cmd_edit<A: TodoApi>(
    store: &mut TaskStore<A>,
    renderer: &mut Renderer,
    args: EditArgs,
) -> anyhow::Result<Outcome> {
    let patch = TaskPatch {
        text: args.text,
        priority: args.priority,
        category: args.category,
        completed: None,
    };
    if patch.is_empty() {
        bail!("edit needs at least one of --text, --priority or --category");
    }
    info!(id = %args.id, "command edit");

    match store.update(&args.id, patch).await {
        Ok(task) => {
            let task = task.clone();
            let outcome = succeed(renderer, Action::Update)?;
            renderer.print_task(&task)?;
            Ok(outcome)
        }
        Err(err) => fail(renderer, Action::Update, &err),
    }
}

fn succeed(renderer: &mut Renderer, action: Action) -> anyhow::Result<Outcome> {
    if let Some(notice) = Notice::success(action) {
        renderer.print_notice(&notice)?;
    }
    Ok(Outcome::Done)
}

fn fail(renderer: &mut Renderer, action: Action, err: &StoreError) -> anyhow::Result<Outcome> {
    let timed_out = matches!(err, StoreError::Fetch(fetch) if fetch.is_timeout());
    warn!(?action, timed_out, error = %err, "operation failed");
    renderer.print_notice(&Notice::failure(action, err))?;
    Ok(Outcome::Failed)
}
