pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod notice;
pub mod render;
pub mod store;
pub mod view;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use commands::Outcome;

#[tracing::instrument(skip_all)]
pub async fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<Outcome> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting taskboard CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.taskboardrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );
  if let Some(url) = cli.api {
    cfg.apply_overrides([(
      "api.url".to_string(),
      url
    )]);
  }

  let api_url = cfg.api_url();
  let api = api::HttpTodoApi::new(
    &api_url,
    cfg.api_timeout()?
  )
  .with_context(|| {
    format!(
      "failed to set up todo service \
       client for {api_url}"
    )
  })?;

  let mut store =
    store::TaskStore::new(api);
  let mut renderer =
    render::Renderer::new(&cfg)?;
  let command =
    cli.command.unwrap_or_else(|| {
      cli::Command::List(
        cli::ListArgs::default()
      )
    });

  let outcome = commands::dispatch(
    &mut store,
    &cfg,
    &mut renderer,
    command
  )
  .await?;

  info!(?outcome, "done");
  Ok(outcome)
}
