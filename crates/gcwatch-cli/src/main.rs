mod config;
mod logging;
mod terminal;

use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use gcwatch_core::app::{ActionOutcome, GcJobView, ViewBuilder};
use gcwatch_core::domain::EditorClose;
use gcwatch_core::impls::HttpApiClient;
use gcwatch_core::ports::{ApiClient, SystemClock};
use tracing::info;

use crate::config::{Cli, Command, Settings};
use crate::terminal::{
    CommandLineScheduleEditor, GridPrinter, TerminalAlerts, TerminalTaskViewer, format_grid,
};

/// View wired to terminal ports. `schedule` is what the editor saves.
fn builder(
    api: Arc<dyn ApiClient>,
    settings: &Settings,
    viewer: Arc<TerminalTaskViewer>,
    schedule: Option<String>,
) -> ViewBuilder {
    ViewBuilder::new(Arc::clone(&api))
        .task_viewer(viewer)
        .alerts(Arc::new(TerminalAlerts))
        .schedule_editor(Arc::new(CommandLineScheduleEditor::new(api, schedule)))
        .labels(settings.labels.clone())
        .poll_interval(settings.poll_interval)
}

/// Fails when the viewer could not follow the task to its end.
fn check_viewer(viewer: &TerminalTaskViewer) -> anyhow::Result<()> {
    match viewer.take_failure() {
        Some(text) => bail!("unable to follow task: {text}"),
        None => Ok(()),
    }
}

/// Load once and select `store`.
async fn select_store(view: &GcJobView, store: &str) -> anyhow::Result<()> {
    view.store().load().await?;
    if !view.select(store).await {
        bail!("no garbage collection status for datastore '{store}'");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.global.log_level, cli.global.log_format)?;

    let settings = Settings::resolve(&cli.global).context("invalid configuration")?;
    let api: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(settings.http_config())?);
    info!(url = %settings.base_url, "gcwatch starting");
    let viewer = Arc::new(TerminalTaskViewer::new(Arc::clone(&api)));

    match cli.command {
        Command::Watch => {
            let view = builder(Arc::clone(&api), &settings, viewer, None).build()?;
            let printer = Arc::new(GridPrinter::new(
                settings.labels.clone(),
                Arc::new(SystemClock),
            ));
            let listener = view.store().subscribe(printer);

            view.show().await;
            tokio::signal::ctrl_c().await?;
            info!("shutting down");
            view.store().unsubscribe(listener);
            view.destroy().await;
        }
        Command::List { json } => {
            let view = builder(api, &settings, viewer, None).build()?;
            view.store().load().await?;
            let rows = view.rows().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{}", format_grid(&rows));
            }
        }
        Command::Run { store } => {
            let view = builder(api, &settings, Arc::clone(&viewer), None).build()?;
            select_store(&view, &store).await?;
            match view.run_now().await {
                ActionOutcome::Alerted(text) => bail!("unable to start garbage collection: {text}"),
                ActionOutcome::Disabled => bail!("no datastore selected"),
                _ => check_viewer(&viewer)?,
            }
        }
        Command::Log { store } => {
            let view = builder(api, &settings, Arc::clone(&viewer), None).build()?;
            select_store(&view, &store).await?;
            if view.show_log().await == ActionOutcome::Disabled {
                println!("garbage collection has not run on '{store}' yet");
            }
            check_viewer(&viewer)?;
        }
        Command::Schedule { store, event } => {
            let view = builder(api, &settings, viewer, event).build()?;
            select_store(&view, &store).await?;
            match view.edit_schedule().await {
                ActionOutcome::Edited(EditorClose::Saved) => {
                    let rows: Vec<_> = view
                        .rows()
                        .await
                        .into_iter()
                        .filter(|row| row.store == store)
                        .collect();
                    println!("{}", format_grid(&rows));
                }
                ActionOutcome::Edited(EditorClose::Failed(text)) => {
                    bail!("unable to save schedule: {text}")
                }
                _ => {}
            }
        }
        Command::Namespaces { store, check } => {
            let mut selector = builder(api, &settings, viewer, None).namespace_selector();
            selector.set_datastore(Some(store.as_str())).await??;
            for entry in selector.entries() {
                let name = if entry.is_root() {
                    settings.labels.root.as_str()
                } else {
                    entry.ns.as_str()
                };
                match &entry.comment {
                    Some(comment) => println!("{name}\t{comment}"),
                    None => println!("{name}"),
                }
            }
            if let Some(ns) = check {
                selector.set_value(ns);
                selector.submit()?;
                println!("'{}' exists on '{store}'", selector.display_value());
            }
        }
    }

    Ok(())
}
