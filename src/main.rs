mod api;
mod app;
mod cli;
mod config;
mod input;
mod model;
mod resources;
mod ui;

use anyhow::{Context, Result};
use api::ApiGateway;
use app::{App, Command};
use clap::Parser;
use cli::CliArgs;
use config::Settings;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use model::{Card, Section};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

/// How long the cosmetic section transition runs before the swap and the
/// data fetch; the fetch never starts earlier.
const SECTION_SWITCH_DELAY: Duration = Duration::from_millis(150);

/// Messages delivered back into the event loop by spawned tasks. Fetch
/// outcomes carry the sequence number handed out when the fetch began.
#[derive(Debug)]
enum LoopEvent {
    Namespaces(Result<Vec<String>, String>),
    SectionLoaded {
        section: Section,
        seq: u64,
        result: Result<Vec<Card>, String>,
    },
    LogsLoaded {
        seq: u64,
        result: Result<String, String>,
    },
    SwitchElapsed {
        target: Section,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_filter)?;

    let file = config::load(args.config.as_deref())?;
    let settings = Settings::resolve(&args, file)?;

    let gateway = ApiGateway::new(settings.api_url.clone());
    let mut app = App::new(
        gateway.target().to_string(),
        settings.section,
        settings.scope.clone(),
        settings.tail_lines,
    );

    run(&mut app, &gateway).await
}

fn init_tracing(level_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::sink)
        .try_init();

    Ok(())
}

async fn run(app: &mut App, gateway: &ApiGateway) -> Result<()> {
    let mut terminal = init_terminal()?;
    let run_result = run_loop(&mut terminal, app, gateway).await;
    let restore_result = restore_terminal(&mut terminal);

    match (run_result, restore_result) {
        (Err(run_error), Err(restore_error)) => Err(anyhow::anyhow!(
            "{run_error:#}\nterminal restore error: {restore_error:#}"
        )),
        (Err(error), _) => Err(error),
        (_, Err(error)) => Err(error),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn init_terminal() -> Result<TuiTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut TuiTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

async fn run_loop(terminal: &mut TuiTerminal, app: &mut App, gateway: &ApiGateway) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<LoopEvent>();

    // The namespace list is fetched once at startup; the initial section
    // starts loading right away.
    spawn_namespace_fetch(gateway.clone(), tx.clone());
    let initial = app.begin_section_load(app.active_section());
    dispatch(initial, gateway, &tx);

    let mut reader = EventStream::new();
    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .context("failed to render terminal frame")?;

        if !app.running() {
            break;
        }

        tokio::select! {
            maybe_event = reader.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = input::map_key(app.input_mode(), key) {
                            debug!("action={action:?}");
                            let command = app.apply_action(action);
                            dispatch(command, gateway, &tx);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        app.set_status(format!("terminal event error: {error}"));
                    }
                    None => {
                        app.set_status("terminal event stream closed");
                        break;
                    }
                }
            }
            maybe_message = rx.recv() => {
                let Some(message) = maybe_message else {
                    break;
                };
                handle_loop_event(app, gateway, &tx, message);
            }
        }
    }

    Ok(())
}

fn handle_loop_event(
    app: &mut App,
    gateway: &ApiGateway,
    tx: &mpsc::UnboundedSender<LoopEvent>,
    event: LoopEvent,
) {
    match event {
        LoopEvent::SwitchElapsed { target } => {
            let command = app.complete_section_switch(target);
            dispatch(command, gateway, tx);
        }
        LoopEvent::Namespaces(Ok(namespaces)) => {
            debug!("loaded {} namespaces", namespaces.len());
            app.set_namespaces(namespaces);
        }
        LoopEvent::Namespaces(Err(error)) => {
            warn!("failed to load namespaces: {error}");
            app.set_status("Failed to load namespaces");
        }
        LoopEvent::SectionLoaded {
            section,
            seq,
            result,
        } => {
            if let Err(error) = &result {
                warn!("failed to load {section}: {error}");
            }
            app.finish_section_load(section, seq, result);
        }
        LoopEvent::LogsLoaded { seq, result } => {
            if let Err(error) = &result {
                warn!("failed to load logs: {error}");
            }
            app.finish_logs_load(seq, result);
        }
    }
}

/// Executes a state-machine command. Fetches run on spawned tasks and report
/// back over the channel, so nothing here blocks the interface.
fn dispatch(command: Command, gateway: &ApiGateway, tx: &mpsc::UnboundedSender<LoopEvent>) {
    match command {
        Command::None => {}
        Command::SwitchSection { target } => {
            let tx = tx.clone();
            tokio::spawn(async move {
                sleep(SECTION_SWITCH_DELAY).await;
                let _ = tx.send(LoopEvent::SwitchElapsed { target });
            });
        }
        Command::LoadSection {
            section,
            scope,
            seq,
        } => {
            let gateway = gateway.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = gateway
                    .fetch_section(section, &scope)
                    .await
                    .map_err(|error| format!("{error:#}"));
                let _ = tx.send(LoopEvent::SectionLoaded {
                    section,
                    seq,
                    result,
                });
            });
        }
        Command::LoadLogs {
            namespace,
            pod,
            container,
            tail_lines,
            seq,
        } => {
            let gateway = gateway.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = gateway
                    .fetch_logs(&namespace, &pod, tail_lines, container.as_deref())
                    .await
                    .map_err(|error| format!("{error:#}"));
                let _ = tx.send(LoopEvent::LogsLoaded { seq, result });
            });
        }
    }
}

fn spawn_namespace_fetch(gateway: ApiGateway, tx: mpsc::UnboundedSender<LoopEvent>) {
    tokio::spawn(async move {
        let result = gateway
            .fetch_namespaces()
            .await
            .map_err(|error| format!("{error:#}"));
        let _ = tx.send(LoopEvent::Namespaces(result));
    });
}
