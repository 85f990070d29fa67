use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use clap::Parser;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{self, ConfigError};
use crate::contract::{AnnouncementDto, StepEvent, StepReport};
use crate::coordinator::{CoordinatorState, FilterCoordinator, FilterOptions};
use crate::page::Page;
use crate::script::{
    parse_interactive_line, parse_script, InteractiveCommand, ScriptError, ScriptEvent,
};
use crate::timer::{Clock, ManualClock, SystemClock};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to read page snapshot {path}: {source}")]
    PageRead { path: PathBuf, source: io::Error },
    #[error("invalid page snapshot {path}: {source}")]
    PageParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("script error: {0}")]
    Script(#[from] ScriptError),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Drive the namespace filter over a rendered page snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "nsfilter-core", version)]
pub struct CliOptions {
    /// Page snapshot (JSON) holding the filter form and entry container.
    #[arg(long = "page")]
    pub page_path: PathBuf,
    /// Config file (TOML, or JSON5 for .json5/.json).
    #[arg(long = "config")]
    pub config_path: Option<PathBuf>,
    /// Replay script; read from stdin when omitted.
    #[arg(long = "script", conflicts_with = "interactive")]
    pub script_path: Option<PathBuf>,
    /// Treat each stdin line as a keystroke-level input value, in real time.
    #[arg(long)]
    pub interactive: bool,
}

pub fn parse_cli_args(args: &[String]) -> Result<CliOptions, clap::Error> {
    let argv = std::iter::once("nsfilter-core").chain(args.iter().map(String::as_str));
    CliOptions::try_parse_from(argv)
}

pub fn run_with_options(options: CliOptions) -> Result<(), RuntimeError> {
    let config = config::load(options.config_path.as_deref())?;
    if !config.config_path.exists() {
        config::save(&config)?;
        eprintln!(
            "[nsfilter-core] wrote default config to {}",
            config.config_path.display()
        );
    }
    if let Err(error) = crate::logging::init(&config) {
        eprintln!("[nsfilter-core] logging disabled: {error}");
    }
    info!(
        mode = if options.interactive { "interactive" } else { "replay" },
        config_path = %config.config_path.display(),
        page = %options.page_path.display(),
        "startup"
    );

    let page = load_page(&options.page_path)?;
    let filter_options = FilterOptions::from(&config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if options.interactive {
        let filter = FilterCoordinator::new(page, &filter_options, SystemClock);
        return run_interactive(filter, &mut out);
    }

    let script = match &options.script_path {
        Some(path) => fs::read_to_string(path)?,
        None => io::read_to_string(io::stdin())?,
    };
    let events = parse_script(&script)?;
    let mut filter = FilterCoordinator::new(page, &filter_options, ManualClock::new());
    replay(&mut filter, &events, &mut out)
}

pub fn load_page(path: &Path) -> Result<Page, RuntimeError> {
    let text = fs::read_to_string(path).map_err(|source| RuntimeError::PageRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| RuntimeError::PageParse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn replay<W: Write>(
    filter: &mut FilterCoordinator<ManualClock>,
    events: &[ScriptEvent],
    out: &mut W,
) -> Result<(), RuntimeError> {
    let clock = filter.clock().clone();
    let mut writer = ReportWriter::new(out);
    writer.write(&*filter, StepEvent::Start, None, clock.elapsed().as_millis() as u64)?;

    if filter.state() == CoordinatorState::Uninitialized {
        warn!("filter inactive; skipping script");
        return Ok(());
    }

    for event in events {
        let (step, announced) = match event {
            ScriptEvent::Input(value) => {
                filter.on_input(value);
                (StepEvent::Input(value.clone()), None)
            }
            ScriptEvent::Submit => {
                filter.submit();
                (StepEvent::Submit, None)
            }
            ScriptEvent::Wait(duration) => {
                clock.advance(*duration);
                let step = StepEvent::Wait {
                    elapsed_ms: duration.as_millis() as u64,
                };
                (step, filter.poll())
            }
            ScriptEvent::Settle => {
                let before = clock.now();
                if let Some(deadline) = filter.next_deadline() {
                    clock.advance(deadline.saturating_duration_since(before));
                }
                let step = StepEvent::Wait {
                    elapsed_ms: clock.now().saturating_duration_since(before).as_millis() as u64,
                };
                (step, filter.poll())
            }
            ScriptEvent::First => {
                let label = filter.first_visible().map(|entry| entry.label().to_string());
                (StepEvent::First { label }, None)
            }
        };

        let at_ms = clock.elapsed().as_millis() as u64;
        writer.write(&*filter, step, announced.map(AnnouncementDto::from), at_ms)?;
    }

    Ok(())
}

fn run_interactive<W: Write>(
    mut filter: FilterCoordinator<SystemClock>,
    out: &mut W,
) -> Result<(), RuntimeError> {
    let started = Instant::now();
    let mut writer = ReportWriter::new(out);
    writer.write(&filter, StepEvent::Start, None, 0)?;
    if filter.state() == CoordinatorState::Uninitialized {
        return Ok(());
    }

    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        let received = match filter.next_deadline() {
            Some(deadline) => rx.recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(line) => {
                let step = match parse_interactive_line(&line) {
                    InteractiveCommand::Quit => break,
                    InteractiveCommand::Event(ScriptEvent::Submit) => {
                        filter.submit();
                        StepEvent::Submit
                    }
                    InteractiveCommand::Event(ScriptEvent::First) => StepEvent::First {
                        label: filter.first_visible().map(|entry| entry.label().to_string()),
                    },
                    InteractiveCommand::Event(ScriptEvent::Input(value)) => {
                        filter.on_input(&value);
                        StepEvent::Input(value)
                    }
                    InteractiveCommand::Event(ScriptEvent::Wait(_) | ScriptEvent::Settle) => continue,
                };
                writer.write(&filter, step, None, elapsed_ms(started))?;
            }
            Err(RecvTimeoutError::Timeout) => {
                if let Some(announced) = filter.poll() {
                    let at_ms = elapsed_ms(started);
                    let step = StepEvent::Wait { elapsed_ms: at_ms };
                    writer.write(&filter, step, Some(announced.into()), at_ms)?;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(deadline) = filter.next_deadline() {
                    thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    if let Some(announced) = filter.poll() {
                        let step = StepEvent::Wait {
                            elapsed_ms: elapsed_ms(started),
                        };
                        writer.write(&filter, step, Some(announced.into()), elapsed_ms(started))?;
                    }
                }
                break;
            }
        }
    }

    Ok(())
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

struct ReportWriter<'a, W: Write> {
    out: &'a mut W,
    step: usize,
}

impl<'a, W: Write> ReportWriter<'a, W> {
    fn new(out: &'a mut W) -> Self {
        Self { out, step: 0 }
    }

    fn write<C: Clock>(
        &mut self,
        filter: &FilterCoordinator<C>,
        event: StepEvent,
        announced: Option<AnnouncementDto>,
        at_ms: u64,
    ) -> Result<(), RuntimeError> {
        let report = StepReport {
            step: self.step,
            at_ms,
            event,
            announced,
            report: filter.snapshot(),
        };
        serde_json::to_writer(&mut *self.out, &report)?;
        writeln!(self.out)?;
        self.out.flush()?;
        self.step += 1;
        Ok(())
    }
}
