// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tracetail CLI entrypoint.
//!
//! By default this tails `<url>/traces/<TRACE_ID>.jsonl` and runs the interactive viewer.
//!
//! Use `--dump` to catch up once and print the call tree as JSON instead.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracetail::model::TraceId;
use tracetail::ops::PatchMode;
use tracetail::session::TraceSession;
use tracetail::tail::{
    FileLogSource, HttpLogSource, LogSource, MemoryLogSource, TailConfig, TailPoller,
};
use tracetail::tui::{self, demo};
use tracing_subscriber::EnvFilter;

const DEFAULT_TRACE_URL: &str = "http://127.0.0.1:8935";
const LOG_FILTER_ENV: &str = "TRACETAIL_LOG";
const DEFAULT_LOG_FILTER: &str = "tracetail=info";
const DEMO_LINE_INTERVAL: Duration = Duration::from_millis(700);
const DEMO_SLOW_INTERVAL: Duration = Duration::from_millis(200);

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <TRACE_ID> [--url <base>] [--log-file <path>] [--strict] [--dump]\n  {program} <TRACE_ID> --dir <traces-dir> [--log-file <path>] [--strict] [--dump]\n  {program} --demo [--log-file <path>]\n\nTRACE_ID is the 26-character ULID of the trace to follow.\n--url selects the trace server (default {DEFAULT_TRACE_URL}); the log is read from\n`<base>/traces/<TRACE_ID>.jsonl` with byte-range requests.\n--dir reads `<traces-dir>/<TRACE_ID>.jsonl` from disk instead; it cannot be combined with --url.\n\n--strict drops writes to calls that were never introduced instead of creating them.\n--dump reads the log once, prints the call tree as JSON and exits.\n--log-file appends logs to <path> (filter via {LOG_FILTER_ENV}, default `{DEFAULT_LOG_FILTER}`)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    demo: bool,
    trace_id: Option<TraceId>,
    url: Option<String>,
    dir: Option<String>,
    log_file: Option<String>,
    strict: bool,
    dump: bool,
}

impl CliOptions {
    fn patch_mode(&self) -> PatchMode {
        if self.strict {
            PatchMode::Strict
        } else {
            PatchMode::Tolerant
        }
    }
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--url" => {
                if options.url.is_some() {
                    return Err(());
                }
                options.url = Some(args.next().ok_or(())?);
            }
            "--dir" => {
                if options.dir.is_some() {
                    return Err(());
                }
                options.dir = Some(args.next().ok_or(())?);
            }
            "--log-file" => {
                if options.log_file.is_some() {
                    return Err(());
                }
                options.log_file = Some(args.next().ok_or(())?);
            }
            "--strict" => {
                if options.strict {
                    return Err(());
                }
                options.strict = true;
            }
            "--dump" => {
                if options.dump {
                    return Err(());
                }
                options.dump = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.trace_id.is_some() {
                    return Err(());
                }
                options.trace_id = Some(TraceId::parse(&arg).map_err(|_| ())?);
            }
        }
    }

    if options.url.is_some() && options.dir.is_some() {
        return Err(());
    }

    if options.demo {
        let tails_a_trace = options.trace_id.is_some()
            || options.url.is_some()
            || options.dir.is_some()
            || options.strict
            || options.dump;
        if tails_a_trace {
            return Err(());
        }
    } else if options.trace_id.is_none() {
        return Err(());
    }

    Ok(options)
}

fn init_logging(options: &CliOptions) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // The viewer owns the terminal, so it only logs when given a file.
    match options.log_file.as_deref() {
        Some(path) => {
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Arc::new(file)).try_init().map_err(boxed)?;
        }
        None if options.dump => {
            builder.with_writer(std::io::stderr).try_init().map_err(boxed)?;
        }
        None => {}
    }
    Ok(())
}

fn boxed(err: Box<dyn Error + Send + Sync>) -> Box<dyn Error> {
    err
}

fn log_source(
    options: &CliOptions,
    trace_id: &TraceId,
) -> Result<Arc<dyn LogSource>, Box<dyn Error>> {
    if let Some(dir) = options.dir.as_deref() {
        return Ok(Arc::new(FileLogSource::in_dir(Path::new(dir), trace_id)));
    }
    let url = options.url.as_deref().unwrap_or(DEFAULT_TRACE_URL);
    Ok(Arc::new(HttpLogSource::new(url, trace_id)?))
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "tracetail".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_logging(&options)?;
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        if options.demo {
            let session = TraceSession::new(demo::demo_trace_id()?, PatchMode::Tolerant);
            let source = MemoryLogSource::new();
            let config = TailConfig { slow_interval: DEMO_SLOW_INTERVAL, ..TailConfig::default() };

            runtime.block_on(async move {
                let feeder = tokio::spawn(demo::feed(
                    source.clone(),
                    demo::demo_lines(),
                    DEMO_LINE_INTERVAL,
                ));
                let result = tui::run_live(session, source, config).await;
                feeder.abort();
                result
            })?;
            return Ok(());
        }

        let Some(trace_id) = options.trace_id.clone() else {
            print_usage(&program);
            std::process::exit(2);
        };
        let source = log_source(&options, &trace_id)?;
        let session = TraceSession::new(trace_id, options.patch_mode());

        if options.dump {
            let session = runtime.block_on(async move {
                let mut session = session;
                let mut poller = TailPoller::new(source, TailConfig::default());
                poller.catch_up(&mut session).await?;
                Ok::<TraceSession, Box<dyn Error>>(session)
            })?;
            println!("{}", serde_json::to_string_pretty(&session.tree().to_json())?);
            return Ok(());
        }

        runtime.block_on(tui::run_live(session, source, TailConfig::default()))?;
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("tracetail: {err}");
        std::process::exit(1);
    }
}
