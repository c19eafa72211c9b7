use anyhow::{Context, Result};
use plugterm::cli::{self, CliResult, RuntimeOptions};
use plugterm::host::{Host, resolve_backend};
use plugterm::modules::builtin_modules;
use plugterm_config::Config;
use plugterm_fonts::SystemFontCache;
use plugterm_modules::ModuleManager;
use std::io::{self, Read};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Wake-up interval when no timer is pending.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Upper bound on how long shutdown waits for pending timers.
const DRAIN_LIMIT: Duration = Duration::from_secs(2);

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let (options, mcp) = match cli::process_cli() {
        CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        CliResult::Continue(options) => (options, false),
        CliResult::McpServer(options) => (options, true),
    };
    plugterm::debug::init_log_bridge(options.log_level);
    log::info!("Starting plugterm {}", plugterm::VERSION);

    let config = load_config(&options)?;
    plugterm::debug::apply_config_level(config.log_level);

    let mut host = Host::new(SystemFontCache::new().with_default_fallbacks());
    {
        let mut manager = ModuleManager::get_default().lock();
        for module in builtin_modules() {
            manager.register(module);
        }
        host.install(&mut manager, resolve_backend(config.backend));
        for err in manager.apply_config(&config) {
            log::error!("{}", err);
            eprintln!("plugterm: {err}");
        }
    }

    if mcp {
        plugterm_mcp::set_app_version(plugterm::VERSION);
        plugterm_mcp::run_mcp_server(ModuleManager::get_default());
    } else {
        run_stream(&mut host)?;
    }

    ModuleManager::get_default().lock().deactivate_all();
    log::info!("plugterm exiting");
    Ok(())
}

fn load_config(options: &RuntimeOptions) -> Result<Config> {
    match &options.config_path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Config::load(),
    }
}

/// Pump stdin through the host until EOF, rendering on demand.
fn run_stream(host: &mut Host) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Vec<u8>>();
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let mut stdin = io::stdin().lock();
            let mut buf = [0u8; 4096];
            loop {
                match stdin.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        log::error!("stdin read failed: {}", e);
                        break;
                    }
                }
            }
        })
        .context("failed to spawn stdin reader")?;

    let mut stdout = io::stdout().lock();
    loop {
        let timeout = host
            .timers
            .next_deadline()
            .map_or(IDLE_POLL, |deadline| {
                deadline.saturating_duration_since(Instant::now())
            });
        let received = rx.recv_timeout(timeout);

        let mut manager = ModuleManager::get_default().lock();
        match received {
            Ok(bytes) => host.feed(&mut manager, &bytes, &mut stdout)?,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        if let Some(report) = host.poll(&mut manager, Instant::now()) {
            log::trace!("{:?}", report);
        }
    }

    // Let pending timers (bell flashes, sync timeouts) finish.
    let give_up = Instant::now() + DRAIN_LIMIT;
    while let Some(deadline) = host.timers.next_deadline() {
        if deadline > give_up {
            break;
        }
        thread::sleep(deadline.saturating_duration_since(Instant::now()));
        let mut manager = ModuleManager::get_default().lock();
        host.poll(&mut manager, Instant::now());
    }

    let (rendered, skipped) = host.frame_counts();
    log::info!("Stream closed: {} frames rendered, {} skipped", rendered, skipped);
    Ok(())
}
