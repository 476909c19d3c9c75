//! PadLink host application entry point.
//!
//! Wires the infrastructure together and runs the session loop on the
//! Tokio runtime:
//!
//! ```text
//! main()
//!  └─ load AppConfig + command map
//!  └─ resolve serial port (fixed name or VID/PID scan)
//!  └─ serial::start_io          -- read/write tasks
//!  └─ DeviceSession             -- one task owns all session state
//!       ├─ inbound byte chunks  (serial read task)
//!       ├─ media tick           (interval)
//!       ├─ ACK deadline         (sleep_until, armed while awaiting)
//!       └─ Ctrl-C               (shutdown)
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use padlink_core::SongInfo;
use padlink_host::application::media_sync::MediaPushSynchronizer;
use padlink_host::application::session::DeviceSession;
use padlink_host::infrastructure::command_exec::ShellCommandRunner;
use padlink_host::infrastructure::media::{IdleMediaSource, NowPlayingSource};
use padlink_host::infrastructure::serial;
use padlink_host::infrastructure::storage::commands::CommandStore;
use padlink_host::infrastructure::storage::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config is loaded before logging is up; fall back silently and report
    // once the subscriber exists.
    let (app_config, config_error) = match config::load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (config::AppConfig::default(), Some(e)),
    };

    // Initialise structured logging.  `RUST_LOG` overrides the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(app_config.host.log_level.clone())),
        )
        .init();

    info!("PadLink host starting");
    if let Some(e) = config_error {
        warn!(error = %e, "could not load config; using defaults");
    }

    // ── Resolve and open the serial port ──────────────────────────────────
    let port = match &app_config.serial.port {
        Some(port) => port.clone(),
        None => {
            info!(
                "searching for device VID {:04X} PID {:04X}",
                app_config.serial.vid, app_config.serial.pid
            );
            serial::find_port(app_config.serial.vid, app_config.serial.pid)?.ok_or_else(|| {
                anyhow::anyhow!(
                    "device not found (VID {:04X} PID {:04X}); set serial.port in the config to \
                     connect manually",
                    app_config.serial.vid,
                    app_config.serial.pid
                )
            })?
        }
    };

    let stream = serial::connect(&port, app_config.serial.baud)?;
    let (mut link, _reader, _writer) = serial::start_io(stream);

    // ── Session ───────────────────────────────────────────────────────────
    let store = CommandStore::new(config::config_dir()?.join("commands.json"));
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut session = DeviceSession::new(
        ShellCommandRunner,
        store,
        link.outbound.clone(),
        events_tx,
        MediaPushSynchronizer::new(Duration::from_millis(app_config.media.ack_timeout_ms)),
    );

    // Mirror the desktop client: read the device configuration on connect.
    session.request_config();

    let mut media_source = IdleMediaSource;
    let mut tick = tokio::time::interval(Duration::from_millis(app_config.media.tick_ms));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!(port = %port, "connected; press Ctrl-C to exit");

    loop {
        // Arm the ACK timeout only while a push is outstanding.
        let ack_deadline = session.ack_deadline();

        tokio::select! {
            chunk = link.inbound.recv() => match chunk {
                Some(bytes) => session.handle_bytes(&bytes),
                None => {
                    error!("serial connection lost");
                    session.handle_disconnect();
                    break;
                }
            },
            _ = tick.tick() => {
                let info = media_source.now_playing().unwrap_or_else(SongInfo::idle);
                session.handle_tick(info, std::time::Instant::now());
            }
            _ = sleep_until_deadline(ack_deadline), if ack_deadline.is_some() => {
                session.handle_ack_timeout();
            }
            event = events_rx.recv() => {
                if let Some(event) = event {
                    info!(?event, "session event");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                session.handle_disconnect();
                break;
            }
        }
    }

    info!("PadLink host stopped");
    Ok(())
}

async fn sleep_until_deadline(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        // The branch is disabled by the `if` guard; never resolve.
        None => std::future::pending().await,
    }
}
