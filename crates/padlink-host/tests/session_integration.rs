//! Integration tests for the device session.
//!
//! These tests drive `DeviceSession` through its public API exactly as the
//! runtime loop does: raw byte chunks in, protocol lines and session
//! events out.  A recording runner stands in for the process-spawning
//! collaborator so no shell is ever launched.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::mpsc;

use padlink_core::{encode_set_config, AssignmentKind, SongInfo};
use padlink_host::application::media_sync::MediaPushSynchronizer;
use padlink_host::application::session::{DeviceSession, SessionEvent};
use padlink_host::infrastructure::command_exec::{CommandError, CommandRunner};
use padlink_host::infrastructure::storage::commands::CommandStore;

/// Test double for the process layer: records invocations, spawns nothing.
#[derive(Clone, Default)]
struct RecordingRunner {
    calls: Arc<Mutex<Vec<(u8, String)>>>,
}

impl RecordingRunner {
    fn calls(&self) -> Vec<(u8, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, slot: u8, command: &str) -> Result<(), CommandError> {
        self.calls.lock().unwrap().push((slot, command.to_string()));
        Ok(())
    }
}

struct Fixture {
    session: DeviceSession<RecordingRunner>,
    runner: RecordingRunner,
    outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    store: CommandStore,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "padlink_it_{name}_{}",
            std::process::id()
        ));
        let store = CommandStore::new(dir.join("commands.json"));

        let runner = RecordingRunner::default();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let session = DeviceSession::new(
            runner.clone(),
            store.clone(),
            outbound_tx,
            events_tx,
            MediaPushSynchronizer::default(),
        );

        Self {
            session,
            runner,
            outbound: outbound_rx,
            events: events_rx,
            store,
        }
    }

    fn sent_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.outbound.try_recv() {
            lines.push(line);
        }
        lines
    }

    fn received_events(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        if let Some(dir) = self.store.path().parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }
}

fn playing(title: &str) -> SongInfo {
    SongInfo {
        title: title.to_string(),
        playing: true,
        position_ms: 1000,
        duration_ms: 200_000,
    }
}

// ── Configuration round trip through the session ──────────────────────────

#[test]
fn test_device_config_report_round_trips_through_the_session() {
    let mut fx = Fixture::new("config_roundtrip");

    // Assign locally, push, and verify the encoded line.
    let mut capture = padlink_core::CaptureSession::new();
    capture.press(padlink_core::HostKey::LeftCtrl);
    capture.press(padlink_core::HostKey::KeyV);
    fx.session
        .table_mut()
        .get_mut(0)
        .unwrap()
        .assign_combo(&capture.resolve());
    fx.session.push_config();

    let lines = fx.sent_lines();
    assert_eq!(lines.len(), 1);
    let payload = lines[0].strip_prefix("SET_CONFIG:").expect("prefix");

    // Feed the same payload back as a device report, split awkwardly.
    let report = format!("CONFIG:{payload}\n");
    let (a, b) = report.as_bytes().split_at(9);
    fx.session.handle_bytes(a);
    assert!(fx.received_events().is_empty(), "partial line produced an event");
    fx.session.handle_bytes(b);

    assert_eq!(
        fx.received_events(),
        vec![SessionEvent::ConfigLoaded { slots_applied: 13 }]
    );
    let slot = fx.session.table().get(0).unwrap();
    assert_eq!(slot.kind(), AssignmentKind::KeyCombo);
    assert_eq!(slot.display_text(), "Ctrl + V");
}

#[test]
fn test_push_config_persists_commands_for_the_next_session() {
    let dir;
    {
        let mut fx = Fixture::new("persist");
        dir = fx.store.path().parent().unwrap().to_path_buf();
        fx.session
            .table_mut()
            .get_mut(10)
            .unwrap()
            .assign_command("xdg-open .");
        fx.session.push_config();

        // A fresh session over the same store sees the text again.
        let reborn = DeviceSession::new(
            RecordingRunner::default(),
            fx.store.clone(),
            mpsc::unbounded_channel().0,
            mpsc::unbounded_channel().0,
            MediaPushSynchronizer::default(),
        );
        assert_eq!(
            reborn.session_command_text(10),
            Some("xdg-open .".to_string())
        );
    }
    std::fs::remove_dir_all(dir).ok();
}

// Helper trait shim: read a slot's command text through the public API.
trait CommandTextExt {
    fn session_command_text(&self, index: usize) -> Option<String>;
}

impl CommandTextExt for DeviceSession<RecordingRunner> {
    fn session_command_text(&self, index: usize) -> Option<String> {
        self.table()
            .get(index)
            .and_then(|slot| slot.command_text().map(str::to_string))
    }
}

// ── CMD dispatch ──────────────────────────────────────────────────────────

#[test]
fn test_cmd_line_launches_the_stored_command() {
    let mut fx = Fixture::new("cmd");
    fx.session
        .table_mut()
        .get_mut(12)
        .unwrap()
        .assign_command("mpv --pause");

    fx.session.handle_bytes(b"CMD:12\n");

    assert_eq!(fx.runner.calls(), vec![(12u8, "mpv --pause".to_string())]);
    assert_eq!(
        fx.received_events(),
        vec![SessionEvent::CommandLaunched { slot: 12 }]
    );
}

#[test]
fn test_cmd_for_unassigned_slot_is_ignored() {
    let mut fx = Fixture::new("cmd_ignored");

    fx.session.handle_bytes(b"CMD:5\n");

    assert!(fx.runner.calls().is_empty());
    assert!(fx.received_events().is_empty());
}

// ── Interleaved traffic ───────────────────────────────────────────────────

#[test]
fn test_interleaved_lines_dispatch_in_arrival_order() {
    let mut fx = Fixture::new("interleaved");
    fx.session
        .table_mut()
        .get_mut(3)
        .unwrap()
        .assign_command("true");

    // One chunk carrying an ack, a config report, and a command trigger.
    let table_line = encode_set_config(fx.session.table());
    let payload = table_line.strip_prefix("SET_CONFIG:").unwrap();
    let chunk = format!("OK\nCONFIG:{payload}\nCMD:3\n");

    fx.session.handle_bytes(chunk.as_bytes());

    let events = fx.received_events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], SessionEvent::ConfigWritten);
    assert_eq!(events[1], SessionEvent::ConfigLoaded { slots_applied: 13 });
    assert_eq!(events[2], SessionEvent::CommandLaunched { slot: 3 });
}

// ── Media push flow control ───────────────────────────────────────────────

#[test]
fn test_push_ack_and_suppression_flow() {
    let mut fx = Fixture::new("media_ack");
    let now = Instant::now();

    // First tick pushes.
    fx.session.handle_tick(playing("Song"), now);
    assert_eq!(fx.sent_lines(), vec!["SONG_INFO:Song,1,1000,200000"]);

    // A tick mid-wait must not write again.
    fx.session.handle_tick(playing("Song Changed"), now);
    assert!(fx.sent_lines().is_empty());

    // The ACK resolves the wait without surfacing ConfigWritten.
    fx.session.handle_bytes(b"OK\n");
    assert!(fx.received_events().is_empty());

    // The acknowledged payload is suppressed; a new one goes out.
    fx.session.handle_tick(playing("Song"), now);
    assert!(fx.sent_lines().is_empty());
    fx.session.handle_tick(playing("Another"), now);
    assert_eq!(fx.sent_lines(), vec!["SONG_INFO:Another,1,1000,200000"]);
}

#[test]
fn test_push_timeout_retries_and_late_ok_goes_to_config_path() {
    let mut fx = Fixture::new("media_timeout");
    let now = Instant::now();

    fx.session.handle_tick(playing("Song"), now);
    assert_eq!(fx.sent_lines().len(), 1);
    assert!(fx.session.ack_deadline().is_some());

    // No OK arrives; the loop fires the timeout.
    fx.session.handle_ack_timeout();
    assert_eq!(fx.session.ack_deadline(), None);

    // The unacknowledged payload is retried verbatim.
    fx.session.handle_tick(playing("Song"), now);
    assert_eq!(fx.sent_lines(), vec!["SONG_INFO:Song,1,1000,200000"]);

    // An OK that arrives after the timeout resolved belongs to the
    // configuration path, not the (new) pending push created above...
    fx.session.handle_bytes(b"OK\n");
    assert!(fx.received_events().is_empty(), "OK claimed by the retry push");

    // ...and with nothing pending, OK surfaces as ConfigWritten.
    fx.session.handle_bytes(b"OK\n");
    assert_eq!(fx.received_events(), vec![SessionEvent::ConfigWritten]);
}

#[test]
fn test_disconnect_resets_push_baseline() {
    let mut fx = Fixture::new("media_disconnect");
    let now = Instant::now();

    fx.session.handle_tick(playing("Song"), now);
    fx.session.handle_bytes(b"OK\n");
    fx.sent_lines();

    // Disconnect drops the baseline; on reconnect the same payload is
    // pushed again rather than assumed acknowledged.
    fx.session.handle_disconnect();
    fx.session.handle_tick(playing("Song"), now);
    assert_eq!(fx.sent_lines(), vec!["SONG_INFO:Song,1,1000,200000"]);
}

#[test]
fn test_idle_media_payload_matches_device_contract() {
    let mut fx = Fixture::new("media_idle");

    fx.session.handle_tick(SongInfo::idle(), Instant::now());

    assert_eq!(
        fx.sent_lines(),
        vec!["SONG_INFO:Waiting for the beat...,0,0,0"]
    );
}
