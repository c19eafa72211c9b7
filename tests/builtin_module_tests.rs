//! Integration tests for the built-in modules running inside the headless host.

mod common;

use common::{FakeFontCache, headless_host, started_manager};
use parking_lot::Mutex;
use plugterm::host::Host;
use plugterm::modules::background::{self, BackgroundModule};
use plugterm::modules::box_drawing::BoxDrawingModule;
use plugterm::modules::clipboard::{ClipboardModule, CopyTarget};
use plugterm::modules::fallback_font::{self, FallbackFontModule};
use plugterm::modules::font_zoom::FontZoomModule;
use plugterm::modules::notify::{self, Notification, NotifyModule};
use plugterm::modules::sync_update::SyncUpdateModule;
use plugterm::modules::visual_bell::{self, VisualBellModule};
use plugterm_modules::{
    FontCache, Module, ModuleConfig, ModuleError, ModuleManager, Modifiers, TerminalMode,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

const SYNC_BEGIN: &[u8] = b"\x1bP=1s\x1b\\";
const SYNC_END: &[u8] = b"\x1bP=2s\x1b\\";

fn with_module(host: &Host, module: Box<dyn Module>) -> ModuleManager {
    let mut manager = started_manager(host);
    let name = module.name().to_string();
    manager.register(module);
    manager.activate(&name).unwrap();
    manager
}

fn feed(host: &mut Host, manager: &mut ModuleManager, bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    host.feed(manager, bytes, &mut out).unwrap();
    out
}

fn later(ms: u64) -> Instant {
    Instant::now() + Duration::from_millis(ms)
}

// ── sync-update ─────────────────────────────────────────────────────────

#[test]
fn test_sync_update_suppresses_frames_until_end() {
    let mut host = headless_host();
    let mut manager = with_module(&host, Box::new(SyncUpdateModule::new()));

    let out = feed(&mut host, &mut manager, SYNC_BEGIN);
    assert!(out.is_empty(), "consumed sequence must not reach the output");
    assert_eq!(host.timers.len(), 1);
    assert!(host.render_frame(&mut manager).skipped);

    feed(&mut host, &mut manager, SYNC_END);
    assert!(host.timers.is_empty(), "end cancels the safety timeout");
    let report = host.poll(&mut manager, Instant::now()).expect("end queues a redraw");
    assert!(!report.skipped);
    assert_eq!(report.dirty_rows.len(), 24);
}

#[test]
fn test_sync_update_times_out() {
    let mut host = headless_host();
    let mut manager = with_module(&host, Box::new(SyncUpdateModule::new()));

    feed(&mut host, &mut manager, SYNC_BEGIN);
    assert!(host.poll(&mut manager, Instant::now()).is_none());

    let report = host
        .poll(&mut manager, later(500))
        .expect("timeout forces a repaint");
    assert!(!report.skipped);
    assert!(!host.render_frame(&mut manager).skipped);
}

#[test]
fn test_sync_update_honours_terminal_mode() {
    let mut host = headless_host();
    let mut manager = with_module(&host, Box::new(SyncUpdateModule::new()));

    host.terminal.set_mode(TerminalMode::SynchronizedOutput, true);
    assert!(host.render_frame(&mut manager).skipped);
    host.terminal.set_mode(TerminalMode::SynchronizedOutput, false);
    assert!(!host.render_frame(&mut manager).skipped);
    assert_eq!(host.frame_counts(), (1, 1));
}

#[test]
fn test_sync_update_ignores_other_dcs() {
    let mut host = headless_host();
    let mut manager = with_module(&host, Box::new(SyncUpdateModule::new()));

    let out = feed(&mut host, &mut manager, b"\x1bPq#0\x1b\\");
    assert_eq!(out, b"\x1bPq#0\x1b\\");
    assert!(!host.render_frame(&mut manager).skipped);
}

// ── visual-bell ─────────────────────────────────────────────────────────

fn flash_fills(report: &plugterm::host::FrameReport) -> usize {
    report
        .fills
        .iter()
        .filter(|f| f.color == visual_bell::DEFAULT_COLOR && f.width == 800.0 && f.height == 600.0)
        .count()
}

#[test]
fn test_visual_bell_flashes_until_timer() {
    let mut host = headless_host();
    let mut manager = with_module(&host, Box::new(VisualBellModule::new()));

    feed(&mut host, &mut manager, b"\x07");
    let report = host.poll(&mut manager, Instant::now()).expect("bell queues a redraw");
    assert_eq!(flash_fills(&report), 1);

    let report = host
        .poll(&mut manager, later(1000))
        .expect("end of flash queues a redraw");
    assert_eq!(flash_fills(&report), 0);
    assert!(host.timers.is_empty());
}

#[test]
fn test_visual_bell_restarts_on_repeat() {
    let mut host = headless_host();
    let mut manager = with_module(&host, Box::new(VisualBellModule::new()));

    feed(&mut host, &mut manager, b"\x07\x07\x07");
    // Each bell cancels the previous timer
    assert_eq!(host.timers.len(), 1);
}

#[test]
fn test_visual_bell_rejects_bad_colour() {
    let host = headless_host();
    let mut manager = started_manager(&host);
    manager.register(Box::new(VisualBellModule::new()));
    let config = ModuleConfig::new(visual_bell::NAME).with_setting("color", "#zzzzzz");
    assert!(matches!(
        manager.configure(visual_bell::NAME, &config),
        Err(ModuleError::Config(_))
    ));
}

// ── notify ──────────────────────────────────────────────────────────────

fn notify_with_sink() -> (Box<dyn Module>, Arc<Mutex<Vec<Notification>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let module = NotifyModule::with_sink(move |n, _timeout| sink.lock().push(n.clone()));
    (Box::new(module), seen)
}

/// Wait for the delivery thread to hand over `count` notifications.
fn delivered(seen: &Mutex<Vec<Notification>>, count: usize) -> Vec<Notification> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while seen.lock().len() < count && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    seen.lock().clone()
}

#[test]
fn test_notify_delivers_osc9_and_osc777() {
    let mut host = headless_host();
    let (module, seen) = notify_with_sink();
    let mut manager = with_module(&host, module);

    let out = feed(
        &mut host,
        &mut manager,
        b"\x1b]9;done\x07\x1b]777;notify;cargo;ok\x1b\\",
    );
    assert!(out.is_empty());
    let seen = delivered(&seen, 2);
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].body, "done");
    assert_eq!(seen[1].title, "cargo");
}

#[test]
fn test_notify_only_unfocused() {
    let mut host = headless_host();
    let (module, seen) = notify_with_sink();
    let mut manager = with_module(&host, module);
    manager
        .configure(
            notify::NAME,
            &ModuleConfig::new(notify::NAME).with_setting("only_unfocused", true),
        )
        .unwrap();

    host.set_focus(&mut manager, true);
    let out = feed(&mut host, &mut manager, b"\x1b]9;hidden\x07");
    assert!(out.is_empty(), "suppressed notifications are still consumed");
    host.set_focus(&mut manager, false);
    feed(&mut host, &mut manager, b"\x1b]9;shown\x07");

    // Delivery is ordered, so a leaked "hidden" would arrive first.
    let seen = delivered(&seen, 1);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].body, "shown");
}

#[test]
fn test_notify_dispatch_does_not_wait_for_delivery() {
    let mut host = headless_host();
    let (release, gate) = std::sync::mpsc::channel::<()>();
    let gate = std::sync::Mutex::new(gate);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let module = NotifyModule::with_sink(move |n, _timeout| {
        // A daemon that hangs until the test lets it answer
        let _ = gate.lock().unwrap().recv_timeout(Duration::from_secs(5));
        sink.lock().push(n.clone());
    });
    let mut manager = with_module(&host, Box::new(module));

    let started = Instant::now();
    let out = feed(&mut host, &mut manager, b"\x1b]9;slow\x07after");
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(out, b"after");
    assert!(seen.lock().is_empty(), "delivery is still held by the sink");

    release.send(()).unwrap();
    let seen = delivered(&seen, 1);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].body, "slow");
}

#[test]
fn test_unclaimed_title_is_applied_by_host() {
    let mut host = headless_host();
    let (module, _seen) = notify_with_sink();
    let mut manager = with_module(&host, module);

    let out = feed(&mut host, &mut manager, b"\x1b]2;my title\x07hello");
    assert_eq!(out, b"hello");
    assert_eq!(
        plugterm_modules::Terminal::title(host.terminal.as_ref()),
        "my title"
    );
}

// ── box-drawing ─────────────────────────────────────────────────────────

#[test]
fn test_box_drawing_claims_line_glyphs() {
    let mut host = headless_host();
    let mut manager = with_module(&host, Box::new(BoxDrawingModule::new()));

    feed(&mut host, &mut manager, "┌─┐ ok".as_bytes());
    let report = host.render_frame(&mut manager);
    assert_eq!(report.glyphs_transformed, 3);
    assert_eq!(report.glyphs_rasterized, 2);
    // Corner: two arms, horizontal line: two arms
    assert_eq!(report.fills.len(), 6);
}

#[test]
fn test_box_drawing_inactive_leaves_glyphs_to_font() {
    let mut host = headless_host();
    let mut manager = started_manager(&host);
    manager.register(Box::new(BoxDrawingModule::new()));

    feed(&mut host, &mut manager, "│".as_bytes());
    let report = host.render_frame(&mut manager);
    assert_eq!(report.glyphs_transformed, 0);
    assert_eq!(report.glyphs_rasterized, 1);
}

// ── background ──────────────────────────────────────────────────────────

#[test]
fn test_background_fills_viewport_first() {
    let mut host = headless_host();
    let mut manager = with_module(&host, Box::new(BackgroundModule::new()));
    manager.register(Box::new(VisualBellModule::new()));
    manager.activate(visual_bell::NAME).unwrap();

    feed(&mut host, &mut manager, b"\x07");
    let report = host.render_frame(&mut manager);
    assert_eq!(report.fills.len(), 2);
    assert_eq!(report.fills[0].color, background::DEFAULT_COLOR);
    assert_eq!(report.fills[1].color, visual_bell::DEFAULT_COLOR);
}

// ── font-zoom ───────────────────────────────────────────────────────────

#[cfg(target_os = "macos")]
const PRIMARY: Modifiers = Modifiers::SUPER;
#[cfg(not(target_os = "macos"))]
const PRIMARY: Modifiers = Modifiers::CONTROL;

#[test]
fn test_font_zoom_adjusts_scale() {
    let host = headless_host();
    let mut manager = with_module(&host, Box::new(FontZoomModule::new()));
    let chord = PRIMARY | Modifiers::SHIFT;

    assert!(host.key_event(&mut manager, 0x2b, 21, chord));
    assert!((host.fonts.scale() - 1.1).abs() < 1e-5);
    assert!(host.window.take_redraw_request());

    assert!(host.key_event(&mut manager, 0x30, 19, chord));
    assert_eq!(host.fonts.scale(), 1.0);

    // Plain keys go to the PTY
    assert!(!host.key_event(&mut manager, 0x2b, 21, Modifiers::NONE));
}

// ── clipboard ───────────────────────────────────────────────────────────

#[test]
fn test_clipboard_copies_completed_selection() {
    let host = headless_host();
    let copied = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&copied);
    let module = ClipboardModule::with_sink(move |text, target| {
        sink.lock().push((text.to_string(), target));
        Ok(())
    });
    let mut manager = with_module(&host, Box::new(module));
    manager
        .configure(
            "clipboard",
            &ModuleConfig::new("clipboard")
                .with_setting("max_bytes", 4)
                .with_setting("target", "both"),
        )
        .unwrap();

    host.selection_done(&mut manager, "echo hi");
    host.selection_done(&mut manager, "");
    assert_eq!(
        *copied.lock(),
        vec![("echo".to_string(), CopyTarget::Both)]
    );
}

// ── fallback-font ───────────────────────────────────────────────────────

fn manager_with_fonts(fonts: &Arc<FakeFontCache>) -> ModuleManager {
    let mut manager = ModuleManager::new();
    manager.set_font_cache(fonts);
    manager.complete_startup();
    manager
}

#[test]
fn test_fallback_font_registers_and_removes_families() {
    let fonts = Arc::new(FakeFontCache::new(&["Symbola", "Noto Color Emoji"]));
    let mut manager = manager_with_fonts(&fonts);
    manager.register(Box::new(FallbackFontModule::with_families([
        "Symbola",
        "Not Installed",
    ])));

    manager.activate(fallback_font::NAME).unwrap();
    assert_eq!(fonts.fallbacks(), vec!["Symbola"]);

    manager.deactivate(fallback_font::NAME);
    assert!(fonts.fallbacks().is_empty());
}

#[test]
fn test_fallback_font_fails_when_nothing_resolves() {
    let fonts = Arc::new(FakeFontCache::new(&["Symbola"]));
    let mut manager = manager_with_fonts(&fonts);
    manager.register(Box::new(FallbackFontModule::with_families(["Nope"])));

    assert!(matches!(
        manager.activate(fallback_font::NAME),
        Err(ModuleError::Activation { .. })
    ));
    assert!(!manager.is_active(fallback_font::NAME));
}

#[test]
fn test_fallback_font_needs_a_font_cache() {
    let mut manager = ModuleManager::new();
    manager.complete_startup();
    manager.register(Box::new(FallbackFontModule::with_families(["Symbola"])));

    let err = manager.activate(fallback_font::NAME).unwrap_err();
    assert!(err.to_string().contains("font cache"), "{err}");
}

#[test]
fn test_fallback_font_reads_families_from_config() {
    let fonts = Arc::new(FakeFontCache::new(&["Symbola"]));
    let mut manager = manager_with_fonts(&fonts);
    manager.register(Box::new(FallbackFontModule::new()));
    manager
        .configure(
            fallback_font::NAME,
            &ModuleConfig::new(fallback_font::NAME).with_setting("families", vec!["Symbola"]),
        )
        .unwrap();

    manager.activate(fallback_font::NAME).unwrap();
    assert_eq!(fonts.fallbacks(), vec!["Symbola"]);
}
