//! Integration tests for registration, lifecycle and priority dispatch.

mod common;

use common::{Journal, ProbeModule, Reaction, headless_host, journal, started_manager};
use plugterm_config::{Config, ModuleSection};
use plugterm_modules::{
    Capability, EscapeKind, HookPoint, ModuleError, ModuleManager, ModuleState, Modifiers,
    PRIORITY_HIGH,
};

/// Journal entries ending in `:event`, without the suffix.
fn calls(journal: &Journal, event: &str) -> Vec<String> {
    let suffix = format!(":{event}");
    journal
        .lock()
        .iter()
        .filter_map(|e| e.strip_suffix(&suffix).map(str::to_string))
        .collect()
}

fn activate_all(manager: &mut ModuleManager) {
    for name in manager.module_names() {
        manager.activate(&name).unwrap();
    }
}

#[test]
fn test_duplicate_name_is_rejected() {
    let j = journal();
    let mut manager = ModuleManager::new();
    assert!(manager.register(ProbeModule::new("a", &j).on_bell(Reaction::Pass).boxed()));
    assert!(!manager.register(ProbeModule::new("a", &j).on_key(Reaction::Pass).boxed()));

    assert_eq!(manager.len(), 1);
    // The original registration is untouched
    let caps = manager.capabilities("a").unwrap();
    assert!(caps.contains(Capability::Bell));
    assert!(!caps.contains(Capability::Input));
}

#[test]
fn test_registration_round_trip() {
    let j = journal();
    let mut manager = ModuleManager::new();
    manager.register(ProbeModule::new("a", &j).on_bell(Reaction::Pass).boxed());
    let module = manager.take_module("a").expect("module should come back");
    assert_eq!(module.name(), "a");
    assert!(!manager.contains("a"));
    assert!(manager.hook_order(HookPoint::Bell).is_empty());

    // The same name may be registered again once removed
    assert!(manager.register(module));
    assert_eq!(manager.hook_order(HookPoint::Bell), vec!["a"]);
}

#[test]
fn test_bell_broadcast_runs_in_priority_order() {
    let host = headless_host();
    let j = journal();
    let mut manager = started_manager(&host);
    manager.register(ProbeModule::new("x", &j).on_bell(Reaction::Pass).boxed());
    manager.register(
        ProbeModule::new("y", &j)
            .priority(PRIORITY_HIGH)
            .on_bell(Reaction::Pass)
            .boxed(),
    );
    activate_all(&mut manager);

    manager.dispatch_bell();
    assert_eq!(calls(&j, "bell"), vec!["y", "x"]);
}

#[test]
fn test_equal_priority_keeps_registration_order() {
    let host = headless_host();
    let j = journal();
    let mut manager = started_manager(&host);
    for name in ["first", "second", "third"] {
        manager.register(ProbeModule::new(name, &j).on_bell(Reaction::Pass).boxed());
    }
    activate_all(&mut manager);

    manager.dispatch_bell();
    assert_eq!(calls(&j, "bell"), vec!["first", "second", "third"]);
}

#[test]
fn test_set_priority_reorders_dispatch() {
    let host = headless_host();
    let j = journal();
    let mut manager = started_manager(&host);
    manager.register(ProbeModule::new("a", &j).on_bell(Reaction::Pass).boxed());
    manager.register(ProbeModule::new("b", &j).on_bell(Reaction::Pass).boxed());
    activate_all(&mut manager);

    assert!(manager.set_priority("b", -5));
    assert_eq!(manager.get_priority("b"), Some(-5));
    manager.dispatch_bell();
    assert_eq!(calls(&j, "bell"), vec!["b", "a"]);
}

#[test]
fn test_inactive_modules_are_skipped() {
    let host = headless_host();
    let j = journal();
    let mut manager = started_manager(&host);
    manager.register(ProbeModule::new("on", &j).on_bell(Reaction::Pass).boxed());
    manager.register(ProbeModule::new("off", &j).on_bell(Reaction::Pass).boxed());
    manager.activate("on").unwrap();

    manager.dispatch_bell();
    assert_eq!(calls(&j, "bell"), vec!["on"]);
    assert_eq!(manager.state("off"), Some(ModuleState::Inactive));
}

#[test]
fn test_activation_is_idempotent() {
    let host = headless_host();
    let j = journal();
    let mut manager = started_manager(&host);
    manager.register(ProbeModule::new("a", &j).boxed());

    manager.activate("a").unwrap();
    manager.activate("a").unwrap();
    assert_eq!(calls(&j, "activate"), vec!["a"]);

    assert!(manager.deactivate("a"));
    assert!(manager.deactivate("a"));
    assert_eq!(calls(&j, "deactivate"), vec!["a"]);
}

#[test]
fn test_failed_activation_leaves_module_inactive() {
    let host = headless_host();
    let j = journal();
    let mut manager = started_manager(&host);
    manager.register(
        ProbeModule::new("grumpy", &j)
            .on_bell(Reaction::Pass)
            .failing_activate()
            .boxed(),
    );

    let err = manager.activate("grumpy").unwrap_err();
    assert!(matches!(err, ModuleError::Activation { ref module, .. } if module == "grumpy"));
    assert!(!manager.is_active("grumpy"));
    assert!(manager.contains("grumpy"));

    manager.dispatch_bell();
    assert!(calls(&j, "bell").is_empty());
}

#[test]
fn test_first_consumer_wins_stops_the_walk() {
    let host = headless_host();
    let j = journal();
    let mut manager = started_manager(&host);
    manager.register(
        ProbeModule::new("early", &j)
            .priority(-10)
            .on_escape(Reaction::Pass)
            .boxed(),
    );
    manager.register(ProbeModule::new("claimer", &j).on_escape(Reaction::Consume).boxed());
    manager.register(
        ProbeModule::new("late", &j)
            .priority(10)
            .on_escape(Reaction::Consume)
            .boxed(),
    );
    activate_all(&mut manager);

    assert!(manager.dispatch_escape_string(EscapeKind::Osc, b"9;hi"));
    assert_eq!(calls(&j, "escape"), vec!["early", "claimer"]);
}

#[test]
fn test_unconsumed_event_reports_false() {
    let host = headless_host();
    let j = journal();
    let mut manager = started_manager(&host);
    manager.register(ProbeModule::new("a", &j).on_key(Reaction::Pass).boxed());
    manager.register(ProbeModule::new("b", &j).on_key(Reaction::Pass).boxed());
    activate_all(&mut manager);

    assert!(!manager.dispatch_key_event(0x61, 38, Modifiers::NONE));
    assert_eq!(calls(&j, "key"), vec!["a", "b"]);
}

#[test]
fn test_failing_and_panicking_handlers_are_isolated() {
    let host = headless_host();
    let j = journal();
    let mut manager = started_manager(&host);
    manager.register(
        ProbeModule::new("broken", &j)
            .priority(-2)
            .on_escape(Reaction::Fail)
            .boxed(),
    );
    manager.register(
        ProbeModule::new("explodes", &j)
            .priority(-1)
            .on_escape(Reaction::Panic)
            .boxed(),
    );
    manager.register(ProbeModule::new("works", &j).on_escape(Reaction::Consume).boxed());
    activate_all(&mut manager);

    // Neither failure counts as handled; the walk reaches the next module
    assert!(manager.dispatch_escape_string(EscapeKind::Dcs, b"=1s"));
    assert_eq!(calls(&j, "escape"), vec!["broken", "explodes", "works"]);

    // The panicking module stays registered and keeps being called
    assert!(manager.is_active("explodes"));
    manager.dispatch_escape_string(EscapeKind::Dcs, b"=2s");
    assert_eq!(calls(&j, "escape").len(), 6);
}

#[test]
fn test_broadcast_continues_past_failing_and_panicking_handlers() {
    let host = headless_host();
    let j = journal();
    let mut manager = started_manager(&host);
    manager.register(ProbeModule::new("broken", &j).priority(-2).on_bell(Reaction::Fail).boxed());
    manager.register(
        ProbeModule::new("explodes", &j)
            .priority(-1)
            .on_bell(Reaction::Panic)
            .boxed(),
    );
    manager.register(ProbeModule::new("works", &j).on_bell(Reaction::Pass).boxed());
    activate_all(&mut manager);

    manager.dispatch_bell();
    assert_eq!(calls(&j, "bell"), vec!["broken", "explodes", "works"]);

    // Every module still hears the next bell
    manager.dispatch_bell();
    assert_eq!(
        calls(&j, "bell"),
        vec!["broken", "explodes", "works", "broken", "explodes", "works"]
    );
    assert!(manager.is_active("broken"));
    assert!(manager.is_active("explodes"));
}

#[test]
fn test_dispatch_before_startup_is_skipped() {
    let j = journal();
    let mut manager = ModuleManager::new();
    manager.register(ProbeModule::new("a", &j).on_bell(Reaction::Pass).boxed());
    manager.activate("a").unwrap();

    manager.dispatch_bell();
    assert!(calls(&j, "bell").is_empty());

    manager.complete_startup();
    manager.dispatch_bell();
    assert_eq!(calls(&j, "bell"), vec!["a"]);
}

#[test]
fn test_unknown_module_operations() {
    let mut manager = ModuleManager::new();
    assert!(matches!(manager.activate("ghost"), Err(ModuleError::NotFound(_))));
    assert!(!manager.deactivate("ghost"));
    assert!(!manager.set_priority("ghost", 3));
    assert_eq!(manager.get_priority("ghost"), None);
    assert!(!manager.unregister("ghost"));
}

#[test]
fn test_apply_config_activates_enabled_sections() {
    let host = headless_host();
    let j = journal();
    let mut manager = started_manager(&host);
    manager.register(ProbeModule::new("wanted", &j).on_bell(Reaction::Pass).boxed());
    manager.register(ProbeModule::new("disabled", &j).on_bell(Reaction::Pass).boxed());
    manager.register(ProbeModule::new("unlisted", &j).on_bell(Reaction::Pass).boxed());
    manager.register(ProbeModule::new("refuses", &j).failing_activate().boxed());

    let mut config = Config {
        modules: Default::default(),
        ..Config::default()
    };
    config.set_module(
        "wanted",
        ModuleSection {
            priority: Some(-50),
            ..ModuleSection::default()
        },
    );
    config.set_module(
        "disabled",
        ModuleSection {
            enabled: false,
            ..ModuleSection::default()
        },
    );
    config.set_module("refuses", ModuleSection::default());

    let failures = manager.apply_config(&config);
    assert_eq!(failures.len(), 1);
    assert!(manager.is_active("wanted"));
    assert!(!manager.is_active("disabled"));
    assert!(!manager.is_active("unlisted"));
    assert!(!manager.is_active("refuses"));
    assert_eq!(manager.get_priority("wanted"), Some(-50));
}

#[test]
fn test_deactivate_all_runs_in_reverse_registration_order() {
    let host = headless_host();
    let j = journal();
    let mut manager = started_manager(&host);
    for name in ["a", "b", "c"] {
        manager.register(ProbeModule::new(name, &j).boxed());
    }
    activate_all(&mut manager);

    manager.deactivate_all();
    assert_eq!(calls(&j, "deactivate"), vec!["c", "b", "a"]);
}

#[test]
fn test_services_are_visible_after_install() {
    let host = headless_host();
    let manager = started_manager(&host);
    assert!(manager.is_started());
    assert!(manager.get_terminal().is_some());
    assert!(manager.get_window().is_some());
    assert!(manager.get_font_cache().is_some());
    assert!(manager.get_scheduler().is_some());
    assert_eq!(
        manager.get_backend_kind(),
        Some(plugterm_modules::BackendKind::Headless)
    );
}

#[test]
fn test_get_default_is_a_single_instance() {
    let a = ModuleManager::get_default();
    let b = ModuleManager::get_default();
    assert!(std::ptr::eq(a, b));
}
