//! Desktop notifications requested by programs running in the terminal.
//!
//! Recognised sequences:
//! - `OSC 9 ; body` (iTerm2 style). ConEmu's numeric `OSC 9 ; n ; ...`
//!   subcommands are left alone.
//! - `OSC 777 ; notify ; title ; body` (urxvt / rxvt-unicode style)
//!
//! Delivery runs on a `notify-delivery` thread so a slow notification daemon
//! never stalls dispatch.

use std::sync::{Arc, mpsc};
use std::thread;

use plugterm_modules::{
    EscapeKind, EscapeStringHandler, Module, ModuleConfig, ModuleResult, ServiceLocator, Terminal,
};

pub const NAME: &str = "notify";

/// Default display time for notifications, in milliseconds.
const DEFAULT_TIMEOUT_MS: u32 = 5000;

/// A parsed notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Parse an OSC payload into a notification request.
pub fn parse_notification(payload: &[u8]) -> Option<Notification> {
    let text = String::from_utf8_lossy(payload);

    if let Some(rest) = text.strip_prefix("777;notify;") {
        let (title, body) = rest.split_once(';').unwrap_or(("", rest));
        return Some(Notification {
            title: title.to_string(),
            body: body.to_string(),
        });
    }

    let body = text.strip_prefix("9;")?;
    let numeric_subcommand = body
        .split_once(';')
        .is_some_and(|(head, _)| !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()));
    if numeric_subcommand || body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(Notification {
        title: String::new(),
        body: body.to_string(),
    })
}

type Sink = Arc<dyn Fn(&Notification, u32) + Send + Sync>;
type Delivery = (Notification, u32);

pub struct NotifyModule {
    only_unfocused: bool,
    timeout_ms: u32,
    services: Option<ServiceLocator>,
    sink: Sink,
    /// Queue feeding the delivery thread. Dropping it ends the thread once
    /// queued notifications are delivered.
    queue: Option<mpsc::Sender<Delivery>>,
}

impl NotifyModule {
    pub fn new() -> Self {
        Self::with_sink(|n, timeout_ms| {
            crate::platform::deliver_desktop_notification(&n.title, &n.body, timeout_ms)
        })
    }

    /// Deliver notifications to `sink` instead of the desktop. `sink` runs on
    /// the delivery thread, one notification at a time, in arrival order.
    pub fn with_sink(sink: impl Fn(&Notification, u32) + Send + Sync + 'static) -> Self {
        Self {
            only_unfocused: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            services: None,
            sink: Arc::new(sink),
            queue: None,
        }
    }

    fn spawn_delivery(&self) -> Option<mpsc::Sender<Delivery>> {
        let (tx, rx) = mpsc::channel::<Delivery>();
        let sink = Arc::clone(&self.sink);
        match thread::Builder::new()
            .name("notify-delivery".to_string())
            .spawn(move || {
                for (notification, timeout_ms) in rx {
                    sink(&notification, timeout_ms);
                }
            }) {
            Ok(_) => Some(tx),
            Err(e) => {
                log::warn!("Failed to start notification delivery thread: {}", e);
                None
            }
        }
    }

    /// Queue `notification` for delivery without waiting on it.
    fn enqueue(&mut self, notification: Notification) {
        if self.queue.is_none() {
            self.queue = self.spawn_delivery();
        }
        let Some(queue) = &self.queue else {
            return;
        };
        if let Err(mpsc::SendError((lost, _))) = queue.send((notification, self.timeout_ms)) {
            log::warn!("Notification delivery thread gone, dropped {:?}", lost.body);
            self.queue = None;
        }
    }

    fn window_focused(&self) -> bool {
        self.services
            .as_ref()
            .and_then(ServiceLocator::window)
            .is_some_and(|w| w.is_focused())
    }
}

impl Default for NotifyModule {
    fn default() -> Self {
        Self::new()
    }
}

impl EscapeStringHandler for NotifyModule {
    fn on_escape_string(
        &mut self,
        kind: EscapeKind,
        bytes: &[u8],
        _terminal: Option<&dyn Terminal>,
    ) -> ModuleResult<bool> {
        if kind != EscapeKind::Osc {
            return Ok(false);
        }
        let Some(notification) = parse_notification(bytes) else {
            return Ok(false);
        };

        if self.only_unfocused && self.window_focused() {
            log::debug!("Suppressed notification while focused: {:?}", notification.body);
            return Ok(true);
        }
        crate::debug_info!("NOTIFY", "{:?}: {:?}", notification.title, notification.body);
        self.enqueue(notification);
        Ok(true)
    }
}

impl Module for NotifyModule {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Desktop notifications from OSC 9 and OSC 777"
    }

    fn configure(&mut self, config: &ModuleConfig, services: &ServiceLocator) -> ModuleResult {
        self.only_unfocused = config.get_or("only_unfocused", false);
        self.timeout_ms = config.get_or("timeout_ms", DEFAULT_TIMEOUT_MS);
        self.services = Some(services.clone());
        Ok(())
    }

    fn activate(&mut self, services: &ServiceLocator) -> ModuleResult {
        self.services = Some(services.clone());
        if self.queue.is_none() {
            self.queue = self.spawn_delivery();
        }
        Ok(())
    }

    fn deactivate(&mut self) {
        self.queue = None;
    }

    fn as_escape_string_handler(&mut self) -> Option<&mut dyn EscapeStringHandler> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_osc9() {
        assert_eq!(
            parse_notification(b"9;Build finished"),
            Some(Notification {
                title: String::new(),
                body: "Build finished".to_string()
            })
        );
        // ConEmu progress and numeric subcommands
        assert_eq!(parse_notification(b"9;4;1;50"), None);
        assert_eq!(parse_notification(b"9;1"), None);
    }

    #[test]
    fn test_parse_osc777() {
        assert_eq!(
            parse_notification(b"777;notify;make;done; 0 errors"),
            Some(Notification {
                title: "make".to_string(),
                body: "done; 0 errors".to_string()
            })
        );
        assert_eq!(parse_notification(b"777;other;x"), None);
        assert_eq!(parse_notification(b"0;title"), None);
    }
}
