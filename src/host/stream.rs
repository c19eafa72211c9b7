//! Byte-stream splitter for the headless host.
//!
//! [`EscapeScanner`] pulls the events modules care about out of a raw
//! terminal output stream: BEL, and escape strings introduced by `ESC ]`
//! (OSC), `ESC P` (DCS), `ESC _` (APC) and `ESC ^` (PM), terminated by BEL
//! or ST (`ESC \`). Everything else, including CSI and other escape
//! sequences, is passed through as text. It is not a VT parser.
//!
//! Input may be fed in arbitrary chunks; state carries across calls.

use plugterm_modules::EscapeKind;

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// Escape strings longer than this are discarded.
pub const MAX_STRING_LEN: usize = 64 * 1024;

/// One scanner output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Bytes to pass through, coalesced.
    Text(Vec<u8>),
    Bell,
    /// Escape string payload, introducer and terminator stripped.
    EscapeString(EscapeKind, Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    String(EscapeKind),
    /// Saw ESC inside a string; `\` completes ST.
    StringEscape(EscapeKind),
}

#[derive(Debug)]
pub struct EscapeScanner {
    state: State,
    text: Vec<u8>,
    payload: Vec<u8>,
    overflowed: bool,
}

impl EscapeScanner {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            text: Vec::new(),
            payload: Vec::new(),
            overflowed: false,
        }
    }

    /// Scan `bytes`, returning completed events in stream order. Text is
    /// flushed at the end of every call; an incomplete escape sequence is held
    /// until the next one.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        for &byte in bytes {
            self.advance(byte, &mut events);
        }
        self.flush_text(&mut events);
        events
    }

    /// `true` if the scanner is in the middle of an escape sequence.
    pub fn is_pending(&self) -> bool {
        self.state != State::Ground
    }

    fn advance(&mut self, byte: u8, events: &mut Vec<StreamEvent>) {
        match self.state {
            State::Ground => match byte {
                BEL => {
                    self.flush_text(events);
                    events.push(StreamEvent::Bell);
                }
                ESC => self.state = State::Escape,
                _ => self.text.push(byte),
            },
            State::Escape => match string_kind(byte) {
                Some(kind) => {
                    self.flush_text(events);
                    self.payload.clear();
                    self.overflowed = false;
                    self.state = State::String(kind);
                }
                None if byte == ESC => {
                    // ESC ESC: the first one is passed through.
                    self.text.push(ESC);
                }
                None => {
                    self.text.push(ESC);
                    self.text.push(byte);
                    self.state = State::Ground;
                }
            },
            State::String(kind) => match byte {
                BEL => self.finish_string(kind, events),
                ESC => self.state = State::StringEscape(kind),
                _ => self.push_payload(byte),
            },
            State::StringEscape(kind) => match byte {
                b'\\' => self.finish_string(kind, events),
                _ => {
                    // ESC followed by something else aborts the string and
                    // starts a new escape sequence.
                    log::debug!("Unterminated {} string aborted", kind);
                    self.payload.clear();
                    self.state = State::Escape;
                    self.advance(byte, events);
                }
            },
        }
    }

    fn push_payload(&mut self, byte: u8) {
        if self.payload.len() >= MAX_STRING_LEN {
            if !self.overflowed {
                log::warn!("Escape string exceeds {} bytes; discarding", MAX_STRING_LEN);
                self.overflowed = true;
            }
            return;
        }
        self.payload.push(byte);
    }

    fn finish_string(&mut self, kind: EscapeKind, events: &mut Vec<StreamEvent>) {
        self.state = State::Ground;
        let payload = std::mem::take(&mut self.payload);
        if self.overflowed {
            self.overflowed = false;
            return;
        }
        events.push(StreamEvent::EscapeString(kind, payload));
    }

    fn flush_text(&mut self, events: &mut Vec<StreamEvent>) {
        if !self.text.is_empty() {
            events.push(StreamEvent::Text(std::mem::take(&mut self.text)));
        }
    }
}

impl Default for EscapeScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn string_kind(byte: u8) -> Option<EscapeKind> {
    match byte {
        b']' => Some(EscapeKind::Osc),
        b'P' => Some(EscapeKind::Dcs),
        b'_' => Some(EscapeKind::Apc),
        b'^' => Some(EscapeKind::Pm),
        _ => None,
    }
}
