use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::keyboard::{self, KeyHighlight, KeyboardLayout};
use crate::metrics;
use crate::segmenter::{SentenceSpacing, Segmenter};
use crate::timer::{SessionTimer, TickOutcome, TimeLimit, TimerState};

/// Paragraph budget used when the host has no viewport estimate.
pub const DEFAULT_PARAGRAPH_CAPACITY: usize = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

/// Speed and accuracy figures at one moment of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub wpm: u32,
    pub accuracy: u32,
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    pub total_chars: usize,
    /// Elapsed seconds when the snapshot was taken
    pub time: u64,
}

impl StatsSnapshot {
    /// Compare `typed` against `reference` position by position. Anything typed
    /// past the end of `reference` counts as incorrect.
    pub fn compute(reference: &str, typed: &str, elapsed_secs: u64) -> Self {
        let mut expected = reference.chars();
        let (mut correct_chars, mut incorrect_chars) = (0, 0);

        for c in typed.chars() {
            match expected.next() {
                Some(e) if e == c => correct_chars += 1,
                _ => incorrect_chars += 1,
            }
        }

        let total_chars = correct_chars + incorrect_chars;
        Self {
            wpm: metrics::wpm(correct_chars, elapsed_secs),
            accuracy: metrics::accuracy(correct_chars, total_chars),
            correct_chars,
            incorrect_chars,
            total_chars,
            time: elapsed_secs,
        }
    }
}

/// Engine-side view of the user's settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub time_limit: TimeLimit,
    pub layout: KeyboardLayout,
    pub paragraph_capacity: usize,
    pub spacing: SentenceSpacing,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit: TimeLimit::UNLIMITED,
            layout: KeyboardLayout::default(),
            paragraph_capacity: DEFAULT_PARAGRAPH_CAPACITY,
            spacing: SentenceSpacing::Single,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Stats after an accepted input or a tick
    Progress(StatsSnapshot),
    /// Emitted once per run when the session finishes
    Complete(StatsSnapshot),
    ActiveKeysChanged(BTreeSet<char>),
    ParagraphAdvanced { index: usize },
}

/// Receives session events. Every method defaults to doing nothing.
pub trait SessionObserver {
    fn on_progress(&mut self, _stats: &StatsSnapshot) {}
    fn on_complete(&mut self, _stats: &StatsSnapshot) {}
    fn on_active_keys_changed(&mut self, _keys: &BTreeSet<char>) {}
    fn on_paragraph_advanced(&mut self, _index: usize) {}
}

/// One typing run over a reference text.
///
/// Input arrives as the full typed string for the current paragraph
/// ([`submit_input`](Self::submit_input)) and time arrives as one-second
/// [`tick`](Self::tick)s. Stats are recomputed against the current paragraph
/// only; when a paragraph is completed the next one starts from an empty
/// comparison.
#[derive(Debug, Clone)]
pub struct TypingSession {
    reference_text: String,
    config: SessionConfig,
    paragraphs: Vec<String>,
    current_paragraph: usize,
    typed_text: String,
    status: SessionStatus,
    timer: SessionTimer,
    stats: StatsSnapshot,
    events: Vec<SessionEvent>,
}

impl TypingSession {
    pub fn new(reference_text: impl Into<String>, config: SessionConfig) -> Self {
        let reference_text = reference_text.into();
        let paragraphs = Self::split(&reference_text, &config);
        Self {
            reference_text,
            config,
            paragraphs,
            current_paragraph: 0,
            typed_text: String::new(),
            status: SessionStatus::Idle,
            timer: SessionTimer::new(config.time_limit),
            stats: StatsSnapshot::default(),
            events: Vec::new(),
        }
    }

    fn split(text: &str, config: &SessionConfig) -> Vec<String> {
        Segmenter::new(config.paragraph_capacity)
            .with_spacing(config.spacing)
            .segment(text)
    }

    /// Apply new settings. Re-segments the text and resets the session.
    pub fn configure(&mut self, config: SessionConfig) {
        self.config = config;
        self.paragraphs = Self::split(&self.reference_text, &config);
        self.timer.set_limit(config.time_limit);
        self.reset();
    }

    /// Swap in a new practice text and reset.
    pub fn load_text(&mut self, reference_text: impl Into<String>) {
        self.reference_text = reference_text.into();
        self.paragraphs = Self::split(&self.reference_text, &self.config);
        self.reset();
    }

    pub fn reference_text(&self) -> &str {
        &self.reference_text
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Finished
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats
    }

    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    pub fn current_paragraph_index(&self) -> usize {
        self.current_paragraph
    }

    pub fn current_paragraph(&self) -> &str {
        self.paragraphs
            .get(self.current_paragraph)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.timer.elapsed_secs()
    }

    pub fn remaining_secs(&self) -> Option<u64> {
        self.timer.remaining_secs()
    }

    pub fn highlight(&self) -> KeyHighlight {
        keyboard::highlight(self.config.layout, self.current_paragraph(), &self.typed_text)
    }

    /// Idle -> Running. Returns false from any other state.
    pub fn start(&mut self) -> bool {
        if self.status != SessionStatus::Idle {
            return false;
        }
        self.status = SessionStatus::Running;
        self.timer.start();
        debug!(
            paragraphs = self.paragraphs.len(),
            limit = ?self.timer.limit().as_secs(),
            "session started"
        );

        if self.timer.state() == TimerState::Expired {
            self.finish();
        }
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.status != SessionStatus::Running {
            return false;
        }
        self.status = SessionStatus::Paused;
        self.timer.pause();
        debug!(elapsed = self.timer.elapsed_secs(), "session paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.status != SessionStatus::Paused {
            return false;
        }
        self.status = SessionStatus::Running;
        self.timer.resume();
        debug!(elapsed = self.timer.elapsed_secs(), "session resumed");
        true
    }

    /// Back to Idle on the first paragraph. Pending events are dropped.
    pub fn reset(&mut self) {
        self.status = SessionStatus::Idle;
        self.typed_text.clear();
        self.current_paragraph = 0;
        self.stats = StatsSnapshot::default();
        self.timer.reset();
        self.events.clear();
        debug!("session reset");
    }

    /// Replace the typed text of the current paragraph.
    ///
    /// The first non-empty input while Idle starts the session. Input while
    /// Paused or Finished is discarded.
    pub fn submit_input(&mut self, typed: &str) {
        match self.status {
            SessionStatus::Idle => {
                if typed.is_empty() {
                    return;
                }
                self.start();
                if self.status != SessionStatus::Running {
                    return;
                }
            }
            SessionStatus::Running => {}
            SessionStatus::Paused | SessionStatus::Finished => {
                trace!(status = ?self.status, "input ignored");
                return;
            }
        }

        self.typed_text.clear();
        self.typed_text.push_str(typed);
        self.refresh_stats();
        self.events.push(SessionEvent::Progress(self.stats));
        self.events
            .push(SessionEvent::ActiveKeysChanged(self.highlight().active_keys()));

        if self.typed_text.chars().count() >= self.current_paragraph().chars().count() {
            self.advance_paragraph();
        }
    }

    /// Append one character to the typed text.
    pub fn type_char(&mut self, c: char) {
        let mut typed = self.typed_text.clone();
        typed.push(c);
        self.submit_input(&typed);
    }

    /// Remove the last typed character of the current paragraph.
    pub fn backspace(&mut self) {
        if self.status != SessionStatus::Running || self.typed_text.is_empty() {
            return;
        }
        let mut typed = self.typed_text.clone();
        typed.pop();
        self.submit_input(&typed);
    }

    /// One second of wall time. Ignored unless Running.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != SessionStatus::Running {
            return TickOutcome::Ignored;
        }

        let outcome = self.timer.tick();
        if outcome == TickOutcome::Ignored {
            return outcome;
        }

        self.refresh_stats();
        self.events.push(SessionEvent::Progress(self.stats));

        if outcome == TickOutcome::Expired {
            debug!("time limit reached");
            self.finish();
        }
        outcome
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain queued events into `observer`.
    pub fn dispatch<O: SessionObserver + ?Sized>(&mut self, observer: &mut O) {
        for event in self.drain_events() {
            match event {
                SessionEvent::Progress(stats) => observer.on_progress(&stats),
                SessionEvent::Complete(stats) => observer.on_complete(&stats),
                SessionEvent::ActiveKeysChanged(keys) => observer.on_active_keys_changed(&keys),
                SessionEvent::ParagraphAdvanced { index } => observer.on_paragraph_advanced(index),
            }
        }
    }

    fn refresh_stats(&mut self) {
        let paragraph = self
            .paragraphs
            .get(self.current_paragraph)
            .map(String::as_str)
            .unwrap_or_default();
        self.stats = StatsSnapshot::compute(paragraph, &self.typed_text, self.timer.elapsed_secs());
    }

    fn advance_paragraph(&mut self) {
        if self.current_paragraph + 1 < self.paragraphs.len() {
            self.current_paragraph += 1;
            self.typed_text.clear();
            debug!(index = self.current_paragraph, "next paragraph");
            self.events.push(SessionEvent::ParagraphAdvanced {
                index: self.current_paragraph,
            });
            self.events
                .push(SessionEvent::ActiveKeysChanged(self.highlight().active_keys()));
        } else {
            self.finish();
        }
    }

    fn finish(&mut self) {
        if self.status == SessionStatus::Finished {
            return;
        }
        self.status = SessionStatus::Finished;
        self.timer.stop();
        debug!(
            wpm = self.stats.wpm,
            accuracy = self.stats.accuracy,
            elapsed = self.stats.time,
            "session finished"
        );
        self.events.push(SessionEvent::Complete(self.stats));
    }
}
