// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification-driven interval regulation.
//!
//! Pull model over an append-only text file written by an external event
//! source, one line per event: `timestamp|code|message`. The code is a
//! zero-padded 6-digit integer: one component digit, two event digits,
//! three observed-count digits. The reactor polls at the scheduler
//! cadence, remembers `(size, offset)`, and treats a shrunken file as a
//! rotation. Notifications are advisory; loss is tolerated.

use crate::policy::LevelTable;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use strata_core::Level;
use tracing::{debug, info, warn};

/// Notifications retained per poll; newer entries overwrite older ones.
pub const MAX_RETAINED: usize = 3;

/// Bounded attempts before an unreadable file is downgraded to debug.
const ACCESS_RETRIES: u32 = 3;

/// One row of the regulation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationRule {
    pub component: u32,
    pub event: u32,
    /// Minimum observed count for the rule to fire.
    pub min_count: u32,
    pub target: Level,
    /// `current_interval = base_interval / freq_multiplier`.
    pub freq_multiplier: u32,
    pub duration_minutes: u64,
}

/// Built-in rule table; first match wins.
pub fn default_rules() -> Vec<NotificationRule> {
    vec![
        // Correctable DIMM ECC bursts: tighten the partner-copy tier.
        NotificationRule {
            component: 2,
            event: 31,
            min_count: 10,
            target: Level::L2,
            freq_multiplier: 2,
            duration_minutes: 30,
        },
        // CPU cache correctable errors: tighten group encoding.
        NotificationRule {
            component: 1,
            event: 54,
            min_count: 0,
            target: Level::L3,
            freq_multiplier: 2,
            duration_minutes: 20,
        },
        // Uncorrectable memory reports nearby: archive sooner.
        NotificationRule {
            component: 2,
            event: 32,
            min_count: 1,
            target: Level::L4,
            freq_multiplier: 2,
            duration_minutes: 60,
        },
        // Fabric link flaps: cheap local checkpoints much more often.
        NotificationRule {
            component: 3,
            event: 21,
            min_count: 5,
            target: Level::L1,
            freq_multiplier: 4,
            duration_minutes: 10,
        },
        // Thermal excursions: tighten local cadence mildly.
        NotificationRule {
            component: 4,
            event: 11,
            min_count: 3,
            target: Level::L1,
            freq_multiplier: 2,
            duration_minutes: 15,
        },
    ]
}

/// A decoded notification code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub component: u32,
    pub event: u32,
    pub count: u32,
}

/// Split a code into component / event / count digits. `None` outside
/// `[0, 10^6)`.
pub fn decode_code(code: u32) -> Option<Notification> {
    if code >= 1_000_000 {
        return None;
    }
    Some(Notification {
        component: code / 100_000,
        event: (code / 1_000) % 100,
        count: code % 1_000,
    })
}

/// Extract the code field from one `timestamp|code|message` line.
pub fn parse_line(line: &str) -> Option<u32> {
    let mut parts = line.splitn(3, '|');
    let _timestamp = parts.next()?;
    let code = parts.next()?.trim();
    parts.next()?;
    code.parse().ok()
}

/// Polls the notification log and reshapes tier intervals.
pub struct Reactor {
    path: PathBuf,
    offset: u64,
    rules: Vec<NotificationRule>,
    failed_reads: u32,
}

impl Reactor {
    pub fn new(path: impl Into<PathBuf>, rules: Vec<NotificationRule>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            rules,
            failed_reads: 0,
        }
    }

    /// Replace the rule table. First match still wins.
    pub fn set_rules(&mut self, rules: Vec<NotificationRule>) {
        self.rules = rules;
    }

    /// One poll at the scheduler cadence: expire old regulation windows,
    /// ingest any new notification lines, apply the first matching rule to
    /// each.
    pub fn poll(&mut self, current_minute: u64, levels: &mut LevelTable) {
        levels.revert_expired(current_minute);
        for line in self.read_new_lines() {
            self.apply_line(&line, current_minute, levels);
        }
    }

    fn read_new_lines(&mut self) -> Vec<String> {
        let len = match fs::metadata(&self.path) {
            Ok(meta) => {
                self.failed_reads = 0;
                meta.len()
            }
            Err(err) => {
                self.failed_reads += 1;
                if self.failed_reads <= ACCESS_RETRIES {
                    warn!(path = %self.path.display(), %err, "notification file not accessible");
                } else {
                    debug!(path = %self.path.display(), "notification file still not accessible");
                }
                return Vec::new();
            }
        };
        if len < self.offset {
            debug!(path = %self.path.display(), "notification file shrank; treating as rotation");
            self.offset = 0;
        }
        if len == self.offset {
            return Vec::new();
        }
        let mut bytes = Vec::with_capacity((len - self.offset) as usize);
        let read = File::open(&self.path).and_then(|mut file| {
            file.seek(SeekFrom::Start(self.offset))?;
            file.take(len - self.offset).read_to_end(&mut bytes)
        });
        // Whatever happened, don't re-read this span: loss is tolerated.
        self.offset = len;
        if let Err(err) = read {
            debug!(path = %self.path.display(), %err, "notification read failed");
            return Vec::new();
        }
        let text = String::from_utf8_lossy(&bytes);
        let mut lines: Vec<String> = text.lines().map(str::to_owned).collect();
        if lines.len() > MAX_RETAINED {
            lines.drain(..lines.len() - MAX_RETAINED);
        }
        lines
    }

    fn apply_line(&self, line: &str, now_minute: u64, levels: &mut LevelTable) {
        let Some(code) = parse_line(line) else {
            debug!(line, "skipping malformed notification");
            return;
        };
        let Some(notification) = decode_code(code) else {
            debug!(code, "notification code out of range");
            return;
        };
        let matched = self.rules.iter().find(|rule| {
            rule.component == notification.component
                && rule.event == notification.event
                && rule.min_count <= notification.count
        });
        match matched {
            Some(rule) => {
                levels.regulate(
                    rule.target,
                    rule.freq_multiplier,
                    now_minute,
                    rule.duration_minutes,
                );
                info!(
                    component = notification.component,
                    event = notification.event,
                    count = notification.count,
                    target = %rule.target,
                    interval = levels.current_interval(rule.target),
                    "regulation applied"
                );
            }
            None => {
                warn!(
                    component = notification.component,
                    event = notification.event,
                    count = notification.count,
                    "no regulation rule matches notification"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "reactor_tests.rs"]
mod tests;
