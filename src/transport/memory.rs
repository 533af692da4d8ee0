// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-memory transport that records every event.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::Transport;
use crate::error::TransportError;
use crate::naming::Tags;

/// The value carried by one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Count(i64),
    Timing(Duration),
    Gauge(f64),
}

/// One delivered measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub sample: Sample,
    pub tags: Tags,
}

impl Event {
    pub fn is_count(&self) -> bool {
        matches!(self.sample, Sample::Count(_))
    }

    pub fn is_timing(&self) -> bool {
        matches!(self.sample, Sample::Timing(_))
    }

    pub fn is_gauge(&self) -> bool {
        matches!(self.sample, Sample::Gauge(_))
    }

    /// Tag value by key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Transport that keeps events in memory, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    events: Mutex<Vec<Event>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every event recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// Counter events only.
    pub fn counts(&self) -> Vec<Event> {
        self.filtered(Event::is_count)
    }

    /// Timing events only.
    pub fn timings(&self) -> Vec<Event> {
        self.filtered(Event::is_timing)
    }

    /// Gauge events only.
    pub fn gauges(&self) -> Vec<Event> {
        self.filtered(Event::is_gauge)
    }

    /// Events with the given name.
    pub fn named(&self, name: &str) -> Vec<Event> {
        self.filtered(|event| event.name == name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn filtered(&self, predicate: impl Fn(&Event) -> bool) -> Vec<Event> {
        self.lock()
            .iter()
            .filter(|event| predicate(*event))
            .cloned()
            .collect()
    }

    fn record(&self, name: &str, sample: Sample, tags: &Tags) {
        self.lock().push(Event {
            name: name.to_string(),
            sample,
            tags: tags.clone(),
        });
    }

    // A wrapped function may panic while we are recording around it; the log
    // itself is never left half-written, so a poisoned lock is still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for RecordingTransport {
    fn increment(&self, name: &str, value: i64, tags: &Tags) -> Result<(), TransportError> {
        self.record(name, Sample::Count(value), tags);
        Ok(())
    }

    fn timing(&self, name: &str, duration: Duration, tags: &Tags) -> Result<(), TransportError> {
        self.record(name, Sample::Timing(duration), tags);
        Ok(())
    }

    fn gauge(&self, name: &str, value: f64, tags: &Tags) -> Result<(), TransportError> {
        self.record(name, Sample::Gauge(value), tags);
        Ok(())
    }
}
