//! Gateway metrics.
//!
//! Counts calls to the remote model services and how many of them failed,
//! plus how many requests ended without a summary.

use crate::error::GatewayKind;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct GatewayMetrics {
    translation_calls: AtomicUsize,
    translation_failures: AtomicUsize,
    summarization_calls: AtomicUsize,
    summarization_failures: AtomicUsize,
    unsupported_outcomes: AtomicUsize,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call to a gateway (retries count as separate calls).
    pub fn record_call(&self, kind: GatewayKind) {
        let counter = match kind {
            GatewayKind::Translation => &self.translation_calls,
            GatewayKind::Summarization => &self.summarization_calls,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, kind: GatewayKind) {
        let counter = match kind {
            GatewayKind::Translation => &self.translation_failures,
            GatewayKind::Summarization => &self.summarization_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unsupported(&self) {
        self.unsupported_outcomes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report(&self) -> MetricsReport {
        let translation_calls = self.translation_calls.load(Ordering::Relaxed);
        let translation_failures = self.translation_failures.load(Ordering::Relaxed);
        let summarization_calls = self.summarization_calls.load(Ordering::Relaxed);
        let summarization_failures = self.summarization_failures.load(Ordering::Relaxed);

        MetricsReport {
            translation_calls,
            translation_failures,
            translation_success_rate: success_rate(translation_calls, translation_failures),
            summarization_calls,
            summarization_failures,
            summarization_success_rate: success_rate(summarization_calls, summarization_failures),
            unsupported_outcomes: self.unsupported_outcomes.load(Ordering::Relaxed),
        }
    }
}

fn success_rate(calls: usize, failures: usize) -> f64 {
    if calls > 0 {
        (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
    } else {
        0.0
    }
}

/// Snapshot of the gateway metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub translation_calls: usize,
    pub translation_failures: usize,
    pub translation_success_rate: f64,
    pub summarization_calls: usize,
    pub summarization_failures: usize,
    pub summarization_success_rate: f64,
    pub unsupported_outcomes: usize,
}
