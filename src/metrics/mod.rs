use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

static LIVE_NODES: AtomicUsize = AtomicUsize::new(0);
static LIVE_CONFIGS: AtomicUsize = AtomicUsize::new(0);

/// Counters describing how much work layout passes performed.
#[derive(Debug, Default, Clone)]
pub struct LayoutMetrics {
    layout_passes: u64,
    node_visits: u64,
    cache_hits: u64,
    measure_calls: u64,
    baseline_calls: u64,
    cache_overflows: u64,
}

impl LayoutMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_layout_pass(&mut self) {
        self.layout_passes = self.layout_passes.saturating_add(1);
    }

    pub fn record_visit(&mut self) {
        self.node_visits = self.node_visits.saturating_add(1);
    }

    pub fn record_cache_hit(&mut self) {
        self.cache_hits = self.cache_hits.saturating_add(1);
    }

    pub fn record_measure(&mut self) {
        self.measure_calls = self.measure_calls.saturating_add(1);
    }

    pub fn record_baseline(&mut self) {
        self.baseline_calls = self.baseline_calls.saturating_add(1);
    }

    pub fn record_cache_overflow(&mut self) {
        self.cache_overflows = self.cache_overflows.saturating_add(1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            layout_passes: self.layout_passes,
            node_visits: self.node_visits,
            cache_hits: self.cache_hits,
            measure_calls: self.measure_calls,
            baseline_calls: self.baseline_calls,
            cache_overflows: self.cache_overflows,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricSnapshot {
    pub layout_passes: u64,
    pub node_visits: u64,
    pub cache_hits: u64,
    pub measure_calls: u64,
    pub baseline_calls: u64,
    pub cache_overflows: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(
            LogLevel::Info,
            target.to_string(),
            "layout_metrics".to_string(),
            self.as_fields(),
        )
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("layout_passes".to_string(), json!(self.layout_passes));
        map.insert("node_visits".to_string(), json!(self.node_visits));
        map.insert("cache_hits".to_string(), json!(self.cache_hits));
        map.insert("measure_calls".to_string(), json!(self.measure_calls));
        map.insert("baseline_calls".to_string(), json!(self.baseline_calls));
        map.insert("cache_overflows".to_string(), json!(self.cache_overflows));
        map
    }
}

/// Live node and config instances across the whole process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceCounts {
    pub nodes: usize,
    pub configs: usize,
}

pub fn instance_counts() -> InstanceCounts {
    InstanceCounts {
        nodes: LIVE_NODES.load(Ordering::Relaxed),
        configs: LIVE_CONFIGS.load(Ordering::Relaxed),
    }
}

pub(crate) fn node_created() {
    LIVE_NODES.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn nodes_released(count: usize) {
    LIVE_NODES.fetch_sub(count, Ordering::Relaxed);
}

pub(crate) fn config_created() {
    LIVE_CONFIGS.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn config_released() {
    LIVE_CONFIGS.fetch_sub(1, Ordering::Relaxed);
}
