//! Per-tree layout configuration.
//!
//! A [`Config`] is built and tuned by its owner, then shared with nodes as an
//! `Arc<Config>`. Nothing mutates it once nodes hold it, so it never changes
//! during a layout pass.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde_json::Value as JsonValue;

use crate::error::{LayoutError, Result};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::{self, LayoutMetrics, MetricSnapshot};
use crate::style::ExperimentalFeature;
use crate::tree::NodeId;

pub type ConfigContext = Arc<dyn Any + Send + Sync>;

/// Layout knobs. Every knob is set through a `with_*` builder before the
/// config is shared and read back through a getter of the same name.
pub struct Config {
    experimental_features: [bool; ExperimentalFeature::COUNT],
    use_web_defaults: bool,
    use_legacy_stretch_behaviour: bool,
    point_scale_factor: f32,
    logger: Logger,
    trace_changes: bool,
    trace_skips: bool,
    trace_tree: bool,
    context: Option<ConfigContext>,
    metrics: Option<Arc<Mutex<LayoutMetrics>>>,
}

impl Default for Config {
    fn default() -> Self {
        metrics::config_created();
        Self {
            experimental_features: [false; ExperimentalFeature::COUNT],
            use_web_defaults: false,
            use_legacy_stretch_behaviour: false,
            point_scale_factor: 1.0,
            logger: Logger::console(),
            trace_changes: false,
            trace_skips: false,
            trace_tree: false,
            context: None,
            metrics: None,
        }
    }
}

impl Clone for Config {
    fn clone(&self) -> Self {
        metrics::config_created();
        Self {
            experimental_features: self.experimental_features,
            use_web_defaults: self.use_web_defaults,
            use_legacy_stretch_behaviour: self.use_legacy_stretch_behaviour,
            point_scale_factor: self.point_scale_factor,
            logger: self.logger.clone(),
            trace_changes: self.trace_changes,
            trace_skips: self.trace_skips,
            trace_tree: self.trace_tree,
            context: self.context.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl Drop for Config {
    fn drop(&mut self) {
        metrics::config_released();
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("experimental_features", &self.experimental_features)
            .field("use_web_defaults", &self.use_web_defaults)
            .field(
                "use_legacy_stretch_behaviour",
                &self.use_legacy_stretch_behaviour,
            )
            .field("point_scale_factor", &self.point_scale_factor)
            .field("trace_changes", &self.trace_changes)
            .field("trace_skips", &self.trace_skips)
            .field("trace_tree", &self.trace_tree)
            .field("has_context", &self.context.is_some())
            .field("metrics_enabled", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create nodes with browser defaults (row direction, stretched content,
    /// shrinkable children).
    pub fn with_web_defaults(mut self, enabled: bool) -> Self {
        self.use_web_defaults = enabled;
        self
    }

    /// Keep the pre-fix behaviour where a container sized by content still
    /// stretches to its available main size when children could grow.
    pub fn with_legacy_stretch_behaviour(mut self, enabled: bool) -> Self {
        self.use_legacy_stretch_behaviour = enabled;
        self
    }

    pub fn with_experimental_feature(mut self, feature: ExperimentalFeature, enabled: bool) -> Self {
        self.experimental_features[feature.index()] = enabled;
        self
    }

    /// Pixel density used for rounding. Zero disables rounding entirely.
    pub fn with_point_scale_factor(mut self, factor: f32) -> Result<Self> {
        if factor.is_nan() || factor < 0.0 {
            return Err(LayoutError::InvalidScaleFactor(factor));
        }
        self.point_scale_factor = factor;
        Ok(self)
    }

    /// Destination for diagnostics and contract violations.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Emit a `Verbose` event for every node the layout pass recomputes.
    pub fn with_trace_changes(mut self, enabled: bool) -> Self {
        self.trace_changes = enabled;
        self
    }

    /// Emit a `Verbose` event whenever a cached size is reused. Only takes
    /// effect together with change tracing.
    pub fn with_trace_skips(mut self, enabled: bool) -> Self {
        self.trace_skips = enabled;
        self
    }

    /// Log the finished tree at `Debug` level after each layout.
    pub fn with_trace_tree(mut self, enabled: bool) -> Self {
        self.trace_tree = enabled;
        self
    }

    pub fn with_context(mut self, context: ConfigContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn use_web_defaults(&self) -> bool {
        self.use_web_defaults
    }

    pub fn use_legacy_stretch_behaviour(&self) -> bool {
        self.use_legacy_stretch_behaviour
    }

    pub fn is_experimental_feature_enabled(&self, feature: ExperimentalFeature) -> bool {
        self.experimental_features[feature.index()]
    }

    pub fn point_scale_factor(&self) -> f32 {
        self.point_scale_factor
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn trace_changes(&self) -> bool {
        self.trace_changes
    }

    pub fn trace_skips(&self) -> bool {
        self.trace_skips
    }

    pub fn trace_tree(&self) -> bool {
        self.trace_tree
    }

    pub fn context(&self) -> Option<&ConfigContext> {
        self.context.as_ref()
    }

    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(LayoutMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    /// Shared handle to the counters, when metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<LayoutMetrics>>> {
        self.metrics.clone()
    }

    pub fn metrics_snapshot(&self) -> Option<MetricSnapshot> {
        self.metrics
            .as_ref()
            .map(|metrics| metrics.lock().expect("metrics mutex poisoned").snapshot())
    }

    pub(crate) fn record(&self, update: impl FnOnce(&mut LayoutMetrics)) {
        if let Some(metrics) = &self.metrics {
            update(&mut metrics.lock().expect("metrics mutex poisoned"));
        }
    }

    pub(crate) fn log(&self, level: LogLevel, target: &str, node: Option<NodeId>, message: &str) {
        self.log_fields(level, target, node, message, std::iter::empty());
    }

    pub(crate) fn log_fields(
        &self,
        level: LogLevel,
        target: &str,
        node: Option<NodeId>,
        message: &str,
        fields: impl IntoIterator<Item = (String, JsonValue)>,
    ) {
        let node_field = node.map(|id| json_kv("node", id.to_string()));
        let event = event_with_fields(level, target, message, node_field.into_iter().chain(fields));
        // A failing sink must not turn into a layout failure.
        let _ = self.logger.log_event(event);
    }

    /// Logs a broken contract at `Fatal` level and hands the error back.
    pub(crate) fn fatal(&self, target: &str, error: LayoutError) -> LayoutError {
        self.log(LogLevel::Fatal, target, error.node(), &error.to_string());
        error
    }
}
