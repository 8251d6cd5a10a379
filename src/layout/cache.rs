//! Per-node measurement cache and the cached entry point into the flex pass.
//!
//! Every node keeps one slot for its last full layout plus a small ring of
//! measure-only results. A request is answered from the cache when its
//! constraints are compatible with a stored entry and the node is clean for
//! the current generation.

use crate::config::Config;
use crate::error::Result;
use crate::logging::{LogLevel, json_kv};
use crate::style::{Dimension, Direction, FlexDirection, MeasureMode, float_eq};
use crate::tree::{LayoutTree, NodeId};

use super::rounding::round_value_to_pixel_grid;

const TARGET: &str = "room_flex::cache";

/// Measure-only slots kept per node before the ring wraps.
pub(crate) const MAX_CACHED_MEASUREMENTS: usize = 16;

/// One remembered `(constraints) -> size` answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CachedMeasurement {
    pub(crate) available_width: f32,
    pub(crate) available_height: f32,
    pub(crate) width_mode: Option<MeasureMode>,
    pub(crate) height_mode: Option<MeasureMode>,
    pub(crate) computed_width: f32,
    pub(crate) computed_height: f32,
}

impl Default for CachedMeasurement {
    fn default() -> Self {
        Self {
            available_width: 0.0,
            available_height: 0.0,
            width_mode: None,
            height_mode: None,
            computed_width: -1.0,
            computed_height: -1.0,
        }
    }
}

impl CachedMeasurement {
    fn matches_exactly(&self, request: &LayoutRequest) -> bool {
        float_eq(self.available_width, request.available_width)
            && float_eq(self.available_height, request.available_height)
            && self.width_mode == Some(request.width_mode)
            && self.height_mode == Some(request.height_mode)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MeasureCache {
    pub(crate) layout: CachedMeasurement,
    pub(crate) measurements: [CachedMeasurement; MAX_CACHED_MEASUREMENTS],
    pub(crate) next_index: usize,
}

impl MeasureCache {
    pub(crate) fn invalidate(&mut self) {
        self.next_index = 0;
        self.layout.width_mode = None;
        self.layout.height_mode = None;
        self.layout.computed_width = -1.0;
        self.layout.computed_height = -1.0;
    }

    pub(crate) fn entries(&self) -> &[CachedMeasurement] {
        &self.measurements[..self.next_index]
    }
}

/// Arguments of one visit to a node.
///
/// A NaN `available_*` must come with `MeasureMode::Undefined` on that axis.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutRequest {
    pub(crate) available_width: f32,
    pub(crate) available_height: f32,
    pub(crate) parent_direction: Direction,
    pub(crate) width_mode: MeasureMode,
    pub(crate) height_mode: MeasureMode,
    pub(crate) parent_width: f32,
    pub(crate) parent_height: f32,
    pub(crate) perform_layout: bool,
    pub(crate) reason: &'static str,
    pub(crate) depth: u32,
}

fn exact_and_matches_old_size(mode: MeasureMode, size: f32, last_computed: f32) -> bool {
    mode == MeasureMode::Exactly && float_eq(size, last_computed)
}

fn old_unbounded_still_fits(
    mode: MeasureMode,
    size: f32,
    last_mode: Option<MeasureMode>,
    last_computed: f32,
) -> bool {
    mode == MeasureMode::AtMost
        && last_mode == Some(MeasureMode::Undefined)
        && (size >= last_computed || float_eq(size, last_computed))
}

fn stricter_bound_still_valid(
    mode: MeasureMode,
    size: f32,
    last_mode: Option<MeasureMode>,
    last_size: f32,
    last_computed: f32,
) -> bool {
    last_mode == Some(MeasureMode::AtMost)
        && mode == MeasureMode::AtMost
        && last_size > size
        && (last_computed <= size || float_eq(size, last_computed))
}

/// Whether `entry` can answer a request for a measured leaf.
///
/// Beyond an exact key match this accepts an exact size equal to the old
/// result, a bound that still fits an old unbounded result, and a tighter
/// bound the old result already satisfies.
#[allow(clippy::too_many_arguments)]
pub(crate) fn can_use_cached_measurement(
    width_mode: MeasureMode,
    width: f32,
    height_mode: MeasureMode,
    height: f32,
    entry: &CachedMeasurement,
    margin_row: f32,
    margin_column: f32,
    point_scale_factor: f32,
) -> bool {
    if entry.computed_height < 0.0 || entry.computed_width < 0.0 {
        return false;
    }
    let snap = |value: f32| {
        if point_scale_factor != 0.0 {
            round_value_to_pixel_grid(value, point_scale_factor, false, false)
        } else {
            value
        }
    };

    let same_width = entry.width_mode == Some(width_mode)
        && float_eq(snap(entry.available_width), snap(width));
    let same_height = entry.height_mode == Some(height_mode)
        && float_eq(snap(entry.available_height), snap(height));

    let inner_width = width - margin_row;
    let width_ok = same_width
        || exact_and_matches_old_size(width_mode, inner_width, entry.computed_width)
        || old_unbounded_still_fits(width_mode, inner_width, entry.width_mode, entry.computed_width)
        || stricter_bound_still_valid(
            width_mode,
            inner_width,
            entry.width_mode,
            entry.available_width,
            entry.computed_width,
        );

    let inner_height = height - margin_column;
    let height_ok = same_height
        || exact_and_matches_old_size(height_mode, inner_height, entry.computed_height)
        || old_unbounded_still_fits(
            height_mode,
            inner_height,
            entry.height_mode,
            entry.computed_height,
        )
        || stricter_bound_still_valid(
            height_mode,
            inner_height,
            entry.height_mode,
            entry.available_height,
            entry.computed_height,
        );

    width_ok && height_ok
}

/// Which stored answer a request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheSlot {
    Layout,
    Measurement(usize),
}

impl LayoutTree {
    fn find_cached(&self, id: NodeId, request: &LayoutRequest, config: &Config) -> Option<CacheSlot> {
        let node = self.at(id);
        let cache = &node.layout.cache;

        if node.measure.is_some() {
            let margin_row = node.margin_for_axis(FlexDirection::Row, request.parent_width);
            let margin_column = node.margin_for_axis(FlexDirection::Column, request.parent_width);
            let usable = |entry: &CachedMeasurement| {
                can_use_cached_measurement(
                    request.width_mode,
                    request.available_width,
                    request.height_mode,
                    request.available_height,
                    entry,
                    margin_row,
                    margin_column,
                    config.point_scale_factor(),
                )
            };
            if usable(&cache.layout) {
                return Some(CacheSlot::Layout);
            }
            return cache
                .entries()
                .iter()
                .position(usable)
                .map(CacheSlot::Measurement);
        }

        if request.perform_layout {
            return cache
                .layout
                .matches_exactly(request)
                .then_some(CacheSlot::Layout);
        }

        cache
            .entries()
            .iter()
            .position(|entry| entry.matches_exactly(request))
            .map(CacheSlot::Measurement)
    }

    /// Lays out or measures `id`, reusing a cached answer when allowed.
    ///
    /// Returns whether the node was actually recomputed.
    pub(crate) fn layout_node_internal(
        &mut self,
        config: &Config,
        id: NodeId,
        request: LayoutRequest,
    ) -> Result<bool> {
        let generation = self.generation;
        let node = self.at_mut(id);
        let needs_visit = (node.is_dirty && node.layout.generation_count != generation)
            || node.layout.last_parent_direction != Some(request.parent_direction);
        if needs_visit {
            node.layout.cache.invalidate();
        }

        let cached = self.find_cached(id, &request, config);

        match cached {
            Some(slot) if !needs_visit => {
                let node = self.at_mut(id);
                let entry = match slot {
                    CacheSlot::Layout => node.layout.cache.layout,
                    CacheSlot::Measurement(index) => node.layout.cache.measurements[index],
                };
                node.set_measured(Dimension::Width, entry.computed_width);
                node.set_measured(Dimension::Height, entry.computed_height);
                config.record(|metrics| metrics.record_cache_hit());
                if config.trace_changes() && config.trace_skips() {
                    trace_visit(config, id, &request, "skipped", Some(&entry));
                }
            }
            _ => {
                if config.trace_changes() {
                    let phase = if needs_visit { "enter*" } else { "enter" };
                    trace_visit(config, id, &request, phase, None);
                }

                self.layout_impl(config, id, request)?;
                config.record(|metrics| metrics.record_visit());

                let node = self.at_mut(id);
                node.layout.last_parent_direction = Some(request.parent_direction);

                if config.trace_changes() {
                    let result = CachedMeasurement {
                        computed_width: node.measured(Dimension::Width),
                        computed_height: node.measured(Dimension::Height),
                        ..CachedMeasurement::default()
                    };
                    let phase = if needs_visit { "exit*" } else { "exit" };
                    trace_visit(config, id, &request, phase, Some(&result));
                }

                if cached.is_none() {
                    let node = self.at_mut(id);
                    let cache = &mut node.layout.cache;
                    if cache.next_index == MAX_CACHED_MEASUREMENTS {
                        config.record(|metrics| metrics.record_cache_overflow());
                        if config.trace_changes() {
                            config.log(
                                LogLevel::Verbose,
                                TARGET,
                                Some(id),
                                "measurement cache full, wrapping",
                            );
                        }
                        cache.next_index = 0;
                    }

                    let entry = CachedMeasurement {
                        available_width: request.available_width,
                        available_height: request.available_height,
                        width_mode: Some(request.width_mode),
                        height_mode: Some(request.height_mode),
                        computed_width: node.layout.measured_dimensions[Dimension::Width.index()],
                        computed_height: node.layout.measured_dimensions
                            [Dimension::Height.index()],
                    };
                    let cache = &mut node.layout.cache;
                    if request.perform_layout {
                        cache.layout = entry;
                    } else {
                        cache.measurements[cache.next_index] = entry;
                        cache.next_index += 1;
                    }
                }
            }
        }

        let node = self.at_mut(id);
        if request.perform_layout {
            node.layout.dimensions = node.layout.measured_dimensions;
            node.has_new_layout = true;
            node.is_dirty = false;
        }
        node.layout.generation_count = generation;
        Ok(needs_visit || cached.is_none())
    }
}

fn trace_visit(
    config: &Config,
    id: NodeId,
    request: &LayoutRequest,
    phase: &str,
    result: Option<&CachedMeasurement>,
) {
    let mode_name = |mode: MeasureMode| {
        if request.perform_layout {
            format!("layout-{}", mode.as_str())
        } else {
            mode.as_str().to_string()
        }
    };
    let mut fields = vec![
        json_kv("depth", request.depth),
        json_kv("phase", phase),
        json_kv("width_mode", mode_name(request.width_mode)),
        json_kv("height_mode", mode_name(request.height_mode)),
        json_kv("available_width", request.available_width),
        json_kv("available_height", request.available_height),
        json_kv("reason", request.reason),
    ];
    if let Some(result) = result {
        fields.push(json_kv("width", result.computed_width));
        fields.push(json_kv("height", result.computed_height));
    }
    config.log_fields(LogLevel::Verbose, TARGET, Some(id), phase, fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        width: f32,
        width_mode: MeasureMode,
        height: f32,
        height_mode: MeasureMode,
        computed: (f32, f32),
    ) -> CachedMeasurement {
        CachedMeasurement {
            available_width: width,
            available_height: height,
            width_mode: Some(width_mode),
            height_mode: Some(height_mode),
            computed_width: computed.0,
            computed_height: computed.1,
        }
    }

    #[test]
    fn empty_slot_never_matches() {
        let slot = CachedMeasurement::default();
        assert!(!can_use_cached_measurement(
            MeasureMode::Exactly,
            10.0,
            MeasureMode::Exactly,
            10.0,
            &slot,
            0.0,
            0.0,
            1.0,
        ));
    }

    #[test]
    fn identical_key_matches() {
        let slot = entry(
            100.0,
            MeasureMode::AtMost,
            f32::NAN,
            MeasureMode::Undefined,
            (40.0, 12.0),
        );
        assert!(can_use_cached_measurement(
            MeasureMode::AtMost,
            100.0,
            MeasureMode::Undefined,
            f32::NAN,
            &slot,
            0.0,
            0.0,
            1.0,
        ));
    }

    #[test]
    fn exact_request_equal_to_old_result_matches() {
        let slot = entry(
            f32::NAN,
            MeasureMode::Undefined,
            f32::NAN,
            MeasureMode::Undefined,
            (40.0, 12.0),
        );
        assert!(can_use_cached_measurement(
            MeasureMode::Exactly,
            45.0,
            MeasureMode::Exactly,
            12.0,
            &slot,
            5.0,
            0.0,
            1.0,
        ));
    }

    #[test]
    fn bound_that_fits_unbounded_result_matches() {
        let slot = entry(
            f32::NAN,
            MeasureMode::Undefined,
            f32::NAN,
            MeasureMode::Undefined,
            (40.0, 12.0),
        );
        assert!(can_use_cached_measurement(
            MeasureMode::AtMost,
            60.0,
            MeasureMode::Undefined,
            f32::NAN,
            &slot,
            0.0,
            0.0,
            1.0,
        ));
        assert!(!can_use_cached_measurement(
            MeasureMode::AtMost,
            30.0,
            MeasureMode::Undefined,
            f32::NAN,
            &slot,
            0.0,
            0.0,
            1.0,
        ));
    }

    #[test]
    fn tighter_bound_still_satisfied_matches() {
        let slot = entry(
            200.0,
            MeasureMode::AtMost,
            f32::NAN,
            MeasureMode::Undefined,
            (40.0, 12.0),
        );
        assert!(can_use_cached_measurement(
            MeasureMode::AtMost,
            50.0,
            MeasureMode::Undefined,
            f32::NAN,
            &slot,
            0.0,
            0.0,
            1.0,
        ));
        assert!(!can_use_cached_measurement(
            MeasureMode::AtMost,
            20.0,
            MeasureMode::Undefined,
            f32::NAN,
            &slot,
            0.0,
            0.0,
            1.0,
        ));
    }

    #[test]
    fn invalidate_forgets_everything() {
        let mut cache = MeasureCache::default();
        cache.layout = entry(
            1.0,
            MeasureMode::Exactly,
            1.0,
            MeasureMode::Exactly,
            (1.0, 1.0),
        );
        cache.next_index = 3;
        cache.invalidate();
        assert!(cache.entries().is_empty());
        assert_eq!(cache.layout.width_mode, None);
        assert_eq!(cache.layout.computed_width, -1.0);
    }
}
