//! Brush Parameters and Stroke State
//!
//! This module defines the stroke style and turns pointer segments into
//! brush dabs. A stroke is rendered as a run of round dabs, which gives the
//! round joins and round caps a browser canvas draws with
//! `lineJoin = lineCap = "round"`.

use crate::color::{Rgba, DEFAULT_COLOR};

/// A labelled brush width offered by the toolbar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushPreset {
    pub label: &'static str,
    pub width: f32,
}

/// Brush widths offered by the toolbar, smallest first
pub const BRUSH_SIZES: [BrushPreset; 4] = [
    BrushPreset { label: "S", width: 2.0 },
    BrushPreset { label: "M", width: 5.0 },
    BrushPreset { label: "L", width: 10.0 },
    BrushPreset { label: "XL", width: 18.0 },
];

/// Width a fresh surface starts with ("M")
pub const DEFAULT_WIDTH: f32 = 5.0;

/// Dab spacing as a fraction of the brush width
const SPACING_RATIO: f32 = 0.25;
/// Lower bound on dab spacing in pixels
const MIN_SPACING: f32 = 0.5;
/// Upper bound on dabs per segment; longer segments space their dabs wider
const MAX_SEGMENT_DABS: usize = 8192;

/// Style applied to strokes started after it is set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushParams {
    /// Stroke width in pixels (dab diameter)
    pub width: f32,
    /// Stroke color
    pub color: Rgba,
}

impl BrushParams {
    /// Create brush parameters with the given width and color
    pub fn new(width: f32, color: Rgba) -> Self {
        Self { width, color }
    }

    /// Distance between consecutive dabs along a segment
    pub fn spacing(&self) -> f32 {
        (self.width * SPACING_RATIO).max(MIN_SPACING)
    }
}

impl Default for BrushParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            color: DEFAULT_COLOR,
        }
    }
}

/// A single round dab to be stamped onto the raster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushDab {
    /// Center in canvas space (pixels)
    pub position: [f32; 2],
    /// Diameter in pixels
    pub size: f32,
    /// Dab color
    pub color: Rgba,
}

/// Tracks the stroke in progress
#[derive(Debug, Clone)]
pub struct BrushState {
    /// Current brush parameters
    pub params: BrushParams,
    /// Last input position of the active stroke, `None` when no stroke is active
    last_input_position: Option<[f32; 2]>,
    /// The stroke origin still needs its round cap
    needs_origin_dab: bool,
    /// Distance travelled since the last dab
    accumulated_distance: f32,
}

impl BrushState {
    /// Create a brush state with default parameters
    pub fn new() -> Self {
        Self::with_params(BrushParams::default())
    }

    /// Create a brush state with the given parameters
    pub fn with_params(params: BrushParams) -> Self {
        Self {
            params,
            last_input_position: None,
            needs_origin_dab: false,
            accumulated_distance: 0.0,
        }
    }

    /// Start a new stroke at `position` without painting anything yet
    ///
    /// Non-finite positions leave the brush idle.
    pub fn begin(&mut self, position: [f32; 2]) {
        if !position.iter().all(|c| c.is_finite()) {
            return;
        }
        self.last_input_position = Some(position);
        self.needs_origin_dab = true;
        self.accumulated_distance = 0.0;
    }

    /// Move the active stroke to `position` without painting the gap
    ///
    /// The next segment starts with a fresh cap at `position`. No-op when no
    /// stroke is active.
    pub fn jump_to(&mut self, position: [f32; 2]) {
        if self.last_input_position.is_some() {
            self.last_input_position = Some(position);
            self.needs_origin_dab = true;
            self.accumulated_distance = 0.0;
        }
    }

    /// Last position of the active stroke
    pub fn last_position(&self) -> Option<[f32; 2]> {
        self.last_input_position
    }

    /// End the active stroke, if any
    pub fn end(&mut self) {
        self.last_input_position = None;
        self.needs_origin_dab = false;
        self.accumulated_distance = 0.0;
    }

    /// Whether a stroke is in progress
    pub fn is_active(&self) -> bool {
        self.last_input_position.is_some()
    }

    /// Calculate dabs for the segment from the previous position to `position`
    ///
    /// Returns no dabs when no stroke is active. Both segment endpoints are
    /// always covered so consecutive segments join without gaps.
    /// Non-finite positions are ignored.
    pub fn segment_to(&mut self, position: [f32; 2]) -> Vec<BrushDab> {
        let Some(prev_pos) = self.last_input_position else {
            return Vec::new();
        };
        if !position.iter().all(|c| c.is_finite()) {
            return Vec::new();
        }

        let mut dabs = Vec::new();
        if self.needs_origin_dab {
            dabs.push(self.create_dab(prev_pos));
            self.needs_origin_dab = false;
        }

        let dx = position[0] - prev_pos[0];
        let dy = position[1] - prev_pos[1];
        let segment_distance = (dx * dx + dy * dy).sqrt();

        if segment_distance > f32::EPSILON {
            // Distance from the last dab, which may sit in an earlier segment
            let travelled = self.accumulated_distance + segment_distance;
            let mut spacing = self.params.spacing();
            let mut count = (travelled / spacing).floor() as usize;
            if count > MAX_SEGMENT_DABS {
                spacing = travelled / MAX_SEGMENT_DABS as f32;
                count = MAX_SEGMENT_DABS;
            }

            dabs.reserve(count + 1);
            for i in 1..=count {
                let distance_into_segment = i as f32 * spacing - self.accumulated_distance;
                let t = (distance_into_segment / segment_distance).clamp(0.0, 1.0);
                dabs.push(self.create_dab([prev_pos[0] + dx * t, prev_pos[1] + dy * t]));
            }

            if travelled - count as f32 * spacing > f32::EPSILON {
                dabs.push(self.create_dab(position));
            }
            self.accumulated_distance = 0.0;
        }

        self.last_input_position = Some(position);
        dabs
    }

    fn create_dab(&self, position: [f32; 2]) -> BrushDab {
        BrushDab {
            position,
            size: self.params.width,
            color: self.params.color,
        }
    }
}

impl Default for BrushState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_without_stroke_is_empty() {
        let mut brush = BrushState::new();
        assert!(brush.segment_to([10.0, 10.0]).is_empty());
        assert!(!brush.is_active());
    }

    #[test]
    fn test_first_segment_caps_both_ends() {
        let mut brush = BrushState::with_params(BrushParams::new(4.0, Rgba::WHITE));
        brush.begin([0.0, 0.0]);
        let dabs = brush.segment_to([10.0, 0.0]);

        assert_eq!(dabs.first().map(|d| d.position), Some([0.0, 0.0]));
        assert_eq!(dabs.last().map(|d| d.position), Some([10.0, 0.0]));
        // spacing is 1px for a 4px brush
        assert_eq!(dabs.len(), 11);
        assert!(dabs.iter().all(|d| d.size == 4.0));
    }

    #[test]
    fn test_later_segment_does_not_repeat_origin() {
        let mut brush = BrushState::with_params(BrushParams::new(4.0, Rgba::WHITE));
        brush.begin([0.0, 0.0]);
        let _ = brush.segment_to([4.0, 0.0]);
        let dabs = brush.segment_to([4.0, 4.0]);

        assert_eq!(dabs.first().map(|d| d.position), Some([4.0, 1.0]));
        assert_eq!(dabs.last().map(|d| d.position), Some([4.0, 4.0]));
    }

    #[test]
    fn test_zero_length_segment_paints_a_dot() {
        let mut brush = BrushState::new();
        brush.begin([3.0, 3.0]);
        let dabs = brush.segment_to([3.0, 3.0]);
        assert_eq!(dabs.len(), 1);
        assert!(brush.segment_to([3.0, 3.0]).is_empty());
    }

    #[test]
    fn test_end_stops_the_stroke() {
        let mut brush = BrushState::new();
        brush.begin([0.0, 0.0]);
        assert!(brush.is_active());
        brush.end();
        assert!(!brush.is_active());
        assert!(brush.segment_to([5.0, 5.0]).is_empty());
    }

    #[test]
    fn test_long_segment_dab_count_is_bounded() {
        let mut brush = BrushState::with_params(BrushParams::new(2.0, Rgba::WHITE));
        brush.begin([0.0, 0.0]);
        let dabs = brush.segment_to([3.0e7, 0.0]);

        assert!(dabs.len() <= MAX_SEGMENT_DABS + 2);
        assert_eq!(dabs.last().map(|d| d.position), Some([3.0e7, 0.0]));
    }

    #[test]
    fn test_dab_count_follows_spacing() {
        let mut brush = BrushState::with_params(BrushParams::new(8.0, Rgba::WHITE));
        brush.begin([0.0, 0.0]);
        // origin cap plus one dab every 2px
        assert_eq!(brush.segment_to([0.0, 20.0]).len(), 11);
        // 3px: one spaced dab plus the endpoint
        assert_eq!(brush.segment_to([0.0, 23.0]).len(), 2);
    }

    #[test]
    fn test_non_finite_position_is_ignored() {
        let mut brush = BrushState::new();
        brush.begin([1.0, 1.0]);
        assert!(brush.segment_to([f32::NAN, 4.0]).is_empty());
        assert!(brush.segment_to([f32::INFINITY, 4.0]).is_empty());
        assert_eq!(brush.last_position(), Some([1.0, 1.0]));
    }

    #[test]
    fn test_jump_to_recaps_without_painting() {
        let mut brush = BrushState::with_params(BrushParams::new(4.0, Rgba::WHITE));
        brush.begin([0.0, 0.0]);
        let _ = brush.segment_to([2.0, 0.0]);
        brush.jump_to([50.0, 0.0]);

        let dabs = brush.segment_to([52.0, 0.0]);
        assert_eq!(dabs.first().map(|d| d.position), Some([50.0, 0.0]));
        assert!(dabs.iter().all(|d| d.position[0] >= 50.0));
    }

    #[test]
    fn test_brush_sizes_ascend_and_include_default() {
        let labels: Vec<&str> = BRUSH_SIZES.iter().map(|p| p.label).collect();
        assert_eq!(labels, ["S", "M", "L", "XL"]);
        assert!(BRUSH_SIZES.windows(2).all(|pair| pair[0].width < pair[1].width));
        assert!(BRUSH_SIZES.iter().any(|p| p.width == DEFAULT_WIDTH));
    }

    #[test]
    fn test_spacing_has_floor() {
        assert_eq!(BrushParams::new(0.4, Rgba::WHITE).spacing(), MIN_SPACING);
        assert_eq!(BrushParams::new(18.0, Rgba::WHITE).spacing(), 4.5);
    }
}
