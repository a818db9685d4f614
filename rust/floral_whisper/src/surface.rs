//! Drawing Surface
//!
//! The freehand canvas one flower is sketched on. It owns the raster and the
//! brush, turns stroke calls into committed pixels, and exports the finished
//! sketch as PNG. Like the rest of the core it knows nothing about the DOM;
//! the browser adapter feeds it `PointerEvent`s and blits its raster.

use crate::brush::{BrushParams, BrushState};
use crate::color::Rgba;
use crate::error::SurfaceError;
use crate::input::{CanvasRect, PointerEvent, PointerEventType};
use crate::raster::Raster;
use crate::sketch::EncodedImage;

/// Canvas height as a fraction of its width
pub const ASPECT_RATIO: f32 = 0.6;

/// Pixel size of a canvas laid out in a container `container_width` wide
pub fn canvas_dimensions(container_width: f32) -> (u32, u32) {
    let width = if container_width.is_finite() {
        container_width.floor().max(1.0)
    } else {
        1.0
    };
    let height = (width * ASPECT_RATIO).floor().max(1.0);
    (width as u32, height as u32)
}

/// Interactive raster canvas for a single sketch
pub struct DrawingSurface {
    raster: Raster,
    brush: BrushState,
    has_content: bool,
}

impl DrawingSurface {
    /// Create a surface sized for a container `container_width` pixels wide
    pub fn new(container_width: f32) -> Self {
        let (width, height) = canvas_dimensions(container_width);
        Self {
            raster: Raster::new(width, height),
            brush: BrushState::new(),
            has_content: false,
        }
    }

    /// Resize to the container and repaint white
    ///
    /// Anything drawn so far is discarded, as is an active stroke. The brush
    /// color and width are kept.
    pub fn initialize(&mut self, container_width: f32) {
        let (width, height) = canvas_dimensions(container_width);
        self.raster = Raster::new(width, height);
        self.brush.end();
        self.has_content = false;
        log::info!("Surface initialized at {}x{}", width, height);
    }

    /// Follow a container resize; only a change in pixel width re-initializes
    ///
    /// Returns whether the surface was re-initialized.
    pub fn resize(&mut self, container_width: f32) -> bool {
        let (width, _) = canvas_dimensions(container_width);
        if width == self.raster.width() {
            return false;
        }
        self.initialize(container_width);
        true
    }

    /// Set the color for strokes started from now on
    pub fn set_color(&mut self, value: &str) -> Result<(), SurfaceError> {
        let color = Rgba::from_hex(value).ok_or_else(|| SurfaceError::InvalidColor(value.to_string()))?;
        self.brush.params.color = color;
        Ok(())
    }

    /// Set the width for strokes started from now on
    pub fn set_brush_width(&mut self, width: f32) -> Result<(), SurfaceError> {
        if !width.is_finite() || width <= 0.0 {
            return Err(SurfaceError::InvalidBrushWidth(width));
        }
        self.brush.params.width = width;
        Ok(())
    }

    pub fn brush(&self) -> &BrushParams {
        &self.brush.params
    }

    /// Start a stroke at a canvas-local position; non-finite positions are ignored
    pub fn begin_stroke(&mut self, position: [f32; 2]) {
        if !is_finite_point(position) {
            log::debug!("Ignoring stroke start at {:?}", position);
            return;
        }
        self.brush.begin(position);
        self.has_content = true;
    }

    /// Draw from the last position to `position`; ignored when no stroke is active
    ///
    /// Only the part of the segment that can reach the raster is painted.
    /// Returns whether any pixels were painted.
    pub fn extend_stroke(&mut self, position: [f32; 2]) -> bool {
        let Some(prev) = self.brush.last_position() else {
            return false;
        };
        if !is_finite_point(position) {
            return false;
        }

        let margin = self.brush.params.width * 0.5 + 1.0;
        let bounds = [
            -margin,
            -margin,
            self.raster.width() as f32 + margin,
            self.raster.height() as f32 + margin,
        ];
        let Some((start, end)) = clip_segment(prev, position, bounds) else {
            self.brush.jump_to(position);
            return false;
        };

        if start != prev {
            self.brush.jump_to(start);
        }
        let dabs = self.brush.segment_to(end);
        for dab in &dabs {
            self.raster.stamp(dab);
        }
        if end != position {
            self.brush.jump_to(position);
        }
        log::trace!("Stroke extended to {:?} with {} dabs", position, dabs.len());
        !dabs.is_empty()
    }

    /// Finish the active stroke; no-op when none is active
    pub fn end_stroke(&mut self) {
        self.brush.end();
    }

    pub fn is_stroking(&self) -> bool {
        self.brush.is_active()
    }

    /// Route a client-space pointer event through coordinate mapping
    ///
    /// Returns whether the raster changed.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent, rect: &CanvasRect) -> bool {
        if event.ends_stroke() {
            self.end_stroke();
            return false;
        }

        let Some(position) = event.canvas_position(rect) else {
            return false;
        };
        match event.event_type {
            PointerEventType::Down => {
                self.begin_stroke(position);
                false
            }
            PointerEventType::Move => self.extend_stroke(position),
            PointerEventType::Up | PointerEventType::Leave | PointerEventType::Cancel => false,
        }
    }

    /// Repaint opaque white and forget the sketch
    pub fn reset(&mut self) {
        self.raster.fill(Rgba::WHITE);
        self.brush.end();
        self.has_content = false;
    }

    /// Encode the sketch as PNG and clear the canvas
    ///
    /// Returns `Ok(None)` and leaves the canvas untouched when nothing has
    /// been drawn.
    pub fn export(&mut self) -> Result<Option<EncodedImage>, SurfaceError> {
        if !self.has_content {
            return Ok(None);
        }
        let bytes = self.raster.encode_png()?;
        log::info!(
            "Exported {}x{} sketch ({} bytes)",
            self.raster.width(),
            self.raster.height(),
            bytes.len()
        );
        self.reset();
        Ok(Some(EncodedImage::png(bytes)))
    }

    pub fn has_content(&self) -> bool {
        self.has_content
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }
}

fn is_finite_point(point: [f32; 2]) -> bool {
    point[0].is_finite() && point[1].is_finite()
}

/// Liang-Barsky clip of segment `a`-`b` to `[min_x, min_y, max_x, max_y]`
///
/// Endpoints inside the bounds are returned unchanged.
fn clip_segment(a: [f32; 2], b: [f32; 2], bounds: [f32; 4]) -> Option<([f32; 2], [f32; 2])> {
    let [min_x, min_y, max_x, max_y] = bounds;
    let d = [b[0] - a[0], b[1] - a[1]];
    let (mut t0, mut t1) = (0.0_f32, 1.0_f32);

    for (p, q) in [
        (-d[0], a[0] - min_x),
        (d[0], max_x - a[0]),
        (-d[1], a[1] - min_y),
        (d[1], max_y - a[1]),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f32| match t {
        t if t <= 0.0 => a,
        t if t >= 1.0 => b,
        t => [a[0] + d[0] * t, a[1] + d[1] * t],
    };
    Some((at(t0), at(t1)))
}

/// Hint shown over an empty canvas, e.g. "Sketch flower #2 here..."
pub fn placeholder_label(flower_index: usize) -> String {
    format!("Sketch flower #{} here...", flower_index + 1)
}
