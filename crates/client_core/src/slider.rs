//! Pointer-to-value mapping and press tracking for parameter sliders.
//!
//! Framework independent: the desktop widget feeds pointer positions in
//! track-local coordinates and paints from [`SliderTrack::thumb_offset`].

use shared::domain::ParameterDescriptor;

pub const DEFAULT_STEP: f64 = 0.1;

/// Maps a horizontal position on a track of `track_width` to a value in
/// `[min, max]`, quantized to `step`.
///
/// Positions outside the track clamp to the bounds. A non-positive or
/// non-finite width, or a NaN position, maps as if the pointer were at the
/// left edge. A non-positive or non-finite `step` disables quantization.
pub fn map_position(local_x: f64, track_width: f64, min: f64, max: f64, step: f64) -> f64 {
    if min.is_nan() || max.is_nan() || max <= min {
        return min;
    }
    let percentage = if track_width > 0.0 && track_width.is_finite() && !local_x.is_nan() {
        local_x / track_width
    } else {
        0.0
    };
    let raw = min + percentage * (max - min);
    if raw.is_nan() {
        return min;
    }
    let quantized = if step > 0.0 && step.is_finite() && raw.is_finite() {
        round_to_decimals((raw / step).round() * step, step_decimals(step))
    } else {
        raw
    };
    quantized.clamp(min, max)
}

// Decimal places needed to represent `step`, so 70 * 0.1 lands on 7.0.
fn step_decimals(step: f64) -> i32 {
    (0..=12)
        .find(|&decimals| {
            let scaled = step * 10f64.powi(decimals);
            (scaled - scaled.round()).abs() < 1e-9
        })
        .unwrap_or(12)
}

fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Inverse of [`map_position`] for rendering: where the thumb sits for `value`.
pub fn thumb_offset(value: f64, track_width: f64, min: f64, max: f64) -> f64 {
    if track_width.is_nan() || track_width <= 0.0 || max.is_nan() || max <= min || value.is_nan() {
        return 0.0;
    }
    (((value - min) / (max - min)) * track_width).clamp(0.0, track_width)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderTrack {
    pub width: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderTrack {
    pub fn new(width: f64, min: f64, max: f64) -> Self {
        Self {
            width,
            min,
            max,
            step: DEFAULT_STEP,
        }
    }

    pub fn for_parameter(width: f64, descriptor: &ParameterDescriptor) -> Self {
        Self::new(width, descriptor.min, descriptor.max)
    }

    pub fn map_position(&self, local_x: f64) -> f64 {
        map_position(local_x, self.width, self.min, self.max, self.step)
    }

    pub fn thumb_offset(&self, value: f64) -> f64 {
        thumb_offset(value, self.width, self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Pressed { local_x: f64 },
    Dragged { local_x: f64 },
    Released,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderState {
    current_value: f64,
    pressed: bool,
}

impl SliderState {
    pub fn new(value: f64) -> Self {
        Self {
            current_value: value,
            pressed: false,
        }
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Follows the authoritative value when it changed elsewhere.
    pub fn sync(&mut self, value: f64) {
        self.current_value = value;
    }

    /// Applies one pointer input. Returns the new value whenever a position was
    /// mapped during an active press; the caller forwards it to the store.
    pub fn handle(&mut self, input: PointerInput, track: &SliderTrack) -> Option<f64> {
        match input {
            PointerInput::Pressed { local_x } => {
                self.pressed = true;
                Some(self.apply(track.map_position(local_x)))
            }
            PointerInput::Dragged { local_x } if self.pressed => {
                Some(self.apply(track.map_position(local_x)))
            }
            PointerInput::Dragged { .. } => None,
            PointerInput::Released | PointerInput::Cancelled => {
                self.pressed = false;
                None
            }
        }
    }

    fn apply(&mut self, value: f64) -> f64 {
        self.current_value = value;
        value
    }
}
