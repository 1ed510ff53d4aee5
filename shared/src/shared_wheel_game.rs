use std::fmt;

use rand::Rng;
use serde::{Serialize, Deserialize};

// Constants shared by the engine and any drawing layer
pub const WHEEL_SEGMENTS: usize = 8;       // Default number of segments on the wheel
pub const SPIN_DURATION_MS: u64 = 3000;    // Duration of spin animation in milliseconds
pub const MIN_FULL_TURNS: u32 = 5;         // Minimum number of full rotations per spin
pub const HIGHLIGHT_INTERVAL_MS: u64 = 500; // Blink period of the resolved segment
pub const DEGREES_PER_TURN: f64 = 360.0;

/// Pointer sits at the top of the wheel while segment 0 starts at 3 o'clock.
const POINTER_OFFSET_DEGREES: f64 = 90.0;

#[derive(Debug, Clone, PartialEq)]
pub enum WheelError {
    InvalidConfiguration { field: &'static str, value: usize },
    InvalidRotation(f64),
}

impl fmt::Display for WheelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { field, value } => {
                write!(f, "Invalid wheel configuration: {} = {}", field, value)
            }
            Self::InvalidRotation(degrees) => write!(f, "Invalid rotation: {}", degrees),
        }
    }
}

impl std::error::Error for WheelError {}

/// Result of drawing a new spin
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct SpinDraw {
    pub random_addend: f64,
    pub new_accumulated_degrees: f64,
}

/// Represents the current state of a wheel
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinState {
    pub segment_count: usize,
    pub accumulated_rotation_degrees: f64,  // Only ever grows, never reset between spins
    pub is_spinning: bool,
    pub resolved_index: Option<usize>,
    pub highlight: bool,                    // Cosmetic blink of the resolved segment
}

impl SpinState {
    pub fn new(segment_count: usize) -> Self {
        Self {
            segment_count,
            accumulated_rotation_degrees: 0.0,
            is_spinning: false,
            resolved_index: None,
            highlight: false,
        }
    }

    pub fn start_spin(&mut self, new_accumulated_degrees: f64) {
        self.is_spinning = true;
        self.resolved_index = None;
        self.highlight = false;
        self.accumulated_rotation_degrees = new_accumulated_degrees;
    }

    pub fn complete_spin(&mut self, index: usize) {
        self.is_spinning = false;
        self.resolved_index = Some(index);
    }

    /// Flips the highlight only while a result is on display.
    pub fn toggle_highlight(&mut self) -> bool {
        if self.resolved_index.is_some() && !self.is_spinning {
            self.highlight = !self.highlight;
        } else {
            self.highlight = false;
        }
        self.highlight
    }
}

impl Default for SpinState {
    fn default() -> Self {
        Self::new(WHEEL_SEGMENTS)
    }
}

pub fn normalize_angle(angle: f64) -> f64 {
    if angle >= 0.0 { angle } else { angle + DEGREES_PER_TURN }
}

fn check_segment_count(segment_count: usize) -> Result<(), WheelError> {
    if segment_count == 0 {
        return Err(WheelError::InvalidConfiguration { field: "segment_count", value: 0 });
    }
    Ok(())
}

/// Maps a finished rotation to the index of the segment under the pointer.
///
/// The rotation is applied clockwise to the drawing while segments are laid
/// out counter-clockwise from screen angle 0, hence `360 - x`. The extra
/// `-90` moves the reference from 3 o'clock to the pointer at the top.
pub fn resolve_segment(total_rotation_degrees: f64, segment_count: usize) -> Result<usize, WheelError> {
    check_segment_count(segment_count)?;
    if !total_rotation_degrees.is_finite() {
        return Err(WheelError::InvalidRotation(total_rotation_degrees));
    }

    let reduced = normalize_angle(total_rotation_degrees % DEGREES_PER_TURN);
    let corrected = normalize_angle(DEGREES_PER_TURN - reduced - POINTER_OFFSET_DEGREES);
    let angle_per_segment = DEGREES_PER_TURN / segment_count as f64;

    // The final modulo folds a corrected angle that rounds up to 360 back onto 0
    let index = (corrected / angle_per_segment).floor() as usize % segment_count;
    Ok(index)
}

/// Draws the next spin: `min_full_turns` whole turns plus a uniform `[0, 360)` addend.
pub fn next_spin<R: Rng + ?Sized>(
    current_accumulated_degrees: f64,
    min_full_turns: u32,
    rng: &mut R,
) -> Result<SpinDraw, WheelError> {
    if min_full_turns == 0 {
        return Err(WheelError::InvalidConfiguration { field: "min_full_turns", value: 0 });
    }

    let random_addend = rng.gen_range(0.0..DEGREES_PER_TURN);
    let full_turns = min_full_turns as f64 * DEGREES_PER_TURN;

    Ok(SpinDraw {
        random_addend,
        new_accumulated_degrees: current_accumulated_degrees + full_turns + random_addend,
    })
}

/// Angular span `[start, end)` in degrees a segment is drawn over.
pub fn segment_bounds(index: usize, segment_count: usize) -> Result<(f64, f64), WheelError> {
    check_segment_count(segment_count)?;
    if index >= segment_count {
        return Err(WheelError::InvalidConfiguration { field: "segment_index", value: index });
    }

    let angle_per_segment = DEGREES_PER_TURN / segment_count as f64;
    Ok((index as f64 * angle_per_segment, (index + 1) as f64 * angle_per_segment))
}
