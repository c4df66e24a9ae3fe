use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LEFT_POSITIONS: [f32; 5] = [0.0, 8.0, 16.0, 24.0, 32.0];
pub const DEFAULT_TOP_POSITIONS: [f32; 4] = [0.0, 6.0, 12.0, 18.0];

pub const LAYOUT_SEED: u32 = 0x5EED_711E;
const LEFT_SHUFFLE_SALT: u32 = 0x1EF7_5A17;
const TOP_SHUFFLE_SALT: u32 = 0x7095_A17E;
const SHUFFLE_STEP_SALT: u32 = 0xC0DE;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub left_positions: Vec<f32>,
    pub top_positions: Vec<f32>,
}

impl GridGeometry {
    pub fn new(left_positions: Vec<f32>, top_positions: Vec<f32>) -> Result<Self, LayoutError> {
        let geometry = Self {
            left_positions,
            top_positions,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.left_positions.is_empty() {
            return Err(LayoutError::EmptyAxis { axis: Axis::Left });
        }
        if self.top_positions.is_empty() {
            return Err(LayoutError::EmptyAxis { axis: Axis::Top });
        }
        for (axis, values) in [(Axis::Left, &self.left_positions), (Axis::Top, &self.top_positions)] {
            if let Some(index) = values.iter().position(|value| !value.is_finite()) {
                return Err(LayoutError::NonFinite { axis, index });
            }
            // Repeated offsets would hand two tiles the same crop.
            let repeated =
                (1..values.len()).find(|&index| values[..index].contains(&values[index]));
            if let Some(index) = repeated {
                return Err(LayoutError::DuplicateOffset { axis, index });
            }
        }
        Ok(())
    }

    pub fn cols(&self) -> usize {
        self.left_positions.len()
    }

    pub fn rows(&self) -> usize {
        self.top_positions.len()
    }

    pub fn tile_count(&self) -> usize {
        self.cols() * self.rows()
    }
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            left_positions: DEFAULT_LEFT_POSITIONS.to_vec(),
            top_positions: DEFAULT_TOP_POSITIONS.to_vec(),
        }
    }
}

/// Offset of a tile's sub-image inside the source image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropOffset {
    pub top: f32,
    pub left: f32,
}

/// Initial scattered location of a tile inside the tray.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrayPosition {
    pub left: f32,
    pub top: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardLayout {
    pub geometry: GridGeometry,
    pub seed: u32,
    pub crops: Vec<CropOffset>,
    pub tray: Vec<TrayPosition>,
}

impl BoardLayout {
    pub fn generate(geometry: GridGeometry, seed: u32) -> Self {
        let crops = background_positions(&geometry);
        let tray = tray_positions(&geometry, seed);
        Self {
            geometry,
            seed,
            crops,
            tray,
        }
    }

    pub fn tile_count(&self) -> usize {
        self.crops.len()
    }

    /// Slots are laid out like the source image, so a slot sits where its crop comes from.
    pub fn slot_position(&self, slot: usize) -> Option<CropOffset> {
        self.crops.get(slot).copied()
    }
}

/// Row-major crop offsets: tile `i` always shows the same part of the image.
pub fn background_positions(geometry: &GridGeometry) -> Vec<CropOffset> {
    let mut crops = Vec::with_capacity(geometry.tile_count());
    for &top in &geometry.top_positions {
        for &left in &geometry.left_positions {
            crops.push(CropOffset { top, left });
        }
    }
    crops
}

/// Each shuffled left offset is crossed with a freshly shuffled copy of the top offsets.
pub fn tray_positions(geometry: &GridGeometry, seed: u32) -> Vec<TrayPosition> {
    let left_seed = splitmix32(seed ^ LEFT_SHUFFLE_SALT);
    let lefts = shuffled(&geometry.left_positions, left_seed);
    let mut positions = Vec::with_capacity(geometry.tile_count());
    for (index, left) in lefts.into_iter().enumerate() {
        let top_seed = splitmix32(left_seed ^ TOP_SHUFFLE_SALT.wrapping_add(index as u32));
        for top in shuffled(&geometry.top_positions, top_seed) {
            positions.push(TrayPosition { left, top });
        }
    }
    positions
}

/// Fisher-Yates over a copy of `items`.
pub fn shuffled<T: Clone>(items: &[T], seed: u32) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let salt = SHUFFLE_STEP_SALT.wrapping_add(i as u32);
        let j = ((rand_unit(seed, salt) * (i as f32 + 1.0)) as usize).min(i);
        out.swap(i, j);
    }
    out
}

pub fn splitmix32(mut value: u32) -> u32 {
    value = value.wrapping_add(0x9E37_79B9);
    let mut z = value;
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

pub fn rand_unit(seed: u32, salt: u32) -> f32 {
    let mixed = splitmix32(seed ^ splitmix32(salt));
    let top = mixed >> 8;
    top as f32 / ((1u32 << 24) as f32)
}

pub fn layout_seed(nonce: u32) -> u32 {
    splitmix32(LAYOUT_SEED ^ nonce.wrapping_mul(0x9E37_79B9))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Left,
    Top,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Left => f.write_str("left"),
            Axis::Top => f.write_str("top"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    EmptyAxis { axis: Axis },
    NonFinite { axis: Axis, index: usize },
    DuplicateOffset { axis: Axis, index: usize },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::EmptyAxis { axis } => write!(f, "{axis} positions must not be empty"),
            LayoutError::NonFinite { axis, index } => {
                write!(f, "{axis} position {index} is not a finite number")
            }
            LayoutError::DuplicateOffset { axis, index } => {
                write!(f, "{axis} position {index} repeats an earlier offset")
            }
        }
    }
}

impl std::error::Error for LayoutError {}
