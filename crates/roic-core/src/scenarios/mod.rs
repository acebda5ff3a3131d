pub mod sensitivity;

pub use sensitivity::{roic_sensitivity, RoicSensitivityInput, RoicSensitivityOutput, MAX_GRID_CELLS};
