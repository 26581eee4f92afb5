//! Checkbox-driven layer controllers.
//!
//! Each dataset gets a controller owning its data source, its layer and an
//! explicit two-state machine. Checking the box moves the controller from
//! `Hidden` to `Visible`: the layer is handed to the map host and map
//! clicks start being delivered. Unchecking reverses both, closes any open
//! popup and reclaims the layer so its state can be reset before the next
//! show. The transitions are plain methods on plain data, so the whole
//! interaction model is testable without a rendering surface.

pub mod district;
pub mod shelter;

pub use district::{DistrictController, DISTRICT_LAYER_ID};
pub use shelter::{ShelterController, SHELTER_LAYER_ID};

/// Visibility state of a toggleable overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    Hidden,
    Visible,
}
