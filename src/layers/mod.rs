pub mod base;
pub mod district;
pub mod macros;
pub mod manager;
pub mod shelter;
pub mod tile;
