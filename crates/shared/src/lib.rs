pub mod dataset;
pub mod grid;
pub mod interaction;
pub mod minimap;
pub mod models;
pub mod overlay;
pub mod sanitize;
pub mod terrain;
pub mod viewport;
