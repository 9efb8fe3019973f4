//! egui widgets: selection panels, the station map and the station list.

pub mod map;
pub mod panels;
pub mod table;
