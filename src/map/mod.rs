mod geometry;
mod projection;
mod renderer;
mod spatial;

pub use geometry::Shape;
pub use projection::{natural_earth, Extent, Viewport};
pub use renderer::{feature_colors, fill_color, ChoroplethRenderer, MapFrame};
