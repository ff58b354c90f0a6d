mod bar;
mod scale;

pub use bar::{format_tick, Bar, BarChart, BarLayout};
pub use scale::{nice_ticks, BandScale, LinearScale};
