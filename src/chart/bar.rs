use crate::chart::scale::{BandScale, LinearScale};
use crate::data::TaskEnergy;

/// Gap between bars and at both ends, as a fraction of the band step
const PADDING: f64 = 0.2;
/// Headroom above the tallest bar
const HEADROOM: f64 = 1.1;
const TICK_COUNT: usize = 5;

/// One bar placed on a character grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bar {
    /// Index into the chart's tasks
    pub index: usize,
    /// Leftmost column, relative to the plot area
    pub x: u16,
    pub width: u16,
    /// Height in eighths of a character cell
    pub height_eighths: u32,
}

/// Bar chart placed into a plot area of `width` x `height` cells
#[derive(Debug, Clone)]
pub struct BarLayout {
    pub width: u16,
    pub height: u16,
    pub bars: Vec<Bar>,
    /// Tick value and its row, counted from the top of the plot
    pub ticks: Vec<(f64, u16)>,
    band: BandScale,
}

impl BarLayout {
    /// Bar under plot column `x`
    pub fn bar_at(&self, x: u16) -> Option<usize> {
        self.band.index_at(x as f64 + 0.5)
    }

    /// Columns available for a bar's label
    pub fn label_width(&self) -> u16 {
        self.band.step().floor().max(1.0) as u16
    }
}

/// Average energy per AI task, one bar per task in file order
pub struct BarChart {
    tasks: Vec<TaskEnergy>,
    y_max: f64,
}

impl BarChart {
    pub fn new(tasks: Vec<TaskEnergy>) -> Self {
        let max = tasks.iter().map(|t| t.average_wh).fold(0.0, f64::max);
        let y_max = if max > 0.0 { max * HEADROOM } else { 1.0 };
        Self { tasks, y_max }
    }

    pub fn tasks(&self) -> &[TaskEnergy] {
        &self.tasks
    }

    /// Top of the value axis
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    pub fn layout(&self, width: u16, height: u16) -> BarLayout {
        let band = BandScale::new(self.tasks.len(), (0.0, width as f64), PADDING);
        let eighths = LinearScale::new((0.0, self.y_max), (0.0, height as f64 * 8.0));
        let rows = LinearScale::new((0.0, self.y_max), (height as f64, 0.0));

        let bar_width = band.bandwidth().round().max(1.0) as u16;
        let bars = self
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| Bar {
                index,
                x: band.position(index).round().max(0.0) as u16,
                width: bar_width,
                height_eighths: eighths.map(task.average_wh).round().max(0.0) as u32,
            })
            .collect();

        let last_row = height.saturating_sub(1);
        let ticks = rows
            .ticks(TICK_COUNT)
            .into_iter()
            .map(|tick| {
                let row = rows.map(tick).floor().clamp(0.0, last_row as f64) as u16;
                (tick, row)
            })
            .collect();

        BarLayout {
            width,
            height,
            bars,
            ticks,
            band,
        }
    }

    /// Task name and formatted value for the tooltip
    pub fn tooltip(&self, idx: usize) -> Option<[String; 2]> {
        let task = self.tasks.get(idx)?;
        let average = format!("Average: {:.4} Wh", task.average_wh);
        Some([task.task.clone(), average])
    }
}

/// Short tick label: trailing zeros trimmed
pub fn format_tick(value: f64) -> String {
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() || text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> BarChart {
        BarChart::new(vec![
            TaskEnergy {
                task: "Image generation".into(),
                average_wh: 2.9,
            },
            TaskEnergy {
                task: "Text generation".into(),
                average_wh: 0.047,
            },
            TaskEnergy {
                task: "Summarization".into(),
                average_wh: 0.049,
            },
            TaskEnergy {
                task: "Image classification".into(),
                average_wh: 0.007,
            },
        ])
    }

    #[test]
    fn test_y_domain_has_headroom() {
        let chart = chart();
        assert!((chart.y_max() - 3.19).abs() < 1e-9);
        assert_eq!(BarChart::new(Vec::new()).y_max(), 1.0);
    }

    #[test]
    fn test_layout_heights_and_order() {
        let layout = chart().layout(84, 20);
        assert_eq!(layout.bars.len(), 4);
        let xs: Vec<u16> = layout.bars.iter().map(|b| b.x).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));

        // Tallest bar reaches 1/1.1 of the plot height
        let tallest = layout.bars[0].height_eighths;
        assert_eq!(tallest, (2.9 / 3.19 * 160.0f64).round() as u32);
        let bars = &layout.bars;
        assert!(bars[3].height_eighths < bars[1].height_eighths);
        let first = layout.bars[0].width;
        assert!(layout.bars.iter().all(|b| b.width == first && b.width >= 1));
    }

    #[test]
    fn test_ticks_rows() {
        let layout = chart().layout(84, 20);
        let values: Vec<f64> = layout.ticks.iter().map(|t| t.0).collect();
        assert_eq!(values, [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);
        assert_eq!(layout.ticks[0].1, 19);
        assert!(layout.ticks.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_hit_testing() {
        let layout = chart().layout(84, 20);
        let bar = layout.bars[2];
        assert_eq!(layout.bar_at(bar.x), Some(2));
        assert_eq!(layout.bar_at(0), None);
        assert_eq!(layout.bar_at(83), None);
    }

    #[test]
    fn test_tooltip_and_ticks() {
        let chart = chart();
        let [task, average] = chart.tooltip(1).unwrap();
        assert_eq!(task, "Text generation");
        assert_eq!(average, "Average: 0.0470 Wh");
        assert_eq!(chart.tooltip(9), None);
        assert_eq!(format_tick(2.5), "2.5");
        assert_eq!(format_tick(3.0), "3");
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(0.002), "0.002");
    }
}
