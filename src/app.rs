use crate::chart::{BarChart, BarLayout};
use crate::color::Rgb;
use crate::config::RegionConfig;
use crate::data::Dataset;
use crate::map::{feature_colors, ChoroplethRenderer, MapFrame, Viewport};
use crate::metric::{Metric, MetricSelector};
use crate::resolve::{RegionIndex, Resolution, ResolutionSummary};
use crate::ui::Screen;
use ratatui::layout::{Position, Rect};
use tracing::{debug, info};

/// Which chart is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    #[default]
    Map,
    Bar,
}

/// Application state
pub struct App {
    pub view: View,
    selector: MetricSelector,
    pub config: RegionConfig,
    pub regions: RegionIndex,
    pub map: ChoroplethRenderer,
    /// One per map feature, in feature order
    pub resolutions: Vec<Resolution>,
    /// Fill per map feature for the current metric
    pub colors: Vec<Rgb>,
    pub viewport: Viewport,
    /// Raster of the current viewport; rebuilt on pan, zoom and resize
    pub frame: MapFrame,
    pub bars: BarChart,
    pub bar_layout: BarLayout,
    pub screen: Screen,
    pub show_borders: bool,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    drag_moved: bool,
    /// Current mouse position
    pub mouse_pos: Option<(u16, u16)>,
    /// Feature under the mouse
    pub hovered: Option<usize>,
    /// Feature whose tooltip stays open, and where it was clicked
    pub pinned: Option<(usize, (u16, u16))>,
    /// Bar under the mouse
    pub hovered_bar: Option<usize>,
}

impl App {
    pub fn new(
        dataset: Dataset,
        config: RegionConfig,
        area: Rect,
        view: View,
        metric: Metric,
    ) -> Self {
        let map = ChoroplethRenderer::new(&dataset.countries);
        let regions = RegionIndex::build(dataset.regions, &config);
        let resolutions = regions.resolve_all(map.names());

        let summary = ResolutionSummary::tally(&resolutions);
        info!(
            specific = summary.specific,
            aggregate = summary.aggregate,
            no_data = summary.no_data,
            "resolved map features"
        );
        let names: Vec<&str> = map.names().collect();
        let unmatched = regions.unmatched(&names);
        if !unmatched.is_empty() {
            debug!(?unmatched, "dataset labels with no map feature");
        }

        let selector = MetricSelector::new(metric);
        let colors = feature_colors(&resolutions, &regions, selector.current(), &config);

        let screen = Screen::new(area);
        let (width, height) = map_pixels(screen.body);
        let viewport = Viewport::fit(map.extent(), width, height);
        let frame = map.render(&viewport, true);

        let bars = BarChart::new(dataset.tasks);
        let bar_layout = bars.layout(screen.plot.width, screen.plot.height);

        Self {
            view,
            selector,
            config,
            regions,
            map,
            resolutions,
            colors,
            viewport,
            frame,
            bars,
            bar_layout,
            screen,
            show_borders: true,
            should_quit: false,
            last_mouse: None,
            drag_moved: false,
            mouse_pos: None,
            hovered: None,
            pinned: None,
            hovered_bar: None,
        }
    }

    /// Update layout when the terminal resizes
    pub fn resize(&mut self, area: Rect) {
        self.screen = Screen::new(area);
        let (width, height) = map_pixels(self.screen.body);
        self.viewport.resize(width, height);
        let plot = self.screen.plot;
        self.bar_layout = self.bars.layout(plot.width, plot.height);
        self.pinned = None;
        self.rerender();
    }

    pub fn metric(&self) -> Metric {
        self.selector.current()
    }

    /// Switch the map metric. Only the color table changes; the raster and
    /// the records stay as they are.
    pub fn set_metric(&mut self, metric: Metric) -> bool {
        if !self.selector.set_metric(metric) {
            return false;
        }
        info!(metric = metric.code(), "metric changed");
        self.recolor();
        true
    }

    pub fn toggle_metric(&mut self) {
        self.set_metric(self.metric().other());
    }

    fn recolor(&mut self) {
        self.colors = feature_colors(
            &self.resolutions,
            &self.regions,
            self.metric(),
            &self.config,
        );
    }

    fn rerender(&mut self) {
        self.frame = self.map.render(&self.viewport, self.show_borders);
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            View::Map => View::Bar,
            View::Bar => View::Map,
        };
        info!(view = ?self.view, "view changed");
        self.refresh_hover();
    }

    pub fn toggle_borders(&mut self) {
        self.show_borders = !self.show_borders;
        self.rerender();
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        if self.view != View::Map {
            return;
        }
        self.viewport.pan(dx, dy);
        self.after_view_change();
    }

    pub fn zoom_in(&mut self) {
        if self.view == View::Map {
            self.viewport.zoom_in();
            self.after_view_change();
        }
    }

    pub fn zoom_out(&mut self) {
        if self.view == View::Map {
            self.viewport.zoom_out();
            self.after_view_change();
        }
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_in_at(px as i32, py as i32);
            self.after_view_change();
        }
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_out_at(px as i32, py as i32);
            self.after_view_change();
        }
    }

    /// Back to the fitted map, borders on, nothing pinned
    pub fn reset_view(&mut self) {
        self.viewport.reset();
        self.show_borders = true;
        self.after_view_change();
    }

    fn after_view_change(&mut self) {
        self.pinned = None;
        self.rerender();
        self.refresh_hover();
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    /// Mouse moved without a button held
    pub fn pointer_moved(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        self.refresh_hover();
    }

    /// Left button pressed: metric buttons act immediately, anywhere else
    /// starts a drag or a click
    pub fn pointer_down(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        if let Some(metric) = self.screen.button_at(col, row) {
            self.set_metric(metric);
            return;
        }
        self.last_mouse = Some((col, row));
        self.drag_moved = false;
    }

    /// Mouse dragged with the left button held
    pub fn pointer_drag(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - col as i32;
            let dy = last_y as i32 - row as i32;
            if dx != 0 || dy != 0 {
                self.drag_moved = true;
                // Terminal cells are 2x4 braille pixels
                self.pan(dx * 2, dy * 4);
            }
            self.last_mouse = Some((col, row));
        }
    }

    /// Left button released; a press without movement is a click
    pub fn pointer_up(&mut self, col: u16, row: u16) {
        let clicked = self.last_mouse.is_some() && !self.drag_moved;
        self.last_mouse = None;
        self.drag_moved = false;
        if clicked {
            self.click(col, row);
        }
    }

    /// Click on the map pins the tooltip of the feature underneath;
    /// clicking it again or clicking empty space unpins
    fn click(&mut self, col: u16, row: u16) {
        if self.view != View::Map {
            return;
        }
        self.pinned = match (self.feature_under(col, row), self.pinned) {
            (Some(idx), Some((pinned, _))) if idx == pinned => None,
            (Some(idx), _) => Some((idx, (col, row))),
            (None, _) => None,
        };
        if let Some((idx, _)) = self.pinned {
            debug!(feature = %self.map.shapes()[idx].name, "pinned tooltip");
        }
    }

    fn refresh_hover(&mut self) {
        let Some((col, row)) = self.mouse_pos else {
            return;
        };
        match self.view {
            View::Map => {
                self.hovered = self.feature_under(col, row);
                self.hovered_bar = None;
            }
            View::Bar => {
                self.hovered = None;
                self.hovered_bar = self.bar_under(col, row);
            }
        }
    }

    /// Braille pixel at the center of a terminal cell inside the map body
    fn map_pixel(&self, col: u16, row: u16) -> Option<(u16, u16)> {
        let body = self.screen.body;
        if self.view != View::Map || !body.contains(Position::new(col, row)) {
            return None;
        }
        Some(((col - body.x) * 2 + 1, (row - body.y) * 4 + 2))
    }

    /// Map feature drawn at a terminal cell
    pub fn feature_under(&self, col: u16, row: u16) -> Option<usize> {
        let (px, py) = self.map_pixel(col, row)?;
        let p = self.viewport.unproject(px as f64, py as f64);
        self.map.feature_at(p)
    }

    /// Bar drawn at a terminal cell
    pub fn bar_under(&self, col: u16, row: u16) -> Option<usize> {
        let plot = self.screen.plot;
        if !plot.contains(Position::new(col, row)) {
            return None;
        }
        self.bar_layout.bar_at(col - plot.x)
    }

    /// Tooltip lines for a map feature
    pub fn map_tooltip(&self, idx: usize) -> Vec<String> {
        let Some(shape) = self.map.shapes().get(idx) else {
            return Vec::new();
        };
        let metric = self.metric();
        let resolution = self.resolutions[idx];
        let mut lines = vec![shape.name.clone()];
        match (resolution, self.regions.record(resolution)) {
            (Resolution::Specific(_), Some(record)) => {
                lines.push(metric.describe(metric.value_of(record)));
            }
            (Resolution::Aggregate(_), Some(record)) => {
                lines.push(metric.describe(metric.value_of(record)));
                lines.push(format!("({} average)", record.label));
            }
            _ => lines.push("No data".to_string()),
        }
        lines
    }

    /// Tooltip to show and the cell it is anchored to
    pub fn tooltip(&self) -> Option<((u16, u16), Vec<String>)> {
        match self.view {
            View::Map => {
                if let Some((idx, anchor)) = self.pinned {
                    return Some((anchor, self.map_tooltip(idx)));
                }
                let idx = self.hovered?;
                Some((self.mouse_pos?, self.map_tooltip(idx)))
            }
            View::Bar => {
                let idx = self.hovered_bar?;
                let lines = self.bars.tooltip(idx)?;
                Some((self.mouse_pos?, lines.to_vec()))
            }
        }
    }

    /// Feature whose outline is highlighted
    pub fn highlighted(&self) -> Option<usize> {
        self.pinned.map(|(idx, _)| idx).or(self.hovered)
    }
}

/// Braille pixel size of a map body rect
fn map_pixels(body: Rect) -> (usize, usize) {
    (body.width as usize * 2, body.height as usize * 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Country, Polygon, RegionRecord, TaskEnergy};

    fn country(name: &str, lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> Country {
        Country {
            name: name.into(),
            polygons: vec![Polygon {
                exterior: vec![
                    (lon0, lat0),
                    (lon1, lat0),
                    (lon1, lat1),
                    (lon0, lat1),
                    (lon0, lat0),
                ],
                holes: vec![],
            }],
        }
    }

    fn record(label: &str, energy: f64, impact: f64) -> RegionRecord {
        RegionRecord {
            label: label.into(),
            primary_energy: energy,
            depletion_impact: impact,
        }
    }

    fn app() -> App {
        let dataset = Dataset {
            countries: vec![
                country("United States of America", -125.0, 25.0, -67.0, 49.0),
                country("Germany", 6.0, 47.0, 15.0, 55.0),
                country("Brazil", -74.0, -33.0, -35.0, 5.0),
            ],
            regions: vec![
                record("USA", 12.0, 7.1e-8),
                record("Europe", 11.2, 6.423e-8),
            ],
            tasks: vec![
                TaskEnergy {
                    task: "Image generation".into(),
                    average_wh: 2.9,
                },
                TaskEnergy {
                    task: "Text generation".into(),
                    average_wh: 0.047,
                },
            ],
        };
        let config = RegionConfig::embedded().unwrap();
        let area = Rect::new(0, 0, 120, 40);
        App::new(dataset, config, area, View::Map, Metric::Energy)
    }

    /// Terminal cell over a geographic point
    fn cell_at(app: &App, lon: f64, lat: f64) -> (u16, u16) {
        let (px, py) = app.viewport.project(lon, lat);
        let body = app.screen.body;
        (body.x + px as u16 / 2, body.y + py as u16 / 4)
    }

    #[test]
    fn test_initial_colors() {
        let app = app();
        let energy = app.config.scales.energy.scale();
        assert_eq!(app.colors[0], energy.color(12.0));
        assert_eq!(app.colors[1], energy.color(11.2).brighter(1.0));
        assert_eq!(app.colors[2], app.config.no_data);
    }

    #[test]
    fn test_toggle_twice_restores_colors() {
        let mut app = app();
        let before = app.colors.clone();
        app.toggle_metric();
        assert_eq!(app.metric(), Metric::Impact);
        assert_ne!(app.colors, before);
        let impact = app.config.scales.impact.scale();
        assert_eq!(app.colors[1], impact.color(6.423e-8).brighter(1.0));
        app.toggle_metric();
        assert_eq!(app.colors, before);
        // Records untouched
        assert_eq!(app.regions.records()[0].primary_energy, 12.0);
    }

    #[test]
    fn test_buttons_set_metric() {
        let mut app = app();
        let impact = app.screen.buttons[1];
        app.pointer_down(impact.x, impact.y);
        assert_eq!(app.metric(), Metric::Impact);
        let energy = app.screen.buttons[0];
        app.pointer_down(energy.x + 1, energy.y);
        assert_eq!(app.metric(), Metric::Energy);
        assert!(!app.set_metric(Metric::Energy));
    }

    #[test]
    fn test_hover_tooltips() {
        let mut app = app();
        let (col, row) = cell_at(&app, 10.5, 51.0);
        app.pointer_moved(col, row);
        assert_eq!(app.hovered, Some(1));
        let (_, lines) = app.tooltip().unwrap();
        assert_eq!(lines, ["Germany", "PE: 11.20 MJ/kWh", "(Europe average)"]);

        let (col, row) = cell_at(&app, -55.0, -10.0);
        app.pointer_moved(col, row);
        let brazil = app.hovered.unwrap();
        assert_eq!(app.map_tooltip(brazil), ["Brazil", "No data"]);

        app.set_metric(Metric::Impact);
        assert_eq!(
            app.map_tooltip(0),
            ["United States of America", "ADPe: 7.100e-8 kg Sb-eq/kWh"]
        );
    }

    #[test]
    fn test_click_pins_and_unpins() {
        let mut app = app();
        let (col, row) = cell_at(&app, -100.0, 38.0);
        app.pointer_down(col, row);
        app.pointer_up(col, row);
        assert_eq!(app.pinned.map(|p| p.0), Some(0));

        // Moving away keeps the pinned tooltip
        app.pointer_moved(0, app.screen.status.y);
        assert_eq!(app.tooltip().unwrap().1[0], "United States of America");

        app.pointer_down(col, row);
        app.pointer_up(col, row);
        assert_eq!(app.pinned, None);
    }

    #[test]
    fn test_drag_pans_without_pinning() {
        let mut app = app();
        let start = app.viewport.center;
        app.zoom_in();
        let (col, row) = cell_at(&app, 10.5, 51.0);
        app.pointer_down(col, row);
        app.pointer_drag(col - 3, row);
        app.pointer_up(col - 3, row);
        assert_ne!(app.viewport.center, start);
        assert_eq!(app.pinned, None);
    }

    #[test]
    fn test_bar_view_hover() {
        let mut app = app();
        app.toggle_view();
        assert_eq!(app.view, View::Bar);
        let plot = app.screen.plot;
        let bar = app.bar_layout.bars[1];
        app.pointer_moved(plot.x + bar.x, plot.y + plot.height - 1);
        assert_eq!(app.hovered_bar, Some(1));
        let (_, lines) = app.tooltip().unwrap();
        assert_eq!(lines, ["Text generation", "Average: 0.0470 Wh"]);

        // Map controls are inert on the bar view
        let center = app.viewport.center;
        app.pan(10, 0);
        assert_eq!(app.viewport.center, center);
    }

    #[test]
    fn test_resize_refits_canvas() {
        let mut app = app();
        app.resize(Rect::new(0, 0, 60, 20));
        assert_eq!(app.frame.cols, app.screen.body.width as usize);
        assert_eq!(app.frame.rows, app.screen.body.height as usize);
        assert_eq!(app.bar_layout.width, app.screen.plot.width);
    }
}
