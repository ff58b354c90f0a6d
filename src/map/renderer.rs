use crate::braille::BrailleCanvas;
use crate::color::Rgb;
use crate::config::RegionConfig;
use crate::data::Country;
use crate::map::geometry::{draw_line, Shape};
use crate::map::projection::{natural_earth, Extent, Viewport};
use crate::map::spatial::FeatureGrid;
use crate::metric::Metric;
use crate::resolve::{RegionIndex, Resolution};
use glam::DVec2;
use rayon::prelude::*;

/// Grid cell size for the feature index, in plane units
const GRID_CELL: f64 = 0.1;

/// Fill for one feature under `metric`. Aggregate-backed features get a
/// brighter shade of the scale color so they read apart from exact matches.
pub fn fill_color(
    resolution: Resolution,
    regions: &RegionIndex,
    metric: Metric,
    config: &RegionConfig,
) -> Rgb {
    let scale = config.scales.for_metric(metric);
    match (resolution, regions.record(resolution)) {
        (Resolution::Specific(_), Some(record)) => scale.color(metric.value_of(record)),
        (Resolution::Aggregate(_), Some(record)) => {
            scale.color(metric.value_of(record)).brighter(1.0)
        }
        _ => config.no_data,
    }
}

/// Fill for every feature, in feature order
pub fn feature_colors(
    resolutions: &[Resolution],
    regions: &RegionIndex,
    metric: Metric,
    config: &RegionConfig,
) -> Vec<Rgb> {
    resolutions
        .iter()
        .map(|&r| fill_color(r, regions, metric, config))
        .collect()
}

/// One rasterized view of the map. Holds feature indices rather than colors,
/// so a metric switch only needs a new color table.
pub struct MapFrame {
    pub cols: usize,
    pub rows: usize,
    /// Feature under the upper and lower half of each character cell
    fills: Vec<[Option<usize>; 2]>,
    pub borders: BrailleCanvas,
}

impl MapFrame {
    #[inline(always)]
    pub fn fill(&self, col: usize, row: usize) -> [Option<usize>; 2] {
        if col >= self.cols || row >= self.rows {
            return [None, None];
        }
        self.fills[row * self.cols + col]
    }
}

/// Choropleth renderer over projected country shapes
pub struct ChoroplethRenderer {
    shapes: Vec<Shape>,
    grid: FeatureGrid,
    extent: Extent,
}

impl ChoroplethRenderer {
    pub fn new(countries: &[Country]) -> Self {
        let shapes: Vec<Shape> = countries.par_iter().map(Shape::project).collect();
        let extent = shapes
            .iter()
            .fold(Extent::EMPTY, |acc, s| acc.union(&s.bbox));
        let grid = FeatureGrid::build(shapes.iter().map(|s| &s.bbox), GRID_CELL);
        Self {
            shapes,
            grid,
            extent,
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().map(|s| s.name.as_str())
    }

    /// Plane bounds of everything loaded
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Feature containing plane point `p`. Where shapes overlap the later
    /// one wins, matching paint order.
    pub fn feature_at(&self, p: DVec2) -> Option<usize> {
        self.grid
            .query_point(p)
            .iter()
            .rev()
            .copied()
            .find(|&idx| self.shapes[idx].contains(p))
    }

    /// Rasterize fills (and optionally borders) for the viewport's canvas.
    /// The canvas is `viewport.width / 2` by `viewport.height / 4` cells.
    pub fn render(&self, viewport: &Viewport, show_borders: bool) -> MapFrame {
        let cols = viewport.width / 2;
        let rows = viewport.height / 4;
        let mut fills = vec![[None, None]; cols * rows];

        if cols > 0 {
            fills
                .par_chunks_mut(cols)
                .enumerate()
                .for_each(|(row, line)| {
                    // Sample the middle of the upper and lower dot pairs
                    let top_y = (row * 4 + 1) as f64;
                    let bottom_y = (row * 4 + 3) as f64;
                    for (col, cell) in line.iter_mut().enumerate() {
                        let x = (col * 2 + 1) as f64;
                        cell[0] = self.feature_at(viewport.unproject(x, top_y));
                        cell[1] = self.feature_at(viewport.unproject(x, bottom_y));
                    }
                });
        }

        let mut borders = BrailleCanvas::new(cols, rows);
        if show_borders {
            let mut visible = Vec::new();
            let extent = viewport.visible_extent();
            self.grid.query_into(&extent, &mut visible);
            visible.sort_unstable();
            visible.dedup();
            for idx in visible {
                self.draw_shape(&mut borders, idx, viewport);
            }
        }

        MapFrame {
            cols,
            rows,
            fills,
            borders,
        }
    }

    /// Outline of a single feature, for hover highlighting
    pub fn outline(&self, idx: usize, viewport: &Viewport) -> BrailleCanvas {
        let mut canvas = BrailleCanvas::new(viewport.width / 2, viewport.height / 4);
        if idx < self.shapes.len() {
            self.draw_shape(&mut canvas, idx, viewport);
        }
        canvas
    }

    fn draw_shape(&self, canvas: &mut BrailleCanvas, idx: usize, viewport: &Viewport) {
        for polygon in &self.shapes[idx].polygons {
            for ring in &polygon.rings {
                draw_ring(canvas, ring, viewport);
            }
        }
    }
}

/// Draw a ring with viewport culling
fn draw_ring(canvas: &mut BrailleCanvas, ring: &[DVec2], viewport: &Viewport) {
    if ring.len() < 2 {
        return;
    }

    // Edges spanning more than half the world are antimeridian wraps
    let wrap = natural_earth(180.0, 0.0).x;

    for pair in ring.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if (b.x - a.x).abs() > wrap {
            continue;
        }
        let start = viewport.project_plane(a);
        let end = viewport.project_plane(b);
        if viewport.line_might_be_visible(start, end) {
            draw_line(canvas, start.0, start.1, end.0, end.1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Polygon, RegionRecord};

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

    fn glyph_count(canvas: &BrailleCanvas, cols: usize, rows: usize) -> usize {
        (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (c, r)))
            .filter(|&(c, r)| canvas.glyph(c, r).is_some())
            .count()
    }

    fn world() -> Vec<Country> {
        vec![
            country("United States of America", -125.0, 25.0, -67.0, 49.0),
            country("Germany", 6.0, 47.0, 15.0, 55.0),
            country("Brazil", -74.0, -33.0, -35.0, 5.0),
        ]
    }

    fn regions(config: &RegionConfig) -> RegionIndex {
        RegionIndex::build(
            vec![
                RegionRecord {
                    label: "USA".into(),
                    primary_energy: 12.0,
                    depletion_impact: 7.0e-8,
                },
                RegionRecord {
                    label: "Europe".into(),
                    primary_energy: 11.0,
                    depletion_impact: 6.423e-8,
                },
            ],
            config,
        )
    }

    #[test]
    fn test_fill_colors_follow_resolution() {
        let config = RegionConfig::embedded().unwrap();
        let regions = regions(&config);
        let renderer = ChoroplethRenderer::new(&world());
        let resolutions = regions.resolve_all(renderer.names());

        let energy = feature_colors(&resolutions, &regions, Metric::Energy, &config);
        assert_eq!(energy[0], config.scales.energy.scale().color(12.0));
        let europe = config.scales.energy.scale().color(11.0);
        assert_eq!(energy[1], europe.brighter(1.0));
        assert_eq!(energy[2], config.no_data);

        let impact = feature_colors(&resolutions, &regions, Metric::Impact, &config);
        assert_eq!(
            impact[1],
            config.scales.impact.scale().color(6.423e-8).brighter(1.0)
        );
        assert_eq!(impact[2], Rgb::from_hex(0xcccccc));
    }

    #[test]
    fn test_feature_at() {
        let renderer = ChoroplethRenderer::new(&world());
        assert_eq!(renderer.feature_at(natural_earth(10.0, 51.0)), Some(1));
        assert_eq!(renderer.feature_at(natural_earth(-100.0, 40.0)), Some(0));
        assert_eq!(renderer.feature_at(natural_earth(0.0, -60.0)), None);
    }

    #[test]
    fn test_overlap_prefers_later_feature() {
        let renderer = ChoroplethRenderer::new(&[
            country("Below", 0.0, 0.0, 10.0, 10.0),
            country("Above", 5.0, 5.0, 15.0, 15.0),
        ]);
        assert_eq!(renderer.feature_at(natural_earth(7.0, 7.0)), Some(1));
        assert_eq!(renderer.feature_at(natural_earth(2.0, 2.0)), Some(0));
    }

    #[test]
    fn test_render_covers_canvas() {
        let renderer = ChoroplethRenderer::new(&world());
        let viewport = Viewport::fit(renderer.extent(), 160, 80);
        let frame = renderer.render(&viewport, true);
        assert_eq!((frame.cols, frame.rows), (80, 20));

        let filled: Vec<usize> = (0..frame.rows)
            .flat_map(|row| (0..frame.cols).map(move |col| (col, row)))
            .flat_map(|(col, row)| frame.fill(col, row))
            .flatten()
            .collect();
        for idx in 0..3 {
            assert!(filled.contains(&idx), "feature {idx} never drawn");
        }
        assert!(glyph_count(&frame.borders, frame.cols, frame.rows) > 0);

        let plain = renderer.render(&viewport, false);
        assert_eq!(glyph_count(&plain.borders, plain.cols, plain.rows), 0);
    }

    #[test]
    fn test_empty_canvas() {
        let renderer = ChoroplethRenderer::new(&world());
        let viewport = Viewport::fit(renderer.extent(), 1, 3);
        let frame = renderer.render(&viewport, true);
        assert_eq!((frame.cols, frame.rows), (0, 0));
        assert_eq!(frame.fill(0, 0), [None, None]);
    }

    #[test]
    fn test_outline_survives_zoom() {
        let renderer = ChoroplethRenderer::new(&world()[..1]);
        let mut viewport = Viewport::fit(renderer.extent(), 236, 104);
        // Keep the northern border in the middle of the screen
        viewport.center = natural_earth(-100.0, 49.0);

        let mut seen = Vec::new();
        while viewport.zoom < 12.0 {
            let outline = renderer.outline(0, &viewport);
            let glyphs = glyph_count(&outline, viewport.width / 2, viewport.height / 4);
            assert!(glyphs > 0, "outline empty at zoom {:.2}", viewport.zoom);
            seen.push(viewport.zoom);
            viewport.zoom_in();
        }
        assert!(seen.iter().any(|&z| (z - 3.375).abs() < 1e-9));
        assert!(seen.iter().any(|&z| z > 11.0));
    }

    #[test]
    fn test_antimeridian_edge_skipped() {
        // Ring closing across the dateline: the long edge must not be drawn
        let renderer = ChoroplethRenderer::new(&[Country {
            name: "Wrap".into(),
            polygons: vec![Polygon {
                exterior: vec![
                    (170.0, -10.0),
                    (179.0, -10.0),
                    (-179.0, 10.0),
                    (170.0, 10.0),
                    (170.0, -10.0),
                ],
                holes: vec![],
            }],
        }]);
        let viewport = Viewport::fit(Extent::world(), 160, 80);
        let outline = renderer.outline(0, &viewport);
        let (_, mid_y) = viewport.project(0.0, 0.0);
        let mid_row = (mid_y / 4) as usize;
        assert!((10..70).all(|c| outline.glyph(c, mid_row).is_none()));
        assert!((70..80).any(|c| outline.glyph(c, mid_row).is_some()));
    }
}
