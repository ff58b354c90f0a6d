use crate::braille::BrailleCanvas;
use crate::data::{Country, Polygon};
use crate::map::projection::{natural_earth, Extent};
use glam::DVec2;

/// Projected polygon: first ring is the exterior, the rest are holes
pub struct PlanePolygon {
    pub rings: Vec<Vec<DVec2>>,
    pub bbox: Extent,
}

impl PlanePolygon {
    fn project(polygon: &Polygon) -> Self {
        let rings: Vec<Vec<DVec2>> = std::iter::once(&polygon.exterior)
            .chain(&polygon.holes)
            .map(|ring| {
                ring.iter()
                    .map(|&(lon, lat)| natural_earth(lon, lat))
                    .collect()
            })
            .collect();

        let mut bbox = Extent::EMPTY;
        for &p in &rings[0] {
            bbox.include(p);
        }
        Self { rings, bbox }
    }

    /// Even-odd test across all rings, so holes are excluded
    pub fn contains(&self, p: DVec2) -> bool {
        if !self.bbox.contains(p) {
            return false;
        }
        self.rings
            .iter()
            .fold(false, |inside, ring| inside ^ ring_crosses(ring, p))
    }
}

/// Odd number of edge crossings for a ray cast from `p` towards +x
fn ring_crosses(ring: &[DVec2], p: DVec2) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let a = ring[i];
        let b = ring[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// A country outline in plane coordinates
pub struct Shape {
    pub name: String,
    pub polygons: Vec<PlanePolygon>,
    pub bbox: Extent,
}

impl Shape {
    pub fn project(country: &Country) -> Self {
        let polygons: Vec<PlanePolygon> =
            country.polygons.iter().map(PlanePolygon::project).collect();
        let bbox = polygons
            .iter()
            .fold(Extent::EMPTY, |acc, poly| acc.union(&poly.bbox));
        Self {
            name: country.name.clone(),
            polygons,
            bbox,
        }
    }

    pub fn contains(&self, p: DVec2) -> bool {
        self.bbox.contains(p) && self.polygons.iter().any(|poly| poly.contains(p))
    }
}

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}
