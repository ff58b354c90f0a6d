use glam::DVec2;

/// Natural Earth I pseudo-cylindrical projection of (lon, lat) in degrees.
/// Output is in plane units with y pointing north.
pub fn natural_earth(lon: f64, lat: f64) -> DVec2 {
    let lambda = lon.to_radians();
    let phi = lat.clamp(-90.0, 90.0).to_radians();
    let phi2 = phi * phi;
    let phi4 = phi2 * phi2;

    let x = lambda
        * (0.8707 - 0.131979 * phi2
            + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4)));
    let y = phi
        * (1.007226
            + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4)));
    DVec2::new(x, y)
}

/// Axis-aligned bounds in plane units
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub min: DVec2,
    pub max: DVec2,
}

impl Extent {
    pub const EMPTY: Self = Self {
        min: DVec2::splat(f64::INFINITY),
        max: DVec2::splat(f64::NEG_INFINITY),
    };

    pub fn include(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    /// Whole-world extent, used when nothing was loaded
    pub fn world() -> Self {
        let mut extent = Self::EMPTY;
        for lon in [-180.0, 0.0, 180.0] {
            for lat in [-90.0, 0.0, 90.0] {
                extent.include(natural_earth(lon, lat));
            }
        }
        extent
    }
}

/// Visible map area: which part of the projected plane maps onto the
/// braille pixel grid, and at what zoom.
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Plane point shown at the canvas center
    pub center: DVec2,
    /// Zoom level relative to the fitted view (1 = whole extent visible)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
    /// Extent the view was fitted to
    extent: Extent,
}

impl Viewport {
    /// Fit `extent` into a `width` x `height` pixel canvas
    pub fn fit(extent: Extent, width: usize, height: usize) -> Self {
        let extent = if extent.is_empty() {
            Extent::world()
        } else {
            extent
        };
        Self {
            center: extent.center(),
            zoom: 1.0,
            width,
            height,
            extent,
        }
    }

    /// Pixels per plane unit at zoom 1
    fn base_scale(&self) -> f64 {
        let size = self.extent.size();
        let sx = if size.x > 0.0 {
            self.width as f64 / size.x
        } else {
            f64::INFINITY
        };
        let sy = if size.y > 0.0 {
            self.height as f64 / size.y
        } else {
            f64::INFINITY
        };
        let s = sx.min(sy);
        if s.is_finite() && s > 0.0 {
            s
        } else {
            1.0
        }
    }

    fn scale(&self) -> f64 {
        self.base_scale() * self.zoom
    }

    /// Change the canvas size, keeping center and zoom
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Back to the fitted whole-extent view
    pub fn reset(&mut self) {
        self.center = self.extent.center();
        self.zoom = 1.0;
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.scale();
        self.center.x += dx as f64 / scale;
        self.center.y -= dy as f64 / scale;

        // Keep the center over the map
        self.center = self.center.clamp(self.extent.min, self.extent.max);
    }

    /// Zoom in by a factor
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(50.0);
    }

    /// Zoom out by a factor
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(1.0);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor keeping the plane point under (px, py) fixed
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let anchor = self.unproject(px as f64, py as f64);
        self.zoom = (self.zoom * factor).clamp(1.0, 50.0);

        let (new_px, new_py) = self.project_plane(anchor);
        self.pan(new_px - px, new_py - py);
    }

    /// Plane point under a (fractional) pixel position
    pub fn unproject(&self, px: f64, py: f64) -> DVec2 {
        let scale = self.scale();
        DVec2::new(
            (px - self.width as f64 / 2.0) / scale + self.center.x,
            -(py - self.height as f64 / 2.0) / scale + self.center.y,
        )
    }

    /// Plane point to pixel coordinates
    pub fn project_plane(&self, p: DVec2) -> (i32, i32) {
        let scale = self.scale();
        let px = (p.x - self.center.x) * scale + self.width as f64 / 2.0;
        let py = -(p.y - self.center.y) * scale + self.height as f64 / 2.0;
        (px.round() as i32, py.round() as i32)
    }

    /// Geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        self.project_plane(natural_earth(lon, lat))
    }

    /// Plane bounds currently on screen
    pub fn visible_extent(&self) -> Extent {
        let mut extent = Extent::EMPTY;
        extent.include(self.unproject(0.0, 0.0));
        extent.include(self.unproject(self.width as f64, self.height as f64));
        extent
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_earth_origin_and_symmetry() {
        assert_eq!(natural_earth(0.0, 0.0), DVec2::ZERO);
        let east = natural_earth(90.0, 45.0);
        let west = natural_earth(-90.0, -45.0);
        assert!((east + west).length() < 1e-12);
        // Equator spans 2 * pi * 0.8707
        let edge = natural_earth(180.0, 0.0);
        assert!((edge.x - std::f64::consts::PI * 0.8707).abs() < 1e-9);
    }

    #[test]
    fn test_fit_centers_extent() {
        let extent = Extent {
            min: DVec2::new(-2.0, -1.0),
            max: DVec2::new(2.0, 1.0),
        };
        let vp = Viewport::fit(extent, 200, 100);
        assert_eq!(vp.project_plane(DVec2::ZERO), (100, 50));
        assert_eq!(vp.project_plane(DVec2::new(-2.0, 1.0)), (0, 0));
        assert_eq!(vp.project_plane(DVec2::new(2.0, -1.0)), (200, 100));
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::fit(Extent::world(), 320, 160);
        let p = natural_earth(10.0, 50.0);
        let (px, py) = vp.project_plane(p);
        let back = vp.unproject(px as f64, py as f64);
        assert!((back - p).length() < 0.05);
    }

    #[test]
    fn test_pan_and_zoom() {
        let mut vp = Viewport::fit(Extent::world(), 320, 160);
        let start = vp.center;
        vp.pan(10, 0);
        assert!(vp.center.x > start.x);
        vp.zoom_out();
        assert_eq!(vp.zoom, 1.0);

        let anchor = vp.unproject(40.0, 30.0);
        vp.zoom_in_at(40, 30);
        assert!(vp.zoom > 1.0);
        let (px, py) = vp.project_plane(anchor);
        assert!((px - 40).abs() <= 1 && (py - 30).abs() <= 1);

        vp.reset();
        assert_eq!(vp.center, start);
        assert_eq!(vp.zoom, 1.0);
    }
}
