use crate::map::projection::Extent;
use glam::DVec2;
use std::collections::HashMap;

/// Spatial index for projected features using conservative approximation.
/// Each feature's bounding box is indexed into every cell it overlaps,
/// guaranteeing no false negatives while allowing false positives
/// (eliminated by the caller's point-in-polygon test).
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, p: DVec2) -> (i32, i32) {
        let x = (p.x / self.cell_size).floor() as i32;
        let y = (p.y / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from feature bounding boxes, in feature order
    pub fn build<'a>(bboxes: impl Iterator<Item = &'a Extent>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, bbox) in bboxes.enumerate() {
            if bbox.is_empty() {
                continue;
            }
            let min_cell = grid.to_cell(bbox.min);
            let max_cell = grid.to_cell(bbox.max);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Candidate features whose bbox may contain `p`, in ascending order
    #[inline(always)]
    pub fn query_point(&self, p: DVec2) -> &[usize] {
        self.cells
            .get(&self.to_cell(p))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append feature indices for the given bounds into results vec.
    /// May contain duplicates; caller should dedup after all queries.
    pub fn query_into(&self, bounds: &Extent, results: &mut Vec<usize>) {
        let min_cell = self.to_cell(bounds.min);
        let max_cell = self.to_cell(bounds.max);
        for y in min_cell.1..=max_cell.1 {
            for x in min_cell.0..=max_cell.0 {
                if let Some(indices) = self.cells.get(&(x, y)) {
                    results.extend_from_slice(indices);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent(x0: f64, y0: f64, x1: f64, y1: f64) -> Extent {
        Extent {
            min: DVec2::new(x0, y0),
            max: DVec2::new(x1, y1),
        }
    }

    #[test]
    fn test_point_query_has_no_false_negatives() {
        let boxes = [extent(0.0, 0.0, 0.35, 0.35), extent(0.3, 0.3, 0.6, 0.6)];
        let grid = FeatureGrid::build(boxes.iter(), 0.1);

        assert_eq!(grid.query_point(DVec2::new(0.05, 0.05)), &[0]);
        assert_eq!(grid.query_point(DVec2::new(0.32, 0.32)), &[0, 1]);
        assert_eq!(grid.query_point(DVec2::new(0.55, 0.55)), &[1]);
        assert!(grid.query_point(DVec2::new(-1.0, -1.0)).is_empty());
    }

    #[test]
    fn test_bounds_query() {
        let boxes = [
            extent(0.0, 0.0, 0.1, 0.1),
            extent(5.0, 5.0, 5.1, 5.1),
            Extent::EMPTY,
        ];
        let grid = FeatureGrid::build(boxes.iter(), 0.5);
        let mut found = Vec::new();
        grid.query_into(&extent(-1.0, -1.0, 1.0, 1.0), &mut found);
        found.sort_unstable();
        found.dedup();
        assert_eq!(found, [0]);
    }
}
