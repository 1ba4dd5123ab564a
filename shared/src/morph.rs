//! Shape interpolation between projected country outlines and their tile squares.
//!
//! Both rings are densified so no segment exceeds a maximum length, padded to the same
//! point count, wound the same way and rotated to the best-matching start point. The
//! morph is then a per-point linear blend. Multi-part countries split their square into
//! vertical strips, one per part, and collapse into the single square at the end.

use geo::{Centroid, Coord, Densify, EuclideanLength, Line, LineString, Polygon, Rect, Winding};

use crate::geography::open_coords;
use crate::layout::TileRect;
use crate::projection::path_data;

/// Longest segment allowed after resampling, in pixels.
pub const MAX_SEGMENT_LENGTH: f64 = 10.0;

fn lerp(a: Coord<f64>, b: Coord<f64>, t: f64) -> Coord<f64> {
    a + (b - a) * t
}

fn squared_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}

/// Area centroid of the ring, falling back to its first point for degenerate rings.
fn ring_center(ring: &LineString<f64>) -> Coord<f64> {
    Polygon::new(ring.clone(), Vec::new())
        .centroid()
        .map(|p| p.0)
        .or_else(|| ring.0.first().copied())
        .unwrap_or(Coord { x: 0.0, y: 0.0 })
}

/// Closed copy of `ring` with no edge longer than `max_segment_length`.
pub fn resample(ring: &LineString<f64>, max_segment_length: f64) -> LineString<f64> {
    let mut ring = ring.clone();
    ring.close();
    if ring.0.len() < 2 || max_segment_length <= 0.0 {
        return ring;
    }
    ring.densify(max_segment_length)
}

/// Bisect the longest edge of the open ring until it has `count` points.
fn densify_to(ring: &mut Vec<Coord<f64>>, count: usize) {
    if ring.len() < 2 {
        return;
    }
    while ring.len() < count {
        let n = ring.len();
        let edge = |i: usize| Line::new(ring[i], ring[(i + 1) % n]).euclidean_length();
        let Some(longest) = (0..n).max_by(|&i, &j| edge(i).total_cmp(&edge(j))) else {
            return;
        };
        let mid = lerp(ring[longest], ring[(longest + 1) % n], 0.5);
        ring.insert(longest + 1, mid);
    }
}

/// Rotate `ring` so its start minimizes the summed squared distance to `target`.
fn align_start(ring: &mut [Coord<f64>], target: &[Coord<f64>]) {
    let n = ring.len();
    if n == 0 || n != target.len() {
        return;
    }
    let cost = |offset: usize| -> f64 {
        (0..n)
            .map(|i| squared_distance(ring[(i + offset) % n], target[i]))
            .sum()
    };
    let best = (0..n)
        .min_by(|&a, &b| cost(a).total_cmp(&cost(b)))
        .unwrap_or(0);
    ring.rotate_left(best);
}

/// Point-for-point interpolation between two closed rings.
#[derive(Debug, Clone, PartialEq)]
pub struct RingMorph {
    from: Vec<Coord<f64>>,
    to: Vec<Coord<f64>>,
}

impl RingMorph {
    pub fn new(from: &LineString<f64>, to: &LineString<f64>, max_segment_length: f64) -> Self {
        let to = resample(to, max_segment_length);
        let mut from = if open_coords(from).len() < 3 {
            // Nothing to morph from: grow out of the target's center.
            LineString::new(vec![ring_center(&to); to.0.len()])
        } else {
            resample(from, max_segment_length)
        };

        if (from.is_cw() && to.is_ccw()) || (from.is_ccw() && to.is_cw()) {
            from.0.reverse();
        }

        let mut from = open_coords(&from).to_vec();
        let mut to = open_coords(&to).to_vec();
        let count = from.len().max(to.len());
        densify_to(&mut from, count);
        densify_to(&mut to, count);
        align_start(&mut from, &to);

        Self { from, to }
    }

    /// Closed ring at progress `t`, clamped to `[0, 1]`.
    pub fn at(&self, t: f64) -> LineString<f64> {
        let t = t.clamp(0.0, 1.0);
        let mut ring: LineString<f64> = self
            .from
            .iter()
            .zip(&self.to)
            .map(|(&a, &b)| lerp(a, b, t))
            .collect();
        ring.close();
        ring
    }

    /// Points per ring, closing point excluded.
    pub fn len(&self) -> usize {
        self.from.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }
}

/// Morph of a whole country shape into its tile square.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMorph {
    pieces: Vec<RingMorph>,
    target: TileRect,
}

impl ShapeMorph {
    /// Morph a single outline directly into the square.
    pub fn to_rect(outline: &LineString<f64>, target: TileRect, max_segment_length: f64) -> Self {
        Self {
            pieces: vec![RingMorph::new(outline, &target.outline(), max_segment_length)],
            target,
        }
    }

    /// Morph several outlines into one square: each part fills a vertical strip, ordered
    /// left to right by the parts' centroids.
    pub fn combine(
        outlines: &[LineString<f64>],
        target: TileRect,
        max_segment_length: f64,
    ) -> Self {
        let mut order: Vec<usize> = (0..outlines.len()).collect();
        order.sort_by(|&a, &b| {
            ring_center(&outlines[a])
                .x
                .total_cmp(&ring_center(&outlines[b]).x)
        });

        let strip_width = target.size / outlines.len().max(1) as f64;
        let pieces = order
            .iter()
            .enumerate()
            .map(|(slot, &part)| {
                let x0 = target.x + strip_width * slot as f64;
                let strip = Rect::new(
                    Coord { x: x0, y: target.y },
                    Coord {
                        x: x0 + strip_width,
                        y: target.y + target.size,
                    },
                );
                RingMorph::new(&outlines[part], strip.to_polygon().exterior(), max_segment_length)
            })
            .collect();

        Self { pieces, target }
    }

    /// Final geometry: the tile square outline.
    pub fn target_outline(&self) -> LineString<f64> {
        self.target.outline()
    }

    /// Rings at progress `t`; from `t >= 1` on this is exactly the square outline.
    pub fn frame(&self, t: f64) -> Vec<LineString<f64>> {
        if t >= 1.0 {
            return vec![self.target_outline()];
        }
        self.pieces.iter().map(|piece| piece.at(t)).collect()
    }

    pub fn path_at(&self, t: f64) -> String {
        path_data(&self.frame(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: TileRect = TileRect {
        x: 100.0,
        y: 50.0,
        size: 40.0,
    };

    fn triangle() -> LineString<f64> {
        LineString::from(vec![(0.0, 0.0), (30.0, 80.0), (60.0, 0.0), (0.0, 0.0)])
    }

    fn square(x: f64, y: f64, size: f64) -> LineString<f64> {
        LineString::from(vec![
            (x, y),
            (x + size, y),
            (x + size, y + size),
            (x, y + size),
            (x, y),
        ])
    }

    fn max_x(ring: &LineString<f64>) -> f64 {
        ring.coords().map(|c| c.x).fold(f64::MIN, f64::max)
    }

    #[test]
    fn resample_limits_segment_length_and_keeps_ring_closed() {
        let open = LineString::from(vec![(0.0, 0.0), (25.0, 0.0), (25.0, 5.0)]);
        let ring = resample(&open, 10.0);
        assert!(ring.is_closed());
        assert!(ring.lines().all(|line| line.euclidean_length() <= 10.0 + 1e-9));
        assert_eq!(ring.0[0], Coord { x: 0.0, y: 0.0 });
    }

    #[test]
    fn ring_morph_endpoints_and_counts() {
        let morph = RingMorph::new(&triangle(), &RECT.outline(), MAX_SEGMENT_LENGTH);
        let start = morph.at(0.0);
        let end = morph.at(1.0);
        assert_eq!(start.0.len(), end.0.len());
        assert_eq!(open_coords(&start).len(), morph.len());

        for p in end.coords() {
            let on_left_or_right = (p.x - 100.0).abs() < 1e-9 || (p.x - 140.0).abs() < 1e-9;
            let on_top_or_bottom = (p.y - 50.0).abs() < 1e-9 || (p.y - 90.0).abs() < 1e-9;
            assert!(on_left_or_right || on_top_or_bottom, "{p:?} not on square edge");
        }
    }

    #[test]
    fn opposite_winding_is_normalized() {
        let mut reversed = triangle();
        reversed.0.reverse();
        let a = RingMorph::new(&triangle(), &RECT.outline(), MAX_SEGMENT_LENGTH).at(0.0);
        let b = RingMorph::new(&reversed, &RECT.outline(), MAX_SEGMENT_LENGTH).at(0.0);
        assert!(a.is_cw() || a.is_ccw());
        assert_eq!(a.is_cw(), b.is_cw());
        assert_eq!(RECT.outline().is_cw(), a.is_cw());
    }

    #[test]
    fn polygon_morph_ends_on_tile_outline() {
        let morph = ShapeMorph::to_rect(&triangle(), RECT, MAX_SEGMENT_LENGTH);
        assert_eq!(morph.frame(1.0), vec![RECT.outline()]);
        assert_eq!(morph.path_at(1.0), "M100,50L140,50L140,90L100,90Z");
    }

    #[test]
    fn combined_morph_ends_on_single_tile_outline() {
        let parts = vec![triangle(), square(200.0, 0.0, 20.0)];
        let morph = ShapeMorph::combine(&parts, RECT, MAX_SEGMENT_LENGTH);
        assert_eq!(morph.frame(0.5).len(), 2);
        assert_eq!(morph.frame(1.0), vec![RECT.outline()]);
        assert_eq!(morph.target_outline(), RECT.outline());
    }

    #[test]
    fn combined_parts_fill_strips_left_to_right() {
        let right = square(200.0, 0.0, 20.0);
        let left = square(0.0, 0.0, 20.0);
        let morph = ShapeMorph::combine(&[right, left], RECT, MAX_SEGMENT_LENGTH);
        let almost = morph.frame(1.0 - 1e-12);
        assert!(max_x(&almost[0]) <= 120.0 + 1e-6);
        assert!(max_x(&almost[1]) <= 140.0 + 1e-6);
    }

    #[test]
    fn degenerate_outline_grows_from_center() {
        let morph = ShapeMorph::to_rect(&LineString::new(Vec::new()), RECT, MAX_SEGMENT_LENGTH);
        let start = morph.frame(0.0);
        assert!(
            start[0]
                .coords()
                .all(|p| (p.x - 120.0).abs() < 1e-9 && (p.y - 70.0).abs() < 1e-9)
        );
    }
}
