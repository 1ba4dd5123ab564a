use std::f64::consts::PI;
use std::fmt::Write as _;

use geo::{BoundingRect, Coord, LineString, MapCoords, MultiPolygon, Polygon, Rect};

use crate::geography::{CountryGeometry, World, open_coords};

/// Scale used to measure the world before fitting it to the canvas.
const TRIAL_SCALE: f64 = 0.9;
/// Fraction of the canvas the fitted world occupies.
const FIT_FILL: f64 = 0.95;
/// Scale used when there is nothing to fit.
const DEFAULT_SCALE: f64 = 175.295;

/// Natural Earth I pseudo-cylindrical projection with a scale and pixel translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaturalEarth {
    pub scale: f64,
    pub translate: Coord<f64>,
}

impl NaturalEarth {
    pub fn new(scale: f64, translate: Coord<f64>) -> Self {
        Self { scale, translate }
    }

    /// Project `(lon, lat)` in degrees to pixel coordinates (y grows downward).
    pub fn project(&self, lonlat: Coord<f64>) -> Coord<f64> {
        let (x, y) = natural_earth_raw(lonlat.x * PI / 180.0, lonlat.y * PI / 180.0);
        Coord {
            x: self.translate.x + x * self.scale,
            y: self.translate.y - y * self.scale,
        }
    }

    pub fn project_ring(&self, ring: &LineString<f64>) -> LineString<f64> {
        let projection = *self;
        ring.map_coords(move |c| projection.project(c))
    }

    pub fn project_polygon(&self, polygon: &Polygon<f64>) -> Polygon<f64> {
        let projection = *self;
        polygon.map_coords(move |c| projection.project(c))
    }

    /// Fit the projection so `world` fills `FIT_FILL` of a `width` x `height` canvas, centered.
    pub fn fit(world: &World, width: f64, height: f64) -> Self {
        let centered_default = Self::new(
            DEFAULT_SCALE,
            Coord {
                x: width / 2.0,
                y: height / 2.0,
            },
        );
        let trial = Self::new(TRIAL_SCALE, Coord { x: 0.0, y: 0.0 });
        let Some(bounds) = world_bounds(world, &trial) else {
            return centered_default;
        };

        // Bounds at unit scale; translation is zero so scaling is linear.
        let unit = Rect::new(bounds.min() / TRIAL_SCALE, bounds.max() / TRIAL_SCALE);
        let ratio = (unit.width() / width).max(unit.height() / height);
        if ratio <= 0.0 || !ratio.is_finite() {
            return centered_default;
        }

        let scale = FIT_FILL / ratio;
        let center = unit.center();
        Self::new(
            scale,
            Coord {
                x: width / 2.0 - scale * center.x,
                y: height / 2.0 - scale * center.y,
            },
        )
    }
}

fn natural_earth_raw(lambda: f64, phi: f64) -> (f64, f64) {
    let phi2 = phi * phi;
    let phi4 = phi2 * phi2;
    (
        lambda
            * (0.8707 - 0.131979 * phi2
                + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4))),
        phi * (1.007226
            + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4))),
    )
}

/// Pixel bounds of every polygon of every feature, `None` when the world has no points.
pub fn world_bounds(world: &World, projection: &NaturalEarth) -> Option<Rect<f64>> {
    let projected: MultiPolygon<f64> = world
        .features
        .iter()
        .flat_map(|f| f.geometry.polygons())
        .map(|polygon| projection.project_polygon(polygon))
        .collect();
    projected.bounding_rect()
}

/// SVG path data of a projected geometry, holes included.
pub fn geo_path(geometry: &CountryGeometry, projection: &NaturalEarth) -> String {
    let rings: Vec<LineString<f64>> = geometry
        .polygons()
        .iter()
        .flat_map(|polygon| {
            let (exterior, interiors) = projection.project_polygon(polygon).into_inner();
            std::iter::once(exterior).chain(interiors)
        })
        .collect();
    path_data(&rings)
}

/// SVG path data for rings: `M x,y L x,y ... Z` per ring, closing point left to `Z`.
pub fn path_data(rings: &[LineString<f64>]) -> String {
    let mut out = String::new();
    for ring in rings {
        let coords = open_coords(ring);
        if coords.is_empty() {
            continue;
        }
        for (i, c) in coords.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(out, "{cmd}{},{}", round3(c.x), round3(c.y));
        }
        out.push('Z');
    }
    out
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geography::tests::SAMPLE_WORLD;

    fn lonlat(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn origin_projects_to_translation() {
        let projection = NaturalEarth::new(100.0, lonlat(530.0, 400.0));
        let p = projection.project(lonlat(0.0, 0.0));
        assert!((p.x - 530.0).abs() < 1e-9);
        assert!((p.y - 400.0).abs() < 1e-9);
    }

    #[test]
    fn north_is_up_and_east_is_right() {
        let projection = NaturalEarth::new(100.0, lonlat(0.0, 0.0));
        assert!(projection.project(lonlat(90.0, 0.0)).x > 0.0);
        assert!(projection.project(lonlat(0.0, 45.0)).y < 0.0);
    }

    #[test]
    fn fitted_world_is_centered_with_margin() {
        let world = World::from_geojson_str(SAMPLE_WORLD).expect("world should parse");
        let projection = NaturalEarth::fit(&world, 1060.0, 800.0);
        let bounds = world_bounds(&world, &projection).expect("bounds");

        let fill = (bounds.width() / 1060.0).max(bounds.height() / 800.0);
        assert!((fill - 0.95).abs() < 1e-6, "fill was {fill}");
        assert!((bounds.center().x - 530.0).abs() < 1e-6);
        assert!((bounds.center().y - 400.0).abs() < 1e-6);
        assert!(bounds.min().x >= 0.0 && bounds.max().x <= 1060.0);
        assert!(bounds.min().y >= 0.0 && bounds.max().y <= 800.0);
    }

    #[test]
    fn empty_world_falls_back_to_centered_default() {
        let projection = NaturalEarth::fit(&World::default(), 1060.0, 800.0);
        assert_eq!(projection.translate, lonlat(530.0, 400.0));
        assert_eq!(projection.scale, DEFAULT_SCALE);
    }

    #[test]
    fn path_data_closes_every_ring() {
        let rings = vec![
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]),
            LineString::from(vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0)]),
        ];
        assert_eq!(path_data(&rings), "M0,0L10,0L10,10ZM1,1L2,1L2,2Z");
    }

    #[test]
    fn geo_path_includes_holes() {
        let world = World::from_geojson_str(
            r#"{
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": {"name": "Ring", "iso_a2": "RG"},
                    "geometry": {"type": "Polygon", "coordinates": [
                        [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
                        [[2, 2], [4, 2], [4, 4], [2, 2]]
                    ]}
                }]
            }"#,
        )
        .expect("world should parse");
        let projection = NaturalEarth::fit(&world, 1060.0, 800.0);
        let path = geo_path(&world.features[0].geometry, &projection);
        assert_eq!(path.matches('M').count(), 2);
        assert_eq!(path.matches('Z').count(), 2);
    }
}
