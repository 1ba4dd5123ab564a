use std::fmt;

use geo::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use geojson::{Feature, GeoJson};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum CountryGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl CountryGeometry {
    /// All polygons of the geometry, a single-element slice for `Polygon`.
    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            CountryGeometry::Polygon(polygon) => std::slice::from_ref(polygon),
            CountryGeometry::MultiPolygon(polygons) => &polygons.0,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, CountryGeometry::MultiPolygon(_))
    }
}

/// Coordinates of a ring without its repeated closing point.
pub fn open_coords(ring: &LineString<f64>) -> &[Coord<f64>] {
    match ring.0.split_last() {
        Some((_, rest)) if ring.0.len() > 1 && ring.is_closed() => rest,
        _ => &ring.0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    /// Two-letter code (`properties.iso_a2`).
    pub code: String,
    /// Display name (`properties.name`).
    pub name: String,
    pub geometry: CountryGeometry,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    pub features: Vec<CountryFeature>,
    /// Why each feature that could not be drawn was left out.
    pub skipped: Vec<String>,
}

#[derive(Debug)]
pub enum WorldError {
    Parse(geojson::Error),
    NotFeatureCollection,
    MissingProperty {
        feature: usize,
        property: &'static str,
    },
    MissingGeometry {
        code: String,
    },
    UnsupportedGeometry {
        code: String,
        kind: &'static str,
    },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::Parse(e) => write!(f, "invalid GeoJSON: {e}"),
            WorldError::NotFeatureCollection => write!(f, "expected a FeatureCollection"),
            WorldError::MissingProperty { feature, property } => {
                write!(f, "feature #{feature} has no string property `{property}`")
            }
            WorldError::MissingGeometry { code } => write!(f, "country {code} has no geometry"),
            WorldError::UnsupportedGeometry { code, kind } => {
                write!(f, "country {code} has unsupported geometry type {kind}")
            }
        }
    }
}

impl std::error::Error for WorldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorldError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<geojson::Error> for WorldError {
    fn from(e: geojson::Error) -> Self {
        WorldError::Parse(e)
    }
}

impl World {
    pub fn from_geojson_str(content: &str) -> Result<Self, WorldError> {
        let geojson: GeoJson = content.parse()?;
        Self::from_geojson(geojson)
    }

    /// Convert every Polygon/MultiPolygon feature. Features that cannot be drawn are
    /// left out and described in `skipped`; only a malformed document is an error.
    pub fn from_geojson(geojson: GeoJson) -> Result<Self, WorldError> {
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(WorldError::NotFeatureCollection);
        };

        let mut world = World::default();
        for (index, feature) in collection.features.into_iter().enumerate() {
            match country_from_feature(index, feature) {
                Ok(country) => world.features.push(country),
                Err(e) => world.skipped.push(e.to_string()),
            }
        }
        Ok(world)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn country_from_feature(index: usize, feature: Feature) -> Result<CountryFeature, WorldError> {
    let string_property = |property: &'static str| {
        feature
            .property(property)
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .ok_or(WorldError::MissingProperty {
                feature: index,
                property,
            })
    };
    let name = string_property("name")?;
    let code = string_property("iso_a2")?;

    let Some(geometry) = feature.geometry else {
        return Err(WorldError::MissingGeometry { code });
    };

    let geometry: Geometry<f64> = geometry.value.try_into()?;
    let geometry = match geometry {
        Geometry::Polygon(polygon) => CountryGeometry::Polygon(polygon),
        Geometry::MultiPolygon(polygons) => CountryGeometry::MultiPolygon(polygons),
        other => {
            return Err(WorldError::UnsupportedGeometry {
                code,
                kind: geometry_kind(&other),
            });
        }
    };

    Ok(CountryFeature {
        code,
        name,
        geometry,
    })
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// One cell of the tile-grid cartogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCell {
    pub alpha2: String,
    pub name: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileGrid {
    pub cells: Vec<TileCell>,
}

impl TileGrid {
    pub fn new(cells: Vec<TileCell>) -> Self {
        Self { cells }
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Vec<TileCell>>(content).map(Self::new)
    }

    /// First cell whose name equals `name` exactly.
    pub fn find_by_name(&self, name: &str) -> Option<&TileCell> {
        self.cells.iter().find(|cell| cell.name == name)
    }

    /// `(min, max)` column and row indices, `None` for an empty grid.
    pub fn extent(&self) -> Option<((i32, i32), (i32, i32))> {
        let first = self.cells.first()?;
        let init = ((first.x, first.x), (first.y, first.y));
        Some(self.cells.iter().fold(init, |((x0, x1), (y0, y1)), cell| {
            ((x0.min(cell.x), x1.max(cell.x)), (y0.min(cell.y), y1.max(cell.y)))
        }))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_WORLD: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "Peru", "iso_a2": "PE"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-80, -4], [-70, -4], [-70, -18], [-80, -18], [-80, -4]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "Japan", "iso_a2": "JP"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[130, 31], [135, 34], [132, 35], [130, 31]]],
                        [[[139, 35], [142, 40], [140, 41], [138, 37], [139, 35]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "Atlantis", "iso_a2": "XA"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-30, 10], [-25, 10], [-25, 5], [-30, 10]]]
                }
            }
        ]
    }"#;

    pub(crate) const SAMPLE_TILES: &str = r#"[
        {"alpha2": "PE", "name": "Peru", "x": 0, "y": 1},
        {"alpha2": "JP", "name": "Japan", "x": 3, "y": 0},
        {"alpha2": "CL", "name": "Chile", "x": 1, "y": 2}
    ]"#;

    #[test]
    fn parses_polygon_and_multipolygon_features() {
        let world = World::from_geojson_str(SAMPLE_WORLD).expect("world should parse");
        assert_eq!(world.len(), 3);
        assert!(world.skipped.is_empty());

        let peru = &world.features[0];
        assert_eq!(peru.code, "PE");
        assert_eq!(peru.name, "Peru");
        assert!(!peru.geometry.is_multi());
        let exterior = peru.geometry.polygons()[0].exterior();
        assert_eq!(exterior.0.len(), 5);
        assert_eq!(open_coords(exterior).len(), 4);

        let japan = &world.features[1];
        assert!(japan.geometry.is_multi());
        assert_eq!(japan.geometry.polygons().len(), 2);
    }

    #[test]
    fn undrawable_features_are_skipped_not_fatal() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"name": "Pointland", "iso_a2": "PL"},
                    "geometry": {"type": "Point", "coordinates": [0, 0]}
                },
                {
                    "type": "Feature",
                    "properties": {"name": "Nowhere"},
                    "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}
                },
                {
                    "type": "Feature",
                    "properties": {"name": "Peru", "iso_a2": "PE"},
                    "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}
                }
            ]
        }"#;
        let world = World::from_geojson_str(content).expect("collection should still load");

        assert_eq!(world.len(), 1);
        assert_eq!(world.features[0].code, "PE");
        assert_eq!(world.skipped.len(), 2);
        assert!(world.skipped[0].contains("PL") && world.skipped[0].contains("Point"));
        assert!(world.skipped[1].contains("iso_a2"));
    }

    #[test]
    fn rejects_documents_that_are_not_feature_collections() {
        let content = r#"{"type": "Point", "coordinates": [0, 0]}"#;
        assert!(matches!(
            World::from_geojson_str(content),
            Err(WorldError::NotFeatureCollection)
        ));
    }

    #[test]
    fn open_coords_drops_only_the_closing_point() {
        let closed = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(open_coords(&closed).len(), 3);
        let open = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        assert_eq!(open_coords(&open).len(), 3);
        assert!(open_coords(&LineString::new(Vec::new())).is_empty());
    }

    #[test]
    fn tile_grid_lookup_and_extent() {
        let grid = TileGrid::from_json_str(SAMPLE_TILES).expect("tiles should parse");
        assert_eq!(grid.find_by_name("Japan").map(|c| c.alpha2.as_str()), Some("JP"));
        assert!(grid.find_by_name("japan").is_none());
        assert_eq!(grid.extent(), Some(((0, 3), (0, 2))));
        assert_eq!(TileGrid::default().extent(), None);
    }
}
