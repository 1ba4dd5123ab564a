use std::collections::{BTreeMap, HashMap};

use geo::LineString;
use serde::{Deserialize, Serialize};

use crate::colors::{NO_DATA_FILL, SequentialScale, label_fill, midpoint, value_domain};
use crate::geography::{CountryFeature, CountryGeometry, TileGrid, World};
use crate::layout::TileLayout;
use crate::morph::{MAX_SEGMENT_LENGTH, ShapeMorph};
use crate::projection::{NaturalEarth, geo_path};

pub const CANVAS_WIDTH: f64 = 1060.0;
pub const CANVAS_HEIGHT: f64 = 800.0;

/// One row of the dataset; accessors name fields in it.
pub type DataRecord = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// How a record's country field identifies the country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountryCodeType {
    /// Full country name, matched against the tile grid names.
    #[default]
    Name,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    pub value_accessor: String,
    pub country_code_type: CountryCodeType,
    pub country_code_accessor: String,
    pub data: Vec<DataRecord>,
    pub view: String,
}

impl RenderState {
    /// Visit counts keyed by country name, shown as the grid cartogram.
    pub fn visits(data: Vec<DataRecord>) -> Self {
        Self {
            value_accessor: "Visit".to_string(),
            country_code_type: CountryCodeType::Name,
            country_code_accessor: "Country".to_string(),
            data,
            view: "grid".to_string(),
        }
    }
}

/// Whether country shapes exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartPhase {
    /// Nothing drawn; the next redraw creates shapes and morphs them into tiles.
    #[default]
    Uninitialized,
    /// Shapes are tiles; redraws only restyle fills.
    Initialized,
}

impl ChartPhase {
    /// The only transition: a completed first draw. There is no way back.
    pub fn advance(self) -> Self {
        match self {
            ChartPhase::Uninitialized | ChartPhase::Initialized => ChartPhase::Initialized,
        }
    }
}

/// CRC32 of everything that changes the rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub u32);

impl Fingerprint {
    pub fn of(state: &RenderState) -> Self {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(state.value_accessor.as_bytes());
        hasher.update(&[0]);
        hasher.update(state.country_code_accessor.as_bytes());
        hasher.update(&[0]);
        for record in &state.data {
            // Sorted keys so field order does not affect the hash.
            let sorted: BTreeMap<&String, &serde_json::Value> = record.iter().collect();
            if let Ok(bytes) = serde_json::to_vec(&sorted) {
                hasher.update(&bytes);
            }
            hasher.update(b"\n");
        }
        Fingerprint(hasher.finalize())
    }
}

/// Numeric value of `field` in `record`, if it is a number.
fn numeric_field(record: &DataRecord, field: &str) -> Option<f64> {
    record.get(field).and_then(serde_json::Value::as_f64)
}

/// Resolve each record's country to a tile-grid code. The first grid match wins,
/// unmatched records are dropped and later records for the same code overwrite earlier ones.
pub fn join_values(
    data: &[DataRecord],
    grid: &TileGrid,
    code_type: CountryCodeType,
    code_accessor: &str,
    value_accessor: &str,
) -> HashMap<String, f64> {
    let mut values = HashMap::new();
    for record in data {
        let cell = match code_type {
            CountryCodeType::Name => record
                .get(code_accessor)
                .and_then(serde_json::Value::as_str)
                .and_then(|name| grid.find_by_name(name)),
        };
        let (Some(cell), Some(value)) = (cell, numeric_field(record, value_accessor)) else {
            continue;
        };
        values.insert(cell.alpha2.clone(), value);
    }
    values
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelFrame {
    /// Index of the feature this label belongs to.
    pub feature: usize,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub fill: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeFrame {
    pub feature: usize,
    pub fill: String,
    /// Projected geographic outline, `None` when the country has no tile.
    pub geo_path: Option<String>,
    pub morph: Option<ShapeMorph>,
}

/// First draw: create labels and shapes, then morph shapes into tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialFrame {
    pub labels: Vec<LabelFrame>,
    pub shapes: Vec<ShapeFrame>,
    /// Codes of features without a tile; their shapes stay empty.
    pub unmatched: Vec<String>,
}

/// Later draws: recolor existing shapes and labels, geometry untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RestyleFrame {
    /// One fill per feature, in feature order.
    pub shape_fills: Vec<String>,
    pub label_fills: Vec<(usize, &'static str)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Initial(InitialFrame),
    Restyle(RestyleFrame),
}

/// Everything derived from one dataset that fill decisions need.
struct ValueContext {
    values: HashMap<String, f64>,
    scale: Option<SequentialScale>,
    midpoint: f64,
}

impl ValueContext {
    fn value(&self, code: &str) -> Option<f64> {
        self.values.get(code).copied()
    }

    fn shape_fill(&self, code: &str) -> String {
        match (self.value(code), self.scale) {
            (Some(v), Some(scale)) => scale.css(v),
            _ => NO_DATA_FILL.to_string(),
        }
    }

    fn label_fill(&self, code: &str) -> &'static str {
        label_fill(self.value(code), self.midpoint)
    }
}

/// Choropleth chart that morphs geographic outlines into a tile-grid cartogram.
#[derive(Debug, Clone)]
pub struct Chart {
    world: World,
    grid: TileGrid,
    width: f64,
    height: f64,
    margin: Margin,
    phase: ChartPhase,
    value_accessor: String,
    country_code_type: CountryCodeType,
    country_code_accessor: String,
    view: String,
    drawn: Option<Fingerprint>,
    layout: TileLayout,
}

impl Chart {
    pub fn new(world: World, grid: TileGrid) -> Self {
        Self {
            world,
            grid,
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            margin: Margin::default(),
            phase: ChartPhase::Uninitialized,
            value_accessor: String::new(),
            country_code_type: CountryCodeType::Name,
            country_code_accessor: String::new(),
            view: String::new(),
            drawn: None,
            layout: TileLayout::default(),
        }
    }

    /// Inner drawing size after margins.
    pub fn size(&self) -> (f64, f64) {
        (
            self.width - (self.margin.left + self.margin.right),
            self.height - (self.margin.top + self.margin.bottom),
        )
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    pub fn phase(&self) -> ChartPhase {
        self.phase
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn value_accessor(&self) -> &str {
        &self.value_accessor
    }

    pub fn layout(&self) -> &TileLayout {
        &self.layout
    }

    /// Store the configuration and redraw if the data or accessors changed.
    /// Returns the frame to apply, `None` when the output would not change.
    pub fn update(&mut self, state: RenderState) -> Option<Frame> {
        let fingerprint = Fingerprint::of(&state);
        self.value_accessor = state.value_accessor;
        self.country_code_type = state.country_code_type;
        self.country_code_accessor = state.country_code_accessor;
        self.view = state.view;

        if self.drawn == Some(fingerprint) {
            return None;
        }
        let frame = self.redraw(&state.data);
        self.drawn = Some(fingerprint);
        Some(frame)
    }

    fn redraw(&mut self, data: &[DataRecord]) -> Frame {
        let context = self.value_context(data);
        let (width, height) = self.size();
        let projection = NaturalEarth::fit(&self.world, width, height);
        self.layout = TileLayout::compute(&self.grid, width, height);

        let label_fills: Vec<(usize, &'static str)> = self
            .world
            .features
            .iter()
            .enumerate()
            .filter(|(_, f)| self.layout.rect(&f.code).is_some())
            .map(|(i, f)| (i, context.label_fill(&f.code)))
            .collect();

        if self.phase == ChartPhase::Initialized {
            return Frame::Restyle(RestyleFrame {
                shape_fills: self
                    .world
                    .features
                    .iter()
                    .map(|f| context.shape_fill(&f.code))
                    .collect(),
                label_fills,
            });
        }

        let labels = label_fills
            .iter()
            .filter_map(|&(i, fill)| {
                let feature = &self.world.features[i];
                let center = self.layout.rect(&feature.code)?.center();
                Some(LabelFrame {
                    feature: i,
                    text: feature.code.clone(),
                    x: center.x,
                    y: center.y,
                    fill,
                })
            })
            .collect();

        let mut unmatched = Vec::new();
        let shapes = self
            .world
            .features
            .iter()
            .enumerate()
            .map(|(i, feature)| {
                let fill = context.shape_fill(&feature.code);
                match self.morph_for(feature, &projection) {
                    Some(morph) => ShapeFrame {
                        feature: i,
                        fill,
                        geo_path: Some(geo_path(&feature.geometry, &projection)),
                        morph: Some(morph),
                    },
                    None => {
                        unmatched.push(feature.code.clone());
                        ShapeFrame {
                            feature: i,
                            fill,
                            geo_path: None,
                            morph: None,
                        }
                    }
                }
            })
            .collect();

        self.phase = self.phase.advance();
        Frame::Initial(InitialFrame {
            labels,
            shapes,
            unmatched,
        })
    }

    fn value_context(&self, data: &[DataRecord]) -> ValueContext {
        let domain = value_domain(
            data.iter()
                .filter_map(|r| numeric_field(r, &self.value_accessor)),
        );
        ValueContext {
            values: join_values(
                data,
                &self.grid,
                self.country_code_type,
                &self.country_code_accessor,
                &self.value_accessor,
            ),
            scale: domain.map(SequentialScale::new),
            midpoint: domain.map(midpoint).unwrap_or(0.0),
        }
    }

    fn morph_for(&self, feature: &CountryFeature, projection: &NaturalEarth) -> Option<ShapeMorph> {
        let rect = *self.layout.rect(&feature.code)?;
        Some(match &feature.geometry {
            CountryGeometry::MultiPolygon(polygons) => {
                let outlines: Vec<LineString<f64>> = polygons
                    .0
                    .iter()
                    .map(|polygon| projection.project_ring(polygon.exterior()))
                    .collect();
                ShapeMorph::combine(&outlines, rect, MAX_SEGMENT_LENGTH)
            }
            CountryGeometry::Polygon(polygon) => ShapeMorph::to_rect(
                &projection.project_ring(polygon.exterior()),
                rect,
                MAX_SEGMENT_LENGTH,
            ),
        })
    }
}
