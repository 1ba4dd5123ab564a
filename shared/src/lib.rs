pub mod chart;
pub mod colors;
pub mod geography;
pub mod layout;
pub mod morph;
pub mod projection;
pub mod visits;

pub use chart::{
    CANVAS_HEIGHT, CANVAS_WIDTH, Chart, ChartPhase, CountryCodeType, DataRecord, Fingerprint,
    Frame, InitialFrame, LabelFrame, RenderState, RestyleFrame, ShapeFrame,
};
pub use geography::{CountryFeature, CountryGeometry, TileCell, TileGrid, World, WorldError};
pub use layout::{TileLayout, TileRect};
pub use visits::{UniqueVisits, VisitRecord, backend_country_name, unique_count};
