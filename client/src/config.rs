/// Natural Earth country outlines with `name` and `iso_a2` properties.
pub const WORLD_GEOJSON_URL: &str = "https://gist.githubusercontent.com/KarimDouieb/fbd29d80918c0b16aef837680eddb865/raw/0a2243629bf4c95f1853aac2aa6e2ebdda61cd38/world.geo.json";
/// Tile grid cartogram cells (`alpha2`, `name`, `x`, `y`).
pub const TILE_GRID_URL: &str = "https://gist.githubusercontent.com/KarimDouieb/fbd29d80918c0b16aef837680eddb865/raw/0a2243629bf4c95f1853aac2aa6e2ebdda61cd38/worldTileGrid.json";

pub const VISITS_PATH: &str = "/visits";
pub const UNIQUE_VISITS_PATH: &str = "/uniquevisits";

pub const VISUALIZATION_SELECTOR: &str = ".visualization";
pub const UNIQUE_COUNT_SELECTOR: &str = ".emph";

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Length of the outline-to-tile morph and label fade; 0 jumps straight to the tiles.
pub const MORPH_DURATION_MS: f64 = 750.0;
