pub mod geojson_input;

pub use geojson_input::{GeoInput, InputError, parse_str};
