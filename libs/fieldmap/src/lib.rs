extern crate self as fieldmap;

pub mod coerce;
pub mod config;
pub mod converter;
pub mod error;
pub mod map;
pub mod record;
pub mod schema;
pub mod seq;
pub mod value;

pub use fieldmap_derive::{NamedEnum, Record};

pub use coerce::{
    change_type, from_yes_no, parse_date, parse_enum, parse_enum_default, to_date_time_string,
};
pub use converter::{map_to_object, object_to_map, Converter};
pub use error::{Error, Result};
pub use map::FieldMap;
pub use value::{Value, ValueKind};
