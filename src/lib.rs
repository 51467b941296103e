//! Lazy decoder for Mapbox vector tiles.
//!
//! This crate exposes a read-only, pull-based view of a single encoded tile
//! in the [Mapbox vector tile format] (specification version 1 and 2):
//! nothing beyond the top-level layer index is decoded until it is asked for.
//!
//! [`Tile`] indexes the raw layer sub-messages by name, [`Layer`]
//! materializes one layer's shared attribute tables, [`Feature`] is a
//! lightweight cursor over a single feature, and [`Feature::geometries`]
//! interprets the packed geometry command stream into point sequences of a
//! caller-chosen coordinate width.
//!
//! All types borrow the caller's byte buffer and are immutable after
//! construction, so independent layers and features can be used from
//! multiple threads without synchronization.
//!
//! [Mapbox vector tile format]: https://github.com/mapbox/vector-tile-spec
//!
//! # Examples
//!
//! ```no_run
//! use tileview::{GeometryCollection, Tile};
//!
//! let data = std::fs::read("tile.mvt").unwrap();
//! let tile = Tile::new(&data).unwrap();
//!
//! for name in tile.layer_names() {
//!     let layer = tile.get_layer(name).unwrap();
//!
//!     for feature in layer.features() {
//!         let feature = feature.unwrap();
//!         let paths: GeometryCollection<i32> = feature.geometries(1.).unwrap();
//!
//!         println!("{name}: {:?} with {} paths", feature.geom_type(), paths.len());
//!     }
//! }
//! ```

use std::str::Utf8Error;

use prost::DecodeError;

pub use crate::feature::{Feature, GeomType, Identifier, Value};
pub use crate::geometry::{Coordinate, GeometryCollection, Point};
pub use crate::layer::Layer;
pub use crate::tile::Tile;

mod feature;
mod geometry;
mod layer;
mod protobuf;
mod tile;

#[cfg(test)]
mod fixtures;

/// Tile decoding error.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Protobuf(#[from] DecodeError),
    #[error("{0}")]
    Utf8(#[from] Utf8Error),

    /// A length-delimited field exceeds its enclosing message.
    #[error("Length-delimited field exceeds its message")]
    TruncatedMessage,
    /// A recognized field uses the wrong wire type.
    #[error("Unexpected wire type for a recognized field")]
    InvalidWireType,
    /// A layer sub-message has no name.
    #[error("Layer without a name")]
    MissingLayerName,
    /// [`Tile::get_layer`] was called with an unknown layer name.
    #[error("Tile has no layer named {0:?}")]
    LayerNotFound(String),
    /// A layer sub-message lacks one of its required fields.
    #[error("Layer is missing required field {0:?}")]
    MissingRequiredField(&'static str),
    /// A feature index is beyond the layer's feature list.
    #[error("Feature index {index} is beyond the layer's {len} features")]
    IndexOutOfRange { index: usize, len: usize },
    /// A feature's tag stream ended on a half pair.
    #[error("Feature tags do not form key/value pairs")]
    UnevenTags,
    /// A tag pair references a key beyond the layer's key table.
    #[error("Tag key index {0} is beyond the layer's key table")]
    KeyIndexOutOfRange(u32),
    /// A tag pair references a value beyond the layer's value table.
    #[error("Tag value index {0} is beyond the layer's value table")]
    ValueIndexOutOfRange(u32),
    /// A geometry command word uses an unknown command id.
    #[error("Unknown geometry command id {0}")]
    UnknownCommand(u32),
    /// The geometry stream ended in the middle of a parameter pair.
    #[error("Geometry stream ended inside a parameter pair")]
    TruncatedParameters,
    /// A scaled coordinate does not fit the requested coordinate type.
    #[error("Coordinate outside valid range of the coordinate type")]
    CoordinateOutOfRange,
}

/// Non-fatal condition reported alongside a successful lookup.
#[derive(thiserror::Error, Copy, Clone, PartialEq, Eq, Debug)]
pub enum Warning {
    /// A key name resolves to more than one key table entry.
    #[error("duplicate keys with different tag ids are found")]
    DuplicateKeys,
}
