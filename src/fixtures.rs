//! Prost message definitions used to encode tiles in tests.
//!
//! Production decoding never materializes these messages; they exist so tests
//! can assemble valid and deliberately malformed tiles. Every field is
//! optional to allow omitting required ones.
//!
//! See <https://github.com/mapbox/vector-tile-spec/tree/master/2.1>.

use prost::{Enumeration, Message};

/// Vector tile data.
#[derive(Clone, PartialEq, Message)]
pub struct Tile {
    #[prost(message, repeated, tag = "3")]
    pub layers: Vec<Layer>,
}

/// Tile layer.
#[derive(Clone, PartialEq, Message)]
pub struct Layer {
    /// Unique layer identifier.
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    /// The features in this layer.
    #[prost(message, repeated, tag = "2")]
    pub features: Vec<Feature>,
    /// Tag keys used by the layer's features.
    #[prost(string, repeated, tag = "3")]
    pub keys: Vec<String>,
    /// Tag values used by the layer's features.
    #[prost(message, repeated, tag = "4")]
    pub values: Vec<Value>,
    /// Inclusive width and height of the layer's coordinate system.
    #[prost(uint32, optional, tag = "5")]
    pub extent: Option<u32>,
    /// Vector tile specification version used by this layer.
    #[prost(uint32, optional, tag = "15")]
    pub version: Option<u32>,
}

impl Layer {
    /// Minimal valid layer with the given name.
    pub fn named(name: &str) -> Self {
        Self { name: Some(name.into()), extent: Some(4096), version: Some(2), ..Default::default() }
    }
}

/// Layer feature.
#[derive(Clone, PartialEq, Message)]
pub struct Feature {
    /// Unique feature identifier.
    #[prost(uint64, optional, tag = "1")]
    pub id: Option<u64>,
    /// Consecutive pairs of key and value indices into the layer tables.
    #[prost(uint32, repeated, tag = "2")]
    pub tags: Vec<u32>,
    /// The type of geometry stored in this feature.
    #[prost(enumeration = "GeomType", optional, tag = "3")]
    pub r#type: Option<i32>,
    /// Packed stream of commands and parameters.
    #[prost(uint32, repeated, tag = "4")]
    pub geometry: Vec<u32>,
}

/// Types of geometry for a feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum GeomType {
    Unknown = 0,
    Point = 1,
    Linestring = 2,
    Polygon = 3,
}

/// Feature tag's value.
#[derive(Clone, PartialEq, Message)]
pub struct Value {
    #[prost(string, optional, tag = "1")]
    pub string_value: Option<String>,
    #[prost(float, optional, tag = "2")]
    pub float_value: Option<f32>,
    #[prost(double, optional, tag = "3")]
    pub double_value: Option<f64>,
    #[prost(int64, optional, tag = "4")]
    pub int_value: Option<i64>,
    #[prost(uint64, optional, tag = "5")]
    pub uint_value: Option<u64>,
    #[prost(sint64, optional, tag = "6")]
    pub sint_value: Option<i64>,
    #[prost(bool, optional, tag = "7")]
    pub bool_value: Option<bool>,
}

impl Value {
    pub fn string(value: &str) -> Self {
        Self { string_value: Some(value.into()), ..Default::default() }
    }

    pub fn float(value: f32) -> Self {
        Self { float_value: Some(value), ..Default::default() }
    }

    pub fn double(value: f64) -> Self {
        Self { double_value: Some(value), ..Default::default() }
    }

    pub fn int(value: i64) -> Self {
        Self { int_value: Some(value), ..Default::default() }
    }

    pub fn uint(value: u64) -> Self {
        Self { uint_value: Some(value), ..Default::default() }
    }

    pub fn sint(value: i64) -> Self {
        Self { sint_value: Some(value), ..Default::default() }
    }

    pub fn bool(value: bool) -> Self {
        Self { bool_value: Some(value), ..Default::default() }
    }
}
