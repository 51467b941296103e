//! Feature access within a decoded layer.

use std::collections::BTreeMap;

use crate::geometry::{self, Coordinate, GeometryCollection};
use crate::layer::Layer;
use crate::protobuf::{MessageReader, PackedU32};
use crate::{Error, Warning};

/// Feature message field number for the identifier.
const ID: u32 = 1;

/// Feature message field number for the packed tag pairs.
const TAGS: u32 = 2;

/// Feature message field number for the geometry type.
const TYPE: u32 = 3;

/// Feature message field number for the packed geometry stream.
const GEOMETRY: u32 = 4;

/// Value message field numbers, one per payload variant.
const STRING: u32 = 1;
const FLOAT: u32 = 2;
const DOUBLE: u32 = 3;
const INT: u32 = 4;
const UINT: u32 = 5;
const SINT: u32 = 6;
const BOOL: u32 = 7;

/// Types of geometry stored in a feature.
///
/// See <https://github.com/mapbox/vector-tile-spec/tree/master/2.1#434-geometry-types>.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug)]
pub enum GeomType {
    #[default]
    Unknown,
    Point,
    Linestring,
    Polygon,
}

impl From<u64> for GeomType {
    fn from(raw: u64) -> Self {
        match raw {
            1 => Self::Point,
            2 => Self::Linestring,
            3 => Self::Polygon,
            _ => Self::Unknown,
        }
    }
}

/// Feature identifier.
///
/// The v1/v2 wire format only carries unsigned integer identifiers, so
/// decoding produces [`Identifier::U64`] or [`Identifier::Null`]; the
/// remaining variants complete the identifier model for consumers.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Identifier<'t> {
    Null,
    U64(u64),
    I64(i64),
    Double(f64),
    String(&'t str),
}

/// Feature attribute value.
///
/// Exactly one payload is present in a valid value message; a message without
/// any payload decodes as [`Value::Null`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Value<'t> {
    Null,
    Bool(bool),
    U64(u64),
    I64(i64),
    Double(f64),
    String(&'t str),
}

impl<'t> Value<'t> {
    /// Parse a raw value view.
    ///
    /// The first value-bearing field wins; unknown fields are skipped. Float
    /// payloads are widened to double.
    pub(crate) fn parse(view: &'t [u8]) -> Result<Self, Error> {
        let mut reader = MessageReader::new(view);
        while let Some((tag, field)) = reader.next_field()? {
            let value = match tag {
                STRING => Self::String(field.string()?),
                FLOAT => Self::Double(field.float()? as f64),
                DOUBLE => Self::Double(field.double()?),
                INT => Self::I64(field.int64()?),
                UINT => Self::U64(field.uint64()?),
                SINT => Self::I64(field.sint64()?),
                BOOL => Self::Bool(field.bool()?),
                _ => continue,
            };

            return Ok(value);
        }

        Ok(Self::Null)
    }
}

/// Lightweight cursor over a single feature of a [`Layer`].
///
/// Binding scans the feature message once; its tag pairs, values, and
/// geometry stay undecoded until asked for.
///
/// See <https://github.com/mapbox/vector-tile-spec/tree/master/2.1#42-features>.
pub struct Feature<'l, 't> {
    layer: &'l Layer<'t>,
    id: Identifier<'t>,
    geom_type: GeomType,
    tags: &'t [u8],
    geometry: &'t [u8],
}

impl<'l, 't> Feature<'l, 't> {
    /// Bind a raw feature view to its layer.
    pub fn bind(view: &'t [u8], layer: &'l Layer<'t>) -> Result<Self, Error> {
        let mut feature = Self {
            layer,
            id: Identifier::Null,
            geom_type: GeomType::Unknown,
            tags: &[],
            geometry: &[],
        };

        let mut reader = MessageReader::new(view);
        while let Some((tag, field)) = reader.next_field()? {
            match tag {
                ID => feature.id = Identifier::U64(field.uint64()?),
                TAGS => feature.tags = field.bytes()?,
                TYPE => feature.geom_type = GeomType::from(field.uint64()?),
                GEOMETRY => feature.geometry = field.bytes()?,
                _ => (),
            }
        }

        Ok(feature)
    }

    /// The feature's geometry type.
    pub fn geom_type(&self) -> GeomType {
        self.geom_type
    }

    /// The feature's identifier, or [`Identifier::Null`] if it has none.
    pub fn id(&self) -> Identifier<'t> {
        self.id
    }

    /// Look up a single attribute by key.
    ///
    /// Returns [`Value::Null`] if the key is unknown to the layer or not
    /// referenced by this feature. If the layer's key table holds the key
    /// more than once, the first matching tag pair wins and a
    /// [`Warning::DuplicateKeys`] accompanies the value. Tag pairs
    /// referencing unknown keys are skipped like non-matching pairs.
    pub fn get_value(&self, key: &str) -> Result<(Value<'t>, Option<Warning>), Error> {
        let indices = match self.layer.key_indices(key) {
            Some(indices) => indices,
            None => return Ok((Value::Null, None)),
        };

        // Duplicate key tables are tolerated, but flagged to the caller.
        let warning = (indices.len() > 1).then_some(Warning::DuplicateKeys);

        let mut words = PackedU32::new(self.tags);
        while let Some(key_index) = words.next().transpose()? {
            let value_index = words.next().transpose()?.ok_or(Error::UnevenTags)?;

            if !indices.contains(&key_index) {
                continue;
            }

            let view = self
                .layer
                .value_view(value_index)
                .ok_or(Error::ValueIndexOutOfRange(value_index))?;

            return Ok((Value::parse(view)?, warning));
        }

        Ok((Value::Null, warning))
    }

    /// Decode all of the feature's attributes.
    ///
    /// Pairs are decoded in wire order; later pairs overwrite earlier pairs
    /// with the same key name.
    pub fn properties(&self) -> Result<BTreeMap<&'t str, Value<'t>>, Error> {
        let mut properties = BTreeMap::new();

        let mut words = PackedU32::new(self.tags);
        while let Some(key_index) = words.next().transpose()? {
            let value_index = words.next().transpose()?.ok_or(Error::UnevenTags)?;

            let key = self.layer.key(key_index).ok_or(Error::KeyIndexOutOfRange(key_index))?;
            let view = self
                .layer
                .value_view(value_index)
                .ok_or(Error::ValueIndexOutOfRange(value_index))?;

            properties.insert(key, Value::parse(view)?);
        }

        Ok(properties)
    }

    /// Decode the feature's geometry into point sequences scaled by `scale`.
    pub fn geometries<C: Coordinate>(&self, scale: f32) -> Result<GeometryCollection<C>, Error> {
        geometry::decode(PackedU32::new(self.geometry), self.geom_type, scale)
    }
}
