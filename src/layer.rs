//! Layer attribute tables and feature views.

use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::debug;

use crate::Error;
use crate::feature::Feature;
use crate::protobuf::MessageReader;

/// Layer message field number for the name.
pub(crate) const NAME: u32 = 1;

/// Layer message field number for features.
const FEATURES: u32 = 2;

/// Layer message field number for attribute keys.
const KEYS: u32 = 3;

/// Layer message field number for attribute values.
const VALUES: u32 = 4;

/// Layer message field number for the extent.
const EXTENT: u32 = 5;

/// Layer message field number for the specification version.
const VERSION: u32 = 15;

/// A single decoded tile layer.
///
/// Construction materializes the layer's shared key and value tables and its
/// list of raw feature views; the features and values themselves are decoded
/// on demand.
///
/// See <https://github.com/mapbox/vector-tile-spec/tree/master/2.1#41-layers>.
pub struct Layer<'t> {
    name: &'t str,
    version: u32,
    extent: u32,
    keys: Vec<&'t str>,
    key_index: HashMap<&'t str, SmallVec<[u32; 1]>>,
    values: Vec<&'t [u8]>,
    features: Vec<&'t [u8]>,
}

impl<'t> Layer<'t> {
    /// Parse a raw layer view.
    pub(crate) fn parse(view: &'t [u8]) -> Result<Self, Error> {
        let mut name = None;
        let mut version = None;
        let mut extent = None;
        let mut keys = Vec::new();
        let mut key_index: HashMap<_, SmallVec<[u32; 1]>> = HashMap::new();
        let mut values = Vec::new();
        let mut features = Vec::new();

        let mut reader = MessageReader::new(view);
        while let Some((tag, field)) = reader.next_field()? {
            match tag {
                NAME => name = Some(field.string()?),
                FEATURES => features.push(field.bytes()?),
                KEYS => {
                    // Key tables with duplicate entries are invalid, but real
                    // producers have emitted them; record every occurrence.
                    let key = field.string()?;
                    let indices = key_index.entry(key).or_default();
                    if !indices.is_empty() {
                        debug!("Duplicate key {key:?} in layer attribute table");
                    }
                    indices.push(keys.len() as u32);
                    keys.push(key);
                },
                VALUES => values.push(field.bytes()?),
                EXTENT => extent = Some(field.uint32()?),
                VERSION => version = Some(field.uint32()?),
                _ => (),
            }
        }

        let name = name.ok_or(Error::MissingRequiredField("name"))?;
        let extent = extent.ok_or(Error::MissingRequiredField("extent"))?;
        let version = version.ok_or(Error::MissingRequiredField("version"))?;

        Ok(Self { name, version, extent, keys, key_index, values, features })
    }

    /// The layer's unique name.
    pub fn name(&self) -> &'t str {
        self.name
    }

    /// Vector tile specification version used by this layer.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Inclusive width and height of the layer's coordinate grid.
    pub fn extent(&self) -> u32 {
        self.extent
    }

    /// Attribute keys shared by the layer's features, in wire order.
    pub fn keys(&self) -> &[&'t str] {
        &self.keys
    }

    /// Number of attribute values shared by the layer's features.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Number of features in the layer.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// A feature's raw view.
    pub fn feature_view(&self, index: usize) -> Result<&'t [u8], Error> {
        match self.features.get(index) {
            Some(&view) => Ok(view),
            None => Err(Error::IndexOutOfRange { index, len: self.features.len() }),
        }
    }

    /// Bind the feature at `index`.
    pub fn feature(&self, index: usize) -> Result<Feature<'_, 't>, Error> {
        Feature::bind(self.feature_view(index)?, self)
    }

    /// Iterator lazily binding each of the layer's features, in wire order.
    pub fn features(&self) -> impl Iterator<Item = Result<Feature<'_, 't>, Error>> {
        self.features.iter().map(|&view| Feature::bind(view, self))
    }

    /// Ordinal positions recorded for an attribute key.
    pub(crate) fn key_indices(&self, key: &str) -> Option<&[u32]> {
        self.key_index.get(key).map(|indices| indices.as_slice())
    }

    /// Attribute key at a tag pair's key index.
    pub(crate) fn key(&self, index: u32) -> Option<&'t str> {
        self.keys.get(index as usize).copied()
    }

    /// Raw value view at a tag pair's value index.
    pub(crate) fn value_view(&self, index: u32) -> Option<&'t [u8]> {
        self.values.get(index as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::*;
    use crate::{Identifier, Tile, fixtures};

    #[test]
    fn missing_required_fields() {
        let mut layer = fixtures::Layer::named("water");
        layer.version = None;
        let encoded = layer.encode_to_vec();
        assert!(matches!(Layer::parse(&encoded), Err(Error::MissingRequiredField("version"))));

        let mut layer = fixtures::Layer::named("water");
        layer.extent = None;
        let encoded = layer.encode_to_vec();
        assert!(matches!(Layer::parse(&encoded), Err(Error::MissingRequiredField("extent"))));
    }

    #[test]
    fn lazy_required_field_check() {
        // The tile index accepts the layer; only the full parse rejects it.
        let mut layer = fixtures::Layer::named("water");
        layer.version = None;
        let encoded = fixtures::Tile { layers: vec![layer] }.encode_to_vec();

        let tile = Tile::new(&encoded).unwrap();
        assert!(matches!(tile.get_layer("water"), Err(Error::MissingRequiredField("version"))));
    }

    #[test]
    fn duplicate_keys_are_indexed() {
        let mut layer = fixtures::Layer::named("water");
        layer.keys = vec!["color".into(), "size".into(), "color".into()];
        let encoded = layer.encode_to_vec();

        let layer = Layer::parse(&encoded).unwrap();
        assert_eq!(layer.keys(), ["color", "size", "color"]);
        assert_eq!(layer.key_indices("color"), Some(&[0, 2][..]));
        assert_eq!(layer.key_indices("size"), Some(&[1][..]));
        assert_eq!(layer.key_indices("width"), None);
    }

    #[test]
    fn feature_views_keep_wire_order() {
        let mut layer = fixtures::Layer::named("water");
        for id in 0..3 {
            layer.features.push(fixtures::Feature { id: Some(id), ..Default::default() });
        }
        let encoded = layer.encode_to_vec();

        let layer = Layer::parse(&encoded).unwrap();
        assert_eq!(layer.feature_count(), 3);
        for (i, feature) in layer.features().enumerate() {
            assert_eq!(feature.unwrap().id(), Identifier::U64(i as u64));
        }
    }

    #[test]
    fn feature_index_bounds() {
        let encoded = fixtures::Layer::named("water").encode_to_vec();
        let layer = Layer::parse(&encoded).unwrap();

        assert_eq!(layer.feature_count(), 0);
        assert!(layer.features().next().is_none());
        assert!(matches!(layer.feature_view(0), Err(Error::IndexOutOfRange { index: 0, len: 0 })));
    }

    #[test]
    fn unknown_fields_are_skipped() {
        use prost::encoding::{WireType, encode_key, encode_varint};

        let mut layer = fixtures::Layer::named("water");
        layer.keys.push("depth".into());
        let mut encoded = layer.encode_to_vec();

        encode_key(11, WireType::Varint, &mut encoded);
        encode_varint(1337, &mut encoded);
        encode_key(13, WireType::LengthDelimited, &mut encoded);
        encode_varint(3, &mut encoded);
        encoded.extend_from_slice(&[1, 2, 3]);

        let layer = Layer::parse(&encoded).unwrap();
        assert_eq!(layer.name(), "water");
        assert_eq!(layer.keys(), ["depth"]);
        assert_eq!(layer.value_count(), 0);
    }
}
