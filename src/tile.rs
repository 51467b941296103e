//! Tile-level layer indexing.

use std::collections::BTreeMap;

use tracing::debug;

use crate::Error;
use crate::layer::{self, Layer};
use crate::protobuf::MessageReader;

/// Tile message field number for layers.
const LAYERS: u32 = 3;

/// Index over the layers of one encoded vector tile.
///
/// Construction scans only the top-level message, recording each layer's name
/// and raw sub-message; layer interiors stay untouched until
/// [`Self::get_layer`]. The tile borrows the caller's byte buffer and holds
/// no feature data of its own.
pub struct Tile<'t> {
    layers: BTreeMap<&'t str, &'t [u8]>,
}

impl<'t> Tile<'t> {
    /// Index the layers of an encoded tile.
    pub fn new(buffer: &'t [u8]) -> Result<Self, Error> {
        let mut layers = BTreeMap::new();

        let mut reader = MessageReader::new(buffer);
        while let Some((tag, field)) = reader.next_field()? {
            if tag != LAYERS {
                continue;
            }

            let view = field.bytes()?;
            let name = layer_name(view)?;
            if layers.insert(name, view).is_some() {
                debug!("Duplicate layer {name:?}, keeping the last occurrence");
            }
        }

        Ok(Self { layers })
    }

    /// Layer names, sorted ascending.
    pub fn layer_names(&self) -> impl Iterator<Item = &'t str> {
        self.layers.keys().copied()
    }

    /// Fully parse the named layer.
    pub fn get_layer(&self, name: &str) -> Result<Layer<'t>, Error> {
        match self.layers.get(name) {
            Some(view) => Layer::parse(view),
            None => Err(Error::LayerNotFound(name.into())),
        }
    }

    /// The raw name → layer-view index.
    pub fn layers(&self) -> &BTreeMap<&'t str, &'t [u8]> {
        &self.layers
    }
}

/// Find a layer's name without decoding its interior.
fn layer_name(view: &[u8]) -> Result<&str, Error> {
    let mut reader = MessageReader::new(view);
    while let Some((tag, field)) = reader.next_field()? {
        if tag != layer::NAME {
            continue;
        }

        let name = field.string()?;
        if name.is_empty() {
            break;
        }

        return Ok(name);
    }

    Err(Error::MissingLayerName)
}
