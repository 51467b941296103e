//! Geometry command stream decoding.
//!
//! A feature's geometry is a packed sequence of `uint32` words: command words
//! carrying an opcode and a repeat count, followed by zig-zag encoded delta
//! parameters.
//!
//! See <https://github.com/mapbox/vector-tile-spec/tree/master/2.1#43-geometry-encoding>.

use crate::Error;
use crate::feature::GeomType;
use crate::protobuf::{self, PackedU32};

/// `MoveTo` command id.
const MOVE_TO: u32 = 1;

/// `LineTo` command id.
const LINE_TO: u32 = 2;

/// `ClosePath` command id.
const CLOSE_PATH: u32 = 7;

/// Cap for speculative capacity reservations, in points.
///
/// Command counts are untrusted 29-bit integers; reserving more than this
/// (1 MiB at 16 bytes per point) waits until the points actually arrive.
const MAX_RESERVE: usize = (1 << 20) / 16;

/// 2D position within a tile's coordinate grid.
#[derive(PartialEq, Eq, Copy, Clone, Default, Debug)]
pub struct Point<C = i32> {
    pub x: C,
    pub y: C,
}

impl<C> Point<C> {
    pub fn new(x: C, y: C) -> Self {
        Self { x, y }
    }
}

impl<C> From<(C, C)> for Point<C> {
    fn from((x, y): (C, C)) -> Self {
        Self { x, y }
    }
}

/// Decoded feature geometry.
///
/// One point sequence per path: a single sequence holding every point of a
/// point feature, one sequence per line of a linestring, and one sequence per
/// ring of a polygon, in wire order. Rings are not regrouped into
/// multipolygons.
pub type GeometryCollection<C> = Vec<Vec<Point<C>>>;

/// Signed integer types usable as the coordinate width of decoded geometry.
pub trait Coordinate: Copy {
    /// Round a scaled position to the nearest coordinate.
    ///
    /// Returns `None` if the rounded value is out of range.
    fn from_scaled(value: f64) -> Option<Self>;
}

macro_rules! impl_coordinate {
    ($($ty:ty),*) => {
        $(
            impl Coordinate for $ty {
                fn from_scaled(value: f64) -> Option<Self> {
                    let value = value.round();
                    (<$ty>::MIN as f64 <= value && value <= <$ty>::MAX as f64)
                        .then_some(value as $ty)
                }
            }
        )*
    };
}

impl_coordinate!(i16, i32, i64);

/// Decode a feature's packed command stream into point sequences.
pub(crate) fn decode<C: Coordinate>(
    mut words: PackedU32<'_>,
    geom_type: GeomType,
    scale: f32,
) -> Result<GeometryCollection<C>, Error> {
    let mut decoder =
        Decoder { paths: vec![Vec::new()], geom_type, scale: scale as f64, x: 0, y: 0 };

    while let Some(word) = words.next().transpose()? {
        let count = (word >> 3) as usize;

        // Zero-count commands are no-ops.
        if count == 0 {
            continue;
        }

        match word & 0x7 {
            MOVE_TO => {
                for _ in 0..count {
                    let (dx, dy) = match next_delta(&mut words)? {
                        Some(delta) => delta,
                        // The stream may end at any parameter pair boundary.
                        None => return Ok(decoder.finish()),
                    };
                    decoder.move_to(dx, dy, count)?;
                }
            },
            LINE_TO => {
                for _ in 0..count {
                    let (dx, dy) = match next_delta(&mut words)? {
                        Some(delta) => delta,
                        None => return Ok(decoder.finish()),
                    };
                    decoder.line_to(dx, dy, count)?;
                }
            },
            // `ClosePath` carries no parameters and closes the ring once,
            // whatever its repeat count claims.
            CLOSE_PATH => decoder.close_path(),
            command => return Err(Error::UnknownCommand(command)),
        }
    }

    Ok(decoder.finish())
}

/// Read one zig-zag encoded parameter pair.
///
/// Returns `None` if the stream ended at a pair boundary; ending inside a
/// pair is an error.
fn next_delta(words: &mut PackedU32<'_>) -> Result<Option<(i64, i64)>, Error> {
    let dx = match words.next().transpose()? {
        Some(word) => word,
        None => return Ok(None),
    };
    let dy = words.next().transpose()?.ok_or(Error::TruncatedParameters)?;

    Ok(Some((protobuf::zigzag32(dx), protobuf::zigzag32(dy))))
}

/// Command interpreter state.
struct Decoder<C> {
    paths: GeometryCollection<C>,
    geom_type: GeomType,
    scale: f64,

    // Cursor position, accumulated wide to survive long delta streams.
    x: i64,
    y: i64,
}

impl<C: Coordinate> Decoder<C> {
    fn move_to(&mut self, dx: i64, dy: i64, count: usize) -> Result<(), Error> {
        // Point features collect every `MoveTo` into a single sequence; the
        // other types start a new path whenever the current one has points.
        match self.geom_type {
            GeomType::Point => {
                if self.paths[0].is_empty() {
                    self.paths[0].reserve(count.min(MAX_RESERVE));
                }
            },
            _ => {
                if !self.current().is_empty() {
                    self.paths.push(Vec::new());
                }
            },
        }

        self.push_point(dx, dy)
    }

    fn line_to(&mut self, dx: i64, dy: i64, count: usize) -> Result<(), Error> {
        // The first `LineTo` of a path knows the path's final length: its
        // count plus the preceding `MoveTo` point, plus the vertex a
        // `ClosePath` will duplicate for polygons.
        if self.current().len() == 1 {
            let extra = if self.geom_type == GeomType::Polygon { 2 } else { 1 };
            self.current_mut().reserve((count + extra).min(MAX_RESERVE));
        }

        self.push_point(dx, dy)
    }

    /// Close the current ring by repeating its first point.
    fn close_path(&mut self) {
        let path = self.current_mut();
        if let Some(&first) = path.first() {
            path.push(first);
        }
    }

    fn push_point(&mut self, dx: i64, dy: i64) -> Result<(), Error> {
        self.x += dx;
        self.y += dy;

        let x = C::from_scaled(self.x as f64 * self.scale).ok_or(Error::CoordinateOutOfRange)?;
        let y = C::from_scaled(self.y as f64 * self.scale).ok_or(Error::CoordinateOutOfRange)?;
        self.current_mut().push(Point::new(x, y));

        Ok(())
    }

    /// Release the decoded paths, dropping any clamped over-reservation.
    fn finish(mut self) -> GeometryCollection<C> {
        for path in &mut self.paths {
            path.shrink_to_fit();
        }
        self.paths.shrink_to_fit();

        self.paths
    }

    fn current(&self) -> &Vec<Point<C>> {
        // `paths` always contains at least one sequence.
        self.paths.last().unwrap()
    }

    fn current_mut(&mut self) -> &mut Vec<Point<C>> {
        self.paths.last_mut().unwrap()
    }
}
