//! Row records consumed by the document serializer.
//!
//! Records mirror the three normalised tables (points, ways and relations).
//! List columns arrive still encoded as [`RawPair`] values; decoding happens
//! in [`crate::normalize_tags`] and [`crate::decode_members`] while the record
//! is being written.

use std::fmt;

use geo::Coord;

/// One entry of an encoded list column, as stored upstream.
///
/// Tag lists hold `(key, value)` pairs and flattened member lists hold
/// `(positionLabel, value)` pairs. Upstream storage is untyped, so an entry
/// may carry any number of fields and any field may be absent.
///
/// # Examples
/// ```
/// use osm_export_core::RawPair;
///
/// let pair = RawPair::from(("name", "Test"));
/// assert_eq!(pair.fields().len(), 2);
/// assert_eq!(pair.field(0), Some("name"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPair(Vec<Option<String>>);

impl RawPair {
    /// Build an entry from its raw fields.
    pub fn new<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        Self(fields.into_iter().collect())
    }

    /// All fields in storage order.
    pub fn fields(&self) -> &[Option<String>] {
        &self.0
    }

    /// The field at `index` when present.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|field| field.as_deref())
    }
}

impl<K, V> From<(K, V)> for RawPair
where
    K: Into<String>,
    V: Into<String>,
{
    fn from((first, second): (K, V)) -> Self {
        Self(vec![Some(first.into()), Some(second.into())])
    }
}

/// A validated tag with a non-empty key and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Tag key, e.g. `name`.
    pub key: String,
    /// Tag value.
    pub value: String,
}

/// A point row, emitted as a `<node>` element.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    /// Element identifier.
    pub id: i64,
    /// Action marker passed through verbatim.
    pub action: String,
    /// Geographic position.
    pub location: Coord<f64>,
    /// Encoded tag pairs.
    pub tags: Vec<RawPair>,
}

impl PointRecord {
    /// Construct a point from latitude/longitude in that order.
    ///
    /// # Examples
    /// ```
    /// use osm_export_core::{PointRecord, RawPair};
    ///
    /// let point = PointRecord::new(1, "modify", 51.5, -0.1, vec![RawPair::from(("name", "Test"))]);
    /// assert_eq!(point.latitude(), 51.5);
    /// assert_eq!(point.longitude(), -0.1);
    /// ```
    pub fn new(
        id: i64,
        action: impl Into<String>,
        latitude: f64,
        longitude: f64,
        tags: Vec<RawPair>,
    ) -> Self {
        Self {
            id,
            action: action.into(),
            location: Coord {
                x: longitude,
                y: latitude,
            },
            tags,
        }
    }

    /// Latitude in degrees.
    pub const fn latitude(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    pub const fn longitude(&self) -> f64 {
        self.location.x
    }
}

/// A way row, emitted as a `<way>` element.
///
/// `node_refs` defines the path of the way and is written in stored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WayRecord {
    /// Element identifier.
    pub id: i64,
    /// Action marker passed through verbatim.
    pub action: String,
    /// Ordered node references.
    pub node_refs: Vec<i64>,
    /// Encoded tag pairs.
    pub tags: Vec<RawPair>,
}

/// A decoded relation member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    /// Member element type (`node`, `way`, `relation`).
    pub member_type: String,
    /// Referenced element identifier.
    pub reference: i64,
    /// Role of the member within the relation; often empty.
    pub role: String,
}

/// A relation row, emitted as a `<relation>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRecord {
    /// Element identifier.
    pub id: i64,
    /// Action marker passed through verbatim.
    pub action: String,
    /// Flattened, triplet-encoded member list.
    pub members: Vec<RawPair>,
    /// Encoded tag pairs.
    pub tags: Vec<RawPair>,
}

/// The three row kinds, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    /// Points, written as `<node>`.
    Node,
    /// Ways, written as `<way>`.
    Way,
    /// Relations, written as `<relation>`.
    Relation,
}

impl RecordKind {
    /// Element name used in the document.
    pub const fn element_name(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}
