//! Row streams feeding the serializer.
//!
//! The `RowSource` trait hands records to a visitor one at a time so
//! implementations can stream straight from a database cursor without
//! materialising a whole table.

use std::io;

use thiserror::Error;

use crate::{MemberListError, PointRecord, RecordKind, RelationRecord, WayRecord};

/// Boxed error reported by a row source implementation.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Callback receiving one record at a time.
pub type Visitor<'a, T> = dyn FnMut(T) -> Result<(), ExportError> + 'a;

/// Errors that abort a document export.
///
/// Every variant is fatal: the partially written output must be discarded.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The row source could not produce a stream.
    #[error("failed to read {kind} rows")]
    Upstream {
        /// Stream being read when the failure occurred.
        kind: RecordKind,
        /// Error reported by the row source.
        #[source]
        source: SourceError,
    },
    /// A relation's member list could not be decoded.
    #[error("relation {relation_id} has a malformed member list")]
    MalformedMemberList {
        /// Identifier of the offending relation.
        relation_id: i64,
        /// Decoding failure.
        #[source]
        source: MemberListError,
    },
    /// A record was written after a later section had started.
    #[error("cannot write a {kind} after {current} elements")]
    OutOfOrder {
        /// Kind of the rejected record.
        kind: RecordKind,
        /// Section already in progress.
        current: RecordKind,
    },
    /// The output sink rejected a write.
    #[error("failed to write to the output sink")]
    Sink(#[from] io::Error),
}

impl ExportError {
    /// Wrap a row source failure for the given stream.
    pub fn upstream<E>(kind: RecordKind, source: E) -> Self
    where
        E: Into<SourceError>,
    {
        Self::Upstream {
            kind,
            source: source.into(),
        }
    }
}

/// Read access to the normalised point, way and relation rows.
///
/// Each method drives `visitor` once per row, in the order the underlying
/// store yields them, and stops at the first error from either side.
///
/// # Examples
///
/// ```rust
/// use osm_export_core::{
///     ExportError, PointRecord, RelationRecord, RowSource, Visitor, WayRecord,
/// };
///
/// struct PointsOnly(Vec<PointRecord>);
///
/// impl RowSource for PointsOnly {
///     fn visit_points(&self, visitor: &mut Visitor<'_, PointRecord>) -> Result<(), ExportError> {
///         self.0.iter().cloned().try_for_each(visitor)
///     }
///
///     fn visit_ways(&self, _visitor: &mut Visitor<'_, WayRecord>) -> Result<(), ExportError> {
///         Ok(())
///     }
///
///     fn visit_relations(
///         &self,
///         _visitor: &mut Visitor<'_, RelationRecord>,
///     ) -> Result<(), ExportError> {
///         Ok(())
///     }
/// }
///
/// let source = PointsOnly(vec![PointRecord::new(1, "modify", 0.0, 0.0, Vec::new())]);
/// let mut seen = Vec::new();
/// source
///     .visit_points(&mut |point| {
///         seen.push(point.id);
///         Ok(())
///     })
///     .expect("visit points");
/// assert_eq!(seen, vec![1]);
/// ```
pub trait RowSource {
    /// Visit every point row.
    fn visit_points(&self, visitor: &mut Visitor<'_, PointRecord>) -> Result<(), ExportError>;

    /// Visit every way row.
    fn visit_ways(&self, visitor: &mut Visitor<'_, WayRecord>) -> Result<(), ExportError>;

    /// Visit every relation row.
    fn visit_relations(
        &self,
        visitor: &mut Visitor<'_, RelationRecord>,
    ) -> Result<(), ExportError>;
}
