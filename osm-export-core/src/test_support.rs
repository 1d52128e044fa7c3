//! In-memory `RowSource` implementation used by unit and behaviour tests.

use crate::{
    ExportError, PointRecord, RecordKind, RelationRecord, RowSource, Visitor, WayRecord,
};

/// In-memory row source yielding records in insertion order.
///
/// A failure can be injected for one stream to exercise upstream error
/// handling.
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    points: Vec<PointRecord>,
    ways: Vec<WayRecord>,
    relations: Vec<RelationRecord>,
    failure: Option<(RecordKind, String)>,
}

impl MemoryRowSource {
    /// Append a point.
    #[must_use]
    pub fn with_point(mut self, point: PointRecord) -> Self {
        self.points.push(point);
        self
    }

    /// Append a way.
    #[must_use]
    pub fn with_way(mut self, way: WayRecord) -> Self {
        self.ways.push(way);
        self
    }

    /// Append a relation.
    #[must_use]
    pub fn with_relation(mut self, relation: RelationRecord) -> Self {
        self.relations.push(relation);
        self
    }

    /// Make the given stream fail with `message` before yielding any rows.
    #[must_use]
    pub fn with_failure(mut self, kind: RecordKind, message: impl Into<String>) -> Self {
        self.failure = Some((kind, message.into()));
        self
    }

    fn check(&self, kind: RecordKind) -> Result<(), ExportError> {
        match &self.failure {
            Some((failing, message)) if *failing == kind => {
                Err(ExportError::upstream(kind, message.clone()))
            }
            _ => Ok(()),
        }
    }
}

impl RowSource for MemoryRowSource {
    fn visit_points(&self, visitor: &mut Visitor<'_, PointRecord>) -> Result<(), ExportError> {
        self.check(RecordKind::Node)?;
        self.points.iter().cloned().try_for_each(visitor)
    }

    fn visit_ways(&self, visitor: &mut Visitor<'_, WayRecord>) -> Result<(), ExportError> {
        self.check(RecordKind::Way)?;
        self.ways.iter().cloned().try_for_each(visitor)
    }

    fn visit_relations(
        &self,
        visitor: &mut Visitor<'_, RelationRecord>,
    ) -> Result<(), ExportError> {
        self.check(RecordKind::Relation)?;
        self.relations.iter().cloned().try_for_each(visitor)
    }
}
