//! Streaming OSM XML writer.
//!
//! Output is produced in a single forward pass. Anything that decides the
//! shape of an element (a point's tag emptiness, a relation's decoded member
//! list) is settled before its open tag is written, so a failure never leaves
//! half an element behind a valid prefix.

use std::io::Write;

use log::info;

use crate::{
    DocumentHeader, ExportError, MemberRecord, PointRecord, RecordKind, RelationRecord,
    RowSource, TagEntry, WayRecord, decode_members, escape_markup, normalize_tags,
};

const DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>";
const ELEMENT_INDENT: &str = "  ";
const CHILD_INDENT: &str = "    ";

/// Counts of what a serializer has written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of `<node>` elements.
    pub nodes: u64,
    /// Number of `<way>` elements.
    pub ways: u64,
    /// Number of `<relation>` elements.
    pub relations: u64,
    /// Number of `<tag>` children across all elements.
    pub tags: u64,
    /// Number of `<member>` children.
    pub members: u64,
}

/// Writes one OSM document to `W`.
///
/// Records must arrive in document order: all points, then all ways, then
/// all relations. Writes that go backwards fail with
/// [`ExportError::OutOfOrder`].
///
/// # Examples
/// ```
/// use osm_export_core::{DocumentHeader, DocumentSerializer, PointRecord};
///
/// # fn main() -> Result<(), osm_export_core::ExportError> {
/// let mut serializer = DocumentSerializer::begin(Vec::new(), &DocumentHeader::default())?;
/// serializer.write_point(&PointRecord::new(1, "modify", 51.5, -0.1, Vec::new()))?;
/// let (bytes, summary) = serializer.finish()?;
/// let document = String::from_utf8(bytes).expect("utf-8 output");
/// assert!(document.contains("<node id='1' action='modify' lat='51.5' lon='-0.1' />"));
/// assert_eq!(summary.nodes, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DocumentSerializer<W: Write> {
    sink: W,
    section: RecordKind,
    summary: ExportSummary,
}

impl<W: Write> DocumentSerializer<W> {
    /// Write the declaration and root open tag.
    pub fn begin(mut sink: W, header: &DocumentHeader) -> Result<Self, ExportError> {
        writeln!(sink, "{DECLARATION}")?;
        writeln!(
            sink,
            "<osm version='{}' download='{}' upload='{}' locked='{}' generator='{}'>",
            escape_markup(&header.version),
            header.download,
            header.upload,
            header.locked,
            escape_markup(&header.generator),
        )?;
        Ok(Self {
            sink,
            section: RecordKind::Node,
            summary: ExportSummary::default(),
        })
    }

    /// Write a `<node>`; self-closing when it has no valid tags.
    pub fn write_point(&mut self, point: &PointRecord) -> Result<(), ExportError> {
        self.enter(RecordKind::Node)?;
        let tags = normalize_tags(&point.tags);
        let action = escape_markup(&point.action);
        let (id, lat, lon) = (point.id, point.latitude(), point.longitude());
        if tags.is_empty() {
            writeln!(
                self.sink,
                "{ELEMENT_INDENT}<node id='{id}' action='{action}' lat='{lat}' lon='{lon}' />"
            )?;
        } else {
            writeln!(
                self.sink,
                "{ELEMENT_INDENT}<node id='{id}' action='{action}' lat='{lat}' lon='{lon}'>"
            )?;
            self.write_tags(&tags)?;
            writeln!(self.sink, "{ELEMENT_INDENT}</node>")?;
        }
        self.summary.nodes += 1;
        Ok(())
    }

    /// Write a `<way>` with its node references, always in open/close form.
    pub fn write_way(&mut self, way: &WayRecord) -> Result<(), ExportError> {
        self.enter(RecordKind::Way)?;
        let tags = normalize_tags(&way.tags);
        self.open_element(RecordKind::Way, way.id, &way.action)?;
        for node_ref in &way.node_refs {
            writeln!(self.sink, "{CHILD_INDENT}<nd ref='{node_ref}' />")?;
        }
        self.write_tags(&tags)?;
        self.close_element(RecordKind::Way)?;
        self.summary.ways += 1;
        Ok(())
    }

    /// Write a `<relation>` with its members.
    ///
    /// The member list is decoded before anything is written; a malformed
    /// list aborts the export without emitting the relation.
    pub fn write_relation(&mut self, relation: &RelationRecord) -> Result<(), ExportError> {
        self.enter(RecordKind::Relation)?;
        let members =
            decode_members(&relation.members).map_err(|source| ExportError::MalformedMemberList {
                relation_id: relation.id,
                source,
            })?;
        let tags = normalize_tags(&relation.tags);
        self.open_element(RecordKind::Relation, relation.id, &relation.action)?;
        self.write_members(&members)?;
        self.write_tags(&tags)?;
        self.close_element(RecordKind::Relation)?;
        self.summary.relations += 1;
        Ok(())
    }

    /// Close the root element, flush, and hand back the sink.
    pub fn finish(mut self) -> Result<(W, ExportSummary), ExportError> {
        writeln!(self.sink, "</osm>")?;
        self.sink.flush()?;
        Ok((self.sink, self.summary))
    }

    fn enter(&mut self, kind: RecordKind) -> Result<(), ExportError> {
        if kind < self.section {
            return Err(ExportError::OutOfOrder {
                kind,
                current: self.section,
            });
        }
        self.section = kind;
        Ok(())
    }

    fn open_element(&mut self, kind: RecordKind, id: i64, action: &str) -> Result<(), ExportError> {
        writeln!(
            self.sink,
            "{ELEMENT_INDENT}<{} id='{id}' action='{}'>",
            kind.element_name(),
            escape_markup(action),
        )?;
        Ok(())
    }

    fn close_element(&mut self, kind: RecordKind) -> Result<(), ExportError> {
        writeln!(self.sink, "{ELEMENT_INDENT}</{}>", kind.element_name())?;
        Ok(())
    }

    fn write_tags(&mut self, tags: &[TagEntry]) -> Result<(), ExportError> {
        for tag in tags {
            writeln!(
                self.sink,
                "{CHILD_INDENT}<tag k='{}' v='{}' />",
                escape_markup(&tag.key),
                escape_markup(&tag.value),
            )?;
            self.summary.tags += 1;
        }
        Ok(())
    }

    fn write_members(&mut self, members: &[MemberRecord]) -> Result<(), ExportError> {
        for member in members {
            writeln!(
                self.sink,
                "{CHILD_INDENT}<member type='{}' ref='{}' role='{}' />",
                escape_markup(&member.member_type),
                member.reference,
                escape_markup(&member.role),
            )?;
            self.summary.members += 1;
        }
        Ok(())
    }
}

/// Serialise a complete document from `source` into `sink`.
///
/// Points, ways and relations are streamed in that order. Any error aborts
/// the export; the sink then holds an incomplete document that callers must
/// discard.
///
/// # Examples
/// ```
/// use osm_export_core::{DocumentHeader, PointRecord, serialize_document};
/// use osm_export_core::test_support::MemoryRowSource;
///
/// # fn main() -> Result<(), osm_export_core::ExportError> {
/// let source = MemoryRowSource::default()
///     .with_point(PointRecord::new(1, "modify", 51.5, -0.1, Vec::new()));
/// let mut output = Vec::new();
/// let summary = serialize_document(&DocumentHeader::default(), &source, &mut output)?;
/// assert_eq!(summary.nodes, 1);
/// # Ok(())
/// # }
/// ```
pub fn serialize_document<S, W>(
    header: &DocumentHeader,
    source: &S,
    sink: W,
) -> Result<ExportSummary, ExportError>
where
    S: RowSource + ?Sized,
    W: Write,
{
    let mut serializer = DocumentSerializer::begin(sink, header)?;
    source.visit_points(&mut |point| serializer.write_point(&point))?;
    source.visit_ways(&mut |way| serializer.write_way(&way))?;
    source.visit_relations(&mut |relation| serializer.write_relation(&relation))?;
    let (_, summary) = serializer.finish()?;
    info!(
        "Serialised {} nodes, {} ways and {} relations",
        summary.nodes, summary.ways, summary.relations
    );
    Ok(summary)
}
