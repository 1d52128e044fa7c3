//! Document-level attributes written on the `<osm>` root element.
//!
//! The header is sourced from at most one configuration row. Missing rows and
//! malformed fields fall back to defaults; neither is fatal.
use log::{info, warn};

/// Default OSM XML format version.
pub const DEFAULT_VERSION: &str = "0.6";
/// Default generator name.
pub const DEFAULT_GENERATOR: &str = "postgis_to_osm";

/// Resolved root attributes.
///
/// # Examples
/// ```
/// use osm_export_core::DocumentHeader;
///
/// let header = DocumentHeader::resolve(None);
/// assert_eq!(header, DocumentHeader::default());
/// assert_eq!(header.version, "0.6");
/// assert!(!header.locked);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    /// Format version, `0.6` by default.
    pub version: String,
    /// Whether consumers may download the data.
    pub download: bool,
    /// Whether consumers may upload the data.
    pub upload: bool,
    /// Whether the document is locked against edits.
    pub locked: bool,
    /// Name of the producing tool.
    pub generator: String,
}

impl Default for DocumentHeader {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_owned(),
            download: true,
            upload: true,
            locked: false,
            generator: DEFAULT_GENERATOR.to_owned(),
        }
    }
}

/// Raw configuration row, with every column optional and untyped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRow {
    /// Raw `version` column.
    pub version: Option<String>,
    /// Raw `download` column.
    pub download: Option<String>,
    /// Raw `upload` column.
    pub upload: Option<String>,
    /// Raw `locked` column.
    pub locked: Option<String>,
    /// Raw `generator` column.
    pub generator: Option<String>,
}

impl DocumentHeader {
    /// Resolve the header from an optional configuration row.
    pub fn resolve(row: Option<HeaderRow>) -> Self {
        let defaults = Self::default();
        let Some(row) = row else {
            info!("No header configuration row found; using document defaults");
            return defaults;
        };
        Self {
            version: text_or_default(row.version, defaults.version),
            download: flag_or_default("download", row.download.as_deref(), defaults.download),
            upload: flag_or_default("upload", row.upload.as_deref(), defaults.upload),
            locked: flag_or_default("locked", row.locked.as_deref(), defaults.locked),
            generator: text_or_default(row.generator, defaults.generator),
        }
    }
}

fn text_or_default(value: Option<String>, default: String) -> String {
    value
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(default)
}

fn flag_or_default(field: &str, value: Option<&str>, default: bool) -> bool {
    let Some(raw) = value else {
        return default;
    };
    parse_flag(raw).unwrap_or_else(|| {
        warn!("Ignored header field {field}={raw:?} (not a boolean); using {default}");
        default
    })
}

/// Interpret a boolean-like configuration value.
///
/// Accepts `true/false`, `t/f`, `yes/no`, `y/n`, `on/off` and `1/0`, ignoring
/// case and surrounding whitespace.
///
/// # Examples
/// ```
/// use osm_export_core::header::parse_flag;
///
/// assert_eq!(parse_flag("True"), Some(true));
/// assert_eq!(parse_flag("0"), Some(false));
/// assert_eq!(parse_flag("maybe"), None);
/// ```
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn absent_row_uses_defaults() {
        let header = DocumentHeader::resolve(None);
        assert_eq!(header.version, "0.6");
        assert!(header.download);
        assert!(header.upload);
        assert!(!header.locked);
        assert_eq!(header.generator, "postgis_to_osm");
    }

    #[rstest]
    fn empty_row_uses_defaults() {
        let header = DocumentHeader::resolve(Some(HeaderRow::default()));
        assert_eq!(header, DocumentHeader::default());
    }

    #[rstest]
    fn row_values_override_defaults() {
        let header = DocumentHeader::resolve(Some(HeaderRow {
            version: Some("0.7".into()),
            download: Some("False".into()),
            upload: Some("0".into()),
            locked: Some("yes".into()),
            generator: Some("exporter".into()),
        }));
        assert_eq!(
            header,
            DocumentHeader {
                version: "0.7".into(),
                download: false,
                upload: false,
                locked: true,
                generator: "exporter".into(),
            }
        );
    }

    #[rstest]
    fn malformed_fields_fall_back_individually() {
        let header = DocumentHeader::resolve(Some(HeaderRow {
            version: Some("  ".into()),
            locked: Some("sometimes".into()),
            upload: Some("off".into()),
            ..HeaderRow::default()
        }));
        assert_eq!(header.version, "0.6");
        assert!(!header.locked);
        assert!(!header.upload);
        assert!(header.download);
    }

    #[rstest]
    #[case("TRUE", Some(true))]
    #[case(" t ", Some(true))]
    #[case("On", Some(true))]
    #[case("1", Some(true))]
    #[case("f", Some(false))]
    #[case("No", Some(false))]
    #[case("", None)]
    #[case("2", None)]
    fn parses_boolean_like_values(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_flag(raw), expected);
    }
}
