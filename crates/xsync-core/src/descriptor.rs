//! Project descriptor loading
//!
//! A descriptor is an XML document whose root element carries a
//! `Synchronize` section listing the file pairs to keep in step:
//!
//! ```xml
//! <CatapultProject>
//!   <Synchronize>
//!     <Mapping ProjectPath="Resources/Styles.css"
//!              ExternalPath="file:///mnt/shared/Styles.css" />
//!   </Synchronize>
//! </CatapultProject>
//! ```
//!
//! Everything outside `Synchronize/Mapping` is ignored.

use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use xsync_fs::{NormalizedPath, io};

use crate::{Error, Result};

/// One declared local/external file pair, as authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Spec relative to the descriptor's directory
    pub local_spec: String,
    /// Absolute path or `file:` URL
    pub external_spec: String,
}

impl MappingEntry {
    pub fn new(local_spec: impl Into<String>, external_spec: impl Into<String>) -> Self {
        Self {
            local_spec: local_spec.into(),
            external_spec: external_spec.into(),
        }
    }
}

/// A loaded descriptor: where it lives and what it maps.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Canonical path of the descriptor file
    pub path: NormalizedPath,
    /// Directory local specs are resolved against
    pub base_dir: NormalizedPath,
    /// Mappings in document order
    pub entries: Vec<MappingEntry>,
}

impl Descriptor {
    /// Load and parse a descriptor file.
    ///
    /// # Errors
    ///
    /// - [`Error::DescriptorNotFound`] if `path` is not an existing file
    /// - [`Error::DescriptorParse`] if the document is not well-formed or a
    ///   `Mapping` lacks one of its attributes
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let native = path.as_ref();
        if !native.is_file() {
            return Err(Error::DescriptorNotFound {
                path: native.to_path_buf(),
            });
        }

        let path = NormalizedPath::new(native).canonicalize()?;
        let bytes = io::read_bytes(&path)?;
        let parse_error = |message: String| Error::DescriptorParse {
            path: path.to_native(),
            message,
        };
        let content = decode_document(&bytes).map_err(parse_error)?;
        let entries = parse_mappings(&content).map_err(|e| parse_error(e.to_string()))?;

        let base_dir = path.parent().unwrap_or_else(|| NormalizedPath::new("."));
        tracing::debug!(
            descriptor = %path,
            base = %base_dir,
            mappings = entries.len(),
            "Loaded descriptor"
        );

        Ok(Self {
            path,
            base_dir,
            entries,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct ProjectDocument {
    #[serde(rename = "Synchronize", default)]
    synchronize: Option<SynchronizeSection>,
}

#[derive(Debug, Default, Deserialize)]
struct SynchronizeSection {
    #[serde(rename = "Mapping", default)]
    mappings: Vec<MappingElement>,
}

#[derive(Debug, Deserialize)]
struct MappingElement {
    #[serde(rename = "@ProjectPath")]
    project_path: String,
    #[serde(rename = "@ExternalPath")]
    external_path: String,
}

/// Decode descriptor bytes to text.
///
/// A byte order mark decides first, then the `encoding` of the XML
/// declaration, then UTF-8.
fn decode_document(bytes: &[u8]) -> std::result::Result<String, String> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes)?.unwrap_or(UTF_8), bytes),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or_else(|| format!("content is not valid {}", encoding.name()))
}

/// Encoding named by the XML declaration, if there is one.
fn declared_encoding(bytes: &[u8]) -> std::result::Result<Option<&'static Encoding>, String> {
    let mut reader = Reader::from_reader(bytes);
    let Ok(Event::Decl(decl)) = reader.read_event() else {
        return Ok(None);
    };
    let Some(label) = decl.encoding() else {
        return Ok(None);
    };
    let label = label.map_err(|e| e.to_string())?;

    match Encoding::for_label(&label) {
        // A UTF-16 label on ASCII-readable bytes means UTF-8
        Some(encoding) => Ok(Some(encoding.output_encoding())),
        None => Err(format!(
            "unsupported encoding '{}'",
            String::from_utf8_lossy(&label)
        )),
    }
}

/// Extract the ordered mapping list from descriptor XML.
///
/// A document without a `Synchronize` element has no mappings.
pub fn parse_mappings(xml: &str) -> std::result::Result<Vec<MappingEntry>, quick_xml::DeError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let document: ProjectDocument = quick_xml::de::from_str(xml)?;

    Ok(document
        .synchronize
        .unwrap_or_default()
        .mappings
        .into_iter()
        .map(|m| MappingEntry::new(m.project_path, m.external_path))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mappings_in_order() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<CatapultProject Version="1">
  <Targets />
  <Synchronize>
    <Mapping ProjectPath="a.css" ExternalPath="/share/a.css" />
    <Mapping ProjectPath="b.css" ExternalPath="/share/b.css" />
  </Synchronize>
</CatapultProject>"#;

        let entries = parse_mappings(xml).unwrap();
        assert_eq!(
            entries,
            vec![
                MappingEntry::new("a.css", "/share/a.css"),
                MappingEntry::new("b.css", "/share/b.css"),
            ]
        );
    }

    #[test]
    fn missing_synchronize_means_no_mappings() {
        let entries = parse_mappings("<CatapultProject><Targets /></CatapultProject>").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn empty_synchronize_means_no_mappings() {
        let entries = parse_mappings("<Project><Synchronize /></Project>").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let xml = "\u{feff}<Project><Synchronize><Mapping ProjectPath=\"a\" ExternalPath=\"/b\" /></Synchronize></Project>";
        assert_eq!(parse_mappings(xml).unwrap().len(), 1);
    }

    #[test]
    fn entities_in_attributes_are_unescaped() {
        let xml = r#"<Project><Synchronize><Mapping ProjectPath="R&amp;D/a.css" ExternalPath="/share/R&amp;D/a.css" /></Synchronize></Project>"#;
        let entries = parse_mappings(xml).unwrap();
        assert_eq!(entries[0].local_spec, "R&D/a.css");
    }

    #[test]
    fn mapping_without_external_path_is_rejected() {
        let xml = r#"<Project><Synchronize><Mapping ProjectPath="a.css" /></Synchronize></Project>"#;
        assert!(parse_mappings(xml).is_err());
    }

    #[test]
    fn utf16_with_byte_order_mark_is_decoded() {
        let xml = "<?xml version=\"1.0\" encoding=\"utf-16\"?><Project><Synchronize><Mapping ProjectPath=\"Caf\u{e9}.css\" ExternalPath=\"/share/a.css\" /></Synchronize></Project>";
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(xml.encode_utf16().flat_map(u16::to_le_bytes));

        let text = decode_document(&bytes).unwrap();

        assert_eq!(parse_mappings(&text).unwrap()[0].local_spec, "Caf\u{e9}.css");
    }

    #[test]
    fn declared_single_byte_encoding_is_honoured() {
        let mut bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><P><Synchronize><Mapping ProjectPath=\"Caf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b".css\" ExternalPath=\"/share/a.css\" /></Synchronize></P>");

        let text = decode_document(&bytes).unwrap();

        assert_eq!(parse_mappings(&text).unwrap()[0].local_spec, "Caf\u{e9}.css");
    }

    #[test]
    fn undeclared_invalid_utf8_is_a_decode_error() {
        let err = decode_document(b"<P attr=\"\xE9\" />").unwrap_err();
        assert!(err.contains("UTF-8"));
    }

    #[test]
    fn unknown_declared_encoding_is_a_decode_error() {
        let err = decode_document(b"<?xml version=\"1.0\" encoding=\"klingon\"?><P />").unwrap_err();
        assert!(err.contains("unsupported encoding 'klingon'"));
    }

    #[test]
    fn mismatched_tags_are_rejected() {
        assert!(parse_mappings("<Project><Synchronize></Project>").is_err());
    }
}
