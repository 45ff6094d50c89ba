use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use quick_xml::events::Event;
use tracing::{debug, info};

use crate::parser::FieldSource;

/// Element name of one gazette entry, a direct child of the document root.
const RECORD_TAG: &[u8] = b"Record";
const ROOT_DEPTH: usize = 1;
const RECORD_DEPTH: usize = ROOT_DEPTH + 1;
const FIELD_DEPTH: usize = RECORD_DEPTH + 1;
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One `<Record>`: child element name → trimmed text.
#[derive(Debug, Clone, Default)]
pub struct GazetteRecord {
    fields: HashMap<String, String>,
}

impl FieldSource for GazetteRecord {
    fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Raw XML bytes; decoding follows the document's own declaration.
pub fn read_xml_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Return the name and raw contents of the first `.xml` entry in a ZIP archive.
pub fn read_xml_from_zip(path: &Path) -> Result<(String, Vec<u8>)> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Not a readable zip archive: {}", path.display()))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.name().to_lowercase().ends_with(".xml") {
            continue;
        }
        let name = entry.name().to_string();
        let mut xml = Vec::new();
        entry
            .read_to_end(&mut xml)
            .with_context(|| format!("Failed to read {} from archive", name))?;
        info!("Using {} from {}", name, path.display());
        return Ok((name, xml));
    }

    bail!("zip archive contains no XML file")
}

/// Parse every `<Record>` under the document root.
///
/// A field's value is the text before its first child element; anything after
/// that child is ignored. A repeated field keeps its first value. Non-UTF-8
/// documents are decoded per their `<?xml encoding=...?>` declaration.
pub fn parse_records(xml: &[u8]) -> Result<Vec<GazetteRecord>> {
    let xml = xml.strip_prefix(UTF8_BOM).unwrap_or(xml);
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut records = Vec::new();
    let mut current: Option<GazetteRecord> = None;
    let mut field: Option<OpenField> = None;
    let mut depth = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                if depth == RECORD_DEPTH && e.name().as_ref() == RECORD_TAG {
                    current = Some(GazetteRecord::default());
                } else if depth == FIELD_DEPTH && current.is_some() {
                    let name = reader.decoder().decode(e.name().as_ref())?.into_owned();
                    field = Some(OpenField::new(name));
                } else if depth > FIELD_DEPTH {
                    if let Some(f) = field.as_mut() {
                        f.close();
                    }
                }
            }
            Event::Empty(e) => {
                if depth + 1 == RECORD_DEPTH && e.name().as_ref() == RECORD_TAG {
                    records.push(GazetteRecord::default());
                } else if depth == FIELD_DEPTH {
                    if let Some(f) = field.as_mut() {
                        f.close();
                    }
                }
            }
            Event::Text(e) if depth == FIELD_DEPTH => {
                if let Some(f) = field.as_mut().filter(|f| f.open) {
                    f.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) if depth == FIELD_DEPTH => {
                if let Some(f) = field.as_mut().filter(|f| f.open) {
                    f.text.push_str(&reader.decoder().decode(&e)?);
                }
            }
            Event::End(_) => {
                if depth == FIELD_DEPTH {
                    if let (Some(f), Some(record)) = (field.take(), current.as_mut()) {
                        record
                            .fields
                            .entry(f.name)
                            .or_insert_with(|| f.text.trim().to_string());
                    }
                } else if depth == RECORD_DEPTH {
                    records.extend(current.take());
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!("Parsed {} records", records.len());
    Ok(records)
}

/// A field element being read. `open` drops to false at its first child.
struct OpenField {
    name: String,
    text: String,
    open: bool,
}

impl OpenField {
    fn new(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            open: true,
        }
    }

    fn close(&mut self) {
        self.open = false;
    }
}
