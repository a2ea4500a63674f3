// Markup key export reader
//
// Accepts either layout:
//   <root><YourKey><Product_Key ...>...</Product_Key></YourKey></root>
//   <YourKey><Product_Key ...>...</Product_Key></YourKey>
//
// Each Product_Key carries Name (and optionally KeyRetrievalNote) as an
// attribute or child element, plus one or more Key children:
//   <Key ID="12" Type="Retail" ClaimedDate="1/2/2014">AAAAA-BBBBB-...</Key>
// One Key and many Keys flatten to the same record list.

use std::path::Path;

use keyset_engine::record::{RawRecord, RecordSource};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::decode::read_text;
use crate::error::IoError;

#[derive(Debug)]
struct KeyDraft {
    id: String,
    key_type: String,
    claimed_date: String,
    text: String,
}

#[derive(Debug)]
struct ProductDraft {
    name: String,
    note: String,
    keys: Vec<KeyDraft>,
}

impl ProductDraft {
    fn into_records(self, out: &mut Vec<RawRecord>) {
        let name = self.name.trim().replace(',', ";");
        let note = self.note.trim().replace(',', ";");
        for key in self.keys {
            out.push(RawRecord {
                source: RecordSource::Markup,
                name: name.clone(),
                key: key.text.trim().to_string(),
                key_type: key.key_type.trim().to_string(),
                claimed_date: key.claimed_date.trim().to_string(),
                id: key.id.trim().to_string(),
                note: note.clone(),
            });
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    KeyText,
    ProductName,
    Note,
}

/// Read and flatten one markup key file.
pub fn read_key_file(path: &Path) -> Result<Vec<RawRecord>, IoError> {
    let content = read_text(path)?;
    if content.trim().is_empty() {
        return Err(IoError::Empty { path: path.to_path_buf() });
    }
    let records = parse_key_xml(&content, path)?;
    tracing::debug!(path = %path.display(), records = records.len(), "parsed markup file");
    Ok(records)
}

/// Flatten markup into raw records. `path` is only used for error reporting.
pub fn parse_key_xml(content: &str, path: &Path) -> Result<Vec<RawRecord>, IoError> {
    let mut reader = Reader::from_str(content);
    let mut buf = Vec::new();

    let mut records = Vec::new();
    let mut product_entries = 0usize;
    let mut inside_your_key = false;
    let mut product: Option<ProductDraft> = None;
    let mut key: Option<KeyDraft> = None;
    let mut capture = Capture::None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| IoError::Xml {
            path: path.to_path_buf(),
            message: format!("at byte {}: {e}", reader.error_position()),
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.name().as_ref() {
                    b"YourKey" => inside_your_key = !is_empty,
                    b"Product_Key" if inside_your_key => {
                        product_entries += 1;
                        // An empty Product_Key has no Key children to emit.
                        if !is_empty {
                            product = Some(ProductDraft {
                                name: attr(e, b"Name").unwrap_or_default(),
                                note: attr(e, b"KeyRetrievalNote").unwrap_or_default(),
                                keys: Vec::new(),
                            });
                        }
                    }
                    b"Key" if product.is_some() => {
                        let draft = KeyDraft {
                            id: attr(e, b"ID").unwrap_or_default(),
                            key_type: attr(e, b"Type").unwrap_or_default(),
                            claimed_date: attr(e, b"ClaimedDate").unwrap_or_default(),
                            text: String::new(),
                        };
                        match product.as_mut() {
                            Some(p) if is_empty => p.keys.push(draft),
                            _ => {
                                key = Some(draft);
                                capture = Capture::KeyText;
                            }
                        }
                    }
                    b"Name" if product.is_some() && key.is_none() && !is_empty => {
                        capture = Capture::ProductName;
                    }
                    b"KeyRetrievalNote" if product.is_some() && key.is_none() && !is_empty => {
                        capture = Capture::Note;
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) => {
                push_captured(capture, &mut product, &mut key, &String::from_utf8_lossy(e));
            }
            Event::CData(ref e) => {
                push_captured(capture, &mut product, &mut key, &String::from_utf8_lossy(e));
            }
            Event::GeneralRef(ref e) => {
                let raw = format!("&{};", String::from_utf8_lossy(e));
                push_captured(capture, &mut product, &mut key, &unescape_or_raw(raw));
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"YourKey" => inside_your_key = false,
                b"Product_Key" => {
                    if let Some(draft) = product.take() {
                        draft.into_records(&mut records);
                    }
                }
                b"Key" => {
                    if let (Some(p), Some(k)) = (product.as_mut(), key.take()) {
                        p.keys.push(k);
                    }
                    capture = Capture::None;
                }
                b"Name" | b"KeyRetrievalNote" => capture = Capture::None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if product_entries == 0 {
        return Err(IoError::NoKeys { path: path.to_path_buf() });
    }

    Ok(records)
}

fn push_captured(
    capture: Capture,
    product: &mut Option<ProductDraft>,
    key: &mut Option<KeyDraft>,
    text: &str,
) {
    match capture {
        Capture::None => {}
        Capture::KeyText => {
            if let Some(k) = key.as_mut() {
                k.text.push_str(text);
            }
        }
        Capture::ProductName => {
            if let Some(p) = product.as_mut() {
                p.name.push_str(text);
            }
        }
        Capture::Note => {
            if let Some(p) = product.as_mut() {
                p.note.push_str(text);
            }
        }
    }
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| unescape_or_raw(String::from_utf8_lossy(&a.value).to_string()))
}

/// Resolve predefined and numeric entities; unknown ones stay as written.
fn unescape_or_raw(raw: String) -> String {
    match quick_xml::escape::unescape(&raw) {
        Ok(s) => s.into_owned(),
        Err(_) => raw,
    }
}
