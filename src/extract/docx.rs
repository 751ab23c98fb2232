//! DOCX text extraction.
//!
//! A DOCX file is a ZIP archive; the body lives in `word/document.xml`. We walk
//! the tags with a small state machine and keep the text runs (`<w:t>`), tabs,
//! breaks, and one line per paragraph.
//!
//! Word writes text boxes twice inside `<mc:AlternateContent>`: a DrawingML
//! copy under `<mc:Choice>` and a VML copy under `<mc:Fallback>`. Only the
//! `Choice` branch is read.

use std::borrow::Cow;
use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::ExtractError;

const DOCUMENT_XML: &str = "word/document.xml";

pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
  let mut archive = ZipArchive::new(Cursor::new(bytes))
    .map_err(|e| ExtractError::Docx(format!("not a ZIP container: {e}")))?;

  let mut xml = String::new();
  archive
    .by_name(DOCUMENT_XML)
    .map_err(|_| ExtractError::Docx(format!("{DOCUMENT_XML} not found")))?
    .read_to_string(&mut xml)
    .map_err(|e| ExtractError::Docx(format!("{DOCUMENT_XML} unreadable: {e}")))?;

  Ok(text_from_document_xml(&xml))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
  Open,
  Close,
  Empty,
}

/// Split the inside of `<...>` into its element name and kind.
fn parse_tag(inner: &str) -> (&str, TagKind) {
  let (kind, body) = if let Some(rest) = inner.strip_prefix('/') {
    (TagKind::Close, rest)
  } else if let Some(rest) = inner.strip_suffix('/') {
    (TagKind::Empty, rest)
  } else {
    (TagKind::Open, inner)
  };
  let name = body.split(|c: char| c.is_whitespace() || c == '/').next().unwrap_or_default();
  (name, kind)
}

fn text_from_document_xml(xml: &str) -> String {
  let mut out = String::new();
  let mut in_text = false;
  // <w:tab> inside <w:tabs> is a tab-stop definition, not content.
  let mut in_tab_stops = false;
  // Depth of nested <mc:Fallback> elements; everything inside is skipped.
  let mut fallback_depth = 0usize;
  let mut rest = xml;

  while let Some(lt) = rest.find('<') {
    if in_text && fallback_depth == 0 {
      out.push_str(&decode_entities(&rest[..lt]));
    }
    let Some(gt) = rest[lt..].find('>') else { break };
    let (name, kind) = parse_tag(&rest[lt + 1..lt + gt]);

    match (name, kind) {
      ("mc:Fallback", TagKind::Open) => fallback_depth += 1,
      ("mc:Fallback", TagKind::Close) => fallback_depth = fallback_depth.saturating_sub(1),
      _ if fallback_depth > 0 => {}
      ("w:t", TagKind::Open) => in_text = true,
      ("w:t", TagKind::Close) => in_text = false,
      ("w:tabs", TagKind::Open) => in_tab_stops = true,
      ("w:tabs", TagKind::Close) => in_tab_stops = false,
      ("w:tab", TagKind::Open | TagKind::Empty) if !in_tab_stops => out.push('\t'),
      ("w:br" | "w:cr", TagKind::Open | TagKind::Empty) => out.push('\n'),
      ("w:p", TagKind::Close | TagKind::Empty) => out.push('\n'),
      _ => {}
    }

    rest = &rest[lt + gt + 1..];
  }

  out
}

fn decode_entities(s: &str) -> Cow<'_, str> {
  if !s.contains('&') {
    return Cow::Borrowed(s);
  }

  let mut out = String::with_capacity(s.len());
  let mut rest = s;
  while let Some(amp) = rest.find('&') {
    out.push_str(&rest[..amp]);
    let tail = &rest[amp..];
    match tail.find(';').and_then(|semi| resolve_entity(&tail[1..semi]).map(|ch| (semi, ch))) {
      Some((semi, ch)) => {
        out.push(ch);
        rest = &tail[semi + 1..];
      }
      None => {
        out.push('&');
        rest = &tail[1..];
      }
    }
  }
  out.push_str(rest);
  Cow::Owned(out)
}

fn resolve_entity(entity: &str) -> Option<char> {
  match entity {
    "amp" => Some('&'),
    "lt" => Some('<'),
    "gt" => Some('>'),
    "quot" => Some('"'),
    "apos" => Some('\''),
    _ => {
      let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
      } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
      };
      char::from_u32(code)
    }
  }
}
