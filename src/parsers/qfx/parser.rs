use super::dto::{OfxXml, QfxTransaction};
use crate::parsers::traits::{MalformedContent, Parser};
use xml::common::Position;

pub struct QfxParser;

impl Parser for QfxParser {
    type Output = QfxTransaction;

    fn is_supported(filename: Option<&str>, content: &str) -> bool {
        if let Some(name) = filename {
            let ext = name.to_lowercase();
            if ext.ends_with(".qfx") || ext.ends_with(".ofx") {
                return true;
            }
        }

        let trimmed = content.trim();
        trimmed.contains("<OFX>")
            || trimmed.contains("OFXHEADER:")
            || trimmed.contains("DATA:OFXSGML")
    }

    fn parse(content: &str) -> Result<Vec<Self::Output>, MalformedContent> {
        let xml_content = if content.trim_start().starts_with("<?xml") {
            content.to_string()
        } else {
            convert_sgml_to_xml(content)?
        };

        let ofx_start = xml_content
            .find("<OFX>")
            .ok_or_else(|| MalformedContent::new("Missing <OFX> tag"))?;
        let ofx_end = xml_content
            .rfind("</OFX>")
            .filter(|&end| end > ofx_start)
            .ok_or_else(|| MalformedContent::new("Missing </OFX> tag"))?;
        let ofx_content = &xml_content[ofx_start..ofx_end + "</OFX>".len()];
        let lines_before = xml_content[..ofx_start].matches('\n').count();

        let ofx: OfxXml =
            serde_xml_rs::from_str(ofx_content).map_err(|e| xml_error(e, lines_before))?;

        let bank = ofx
            .bank_msgs
            .map(|b| b.statements)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| s.stmt_rs)
            .flat_map(|s| s.into_transactions());

        let credit_card = ofx
            .cc_msgs
            .map(|c| c.statements)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| s.cc_stmt_rs)
            .flat_map(|s| s.into_transactions());

        Ok(bank.chain(credit_card).collect())
    }
}

/// Reader positions count rows from `<OFX>`; the converted document keeps the
/// source's line breaks, so adding the lines before it gives the file's line.
fn xml_error(error: serde_xml_rs::Error, lines_before: usize) -> MalformedContent {
    match error {
        serde_xml_rs::Error::Reader(e) => {
            let position = e.position();
            let message = e.to_string();
            let message = message
                .strip_prefix(&format!("{} ", position))
                .unwrap_or(message.as_str());
            MalformedContent::at_line(
                lines_before + position.row as usize + 1,
                format!("XML parse error: {}", message),
            )
        }
        other => MalformedContent::new(format!("XML parse error: {}", other)),
    }
}

/// Leaves that may show up with no value. Any tag followed by text is a leaf too.
const EMPTY_LEAF_ELEMENTS: &[&str] = &[
    "NAME", "MEMO", "FITID", "TRNTYPE", "DTPOSTED", "TRNAMT", "ACCTID", "CHECKNUM", "REFNUM",
];

/// Rewrites OFX 1.x SGML (unterminated leaf tags, header block) as XML.
///
/// Works tag by tag, so several elements may share a line. Every line break
/// of the input is kept, header included, and lines in the output match lines
/// in the input.
fn convert_sgml_to_xml(content: &str) -> Result<String, MalformedContent> {
    let start = content
        .find("<OFX>")
        .ok_or_else(|| MalformedContent::new("Missing <OFX> tag"))?;

    let mut result = String::with_capacity(content.len() + content.len() / 4);
    push_line_breaks(&mut result, &content[..start], "");

    let mut rest = &content[start..];
    while !rest.is_empty() {
        let Some(open) = rest.find('<') else {
            push_text(&mut result, rest);
            break;
        };
        push_text(&mut result, &rest[..open]);
        rest = &rest[open..];

        let close = rest.find('>').ok_or_else(|| {
            let offset = content.len() - rest.len();
            MalformedContent::at_line(line_at(content, offset), "Unterminated tag")
        })?;
        let tag = &rest[..=close];
        rest = &rest[close + 1..];

        if tag.starts_with("</")
            || tag.starts_with("<?")
            || tag.starts_with("<!")
            || tag.ends_with("/>")
        {
            result.push_str(tag);
            continue;
        }

        let name = tag[1..tag.len() - 1].split_whitespace().next().unwrap_or_default();
        let text_end = rest.find('<').unwrap_or(rest.len());
        let text = &rest[..text_end];
        let value = text.trim();

        if value.is_empty() && !EMPTY_LEAF_ELEMENTS.contains(&name.to_uppercase().as_str()) {
            // aggregate; its closing tag comes through on its own
            result.push_str(tag);
            continue;
        }

        let closing_tag = format!("</{}>", name);
        result.push_str(tag);
        result.push_str(&escape_bare_ampersands(value));
        result.push_str(&closing_tag);
        push_line_breaks(&mut result, text, value);

        rest = &rest[text_end..];
        if let Some(after) = rest.strip_prefix(closing_tag.as_str()) {
            rest = after;
        }
    }

    Ok(result)
}

/// Text between tags outside a leaf: kept if it has content, otherwise only
/// its line breaks survive.
fn push_text(result: &mut String, text: &str) {
    let value = text.trim();
    if !value.is_empty() {
        result.push_str(&escape_bare_ampersands(value));
    }
    push_line_breaks(result, text, value);
}

/// Line breaks of `text` that are not already part of the emitted `value`.
fn push_line_breaks(result: &mut String, text: &str, value: &str) {
    let count = text.matches('\n').count() - value.matches('\n').count();
    result.extend(std::iter::repeat_n('\n', count));
}

fn line_at(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

/// SGML values are not entity-encoded, so `AT&T` has to become `AT&amp;T`.
fn escape_bare_ampersands(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for (i, c) in value.char_indices() {
        if c == '&' && !starts_entity(&value[i + 1..]) {
            escaped.push_str("&amp;");
        } else {
            escaped.push(c);
        }
    }

    escaped
}

fn starts_entity(rest: &str) -> bool {
    let Some(end) = rest.find(';') else {
        return false;
    };
    let name = &rest[..end];

    if let Some(num) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        !num.is_empty() && num.chars().all(|c| c.is_ascii_hexdigit())
    } else if let Some(num) = name.strip_prefix('#') {
        !num.is_empty() && num.chars().all(|c| c.is_ascii_digit())
    } else {
        matches!(name, "amp" | "lt" | "gt" | "quot" | "apos")
    }
}
