//! Reader for the HEADER section of ISO-10303-21 ("STEP physical file") documents.
//!
//! Only the three mandatory header records are looked up: `FILE_DESCRIPTION`,
//! `FILE_NAME` and `FILE_SCHEMA`. Records are located by name and their
//! arguments read positionally; anything else in the header, and the whole DATA
//! section, is ignored. Entity parsing belongs to the converter.

use thiserror::Error;

const MAGIC: &str = "ISO-10303-21;";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepError {
    #[error("not an ISO-10303-21 file (missing `ISO-10303-21;` magic)")]
    MissingMagic,
    #[error("no HEADER section found")]
    MissingHeader,
    #[error("header has no FILE_SCHEMA record")]
    MissingSchema,
}

/// Metadata read from a STEP header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepHeader {
    pub description: Vec<String>,
    pub implementation_level: Option<String>,
    pub file_name: Option<String>,
    pub timestamp: Option<String>,
    pub author: Vec<String>,
    pub organization: Vec<String>,
    pub preprocessor_version: Option<String>,
    pub originating_system: Option<String>,
    pub authorization: Option<String>,
    pub schemas: Vec<String>,
}

impl StepHeader {
    /// The first schema identifier declared by `FILE_SCHEMA`, e.g. `IFC4`.
    pub fn schema(&self) -> Option<&str> {
        self.schemas.first().map(String::as_str)
    }
}

/// Parse the header of a STEP file. `content` only needs to contain the file
/// up to the end of the HEADER section. Record and section names are matched
/// case-insensitively.
pub fn parse_header(content: &str) -> Result<StepHeader, StepError> {
    // ASCII uppercasing keeps byte offsets, so positions found in `upper` index `content`
    let upper = content.to_ascii_uppercase();
    if !upper.trim_start().starts_with(MAGIC) {
        return Err(StepError::MissingMagic);
    }
    let start = find_unquoted(&upper, "HEADER;").ok_or(StepError::MissingHeader)? + "HEADER;".len();
    let end = find_unquoted(&upper[start..], "ENDSEC;").map_or(content.len(), |e| start + e);
    let (text, upper) = (&content[start..end], &upper[start..end]);

    let mut header = StepHeader::default();
    if let Some(args) = record_args(text, upper, "FILE_DESCRIPTION") {
        let _ = read_description(args, &mut header);
    }
    if let Some(args) = record_args(text, upper, "FILE_NAME") {
        let _ = read_file_name(args, &mut header);
    }
    if let Some(args) = record_args(text, upper, "FILE_SCHEMA") {
        header.schemas = take_list(args).map(|(list, _)| list).unwrap_or_default();
    }

    if header.schemas.is_empty() {
        return Err(StepError::MissingSchema);
    }
    Ok(header)
}

fn read_description(args: &str, header: &mut StepHeader) -> Option<()> {
    let (description, rest) = take_list(args)?;
    header.description = description;
    header.implementation_level = take_string(next_arg(rest)?)?.0;
    Some(())
}

// FILE_NAME(name, timestamp, (author), (organization), preprocessor, originating_system, authorization)
fn read_file_name(args: &str, header: &mut StepHeader) -> Option<()> {
    let (name, rest) = take_string(args)?;
    header.file_name = name;
    let (timestamp, rest) = take_string(next_arg(rest)?)?;
    header.timestamp = timestamp;
    let (author, rest) = take_list(next_arg(rest)?)?;
    header.author = author;
    let (organization, rest) = take_list(next_arg(rest)?)?;
    header.organization = organization;
    let (preprocessor, rest) = take_string(next_arg(rest)?)?;
    header.preprocessor_version = preprocessor;
    let (system, rest) = take_string(next_arg(rest)?)?;
    header.originating_system = system;
    header.authorization = take_string(next_arg(rest)?)?.0;
    Some(())
}

/// Text right after the opening parenthesis of record `name`.
fn record_args<'a>(text: &'a str, upper: &str, name: &str) -> Option<&'a str> {
    let mut from = 0;
    while let Some(found) = find_unquoted(&upper[from..], name) {
        let at = from + found;
        from = at + name.len();
        // reject longer names that merely start with `name`
        let after = upper[from..].trim_start();
        if let Some(args) = after.strip_prefix('(') {
            return Some(&text[text.len() - args.len()..]);
        }
    }
    None
}

/// Byte offset of `needle`, skipping quoted strings and `/* */` comments.
fn find_unquoted(haystack: &str, needle: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let mut i = 0;
    let mut in_string = false;
    while i < bytes.len() {
        if in_string {
            // a doubled quote closes and reopens, which nets out the same
            if bytes[i] == b'\'' {
                in_string = false;
            }
            i += 1;
        } else if bytes[i] == b'\'' {
            in_string = true;
            i += 1;
        } else if bytes[i..].starts_with(b"/*") {
            i = haystack[i + 2..].find("*/").map_or(bytes.len(), |e| i + 2 + e + 2);
        } else if bytes[i..].starts_with(needle.as_bytes()) {
            return Some(i);
        } else {
            i += 1;
        }
    }
    None
}

fn next_arg(s: &str) -> Option<&str> {
    s.trim_start().strip_prefix(',')
}

/// A string argument. `$` and `*` read as unset.
fn take_string(s: &str) -> Option<(Option<String>, &str)> {
    let s = s.trim_start();
    if let Some(rest) = s.strip_prefix('$').or_else(|| s.strip_prefix('*')) {
        return Some((None, rest));
    }
    let body = s.strip_prefix('\'')?;
    let bytes = body.as_bytes();
    let mut end = 0;
    loop {
        match *bytes.get(end)? {
            b'\'' if bytes.get(end + 1) == Some(&b'\'') => end += 2,
            b'\'' => break,
            _ => end += 1,
        }
    }
    let value = decode_control_directives(&body[..end].replace("''", "'"));
    Some((Some(value), &body[end + 1..]))
}

/// A list of strings, e.g. `('a','b')`. A bare string or `$` is accepted too.
fn take_list(s: &str) -> Option<(Vec<String>, &str)> {
    let s = s.trim_start();
    let Some(mut rest) = s.strip_prefix('(') else {
        let (item, rest) = take_string(s)?;
        return Some((item.into_iter().collect(), rest));
    };
    let mut items = Vec::new();
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix(')') {
            return Some((items, after));
        }
        let (item, after) = take_string(rest)?;
        items.extend(item.filter(|i| !i.is_empty()));
        rest = after.trim_start();
        rest = rest.strip_prefix(',').unwrap_or(rest);
    }
}

/// Decode the `\X\hh` and `\X2\hhhh...\X0\` escapes used by STEP for non-ASCII text.
/// Unknown or malformed directives are kept verbatim.
fn decode_control_directives(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.find('\\') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];

        if let Some(body) = rest.strip_prefix("\\X2\\") {
            if let Some(end) = body.find("\\X0\\") {
                if let Some(units) = utf16_units(&body[..end]) {
                    out.push_str(&String::from_utf16_lossy(&units));
                    rest = &body[end + 4..];
                    continue;
                }
            }
        } else if let Some(body) = rest.strip_prefix("\\X\\") {
            if let Some(byte) = body.get(..2).and_then(hex_byte) {
                out.push(char::from(byte));
                rest = &body[2..];
                continue;
            }
        }

        out.push('\\');
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

fn utf16_units(hex: &str) -> Option<Vec<u16>> {
    if !hex.is_ascii() || hex.len() % 4 != 0 {
        return None;
    }
    hex.as_bytes()
        .chunks(4)
        .map(|chunk| std::str::from_utf8(chunk).ok().and_then(hex_unit))
        .collect()
}

fn hex_unit(digits: &str) -> Option<u16> {
    if digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        u16::from_str_radix(digits, 16).ok()
    } else {
        None
    }
}

fn hex_byte(digits: &str) -> Option<u8> {
    if digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        u8::from_str_radix(digits, 16).ok()
    } else {
        None
    }
}
