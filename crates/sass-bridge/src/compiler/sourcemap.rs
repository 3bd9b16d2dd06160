/*
 * sourcemap.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Version 3 source map generation.

use serde::Serialize;

use super::emit::Mapping;

const VLQ_ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// A source map document, serialized with the standard camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<String>>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    pub fn new(file: impl Into<String>, sources: Vec<String>, mappings: &[Mapping]) -> Self {
        SourceMap {
            version: 3,
            file: file.into(),
            source_root: None,
            sources,
            sources_content: None,
            names: Vec::new(),
            mappings: encode_mappings(mappings),
        }
    }

    pub fn with_source_root(mut self, root: Option<String>) -> Self {
        self.source_root = root;
        self
    }

    pub fn with_sources_content(mut self, contents: Option<Vec<String>>) -> Self {
        self.sources_content = contents;
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Encode mappings as `;`-separated lines of `,`-separated segments.
///
/// Mappings must be in generation order. Generated columns restart at every
/// line; source index, line and column are deltas against the previous
/// segment across the whole document.
pub fn encode_mappings(mappings: &[Mapping]) -> String {
    let mut out = String::new();
    let mut line = 0;
    let mut prev_column = 0i64;
    let mut prev_source = 0i64;
    let mut prev_source_line = 0i64;
    let mut prev_source_column = 0i64;
    let mut first_in_line = true;

    for m in mappings {
        while line < m.generated_line {
            out.push(';');
            line += 1;
            prev_column = 0;
            first_in_line = true;
        }
        if !first_in_line {
            out.push(',');
        }
        first_in_line = false;

        let column = m.generated_column as i64;
        let source = m.source as i64;
        let source_line = m.source_line as i64;
        let source_column = m.source_column as i64;
        encode_vlq(&mut out, column - prev_column);
        encode_vlq(&mut out, source - prev_source);
        encode_vlq(&mut out, source_line - prev_source_line);
        encode_vlq(&mut out, source_column - prev_source_column);
        prev_column = column;
        prev_source = source;
        prev_source_line = source_line;
        prev_source_column = source_column;
    }
    out
}

fn encode_vlq(out: &mut String, value: i64) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };
    loop {
        let mut digit = (vlq & 0b1_1111) as usize;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b10_0000;
        }
        out.push(VLQ_ALPHABET[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}
