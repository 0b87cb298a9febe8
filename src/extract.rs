// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Plain text extraction from uploaded documents.

use std::path::Path;

use pulldown_cmark::Event;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use pulldown_cmark::TagEnd;

use crate::error::Fallible;
use crate::error::fail;

pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["md", "txt"];

/// Extract the text of a document. The format is chosen by the file
/// extension.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Fallible<String> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    let text = match ext.as_str() {
        "txt" => String::from_utf8(bytes.to_vec())?,
        "md" => markdown_to_text(&String::from_utf8(bytes.to_vec())?),
        _ => {
            return fail(format!(
                "Unsupported file type: {ext}. Supported: {}",
                SUPPORTED_EXTENSIONS.join(", ")
            ));
        }
    };
    let text = text.trim();
    if text.is_empty() {
        return fail("Could not extract any text from the document.");
    }
    log::debug!("Extracted {} characters from {filename}.", text.chars().count());
    Ok(text.to_string())
}

/// Render Markdown as plain text: one line per block, table cells joined
/// with pipes.
pub fn markdown_to_text(markdown: &str) -> String {
    let mut out = String::new();
    let mut cells_in_row = 0;
    for event in Parser::new_ext(markdown, Options::ENABLE_TABLES) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Start(Tag::Table(_)) => end_line(&mut out),
            Event::Start(Tag::TableHead) | Event::Start(Tag::TableRow) => cells_in_row = 0,
            Event::Start(Tag::TableCell) => {
                if cells_in_row > 0 {
                    out.push_str(" | ");
                }
                cells_in_row += 1;
            }
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::BlockQuote(_)
                | TagEnd::TableHead
                | TagEnd::TableRow,
            ) => end_line(&mut out),
            _ => {}
        }
    }
    out
}

fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}
