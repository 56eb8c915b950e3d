/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

mod directives;
pub mod encoder;
mod instructions;
pub mod tables;

use crate::errors::{AssemblyError, LineError};
use crate::reserved::{self, DirectiveKind};
use crate::scanner;
use tables::{AttributesTable, CodeImage, DataImage, SymbolTable};

pub const IC_INITIAL: i64 = 100;
pub const MAX_LINE_LENGTH: usize = 80;

/// Everything the two passes produce for one source file, frozen and ready
/// for emission.
#[derive(Debug)]
pub struct Translation {
    pub symbols: SymbolTable,
    pub code: CodeImage,
    pub data: DataImage,
    pub attributes: AttributesTable,
    pub icf: i64,
    pub dcf: i64,
}

/// Runs both passes over the source. All lines are visited in each pass;
/// every erroneous line contributes exactly one diagnostic, and any error
/// suppresses the result entirely.
pub fn translate(source: &str) -> Result<Translation, Vec<LineError>> {
    let lines: Vec<&str> = source.lines().collect();

    let mut symbols = SymbolTable::new();
    let mut code = CodeImage::default();
    let mut data = DataImage::default();
    let mut ic = IC_INITIAL;
    let mut dc = 0;
    let mut errors = Vec::new();

    for (i, content) in lines.iter().enumerate() {
        let number = i + 1;
        if let Err(error) =
            first_pass_line(content, number, &mut symbols, &mut code, &mut data, &mut ic, &mut dc)
        {
            errors.push(LineError { line: number, error });
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    // Freeze the counters and move the data region above the code region.
    let icf = ic;
    let dcf = dc;
    symbols.relocate_data(icf);
    data.relocate(icf);

    let mut attributes = AttributesTable::default();
    for (i, content) in lines.iter().enumerate() {
        let number = i + 1;
        if let Err(error) =
            second_pass_line(content, number, &mut symbols, &mut code, &mut attributes)
        {
            errors.push(LineError { line: number, error });
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    attributes.record_entry_symbols(&symbols);

    Ok(Translation { symbols, code, data, attributes, icf, dcf })
}

fn first_pass_line(
    content: &str,
    number: usize,
    symbols: &mut SymbolTable,
    code: &mut CodeImage,
    data: &mut DataImage,
    ic: &mut i64,
    dc: &mut i64,
) -> Result<(), AssemblyError> {
    if content.len() > MAX_LINE_LENGTH {
        return Err(AssemblyError::LineTooLong);
    }
    if scanner::rest_is_empty(content, 0) || scanner::is_comment(content) {
        return Ok(());
    }

    let mut index = 0;
    let label = take_label_definition(content, &mut index)?;
    if label.is_some() && scanner::rest_is_empty(content, index) {
        return Err(AssemblyError::MissingOperands);
    }

    scanner::skip_whitespace(content, &mut index);
    if content.as_bytes().get(index) == Some(&b'.') {
        index += 1;
        directives::process_directive(content, &mut index, label.as_deref(), symbols, data, dc)
    } else {
        instructions::process_instruction(
            content,
            &mut index,
            label.as_deref(),
            number,
            symbols,
            code,
            ic,
        )
    }
}

fn second_pass_line(
    content: &str,
    number: usize,
    symbols: &mut SymbolTable,
    code: &mut CodeImage,
    attributes: &mut AttributesTable,
) -> Result<(), AssemblyError> {
    if scanner::rest_is_empty(content, 0) || scanner::is_comment(content) {
        return Ok(());
    }

    let mut index = 0;
    skip_label_definition(content, &mut index);
    scanner::skip_whitespace(content, &mut index);

    if content.as_bytes().get(index) == Some(&b'.') {
        index += 1;
        let name = scanner::scan_label_name(content, &mut index);
        if reserved::find_directive(&name) == Some(DirectiveKind::Entry) {
            let symbol = scanner::scan_label_name(content, &mut index);
            return symbols.mark_entry(&symbol);
        }
        return Ok(());
    }

    let mnemonic = scanner::scan_label_name(content, &mut index);
    // the first pass already rejected files with unknown mnemonics
    let Some(spec) = reserved::find_instruction(&mnemonic) else {
        return Ok(());
    };
    instructions::complete_encoding(content, index, number, spec, symbols, code, attributes)
}

/// A label definition is a word followed immediately by ':'. The name is
/// shape-checked here; whether it may be inserted is decided later, once
/// the line is classified.
fn take_label_definition(
    content: &str,
    index: &mut usize,
) -> Result<Option<String>, AssemblyError> {
    scanner::skip_whitespace(content, index);
    let bytes = content.as_bytes();
    let start = *index;
    let mut i = *index;
    while i < bytes.len() && bytes[i] != b':' && !scanner::is_whitespace(bytes[i]) {
        i += 1;
    }
    if bytes.get(i) != Some(&b':') {
        return Ok(None);
    }
    let name = &content[start..i];
    *index = i + 1;
    reserved::validate_label(name)?;
    Ok(Some(name.to_string()))
}

fn skip_label_definition(content: &str, index: &mut usize) {
    scanner::skip_whitespace(content, index);
    let bytes = content.as_bytes();
    let mut i = *index;
    while i < bytes.len() && bytes[i] != b':' && !scanner::is_whitespace(bytes[i]) {
        i += 1;
    }
    if bytes.get(i) == Some(&b':') {
        *index = i + 1;
    }
}

// ------------- unit tests -------------
