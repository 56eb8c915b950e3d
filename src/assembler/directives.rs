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

//! First-pass handling of directive lines: `.db`/`.dh`/`.dw` integer lists,
//! `.asciz` strings, `.extern` declarations. `.entry` waits for the second
//! pass.

use crate::assembler::tables::{DataEntry, DataImage, SymbolKind, SymbolTable};
use crate::errors::AssemblyError;
use crate::reserved::{self, DirectiveKind};
use crate::scanner;

// Longest accepted token per storage width, sign included.
const DB_MAX_DIGITS: usize = 4;
const DH_MAX_DIGITS: usize = 6;
const DW_MAX_DIGITS: usize = 11;

/// Called with `index` just past the '.' of a directive word. `label` is a
/// label defined at the start of the line, already shape-checked; it is
/// bound for `.db`/`.dh`/`.dw`/`.asciz` and dropped for `.extern`/`.entry`.
pub fn process_directive(
    content: &str,
    index: &mut usize,
    label: Option<&str>,
    symbols: &mut SymbolTable,
    data: &mut DataImage,
    dc: &mut i64,
) -> Result<(), AssemblyError> {
    let name = scan_directive_name(content, index);
    let Some(kind) = reserved::find_directive(&name) else {
        return Err(AssemblyError::UnrecognisedDirective(name));
    };
    match kind {
        DirectiveKind::Db | DirectiveKind::Dh | DirectiveKind::Dw => {
            process_storage(content, index, kind, label, symbols, data, dc)
        }
        DirectiveKind::Asciz => process_asciz(content, index, label, symbols, data, dc),
        DirectiveKind::Extern => process_extern(content, index, symbols),
        // handled in the second pass
        DirectiveKind::Entry => Ok(()),
    }
}

// A directive name runs to the next whitespace only; a stuck-on operand
// makes the whole word unrecognisable, exactly like an instruction.
fn scan_directive_name(content: &str, index: &mut usize) -> String {
    let bytes = content.as_bytes();
    let start = *index;
    while *index < bytes.len() && !scanner::is_whitespace(bytes[*index]) {
        *index += 1;
    }
    content[start..*index].to_string()
}

fn require_operand_spacing(content: &str, index: usize) -> Result<(), AssemblyError> {
    if scanner::rest_is_empty(content, index) {
        return Err(AssemblyError::MissingOperands);
    }
    if !scanner::is_whitespace(content.as_bytes()[index]) {
        return Err(AssemblyError::NoLeadingWhitespace);
    }
    Ok(())
}

fn process_storage(
    content: &str,
    index: &mut usize,
    kind: DirectiveKind,
    label: Option<&str>,
    symbols: &mut SymbolTable,
    data: &mut DataImage,
    dc: &mut i64,
) -> Result<(), AssemblyError> {
    require_operand_spacing(content, *index)?;

    let (max_digits, min, max) = match kind {
        DirectiveKind::Db => (DB_MAX_DIGITS, i64::from(i8::MIN), i64::from(i8::MAX)),
        DirectiveKind::Dh => (DH_MAX_DIGITS, i64::from(i16::MIN), i64::from(i16::MAX)),
        _ => (DW_MAX_DIGITS, i64::from(i32::MIN), i64::from(i32::MAX)),
    };
    let values = scan_integer_list(content, index, max_digits, min, max)?;

    let mut bytes = Vec::with_capacity(values.len() * kind.variable_size().unwrap_or(1));
    for value in &values {
        match kind {
            DirectiveKind::Db => bytes.push(*value as u8),
            DirectiveKind::Dh => bytes.extend((*value as i16).to_le_bytes()),
            _ => bytes.extend((*value as i32).to_le_bytes()),
        }
    }
    append_data_entry(kind, values.len(), bytes, label, symbols, data, dc)
}

fn scan_integer_list(
    content: &str,
    index: &mut usize,
    max_digits: usize,
    min: i64,
    max: i64,
) -> Result<Vec<i64>, AssemblyError> {
    let mut values = Vec::new();
    loop {
        scanner::skip_whitespace(content, index);
        if scanner::at_end(content, *index) {
            break;
        }
        scanner::check_comma(content, index, values.len())?;
        values.push(scanner::expect_integer(content, index, max_digits, min, max)?);
    }
    Ok(values)
}

fn process_asciz(
    content: &str,
    index: &mut usize,
    label: Option<&str>,
    symbols: &mut SymbolTable,
    data: &mut DataImage,
    dc: &mut i64,
) -> Result<(), AssemblyError> {
    require_operand_spacing(content, *index)?;
    let text = scan_quoted_string(content, index)?;

    // the terminating NUL is stored and counted
    let mut bytes = text.into_bytes();
    bytes.push(0);
    let count = bytes.len();
    append_data_entry(DirectiveKind::Asciz, count, bytes, label, symbols, data, dc)
}

fn scan_quoted_string(content: &str, index: &mut usize) -> Result<String, AssemblyError> {
    scanner::skip_whitespace(content, index);
    let bytes = content.as_bytes();
    if bytes.get(*index) != Some(&b'"') {
        return Err(AssemblyError::UnterminatedString);
    }
    *index += 1;
    let start = *index;
    while *index < bytes.len() && bytes[*index] != b'"' {
        *index += 1;
    }
    if scanner::at_end(content, *index) {
        return Err(AssemblyError::UnterminatedString);
    }
    let inner = &content[start..*index];
    *index += 1;
    if inner.bytes().any(|b| !(0x20..=0x7E).contains(&b)) {
        return Err(AssemblyError::NonPrintableInString);
    }
    // nothing but whitespace may follow the closing quote
    if !scanner::rest_is_empty(content, *index) {
        return Err(AssemblyError::UnterminatedString);
    }
    Ok(inner.to_string())
}

fn append_data_entry(
    kind: DirectiveKind,
    num_of_variables: usize,
    bytes: Vec<u8>,
    label: Option<&str>,
    symbols: &mut SymbolTable,
    data: &mut DataImage,
    dc: &mut i64,
) -> Result<(), AssemblyError> {
    if let Some(name) = label {
        symbols.define(name, *dc, SymbolKind::Data)?;
    }
    let entry = DataEntry {
        address: *dc,
        kind,
        variable_size: kind.variable_size().unwrap_or(1),
        num_of_variables,
        bytes,
    };
    *dc += entry.data_size() as i64;
    data.push(entry);
    Ok(())
}

fn process_extern(
    content: &str,
    index: &mut usize,
    symbols: &mut SymbolTable,
) -> Result<(), AssemblyError> {
    if scanner::rest_is_empty(content, *index) {
        return Err(AssemblyError::MissingOperands);
    }
    let name = scanner::scan_label_name(content, index);
    reserved::validate_label(&name)?;
    symbols.define(&name, 0, SymbolKind::External)
}

// ------------- unit tests -------------
