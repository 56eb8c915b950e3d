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

//! Character-level helpers shared by both passes. Every scanner works on a
//! single source line (no trailing newline) and advances a byte index.

use crate::errors::AssemblyError;

pub const MAX_REGISTER_DIGITS: usize = 2;

const MIN_REGISTER: i64 = 0;
const MAX_REGISTER: i64 = 31;

// Space and tab separate tokens; the newline never reaches the scanners.
pub fn is_whitespace(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

pub fn skip_whitespace(content: &str, index: &mut usize) {
    let bytes = content.as_bytes();
    while *index < bytes.len() && is_whitespace(bytes[*index]) {
        *index += 1;
    }
}

pub fn at_end(content: &str, index: usize) -> bool {
    index >= content.len()
}

/// True when nothing but whitespace remains from `index` to the end of the line.
pub fn rest_is_empty(content: &str, index: usize) -> bool {
    let mut i = index;
    skip_whitespace(content, &mut i);
    at_end(content, i)
}

/// A comment line holds ';' as its first non-whitespace character.
pub fn is_comment(content: &str) -> bool {
    let mut i = 0;
    skip_whitespace(content, &mut i);
    content.as_bytes().get(i) == Some(&b';')
}

/// Reads a word up to the next whitespace or comma. Shape is not validated.
pub fn scan_label_name(content: &str, index: &mut usize) -> String {
    skip_whitespace(content, index);
    let bytes = content.as_bytes();
    let start = *index;
    while *index < bytes.len() && !is_whitespace(bytes[*index]) && bytes[*index] != b',' {
        *index += 1;
    }
    content[start..*index].to_string()
}

/// Reads an integer token up to the next whitespace, comma or end of line.
/// A token longer than `max_digits` characters (sign included) cannot fit the
/// target field and is rejected immediately.
pub fn scan_integer(
    content: &str,
    index: &mut usize,
    max_digits: usize,
) -> Result<(String, i64), AssemblyError> {
    skip_whitespace(content, index);
    let bytes = content.as_bytes();
    let start = *index;
    while *index < bytes.len() && !is_whitespace(bytes[*index]) && bytes[*index] != b',' {
        *index += 1;
    }
    let text = content[start..*index].to_string();
    if text.len() > max_digits {
        return Err(AssemblyError::InvalidInteger(text));
    }
    // The textual form is checked separately; a malformed token parses to 0
    // here and is rejected by validate_integer.
    let value = text.parse::<i64>().unwrap_or(0);
    Ok((text, value))
}

/// Accepts `[+-]?digits` within `[min, max]`.
pub fn validate_integer(
    text: &str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), AssemblyError> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AssemblyError::InvalidInteger(text.to_string()));
    }
    if value < min || value > max {
        return Err(AssemblyError::InvalidInteger(text.to_string()));
    }
    Ok(())
}

/// Scans and range-checks an integer operand in one step.
pub fn expect_integer(
    content: &str,
    index: &mut usize,
    max_digits: usize,
    min: i64,
    max: i64,
) -> Result<i64, AssemblyError> {
    let (text, value) = scan_integer(content, index, max_digits)?;
    validate_integer(&text, value, min, max)?;
    Ok(value)
}

/// A register operand is '$' immediately followed by a number in 0..=31.
pub fn scan_register(content: &str, index: &mut usize) -> Result<u8, AssemblyError> {
    skip_whitespace(content, index);
    let bytes = content.as_bytes();
    if bytes.get(*index) != Some(&b'$') {
        return Err(AssemblyError::InvalidRegister);
    }
    if !bytes.get(*index + 1).is_some_and(|b| b.is_ascii_digit()) {
        return Err(AssemblyError::InvalidRegister);
    }
    *index += 1;
    let (text, value) =
        scan_integer(content, index, MAX_REGISTER_DIGITS).map_err(|_| AssemblyError::InvalidRegister)?;
    validate_integer(&text, value, MIN_REGISTER, MAX_REGISTER)
        .map_err(|_| AssemblyError::InvalidRegister)?;
    Ok(value as u8)
}

/// True when the next operand (past whitespace and commas) starts a register.
pub fn peek_register(content: &str, index: usize) -> bool {
    let bytes = content.as_bytes();
    let mut i = index;
    while i < bytes.len() && (is_whitespace(bytes[i]) || bytes[i] == b',') {
        i += 1;
    }
    bytes.get(i) == Some(&b'$')
}

/// Validates (and consumes) the separator in front of the next operand.
/// `scanned_operands` is the number of operands already read on this line.
pub fn check_comma(
    content: &str,
    index: &mut usize,
    scanned_operands: usize,
) -> Result<(), AssemblyError> {
    skip_whitespace(content, index);
    let bytes = content.as_bytes();
    if bytes.get(*index) == Some(&b',') {
        *index += 1;
        skip_whitespace(content, index);
        if bytes.get(*index) == Some(&b',') {
            return Err(AssemblyError::MultipleCommas);
        }
        if scanned_operands == 0 || at_end(content, *index) {
            return Err(AssemblyError::StrayComma);
        }
    } else if scanned_operands != 0 && !at_end(content, *index) {
        return Err(AssemblyError::MissingComma);
    }
    Ok(())
}

// ------------- unit tests -------------
