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

//! Instruction lines. The first pass validates the mnemonic and operand
//! shape and encodes every field that does not depend on a label; the
//! second pass resolves label operands and patches the remaining field.

use crate::assembler::encoder::{InstructionWord, MAX_J_ADDRESS};
use crate::assembler::tables::{
    AttributeEntry, AttributeKind, AttributesTable, CodeEntry, CodeImage, SymbolKind, SymbolTable,
};
use crate::errors::AssemblyError;
use crate::reserved::{self, InstructionKind, InstructionSpec, OperandShape};
use crate::scanner;

const IMMED_MAX_DIGITS: usize = 6;

const STOP_OPCODE: u8 = 63;
const JMP_OPCODE: u8 = 30;

/// First pass for one instruction line. `index` points past any label
/// definition; `label` is the line's label, shape-checked but not yet in
/// the symbol table.
pub fn process_instruction(
    content: &str,
    index: &mut usize,
    label: Option<&str>,
    line_number: usize,
    symbols: &mut SymbolTable,
    code: &mut CodeImage,
    ic: &mut i64,
) -> Result<(), AssemblyError> {
    let mnemonic = scanner::scan_label_name(content, index);
    let Some(spec) = reserved::find_instruction(&mnemonic) else {
        return Err(AssemblyError::UnrecognisedInstruction(mnemonic));
    };

    if let Some(name) = label {
        symbols.define(name, *ic, SymbolKind::Code)?;
    }

    let word = if spec.opcode == STOP_OPCODE {
        if !scanner::rest_is_empty(content, *index) {
            return Err(AssemblyError::ExcessAfterStop);
        }
        InstructionWord::J { opcode: STOP_OPCODE, reg: false, address: 0 }
    } else {
        if scanner::rest_is_empty(content, *index) {
            return Err(AssemblyError::MissingOperands);
        }
        if !scanner::is_whitespace(content.as_bytes()[*index]) {
            return Err(AssemblyError::NoLeadingWhitespace);
        }
        scan_operands(content, index, spec)?
    };

    code.push(CodeEntry { line_number, address: *ic, word });
    *ic += 4;
    Ok(())
}

/// Scans the operand list against the instruction's shape and builds the
/// word, leaving zero in any field that waits for a label address.
fn scan_operands(
    content: &str,
    index: &mut usize,
    spec: &InstructionSpec,
) -> Result<InstructionWord, AssemblyError> {
    let shape = spec.operand_shape();
    let mut registers: Vec<u8> = Vec::with_capacity(3);
    let mut immediate: i16 = 0;
    let mut jmp_register: Option<u8> = None;

    for (slot, expected) in shape.iter().enumerate() {
        scanner::skip_whitespace(content, index);
        if scanner::at_end(content, *index) {
            return Err(AssemblyError::WrongOperandCount { expected: shape.len() });
        }
        scanner::check_comma(content, index, slot)?;
        match expected {
            OperandShape::Register => registers.push(scanner::scan_register(content, index)?),
            OperandShape::Immediate => {
                let value = scanner::expect_integer(
                    content,
                    index,
                    IMMED_MAX_DIGITS,
                    i64::from(i16::MIN),
                    i64::from(i16::MAX),
                )?;
                immediate = value as i16;
            }
            OperandShape::Label => {
                let name = scanner::scan_label_name(content, index);
                reserved::validate_label(&name)?;
            }
            OperandShape::RegisterOrLabel => {
                if scanner::peek_register(content, *index) {
                    jmp_register = Some(scanner::scan_register(content, index)?);
                } else {
                    let name = scanner::scan_label_name(content, index);
                    reserved::validate_label(&name)?;
                }
            }
        }
    }

    // anything left over is either a misplaced comma or a surplus operand
    scanner::skip_whitespace(content, index);
    if !scanner::at_end(content, *index) {
        scanner::check_comma(content, index, shape.len())?;
        return Err(AssemblyError::WrongOperandCount { expected: shape.len() });
    }

    Ok(build_word(spec, &registers, immediate, jmp_register))
}

fn build_word(
    spec: &InstructionSpec,
    registers: &[u8],
    immediate: i16,
    jmp_register: Option<u8>,
) -> InstructionWord {
    match spec.kind {
        InstructionKind::R => {
            // the copy family takes two operands and leaves rt clear
            let (rs, rt, rd) = if spec.opcode == 1 {
                (registers[0], 0, registers[1])
            } else {
                (registers[0], registers[1], registers[2])
            };
            InstructionWord::R { opcode: spec.opcode, rs, rt, rd, funct: spec.funct }
        }
        InstructionKind::I => InstructionWord::I {
            opcode: spec.opcode,
            rs: registers[0],
            rt: registers[1],
            immed: immediate,
        },
        InstructionKind::J => match jmp_register {
            Some(register) => InstructionWord::J {
                opcode: spec.opcode,
                reg: true,
                address: u32::from(register),
            },
            None => InstructionWord::J { opcode: spec.opcode, reg: false, address: 0 },
        },
    }
}

/// True when this line's instruction carries a label operand that the
/// second pass must resolve.
pub fn references_label(spec: &InstructionSpec, content: &str, index: usize) -> bool {
    match spec.opcode {
        15..=18 | 31 | 32 => true,
        JMP_OPCODE => !scanner::peek_register(content, index),
        _ => false,
    }
}

/// Second pass for one instruction line: looks up the label operand and
/// patches the field the first pass left blank. `index` points past the
/// mnemonic.
pub fn complete_encoding(
    content: &str,
    index: usize,
    line_number: usize,
    spec: &InstructionSpec,
    symbols: &SymbolTable,
    code: &mut CodeImage,
    attributes: &mut AttributesTable,
) -> Result<(), AssemblyError> {
    if !references_label(spec, content, index) {
        return Ok(());
    }
    let name = extract_label_operand(content, index);
    let Some(symbol) = symbols.get(&name) else {
        return Err(AssemblyError::UndefinedLabel(name));
    };
    let Some(entry) = code.entry_at_line_mut(line_number) else {
        return Ok(());
    };

    match entry.word {
        InstructionWord::I { ref mut immed, .. } => {
            // a branch displacement is relative to this unit; an external
            // label has no address to be relative to
            if symbol.kind == SymbolKind::External {
                return Err(AssemblyError::ExternalInBranch(name));
            }
            let distance = symbol.value - entry.address;
            if distance < i64::from(i16::MIN) || distance > i64::from(i16::MAX) {
                return Err(AssemblyError::BranchTooFar(name));
            }
            *immed = distance as i16;
        }
        InstructionWord::J { ref mut address, .. } => {
            if symbol.kind == SymbolKind::External {
                *address = 0;
                attributes.push(AttributeEntry {
                    name,
                    kind: AttributeKind::External,
                    address: entry.address,
                });
            } else {
                if symbol.value < 0 || symbol.value > MAX_J_ADDRESS {
                    return Err(AssemblyError::AddressTooLarge(name));
                }
                *address = symbol.value as u32;
            }
        }
        InstructionWord::R { .. } => {}
    }
    Ok(())
}

// Registers begin with '$', immediates with a sign or digit; the first
// alphabetic character past the mnemonic therefore starts the label.
fn extract_label_operand(content: &str, index: usize) -> String {
    let bytes = content.as_bytes();
    let mut i = index;
    while i < bytes.len() && !bytes[i].is_ascii_alphabetic() {
        i += 1;
    }
    scanner::scan_label_name(content, &mut i)
}

// ------------- unit tests -------------
