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

//! The two immutable reserved-word tables of the instruction set, plus the
//! operand shape of each instruction and the label-name rules.

use crate::errors::AssemblyError;

pub const MAX_LABEL_LENGTH: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    R,
    I,
    J,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionSpec {
    pub name: &'static str,
    pub opcode: u8,
    pub funct: u8,
    pub kind: InstructionKind,
}

const fn r(name: &'static str, opcode: u8, funct: u8) -> InstructionSpec {
    InstructionSpec { name, opcode, funct, kind: InstructionKind::R }
}

const fn i(name: &'static str, opcode: u8) -> InstructionSpec {
    InstructionSpec { name, opcode, funct: 0, kind: InstructionKind::I }
}

const fn j(name: &'static str, opcode: u8) -> InstructionSpec {
    InstructionSpec { name, opcode, funct: 0, kind: InstructionKind::J }
}

pub const INSTRUCTIONS: [InstructionSpec; 27] = [
    r("add", 0, 1),
    r("sub", 0, 2),
    r("and", 0, 3),
    r("or", 0, 4),
    r("nor", 0, 5),
    r("move", 1, 1),
    r("mvhi", 1, 2),
    r("mvlo", 1, 3),
    i("addi", 10),
    i("subi", 11),
    i("andi", 12),
    i("ori", 13),
    i("nori", 14),
    i("bne", 15),
    i("beq", 16),
    i("blt", 17),
    i("bgt", 18),
    i("lb", 19),
    i("sb", 20),
    i("lw", 21),
    i("sw", 22),
    i("lh", 23),
    i("sh", 24),
    j("jmp", 30),
    j("la", 31),
    j("call", 32),
    j("stop", 63),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Dh,
    Dw,
    Db,
    Asciz,
    Entry,
    Extern,
}

impl DirectiveKind {
    /// Byte width of a single stored variable; `None` for the directives
    /// that store no data.
    pub fn variable_size(self) -> Option<usize> {
        match self {
            DirectiveKind::Db | DirectiveKind::Asciz => Some(1),
            DirectiveKind::Dh => Some(2),
            DirectiveKind::Dw => Some(4),
            DirectiveKind::Entry | DirectiveKind::Extern => None,
        }
    }
}

pub const DIRECTIVES: [(&str, DirectiveKind); 6] = [
    ("dh", DirectiveKind::Dh),
    ("dw", DirectiveKind::Dw),
    ("db", DirectiveKind::Db),
    ("asciz", DirectiveKind::Asciz),
    ("entry", DirectiveKind::Entry),
    ("extern", DirectiveKind::Extern),
];

// The tables are small and fixed, a linear scan is all the lookup needs.
pub fn find_instruction(name: &str) -> Option<&'static InstructionSpec> {
    INSTRUCTIONS.iter().find(|spec| spec.name == name)
}

pub fn find_directive(name: &str) -> Option<DirectiveKind> {
    DIRECTIVES
        .iter()
        .find(|(reserved, _)| *reserved == name)
        .map(|(_, kind)| *kind)
}

pub fn is_reserved_word(name: &str) -> bool {
    find_instruction(name).is_some() || find_directive(name).is_some()
}

/// What an instruction accepts as operands, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
    Register,
    Immediate,
    Label,
    RegisterOrLabel,
}

impl InstructionSpec {
    pub fn operand_shape(&self) -> &'static [OperandShape] {
        use OperandShape::*;
        match self.opcode {
            0 => &[Register, Register, Register],
            1 => &[Register, Register],
            10..=14 | 19..=24 => &[Register, Immediate, Register],
            15..=18 => &[Register, Register, Label],
            30 => &[RegisterOrLabel],
            31 | 32 => &[Label],
            _ => &[],
        }
    }
}

/// A label starts with a letter, holds only letters and digits, spans at
/// most 31 characters and shadows no reserved word.
pub fn validate_label(name: &str) -> Result<(), AssemblyError> {
    let bytes = name.as_bytes();
    if name.len() > MAX_LABEL_LENGTH
        || !bytes.first().is_some_and(|b| b.is_ascii_alphabetic())
        || !bytes.iter().all(|b| b.is_ascii_alphanumeric())
    {
        return Err(AssemblyError::InvalidLabelName(name.to_string()));
    }
    if is_reserved_word(name) {
        return Err(AssemblyError::ReservedNameAsLabel(name.to_string()));
    }
    Ok(())
}

// ------------- unit tests -------------
