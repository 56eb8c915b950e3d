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

//! The 32-bit instruction word in its three layouts. Packing is done with
//! explicit shifts and masks, bit 0 being the least-significant bit of the
//! little-endian word.

use crate::reserved::InstructionKind;

// Field offsets shared by all three layouts.
const OPCODE_SHIFT: u32 = 26;
const RS_SHIFT: u32 = 21;
const RT_SHIFT: u32 = 16;
const RD_SHIFT: u32 = 11;
const FUNCT_SHIFT: u32 = 6;
const J_REG_SHIFT: u32 = 25;

const REG_MASK: u32 = 0x1F;
const FUNCT_MASK: u32 = 0x1F;
const OPCODE_MASK: u32 = 0x3F;
const J_ADDRESS_MASK: u32 = 0x1FF_FFFF;

/// Largest value the 25-bit J-type address field can hold.
pub const MAX_J_ADDRESS: i64 = J_ADDRESS_MASK as i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionWord {
    R { opcode: u8, rs: u8, rt: u8, rd: u8, funct: u8 },
    I { opcode: u8, rs: u8, rt: u8, immed: i16 },
    J { opcode: u8, reg: bool, address: u32 },
}

impl InstructionWord {
    pub fn kind(&self) -> InstructionKind {
        match self {
            InstructionWord::R { .. } => InstructionKind::R,
            InstructionWord::I { .. } => InstructionKind::I,
            InstructionWord::J { .. } => InstructionKind::J,
        }
    }

    pub fn encode(&self) -> u32 {
        match *self {
            InstructionWord::R { opcode, rs, rt, rd, funct } => {
                (u32::from(funct) & FUNCT_MASK) << FUNCT_SHIFT
                    | (u32::from(rd) & REG_MASK) << RD_SHIFT
                    | (u32::from(rt) & REG_MASK) << RT_SHIFT
                    | (u32::from(rs) & REG_MASK) << RS_SHIFT
                    | (u32::from(opcode) & OPCODE_MASK) << OPCODE_SHIFT
            }
            InstructionWord::I { opcode, rs, rt, immed } => {
                u32::from(immed as u16)
                    | (u32::from(rt) & REG_MASK) << RT_SHIFT
                    | (u32::from(rs) & REG_MASK) << RS_SHIFT
                    | (u32::from(opcode) & OPCODE_MASK) << OPCODE_SHIFT
            }
            InstructionWord::J { opcode, reg, address } => {
                (address & J_ADDRESS_MASK)
                    | u32::from(reg) << J_REG_SHIFT
                    | (u32::from(opcode) & OPCODE_MASK) << OPCODE_SHIFT
            }
        }
    }

    /// The four bytes of the word in emission order (bits 0-7 first).
    pub fn to_le_bytes(&self) -> [u8; 4] {
        self.encode().to_le_bytes()
    }
}

// ------------- unit tests -------------
