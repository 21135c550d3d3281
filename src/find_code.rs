//! Recursive-descent code finder
//!
//! Walks every statically reachable instruction from a set of entry points
//! and records the code/data partition of the image. Player binaries
//! interleave instructions with pointer tables, so a linear sweep would
//! misread table bytes as code; starting from known entries and following
//! only resolvable control flow keeps data bytes out of the code set.
//!
//! The walk uses an explicit work queue instead of recursion: the IRQ chains
//! and jump tables in player code nest deeply enough to make a call stack a
//! liability. Queue order does not matter, every reachable address is
//! decoded exactly once.
//!
//! This program is unlicensed and dedicated to the public domain.
//! Developed by the EVO64 Super Quattro project.

use std::collections::BTreeMap;

use crate::image::TuneImage;
use crate::opcodes::{AddrMode, OPCODE_TABLE};

/// One decoded instruction, kept flat so the patch passes can iterate the
/// whole map without chasing anything.
#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    pub address: u16,
    pub opcode: u8,
    pub mnemonic: &'static str,
    pub mode: AddrMode,
    pub size: u8,
    pub operand: [u8; 2],
}

impl Instruction {
    /// 16-bit absolute operand (little-endian). Meaningful for the
    /// ABS/ABX/ABY/IND modes only.
    pub fn abs_operand(&self) -> u16 {
        u16::from_le_bytes(self.operand)
    }

    /// Destination of a relative-mode branch.
    pub fn branch_target(&self) -> u16 {
        self.address
            .wrapping_add(2)
            .wrapping_add(self.operand[0] as i8 as u16)
    }
}

/// Code/data partition produced by the walk.
pub struct FindCode {
    instructions: BTreeMap<u16, Instruction>,
    code_bytes: Vec<bool>,
    base: u16,
}

impl FindCode {
    /// Decode everything reachable from `entry_points`.
    pub fn new(image: &TuneImage, entry_points: &[u16]) -> Self {
        let mut found = FindCode {
            instructions: BTreeMap::new(),
            code_bytes: vec![false; image.len()],
            base: image.base(),
        };
        let mut queue: Vec<u16> = entry_points.to_vec();

        while let Some(addr) = queue.pop() {
            if !image.contains(addr) || found.instructions.contains_key(&addr) {
                continue;
            }

            let opcode = image.read(addr);
            let entry = &OPCODE_TABLE[opcode as usize];
            if entry.is_halt() {
                // JAM never appears in reachable player code; drop the walk.
                continue;
            }
            let size = entry.size();
            if addr as u32 + size as u32 > image.end() {
                // Instruction would run past the end of the image.
                continue;
            }

            let mut operand = [0u8; 2];
            for i in 1..size {
                operand[i as usize - 1] = image.read(addr.wrapping_add(i as u16));
            }
            let ins = Instruction {
                address: addr,
                opcode,
                mnemonic: entry.mnemonic,
                mode: entry.mode,
                size,
                operand,
            };
            found.instructions.insert(addr, ins);
            let off = image.offset(addr);
            for i in 0..size as usize {
                found.code_bytes[off + i] = true;
            }

            let next = addr.wrapping_add(size as u16);
            match (ins.mnemonic, ins.mode) {
                ("JMP", AddrMode::Abs) => queue.push(ins.abs_operand()),
                // Indirect jump target is only known at run time.
                ("JMP", AddrMode::Ind) => {}
                ("JSR", _) => {
                    queue.push(ins.abs_operand());
                    queue.push(next);
                }
                ("RTS", _) | ("RTI", _) | ("BRK", _) => {}
                (_, AddrMode::Rel) => {
                    queue.push(ins.branch_target());
                    queue.push(next);
                }
                _ => queue.push(next),
            }
        }

        found
    }

    pub fn instructions(&self) -> &BTreeMap<u16, Instruction> {
        &self.instructions
    }

    pub fn instruction_at(&self, addr: u16) -> Option<&Instruction> {
        self.instructions.get(&addr)
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_instruction_start(&self, addr: u16) -> bool {
        self.instructions.contains_key(&addr)
    }

    /// True when `addr` lies inside any decoded instruction, operand bytes
    /// included.
    pub fn is_code(&self, addr: u16) -> bool {
        let addr = addr as u32;
        let base = self.base as u32;
        addr >= base
            && ((addr - base) as usize) < self.code_bytes.len()
            && self.code_bytes[(addr - base) as usize]
    }

    pub fn code_byte_count(&self) -> usize {
        self.code_bytes.iter().filter(|&&c| c).count()
    }

    pub fn data_byte_count(&self) -> usize {
        self.code_bytes.len() - self.code_byte_count()
    }

    /// First and last code byte address, if any code was found.
    pub fn code_region(&self) -> Option<(u16, u16)> {
        let first = self.code_bytes.iter().position(|&c| c)?;
        let last = self.code_bytes.iter().rposition(|&c| c)?;
        Some((
            self.base.wrapping_add(first as u16),
            self.base.wrapping_add(last as u16),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(base: u16, bytes: &[u8]) -> TuneImage {
        TuneImage::new(base, bytes.to_vec())
    }

    #[test]
    fn test_jump_table_walk() {
        // $1000 JMP $1006 / $1003 JMP $1008 / $1006 LDA #0 / $1008 RTS
        let img = image(
            0x1000,
            &[
                0x4C, 0x06, 0x10, // JMP $1006
                0x4C, 0x08, 0x10, // JMP $1008
                0xA9, 0x00, // LDA #$00
                0x60, // RTS
                0xFB, 0xFA, // data
            ],
        );
        let code = FindCode::new(&img, &[0x1000, 0x1003]);
        assert!(code.is_instruction_start(0x1000));
        assert!(code.is_instruction_start(0x1003));
        assert!(code.is_instruction_start(0x1006));
        assert!(code.is_instruction_start(0x1008));
        assert_eq!(code.instruction_count(), 4);
        // Operand bytes are code but not instruction starts.
        assert!(code.is_code(0x1001));
        assert!(!code.is_instruction_start(0x1001));
        // Trailing bytes stay data.
        assert!(!code.is_code(0x1009));
        assert_eq!(code.data_byte_count(), 2);
    }

    #[test]
    fn test_jsr_follows_target_and_fall_through() {
        // $1000 JSR $1006 / $1003 LDA #1 / $1005 RTS / $1006 RTS
        let img = image(
            0x1000,
            &[0x20, 0x06, 0x10, 0xA9, 0x01, 0x60, 0x60],
        );
        let code = FindCode::new(&img, &[0x1000]);
        assert!(code.is_instruction_start(0x1003));
        assert!(code.is_instruction_start(0x1006));
        assert_eq!(code.instruction_count(), 4);
    }

    #[test]
    fn test_branch_explores_both_arms() {
        // $1000 BEQ $1004 / $1002 LDA #2 (falls into $1004) / $1004 RTS
        let img = image(0x1000, &[0xF0, 0x02, 0xA9, 0x02, 0x60]);
        let code = FindCode::new(&img, &[0x1000]);
        assert!(code.is_instruction_start(0x1002));
        assert!(code.is_instruction_start(0x1004));
        assert_eq!(code.instruction_count(), 3);
    }

    #[test]
    fn test_rts_stops_walk() {
        let img = image(0x1000, &[0x60, 0xA9, 0x00]);
        let code = FindCode::new(&img, &[0x1000]);
        assert_eq!(code.instruction_count(), 1);
        assert!(!code.is_code(0x1001));
    }

    #[test]
    fn test_jam_drops_walk_without_marking_code() {
        // BNE skips over a JAM byte; the fall-through path dies at the JAM.
        let img = image(0x1000, &[0xD0, 0x01, 0x02, 0x60]);
        let code = FindCode::new(&img, &[0x1000]);
        assert!(code.is_instruction_start(0x1003));
        assert!(!code.is_code(0x1002));
        assert_eq!(code.instruction_count(), 2);
    }

    #[test]
    fn test_out_of_range_targets_dropped() {
        // JSR into ROM, fall-through still walked.
        let img = image(0x1000, &[0x20, 0x15, 0xFD, 0x60]);
        let code = FindCode::new(&img, &[0x1000]);
        assert_eq!(code.instruction_count(), 2);
        assert!(code.is_instruction_start(0x1003));
    }

    #[test]
    fn test_truncated_instruction_at_image_end() {
        // STA abs with only one operand byte available.
        let img = image(0x1000, &[0x8D, 0x00]);
        let code = FindCode::new(&img, &[0x1000]);
        assert_eq!(code.instruction_count(), 0);
    }

    #[test]
    fn test_branch_target_wraps_backwards() {
        // $1002 BNE $1000
        let img = image(0x1000, &[0xA9, 0x00, 0xD0, 0xFC, 0x60]);
        let code = FindCode::new(&img, &[0x1000]);
        assert!(code.is_instruction_start(0x1000));
        assert!(code.is_instruction_start(0x1004));
        assert_eq!(code.instruction_count(), 3);
    }
}
