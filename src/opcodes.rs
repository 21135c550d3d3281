//! Static 6502/6510 instruction set description
//!
//! Maps each of the 256 opcode byte values to its mnemonic and addressing
//! mode. Undocumented opcodes are included under their common names so that
//! player code using them still decodes; the JAM group halts the CPU and is
//! treated as the end of a code path.
//!
//! This program is unlicensed and dedicated to the public domain.
//! Developed by the EVO64 Super Quattro project.

/// 6502 addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// Implied (1 byte)
    Imp,
    /// Accumulator (1 byte)
    Acc,
    /// Immediate (2 bytes)
    Imm,
    /// Zero page (2 bytes)
    Zp,
    /// Zero page,X (2 bytes)
    Zpx,
    /// Zero page,Y (2 bytes)
    Zpy,
    /// (Indirect,X) (2 bytes)
    Izx,
    /// (Indirect),Y (2 bytes)
    Izy,
    /// Relative (2 bytes, branches)
    Rel,
    /// Absolute (3 bytes)
    Abs,
    /// Absolute,X (3 bytes)
    Abx,
    /// Absolute,Y (3 bytes)
    Aby,
    /// (Indirect) (3 bytes, JMP only)
    Ind,
}

impl AddrMode {
    /// Total instruction length in bytes, opcode included.
    pub const fn size(self) -> u8 {
        match self {
            AddrMode::Imp | AddrMode::Acc => 1,
            AddrMode::Imm
            | AddrMode::Zp
            | AddrMode::Zpx
            | AddrMode::Zpy
            | AddrMode::Izx
            | AddrMode::Izy
            | AddrMode::Rel => 2,
            AddrMode::Abs | AddrMode::Abx | AddrMode::Aby | AddrMode::Ind => 3,
        }
    }

    /// True for the four modes whose operand is a 16-bit absolute address.
    pub const fn has_abs_operand(self) -> bool {
        matches!(
            self,
            AddrMode::Abs | AddrMode::Abx | AddrMode::Aby | AddrMode::Ind
        )
    }

    /// True for the indexed absolute modes used for table accesses.
    pub const fn is_indexed_abs(self) -> bool {
        matches!(self, AddrMode::Abx | AddrMode::Aby)
    }
}

/// One opcode table entry.
#[derive(Debug, Clone, Copy)]
pub struct Opcode {
    pub mnemonic: &'static str,
    pub mode: AddrMode,
}

impl Opcode {
    pub const fn size(&self) -> u8 {
        self.mode.size()
    }

    /// CPU-halt opcodes; decoding one ends a code walk.
    pub fn is_halt(&self) -> bool {
        self.mnemonic == "JAM"
    }
}

const fn op(mnemonic: &'static str, mode: AddrMode) -> Opcode {
    Opcode { mnemonic, mode }
}

use AddrMode::{Abs, Abx, Aby, Acc, Imm, Imp, Ind, Izx, Izy, Rel, Zp, Zpx, Zpy};

/// Complete opcode table indexed by opcode byte value.
pub const OPCODE_TABLE: [Opcode; 256] = [
    op("BRK", Imp), op("ORA", Izx), op("JAM", Imp), op("SLO", Izx), // $00
    op("NOP", Zp), op("ORA", Zp), op("ASL", Zp), op("SLO", Zp), // $04
    op("PHP", Imp), op("ORA", Imm), op("ASL", Acc), op("ANC", Imm), // $08
    op("NOP", Abs), op("ORA", Abs), op("ASL", Abs), op("SLO", Abs), // $0C
    op("BPL", Rel), op("ORA", Izy), op("JAM", Imp), op("SLO", Izy), // $10
    op("NOP", Zpx), op("ORA", Zpx), op("ASL", Zpx), op("SLO", Zpx), // $14
    op("CLC", Imp), op("ORA", Aby), op("NOP", Imp), op("SLO", Aby), // $18
    op("NOP", Abx), op("ORA", Abx), op("ASL", Abx), op("SLO", Abx), // $1C
    op("JSR", Abs), op("AND", Izx), op("JAM", Imp), op("RLA", Izx), // $20
    op("BIT", Zp), op("AND", Zp), op("ROL", Zp), op("RLA", Zp), // $24
    op("PLP", Imp), op("AND", Imm), op("ROL", Acc), op("ANC", Imm), // $28
    op("BIT", Abs), op("AND", Abs), op("ROL", Abs), op("RLA", Abs), // $2C
    op("BMI", Rel), op("AND", Izy), op("JAM", Imp), op("RLA", Izy), // $30
    op("NOP", Zpx), op("AND", Zpx), op("ROL", Zpx), op("RLA", Zpx), // $34
    op("SEC", Imp), op("AND", Aby), op("NOP", Imp), op("RLA", Aby), // $38
    op("NOP", Abx), op("AND", Abx), op("ROL", Abx), op("RLA", Abx), // $3C
    op("RTI", Imp), op("EOR", Izx), op("JAM", Imp), op("SRE", Izx), // $40
    op("NOP", Zp), op("EOR", Zp), op("LSR", Zp), op("SRE", Zp), // $44
    op("PHA", Imp), op("EOR", Imm), op("LSR", Acc), op("ALR", Imm), // $48
    op("JMP", Abs), op("EOR", Abs), op("LSR", Abs), op("SRE", Abs), // $4C
    op("BVC", Rel), op("EOR", Izy), op("JAM", Imp), op("SRE", Izy), // $50
    op("NOP", Zpx), op("EOR", Zpx), op("LSR", Zpx), op("SRE", Zpx), // $54
    op("CLI", Imp), op("EOR", Aby), op("NOP", Imp), op("SRE", Aby), // $58
    op("NOP", Abx), op("EOR", Abx), op("LSR", Abx), op("SRE", Abx), // $5C
    op("RTS", Imp), op("ADC", Izx), op("JAM", Imp), op("RRA", Izx), // $60
    op("NOP", Zp), op("ADC", Zp), op("ROR", Zp), op("RRA", Zp), // $64
    op("PLA", Imp), op("ADC", Imm), op("ROR", Acc), op("ARR", Imm), // $68
    op("JMP", Ind), op("ADC", Abs), op("ROR", Abs), op("RRA", Abs), // $6C
    op("BVS", Rel), op("ADC", Izy), op("JAM", Imp), op("RRA", Izy), // $70
    op("NOP", Zpx), op("ADC", Zpx), op("ROR", Zpx), op("RRA", Zpx), // $74
    op("SEI", Imp), op("ADC", Aby), op("NOP", Imp), op("RRA", Aby), // $78
    op("NOP", Abx), op("ADC", Abx), op("ROR", Abx), op("RRA", Abx), // $7C
    op("NOP", Imm), op("STA", Izx), op("NOP", Imm), op("SAX", Izx), // $80
    op("STY", Zp), op("STA", Zp), op("STX", Zp), op("SAX", Zp), // $84
    op("DEY", Imp), op("NOP", Imm), op("TXA", Imp), op("ANE", Imm), // $88
    op("STY", Abs), op("STA", Abs), op("STX", Abs), op("SAX", Abs), // $8C
    op("BCC", Rel), op("STA", Izy), op("JAM", Imp), op("SHA", Izy), // $90
    op("STY", Zpx), op("STA", Zpx), op("STX", Zpy), op("SAX", Zpy), // $94
    op("TYA", Imp), op("STA", Aby), op("TXS", Imp), op("TAS", Aby), // $98
    op("SHY", Abx), op("STA", Abx), op("SHX", Aby), op("SHA", Aby), // $9C
    op("LDY", Imm), op("LDA", Izx), op("LDX", Imm), op("LAX", Izx), // $A0
    op("LDY", Zp), op("LDA", Zp), op("LDX", Zp), op("LAX", Zp), // $A4
    op("TAY", Imp), op("LDA", Imm), op("TAX", Imp), op("LXA", Imm), // $A8
    op("LDY", Abs), op("LDA", Abs), op("LDX", Abs), op("LAX", Abs), // $AC
    op("BCS", Rel), op("LDA", Izy), op("JAM", Imp), op("LAX", Izy), // $B0
    op("LDY", Zpx), op("LDA", Zpx), op("LDX", Zpy), op("LAX", Zpy), // $B4
    op("CLV", Imp), op("LDA", Aby), op("TSX", Imp), op("LAS", Aby), // $B8
    op("LDY", Abx), op("LDA", Abx), op("LDX", Aby), op("LAX", Aby), // $BC
    op("CPY", Imm), op("CMP", Izx), op("NOP", Imm), op("DCP", Izx), // $C0
    op("CPY", Zp), op("CMP", Zp), op("DEC", Zp), op("DCP", Zp), // $C4
    op("INY", Imp), op("CMP", Imm), op("DEX", Imp), op("SBX", Imm), // $C8
    op("CPY", Abs), op("CMP", Abs), op("DEC", Abs), op("DCP", Abs), // $CC
    op("BNE", Rel), op("CMP", Izy), op("JAM", Imp), op("DCP", Izy), // $D0
    op("NOP", Zpx), op("CMP", Zpx), op("DEC", Zpx), op("DCP", Zpx), // $D4
    op("CLD", Imp), op("CMP", Aby), op("NOP", Imp), op("DCP", Aby), // $D8
    op("NOP", Abx), op("CMP", Abx), op("DEC", Abx), op("DCP", Abx), // $DC
    op("CPX", Imm), op("SBC", Izx), op("NOP", Imm), op("ISC", Izx), // $E0
    op("CPX", Zp), op("SBC", Zp), op("INC", Zp), op("ISC", Zp), // $E4
    op("INX", Imp), op("SBC", Imm), op("NOP", Imp), op("USB", Imm), // $E8
    op("CPX", Abs), op("SBC", Abs), op("INC", Abs), op("ISC", Abs), // $EC
    op("BEQ", Rel), op("SBC", Izy), op("JAM", Imp), op("ISC", Izy), // $F0
    op("NOP", Zpx), op("SBC", Zpx), op("INC", Zpx), op("ISC", Zpx), // $F4
    op("SED", Imp), op("SBC", Aby), op("NOP", Imp), op("ISC", Aby), // $F8
    op("NOP", Abx), op("SBC", Abx), op("INC", Abx), op("ISC", Abx), // $FC
];
