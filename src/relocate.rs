//! Tune relocation engine
//!
//! Runs the fixed pipeline over one tune binary: recursive-descent code
//! discovery, pointer-table detection, then the code and data patch passes
//! on a fresh copy of the image. Nothing is mutated until both detectors
//! have finished, so a fatal error always leaves the caller with the
//! original bytes.
//!
//! This program is unlicensed and dedicated to the public domain.
//! Developed by the EVO64 Super Quattro project.

use std::collections::BTreeMap;
use std::fmt;

use crate::find_code::FindCode;
use crate::find_tables::scan_tables;
use crate::image::TuneImage;
use crate::patch_code::patch_code;
use crate::patch_data::{patch_interleaved_tables, patch_split_tables};

/// Base address of the primary SID register window.
pub const SID_BASE: u16 = 0xD400;
/// Size of one SID register window in bytes.
pub const SID_WINDOW: u16 = 0x20;
/// Binaries above this size that yield no tables at all get a warning;
/// a real player always has pointer tables.
const TABLELESS_WARN_SIZE: usize = 0x200;

#[derive(Debug)]
pub enum RelocError {
    /// A jump-table slot does not hold a `JMP abs` instruction.
    MalformedEntry(u16),
    /// Disassembly from valid entries reached no instructions; the input is
    /// not a SID-WIZARD export.
    EmptyCode,
}

impl fmt::Display for RelocError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RelocError::MalformedEntry(addr) => {
                write!(f, "entry point at ${:04X} is not a JMP instruction", addr)
            }
            RelocError::EmptyCode => {
                write!(f, "no code reachable from the entry points")
            }
        }
    }
}

impl std::error::Error for RelocError {}

/// Everything the engine needs to know about one tune.
#[derive(Debug, Clone)]
pub struct TuneSpec {
    /// Load address the binary was compiled for.
    pub original_base: u16,
    /// Load address the output must run at.
    pub new_base: u16,
    /// SID register window the binary writes to, conventionally $D400.
    pub original_sid_base: u16,
    /// SID register window the output must write to.
    pub new_sid_base: u16,
    /// Addresses disassembly starts from, usually the routines the
    /// jump-table slots point at.
    pub entry_points: Vec<u16>,
}

impl TuneSpec {
    /// Relocation delta, one wrapping 16-bit value applied to every pointer.
    pub fn delta(&self) -> u16 {
        self.new_base.wrapping_sub(self.original_base)
    }

    /// True when `addr` falls inside the source SID register window.
    pub fn in_sid_window(&self, addr: u16) -> bool {
        addr >= self.original_sid_base
            && (addr as u32) < self.original_sid_base as u32 + SID_WINDOW as u32
    }
}

/// Derive entry points from the three-slot jump table at the load address.
/// SID-WIZARD exports start with `JMP init / JMP play / JMP aux`; each slot
/// is followed through its operand to the routine it names, and a slot
/// holding anything else means the binary is not one of ours. The slots
/// themselves stay data: the harness calls the translated entry addresses
/// directly.
pub fn jump_table_entries(image: &TuneImage) -> Result<Vec<u16>, RelocError> {
    let mut entries = Vec::with_capacity(3);
    for k in 0..3u16 {
        let slot = image.base().wrapping_add(k * 3);
        if !image.contains(slot)
            || !image.contains(slot.wrapping_add(2))
            || image.read(slot) != 0x4C
        {
            return Err(RelocError::MalformedEntry(slot));
        }
        let target = image.read_word(slot.wrapping_add(1));
        if !entries.contains(&target) {
            entries.push(target);
        }
    }
    Ok(entries)
}

/// Statistics for one relocation run.
#[derive(Debug, Default)]
pub struct RelocStats {
    pub code_bytes: usize,
    pub data_bytes: usize,
    pub relocated: u32,
    pub sid_redirected: u32,
    pub data_hi_patched: u32,
    pub split_tables: usize,
    pub interleaved_tables: usize,
    /// Redirection count per original SID register address.
    pub sid_refs: BTreeMap<u16, u32>,
}

/// Output of one run: the patched bytes plus the patch log and warnings.
#[derive(Debug)]
pub struct PatchedTune {
    pub data: Vec<u8>,
    pub stats: RelocStats,
    pub report: Vec<String>,
    pub warnings: Vec<String>,
}

/// Run the full pipeline over one tune binary.
pub fn relocate(spec: &TuneSpec, binary: &[u8]) -> Result<PatchedTune, RelocError> {
    let source = TuneImage::new(spec.original_base, binary.to_vec());

    let code = FindCode::new(&source, &spec.entry_points);
    if code.instruction_count() == 0 {
        return Err(RelocError::EmptyCode);
    }

    let tables = scan_tables(&source, &code);
    let mut warnings = tables.warnings.clone();
    if tables.split.is_empty()
        && tables.interleaved.is_empty()
        && binary.len() > TABLELESS_WARN_SIZE
    {
        warnings.push(format!(
            "no pointer tables detected in {} bytes; the relocated tune may not play correctly",
            binary.len()
        ));
    }

    // Detection is done; from here on only the copy is written.
    let mut patched = source.clone();
    let mut report = Vec::new();
    let code_stats = patch_code(&mut patched, &code, spec, &mut report);
    let mut data_hi_patched =
        patch_split_tables(&mut patched, &tables.split, spec, &mut report);
    data_hi_patched +=
        patch_interleaved_tables(&mut patched, &tables.interleaved, spec, &mut report);

    let stats = RelocStats {
        code_bytes: code.code_byte_count(),
        data_bytes: code.data_byte_count(),
        relocated: code_stats.relocated,
        sid_redirected: code_stats.sid_redirected,
        data_hi_patched,
        split_tables: tables.split.len(),
        interleaved_tables: tables.interleaved.len(),
        sid_refs: code_stats.sid_refs,
    };

    Ok(PatchedTune {
        data: patched.into_bytes(),
        stats,
        report,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(new_base: u16, new_sid_base: u16, entries: &[u16]) -> TuneSpec {
        TuneSpec {
            original_base: 0x1000,
            new_base,
            original_sid_base: SID_BASE,
            new_sid_base,
            entry_points: entries.to_vec(),
        }
    }

    #[test]
    fn test_plain_jsr_relocation() {
        let mut binary = vec![0x00; 0x100];
        binary[0] = 0x20; // JSR $1050
        binary[1] = 0x50;
        binary[2] = 0x10;
        binary[0x50] = 0x60; // RTS
        let out = relocate(&spec(0x3000, SID_BASE, &[0x1000]), &binary).unwrap();
        assert_eq!(out.data[1], 0x50);
        assert_eq!(out.data[2], 0x30);
        // Nothing else moved.
        for (i, (&a, &b)) in binary.iter().zip(out.data.iter()).enumerate() {
            if i != 2 {
                assert_eq!(a, b, "byte {:#x} changed", i);
            }
        }
    }

    #[test]
    fn test_sid_redirection_without_relocation() {
        let mut binary = vec![0x00; 0x100];
        binary[0] = 0x8D; // STA $D400
        binary[1] = 0x00;
        binary[2] = 0xD4;
        binary[3] = 0x60; // RTS
        let out = relocate(&spec(0x1000, 0xD420, &[0x1000]), &binary).unwrap();
        assert_eq!(out.data[1], 0x20);
        assert_eq!(out.data[2], 0xD4);
        assert_eq!(out.stats.sid_redirected, 1);
        assert_eq!(out.stats.relocated, 0);
    }

    #[test]
    fn test_split_table_detection_and_patch() {
        // LDA $1080,Y / STA $FE / LDA $1090,Y / STA $FF / RTS
        let mut binary = vec![0x00; 0x100];
        let code = [
            0xB9, 0x80, 0x10, // LDA $1080,Y
            0x85, 0xFE, // STA $FE
            0xB9, 0x90, 0x10, // LDA $1090,Y
            0x85, 0xFF, // STA $FF
            0x60, // RTS
        ];
        binary[..code.len()].copy_from_slice(&code);
        // Lo bytes of four pointers into the tune, then their hi bytes.
        binary[0x80..0x88].copy_from_slice(&[0x00, 0x10, 0x40, 0x10, 0x80, 0x10, 0xC0, 0x10]);
        binary[0x90..0x94].copy_from_slice(&[0x10, 0x10, 0x10, 0x10]);
        let out = relocate(&spec(0x3000, SID_BASE, &[0x1000]), &binary).unwrap();

        assert_eq!(out.stats.split_tables, 1);
        // Table operands in code are relocated,
        assert_eq!(&out.data[1..3], &[0x80, 0x30]);
        assert_eq!(&out.data[6..8], &[0x90, 0x30]);
        // lo bytes stay as they were,
        assert_eq!(
            &out.data[0x80..0x88],
            &[0x00, 0x10, 0x40, 0x10, 0x80, 0x10, 0xC0, 0x10]
        );
        // and every hi byte forming an in-range pointer moves to the new page.
        assert_eq!(&out.data[0x90..0x94], &[0x30, 0x30, 0x30, 0x30]);
        // Rest of the image untouched.
        assert_eq!(&out.data[0x94..], &binary[0x94..]);
    }

    #[test]
    fn test_interleaved_table_detection_and_patch() {
        let mut binary = vec![0x00; 0x200];
        let code = [
            0xB9, 0x00, 0x11, // LDA $1100,Y
            0xAA, // TAX
            0xB9, 0x01, 0x11, // LDA $1101,Y
            0x60, // RTS
        ];
        binary[..code.len()].copy_from_slice(&code);
        binary[0x100..0x108]
            .copy_from_slice(&[0x00, 0x10, 0x40, 0x10, 0x80, 0x10, 0x00, 0x20]);
        let out = relocate(&spec(0x5000, SID_BASE, &[0x1000]), &binary).unwrap();

        assert_eq!(out.stats.interleaved_tables, 1);
        // Three in-range pairs move, the $2000 pair is data.
        assert_eq!(
            &out.data[0x100..0x108],
            &[0x00, 0x50, 0x40, 0x50, 0x80, 0x50, 0x00, 0x20]
        );
    }

    #[test]
    fn test_round_trip_is_identity() {
        let mut binary = vec![0x00; 0x300];
        let code = [
            0x4C, 0x09, 0x10, // JMP $1009
            0x4C, 0x20, 0x10, // JMP $1020
            0x4C, 0x20, 0x10, // JMP $1020
            0x8D, 0x00, 0xD4, // $1009 STA $D400
            0xB9, 0x80, 0x10, // LDA $1080,Y
            0x85, 0xFE, // STA $FE
            0xB9, 0x90, 0x10, // LDA $1090,Y
            0x85, 0xFF, // STA $FF
            0x60, // RTS
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // pad
            0x60, // $1020 RTS
        ];
        binary[..code.len()].copy_from_slice(&code);
        binary[0x80] = 0x09;
        binary[0x90] = 0x10;
        let entries = [0x1000, 0x1003, 0x1006];
        let out = relocate(&spec(0x1000, SID_BASE, &entries), &binary).unwrap();
        assert_eq!(out.data, binary);
    }

    #[test]
    fn test_reparse_of_output_shifts_with_delta() {
        let mut binary = vec![0x00; 0x100];
        let code = [
            0x4C, 0x09, 0x10, // JMP $1009
            0x4C, 0x0D, 0x10, // JMP $100D
            0x4C, 0x0D, 0x10, // JMP $100D
            0x20, 0x0D, 0x10, // $1009 JSR $100D
            0x60, // RTS
            0xA9, 0x00, // $100D LDA #$00
            0xF0, 0x01, // BEQ $1012
            0xEA, // NOP
            0x60, // $1012 RTS
        ];
        binary[..code.len()].copy_from_slice(&code);
        let entries = vec![0x1000, 0x1003, 0x1006];
        let sp = spec(0x4000, SID_BASE, &entries);
        let out = relocate(&sp, &binary).unwrap();

        let original = FindCode::new(
            &TuneImage::new(0x1000, binary.clone()),
            &entries,
        );
        let delta = sp.delta();
        let shifted: Vec<u16> = entries.iter().map(|e| e.wrapping_add(delta)).collect();
        let reparsed = FindCode::new(&TuneImage::new(0x4000, out.data), &shifted);

        let expect: Vec<u16> = original
            .instructions()
            .keys()
            .map(|a| a.wrapping_add(delta))
            .collect();
        let got: Vec<u16> = reparsed.instructions().keys().copied().collect();
        assert_eq!(expect, got);
    }

    #[test]
    fn test_uniform_data_yields_no_tables_but_completes() {
        let mut binary = vec![0x00; 0x400];
        binary[0] = 0x60; // RTS, everything else zero fill
        let out = relocate(&spec(0x3000, SID_BASE, &[0x1000]), &binary).unwrap();
        assert_eq!(out.stats.split_tables, 0);
        assert_eq!(out.stats.interleaved_tables, 0);
        assert_eq!(out.warnings.len(), 1);
        // Data region bit-identical after the code-only patch pass.
        assert_eq!(&out.data[1..], &binary[1..]);
    }

    #[test]
    fn test_empty_code_is_fatal() {
        // Image full of JAM opcodes: every walk dies immediately.
        let binary = vec![0x02; 0x40];
        let err = relocate(&spec(0x3000, SID_BASE, &[0x1000]), &binary).unwrap_err();
        assert!(matches!(err, RelocError::EmptyCode));
    }

    #[test]
    fn test_jump_table_validation() {
        // JMP $1009 / JMP $100C / JMP $1009: targets, deduplicated, in
        // slot order. The slots themselves are not entry points.
        let good = TuneImage::new(
            0x1000,
            vec![
                0x4C, 0x09, 0x10, 0x4C, 0x0C, 0x10, 0x4C, 0x09, 0x10, 0x60,
                0x00, 0x00, 0x60,
            ],
        );
        assert_eq!(jump_table_entries(&good).unwrap(), vec![0x1009, 0x100C]);

        let bad = TuneImage::new(
            0x1000,
            vec![
                0x4C, 0x09, 0x10, 0xA9, 0x00, 0x60, 0x4C, 0x09, 0x10, 0x60,
            ],
        );
        match jump_table_entries(&bad) {
            Err(RelocError::MalformedEntry(addr)) => assert_eq!(addr, 0x1003),
            other => panic!("expected MalformedEntry, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_delta_wraps_modulo_64k() {
        let sp = spec(0x0800, SID_BASE, &[0x1000]);
        assert_eq!(sp.delta(), 0xF800);
        assert_eq!(0x1050u16.wrapping_add(sp.delta()), 0x0850);
    }
}
