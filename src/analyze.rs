//! Static-analysis report for a tune binary
//!
//! Summarizes the code/data partition and tallies every SID register the
//! code touches, with the register names spelled out. Used by the CLI's
//! analyze-only mode and printed before each relocation.
//!
//! This program is unlicensed and dedicated to the public domain.
//! Developed by the EVO64 Super Quattro project.

use std::collections::BTreeMap;

use crate::find_code::FindCode;
use crate::image::TuneImage;
use crate::relocate::{SID_BASE, SID_WINDOW};

/// Build the analysis report block for one binary.
pub fn analyze(image: &TuneImage, code: &FindCode) -> String {
    let mut sid_refs: BTreeMap<u16, u32> = BTreeMap::new();
    let mut internal_refs = 0u32;
    let mut io_refs = 0u32;

    for ins in code.instructions().values() {
        if !ins.mode.has_abs_operand() {
            continue;
        }
        let addr = ins.abs_operand();
        if addr >= SID_BASE && addr < SID_BASE + SID_WINDOW {
            *sid_refs.entry(addr).or_insert(0) += 1;
        } else if image.contains(addr) {
            internal_refs += 1;
        } else if (0xD000..=0xDFFF).contains(&addr) {
            io_refs += 1;
        }
    }

    let len = image.len().max(1);
    let code_bytes = code.code_byte_count();
    let data_bytes = code.data_byte_count();
    let (code_start, code_end) = code.code_region().unwrap_or((image.base(), image.base()));

    let mut lines = vec![
        String::new(),
        "  Recursive Descent Analysis:".to_string(),
        format!(
            "    Code bytes found:      {} ({}% of binary)",
            code_bytes,
            code_bytes * 100 / len
        ),
        format!(
            "    Data bytes found:      {} ({}% of binary)",
            data_bytes,
            data_bytes * 100 / len
        ),
        format!("    Code region:           ${:04X}-${:04X}", code_start, code_end),
        format!("    Instructions in code:  {}", code.instruction_count()),
        format!("    Internal addr refs:    {}", internal_refs),
        format!("    I/O register refs:     {}", io_refs),
        String::new(),
        format!(
            "  SID Register References ({} total):",
            sid_refs.values().sum::<u32>()
        ),
    ];
    for (&addr, &count) in &sid_refs {
        lines.push(format!(
            "    ${:04X} ({}): {}x",
            addr,
            sid_register_name(addr - SID_BASE),
            count
        ));
    }

    lines.join("\n")
}

/// Human-readable name of a SID register by its offset in the window.
pub fn sid_register_name(offset: u16) -> String {
    const VOICE_REGS: [&str; 7] = ["Freq Lo", "Freq Hi", "PW Lo", "PW Hi", "Ctrl", "AD", "SR"];
    const GLOBAL_REGS: [&str; 8] = [
        "FC Lo",
        "FC Hi",
        "Res/Filt",
        "Mode/Vol",
        "Pot X",
        "Pot Y",
        "OSC3 Random",
        "ENV3",
    ];
    match offset {
        0..=20 => format!("{} (V{})", VOICE_REGS[(offset % 7) as usize], offset / 7 + 1),
        21..=28 => GLOBAL_REGS[(offset - 21) as usize].to_string(),
        _ => format!("Reg {}", offset),
    }
}
