//! KickAssembler include generator
//!
//! Emits the configuration include the player harness assembles against:
//! the four SID window bases, PAL raster constants, and per-tune base,
//! entry, size and raster-line constants with the entries already
//! translated to their relocated addresses.
//!
//! This program is unlicensed and dedicated to the public domain.
//! Developed by the EVO64 Super Quattro project.

use std::fs;
use std::path::Path;

use crate::config::SID_WINDOWS;

/// Raster lines in one PAL frame.
pub const PAL_RASTER_LINES: u16 = 312;

/// Trigger line for tune `index` of `count`, spaced evenly over the frame.
pub fn raster_line(index: usize, count: usize) -> u16 {
    (PAL_RASTER_LINES as u32 * index as u32 / count.max(1) as u32) as u16
}

/// Per-tune configuration handed to the harness.
#[derive(Debug, Clone)]
pub struct TuneConfigRecord {
    pub label: String,
    pub base: u16,
    pub init: u16,
    pub play: u16,
    pub size: usize,
    pub sid_base: u16,
    pub raster_line: u16,
}

/// Include-file generator over a processed tune set.
pub struct MakeConfigAsm {
    records: Vec<TuneConfigRecord>,
}

impl MakeConfigAsm {
    pub fn new(records: Vec<TuneConfigRecord>) -> Self {
        Self { records }
    }

    /// Render the KickAssembler source.
    pub fn generate(&self) -> String {
        let mut lines = vec![
            "// ============================================================".to_string(),
            "// Auto-generated by sid-relocator".to_string(),
            "// EVO64 Super Quattro - Quad SID Player Configuration".to_string(),
            "// DO NOT EDIT - Regenerate with: sid-relocator".to_string(),
            "// ============================================================".to_string(),
            String::new(),
            "// SID chip base addresses (EVO64 Super Quattro addressing)".to_string(),
        ];
        for (i, &window) in SID_WINDOWS.iter().enumerate() {
            lines.push(format!(".const SID{}_BASE = ${:04X}", i + 1, window));
        }
        lines.push(String::new());
        lines.push("// PAL timing".to_string());
        lines.push(format!(".const PAL_RASTER_LINES = {}", PAL_RASTER_LINES));
        lines.push(String::new());

        for (i, record) in self.records.iter().enumerate() {
            let n = i + 1;
            lines.push(format!("// Tune {}: {}", n, record.label));
            lines.push(format!(".const TUNE{}_BASE   = ${:04X}", n, record.base));
            lines.push(format!(".const TUNE{}_INIT   = ${:04X}", n, record.init));
            lines.push(format!(".const TUNE{}_PLAY   = ${:04X}", n, record.play));
            lines.push(format!(".const TUNE{}_SIZE   = {}", n, record.size));
            lines.push(format!(".const TUNE{}_SID    = ${:04X}", n, record.sid_base));
            lines.push(format!(".const TUNE{}_RASTER = {}", n, record.raster_line));
            lines.push(String::new());
        }

        lines.join("\n")
    }

    /// Write the include to disk.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.generate())?;
        Ok(())
    }
}
