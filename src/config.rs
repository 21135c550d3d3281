//! Tool configuration and built-in tune sets
//!
//! Holds the resolved output directory and the optional KickAssembler jar,
//! plus the named tune sets the CLI can process.
//!
//! This program is unlicensed and dedicated to the public domain.
//! Developed by the EVO64 Super Quattro project.

use std::path::{Path, PathBuf};

pub const VERSION: &str = "0.9.1";

/// SID register windows addressable on the Super Quattro board.
pub const SID_WINDOWS: [u16; 4] = [0xD400, 0xD420, 0xD440, 0xD460];

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the binaries and the include file are written to.
    pub output_path: PathBuf,
    /// Explicit KickAssembler jar location, if the caller has one.
    pub kickass_jar: Option<PathBuf>,
}

impl Config {
    pub fn new(output_path: impl AsRef<Path>) -> Self {
        Self {
            output_path: output_path.as_ref().to_path_buf(),
            kickass_jar: None,
        }
    }

}

impl Default for Config {
    fn default() -> Self {
        Self::new("build")
    }
}

/// One tune in a set: where it comes from, where it goes.
#[derive(Debug, Clone)]
pub struct TuneJob {
    pub sid_file: String,
    pub label: String,
    pub new_base: u16,
    /// Offset from $D400 selecting the target SID window.
    pub sid_offset: u16,
    pub output_bin: String,
}

impl TuneJob {
    pub fn new_sid_base(&self) -> u16 {
        0xD400 + self.sid_offset
    }
}

/// Look up a built-in tune set by name.
pub fn tune_set(name: &str) -> Option<Vec<TuneJob>> {
    match name {
        "quadcore" => Some(quadcore_set()),
        _ => None,
    }
}

pub fn set_names() -> &'static [&'static str] {
    &["quadcore"]
}

/// The Quad Core release: four subtunes, one per SID chip, spread across
/// memory so all four players coexist.
fn quadcore_set() -> Vec<TuneJob> {
    let job = |sid_file: &str, label: &str, new_base: u16, sid_offset: u16, output_bin: &str| {
        TuneJob {
            sid_file: sid_file.to_string(),
            label: label.to_string(),
            new_base,
            sid_offset,
            output_bin: output_bin.to_string(),
        }
    };
    vec![
        job(
            "sids/quadcore/Quad_Core_tune_1.sid",
            "Quad Core (tune 1)",
            0x1000,
            0x00,
            "tune1.bin",
        ),
        job(
            "sids/quadcore/Quad_Core_tune_2.sid",
            "Quad Core (tune 2)",
            0x3000,
            0x20,
            "tune2.bin",
        ),
        job(
            "sids/quadcore/Quad_Core_tune_3.sid",
            "Quad Core (tune 3)",
            0x5000,
            0x40,
            "tune3.bin",
        ),
        job(
            "sids/quadcore/Quad_Core_tune_4.sid",
            "Quad Core (tune 4)",
            0x7000,
            0x60,
            "tune4.bin",
        ),
    ]
}
