//! SID Tune Relocation Library
//!
//! Relocates and patches 6502 music-player binaries exported by the
//! SID-WIZARD tracker: recovers the code/data partition by recursive
//! descent from the player's jump table, rewrites every absolute operand
//! for a new load address and SID register window, and patches the hi
//! bytes of the pointer tables baked into the data region.
//!
//! This program is unlicensed and dedicated to the public domain.
//! Developed by the EVO64 Super Quattro project.

pub mod analyze;
pub mod config;
pub mod find_code;
pub mod find_tables;
pub mod image;
pub mod kick_asm;
pub mod make_config_asm;
pub mod opcodes;
pub mod parse_sid;
pub mod patch_code;
pub mod patch_data;
pub mod process_set;
pub mod relocate;
