//! Tune set processing pipeline
//!
//! Drives the whole tool for one named set: parse each SID file, analyze
//! it, relocate and patch it, write the output binaries, then generate the
//! configuration include and optionally hand the player source to
//! KickAssembler.
//!
//! This program is unlicensed and dedicated to the public domain.
//! Developed by the EVO64 Super Quattro project.

use std::fs;
use std::path::PathBuf;

use crate::analyze::analyze;
use crate::config::{Config, TuneJob};
use crate::find_code::FindCode;
use crate::image::TuneImage;
use crate::kick_asm::KickAssembler;
use crate::make_config_asm::{raster_line, MakeConfigAsm, TuneConfigRecord};
use crate::parse_sid::ParseSid;
use crate::relocate::{jump_table_entries, relocate, TuneSpec, SID_BASE};

pub struct ProcessOptions {
    /// Analyze and report only; write nothing.
    pub analyze_only: bool,
    /// Print every individual patch.
    pub verbose: bool,
    /// Player source to assemble after a successful run.
    pub assemble: Option<PathBuf>,
}

pub struct ProcessSet {
    config: Config,
}

impl ProcessSet {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Process every tune in the set.
    pub fn process(&self, jobs: &[TuneJob], options: &ProcessOptions) -> Result<(), String> {
        let mut records: Vec<TuneConfigRecord> = Vec::new();

        for (index, job) in jobs.iter().enumerate() {
            println!();
            println!("{}", "─".repeat(70));
            println!("  Tune {}: {}", index + 1, job.label);
            println!("  Source: {}", job.sid_file);
            println!("{}", "─".repeat(70));

            let parser = ParseSid::import(&job.sid_file)
                .map_err(|e| format!("Failed to read {}: {}", job.sid_file, e))?;
            let header = parser
                .parse_header()
                .map_err(|e| format!("Failed to parse {}: {}", job.sid_file, e))?;
            println!("\n  SID Header:");
            println!("{}", header.describe());

            let (load_address, binary) = parser
                .extract_binary(&header)
                .map_err(|e| format!("Failed to extract {}: {}", job.sid_file, e))?;
            if binary.is_empty() {
                return Err(format!("{}: no C64 binary after the header", job.sid_file));
            }
            let data_end = load_address as u32 + binary.len() as u32;
            println!("\n  Binary Data:");
            println!("    Load address: ${:04X}", load_address);
            println!("    Data size:    {} bytes (${:04X})", binary.len(), binary.len());
            println!("    End address:  ${:04X}", data_end - 1);

            let image = TuneImage::new(load_address, binary.clone());
            let entry_points = jump_table_entries(&image)
                .map_err(|e| format!("{}: {}", job.sid_file, e))?;
            let code = FindCode::new(&image, &entry_points);
            println!("{}", analyze(&image, &code));

            if options.analyze_only {
                continue;
            }

            let spec = TuneSpec {
                original_base: load_address,
                new_base: job.new_base,
                original_sid_base: SID_BASE,
                new_sid_base: job.new_sid_base(),
                entry_points,
            };
            let delta = spec.delta();
            let init = if header.init_address != 0 {
                header.init_address
            } else {
                load_address
            };
            let play = header.play_address;

            println!("\n  Relocation Plan:");
            println!("    Original: ${:04X}-${:04X}", load_address, data_end - 1);
            println!("    New base: ${:04X} (delta +${:04X})", job.new_base, delta);
            println!("    Init: ${:04X} -> ${:04X}", init, init.wrapping_add(delta));
            println!("    Play: ${:04X} -> ${:04X}", play, play.wrapping_add(delta));
            println!(
                "    SID:  ${:04X} -> ${:04X} (offset +${:02X})",
                SID_BASE,
                spec.new_sid_base,
                job.sid_offset
            );

            let patched =
                relocate(&spec, &binary).map_err(|e| format!("{}: {}", job.sid_file, e))?;
            for warning in &patched.warnings {
                eprintln!("  warning: {}", warning);
            }

            println!("\n  Patch Results:");
            println!("    Code bytes analyzed:    {}", patched.stats.code_bytes);
            println!("    Data bytes (untouched): {}", patched.stats.data_bytes);
            println!("    Code relocations:       {}", patched.stats.relocated);
            println!("    SID register patches:   {}", patched.stats.sid_redirected);
            println!("    Data hi-byte patches:   {}", patched.stats.data_hi_patched);
            if !patched.stats.sid_refs.is_empty() {
                println!("\n  SID Register Patches:");
                for (&register, &count) in &patched.stats.sid_refs {
                    println!(
                        "    ${:04X} -> ${:04X}: {}x",
                        register,
                        register - SID_BASE + spec.new_sid_base,
                        count
                    );
                }
            }
            if options.verbose {
                println!();
                for line in &patched.report {
                    println!("{}", line);
                }
            }

            let output_path = self.config.output_path.join(&job.output_bin);
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create {:?}: {}", parent, e))?;
            }
            fs::write(&output_path, &patched.data)
                .map_err(|e| format!("Failed to write {:?}: {}", output_path, e))?;
            println!(
                "\n  Output: {} ({} bytes)",
                output_path.display(),
                patched.data.len()
            );

            records.push(TuneConfigRecord {
                label: job.label.clone(),
                base: job.new_base,
                init: init.wrapping_add(delta),
                play: play.wrapping_add(delta),
                size: patched.data.len(),
                sid_base: spec.new_sid_base,
                raster_line: raster_line(index, jobs.len()),
            });
        }

        if options.analyze_only || records.is_empty() {
            return Ok(());
        }

        let include_path = self.config.output_path.join("tune_config.inc");
        MakeConfigAsm::new(records.clone())
            .write(&include_path)
            .map_err(|e| format!("Failed to write {:?}: {}", include_path, e))?;

        println!("\n{}", "=".repeat(70));
        println!("  PROCESSING COMPLETE");
        println!("{}", "=".repeat(70));
        println!("\n  Generated Files:");
        for job in jobs {
            println!("    {}", self.config.output_path.join(&job.output_bin).display());
        }
        println!("    {}", include_path.display());

        println!("\n  Memory Map:");
        for (index, record) in records.iter().enumerate() {
            let end = record.base as u32 + record.size as u32 - 1;
            println!(
                "    ${:04X}-${:04X}  Tune {} (init=${:04X} play=${:04X} SID=${:04X} raster={})",
                record.base,
                end,
                index + 1,
                record.init,
                record.play,
                record.sid_base,
                record.raster_line
            );
        }

        if let Some(player_source) = &options.assemble {
            let prg_path = self.config.output_path.join("player.prg");
            println!("\n  Assembling {}...", player_source.display());
            KickAssembler::new(&self.config)
                .assemble_prg(player_source, &prg_path)
                .map_err(|e| format!("{}", e))?;
            println!("  Player: {}", prg_path.display());
        }

        Ok(())
    }
}
