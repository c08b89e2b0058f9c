// Output formatting for CLI

use std::io::Write;

use admeta::{BinauralRenderMode, ContainerKind, DolbyMetadata};
use clap::ValueEnum;
use serde::Serialize;

/// Speaker-layout labels for the 9 trim presets, in segment order
pub const TRIM_CONFIG_TEXT: [&str; 9] = [
    "2.0", "5.1", "7.1", "2.1.2", "5.1.2", "7.1.2", "2.1.4", "5.1.4", "7.1.4",
];

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Pretty,
    /// JSON document per file
    Json,
}

/// Everything the read command reports for one file
#[derive(Serialize)]
pub struct FileReport<'a> {
    pub file: &'a str,
    pub container: ContainerKind,
    pub data_size: u64,
    pub metadata: &'a DolbyMetadata,
}

/// The render mode shared by every object, when there is one
pub fn uniform_render_mode(modes: &[BinauralRenderMode]) -> Option<BinauralRenderMode> {
    let (first, rest) = modes.split_first()?;
    rest.iter().all(|mode| mode == first).then_some(*first)
}

/// Format and output decoded metadata
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Write one file's report in the selected format
    pub fn output_report(
        &self,
        report: &FileReport<'_>,
        writer: &mut impl Write,
    ) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Pretty => self.render_pretty(report, writer)?,
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string_pretty(report)?)?;
            }
        }
        Ok(())
    }

    fn render_pretty(
        &self,
        report: &FileReport<'_>,
        writer: &mut impl Write,
    ) -> std::io::Result<()> {
        writeln!(
            writer,
            "{}: Dolby audio metadata chunk found ({} container, version {})",
            report.file,
            report.container,
            report.metadata.version_string()
        )?;

        writeln!(writer, "\nDolby Atmos metadata")?;
        match &report.metadata.atmos {
            Some(atmos) => {
                writeln!(
                    writer,
                    "   Created by: {} ({}.{}.{})",
                    atmos.creation_tool,
                    atmos.tool_version.major,
                    atmos.tool_version.minor,
                    atmos.tool_version.micro
                )?;
                writeln!(writer, "   Warp mode: {}", atmos.warp_mode)?;
            }
            None => {
                writeln!(
                    writer,
                    "   Not present. This may not be a valid Dolby Atmos ADM file."
                )?;
            }
        }

        writeln!(writer, "\nDolby Atmos supplemental metadata")?;
        match &report.metadata.supplemental {
            Some(supplemental) => {
                match uniform_render_mode(&supplemental.binaural_render_modes) {
                    Some(mode) => {
                        let presence = if mode == BinauralRenderMode::NotIndicated {
                            "not present"
                        } else {
                            "present"
                        };
                        writeln!(writer, "   Headphone metadata {}:", presence)?;
                        writeln!(
                            writer,
                            "      Binaural render mode: {} (all objects have identical value)",
                            mode
                        )?;
                        for line in render_mode_advice(mode) {
                            writeln!(writer, "      {}", line)?;
                        }
                    }
                    None => {
                        writeln!(writer, "   Headphone metadata present:")?;
                        writeln!(
                            writer,
                            "      Binaural render mode: varied (objects have different values)"
                        )?;
                    }
                }

                writeln!(writer, "   Trim metadata:")?;
                for (config, trim) in TRIM_CONFIG_TEXT.iter().zip(supplemental.trims.iter()) {
                    let kind = if trim.auto_trim { "automatic" } else { "manual" };
                    writeln!(writer, "      {}: {} trims", config, kind)?;
                }
            }
            None => {
                writeln!(
                    writer,
                    "   Headphone metadata not present. Default metadata will apply."
                )?;
                writeln!(
                    writer,
                    "   Trim metadata not present. Default metadata will apply."
                )?;
            }
        }

        writeln!(writer)
    }

    /// Print success message
    #[allow(dead_code)]
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
}

/// Advisory text for a render mode shared by every object
fn render_mode_advice(mode: BinauralRenderMode) -> Vec<&'static str> {
    match mode {
        BinauralRenderMode::Bypass => vec![
            "No binauralization will be applied.",
            "Recommend editing binaural render mode parameters.",
        ],
        BinauralRenderMode::Near => vec![
            "Near binaural render mode will be applied.",
            "Recommend editing binaural render mode parameters.",
        ],
        BinauralRenderMode::Far => vec![
            "Far binaural render mode will be applied.",
            "Recommend editing binaural render mode parameters.",
        ],
        BinauralRenderMode::Mid => vec!["Default binaural render mode will be applied."],
        BinauralRenderMode::NotIndicated => vec![
            "No binaural render mode metadata present. Default binaural render mode may be applied.",
            "Recommend editing binaural render mode parameters.",
        ],
        BinauralRenderMode::Reserved(_) => vec!["Reserved binaural render mode value."],
    }
}
