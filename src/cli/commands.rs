// CLI command implementations

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output::{FileReport, OutputFormatter};
use admeta::{detect_container, AdmFile};

/// Expand wildcard arguments into concrete paths.
///
/// Arguments without glob metacharacters pass through untouched, so a
/// missing literal path still gets its own per-file error later.
pub fn expand_files(patterns: &[String]) -> Vec<String> {
    let mut files = Vec::new();
    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            match glob::glob(pattern) {
                Ok(paths) => {
                    for entry in paths.flatten() {
                        if entry.is_file() {
                            if let Some(path) = entry.to_str() {
                                files.push(path.to_string());
                            }
                        }
                    }
                }
                Err(_) => files.push(pattern.clone()),
            }
        } else {
            files.push(pattern.clone());
        }
    }
    files
}

/// Scan and decode metadata from each file, reporting per file.
///
/// Returns how many files failed; per-file failures do not stop the batch.
pub fn command_read(
    files: &[String],
    output: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<usize> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout()),
    };

    let mut errors = 0;
    for file_path in files {
        let adm = match AdmFile::open(file_path) {
            Ok(adm) => adm,
            Err(e) => {
                formatter.print_error(&format!("{}: {}", file_path, e));
                errors += 1;
                continue;
            }
        };

        let metadata = match adm.decode_metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                formatter.print_error(&format!("{}: {}", file_path, e));
                errors += 1;
                continue;
            }
        };

        let report = FileReport {
            file: file_path,
            container: adm.container_kind(),
            data_size: adm.scan().data_size,
            metadata: &metadata,
        };
        formatter.output_report(&report, &mut writer)?;
    }

    writer.flush()?;
    Ok(errors)
}

/// Identify the container variant of each file from its header
pub fn command_detect(files: &[String], formatter: &OutputFormatter) -> usize {
    let mut errors = 0;
    for file_path in files {
        match detect_container(file_path) {
            Ok(Some(kind)) => {
                formatter.print_info(&format!("{}: {} WAV container", file_path, kind));
            }
            Ok(None) => {
                formatter.print_error(&format!("{}: not a RIFF/RF64/BW64 WAV file", file_path));
                errors += 1;
            }
            Err(e) => {
                formatter.print_error(&format!("{}: {}", file_path, e));
                errors += 1;
            }
        }
    }
    errors
}

/// Show file and chunk-level information
pub fn command_info(files: &[String], detailed: bool, formatter: &OutputFormatter) -> usize {
    let mut errors = 0;
    for file_path in files {
        let path = Path::new(file_path);
        let file_size = match std::fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                formatter.print_error(&format!("{}: {}", file_path, e));
                errors += 1;
                continue;
            }
        };

        println!("\n{}", file_path);
        println!("{}", "─".repeat(60));
        println!("Size: {} bytes", file_size);
        if let Some(modified) = modified_time(path) {
            println!("Modified: {}", modified);
        }

        match AdmFile::open(file_path) {
            Ok(adm) => {
                let scan = adm.scan();
                println!("Container: {}", adm.container_kind());
                println!("Data chunk size: {} bytes", scan.data_size);
                println!("Metadata chunk size: {} bytes", scan.dbmd.len());

                if detailed {
                    match adm.decode_metadata() {
                        Ok(metadata) => {
                            println!("Metadata version: {}", metadata.version_string());
                            println!(
                                "Dolby Atmos segment: {}",
                                if metadata.atmos.is_some() {
                                    "present"
                                } else {
                                    "absent"
                                }
                            );
                            println!(
                                "Supplemental segment: {}",
                                if metadata.supplemental.is_some() {
                                    "present"
                                } else {
                                    "absent"
                                }
                            );
                        }
                        Err(e) => {
                            formatter.print_error(&format!("{}: {}", file_path, e));
                            errors += 1;
                        }
                    }
                }
            }
            Err(e) => {
                formatter.print_error(&format!("{}: {}", file_path, e));
                errors += 1;
            }
        }
    }
    errors
}

fn modified_time(path: &Path) -> Option<String> {
    use std::time::UNIX_EPOCH;

    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let secs = modified.duration_since(UNIX_EPOCH).ok()?.as_secs();
    let datetime = chrono::DateTime::<chrono::Utc>::from_timestamp(secs as i64, 0)?;
    Some(datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}
