use anyhow::{Context, Result};
use colored::*;
use gpt_copy_core::{AppError, Rule};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

pub fn write_output(content: &str, output_path: Option<&Path>, quiet: bool) -> Result<()> {
    match output_path {
        Some(path) => {
            write_to_file(path, content)?;
            if !quiet {
                eprintln!(
                    "{} Output saved to: {}",
                    "✅".green(),
                    path.display().to_string().blue()
                );
            }
        }
        None => write_to_stdout(content)?,
    }
    Ok(())
}

pub fn print_unmatched_patterns(unmatched: &[&Rule]) {
    if unmatched.is_empty() {
        return;
    }
    eprintln!(
        "{}",
        "Warning: The following patterns did not match any files:"
            .yellow()
            .bold()
    );
    for rule in unmatched {
        eprintln!("  {}", rule.to_string().yellow());
    }
}

pub fn print_read_errors(errors: &[AppError]) {
    if errors.is_empty() {
        return;
    }
    eprintln!(
        "{}",
        format!("Warning: {} file(s) could not be read:", errors.len())
            .yellow()
            .bold()
    );
    for error in errors {
        eprintln!("  {}", error.to_string().dimmed());
    }
}

fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to file {}", path.display()))?;
    if !content.ends_with('\n') {
        file.write_all(b"\n")
            .with_context(|| format!("Failed to write to file {}", path.display()))?;
    }
    Ok(())
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
