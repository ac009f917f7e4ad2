//! The `analyze` command: report resolution and size for local downloads.

use crate::cli::AnalyzeArgs;
use crate::output::{print_heading, print_info, print_warning};
use colored::Colorize;
use ytgrab_core::{CoreResult, analyze_folder, format_bytes};

pub fn run_analyze(args: AnalyzeArgs) -> CoreResult<()> {
    print_heading(&format!("Analyzing videos in: {}", args.path.display()));

    let report = analyze_folder(&args.path)?;

    for partial in &report.incomplete {
        let name = partial
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| partial.display().to_string());
        print_warning(&format!("INCOMPLETE: {name}"));
    }

    for file in &report.files {
        let name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.path.display().to_string());
        println!("\n{}", name.bold());

        match &file.probe {
            Ok(probed) => print_info("  Quality", probed.resolution_label()),
            Err(e) => print_info("  Quality", format!("unknown ({e})")),
        }

        let size = format_bytes(file.size_bytes);
        match file.size_hint.note() {
            Some(note) => print_info("  Size", format!("{size} ({note})")),
            None => print_info("  Size", size),
        }
    }

    println!();
    print_info(
        "Total",
        format!(
            "{} across {} video(s)",
            format_bytes(report.total_bytes),
            report.files.len()
        ),
    );
    println!(
        "\n{}",
        "Note: size notes are heuristics; install ffprobe (ships with ffmpeg) \
         for accurate resolution analysis."
            .dimmed()
    );

    Ok(())
}
