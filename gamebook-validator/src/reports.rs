use anyhow::Result;
use colored::Colorize;
use gamebook_content::{ValidationResult, WarningPolicy};
use std::io::Write;
use std::time::Duration;

pub fn generate_console_report(
    out: &mut dyn Write,
    result: &ValidationResult,
    policy: WarningPolicy,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Content Validation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=============================".cyan())?;

    writeln!(out, "Files validated: {}", result.file_count)?;
    writeln!(out, "Declared scenes: {}", result.scene_index.len())?;
    writeln!(out, "Referenced scenes: {}", result.referenced_scenes.len())?;
    writeln!(
        out,
        "Missing scenes: {}",
        count_label(result.missing_scenes.len(), false)
    )?;
    writeln!(
        out,
        "Unreachable scenes: {}",
        count_label(result.unreachable_scenes.len(), true)
    )?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    if !result.errors.is_empty() {
        writeln!(out, "{}", format!("❌ Errors ({})", result.errors.len()).red().bold())?;
        for error in &result.errors {
            writeln!(out, "   • {}", error.red())?;
        }
        writeln!(out)?;
    }

    if !result.warnings.is_empty() {
        writeln!(
            out,
            "{}",
            format!("⚠️  Warnings ({})", result.warnings.len())
                .yellow()
                .bold()
        )?;
        for warning in &result.warnings {
            writeln!(out, "   • {}", warning.yellow())?;
        }
        writeln!(out)?;
    }

    let status = if result.passes_with(policy) {
        "✅ PASS".green().bold()
    } else {
        "❌ FAIL".red().bold()
    };
    if result.passed && !result.passes_with(policy) {
        writeln!(out, "{status} (warnings treated as failures)")?;
    } else {
        writeln!(out, "{status}")?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, result: &ValidationResult) -> Result<()> {
    let json_output = serde_json::to_string_pretty(result)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

fn count_label(count: usize, warning: bool) -> colored::ColoredString {
    let label = count.to_string();
    match (count, warning) {
        (0, _) => label.green(),
        (_, true) => label.yellow(),
        (_, false) => label.red(),
    }
}
