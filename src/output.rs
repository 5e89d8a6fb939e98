//! CLI output formatting.
//!
//! Each command prints a short, line-oriented report. Formatting is kept out
//! of `main.rs` so the text can be tested without spawning anything.
//!
//! ```text
//! $ magick-resize resize photo.jpg thumb.jpg --width 220 --height 220 --mode fit
//! thumb.jpg (fit 220x220, quality 91)
//!     Source: photo.jpg
//!     Result: 220x168
//!
//! $ magick-resize identify photo.jpg
//! 500x381
//!
//! $ magick-resize check
//! ImageMagick: available
//!     Convert:  convert
//!     Identify: identify
//!     Timeout:  60s
//! ```

use crate::config::ToolConfig;
use crate::imaging::command::Program;
use crate::imaging::{ResizeParams, ToolSet};

/// Lines describing a completed resize. `result` is the size read back from
/// the output file, when it could be determined.
pub fn format_resize(params: &ResizeParams, result: Option<(u32, u32)>) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} ({} {}x{}, quality {})",
            params.output.display(),
            params.mode,
            params.width,
            params.height,
            params.quality.value()
        ),
        format!("    Source: {}", params.source.display()),
    ];
    if let Some((w, h)) = result {
        lines.push(format!("    Result: {w}x{h}"));
    }
    lines
}

pub fn format_size((width, height): (u32, u32)) -> String {
    format!("{width}x{height}")
}

fn program_line(program: &Program) -> String {
    std::iter::once(program.executable.as_str())
        .chain(program.leading_args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lines for the `check` command.
pub fn format_check(available: bool, tools: &ToolSet, config: &ToolConfig) -> Vec<String> {
    let timeout = match config.timeout() {
        Some(limit) => format!("{}s", limit.as_secs()),
        None => "none".to_string(),
    };
    vec![
        format!(
            "ImageMagick: {}",
            if available { "available" } else { "NOT FOUND" }
        ),
        format!("    Convert:  {}", program_line(&tools.convert)),
        format!("    Identify: {}", program_line(&tools.identify)),
        format!("    Timeout:  {timeout}"),
    ]
}
