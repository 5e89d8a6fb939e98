//! Typed ImageMagick invocations.
//!
//! A [`MagickCommand`] enumerates the operation and its typed arguments.
//! [`MagickCommand::to_invocation`] is the only place that turns one into an
//! argument vector, and the result is executed directly (never through a
//! shell), so file names are passed through verbatim as single arguments.
//!
//! ```text
//! Convert { source, steps, quality, output }
//!     → convert <source> [-resize G] [-gravity center] [-background white]
//!               [-extent WxH] -strip -quality Q <output>
//! Identify { source }
//!     → identify -format '%[fx:w]x%[fx:h]\n' <source>
//! ```

use super::params::{FIT_PAD_BOX, Geometry, GeometryFlag, Quality, ResizeMode, ResizeParams};
use crate::config::{ToolConfig, ToolFlavor};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Format string handed to `identify -format`; prints `WxH` on its own line
/// for every frame, so the first line describes frame 0 of a GIF or TIFF.
/// The `\n` is ImageMagick's escape, not a literal newline.
pub const IDENTIFY_FORMAT: &str = r"%[fx:w]x%[fx:h]\n";

/// An executable plus arguments that precede the operation's own
/// (`magick identify ...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub executable: String,
    pub leading_args: Vec<String>,
}

impl Program {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_subcommand(executable: impl Into<String>, subcommand: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            leading_args: vec![subcommand.into()],
        }
    }
}

/// The concrete executables used for convert and identify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSet {
    pub convert: Program,
    pub identify: Program,
}

impl ToolSet {
    /// ImageMagick 6 layout: `convert` and `identify`.
    pub fn legacy(config: &ToolConfig) -> Self {
        Self {
            convert: Program::new(&config.convert_program),
            identify: Program::new(&config.identify_program),
        }
    }

    /// ImageMagick 7 layout: `magick` and `magick identify`.
    pub fn magick7(config: &ToolConfig) -> Self {
        Self {
            convert: Program::new(&config.magick_program),
            identify: Program::with_subcommand(&config.magick_program, "identify"),
        }
    }

    /// Tool set for an explicit flavor. `Auto` is resolved by the caller, which
    /// has to check the system; here it maps to the legacy layout.
    pub fn for_flavor(flavor: ToolFlavor, config: &ToolConfig) -> Self {
        match flavor {
            ToolFlavor::Magick7 => Self::magick7(config),
            ToolFlavor::Legacy | ToolFlavor::Auto => Self::legacy(config),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    Center,
}

impl Gravity {
    fn as_str(self) -> &'static str {
        match self {
            Gravity::Center => "center",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
}

impl Color {
    fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
        }
    }
}

/// One operator in a convert pipeline, applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertStep {
    Resize(Geometry),
    Gravity(Gravity),
    Background(Color),
    Extent { width: u32, height: u32 },
}

impl ConvertStep {
    fn push_args(&self, args: &mut Vec<OsString>) {
        let (flag, value) = match self {
            ConvertStep::Resize(geometry) => ("-resize", geometry.to_string()),
            ConvertStep::Gravity(gravity) => ("-gravity", gravity.as_str().to_string()),
            ConvertStep::Background(color) => ("-background", color.as_str().to_string()),
            ConvertStep::Extent { width, height } => ("-extent", format!("{width}x{height}")),
        };
        args.push(flag.into());
        args.push(value.into());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MagickCommand {
    /// Read `source`, apply `steps`, strip metadata and write `output`.
    Convert {
        source: PathBuf,
        output: PathBuf,
        steps: Vec<ConvertStep>,
        quality: Quality,
    },
    /// Print the `WxH` size of `source`.
    Identify { source: PathBuf },
}

impl MagickCommand {
    /// Convert pipeline for a resize request.
    ///
    /// | Mode | Steps |
    /// |---|---|
    /// | scale | `-resize WxH!` |
    /// | fit | `-resize WxH` |
    /// | fit-pad | `-resize 300x300 -gravity center -background white -extent WxH` |
    /// | crop | `-gravity center -background white -extent WxH` |
    /// | scale-crop | `-resize WxH^ -gravity center -extent WxH` |
    pub fn resize(params: &ResizeParams) -> Self {
        let (w, h) = (params.width, params.height);
        let extent = ConvertStep::Extent {
            width: w,
            height: h,
        };
        let center = ConvertStep::Gravity(Gravity::Center);
        let white = ConvertStep::Background(Color::White);

        let steps = match params.mode {
            ResizeMode::Scale => vec![ConvertStep::Resize(Geometry::new(w, h, GeometryFlag::Exact))],
            ResizeMode::Fit => vec![ConvertStep::Resize(Geometry::new(w, h, GeometryFlag::Fit))],
            ResizeMode::FitPad => {
                let (box_w, box_h) = FIT_PAD_BOX;
                vec![
                    ConvertStep::Resize(Geometry::new(box_w, box_h, GeometryFlag::Fit)),
                    center,
                    white,
                    extent,
                ]
            }
            ResizeMode::Crop => vec![center, white, extent],
            ResizeMode::ScaleCrop => vec![
                ConvertStep::Resize(Geometry::new(w, h, GeometryFlag::Fill)),
                center,
                extent,
            ],
        };

        MagickCommand::Convert {
            source: params.source.clone(),
            output: params.output.clone(),
            steps,
            quality: params.quality,
        }
    }

    pub fn identify(source: &Path) -> Self {
        MagickCommand::Identify {
            source: source.to_path_buf(),
        }
    }

    /// Translate into the program and argument vector to execute.
    pub fn to_invocation(&self, tools: &ToolSet) -> Invocation {
        let program = match self {
            MagickCommand::Convert { .. } => &tools.convert,
            MagickCommand::Identify { .. } => &tools.identify,
        };
        let mut args: Vec<OsString> = program.leading_args.iter().map(OsString::from).collect();

        match self {
            MagickCommand::Convert {
                source,
                output,
                steps,
                quality,
            } => {
                args.push(path_arg(source));
                for step in steps {
                    step.push_args(&mut args);
                }
                args.push("-strip".into());
                args.push("-quality".into());
                args.push(quality.value().to_string().into());
                args.push(path_arg(output));
            }
            MagickCommand::Identify { source } => {
                args.push("-format".into());
                args.push(IDENTIFY_FORMAT.into());
                args.push(path_arg(source));
            }
        }

        Invocation {
            program: program.executable.clone(),
            args,
        }
    }
}

/// File name argument that ImageMagick cannot mistake for an option.
///
/// Relative paths starting with `-` get a `./` prefix; everything else is
/// passed unchanged.
fn path_arg(path: &Path) -> OsString {
    if path.as_os_str().as_encoded_bytes().first() == Some(&b'-') {
        Path::new(".").join(path).into_os_string()
    } else {
        path.as_os_str().to_os_string()
    }
}

/// A resolved program + argument vector, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Shell-style rendering, for logs and error messages only.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(OsStr::new(&self.program)))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(arg: &OsStr) -> String {
    let text = arg.to_string_lossy();
    let plain = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%!^".contains(c));
    if plain {
        text.into_owned()
    } else {
        format!("'{}'", text.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resize_args(width: u32, height: u32, mode: ResizeMode) -> Vec<String> {
        let params = ResizeParams {
            source: "src.jpg".into(),
            output: "dst.jpg".into(),
            width,
            height,
            mode,
            quality: Quality::for_target(width, height),
        };
        strings(&MagickCommand::resize(&params).to_invocation(&legacy()))
    }

    fn strings(inv: &Invocation) -> Vec<String> {
        inv.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn legacy() -> ToolSet {
        ToolSet::legacy(&ToolConfig::default())
    }

    #[test]
    fn convert_args_in_order() {
        let cmd = MagickCommand::Convert {
            source: "in.jpg".into(),
            output: "out.jpg".into(),
            steps: vec![
                ConvertStep::Resize(Geometry::new(220, 220, GeometryFlag::Fill)),
                ConvertStep::Gravity(Gravity::Center),
                ConvertStep::Extent {
                    width: 220,
                    height: 220,
                },
            ],
            quality: Quality::LOW,
        };
        let inv = cmd.to_invocation(&legacy());
        assert_eq!(inv.program, "convert");
        assert_eq!(
            strings(&inv),
            [
                "in.jpg", "-resize", "220x220^", "-gravity", "center", "-extent", "220x220",
                "-strip", "-quality", "91", "out.jpg"
            ]
        );
    }

    #[test]
    fn scale_forces_exact_size() {
        assert_eq!(
            resize_args(220, 220, ResizeMode::Scale),
            ["src.jpg", "-resize", "220x220!", "-strip", "-quality", "91", "dst.jpg"]
        );
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        assert_eq!(
            resize_args(600, 600, ResizeMode::Fit),
            ["src.jpg", "-resize", "600x600", "-strip", "-quality", "99", "dst.jpg"]
        );
    }

    #[test]
    fn fit_pad_resizes_into_fixed_box() {
        assert_eq!(
            resize_args(220, 180, ResizeMode::FitPad),
            [
                "src.jpg", "-resize", "300x300", "-gravity", "center", "-background", "white",
                "-extent", "220x180", "-strip", "-quality", "91", "dst.jpg"
            ]
        );
    }

    #[test]
    fn crop_extends_without_resizing() {
        let args = resize_args(400, 400, ResizeMode::Crop);
        assert_eq!(
            args,
            [
                "src.jpg", "-gravity", "center", "-background", "white", "-extent", "400x400",
                "-strip", "-quality", "99", "dst.jpg"
            ]
        );
        assert!(!args.iter().any(|a| a == "-resize"));
    }

    #[test]
    fn scale_crop_fills_then_trims() {
        assert_eq!(
            resize_args(220, 220, ResizeMode::ScaleCrop),
            [
                "src.jpg", "-resize", "220x220^", "-gravity", "center", "-extent", "220x220",
                "-strip", "-quality", "91", "dst.jpg"
            ]
        );
    }

    #[test]
    fn every_mode_strips_and_sets_quality() {
        for mode in ResizeMode::ALL {
            let args = resize_args(299, 301, mode);
            let n = args.len();
            assert_eq!(&args[n - 4..n - 1], ["-strip", "-quality", "99"], "{mode}");
        }
    }

    #[test]
    fn identify_args() {
        let cmd = MagickCommand::Identify {
            source: "photo.jpg".into(),
        };
        let inv = cmd.to_invocation(&legacy());
        assert_eq!(inv.program, "identify");
        assert_eq!(strings(&inv), ["-format", r"%[fx:w]x%[fx:h]\n", "photo.jpg"]);
    }

    #[test]
    fn magick7_identify_uses_subcommand() {
        let tools = ToolSet::magick7(&ToolConfig::default());
        let inv = MagickCommand::Identify {
            source: "a.png".into(),
        }
        .to_invocation(&tools);
        assert_eq!(inv.program, "magick");
        assert_eq!(strings(&inv)[0], "identify");
    }

    #[test]
    fn magick7_convert_has_no_subcommand() {
        let tools = ToolSet::magick7(&ToolConfig::default());
        let inv = MagickCommand::Convert {
            source: "a.png".into(),
            output: "b.png".into(),
            steps: vec![],
            quality: Quality::HIGH,
        }
        .to_invocation(&tools);
        assert_eq!(inv.program, "magick");
        assert_eq!(strings(&inv), ["a.png", "-strip", "-quality", "99", "b.png"]);
    }

    #[test]
    fn hostile_paths_stay_single_arguments() {
        let cmd = MagickCommand::Convert {
            source: "in.jpg; rm -rf ~".into(),
            output: "$(touch pwned).jpg".into(),
            steps: vec![],
            quality: Quality::LOW,
        };
        let args = strings(&cmd.to_invocation(&legacy()));
        assert_eq!(args.first().map(String::as_str), Some("in.jpg; rm -rf ~"));
        assert_eq!(args.last().map(String::as_str), Some("$(touch pwned).jpg"));
        assert_eq!(args.len(), 5);
    }

    #[test]
    fn dash_prefixed_paths_are_not_options() {
        let cmd = MagickCommand::Identify {
            source: "-write.jpg".into(),
        };
        let args = strings(&cmd.to_invocation(&legacy()));
        assert_eq!(args.last().map(String::as_str), Some("./-write.jpg"));
    }

    #[test]
    fn display_quotes_unsafe_arguments() {
        let inv = Invocation {
            program: "convert".into(),
            args: vec!["my photo.jpg".into(), "-resize".into(), "10x10!".into(), "it's.jpg".into()],
        };
        assert_eq!(
            inv.to_string(),
            r"convert 'my photo.jpg' -resize 10x10! 'it'\''s.jpg'"
        );
    }

    #[test]
    fn to_command_carries_program_and_args() {
        let inv = MagickCommand::Identify {
            source: "x.jpg".into(),
        }
        .to_invocation(&legacy());
        let cmd = inv.to_command();
        assert_eq!(cmd.get_program(), "identify");
        assert_eq!(cmd.get_args().count(), 3);
    }
}
