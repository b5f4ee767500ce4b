//! Command line parsing
//!
//! ```text
//! usage: niioverlay [-h] [-r] b m t o
//! ```
//!
//! `-r` may appear anywhere among the positionals. Negative thresholds are
//! accepted as values, with or without a preceding `--`.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueHint};

use crate::composite::OverlayOptions;

pub const PROGRAM: &str = "niioverlay";

/// Arguments of an overlay run
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(
    name = PROGRAM,
    version,
    about,
    override_usage = "niioverlay [-h] [-r] b m t o",
    help_template = "{usage-heading} {usage}\n\n{about-with-newline}\n{all-args}{after-help}",
    allow_negative_numbers = true
)]
pub struct Args {
    /// base image
    #[arg(value_name = "b", value_hint = ValueHint::FilePath)]
    pub base: PathBuf,

    /// map image
    #[arg(value_name = "m", value_hint = ValueHint::FilePath)]
    pub map: PathBuf,

    /// intensity threshold for map
    #[arg(value_name = "t")]
    pub threshold: f64,

    /// output image
    #[arg(value_name = "o", value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// set the rescale slope and intercept such that the voxel intensities
    /// are scaled back to their original values when displayed
    #[arg(short = 'r')]
    pub rescale_for_display: bool,
}

impl Args {
    pub fn overlay_options(&self) -> OverlayOptions {
        OverlayOptions::new(self.threshold).with_rescale_for_display(self.rescale_for_display)
    }
}

/// Parse a full argument list, program name first
pub fn parse_args<I, T>(args: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(args)
}

/// Write the full help text to stdout
pub fn print_help() -> std::io::Result<()> {
    Args::command().print_help()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(tokens: &[&str]) -> Result<Args, clap::Error> {
        parse_args(std::iter::once(PROGRAM).chain(tokens.iter().copied()))
    }

    fn error_kind(tokens: &[&str]) -> ErrorKind {
        match parse(tokens) {
            Ok(args) => panic!("expected a parse error, got {:?}", args),
            Err(e) => e.kind(),
        }
    }

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(error_kind(&["-h"]), ErrorKind::DisplayHelp);
        assert_eq!(error_kind(&["--help"]), ErrorKind::DisplayHelp);
        assert_eq!(error_kind(&["base", "--help"]), ErrorKind::DisplayHelp);
        assert_eq!(error_kind(&["--version"]), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_help_starts_with_usage() {
        let help = Args::command().render_help().to_string();
        assert!(help.starts_with("Usage: niioverlay [-h] [-r] b m t o"), "{}", help);
        assert!(help.contains("intensity threshold for map"));
    }

    #[test]
    fn test_positionals() {
        let args = parse(&["base.nii.gz", "map.nii.gz", "3", "out.nii.gz"]).unwrap();
        assert_eq!(args.base, PathBuf::from("base.nii.gz"));
        assert_eq!(args.map, PathBuf::from("map.nii.gz"));
        assert_eq!(args.threshold, 3.0);
        assert_eq!(args.output, PathBuf::from("out.nii.gz"));
        assert!(!args.rescale_for_display);
    }

    #[test]
    fn test_rescale_flag_anywhere() {
        assert!(parse(&["-r", "b", "m", "1", "o"]).unwrap().rescale_for_display);
        assert!(parse(&["b", "m", "1", "o", "-r"]).unwrap().rescale_for_display);
        assert!(parse(&["b", "m", "-r", "1", "o"]).unwrap().rescale_for_display);
    }

    #[test]
    fn test_negative_threshold() {
        assert_eq!(parse(&["b", "m", "-1.5", "o"]).unwrap().threshold, -1.5);
        assert_eq!(parse(&["b", "m", "--", "-2", "o"]).unwrap().threshold, -2.0);
    }

    #[test]
    fn test_unknown_option() {
        assert_eq!(error_kind(&["-x", "b", "m", "1", "o"]), ErrorKind::UnknownArgument);
        assert_eq!(error_kind(&["b", "m", "1", "o", "--fast"]), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_missing_arguments() {
        assert_eq!(error_kind(&["base", "map"]), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_extra_arguments() {
        assert_eq!(error_kind(&["b", "m", "1", "o", "extra"]), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_invalid_threshold() {
        assert_eq!(error_kind(&["b", "m", "high", "o"]), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_overlay_options() {
        let options = parse(&["b", "m", "2.5", "o", "-r"]).unwrap().overlay_options();
        assert_eq!(options.threshold, 2.5);
        assert!(options.rescale_for_display);
    }
}
