//! Rendering output options: curve style and artifact format.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::ValueError;

/// Edge bending style passed to the layout engine as `splines`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CurveStyle {
    /// Orthogonal segments (the default).
    #[default]
    Ortho,
    /// Curved splines.
    Curved,
}

impl CurveStyle {
    /// Returns the `splines` value for this style.
    pub fn as_str(self) -> &'static str {
        match self {
            CurveStyle::Ortho => "ortho",
            CurveStyle::Curved => "curved",
        }
    }
}

impl FromStr for CurveStyle {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ortho" => Ok(CurveStyle::Ortho),
            "curved" => Ok(CurveStyle::Curved),
            _ => Err(ValueError::InvalidCurveStyle(s.to_string())),
        }
    }
}

impl Display for CurveStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Artifact format produced by the layout engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Portable Network Graphics (the default).
    #[default]
    Png,
    /// JPEG.
    Jpg,
    /// Scalable Vector Graphics.
    Svg,
    /// Portable Document Format.
    Pdf,
}

impl OutputFormat {
    /// Returns the file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" => Ok(OutputFormat::Jpg),
            "svg" => Ok(OutputFormat::Svg),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(ValueError::InvalidOutputFormat(s.to_string())),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}
