//! Non-fatal diagnostics
//!
//! Warnings record lossy or forced decisions the pipeline made while still
//! producing output. They accumulate on the compilation result and are
//! additionally emitted through `log::warn!` at the point of occurrence;
//! they never stop processing.

use std::fmt;

/// What went sideways.
#[derive(Debug, Clone, PartialEq)]
pub enum WarningKind {
    /// A tile's colors could not merge losslessly into any bank; the listed
    /// number of colors were remapped to their nearest surviving entries.
    LossyBankMerge {
        bank: u8,
        dropped: usize,
        error: f64,
    },
    /// The tile-count ceiling was exceeded under a force override.
    TileCeiling { limit: usize, got: usize },
    /// The combined distinct-color precheck failed under a force override.
    CombinedColors { limit: usize, got: usize },
    /// A sprite could not be placed in the sheet under a force override;
    /// dimensions are in tile units.
    SpriteUnplaced { width: u32, height: u32 },
}

/// A recorded warning, optionally tied to a named source image.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub image: Option<String>,
    pub kind: WarningKind,
}

impl Warning {
    /// Warning without a source image.
    pub fn new(kind: WarningKind) -> Self {
        Self { image: None, kind }
    }

    /// Warning attributed to a named source image.
    pub fn for_image(image: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            image: Some(image.into()),
            kind,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(image) = &self.image {
            write!(f, "{image}: ")?;
        }
        match &self.kind {
            WarningKind::LossyBankMerge {
                bank,
                dropped,
                error,
            } => write!(
                f,
                "lossy merge into bank {bank}: {dropped} colors remapped (error {error:.2})"
            ),
            WarningKind::TileCeiling { limit, got } => {
                write!(f, "tile count {got} exceeds ceiling {limit}, continuing under force")
            }
            WarningKind::CombinedColors { limit, got } => {
                write!(
                    f,
                    "{got} distinct colors exceed the {limit}-color budget, continuing under force"
                )
            }
            WarningKind::SpriteUnplaced { width, height } => {
                write!(f, "no room to place {width}x{height}-tile sprite, skipped under force")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_image_name() {
        let w = Warning::for_image(
            "title.png",
            WarningKind::TileCeiling {
                limit: 1024,
                got: 1100,
            },
        );
        let text = w.to_string();
        assert!(text.starts_with("title.png: "));
        assert!(text.contains("1100"));
        assert!(text.contains("1024"));
    }

    #[test]
    fn test_display_without_image() {
        let w = Warning::new(WarningKind::SpriteUnplaced {
            width: 4,
            height: 4,
        });
        assert!(w.to_string().starts_with("no room"));
    }
}
