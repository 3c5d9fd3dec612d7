//! Terminal capability detection and render style selection.

use crossterm::tty::IsTty;
use std::env;

use crate::cli::{ColorChoice, PaletteChoice};
use crate::render::RenderError;

/// Colors a terminal can display, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColorSupport {
    None,
    Basic8,
    Basic16,
    Ansi256,
    TrueColor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub is_tty: bool,
    pub colors: ColorSupport,
    pub unicode: bool,
    /// `TERM` as seen at startup, for error messages.
    pub term: Option<String>,
}

/// Palettes the renderer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKind {
    Basic8,
    Basic16,
    Ansi256,
}

impl PaletteKind {
    fn required(&self) -> ColorSupport {
        match self {
            PaletteKind::Basic8 => ColorSupport::Basic8,
            PaletteKind::Basic16 => ColorSupport::Basic16,
            PaletteKind::Ansi256 => ColorSupport::Ansi256,
        }
    }

    fn best_for(colors: ColorSupport) -> Option<PaletteKind> {
        match colors {
            ColorSupport::None => None,
            ColorSupport::Basic8 => Some(PaletteKind::Basic8),
            ColorSupport::Basic16 => Some(PaletteKind::Basic16),
            ColorSupport::Ansi256 | ColorSupport::TrueColor => Some(PaletteKind::Ansi256),
        }
    }

    fn flag(&self) -> &'static str {
        match self {
            PaletteKind::Basic8 => "8",
            PaletteKind::Basic16 => "16",
            PaletteKind::Ansi256 => "256",
        }
    }
}

/// How the text renderer should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    /// `None` draws without any escape sequences.
    pub palette: Option<PaletteKind>,
    pub unicode: bool,
    pub newest_first: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        Self::from_env(std::io::stdout().is_tty(), |key| env::var(key).ok())
    }

    pub fn from_env(is_tty: bool, var: impl Fn(&str) -> Option<String>) -> Self {
        let term = var("TERM").filter(|t| !t.is_empty());
        let no_color = var("NO_COLOR").is_some_and(|v| !v.is_empty());
        let colorterm = var("COLORTERM").unwrap_or_default().to_ascii_lowercase();

        let colors = match term.as_deref() {
            _ if no_color => ColorSupport::None,
            None | Some("dumb") => ColorSupport::None,
            _ if colorterm == "truecolor" || colorterm == "24bit" => ColorSupport::TrueColor,
            Some(t) if t.contains("256color") => ColorSupport::Ansi256,
            Some(t) if t.contains("16color") => ColorSupport::Basic16,
            Some(_) => ColorSupport::Basic8,
        };

        let unicode = ["LC_ALL", "LC_CTYPE", "LANG"]
            .iter()
            .find_map(|key| var(key).filter(|v| !v.is_empty()))
            .map(|locale| {
                let locale = locale.to_ascii_lowercase();
                locale.contains("utf-8") || locale.contains("utf8")
            })
            .unwrap_or(false);

        Self {
            is_tty,
            colors,
            unicode,
            term,
        }
    }
}

/// Picks the render style for a terminal and the user's flags.
///
/// An explicit palette richer than an interactive terminal supports is an
/// error rather than garbled output.
pub fn choose_style(
    caps: &Capabilities,
    color: ColorChoice,
    palette: PaletteChoice,
    ascii: bool,
    oldest_first: bool,
) -> Result<RenderStyle, RenderError> {
    let requested = match palette {
        PaletteChoice::Auto => None,
        PaletteChoice::Basic8 => Some(PaletteKind::Basic8),
        PaletteChoice::Basic16 => Some(PaletteKind::Basic16),
        PaletteChoice::Ansi256 => Some(PaletteKind::Ansi256),
    };

    let palette = match color {
        ColorChoice::Never => None,
        ColorChoice::Always => requested
            .or_else(|| PaletteKind::best_for(caps.colors))
            .or(Some(PaletteKind::Ansi256)),
        ColorChoice::Auto if !caps.is_tty => None,
        ColorChoice::Auto => match requested {
            Some(kind) if kind.required() > caps.colors => {
                return Err(RenderError::UnsupportedTerminal {
                    detail: format!(
                        "terminal '{}' cannot show the {}-color palette",
                        caps.term.as_deref().unwrap_or("unknown"),
                        kind.flag()
                    ),
                    hint: match PaletteKind::best_for(caps.colors) {
                        Some(best) => format!("rerun with --palette {}", best.flag()),
                        None => "rerun with --color never, or set TERM".to_string(),
                    },
                });
            }
            Some(kind) => Some(kind),
            None => PaletteKind::best_for(caps.colors),
        },
    };

    Ok(RenderStyle {
        palette,
        unicode: caps.unicode && !ascii,
        newest_first: !oldest_first,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn caps(is_tty: bool, vars: &[(&str, &str)]) -> Capabilities {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Capabilities::from_env(is_tty, |key| vars.get(key).cloned())
    }

    #[test]
    fn detects_color_depth() {
        assert_eq!(caps(true, &[("TERM", "xterm-256color")]).colors, ColorSupport::Ansi256);
        assert_eq!(
            caps(true, &[("TERM", "xterm"), ("COLORTERM", "truecolor")]).colors,
            ColorSupport::TrueColor
        );
        assert_eq!(caps(true, &[("TERM", "xterm")]).colors, ColorSupport::Basic8);
        assert_eq!(caps(true, &[("TERM", "dumb")]).colors, ColorSupport::None);
        assert_eq!(caps(true, &[]).colors, ColorSupport::None);
        assert_eq!(
            caps(true, &[("TERM", "xterm-256color"), ("NO_COLOR", "1")]).colors,
            ColorSupport::None
        );
    }

    #[test]
    fn detects_unicode_from_locale() {
        assert!(caps(true, &[("LANG", "en_US.UTF-8")]).unicode);
        assert!(caps(true, &[("LC_ALL", "C.utf8"), ("LANG", "C")]).unicode);
        assert!(!caps(true, &[("LC_ALL", "C"), ("LANG", "en_US.UTF-8")]).unicode);
        assert!(!caps(true, &[]).unicode);
    }

    #[test]
    fn auto_picks_richest_palette_on_tty() {
        let c = caps(true, &[("TERM", "xterm-256color"), ("LANG", "en_US.UTF-8")]);
        let style = choose_style(&c, ColorChoice::Auto, PaletteChoice::Auto, false, false).unwrap();
        assert_eq!(style.palette, Some(PaletteKind::Ansi256));
        assert!(style.unicode);
        assert!(style.newest_first);
    }

    #[test]
    fn pipes_get_plain_output() {
        let c = caps(false, &[("TERM", "xterm-256color")]);
        let style = choose_style(&c, ColorChoice::Auto, PaletteChoice::Ansi256, false, true).unwrap();
        assert_eq!(style.palette, None);
        assert!(!style.newest_first);
    }

    #[test]
    fn too_rich_palette_is_unsupported() {
        let c = caps(true, &[("TERM", "xterm")]);
        let err = choose_style(&c, ColorChoice::Auto, PaletteChoice::Ansi256, false, false)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("xterm"), "{message}");
        assert!(message.contains("--palette 8"), "{message}");
    }

    #[test]
    fn always_forces_color_and_ascii_overrides_unicode() {
        let c = caps(false, &[("LANG", "en_US.UTF-8")]);
        let style = choose_style(&c, ColorChoice::Always, PaletteChoice::Auto, true, false).unwrap();
        assert_eq!(style.palette, Some(PaletteKind::Ansi256));
        assert!(!style.unicode);

        let never = choose_style(&c, ColorChoice::Never, PaletteChoice::Ansi256, false, false)
            .unwrap();
        assert_eq!(never.palette, None);
    }
}
