//! Sport label parsing.
//!
//! Registration forms record a sport as a single label, optionally suffixed
//! with a category parameter: `"Basketball - Men Team"` is the sport
//! `Basketball` with parameter `Men Team`.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fallback sport key for rules that apply to every sport unless overridden.
pub const DEFAULT_SPORT: &str = "default";

/// Form value meaning "no sport selected".
pub const SPORT_UNSELECTED: &str = "Unselected/NA";

/// Separator between a sport and its category parameter.
pub const PARAMETER_SEPARATOR: &str = " - ";

// ---------------------------------------------------------------------------
// SportLabel
// ---------------------------------------------------------------------------

/// A sport label split into its sport and optional category parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SportLabel<'a> {
    /// The full label as entered, e.g. `Basketball - Men Team`.
    pub label: &'a str,
    pub sport: &'a str,
    pub parameter: Option<&'a str>,
}

impl<'a> SportLabel<'a> {
    /// Parse a label, returning `None` for blank labels and the
    /// [`SPORT_UNSELECTED`] sentinel.
    pub fn parse(label: &'a str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() || label == SPORT_UNSELECTED {
            return None;
        }
        let (sport, parameter) = match label.split_once(PARAMETER_SEPARATOR) {
            Some((sport, parameter)) => (sport.trim(), Some(parameter.trim())),
            None => (label, None),
        };
        Some(Self {
            label,
            sport,
            parameter: parameter.filter(|p| !p.is_empty()),
        })
    }
}
