//! Static lookup tables.
//!
//! A value missing from a table is not an error: brackets default to zero and
//! statuses to a neutral color.

use serde::Serialize;

/// Label for leads without a tag.
pub const MISSING_TAG: &str = "Sem tag";
/// Label for leads without an expertise.
pub const MISSING_EXPERTISE: &str = "Não informado";
/// Label for leads without a status.
pub const MISSING_STATUS: &str = "Sem status";
/// Name reported for best/worst/top when there is nothing to rank.
pub const NO_RANKING: &str = "N/A";

/// Representative value of each potential bracket, in BRL.
///
/// Both capitalizations appear in the source data.
const POTENTIAL_VALUES: &[(&str, u64)] = &[
    ("Até 50k", 25_000),
    ("até 50k", 25_000),
    ("Até 100k", 75_000),
    ("até 100k", 75_000),
    ("Até 200k", 150_000),
    ("até 200k", 150_000),
    ("+500k", 750_000),
];

/// Brackets counted as high potential for the "tag with most potential" insight.
const HIGH_POTENTIAL: &[&str] = &["Até 200k", "até 200k", "+500k"];

/// Monetary value of a potential bracket, if it is mapped.
pub fn potential_value(bracket: &str) -> Option<u64> {
    POTENTIAL_VALUES
        .iter()
        .find(|(label, _)| *label == bracket)
        .map(|(_, value)| *value)
}

/// True for brackets of 150k and above.
pub fn is_high_potential(bracket: &str) -> bool {
    HIGH_POTENTIAL.contains(&bracket)
}

/// An sRGB display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS-style hex notation, e.g. `#22c55e`.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color for statuses not in [`STATUS_COLORS`].
pub const NEUTRAL_STATUS_COLOR: Rgb = Rgb::new(148, 163, 184);

/// Display color of each known status.
const STATUS_COLORS: &[(&str, Rgb)] = &[
    ("Novo", Rgb::new(59, 130, 246)),
    ("Em contato", Rgb::new(234, 179, 8)),
    ("Em negociação", Rgb::new(249, 115, 22)),
    ("Qualificado", Rgb::new(168, 85, 247)),
    ("Convertido", Rgb::new(34, 197, 94)),
    ("Perdido", Rgb::new(239, 68, 68)),
    ("Sem resposta", Rgb::new(100, 116, 139)),
];

/// Display color of a status, falling back to [`NEUTRAL_STATUS_COLOR`].
pub fn status_color(status: &str) -> Rgb {
    STATUS_COLORS
        .iter()
        .find(|(label, _)| *label == status)
        .map(|(_, color)| *color)
        .unwrap_or(NEUTRAL_STATUS_COLOR)
}
