//! Moral alignment reported by the Story Service.

use std::fmt;

/// Coarse classification of the player's choices.
///
/// The service may report any label; the five it is known to emit get
/// their own variants and anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum MoralAlignment {
    Good,
    MostlyGood,
    #[default]
    Neutral,
    MostlyEvil,
    Evil,
    Other(String),
}

impl MoralAlignment {
    /// Interpret a service label. Case and separators are ignored.
    pub fn parse(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "good" => MoralAlignment::Good,
            "mostly_good" => MoralAlignment::MostlyGood,
            "neutral" => MoralAlignment::Neutral,
            "mostly_evil" => MoralAlignment::MostlyEvil,
            "evil" => MoralAlignment::Evil,
            _ => MoralAlignment::Other(label.trim().to_string()),
        }
    }

    /// Wire label sent back to the service.
    pub fn label(&self) -> &str {
        match self {
            MoralAlignment::Good => "good",
            MoralAlignment::MostlyGood => "mostly_good",
            MoralAlignment::Neutral => "neutral",
            MoralAlignment::MostlyEvil => "mostly_evil",
            MoralAlignment::Evil => "evil",
            MoralAlignment::Other(label) => label,
        }
    }

    /// Position on the meter, 0.0 = "Virtuous" through 1.0 = "Dark".
    pub fn meter_position(&self) -> f32 {
        match self {
            MoralAlignment::Good => 0.0,
            MoralAlignment::MostlyGood => 0.25,
            MoralAlignment::Neutral | MoralAlignment::Other(_) => 0.5,
            MoralAlignment::MostlyEvil => 0.75,
            MoralAlignment::Evil => 1.0,
        }
    }

    /// Human-readable name for the character path.
    pub fn display_name(&self) -> &str {
        match self {
            MoralAlignment::Good => "Virtuous",
            MoralAlignment::MostlyGood => "Mostly Virtuous",
            MoralAlignment::Neutral => "Neutral",
            MoralAlignment::MostlyEvil => "Mostly Dark",
            MoralAlignment::Evil => "Dark",
            MoralAlignment::Other(label) => label,
        }
    }
}

impl fmt::Display for MoralAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
