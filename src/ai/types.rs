//! Data types shared by the prompt builder and the response interpreter

use serde::{Deserialize, Serialize};

/// Tone of the generated replies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Assertive,
    Neutral,
}

impl Tone {
    pub const ALL: [Tone; 4] = [
        Tone::Professional,
        Tone::Friendly,
        Tone::Assertive,
        Tone::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Friendly => "Friendly",
            Tone::Assertive => "Assertive",
            Tone::Neutral => "Neutral",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

/// Formality level of the generated replies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Formality {
    VeryFormal,
    #[default]
    Formal,
    Neutral,
    Informal,
}

impl Formality {
    pub const ALL: [Formality; 4] = [
        Formality::VeryFormal,
        Formality::Formal,
        Formality::Neutral,
        Formality::Informal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Formality::VeryFormal => "Very formal",
            Formality::Formal => "Formal",
            Formality::Neutral => "Neutral",
            Formality::Informal => "Informal",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

/// Target length of the generated replies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ReplyLength {
    pub const ALL: [ReplyLength; 3] = [ReplyLength::Short, ReplyLength::Medium, ReplyLength::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyLength::Short => "Short",
            ReplyLength::Medium => "Medium",
            ReplyLength::Long => "Long",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, step: isize) -> T {
    let len = all.len() as isize;
    let idx = all.iter().position(|v| *v == current).unwrap_or(0) as isize;
    all[((idx + step + len) % len) as usize]
}

/// Reply generation preferences, immutable for the duration of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyPreferences {
    pub tone: Tone,
    pub formality: Formality,
    pub length: ReplyLength,
    /// Number of reply drafts to request, always within [1, 3]
    pub option_count: u8,
}

impl Default for ReplyPreferences {
    fn default() -> Self {
        Self {
            tone: Tone::default(),
            formality: Formality::default(),
            length: ReplyLength::default(),
            option_count: 1,
        }
    }
}

impl ReplyPreferences {
    pub const MIN_OPTIONS: u8 = 1;
    pub const MAX_OPTIONS: u8 = 3;

    /// Set the option count, clamped to the allowed range
    pub fn set_option_count(&mut self, count: u8) {
        self.option_count = count.clamp(Self::MIN_OPTIONS, Self::MAX_OPTIONS);
    }

    pub fn more_options(&mut self) {
        self.set_option_count(self.option_count.saturating_add(1));
    }

    pub fn fewer_options(&mut self) {
        self.set_option_count(self.option_count.saturating_sub(1));
    }
}

/// One candidate reply draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyOption {
    /// Suggested subject line, may be empty
    #[serde(default)]
    pub subject: String,
    /// Reply body. A reply object without a body is treated as malformed.
    pub body: String,
}

fn not_available() -> String {
    "N/A".to_string()
}

/// Structured analysis of one email plus the generated reply drafts.
///
/// Classification fields are plain strings on the wire: the closed
/// vocabularies (low/medium/high, positive/neutral/negative/mixed) are a
/// contract on the model, and a missing field degrades to "N/A" instead of
/// failing the whole parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default = "not_available")]
    pub language: String,
    #[serde(default = "not_available")]
    pub urgency: String,
    #[serde(default = "not_available")]
    pub sentiment: String,
    #[serde(default = "not_available")]
    pub category: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub replies: Vec<ReplyOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_count_clamped() {
        let mut prefs = ReplyPreferences::default();
        prefs.set_option_count(0);
        assert_eq!(prefs.option_count, 1);
        prefs.set_option_count(7);
        assert_eq!(prefs.option_count, 3);
        prefs.set_option_count(2);
        assert_eq!(prefs.option_count, 2);
    }

    #[test]
    fn test_option_count_stepping_saturates() {
        let mut prefs = ReplyPreferences::default();
        prefs.fewer_options();
        assert_eq!(prefs.option_count, 1);
        prefs.more_options();
        prefs.more_options();
        prefs.more_options();
        assert_eq!(prefs.option_count, 3);
    }

    #[test]
    fn test_selector_cycling_wraps() {
        assert_eq!(Tone::Neutral.next(), Tone::Professional);
        assert_eq!(Tone::Professional.prev(), Tone::Neutral);
        assert_eq!(Formality::Informal.next(), Formality::VeryFormal);
        assert_eq!(ReplyLength::Short.prev(), ReplyLength::Long);
    }

    #[test]
    fn test_selector_cycle_covers_all_variants() {
        let mut tone = Tone::default();
        let mut seen = Vec::new();
        for _ in 0..Tone::ALL.len() {
            seen.push(tone);
            tone = tone.next();
        }
        assert_eq!(seen, Tone::ALL);
    }
}
