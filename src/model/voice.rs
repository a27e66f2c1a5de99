//! Supported locales, voices, and speaking rate.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A locale the narrator can speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English (en-US voices)
    #[default]
    English,
    /// Hebrew (he-IL voices)
    Hebrew,
}

impl Locale {
    /// Every supported locale, in preference order.
    pub const ALL: [Locale; 2] = [Locale::Hebrew, Locale::English];

    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Hebrew => "he",
        }
    }

    /// ISO 639-2/T code, as used by OCR language packs.
    pub fn code3(self) -> &'static str {
        match self {
            Locale::English => "eng",
            Locale::Hebrew => "heb",
        }
    }

    /// English name of the language.
    pub fn name(self) -> &'static str {
        match self {
            Locale::English => "English",
            Locale::Hebrew => "Hebrew",
        }
    }

    /// Resolve a detector or user supplied code, including known aliases.
    ///
    /// Hebrew is still reported as the withdrawn `iw` code by some
    /// detectors. Region suffixes (`en-US`, `he_IL`) are ignored.
    pub fn from_code(code: &str) -> Option<Locale> {
        let code = code.trim().to_ascii_lowercase();
        let primary = code.split(['-', '_']).next().unwrap_or_default();
        match primary {
            "en" | "eng" | "english" => Some(Locale::English),
            "he" | "iw" | "heb" | "hebrew" => Some(Locale::Hebrew),
            _ => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Locale::from_code(s).ok_or_else(|| Error::Other(format!("Unsupported locale: {}", s)))
    }
}

/// Voice gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Female voice
    #[default]
    Female,
    /// Male voice
    Male,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Female => f.write_str("Female"),
            Gender::Male => f.write_str("Male"),
        }
    }
}

/// A (locale, gender) pair that names exactly one TTS voice.
///
/// Every combination is valid, so there is no lookup failure to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Spoken locale
    pub locale: Locale,
    /// Voice gender
    pub gender: Gender,
}

impl VoiceProfile {
    /// Create a voice profile.
    pub const fn new(locale: Locale, gender: Gender) -> Self {
        Self { locale, gender }
    }

    /// Neural voice identifier understood by the speech service.
    pub const fn voice_id(&self) -> &'static str {
        match (self.locale, self.gender) {
            (Locale::English, Gender::Female) => "en-US-EmmaNeural",
            (Locale::English, Gender::Male) => "en-US-GuyNeural",
            (Locale::Hebrew, Gender::Female) => "he-IL-HilaNeural",
            (Locale::Hebrew, Gender::Male) => "he-IL-AvriNeural",
        }
    }

    /// Every voice in the table.
    pub fn all() -> impl Iterator<Item = VoiceProfile> {
        Locale::ALL.into_iter().flat_map(|locale| {
            [Gender::Female, Gender::Male]
                .into_iter()
                .map(move |gender| VoiceProfile::new(locale, gender))
        })
    }
}

impl fmt::Display for VoiceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.voice_id())
    }
}

fn rate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[+-]\d{1,3}%$").expect("rate pattern is valid"))
}

/// Speaking-rate adjustment as a signed percentage, e.g. `+10%` or `-25%`.
///
/// Only the syntax is checked here; the speech service decides which values
/// it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpeechRate(String);

impl SpeechRate {
    /// Parse a `±N%` string.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if rate_pattern().is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(Error::InvalidRate(s.to_string()))
        }
    }

    /// Build from a whole percentage, always carrying a sign.
    pub fn from_percent(percent: i32) -> Self {
        Self(format!("{:+}%", percent))
    }

    /// Get the rate string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SpeechRate {
    fn default() -> Self {
        Self::from_percent(0)
    }
}

impl fmt::Display for SpeechRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SpeechRate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SpeechRate::parse(s)
    }
}

impl TryFrom<String> for SpeechRate {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        SpeechRate::parse(&s)
    }
}

impl From<SpeechRate> for String {
    fn from(rate: SpeechRate) -> Self {
        rate.0
    }
}
