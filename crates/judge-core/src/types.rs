use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Arguments each side may submit after the initial verdict.
pub const ARGUMENT_BUDGET: u8 = 5;

// ── Parties ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::A, Side::B];

    pub fn as_str(self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }

    /// Side A files the claim, Side B answers it.
    pub fn role(self) -> &'static str {
        match self {
            Side::A => "Plaintiff",
            Side::B => "Defendant",
        }
    }

    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn parse(s: &str) -> Option<Side> {
        match s.trim() {
            "A" | "a" => Some(Side::A),
            "B" | "b" => Some(Side::B),
            _ => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    /// Name used when instructing the model which language to answer in.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
        }
    }

    pub fn parse(s: &str) -> Option<Language> {
        match s {
            "en" => Some(Language::En),
            "hi" => Some(Language::Hi),
            _ => None,
        }
    }
}

// ── Qualitative labels ───────────────────────────────────────────────────

/// Colour class a panel uses for a qualitative label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Favorable,
    Mixed,
    Unfavorable,
}

/// Which way, and how hard, a verdict leans.
///
/// The model is asked for one of the five canonical labels. Anything else is
/// kept verbatim in `Other` so a reply is never rejected for wording alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bias {
    Neutral,
    Slight(Side),
    Strong(Side),
    Other(String),
}

impl Bias {
    pub const LABELS: [&'static str; 5] = [
        "Neutral",
        "Slight lean towards Side A",
        "Slight lean towards Side B",
        "Strong lean towards Side A",
        "Strong lean towards Side B",
    ];

    pub fn label(&self) -> &str {
        match self {
            Bias::Neutral => Self::LABELS[0],
            Bias::Slight(Side::A) => Self::LABELS[1],
            Bias::Slight(Side::B) => Self::LABELS[2],
            Bias::Strong(Side::A) => Self::LABELS[3],
            Bias::Strong(Side::B) => Self::LABELS[4],
            Bias::Other(s) => s,
        }
    }

    pub fn parse(label: &str) -> Bias {
        let trimmed = label.trim();
        let canonical = Self::LABELS
            .iter()
            .position(|l| l.eq_ignore_ascii_case(trimmed));
        match canonical {
            Some(0) => Bias::Neutral,
            Some(1) => Bias::Slight(Side::A),
            Some(2) => Bias::Slight(Side::B),
            Some(3) => Bias::Strong(Side::A),
            Some(4) => Bias::Strong(Side::B),
            _ => Bias::Other(trimmed.to_string()),
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, Bias::Other(_))
    }

    pub fn tone(&self) -> Tone {
        let lower = self.label().to_lowercase();
        if lower.contains("neutral") {
            Tone::Favorable
        } else if lower.contains("slight") {
            Tone::Mixed
        } else {
            Tone::Unfavorable
        }
    }
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Bias {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Bias {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Bias::parse(&raw))
    }
}

/// Overall strength the judge assigns to a single argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
    Other(String),
}

impl Strength {
    pub fn label(&self) -> &str {
        match self {
            Strength::Weak => "Weak",
            Strength::Medium => "Medium",
            Strength::Strong => "Strong",
            Strength::Other(s) => s,
        }
    }

    pub fn parse(label: &str) -> Strength {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "weak" => Strength::Weak,
            "medium" => Strength::Medium,
            "strong" => Strength::Strong,
            _ => Strength::Other(trimmed.to_string()),
        }
    }

    pub fn tone(&self) -> Tone {
        let lower = self.label().to_lowercase();
        if lower.contains("strong") {
            Tone::Favorable
        } else if lower.contains("medium") {
            Tone::Mixed
        } else {
            Tone::Unfavorable
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Strength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Strength {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Strength::parse(&raw))
    }
}

// ── Verdict ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Precedent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub relevance: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strengths {
    #[serde(default)]
    pub side_a: Vec<String>,
    #[serde(default)]
    pub side_b: Vec<String>,
}

impl Strengths {
    pub fn for_side(&self, side: Side) -> &[String] {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(default)]
    pub agreements: Vec<String>,
    #[serde(default)]
    pub contradictions: Vec<String>,
    #[serde(default)]
    pub strengths: Strengths,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentScores {
    /// 1-10.
    #[serde(deserialize_with = "de_score")]
    pub clarity: u8,
    /// 1-10.
    #[serde(deserialize_with = "de_score")]
    pub evidence: u8,
    pub strength: Strength,
}

/// Structured result of one judge invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub reasoning: String,
    pub verdict: String,
    /// 0-100.
    #[serde(deserialize_with = "de_percent")]
    pub confidence: u8,
    pub bias: Bias,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precedents: Option<Vec<Precedent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
    /// Only present on verdicts produced by an argument round.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_scores: Option<ArgumentScores>,
    /// What changed since the previous verdict, on argument rounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_note: Option<String>,
}

impl Verdict {
    /// Precedents to render; absent and empty are the same thing to a panel.
    pub fn precedents(&self) -> &[Precedent] {
        self.precedents.as_deref().unwrap_or_default()
    }
}

fn number_from_json<E: de::Error>(v: &serde_json::Value) -> Result<f64, E> {
    match v {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| E::custom("number out of range")),
        serde_json::Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .map_err(|_| E::custom(format!("expected a number, got {s:?}"))),
        other => Err(E::custom(format!("expected a number, got {other}"))),
    }
}

fn de_percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    let n = number_from_json::<D::Error>(&raw)?;
    Ok(n.round().clamp(0.0, 100.0) as u8)
}

fn de_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    let n = number_from_json::<D::Error>(&raw)?;
    Ok(n.round().clamp(1.0, 10.0) as u8)
}

// ── Timeline ─────────────────────────────────────────────────────────────

/// One appended verdict. Round 0 is the initial verdict; rounds 1..=5 are the
/// submitting side's own argument count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub round: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    pub verdict: Verdict,
    pub timestamp: DateTime<Utc>,
}

impl TimelineEntry {
    pub fn label(&self) -> String {
        match (self.round, self.side) {
            (0, _) => "Initial".to_string(),
            (n, Some(side)) => format!("Round {n} (Side {side})"),
            (n, None) => format!("Round {n}"),
        }
    }
}
