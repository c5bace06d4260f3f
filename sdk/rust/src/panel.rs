//! Plain-text rendering of a case: one panel per lawyer, the judge's panel
//! with the current verdict, and the verdict timeline.
//!
//! Optional verdict sections that are absent are skipped, never shown empty.

use std::fmt::Write;

use judge_core::{
    ArgumentScores, CaseSnapshot, Comparison, Language, Precedent, Side, TimelineEntry, Tone,
    Verdict,
};

fn t(language: Language, en: &'static str, hi: &'static str) -> &'static str {
    match language {
        Language::En => en,
        Language::Hi => hi,
    }
}

/// Marker printed before a toned label.
pub fn tone_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Favorable => "[+]",
        Tone::Mixed => "[~]",
        Tone::Unfavorable => "[!]",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Locked,
    Loaded,
    Waiting,
}

pub fn upload_status(snapshot: &CaseSnapshot, side: Side) -> UploadStatus {
    let doc = match side {
        Side::A => &snapshot.side_a_docs,
        Side::B => &snapshot.side_b_docs,
    };
    if snapshot.locked {
        UploadStatus::Locked
    } else if !doc.trim().is_empty() {
        UploadStatus::Loaded
    } else {
        UploadStatus::Waiting
    }
}

fn arguments_left(snapshot: &CaseSnapshot, side: Side) -> u8 {
    match side {
        Side::A => snapshot.arguments_left_a,
        Side::B => snapshot.arguments_left_b,
    }
}

pub fn lawyer_panel(snapshot: &CaseSnapshot, side: Side) -> String {
    let lang = snapshot.language;
    let mut out = String::new();
    let role = match side {
        Side::A => t(lang, "Plaintiff", "वादी"),
        Side::B => t(lang, "Defendant", "प्रतिवादी"),
    };
    let _ = writeln!(out, "== {} {side}: {role} ==", t(lang, "Side", "पक्ष"));

    let status = match upload_status(snapshot, side) {
        UploadStatus::Locked => t(lang, "Document locked for this case", "इस मामले के लिए दस्तावेज़ लॉक है"),
        UploadStatus::Loaded => t(lang, "Document loaded", "दस्तावेज़ लोड किया गया"),
        UploadStatus::Waiting => t(lang, "Waiting for document", "दस्तावेज़ की प्रतीक्षा"),
    };
    let _ = writeln!(out, "{status}");

    if snapshot.locked {
        match arguments_left(snapshot, side) {
            0 => {
                let _ = writeln!(out, "{}", t(lang, "No arguments left", "कोई तर्क शेष नहीं"));
            },
            n => {
                let _ = writeln!(out, "{} {n}", t(lang, "Arguments left:", "शेष तर्क:"));
            },
        }
    }
    out
}

fn scores_section(out: &mut String, lang: Language, scores: &ArgumentScores) {
    let _ = writeln!(out, "\n{}", t(lang, "Argument scores", "तर्क अंक"));
    let _ = writeln!(out, "  {}: {}/10", t(lang, "Clarity", "स्पष्टता"), scores.clarity);
    let _ = writeln!(out, "  {}: {}/10", t(lang, "Evidence", "साक्ष्य"), scores.evidence);
    let _ = writeln!(
        out,
        "  {}: {} {}",
        t(lang, "Strength", "शक्ति"),
        tone_marker(scores.strength.tone()),
        scores.strength
    );
}

fn list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "  {title}:");
    for item in items {
        let _ = writeln!(out, "    - {item}");
    }
}

fn comparison_section(out: &mut String, lang: Language, c: &Comparison) {
    let _ = writeln!(out, "\n{}", t(lang, "Comparison", "तुलना"));
    list(out, t(lang, "Agreements", "सहमति"), &c.agreements);
    list(out, t(lang, "Contradictions", "विरोधाभास"), &c.contradictions);
    for side in Side::ALL {
        let title = format!("{} {side}", t(lang, "Strengths of Side", "पक्ष की ताकत"));
        list(out, &title, c.strengths.for_side(side));
    }
}

fn precedents_section(out: &mut String, lang: Language, precedents: &[Precedent]) {
    if precedents.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}", t(lang, "Precedents", "मिसालें"));
    for p in precedents {
        let _ = writeln!(out, "  * {}", p.title);
        if !p.summary.is_empty() {
            let _ = writeln!(out, "    {}", p.summary);
        }
        if !p.relevance.is_empty() {
            let _ = writeln!(out, "    {}: {}", t(lang, "Relevance", "प्रासंगिकता"), p.relevance);
        }
    }
}

/// The judge's panel for the current verdict, or a waiting notice when there
/// is none yet.
pub fn judge_panel(verdict: Option<&Verdict>, language: Language) -> String {
    let lang = language;
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", t(lang, "AI Judge", "एआई जज"));
    let Some(v) = verdict else {
        let _ = writeln!(
            out,
            "{}",
            t(
                lang,
                "Waiting for both sides to submit documents...",
                "दोनों पक्षों द्वारा दस्तावेज़ जमा करने की प्रतीक्षा..."
            )
        );
        return out;
    };

    let _ = writeln!(out, "{}: {}", t(lang, "Verdict", "फैसला"), v.verdict);
    let _ = writeln!(out, "{}: {}%", t(lang, "Confidence", "विश्वास"), v.confidence);
    let _ = writeln!(
        out,
        "{}: {} {}",
        t(lang, "Bias", "झुकाव"),
        tone_marker(v.bias.tone()),
        v.bias
    );
    if !v.summary.is_empty() {
        let _ = writeln!(out, "\n{}\n  {}", t(lang, "Case summary", "मामले का सारांश"), v.summary);
    }
    if !v.reasoning.is_empty() {
        let _ = writeln!(out, "\n{}\n  {}", t(lang, "Reasoning", "तर्क"), v.reasoning);
    }
    if let Some(scores) = &v.argument_scores {
        scores_section(&mut out, lang, scores);
    }
    if let Some(comparison) = &v.comparison {
        comparison_section(&mut out, lang, comparison);
    }
    precedents_section(&mut out, lang, v.precedents());
    out
}

fn entry_label(entry: &TimelineEntry, lang: Language) -> String {
    match (lang, entry.round, entry.side) {
        (Language::En, ..) => entry.label(),
        (Language::Hi, 0, _) => "प्रारंभिक".to_string(),
        (Language::Hi, n, Some(side)) => format!("दौर {n} (पक्ष {side})"),
        (Language::Hi, n, None) => format!("दौर {n}"),
    }
}

/// One line per entry, oldest first.
pub fn timeline(entries: &[TimelineEntry], lang: Language) -> String {
    let mut out = String::new();
    for entry in entries {
        let v = &entry.verdict;
        let _ = write!(
            out,
            "{} [{}] {} ({}%, {})",
            entry.timestamp.format("%H:%M:%S"),
            entry_label(entry, lang),
            v.verdict,
            v.confidence,
            v.bias
        );
        if let Some(note) = &v.timeline_note {
            let _ = write!(out, ": {note}");
        }
        out.push('\n');
    }
    out
}
