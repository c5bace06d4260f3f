use judge_core::request::{ArgumentRequest, InitialRequest, VerdictRequest};
use judge_core::types::{Bias, Language};

/// System and user prompt for one judge call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

const INITIAL_SCHEMA: &str = r#"{
  "summary": "...",
  "reasoning": "...",
  "verdict": "...",
  "confidence": 85,
  "bias": "Neutral",
  "precedents": [
    { "title": "...", "summary": "...", "relevance": "..." },
    { "title": "...", "summary": "...", "relevance": "..." }
  ],
  "comparison": {
    "agreements": ["..."],
    "contradictions": ["..."],
    "strengths": { "sideA": ["..."], "sideB": ["..."] }
  }
}"#;

const ARGUMENT_SCHEMA: &str = r#"{
  "summary": "...",
  "reasoning": "...",
  "verdict": "...",
  "confidence": 80,
  "bias": "Neutral",
  "argumentScores": { "clarity": 7, "evidence": 6, "strength": "Medium" },
  "timelineNote": "...",
  "precedents": [ { "title": "...", "summary": "...", "relevance": "..." } ],
  "comparison": {
    "agreements": ["..."],
    "contradictions": ["..."],
    "strengths": { "sideA": ["..."], "sideB": ["..."] }
  }
}"#;

fn bias_options() -> String {
    Bias::LABELS
        .iter()
        .map(|l| format!("\"{l}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn initial_system(language: Language) -> String {
    format!(
        "You are an impartial AI judge analysing a legal dispute between two parties. \
         Weigh both sides evenly, rely only on the material provided, and answer in {}.",
        language.display_name()
    )
}

fn argument_system(language: Language) -> String {
    format!(
        "You are the same impartial AI judge, revisiting your earlier ruling in light of a \
         new argument. Change the outcome only when the argument warrants it, and answer in {}.",
        language.display_name()
    )
}

fn initial_user(r: &InitialRequest) -> String {
    let mut s = String::new();
    s.push_str("Analyse this case.\n\n");
    s.push_str(&format!("Side A (Plaintiff) documents:\n{}\n\n", r.side_a_docs));
    s.push_str(&format!("Side B (Defendant) documents:\n{}\n\n", r.side_b_docs));
    s.push_str("Your analysis must cover:\n\n");
    s.push_str("1. Case summary: two or three sentences on the dispute and key facts.\n");
    s.push_str("2. Legal reasoning: both sides' positions, the applicable law, and your assessment.\n");
    s.push_str("3. Verdict: your ruling, stated plainly.\n");
    s.push_str("4. Confidence: an integer from 0 to 100.\n");
    s.push_str(&format!(
        "5. Bias: which way the ruling leans, exactly one of {}.\n",
        bias_options()
    ));
    s.push_str("6. Precedents: exactly two relevant cases, each with title, a two-sentence summary, and relevance.\n");
    s.push_str("7. Comparison: points both sides agree on, direct contradictions, and the strongest points for each side.\n\n");
    s.push_str("Respond with a single JSON object using exactly these keys:\n");
    s.push_str(INITIAL_SCHEMA);
    s
}

fn argument_user(r: &ArgumentRequest) -> String {
    let previous = serde_json::to_string_pretty(&r.previous_verdict).unwrap_or_default();
    let mut s = String::new();
    if let (Some(a), Some(b)) = (&r.side_a_docs, &r.side_b_docs) {
        s.push_str(&format!(
            "Case documents for reference.\n\nSide A:\n{a}\n\nSide B:\n{b}\n\n---\n\n"
        ));
    }
    s.push_str(&format!("Your previous verdict:\n{previous}\n\n"));
    s.push_str(&format!(
        "New argument from Side {} ({}):\n{}\n\n",
        r.side,
        r.side.role(),
        r.argument
    ));
    s.push_str("Provide an updated analysis:\n\n");
    s.push_str("1. Reasoning: how this argument changes, or does not change, your analysis.\n");
    s.push_str("2. Verdict: revise only if the argument is compelling.\n");
    s.push_str("3. Confidence: an integer from 0 to 100.\n");
    s.push_str(&format!("4. Bias: exactly one of {}.\n", bias_options()));
    s.push_str("5. Argument scores for the new argument: clarity 1-10, evidence 1-10, and strength \"Weak\", \"Medium\" or \"Strong\".\n");
    s.push_str("6. Timeline note: one sentence on what changed and why.\n");
    s.push_str("7. Precedents and comparison: include them only if they change.\n\n");
    s.push_str("Respond with a single JSON object using these keys:\n");
    s.push_str(ARGUMENT_SCHEMA);
    s
}

/// Build the prompt pair for either kind of request. Both backends and tests
/// go through here so the wording stays in one place.
pub fn build_prompt(request: &VerdictRequest) -> Prompt {
    match request {
        VerdictRequest::Initial(r) => Prompt {
            system: initial_system(r.language),
            user: initial_user(r),
        },
        VerdictRequest::Argument(r) => Prompt {
            system: argument_system(r.language),
            user: argument_user(r),
        },
    }
}
