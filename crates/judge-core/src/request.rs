//! Gateway request schema.
//!
//! Requests arrive as loosely-typed JSON. [`VerdictRequest::from_value`]
//! checks every field and collects all violations before building the typed
//! request, so a caller sees the whole list at once.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationIssue};
use crate::types::{Language, Side, Verdict};

pub const MAX_CASE_ID_CHARS: usize = 100;
pub const MAX_DOCUMENT_CHARS: usize = 50_000;
pub const MAX_ARGUMENT_CHARS: usize = 5_000;

/// Both sides' documents, asking for the first verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialRequest {
    pub case_id: String,
    #[serde(rename = "sideADocs")]
    pub side_a_docs: String,
    #[serde(rename = "sideBDocs")]
    pub side_b_docs: String,
    pub language: Language,
}

/// One new argument, asking the judge to revisit its previous verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentRequest {
    pub case_id: String,
    /// Kept opaque: whatever the judge returned last time.
    pub previous_verdict: Map<String, Value>,
    pub argument: String,
    pub side: Side,
    pub language: Language,
    #[serde(rename = "sideADocs", skip_serializing_if = "Option::is_none")]
    pub side_a_docs: Option<String>,
    #[serde(rename = "sideBDocs", skip_serializing_if = "Option::is_none")]
    pub side_b_docs: Option<String>,
}

impl ArgumentRequest {
    /// Build a request from a typed previous verdict.
    pub fn new(
        case_id: impl Into<String>,
        previous: &Verdict,
        argument: impl Into<String>,
        side: Side,
        language: Language,
    ) -> Self {
        let previous_verdict = match serde_json::to_value(previous) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            case_id: case_id.into(),
            previous_verdict,
            argument: argument.into(),
            side,
            language,
            side_a_docs: None,
            side_b_docs: None,
        }
    }

    pub fn with_documents(mut self, side_a: impl Into<String>, side_b: impl Into<String>) -> Self {
        self.side_a_docs = Some(side_a.into());
        self.side_b_docs = Some(side_b.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VerdictRequest {
    Initial(InitialRequest),
    Argument(ArgumentRequest),
}

impl VerdictRequest {
    pub fn case_id(&self) -> &str {
        match self {
            VerdictRequest::Initial(r) => &r.case_id,
            VerdictRequest::Argument(r) => &r.case_id,
        }
    }

    pub fn language(&self) -> Language {
        match self {
            VerdictRequest::Initial(r) => r.language,
            VerdictRequest::Argument(r) => r.language,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            VerdictRequest::Initial(_) => "initial",
            VerdictRequest::Argument(_) => "argument",
        }
    }

    /// Parse and validate a request body. Anything whose `type` is not
    /// `"initial"` is checked against the argument schema.
    pub fn from_value(body: &Value) -> Result<Self, ValidationError> {
        let Some(obj) = body.as_object() else {
            return Err(ValidationError {
                issues: vec![ValidationIssue::new("", "expected a JSON object")],
            });
        };
        let mut check = Checker::new(obj);
        let case_id = check.text("caseId", 1, MAX_CASE_ID_CHARS);
        let language = check.language("language");

        if obj.get("type").and_then(Value::as_str) == Some("initial") {
            let side_a_docs = check.text("sideADocs", 1, MAX_DOCUMENT_CHARS);
            let side_b_docs = check.text("sideBDocs", 1, MAX_DOCUMENT_CHARS);
            check.finish()?;
            return Ok(VerdictRequest::Initial(InitialRequest {
                case_id: case_id.unwrap_or_default(),
                side_a_docs: side_a_docs.unwrap_or_default(),
                side_b_docs: side_b_docs.unwrap_or_default(),
                language: language.unwrap_or_default(),
            }));
        }

        check.literal_type("argument");
        let previous_verdict = check.object("previousVerdict");
        let argument = check.text("argument", 1, MAX_ARGUMENT_CHARS);
        let side = check.side("side");
        let side_a_docs = check.optional_text("sideADocs", 1, MAX_DOCUMENT_CHARS);
        let side_b_docs = check.optional_text("sideBDocs", 1, MAX_DOCUMENT_CHARS);
        check.finish()?;
        Ok(VerdictRequest::Argument(ArgumentRequest {
            case_id: case_id.unwrap_or_default(),
            previous_verdict: previous_verdict.unwrap_or_default(),
            argument: argument.unwrap_or_default(),
            side: side.unwrap_or(Side::A),
            language: language.unwrap_or_default(),
            side_a_docs,
            side_b_docs,
        }))
    }

    /// Re-check a request built in code against the same bounds as
    /// [`from_value`](Self::from_value).
    pub fn validate(&self) -> Result<(), ValidationError> {
        let body = serde_json::to_value(self).map_err(|e| ValidationError {
            issues: vec![ValidationIssue::new("", e.to_string())],
        })?;
        Self::from_value(&body).map(|_| ())
    }
}

struct Checker<'a> {
    obj: &'a Map<String, Value>,
    issues: Vec<ValidationIssue>,
}

impl<'a> Checker<'a> {
    fn new(obj: &'a Map<String, Value>) -> Self {
        Self {
            obj,
            issues: Vec::new(),
        }
    }

    fn fail(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(path, message));
    }

    fn bounded(&mut self, key: &str, s: &str, min: usize, max: usize) -> bool {
        let len = s.chars().count();
        if len < min {
            self.fail(key, format!("must contain at least {min} character(s)"));
            false
        } else if len > max {
            self.fail(key, format!("must contain at most {max} character(s)"));
            false
        } else {
            true
        }
    }

    fn text(&mut self, key: &str, min: usize, max: usize) -> Option<String> {
        let obj = self.obj;
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.fail(key, "required");
                None
            }
            Some(Value::String(s)) => self.bounded(key, s, min, max).then(|| s.clone()),
            Some(_) => {
                self.fail(key, "expected string");
                None
            }
        }
    }

    fn optional_text(&mut self, key: &str, min: usize, max: usize) -> Option<String> {
        let obj = self.obj;
        match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => self.bounded(key, s, min, max).then(|| s.clone()),
            Some(_) => {
                self.fail(key, "expected string");
                None
            }
        }
    }

    fn language(&mut self, key: &str) -> Option<Language> {
        let parsed = self.obj.get(key).and_then(Value::as_str).and_then(Language::parse);
        if parsed.is_none() {
            self.fail(key, "expected 'en' | 'hi'");
        }
        parsed
    }

    fn side(&mut self, key: &str) -> Option<Side> {
        let parsed = match self.obj.get(key).and_then(Value::as_str) {
            Some("A") => Some(Side::A),
            Some("B") => Some(Side::B),
            _ => None,
        };
        if parsed.is_none() {
            self.fail(key, "expected 'A' | 'B'");
        }
        parsed
    }

    fn literal_type(&mut self, expected: &str) {
        if self.obj.get("type").and_then(Value::as_str) != Some(expected) {
            self.fail("type", format!("expected '{expected}'"));
        }
    }

    fn object(&mut self, key: &str) -> Option<Map<String, Value>> {
        match self.obj.get(key) {
            Some(Value::Object(m)) if !m.is_empty() => Some(m.clone()),
            Some(Value::Object(_)) => {
                self.fail(key, "must not be empty");
                None
            }
            None | Some(Value::Null) => {
                self.fail(key, "required");
                None
            }
            Some(_) => {
                self.fail(key, "expected object");
                None
            }
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                issues: self.issues,
            })
        }
    }
}
