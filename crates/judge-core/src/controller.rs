use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ControllerError;
use crate::gateway::VerdictGateway;
use crate::request::{ArgumentRequest, InitialRequest, VerdictRequest};
use crate::types::{Language, Side, TimelineEntry, Verdict, ARGUMENT_BUDGET};

/// File extensions the document picker offers. Content is read as text
/// regardless of extension.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["txt", "pdf", "doc", "docx"];

struct CaseState {
    case_id: String,
    language: Language,
    documents: [String; 2],
    locked: bool,
    budgets: [u8; 2],
    timeline: Vec<TimelineEntry>,
    initial_pending: bool,
    argument_pending: [bool; 2],
}

impl CaseState {
    fn fresh(previous_id: Option<&str>, language: Language) -> Self {
        Self {
            case_id: new_case_id(previous_id),
            language,
            documents: [String::new(), String::new()],
            locked: false,
            budgets: [ARGUMENT_BUDGET; 2],
            timeline: Vec::new(),
            initial_pending: false,
            argument_pending: [false; 2],
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PendingAction {
    Initial,
    Argument(Side),
}

/// Clears a pending flag when the request that set it ends, including when
/// the caller drops the future before the gateway answers. Only touches the
/// case it was raised for.
struct PendingGuard<'a> {
    state: &'a Mutex<CaseState>,
    case_id: String,
    action: PendingAction,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn new(state: &'a Mutex<CaseState>, case_id: String, action: PendingAction) -> Self {
        Self {
            state,
            case_id,
            action,
            armed: true,
        }
    }

    /// Clear the flag through a lock the caller already holds.
    fn release(mut self, s: &mut CaseState) {
        self.clear(s);
        self.armed = false;
    }

    fn clear(&self, s: &mut CaseState) {
        if s.case_id != self.case_id {
            return;
        }
        match self.action {
            PendingAction::Initial => s.initial_pending = false,
            PendingAction::Argument(side) => s.argument_pending[side.index()] = false,
        }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut s = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.clear(&mut s);
        warn!(case_id = %self.case_id, action = ?self.action, "verdict request abandoned");
    }
}

fn new_case_id(previous: Option<&str>) -> String {
    loop {
        let id = format!(
            "case_{}_{:04x}",
            Utc::now().timestamp_millis(),
            rand::random::<u16>()
        );
        if previous != Some(id.as_str()) {
            return id;
        }
    }
}

/// Point-in-time copy of a case, used for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSnapshot {
    pub case_id: String,
    pub language: Language,
    #[serde(rename = "sideADocs")]
    pub side_a_docs: String,
    #[serde(rename = "sideBDocs")]
    pub side_b_docs: String,
    pub locked: bool,
    #[serde(rename = "argumentsLeftA")]
    pub arguments_left_a: u8,
    #[serde(rename = "argumentsLeftB")]
    pub arguments_left_b: u8,
    pub timeline: Vec<TimelineEntry>,
}

/// State of one simulated case: documents, argument budgets and the verdict
/// timeline.
///
/// All mutation goes through this type. Gateway calls run without holding the
/// state lock, so the two sides may have argument requests in flight at once;
/// a second request for the same action is refused until the first resolves.
/// Responses apply in resolution order, and a response for a case that has
/// since been reset is dropped.
pub struct CaseController<G: VerdictGateway + ?Sized = dyn VerdictGateway> {
    gateway: Arc<G>,
    state: Mutex<CaseState>,
}

impl<G: VerdictGateway + ?Sized> CaseController<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_language(gateway, Language::default())
    }

    pub fn with_language(gateway: Arc<G>, language: Language) -> Self {
        Self {
            gateway,
            state: Mutex::new(CaseState::fresh(None, language)),
        }
    }

    fn state(&self) -> MutexGuard<'_, CaseState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn case_id(&self) -> String {
        self.state().case_id.clone()
    }

    pub fn language(&self) -> Language {
        self.state().language
    }

    pub fn document(&self, side: Side) -> String {
        self.state().documents[side.index()].clone()
    }

    pub fn is_locked(&self) -> bool {
        self.state().locked
    }

    pub fn arguments_left(&self, side: Side) -> u8 {
        self.state().budgets[side.index()]
    }

    pub fn timeline(&self) -> Vec<TimelineEntry> {
        self.state().timeline.clone()
    }

    /// The latest timeline entry's verdict.
    pub fn current_verdict(&self) -> Option<Verdict> {
        self.state().timeline.last().map(|e| e.verdict.clone())
    }

    pub fn is_initial_pending(&self) -> bool {
        self.state().initial_pending
    }

    pub fn is_argument_pending(&self, side: Side) -> bool {
        self.state().argument_pending[side.index()]
    }

    pub fn snapshot(&self) -> CaseSnapshot {
        let s = self.state();
        CaseSnapshot {
            case_id: s.case_id.clone(),
            language: s.language,
            side_a_docs: s.documents[0].clone(),
            side_b_docs: s.documents[1].clone(),
            locked: s.locked,
            arguments_left_a: s.budgets[0],
            arguments_left_b: s.budgets[1],
            timeline: s.timeline.clone(),
        }
    }

    // ── Form state ───────────────────────────────────────────────────────

    pub fn set_language(&self, language: Language) {
        self.state().language = language;
    }

    pub fn set_document(&self, side: Side, text: impl Into<String>) -> Result<(), ControllerError> {
        let mut s = self.state();
        if s.locked {
            return Err(ControllerError::DocumentsLocked);
        }
        s.documents[side.index()] = text.into();
        Ok(())
    }

    /// Read a local file into a side's document field. Returns the number of
    /// characters loaded.
    pub async fn load_document_file(
        &self,
        side: Side,
        path: impl AsRef<Path>,
    ) -> Result<usize, ControllerError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ControllerError::UnsupportedFile(path.display().to_string()));
        }
        if self.is_locked() {
            return Err(ControllerError::DocumentsLocked);
        }
        let text = tokio::fs::read_to_string(path).await?;
        let chars = text.chars().count();
        self.set_document(side, text)?;
        info!(side = %side, file = %path.display(), chars, "document loaded");
        Ok(chars)
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Submit whatever is currently in both document fields.
    pub async fn request_initial_verdict(&self) -> Result<Verdict, ControllerError> {
        let (a, b) = {
            let s = self.state();
            (s.documents[0].clone(), s.documents[1].clone())
        };
        self.submit_initial_documents(a, b).await
    }

    pub async fn submit_initial_documents(
        &self,
        side_a: impl Into<String>,
        side_b: impl Into<String>,
    ) -> Result<Verdict, ControllerError> {
        let side_a = side_a.into();
        let side_b = side_b.into();
        if side_a.trim().is_empty() || side_b.trim().is_empty() {
            warn!("initial verdict requested without both documents");
            return Err(ControllerError::MissingDocuments);
        }

        let request = {
            let mut s = self.state();
            if s.locked {
                return Err(ControllerError::AlreadyDecided);
            }
            if s.initial_pending {
                return Err(ControllerError::Pending);
            }
            s.initial_pending = true;
            VerdictRequest::Initial(InitialRequest {
                case_id: s.case_id.clone(),
                side_a_docs: side_a.clone(),
                side_b_docs: side_b.clone(),
                language: s.language,
            })
        };
        let case_id = request.case_id().to_string();
        let guard = PendingGuard::new(&self.state, case_id.clone(), PendingAction::Initial);

        let result = self.gateway.request_verdict(&request).await;

        let mut s = self.state();
        guard.release(&mut s);
        if s.case_id != case_id {
            warn!(case_id = %case_id, "discarding initial verdict for a reset case");
            return Err(ControllerError::CaseReset);
        }
        let verdict = match result {
            Ok(v) => v,
            Err(e) => {
                warn!(case_id = %case_id, "initial verdict failed: {e}");
                return Err(e.into());
            }
        };

        s.documents = [side_a, side_b];
        s.timeline = vec![TimelineEntry {
            round: 0,
            side: None,
            verdict: verdict.clone(),
            timestamp: Utc::now(),
        }];
        s.locked = true;
        info!(
            case_id = %case_id,
            confidence = verdict.confidence,
            bias = %verdict.bias,
            "initial verdict recorded"
        );
        Ok(verdict)
    }

    pub async fn submit_argument(
        &self,
        side: Side,
        text: &str,
    ) -> Result<TimelineEntry, ControllerError> {
        let idx = side.index();
        let request = {
            let mut s = self.state();
            let Some(current) = s.timeline.last() else {
                return Err(ControllerError::NoVerdict);
            };
            if text.trim().is_empty() {
                return Err(ControllerError::EmptyArgument);
            }
            if s.budgets[idx] == 0 {
                return Err(ControllerError::BudgetExhausted(side));
            }
            if s.argument_pending[idx] {
                return Err(ControllerError::Pending);
            }
            let request = ArgumentRequest::new(
                s.case_id.clone(),
                &current.verdict,
                text.trim(),
                side,
                s.language,
            )
            .with_documents(s.documents[0].clone(), s.documents[1].clone());
            s.argument_pending[idx] = true;
            VerdictRequest::Argument(request)
        };
        let case_id = request.case_id().to_string();
        let guard = PendingGuard::new(&self.state, case_id.clone(), PendingAction::Argument(side));

        let result = self.gateway.request_verdict(&request).await;

        let mut s = self.state();
        guard.release(&mut s);
        if s.case_id != case_id {
            warn!(case_id = %case_id, side = %side, "discarding argument verdict for a reset case");
            return Err(ControllerError::CaseReset);
        }
        let verdict = match result {
            Ok(v) => v,
            Err(e) => {
                warn!(case_id = %case_id, side = %side, "argument verdict failed: {e}");
                return Err(e.into());
            }
        };

        let remaining = s.budgets[idx];
        let entry = TimelineEntry {
            round: ARGUMENT_BUDGET - remaining + 1,
            side: Some(side),
            verdict,
            timestamp: Utc::now(),
        };
        s.timeline.push(entry.clone());
        s.budgets[idx] = remaining.saturating_sub(1);
        info!(
            case_id = %case_id,
            side = %side,
            round = entry.round,
            arguments_left = s.budgets[idx],
            confidence = entry.verdict.confidence,
            "argument round recorded"
        );
        Ok(entry)
    }

    /// Start a new case. Requests still in flight for the old case are
    /// discarded when they resolve.
    pub fn reset(&self) {
        let mut s = self.state();
        let previous = s.case_id.clone();
        let language = s.language;
        *s = CaseState::fresh(Some(&previous), language);
        info!(old_case = %previous, new_case = %s.case_id, "case reset");
    }
}
