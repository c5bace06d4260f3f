// Integration tests for judge_core::controller::CaseController, driven by
// in-memory gateways so every state transition can be checked exactly.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use judge_core::{
    Bias, CaseController, ControllerError, GatewayError, Side, Verdict, VerdictGateway,
    VerdictRequest, ARGUMENT_BUDGET,
};
use tokio::sync::oneshot;

// ── helpers ──────────────────────────────────────────────────────────────────

fn verdict(confidence: u8, bias: Bias) -> Verdict {
    Verdict {
        summary: "summary".into(),
        reasoning: "reasoning".into(),
        verdict: format!("verdict at {confidence}"),
        confidence,
        bias,
        precedents: None,
        comparison: None,
        argument_scores: None,
        timeline_note: None,
    }
}

/// Replays queued results in order; once the queue is empty every call succeeds.
#[derive(Default)]
struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<Verdict, GatewayError>>>,
    seen: Mutex<Vec<VerdictRequest>>,
    calls: AtomicUsize,
}

impl ScriptedGateway {
    fn push(&self, reply: Result<Verdict, GatewayError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> VerdictRequest {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl VerdictGateway for ScriptedGateway {
    async fn request_verdict(&self, request: &VerdictRequest) -> Result<Verdict, GatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(verdict(50 + n as u8, Bias::Neutral)))
    }
}

fn upstream_failure() -> GatewayError {
    GatewayError::Upstream {
        status: 502,
        body: "bad gateway".into(),
    }
}

async fn decided_case() -> (Arc<ScriptedGateway>, CaseController<ScriptedGateway>) {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = CaseController::new(Arc::clone(&gateway));
    controller
        .submit_initial_documents("Side A facts...", "Side B facts...")
        .await
        .unwrap();
    (gateway, controller)
}

// ── initial submission ───────────────────────────────────────────────────────

#[tokio::test]
async fn initial_submission_records_round_zero_and_locks() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push(Ok(verdict(85, Bias::Slight(Side::A))));
    let controller = CaseController::new(Arc::clone(&gateway));

    let v = controller
        .submit_initial_documents("Side A facts...", "Side B facts...")
        .await
        .unwrap();

    assert!(v.confidence <= 100);
    assert!(v.bias.is_canonical());
    let timeline = controller.timeline();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].round, 0);
    assert_eq!(timeline[0].side, None);
    assert!(controller.is_locked());
    assert_eq!(controller.current_verdict(), Some(v));
    assert_eq!(controller.document(Side::A), "Side A facts...");
}

#[tokio::test]
async fn initial_request_carries_case_and_documents() {
    let (gateway, controller) = decided_case().await;
    match gateway.last_request() {
        VerdictRequest::Initial(r) => {
            assert_eq!(r.case_id, controller.case_id());
            assert_eq!(r.side_a_docs, "Side A facts...");
            assert_eq!(r.side_b_docs, "Side B facts...");
        }
        other => panic!("expected initial request, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_document_is_rejected_without_a_call() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = CaseController::new(Arc::clone(&gateway));

    let err = controller
        .submit_initial_documents("Side A facts...", "   ")
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::MissingDocuments));
    assert!(err.is_local());
    assert_eq!(gateway.calls(), 0);
    assert!(controller.timeline().is_empty());
    assert!(!controller.is_locked());
}

#[tokio::test]
async fn failed_initial_call_leaves_case_untouched() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push(Err(upstream_failure()));
    let controller = CaseController::new(Arc::clone(&gateway));

    let err = controller
        .submit_initial_documents("a", "b")
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::Gateway(_)));
    assert!(controller.timeline().is_empty());
    assert!(!controller.is_locked());
    assert!(!controller.is_initial_pending());
    assert!(controller.current_verdict().is_none());

    // A manual retry goes through.
    controller.submit_initial_documents("a", "b").await.unwrap();
    assert!(controller.is_locked());
}

#[tokio::test]
async fn stored_documents_drive_the_initial_request() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = CaseController::new(Arc::clone(&gateway));
    controller.set_document(Side::A, "from the form A").unwrap();
    assert!(matches!(
        controller.request_initial_verdict().await,
        Err(ControllerError::MissingDocuments)
    ));
    controller.set_document(Side::B, "from the form B").unwrap();
    controller.request_initial_verdict().await.unwrap();
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test]
async fn documents_are_immutable_once_locked() {
    let (gateway, controller) = decided_case().await;
    assert!(matches!(
        controller.set_document(Side::A, "rewritten"),
        Err(ControllerError::DocumentsLocked)
    ));
    assert!(matches!(
        controller.submit_initial_documents("x", "y").await,
        Err(ControllerError::AlreadyDecided)
    ));
    assert_eq!(controller.document(Side::A), "Side A facts...");
    assert_eq!(gateway.calls(), 1);
}

// ── arguments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn argument_before_verdict_is_rejected() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = CaseController::new(Arc::clone(&gateway));
    let err = controller.submit_argument(Side::A, "point").await.unwrap_err();
    assert!(matches!(err, ControllerError::NoVerdict));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn blank_argument_is_rejected() {
    let (gateway, controller) = decided_case().await;
    let err = controller.submit_argument(Side::B, " \n ").await.unwrap_err();
    assert!(matches!(err, ControllerError::EmptyArgument));
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test]
async fn nth_argument_gets_round_n_and_spends_budget() {
    for side in Side::ALL {
        let (_gateway, controller) = decided_case().await;
        for n in 1..=ARGUMENT_BUDGET {
            let entry = controller
                .submit_argument(side, &format!("argument {n}"))
                .await
                .unwrap();
            assert_eq!(entry.round, n);
            assert_eq!(entry.side, Some(side));
            assert_eq!(controller.arguments_left(side), ARGUMENT_BUDGET - n);
            assert_eq!(controller.arguments_left(side.other()), ARGUMENT_BUDGET);
        }
        assert_eq!(controller.timeline().len(), 1 + ARGUMENT_BUDGET as usize);
    }
}

#[tokio::test]
async fn rounds_are_per_side_when_interleaved() {
    let (_gateway, controller) = decided_case().await;
    let a1 = controller.submit_argument(Side::A, "a1").await.unwrap();
    let b1 = controller.submit_argument(Side::B, "b1").await.unwrap();
    let a2 = controller.submit_argument(Side::A, "a2").await.unwrap();
    assert_eq!((a1.round, b1.round, a2.round), (1, 1, 2));
    let labels: Vec<String> = controller.timeline().iter().map(|e| e.label()).collect();
    assert_eq!(
        labels,
        ["Initial", "Round 1 (Side A)", "Round 1 (Side B)", "Round 2 (Side A)"]
    );
}

#[tokio::test]
async fn exhausted_budget_is_a_no_op() {
    let (gateway, controller) = decided_case().await;
    for n in 1..=ARGUMENT_BUDGET {
        controller.submit_argument(Side::A, &format!("a{n}")).await.unwrap();
    }
    let calls = gateway.calls();
    let len = controller.timeline().len();

    let err = controller.submit_argument(Side::A, "one more").await.unwrap_err();

    assert!(matches!(err, ControllerError::BudgetExhausted(Side::A)));
    assert_eq!(gateway.calls(), calls);
    assert_eq!(controller.timeline().len(), len);
    assert_eq!(controller.arguments_left(Side::A), 0);
    // The other side is unaffected.
    controller.submit_argument(Side::B, "b1").await.unwrap();
}

#[tokio::test]
async fn failed_argument_call_changes_nothing() {
    let (gateway, controller) = decided_case().await;
    controller.submit_argument(Side::B, "b1").await.unwrap();
    let before = controller.snapshot();

    gateway.push(Err(upstream_failure()));
    let err = controller.submit_argument(Side::B, "b2").await.unwrap_err();

    assert!(matches!(err, ControllerError::Gateway(GatewayError::Upstream { status: 502, .. })));
    assert_eq!(controller.snapshot(), before);
    assert!(!controller.is_argument_pending(Side::B));

    // The failed attempt did not consume the round number.
    let entry = controller.submit_argument(Side::B, "b2").await.unwrap();
    assert_eq!(entry.round, 2);
}

#[tokio::test]
async fn argument_request_carries_previous_verdict() {
    let (gateway, controller) = decided_case().await;
    let current = controller.current_verdict().unwrap();

    controller.submit_argument(Side::B, "  consider clause 9  ").await.unwrap();

    match gateway.last_request() {
        VerdictRequest::Argument(r) => {
            assert_eq!(r.side, Side::B);
            assert_eq!(r.argument, "consider clause 9");
            let prev: Verdict =
                serde_json::from_value(serde_json::Value::Object(r.previous_verdict)).unwrap();
            assert_eq!(prev, current);
            assert_eq!(r.side_a_docs.as_deref(), Some("Side A facts..."));
        }
        other => panic!("expected argument request, got {other:?}"),
    }
}

#[tokio::test]
async fn current_verdict_tracks_latest_entry() {
    let (gateway, controller) = decided_case().await;
    gateway.push(Ok(verdict(91, Bias::Strong(Side::B))));
    controller.submit_argument(Side::B, "b1").await.unwrap();
    let current = controller.current_verdict().unwrap();
    assert_eq!(current.confidence, 91);
    assert_eq!(Some(current), controller.timeline().last().map(|e| e.verdict.clone()));
}

// ── reset ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_restores_a_fresh_case() {
    let (_gateway, controller) = decided_case().await;
    controller.submit_argument(Side::A, "a1").await.unwrap();
    let old_id = controller.case_id();

    controller.reset();

    assert_ne!(controller.case_id(), old_id);
    assert!(controller.case_id().starts_with("case_"));
    assert!(controller.timeline().is_empty());
    assert!(controller.current_verdict().is_none());
    assert!(!controller.is_locked());
    assert_eq!(controller.document(Side::A), "");
    for side in Side::ALL {
        assert_eq!(controller.arguments_left(side), ARGUMENT_BUDGET);
    }
    controller.set_document(Side::A, "new facts").unwrap();
}

#[tokio::test]
async fn repeated_resets_never_reuse_an_id() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = CaseController::new(gateway);
    let mut previous = controller.case_id();
    for _ in 0..50 {
        controller.reset();
        let id = controller.case_id();
        assert_ne!(id, previous);
        previous = id;
    }
}

// ── concurrency ──────────────────────────────────────────────────────────────

type Reply = Result<Verdict, GatewayError>;

/// Holds every call until the test releases it, keyed by action.
#[derive(Default)]
struct HeldGateway {
    gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    calls: AtomicUsize,
}

impl HeldGateway {
    fn hold(&self, key: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.to_string(), rx);
        tx
    }
}

fn key_for(request: &VerdictRequest) -> String {
    match request {
        VerdictRequest::Initial(_) => "initial".into(),
        VerdictRequest::Argument(r) => format!("argument-{}", r.side),
    }
}

#[async_trait]
impl VerdictGateway for HeldGateway {
    async fn request_verdict(&self, request: &VerdictRequest) -> Result<Verdict, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rx = self.gates.lock().unwrap().remove(&key_for(request));
        match rx {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(upstream_failure())),
            None => Ok(verdict(60, Bias::Neutral)),
        }
    }
}

async fn wait_until(check: impl Fn() -> bool) {
    for _ in 0..1000 {
        if check() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}

#[tokio::test]
async fn both_sides_in_flight_apply_in_resolution_order() {
    let gateway = Arc::new(HeldGateway::default());
    let controller = Arc::new(CaseController::new(Arc::clone(&gateway)));
    controller.submit_initial_documents("a", "b").await.unwrap();

    let release_a = gateway.hold("argument-A");
    let release_b = gateway.hold("argument-B");

    let task_a = {
        let c = Arc::clone(&controller);
        tokio::spawn(async move { c.submit_argument(Side::A, "a1").await })
    };
    let task_b = {
        let c = Arc::clone(&controller);
        tokio::spawn(async move { c.submit_argument(Side::B, "b1").await })
    };
    wait_until(|| controller.is_argument_pending(Side::A) && controller.is_argument_pending(Side::B))
        .await;

    // Same action twice is refused while the first is in flight.
    let calls = gateway.calls.load(Ordering::SeqCst);
    assert!(matches!(
        controller.submit_argument(Side::A, "again").await,
        Err(ControllerError::Pending)
    ));
    assert_eq!(gateway.calls.load(Ordering::SeqCst), calls);

    release_b.send(Ok(verdict(70, Bias::Slight(Side::B)))).unwrap();
    let b = task_b.await.unwrap().unwrap();
    release_a.send(Ok(verdict(65, Bias::Neutral))).unwrap();
    let a = task_a.await.unwrap().unwrap();

    assert_eq!((a.round, b.round), (1, 1));
    let sides: Vec<Option<Side>> = controller.timeline().iter().map(|e| e.side).collect();
    assert_eq!(sides, [None, Some(Side::B), Some(Side::A)]);
    assert_eq!(controller.current_verdict().unwrap().confidence, 65);
}

#[tokio::test]
async fn abandoned_initial_request_clears_pending() {
    let gateway = Arc::new(HeldGateway::default());
    let controller = CaseController::new(Arc::clone(&gateway));
    let _never = gateway.hold("initial");

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        controller.submit_initial_documents("a", "b"),
    )
    .await;
    assert!(outcome.is_err(), "held request should time out");
    assert!(!controller.is_initial_pending());
    assert!(!controller.is_locked());

    let v = controller.submit_initial_documents("a", "b").await.unwrap();
    assert_eq!(v.confidence, 60);
    assert!(controller.is_locked());
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn abandoned_argument_request_clears_pending_and_keeps_budget() {
    let gateway = Arc::new(HeldGateway::default());
    let controller = CaseController::new(Arc::clone(&gateway));
    controller.submit_initial_documents("a", "b").await.unwrap();
    let _never = gateway.hold("argument-A");

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        controller.submit_argument(Side::A, "a1"),
    )
    .await;
    assert!(outcome.is_err(), "held request should time out");
    assert!(!controller.is_argument_pending(Side::A));
    assert_eq!(controller.arguments_left(Side::A), ARGUMENT_BUDGET);

    let entry = controller.submit_argument(Side::A, "a1").await.unwrap();
    assert_eq!(entry.round, 1);
    assert_eq!(controller.timeline().len(), 2);
}

#[tokio::test]
async fn abandoned_request_for_a_reset_case_leaves_new_case_alone() {
    let gateway = Arc::new(HeldGateway::default());
    let controller = Arc::new(CaseController::new(Arc::clone(&gateway)));
    let _never = gateway.hold("initial");

    let task = {
        let c = Arc::clone(&controller);
        tokio::spawn(async move { c.submit_initial_documents("a", "b").await })
    };
    wait_until(|| controller.is_initial_pending()).await;
    controller.reset();

    // Raise the flag on the new case, then drop the old request.
    let release = gateway.hold("initial");
    let fresh = {
        let c = Arc::clone(&controller);
        tokio::spawn(async move { c.submit_initial_documents("c", "d").await })
    };
    wait_until(|| controller.is_initial_pending()).await;
    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    assert!(controller.is_initial_pending());

    release.send(Ok(verdict(75, Bias::Neutral))).unwrap();
    assert_eq!(fresh.await.unwrap().unwrap().confidence, 75);
    assert!(!controller.is_initial_pending());
}

#[tokio::test]
async fn response_for_a_reset_case_is_discarded() {
    let gateway = Arc::new(HeldGateway::default());
    let controller = Arc::new(CaseController::new(Arc::clone(&gateway)));
    controller.submit_initial_documents("a", "b").await.unwrap();

    let release = gateway.hold("argument-A");
    let task = {
        let c = Arc::clone(&controller);
        tokio::spawn(async move { c.submit_argument(Side::A, "a1").await })
    };
    wait_until(|| controller.is_argument_pending(Side::A)).await;

    controller.reset();
    release.send(Ok(verdict(99, Bias::Strong(Side::A)))).unwrap();

    assert!(matches!(task.await.unwrap(), Err(ControllerError::CaseReset)));
    assert!(controller.timeline().is_empty());
    assert_eq!(controller.arguments_left(Side::A), ARGUMENT_BUDGET);
    assert!(!controller.is_argument_pending(Side::A));
}

// ── documents from files ─────────────────────────────────────────────────────

#[tokio::test]
async fn text_file_loads_into_document_field() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("plaintiff_case.txt");
    std::fs::write(&path, judge_core::samples::PLAINTIFF_CASE).unwrap();

    let controller = CaseController::new(Arc::new(ScriptedGateway::default()));
    let chars = controller.load_document_file(Side::A, &path).await.unwrap();

    assert_eq!(chars, judge_core::samples::PLAINTIFF_CASE.chars().count());
    assert_eq!(controller.document(Side::A), judge_core::samples::PLAINTIFF_CASE);
}

#[tokio::test]
async fn unlisted_extension_is_refused() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("case.exe");
    std::fs::write(&path, "MZ").unwrap();

    let controller = CaseController::new(Arc::new(ScriptedGateway::default()));
    assert!(matches!(
        controller.load_document_file(Side::B, &path).await,
        Err(ControllerError::UnsupportedFile(_))
    ));
    assert_eq!(controller.document(Side::B), "");
}

#[tokio::test]
async fn file_load_after_lock_is_refused() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("late.txt");
    std::fs::write(&path, "late evidence").unwrap();

    let (_gateway, controller) = decided_case().await;
    assert!(matches!(
        controller.load_document_file(Side::A, &path).await,
        Err(ControllerError::DocumentsLocked)
    ));
}

#[tokio::test]
async fn snapshot_serializes_for_export() {
    let (_gateway, controller) = decided_case().await;
    controller.submit_argument(Side::A, "a1").await.unwrap();

    let json = serde_json::to_value(controller.snapshot()).unwrap();

    assert_eq!(json["caseId"], controller.case_id());
    assert_eq!(json["locked"], true);
    assert_eq!(json["argumentsLeftA"], 4);
    assert_eq!(json["argumentsLeftB"], 5);
    assert_eq!(json["timeline"].as_array().unwrap().len(), 2);
    assert_eq!(json["timeline"][1]["side"], "A");
}
