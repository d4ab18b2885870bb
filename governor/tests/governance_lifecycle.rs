//! Session-level tests: a governance run from INIT to COMPLETE with
//! checkpoints, and replay verification across independent runs.

use governor::core::state::RuntimeState::{
    AmendmentExec, AmendmentPrep, AmendmentVerify, CaptureAmu0, CeoFinalReview, CeoReview,
    Complete, Error, FreezeActivated, FreezePrep, Gates, Init, MigrationSequence,
};
use governor::io::config::GovernorConfig;
use governor::test_support::{doc, scratch_store};
use governor::{GovernanceContext, GovernanceError, RuntimeFsm, RuntimeState, StateStore};
use serde_json::json;

const PINNED: &str = "2025-12-09T12:00:00Z";

/// Drives one full session, checkpointing at every boundary:
///
/// ```text
/// INIT -> PREP -> EXEC -> VERIFY -> CEO_REVIEW -> FREEZE_PREP -> FREEZE_ACTIVATED
///      -> CAPTURE_AMU0 [cp] -> MIGRATION -> GATES [cp]
///      -> CAPTURE_AMU0 (remediation loop) -> MIGRATION -> GATES [cp]
///      -> CEO_FINAL_REVIEW [cp] -> COMPLETE
/// ```
///
/// Returns the receipts hashes in order.
fn run_session(ctx: &GovernanceContext) -> (RuntimeFsm, Vec<String>) {
    let mut fsm = ctx.start_session();
    let mut hashes = Vec::new();
    let script: &[(RuntimeState, Option<&str>)] = &[
        (AmendmentPrep, None),
        (AmendmentExec, None),
        (AmendmentVerify, None),
        (CeoReview, None),
        (FreezePrep, None),
        (FreezeActivated, None),
        (CaptureAmu0, Some("capture")),
        (MigrationSequence, None),
        (Gates, Some("gates-1")),
        (CaptureAmu0, None),
        (MigrationSequence, None),
        (Gates, Some("gates-2")),
        (CeoFinalReview, Some("final")),
        (Complete, None),
    ];
    for &(target, checkpoint) in script {
        fsm.transition_to(target).expect("legal step");
        if let Some(name) = checkpoint {
            hashes.push(ctx.checkpoint(&fsm, name).expect("checkpoint").hash);
        }
    }
    (fsm, hashes)
}

fn sealed_context(store: StateStore) -> GovernanceContext {
    let mut ctx = GovernanceContext::new(GovernorConfig::default(), store);
    ctx.initialize(PINNED).expect("init");
    ctx
}

#[test]
fn full_session_completes_with_checkpoints() {
    let (_temp, store) = scratch_store();
    let ctx = sealed_context(store);
    let (fsm, hashes) = run_session(&ctx);

    assert_eq!(fsm.current_state(), Complete);
    assert_eq!(fsm.history().len(), 15);
    assert_eq!(fsm.history()[0], Init);
    assert!(!fsm.history().contains(&Error));
    assert_eq!(hashes.len(), 4);

    let keys = ctx.store().keys().expect("keys");
    assert_eq!(
        keys,
        vec![
            "fsm_checkpoint_capture",
            "fsm_checkpoint_final",
            "fsm_checkpoint_gates-1",
            "fsm_checkpoint_gates-2",
        ]
    );

    let resumed = ctx.resume("gates-2", &hashes[2]).expect("resume");
    assert_eq!(resumed.current_state(), Gates);
    assert_eq!(resumed.history(), &fsm.history()[..13]);
}

/// Two independent runs of the same session produce identical snapshots.
#[test]
fn independent_runs_replay_identically() {
    let (_a, store_a) = scratch_store();
    let (_b, store_b) = scratch_store();
    let (_, first) = run_session(&sealed_context(store_a));
    let (_, second) = run_session(&sealed_context(store_b));
    assert_eq!(first, second);
}

#[test]
fn resumed_session_continues_and_still_fails_closed() {
    let (_temp, store) = scratch_store();
    let ctx = sealed_context(store);
    let (_, hashes) = run_session(&ctx);

    let mut resumed = ctx.resume("capture", &hashes[0]).expect("resume");
    assert_eq!(resumed.current_state(), CaptureAmu0);
    resumed.transition_to(MigrationSequence).expect("continue");

    let err = resumed.transition_to(CeoFinalReview).unwrap_err();
    assert_eq!(
        err,
        GovernanceError::IllegalTransition {
            from: MigrationSequence,
            to: CeoFinalReview
        }
    );
    assert_eq!(resumed.current_state(), Error);
    assert!(resumed.transition_to(Gates).is_err());
}

#[test]
fn receipt_from_one_checkpoint_does_not_unlock_another() {
    let (_temp, store) = scratch_store();
    let ctx = sealed_context(store);
    let (_, hashes) = run_session(&ctx);
    assert!(ctx.resume("final", &hashes[0]).is_err());
}

#[test]
fn store_documents_sit_alongside_checkpoints() {
    let (_temp, store) = scratch_store();
    let ctx = sealed_context(store);
    let state = doc(json!({"amendment": "A-17", "approved": true, "votes": [3, 1]}));
    ctx.store().write_state("amendment", &state).expect("write");
    let before = ctx.store().create_snapshot("amendment").expect("snapshot");

    run_session(&ctx);

    assert_eq!(ctx.store().read_state("amendment").expect("read"), state);
    assert_eq!(ctx.store().create_snapshot("amendment").expect("snapshot"), before);
}
