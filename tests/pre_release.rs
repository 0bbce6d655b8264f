//! Integration tests for the draft release upsert workflow.

use ugh::core::types::{ReleaseTarget, ReleaseType};
use ugh::engine::release::{pre_release, UpsertOutcome};
use ugh::engine::{Session, WorkflowError};
use ugh::forge::mock::{FailOn, MockForge, MockOperation};
use ugh::forge::{ForgeError, MergeMethod, PullRequest, Release};
use ugh::ui::output::Narrator;
use ugh::ui::prompts::ScriptedPrompter;

// =============================================================================
// Fixtures
// =============================================================================

fn ticket_pr(number: u64, ticket: &str, base: &str) -> PullRequest {
    PullRequest {
        number,
        url: format!("https://github.com/mock/repo/pull/{}", number),
        title: format!("{} change", ticket),
        head: ticket.to_string(),
        head_sha: format!("{}-tip", ticket),
        base: base.to_string(),
    }
}

fn release(id: u64, tag: &str, draft: bool, body: &str) -> Release {
    Release {
        id,
        tag: tag.to_string(),
        name: Some(tag.to_string()),
        body: body.to_string(),
        draft,
        prerelease: false,
        url: String::new(),
    }
}

fn prerelease(id: u64, tag: &str) -> Release {
    Release {
        prerelease: true,
        ..release(id, tag, false, "")
    }
}

fn ticket(name: &str) -> ReleaseTarget {
    ReleaseTarget::from_ticket(name)
}

async fn run(
    forge: &MockForge,
    prompter: &ScriptedPrompter,
    target: &ReleaseTarget,
    release_type: ReleaseType,
) -> Result<UpsertOutcome, WorkflowError> {
    let session = Session::new(forge, prompter, Narrator::quiet(), true);
    pre_release(&session, target, release_type).await
}

// =============================================================================
// Merge path
// =============================================================================

#[tokio::test]
async fn first_merge_creates_draft_from_baseline() {
    let forge = MockForge::new()
        .with_branch("master", "m1")
        .with_branch("TICKET-1", "TICKET-1-tip")
        .with_pr(ticket_pr(7, "TICKET-1", "master"));
    let prompter = ScriptedPrompter::always_yes();

    let outcome = run(&forge, &prompter, &ticket("TICKET-1"), ReleaseType::Patch)
        .await
        .unwrap();

    let UpsertOutcome::Created { merged, release } = outcome else {
        panic!("expected a created draft, got {:?}", outcome);
    };
    assert_eq!(merged, 7);
    assert_eq!(release.tag, "1.0.1");
    assert!(release.draft);
    assert_eq!(release.body, "* TICKET-1 change #7");
    assert_eq!(forge.merged_prs(), vec![7]);

    let mutations = forge.mutations();
    assert_eq!(
        mutations[0],
        MockOperation::MergePr {
            number: 7,
            sha: "TICKET-1-tip".into(),
            method: MergeMethod::Squash,
        }
    );
    assert_eq!(
        mutations[1],
        MockOperation::CreateRelease {
            tag: "1.0.1".into(),
            target_commitish: "master".into(),
            body: "* TICKET-1 change #7".into(),
            draft: true,
        }
    );
}

#[tokio::test]
async fn second_merge_appends_to_pending_draft() {
    let forge = MockForge::new()
        .with_branch("master", "m1")
        .with_branch("TICKET-1", "TICKET-1-tip")
        .with_branch("TICKET-2", "TICKET-2-tip")
        .with_release(release(1, "1.4.2", false, "* Old #1"))
        .with_pr(ticket_pr(8, "TICKET-1", "master"))
        .with_pr(ticket_pr(9, "TICKET-2", "master"));
    let prompter = ScriptedPrompter::always_yes();

    let first = run(&forge, &prompter, &ticket("TICKET-1"), ReleaseType::Minor)
        .await
        .unwrap();
    assert!(matches!(first, UpsertOutcome::Created { ref release, .. } if release.tag == "1.5.0"));

    let second = run(&forge, &prompter, &ticket("TICKET-2"), ReleaseType::Minor)
        .await
        .unwrap();
    let UpsertOutcome::Appended { release, .. } = second else {
        panic!("expected the pending draft to be detected, got {:?}", second);
    };
    assert_eq!(release.tag, "1.5.0");
    assert_eq!(release.body, "* TICKET-1 change #8\n* TICKET-2 change #9");

    // One draft, not two.
    let drafts: Vec<_> = forge.releases().into_iter().filter(|r| r.draft).collect();
    assert_eq!(drafts.len(), 1);
}

#[tokio::test]
async fn duplicate_line_is_not_deduplicated() {
    let forge = MockForge::new()
        .with_branch("master", "m1")
        .with_branch("TICKET-3", "TICKET-3-tip")
        .with_release(release(1, "1.0.1", true, "* TICKET-3 change #3"))
        .with_pr(ticket_pr(3, "TICKET-3", "master"));
    let prompter = ScriptedPrompter::always_yes();

    let outcome = run(&forge, &prompter, &ticket("TICKET-3"), ReleaseType::Patch)
        .await
        .unwrap();
    let UpsertOutcome::Appended { release, .. } = outcome else {
        panic!("expected append, got {:?}", outcome);
    };
    assert_eq!(release.body, "* TICKET-3 change #3\n* TICKET-3 change #3");
}

#[tokio::test]
async fn no_matching_pr_skips_repository() {
    let forge = MockForge::new()
        .with_branch("master", "m1")
        .with_pr(ticket_pr(4, "feature-x", "2.3.x"));
    let prompter = ScriptedPrompter::always_yes();

    let outcome = run(&forge, &prompter, &ticket("feature-x"), ReleaseType::Patch)
        .await
        .unwrap();

    assert_eq!(outcome, UpsertOutcome::Skipped);
    assert!(forge.mutations().is_empty());
    assert!(forge.releases().is_empty());
    assert!(prompter.asked().is_empty());
}

#[tokio::test]
async fn published_newest_release_means_new_draft() {
    let forge = MockForge::new()
        .with_branch("master", "m1")
        .with_branch("T", "T-tip")
        .with_release(release(1, "2.0.0", false, ""))
        .with_release(prerelease(2, "2.1.0-rc.1"))
        .with_pr(ticket_pr(5, "T", "master"));
    let prompter = ScriptedPrompter::always_yes();

    let outcome = run(&forge, &prompter, &ticket("T"), ReleaseType::Patch)
        .await
        .unwrap();
    assert!(matches!(outcome, UpsertOutcome::Created { ref release, .. } if release.tag == "2.0.1"));
}

#[tokio::test]
async fn rejected_merge_creates_no_release() {
    let forge = MockForge::new()
        .with_branch("master", "m1")
        .with_pr(ticket_pr(6, "T", "master"))
        .fail_on(FailOn::MergePr(ForgeError::ApiError {
            status: 409,
            message: "Head branch was modified. Review and try the merge again.".into(),
        }));
    let prompter = ScriptedPrompter::always_yes();

    let err = run(&forge, &prompter, &ticket("T"), ReleaseType::Patch)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Remote(ForgeError::ApiError { status: 409, .. })
    ));
    assert!(forge.releases().is_empty());
}

#[tokio::test]
async fn declining_merge_aborts() {
    let forge = MockForge::new()
        .with_branch("master", "m1")
        .with_pr(ticket_pr(7, "T", "master"));
    let prompter = ScriptedPrompter::new([false]);

    let err = run(&forge, &prompter, &ticket("T"), ReleaseType::Patch)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::UserAborted));
    assert!(forge.merged_prs().is_empty());
}

// =============================================================================
// Finalize path
// =============================================================================

#[tokio::test]
async fn finalize_recreates_draft_as_published() {
    let forge = MockForge::new()
        .with_default_branch("main")
        .with_branch("main", "m1")
        .with_release(release(1, "1.4.2", false, ""))
        .with_release(release(2, "1.4.3", true, "* A #1\n* B #2"));
    let prompter = ScriptedPrompter::always_yes();

    let outcome = run(
        &forge,
        &prompter,
        &ReleaseTarget::Finalize,
        ReleaseType::Patch,
    )
    .await
    .unwrap();

    let UpsertOutcome::Finalized(published) = outcome else {
        panic!("expected finalize, got {:?}", outcome);
    };
    assert_eq!(published.tag, "1.4.3");
    assert!(!published.draft);
    assert_eq!(published.body, "* A #1\n* B #2");

    assert_eq!(
        forge.mutations(),
        vec![
            MockOperation::DeleteRelease { id: 2 },
            MockOperation::CreateRelease {
                tag: "1.4.3".into(),
                target_commitish: "main".into(),
                body: "* A #1\n* B #2".into(),
                draft: false,
            },
        ]
    );
    assert!(!forge
        .operations()
        .iter()
        .any(|op| matches!(op, MockOperation::MergePr { .. } | MockOperation::ListOpenPrs { .. })));
}

#[tokio::test]
async fn finalize_keeps_prefixed_draft_tag() {
    let forge = MockForge::new()
        .with_release(release(1, "v1.4.2", false, ""))
        .with_release(release(2, "v1.4.3", true, "* A #1"));
    let prompter = ScriptedPrompter::always_yes();

    let outcome = run(
        &forge,
        &prompter,
        &ReleaseTarget::Finalize,
        ReleaseType::Patch,
    )
    .await
    .unwrap();

    let UpsertOutcome::Finalized(published) = outcome else {
        panic!("expected finalize, got {:?}", outcome);
    };
    assert_eq!(published.tag, "v1.4.3");
    assert_eq!(
        forge.mutations().last(),
        Some(&MockOperation::CreateRelease {
            tag: "v1.4.3".into(),
            target_commitish: "master".into(),
            body: "* A #1".into(),
            draft: false,
        })
    );
}

#[tokio::test]
async fn finalize_without_draft_names_version() {
    let forge = MockForge::new()
        .with_branch("master", "m1")
        .with_release(release(1, "1.4.2", false, ""));
    let prompter = ScriptedPrompter::always_yes();

    let err = run(
        &forge,
        &prompter,
        &ReleaseTarget::Finalize,
        ReleaseType::Patch,
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "Unable to find release '1.4.3' to finalize");
    assert!(forge.mutations().is_empty());
}

#[tokio::test]
async fn finalize_ignores_draft_of_other_type() {
    let forge = MockForge::new()
        .with_release(release(1, "1.4.2", false, ""))
        .with_release(release(2, "1.5.0", true, "* A #1"));
    let prompter = ScriptedPrompter::always_yes();

    let err = run(
        &forge,
        &prompter,
        &ReleaseTarget::Finalize,
        ReleaseType::Patch,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WorkflowError::Precondition(_)));

    let outcome = run(
        &forge,
        &prompter,
        &ReleaseTarget::Finalize,
        ReleaseType::Minor,
    )
    .await
    .unwrap();
    assert!(matches!(outcome, UpsertOutcome::Finalized(ref r) if r.tag == "1.5.0"));
}
