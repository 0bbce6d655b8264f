//! engine::merge
//!
//! Locating a ticket's open pull request and squash-merging it.

use crate::forge::{Forge, ListPullsOpts, MergeMethod, MergePrRequest, PullRequest};

use super::WorkflowError;

/// Find the open pull request from `head` into `base`.
///
/// Returns `None` when there is no such pull request.
pub async fn find_open_pull_request(
    forge: &dyn Forge,
    head: &str,
    base: &str,
) -> Result<Option<PullRequest>, WorkflowError> {
    let opts = ListPullsOpts {
        head: Some(head.to_string()),
        base: Some(base.to_string()),
        ..Default::default()
    };
    let prs = forge.list_open_prs(opts.clone()).await?;
    Ok(prs.into_iter().find(|pr| opts.admits(pr)))
}

/// Squash-merge `pr`, pinned to the head SHA observed when it was listed.
///
/// The host rejects the merge if the branch has moved since.
pub async fn merge(forge: &dyn Forge, pr: &PullRequest) -> Result<String, WorkflowError> {
    tracing::debug!(repository = %forge.repository(), number = pr.number, sha = %pr.head_sha, "merging pull request");
    let sha = forge
        .merge_pr(MergePrRequest {
            number: pr.number,
            sha: pr.head_sha.clone(),
            method: MergeMethod::Squash,
        })
        .await?;
    Ok(sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{MockForge, MockOperation};

    fn pr(number: u64, head: &str, base: &str) -> PullRequest {
        PullRequest {
            number,
            url: String::new(),
            title: format!("{} work", head),
            head: head.into(),
            head_sha: format!("{}-tip", head),
            base: base.into(),
        }
    }

    #[tokio::test]
    async fn finds_by_head_and_base() {
        let forge = MockForge::new()
            .with_pr(pr(1, "TICKET-1", "2.2.x"))
            .with_pr(pr(2, "TICKET-1", "master"));
        let found = find_open_pull_request(&forge, "TICKET-1", "master")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.number, 2);
        assert!(find_open_pull_request(&forge, "TICKET-9", "master")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn merge_uses_squash_and_head_sha() {
        let forge = MockForge::new()
            .with_branch("master", "m")
            .with_pr(pr(5, "TICKET-5", "master"));
        let target = forge.pr(5).unwrap();
        merge(&forge, &target).await.unwrap();
        assert!(forge.operations().contains(&MockOperation::MergePr {
            number: 5,
            sha: "TICKET-5-tip".into(),
            method: MergeMethod::Squash,
        }));
    }
}
