//! forge::hub
//!
//! Forge implementation that shells out to the `hub` command line client.
//!
//! # Design
//!
//! `hub api -i <path>` performs an authenticated REST call using the
//! credentials `hub` already manages, and prints the status line, headers
//! and body. [`HubCli`] runs the program inside a repository checkout and
//! parses that output back into a status code and body; [`HubForge`] then
//! decodes bodies with the same [`super::payload`] types as the HTTP forge.
//!
//! `hub` exits non-zero for any status >= 400 but still prints the response,
//! so the exit code is only consulted when the output carries no status line.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::payload::{
    self, AssigneesBody, BranchResponse, CreatePrBody, CreateRefBody, CreateReleaseBody,
    LabelsBody, MergeBranchesBody, MergePrBody, PullRequestResponse, RefResponse,
    ReleaseResponse, RepositoryResponse, RequestReviewersBody, ShaOnly, UpdatePrBody,
    UpdateReleaseBody,
};
use super::traits::{
    BranchRef, CreatePrRequest, CreateReleaseRequest, Forge, ForgeError, ListPullsOpts,
    ListReleasesOpts, MergePrRequest, PullRequest, Release, UpdatePrRequest,
    UpdateReleaseRequest,
};
use crate::core::types::RepositoryId;

/// A parsed `hub api -i` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body (possibly empty)
    pub body: String,
}

impl HubResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode a success body, or map the error status.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ForgeError> {
        self.check()?;
        serde_json::from_str(&self.body).map_err(|e| ForgeError::ApiError {
            status: self.status,
            message: format!("Failed to parse response: {}", e),
        })
    }

    /// Map an error status to a [`ForgeError`].
    pub fn check(&self) -> Result<(), ForgeError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(ForgeError::from_status(
                self.status,
                payload::error_message(&self.body),
            ))
        }
    }
}

/// Split `hub api -i` output into status and body.
///
/// Returns `None` when the output does not start with an HTTP status line.
///
/// # Example
///
/// ```
/// use ugh::forge::hub::parse_included_response;
///
/// let output = "HTTP/1.1 404 Not Found\r\nServer: GitHub.com\r\n\r\n{\"message\":\"Not Found\"}";
/// let response = parse_included_response(output).unwrap();
/// assert_eq!(response.status, 404);
/// assert_eq!(response.body, "{\"message\":\"Not Found\"}");
/// ```
pub fn parse_included_response(output: &str) -> Option<HubResponse> {
    let status_line = output.lines().next()?;
    let mut parts = status_line.split_whitespace();
    if !parts.next()?.starts_with("HTTP/") {
        return None;
    }
    let status = parts.next()?.parse().ok()?;

    let body = output
        .split_once("\r\n\r\n")
        .or_else(|| output.split_once("\n\n"))
        .map(|(_, body)| body.trim().to_string())
        .unwrap_or_default();

    Some(HubResponse { status, body })
}

/// Runner for the `hub` program in a given checkout.
#[derive(Debug, Clone)]
pub struct HubCli {
    program: String,
    workdir: PathBuf,
}

impl HubCli {
    /// Create a runner for `program` executing in `workdir`.
    pub fn new(program: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
        }
    }

    /// The checkout the program runs in.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run the program with `args` and return its trimmed stdout.
    ///
    /// # Errors
    ///
    /// `ForgeError::CommandFailed` carrying stderr when the program cannot
    /// be started or exits non-zero.
    pub async fn run(&self, args: &[String]) -> Result<String, ForgeError> {
        let output = self.exec(args, None).await?;
        if !output.status.success() {
            return Err(self.failure(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Perform `hub api -i -X <method> <path>`.
    ///
    /// `fields` are passed with `-f` (query parameters for GET). `body` is
    /// piped to the program as the raw JSON request body.
    pub async fn api(
        &self,
        method: &str,
        path: &str,
        fields: &[(&str, String)],
        body: Option<String>,
    ) -> Result<HubResponse, ForgeError> {
        let mut args: Vec<String> = vec![
            "api".into(),
            "-i".into(),
            "-X".into(),
            method.into(),
            path.into(),
        ];
        for (key, value) in fields {
            args.push("-f".into());
            args.push(format!("{}={}", key, value));
        }
        if body.is_some() {
            args.push("--input".into());
            args.push("-".into());
        }

        let output = self.exec(&args, body).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(response) = parse_included_response(&stdout) {
            tracing::debug!(status = response.status, "hub response");
            return Ok(response);
        }
        if !output.status.success() {
            return Err(self.failure(&args, &output));
        }
        Err(ForgeError::CommandFailed {
            command: self.command_line(&args),
            message: "output did not contain an HTTP status line".into(),
        })
    }

    fn command_line(&self, args: &[String]) -> String {
        format!("{} {}", self.program, args.join(" "))
    }

    fn failure(&self, args: &[String], output: &Output) -> ForgeError {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        ForgeError::CommandFailed {
            command: self.command_line(args),
            message: if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            },
        }
    }

    /// Spawn the program, feed `input` on stdin, and collect its output.
    async fn exec(&self, args: &[String], input: Option<String>) -> Result<Output, ForgeError> {
        let command_line = self.command_line(args);
        tracing::debug!(command = %command_line, workdir = %self.workdir.display(), "running hub");
        let failed = |message: String| ForgeError::CommandFailed {
            command: command_line.clone(),
            message,
        };

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(format!("failed to execute: {}", e)))?;

        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(|e| failed(format!("failed to write request body: {}", e)))?;
        }

        child
            .wait_with_output()
            .await
            .map_err(|e| failed(e.to_string()))
    }
}

/// Forge backed by `hub api`.
#[derive(Debug, Clone)]
pub struct HubForge {
    cli: HubCli,
    repository: RepositoryId,
}

impl HubForge {
    /// Create a forge for `repository` using `cli`.
    pub fn new(cli: HubCli, repository: RepositoryId) -> Self {
        Self { cli, repository }
    }

    fn repo_path(&self, path: &str) -> String {
        let base = format!(
            "repos/{}/{}",
            self.repository.owner(),
            self.repository.name()
        );
        if path.is_empty() {
            base
        } else {
            format!("{}/{}", base, path)
        }
    }

    async fn get(&self, path: &str, fields: &[(&str, String)]) -> Result<HubResponse, ForgeError> {
        self.cli.api("GET", &self.repo_path(path), fields, None).await
    }

    async fn send<B: Serialize>(
        &self,
        method: &str,
        path: &str,
        body: Option<&B>,
    ) -> Result<HubResponse, ForgeError> {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ForgeError::ApiError {
                status: 0,
                message: format!("Failed to encode request: {}", e),
            })?;
        self.cli.api(method, &self.repo_path(path), &[], body).await
    }
}

#[async_trait]
impl Forge for HubForge {
    fn name(&self) -> &'static str {
        "hub"
    }

    fn repository(&self) -> &RepositoryId {
        &self.repository
    }

    async fn default_branch(&self) -> Result<String, ForgeError> {
        let repo: RepositoryResponse = self.get("", &[]).await?.decode()?;
        Ok(repo.default_branch)
    }

    async fn get_branch(&self, name: &str) -> Result<Option<BranchRef>, ForgeError> {
        match self
            .get(&format!("branches/{}", payload::branch_path(name)), &[])
            .await?
            .decode::<BranchResponse>()
        {
            Ok(branch) => Ok(Some(branch.into())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_branch(&self, name: &str, sha: &str) -> Result<BranchRef, ForgeError> {
        let body = CreateRefBody {
            ref_name: payload::heads_ref(name),
            sha,
        };
        let created: RefResponse = self.send("POST", "git/refs", Some(&body)).await?.decode()?;
        Ok(created.into())
    }

    async fn delete_branch(&self, name: &str) -> Result<(), ForgeError> {
        let path = format!("git/refs/heads/{}", payload::branch_path(name));
        self.send::<()>("DELETE", &path, None).await?.check()
    }

    async fn merge_branches(&self, base: &str, head: &str) -> Result<Option<String>, ForgeError> {
        let body = MergeBranchesBody { base, head };
        let response = self.send("POST", "merges", Some(&body)).await?;
        if response.status == 204 {
            return Ok(None);
        }
        let merged: ShaOnly = response.decode()?;
        Ok(Some(merged.sha))
    }

    async fn list_open_prs(&self, opts: ListPullsOpts) -> Result<Vec<PullRequest>, ForgeError> {
        let mut fields: Vec<(&str, String)> = vec![
            ("state", "open".to_string()),
            ("per_page", opts.per_page.to_string()),
        ];
        if let Some(head) = &opts.head {
            let head = if head.contains(':') {
                head.clone()
            } else {
                format!("{}:{}", self.repository.owner(), head)
            };
            fields.push(("head", head));
        }
        if let Some(base) = &opts.base {
            fields.push(("base", base.clone()));
        }
        let prs: Vec<PullRequestResponse> = self.get("pulls", &fields).await?.decode()?;
        Ok(prs.into_iter().map(Into::into).collect())
    }

    async fn create_pr(&self, request: CreatePrRequest) -> Result<PullRequest, ForgeError> {
        let body = CreatePrBody {
            head: &request.head,
            base: &request.base,
            title: &request.title,
            body: request.body.as_deref(),
            draft: request.draft,
        };
        let pr: PullRequestResponse = self.send("POST", "pulls", Some(&body)).await?.decode()?;
        Ok(pr.into())
    }

    async fn update_pr(&self, request: UpdatePrRequest) -> Result<PullRequest, ForgeError> {
        let body = UpdatePrBody {
            title: request.title.as_deref(),
            body: request.body.as_deref(),
            base: request.base.as_deref(),
        };
        let pr: PullRequestResponse = self
            .send("PATCH", &format!("pulls/{}", request.number), Some(&body))
            .await?
            .decode()?;
        Ok(pr.into())
    }

    async fn merge_pr(&self, request: MergePrRequest) -> Result<String, ForgeError> {
        let body = MergePrBody {
            sha: &request.sha,
            merge_method: request.method.to_string(),
        };
        let merged: ShaOnly = self
            .send("PUT", &format!("pulls/{}/merge", request.number), Some(&body))
            .await?
            .decode()?;
        Ok(merged.sha)
    }

    async fn request_reviewers(
        &self,
        number: u64,
        reviewers: &[String],
    ) -> Result<(), ForgeError> {
        if reviewers.is_empty() {
            return Ok(());
        }
        let body = RequestReviewersBody { reviewers };
        self.send(
            "POST",
            &format!("pulls/{}/requested_reviewers", number),
            Some(&body),
        )
        .await?
        .check()
    }

    async fn add_assignees(&self, number: u64, assignees: &[String]) -> Result<(), ForgeError> {
        if assignees.is_empty() {
            return Ok(());
        }
        let body = AssigneesBody { assignees };
        self.send("POST", &format!("issues/{}/assignees", number), Some(&body))
            .await?
            .check()
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), ForgeError> {
        if labels.is_empty() {
            return Ok(());
        }
        let body = LabelsBody { labels };
        self.send("POST", &format!("issues/{}/labels", number), Some(&body))
            .await?
            .check()
    }

    async fn list_releases(&self, opts: ListReleasesOpts) -> Result<Vec<Release>, ForgeError> {
        let fields = [
            ("per_page", opts.per_page.to_string()),
            ("page", opts.page.to_string()),
        ];
        let releases: Vec<ReleaseResponse> = self.get("releases", &fields).await?.decode()?;
        Ok(releases.into_iter().map(Release::from).collect())
    }

    async fn create_release(
        &self,
        request: CreateReleaseRequest,
    ) -> Result<Release, ForgeError> {
        let body = CreateReleaseBody {
            tag_name: &request.tag,
            target_commitish: &request.target_commitish,
            name: &request.name,
            body: &request.body,
            draft: request.draft,
            prerelease: request.prerelease,
        };
        let release: ReleaseResponse = self.send("POST", "releases", Some(&body)).await?.decode()?;
        Ok(release.into())
    }

    async fn update_release(
        &self,
        request: UpdateReleaseRequest,
    ) -> Result<Release, ForgeError> {
        let body = UpdateReleaseBody {
            name: request.name.as_deref(),
            body: request.body.as_deref(),
        };
        let release: ReleaseResponse = self
            .send("PATCH", &format!("releases/{}", request.id), Some(&body))
            .await?
            .decode()?;
        Ok(release.into())
    }

    async fn delete_release(&self, id: u64) -> Result<(), ForgeError> {
        self.send::<()>("DELETE", &format!("releases/{}", id), None)
            .await?
            .check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_included_response {
        use super::*;

        #[test]
        fn crlf_headers() {
            let out = "HTTP/1.1 201 Created\r\nLocation: x\r\n\r\n{\"sha\":\"abc\"}\n";
            let response = parse_included_response(out).unwrap();
            assert_eq!(response.status, 201);
            assert_eq!(response.body, "{\"sha\":\"abc\"}");
        }

        #[test]
        fn lf_headers_and_empty_body() {
            let out = "HTTP/2.0 204 No Content\nServer: GitHub.com\n\n";
            let response = parse_included_response(out).unwrap();
            assert_eq!(response.status, 204);
            assert_eq!(response.body, "");
        }

        #[test]
        fn not_http() {
            assert!(parse_included_response("").is_none());
            assert!(parse_included_response("hub: command not found").is_none());
            assert!(parse_included_response("HTTP/1.1 abc").is_none());
        }
    }

    mod hub_response {
        use super::*;

        #[test]
        fn decode_error_maps_status() {
            let response = HubResponse {
                status: 404,
                body: r#"{"message":"Not Found"}"#.into(),
            };
            let err = response.decode::<ShaOnly>().unwrap_err();
            assert_eq!(err, ForgeError::NotFound("Not Found".into()));
        }

        #[test]
        fn decode_success() {
            let response = HubResponse {
                status: 200,
                body: r#"{"sha":"abc"}"#.into(),
            };
            assert_eq!(response.decode::<ShaOnly>().unwrap().sha, "abc");
        }

        #[test]
        fn check_conflict_keeps_message() {
            let response = HubResponse {
                status: 409,
                body: r#"{"message":"Merge conflict"}"#.into(),
            };
            assert_eq!(
                response.check().unwrap_err(),
                ForgeError::ApiError {
                    status: 409,
                    message: "Merge conflict".into()
                }
            );
        }
    }

    mod hub_cli {
        use super::*;

        #[tokio::test]
        async fn missing_program_is_command_failure() {
            let temp = tempfile::TempDir::new().unwrap();
            let cli = HubCli::new("ugh-test-no-such-program", temp.path());
            let err = cli.api("GET", "repos/a/b", &[], None).await.unwrap_err();
            assert!(matches!(err, ForgeError::CommandFailed { .. }));
        }

        #[cfg(unix)]
        #[tokio::test]
        async fn fake_hub_script_round_trip() {
            use std::os::unix::fs::PermissionsExt;

            let temp = tempfile::TempDir::new().unwrap();
            let script = temp.path().join("fake-hub");
            std::fs::write(
                &script,
                "#!/bin/sh\ncat > /dev/null\nprintf 'HTTP/1.1 200 OK\\r\\n\\r\\n{\"default_branch\":\"main\"}'\nexit 0\n",
            )
            .unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

            let cli = HubCli::new(script.to_string_lossy(), temp.path());
            let forge = HubForge::new(cli, RepositoryId::parse("acme/widgets").unwrap());
            assert_eq!(forge.default_branch().await.unwrap(), "main");
        }

        #[cfg(unix)]
        #[tokio::test]
        async fn run_returns_trimmed_stdout() {
            let temp = tempfile::TempDir::new().unwrap();
            let cli = HubCli::new("echo", temp.path());
            let out = cli.run(&["hub".to_string(), "version".to_string()]).await.unwrap();
            assert_eq!(out, "hub version");
        }

        #[cfg(unix)]
        #[tokio::test]
        async fn non_zero_exit_without_status_uses_stderr() {
            use std::os::unix::fs::PermissionsExt;

            let temp = tempfile::TempDir::new().unwrap();
            let script = temp.path().join("fake-hub");
            std::fs::write(&script, "#!/bin/sh\necho 'bad credentials' >&2\nexit 1\n").unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

            let cli = HubCli::new(script.to_string_lossy(), temp.path());
            let err = cli.api("GET", "user", &[], None).await.unwrap_err();
            match err {
                ForgeError::CommandFailed { message, .. } => {
                    assert_eq!(message, "bad credentials")
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }
}
