//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use git2::{Oid, Repository, Signature};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gitgenie::config::{ApiFormat, CompletionConfig, StaticCredentials};
use gitgenie::git::{GitRepo, SystemGit};
use gitgenie::interact::Prompter;
use gitgenie::llm::HttpCompletionClient;

pub const COMPLETION_PATH: &str = "/api/v1/chat/completions";
pub const TEST_API_KEY: &str = "sk-test-key";

/// A test git repository builder for integration tests.
///
/// Fixture history is written with git2; the code under test drives the
/// real `git` binary against the same directory.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");

        let mut config = repo.config().expect("Failed to open repo config");
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        config.set_bool("commit.gpgsign", false).unwrap();
        config.set_str("push.default", "current").unwrap();

        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A [`GitRepo`] driving the real git binary inside this repository.
    pub fn git(&self) -> GitRepo<SystemGit> {
        GitRepo::new(SystemGit::in_dir(self.path()))
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file in the working tree without staging it.
    pub fn write(&self, name: &str, content: &str) {
        let file_path = self.path().join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(file_path, content).expect("Failed to write test file");
    }

    /// Add a file to the index.
    pub fn stage(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write, stage and commit a file. Returns the commit OID.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> Oid {
        self.write(name, content);
        self.stage(name);

        let sig = self.signature();
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        // Get parent commit if exists
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a bare repository in its own temp directory and register it as
    /// `origin`. Keep the returned directory alive for the whole test.
    pub fn add_bare_origin(&self) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let remote_path = dir.path().join("widgets.git");
        Repository::init_bare(&remote_path).expect("Failed to init bare remote");
        self.set_origin_url(remote_path.to_str().expect("non-UTF-8 temp path"));
        (dir, remote_path)
    }

    pub fn set_origin_url(&self, url: &str) {
        self.repo.remote("origin", url).expect("Failed to add remote");
    }

    /// Number of commits reachable from HEAD.
    pub fn commit_count(&self) -> usize {
        let Ok(head) = self.repo.head() else {
            return 0;
        };
        let Some(oid) = head.target() else {
            return 0;
        };
        let mut walk = self.repo.revwalk().expect("Failed to create revwalk");
        walk.push(oid).expect("Failed to push HEAD");
        walk.count()
    }

    /// Full message of the HEAD commit.
    pub fn head_message(&self) -> String {
        let commit = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to resolve HEAD");
        commit.message().unwrap_or_default().to_string()
    }

    pub fn head_id(&self) -> String {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to resolve HEAD")
            .id()
            .to_string()
    }
}

/// Completion client pointed at a mock server.
pub fn client_for(server: &MockServer, format: ApiFormat) -> HttpCompletionClient {
    let config = CompletionConfig {
        api_url: format!("{}{COMPLETION_PATH}", server.uri()),
        model: "test/model".to_string(),
        format,
    };
    HttpCompletionClient::new(config, &StaticCredentials::new(TEST_API_KEY))
        .expect("Failed to build client")
}

/// Chat-completions response body carrying `content`.
pub fn chat_reply(content: &str) -> serde_json::Value {
    json!({
        "id": "gen-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
}

/// Mount a chat-completions endpoint that always answers with `content`.
pub async fn mount_chat_reply(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(content)))
        .mount(server)
        .await;
}

/// Prompter with a fixed answer that remembers every question it was asked.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub answer: bool,
    pub asked: std::sync::Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Default::default(),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, question: &str, _default: bool) -> bool {
        self.asked.lock().unwrap().push(question.to_string());
        self.answer
    }
}
