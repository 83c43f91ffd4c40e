//! Tests for the edit-time validator and retrievers

use libover_resolver::retrievers::{FixedRetriever, GitRetriever};
use libover_resolver::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Confirms any version except "missing"; counts calls.
#[derive(Default)]
struct FakeRetriever {
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Retriever for FakeRetriever {
    fn kind(&self) -> &str { "fake" }

    async fn validate_version(
        &self,
        _spec: &RetrieverSpec,
        name: &str,
        version: &str,
        _context: &ScopeId,
    ) -> RetrieverResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if version == "missing" {
            Err(RetrieverError::version_not_found(name, version))
        } else {
            Ok(())
        }
    }
}

/// Never answers in time.
struct SlowRetriever;

#[async_trait::async_trait]
impl Retriever for SlowRetriever {
    fn kind(&self) -> &str { "slow" }

    async fn validate_version(
        &self,
        _spec: &RetrieverSpec,
        _name: &str,
        _version: &str,
        _context: &ScopeId,
    ) -> RetrieverResult<()> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}

/// Blocks its worker thread well past any test deadline.
struct BlockingRetriever;

#[async_trait::async_trait]
impl Retriever for BlockingRetriever {
    fn kind(&self) -> &str { "blocking" }

    async fn validate_version(
        &self,
        _spec: &RetrieverSpec,
        _name: &str,
        _version: &str,
        _context: &ScopeId,
    ) -> RetrieverResult<()> {
        std::thread::sleep(Duration::from_millis(600));
        Ok(())
    }
}

struct PanickingRetriever;

#[async_trait::async_trait]
impl Retriever for PanickingRetriever {
    fn kind(&self) -> &str { "panicking" }

    async fn validate_version(
        &self,
        _spec: &RetrieverSpec,
        _name: &str,
        _version: &str,
        _context: &ScopeId,
    ) -> RetrieverResult<()> {
        panic!("remote exploded");
    }
}

fn lib(name: &str, kind: &str) -> LibraryDefinition {
    LibraryDefinition::new(
        name,
        RetrieverSpec {
            kind: kind.into(),
            ..RetrieverSpec::default()
        },
    )
    .with_default_version("master")
}

struct Fixture {
    host: Arc<InMemoryHost>,
    validator: Validator,
    calls: Arc<AtomicUsize>,
}

fn fixture(config: ResolverConfig) -> Fixture {
    let host = Arc::new(InMemoryHost::new());
    host.add_folder("f");
    let calls = Arc::new(AtomicUsize::new(0));

    let mut retrievers = RetrieverRegistry::with_builtins();
    retrievers.register(FakeRetriever { calls: calls.clone() });
    retrievers.register(SlowRetriever);
    retrievers.register(BlockingRetriever);
    retrievers.register(PanickingRetriever);

    let resolver = Resolver::new(host.clone(), host.clone(), &config);
    let validator = Validator::new(resolver, Arc::new(retrievers), &config);
    Fixture { host, validator, calls }
}

fn scope() -> ScopeId {
    ScopeId::new("f")
}

// ===========================================================================
// validate
// ===========================================================================

#[tokio::test]
async fn validate_ok_for_overridable_library_and_existing_version() {
    let fx = fixture(ResolverConfig::default());
    fx.host.globals().replace_trusted(vec![lib("greet", "fake")]);

    let result = fx.validator.validate("greet", "develop", &scope()).await;
    assert_eq!(result, ValidationResult::Ok);
    assert!(!result.blocks_save());
    assert_eq!(fx.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn validate_trims_input() {
    let fx = fixture(ResolverConfig::default());
    fx.host.globals().replace_trusted(vec![lib("greet", "fake")]);

    assert!(fx.validator.validate("  greet ", " develop ", &scope()).await.is_ok());
}

#[tokio::test]
async fn validate_unknown_name() {
    let fx = fixture(ResolverConfig::default());
    fx.host.globals().replace_trusted(vec![lib("greet", "fake")]);

    let result = fx.validator.validate("unknown-lib", "x", &scope()).await;
    assert_eq!(result.failures(), vec![ValidationFailure::NameUnknown]);
    assert!(result.blocks_save());
    assert_eq!(fx.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn validate_immutable_library() {
    let fx = fixture(ResolverConfig::default());
    fx.host
        .globals()
        .replace_trusted(vec![lib("greet", "fake").with_allow_version_override(false)]);

    let result = fx.validator.validate("greet", "x", &scope()).await;
    assert_eq!(result.failures(), vec![ValidationFailure::VersionImmutable]);
}

#[tokio::test]
async fn validate_empty_name() {
    let fx = fixture(ResolverConfig::default());
    let result = fx.validator.validate("   ", "develop", &scope()).await;
    assert_eq!(result.failures(), vec![ValidationFailure::NameRequired]);
}

#[tokio::test]
async fn validate_empty_version_skips_retriever() {
    let fx = fixture(ResolverConfig::default());
    fx.host.globals().replace_trusted(vec![lib("greet", "fake")]);

    let result = fx.validator.validate("greet", "", &scope()).await;
    assert_eq!(result.failures(), vec![ValidationFailure::VersionRequired]);
    assert_eq!(fx.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn validate_collects_every_failure() {
    let fx = fixture(ResolverConfig::default());
    let result = fx.validator.validate("", "", &scope()).await;
    assert_eq!(
        result.failures(),
        vec![ValidationFailure::NameRequired, ValidationFailure::VersionRequired]
    );

    fx.host
        .globals()
        .replace_trusted(vec![lib("greet", "fake").with_allow_version_override(false)]);
    let result = fx.validator.validate("greet", "missing", &scope()).await;
    assert!(result.contains(ValidationFailure::VersionImmutable));
    assert!(result.contains(ValidationFailure::VersionUnresolvable));
}

#[tokio::test]
async fn unresolvable_version_is_advisory() {
    let fx = fixture(ResolverConfig::default());
    fx.host.globals().replace_trusted(vec![lib("greet", "fake")]);

    let result = fx.validator.validate("greet", "missing", &scope()).await;
    assert_eq!(result.failures(), vec![ValidationFailure::VersionUnresolvable]);
    assert!(!result.is_ok());
    assert!(!result.blocks_save());
}

#[tokio::test]
async fn retriever_timeout_becomes_unresolvable() {
    let mut config = ResolverConfig::default();
    config.validation.version_timeout_ms = 20;
    let fx = fixture(config);
    fx.host.globals().replace_trusted(vec![lib("greet", "slow")]);

    let result = fx.validator.validate("greet", "develop", &scope()).await;
    assert_eq!(result.failures(), vec![ValidationFailure::VersionUnresolvable]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_retriever_is_cut_off_at_timeout() {
    let mut config = ResolverConfig::default();
    config.validation.version_timeout_ms = 20;
    let fx = fixture(config);
    fx.host.globals().replace_trusted(vec![lib("greet", "blocking")]);

    let started = std::time::Instant::now();
    let result = fx.validator.validate("greet", "develop", &scope()).await;
    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(result.failures(), vec![ValidationFailure::VersionUnresolvable]);
    assert!(!result.blocks_save());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_retriever_becomes_unresolvable() {
    let fx = fixture(ResolverConfig::default());
    fx.host.globals().replace_trusted(vec![lib("greet", "panicking")]);

    let result = fx.validator.validate("greet", "develop", &scope()).await;
    assert_eq!(result.failures(), vec![ValidationFailure::VersionUnresolvable]);

    match fx.validator.check_version("greet", "develop", &scope()).await {
        VersionCheck::Failed(msg) => assert!(msg.contains("retriever task failed")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn unregistered_retriever_becomes_unresolvable() {
    let fx = fixture(ResolverConfig::default());
    fx.host.globals().replace_trusted(vec![lib("greet", "svn")]);

    let result = fx.validator.validate("greet", "develop", &scope()).await;
    assert_eq!(result.failures(), vec![ValidationFailure::VersionUnresolvable]);
}

#[tokio::test]
async fn validate_sees_folder_libraries_of_ancestors() {
    let fx = fixture(ResolverConfig::default());
    fx.host.set_folder_libraries(&ScopeId::new("f"), vec![lib("local", "fake")]);
    fx.host.add_folder("f/g");

    assert!(fx.validator.validate("local", "develop", &ScopeId::new("f/g")).await.is_ok());
    fx.host.add_folder("f2");
    let result = fx.validator.validate("local", "develop", &ScopeId::new("f2")).await;
    assert_eq!(result.failures(), vec![ValidationFailure::NameUnknown]);
}

#[tokio::test]
async fn validate_with_fixed_retriever() {
    let fx = fixture(ResolverConfig::default());
    fx.host.globals().replace_trusted(vec![LibraryDefinition::new(
        "greet",
        RetrieverSpec::fixed(["master", "develop"]),
    )]);

    assert!(fx.validator.validate("greet", "develop", &scope()).await.is_ok());
    let result = fx.validator.validate("greet", "unknown", &scope()).await;
    assert!(result.contains(ValidationFailure::VersionUnresolvable));
}

#[test]
fn failure_messages_and_severity() {
    assert_eq!(ValidationFailure::NameUnknown.to_string(), "No library with this name is defined for this folder.");
    assert!(ValidationFailure::VersionUnresolvable.is_advisory());
    assert!(!ValidationFailure::VersionImmutable.is_advisory());
    assert!(ValidationResult::from_failures(Default::default()).is_ok());
}

#[test]
fn validation_result_serializes_with_status() {
    let json = serde_json::to_value(ValidationResult::Ok).unwrap();
    assert_eq!(json["status"], "ok");
    let failed = ValidationResult::from_failures([ValidationFailure::NameUnknown].into_iter().collect());
    let json = serde_json::to_value(failed).unwrap();
    assert_eq!(json["status"], "failed");
    assert_eq!(json["failures"][0], "NameUnknown");
}

// ===========================================================================
// check_version
// ===========================================================================

#[tokio::test]
async fn check_version_empty_is_ok() {
    let fx = fixture(ResolverConfig::default());
    assert_eq!(fx.validator.check_version("greet", "", &scope()).await, VersionCheck::Ok);
}

#[tokio::test]
async fn check_version_unknown_library_is_deferred() {
    let fx = fixture(ResolverConfig::default());
    match fx.validator.check_version("greet", "develop", &scope()).await {
        VersionCheck::Deferred(msg) => assert!(msg.starts_with("Cannot validate")),
        other => panic!("expected deferred, got {:?}", other),
    }
}

#[tokio::test]
async fn check_version_reports_retriever_answer() {
    let fx = fixture(ResolverConfig::default());
    fx.host.globals().replace_trusted(vec![lib("greet", "fake")]);

    assert_eq!(fx.validator.check_version("greet", "develop", &scope()).await, VersionCheck::Ok);
    match fx.validator.check_version("greet", "missing", &scope()).await {
        VersionCheck::Failed(msg) => assert!(msg.contains("missing")),
        other => panic!("expected failure, got {:?}", other),
    }
}

// ===========================================================================
// Retrievers
// ===========================================================================

#[tokio::test]
async fn fixed_retriever_checks_declared_versions() {
    let spec = RetrieverSpec::fixed(["master"]);
    let r = FixedRetriever;
    assert!(r.validate_version(&spec, "greet", "master", &scope()).await.is_ok());
    assert!(matches!(
        r.validate_version(&spec, "greet", "develop", &scope()).await,
        Err(RetrieverError::VersionNotFound { .. })
    ));
}

#[tokio::test]
async fn git_retriever_requires_remote() {
    let spec = RetrieverSpec {
        kind: "git".into(),
        ..RetrieverSpec::default()
    };
    let result = GitRetriever::new().validate_version(&spec, "greet", "master", &scope()).await;
    assert!(matches!(result, Err(RetrieverError::Misconfigured(_))));
}

#[tokio::test]
async fn git_retriever_missing_program_is_io_error() {
    let spec = RetrieverSpec::git("/nonexistent/repo.git");
    let result = GitRetriever::with_program("/nonexistent/git-binary")
        .validate_version(&spec, "greet", "master", &scope())
        .await;
    assert!(matches!(result, Err(RetrieverError::Io(_))));
}

#[test]
fn registry_lists_builtins() {
    let registry = RetrieverRegistry::with_builtins();
    let mut kinds = registry.list();
    kinds.sort();
    assert_eq!(kinds, vec!["fixed", "git"]);
    assert!(registry.get("svn").is_none());
}
