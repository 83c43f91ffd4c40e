//! Tests for libover-core: scope ids, library types, override entries, errors

use libover_core::*;

fn greet() -> LibraryDefinition {
    LibraryDefinition::new("greet", RetrieverSpec::git("https://example.com/greet.git"))
        .with_default_version("master")
}

// ===========================================================================
// ScopeId
// ===========================================================================

#[test]
fn scope_id_new_and_display() {
    let scope = ScopeId::new("team/app");
    assert_eq!(scope.as_str(), "team/app");
    assert_eq!(format!("{}", scope), "team/app");
    assert!(!scope.is_root());
}

#[test]
fn scope_id_root_displays_marker() {
    let root = ScopeId::root();
    assert!(root.is_root());
    assert_eq!(root.as_str(), "");
    assert_eq!(format!("{}", root), "<root>");
}

#[test]
fn scope_id_serializes_as_plain_string() {
    let scope: ScopeId = "f/g".into();
    assert_eq!(serde_json::to_string(&scope).unwrap(), r#""f/g""#);
    let back: ScopeId = serde_json::from_str(r#""f/g""#).unwrap();
    assert_eq!(back, scope);
}

// ===========================================================================
// TrustLevel
// ===========================================================================

#[test]
fn trust_level_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&TrustLevel::Trusted).unwrap(), r#""trusted""#);
    assert_eq!(serde_json::to_string(&TrustLevel::Untrusted).unwrap(), r#""untrusted""#);
}

#[test]
fn trust_level_parses_case_insensitively() {
    assert_eq!("Trusted".parse::<TrustLevel>().unwrap(), TrustLevel::Trusted);
    assert_eq!(" untrusted ".parse::<TrustLevel>().unwrap(), TrustLevel::Untrusted);
    assert!("elevated".parse::<TrustLevel>().is_err());
}

#[test]
fn trust_level_defaults_to_untrusted() {
    assert_eq!(TrustLevel::default(), TrustLevel::Untrusted);
}

// ===========================================================================
// LibraryDefinition
// ===========================================================================

#[test]
fn definition_defaults_allow_override_and_changesets() {
    let lib = LibraryDefinition::new("greet", RetrieverSpec::fixed(["master"]));
    assert!(lib.allow_version_override);
    assert!(lib.include_in_changesets);
    assert!(!lib.implicit);
    assert!(lib.caching.is_none());
    assert_eq!(lib.trust_level, TrustLevel::Untrusted);
}

#[test]
fn definition_deserialize_fills_defaults() {
    let json = r#"{"name":"greet","retriever":{"kind":"fixed","versions":["master"]},"default_version":"master"}"#;
    let lib: LibraryDefinition = serde_json::from_str(json).unwrap();
    assert_eq!(lib.name, "greet");
    assert!(lib.allow_version_override);
    assert!(lib.include_in_changesets);
    assert_eq!(lib.retriever.versions, vec!["master".to_string()]);
}

#[test]
fn definition_to_default_config_uses_default_version() {
    let config = greet().to_default_config(TrustLevel::Trusted);
    assert_eq!(config.name, "greet");
    assert_eq!(config.effective_version, "master");
    assert_eq!(config.trust_level, TrustLevel::Trusted);
}

// ===========================================================================
// ResolvedLibraryConfig
// ===========================================================================

#[test]
fn resolved_config_copies_every_attribute_but_version() {
    let caching = CachingConfig {
        refresh_time_minutes: 30,
        excluded_versions: vec!["develop".into()],
        included_versions: Vec::new(),
    };
    let lib = greet()
        .with_implicit(true)
        .with_include_in_changesets(false)
        .with_caching(caching.clone());

    let config = ResolvedLibraryConfig::from_definition(&lib, "develop", TrustLevel::Untrusted);
    assert_eq!(config.effective_version, "develop");
    assert_eq!(config.retriever, lib.retriever);
    assert!(config.implicit);
    assert!(!config.include_in_changesets);
    assert!(config.allow_version_override);
    assert_eq!(config.caching, Some(caching));
    assert_eq!(lib.default_version, "master");
}

// ===========================================================================
// OverrideEntry
// ===========================================================================

#[test]
fn override_entry_trims_name_and_version() {
    let entry = OverrideEntry::new("  greet   ", "   master   ");
    assert_eq!(entry.library_name, "greet");
    assert_eq!(entry.version, "master");
}

#[test]
fn override_entry_deserialize_trims() {
    let entry: OverrideEntry = serde_json::from_str(r#"{"name":" greet ","version":" develop"}"#).unwrap();
    assert_eq!(entry, OverrideEntry::new("greet", "develop"));
}

#[test]
fn override_entry_serializes_name_field() {
    let json = serde_json::to_string(&OverrideEntry::new("greet", "develop")).unwrap();
    assert_eq!(json, r#"{"name":"greet","version":"develop"}"#);
}

#[test]
fn override_entry_valid_when_known_and_complete() {
    let catalog = vec![greet()];
    assert!(OverrideEntry::new("  greet ", " master ").is_valid(&catalog));
}

#[test]
fn override_entry_invalid_for_unknown_name() {
    let catalog = vec![greet()];
    assert!(!OverrideEntry::new("groot", "master").is_valid(&catalog));
}

#[test]
fn override_entry_invalid_without_version() {
    let catalog = vec![greet()];
    assert!(!OverrideEntry::new("greet", "   ").is_valid(&catalog));
}

// ===========================================================================
// OverrideStore
// ===========================================================================

#[test]
fn override_store_set_replaces_wholesale() {
    let mut store = OverrideStore::new(vec![OverrideEntry::new("a", "1")]);
    store.set(vec![OverrideEntry::new("b", "2"), OverrideEntry::new("b", "3")]);
    let entries = store.get();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], OverrideEntry::new("b", "2"));
    assert_eq!(entries[1], OverrideEntry::new("b", "3"));
}

#[test]
fn override_store_keeps_duplicates_in_order() {
    let store: OverrideStore = vec![
        OverrideEntry::new("greet", "develop"),
        OverrideEntry::new("greet", "feature"),
    ]
    .into();
    assert_eq!(store.len(), 2);
    assert_eq!(store.entries()[1].version, "feature");
}

#[test]
fn override_store_is_a_plain_list_on_the_wire() {
    let store = OverrideStore::new(vec![OverrideEntry::new("greet", "develop")]);
    let json = serde_json::to_string(&store).unwrap();
    assert_eq!(json, r#"[{"name":"greet","version":"develop"}]"#);
    assert!(OverrideStore::default().is_empty());
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn error_messages() {
    assert_eq!(Error::library_not_found("greet").to_string(), "no library named greet found");
    assert_eq!(
        Error::version_override_denied("greet", "develop").to_string(),
        "version override not permitted for library greet (requested develop)"
    );
    assert_eq!(Error::config("bad").to_string(), "config error: bad");
}

#[test]
fn retriever_error_messages() {
    assert_eq!(
        RetrieverError::version_not_found("greet", "unknown").to_string(),
        "could not resolve unknown for library greet"
    );
    assert_eq!(RetrieverError::Timeout { after_ms: 50 }.to_string(), "timed out after 50ms");
}
