// tests/pipeline.rs

//! End-to-end build pipeline tests: stage ordering, failure propagation,
//! and the soft-failure stages.

mod common;

use common::{
    archive_owners, have_tools, hook_recipe, hook_sources, md5_of, sha256_of, SourceFile, TestEnv,
};
use hearth::registry::Registry;
use hearth::{Error, Kitchen, Stage};
use std::fs;

fn stages_before(stage: Stage) -> Vec<Stage> {
    Stage::ALL.into_iter().take_while(|s| *s != stage).collect()
}

fn assert_nothing_published(env: &TestEnv) {
    let artifacts = fs::read_dir(&env.config.artifact_dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(artifacts, 0, "no artifact may be produced by a failed build");
    let registry = Registry::new(&env.config.registry_dir);
    assert!(registry.history().unwrap().is_empty());
}

#[test]
fn test_hook_build_runs_every_stage() {
    if !have_tools("test_hook_build_runs_every_stage", &["tar"]) {
        return;
    }
    let env = TestEnv::new();
    let source = env.seed_source("hello-2.12.tar.gz", &hook_sources());
    let dir = env.recipe(
        "base",
        "hello",
        "2.12",
        &hook_recipe("hello", "2.12", &format!("SOURCE_SHA256 = \"{}\"", sha256_of(&source))),
    );

    let result = Kitchen::new(env.config.clone()).cook(&dir).unwrap();

    assert_eq!(result.completed, Stage::ALL.to_vec());
    assert_eq!(result.artifact, env.artifact("hello-2.12.tar.xz"));
    assert!(result.artifact.is_file());
    assert!(!result.warnings.iter().any(|w| w.contains("unverified")));

    let staged = env.config.staging_root.join("hello-2.12/usr/bin/hello");
    assert_eq!(fs::read(&staged).unwrap(), b"#!/bin/sh\necho hello\n");

    let registry = Registry::new(&env.config.registry_dir);
    let installed = registry.installed().unwrap();
    assert_eq!(installed.len(), 1);
    assert_eq!(installed[0].name, "hello");
    assert_eq!(installed[0].version, "2.12");
    assert_eq!(
        registry.manifest("hello", "2.12").unwrap(),
        vec!["usr", "usr/bin", "usr/bin/hello"]
    );

    let log = env.log("hello-2.12");
    assert!(log.contains("=== build ==="));
    assert!(log.contains("=== install ==="));
}

#[test]
fn test_default_build_uses_configure_and_make() {
    if !have_tools("test_default_build_uses_configure_and_make", &["tar", "make"]) {
        return;
    }
    let env = TestEnv::new();
    env.seed_source(
        "hello-2.12.tar.gz",
        &[
            SourceFile::executable("configure", b"#!/bin/sh\necho \"$@\" > configured\n"),
            SourceFile::new(
                "Makefile",
                b"all:\n\tcat configured > hello.out\n\ninstall:\n\tmkdir -p $(DESTDIR)/usr/share/hello\n\tcp hello.out $(DESTDIR)/usr/share/hello/configured\n",
            ),
        ],
    );
    let dir = env.recipe(
        "base",
        "hello",
        "2.12",
        r#"NAME = "hello"
VERSION = "2.12"
SOURCE_URL = "https://example.invalid/hello-%(version)s.tar.gz"
CONFIGURE = "--prefix=/usr --disable-nls"
"#,
    );

    let result = Kitchen::new(env.config.clone()).cook(&dir).unwrap();

    let staged = env
        .config
        .staging_root
        .join("hello-2.12/usr/share/hello/configured");
    assert_eq!(fs::read_to_string(staged).unwrap(), "--prefix=/usr --disable-nls\n");
    assert!(result.warnings.iter().any(|w| w.contains("unverified")));
}

#[test]
fn test_checksum_mismatch_stops_pipeline() {
    let env = TestEnv::new();
    env.seed_source("hello-2.12.tar.gz", &hook_sources());
    let dir = env.recipe(
        "base",
        "hello",
        "2.12",
        &hook_recipe("hello", "2.12", &format!("SOURCE_SHA256 = \"{}\"", "0".repeat(64))),
    );

    let failure = Kitchen::new(env.config.clone()).cook(&dir).unwrap_err();

    assert_eq!(failure.stage, Stage::VerifyChecksum);
    assert_eq!(failure.completed, vec![Stage::LoadRecipe, Stage::Fetch]);
    assert!(matches!(failure.error, Error::ChecksumMismatch { .. }));
    assert!(!env.config.build_root.join("hello-2.12").exists());
    assert_nothing_published(&env);
}

#[test]
fn test_sha256_takes_precedence_over_md5() {
    if !have_tools("test_sha256_takes_precedence_over_md5", &["tar"]) {
        return;
    }
    let env = TestEnv::new();
    let source = env.seed_source("hello-2.12.tar.gz", &hook_sources());
    let extra = format!(
        "SOURCE_SHA256 = \"{}\"\nMD5 = \"{}\"",
        sha256_of(&source).to_uppercase(),
        "f".repeat(32)
    );
    let dir = env.recipe("base", "hello", "2.12", &hook_recipe("hello", "2.12", &extra));

    assert!(Kitchen::new(env.config.clone()).cook(&dir).is_ok());
}

#[test]
fn test_md5_fallback_is_enforced() {
    let env = TestEnv::new();
    env.seed_source("hello-2.12.tar.gz", &hook_sources());
    let dir = env.recipe(
        "base",
        "hello",
        "2.12",
        &hook_recipe("hello", "2.12", &format!("MD5 = \"{}\"", "0".repeat(32))),
    );

    let failure = Kitchen::new(env.config.clone()).cook(&dir).unwrap_err();
    assert_eq!(failure.stage, Stage::VerifyChecksum);
    assert!(matches!(
        failure.error,
        Error::ChecksumMismatch { algorithm: "md5", .. }
    ));
    assert_nothing_published(&env);
}

#[test]
fn test_md5_fallback_accepts_match() {
    if !have_tools("test_md5_fallback_accepts_match", &["tar"]) {
        return;
    }
    let env = TestEnv::new();
    let source = env.seed_source("hello-2.12.tar.gz", &hook_sources());
    let dir = env.recipe(
        "base",
        "hello",
        "2.12",
        &hook_recipe("hello", "2.12", &format!("MD5 = \"{}\"", md5_of(&source))),
    );

    let result = Kitchen::new(env.config.clone()).cook(&dir).unwrap();
    assert!(result.warnings.iter().all(|w| !w.contains("unverified")));
}

#[test]
fn test_missing_checksum_is_a_warning() {
    if !have_tools("test_missing_checksum_is_a_warning", &["tar"]) {
        return;
    }
    let env = TestEnv::new();
    env.seed_source("hello-2.12.tar.gz", &hook_sources());
    let dir = env.recipe("base", "hello", "2.12", &hook_recipe("hello", "2.12", ""));

    let result = Kitchen::new(env.config.clone()).cook(&dir).unwrap();
    assert!(result.completed.contains(&Stage::VerifyChecksum));
    assert!(result.warnings.iter().any(|w| w.contains("unverified")));
}

#[test]
fn test_fetch_without_download_tool() {
    let mut env = TestEnv::new();
    env.config.tools.curl = "hearth-no-such-curl".to_string();
    env.config.tools.wget = "hearth-no-such-wget".to_string();
    let dir = env.recipe("base", "hello", "2.12", &hook_recipe("hello", "2.12", ""));

    let failure = Kitchen::new(env.config.clone()).cook(&dir).unwrap_err();
    assert_eq!(failure.stage, Stage::Fetch);
    assert!(matches!(failure.error, Error::FetchError(_)));
    assert!(!env.config.source_cache.join("hello-2.12.tar.gz").exists());
    assert_nothing_published(&env);
}

#[test]
fn test_corrupt_archive_fails_extraction() {
    if !have_tools("test_corrupt_archive_fails_extraction", &["tar"]) {
        return;
    }
    let env = TestEnv::new();
    env.seed_raw_source("hello-2.12.tar.gz", b"this is not a tarball");
    let dir = env.recipe("base", "hello", "2.12", &hook_recipe("hello", "2.12", ""));

    let failure = Kitchen::new(env.config.clone()).cook(&dir).unwrap_err();
    assert_eq!(failure.stage, Stage::Extract);
    assert!(matches!(failure.error, Error::ExtractionError(_)));
    assert_nothing_published(&env);
}

#[test]
fn test_failing_hooks_stop_at_their_stage() {
    if !have_tools("test_failing_hooks_stop_at_their_stage", &["tar"]) {
        return;
    }
    let cases = [
        ("PREPARE", Stage::Prepare),
        ("BUILD", Stage::Build),
        ("INSTALL", Stage::Install),
    ];

    for (key, stage) in cases {
        let env = TestEnv::new();
        env.seed_source("hello-2.12.tar.gz", &hook_sources());
        let dir = env.recipe(
            "base",
            "hello",
            "2.12",
            &format!(
                "NAME = \"hello\"\nVERSION = \"2.12\"\nSOURCE_URL = \"https://example.invalid/hello-2.12.tar.gz\"\n{}",
                ["PREPARE", "BUILD", "INSTALL"]
                    .iter()
                    .map(|hook| {
                        let body = if *hook == key { "exit 1" } else { "true" };
                        format!("{} = \"{}\"\n", hook, body)
                    })
                    .collect::<String>()
            ),
        );

        let failure = Kitchen::new(env.config.clone()).cook(&dir).unwrap_err();
        assert_eq!(failure.stage, stage, "{} hook", key);
        assert_eq!(failure.completed, stages_before(stage));

        match (&failure.error, stage) {
            (Error::InstallError { code, log }, Stage::Install) => {
                assert_eq!(*code, Some(1));
                assert!(log.is_file());
            }
            (Error::BuildError { code, .. }, Stage::Prepare | Stage::Build) => {
                assert_eq!(*code, Some(1));
            }
            (other, _) => panic!("unexpected error for {}: {:?}", key, other),
        }

        assert!(env.log("hello-2.12").contains(&format!("!!! {} failed", stage)));
        assert_nothing_published(&env);
    }
}

#[test]
fn test_hook_environment() {
    if !have_tools("test_hook_environment", &["tar"]) {
        return;
    }
    let env = TestEnv::new();
    env.seed_source("hello-2.12.tar.gz", &hook_sources());
    let dir = env.recipe(
        "base",
        "hello",
        "2.12",
        r#"NAME = "hello"
VERSION = "2.12"
SOURCE_URL = "https://example.invalid/hello-2.12.tar.gz"
MAKEFLAGS = "-j3 V=1"
BUILD = "test -f greeting.txt"
INSTALL = "mkdir -p \"$DESTDIR/etc\" && printf '%s|%s|%s|%s\n' \"$PKGNAME\" \"$PKGVERSION\" \"$MAKEFLAGS\" \"$(basename \"$SRCDIR\")\" > \"$DESTDIR/etc/env\""
"#,
    );

    Kitchen::new(env.config.clone()).cook(&dir).unwrap();

    let recorded = fs::read_to_string(env.config.staging_root.join("hello-2.12/etc/env")).unwrap();
    assert_eq!(recorded, "hello|2.12|-j3 V=1|hello-2.12\n");
}

#[test]
fn test_packaging_failure_stops_before_register() {
    if !have_tools("test_packaging_failure_stops_before_register", &["tar"]) {
        return;
    }
    let env = TestEnv::new();
    env.seed_source("hello-2.12.tar.gz", &hook_sources());
    fs::write(&env.config.artifact_dir, b"not a directory").unwrap();
    let dir = env.recipe("base", "hello", "2.12", &hook_recipe("hello", "2.12", ""));

    let failure = Kitchen::new(env.config.clone()).cook(&dir).unwrap_err();
    assert_eq!(failure.stage, Stage::Package);
    assert!(matches!(failure.error, Error::PackagingError(_)));
    assert!(Registry::new(&env.config.registry_dir).history().unwrap().is_empty());
}

#[test]
fn test_registration_failure() {
    if !have_tools("test_registration_failure", &["tar"]) {
        return;
    }
    let env = TestEnv::new();
    env.seed_source("hello-2.12.tar.gz", &hook_sources());
    fs::write(&env.config.registry_dir, b"not a directory").unwrap();
    let dir = env.recipe("base", "hello", "2.12", &hook_recipe("hello", "2.12", ""));

    let failure = Kitchen::new(env.config.clone()).cook(&dir).unwrap_err();
    assert_eq!(failure.stage, Stage::Register);
    assert!(matches!(failure.error, Error::RegistrationError(_)));
    assert_eq!(failure.completed, stages_before(Stage::Register));
}

#[test]
fn test_sync_failure_does_not_fail_build() {
    if !have_tools("test_sync_failure_does_not_fail_build", &["tar"]) {
        return;
    }
    let mut env = TestEnv::new();
    env.config.sync.auto_commit = true;
    env.config.tools.git = "hearth-no-such-git".to_string();
    env.seed_source("hello-2.12.tar.gz", &hook_sources());
    let dir = env.recipe("base", "hello", "2.12", &hook_recipe("hello", "2.12", ""));

    let result = Kitchen::new(env.config.clone()).cook(&dir).unwrap();
    assert_eq!(result.completed, Stage::ALL.to_vec());
    assert!(result.artifact.is_file());
    assert!(result.warnings.iter().any(|w| w.contains("sync-recipes stage failed")));
    assert!(result.warnings.iter().any(|w| w.contains("sync-artifacts stage failed")));
}

#[test]
fn test_rebuild_keeps_history() {
    if !have_tools("test_rebuild_keeps_history", &["tar"]) {
        return;
    }
    let env = TestEnv::new();
    env.seed_source("hello-2.12.tar.gz", &hook_sources());
    let dir = env.recipe("base", "hello", "2.12", &hook_recipe("hello", "2.12", ""));
    let kitchen = Kitchen::new(env.config.clone());

    kitchen.cook(&dir).unwrap();
    kitchen.cook(&dir).unwrap();

    let registry = Registry::new(&env.config.registry_dir);
    assert_eq!(registry.history().unwrap().len(), 2);
    assert_eq!(registry.installed().unwrap().len(), 1);
}

#[test]
fn test_rebuild_all_stops_at_first_failure() {
    if !have_tools("test_rebuild_all_stops_at_first_failure", &["tar"]) {
        return;
    }
    let env = TestEnv::new();
    for name in ["alpha", "bravo", "charlie"] {
        env.seed_source(&format!("{}-1.0.tar.gz", name), &hook_sources());
    }
    env.recipe("base", "alpha", "1.0", &hook_recipe("alpha", "1.0", ""));
    env.recipe(
        "base",
        "bravo",
        "1.0",
        "NAME = \"bravo\"\nVERSION = \"1.0\"\nSOURCE_URL = \"https://example.invalid/bravo-1.0.tar.gz\"\nBUILD = \"exit 2\"\n",
    );
    env.recipe("base", "charlie", "1.0", &hook_recipe("charlie", "1.0", ""));

    let failure = Kitchen::new(env.config.clone()).cook_all().unwrap_err();
    assert_eq!(failure.stage, Stage::Build);

    assert!(env.artifact("alpha-1.0.tar.xz").is_file());
    assert!(!env.artifact("bravo-1.0.tar.xz").exists());
    assert!(!env.artifact("charlie-1.0.tar.xz").exists());

    let installed = Registry::new(&env.config.registry_dir).installed().unwrap();
    let names: Vec<&str> = installed.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["alpha"]);
}

#[test]
fn test_unknown_compressor_falls_back_to_gzip() {
    if !have_tools("test_unknown_compressor_falls_back_to_gzip", &["tar"]) {
        return;
    }
    let mut env = TestEnv::new();
    env.config.compressor = "lz4".to_string();
    env.seed_source("hello-2.12.tar.gz", &hook_sources());
    let dir = env.recipe("base", "hello", "2.12", &hook_recipe("hello", "2.12", ""));

    let result = Kitchen::new(env.config.clone()).cook(&dir).unwrap();
    assert_eq!(result.artifact, env.artifact("hello-2.12.tar.gz"));
}

#[test]
fn test_install_without_privilege_emulation() {
    if !have_tools("test_install_without_privilege_emulation", &["tar"]) {
        return;
    }
    let mut env = TestEnv::new();
    env.config.tools.fakeroot = "hearth-no-such-fakeroot".to_string();
    env.seed_source("hello-2.12.tar.gz", &hook_sources());
    let dir = env.recipe("base", "hello", "2.12", &hook_recipe("hello", "2.12", ""));

    let result = Kitchen::new(env.config.clone()).cook(&dir).unwrap();
    assert_eq!(result.completed, Stage::ALL.to_vec());
    assert!(env
        .config
        .staging_root
        .join("hello-2.12/usr/bin/hello")
        .is_file());

    let emulation_warnings: Vec<&String> = result
        .warnings
        .iter()
        .filter(|w| w.contains("without privilege emulation"))
        .collect();
    if nix::unistd::geteuid().is_root() {
        assert!(emulation_warnings.is_empty());
    } else {
        assert_eq!(emulation_warnings.len(), 1);
        assert!(emulation_warnings[0].contains("hearth-no-such-fakeroot"));
        assert!(env.log("hello-2.12").contains("without privilege emulation"));
    }
}

#[test]
fn test_artifact_records_root_ownership() {
    if !have_tools("test_artifact_records_root_ownership", &["tar"]) {
        return;
    }
    let mut env = TestEnv::new();
    // Native root keeps on-disk owners (root); otherwise the owners are rewritten
    env.config.tools.fakeroot = "hearth-no-such-fakeroot".to_string();
    env.seed_source("hello-2.12.tar.gz", &hook_sources());
    let dir = env.recipe("base", "hello", "2.12", &hook_recipe("hello", "2.12", ""));

    let result = Kitchen::new(env.config.clone()).cook(&dir).unwrap();

    let owners = archive_owners(&result.artifact);
    let paths: Vec<&str> = owners.iter().map(|(p, _, _)| p.trim_end_matches('/')).collect();
    assert_eq!(paths, vec!["usr", "usr/bin", "usr/bin/hello"]);
    for (path, uid, gid) in &owners {
        assert_eq!((*uid, *gid), (0, 0), "{} is not owned by root", path);
    }
}

#[test]
fn test_whitespace_in_name_rejected_before_fetch() {
    let env = TestEnv::new();
    let dir = env.recipe("base", "hello", "2.12", &hook_recipe("hello world", "2.12", ""));

    let failure = Kitchen::new(env.config.clone()).cook(&dir).unwrap_err();
    assert_eq!(failure.stage, Stage::LoadRecipe);
    assert!(matches!(failure.error, Error::InvalidRecipe(_)));
    assert_nothing_published(&env);
}
