//! Integration tests for another-elm-init

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn init() -> Command {
        cargo_bin_cmd!("another-elm-init")
    }

    #[test]
    fn help_displays() {
        init()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Installs another-elm"))
            .stdout(predicate::str::contains("install"))
            .stdout(predicate::str::contains("status"));
    }

    #[test]
    fn version_displays() {
        init()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("another-elm-init"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        init()
            .args(["status", "--format", "yaml"])
            .assert()
            .failure();
    }
}

mod install_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const TEMPLATE: &str = "#!/usr/bin/env python3\n\
import sys\n\
random_suffix = None  # REPLACE ME\n\
another_elm_version = None  # REPLACE ME\n\
elm_std_dir = None  # REPLACE ME\n\
sys.exit(0)\n";

    const PACKAGES: &[(&str, &str)] = &[
        ("elm", "core"),
        ("elm", "json"),
        ("elm", "browser"),
        ("elm-explorations", "test"),
        ("elm-explorations", "markdown"),
    ];

    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let sandbox = Self { dir };

            let source = sandbox.source();
            fs::create_dir_all(&source).unwrap();
            fs::write(source.join("another-elm"), TEMPLATE).unwrap();
            for (_, name) in PACKAGES {
                let pkg = source.join(name);
                fs::create_dir_all(pkg.join("src/Platform/Unstable")).unwrap();
                fs::write(
                    pkg.join("elm.json"),
                    format!("{{\"name\": \"{}\", \"summary\": \"ANOTHER-ELM-VERSION\"}}\n", name),
                )
                .unwrap();
                fs::write(
                    pkg.join("src/Platform/Unstable/Scheduler.elm"),
                    "module Platform.Unstable.Scheduler exposing (..)\n",
                )
                .unwrap();
            }

            let pinned = sandbox.root().join("elm-home/another/0.19.1/packages/elm/core/1.0.5");
            fs::create_dir_all(&pinned).unwrap();
            fs::write(pinned.join("custom"), "").unwrap();
            sandbox
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn source(&self) -> PathBuf {
            self.root().join("checkout")
        }

        fn bin(&self) -> PathBuf {
            self.root().join("bin")
        }

        fn cache(&self) -> PathBuf {
            self.root().join("data/another-elm/packages")
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("another-elm-init");
            cmd.current_dir(self.source())
                .env("HOME", self.root())
                .env("XDG_DATA_HOME", self.root().join("data"))
                .env("ELM_HOME", self.root().join("elm-home"))
                .env("ANOTHER_ELM_INIT_CONFIG", self.root().join("init.toml"))
                .env("CI", "1");
            cmd
        }

        fn install(&self) -> assert_cmd::assert::Assert {
            self.cmd()
                .args(["install", "--dir"])
                .arg(self.bin())
                .assert()
        }
    }

    #[test]
    fn fresh_install_writes_executable_and_cache() {
        let sandbox = Sandbox::new();
        sandbox
            .install()
            .success()
            .stdout(predicate::str::contains("Installed another-elm to"))
            .stdout(predicate::str::contains("Rebuilt 5 std packages"))
            .stdout(predicate::str::contains("will break another-elm"));

        let exe = fs::read_to_string(sandbox.bin().join("another-elm")).unwrap();
        assert!(!exe.contains("REPLACE ME"));
        assert!(exe.contains("random_suffix = \""));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(sandbox.bin().join("another-elm"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }

        for (author, name) in PACKAGES {
            let entry = sandbox.cache().join(author).join(name);
            assert!(entry.join("custom").is_file(), "{}/{}", author, name);
            let manifest = fs::read_to_string(entry.join("elm.json")).unwrap();
            assert!(!manifest.contains("ANOTHER-ELM-VERSION"));
        }

        // The resolved elm/core version is no longer pinned
        assert!(!sandbox
            .root()
            .join("elm-home/another/0.19.1/packages/elm/core/1.0.5/custom")
            .exists());
    }

    #[test]
    fn executable_suffix_matches_cache_namespace() {
        let sandbox = Sandbox::new();
        sandbox.install().success();

        let exe = fs::read_to_string(sandbox.bin().join("another-elm")).unwrap();
        let suffix = exe
            .lines()
            .find_map(|l| l.strip_prefix("random_suffix = \""))
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap()
            .to_string();

        let module = sandbox
            .cache()
            .join("elm/core/src/Platform")
            .join(format!("Unstable{}", suffix))
            .join("Scheduler.elm");
        let text = fs::read_to_string(module).unwrap();
        assert!(text.contains(&format!("Platform.Unstable{}.Scheduler", suffix)));
    }

    #[test]
    fn second_install_is_reinstall_without_rebuilds() {
        let sandbox = Sandbox::new();
        sandbox.install().success();
        sandbox
            .install()
            .success()
            .stdout(predicate::str::contains("Reinstalled another-elm to"))
            .stdout(predicate::str::contains("already up to date"));
    }

    #[test]
    fn install_outside_path_warns() {
        let sandbox = Sandbox::new();
        sandbox
            .install()
            .success()
            .stderr(predicate::str::contains("is not in PATH"));
    }

    #[test]
    fn missing_template_fails_with_hint() {
        let sandbox = Sandbox::new();
        fs::remove_file(sandbox.source().join("another-elm")).unwrap();
        sandbox
            .install()
            .failure()
            .stderr(predicate::str::contains("Executable template not found"))
            .stderr(predicate::str::contains("Hint:"));
        assert!(!sandbox.bin().join("another-elm").exists());
    }

    #[test]
    fn missing_package_source_fails() {
        let sandbox = Sandbox::new();
        fs::remove_dir_all(sandbox.source().join("markdown")).unwrap();
        sandbox
            .install()
            .failure()
            .stderr(predicate::str::contains("Package source not found"));
        assert!(!sandbox.bin().join("another-elm").exists());
    }

    #[test]
    fn status_reports_entries() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["status", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("elm/core stale"));

        sandbox.install().success();
        sandbox
            .cmd()
            .args(["status", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"state\": \"fresh\""))
            .stdout(predicate::str::contains("\"state\": \"stale\"").not());
    }

    #[test]
    fn config_path_honours_override() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("init.toml"));
    }

    #[test]
    fn config_init_then_show() {
        let sandbox = Sandbox::new();
        sandbox.cmd().args(["config", "init"]).assert().success();
        assert!(sandbox.root().join("init.toml").is_file());

        sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[[packages]]"))
            .stdout(predicate::str::contains("elm-explorations"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let sandbox = Sandbox::new();
        fs::write(sandbox.root().join("init.toml"), "[paths]\nbogus = true\n").unwrap();
        sandbox
            .cmd()
            .args(["status"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
