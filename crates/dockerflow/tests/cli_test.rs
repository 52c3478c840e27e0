#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;

mod common;
use common::TestProject;

fn dockerflow(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("dockerflow").unwrap();
    cmd.current_dir(project.path())
        .env_remove("DOCKERFLOW_PROJECT_ROOT")
        .env_remove("IMAGE_VERSION")
        .env_remove("REPOSITORY_OWNER");
    cmd
}

const SIMPLE_PROJECT: &str = r#"
project "demo" version="1.0"

registries {
    registry "local" {
        image-tag-prefix "localhost:5000"
    }
}
"#;

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("dockerflow").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tasks"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("--image-version"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("dockerflow").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dockerflow"));
}

/// 不正なコマンドでエラーになることを確認
#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("dockerflow").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

/// plan はタスクの指定が必須
#[test]
fn test_plan_requires_task() {
    let mut cmd = Command::cargo_bin("dockerflow").unwrap();
    cmd.arg("plan").assert().failure();
}

/// プロジェクト外で validate を実行するとエラーになることを確認
#[test]
fn test_validate_without_project() {
    let project = TestProject::new();
    dockerflow(&project)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("プロジェクトルートが見つかりません"));
}

#[test]
fn test_validate_summary() {
    let project = TestProject::new();
    project.write_docker_kdl(SIMPLE_PROJECT);

    dockerflow(&project)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("設定ファイルは正常です"))
        .stdout(predicate::str::contains("demo:1.0"))
        .stdout(predicate::str::contains("localhost:5000/"));
}

#[test]
fn test_validate_reports_kdl_errors() {
    let project = TestProject::new();
    project.write_docker_kdl("images {\n    image \"main\" {\n");

    dockerflow(&project)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("設定エラー"));
}

#[test]
fn test_validate_reports_name_collisions() {
    let project = TestProject::new();
    project.write_docker_kdl(
        r#"
images {
    image "my-app"
    image "my.app"
}
"#,
    );

    dockerflow(&project)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("MyApp"));
}

#[test]
fn test_validate_rejects_registry_without_prefix() {
    let project = TestProject::new();
    project.write_docker_kdl(
        r#"
registries {
    registry "bare" {
        url "registry.example.com"
    }
}
"#,
    );

    dockerflow(&project)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("image-tag-prefix"));
}

#[test]
fn test_tasks_lists_groups() {
    let project = TestProject::new();
    project.write_docker_kdl(SIMPLE_PROJECT);

    dockerflow(&project)
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Build tasks"))
        .stdout(predicate::str::contains("dockerBuildMain"))
        .stdout(predicate::str::contains("dockerPublishMainToLocal"))
        .stdout(predicate::str::contains("publishAllImagesToLocal"))
        .stdout(predicate::str::contains("dockerPrepareMain").not());

    dockerflow(&project)
        .args(["tasks", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dockerPrepareMain"));
}

#[test]
fn test_plan_shows_commands_in_order() {
    let project = TestProject::new();
    project.write_docker_kdl(SIMPLE_PROJECT);

    let output = dockerflow(&project)
        .args(["plan", "dockerPush"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();

    let prepare = stdout.find("dockerPrepareMain").unwrap();
    let build = stdout.find("dockerBuildMain").unwrap();
    let publish = stdout.find("dockerPublishMainToLocal").unwrap();
    assert!(prepare < build && build < publish);
    assert!(stdout.contains("docker push localhost:5000/demo:1.0"));
    assert!(stdout.contains("-t localhost:5000/demo:latest"));
}

#[test]
fn test_plan_json() {
    let project = TestProject::new();
    project.write_docker_kdl(SIMPLE_PROJECT);

    let output = dockerflow(&project)
        .args(["plan", "dockerBuildMain", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let names: Vec<&str> = plan
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["dockerPrepareMain", "dockerBuildMain"]);
    assert_eq!(plan[1]["action"]["type"], "exec");
    assert_eq!(plan[1]["action"]["args"][0], "build");
}

#[test]
fn test_plan_json_hides_password() {
    let project = TestProject::new();
    project.write_docker_kdl(
        r#"
project "demo" version="1.0"
registries {
    registry "local" {
        image-tag-prefix "localhost:5000"
        url "localhost:5000"
        username "admin"
        password "s3cret"
    }
}
"#,
    );

    let output = dockerflow(&project)
        .args(["plan", "dockerLoginLocal", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();

    assert!(!stdout.contains("s3cret"));
    let plan: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        plan[0]["action"]["args"],
        serde_json::json!(["login", "-u", "admin", "-p", "******", "localhost:5000"])
    );
}

#[test]
fn test_plan_unknown_task() {
    let project = TestProject::new();
    project.write_docker_kdl(SIMPLE_PROJECT);

    dockerflow(&project)
        .args(["plan", "dockerDeploy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dockerDeploy"));
}

#[test]
fn test_image_version_from_env() {
    let project = TestProject::new();
    project.write_docker_kdl(SIMPLE_PROJECT);

    dockerflow(&project)
        .env("IMAGE_VERSION", "2.5.0")
        .args(["plan", "dockerPublishMainToLocal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docker push localhost:5000/demo:2.5.0"));
}

#[test]
fn test_repository_owner_for_ghcr() {
    let project = TestProject::new();
    project.write_docker_kdl(
        r#"
project "demo" version="1.0"
registries {
    github-container-registry
}
"#,
    );

    dockerflow(&project)
        .env("REPOSITORY_OWNER", "octocat")
        .args(["plan", "dockerPublishMainToGhcr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ghcr.io/octocat/demo:1.0"));

    // ユーザー名がなければ ghcr は登録されない
    dockerflow(&project)
        .args(["plan", "dockerPublishMainToGhcr"])
        .assert()
        .failure();
}

#[test]
fn test_project_dir_flag() {
    let project = TestProject::new();
    project.write_docker_kdl(SIMPLE_PROJECT);

    let mut cmd = Command::cargo_bin("dockerflow").unwrap();
    cmd.current_dir(std::env::temp_dir())
        .env_remove("DOCKERFLOW_PROJECT_ROOT")
        .arg("-p")
        .arg(project.path())
        .args(["plan", "dockerRun"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docker run --rm demo:1.0"));
}

#[test]
fn test_local_override_wins() {
    let project = TestProject::new();
    project.write_docker_kdl(SIMPLE_PROJECT);
    project.write_local_kdl(
        r#"
images {
    main {
        image-version "dev"
    }
}
"#,
    );

    dockerflow(&project)
        .args(["plan", "dockerRun"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docker run --rm demo:dev"));
}

#[test]
fn test_run_dry_run_has_no_side_effects() {
    let project = TestProject::new();
    project.write_docker_kdl(
        r#"
project "demo" version="1.0"
images {
    main {
        files {
            from "docker"
        }
    }
}
"#,
    );
    project.write_file("docker/Dockerfile", "FROM scratch\n");

    dockerflow(&project)
        .args(["run", "dockerBuild", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dockerPrepareMain"))
        .stdout(predicate::str::contains("dockerBuildMain"));

    assert!(!project.path().join("build").exists());
}

#[test]
fn test_run_prepare_stages_files() {
    let project = TestProject::new();
    project.write_docker_kdl(
        r#"
project "demo" version="1.0"
images {
    main {
        files {
            from "docker"
            from "app.jar" rename="service.jar"
        }
    }
}
"#,
    );
    project.write_file("docker/Dockerfile", "FROM scratch\n");
    project.write_file("app.jar", "jar");

    dockerflow(&project)
        .args(["run", "dockerPrepareMain"])
        .assert()
        .success();

    let context = project.path().join("build/docker/prepare/main");
    assert!(context.join("Dockerfile").exists());
    assert!(context.join("service.jar").exists());
}

#[test]
fn test_run_missing_source_fails() {
    let project = TestProject::new();
    project.write_docker_kdl(
        r#"
images {
    main {
        files {
            from "missing"
        }
    }
}
"#,
    );

    dockerflow(&project)
        .args(["run", "dockerPrepareMain"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("コピー元が見つかりません"));
}

#[test]
fn test_dockerfile_for_application() {
    let project = TestProject::new();
    project.write_docker_kdl(
        r#"
project "demo" version="1.0"
application "demo"
"#,
    );

    dockerflow(&project)
        .arg("dockerfile")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("FROM eclipse-temurin:21\n"))
        .stdout(predicate::str::contains("CMD [\"demo/bin/demo\"]"));
}

#[test]
fn test_dockerfile_application_declared_before_project() {
    let project = TestProject::new();
    project.write_docker_kdl(
        r#"
application
project "shop" version="1.0"
"#,
    );

    dockerflow(&project)
        .arg("dockerfile")
        .assert()
        .success()
        .stdout(predicate::str::contains("CMD [\"shop/bin/shop\"]"));
}

#[test]
fn test_dockerfile_without_application() {
    let project = TestProject::new();
    project.write_docker_kdl(SIMPLE_PROJECT);

    dockerflow(&project)
        .arg("dockerfile")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JVMアプリケーション"));
}
