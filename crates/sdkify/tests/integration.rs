//! Integration tests for sdkify

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MSBUILD_NS: &str = "http://schemas.microsoft.com/developer/msbuild/2003";
const NUSPEC_NS: &str = "http://schemas.microsoft.com/packaging/2011/08/nuspec.xsd";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let Ok(dir) = TempDir::new() else {
            panic!("failed to create temp dir");
        };
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            assert!(fs::create_dir_all(parent).is_ok());
        }
        assert!(fs::write(&path, content).is_ok());
        path
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).unwrap_or_default()
    }

    fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("sdkify");
        cmd.env("HOME", self.root());
        cmd.env("SDKIFY_CONFIG", self.root().join("no-config.toml"));
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("SDKIFY_LOG");
        cmd
    }
}

fn legacy_project(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="15.0" DefaultTargets="Build" xmlns="{}">
  <PropertyGroup>
    <TargetFrameworkVersion>v4.7.2</TargetFrameworkVersion>
  </PropertyGroup>
{}
</Project>
"#,
        MSBUILD_NS, body
    )
}

#[test]
fn test_version() {
    Workspace::new()
        .command()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sdkify"));
}

#[test]
fn test_help() {
    Workspace::new()
        .command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--what-if"))
        .stdout(predicate::str::contains("--nuspec"));
}

#[test]
fn test_what_if_previews_without_writing() {
    let ws = Workspace::new();
    let original = legacy_project(
        r#"  <ItemGroup>
    <ProjectReference Include="../Lib/Lib.csproj" />
  </ItemGroup>"#,
    );
    ws.write("App/App.csproj", &original);
    ws.write(
        "App/packages.config",
        r#"<packages><package id="Newtonsoft.Json" version="13.0.1" /></packages>"#,
    );

    ws.command()
        .arg(ws.root().join("App"))
        .arg("--what-if")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<PackageReference Include=\"Newtonsoft.Json\" Version=\"13.0.1\" />",
        ))
        .stdout(predicate::str::contains(
            "<ProjectReference Include=\"../Lib/Lib.csproj\" />",
        ))
        .stdout(predicate::str::contains("<OutputType>Library</OutputType>"))
        .stdout(predicate::str::contains("<TargetFramework>net472</TargetFramework>"));

    assert_eq!(ws.read("App/App.csproj"), original);
}

#[test]
fn test_dry_run_alias() {
    let ws = Workspace::new();
    let original = legacy_project("");
    ws.write("App.csproj", &original);

    ws.command()
        .arg(ws.root())
        .arg("--dry-run")
        .assert()
        .success();
    assert_eq!(ws.read("App.csproj"), original);
}

#[test]
fn test_migrates_in_place() {
    let ws = Workspace::new();
    ws.write(
        "Tests/Tests.csproj",
        &legacy_project(
            r#"  <ItemGroup>
    <Reference Include="Microsoft.VisualStudio.QualityTools.UnitTestFramework" />
  </ItemGroup>
  <Target Name="AfterBuild">
    <Exec Command="copy &quot;$(TargetPath)&quot; ..\out" />
  </Target>"#,
        ),
    );

    ws.command()
        .arg(ws.root().join("Tests/Tests.csproj"))
        .assert()
        .success();

    let migrated = ws.read("Tests/Tests.csproj");
    assert!(migrated.starts_with("<Project Sdk=\"Microsoft.NET.Sdk\">"));
    assert!(migrated.contains("<PackageReference Include=\"Microsoft.NET.Test.Sdk\""));
    assert!(migrated.contains("<PackageReference Include=\"MSTest.TestAdapter\""));
    assert!(migrated.contains("<PackageReference Include=\"MSTest.TestFramework\""));
    assert!(migrated.contains("<Target Name=\"PostBuild\" AfterTargets=\"PostBuildEvent\">"));
    assert!(migrated.contains("<Exec Command=\"copy &quot;$(TargetPath)&quot; ..\\out\" />"));
}

#[test]
fn test_recurse_flag() {
    let ws = Workspace::new();
    let nested = legacy_project("");
    ws.write("src/Nested/Nested.csproj", &nested);

    ws.command().arg(ws.root()).assert().success();
    assert_eq!(ws.read("src/Nested/Nested.csproj"), nested);

    ws.command().arg(ws.root()).arg("-r").assert().success();
    assert!(ws
        .read("src/Nested/Nested.csproj")
        .starts_with("<Project Sdk=\"Microsoft.NET.Sdk\">"));
}

#[test]
fn test_failure_does_not_stop_batch() {
    let ws = Workspace::new();
    ws.write("A/Broken.csproj", "<Project><PropertyGroup></Project>");
    ws.write("B/Good.csproj", &legacy_project(""));

    ws.command()
        .arg(ws.root())
        .arg("--recurse")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Broken.csproj"))
        .stderr(predicate::str::contains("1 migrated, 0 skipped, 1 failed"));

    assert!(ws
        .read("B/Good.csproj")
        .starts_with("<Project Sdk=\"Microsoft.NET.Sdk\">"));
}

#[test]
fn test_nuspec_missing_description_fails_project() {
    let ws = Workspace::new();
    let original = legacy_project("");
    ws.write("App.csproj", &original);
    let nuspec = ws.write(
        "App.nuspec",
        &format!(
            r#"<package xmlns="{}"><metadata><id>App</id><version>1.0.0</version><title>App</title><authors>me</authors></metadata></package>"#,
            NUSPEC_NS
        ),
    );

    ws.command()
        .arg(ws.root())
        .arg("--nuspec")
        .arg(&nuspec)
        .assert()
        .failure()
        .stderr(predicate::str::contains("description"));

    assert_eq!(ws.read("App.csproj"), original);
}

#[test]
fn test_nuspec_metadata_embedded() {
    let ws = Workspace::new();
    ws.write("App.csproj", &legacy_project(""));
    let nuspec = ws.write(
        "App.nuspec",
        &format!(
            r#"<package xmlns="{}"><metadata><id>Contoso.App</id><version>2.1.0</version><title>App</title><authors>Contoso</authors><description>Does things</description></metadata></package>"#,
            NUSPEC_NS
        ),
    );

    ws.command()
        .arg(ws.root())
        .arg("--nuspec")
        .arg(&nuspec)
        .arg("--generate-package-on-build")
        .assert()
        .success();

    let migrated = ws.read("App.csproj");
    assert!(migrated.contains("<GeneratePackageOnBuild>true</GeneratePackageOnBuild>"));
    assert!(migrated.contains("<PackageId>Contoso.App</PackageId>"));
    assert!(migrated.contains("<Description>Does things</Description>"));
}

#[test]
fn test_json_report() {
    let ws = Workspace::new();
    ws.write("App.csproj", &legacy_project(""));
    ws.write("Modern.csproj", "<Project Sdk=\"Microsoft.NET.Sdk\" />");

    let output = ws
        .command()
        .arg(ws.root())
        .arg("--what-if")
        .arg("--json")
        .output();
    let Ok(output) = output else {
        panic!("failed to run sdkify");
    };
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).unwrap_or_default();
    let statuses: Vec<_> = report["projects"]
        .as_array()
        .map(|projects| {
            projects
                .iter()
                .map(|p| p["outcome"]["status"].as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(statuses, vec!["previewed", "skipped"]);
    assert_eq!(
        report["projects"][0]["outcome"]["plan"]["output_kind"],
        "Library"
    );
}

#[test]
fn test_missing_root_fails() {
    let ws = Workspace::new();
    ws.command()
        .arg(ws.root().join("nowhere"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn test_invalid_flag() {
    Workspace::new()
        .command()
        .arg("--no-such-flag")
        .assert()
        .failure();
}

#[test]
fn test_nuspec_metadata_without_package_generation() {
    let ws = Workspace::new();
    ws.write("App.csproj", &legacy_project(""));
    let nuspec = ws.write(
        "App.nuspec",
        &format!(
            r#"<package xmlns="{}"><metadata><id>Contoso.App</id><version>2.1.0</version><title>App</title><authors>Contoso</authors><description>Does things</description></metadata></package>"#,
            NUSPEC_NS
        ),
    );

    ws.command()
        .arg(ws.root())
        .arg("--nuspec")
        .arg(&nuspec)
        .assert()
        .success();

    let migrated = ws.read("App.csproj");
    assert!(migrated.contains("<PackageId>Contoso.App</PackageId>"));
    assert!(!migrated.contains("GeneratePackageOnBuild"));
}
