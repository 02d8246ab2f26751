//! SDK-style descriptor assembly
//!
//! The emitter is a pure function of a [`MigrationPlan`]. Sections are written
//! from a fixed table so the layout is identical for every project; empty
//! sections produce no text but never change the relative order of the rest.

use crate::metadata::PackageMetadata;
use crate::types::{BuildHook, PackageReferenceEntry, ProjectReference};
use quick_xml::escape::escape;
use serde::Serialize;

pub const SDK_NAME: &str = "Microsoft.NET.Sdk";

const INDENT: &str = "  ";

/// Everything extracted from the legacy inputs for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    pub target_framework: String,
    pub output_kind: String,
    pub is_test_project: bool,
    pub generate_package_on_build: bool,
    pub metadata: Option<PackageMetadata>,
    pub project_references: Vec<ProjectReference>,
    pub package_references: Vec<PackageReferenceEntry>,
    pub pre_build: Option<BuildHook>,
    pub post_build: Option<BuildHook>,
}

type Section = fn(&MigrationPlan, &mut String);

const SECTIONS: [Section; 9] = [
    header,
    output_kind,
    package_metadata,
    project_references,
    package_references,
    generated_file_exclusion,
    pre_build_hook,
    post_build_hook,
    footer,
];

/// Render the complete descriptor text
pub fn emit(plan: &MigrationPlan) -> String {
    let mut out = String::new();
    for section in SECTIONS {
        section(plan, &mut out);
    }
    out
}

/// Escape a value for use inside a double-quoted attribute. Line breaks are
/// kept as character references so parsers do not normalise them to spaces.
fn attr(value: &str) -> String {
    escape(value).replace('\r', "&#xD;").replace('\n', "&#xA;")
}

fn line(out: &mut String, depth: usize, content: &str) {
    out.push_str(&INDENT.repeat(depth));
    out.push_str(content);
    out.push('\n');
}

fn property(out: &mut String, name: &str, value: &str) {
    line(out, 2, &format!("<{name}>{}</{name}>", escape(value)));
}

fn header(plan: &MigrationPlan, out: &mut String) {
    line(out, 0, &format!("<Project Sdk=\"{}\">", SDK_NAME));
    line(out, 1, "<PropertyGroup>");
    property(out, "TargetFramework", &plan.target_framework);
}

fn output_kind(plan: &MigrationPlan, out: &mut String) {
    property(out, "OutputType", &plan.output_kind);
    if plan.is_test_project {
        property(out, "IsTestProject", "true");
    }
    line(out, 1, "</PropertyGroup>");
}

fn package_metadata(plan: &MigrationPlan, out: &mut String) {
    if plan.metadata.is_none() && !plan.generate_package_on_build {
        return;
    }
    line(out, 1, "<PropertyGroup>");
    if plan.generate_package_on_build {
        property(out, "GeneratePackageOnBuild", "true");
    }
    if let Some(metadata) = &plan.metadata {
        property(out, "PackageId", &metadata.id);
        property(out, "Version", &metadata.version);
        property(out, "Title", &metadata.title);
        property(out, "Authors", &metadata.authors);
        property(out, "Description", &metadata.description);
    }
    line(out, 1, "</PropertyGroup>");
}

fn project_references(plan: &MigrationPlan, out: &mut String) {
    if plan.project_references.is_empty() {
        return;
    }
    line(out, 1, "<ItemGroup>");
    for reference in &plan.project_references {
        line(
            out,
            2,
            &format!("<ProjectReference Include=\"{}\" />", attr(&reference.path)),
        );
    }
    line(out, 1, "</ItemGroup>");
}

fn package_references(plan: &MigrationPlan, out: &mut String) {
    if plan.package_references.is_empty() {
        return;
    }
    line(out, 1, "<ItemGroup>");
    for package in &plan.package_references {
        line(
            out,
            2,
            &format!(
                "<PackageReference Include=\"{}\" Version=\"{}\" />",
                attr(&package.id),
                attr(&package.version)
            ),
        );
    }
    line(out, 1, "</ItemGroup>");
}

// Legacy projects keep their Properties/AssemblyInfo.cs; the SDK must not
// generate a second copy of the same attributes.
fn generated_file_exclusion(_plan: &MigrationPlan, out: &mut String) {
    line(out, 1, "<PropertyGroup>");
    property(out, "GenerateAssemblyInfo", "false");
    line(out, 1, "</PropertyGroup>");
}

fn hook(hook: Option<&BuildHook>, out: &mut String) {
    let Some(hook) = hook else {
        return;
    };
    let (ordering, anchor) = hook.kind.anchor();
    line(
        out,
        1,
        &format!(
            "<Target Name=\"{}\" {}=\"{}\">",
            hook.kind.target_name(),
            ordering,
            anchor
        ),
    );
    line(
        out,
        2,
        &format!("<Exec Command=\"{}\" />", attr(&hook.command)),
    );
    line(out, 1, "</Target>");
}

fn pre_build_hook(plan: &MigrationPlan, out: &mut String) {
    hook(plan.pre_build.as_ref(), out);
}

fn post_build_hook(plan: &MigrationPlan, out: &mut String) {
    hook(plan.post_build.as_ref(), out);
}

fn footer(_plan: &MigrationPlan, out: &mut String) {
    line(out, 0, "</Project>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HookKind;

    fn minimal_plan() -> MigrationPlan {
        MigrationPlan {
            target_framework: "net472".to_string(),
            output_kind: "Library".to_string(),
            is_test_project: false,
            generate_package_on_build: false,
            metadata: None,
            project_references: Vec::new(),
            package_references: Vec::new(),
            pre_build: None,
            post_build: None,
        }
    }

    #[test]
    fn test_minimal_descriptor() {
        let expected = "\
<Project Sdk=\"Microsoft.NET.Sdk\">
  <PropertyGroup>
    <TargetFramework>net472</TargetFramework>
    <OutputType>Library</OutputType>
  </PropertyGroup>
  <PropertyGroup>
    <GenerateAssemblyInfo>false</GenerateAssemblyInfo>
  </PropertyGroup>
</Project>
";
        assert_eq!(emit(&minimal_plan()), expected);
    }

    #[test]
    fn test_full_descriptor_section_order() {
        let plan = MigrationPlan {
            output_kind: "Exe".to_string(),
            is_test_project: true,
            generate_package_on_build: true,
            metadata: Some(PackageMetadata {
                id: "Contoso.App".to_string(),
                version: "1.0.0".to_string(),
                title: "App".to_string(),
                authors: "Contoso".to_string(),
                description: "Tools & more".to_string(),
            }),
            project_references: vec![ProjectReference {
                path: "../Lib/Lib.csproj".to_string(),
            }],
            package_references: vec![PackageReferenceEntry::new("Newtonsoft.Json", "13.0.1")],
            pre_build: Some(BuildHook {
                kind: HookKind::PreBuild,
                command: "echo pre".to_string(),
            }),
            post_build: Some(BuildHook {
                kind: HookKind::PostBuild,
                command: "echo post".to_string(),
            }),
            ..minimal_plan()
        };
        let expected = "\
<Project Sdk=\"Microsoft.NET.Sdk\">
  <PropertyGroup>
    <TargetFramework>net472</TargetFramework>
    <OutputType>Exe</OutputType>
    <IsTestProject>true</IsTestProject>
  </PropertyGroup>
  <PropertyGroup>
    <GeneratePackageOnBuild>true</GeneratePackageOnBuild>
    <PackageId>Contoso.App</PackageId>
    <Version>1.0.0</Version>
    <Title>App</Title>
    <Authors>Contoso</Authors>
    <Description>Tools &amp; more</Description>
  </PropertyGroup>
  <ItemGroup>
    <ProjectReference Include=\"../Lib/Lib.csproj\" />
  </ItemGroup>
  <ItemGroup>
    <PackageReference Include=\"Newtonsoft.Json\" Version=\"13.0.1\" />
  </ItemGroup>
  <PropertyGroup>
    <GenerateAssemblyInfo>false</GenerateAssemblyInfo>
  </PropertyGroup>
  <Target Name=\"PreBuild\" BeforeTargets=\"PreBuildEvent\">
    <Exec Command=\"echo pre\" />
  </Target>
  <Target Name=\"PostBuild\" AfterTargets=\"PostBuildEvent\">
    <Exec Command=\"echo post\" />
  </Target>
</Project>
";
        assert_eq!(emit(&plan), expected);
    }

    #[test]
    fn test_hook_command_is_escaped() {
        let plan = MigrationPlan {
            post_build: Some(BuildHook {
                kind: HookKind::PostBuild,
                command: "copy \"$(TargetPath)\" out && echo <done>\nexit 0".to_string(),
            }),
            ..minimal_plan()
        };
        let text = emit(&plan);
        assert!(text.contains(
            "<Exec Command=\"copy &quot;$(TargetPath)&quot; out &amp;&amp; echo &lt;done&gt;&#xA;exit 0\" />"
        ));
        assert!(!text.contains("PreBuild"));
    }

    #[test]
    fn test_generate_package_without_metadata() {
        let plan = MigrationPlan {
            generate_package_on_build: true,
            ..minimal_plan()
        };
        let text = emit(&plan);
        assert!(text.contains("<GeneratePackageOnBuild>true</GeneratePackageOnBuild>"));
        assert!(!text.contains("PackageId"));
    }
}
