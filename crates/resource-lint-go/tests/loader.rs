//! Integration test: pattern expansion and transitive loading on a
//! throwaway module tree.

use std::fs;
use std::path::Path;

use resource_lint_go::{GoModule, LoadError, PackageLoader};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, content).expect("write");
}

fn module_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "go.mod", "module example.com/provider\n\ngo 1.22\n");
    write(
        root,
        "internal/services/network/lb_resource.go",
        "package network\n\nimport (\n\t\"fmt\"\n\t\"example.com/provider/internal/tf/pluginsdk\"\n\t\"github.com/hashicorp/go-azure-helpers/resourcemanager/commonschema\"\n)\n\nvar _ = fmt.Sprintf\nvar _ = pluginsdk.TypeString\nvar _ = commonschema.Location\n",
    );
    write(
        root,
        "internal/services/network/lb_resource_test.go",
        "package network\n",
    );
    write(
        root,
        "internal/services/network/lb_external_test.go",
        "package network_test\n",
    );
    write(
        root,
        "internal/services/compute/vm_resource.go",
        "package compute\n",
    );
    write(
        root,
        "internal/services/compute/testdata/fixture.go",
        "package fixture\n",
    );
    write(
        root,
        "internal/tf/pluginsdk/schema.go",
        "package pluginsdk\n\nconst TypeString = 1\n",
    );
    write(
        root,
        "vendor/github.com/hashicorp/go-azure-helpers/resourcemanager/commonschema/location.go",
        "package commonschema\n\nfunc Location() int { return 0 }\n",
    );
    dir
}

fn loader(root: &Path) -> PackageLoader {
    let module = GoModule::discover(root).expect("module");
    PackageLoader::new(module.clone(), module.root())
}

#[test]
fn recursive_pattern_finds_service_packages() {
    let dir = module_tree();
    let outcome = loader(dir.path())
        .load(&["./internal/services/...".to_owned()])
        .expect("load");

    assert!(!outcome.has_errors(), "{:?}", outcome.errors);
    let mut roots = outcome.roots.clone();
    roots.sort();
    assert_eq!(
        roots,
        vec![
            "example.com/provider/internal/services/compute".to_owned(),
            "example.com/provider/internal/services/network".to_owned(),
        ]
    );
}

#[test]
fn imports_are_followed_into_module_and_vendor() {
    let dir = module_tree();
    let outcome = loader(dir.path())
        .load(&["./internal/services/network".to_owned()])
        .expect("load");

    let registry = &outcome.registry;
    assert!(registry.contains("example.com/provider/internal/tf/pluginsdk"));
    assert!(registry.contains("github.com/hashicorp/go-azure-helpers/resourcemanager/commonschema"));
    assert!(!registry.contains("fmt"));

    let network = registry
        .get("example.com/provider/internal/services/network")
        .expect("root package");
    assert_eq!(network.files().len(), 2, "in-package test file kept, external dropped");
}

#[test]
fn syntax_errors_in_root_packages_are_reported() {
    let dir = module_tree();
    write(
        dir.path(),
        "internal/services/network/broken.go",
        "package network\n\nfunc {\n",
    );
    let outcome = loader(dir.path())
        .load(&["./internal/services/network".to_owned()])
        .expect("load");
    assert!(outcome.has_errors());
    assert!(matches!(outcome.errors[0], LoadError::Syntax { .. }));
}

#[test]
fn unmatched_pattern_is_an_error() {
    let dir = module_tree();
    let err = loader(dir.path()).load(&["./internal/services/missing".to_owned()]);
    assert!(matches!(err, Err(LoadError::NoPackages(_))));
}

#[test]
fn import_path_patterns_resolve_inside_module() {
    let dir = module_tree();
    let outcome = loader(dir.path())
        .load(&["example.com/provider/internal/services/compute".to_owned()])
        .expect("load");
    assert_eq!(
        outcome.roots,
        vec!["example.com/provider/internal/services/compute".to_owned()]
    );

    let err = loader(dir.path()).load(&["github.com/other/module".to_owned()]);
    assert!(matches!(err, Err(LoadError::OutsideModule(_))));
}
