//! Packages and files the schema extractors never look at.

use resource_lint_go::{GoFile, GoPackage};

/// Last path segments of packages that hold no resource schemas.
const SKIPPED_PACKAGES: &[&str] = &[
    "test",
    "tests",
    "migration",
    "client",
    "clients",
    "validate",
    "parse",
    "model",
    "models",
];

/// Whether the package is a helper package (validators, parsers, clients...).
#[must_use]
pub fn is_skipped_package(package: &GoPackage) -> bool {
    let last = package
        .import_path()
        .rsplit('/')
        .next()
        .unwrap_or_default();
    SKIPPED_PACKAGES.contains(&last)
}

/// Whether the file is a test or the service registration.
#[must_use]
pub fn is_skipped_file(file: &GoFile) -> bool {
    file.is_test() || file.file_name() == "registration.go"
}

/// Files of `package` the extractors should walk.
pub fn schema_files(package: &GoPackage) -> impl Iterator<Item = &GoFile> {
    let skip_all = is_skipped_package(package);
    package
        .files()
        .iter()
        .filter(move |f| !skip_all && !is_skipped_file(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_packages_are_skipped() {
        let validate = GoPackage::from_sources(
            "example.com/p/internal/services/web/validate",
            &[("name.go", "package validate\n")],
        )
        .expect("package");
        assert!(is_skipped_package(&validate));
        assert_eq!(schema_files(&validate).count(), 0);

        let web = GoPackage::from_sources(
            "example.com/p/internal/services/web",
            &[
                ("web_app_resource.go", "package web\n"),
                ("web_app_resource_test.go", "package web\n"),
                ("registration.go", "package web\n"),
            ],
        )
        .expect("package");
        let names: Vec<&str> = schema_files(&web).map(GoFile::file_name).collect();
        assert_eq!(names, vec!["web_app_resource.go"]);
    }
}
