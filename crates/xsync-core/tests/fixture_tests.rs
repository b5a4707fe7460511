//! Golden descriptor tests using test-fixtures/descriptors

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use xsync_core::{Descriptor, Error, MappingEntry, PathResolver};

/// Path to the descriptor fixtures (relative to the workspace root).
fn fixture(name: &str) -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // crates/xsync-core -> ../../test-fixtures
    manifest_dir.join("../../test-fixtures/descriptors").join(name)
}

#[test]
fn manual_project_lists_mappings_in_order() {
    let descriptor = Descriptor::load(fixture("Manual.flprj")).unwrap();

    assert_eq!(
        descriptor.entries,
        vec![
            MappingEntry::new(
                "Content/Resources/Stylesheets/Styles.css",
                r"\\fileserver\docs\Stylesheets\Styles.css"
            ),
            MappingEntry::new(
                "Content/Resources/Images/Logo.png",
                "file:///mnt/docs/Images/Logo%20Dark.png"
            ),
            MappingEntry::new(
                "Content/Snippets/Legal.flsnp",
                "/mnt/docs/Snippets/Legal.flsnp"
            ),
        ]
    );
}

#[test]
fn manual_project_mappings_resolve_under_the_project() {
    let descriptor = Descriptor::load(fixture("Manual.flprj")).unwrap();
    let resolver = PathResolver::for_descriptor(&descriptor);

    for entry in &descriptor.entries {
        let pair = resolver.resolve(entry).unwrap();
        assert!(pair.local.as_str().starts_with(descriptor.base_dir.as_str()));
        assert!(pair.local.as_str().ends_with(&entry.local_spec));
    }
}

#[cfg(unix)]
#[test]
fn manual_project_external_forms() {
    let descriptor = Descriptor::load(fixture("Manual.flprj")).unwrap();
    let resolver = PathResolver::for_descriptor(&descriptor);
    let externals: Vec<String> = descriptor
        .entries
        .iter()
        .map(|e| resolver.resolve(e).unwrap().external.as_str().to_string())
        .collect();

    assert_eq!(
        externals,
        vec![
            "//fileserver/docs/Stylesheets/Styles.css",
            "/mnt/docs/Images/Logo Dark.png",
            "/mnt/docs/Snippets/Legal.flsnp",
        ]
    );
}

#[test]
fn project_without_synchronize_section_is_empty() {
    let descriptor = Descriptor::load(fixture("NoSync.flprj")).unwrap();
    assert!(descriptor.is_empty());
}

#[test]
fn mapping_without_external_path_is_rejected() {
    let err = Descriptor::load(fixture("MissingAttribute.flprj")).unwrap_err();
    assert!(matches!(err, Error::DescriptorParse { .. }));
}

#[test]
fn truncated_document_is_rejected() {
    let err = Descriptor::load(fixture("Truncated.flprj")).unwrap_err();
    assert!(matches!(err, Error::DescriptorParse { .. }));
}

#[test]
fn latin1_project_is_decoded_by_its_declaration() {
    let descriptor = Descriptor::load(fixture("Latin1.flprj")).unwrap();

    assert_eq!(
        descriptor.entries,
        vec![MappingEntry::new("Content/Caf\u{e9}.css", "/mnt/docs/Caf\u{e9}.css")]
    );
}
