use routescope_api::{ApiKind, ApiMetadata, CatalogService};
use routescope_core::{Catalog, CatalogConfig};
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

fn write_descriptor(dir: &Path, body: &str) {
    let meta = dir.join("discovery");
    fs::create_dir_all(&meta).unwrap();
    fs::write(meta.join("metadata.json"), body).unwrap();
}

fn named(dir: &Path, name: &str) {
    write_descriptor(dir, &format!(r#"{{"name": "{}"}}"#, name));
}

fn catalog(dir: &TempDir) -> Catalog {
    Catalog::new(CatalogConfig::new(dir.path()).with_mount(""))
}

fn names(apis: &[ApiMetadata]) -> Vec<&str> {
    apis.iter().map(|api| api.name.as_str()).collect()
}

#[tokio::test]
async fn test_category_with_leaf() {
    let dir = tempdir().unwrap();
    named(&dir.path().join("A"), "Cat A");
    named(&dir.path().join("A").join("x"), "X");

    let apis = catalog(&dir).discover().await;

    assert_eq!(apis.len(), 1);
    assert_eq!(apis[0].name, "Cat A");
    assert_eq!(apis[0].endpoint, "/A");
    let children = apis[0].sub_apis.as_ref().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "X");
    assert_eq!(children[0].endpoint, "/A/x");
    assert!(children[0].sub_apis.is_none());
}

#[tokio::test]
async fn test_pass_through_directory_is_hoisted() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("B")).unwrap();
    named(&dir.path().join("B").join("y"), "Y");

    let apis = catalog(&dir).discover().await;

    assert_eq!(apis.len(), 1);
    assert_eq!(apis[0].name, "Y");
    assert_eq!(apis[0].endpoint, "/B/y");
}

#[tokio::test]
async fn test_empty_subtree_yields_nothing() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a").join("b").join("c")).unwrap();
    fs::write(dir.path().join("a").join("route.rs"), "// handler without descriptor").unwrap();

    assert!(catalog(&dir).discover().await.is_empty());
}

#[tokio::test]
async fn test_descriptor_without_yielding_children() {
    let dir = tempdir().unwrap();
    let leaf = dir.path().join("leaf");
    named(&leaf, "Leaf");
    fs::create_dir_all(leaf.join("empty")).unwrap();
    fs::create_dir_all(leaf.join("also").join("empty")).unwrap();

    let apis = catalog(&dir).discover().await;

    assert_eq!(apis.len(), 1);
    assert!(apis[0].sub_apis.is_none());
    let json = serde_json::to_value(&apis[0]).unwrap();
    assert!(json.get("subApis").is_none());
}

#[tokio::test]
async fn test_children_concatenate_in_order() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    named(&root.join("cat"), "Cat");
    // `a` is a pass-through holding two leaves; `b` is a leaf; `c` is empty.
    named(&root.join("cat").join("a").join("one"), "One");
    named(&root.join("cat").join("a").join("two"), "Two");
    named(&root.join("cat").join("b"), "B");
    fs::create_dir_all(root.join("cat").join("c")).unwrap();

    let apis = catalog(&dir).discover().await;

    assert_eq!(apis.len(), 1);
    assert_eq!(names(apis[0].sub_apis()), vec!["One", "Two", "B"]);
}

#[tokio::test]
async fn test_hidden_underscore_and_reserved_names_are_skipped() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    named(&root.join(".git"), "Hidden");
    named(&root.join("_internal"), "Internal");
    named(&root.join("discovery").join("nested"), "Reserved");
    named(&root.join("visible"), "Visible");

    let apis = catalog(&dir).discover().await;

    assert_eq!(names(&apis), vec!["Visible"]);
}

#[tokio::test]
async fn test_malformed_descriptor_is_excluded_and_siblings_survive() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_descriptor(&root.join("broken"), "const metadata: APIMetadata = {");
    named(&root.join("broken").join("child"), "Orphan");
    named(&root.join("fine"), "Fine");

    let apis = catalog(&dir).discover().await;

    // The broken node degrades to a pass-through, so its child is hoisted.
    assert_eq!(names(&apis), vec!["Orphan", "Fine"]);
}

#[tokio::test]
async fn test_missing_root_yields_empty_catalog() {
    let dir = tempdir().unwrap();
    let catalog = Catalog::new(CatalogConfig::new(dir.path().join("does-not-exist")));
    assert!(catalog.discover().await.is_empty());
    assert!(catalog.list().await.unwrap().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_directory_does_not_abort_siblings() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let root = dir.path();
    let locked = root.join("locked");
    named(&locked.join("inner"), "Inner");
    named(&root.join("open"), "Open");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let apis = catalog(&dir).discover().await;

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    // Running as root ignores permission bits, so only assert the sibling.
    assert!(names(&apis).contains(&"Open"));
}

#[tokio::test]
async fn test_self_describing_root() {
    let dir = tempdir().unwrap();
    named(dir.path(), "Root");
    named(&dir.path().join("child"), "Child");

    let apis = catalog(&dir).discover().await;

    assert_eq!(names(&apis), vec!["Root"]);
    assert_eq!(apis[0].endpoint, "/");
    assert_eq!(names(apis[0].sub_apis()), vec!["Child"]);
}

#[tokio::test]
async fn test_mount_prefix_applies_to_endpoints() {
    let dir = tempdir().unwrap();
    named(&dir.path().join("generic").join("chat"), "Chat");

    let catalog = Catalog::new(CatalogConfig::new(dir.path()).with_mount("/api"));
    let apis = catalog.discover().await;

    assert_eq!(apis[0].endpoint, "/api/generic/chat");
}

#[tokio::test]
async fn test_describe_round_trips_every_endpoint() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    named(&root.join("A"), "Cat A");
    named(&root.join("A").join("x"), "X");
    named(&root.join("B").join("y"), "Y");

    let catalog = catalog(&dir);
    let apis = catalog.discover().await;

    fn walk<'a>(apis: &'a [ApiMetadata], out: &mut Vec<&'a ApiMetadata>) {
        for api in apis {
            out.push(api);
            walk(api.sub_apis(), out);
        }
    }
    let mut all = Vec::new();
    walk(&apis, &mut all);
    assert_eq!(all.len(), 3);

    for api in all {
        let described = catalog.describe(&api.endpoint).await.unwrap();
        assert_eq!(&described, api, "round trip for {}", api.endpoint);
    }
}

#[tokio::test]
async fn test_describe_unknown_endpoint() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("B")).unwrap();
    named(&dir.path().join("B").join("y"), "Y");
    let catalog = catalog(&dir);

    assert!(catalog.describe("/B").await.is_err());
    assert!(catalog.describe("/nowhere").await.is_err());
    assert!(catalog.describe("/B/../B/y").await.is_err());
    assert!(catalog.describe("/favicon.ico").await.is_err());
}

#[tokio::test]
async fn test_declared_endpoint_off_its_directory_is_not_resolved() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    named(&root.join("A"), "A");
    write_descriptor(
        &root.join("C"),
        r#"{"name": "Declared", "endpoint": "/elsewhere/c"}"#,
    );
    let catalog = catalog(&dir);

    // Still listed, but neither the declared nor the mapped endpoint resolves.
    let apis = catalog.discover().await;
    assert_eq!(apis[1].endpoint, "/elsewhere/c");
    assert!(catalog.describe("/elsewhere/c").await.is_err());
    assert!(catalog.describe("/C").await.is_err());
    assert!(catalog.describe("/A").await.is_ok());

    let report = catalog.check();
    assert!(report.has_errors());
    assert_eq!(report.findings.len(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_directory_is_neither_listed_nor_described() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    let root = dir.path().join("catalog");
    named(&root.join("visible"), "Visible");
    named(&dir.path().join("outside").join("secret"), "Outside");
    symlink(dir.path().join("outside"), root.join("link")).unwrap();
    symlink(dir.path().join("outside").join("secret"), root.join("direct")).unwrap();

    let catalog = Catalog::new(CatalogConfig::new(root.clone()).with_mount(""));

    assert_eq!(names(&catalog.discover().await), vec!["Visible"]);
    assert!(catalog.describe("/link/secret").await.is_err());
    assert!(catalog.describe("/direct").await.is_err());
    assert!(catalog.describe("/visible").await.is_ok());
}

#[tokio::test]
async fn test_kind_tag_does_not_affect_placement() {
    let dir = tempdir().unwrap();
    write_descriptor(
        &dir.path().join("chat"),
        r#"{"name": "Chat", "kind": "endpoint", "method": "POST"}"#,
    );
    write_descriptor(
        &dir.path().join("chat").join("history"),
        r#"{"name": "History", "kind": "category"}"#,
    );

    let apis = catalog(&dir).discover().await;

    assert_eq!(apis[0].kind, ApiKind::Endpoint);
    assert_eq!(apis[0].sub_apis()[0].kind, ApiKind::Category);
}

#[test]
fn test_check_flags_broken_descriptors() {
    let dir = tempdir().unwrap();
    named(&dir.path().join("ok"), "Ok");
    write_descriptor(&dir.path().join("bad"), "nope");

    let report = catalog(&dir).check();

    assert_eq!(report.total, 2);
    assert!(report.has_errors());
}

#[tokio::test]
async fn test_sample_catalog() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/catalog");
    let catalog = Catalog::new(CatalogConfig::new(root));

    let apis = catalog.discover().await;

    assert_eq!(names(&apis), vec!["Generic APIs", "Inspect Query"]);
    assert_eq!(apis[0].endpoint, "/api/generic");
    assert_eq!(names(apis[0].sub_apis()), vec!["Echo", "Inspect Upload"]);
    assert_eq!(apis[1].endpoint, "/api/tools/inspect-query");
    assert_eq!(apis[1].extra["x-owner"], "platform");

    let echo = catalog.describe("/api/generic/echo").await.unwrap();
    assert_eq!(echo.persisted_state().count(), 1);

    let report = catalog.check();
    assert!(!report.has_errors());
    assert_eq!(report.total, 5);
    assert_eq!(report.valid, 4);
}
