use sitecontent::schema::builtin::{BlogPost, DiningEntry, PriceRange};
use sitecontent::schema::load_collections;
use sitecontent::ContentStore;
use std::path::PathBuf;

fn demo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../demos/site")
}

#[test]
fn test_demo_site_loads() {
    let root = demo_root();
    let collections = load_collections(&root, None).unwrap();
    let store = ContentStore::load(&root, &collections).unwrap();

    let posts: Vec<BlogPost> = store.entries("blog").unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "First post");
    assert!(posts[0].hero_image.as_ref().unwrap().is_local());
    assert!(posts[1].updated_date.is_some());

    let dining: Vec<DiningEntry> = store.entries("dining").unwrap();
    assert_eq!(dining.len(), 2);
    assert!(dining[0].pet_friendly);
    assert!(!dining[1].pet_friendly);
    assert_eq!(dining[1].price_range, Some(PriceRange::Expensive));
}

#[test]
fn test_demo_site_checks_clean() {
    let root = demo_root();
    let collections = load_collections(&root, None).unwrap();
    let report = ContentStore::check(&root, &collections);
    assert!(report.is_ok(), "{:?}", report);
    assert_eq!(report.issue_count(), 0);
}
