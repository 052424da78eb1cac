use picker_catalog::{fetch_page, CatalogOperation, FixtureCatalog, PageVariables, TransportError};

fn vars(first: u32, after: Option<&str>, query: Option<&str>) -> PageVariables {
    PageVariables { first, after: after.map(str::to_string), query: query.map(str::to_string) }
}

#[tokio::test]
async fn pages_through_products_with_opaque_cursors() {
    let cat = FixtureCatalog::demo(12, 0);
    let p1 = fetch_page(&cat, CatalogOperation::Products, vars(5, None, None)).await.unwrap();
    assert_eq!(p1.items.len(), 5);
    assert!(p1.page_info.has_next_page);
    let after = p1.page_info.end_cursor.clone();

    let p2 = fetch_page(&cat, CatalogOperation::Products, vars(5, after.as_deref(), None)).await.unwrap();
    assert_eq!(p2.items[0].id(), "gid://catalog/Product/6");
    assert!(p2.page_info.has_previous_page);

    let p3 = fetch_page(&cat, CatalogOperation::Products, vars(5, p2.page_info.end_cursor.as_deref(), None)).await.unwrap();
    assert_eq!(p3.items.len(), 2);
    assert!(!p3.page_info.has_next_page);
    assert_eq!(cat.requests(), 3);
}

#[tokio::test]
async fn query_filters_titles_case_insensitively() {
    let cat = FixtureCatalog::demo(0, 12);
    let page = fetch_page(&cat, CatalogOperation::Collections, vars(10, None, Some("collection 1"))).await.unwrap();
    let ids: Vec<_> = page.items.iter().map(|r| r.id().to_string()).collect();
    // "Collection 10".."Collection 12"
    assert_eq!(ids.len(), 3);
    assert!(ids.iter().all(|id| id.starts_with("gid://catalog/Collection/1")));
}

#[tokio::test]
async fn bad_cursor_and_injected_failures_surface_as_errors() {
    let cat = FixtureCatalog::demo(3, 0);
    let err = fetch_page(&cat, CatalogOperation::Products, vars(5, Some("nope"), None)).await.unwrap_err();
    assert!(matches!(err, TransportError::Status { status: 400, body: Some(_) }));
    let last = format!("fx:{}", usize::MAX);
    let err = fetch_page(&cat, CatalogOperation::Products, vars(5, Some(&last), None)).await.unwrap_err();
    assert!(matches!(err, TransportError::Status { status: 400, .. }));

    cat.fail_next(TransportError::Io("connection reset".into()));
    assert!(matches!(
        fetch_page(&cat, CatalogOperation::Products, vars(5, None, None)).await,
        Err(TransportError::Io(_))
    ));
    // Only the next request fails.
    assert!(fetch_page(&cat, CatalogOperation::Products, vars(5, None, None)).await.is_ok());
}
