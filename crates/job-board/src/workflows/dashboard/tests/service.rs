use std::sync::Arc;
use std::time::Duration;

use super::common::*;
use crate::workflows::dashboard::domain::{ApplicationId, UserId};
use crate::workflows::dashboard::filter::FilterCriteria;

#[tokio::test]
async fn list_reflects_backend_changes_between_calls() {
    let (service, source) = build_service();
    let first = service
        .list(&user(), &FilterCriteria::default(), None, false)
        .await
        .expect("first list");
    assert_eq!(first.total_items, 2);

    source
        .data
        .lock()
        .expect("lock")
        .applications
        .retain(|app| app.id != ApplicationId("app-2".to_string()));

    let second = service
        .list(&user(), &FilterCriteria::default(), None, false)
        .await
        .expect("second list");
    assert_eq!(second.total_items, 1);
    assert_eq!(source.application_calls(), 2);
}

#[tokio::test]
async fn view_ttl_serves_cached_views_until_it_expires() {
    let (service, source) = build_service();
    let service = service.with_view_ttl(Duration::from_secs(3600));

    for _ in 0..3 {
        service
            .list(&user(), &FilterCriteria::default(), None, false)
            .await
            .expect("list");
    }
    assert_eq!(source.application_calls(), 1);

    service
        .list(&user(), &FilterCriteria::default(), None, true)
        .await
        .expect("forced refresh");
    assert_eq!(source.application_calls(), 2);
}

#[tokio::test]
async fn session_map_is_capped() {
    let (service, _) = build_service();
    let service = service.with_session_limits(Duration::from_secs(3600), 50);

    for i in 0..200 {
        service
            .list(
                &UserId(format!("ghost-{i}")),
                &FilterCriteria::default(),
                None,
                false,
            )
            .await
            .expect("list");
    }

    assert_eq!(service.session_count(), 50);
}

#[test]
fn cap_evicts_least_recently_seen_session() {
    let (service, _) = build_service();
    let service = service.with_session_limits(Duration::from_secs(3600), 2);
    let first = service.session(&UserId("a".to_string()));
    std::thread::sleep(Duration::from_millis(2));
    service.session(&UserId("b".to_string()));
    std::thread::sleep(Duration::from_millis(2));
    service.session(&UserId("a".to_string()));

    service.session(&UserId("c".to_string()));

    assert_eq!(service.session_count(), 2);
    assert!(Arc::ptr_eq(&first, &service.session(&UserId("a".to_string()))));
}

#[test]
fn idle_sessions_are_swept_when_a_new_one_opens() {
    let (service, _) = build_service();
    let service = service.with_session_limits(Duration::ZERO, 100);

    service.session(&UserId("a".to_string()));
    service.session(&UserId("b".to_string()));
    service.session(&UserId("c".to_string()));

    assert_eq!(service.session_count(), 1);
}

#[test]
fn returning_user_reuses_the_session() {
    let (service, _) = build_service();

    let first = service.session(&user());
    let second = service.session(&user());

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(service.session_count(), 1);
}
