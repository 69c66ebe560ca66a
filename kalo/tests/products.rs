mod helpers;

use helpers::{dead_address, TestClient};
use kalo_common::domain::BloodType;

#[tokio::test]
async fn search_is_case_insensitive_across_languages() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let en = tc.client.search_products("APPLE").await.unwrap();
    assert_eq!(en.len(), 1);
    assert_eq!(en[0].title.primary(), "Яблуко");

    let ua = tc.client.search_products("яблу").await.unwrap();
    assert_eq!(ua.len(), 1);
    assert_eq!(ua[0].title.primary(), "Яблуко");
}

#[tokio::test]
async fn search_matches_cyrillic_titles() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let hits = tc.client.search_products("хліб").await.unwrap();
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn search_caps_the_hits() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let hits = tc.client.search_products("a").await.unwrap();
    assert_eq!(hits.len(), 10);
}

#[tokio::test]
async fn an_empty_query_returns_nothing() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let hits = tc.client.search_products("").await.unwrap();
    assert!(hits.is_empty());

    let hits = tc.client.search_products("   ").await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn forbidden_products_follow_the_blood_group() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    let first = BloodType::new(1).unwrap();
    let for_first = tc.client.products_by_blood_type(first).await.unwrap();
    let names: Vec<&str> = for_first.iter().map(|p| p.title.primary()).collect();
    assert_eq!(for_first.len(), 5);
    assert!(names.contains(&"Оселедець"));
    assert!(names.contains(&"Свинина"));

    let second = BloodType::new(2).unwrap();
    let for_second = tc.client.products_by_blood_type(second).await.unwrap();
    let names: Vec<&str> = for_second.iter().map(|p| p.title.primary()).collect();
    assert!(!names.contains(&"Оселедець"));
    assert!(names.contains(&"Вівсянка"));

    let fourth = BloodType::new(4).unwrap();
    let for_fourth = tc.client.products_by_blood_type(fourth).await.unwrap();
    let names: Vec<&str> = for_fourth.iter().map(|p| p.title.primary()).collect();
    assert!(names.contains(&"Оселедець"));
    assert!(names.contains(&"Масло вершкове"));
}

#[tokio::test]
async fn sweets_are_excluded_for_every_group() {
    let address = dead_address().await.unwrap();
    let tc = TestClient::build(&address).unwrap();

    for group in 1..=4 {
        let blood_type = BloodType::new(group).unwrap();
        let hits = tc.client.products_by_blood_type(blood_type).await.unwrap();
        let names: Vec<&str> = hits.iter().map(|p| p.title.primary()).collect();
        assert!(names.contains(&"Цукор"), "group {group}");
        assert!(names.contains(&"Чорний шоколад"), "group {group}");
    }
}
