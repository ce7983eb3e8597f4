use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{test, App};
use serde_json::{json, Value};

use infra::memory::{MemoryConnectionManager, MemoryTable};
use infra::persistence::{MenuRow, Storage};
use menucard::config::ApiConfig;
use menucard::MenuCard;

fn catalog(strict_errors: bool) -> (MemoryTable, MenuCard<MemoryConnectionManager>) {
    env_logger::try_init().unwrap_or_default();
    let table = MemoryTable::new();
    let card = MenuCard::with_pool(table.pool().expect("pool"), &ApiConfig { strict_errors });
    (table, card)
}

async fn body_text(resp: ServiceResponse) -> String {
    let body = test::read_body(resp).await;
    String::from_utf8(body.to_vec()).expect("utf8 body")
}

fn post(uri: &str, payload: Value) -> test::TestRequest {
    test::TestRequest::post().uri(uri).set_json(&payload)
}

fn put(uri: &str, payload: Value) -> test::TestRequest {
    test::TestRequest::put().uri(uri).set_json(&payload)
}

fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri)
}

fn store_snack(table: &MemoryTable) {
    let snack = MenuRow {
        id: 0,
        name: "Crisps".to_string(),
        price: 1.0,
        category: "STARTER".to_string(),
        kind: "SNACK".to_string(),
        vegetarian: None,
        has_ice: None,
    };
    let pool = table.pool().expect("pool");
    pool.get().expect("conn").insert(&snack).expect("insert");
}

fn soup() -> Value {
    json!({
        "name": "Soup",
        "price": 5.5,
        "category": "STARTER",
        "isVegetarian": true,
    })
}

fn cola() -> Value {
    json!({
        "name": "Cola",
        "price": 2.0,
        "category": "DRINK",
        "hasIce": false,
    })
}

#[actix_web::test]
async fn empty_menu_lists_as_empty_array() {
    let (_table, card) = catalog(false);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;

    let items: Vec<Value> = test::call_and_read_body_json(&app, get("/menu").to_request()).await;

    assert!(items.is_empty());
}

#[actix_web::test]
async fn posted_items_are_listed_by_variant() {
    let (_table, card) = catalog(false);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;

    let resp = test::call_service(&app, post("/menu/dish", soup()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Dish added");
    let resp = test::call_service(&app, post("/menu/drink", cola()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Drink added");

    let items: Vec<Value> = test::call_and_read_body_json(&app, get("/menu").to_request()).await;
    assert_eq!(
        items,
        vec![
            json!({
                "type": "DISH",
                "id": 1,
                "name": "Soup",
                "price": 5.5,
                "category": "STARTER",
                "isVegetarian": true,
            }),
            json!({
                "type": "DRINK",
                "id": 2,
                "name": "Cola",
                "price": 2.0,
                "category": "DRINK",
                "hasIce": false,
            }),
        ]
    );
}

#[actix_web::test]
async fn delete_removes_item_and_repeats_quietly() {
    let (table, card) = catalog(false);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;
    test::call_service(&app, post("/menu/dish", soup()).to_request()).await;
    test::call_service(&app, post("/menu/drink", cola()).to_request()).await;

    for _ in 0..2 {
        let req = test::TestRequest::delete().uri("/menu/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "Deleted");
    }

    assert_eq!(table.row_count(), 1);
    let items: Vec<Value> = test::call_and_read_body_json(&app, get("/menu").to_request()).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Cola");
}

#[actix_web::test]
async fn strict_delete_of_unknown_id_is_not_found() {
    let (_table, card) = catalog(true);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;

    let req = test::TestRequest::delete().uri("/menu/41").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn category_must_match_exactly() {
    let (table, card) = catalog(false);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;
    let mut payload = soup();
    payload["category"] = json!("Starter");

    let resp = test::call_service(&app, post("/menu/dish", payload).to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(table.row_count(), 0);
}

#[actix_web::test]
async fn compatible_mode_hides_an_unreachable_store() {
    let (table, card) = catalog(false);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;
    table.set_online(false);

    let resp = test::call_service(&app, post("/menu/dish", soup()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Dish added");

    let items: Vec<Value> = test::call_and_read_body_json(&app, get("/menu").to_request()).await;
    assert!(items.is_empty());
    assert_eq!(table.row_count(), 0);
}

#[actix_web::test]
async fn strict_mode_reports_an_unreachable_store() {
    let (table, card) = catalog(true);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;
    table.set_online(false);

    let resp = test::call_service(&app, get("/menu").to_request()).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn strict_mode_rejects_negative_prices() {
    let (table, card) = catalog(true);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;
    let mut payload = cola();
    payload["price"] = json!(-2.0);

    let resp = test::call_service(&app, post("/menu/drink", payload).to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(table.row_count(), 0);
}

#[actix_web::test]
async fn put_updates_an_item_in_place() {
    let (_table, card) = catalog(true);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;
    test::call_service(&app, post("/menu/dish", soup()).to_request()).await;

    let mut update = soup();
    update["type"] = json!("DISH");
    update["price"] = json!(9.99);
    let resp = test::call_service(&app, put("/menu/1", update).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Updated");

    let item: Value = test::call_and_read_body_json(&app, get("/menu/1").to_request()).await;
    assert_eq!(item["id"], 1);
    assert_eq!(item["price"], 9.99);
}

#[actix_web::test]
async fn strict_put_with_other_variant_is_not_found() {
    let (_table, card) = catalog(true);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;
    test::call_service(&app, post("/menu/dish", soup()).to_request()).await;

    let mut update = cola();
    update["type"] = json!("DRINK");
    let resp = test::call_service(&app, put("/menu/1", update).to_request()).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn missing_item_is_not_found() {
    let (_table, card) = catalog(false);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;

    let resp = test::call_service(&app, get("/menu/5").to_request()).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn empty_name_is_accepted() {
    let (table, card) = catalog(true);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;
    let mut payload = soup();
    payload["name"] = json!("");

    let resp = test::call_service(&app, post("/menu/dish", payload).to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(table.row_count(), 1);
    let items: Vec<Value> = test::call_and_read_body_json(&app, get("/menu").to_request()).await;
    assert_eq!(items[0]["name"], "");
}

#[actix_web::test]
async fn compatible_mode_reports_added_when_nothing_was_written() {
    let (table, card) = catalog(false);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;
    table.set_discard_inserts(true);

    let resp = test::call_service(&app, post("/menu/dish", soup()).to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Dish added");
    assert_eq!(table.row_count(), 0);
}

#[actix_web::test]
async fn strict_mode_fails_when_nothing_was_written() {
    let (table, card) = catalog(true);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;
    table.set_discard_inserts(true);

    let resp = test::call_service(&app, post("/menu/drink", cola()).to_request()).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(table.row_count(), 0);
}

#[actix_web::test]
async fn compatible_mode_lists_unknown_variant_as_empty() {
    let (table, card) = catalog(false);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;
    test::call_service(&app, post("/menu/dish", soup()).to_request()).await;
    store_snack(&table);

    let resp = test::call_service(&app, get("/menu").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let items: Vec<Value> = test::read_body_json(resp).await;

    assert!(items.is_empty(), "{:?}", items);
    assert_eq!(table.row_count(), 2);
}

#[actix_web::test]
async fn strict_mode_reports_unknown_variant() {
    let (table, card) = catalog(true);
    let app = test::init_service(App::new().configure(|cfg| card.configure(cfg))).await;
    store_snack(&table);

    let resp = test::call_service(&app, get("/menu").to_request()).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
