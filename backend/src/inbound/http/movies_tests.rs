//! Tests for movie HTTP handlers.

use super::*;
use crate::domain::{Error, Ticket, UserId};
use crate::inbound::http::test_utils::{bearer, etag, fixture_state, CinemaMocks};
use actix_web::http::header::{ETAG, IF_MATCH};
use actix_web::http::StatusCode;
use actix_web::{test as actix_test, App};
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::{json, Value};

const MOVIE_ID: &str = "9b2f0d7e-1c4a-4f3e-8a55-0d5f3c7e2a11";

fn movie_id() -> Uuid {
    Uuid::parse_str(MOVIE_ID).expect("fixture id")
}

fn stalker() -> Movie {
    Movie::new(MovieDraft {
        id: movie_id(),
        title: "Stalker".to_owned(),
        base_price: 25.0,
        screening_room: 3,
        available_seats: 80,
    })
    .expect("valid movie")
}

fn staff() -> (&'static str, String) {
    bearer(UserRole::Staff, Uuid::new_v4(), "projectionist")
}

fn client() -> (&'static str, String) {
    bearer(UserRole::Client, Uuid::new_v4(), "moviegoer")
}

async fn call(
    mocks: CinemaMocks,
    request: actix_test::TestRequest,
) -> (StatusCode, Option<String>, Value) {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(fixture_state().build()))
            .app_data(web::Data::new(mocks.build()))
            .service(movie_scope()),
    )
    .await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let tag = response
        .headers()
        .get(ETAG)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, tag, value)
}

fn movie_payload() -> Value {
    json!({
        "title": "Stalker",
        "basePrice": 25.0,
        "scrRoomNumber": 3,
        "numberOfAvailableSeats": 80,
    })
}

#[actix_web::test]
async fn staff_adds_movies() {
    let mut mocks = CinemaMocks::default();
    mocks
        .movies
        .expect_create()
        .withf(|draft| draft.title == "Stalker" && draft.screening_room == 3)
        .times(1)
        .returning(|_| Ok(stalker()));

    let request = actix_test::TestRequest::post()
        .uri("/movies")
        .insert_header(staff())
        .set_json(movie_payload());
    let (status, _, body) = call(mocks, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({
            "id": MOVIE_ID,
            "title": "Stalker",
            "basePrice": 25.0,
            "scrRoomNumber": 3,
            "numberOfAvailableSeats": 80,
        })
    );
}

#[actix_web::test]
async fn clients_cannot_add_movies() {
    let request = actix_test::TestRequest::post()
        .uri("/movies")
        .insert_header(client())
        .set_json(movie_payload());
    let (status, _, _) = call(CinemaMocks::default(), request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn listing_requires_a_token() {
    let request = actix_test::TestRequest::get().uri("/movies");
    let (status, _, _) = call(CinemaMocks::default(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case(Vec::new(), StatusCode::NO_CONTENT)]
#[case(vec![stalker()], StatusCode::OK)]
#[actix_web::test]
async fn listing_returns_no_content_when_empty(
    #[case] movies: Vec<Movie>,
    #[case] expected: StatusCode,
) {
    let mut mocks = CinemaMocks::default();
    mocks
        .movies_query
        .expect_find_all()
        .returning(move || Ok(movies.clone()));

    let request = actix_test::TestRequest::get()
        .uri("/movies")
        .insert_header(client());
    let (status, _, _) = call(mocks, request).await;

    assert_eq!(status, expected);
}

#[actix_web::test]
async fn movie_by_id_carries_an_entity_tag() {
    let mut mocks = CinemaMocks::default();
    mocks
        .movies_query
        .expect_find()
        .withf(|id| *id == movie_id())
        .returning(|_| Ok(stalker()));

    let request = actix_test::TestRequest::get()
        .uri(&format!("/movies/{MOVIE_ID}"))
        .insert_header(client());
    let (status, tag, body) = call(mocks, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Stalker");
    assert_eq!(tag, Some(etag(&ResourceTag::movie(movie_id()))));
}

#[actix_web::test]
async fn missing_movie_is_not_found() {
    let mut mocks = CinemaMocks::default();
    mocks
        .movies_query
        .expect_find()
        .returning(|id| Err(Error::not_found(format!("movie {id} not found"))));

    let request = actix_test::TestRequest::get()
        .uri(&format!("/movies/{MOVIE_ID}"))
        .insert_header(client());
    let (status, _, _) = call(mocks, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn update_request(if_match: Option<String>) -> actix_test::TestRequest {
    let mut payload = movie_payload();
    payload["id"] = json!(MOVIE_ID);
    let mut request = actix_test::TestRequest::put()
        .uri("/movies/update")
        .insert_header(staff())
        .set_json(payload);
    if let Some(value) = if_match {
        request = request.insert_header((IF_MATCH, value));
    }
    request
}

#[actix_web::test]
async fn update_with_matching_tag_replaces_the_movie() {
    let mut mocks = CinemaMocks::default();
    mocks
        .movies
        .expect_update()
        .withf(|draft| draft.id == movie_id())
        .times(1)
        .returning(|_| Ok(stalker()));

    let tag = etag(&ResourceTag::movie(movie_id()));
    let (status, _, _) = call(mocks, update_request(Some(tag))).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[rstest]
#[case(None, StatusCode::BAD_REQUEST)]
#[case(Some(etag(&ResourceTag::movie(Uuid::nil()))), StatusCode::PRECONDITION_FAILED)]
#[case(Some(etag(&ResourceTag::ticket(Uuid::parse_str(MOVIE_ID).expect("uuid")))), StatusCode::PRECONDITION_FAILED)]
#[actix_web::test]
async fn update_rejects_stale_or_missing_tags(
    #[case] if_match: Option<String>,
    #[case] expected: StatusCode,
) {
    let (status, _, _) = call(CinemaMocks::default(), update_request(if_match)).await;

    assert_eq!(status, expected);
}

#[actix_web::test]
async fn update_requires_an_id() {
    let request = actix_test::TestRequest::put()
        .uri("/movies/update")
        .insert_header(staff())
        .insert_header((IF_MATCH, etag(&ResourceTag::movie(movie_id()))))
        .set_json(movie_payload());
    let (status, _, body) = call(CinemaMocks::default(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "missing_field");
}

#[actix_web::test]
async fn deleting_a_referenced_movie_conflicts() {
    let mut mocks = CinemaMocks::default();
    mocks
        .movies
        .expect_delete()
        .returning(|_| Err(Error::conflict("movie is referenced by tickets")));

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/movies/{MOVIE_ID}"))
        .insert_header(staff());
    let (status, _, _) = call(mocks, request).await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn box_office_lists_tickets_for_a_movie() {
    let mut mocks = CinemaMocks::default();
    let at = Utc
        .with_ymd_and_hms(2026, 3, 1, 18, 30, 0)
        .single()
        .expect("time");
    mocks
        .tickets_query
        .expect_find_for_movie()
        .withf(|id| *id == movie_id())
        .returning(move |_| {
            Ok(vec![Ticket::issue(
                Uuid::nil(),
                at,
                UserId::random(),
                &stalker(),
            )])
        });

    let request = actix_test::TestRequest::get()
        .uri(&format!("/movies/{MOVIE_ID}/tickets"))
        .insert_header(staff());
    let (status, _, body) = call(mocks, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["movieId"], MOVIE_ID);
    assert_eq!(body[0]["price"], 25.0);
    assert_eq!(body[0]["movieTime"], "2026-03-01T18:30:00+00:00");
}
