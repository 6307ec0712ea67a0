mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestServer;

#[tokio::test]
async fn cards_are_appended_in_creation_order() -> Result<()> {
    let server = TestServer::new();
    let token = server.signup("jane@example.com").await?;
    let list_id = server.list_id(&token, "Wishlist").await?;

    let created = server
        .post(
            "/cards",
            &token,
            json!({ "companyName": "Acme", "roleName": "Engineer", "listId": list_id }),
        )
        .await?;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["order"], 0.0);
    assert_eq!(created.data()["listId"], list_id.as_str());

    server.create_card(&token, &list_id, "Globex").await?;
    assert_eq!(server.companies(&token, &list_id).await?, ["Acme", "Globex"]);
    Ok(())
}

#[tokio::test]
async fn move_last_card_to_front() -> Result<()> {
    let server = TestServer::new();
    let token = server.signup("jane@example.com").await?;
    let list_id = server.list_id(&token, "Applied").await?;
    server.create_card(&token, &list_id, "A").await?;
    server.create_card(&token, &list_id, "B").await?;
    let c = server.create_card(&token, &list_id, "C").await?;

    let moved = server
        .patch(
            &format!("/cards/{c}/move"),
            &token,
            json!({ "newListId": list_id, "newOrder": 0 }),
        )
        .await?;
    assert_eq!(moved.status, StatusCode::OK);
    assert_eq!(moved.data()["order"], -1.0);
    assert_eq!(server.companies(&token, &list_id).await?, ["C", "A", "B"]);
    Ok(())
}

#[tokio::test]
async fn move_across_lists_between_neighbours() -> Result<()> {
    let server = TestServer::new();
    let token = server.signup("jane@example.com").await?;
    let wishlist = server.list_id(&token, "Wishlist").await?;
    let interview = server.list_id(&token, "Interview").await?;

    let moving = server.create_card(&token, &wishlist, "Moving").await?;
    server.create_card(&token, &interview, "First").await?;
    server.create_card(&token, &interview, "Second").await?;

    let moved = server
        .patch(
            &format!("/cards/{moving}/move"),
            &token,
            json!({ "newListId": interview, "newOrder": 1 }),
        )
        .await?;
    assert_eq!(moved.status, StatusCode::OK);
    assert_eq!(moved.data()["order"], 0.5);
    assert_eq!(moved.data()["listId"], interview.as_str());

    assert!(server.companies(&token, &wishlist).await?.is_empty());
    assert_eq!(server.companies(&token, &interview).await?, ["First", "Moving", "Second"]);
    Ok(())
}

#[tokio::test]
async fn move_into_empty_list_uses_initial_order() -> Result<()> {
    let server = TestServer::new();
    let token = server.signup("jane@example.com").await?;
    let wishlist = server.list_id(&token, "Wishlist").await?;
    let offer = server.list_id(&token, "Offer").await?;
    server.create_card(&token, &wishlist, "Filler").await?;
    let card = server.create_card(&token, &wishlist, "Acme").await?;

    let moved = server
        .patch(
            &format!("/cards/{card}/move"),
            &token,
            json!({ "newListId": offer, "newOrder": 5 }),
        )
        .await?;
    assert_eq!(moved.status, StatusCode::OK);
    assert_eq!(moved.data()["order"], 0.0);
    Ok(())
}

#[tokio::test]
async fn moving_someone_elses_card_is_forbidden() -> Result<()> {
    let server = TestServer::new();
    let jane = server.signup("jane@example.com").await?;
    let john = server.signup("john@example.com").await?;
    let jane_list = server.list_id(&jane, "Applied").await?;
    let john_list = server.list_id(&john, "Applied").await?;
    let card = server.create_card(&jane, &jane_list, "Acme").await?;

    let stolen = server
        .patch(
            &format!("/cards/{card}/move"),
            &john,
            json!({ "newListId": john_list, "newOrder": 0 }),
        )
        .await?;
    assert_eq!(stolen.status, StatusCode::FORBIDDEN);

    let into_foreign = server
        .patch(
            &format!("/cards/{card}/move"),
            &jane,
            json!({ "newListId": john_list, "newOrder": 0 }),
        )
        .await?;
    assert_eq!(into_foreign.status, StatusCode::FORBIDDEN);

    assert_eq!(server.companies(&jane, &jane_list).await?, ["Acme"]);
    assert!(server.companies(&john, &john_list).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn move_validation_and_missing_card() -> Result<()> {
    let server = TestServer::new();
    let token = server.signup("jane@example.com").await?;
    let list_id = server.list_id(&token, "Applied").await?;
    let card = server.create_card(&token, &list_id, "Acme").await?;

    let negative = server
        .patch(
            &format!("/cards/{card}/move"),
            &token,
            json!({ "newListId": list_id, "newOrder": -1 }),
        )
        .await?;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
    assert!(negative.body["field_errors"]["newOrder"].is_string());

    let missing = server
        .patch(
            "/cards/00000000-0000-4000-8000-000000000000/move",
            &token,
            json!({ "newListId": list_id, "newOrder": 0 }),
        )
        .await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn repeated_inserts_at_one_spot_keep_order_consistent() -> Result<()> {
    let server = TestServer::new();
    let token = server.signup("jane@example.com").await?;
    let applied = server.list_id(&token, "Applied").await?;
    let wishlist = server.list_id(&token, "Wishlist").await?;
    server.create_card(&token, &applied, "Head").await?;
    server.create_card(&token, &applied, "Tail").await?;

    // each new card lands right after Head, squeezing the gap every time
    let mut expected = vec!["Head".to_string()];
    for i in 0..30 {
        let name = format!("Card {i}");
        let card = server.create_card(&token, &wishlist, &name).await?;
        let moved = server
            .patch(
                &format!("/cards/{card}/move"),
                &token,
                json!({ "newListId": applied, "newOrder": 1 }),
            )
            .await?;
        assert_eq!(moved.status, StatusCode::OK);
        expected.insert(1, name);
    }
    expected.push("Tail".to_string());

    assert_eq!(server.companies(&token, &applied).await?, expected);
    Ok(())
}

#[tokio::test]
async fn update_and_delete_card() -> Result<()> {
    let server = TestServer::new();
    let token = server.signup("jane@example.com").await?;
    let list_id = server.list_id(&token, "Applied").await?;
    let card = server.create_card(&token, &list_id, "Acme").await?;

    let updated = server
        .patch(&format!("/cards/{card}"), &token, json!({ "roleName": "Staff Engineer" }))
        .await?;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["roleName"], "Staff Engineer");
    assert_eq!(updated.data()["companyName"], "Acme");

    let deleted = server.delete(&format!("/cards/{card}"), &token).await?;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(server.companies(&token, &list_id).await?.is_empty());
    Ok(())
}
