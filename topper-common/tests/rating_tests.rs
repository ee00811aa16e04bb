//! Rating submission against the JSON file store

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use tempfile::TempDir;
use topper_common::rating::{submit_rating, RatingError, RatingRequest};
use topper_common::store::{ContentStore, JsonFileStore};
use topper_common::{Item, RatingValue};

fn setup(items: Vec<Item>) -> (TempDir, JsonFileStore) {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path());
    store.write_items(&items).unwrap();
    (dir, store)
}

fn snapshot(store: &JsonFileStore) -> (Option<Vec<u8>>, Option<Vec<u8>>) {
    (
        fs::read(store.items_path()).ok(),
        fs::read(store.ratings_path()).ok(),
    )
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

#[test]
fn test_single_upvote_updates_item_and_ledger() {
    let (_dir, store) = setup(vec![Item::new("x").with_tags(["news", "ai"])]);

    let outcome = submit_rating(&store, &RatingRequest::new("x", 1), &mut rng()).unwrap();
    assert_eq!(outcome.score, 1);
    assert_eq!(outcome.votes, 1);

    let ratings = store.read_ratings().unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].item_id, "x");
    assert_eq!(ratings[0].value, RatingValue::Up);

    let items = store.read_items().unwrap();
    assert_eq!(items[0].score, 1);
    assert_eq!(items[0].votes, 1);
}

#[test]
fn test_score_is_initial_plus_sum_of_values() {
    let mut seed = Item::new("x");
    seed.score = 5;
    seed.votes = 2;
    let (_dir, store) = setup(vec![seed, Item::new("y")]);

    let values = [1, -1, -1, 1, 1, 1, -1];
    let mut rng = rng();
    for value in values {
        submit_rating(&store, &RatingRequest::new("x", value), &mut rng).unwrap();
    }

    let items = store.read_items().unwrap();
    let x = items.iter().find(|i| i.id == "x").unwrap();
    assert_eq!(x.score, 5 + values.iter().sum::<i64>());
    assert_eq!(x.votes, 2 + values.len() as u64);

    // Untouched item stays untouched
    let y = items.iter().find(|i| i.id == "y").unwrap();
    assert_eq!((y.score, y.votes), (0, 0));
}

#[test]
fn test_ledger_keeps_earlier_events_intact() {
    let (_dir, store) = setup(vec![Item::new("a"), Item::new("b")]);
    let mut rng = rng();

    submit_rating(&store, &RatingRequest::new("a", 1), &mut rng).unwrap();
    let first = store.read_ratings().unwrap();
    assert_eq!(first, store.read_ratings().unwrap());

    submit_rating(&store, &RatingRequest::new("b", -1), &mut rng).unwrap();
    let second = store.read_ratings().unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second[0], first[0]);
    assert_eq!(second[1].item_id, "b");
}

#[test]
fn test_invalid_input_leaves_files_unchanged() {
    let (_dir, store) = setup(vec![Item::new("x")]);
    submit_rating(&store, &RatingRequest::new("x", 1), &mut rng()).unwrap();
    let before = snapshot(&store);

    let bad_requests = [
        RatingRequest::new("x", 2),
        RatingRequest::new("x", 0),
        RatingRequest::new("x\"; drop", 1),
        RatingRequest::new("../x", 1),
        RatingRequest::new("x", 1).with_user("not-a-uuid"),
    ];

    for request in &bad_requests {
        let result = submit_rating(&store, request, &mut rng());
        assert!(
            matches!(result, Err(RatingError::InvalidInput(_))),
            "expected InvalidInput for {:?}",
            request
        );
        assert_eq!(snapshot(&store), before);
    }
}

#[test]
fn test_unknown_item_writes_nothing() {
    let (_dir, store) = setup(vec![Item::new("x")]);
    let before = snapshot(&store);
    assert!(before.1.is_none());

    let result = submit_rating(&store, &RatingRequest::new("missing", 1), &mut rng());
    assert!(matches!(result, Err(RatingError::ItemNotFound(id)) if id == "missing"));
    assert_eq!(snapshot(&store), before);
}

#[test]
fn test_failed_commit_rolls_back_both_files() {
    let (_dir, store) = setup(vec![Item::new("x")]);
    submit_rating(&store, &RatingRequest::new("x", 1), &mut rng()).unwrap();
    let before = snapshot(&store);

    // A directory squatting on the temp path makes the second write fail
    let tmp = store.data_dir().join("ratings.json.tmp");
    fs::create_dir(&tmp).unwrap();

    let result = submit_rating(&store, &RatingRequest::new("x", 1), &mut rng());
    assert!(matches!(result, Err(RatingError::PersistFailed(_))));
    assert_eq!(snapshot(&store), before);
}

#[test]
fn test_user_id_is_recorded() {
    let (_dir, store) = setup(vec![Item::new("x")]);
    let user = "123e4567-e89b-12d3-a456-426614174000";

    submit_rating(&store, &RatingRequest::new("x", -1).with_user(user), &mut rng()).unwrap();

    let ratings = store.read_ratings().unwrap();
    assert_eq!(ratings[0].user_id.map(|u| u.to_string()).as_deref(), Some(user));
}

#[test]
fn test_next_item_shares_tag_on_upvote() {
    let (_dir, store) = setup(vec![
        Item::new("c").with_tags(["x"]),
        Item::new("a").with_tags(["x"]),
        Item::new("b").with_tags(["y"]),
    ]);

    let outcome = submit_rating(&store, &RatingRequest::new("c", 1), &mut rng()).unwrap();
    assert_eq!(outcome.next_item.map(|i| i.id).as_deref(), Some("a"));
}

#[test]
fn test_rating_succeeds_with_blank_lang_in_store() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path());
    fs::write(
        store.items_path(),
        r#"[{"content_id":"x","lang":"en","content_tags":["ai"]},
            {"content_id":"y","lang":"","content_tags":["ai"]}]"#,
    )
    .unwrap();

    let outcome = submit_rating(&store, &RatingRequest::new("x", 1), &mut rng()).unwrap();
    assert_eq!(outcome.score, 1);
    assert_eq!(outcome.next_item.map(|item| item.id).as_deref(), Some("y"));

    let items = store.read_items().unwrap();
    assert_eq!(items[0].score, 1);
    assert!(items[1].lang.is_none());
}
