//! Cross-transaction behavior of `MemoryStore` as seen through the public
//! traits only.

use std::time::Duration;

use tempo_protocol::{LiveId, RoomId, RoomStatus, UserId};
use tempo_store::{MemoryStore, NewRoom, RoomFilter, Store, Transaction};
use tokio::time::Instant;

fn room(live: u32, created_at: Instant) -> NewRoom {
    NewRoom {
        live_id: LiveId(live),
        host_user_id: UserId(1),
        joined_user_count: 1,
        max_user_count: 4,
        members: b"[]".to_vec(),
        created_at,
    }
}

async fn insert(store: &MemoryStore, new: NewRoom) -> RoomId {
    let mut tx = store.begin().await.unwrap();
    let id = tx.insert_room(new).await.unwrap();
    tx.commit().await.unwrap();
    id
}

#[tokio::test(start_paused = true)]
async fn test_open_rooms_filters_by_status_age_and_live() {
    let store = MemoryStore::new();
    let old = insert(&store, room(1, Instant::now())).await;
    tokio::time::advance(Duration::from_secs(60)).await;
    let cutoff = Instant::now();
    tokio::time::advance(Duration::from_secs(1)).await;
    let fresh_a = insert(&store, room(1, Instant::now())).await;
    let fresh_b = insert(&store, room(2, Instant::now())).await;

    let mut tx = store.begin().await.unwrap();
    let any = tx
        .open_rooms(&RoomFilter {
            status: RoomStatus::Waiting,
            created_after: Some(cutoff),
            live_id: None,
        })
        .await
        .unwrap();
    let ids: Vec<_> = any.iter().map(|r| r.room_id).collect();
    assert_eq!(ids, vec![fresh_a, fresh_b]);
    assert!(!ids.contains(&old));

    let live_two = tx
        .open_rooms(&RoomFilter {
            status: RoomStatus::Waiting,
            created_after: Some(cutoff),
            live_id: Some(LiveId(2)),
        })
        .await
        .unwrap();
    assert_eq!(live_two.len(), 1);
    assert_eq!(live_two[0].room_id, fresh_b);
}

#[tokio::test]
async fn test_open_rooms_skips_started_rooms() {
    let store = MemoryStore::new();
    let id = insert(&store, room(1, Instant::now())).await;

    let mut tx = store.begin().await.unwrap();
    assert!(tx.start_room(id, UserId(1), Instant::now()).await.unwrap());
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let open = tx
        .open_rooms(&RoomFilter {
            status: RoomStatus::Waiting,
            created_after: None,
            live_id: None,
        })
        .await
        .unwrap();
    assert!(open.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_locked_increments_never_lose_updates() {
    let store = MemoryStore::new();
    let id = insert(&store, room(1, Instant::now())).await;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..32 {
        let store = store.clone();
        tasks.spawn(async move {
            let mut tx = store.begin().await.unwrap();
            let mut row = tx.room_for_update(id).await.unwrap().unwrap();
            tokio::task::yield_now().await;
            row.completed_result_count += 1;
            tx.update_room(row).await.unwrap();
            tx.commit().await.unwrap();
        });
    }
    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }

    let mut tx = store.begin().await.unwrap();
    let row = tx.room(id).await.unwrap().unwrap();
    assert_eq!(row.completed_result_count, 32);
}

#[tokio::test]
async fn test_room_and_user_writes_commit_together() {
    let store = MemoryStore::new();
    let mut tx = store.begin().await.unwrap();
    let user = tx
        .insert_user(tempo_store::NewUser {
            name: "kana".into(),
            leader_card_id: 3,
            token: "t-1".into(),
        })
        .await
        .unwrap();
    let id = tx.insert_room(room(1, Instant::now())).await.unwrap();
    tx.set_user_room(user, Some(id)).await.unwrap();

    // Nothing is visible before commit.
    let mut peek = store.begin().await.unwrap();
    assert!(peek.room(id).await.unwrap().is_none());
    assert!(peek.user_by_token("t-1").await.unwrap().is_none());

    tx.commit().await.unwrap();

    let mut peek = store.begin().await.unwrap();
    assert!(peek.room(id).await.unwrap().is_some());
    let row = peek.user_by_token("t-1").await.unwrap().unwrap();
    assert_eq!(row.room_id, Some(id));
}

#[tokio::test]
async fn test_room_ids_are_distinct_across_transactions() {
    let store = MemoryStore::new();
    let a = insert(&store, room(1, Instant::now())).await;
    let b = insert(&store, room(1, Instant::now())).await;
    assert_ne!(a, b);
    assert_eq!(store.room_count().await, 2);
}
