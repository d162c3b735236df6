//! Runs one full lobby against an in-memory store.
//!
//! ```text
//! RUST_LOG=debug cargo run -p lobby
//! ```

use std::sync::Arc;

use tempo::prelude::*;

#[tokio::main]
async fn main() -> Result<(), TempoError> {
    tempo::logging::init();

    let tempo = Arc::new(Matchmaker::in_memory().await);

    let host = tempo.create_user("kana", 101).await?;
    let room = tempo.create_room(&host, LiveId(7), LiveDifficulty::Hard).await?;

    // Three guests race for the three free seats, a fourth arrives too late.
    let mut guests = Vec::new();
    for name in ["rin", "mio", "saki"] {
        let token = tempo.create_user(name, 200).await?;
        let tempo = Arc::clone(&tempo);
        guests.push(tokio::spawn(async move {
            let outcome = tempo.join(&token, room, LiveDifficulty::Normal).await?;
            Ok::<_, TempoError>((token, outcome))
        }));
    }
    let mut seated = Vec::new();
    for guest in guests {
        let Ok(joined) = guest.await else {
            tracing::warn!("guest task panicked");
            continue;
        };
        let (token, outcome) = joined?;
        tracing::info!(%outcome, "guest join");
        if outcome == JoinRoomResult::Ok {
            seated.push(token);
        }
    }

    let late = tempo.create_user("yui", 300).await?;
    let outcome = tempo.join(&late, room, LiveDifficulty::Normal).await?;
    tracing::info!(%outcome, "late guest join");

    for info in tempo.list_rooms(LiveId::ANY).await? {
        tracing::info!(
            room_id = %info.room_id,
            joined = info.joined_user_count,
            max = info.max_user_count,
            "open room"
        );
    }

    tempo.start(&host, room).await?;
    let (status, members) = tempo.wait(&host, room).await?;
    tracing::info!(%status, members = members.len(), "lobby after start");

    let mut score = 1_000_000;
    for token in std::iter::once(&host).chain(&seated) {
        tempo
            .submit_result(token, room, vec![180, 12, 3, 1, 0], score)
            .await?;
        score -= 42_000;
    }

    let results = tempo.results(room).await?;
    match serde_json::to_string_pretty(&results) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "could not render results"),
    }

    for token in std::iter::once(&host).chain(&seated) {
        tempo.leave(token, room).await?;
    }
    let (status, _) = tempo.wait(&host, room).await?;
    tracing::info!(%status, "room after everyone left");
    Ok(())
}
