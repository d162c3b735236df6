//! The member list stored with each room.
//!
//! The roster is kept in join order and written back as one blob with the
//! room row, so a member change and the counters that depend on it always
//! commit together. Blob keys: `id`, `name`, `leader_card_id`, `live_dif`,
//! and `judge_count_list` / `score` once a result was submitted.
//!
//! A member who leaves after submitting keeps their entry, flagged
//! `departed`, so their score still shows up in the final results. Departed
//! entries are invisible everywhere else.

use serde::{Deserialize, Serialize};
use tempo_protocol::{
    Codec, LiveDifficulty, ProtocolError, ResultUser, RoomUser, SafeUser, UserId,
};

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "id")]
    pub user_id: UserId,
    pub name: String,
    pub leader_card_id: u32,
    #[serde(rename = "live_dif")]
    pub difficulty: LiveDifficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_count_list: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub departed: bool,
}

impl Member {
    /// A fresh entry for `user`, with no result.
    pub fn new(user: &SafeUser, difficulty: LiveDifficulty) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            leader_card_id: user.leader_card_id,
            difficulty,
            judge_count_list: None,
            score: None,
            departed: false,
        }
    }

    /// Returns `true` once this member submitted a result.
    pub fn has_result(&self) -> bool {
        self.score.is_some()
    }

    fn result_line(&self) -> ResultUser {
        match (&self.judge_count_list, self.score) {
            (Some(judges), Some(score)) => ResultUser {
                user_id: self.user_id,
                judge_count_list: judges.clone(),
                score,
            },
            _ => ResultUser::absent(self.user_id),
        }
    }
}

/// What happened to a member removed by [`Roster::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Departure {
    /// The member had a result, so the entry stayed (flagged departed).
    pub had_result: bool,
}

/// A room's members in join order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(Vec<Member>);

impl Roster {
    /// A roster whose only member is the room's creator.
    pub fn with_host(host: &SafeUser, difficulty: LiveDifficulty) -> Self {
        Self(vec![Member::new(host, difficulty)])
    }

    /// Decodes a stored blob.
    pub fn decode(codec: &impl Codec, blob: &[u8]) -> Result<Self, ProtocolError> {
        codec.decode(blob)
    }

    /// Encodes this roster for storage.
    pub fn encode(&self, codec: &impl Codec) -> Result<Vec<u8>, ProtocolError> {
        codec.encode(self)
    }

    /// Members currently in the room.
    pub fn present(&self) -> impl Iterator<Item = &Member> {
        self.0.iter().filter(|m| !m.departed)
    }

    pub(crate) fn present_mut(&mut self, user_id: UserId) -> Option<&mut Member> {
        self.0
            .iter_mut()
            .find(|m| !m.departed && m.user_id == user_id)
    }

    /// Appends a member. A departed entry left behind by the same user is
    /// dropped first, so one user never has two entries.
    pub(crate) fn push(&mut self, member: Member) {
        self.0
            .retain(|m| !(m.departed && m.user_id == member.user_id));
        self.0.push(member);
    }

    /// Takes `user_id` out of the room. Returns `None` if they weren't in
    /// it.
    pub(crate) fn remove(&mut self, user_id: UserId) -> Option<Departure> {
        let index = self
            .0
            .iter()
            .position(|m| !m.departed && m.user_id == user_id)?;

        let had_result = self.0[index].has_result();
        if had_result {
            self.0[index].departed = true;
        } else {
            self.0.remove(index);
        }
        Some(Departure { had_result })
    }

    /// The longest-standing member still in the room.
    pub fn first_present(&self) -> Option<UserId> {
        self.present().next().map(|m| m.user_id)
    }

    /// The lobby as `me` sees it.
    pub fn views(&self, me: UserId, host: UserId) -> Vec<RoomUser> {
        self.present()
            .map(|m| RoomUser {
                user_id: m.user_id,
                name: m.name.clone(),
                leader_card_id: m.leader_card_id,
                select_difficulty: m.difficulty,
                is_me: m.user_id == me,
                is_host: m.user_id == host,
            })
            .collect()
    }

    /// One leaderboard line per entry, placeholders for missing results.
    pub fn result_lines(&self) -> Vec<ResultUser> {
        self.0.iter().map(Member::result_line).collect()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use tempo_protocol::JsonCodec;

    use super::*;

    fn user(id: u64) -> SafeUser {
        SafeUser {
            id: UserId(id),
            name: format!("player-{id}"),
            leader_card_id: id as u32,
        }
    }

    fn roster_of(ids: &[u64]) -> Roster {
        let mut roster = Roster::default();
        for id in ids {
            roster.push(Member::new(&user(*id), LiveDifficulty::Normal));
        }
        roster
    }

    fn scored(roster: &mut Roster, id: u64, score: i64) {
        let member = roster.present_mut(UserId(id)).unwrap();
        member.judge_count_list = Some(vec![1, 2, 3, 4, 5]);
        member.score = Some(score);
    }

    #[test]
    fn test_encode_uses_storage_keys_and_omits_missing_result() {
        let roster = Roster::with_host(&user(1), LiveDifficulty::Hard);
        let blob = roster.encode(&JsonCodec).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&blob).unwrap();

        let entry = &json[0];
        assert_eq!(entry["id"], 1);
        assert_eq!(entry["live_dif"], "hard");
        assert_eq!(entry["leader_card_id"], 1);
        assert!(entry.get("score").is_none());
        assert!(entry.get("judge_count_list").is_none());
        assert!(entry.get("departed").is_none());
    }

    #[test]
    fn test_decode_reads_submitted_result() {
        let blob = br#"[{"id":3,"name":"x","leader_card_id":9,"live_dif":"normal",
            "judge_count_list":[5,4,3,2,1],"score":777}]"#;
        let roster = Roster::decode(&JsonCodec, blob).unwrap();

        let lines = roster.result_lines();
        assert_eq!(lines[0].score, 777);
        assert_eq!(lines[0].judge_count_list, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_remove_without_result_drops_entry() {
        let mut roster = roster_of(&[1, 2]);
        let departure = roster.remove(UserId(1)).unwrap();

        assert!(!departure.had_result);
        assert_eq!(roster.result_lines().len(), 1);
        assert_eq!(roster.first_present(), Some(UserId(2)));
    }

    #[test]
    fn test_remove_with_result_keeps_entry_departed() {
        let mut roster = roster_of(&[1, 2]);
        scored(&mut roster, 1, 500);

        let departure = roster.remove(UserId(1)).unwrap();

        assert!(departure.had_result);
        assert_eq!(roster.result_lines().len(), 2);
        assert!(roster.present_mut(UserId(1)).is_none());
        assert_eq!(roster.first_present(), Some(UserId(2)));
        assert_eq!(roster.result_lines()[0].score, 500);
    }

    #[test]
    fn test_remove_non_member_returns_none() {
        let mut roster = roster_of(&[1]);
        assert!(roster.remove(UserId(9)).is_none());
    }

    #[test]
    fn test_remove_departed_member_again_returns_none() {
        let mut roster = roster_of(&[1, 2]);
        scored(&mut roster, 1, 10);
        roster.remove(UserId(1));
        assert!(roster.remove(UserId(1)).is_none());
    }

    #[test]
    fn test_push_replaces_departed_entry_of_same_user() {
        let mut roster = roster_of(&[1, 2]);
        scored(&mut roster, 1, 10);
        roster.remove(UserId(1));

        roster.push(Member::new(&user(1), LiveDifficulty::Hard));

        assert_eq!(roster.result_lines().len(), 2);
        assert!(roster.present_mut(UserId(1)).is_some());
    }

    #[test]
    fn test_views_flag_me_and_host_and_hide_departed() {
        let mut roster = roster_of(&[1, 2, 3]);
        scored(&mut roster, 3, 10);
        roster.remove(UserId(3));

        let views = roster.views(UserId(2), UserId(1));

        assert_eq!(views.len(), 2);
        assert!(views[0].is_host && !views[0].is_me);
        assert!(views[1].is_me && !views[1].is_host);
    }

    #[test]
    fn test_result_lines_fill_sentinels_for_absentees() {
        let mut roster = roster_of(&[1, 2]);
        scored(&mut roster, 2, 900);

        let lines = roster.result_lines();

        assert!(lines[0].is_absent());
        assert_eq!(lines[1].score, 900);
    }
}
