//! Integration tests for rooms and the turn cycle.
//!
//! Timer-driven tests run with `start_paused = true`: sleeping in the test
//! auto-advances Tokio's clock, so a full 60-second round takes no time.

use std::sync::Arc;
use std::time::Duration;

use guesswhat_protocol::{DrawAction, DrawKind, PlayerId, ServerMessage};
use guesswhat_room::{Phase, Player, Room, RoomConfig, RoomError, RoomRegistry};
use guesswhat_session::{SessionHandle, SessionReceiver};
use guesswhat_transport::ConnectionId;
use rand::SeedableRng;
use rand::rngs::StdRng;

// =========================================================================
// Helpers
// =========================================================================

const NAMES: [&str; 4] = ["ana", "bob", "cleo", "dan"];

/// One member's identity and inbox.
struct Seat {
    id: PlayerId,
    rx: SessionReceiver,
}

fn seat(n: usize) -> (Player, Seat) {
    let (handle, rx) = SessionHandle::channel(ConnectionId::new(n as u64 + 1));
    let player = Player::new(NAMES[n], handle);
    let id = player.id;
    (player, Seat { id, rx })
}

/// A room with `players` members; the first created it.
async fn table(players: usize, config: RoomConfig) -> (RoomRegistry, Arc<Room>, Vec<Seat>) {
    let registry = RoomRegistry::with_rng(config, StdRng::seed_from_u64(7));
    let (host, host_seat) = seat(0);
    let room = registry.create_room(host).await;
    let mut seats = vec![host_seat];
    for n in 1..players {
        let (p, s) = seat(n);
        room.join(p).await.unwrap();
        seats.push(s);
    }
    for s in &mut seats {
        s.rx.drain();
    }
    (registry, room, seats)
}

async fn drawer_index(room: &Room, seats: &[Seat]) -> usize {
    let drawer = room.snapshot().await.drawer.expect("a drawer is picked");
    seats.iter().position(|s| s.id == drawer).expect("drawer is a member")
}

fn hints(msgs: &[ServerMessage]) -> Vec<String> {
    msgs.iter()
        .filter_map(|m| match m {
            ServerMessage::Hint(h) => Some(h.clone()),
            _ => None,
        })
        .collect()
}

fn revealed(hint: &str) -> usize {
    hint.split(' ').filter(|c| *c != "_").count()
}

fn chats(msgs: &[ServerMessage]) -> Vec<String> {
    msgs.iter()
        .filter_map(|m| match m {
            ServerMessage::Chat(c) => Some(c.clone()),
            _ => None,
        })
        .collect()
}

/// Starts the game and has the drawer choose `word`. Returns the drawer's
/// seat index.
async fn start_drawing(room: &Arc<Room>, seats: &mut [Seat], word: &str) -> usize {
    room.start_game(seats[0].id).await.unwrap();
    let d = drawer_index(room, seats).await;
    room.choose_word(seats[d].id, word).await;
    for s in seats.iter_mut() {
        s.rx.drain();
    }
    d
}

// =========================================================================
// Membership
// =========================================================================

#[tokio::test]
async fn test_members_are_joined_minus_left_in_order() {
    let (_reg, room, seats) = table(4, RoomConfig::default()).await;
    room.leave(seats[2].id).await.unwrap();

    let snap = room.snapshot().await;
    assert_eq!(snap.member_ids(), vec![seats[0].id, seats[1].id, seats[3].id]);
}

#[tokio::test]
async fn test_host_passes_to_earliest_remaining_joiner() {
    let (_reg, room, mut seats) = table(3, RoomConfig::default()).await;
    let remaining = room.leave(seats[0].id).await.unwrap();
    assert_eq!(remaining, 2);
    assert_eq!(room.snapshot().await.host, Some(seats[1].id));

    let msgs = seats[2].rx.drain();
    assert_eq!(msgs[0], ServerMessage::Info("❌ ana left the game.".into()));
    assert!(matches!(&msgs[1], ServerMessage::Players(r) if r.labels().len() == 2));
    assert_eq!(msgs[2], ServerMessage::Host("bob".into()));
}

#[tokio::test]
async fn test_last_member_leaving_unsets_host() {
    let (_reg, room, seats) = table(1, RoomConfig::default()).await;
    assert_eq!(room.leave(seats[0].id).await.unwrap(), 0);
    assert_eq!(room.snapshot().await.host, None);
}

// =========================================================================
// Starting
// =========================================================================

#[tokio::test]
async fn test_start_needs_two_players() {
    let (_reg, room, seats) = table(1, RoomConfig::default()).await;
    let err = room.start_game(seats[0].id).await.unwrap_err();
    assert!(matches!(err, RoomError::NotEnoughPlayers { need: 2, have: 1 }));
    assert_eq!(room.snapshot().await.phase, Phase::Lobby);
}

#[tokio::test]
async fn test_start_from_non_host_is_ignored() {
    let (_reg, room, seats) = table(2, RoomConfig::default()).await;
    room.start_game(seats[1].id).await.unwrap();
    let snap = room.snapshot().await;
    assert!(!snap.started());
    assert_eq!(snap.round, 0);
}

#[tokio::test]
async fn test_start_picks_drawer_and_offers_words() {
    let (reg, room, mut seats) = table(3, RoomConfig::default()).await;
    room.start_game(seats[0].id).await.unwrap();

    let snap = room.snapshot().await;
    assert!(snap.started());
    assert_eq!(snap.round, 1);
    assert_eq!(snap.phase, Phase::ChoosingWord);

    let d = drawer_index(&room, &seats).await;
    let msgs = seats[d].rx.drain();
    assert_eq!(msgs[0], ServerMessage::Info("🚀 The game begins!".into()));
    let ServerMessage::ChooseWord(words) = &msgs[1] else {
        panic!("drawer should be offered words, got {:?}", msgs[1]);
    };
    assert_eq!(words.len(), 3);
    assert!(words.iter().all(|w| reg.config().words.contains(w)));

    for (i, s) in seats.iter_mut().enumerate().filter(|(i, _)| *i != d) {
        let msgs = s.rx.drain();
        assert!(
            !msgs.iter().any(|m| matches!(m, ServerMessage::ChooseWord(_))),
            "seat {i} must not see the candidates"
        );
        assert!(msgs.iter().any(|m| matches!(m, ServerMessage::Info(t) if t.ends_with("is choosing a word..."))));
    }
}

#[tokio::test]
async fn test_second_start_is_ignored_while_playing() {
    let (_reg, room, seats) = table(2, RoomConfig::default()).await;
    room.start_game(seats[0].id).await.unwrap();
    let drawer = room.snapshot().await.drawer;
    room.start_game(seats[0].id).await.unwrap();
    let snap = room.snapshot().await;
    assert_eq!(snap.round, 1);
    assert_eq!(snap.drawer, drawer);
}

// =========================================================================
// Choosing and drawing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_choose_word_from_non_drawer_is_ignored() {
    let (_reg, room, seats) = table(2, RoomConfig::default()).await;
    room.start_game(seats[0].id).await.unwrap();
    let d = drawer_index(&room, &seats).await;

    room.choose_word(seats[1 - d].id, "chat").await;
    let snap = room.snapshot().await;
    assert_eq!(snap.phase, Phase::ChoosingWord);
    assert_eq!(snap.word, None);
}

#[tokio::test(start_paused = true)]
async fn test_choose_word_lowercases_and_splits_announcements() {
    let (_reg, room, mut seats) = table(3, RoomConfig::default()).await;
    room.start_game(seats[0].id).await.unwrap();
    let d = drawer_index(&room, &seats).await;
    for s in &mut seats {
        s.rx.drain();
    }

    room.choose_word(seats[d].id, " Maison ").await;
    let snap = room.snapshot().await;
    assert_eq!(snap.phase, Phase::Drawing);
    assert_eq!(snap.word.as_deref(), Some("maison"));

    let drawer_msgs = seats[d].rx.drain();
    assert_eq!(drawer_msgs[0], ServerMessage::StartDrawing("maison".into()));
    for (i, s) in seats.iter_mut().enumerate() {
        if i == d {
            continue;
        }
        let msgs = s.rx.drain();
        assert_eq!(msgs[0], ServerMessage::StartDrawingPublic("maison".into()));
        assert!(matches!(&msgs[1], ServerMessage::Info(t) if t.ends_with("starts drawing!")));
    }
}

#[tokio::test(start_paused = true)]
async fn test_only_drawer_actions_are_relayed() {
    let (_reg, room, mut seats) = table(2, RoomConfig::default()).await;
    let d = start_drawing(&room, &mut seats, "robot").await;
    let g = 1 - d;
    let stroke = DrawAction {
        kind: DrawKind::Draw,
        payload: r#"{"x":1,"y":2}"#.into(),
    };

    room.relay_draw(seats[g].id, stroke.clone()).await;
    assert!(seats[d].rx.drain().is_empty());

    room.relay_draw(seats[d].id, stroke.clone()).await;
    assert_eq!(seats[g].rx.drain(), vec![ServerMessage::Draw(stroke)]);
    assert!(seats[d].rx.drain().is_empty(), "the drawer is not echoed");
}

// =========================================================================
// Guessing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_correct_guess_scores_once_within_bounds() {
    let (_reg, room, mut seats) = table(3, RoomConfig::default()).await;
    let d = start_drawing(&room, &mut seats, "panda").await;
    let g = (d + 1) % 3;

    room.chat(seats[g].id, "  PANDA ").await;
    let score = room.snapshot().await.score_of(seats[g].id).unwrap();
    assert!((50..=100).contains(&score), "score {score} out of range");

    let lines = chats(&seats[d].rx.drain());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with(&format!("🏆 {} found the word! (+", NAMES[g])));

    room.chat(seats[g].id, "panda").await;
    let snap = room.snapshot().await;
    assert_eq!(snap.score_of(seats[g].id), Some(score));
    assert_eq!(snap.guessed, vec![seats[g].id]);
    assert_eq!(chats(&seats[d].rx.drain()), vec![format!("{}: panda", NAMES[g])]);
}

#[tokio::test(start_paused = true)]
async fn test_drawer_chat_is_relayed_not_scored() {
    let (_reg, room, mut seats) = table(2, RoomConfig::default()).await;
    let d = start_drawing(&room, &mut seats, "plage").await;

    room.chat(seats[d].id, "plage").await;
    let snap = room.snapshot().await;
    assert_eq!(snap.score_of(seats[d].id), Some(0));
    assert!(snap.guessed.is_empty());
    assert_eq!(chats(&seats[1 - d].rx.drain()), vec![format!("{}: plage", NAMES[d])]);
}

#[tokio::test]
async fn test_chat_in_lobby_is_plain_relay() {
    let (_reg, room, mut seats) = table(2, RoomConfig::default()).await;
    room.chat(seats[1].id, "hello").await;
    room.chat(seats[1].id, "   ").await;
    assert_eq!(chats(&seats[0].rx.drain()), vec!["bob: hello".to_owned()]);
}

// =========================================================================
// Round end
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_all_found_ends_round_early_and_again_is_noop() {
    let (_reg, room, mut seats) = table(3, RoomConfig::default()).await;
    let d = start_drawing(&room, &mut seats, "fleur").await;
    let guessers: Vec<usize> = (0..3).filter(|i| *i != d).collect();

    room.chat(seats[guessers[0]].id, "fleur").await;
    assert_eq!(room.snapshot().await.phase, Phase::Drawing);

    room.chat(seats[guessers[1]].id, "fleur").await;
    let snap = room.snapshot().await;
    assert_eq!(snap.phase, Phase::RoundEnd);
    assert_eq!(snap.round, 2);
    assert_eq!(snap.word, None);
    assert!(seats[d].rx.drain().contains(&ServerMessage::RoundEnd("fleur".into())));

    room.end_round().await;
    let snap = room.snapshot().await;
    assert_eq!(snap.round, 2, "a second round end changes nothing");
    assert!(seats[d].rx.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hints_reveal_k_letters_at_each_stage() {
    let (_reg, room, mut seats) = table(2, RoomConfig::default()).await;
    let d = start_drawing(&room, &mut seats, "ordinateur").await;
    let g = 1 - d;

    tokio::time::sleep(Duration::from_secs(19)).await;
    assert!(hints(&seats[g].rx.drain()).is_empty());

    for (wait, k) in [(2, 1), (15, 2), (15, 3)] {
        tokio::time::sleep(Duration::from_secs(wait)).await;
        let h = hints(&seats[g].rx.drain());
        assert_eq!(h.len(), 1, "one hint at stage {k}");
        assert_eq!(h[0].split(' ').count(), "ordinateur".chars().count());
        assert_eq!(revealed(&h[0]), k);
    }
}

#[tokio::test(start_paused = true)]
async fn test_round_cap_then_intermission_starts_next_turn() {
    let (_reg, room, mut seats) = table(2, RoomConfig::default()).await;
    start_drawing(&room, &mut seats, "soleil").await;

    tokio::time::sleep(Duration::from_secs(61)).await;
    let snap = room.snapshot().await;
    assert_eq!(snap.phase, Phase::RoundEnd);
    assert_eq!(snap.round, 2);
    assert!(seats[0].rx.drain().contains(&ServerMessage::RoundEnd("soleil".into())));

    tokio::time::sleep(Duration::from_secs(4)).await;
    let snap = room.snapshot().await;
    assert_eq!(snap.phase, Phase::ChoosingWord);
    assert!(snap.drawer.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_stale_timeline_does_not_touch_next_round() {
    let (_reg, room, mut seats) = table(2, RoomConfig::default()).await;
    let d = start_drawing(&room, &mut seats, "chien").await;
    room.chat(seats[1 - d].id, "chien").await;
    assert_eq!(room.snapshot().await.round, 2);

    // Next turn at +4s; the new drawer picks right away.
    tokio::time::sleep(Duration::from_secs(5)).await;
    let d2 = drawer_index(&room, &seats).await;
    room.choose_word(seats[d2].id, "arbre").await;
    for s in &mut seats {
        s.rx.drain();
    }

    // The first round's timeline would hint at +20s and cap at +60s.
    tokio::time::sleep(Duration::from_secs(16)).await;
    assert!(hints(&seats[1 - d2].rx.drain()).is_empty());

    tokio::time::sleep(Duration::from_secs(40)).await;
    let snap = room.snapshot().await;
    assert_eq!(snap.word.as_deref(), Some("arbre"), "old cap must not end round 2");
    assert_eq!(snap.round, 2);
}

#[tokio::test(start_paused = true)]
async fn test_timers_from_previous_game_stay_quiet_after_restart() {
    let config = RoomConfig {
        rounds_per_member: 1,
        ..RoomConfig::default()
    };
    let (_reg, room, mut seats) = table(2, config).await;

    // Game one: both rounds found at once, at t=0 and t=5.
    let d = start_drawing(&room, &mut seats, "chien").await;
    room.chat(seats[1 - d].id, "chien").await;
    tokio::time::sleep(Duration::from_secs(5)).await;
    let d = drawer_index(&room, &seats).await;
    room.choose_word(seats[d].id, "arbre").await;
    room.chat(seats[1 - d].id, "arbre").await;
    assert_eq!(room.snapshot().await.phase, Phase::GameOver);

    // Game two starts at t=8, round 1 again. Game one's timelines would
    // hint at t=20/25/35/40/50/55 and cap at t=60/65.
    tokio::time::sleep(Duration::from_secs(3)).await;
    let d = start_drawing(&room, &mut seats, "plage").await;
    let g = 1 - d;
    assert_eq!(room.snapshot().await.round, 1);

    tokio::time::sleep(Duration::from_secs(19)).await;
    assert!(hints(&seats[g].rx.drain()).is_empty(), "no hint before +20s");

    tokio::time::sleep(Duration::from_secs(40)).await;
    let h = hints(&seats[g].rx.drain());
    assert_eq!(h.len(), 3, "one hint per stage, got {h:?}");
    let snap = room.snapshot().await;
    assert_eq!(snap.phase, Phase::Drawing, "only this round's cap ends it");
    assert_eq!(snap.word.as_deref(), Some("plage"));
    assert_eq!(snap.round, 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    let snap = room.snapshot().await;
    assert_eq!(snap.phase, Phase::RoundEnd);
    assert_eq!(snap.round, 2);
}

#[tokio::test(start_paused = true)]
async fn test_drawer_leaving_leaves_round_to_its_timer() {
    let (_reg, room, mut seats) = table(3, RoomConfig::default()).await;
    let d = start_drawing(&room, &mut seats, "pizza").await;

    room.leave(seats[d].id).await.unwrap();
    let snap = room.snapshot().await;
    assert_eq!(snap.drawer, None);
    assert_eq!(snap.phase, Phase::Drawing);

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(room.snapshot().await.round, 2);
}

// =========================================================================
// Game over
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_game_over_after_members_times_rounds() {
    let config = RoomConfig {
        rounds_per_member: 1,
        ..RoomConfig::default()
    };
    let (_reg, room, mut seats) = table(2, config).await;
    let d = start_drawing(&room, &mut seats, "clé").await;
    room.chat(seats[1 - d].id, "CLÉ").await;
    assert_eq!(room.snapshot().await.phase, Phase::RoundEnd);

    tokio::time::sleep(Duration::from_secs(5)).await;
    let d = drawer_index(&room, &seats).await;
    room.choose_word(seats[d].id, "robot").await;
    room.end_round().await;

    let snap = room.snapshot().await;
    assert_eq!(snap.phase, Phase::GameOver);
    assert!(!snap.started());
    assert_eq!(snap.round, 3);

    let msgs = seats[0].rx.drain();
    let standings = msgs
        .iter()
        .find_map(|m| match m {
            ServerMessage::GameOver(s) => Some(s.clone()),
            _ => None,
        })
        .expect("game over is announced");
    assert_eq!(standings.len(), 2);
    assert_eq!(standings[0].pseudonym, "ana");
    assert!(msgs.contains(&ServerMessage::Info("🏁 Game over!".into())));

    // Nothing more is scheduled once the game is over.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(room.snapshot().await.phase, Phase::GameOver);
}

#[tokio::test(start_paused = true)]
async fn test_scores_carry_into_next_game() {
    let config = RoomConfig {
        rounds_per_member: 1,
        ..RoomConfig::default()
    };
    let (_reg, room, mut seats) = table(2, config).await;
    let d = start_drawing(&room, &mut seats, "chat").await;
    let g = 1 - d;
    room.chat(seats[g].id, "chat").await;
    let earned = room.snapshot().await.score_of(seats[g].id).unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    room.end_round().await; // no word chosen yet: no-op
    let d = drawer_index(&room, &seats).await;
    room.choose_word(seats[d].id, "chien").await;
    room.end_round().await;
    assert_eq!(room.snapshot().await.phase, Phase::GameOver);

    room.start_game(seats[0].id).await.unwrap();
    let snap = room.snapshot().await;
    assert_eq!(snap.round, 1);
    assert_eq!(snap.phase, Phase::ChoosingWord);
    assert_eq!(snap.score_of(seats[g].id), Some(earned));
}

// =========================================================================
// End to end
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_three_players_find_maison() {
    let (_reg, room, mut seats) = table(3, RoomConfig::default()).await;
    room.start_game(seats[0].id).await.unwrap();

    let d = drawer_index(&room, &seats).await;
    let offered = seats[d]
        .rx
        .drain()
        .into_iter()
        .find_map(|m| match m {
            ServerMessage::ChooseWord(w) => Some(w),
            _ => None,
        })
        .unwrap();
    assert_eq!(offered.len(), 3);

    room.choose_word(seats[d].id, "maison").await;
    let guessers: Vec<usize> = (0..3).filter(|i| *i != d).collect();

    room.chat(seats[guessers[0]].id, "maison").await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(room.snapshot().await.phase, Phase::Drawing, "one guesser is not enough");

    room.chat(seats[guessers[1]].id, "Maison").await;
    let snap = room.snapshot().await;
    assert_eq!(snap.phase, Phase::RoundEnd);
    for &g in &guessers {
        assert!(snap.score_of(seats[g].id).unwrap() >= 50);
    }
    for s in &mut seats {
        assert!(s.rx.drain().contains(&ServerMessage::RoundEnd("maison".into())));
    }
}
