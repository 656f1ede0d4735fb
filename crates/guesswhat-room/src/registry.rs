//! Process-wide lookup of live rooms by code.

use std::collections::HashMap;
use std::sync::Arc;

use guesswhat_protocol::RoomCode;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;

use crate::{Player, Room, RoomConfig, RoomError};

struct Rooms {
    by_code: HashMap<RoomCode, Arc<Room>>,
    /// Draws room codes and seeds each room's own generator.
    rng: StdRng,
}

/// Creates, finds, and reaps rooms.
///
/// One coarse lock guards the map. It is held only to insert, look up or
/// remove a room, never while a room operation runs.
pub struct RoomRegistry {
    config: Arc<RoomConfig>,
    rooms: Mutex<Rooms>,
}

impl RoomRegistry {
    /// A registry seeded from the operating system.
    pub fn new(config: RoomConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// A registry whose codes and games are reproducible from `rng`.
    pub fn with_rng(config: RoomConfig, rng: StdRng) -> Self {
        Self {
            config: Arc::new(config.validated()),
            rooms: Mutex::new(Rooms {
                by_code: HashMap::new(),
                rng,
            }),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Registers a new room with `creator` as its only member and host.
    ///
    /// The code is drawn until it is not in use; drawing and inserting
    /// happen under the same lock.
    pub async fn create_room(&self, creator: Player) -> Arc<Room> {
        let mut rooms = self.rooms.lock().await;
        let code = loop {
            let code = RoomCode::generate(&mut rooms.rng);
            if !rooms.by_code.contains_key(&code) {
                break code;
            }
        };

        let creator_id = creator.id;
        let room_rng = StdRng::from_rng(&mut rooms.rng);
        let room = Room::new(code.clone(), creator, Arc::clone(&self.config), room_rng);
        rooms.by_code.insert(code.clone(), Arc::clone(&room));

        tracing::info!(%code, player_id = %creator_id, rooms = rooms.by_code.len(), "room created");
        room
    }

    /// Looks up a live room. `code` should already be normalized with
    /// [`RoomCode::parse`].
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if no such room exists.
    pub async fn find_room(&self, code: &RoomCode) -> Result<Arc<Room>, RoomError> {
        self.rooms
            .lock()
            .await
            .by_code
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    /// Drops the room if nobody is left in it. Returns whether it was
    /// removed.
    ///
    /// The room is closed under its own lock first; the map lock is taken
    /// afterwards only for the removal.
    pub async fn reap_if_empty(&self, code: &RoomCode) -> bool {
        let Ok(room) = self.find_room(code).await else {
            return false;
        };
        if !room.close_if_empty().await {
            return false;
        }

        let mut rooms = self.rooms.lock().await;
        if !rooms.by_code.get(code).is_some_and(|r| Arc::ptr_eq(r, &room)) {
            return false;
        }
        rooms.by_code.remove(code);
        tracing::info!(%code, rooms = rooms.by_code.len(), "empty room removed");
        true
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.by_code.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
