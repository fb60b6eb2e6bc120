use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

use super::generators::RoomCodeGenerator;
use super::models::{ConnectionId, RoomCode};
use crate::shared::AppError;

/// In-memory registry mapping room codes to their connected members.
///
/// Rooms are sharded by `DashMap`, so traffic in one room never waits on an
/// unrelated room. Membership edits and empty-room removal happen under the
/// same shard lock, so a snapshot from `members_of` is never taken mid-update.
pub struct RoomRegistry {
    rooms: DashMap<RoomCode, HashSet<ConnectionId>>,
    // connection -> room it currently belongs to
    memberships: DashMap<ConnectionId, RoomCode>,
    code_generator: Box<dyn RoomCodeGenerator>,
    max_code_attempts: usize,
}

impl RoomRegistry {
    pub fn new(code_generator: Box<dyn RoomCodeGenerator>, max_code_attempts: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            memberships: DashMap::new(),
            code_generator,
            max_code_attempts,
        }
    }

    /// Creates an empty room under a freshly generated code.
    ///
    /// The room is visible to joins immediately, before its first member
    /// arrives. Gives up with `CodeSpaceExhausted` after `max_code_attempts`
    /// collisions with live codes.
    #[instrument(skip(self))]
    pub fn create_room(&self) -> Result<RoomCode, AppError> {
        for attempt in 1..=self.max_code_attempts {
            let code = self.code_generator.generate();
            match self.rooms.entry(code.clone()) {
                Entry::Occupied(_) => {
                    debug!(room = %code, attempt, "Generated room code already live, retrying");
                }
                Entry::Vacant(slot) => {
                    slot.insert(HashSet::new());
                    info!(room = %code, live_rooms = self.rooms.len(), "Room created");
                    return Ok(code);
                }
            }
        }

        warn!(
            attempts = self.max_code_attempts,
            live_rooms = self.rooms.len(),
            "Room code space exhausted"
        );
        Err(AppError::CodeSpaceExhausted {
            attempts: self.max_code_attempts,
        })
    }

    /// Adds a connection to a room, creating the room if the code is unknown.
    ///
    /// A connection belongs to at most one room; joining another room moves it.
    #[instrument(skip(self))]
    pub fn join(&self, code: &RoomCode, connection_id: ConnectionId) {
        if let Some(previous) = self.memberships.insert(connection_id, code.clone()) {
            if &previous != code {
                debug!(from = %previous, to = %code, %connection_id, "Connection switching rooms");
                self.remove_member(&previous, connection_id);
            }
        }

        let member_count = {
            let mut members = self.rooms.entry(code.clone()).or_default();
            members.insert(connection_id);
            members.len()
        };

        info!(room = %code, %connection_id, member_count, "Connection joined room");
    }

    /// Removes a connection from its room, deleting the room once it is empty.
    /// Returns the room the connection left, or None if it was in no room.
    #[instrument(skip(self))]
    pub fn leave(&self, connection_id: ConnectionId) -> Option<RoomCode> {
        let (_, code) = self.memberships.remove(&connection_id)?;
        self.remove_member(&code, connection_id);
        Some(code)
    }

    fn remove_member(&self, code: &RoomCode, connection_id: ConnectionId) {
        let removed = self.rooms.remove_if_mut(code, |_, members| {
            members.remove(&connection_id);
            members.is_empty()
        });

        if removed.is_some() {
            info!(room = %code, %connection_id, "Last member left, room deleted");
        } else {
            debug!(room = %code, %connection_id, "Connection left room");
        }
    }

    /// Snapshot of the room's current members; empty if the room does not exist
    pub fn members_of(&self, code: &RoomCode) -> Vec<ConnectionId> {
        self.rooms
            .get(code)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Room the connection currently belongs to
    pub fn room_of(&self, connection_id: ConnectionId) -> Option<RoomCode> {
        self.memberships
            .get(&connection_id)
            .map(|code| code.value().clone())
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
