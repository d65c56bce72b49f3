//! The minimal session/registry surface `spec.md` §6 says an implementer
//! "must expose at minimum": opaque sessions, each holding uniquely-named
//! worlds. See `SPEC_FULL.md` §4.9 — this is addressable plumbing, not a
//! session *lifecycle* policy (auth, expiry); that remains out of scope.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info};

use crate::error::EngineError;
use crate::world::World;

/// An opaque session identifier. Never constructed from outside this
/// module; formatted as `sess-<n>` but the number carries no meaning to
/// callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sess-{}", self.0)
    }
}

/// Metadata about one world, as read by an embedding without touching the
/// grid directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldMeta {
    pub name: String,
    pub radius: u32,
    pub active_count: usize,
}

/// One session's worlds, plus which one (if any) is currently selected.
struct Session {
    worlds: BTreeMap<String, World>,
    selected: Option<String>,
}

/// The registry of all live sessions. Owns every `World` it hands out
/// access to; an embedding serializes concurrent access with a mutex
/// around the whole registry (or around one session), per `spec.md` §5.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<SessionId, Session>,
    next_id: u64,
}

impl SessionRegistry {
    pub fn new() -> SessionRegistry {
        SessionRegistry {
            sessions: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Creates a new, empty session and returns its opaque id.
    pub fn create_session(&mut self) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.sessions.insert(
            id,
            Session {
                worlds: BTreeMap::new(),
                selected: None,
            },
        );
        info!(session = %id, "session created");
        id
    }

    /// Deletes a session and every world it holds.
    pub fn delete_session(&mut self, session: SessionId) -> Result<(), EngineError> {
        self.sessions
            .remove(&session)
            .map(|_| ())
            .ok_or_else(|| EngineError::SessionNotFound(session.to_string()))
    }

    fn session_mut(&mut self, session: SessionId) -> Result<&mut Session, EngineError> {
        self.sessions
            .get_mut(&session)
            .ok_or_else(|| EngineError::SessionNotFound(session.to_string()))
    }

    fn session(&self, session: SessionId) -> Result<&Session, EngineError> {
        self.sessions
            .get(&session)
            .ok_or_else(|| EngineError::SessionNotFound(session.to_string()))
    }

    /// Lists the names of every world in `session`, alphabetically.
    pub fn list_worlds(&self, session: SessionId) -> Result<Vec<String>, EngineError> {
        Ok(self.session(session)?.worlds.keys().cloned().collect())
    }

    /// Creates a new, empty world named `name` in `session`.
    pub fn create_world(
        &mut self,
        session: SessionId,
        name: &str,
        radius: u32,
        seed: u64,
    ) -> Result<(), EngineError> {
        let world = World::new(radius, seed)?;
        let sess = self.session_mut(session)?;
        if sess.worlds.contains_key(name) {
            return Err(EngineError::NameConflict(name.to_string()));
        }
        sess.worlds.insert(name.to_string(), world);
        if sess.selected.is_none() {
            sess.selected = Some(name.to_string());
        }
        debug!(session = %session, world = name, "world created");
        Ok(())
    }

    /// Renames a world, keeping its selection status if it was selected.
    pub fn rename_world(
        &mut self,
        session: SessionId,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), EngineError> {
        let sess = self.session_mut(session)?;
        if sess.worlds.contains_key(new_name) {
            return Err(EngineError::NameConflict(new_name.to_string()));
        }
        let world = sess
            .worlds
            .remove(old_name)
            .ok_or_else(|| EngineError::WorldNotFound(old_name.to_string()))?;
        sess.worlds.insert(new_name.to_string(), world);
        if sess.selected.as_deref() == Some(old_name) {
            sess.selected = Some(new_name.to_string());
        }
        Ok(())
    }

    /// Deletes a world. Clears the selection if it was the selected world.
    pub fn delete_world(&mut self, session: SessionId, name: &str) -> Result<(), EngineError> {
        let sess = self.session_mut(session)?;
        sess.worlds
            .remove(name)
            .ok_or_else(|| EngineError::WorldNotFound(name.to_string()))?;
        if sess.selected.as_deref() == Some(name) {
            sess.selected = None;
        }
        Ok(())
    }

    /// Marks `name` as the session's selected world.
    pub fn select_world(&mut self, session: SessionId, name: &str) -> Result<(), EngineError> {
        let sess = self.session_mut(session)?;
        if !sess.worlds.contains_key(name) {
            return Err(EngineError::WorldNotFound(name.to_string()));
        }
        sess.selected = Some(name.to_string());
        Ok(())
    }

    pub fn selected_world(&self, session: SessionId) -> Result<Option<&str>, EngineError> {
        Ok(self.session(session)?.selected.as_deref())
    }

    /// Reads one world's metadata without exposing its grid.
    pub fn world_meta(&self, session: SessionId, name: &str) -> Result<WorldMeta, EngineError> {
        let world = self.world_ref(session, name)?;
        Ok(WorldMeta {
            name: name.to_string(),
            radius: world.radius(),
            active_count: world.active_count(),
        })
    }

    /// Grants direct access to a world for the operations that don't need
    /// their own registry-level wrapper (grid reads/writes, stepping,
    /// history navigation): `registry.world_handle(session, name)?.step()`.
    pub fn world_handle(&mut self, session: SessionId, name: &str) -> Result<&mut World, EngineError> {
        self.session_mut(session)?
            .worlds
            .get_mut(name)
            .ok_or_else(|| EngineError::WorldNotFound(name.to_string()))
    }

    pub fn world_ref(&self, session: SessionId, name: &str) -> Result<&World, EngineError> {
        self.session(session)?
            .worlds
            .get(name)
            .ok_or_else(|| EngineError::WorldNotFound(name.to_string()))
    }
}
