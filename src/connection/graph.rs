//! Established connections between compatible points.
//!
//! Each `Connection` owns its bound ribbon, so removing the connection drops
//! exactly that geometry. Points are linked to their connection through a
//! handle table rather than references, so a despawned point never dangles.

use bevy::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::point::PointSource;
use super::ribbon::{RibbonMesh, RibbonSettings};

/// Stable handle of a connection. Ids are never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u32);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("points {start:?} and {end:?} are not compatible")]
    Incompatible { start: Entity, end: Entity },
    #[error("point {0:?} cannot connect to itself")]
    SelfConnection(Entity),
    #[error("point {0:?} already has a connection")]
    AlreadyConnected(Entity),
    #[error("point {0:?} is not a live connection point")]
    UnknownPoint(Entity),
}

#[derive(Debug, Clone)]
pub struct Connection {
    start: Entity,
    end: Entity,
    ribbon: RibbonMesh,
}

impl Connection {
    pub fn start(&self) -> Entity {
        self.start
    }

    pub fn end(&self) -> Entity {
        self.end
    }

    pub fn ribbon(&self) -> &RibbonMesh {
        &self.ribbon
    }

    pub fn involves(&self, point: Entity) -> bool {
        self.start == point || self.end == point
    }
}

/// All connections of the session, in creation order.
#[derive(Resource, Debug, Default)]
pub struct ConnectionGraph {
    connections: BTreeMap<ConnectionId, Connection>,
    point_links: HashMap<Entity, ConnectionId>,
    next_id: u32,
    ribbon_settings: RibbonSettings,
}

impl ConnectionGraph {
    pub fn new(ribbon_settings: RibbonSettings) -> Self {
        Self {
            ribbon_settings,
            ..Default::default()
        }
    }

    pub fn ribbon_settings(&self) -> RibbonSettings {
        self.ribbon_settings
    }

    /// Connects two compatible points and builds the bound ribbon from their
    /// current poses. On error nothing changes.
    pub fn create_connection(
        &mut self,
        start: Entity,
        end: Entity,
        points: &impl PointSource,
    ) -> Result<ConnectionId, ConnectionError> {
        let result = self.try_create(start, end, points);
        match &result {
            Ok(id) => info!("[CONNECT] {} created {:?} → {:?}", id, start, end),
            Err(err) => warn!("[CONNECT] refused: {}", err),
        }
        result
    }

    fn try_create(
        &mut self,
        start: Entity,
        end: Entity,
        points: &impl PointSource,
    ) -> Result<ConnectionId, ConnectionError> {
        if start == end {
            return Err(ConnectionError::SelfConnection(start));
        }
        let start_view = points.point(start).ok_or(ConnectionError::UnknownPoint(start))?;
        let end_view = points.point(end).ok_or(ConnectionError::UnknownPoint(end))?;
        if !start_view.is_compatible_with(&end_view) {
            return Err(ConnectionError::Incompatible { start, end });
        }
        for point in [start, end] {
            if self.point_links.contains_key(&point) {
                return Err(ConnectionError::AlreadyConnected(point));
            }
        }

        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        let ribbon = RibbonMesh::bound(id, start_view.pose(), end_view.pose(), self.ribbon_settings);
        self.connections.insert(id, Connection { start, end, ribbon });
        self.point_links.insert(start, id);
        self.point_links.insert(end, id);
        Ok(id)
    }

    /// Removes a connection and hands it back; its ribbon goes with it.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.remove(&id)?;
        for point in [connection.start, connection.end] {
            if self.point_links.get(&point) == Some(&id) {
                self.point_links.remove(&point);
            }
        }
        info!("[CONNECT] {} removed", id);
        Some(connection)
    }

    /// Removes whatever connection `point` takes part in.
    pub fn remove_point(&mut self, point: Entity) -> Option<(ConnectionId, Connection)> {
        let id = *self.point_links.get(&point)?;
        self.remove(id).map(|connection| (id, connection))
    }

    /// Removes every connection, returning them in creation order.
    pub fn clear(&mut self) -> Vec<(ConnectionId, Connection)> {
        self.point_links.clear();
        let removed: Vec<_> = std::mem::take(&mut self.connections).into_iter().collect();
        if !removed.is_empty() {
            info!("[CONNECT] cleared {} connections", removed.len());
        }
        removed
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    pub fn connection_of(&self, point: Entity) -> Option<ConnectionId> {
        self.point_links.get(&point).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, &Connection)> + '_ {
        self.connections.iter().map(|(id, c)| (*id, c))
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
