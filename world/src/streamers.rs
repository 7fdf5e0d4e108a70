//! Population in transit between cells.

use glam::Vec2;
use outbreak_core::{
    CellCoord, CellPoint, SimulationError, StreamerId, StreamerSnapshot, StreamerState,
};

#[derive(Clone, Debug)]
struct Streamer {
    id: StreamerId,
    source: CellCoord,
    destination: CellCoord,
    position: Vec2,
    target: Vec2,
    direction: Vec2,
    healthy: f64,
    infected: f64,
    state: StreamerState,
}

impl Streamer {
    fn snapshot(&self) -> StreamerSnapshot {
        StreamerSnapshot {
            id: self.id,
            source: self.source,
            destination: self.destination,
            position: point(self.position),
            direction: point(self.direction),
            carried_healthy: self.healthy,
            carried_infected: self.infected,
            state: self.state,
        }
    }

    /// Empties the cargo and moves the streamer past `Traveling`.
    fn unload(&mut self, hold_for_cue: bool) -> Cargo {
        let cargo = Cargo {
            streamer: self.id,
            position: self.position,
            destination: self.destination,
            healthy: self.healthy,
            infected: self.infected,
        };
        self.healthy = 0.0;
        self.infected = 0.0;
        self.state = if hold_for_cue && cargo.infected > 0.0 {
            StreamerState::Arrived
        } else {
            StreamerState::Removed
        };
        cargo
    }
}

/// Population taken off a streamer, awaiting delivery by the world.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cargo {
    pub(crate) streamer: StreamerId,
    pub(crate) position: Vec2,
    pub(crate) destination: CellCoord,
    pub(crate) healthy: f64,
    pub(crate) infected: f64,
}

/// Collection of streamers owned by the world.
#[derive(Debug, Default)]
pub(crate) struct StreamerRoster {
    streamers: Vec<Streamer>,
    next_id: u32,
}

impl StreamerRoster {
    pub(crate) fn clear(&mut self) {
        self.streamers.clear();
        self.next_id = 0;
    }

    /// Registers a streamer at its source cell, heading for its destination.
    pub(crate) fn launch(
        &mut self,
        source: CellCoord,
        destination: CellCoord,
        healthy: f64,
        infected: f64,
    ) -> StreamerId {
        let id = StreamerId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let position = coord_to_vec(source);
        let target = coord_to_vec(destination);
        self.streamers.push(Streamer {
            id,
            source,
            destination,
            position,
            target,
            direction: (target - position).normalize_or_zero(),
            healthy,
            infected,
            state: StreamerState::Traveling,
        });
        id
    }

    /// Moves every traveling streamer up to `distance` cells toward its destination.
    ///
    /// Movement never overshoots the destination. Streamers that end up closer
    /// than `arrive_threshold` unload and their cargo is returned for delivery.
    pub(crate) fn advance(
        &mut self,
        distance: f32,
        arrive_threshold: f32,
        hold_for_cue: bool,
    ) -> Vec<Cargo> {
        let mut arrivals = Vec::new();
        for streamer in self
            .streamers
            .iter_mut()
            .filter(|streamer| streamer.state == StreamerState::Traveling)
        {
            let remaining = streamer.position.distance(streamer.target);
            let step = distance.max(0.0).min(remaining);
            streamer.position += streamer.direction * step;
            if streamer.position.distance(streamer.target) < arrive_threshold {
                streamer.position = streamer.target;
                arrivals.push(streamer.unload(hold_for_cue));
            }
        }
        arrivals
    }

    /// Unloads every traveling streamer strictly closer than `radius` to `center`.
    pub(crate) fn intercept(&mut self, center: Vec2, radius: f32, hold_for_cue: bool) -> Vec<Cargo> {
        self.streamers
            .iter_mut()
            .filter(|streamer| {
                streamer.state == StreamerState::Traveling
                    && streamer.position.distance(center) < radius
            })
            .map(|streamer| streamer.unload(hold_for_cue))
            .collect()
    }

    /// Marks a streamer that finished its terminal cue as removable.
    pub(crate) fn release(&mut self, id: StreamerId) -> Result<(), SimulationError> {
        match self
            .streamers
            .iter_mut()
            .find(|streamer| streamer.id == id && streamer.state == StreamerState::Arrived)
        {
            Some(streamer) => {
                streamer.state = StreamerState::Removed;
                Ok(())
            }
            None => Err(SimulationError::StreamerNotAwaitingRelease { streamer: id }),
        }
    }

    /// Discards removed streamers, returning how many were dropped.
    pub(crate) fn cull(&mut self) -> usize {
        let before = self.streamers.len();
        let mut index = 0;
        while index < self.streamers.len() {
            if self.streamers[index].state == StreamerState::Removed {
                let _ = self.streamers.swap_remove(index);
            } else {
                index += 1;
            }
        }
        before - self.streamers.len()
    }

    /// Number of streamers that have not been removed.
    pub(crate) fn active_count(&self) -> usize {
        self.streamers
            .iter()
            .filter(|streamer| streamer.state != StreamerState::Removed)
            .count()
    }

    /// Healthy and infected population currently on board.
    pub(crate) fn in_flight(&self) -> (f64, f64) {
        self.streamers
            .iter()
            .fold((0.0, 0.0), |(healthy, infected), streamer| {
                (healthy + streamer.healthy, infected + streamer.infected)
            })
    }

    pub(crate) fn snapshots(&self) -> Vec<StreamerSnapshot> {
        self.streamers.iter().map(Streamer::snapshot).collect()
    }
}

pub(crate) fn coord_to_vec(coord: CellCoord) -> Vec2 {
    Vec2::new(coord.column() as f32, coord.row() as f32)
}

fn point(vector: Vec2) -> CellPoint {
    CellPoint::new(vector.x, vector.y)
}
