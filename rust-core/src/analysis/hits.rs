// Hit records produced by the transport for one event

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A particle crossing a sensitive plane (target exit or tracker)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerHit {
    /// Position [mm]
    pub position: Vector3<f64>,
    /// Momentum [MeV/c]
    pub momentum: Vector3<f64>,
    /// Kinetic energy [MeV]
    pub kinetic_energy: f64,
    pub pdg: i32,
    pub charge: i32,
    /// Particle name, used for the type counters
    pub particle_name: String,
}

impl TrackerHit {
    /// Angle to the beam axis [rad]
    pub fn angle(&self) -> f64 {
        self.momentum.x.hypot(self.momentum.y).atan2(self.momentum.z)
    }

    /// Horizontal slope px/pz [rad]
    pub fn xp(&self) -> f64 {
        self.momentum.x / self.momentum.z
    }

    /// Vertical slope py/pz [rad]
    pub fn yp(&self) -> f64 {
        self.momentum.y / self.momentum.z
    }

    /// Transverse distance from the beam axis [mm]
    pub fn radius(&self) -> f64 {
        self.position.x.hypot(self.position.y)
    }

    pub fn is_charged(&self) -> bool {
        self.charge != 0
    }
}

/// Energy deposited in the target by one step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdepHit {
    /// Total deposit [MeV]
    pub deposited_energy: f64,
    /// Non-ionising part [MeV]
    pub deposited_energy_niel: f64,
    /// Deposit position in target coordinates, z along the target normal [mm]
    pub position: Vector3<f64>,
}

impl EdepHit {
    pub fn new(deposited_energy: f64, deposited_energy_niel: f64, position: Vector3<f64>) -> Self {
        Self {
            deposited_energy,
            deposited_energy_niel,
            position,
        }
    }

    pub fn ionising(&self) -> f64 {
        self.deposited_energy - self.deposited_energy_niel
    }

    /// Distance from the target axis [mm]
    pub fn radius(&self) -> f64 {
        self.position.x.hypot(self.position.y)
    }
}

/// Everything the sensitive volumes recorded during one event
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: u64,
    pub target_edep: Vec<EdepHit>,
    pub target_exit: Vec<TrackerHit>,
    pub tracker: Vec<TrackerHit>,
}
