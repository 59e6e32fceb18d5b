//! Domain records: users, cached sessions, vitals and medical records.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque user identifier.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self { Self::new() }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored account.
#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Input for [`UserStore::insert`](crate::store::UserStore::insert).
#[derive(Clone, Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Public view of a [`User`]; never carries the password hash.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for Profile {
    fn from(u: &User) -> Self {
        Self {
            user_id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            created_at: u.created_at,
        }
    }
}

/// The session cache value, keyed by session id.
///
/// Written at login, read on every request that carries a session.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CachedUser {
    pub user_id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for CachedUser {
    fn from(u: &User) -> Self {
        Self {
            user_id: u.id,
            email: u.email.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
        }
    }
}

// ── Vitals ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalKind {
    HeartRate,
    BloodPressure,
    Glucose,
    BodyTemperature,
    OxygenSaturation,
}

/// One measured value. Units are fixed per kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Vital {
    HeartRate { bpm: u16 },
    BloodPressure { systolic: u16, diastolic: u16 },
    Glucose { mg_dl: f32 },
    BodyTemperature { celsius: f32 },
    OxygenSaturation { percent: f32 },
}

impl Vital {
    pub fn kind(&self) -> VitalKind {
        match self {
            Self::HeartRate { .. }        => VitalKind::HeartRate,
            Self::BloodPressure { .. }    => VitalKind::BloodPressure,
            Self::Glucose { .. }          => VitalKind::Glucose,
            Self::BodyTemperature { .. }  => VitalKind::BodyTemperature,
            Self::OxygenSaturation { .. } => VitalKind::OxygenSaturation,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(flatten)]
    pub vital: Vital,
    pub recorded_at: DateTime<Utc>,
}

/// A medication entry. One record per medication name per user.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub name: String,
    pub dose: u32,
    pub measure: String,
    pub dosage: String,
    pub before_or_after: String,
    pub duration: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    #[serde(default)]
    pub is_deleted: bool,
}

/// What `GET .../dashboard` returns: the latest reading of each vital and the
/// active medical records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub heart_rate: Option<Reading>,
    pub blood_pressure: Option<Reading>,
    pub glucose: Option<Reading>,
    pub body_temperature: Option<Reading>,
    pub oxygen_saturation: Option<Reading>,
    pub medical_records: Vec<MedicalRecord>,
}

impl Dashboard {
    /// Keeps the most recent reading per kind and drops deleted records.
    pub fn summarize(readings: &[Reading], records: Vec<MedicalRecord>) -> Self {
        let mut dash = Self {
            medical_records: records.into_iter().filter(|r| !r.is_deleted).collect(),
            ..Self::default()
        };
        for reading in readings {
            let slot = match reading.vital.kind() {
                VitalKind::HeartRate        => &mut dash.heart_rate,
                VitalKind::BloodPressure    => &mut dash.blood_pressure,
                VitalKind::Glucose          => &mut dash.glucose,
                VitalKind::BodyTemperature  => &mut dash.body_temperature,
                VitalKind::OxygenSaturation => &mut dash.oxygen_saturation,
            };
            if slot.is_none_or(|cur| cur.recorded_at <= reading.recorded_at) {
                *slot = Some(*reading);
            }
        }
        dash
    }
}
