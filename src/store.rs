//! Record storage.
//!
//! The handlers only see the [`UserStore`] and [`HealthRecordStore`] traits.
//! The in-memory implementations back local runs and tests.
//!
//! No route writes vitals or medical records yet; `add_reading` and
//! `upsert_medical_record` are for ingestion done outside the HTTP surface
//! (and for tests), so a fresh process serves an empty dashboard.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::Error;
use crate::models::{MedicalRecord, NewUser, Reading, User, UserId};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`Error::Conflict`] when the email is taken.
    async fn insert(&self, new: NewUser) -> Result<User, Error>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, Error>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;
}

#[async_trait]
pub trait HealthRecordStore: Send + Sync {
    async fn add_reading(&self, user: UserId, reading: Reading) -> Result<(), Error>;
    async fn readings(&self, user: UserId) -> Result<Vec<Reading>, Error>;

    /// Creates the record, or replaces the user's record with the same name.
    async fn upsert_medical_record(&self, user: UserId, record: MedicalRecord) -> Result<(), Error>;
    async fn medical_records(&self, user: UserId) -> Result<Vec<MedicalRecord>, Error>;
}

/// Emails compare case-insensitively.
fn email_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<UserId, User>,
    by_email: DashMap<String, UserId>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, new: NewUser) -> Result<User, Error> {
        let id = match self.by_email.entry(email_key(&new.email)) {
            Entry::Occupied(_) => return Err(Error::Conflict(format!("user {}", new.email))),
            Entry::Vacant(slot) => *slot.insert(UserId::new()),
        };
        let user = User {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, Error> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let Some(id) = self.by_email.get(&email_key(email)).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }
}

#[derive(Default)]
pub struct MemoryHealthRecords {
    readings: DashMap<UserId, Vec<Reading>>,
    records: DashMap<UserId, Vec<MedicalRecord>>,
}

impl MemoryHealthRecords {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HealthRecordStore for MemoryHealthRecords {
    async fn add_reading(&self, user: UserId, reading: Reading) -> Result<(), Error> {
        self.readings.entry(user).or_default().push(reading);
        Ok(())
    }

    async fn readings(&self, user: UserId) -> Result<Vec<Reading>, Error> {
        Ok(self.readings.get(&user).map(|r| r.clone()).unwrap_or_default())
    }

    async fn upsert_medical_record(&self, user: UserId, record: MedicalRecord) -> Result<(), Error> {
        let mut list = self.records.entry(user).or_default();
        match list.iter_mut().find(|r| r.name == record.name) {
            Some(existing) => *existing = record,
            None => list.push(record),
        }
        Ok(())
    }

    async fn medical_records(&self, user: UserId) -> Result<Vec<MedicalRecord>, Error> {
        Ok(self.records.get(&user).map(|r| r.clone()).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = MemoryUserStore::new();
        let user = store.insert(new_user("ada@example.com")).await.unwrap();

        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        let by_email = store.find_by_email("ADA@example.com").await.unwrap().unwrap();
        assert_eq!(by_id.id, user.id);
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryUserStore::new();
        store.insert(new_user("ada@example.com")).await.unwrap();

        let err = store.insert(new_user(" Ada@Example.com")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn upsert_replaces_record_with_same_name() {
        let store = MemoryHealthRecords::new();
        let user = UserId::new();
        let mut record = MedicalRecord {
            name: "metformin".into(),
            dose: 500,
            measure: "mg".into(),
            dosage: "daily".into(),
            before_or_after: "after".into(),
            duration: 30,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            reason: "glucose".into(),
            is_deleted: false,
        };
        store.upsert_medical_record(user, record.clone()).await.unwrap();
        record.dose = 850;
        store.upsert_medical_record(user, record.clone()).await.unwrap();

        assert_eq!(store.medical_records(user).await.unwrap(), vec![record]);
        assert!(store.medical_records(UserId::new()).await.unwrap().is_empty());
    }
}
