use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use super::auth::AuthGatewayTrait;
use super::errors::RepositoryError;
use super::measurement::MeasurementRepositoryTrait;
use crate::models::auth::{AuthResponse, LoginPayload, RegisterPayload, UserRecord};
use crate::models::measurement::{CreateMeasurementPayload, MeasurementRecord, RangeQuery};

/// In-memory measurement repository for tests and offline demos
#[derive(Debug, Clone, Default)]
pub struct InMemoryMeasurementRepository {
    /// Stored records in insertion order
    records: Arc<Mutex<Vec<MeasurementRecord>>>,
    /// Every payload received by `create`
    submitted: Arc<Mutex<Vec<CreateMeasurementPayload>>>,
    /// Identifiers received by `delete`
    deleted: Arc<Mutex<Vec<String>>>,
    /// Error returned by every call when set
    failure: Option<RepositoryError>,
}

impl InMemoryMeasurementRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with predefined records
    pub fn with_records(records: Vec<MeasurementRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Self::default()
        }
    }

    /// Configure every call to fail with the given error
    pub fn with_failure(mut self, error: RepositoryError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Payloads received by `create`
    pub fn submitted(&self) -> Vec<CreateMeasurementPayload> {
        self.submitted.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Identifiers received by `delete`
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// Snapshot of the stored records
    pub fn records(&self) -> Vec<MeasurementRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn check_failure(&self) -> Result<(), RepositoryError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MeasurementRepositoryTrait for InMemoryMeasurementRepository {
    async fn list(&self, range: RangeQuery) -> Result<Vec<MeasurementRecord>, RepositoryError> {
        self.check_failure()?;
        let store = self.records.lock()?;
        let readings = store
            .iter()
            .filter(|record| match record.calendar_date() {
                Some(day) => day >= range.start_date && day <= range.end_date,
                None => false,
            })
            .cloned()
            .collect();
        Ok(readings)
    }

    async fn create(&self, payload: CreateMeasurementPayload) -> Result<MeasurementRecord, RepositoryError> {
        self.submitted.lock()?.push(payload.clone());
        self.check_failure()?;

        let record = MeasurementRecord {
            id: Uuid::new_v4().to_string(),
            systolic: payload.systolic,
            diastolic: payload.diastolic,
            pulse: payload.pulse,
            measurement_date: payload.measurement_date,
            measurement_time: payload.measurement_time,
            notes: Some(payload.notes).filter(|n| !n.is_empty()),
        };
        self.records.lock()?.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.deleted.lock()?.push(id.to_string());
        self.check_failure()?;
        // Unknown identifiers are a safe miss
        self.records.lock()?.retain(|record| record.id != id);
        Ok(())
    }
}

/// In-memory auth gateway with a fixed set of accounts
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthGateway {
    accounts: Arc<Mutex<Vec<(UserRecord, String)>>>,
    current: Arc<Mutex<Option<UserRecord>>>,
}

impl InMemoryAuthGateway {
    /// Create a gateway without accounts
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account
    pub fn with_account(self, user: UserRecord, password: &str) -> Self {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.push((user, password.to_string()));
        }
        self
    }

    /// Start with a signed in user, as if a session had been restored
    pub fn with_session(self, user: UserRecord) -> Self {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(user);
        }
        self
    }

    fn signed_in(&self, user: UserRecord) -> Result<AuthResponse, RepositoryError> {
        *self.current.lock()? = Some(user.clone());
        Ok(AuthResponse {
            success: Some(true),
            token: Some(Uuid::new_v4().to_string()),
            user: Some(user),
            ..AuthResponse::default()
        })
    }

    fn rejected(message: &str) -> AuthResponse {
        AuthResponse {
            success: Some(false),
            error: Some(message.to_string()),
            ..AuthResponse::default()
        }
    }
}

#[async_trait]
impl AuthGatewayTrait for InMemoryAuthGateway {
    async fn login(&self, payload: LoginPayload) -> Result<AuthResponse, RepositoryError> {
        let found = self
            .accounts
            .lock()?
            .iter()
            .find(|(user, password)| user.email == payload.email && *password == payload.password)
            .map(|(user, _)| user.clone());

        match found {
            Some(user) => self.signed_in(user),
            None => Ok(Self::rejected("Email ou mot de passe incorrect")),
        }
    }

    async fn register(&self, payload: RegisterPayload) -> Result<AuthResponse, RepositoryError> {
        let user = {
            let mut accounts = self.accounts.lock()?;
            if accounts.iter().any(|(user, _)| user.email == payload.email) {
                return Ok(Self::rejected("Un compte existe déjà avec cet email"));
            }
            let user = UserRecord {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email: payload.email,
                date_of_birth: payload.date_of_birth,
            };
            accounts.push((user.clone(), payload.password));
            user
        };
        self.signed_in(user)
    }

    async fn logout(&self) -> Result<(), RepositoryError> {
        *self.current.lock()? = None;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self.current.lock()?.clone())
    }
}
