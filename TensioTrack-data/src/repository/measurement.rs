use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, error};

use super::errors::RepositoryError;
use crate::client::ApiClient;
use crate::models::measurement::{
    CreateMeasurementPayload, MeasurementListResponse, MeasurementRecord, MeasurementResponse,
    RangeQuery,
};

/// Repository trait for blood pressure measurements
#[async_trait]
pub trait MeasurementRepositoryTrait: Send + Sync {
    /// List the measurements taken within a date range (both bounds inclusive)
    async fn list(&self, range: RangeQuery) -> Result<Vec<MeasurementRecord>, RepositoryError>;

    /// Create a new measurement; the server assigns its identifier
    async fn create(&self, payload: CreateMeasurementPayload) -> Result<MeasurementRecord, RepositoryError>;

    /// Delete a measurement by identifier
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}

/// Repository backed by the remote REST API
#[derive(Debug, Clone)]
pub struct HttpMeasurementRepository {
    client: ApiClient,
}

impl HttpMeasurementRepository {
    /// Create a new repository on top of a shared client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MeasurementRepositoryTrait for HttpMeasurementRepository {
    async fn list(&self, range: RangeQuery) -> Result<Vec<MeasurementRecord>, RepositoryError> {
        debug!(
            "Fetching measurements from {} to {}",
            range.start_date, range.end_date
        );
        let request = self
            .client
            .request(Method::GET, "/api/measurements/range")?
            .query(&range);

        let response = self.client.send(request).await.map_err(|e| {
            error!("Failed to fetch measurements: {}", e);
            e
        })?;
        let body: MeasurementListResponse = response.json().await?;

        debug!("Received {} measurements", body.measurements.len());
        Ok(body.measurements)
    }

    async fn create(&self, payload: CreateMeasurementPayload) -> Result<MeasurementRecord, RepositoryError> {
        debug!(
            "Creating measurement {}/{} pulse {} at {} {}",
            payload.systolic,
            payload.diastolic,
            payload.pulse,
            payload.measurement_date,
            payload.measurement_time
        );
        let request = self
            .client
            .request(Method::POST, "/api/measurements")?
            .json(&payload);

        let response = self.client.send(request).await.map_err(|e| {
            error!("Failed to create measurement: {}", e);
            e.into_rejection()
        })?;
        let body: MeasurementResponse = response.json().await?;

        debug!("Measurement stored with id {}", body.measurement.id);
        Ok(body.measurement)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        debug!("Deleting measurement {}", id);
        let request = self
            .client
            .request(Method::DELETE, &format!("/api/measurements/{}", id))?;

        self.client.send(request).await.map_err(|e| {
            error!("Failed to delete measurement {}: {}", id, e);
            e
        })?;
        Ok(())
    }
}
