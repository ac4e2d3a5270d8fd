//! Service catalog operations.

use std::collections::HashMap;

use rust_decimal::Decimal;
use service_core::AppError;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{CreateService, Service, UpdateService};
use crate::pricing::FALLBACK_TAX_PERCENT;

use super::database::Database;

const SERVICE_COLUMNS: &str =
    "id, name, description, base_price, tax_percent, is_active, created_at, updated_at";

impl Database {
    /// Create a catalog service.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_service(&self, input: &CreateService) -> Result<Service, AppError> {
        if input.base_price < Decimal::ZERO {
            return Err(AppError::Validation(anyhow::anyhow!(
                "Service base price cannot be negative"
            )));
        }
        if input.tax_percent.is_some_and(|p| p < Decimal::ZERO) {
            return Err(AppError::Validation(anyhow::anyhow!(
                "Service tax percent cannot be negative"
            )));
        }

        let service = sqlx::query_as::<_, Service>(&format!(
            r#"
            INSERT INTO services (id, name, description, base_price, tax_percent, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SERVICE_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.base_price)
        .bind(input.tax_percent.unwrap_or(FALLBACK_TAX_PERCENT))
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(self.pool())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Service '{}' already exists",
                    input.name
                ))
            }
            _ => AppError::Database(anyhow::anyhow!("Failed to create service: {}", e)),
        })?;

        info!(service_id = %service.id, name = %service.name, "Catalog service created");

        Ok(service)
    }

    /// Get a catalog service by ID.
    pub async fn get_service(&self, id: Uuid) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to get service: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Service not found")))
    }

    /// List catalog services, newest first.
    pub async fn list_services(&self) -> Result<Vec<Service>, AppError> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to list services: {}", e)))
    }

    /// Fetch the services referenced by a set of line requests, keyed by
    /// id. Missing ids simply do not appear; the line resolver reports
    /// them.
    pub(crate) async fn services_by_id(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Service>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let services = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to fetch services: {}", e)))?;

        Ok(services.into_iter().map(|s| (s.id, s)).collect())
    }

    /// Update a catalog service.
    #[instrument(skip(self, input), fields(service_id = %id))]
    pub async fn update_service(
        &self,
        id: Uuid,
        input: &UpdateService,
    ) -> Result<Service, AppError> {
        if input.base_price.is_some_and(|p| p < Decimal::ZERO) {
            return Err(AppError::Validation(anyhow::anyhow!(
                "Service base price cannot be negative"
            )));
        }

        sqlx::query_as::<_, Service>(&format!(
            r#"
            UPDATE services
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                base_price = COALESCE($4, base_price),
                tax_percent = COALESCE($5, tax_percent),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SERVICE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.base_price)
        .bind(input.tax_percent)
        .bind(input.is_active)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to update service: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Service not found")))
    }

    /// Delete a catalog service. Historical line items keep their
    /// snapshotted description and price; only the reference is cleared.
    #[instrument(skip(self), fields(service_id = %id))]
    pub async fn delete_service(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to delete service: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!("Service not found")));
        }

        info!(service_id = %id, "Catalog service deleted");
        Ok(())
    }
}
