//! Agency settings operations.

use service_core::AppError;
use tracing::{info, instrument};

use crate::models::{Settings, UpdateSettings};

use super::database::Database;

const SETTINGS_COLUMNS: &str = "id, brand_name, company_name, address, city, state, country, \
     phone, email, website, gst_number, tax_percent, currency, created_at, updated_at";

impl Database {
    /// Get the singleton settings row, creating it with defaults on
    /// first read.
    pub async fn get_settings(&self) -> Result<Settings, AppError> {
        let existing = sqlx::query_as::<_, Settings>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM settings WHERE id = 1"
        ))
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to get settings: {}", e)))?;

        if let Some(settings) = existing {
            return Ok(settings);
        }

        let seeded = sqlx::query_as::<_, Settings>(&format!(
            r#"
            INSERT INTO settings (id, brand_name, company_name, city, state, country, tax_percent, currency)
            VALUES (1, 'Digital Dhuriya', 'Digital Dhuriya', 'Kanpur', 'Uttar Pradesh', 'India', 18, 'INR')
            ON CONFLICT (id) DO NOTHING
            RETURNING {SETTINGS_COLUMNS}
            "#,
        ))
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to seed settings: {}", e)))?;

        match seeded {
            Some(settings) => Ok(settings),
            // Another request seeded the row first; read it back.
            None => sqlx::query_as::<_, Settings>(&format!(
                "SELECT {SETTINGS_COLUMNS} FROM settings WHERE id = 1"
            ))
            .fetch_one(self.pool())
            .await
            .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to get settings: {}", e))),
        }
    }

    /// Update agency settings.
    #[instrument(skip(self, input))]
    pub async fn update_settings(&self, input: &UpdateSettings) -> Result<Settings, AppError> {
        // Make sure the row exists before updating it.
        self.get_settings().await?;

        let settings = sqlx::query_as::<_, Settings>(&format!(
            r#"
            UPDATE settings
            SET brand_name = COALESCE($1, brand_name),
                company_name = COALESCE($2, company_name),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                state = COALESCE($5, state),
                country = COALESCE($6, country),
                phone = COALESCE($7, phone),
                email = COALESCE($8, email),
                website = COALESCE($9, website),
                gst_number = COALESCE($10, gst_number),
                tax_percent = COALESCE($11, tax_percent),
                currency = COALESCE($12, currency),
                updated_at = NOW()
            WHERE id = 1
            RETURNING {SETTINGS_COLUMNS}
            "#,
        ))
        .bind(&input.brand_name)
        .bind(&input.company_name)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.country)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.website)
        .bind(&input.gst_number)
        .bind(input.tax_percent)
        .bind(&input.currency)
        .fetch_one(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to update settings: {}", e)))?;

        info!("Agency settings updated");

        Ok(settings)
    }
}
