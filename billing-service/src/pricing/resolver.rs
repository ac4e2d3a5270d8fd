use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use service_core::AppError;

use crate::models::{LineInput, Service};

use super::money::round_money;

/// A line item after defaults have been resolved and its total computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    pub service_id: Option<Uuid>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Resolve requested lines against the service catalog.
///
/// Per line: quantity defaults to 1; a referenced service supplies the
/// description and unit price for fields the caller left absent. An
/// explicit zero price is kept as-is; only a missing field falls back
/// to the catalog. Prices and names are snapshots of the catalog at
/// this moment, never live references.
pub fn resolve_lines(
    lines: &[LineInput],
    services: &HashMap<Uuid, Service>,
) -> Result<Vec<ResolvedLine>, AppError> {
    if lines.is_empty() {
        return Err(AppError::Validation(anyhow::anyhow!(
            "At least one item is required"
        )));
    }

    let mut resolved = Vec::with_capacity(lines.len());

    for line in lines {
        let quantity = line.quantity.unwrap_or(1);
        if quantity < 1 {
            return Err(AppError::Validation(anyhow::anyhow!(
                "Item quantity must be at least 1"
            )));
        }

        let mut description = line
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        let mut unit_price = line.unit_price.unwrap_or(Decimal::ZERO);

        if let Some(service_id) = line.service_id {
            let service = services.get(&service_id).ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Service not found: {}", service_id))
            })?;

            if description.is_empty() {
                description = service.name.clone();
            }

            if line.unit_price.is_none() {
                unit_price = service.base_price;
            }
        }

        if description.is_empty() {
            return Err(AppError::Validation(anyhow::anyhow!(
                "Item description is required when service is not selected"
            )));
        }

        if unit_price < Decimal::ZERO {
            return Err(AppError::Validation(anyhow::anyhow!(
                "Item unit price cannot be negative"
            )));
        }

        let line_total = round_money(Decimal::from(quantity) * unit_price);

        resolved.push(ResolvedLine {
            service_id: line.service_id,
            description,
            quantity,
            unit_price,
            line_total,
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn catalog_service(id: Uuid, name: &str, base_price: Decimal) -> Service {
        Service {
            id,
            name: name.to_string(),
            description: None,
            base_price,
            tax_percent: Decimal::ZERO,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = resolve_lines(&[], &HashMap::new()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("At least one item is required"));
    }

    #[test]
    fn quantity_defaults_to_one() {
        let lines = [LineInput {
            description: Some("SEO audit".to_string()),
            unit_price: Some(dec!(5000)),
            ..Default::default()
        }];

        let resolved = resolve_lines(&lines, &HashMap::new()).unwrap();
        assert_eq!(resolved[0].quantity, 1);
        assert_eq!(resolved[0].line_total, dec!(5000));
    }

    #[test]
    fn service_supplies_name_and_price_for_absent_fields() {
        let id = Uuid::new_v4();
        let services = HashMap::from([(id, catalog_service(id, "Social media retainer", dec!(12000)))]);

        let lines = [LineInput {
            service_id: Some(id),
            quantity: Some(2),
            ..Default::default()
        }];

        let resolved = resolve_lines(&lines, &services).unwrap();
        assert_eq!(resolved[0].description, "Social media retainer");
        assert_eq!(resolved[0].unit_price, dec!(12000));
        assert_eq!(resolved[0].line_total, dec!(24000));
    }

    #[test]
    fn explicit_zero_price_is_not_overridden_by_service() {
        let id = Uuid::new_v4();
        let services = HashMap::from([(id, catalog_service(id, "Audit", dec!(9999)))]);

        let lines = [LineInput {
            service_id: Some(id),
            unit_price: Some(Decimal::ZERO),
            ..Default::default()
        }];

        let resolved = resolve_lines(&lines, &services).unwrap();
        assert_eq!(resolved[0].unit_price, Decimal::ZERO);
    }

    #[test]
    fn unknown_service_is_named_in_the_error() {
        let id = Uuid::new_v4();
        let lines = [LineInput {
            service_id: Some(id),
            ..Default::default()
        }];

        let err = resolve_lines(&lines, &HashMap::new()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn blank_description_without_service_is_rejected() {
        let lines = [LineInput {
            description: Some("   ".to_string()),
            unit_price: Some(dec!(100)),
            ..Default::default()
        }];

        let err = resolve_lines(&lines, &HashMap::new()).unwrap_err();
        assert!(err
            .to_string()
            .contains("Item description is required when service is not selected"));
    }

    #[test]
    fn line_total_rounds_half_up() {
        let lines = [LineInput {
            description: Some("Hourly work".to_string()),
            quantity: Some(3),
            unit_price: Some(dec!(33.335)),
            ..Default::default()
        }];

        let resolved = resolve_lines(&lines, &HashMap::new()).unwrap();
        // 3 * 33.335 = 100.005 -> 100.01
        assert_eq!(resolved[0].line_total, dec!(100.01));
    }
}
