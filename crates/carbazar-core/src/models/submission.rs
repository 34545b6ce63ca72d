//! Submission form, channel identifiers, and dispatch outcomes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use utoipa::ToSchema;

/// A user-submitted car-sale request as received from the website form.
///
/// Every field is optional at the boundary; absent values render as a
/// placeholder downstream and never fail a dispatch. The form is immutable
/// once received and lives only for the duration of one dispatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SubmissionForm {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub registration_number: Option<String>,
    pub rc_available: Option<String>,
    pub insurance_available: Option<String>,
    pub car_model: Option<String>,
    pub variant: Option<String>,
    pub fuel_type: Option<String>,
    pub ownership: Option<String>,
    pub kilometers_driven: Option<String>,
    pub expected_price: Option<String>,
    pub condition_scale: Option<String>,
    pub damage_remarks: Option<String>,
}

impl SubmissionForm {
    /// Build a form from loose multipart text fields. Accepts both
    /// snake_case and the website's camelCase field names; unknown fields
    /// are ignored, blank values are treated as absent.
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        let mut form = SubmissionForm::default();
        for (name, value) in fields {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let value = Some(value.to_string());
            match name.as_str() {
                "name" => form.name = value,
                "phone" => form.phone = value,
                "email" => form.email = value,
                "city" => form.city = value,
                "registration_number" | "registrationNumber" => {
                    form.registration_number = value
                }
                "rc_available" | "rcAvailable" => form.rc_available = value,
                "insurance_available" | "insuranceAvailable" => form.insurance_available = value,
                "car_model" | "carModel" => form.car_model = value,
                "variant" => form.variant = value,
                "fuel_type" | "fuelType" => form.fuel_type = value,
                "ownership" => form.ownership = value,
                "kilometers_driven" | "kilometersDriven" => form.kilometers_driven = value,
                "expected_price" | "expectedPrice" => form.expected_price = value,
                "condition_scale" | "conditionScale" => form.condition_scale = value,
                "damage_remarks" | "damageRemarks" => form.damage_remarks = value,
                _ => {}
            }
        }
        form
    }
}

/// One external notification medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Email,
    WhatsApp,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Email => write!(f, "email"),
            ChannelKind::WhatsApp => write!(f, "whatsapp"),
        }
    }
}

/// Result of one channel send attempt. Created by a channel sender,
/// consumed by the dispatcher; never persisted. The error field carries a
/// redacted category, never raw provider text.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelOutcome {
    pub channel: ChannelKind,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChannelOutcome {
    pub fn ok(channel: ChannelKind) -> Self {
        Self {
            channel,
            success: true,
            error: None,
        }
    }

    pub fn failed(channel: ChannelKind, category: impl Into<String>) -> Self {
        Self {
            channel,
            success: false,
            error: Some(category.into()),
        }
    }
}

/// Terminal state of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Completed,
    PartiallyFailed,
    RejectedAtStaging,
}

/// Aggregate result of one dispatch: exactly one outcome per configured
/// channel, in configuration order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DispatchReport {
    pub status: DispatchStatus,
    pub outcomes: Vec<ChannelOutcome>,
}

impl DispatchReport {
    /// Aggregate per-channel outcomes: all succeeded means `Completed`,
    /// anything else means `PartiallyFailed`.
    pub fn from_outcomes(outcomes: Vec<ChannelOutcome>) -> Self {
        let status = if outcomes.iter().all(|o| o.success) {
            DispatchStatus::Completed
        } else {
            DispatchStatus::PartiallyFailed
        };
        Self { status, outcomes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fields_accepts_both_naming_conventions() {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), "Asha".to_string());
        fields.insert("carModel".to_string(), "Swift".to_string());
        fields.insert("fuel_type".to_string(), "petrol".to_string());
        fields.insert("unknown_field".to_string(), "ignored".to_string());
        fields.insert("city".to_string(), "   ".to_string());

        let form = SubmissionForm::from_fields(fields);
        assert_eq!(form.name.as_deref(), Some("Asha"));
        assert_eq!(form.car_model.as_deref(), Some("Swift"));
        assert_eq!(form.fuel_type.as_deref(), Some("petrol"));
        assert_eq!(form.city, None, "blank values are treated as absent");
    }

    #[test]
    fn report_aggregation_reflects_outcomes() {
        let report = DispatchReport::from_outcomes(vec![
            ChannelOutcome::ok(ChannelKind::Email),
            ChannelOutcome::ok(ChannelKind::WhatsApp),
        ]);
        assert_eq!(report.status, DispatchStatus::Completed);

        let report = DispatchReport::from_outcomes(vec![
            ChannelOutcome::ok(ChannelKind::Email),
            ChannelOutcome::failed(ChannelKind::WhatsApp, "provider_error"),
        ]);
        assert_eq!(report.status, DispatchStatus::PartiallyFailed);
        assert_eq!(report.outcomes.len(), 2);
    }

    #[test]
    fn channel_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ChannelKind::WhatsApp).unwrap(),
            "\"whatsapp\""
        );
        assert_eq!(ChannelKind::Email.to_string(), "email");
    }
}
