use serde::{Deserialize, Serialize};

/// Raw contact form body. Every field is optional so that a missing key, a `null`
/// and an empty string all reach validation instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A submission with all five fields present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub business_type: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing required fields: {}", .missing.join(", "))]
pub struct ValidationError {
    /// Wire names of the absent fields, in form order.
    pub missing: Vec<&'static str>,
}

impl ContactRequest {
    pub fn validate(self) -> Result<ContactSubmission, ValidationError> {
        let mut missing = Vec::new();
        let mut take = |value: Option<String>, field: &'static str| match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                missing.push(field);
                String::new()
            }
        };

        let submission = ContactSubmission {
            name: take(self.name, "name"),
            email: take(self.email, "email"),
            phone: take(self.phone, "phone"),
            business_type: take(self.business_type, "businessType"),
            message: take(self.message, "message"),
        };

        if missing.is_empty() {
            Ok(submission)
        } else {
            Err(ValidationError { missing })
        }
    }
}

/// Response after a delivered submission
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}
