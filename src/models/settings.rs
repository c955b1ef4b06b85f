use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Branding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notifications {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_new_orders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_urgent_orders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_revenue_reports: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_feedback: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Billing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_monthly: Option<f64>,
}

/// Business and branding settings. Every field is optional so the same
/// type serves as the partial body of `PUT /settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Notifications>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<Billing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branding: Option<Branding>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogoUpload {
    pub logo_url: String,
}

/// `GET /users/me`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMe {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Partial body of `PUT /users/me`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
