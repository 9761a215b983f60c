//! Wire types shared with the auth backend.

use chrono::{DateTime, NaiveDateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

/// Current user as returned by `/api/auth/me`, `/signin` and `/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub subscription: Subscription,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub status: SubscriptionStatus,
    pub plan: PlanTier,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// RFC 3339, or a timestamp without offset (Python's `isoformat()`) read as UTC.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(at.with_timezone(&Utc)));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| D::Error::custom(format!("invalid expiresAt timestamp: {raw}")))
}

impl Subscription {
    /// Whether the subscription grants access at `now`.
    ///
    /// The backend owns the `active` => not expired invariant; this only reads it.
    #[must_use]
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.expires_at.is_none_or(|at| at > now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    /// A status this build does not know yet. Never current.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    #[serde(rename = "one-time")]
    OneTime,
    Premium,
    #[serde(other)]
    Unknown,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn expose<S: Serializer>(secret: &&SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Body of `POST /api/auth/signin`. Never log it.
#[derive(Serialize)]
pub struct SignInRequest<'a> {
    pub email: &'a str,
    #[serde(serialize_with = "expose")]
    pub password: &'a SecretString,
}

/// Body of `POST /api/auth/signup`. Never log it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest<'a> {
    pub email: &'a str,
    #[serde(serialize_with = "expose")]
    pub password: &'a SecretString,
    pub full_name: &'a str,
}

#[derive(Serialize)]
pub struct ResetPasswordRequest<'a> {
    pub email: &'a str,
}

/// Optional `{message}` body returned by endpoints without a profile.
#[derive(Debug, Default, Deserialize)]
pub struct MessageResponse {
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn profile_uses_camel_case_on_the_wire() {
        let value = json!({
            "id": "u1",
            "email": "a@b.com",
            "fullName": "A B",
            "subscription": {"status": "inactive", "plan": "free", "expiresAt": null}
        });
        let profile: UserProfile = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(profile.full_name, "A B");
        assert_eq!(profile.subscription.plan, PlanTier::Free);
        assert_eq!(serde_json::to_value(&profile).unwrap(), value);
    }

    #[test]
    fn subscription_current_only_when_active_and_unexpired() {
        let now = Utc::now();
        let mut subscription = Subscription {
            status: SubscriptionStatus::Active,
            plan: PlanTier::Premium,
            expires_at: None,
        };
        assert!(subscription.is_current(now));

        subscription.expires_at = Some(now + Duration::days(1));
        assert!(subscription.is_current(now));

        subscription.expires_at = Some(now - Duration::seconds(1));
        assert!(!subscription.is_current(now));

        subscription.expires_at = None;
        subscription.status = SubscriptionStatus::Inactive;
        assert!(!subscription.is_current(now));
    }

    fn subscription(value: serde_json::Value) -> Subscription {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn naive_expiry_is_read_as_utc() {
        let parsed = subscription(json!({
            "status": "active",
            "plan": "premium",
            "expiresAt": "2030-01-01T00:00:00"
        }));
        assert_eq!(
            parsed.expires_at.map(|at| at.to_rfc3339()),
            Some("2030-01-01T00:00:00+00:00".to_string())
        );

        let parsed = subscription(json!({
            "status": "active",
            "plan": "premium",
            "expiresAt": "2030-01-01T12:30:00.123456"
        }));
        assert!(parsed.expires_at.is_some());

        let parsed = subscription(json!({
            "status": "active",
            "plan": "premium",
            "expiresAt": "2030-01-01T00:00:00+02:00"
        }));
        assert_eq!(
            parsed.expires_at.map(|at| at.to_rfc3339()),
            Some("2029-12-31T22:00:00+00:00".to_string())
        );
    }

    #[test]
    fn missing_expiry_is_none() {
        let parsed = subscription(json!({"status": "inactive", "plan": "free"}));
        assert_eq!(parsed.expires_at, None);
    }

    #[test]
    fn garbage_expiry_is_rejected() {
        let result = serde_json::from_value::<Subscription>(json!({
            "status": "active",
            "plan": "premium",
            "expiresAt": "next tuesday"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn one_time_and_unknown_plans_decode() {
        let parsed = subscription(json!({
            "status": "active",
            "plan": "one-time",
            "expiresAt": null
        }));
        assert_eq!(parsed.plan, PlanTier::OneTime);
        assert_eq!(serde_json::to_value(parsed.plan).unwrap(), json!("one-time"));

        let parsed = subscription(json!({
            "status": "trialing",
            "plan": "enterprise",
            "expiresAt": null
        }));
        assert_eq!(parsed.plan, PlanTier::Unknown);
        assert_eq!(parsed.status, SubscriptionStatus::Unknown);
        assert!(!parsed.is_current(Utc::now()));
    }

    #[test]
    fn sign_up_request_exposes_password_only_in_body() {
        let password = SecretString::from("hunter2");
        let request = SignUpRequest {
            email: "a@b.com",
            password: &password,
            full_name: "A B",
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({"email": "a@b.com", "password": "hunter2", "fullName": "A B"})
        );
    }
}
