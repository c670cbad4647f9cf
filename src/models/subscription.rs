use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel stored in `generations_limit` for plans without a metered cap.
/// Kept at the storage layer only; in-process code goes through [`Allowance`].
pub const UNLIMITED_SENTINEL: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
    Enterprise,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Enterprise => "enterprise",
        }
    }

    pub fn parse(s: &str) -> Option<Tier> {
        match s {
            "free" => Some(Tier::Free),
            "pro" => Some(Tier::Pro),
            "enterprise" => Some(Tier::Enterprise),
            _ => None,
        }
    }

    pub fn is_paying(&self) -> bool {
        !matches!(self, Tier::Free)
    }

    /// Limit written back to the ledger when billing moves a user onto this
    /// tier. The free cap comes from configuration, never from the caller.
    pub fn generation_limit(&self, free_limit: i32) -> i32 {
        if self.is_paying() {
            UNLIMITED_SENTINEL
        } else {
            free_limit
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    PastDue,
    Incomplete,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Incomplete => "incomplete",
        }
    }
}

/// What a subscription entitles a user to per billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    Metered { used: i32, limit: i32 },
    Unlimited,
}

impl Allowance {
    pub fn has_remaining(&self) -> bool {
        match self {
            Allowance::Unlimited => true,
            Allowance::Metered { used, limit } => used < limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tier: String,
    pub status: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub generations_used: i32,
    pub generations_limit: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Unrecognized tier strings are treated as free, the most restrictive plan.
    pub fn tier(&self) -> Tier {
        Tier::parse(&self.tier).unwrap_or(Tier::Free)
    }

    pub fn allowance(&self) -> Allowance {
        if self.tier().is_paying() || self.generations_limit == UNLIMITED_SENTINEL {
            Allowance::Unlimited
        } else {
            Allowance::Metered {
                used: self.generations_used,
                limit: self.generations_limit,
            }
        }
    }

    pub fn has_quota(&self) -> bool {
        self.allowance().has_remaining()
    }
}

/// Plan change pushed by the billing collaborator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingUpdate {
    pub user_id: Uuid,
    pub tier: Tier,
    pub status: SubscriptionStatus,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(tier: &str, used: i32, limit: i32) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            tier: tier.to_string(),
            status: "active".to_string(),
            stripe_customer_id: None,
            stripe_subscription_id: None,
            current_period_end: None,
            cancel_at_period_end: false,
            generations_used: used,
            generations_limit: limit,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn free_tier_is_metered() {
        let sub = subscription("free", 4, 5);
        assert_eq!(sub.allowance(), Allowance::Metered { used: 4, limit: 5 });
        assert!(sub.has_quota());
    }

    #[test]
    fn free_tier_at_limit_has_no_quota() {
        let sub = subscription("free", 5, 5);
        assert!(!sub.has_quota());
    }

    #[test]
    fn paid_tiers_ignore_the_counter() {
        for tier in ["pro", "enterprise"] {
            let sub = subscription(tier, 10_000, 5);
            assert_eq!(sub.allowance(), Allowance::Unlimited);
            assert!(sub.has_quota());
        }
    }

    #[test]
    fn unknown_tier_falls_back_to_free() {
        let sub = subscription("platinum", 5, 5);
        assert_eq!(sub.tier(), Tier::Free);
        assert!(!sub.has_quota());
    }

    #[test]
    fn billing_limit_follows_the_configured_free_cap() {
        assert_eq!(Tier::Free.generation_limit(12), 12);
        assert_eq!(Tier::Pro.generation_limit(12), UNLIMITED_SENTINEL);
        assert_eq!(Tier::Enterprise.generation_limit(12), UNLIMITED_SENTINEL);
    }
}
