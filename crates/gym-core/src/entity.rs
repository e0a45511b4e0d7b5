// ABOUTME: Typed schemas for the five gym collections: users, coaches, members, plans, products.
// ABOUTME: Each entity names its collection and pairs with an all-optional patch struct for shallow-merge updates.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A typed record schema bound to one named collection. `Patch` is the
/// update shape: every field optional, and fields left `None` are not
/// serialized, so they leave the stored value untouched.
pub trait Entity: Serialize + DeserializeOwned {
    const COLLECTION: &'static str;
    type Patch: Serialize;
}

/// Access level of a user account. Ordered admin > coach > member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Coach,
    Member,
}

impl Role {
    pub fn rank(&self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::Coach => 2,
            Self::Member => 1,
        }
    }

    /// True when this role is at or above `required` in the hierarchy.
    pub fn satisfies(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Coach => "coach",
            Self::Member => "member",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

// =============================================================================
// Users
// =============================================================================

/// A login account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    type Patch = UserPatch;
}

/// Registration input. Role defaults to `member` when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: None,
            phone: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Resolve registration defaults into a storable user.
    pub fn into_user(self) -> User {
        User {
            name: self.name,
            email: self.email,
            password: self.password,
            role: self.role.unwrap_or(Role::Member),
            status: Status::Active,
            phone: self.phone,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
}

// =============================================================================
// Coaches
// =============================================================================

/// A trainer on staff, with their schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coach {
    pub name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub specialty: String,
    /// Years of experience.
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub certifications: Vec<String>,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    #[serde(default)]
    pub work_days: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Entity for Coach {
    const COLLECTION: &'static str = "coaches";
    type Patch = CoachPatch;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoachPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_days: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

// =============================================================================
// Members
// =============================================================================

/// A gym customer. `plan_id` and `coach_id` are ids from the `plans` and
/// `coaches` collections; nothing checks that they resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub plan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach_id: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Member {
    const COLLECTION: &'static str = "members";
    type Patch = MemberPatch;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemberPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    /// `Some(None)` clears the assigned coach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coach_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

// =============================================================================
// Plans
// =============================================================================

/// A membership plan. Prices are whole Colombian pesos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    pub price: u64,
    pub duration_days: u32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Entity for Plan {
    const COLLECTION: &'static str = "plans";
    type Patch = PlanPatch;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

// =============================================================================
// Products
// =============================================================================

/// An item sold at the front desk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub category: String,
    pub price: u64,
    pub cost: u64,
    pub stock: u32,
    pub min_stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Product {
    /// True once stock has fallen to the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

impl Entity for Product {
    const COLLECTION: &'static str = "products";
    type Patch = ProductPatch;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_hierarchy() {
        assert!(Role::Admin.satisfies(Role::Coach));
        assert!(Role::Admin.satisfies(Role::Member));
        assert!(Role::Coach.satisfies(Role::Coach));
        assert!(!Role::Coach.satisfies(Role::Admin));
        assert!(!Role::Member.satisfies(Role::Coach));
    }

    #[test]
    fn new_user_defaults_to_active_member() {
        let user = NewUser::new("Ana", "ana@ejemplo.com", "secret").into_user();
        assert_eq!(user.role, Role::Member);
        assert_eq!(user.status, Status::Active);

        let coach = NewUser::new("Carlos", "coach@gym.com", "coach123")
            .with_role(Role::Coach)
            .into_user();
        assert_eq!(coach.role, Role::Coach);
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = PlanPatch {
            price: Some(30000),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"price": 30000}));
    }

    #[test]
    fn clearing_an_optional_field_serializes_null() {
        let patch = MemberPatch {
            coach_id: Some(None),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"coach_id": null})
        );
    }

    #[test]
    fn plan_reads_stored_json_shape() {
        let plan: Plan = serde_json::from_value(json!({
            "name": "Plan Diario",
            "price": 5000,
            "duration_days": 1,
            "features": ["Acceso por un día", "Área de pesas"],
            "active": true
        }))
        .unwrap();

        assert_eq!(plan.name, "Plan Diario");
        assert_eq!(plan.price, 5000);
        assert_eq!(plan.features.len(), 2);
    }

    #[test]
    fn product_low_stock() {
        let mut product = Product {
            name: "Agua 500ml".to_string(),
            category: "Bebidas".to_string(),
            price: 3000,
            cost: 1500,
            stock: 50,
            min_stock: 20,
            supplier: None,
            active: true,
        };
        assert!(!product.is_low_stock());

        product.stock = 20;
        assert!(product.is_low_stock());
    }
}
