// ABOUTME: Core library for gymstore, containing the record envelope and entity schemas.
// ABOUTME: Defines the shared data model, read filters, clock, and display helpers used by the store.

pub mod clock;
pub mod entity;
pub mod filter;
pub mod format;
pub mod record;
pub mod validate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entity::{
    Coach, CoachPatch, Entity, Member, MemberPatch, NewUser, Plan, PlanPatch, Product,
    ProductPatch, Role, Status, User, UserPatch,
};
pub use filter::{Filter, FilterError};
pub use format::{format_currency, format_date};
pub use record::{Document, Record, new_record_id};
pub use validate::{validate_email, validate_phone};
