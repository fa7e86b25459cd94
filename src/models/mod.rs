mod client;
mod estimate;
mod order;
mod settings;
mod user;

pub use client::{Client, ClientDraft, ClientPatch};
pub use estimate::{Estimate, EstimateDraft, EstimateItem, EstimateItemDraft, EstimatePatch};
pub use order::{Order, OrderDraft, OrderPatch, OrderStatus};
pub use settings::Settings;
pub use user::{PublicUser, User, UserPatch};
