use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    Client, ClientDraft, ClientPatch, Estimate, EstimateDraft, EstimateItem, EstimateItemDraft,
    EstimatePatch, Order, OrderDraft, OrderPatch, Settings,
};
use crate::persist::PersistenceAdapter;

pub const CLIENTS_KEY: &str = "clients";
pub const ORDERS_KEY: &str = "orders";
pub const ESTIMATES_KEY: &str = "estimates";
pub const SETTINGS_KEY: &str = "settings";

/// In-memory holder of the client/order/estimate collections plus settings,
/// with an injected persistence adapter.
///
/// Every mutation applies to memory first, then writes the full affected
/// collection(s) through the adapter. A failed write is logged and does not
/// roll the mutation back; the next successful save repairs the file.
pub struct RecordStore {
    adapter: Arc<dyn PersistenceAdapter>,
    clients: Vec<Client>,
    orders: Vec<Order>,
    estimates: Vec<Estimate>,
    settings: Settings,
}

impl RecordStore {
    /// Load all collections through the adapter. Missing collections start
    /// empty; unparseable ones are a persistence error.
    pub fn open(adapter: Arc<dyn PersistenceAdapter>) -> Result<Self> {
        let clients = load_collection(&*adapter, CLIENTS_KEY)?.unwrap_or_default();
        let orders = load_collection(&*adapter, ORDERS_KEY)?.unwrap_or_default();
        let estimates = load_collection(&*adapter, ESTIMATES_KEY)?.unwrap_or_default();
        let settings = load_collection(&*adapter, SETTINGS_KEY)?.unwrap_or_default();

        Ok(Self {
            adapter,
            clients,
            orders,
            estimates,
            settings,
        })
    }

    // Client operations

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn add_client(&mut self, draft: ClientDraft) -> Result<Client> {
        if draft.name.trim().is_empty() {
            return Err(Error::Validation("client name is required".into()));
        }

        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            company: draft.company,
            phone: draft.phone,
            email: draft.email,
            address: draft.address,
            nip: draft.nip,
        };
        self.clients.push(client.clone());
        self.persist(CLIENTS_KEY, &self.clients);

        Ok(client)
    }

    /// Apply a typed patch to a client. A patch carrying `name` rewrites the
    /// cached client name on every dependent order and estimate in the same
    /// call, before anything is persisted, so readers never see the new name
    /// next to a stale cache.
    pub fn update_client(&mut self, id: &str, patch: ClientPatch) -> Result<Client> {
        let renamed = patch.name.is_some();
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(Error::Validation("client name is required".into()));
            }
        }

        let client = self
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::not_found("client", id))?;

        if let Some(name) = patch.name {
            client.name = name;
        }
        if let Some(company) = patch.company {
            client.company = company;
        }
        if let Some(phone) = patch.phone {
            client.phone = phone;
        }
        if let Some(email) = patch.email {
            client.email = email;
        }
        if let Some(address) = patch.address {
            client.address = address;
        }
        if let Some(nip) = patch.nip {
            client.nip = nip;
        }
        let updated = client.clone();

        if renamed {
            self.propagate_client_name(id, &updated.name);
            self.persist(ORDERS_KEY, &self.orders);
            self.persist(ESTIMATES_KEY, &self.estimates);
        }
        self.persist(CLIENTS_KEY, &self.clients);

        Ok(updated)
    }

    /// Remove a client. Orders and estimates keep their `clientId` and
    /// cached name; dangling references are tolerated everywhere.
    pub fn remove_client(&mut self, id: &str) -> Result<()> {
        if !self.clients.iter().any(|c| c.id == id) {
            return Err(Error::not_found("client", id));
        }
        self.clients.retain(|c| c.id != id);
        self.persist(CLIENTS_KEY, &self.clients);
        Ok(())
    }

    /// Rewrite the cached client name on every dependent record. Cache
    /// refresh only; `updatedAt` on dependents stays untouched.
    fn propagate_client_name(&mut self, client_id: &str, name: &str) {
        for order in self.orders.iter_mut().filter(|o| o.client_id == client_id) {
            order.client_name = name.to_string();
        }
        for estimate in self
            .estimates
            .iter_mut()
            .filter(|e| e.client_id == client_id)
        {
            estimate.client_name = name.to_string();
        }
    }

    // Order operations

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn add_order(&mut self, draft: OrderDraft) -> Result<Order> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number: display_number("Z", self.orders.len() + 1),
            client_name: self.cached_client_name(&draft.client_id),
            client_id: draft.client_id,
            description: draft.description,
            status: draft.status.unwrap_or_default(),
            photos: draft.photos,
            location: draft.location,
            date: draft.date,
            amount: draft.amount,
            created_at: now,
            updated_at: now,
        };
        self.orders.push(order.clone());
        self.persist(ORDERS_KEY, &self.orders);

        Ok(order)
    }

    pub fn update_order(&mut self, id: &str, patch: OrderPatch) -> Result<Order> {
        let client_name = patch
            .client_id
            .as_deref()
            .map(|cid| self.cached_client_name(cid));

        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| Error::not_found("order", id))?;

        if let Some(client_id) = patch.client_id {
            order.client_id = client_id;
            // Re-associate: the cache follows the newly referenced client
            if let Some(name) = client_name {
                order.client_name = name;
            }
        }
        if let Some(description) = patch.description {
            order.description = description;
        }
        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(photos) = patch.photos {
            order.photos = photos;
        }
        if let Some(location) = patch.location {
            order.location = location;
        }
        if let Some(date) = patch.date {
            order.date = Some(date);
        }
        if let Some(amount) = patch.amount {
            order.amount = amount;
        }
        order.updated_at = Utc::now();
        let updated = order.clone();

        self.persist(ORDERS_KEY, &self.orders);
        Ok(updated)
    }

    pub fn remove_order(&mut self, id: &str) -> Result<()> {
        if !self.orders.iter().any(|o| o.id == id) {
            return Err(Error::not_found("order", id));
        }
        self.orders.retain(|o| o.id != id);
        self.persist(ORDERS_KEY, &self.orders);
        Ok(())
    }

    // Estimate operations

    pub fn estimates(&self) -> &[Estimate] {
        &self.estimates
    }

    pub fn estimate(&self, id: &str) -> Option<&Estimate> {
        self.estimates.iter().find(|e| e.id == id)
    }

    pub fn add_estimate(&mut self, draft: EstimateDraft) -> Result<Estimate> {
        let now = Utc::now();
        let items = price_items(draft.items);
        let total = items.iter().map(|i| i.line_total).sum();

        let estimate = Estimate {
            id: Uuid::new_v4().to_string(),
            estimate_number: display_number("K", self.estimates.len() + 1),
            client_name: self.cached_client_name(&draft.client_id),
            client_id: draft.client_id,
            items,
            total,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.estimates.push(estimate.clone());
        self.persist(ESTIMATES_KEY, &self.estimates);

        Ok(estimate)
    }

    pub fn update_estimate(&mut self, id: &str, patch: EstimatePatch) -> Result<Estimate> {
        let client_name = patch
            .client_id
            .as_deref()
            .map(|cid| self.cached_client_name(cid));

        let estimate = self
            .estimates
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::not_found("estimate", id))?;

        if let Some(client_id) = patch.client_id {
            estimate.client_id = client_id;
            if let Some(name) = client_name {
                estimate.client_name = name;
            }
        }
        if let Some(items) = patch.items {
            estimate.items = price_items(items);
            estimate.total = estimate.items.iter().map(|i| i.line_total).sum();
        }
        estimate.updated_at = Some(Utc::now());
        let updated = estimate.clone();

        self.persist(ESTIMATES_KEY, &self.estimates);
        Ok(updated)
    }

    pub fn remove_estimate(&mut self, id: &str) -> Result<()> {
        if !self.estimates.iter().any(|e| e.id == id) {
            return Err(Error::not_found("estimate", id));
        }
        self.estimates.retain(|e| e.id != id);
        self.persist(ESTIMATES_KEY, &self.estimates);
        Ok(())
    }

    // Settings operations

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_setting(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.settings.set(key, value);
        self.persist(SETTINGS_KEY, &self.settings);
    }

    pub fn remove_setting(&mut self, key: &str) -> Option<String> {
        let removed = self.settings.remove(key);
        if removed.is_some() {
            self.persist(SETTINGS_KEY, &self.settings);
        }
        removed
    }

    /// Name to cache for a client reference; empty when the reference
    /// dangles, so reads stay total.
    fn cached_client_name(&self, client_id: &str) -> String {
        self.client(client_id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    /// Write one collection through the adapter. Fire and forget: a failure
    /// is logged, the in-memory mutation stands, and the caller's retry path
    /// is the recovery mechanism.
    fn persist<T: Serialize>(&self, key: &str, value: &T) {
        let bytes = match serde_json::to_vec_pretty(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(key, %err, "failed to serialize collection");
                return;
            }
        };
        if let Err(err) = self.adapter.save(key, &bytes) {
            tracing::warn!(key, %err, "failed to persist collection");
        }
    }
}

fn load_collection<T: DeserializeOwned>(
    adapter: &dyn PersistenceAdapter,
    key: &str,
) -> Result<Option<T>> {
    match adapter.load(key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Display number in the original "Z/2026/8/3" shape, sequential within
/// the collection.
fn display_number(prefix: &str, seq: usize) -> String {
    let now = Utc::now();
    format!("{prefix}/{}/{}/{seq}", now.year(), now.month())
}

fn price_items(drafts: Vec<EstimateItemDraft>) -> Vec<EstimateItem> {
    drafts
        .into_iter()
        .map(|item| EstimateItem {
            line_total: item.quantity * item.unit_price,
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryAdapter;

    fn empty_store() -> RecordStore {
        RecordStore::open(Arc::new(MemoryAdapter::new())).unwrap()
    }

    fn client_named(store: &mut RecordStore, name: &str) -> Client {
        store
            .add_client(ClientDraft {
                name: name.to_string(),
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn add_client_assigns_unique_ids() {
        let mut store = empty_store();
        let a = client_named(&mut store, "Jan Kowalski");
        let b = client_named(&mut store, "Anna Nowak");
        assert_ne!(a.id, b.id);
        assert_eq!(store.clients().len(), 2);
    }

    #[test]
    fn add_client_rejects_blank_name() {
        let mut store = empty_store();
        let err = store.add_client(ClientDraft::default()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(store.clients().is_empty());
    }

    #[test]
    fn update_unknown_client_is_not_found() {
        let mut store = empty_store();
        let err = store
            .update_client("nope", ClientPatch::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn rename_propagates_to_orders_and_estimates() {
        let mut store = empty_store();
        let client = client_named(&mut store, "Old Name");
        let order = store
            .add_order(OrderDraft {
                client_id: client.id.clone(),
                description: "roof repair".into(),
                ..Default::default()
            })
            .unwrap();
        let estimate = store
            .add_estimate(EstimateDraft {
                client_id: client.id.clone(),
                items: vec![],
            })
            .unwrap();
        assert_eq!(order.client_name, "Old Name");
        assert_eq!(estimate.client_name, "Old Name");

        store
            .update_client(
                &client.id,
                ClientPatch {
                    name: Some("New Name".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(store.orders()[0].client_name, "New Name");
        assert_eq!(store.estimates()[0].client_name, "New Name");
    }

    #[test]
    fn rename_to_same_name_is_idempotent() {
        let mut store = empty_store();
        let client = client_named(&mut store, "Stable");
        store
            .add_order(OrderDraft {
                client_id: client.id.clone(),
                ..Default::default()
            })
            .unwrap();

        store
            .update_client(
                &client.id,
                ClientPatch {
                    name: Some("Stable".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(store.orders()[0].client_name, "Stable");
    }

    #[test]
    fn non_name_patch_leaves_dependents_alone() {
        let mut store = empty_store();
        let client = client_named(&mut store, "Jan");
        store
            .add_order(OrderDraft {
                client_id: client.id.clone(),
                ..Default::default()
            })
            .unwrap();

        store
            .update_client(
                &client.id,
                ClientPatch {
                    phone: Some("600100200".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(store.orders()[0].client_name, "Jan");
    }

    #[test]
    fn deleting_client_leaves_orphans_readable() {
        let mut store = empty_store();
        let client = client_named(&mut store, "Leaving");
        store
            .add_order(OrderDraft {
                client_id: client.id.clone(),
                ..Default::default()
            })
            .unwrap();

        store.remove_client(&client.id).unwrap();
        assert!(store.clients().is_empty());
        // Orphaned reference survives and reads don't panic
        assert_eq!(store.orders().len(), 1);
        assert_eq!(store.orders()[0].client_id, client.id);
    }

    #[test]
    fn estimate_total_is_sum_of_line_totals() {
        let mut store = empty_store();
        let client = client_named(&mut store, "Builder");
        let estimate = store
            .add_estimate(EstimateDraft {
                client_id: client.id,
                items: vec![
                    EstimateItemDraft {
                        description: "tiles".into(),
                        quantity: 10.0,
                        unit_price: 25.5,
                    },
                    EstimateItemDraft {
                        description: "labour".into(),
                        quantity: 8.0,
                        unit_price: 120.0,
                    },
                ],
            })
            .unwrap();

        assert_eq!(estimate.items[0].line_total, 255.0);
        assert_eq!(estimate.items[1].line_total, 960.0);
        assert_eq!(estimate.total, 1215.0);
    }

    #[test]
    fn updating_items_recomputes_total() {
        let mut store = empty_store();
        let client = client_named(&mut store, "Builder");
        let estimate = store
            .add_estimate(EstimateDraft {
                client_id: client.id,
                items: vec![EstimateItemDraft {
                    description: "paint".into(),
                    quantity: 2.0,
                    unit_price: 50.0,
                }],
            })
            .unwrap();

        let updated = store
            .update_estimate(
                &estimate.id,
                EstimatePatch {
                    client_id: None,
                    items: Some(vec![EstimateItemDraft {
                        description: "paint".into(),
                        quantity: 3.0,
                        unit_price: 50.0,
                    }]),
                },
            )
            .unwrap();
        assert_eq!(updated.total, 150.0);
    }

    #[test]
    fn dangling_client_reference_caches_empty_name() {
        let mut store = empty_store();
        let order = store
            .add_order(OrderDraft {
                client_id: "ghost".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(order.client_name, "");
    }

    #[test]
    fn order_numbers_are_sequential() {
        let mut store = empty_store();
        let first = store.add_order(OrderDraft::default()).unwrap();
        let second = store.add_order(OrderDraft::default()).unwrap();
        assert!(first.order_number.starts_with("Z/"));
        assert!(first.order_number.ends_with("/1"));
        assert!(second.order_number.ends_with("/2"));
    }

    #[test]
    fn settings_round_trip() {
        let mut store = empty_store();
        store.set_setting("smsTemplate", "Dzień dobry, {name}");
        assert_eq!(
            store.settings().get("smsTemplate"),
            Some("Dzień dobry, {name}")
        );
        assert_eq!(
            store.remove_setting("smsTemplate"),
            Some("Dzień dobry, {name}".to_string())
        );
        assert!(store.settings().get("smsTemplate").is_none());
    }
}
