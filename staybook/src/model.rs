//! Booking entities and the request bodies that create or patch them.
//!
//! JSON field names are camelCase to match the web client. Unknown fields in request bodies are
//! ignored rather than stored.

use bson::{Document as BsonDocument, doc, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};
use staybook_core::{
    document::{Document, EntityId},
    error::{DocumentStoreError, DocumentStoreResult},
};

/// Snapshot of a user embedded in orders and messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniUser {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
}

/// A message embedded in an order or stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Msg {
    /// Generated by the service, unique within the parent's list.
    pub id: String,
    pub txt: String,
    pub by: MiniUser,
}

/// Message as posted by a client, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMsg {
    pub txt: String,
    pub by: MiniUser,
}

impl NewMsg {
    pub fn into_msg(self, id: String) -> Msg {
        Msg { id, txt: self.txt, by: self.by }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A listing guests can book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stay {
    #[serde(rename = "_id", default)]
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    /// Category label, e.g. "Cabin" or "Beach house".
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub loc: Location,
    /// Maximum number of guests.
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub price: f64,
    /// Id of the user who owns the listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default)]
    pub img_urls: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub msgs: Vec<Msg>,
}

impl Document for Stay {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn collection_name() -> &'static str {
        "stay"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Guests {
    #[serde(default)]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
}

/// The part of a stay copied into an order at booking time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiniStay {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
}

/// A booking of a stay by a buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", default)]
    pub id: EntityId,
    pub host_id: String,
    pub buyer: MiniUser,
    /// Epoch milliseconds, set once when the order is placed.
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stay: Option<MiniStay>,
    /// Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    /// Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<i64>,
    #[serde(default)]
    pub guests: Guests,
    #[serde(default)]
    pub total_price: f64,
    #[serde(default)]
    pub msgs: Vec<Msg>,
}

impl Document for Order {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn collection_name() -> &'static str {
        "order"
    }
}

/// Order fields supplied by the buyer's client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub host_id: String,
    #[serde(default)]
    pub stay: Option<MiniStay>,
    #[serde(default)]
    pub start_date: Option<i64>,
    #[serde(default)]
    pub end_date: Option<i64>,
    #[serde(default)]
    pub guests: Guests,
    #[serde(default)]
    pub total_price: f64,
}

impl Order {
    /// Places an order for `buyer` at `created_at` (epoch ms).
    pub fn place(draft: OrderDraft, buyer: MiniUser, created_at: i64) -> Self {
        Self {
            id: EntityId::new(),
            host_id: draft.host_id,
            buyer,
            created_at,
            stay: draft.stay,
            start_date: draft.start_date,
            end_date: draft.end_date,
            guests: draft.guests,
            total_price: draft.total_price,
            msgs: Vec::new(),
        }
    }
}

/// The enumerated set of fields an update may overwrite on an entity.
pub trait Patch: Send + Sync {
    /// Raw identifier of the entity to update, as sent by the client.
    fn target_id(&self) -> Option<&str>;

    /// The `$set` document for the mutable fields present in this patch.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in BSON.
    fn to_set(&self) -> DocumentStoreResult<BsonDocument>;
}

/// Mutable fields of a stay: price and owning vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StayPatch {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
}

impl Patch for StayPatch {
    fn target_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    fn to_set(&self) -> DocumentStoreResult<BsonDocument> {
        let mut set = doc! {};

        if let Some(price) = self.price {
            set.insert("price", price);
        }
        if let Some(vendor) = &self.vendor {
            set.insert("vendor", vendor.as_str());
        }

        Ok(set)
    }
}

/// Mutable fields of an order: dates, guests and price.
///
/// `buyer` is read so the handler can notify the buyer; it is never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<MiniUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<Guests>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
}

impl Patch for OrderPatch {
    fn target_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    fn to_set(&self) -> DocumentStoreResult<BsonDocument> {
        let mut set = doc! {};

        if let Some(start_date) = self.start_date {
            set.insert("startDate", start_date);
        }
        if let Some(end_date) = self.end_date {
            set.insert("endDate", end_date);
        }
        if let Some(guests) = &self.guests {
            set.insert("guests", serialize_to_bson(guests)?);
        }
        if let Some(total_price) = self.total_price {
            set.insert("totalPrice", total_price);
        }

        Ok(set)
    }
}

/// Rejects a patch whose identifier is missing.
pub(crate) fn require_target(patch: &impl Patch) -> DocumentStoreResult<&str> {
    patch
        .target_id()
        .ok_or_else(|| DocumentStoreError::InvalidDocument("update without an _id".to_string()))
}
