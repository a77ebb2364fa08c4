//! Redo record wire types.
//!
//! A redo record is the unit of replay for one transaction: an API name, the
//! user it belongs to, a timestamp, and an ordered list of changes. The
//! envelope travels as a MessagePack map keyed by the historical field names
//! (`API`, `UID`, `TS`, `Changes`); each change value travels as a nested
//! BSON document, so the envelope stays compact while the values keep their
//! own schema.

use crate::Result;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::error;

/// One mutation inside a transaction: which collection and field changed,
/// and the encoded new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Change {
    /// Collection the change applies to.
    pub collection: String,
    /// Dotted path of the mutated field, e.g. `"a.b.c.1.d"`.
    pub field: String,
    /// BSON value document produced by [`encode_value`].
    pub doc: Bytes,
}

impl Change {
    /// Decodes the value document back into `V`.
    pub fn decode<V: DeserializeOwned>(&self) -> Result<V> {
        decode_value(&self.doc)
    }
}

/// A complete transaction, ready to publish once all changes are added.
///
/// Changes can only be appended through [`add_change`](Self::add_change),
/// which refuses values that fail to encode; a record therefore never
/// carries a half-written change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedoRecord {
    #[serde(rename = "API")]
    api: String,
    #[serde(rename = "UID")]
    uid: i32,
    #[serde(rename = "TS")]
    ts: u64,
    #[serde(rename = "Changes")]
    changes: Vec<Change>,
}

impl RedoRecord {
    /// Starts an empty record for one transaction. `ts` is expected to be a
    /// cluster-unique timestamp, not wall-clock time.
    pub fn new(uid: i32, api: impl Into<String>, ts: u64) -> Self {
        Self {
            api: api.into(),
            uid,
            ts,
            changes: Vec::new(),
        }
    }

    /// Appends one change.
    ///
    /// If the value fails to encode, the failure is traced and the record is
    /// left exactly as it was; the caller does not see an error.
    pub fn add_change<V: Serialize>(&mut self, collection: &str, field: &str, value: &V) {
        match encode_value(value) {
            Ok(doc) => self.changes.push(Change {
                collection: collection.to_string(),
                field: field.to_string(),
                doc,
            }),
            Err(e) => {
                error!(collection, field, error = %e, "failed to encode change value, skipping change");
            }
        }
    }

    /// The API name of the transaction.
    pub fn api(&self) -> &str {
        &self.api
    }

    /// The user the transaction belongs to.
    pub fn uid(&self) -> i32 {
        self.uid
    }

    /// The transaction timestamp.
    pub fn ts(&self) -> u64 {
        self.ts
    }

    /// The changes appended so far, in insertion order.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }
}

/// BSON requires a document at the top level, so values are wrapped in a
/// single-key document before encoding. The wrapper is an implementation
/// detail of the wire format: [`decode_value`] strips it again.
#[derive(Serialize)]
struct ValueDocRef<'a, V: Serialize> {
    v: &'a V,
}

#[derive(Deserialize)]
struct ValueDoc<V> {
    v: V,
}

/// Encodes a value into the BSON document carried by [`Change::doc`].
///
/// Accepts anything serializable, scalars included: `"Alice"` and `30` are
/// as valid as a struct.
pub fn encode_value<V: Serialize>(value: &V) -> Result<Bytes> {
    let doc = bson::to_vec(&ValueDocRef { v: value })?;
    Ok(Bytes::from(doc))
}

/// Decodes a BSON value document produced by [`encode_value`].
pub fn decode_value<V: DeserializeOwned>(doc: &[u8]) -> Result<V> {
    let wrapper: ValueDoc<V> = bson::from_slice(doc)?;
    Ok(wrapper.v)
}
