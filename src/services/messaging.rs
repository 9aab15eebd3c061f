//! Conversation threading: rebuilds per-peer threads from the flat,
//! bidirectional message log.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Message, Profile};
use crate::database::repository::ColumnValues;
use crate::database::{Condition, Query, Repository, SortDirection, SqlParam};
use crate::error::ApiError;

#[derive(Clone)]
pub struct MessageService {
    messages: Repository<Message>,
    profiles: Repository<Profile>,
}

#[derive(Debug, Deserialize)]
pub struct MessageCreate {
    pub recipient_id: Uuid,
    pub content: String,
    pub product_id: Option<Uuid>,
}

/// One per-peer thread: summary fields for the inbox overview plus the full
/// partition, newest message first.
#[derive(Debug, Serialize)]
pub struct ConversationThread {
    pub peer_id: Uuid,
    pub peer_name: Option<String>,
    pub last_message: String,
    pub last_message_at: DateTime<Utc>,
    pub messages: Vec<Message>,
}

impl MessageService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            messages: Repository::new("messages", pool.clone()),
            profiles: Repository::new("profiles", pool),
        }
    }

    /// All of the viewer's threads, one per distinct peer.
    pub async fn conversations(&self, viewer: Uuid) -> Result<Vec<ConversationThread>, ApiError> {
        let messages = self
            .messages
            .find(
                Query::new()
                    .any_of(vec![
                        vec![Condition::Eq("sender_id".into(), viewer.into())],
                        vec![Condition::Eq("recipient_id".into(), viewer.into())],
                    ])
                    .order_by("created_at", SortDirection::Desc)
                    .order_by("seq", SortDirection::Desc),
            )
            .await?;

        let names = self.peer_names(viewer, &messages).await?;
        Ok(partition_threads(viewer, messages, &names))
    }

    /// The full two-party history with one peer, oldest first - the opposite
    /// order from the inbox overview, for reading a conversation through.
    pub async fn thread_with(&self, viewer: Uuid, peer: Uuid) -> Result<Vec<Message>, ApiError> {
        Ok(self
            .messages
            .find(
                Query::new()
                    .any_of(vec![
                        vec![
                            Condition::Eq("sender_id".into(), viewer.into()),
                            Condition::Eq("recipient_id".into(), peer.into()),
                        ],
                        vec![
                            Condition::Eq("sender_id".into(), peer.into()),
                            Condition::Eq("recipient_id".into(), viewer.into()),
                        ],
                    ])
                    .order_by("created_at", SortDirection::Asc)
                    .order_by("seq", SortDirection::Asc),
            )
            .await?)
    }

    /// Send a message. The recipient must exist; content must be non-empty.
    pub async fn send_message(&self, sender_id: Uuid, request: MessageCreate) -> Result<Message, ApiError> {
        if request.content.trim().is_empty() {
            return Err(ApiError::field_error("content", "Message content is required"));
        }

        let recipient = self
            .profiles
            .find_one(Query::new().eq("id", request.recipient_id))
            .await?;
        if recipient.is_none() {
            return Err(ApiError::not_found("Recipient not found"));
        }

        let mut columns: ColumnValues = vec![
            ("id", Uuid::new_v4().into()),
            ("sender_id", sender_id.into()),
            ("recipient_id", request.recipient_id.into()),
            ("content", request.content.into()),
            ("created_at", Utc::now().into()),
        ];
        if let Some(product_id) = request.product_id {
            columns.push(("product_id", product_id.into()));
        }

        Ok(self.messages.insert(columns).await?)
    }

    async fn peer_names(
        &self,
        viewer: Uuid,
        messages: &[Message],
    ) -> Result<HashMap<Uuid, String>, ApiError> {
        let mut seen = std::collections::HashSet::new();
        let peer_ids: Vec<SqlParam> = messages
            .iter()
            .map(|message| peer_of(viewer, message))
            .filter(|peer| seen.insert(*peer))
            .map(SqlParam::from)
            .collect();

        if peer_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let profiles = self.profiles.find(Query::new().is_in("id", peer_ids)).await?;
        Ok(profiles
            .into_iter()
            .map(|profile| (profile.id, profile.full_name))
            .collect())
    }
}

fn peer_of(viewer: Uuid, message: &Message) -> Uuid {
    if message.sender_id == viewer {
        message.recipient_id
    } else {
        message.sender_id
    }
}

/// Partition a message log by peer and build thread objects.
///
/// The summary fields track the chronologically latest message in each
/// partition by comparing (created_at, seq) explicitly, so they are correct
/// for any encounter order, not just timestamp-descending input.
pub fn partition_threads(
    viewer: Uuid,
    messages: Vec<Message>,
    names: &HashMap<Uuid, String>,
) -> Vec<ConversationThread> {
    struct Partition {
        last_at: DateTime<Utc>,
        last_seq: i64,
        last_content: String,
        messages: Vec<Message>,
    }

    let mut order: Vec<Uuid> = Vec::new();
    let mut partitions: HashMap<Uuid, Partition> = HashMap::new();

    for message in messages {
        let peer = peer_of(viewer, &message);
        match partitions.entry(peer) {
            Entry::Occupied(mut occupied) => {
                let partition = occupied.get_mut();
                if (message.created_at, message.seq) > (partition.last_at, partition.last_seq) {
                    partition.last_at = message.created_at;
                    partition.last_seq = message.seq;
                    partition.last_content = message.content.clone();
                }
                partition.messages.push(message);
            }
            Entry::Vacant(vacant) => {
                order.push(peer);
                vacant.insert(Partition {
                    last_at: message.created_at,
                    last_seq: message.seq,
                    last_content: message.content.clone(),
                    messages: vec![message],
                });
            }
        }
    }

    order
        .into_iter()
        .filter_map(|peer| {
            partitions.remove(&peer).map(|partition| ConversationThread {
                peer_id: peer,
                peer_name: names.get(&peer).cloned(),
                last_message: partition.last_content,
                last_message_at: partition.last_at,
                messages: partition.messages,
            })
        })
        .collect()
}
