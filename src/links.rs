//! Link integrity engine
//!
//! Builds a cross-reference between Links and Thing channels for the
//! lifetime of a single operation, classifies links as valid or orphaned,
//! and performs targeted or bulk repair. The remote system offers no
//! transactions, so every operation here is fetch, pure compute, write;
//! a Thing deleted between the fetch and a purge is a race the next purge
//! run reconciles.

use crate::client::OpenHabClient;
use crate::error::{BulkLinkReport, LinkId, OpenHabError, Result};
use crate::models::{Link, Thing};
use futures::future::join_all;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Link operations over a shared client
pub struct LinkService {
    client: Arc<dyn OpenHabClient>,
}

/// The set of channel UIDs currently present on any Thing.
///
/// Channels are structurally owned by Things, so this set is the complete
/// universe a link's channel side can validly reference.
pub fn valid_channel_uids(things: &[Thing]) -> HashSet<&str> {
    things
        .iter()
        .flat_map(|thing| thing.channels.iter())
        .map(|channel| channel.uid.as_str())
        .collect()
}

/// Classify orphans: links whose channel UID resolves to no existing
/// channel. Item existence is deliberately not part of the test; Items are
/// independently addressable while channels live and die with their Thing.
pub fn classify_orphans(links: Vec<Link>, things: &[Thing]) -> Vec<Link> {
    let valid = valid_channel_uids(things);
    links
        .into_iter()
        .filter(|link| !valid.contains(link.channel_uid.as_str()))
        .collect()
}

impl LinkService {
    pub fn new(client: Arc<dyn OpenHabClient>) -> Self {
        Self { client }
    }

    /// List links, optionally narrowed by channel-UID substring and/or
    /// exact item name. Links are low-cardinality; no pagination.
    pub async fn list_links(
        &self,
        channel_uid: Option<&str>,
        item_name: Option<&str>,
    ) -> Result<Vec<Link>> {
        let links = self.client.list_links().await?;
        Ok(links
            .into_iter()
            .filter(|link| {
                channel_uid.map_or(true, |c| link.channel_uid.contains(c))
                    && item_name.map_or(true, |i| link.item_name == i)
            })
            .collect())
    }

    /// Fetch a single link or fail with `NotFound`
    pub async fn get_link(&self, item_name: &str, channel_uid: &str) -> Result<Link> {
        self.client.get_link(item_name, channel_uid).await
    }

    /// Idempotent upsert with a referential check: the channel UID must
    /// resolve to an existing Thing's channel at call time.
    pub async fn create_or_update_link(
        &self,
        item_name: &str,
        channel_uid: &str,
        configuration: Option<Map<String, Value>>,
    ) -> Result<Link> {
        if item_name.is_empty() || channel_uid.is_empty() {
            return Err(OpenHabError::invalid_input(
                "Item name and channel UID are required",
            ));
        }

        let things = self.client.list_things().await?;
        if !valid_channel_uids(&things).contains(channel_uid) {
            return Err(OpenHabError::invalid_input(format!(
                "Channel '{channel_uid}' does not resolve to any existing Thing's channel"
            )));
        }

        let link = Link {
            item_name: item_name.to_string(),
            channel_uid: channel_uid.to_string(),
            configuration: configuration.unwrap_or_default(),
            editable: None,
        };
        self.client.put_link(&link).await?;
        Ok(link)
    }

    /// Idempotent delete: a missing link is not an error
    pub async fn delete_link(&self, item_name: &str, channel_uid: &str) -> Result<bool> {
        match self.client.delete_link(item_name, channel_uid).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Fetch the full link and thing collections and classify every link.
    ///
    /// A things fetch failure is fatal to the whole operation: without the
    /// complete channel universe an unreachable Thing would be
    /// indistinguishable from a deleted one, and its links would be
    /// misclassified as orphans.
    pub async fn orphan_links(&self) -> Result<Vec<Link>> {
        let links = self.client.list_links().await?;
        let things = self.client.list_things().await?;
        let orphans = classify_orphans(links, &things);
        debug!("Classified {} orphan link(s)", orphans.len());
        Ok(orphans)
    }

    /// Compute orphans, then delete each one. Orphans are independent, so
    /// a failed delete never aborts the rest; the report lists which
    /// targets succeeded and which failed. Re-running after a successful
    /// purge removes nothing.
    pub async fn purge_orphan_links(&self) -> Result<BulkLinkReport> {
        let orphans = self.orphan_links().await?;
        info!("Purging {} orphan link(s)", orphans.len());
        self.delete_links(orphans).await.into_result()
    }

    /// Delete every link attached to the given Item name or Thing UID.
    pub async fn delete_all_links_for_object(&self, object_id: &str) -> Result<BulkLinkReport> {
        if object_id.is_empty() {
            return Err(OpenHabError::invalid_input(
                "Object name (item name or thing UID) is required",
            ));
        }

        let links = self.client.list_links().await?;
        let targets: Vec<Link> = links
            .into_iter()
            .filter(|link| {
                link.item_name == object_id || link.owning_thing_uid() == Some(object_id)
            })
            .collect();

        info!("Deleting {} link(s) for object '{object_id}'", targets.len());
        self.delete_links(targets).await.into_result()
    }

    /// Issue one delete per target, in parallel, and aggregate per-target
    /// outcomes. A target that vanished since classification counts as
    /// removed (the goal state holds).
    async fn delete_links(&self, targets: Vec<Link>) -> BulkLinkReport {
        let deletions = targets.iter().map(|link| {
            let client = Arc::clone(&self.client);
            async move {
                client
                    .delete_link(&link.item_name, &link.channel_uid)
                    .await
            }
        });
        let outcomes = join_all(deletions).await;

        let mut report = BulkLinkReport::default();
        for (link, outcome) in targets.iter().zip(outcomes) {
            let id = LinkId {
                item_name: link.item_name.clone(),
                channel_uid: link.channel_uid.clone(),
            };
            match outcome {
                Ok(()) => report.removed.push(id),
                Err(e) if e.is_not_found() => report.removed.push(id),
                Err(e) => report.failed.push((id, e.to_string())),
            }
        }
        report
    }
}
