//! Listing and detail retrieval for Classic API collections.
//!
//! - [`list_resources`] — `GET /JSSResource/{endpoint}`, yielding `(id, name)` pairs.
//! - [`fetch_resource`] — `GET /JSSResource/{endpoint}/id/{id}`, returning raw XML.
//!
//! The collection is fetched in a single response; Jamf Pro's Classic API
//! does not paginate these endpoints.

use crate::client::JamfClient;
use crate::error::{JamfError, Result};
use crate::xml::{self, Element};

/// Known collection endpoints and the tag of one member element.
const MEMBER_TAGS: &[(&str, &str)] = &[("scripts", "script"), ("policies", "policy")];

/// The two collections this tool downloads and searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// `/JSSResource/scripts`
    Scripts,
    /// `/JSSResource/policies`
    Policies,
}

impl ResourceKind {
    /// Processing order used by the pipeline.
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Scripts, ResourceKind::Policies];

    /// Plural collection name as used in the URL path.
    pub fn endpoint(self) -> &'static str {
        match self {
            ResourceKind::Scripts => "scripts",
            ResourceKind::Policies => "policies",
        }
    }

    /// Tag of one member element in a listing and root tag of a detail document.
    pub fn member_tag(self) -> &'static str {
        match self {
            ResourceKind::Scripts => "script",
            ResourceKind::Policies => "policy",
        }
    }

    /// Subdirectory of the output root that holds this kind's documents.
    pub fn subdirectory(self) -> &'static str {
        self.endpoint()
    }

    /// Maps a detail document's root tag (case-insensitive) to its kind.
    pub fn from_root_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "script" => Some(ResourceKind::Scripts),
            "policy" => Some(ResourceKind::Policies),
            _ => None,
        }
    }
}

/// Derives the member tag for a collection endpoint.
///
/// Known endpoints come from the lookup table. Anything else falls back to
/// the English suffix rule: `-ies` becomes `-y`, a trailing `s` is dropped,
/// and other names are used unchanged.
pub fn member_tag_for(endpoint: &str) -> String {
    if let Some((_, tag)) = MEMBER_TAGS.iter().find(|(name, _)| *name == endpoint) {
        return (*tag).to_string();
    }
    if let Some(stem) = endpoint.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = endpoint.strip_suffix('s') {
        stem.to_string()
    } else {
        endpoint.to_string()
    }
}

/// One `(id, name)` pair from a collection listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Server-assigned identifier, kept in its textual form.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl ListingEntry {
    fn from_element(element: Element) -> Option<Self> {
        let id = element.child_text("id")?;
        let name = element.child_text("name")?;
        Some(ListingEntry { id, name })
    }

    /// The `{name}_{id}` stem used when archiving this resource.
    pub fn logical_name(&self) -> String {
        format!("{}_{}", self.name, self.id)
    }
}

/// Single-pass iterator over the complete members of a parsed listing.
#[derive(Debug)]
pub struct Listing {
    members: std::vec::IntoIter<Element>,
}

impl Iterator for Listing {
    type Item = ListingEntry;

    fn next(&mut self) -> Option<ListingEntry> {
        self.members.by_ref().find_map(ListingEntry::from_element)
    }
}

/// Fetches a collection listing and yields its members in document order.
///
/// Members without an `<id>` or `<name>` child are skipped. The listing is
/// downloaded and parsed up front, so both failure modes surface here
/// rather than part-way through iteration.
///
/// # Errors
///
/// - `JamfError::Fetch` — non-success status.
/// - `JamfError::Network` — transport failure.
/// - `JamfError::MalformedResponse` — the body is not well-formed XML.
pub async fn list_resources(client: &JamfClient, endpoint: &str) -> Result<Listing> {
    let path = format!("JSSResource/{endpoint}");
    let body = client.get_text(&path).await?;
    let root = xml::parse(&body).map_err(|source| JamfError::MalformedResponse {
        url: client.url_for(&path),
        source,
    })?;

    let tag = member_tag_for(endpoint);
    let members: Vec<Element> = root.into_children_named(&tag).collect();
    Ok(Listing {
        members: members.into_iter(),
    })
}

/// Fetches the full XML representation of one resource.
///
/// # Errors
///
/// - `JamfError::Fetch` — non-success status (e.g. 404 for a deleted id).
/// - `JamfError::Network` — transport failure.
pub async fn fetch_resource(client: &JamfClient, endpoint: &str, id: &str) -> Result<String> {
    client
        .get_text(&format!("JSSResource/{endpoint}/id/{id}"))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_tag_uses_table_for_known_endpoints() {
        assert_eq!(member_tag_for("scripts"), "script");
        assert_eq!(member_tag_for("policies"), "policy");
    }

    #[test]
    fn member_tag_falls_back_to_suffix_rule() {
        assert_eq!(member_tag_for("categories"), "category");
        assert_eq!(member_tag_for("computers"), "computer");
        assert_eq!(member_tag_for("osxconfigurationprofile"), "osxconfigurationprofile");
    }

    #[test]
    fn kind_table_matches_member_tag_derivation() {
        for kind in ResourceKind::ALL {
            assert_eq!(member_tag_for(kind.endpoint()), kind.member_tag());
        }
    }

    #[test]
    fn root_tag_lookup_is_case_insensitive() {
        assert_eq!(ResourceKind::from_root_tag("Script"), Some(ResourceKind::Scripts));
        assert_eq!(ResourceKind::from_root_tag("POLICY"), Some(ResourceKind::Policies));
        assert_eq!(ResourceKind::from_root_tag("computer"), None);
    }

    #[test]
    fn processing_order_is_scripts_then_policies() {
        assert_eq!(ResourceKind::ALL, [ResourceKind::Scripts, ResourceKind::Policies]);
    }

    #[test]
    fn logical_name_joins_name_and_id() {
        let entry = ListingEntry {
            id: "42".to_string(),
            name: "Test Script".to_string(),
        };
        assert_eq!(entry.logical_name(), "Test Script_42");
    }
}
