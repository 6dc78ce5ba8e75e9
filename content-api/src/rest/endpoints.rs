use std::fmt;

use crate::client::ContentApi;
use crate::error::Result;
use crate::list::ListResponse;
use crate::query::encode_component;
use crate::response::Response;
use crate::rest::Transport;

/// Ordering accepted by `with_tag.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Alphabetical,
    Curated,
    Date,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Alphabetical => "alphabetical",
            SortOrder::Curated => "curated",
            SortOrder::Date => "date",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional parameters for [`ContentApi::artefact`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtefactParams {
    /// Fetch a specific (possibly unpublished) edition. Requires a bearer token.
    pub edition: Option<u32>,
    /// Local authority SNAC code, for local transactions.
    pub snac: Option<String>,
}

impl<T: Transport> ContentApi<T> {
    // --- Sections and tags ---

    /// GET /tags.json?type=section - All sections.
    pub async fn sections(&self) -> Result<ListResponse> {
        let url = self.url(&["tags.json"], &[("type", "section")])?;
        self.get_list(&url).await
    }

    /// GET /tags.json?type=section&root_sections=true - Top-level sections.
    pub async fn root_sections(&self) -> Result<ListResponse> {
        let url = self.url(
            &["tags.json"],
            &[("type", "section"), ("root_sections", "true")],
        )?;
        self.get_list(&url).await
    }

    /// GET /tags.json?type=section&parent_id= - Sections below `parent_tag`.
    pub async fn sub_sections(&self, parent_tag: &str) -> Result<ListResponse> {
        let url = self.url(
            &["tags.json"],
            &[("type", "section"), ("parent_id", parent_tag)],
        )?;
        self.get_list(&url).await
    }

    /// GET /tags/{tag}.json - A single tag; `None` if absent.
    pub async fn tag(&self, tag: &str) -> Result<Option<Response>> {
        let url = self.url(&["tags", &format!("{tag}.json")], &[])?;
        self.find_json(&url).await
    }

    /// GET /with_tag.json?tag=&include_children=1 - Artefacts tagged with `tag`.
    pub async fn with_tag(&self, tag: &str) -> Result<ListResponse> {
        let url = self.url(
            &["with_tag.json"],
            &[("tag", tag), ("include_children", "1")],
        )?;
        self.get_list(&url).await
    }

    /// GET /with_tag.json?tag=&sort=curated - Curated listing; `None` if absent.
    pub async fn curated_list(&self, tag: &str) -> Result<Option<ListResponse>> {
        let url = self.url(
            &["with_tag.json"],
            &[("tag", tag), ("sort", SortOrder::Curated.as_str())],
        )?;
        self.find_list(&url).await
    }

    /// GET /with_tag.json?tag=&sort= - Artefacts tagged with `tag`, ordered.
    pub async fn sorted_by(&self, tag: &str, sort: SortOrder) -> Result<ListResponse> {
        let url = self.url(&["with_tag.json"], &[("tag", tag), ("sort", sort.as_str())])?;
        self.get_list(&url).await
    }

    /// GET /related.json?{kind}={item} - Related artefacts; `None` if absent.
    pub async fn related(&self, kind: &str, item: &str) -> Result<Option<ListResponse>> {
        let url = self.url(&["related.json"], &[(kind, item)])?;
        self.find_list(&url).await
    }

    // --- Artefacts ---

    /// GET /{slug}.json - A single artefact; `None` if absent.
    ///
    /// Setting `params.edition` requires a bearer token; without one this
    /// fails with `MissingCredential` before any request is made.
    pub async fn artefact(&self, slug: &str, params: &ArtefactParams) -> Result<Option<Response>> {
        if params.edition.is_some() {
            self.require_bearer_token()?;
        }

        let edition = params.edition.map(|e| e.to_string());
        let mut query = Vec::new();
        if let Some(edition) = &edition {
            query.push(("edition", edition.as_str()));
        }
        if let Some(snac) = &params.snac {
            query.push(("snac", snac.as_str()));
        }
        let url = self.url(&[&format!("{slug}.json")], &query)?;
        self.find_json(&url).await
    }

    /// GET /artefacts.json - All artefacts.
    pub async fn artefacts(&self) -> Result<ListResponse> {
        let url = self.url(&["artefacts.json"], &[])?;
        self.get_list(&url).await
    }

    // --- Local authorities ---

    /// GET /local_authorities/{snac}.json - `None` if absent.
    pub async fn local_authority(&self, snac_code: &str) -> Result<Option<Response>> {
        let url = self.url(&["local_authorities", &format!("{snac_code}.json")], &[])?;
        self.find_json(&url).await
    }

    /// GET /local_authorities.json?name= - Search by name.
    pub async fn local_authorities_by_name(&self, name: &str) -> Result<Response> {
        let url = self.url(&["local_authorities.json"], &[("name", name)])?;
        self.get_json(&url).await
    }

    /// GET /local_authorities.json?snac_code= - Search by SNAC code.
    pub async fn local_authorities_by_snac_code(&self, snac_code: &str) -> Result<Response> {
        let url = self.url(&["local_authorities.json"], &[("snac_code", snac_code)])?;
        self.get_json(&url).await
    }

    // --- Licences and business support ---

    /// GET /licences.json?ids= - Licences by id, sorted; `None` if absent.
    ///
    /// Sent as a single request; the id list is not batched.
    pub async fn licences_for_ids<S: AsRef<str>>(&self, ids: &[S]) -> Result<Option<Response>> {
        let mut ids: Vec<&str> = ids.iter().map(|id| id.as_ref()).collect();
        ids.sort_unstable();
        let joined = ids
            .into_iter()
            .map(encode_component)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}{joined}", self.url(&["licences.json"], &[("ids", "")])?);
        self.find_json(&url).await
    }

    /// GET /business_support_schemes.json?identifiers= - Schemes by identifier.
    ///
    /// Long identifier lists are split across requests and merged.
    pub async fn business_support_schemes<S: AsRef<str>>(
        &self,
        identifiers: &[S],
    ) -> Result<ListResponse> {
        self.get_batched_list(&["business_support_schemes.json"], "identifiers", identifiers)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_strings() {
        assert_eq!(SortOrder::Alphabetical.as_str(), "alphabetical");
        assert_eq!(SortOrder::Curated.to_string(), "curated");
        assert_eq!(SortOrder::Date.as_str(), "date");
    }

    #[test]
    fn test_artefact_params_default_is_unprivileged() {
        let params = ArtefactParams::default();
        assert!(params.edition.is_none());
        assert!(params.snac.is_none());
    }
}
