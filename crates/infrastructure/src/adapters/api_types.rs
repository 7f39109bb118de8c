//! Wire types of the remote catalog API.
//!
//! These mirror the JSON the API sends and are converted into domain types
//! immediately after decoding.

use std::collections::BTreeMap;

use pokedex_domain::{Ability, Entry, EntryId, EntryStub, EntryType, ListPage, Sprites, Stat};
use serde::Deserialize;

/// `{name, url}` reference used throughout the API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiNamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Response of the list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiListResponse {
    #[serde(default)]
    pub results: Vec<ApiNamedResource>,
    pub next: Option<String>,
}

impl From<ApiListResponse> for ListPage {
    fn from(response: ApiListResponse) -> Self {
        Self {
            results: response
                .results
                .into_iter()
                .map(|r| EntryStub::new(r.name, r.url))
                .collect(),
            next: response.next,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiTypeSlot {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: ApiNamedResource,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiStat {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: ApiNamedResource,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiAbility {
    pub ability: ApiNamedResource,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub slot: u8,
}

/// Response of the detail endpoint. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEntry {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub sprites: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub types: Vec<ApiTypeSlot>,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub stats: Vec<ApiStat>,
    #[serde(default)]
    pub abilities: Vec<ApiAbility>,
}

impl From<ApiEntry> for Entry {
    fn from(api: ApiEntry) -> Self {
        let mut types: Vec<EntryType> = api
            .types
            .into_iter()
            .map(|t| EntryType {
                slot: t.slot,
                name: t.kind.name,
            })
            .collect();
        types.sort_by_key(|t| t.slot);

        Self {
            id: EntryId(api.id),
            name: api.name,
            sprites: Sprites(api.sprites),
            types,
            height: api.height,
            weight: api.weight,
            stats: api
                .stats
                .into_iter()
                .map(|s| Stat {
                    stat_name: s.stat.name,
                    base_value: s.base_stat,
                    effort: s.effort,
                })
                .collect(),
            abilities: api
                .abilities
                .into_iter()
                .map(|a| Ability {
                    name: a.ability.name,
                    is_hidden: a.is_hidden,
                    slot: a.slot,
                })
                .collect(),
        }
    }
}
