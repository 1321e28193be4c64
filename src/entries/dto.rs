use serde::Deserialize;

/// `?name=..&favorites=..` of the previous-entries lookup.
#[derive(Debug, Deserialize)]
pub struct EntriesQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub favorites: bool,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub favorite: bool,
}
