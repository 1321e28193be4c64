//! Previous-entries lookup shown under the name field.

use tracing::debug;

use crate::{
    entries::store::{NutritionDataStore, NutritionEntry},
    form::FormState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterTab {
    #[default]
    All,
    Favorites,
}

/// Runs one lookup round-trip. The favorites tab lists every favorite and
/// ignores the typed name; the all tab filters by name substring.
pub async fn query(
    store: &dyn NutritionDataStore,
    name_substring: &str,
    favorites_only: bool,
) -> anyhow::Result<Vec<NutritionEntry>> {
    let entries = if favorites_only {
        store.fetch_entries(true, None).await?
    } else {
        let search = Some(name_substring.trim()).filter(|s| !s.is_empty());
        store.fetch_entries(false, search).await?
    };
    debug!(
        name = name_substring,
        favorites_only,
        count = entries.len(),
        "previous entries fetched"
    );
    Ok(entries)
}

/// Re-issued on every keystroke and tab switch, without caching.
pub async fn refresh_for_form(
    store: &dyn NutritionDataStore,
    state: &FormState,
) -> anyhow::Result<Vec<NutritionEntry>> {
    query(store, &state.name, state.filter() == FilterTab::Favorites).await
}

#[cfg(test)]
mod lookup_tests {
    use super::*;
    use crate::entries::memory::memory_tests::seeded_store;

    fn names(entries: Vec<NutritionEntry>) -> Vec<String> {
        entries.into_iter().map(|e| e.name).collect()
    }

    #[tokio::test]
    async fn substring_query_matches_case_insensitively() {
        let store = seeded_store().await;
        assert_eq!(names(query(&store, "ap", false).await.unwrap()), ["Apple"]);
        assert_eq!(names(query(&store, "AN", false).await.unwrap()), ["Banana"]);
        assert!(query(&store, "kiwi", false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_substring_returns_everything() {
        let store = seeded_store().await;
        assert_eq!(query(&store, "", false).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn search_text_is_trimmed() {
        let store = seeded_store().await;
        assert_eq!(query(&store, "   ", false).await.unwrap().len(), 3);
        assert_eq!(names(query(&store, " ap ", false).await.unwrap()), ["Apple"]);
    }

    #[tokio::test]
    async fn favorites_ignore_name_filter() {
        let store = seeded_store().await;
        assert_eq!(names(query(&store, "", true).await.unwrap()), ["Banana"]);
        assert_eq!(names(query(&store, "carrot", true).await.unwrap()), ["Banana"]);
    }

    #[tokio::test]
    async fn form_refresh_follows_name_and_tab() {
        let store = seeded_store().await;
        let mut state = FormState::new();
        state.name = "car".into();
        assert_eq!(names(refresh_for_form(&store, &state).await.unwrap()), ["Carrot"]);

        state.set_filter(FilterTab::Favorites);
        assert_eq!(names(refresh_for_form(&store, &state).await.unwrap()), ["Banana"]);
    }
}
