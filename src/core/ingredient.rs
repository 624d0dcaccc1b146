//! Ingredients: a shared, case-insensitively unique catalogue of names.
//!
//! Any user can add an ingredient; only its owner can rename or delete it.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::access;
use crate::error::Error;
use crate::list::{FetchKind, FetchRequest, FetchResponse, ListItem};
use crate::output::{DeleteResult, Page};
use crate::slugify::{self, MAX_NAME_LENGTH};
use crate::store::schema::{DRINK_INGREDIENTS, INGREDIENTS};
use crate::store::{self, DataStore, Filter, Query, Range, Row};
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub created_at: String,
}

impl ListItem for Ingredient {
    fn key(&self) -> &str {
        &self.name
    }
}

pub fn create(store: &dyn DataStore, owner: &str, name: &str) -> Result<Ingredient> {
    let owner = access::validate_actor(owner)?;
    let name = slugify::validate_display_name(name, MAX_NAME_LENGTH)?;

    if find_by_name(store, name)?.is_some() {
        return Err(Error::ingredient_already_exists(name));
    }

    let ingredient = Ingredient {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        owner: owner.to_string(),
        created_at: Utc::now().to_rfc3339(),
    };

    let row = store.insert_row(INGREDIENTS, store::encode(INGREDIENTS, &ingredient)?)?;
    log_status!("ingredient", "Created '{}'", ingredient.name);
    store::decode(INGREDIENTS, row)
}

/// One page of ingredients ordered by name.
pub fn list(store: &dyn DataStore, page: usize, page_size: usize) -> Result<Page<Ingredient>> {
    let page = page.max(1);
    let result = store.query_rows(
        INGREDIENTS,
        &Query::new()
            .order_by("name", true)
            .range(Range::page(page, page_size))
            .with_count(),
    )?;

    let total = result.total_count.unwrap_or_default();
    Ok(Page::new(decode_rows(result.rows)?, page, page_size, total))
}

/// Ingredients whose name starts with `prefix`, ignoring case.
pub fn search(store: &dyn DataStore, prefix: &str, limit: Option<usize>) -> Result<Vec<Ingredient>> {
    let mut query = Query::new()
        .filter(Filter::like("name", format!("{}%", prefix.trim())))
        .order_by("name", true);
    if let Some(limit) = limit {
        query = query.range(Range { offset: 0, limit });
    }

    decode_rows(store.query_rows(INGREDIENTS, &query)?.rows)
}

pub fn count(store: &dyn DataStore) -> Result<u64> {
    store.count_rows(INGREDIENTS)
}

pub fn get(store: &dyn DataStore, id: &str) -> Result<Ingredient> {
    find_one(store, Filter::eq("id", id))?.ok_or_else(|| Error::ingredient_not_found(id))
}

/// Exact, case-insensitive name lookup.
pub fn find_by_name(store: &dyn DataStore, name: &str) -> Result<Option<Ingredient>> {
    find_one(store, Filter::eq("name", name.trim()))
}

/// Look up by id first, then by name.
pub fn resolve(store: &dyn DataStore, id_or_name: &str) -> Result<Ingredient> {
    if let Some(found) = find_one(store, Filter::eq("id", id_or_name))? {
        return Ok(found);
    }
    find_by_name(store, id_or_name)?.ok_or_else(|| Error::ingredient_not_found(id_or_name))
}

pub fn rename(
    store: &dyn DataStore,
    actor: &str,
    id_or_name: &str,
    new_name: &str,
) -> Result<Ingredient> {
    let mut ingredient = resolve(store, id_or_name)?;
    access::require_owner(actor, &ingredient.owner, &format!("ingredient:{}", ingredient.id))?;

    let new_name = slugify::validate_display_name(new_name, MAX_NAME_LENGTH)?;
    if let Some(existing) = find_by_name(store, new_name)? {
        if existing.id != ingredient.id {
            return Err(Error::ingredient_already_exists(new_name));
        }
    }

    let mut patch = Row::new();
    patch.insert("name".to_string(), json!(new_name));
    store.update_rows(INGREDIENTS, &[Filter::eq("id", ingredient.id.as_str())], patch)?;

    log_status!("ingredient", "Renamed '{}' to '{}'", ingredient.name, new_name);
    ingredient.name = new_name.to_string();
    Ok(ingredient)
}

/// Delete an ingredient and remove it from every drink that used it.
pub fn delete(store: &dyn DataStore, actor: &str, id_or_name: &str) -> Result<DeleteResult> {
    let ingredient = resolve(store, id_or_name)?;
    access::require_owner(actor, &ingredient.owner, &format!("ingredient:{}", ingredient.id))?;

    let related = store.delete_rows(
        DRINK_INGREDIENTS,
        &[Filter::eq("ingredient_id", ingredient.id.as_str())],
    )?;
    let deleted = store.delete_rows(INGREDIENTS, &[Filter::eq("id", ingredient.id.as_str())])?;

    log_status!(
        "ingredient",
        "Deleted '{}' ({} drink references)",
        ingredient.name,
        related
    );

    Ok(DeleteResult {
        id: ingredient.id,
        deleted: deleted > 0,
        related_deleted: related,
    })
}

/// Serve a list controller request from the ingredients table.
pub fn fetch(store: &dyn DataStore, request: &FetchRequest) -> Result<FetchResponse<Ingredient>> {
    match &request.kind {
        FetchKind::Page {
            page,
            page_size,
            with_count,
            ..
        } => {
            let mut query = Query::new()
                .order_by("name", true)
                .range(Range::page(*page, *page_size));
            if *with_count {
                query = query.with_count();
            }
            let result = store.query_rows(INGREDIENTS, &query)?;
            Ok(FetchResponse::new(decode_rows(result.rows)?, result.total_count))
        }
        FetchKind::Search { term } => Ok(FetchResponse::new(search(store, term, None)?, None)),
    }
}

fn find_one(store: &dyn DataStore, filter: Filter) -> Result<Option<Ingredient>> {
    let query = Query::new()
        .filter(filter)
        .range(Range { offset: 0, limit: 1 });
    store
        .query_rows(INGREDIENTS, &query)?
        .rows
        .into_iter()
        .next()
        .map(|row| store::decode(INGREDIENTS, row))
        .transpose()
}

fn decode_rows(rows: Vec<Row>) -> Result<Vec<Ingredient>> {
    rows.into_iter()
        .map(|row| store::decode(INGREDIENTS, row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::ErrorCode;

    fn seeded(names: &[&str]) -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        for name in names {
            create(&store, "ana", name).unwrap();
        }
        store
    }

    #[test]
    fn create_trims_and_assigns_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        let lime = create(&store, "ana", "  Lime ").unwrap();
        assert_eq!(lime.name, "Lime");
        assert_eq!(lime.owner, "ana");
        assert!(Uuid::parse_str(&lime.id).is_ok());
        assert_eq!(count(&store).unwrap(), 1);
    }

    #[test]
    fn create_rejects_case_insensitive_duplicate() {
        let store = seeded(&["Lime"]);
        let err = create(&store, "bo", "LIME").unwrap_err();
        assert_eq!(err.code, ErrorCode::IngredientAlreadyExists);
        assert_eq!(err.message, "'LIME' already exists");
    }

    #[test]
    fn create_rejects_long_and_blank_names() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(create(&store, "ana", "   ").is_err());
        assert!(create(&store, "ana", &"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
        assert!(create(&store, "", "Lime").is_err());
    }

    #[test]
    fn list_pages_by_name_with_total() {
        let store = seeded(&["mint", "Angostura", "lime", "Basil", "rum"]);
        let first = list(&store, 1, 2).unwrap();
        let names: Vec<&str> = first.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Angostura", "Basil"]);
        assert_eq!(first.total_count, 5);
        assert!(first.has_more);

        let last = list(&store, 3, 2).unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_more);
    }

    #[test]
    fn search_is_prefix_and_case_insensitive() {
        let store = seeded(&["Lime", "Lime Cordial", "Key Lime", "Lemon"]);
        let found = search(&store, "lim", None).unwrap();
        let names: Vec<&str> = found.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Lime", "Lime Cordial"]);
        assert_eq!(search(&store, "l", Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn resolve_accepts_id_or_name() {
        let store = seeded(&["Mint"]);
        let mint = resolve(&store, "mint").unwrap();
        assert_eq!(resolve(&store, &mint.id).unwrap(), mint);
        assert_eq!(
            resolve(&store, "basil").unwrap_err().code,
            ErrorCode::IngredientNotFound
        );
    }

    #[test]
    fn rename_requires_owner_and_free_name() {
        let store = seeded(&["Mint", "Basil"]);
        assert_eq!(
            rename(&store, "bo", "Mint", "Spearmint").unwrap_err().code,
            ErrorCode::PermissionDenied
        );
        assert_eq!(
            rename(&store, "ana", "Mint", "basil").unwrap_err().code,
            ErrorCode::IngredientAlreadyExists
        );

        let renamed = rename(&store, "ana", "Mint", "Spearmint").unwrap();
        assert_eq!(get(&store, &renamed.id).unwrap().name, "Spearmint");
    }

    #[test]
    fn rename_allows_case_change_of_itself() {
        let store = seeded(&["mint"]);
        let renamed = rename(&store, "ana", "mint", "Mint").unwrap();
        assert_eq!(renamed.name, "Mint");
    }

    #[test]
    fn delete_requires_owner() {
        let store = seeded(&["Mint"]);
        assert_eq!(
            delete(&store, "bo", "Mint").unwrap_err().code,
            ErrorCode::PermissionDenied
        );
        let result = delete(&store, "ana", "Mint").unwrap();
        assert!(result.deleted);
        assert_eq!(count(&store).unwrap(), 0);
    }

    #[test]
    fn fetch_serves_pages_and_searches() {
        let store = seeded(&["a1", "a2", "a3", "b1"]);
        let page = FetchRequest {
            version: 1,
            kind: FetchKind::Page {
                page: 2,
                page_size: 2,
                replace: false,
                with_count: false,
            },
        };
        let response = fetch(&store, &page).unwrap();
        let names: Vec<&str> = response.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a3", "b1"]);
        assert_eq!(response.total_count, None);

        let search = FetchRequest {
            version: 2,
            kind: FetchKind::Search {
                term: "a".to_string(),
            },
        };
        assert_eq!(fetch(&store, &search).unwrap().items.len(), 3);
    }
}
