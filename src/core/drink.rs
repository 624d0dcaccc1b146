//! Drinks: user-owned recipes addressed by a unique, stable slug.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access;
use crate::error::Error;
use crate::instructions;
use crate::list::{FetchKind, FetchRequest, FetchResponse, ListItem};
use crate::output::{DeleteResult, Page};
use crate::slugify::{self, MAX_NAME_LENGTH};
use crate::store::schema::{DRINKS, DRINK_INGREDIENTS};
use crate::store::{self, DataStore, Filter, Query, Range, Row};
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Drink {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "instructions::empty_document")]
    pub instructions: Value,
    pub owner: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ListItem for Drink {
    fn key(&self) -> &str {
        &self.slug
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrinkInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Document tree; an empty document when omitted.
    #[serde(default)]
    pub instructions: Option<Value>,
}

/// Fields to change. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrinkUpdate {
    #[serde(default)]
    pub name: Option<String>,
    /// `Some("")` clears the description.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Option<Value>,
}

impl DrinkUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.instructions.is_none()
    }
}

pub fn create(store: &dyn DataStore, owner: &str, input: DrinkInput) -> Result<Drink> {
    let owner = access::validate_actor(owner)?;
    let name = slugify::validate_display_name(&input.name, MAX_NAME_LENGTH)?;

    let doc = input
        .instructions
        .unwrap_or_else(instructions::empty_document);
    instructions::validate(&doc)?;

    let slug = slugify::next_slug(store, DRINKS, name)?;
    let now = Utc::now().to_rfc3339();
    let drink = Drink {
        id: Uuid::new_v4().to_string(),
        slug,
        name: name.to_string(),
        description: clean_description(input.description),
        instructions: doc,
        owner: owner.to_string(),
        created_at: now.clone(),
        updated_at: now,
    };

    let row = store.insert_row(DRINKS, store::encode(DRINKS, &drink)?)?;
    log_status!("drink", "Created '{}' as {}", drink.name, drink.slug);
    store::decode(DRINKS, row)
}

/// Newest drinks first.
pub fn list(store: &dyn DataStore, page: usize, page_size: usize) -> Result<Page<Drink>> {
    let page = page.max(1);
    let query = newest_first()
        .range(Range::page(page, page_size))
        .with_count();
    let result = store.query_rows(DRINKS, &query)?;
    let total = result.total_count.unwrap_or_default();
    Ok(Page::new(decode_rows(result.rows)?, page, page_size, total))
}

/// Drinks whose name starts with `prefix`, ignoring case, ordered by name.
pub fn search(store: &dyn DataStore, prefix: &str, limit: Option<usize>) -> Result<Vec<Drink>> {
    let mut query = Query::new()
        .filter(Filter::like("name", format!("{}%", prefix.trim())))
        .order_by("name", true)
        .order_by("slug", true);
    if let Some(limit) = limit {
        query = query.range(Range { offset: 0, limit });
    }
    decode_rows(store.query_rows(DRINKS, &query)?.rows)
}

pub fn get(store: &dyn DataStore, slug: &str) -> Result<Drink> {
    let query = Query::new()
        .filter(Filter::eq("slug", slug))
        .range(Range { offset: 0, limit: 1 });
    store
        .query_rows(DRINKS, &query)?
        .rows
        .into_iter()
        .next()
        .map(|row| store::decode(DRINKS, row))
        .transpose()?
        .ok_or_else(|| Error::drink_not_found(slug))
}

/// Apply `changes` to the drink at `slug`. The slug stays put on rename so
/// links keep working.
pub fn update(
    store: &dyn DataStore,
    actor: &str,
    slug: &str,
    changes: DrinkUpdate,
) -> Result<Drink> {
    let mut drink = get(store, slug)?;
    access::require_owner(actor, &drink.owner, &format!("drink:{}", drink.slug))?;

    if changes.is_empty() {
        return Err(Error::validation_missing_argument(vec![
            "name".to_string(),
            "description".to_string(),
            "instructions".to_string(),
        ]));
    }

    let mut patch = Row::new();

    if let Some(name) = &changes.name {
        let name = slugify::validate_display_name(name, MAX_NAME_LENGTH)?;
        drink.name = name.to_string();
        patch.insert("name".to_string(), json!(drink.name));
    }
    if let Some(description) = changes.description {
        drink.description = clean_description(Some(description));
        patch.insert("description".to_string(), json!(drink.description));
    }
    if let Some(doc) = changes.instructions {
        instructions::validate(&doc)?;
        patch.insert("instructions".to_string(), doc.clone());
        drink.instructions = doc;
    }

    drink.updated_at = Utc::now().to_rfc3339();
    patch.insert("updated_at".to_string(), json!(drink.updated_at));

    store.update_rows(DRINKS, &[Filter::eq("id", drink.id.as_str())], patch)?;
    log_status!("drink", "Updated {}", drink.slug);
    Ok(drink)
}

/// Delete a drink and its ingredient lines. The slug becomes free for reuse.
pub fn delete(store: &dyn DataStore, actor: &str, slug: &str) -> Result<DeleteResult> {
    let drink = get(store, slug)?;
    access::require_owner(actor, &drink.owner, &format!("drink:{}", drink.slug))?;

    let related =
        store.delete_rows(DRINK_INGREDIENTS, &[Filter::eq("drink_id", drink.id.as_str())])?;
    let deleted = store.delete_rows(DRINKS, &[Filter::eq("id", drink.id.as_str())])?;

    log_status!("drink", "Deleted {}", drink.slug);

    Ok(DeleteResult {
        id: drink.slug,
        deleted: deleted > 0,
        related_deleted: related,
    })
}

/// Serve a list controller request from the drinks table.
pub fn fetch(store: &dyn DataStore, request: &FetchRequest) -> Result<FetchResponse<Drink>> {
    match &request.kind {
        FetchKind::Page {
            page,
            page_size,
            with_count,
            ..
        } => {
            let mut query = newest_first().range(Range::page(*page, *page_size));
            if *with_count {
                query = query.with_count();
            }
            let result = store.query_rows(DRINKS, &query)?;
            Ok(FetchResponse::new(decode_rows(result.rows)?, result.total_count))
        }
        FetchKind::Search { term } => Ok(FetchResponse::new(search(store, term, None)?, None)),
    }
}

fn newest_first() -> Query {
    Query::new()
        .order_by("created_at", false)
        .order_by("slug", true)
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

fn decode_rows(rows: Vec<Row>) -> Result<Vec<Drink>> {
    rows.into_iter().map(|row| store::decode(DRINKS, row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::ErrorCode;

    fn input(name: &str) -> DrinkInput {
        DrinkInput {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn create_assigns_slug_and_empty_instructions() {
        let store = SqliteStore::open_in_memory().unwrap();
        let drink = create(&store, "ana", input("  My Drink!! ")).unwrap();
        assert_eq!(drink.slug, "my_drink");
        assert_eq!(drink.name, "My Drink!!");
        assert_eq!(drink.instructions, instructions::empty_document());
        assert_eq!(drink.created_at, drink.updated_at);
    }

    #[test]
    fn same_name_gets_numbered_slugs() {
        let store = SqliteStore::open_in_memory().unwrap();
        let slugs: Vec<String> = (0..3)
            .map(|_| create(&store, "ana", input("Negroni")).unwrap().slug)
            .collect();
        assert_eq!(slugs, vec!["negroni", "negroni_2", "negroni_3"]);
    }

    #[test]
    fn deleted_slug_is_reused() {
        let store = SqliteStore::open_in_memory().unwrap();
        for _ in 0..3 {
            create(&store, "ana", input("Negroni")).unwrap();
        }
        delete(&store, "ana", "negroni_2").unwrap();
        assert_eq!(create(&store, "bo", input("negroni")).unwrap().slug, "negroni_2");
    }

    #[test]
    fn create_rejects_unsluggable_name() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = create(&store, "ana", input("!!!")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationInvalidName);
        assert_eq!(store.count_rows(DRINKS).unwrap(), 0);
    }

    #[test]
    fn create_rejects_malformed_instructions() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut bad = input("Gimlet");
        bad.instructions = Some(json!({"type": "paragraph"}));
        assert_eq!(
            create(&store, "ana", bad).unwrap_err().code,
            ErrorCode::ValidationInvalidArgument
        );
    }

    #[test]
    fn get_unknown_slug_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = get(&store, "nope").unwrap_err();
        assert_eq!(err.code, ErrorCode::DrinkNotFound);
        assert!(!err.hints.is_empty());
    }

    #[test]
    fn rename_keeps_slug() {
        let store = SqliteStore::open_in_memory().unwrap();
        create(&store, "ana", input("Gimlet")).unwrap();
        let updated = update(
            &store,
            "ana",
            "gimlet",
            DrinkUpdate {
                name: Some("Gin Gimlet".to_string()),
                description: Some("  Tart ".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.slug, "gimlet");

        let stored = get(&store, "gimlet").unwrap();
        assert_eq!(stored.name, "Gin Gimlet");
        assert_eq!(stored.description.as_deref(), Some("Tart"));
    }

    #[test]
    fn empty_description_clears_it() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut with_desc = input("Gimlet");
        with_desc.description = Some("Tart".to_string());
        create(&store, "ana", with_desc).unwrap();

        let changes = DrinkUpdate {
            description: Some(String::new()),
            ..Default::default()
        };
        update(&store, "ana", "gimlet", changes).unwrap();
        assert_eq!(get(&store, "gimlet").unwrap().description, None);
    }

    #[test]
    fn non_owner_cannot_update_or_delete() {
        let store = SqliteStore::open_in_memory().unwrap();
        create(&store, "ana", input("Gimlet")).unwrap();

        let changes = DrinkUpdate {
            name: Some("Mine now".to_string()),
            ..Default::default()
        };
        assert_eq!(
            update(&store, "bo", "gimlet", changes).unwrap_err().code,
            ErrorCode::PermissionDenied
        );
        assert_eq!(
            delete(&store, "bo", "gimlet").unwrap_err().code,
            ErrorCode::PermissionDenied
        );
        assert_eq!(get(&store, "gimlet").unwrap().name, "Gimlet");
    }

    #[test]
    fn empty_update_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        create(&store, "ana", input("Gimlet")).unwrap();
        let err = update(&store, "ana", "gimlet", DrinkUpdate::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationMissingArgument);
    }

    #[test]
    fn search_matches_name_prefix() {
        let store = SqliteStore::open_in_memory().unwrap();
        for name in ["Whiskey Sour", "Whiskey Smash", "Pisco Sour"] {
            create(&store, "ana", input(name)).unwrap();
        }
        let found = search(&store, "whiskey s", None).unwrap();
        let names: Vec<&str> = found.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Whiskey Smash", "Whiskey Sour"]);
    }

    #[test]
    fn list_counts_every_drink() {
        let store = SqliteStore::open_in_memory().unwrap();
        for name in ["A", "B", "C"] {
            create(&store, "ana", input(name)).unwrap();
        }
        let page = list(&store, 1, 2).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_count, 3);
        assert!(page.has_more);
    }
}
