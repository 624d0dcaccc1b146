//! Ingredient lines on a drink: how much of which ingredient, in order.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::access;
use crate::drink;
use crate::error::Error;
use crate::ingredient::{self, Ingredient};
use crate::store::schema::{DRINK_INGREDIENTS, INGREDIENTS};
use crate::store::{self, DataStore, Filter, Query, Range, Row};
use crate::Result;

/// Stored row linking a drink to an ingredient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrinkIngredient {
    pub drink_id: String,
    pub ingredient_id: String,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub position: i64,
}

/// A drink's ingredient line with the ingredient name resolved.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngredientLine {
    pub ingredient_id: String,
    pub name: String,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub position: i64,
}

/// Add `ingredient_ref` to the drink, or change its quantity if already listed.
/// New lines go to the end.
pub fn set(
    store: &dyn DataStore,
    actor: &str,
    drink_slug: &str,
    ingredient_ref: &str,
    quantity: f64,
    unit: Option<&str>,
) -> Result<IngredientLine> {
    let drink = drink::get(store, drink_slug)?;
    access::require_owner(actor, &drink.owner, &format!("drink:{}", drink.slug))?;

    let quantity = crate::validation::require_positive(quantity, "quantity")?;
    let unit = unit.map(str::trim).filter(|u| !u.is_empty()).map(str::to_string);
    let ingredient = ingredient::resolve(store, ingredient_ref)?;

    let key = [
        Filter::eq("drink_id", drink.id.as_str()),
        Filter::eq("ingredient_id", ingredient.id.as_str()),
    ];
    let existing = store.query_rows(
        DRINK_INGREDIENTS,
        &Query::new()
            .filter(key[0].clone())
            .filter(key[1].clone()),
    )?;

    let position = match existing.rows.into_iter().next() {
        Some(row) => {
            let current: DrinkIngredient = store::decode(DRINK_INGREDIENTS, row)?;
            let mut patch = Row::new();
            patch.insert("quantity".to_string(), json!(quantity));
            patch.insert("unit".to_string(), json!(unit));
            store.update_rows(DRINK_INGREDIENTS, &key, patch)?;
            current.position
        }
        None => {
            let position = next_position(store, &drink.id)?;
            let line = DrinkIngredient {
                drink_id: drink.id.clone(),
                ingredient_id: ingredient.id.clone(),
                quantity,
                unit: unit.clone(),
                position,
            };
            store.insert_row(DRINK_INGREDIENTS, store::encode(DRINK_INGREDIENTS, &line)?)?;
            position
        }
    };

    log_status!(
        "drink",
        "{}: {} x{}{}",
        drink.slug,
        ingredient.name,
        quantity,
        unit.as_deref().map(|u| format!(" {}", u)).unwrap_or_default()
    );

    Ok(IngredientLine {
        ingredient_id: ingredient.id,
        name: ingredient.name,
        quantity,
        unit,
        position,
    })
}

/// Take an ingredient off a drink. Returns whether a line was removed.
pub fn remove(
    store: &dyn DataStore,
    actor: &str,
    drink_slug: &str,
    ingredient_ref: &str,
) -> Result<bool> {
    let drink = drink::get(store, drink_slug)?;
    access::require_owner(actor, &drink.owner, &format!("drink:{}", drink.slug))?;
    let ingredient = ingredient::resolve(store, ingredient_ref)?;

    let removed = store.delete_rows(
        DRINK_INGREDIENTS,
        &[
            Filter::eq("drink_id", drink.id.as_str()),
            Filter::eq("ingredient_id", ingredient.id.as_str()),
        ],
    )?;
    Ok(removed > 0)
}

/// The drink's ingredient lines in the order they were added.
pub fn list_for_drink(store: &dyn DataStore, drink_slug: &str) -> Result<Vec<IngredientLine>> {
    let drink = drink::get(store, drink_slug)?;

    let lines: Vec<DrinkIngredient> = store
        .query_rows(
            DRINK_INGREDIENTS,
            &Query::new()
                .filter(Filter::eq("drink_id", drink.id.as_str()))
                .order_by("position", true),
        )?
        .rows
        .into_iter()
        .map(|row| store::decode(DRINK_INGREDIENTS, row))
        .collect::<Result<_>>()?;

    if lines.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Value> = lines.iter().map(|l| json!(l.ingredient_id)).collect();
    let names: HashMap<String, String> = store
        .query_rows(INGREDIENTS, &Query::new().filter(Filter::is_in("id", ids)))?
        .rows
        .into_iter()
        .map(|row| store::decode::<Ingredient>(INGREDIENTS, row).map(|i| (i.id, i.name)))
        .collect::<Result<_>>()?;

    lines
        .into_iter()
        .map(|line| {
            let name = names
                .get(&line.ingredient_id)
                .cloned()
                .ok_or_else(|| Error::ingredient_not_found(line.ingredient_id.as_str()))?;
            Ok(IngredientLine {
                ingredient_id: line.ingredient_id,
                name,
                quantity: line.quantity,
                unit: line.unit,
                position: line.position,
            })
        })
        .collect()
}

fn next_position(store: &dyn DataStore, drink_id: &str) -> Result<i64> {
    let last = store.query_rows(
        DRINK_INGREDIENTS,
        &Query::new()
            .select(&["position"])
            .filter(Filter::eq("drink_id", drink_id))
            .order_by("position", false)
            .range(Range { offset: 0, limit: 1 }),
    )?;

    Ok(last
        .rows
        .first()
        .and_then(|row| row.get("position"))
        .and_then(Value::as_i64)
        .map_or(1, |p| p + 1))
}
