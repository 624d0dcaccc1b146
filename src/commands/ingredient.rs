use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;

use drinkmaker::defaults::ListConfig;
use drinkmaker::ingredient::{self, Ingredient};
use drinkmaker::list::{Completion, FieldAction, ListController, NameField};
use drinkmaker::store::DataStore;
use drinkmaker::{DeleteResult, Page};

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct IngredientArgs {
    #[command(subcommand)]
    command: IngredientCommand,
}

#[derive(Subcommand)]
enum IngredientCommand {
    /// Add an ingredient (names are unique, ignoring case)
    Create { name: String },
    /// List ingredients by name
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Find ingredients whose name starts with a prefix
    Search {
        prefix: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Rename an ingredient you own
    Rename {
        /// Ingredient id or name
        ingredient: String,
        new_name: String,
    },
    /// Delete an ingredient you own (removes it from every drink)
    Delete {
        /// Ingredient id or name
        ingredient: String,
    },
    /// Check a would-be ingredient name the way the "new ingredient" form does
    Check { name: String },
    /// Walk the incremental ingredient list and print each state it passes through
    Browse {
        /// Pages to load, counting the first
        #[arg(long, default_value_t = 1)]
        pages: usize,
        /// Switch to search mode with this term after paging
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameCheckOutput {
    field: NameField,
    searched: bool,
    matches: Vec<Ingredient>,
}

#[derive(Default, Serialize)]
pub struct IngredientOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ingredient: Option<Ingredient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<Page<Ingredient>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ingredients: Option<Vec<Ingredient>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<DeleteResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    check: Option<NameCheckOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshots: Option<Vec<Value>>,
}

pub fn run(args: IngredientArgs, global: &GlobalArgs) -> CmdResult<IngredientOutput> {
    let store = global.open_store()?;
    let store = store.as_ref();
    let user = global.user.as_str();
    let list_config = global.defaults.list;

    let output = match args.command {
        IngredientCommand::Create { name } => IngredientOutput {
            command: "ingredient.create".to_string(),
            ingredient: Some(ingredient::create(store, user, &name)?),
            ..Default::default()
        },
        IngredientCommand::List { page, page_size } => {
            let page_size = page_size.unwrap_or(list_config.page_size);
            IngredientOutput {
                command: "ingredient.list".to_string(),
                page: Some(ingredient::list(store, page, page_size)?),
                ..Default::default()
            }
        }
        IngredientCommand::Search { prefix, limit } => IngredientOutput {
            command: "ingredient.search".to_string(),
            ingredients: Some(ingredient::search(store, &prefix, limit)?),
            ..Default::default()
        },
        IngredientCommand::Rename {
            ingredient: target,
            new_name,
        } => IngredientOutput {
            command: "ingredient.rename".to_string(),
            ingredient: Some(ingredient::rename(store, user, &target, &new_name)?),
            ..Default::default()
        },
        IngredientCommand::Delete { ingredient: target } => IngredientOutput {
            command: "ingredient.delete".to_string(),
            deleted: Some(ingredient::delete(store, user, &target)?),
            ..Default::default()
        },
        IngredientCommand::Check { name } => IngredientOutput {
            command: "ingredient.check".to_string(),
            check: Some(check(store, &list_config, &name)?),
            ..Default::default()
        },
        IngredientCommand::Browse { pages, search } => IngredientOutput {
            command: "ingredient.browse".to_string(),
            snapshots: Some(browse(store, list_config, pages, search.as_deref())?),
            ..Default::default()
        },
    };

    Ok((output, 0))
}

fn check(
    store: &dyn DataStore,
    config: &ListConfig,
    name: &str,
) -> drinkmaker::Result<NameCheckOutput> {
    let mut field = NameField::new(config);

    let (searched, matches) = match field.on_input(name) {
        FieldAction::Search(term) => match ingredient::search(store, &term, None) {
            Ok(found) => {
                field.on_results(&term, &found);
                (true, found)
            }
            Err(err) => {
                field.on_search_failed(&term);
                return Err(err);
            }
        },
        FieldAction::None | FieldAction::Clear => (false, Vec::new()),
    };

    Ok(NameCheckOutput {
        field,
        searched,
        matches,
    })
}

fn browse(
    store: &dyn DataStore,
    config: ListConfig,
    pages: usize,
    search: Option<&str>,
) -> drinkmaker::Result<Vec<Value>> {
    let mut list: ListController<Ingredient> = ListController::new(config);
    let mut snapshots = Vec::new();

    let mut next = Some(list.start());
    let mut loaded = 0;
    while let Some(request) = next.take() {
        let completion = list.drive(&request, |req| ingredient::fetch(store, req));
        if let Completion::Failed(err) = completion {
            return Err(err);
        }
        snapshots.push(snapshot_value(&list)?);
        loaded += 1;
        if loaded < pages {
            next = list.on_scroll_near_bottom();
        }
    }

    if let Some(term) = search {
        if let Some(request) = list.on_search_term_change(term) {
            let completion = list.drive(&request, |req| ingredient::fetch(store, req));
            if let Completion::Failed(err) = completion {
                return Err(err);
            }
            snapshots.push(snapshot_value(&list)?);
        }
    }

    Ok(snapshots)
}

fn snapshot_value(list: &ListController<Ingredient>) -> drinkmaker::Result<Value> {
    serde_json::to_value(list.snapshot()).map_err(|e| {
        drinkmaker::Error::internal_json(e.to_string(), Some("serialize list snapshot".to_string()))
    })
}
