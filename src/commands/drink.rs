use clap::{Args, Subcommand};
use serde::Serialize;

use drinkmaker::drink::{self, Drink, DrinkInput, DrinkUpdate};
use drinkmaker::drink_ingredient::{self, IngredientLine};
use drinkmaker::instructions;
use drinkmaker::{DeleteResult, Page};

use super::{instructions_arg, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct DrinkArgs {
    #[command(subcommand)]
    command: DrinkCommand,
}

#[derive(Subcommand)]
enum DrinkCommand {
    /// Add a drink; its slug is derived from the name
    Create {
        /// Display name
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Instructions as plain text (blank lines separate paragraphs)
        #[arg(long)]
        instructions: Option<String>,
        /// Instructions as a JSON document (supports @file and - for stdin)
        #[arg(long, value_name = "JSON")]
        instructions_json: Option<String>,
    },
    /// List drinks, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Defaults to the configured list page size
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Find drinks whose name starts with a prefix
    Search {
        prefix: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Display a drink with its ingredients
    Show { slug: String },
    /// Change name, description or instructions (the slug never changes)
    #[command(visible_alias = "edit")]
    Update {
        slug: String,
        #[arg(long)]
        name: Option<String>,
        /// Pass an empty string to clear
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        instructions: Option<String>,
        #[arg(long, value_name = "JSON")]
        instructions_json: Option<String>,
    },
    /// Delete a drink and its ingredient lines
    Delete { slug: String },
    /// List a drink's ingredient lines
    Ingredients { slug: String },
    /// Add an ingredient to a drink or change its quantity
    SetIngredient {
        slug: String,
        /// Ingredient id or name
        ingredient: String,
        quantity: f64,
        #[arg(long)]
        unit: Option<String>,
    },
    /// Remove an ingredient from a drink
    RemoveIngredient {
        slug: String,
        /// Ingredient id or name
        ingredient: String,
    },
}

#[derive(Default, Serialize)]
pub struct DrinkOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    drink: Option<Drink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<Page<Drink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    drinks: Option<Vec<Drink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ingredients: Option<Vec<IngredientLine>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<IngredientLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<DeleteResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    removed: Option<bool>,
}

pub fn run(args: DrinkArgs, global: &GlobalArgs) -> CmdResult<DrinkOutput> {
    let store = global.open_store()?;
    let store = store.as_ref();
    let user = global.user.as_str();

    match args.command {
        DrinkCommand::Create {
            name,
            description,
            instructions,
            instructions_json,
        } => {
            let input = DrinkInput {
                name,
                description,
                instructions: instructions_arg(instructions, instructions_json)?,
            };
            let created = drink::create(store, user, input)?;
            Ok((
                DrinkOutput {
                    command: "drink.create".to_string(),
                    drink: Some(created),
                    ..Default::default()
                },
                0,
            ))
        }
        DrinkCommand::List { page, page_size } => {
            let page_size = page_size.unwrap_or(global.defaults.list.page_size);
            let listed = drink::list(store, page, page_size)?;
            Ok((
                DrinkOutput {
                    command: "drink.list".to_string(),
                    page: Some(listed),
                    ..Default::default()
                },
                0,
            ))
        }
        DrinkCommand::Search { prefix, limit } => {
            let found = drink::search(store, &prefix, limit)?;
            Ok((
                DrinkOutput {
                    command: "drink.search".to_string(),
                    drinks: Some(found),
                    ..Default::default()
                },
                0,
            ))
        }
        DrinkCommand::Show { slug } => {
            let found = drink::get(store, &slug)?;
            let lines = drink_ingredient::list_for_drink(store, &slug)?;
            Ok((
                DrinkOutput {
                    command: "drink.show".to_string(),
                    instructions_text: Some(instructions::to_plain_text(&found.instructions)),
                    drink: Some(found),
                    ingredients: Some(lines),
                    ..Default::default()
                },
                0,
            ))
        }
        DrinkCommand::Update {
            slug,
            name,
            description,
            instructions,
            instructions_json,
        } => {
            let changes = DrinkUpdate {
                name,
                description,
                instructions: instructions_arg(instructions, instructions_json)?,
            };
            let updated = drink::update(store, user, &slug, changes)?;
            Ok((
                DrinkOutput {
                    command: "drink.update".to_string(),
                    drink: Some(updated),
                    ..Default::default()
                },
                0,
            ))
        }
        DrinkCommand::Delete { slug } => {
            let result = drink::delete(store, user, &slug)?;
            Ok((
                DrinkOutput {
                    command: "drink.delete".to_string(),
                    deleted: Some(result),
                    ..Default::default()
                },
                0,
            ))
        }
        DrinkCommand::Ingredients { slug } => {
            let lines = drink_ingredient::list_for_drink(store, &slug)?;
            Ok((
                DrinkOutput {
                    command: "drink.ingredients".to_string(),
                    ingredients: Some(lines),
                    ..Default::default()
                },
                0,
            ))
        }
        DrinkCommand::SetIngredient {
            slug,
            ingredient,
            quantity,
            unit,
        } => {
            let line = drink_ingredient::set(
                store,
                user,
                &slug,
                &ingredient,
                quantity,
                unit.as_deref(),
            )?;
            Ok((
                DrinkOutput {
                    command: "drink.set-ingredient".to_string(),
                    line: Some(line),
                    ..Default::default()
                },
                0,
            ))
        }
        DrinkCommand::RemoveIngredient { slug, ingredient } => {
            let removed = drink_ingredient::remove(store, user, &slug, &ingredient)?;
            Ok((
                DrinkOutput {
                    command: "drink.remove-ingredient".to_string(),
                    removed: Some(removed),
                    ..Default::default()
                },
                0,
            ))
        }
    }
}
