use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{config, drink, ingredient, slug};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "drinkmaker")]
#[command(version = VERSION)]
#[command(about = "Manage drink recipes and the shared ingredient catalogue")]
struct Cli {
    /// Act as this user id (defaults to defaults.user.default_user)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Use a throwaway in-memory store instead of the database file
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, edit and browse drinks
    #[command(visible_alias = "drinks")]
    Drink(drink::DrinkArgs),
    /// Manage the shared ingredient catalogue
    #[command(visible_alias = "ingredients")]
    Ingredient(ingredient::IngredientArgs),
    /// Compute the slug a drink name would get
    Slug(slug::SlugArgs),
    /// Manage global Drinkmaker configuration
    Config(config::ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let defaults = drinkmaker::defaults::load_defaults();
    let global = GlobalArgs {
        user: cli
            .user
            .unwrap_or_else(|| defaults.user.default_user.clone()),
        memory: cli.memory,
        defaults,
    };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    if output::print_json_result(json_result).is_err() {
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
