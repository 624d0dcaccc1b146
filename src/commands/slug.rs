use clap::Args;
use serde::Serialize;

use drinkmaker::slugify;

use super::CmdResult;

#[derive(Args)]
pub struct SlugArgs {
    /// Display name to derive the slug from
    name: String,

    /// Slugs already taken (repeatable)
    #[arg(long, num_args = 1..)]
    existing: Vec<String>,
}

#[derive(Serialize)]
pub struct SlugOutput {
    command: String,
    name: String,
    base: String,
    slug: String,
}

pub fn run(args: SlugArgs) -> CmdResult<SlugOutput> {
    let base = slugify::normalize_base(&args.name)?;
    let slug = slugify::generate_slug(&args.name, &args.existing)?;

    Ok((
        SlugOutput {
            command: "slug".to_string(),
            name: args.name,
            base,
            slug,
        },
        0,
    ))
}
