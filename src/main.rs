use std::env;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use grocery_planner::config::{LogFormat, OutputFormat, PlannerConfig};
use grocery_planner::planner::Planner;
use grocery_planner::shopping::EMPTY_PROMPT;
use grocery_planner::store::{self, JsonStore, RecipeSelection};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = PlannerConfig::from_env()?;
    init_tracing(config.log_format);

    info!("Starting grocery planner");

    let store = JsonStore::open(&config.data_path).await?;
    let catalog = store::load_unit_catalog(config.units_path.as_deref()).await?;
    let aliases = store::load_alias_table(config.aliases_path.as_deref()).await?;

    // Recipe selections come from the command line: `recipe-1 recipe-2*2`
    let selections = env::args()
        .skip(1)
        .map(|arg| arg.parse::<RecipeSelection>())
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid recipe selection")?;

    if selections.is_empty() {
        println!("{EMPTY_PROMPT}");
        println!();
        println!("Available recipes:");
        for recipe in store.recipes() {
            println!("  [{}] {}", recipe.id, recipe.name);
            for line in recipe.ingredient_summary().lines() {
                println!("      {line}");
            }
        }
        return Ok(());
    }

    let recipes = store.load_recipes(&selections)?;
    let fridge = store.load_fridge(config.fridge_id.as_deref())?;

    let planner = Planner::new(catalog, aliases);
    let plan = planner.plan_recipes(&recipes, &fridge);

    match config.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        OutputFormat::Text => {
            print!("{}", plan.shopping_list);
            println!();
            println!(
                "{} ingredient(s): {} in fridge, {} partially, {} missing, {} not comparable",
                plan.summary.total,
                plan.summary.satisfied,
                plan.summary.partially_missing,
                plan.summary.missing,
                plan.summary.unresolvable
            );
        }
    }

    Ok(())
}
