use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use diesel::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

// Only the two fixture tables are touched here, so the schema is declared
// locally instead of depending on the server binary.
mod schema {
    diesel::table! {
        ingredients (id) {
            id -> Int4,
            #[max_length = 128]
            name -> Varchar,
            #[max_length = 64]
            measurement_unit -> Varchar,
        }
    }

    diesel::table! {
        tags (id) {
            id -> Int4,
            #[max_length = 32]
            name -> Varchar,
            #[max_length = 32]
            slug -> Varchar,
        }
    }
}

use schema::{ingredients, tags};

#[derive(Parser)]
#[command(name = "foodgram")]
#[command(about = "Foodgram operational CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load ingredient fixtures from a JSON file
    LoadIngredients {
        /// Path to a JSON array of {"name", "measurement_unit"} objects
        #[arg(long)]
        file: PathBuf,
        /// Database URL (default: $DATABASE_URL)
        #[arg(long)]
        database_url: Option<String>,
    },
    /// Load tag fixtures from a JSON file
    LoadTags {
        /// Path to a JSON array of {"name", "slug"} objects
        #[arg(long)]
        file: PathBuf,
        /// Database URL (default: $DATABASE_URL)
        #[arg(long)]
        database_url: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct IngredientFixture {
    name: String,
    measurement_unit: String,
}

#[derive(Debug, Deserialize)]
struct TagFixture {
    name: String,
    slug: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::LoadIngredients { file, database_url } => {
            load_ingredients(&file, database_url)?;
        }
        Commands::LoadTags { file, database_url } => {
            load_tags(&file, database_url)?;
        }
    }

    Ok(())
}

fn connect(database_url: Option<String>) -> Result<PgConnection> {
    let url = match database_url {
        Some(url) => url,
        None => std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
    };
    PgConnection::establish(&url).context("Failed to connect to the database")
}

fn read_fixtures<T: serde::de::DeserializeOwned>(file: &Path) -> Result<Vec<T>> {
    let data =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Invalid fixture JSON in {}", file.display()))
}

fn load_ingredients(file: &Path, database_url: Option<String>) -> Result<()> {
    let fixtures: Vec<IngredientFixture> = read_fixtures(file)?;
    let mut conn = connect(database_url)?;

    let mut created = 0usize;
    let mut skipped = 0usize;
    for fixture in &fixtures {
        if fixture.name.is_empty() || fixture.measurement_unit.is_empty() {
            skipped += 1;
            continue;
        }
        let inserted = diesel::insert_into(ingredients::table)
            .values((
                ingredients::name.eq(&fixture.name),
                ingredients::measurement_unit.eq(&fixture.measurement_unit),
            ))
            .on_conflict_do_nothing()
            .execute(&mut conn)?;
        if inserted > 0 {
            created += 1;
        } else {
            skipped += 1;
        }
    }

    println!(
        "Loaded {} ingredients ({} already present or invalid)",
        created, skipped
    );
    Ok(())
}

fn load_tags(file: &Path, database_url: Option<String>) -> Result<()> {
    let fixtures: Vec<TagFixture> = read_fixtures(file)?;
    let mut conn = connect(database_url)?;

    let mut created = 0usize;
    let mut skipped = 0usize;
    for fixture in &fixtures {
        if fixture.name.is_empty() || fixture.slug.is_empty() {
            skipped += 1;
            continue;
        }
        let inserted = diesel::insert_into(tags::table)
            .values((tags::name.eq(&fixture.name), tags::slug.eq(&fixture.slug)))
            .on_conflict_do_nothing()
            .execute(&mut conn)?;
        if inserted > 0 {
            created += 1;
        } else {
            skipped += 1;
        }
    }

    println!("Loaded {} tags ({} already present or invalid)", created, skipped);
    Ok(())
}
