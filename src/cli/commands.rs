//! Command execution handlers

use std::collections::HashMap;
use std::path::Path;

use console::style;

use crate::analyzer::{DiscoveryOptions, DiscoveryReport, FlySummary, TieabilityEvaluator};
use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::error::{FlyboxError, Result};
use crate::matcher::MaterialMatcher;
use crate::models::{Fly, FlyScope, MaterialRequirement};
use crate::parsers::{parse_flies_csv, write_flies_csv};

use super::{OutputFormat, ScopeFilter};

/// Open the catalog named by the configuration
fn open_store(config: &Config) -> Result<CatalogStore> {
    Ok(CatalogStore::open(config.catalog_path())?
        .with_material_resolution(config.import.resolve_materials))
}

/// Find a fly by id or name
fn lookup_fly<'a>(store: &'a CatalogStore, fly: &str) -> Result<&'a Fly> {
    store
        .find_fly(fly)
        .ok_or_else(|| FlyboxError::fly_not_found(fly))
}

/// Parse `Name@Color@required|optional` tokens into line items
fn parse_materials(tokens: &[String]) -> Result<Vec<MaterialRequirement>> {
    tokens
        .iter()
        .enumerate()
        .map(|(pos, token)| {
            MaterialRequirement::parse_token(token, pos).ok_or_else(|| {
                FlyboxError::validation(format!("Material '{}' has an empty name", token))
            })
        })
        .collect()
}

fn scope_of(global: bool) -> FlyScope {
    if global {
        FlyScope::Global
    } else {
        FlyScope::Personal
    }
}

fn filtered_flies(store: &CatalogStore, filter: ScopeFilter) -> Vec<Fly> {
    store
        .flies()
        .iter()
        .filter(|f| filter.includes(f.scope))
        .cloned()
        .collect()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Execute the import command
pub fn execute_import(args: &super::ImportArgs, config: &Config) -> Result<usize> {
    use indicatif::{ProgressBar, ProgressStyle};

    let text = std::fs::read_to_string(&args.input)?;
    let category = args
        .category
        .as_deref()
        .unwrap_or(&config.import.default_category);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .map_err(|e| FlyboxError::Other(e.to_string()))?,
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message(format!("Reading {}...", args.input.display()));

    let rows = parse_flies_csv(&text, category)?;

    pb.set_message(format!("Importing {} flies...", rows.len()));
    let mut store = open_store(config)?
        .with_material_resolution(config.import.resolve_materials && !args.no_resolve);
    let summary = store.import_rows(rows, scope_of(args.global))?;
    store.save()?;

    pb.finish_with_message(format!(
        "Imported {} flies, skipped {} duplicates",
        summary.inserted, summary.skipped
    ));

    for name in &summary.skipped_names {
        println!("  {} {} already included in compendium", style("•").yellow(), name);
    }

    Ok(summary.inserted)
}

/// Execute the export command
pub fn execute_export(args: &super::ExportArgs, config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let flies = filtered_flies(&store, args.scope);
    let csv = write_flies_csv(&flies)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, csv)?;
            tracing::info!("Exported {} flies to {}", flies.len(), path.display());
        }
        None => print!("{}", csv),
    }

    Ok(())
}

/// Execute the flies command
pub fn execute_flies(args: &super::FliesArgs, config: &Config) -> Result<()> {
    use super::FlyCommands;

    match &args.command {
        FlyCommands::List { scope, format } => {
            let store = open_store(config)?;
            let mut flies = filtered_flies(&store, *scope);
            flies.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

            match format {
                OutputFormat::Json => print_json(&flies)?,
                OutputFormat::Pretty => {
                    if flies.is_empty() {
                        println!("No flies found");
                    }
                    for fly in &flies {
                        let badge = match fly.scope {
                            FlyScope::Global => style("[global]").dim(),
                            FlyScope::Personal => style("[mine]").green(),
                        };
                        println!(
                            "{} {} ({}, {} materials)",
                            badge,
                            style(&fly.name).bold(),
                            fly.category,
                            fly.requirements.len()
                        );
                    }
                }
            }
        }
        FlyCommands::Show { fly, format } => {
            let store = open_store(config)?;
            let fly = lookup_fly(&store, fly)?;
            show_fly(fly, &store, config, *format)?;
        }
        FlyCommands::Add {
            name,
            category,
            materials,
            sizes,
            global,
        } => {
            let mut store = open_store(config)?;
            let category = category
                .clone()
                .unwrap_or_else(|| config.import.default_category.clone());

            let mut fly = Fly::new(name.as_str(), category);
            if let Some(sizes) = sizes {
                fly.sizes = sizes
                    .split(|c| c == ';' || c == '|')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            for requirement in parse_materials(materials)? {
                fly.add_requirement(requirement);
            }

            let id = store.add_fly(fly, scope_of(*global))?;
            store.save()?;
            println!("{} Added {} ({})", style("✓").green(), style(name).bold(), id);
        }
        FlyCommands::SetMaterials { fly, materials } => {
            let mut store = open_store(config)?;
            let id = lookup_fly(&store, fly)?.id.clone();
            let requirements = parse_materials(materials)?;
            let count = requirements.len();

            store.replace_requirements(&id, requirements)?;
            store.save()?;
            println!("{} Saved {} materials", style("✓").green(), count);
        }
        FlyCommands::Delete { fly, yes } => {
            let mut store = open_store(config)?;
            let target = lookup_fly(&store, fly)?;
            if target.scope == FlyScope::Global {
                return Err(FlyboxError::ReadOnlyFly(target.name.clone()));
            }
            let (id, name) = (target.id.clone(), target.name.clone());

            if !(*yes || config.general.auto_yes) {
                let confirmed = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete '{}'?", name))
                    .default(false)
                    .interact()
                    .map_err(|e| FlyboxError::Other(e.to_string()))?;
                if !confirmed {
                    println!("Aborted");
                    return Ok(());
                }
            }

            store.delete_fly(&id)?;
            store.save()?;
            println!("{} Deleted {}", style("✓").green(), name);
        }
    }

    Ok(())
}

fn show_fly(fly: &Fly, store: &CatalogStore, config: &Config, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(fly);
    }

    let result = TieabilityEvaluator::new()
        .with_threshold(config.matching.threshold)
        .evaluate(fly, &store.inventory_snapshot());
    let catalog = store.material_catalog();

    println!("{}", style(&fly.name).bold().underlined());
    println!("  Id:       {}", fly.id);
    println!("  Category: {}", fly.category);
    println!("  Catalog:  {}", fly.scope);
    if let Some(difficulty) = &fly.difficulty {
        println!("  Difficulty: {}", difficulty);
    }
    if !fly.sizes.is_empty() {
        println!("  Sizes:    {}", fly.sizes.join(", "));
    }
    if !fly.target_species.is_empty() {
        println!("  Species:  {}", fly.target_species.join(", "));
    }
    if !fly.colorways.is_empty() {
        println!("  Colorways: {}", fly.colorways.join(", "));
    }
    if let Some(url) = &fly.image_url {
        println!("  Image:    {}", url);
    }

    println!("\n{}", style("Materials").bold());
    for requirement in &fly.requirements {
        let mark = if !requirement.required {
            style("-").dim()
        } else if result.missing.contains(requirement) {
            style("✗").red()
        } else {
            style("✓").green()
        };
        let linked = requirement
            .material_id()
            .and_then(|id| catalog.get(id))
            .map(|e| format!(" -> {}", e.label()))
            .unwrap_or_default();
        println!("  {} {}{}", mark, requirement, style(linked).dim());
    }

    println!();
    if result.tieable {
        println!("{}", style("You can tie this fly").green().bold());
    } else {
        println!("{} {} missing", style("✗").red(), result.missing_count);
    }

    Ok(())
}

/// Execute the materials command
pub fn execute_materials(args: &super::MaterialsArgs, config: &Config) -> Result<()> {
    use super::MaterialCommands;

    match &args.command {
        MaterialCommands::Add { name, color, own } => {
            let mut store = open_store(config)?;
            let id = store.add_material(name, color.as_deref())?;
            if *own {
                store.add_inventory_material(&id)?;
            }
            store.save()?;
            println!("{} {} ({})", style("✓").green(), name, id);
        }
        MaterialCommands::Search { query, limit } => {
            let store = open_store(config)?;
            let hits = store.search_materials(query, *limit);

            if hits.is_empty() {
                println!("No materials found matching '{}'", query);
            } else {
                println!("Search Results for '{}'\n", style(query).cyan());
                for hit in &hits {
                    println!(
                        "{} {} {}",
                        style(format!("{:.2}", hit.score)).dim(),
                        style(&hit.label).bold(),
                        style(&hit.id).dim()
                    );
                }
            }
        }
    }

    Ok(())
}

/// Execute the inventory command
pub fn execute_inventory(args: &super::InventoryArgs, config: &Config) -> Result<()> {
    use super::InventoryCommands;

    match &args.command {
        InventoryCommands::Add { material, color } => {
            let mut store = open_store(config)?;
            let id = if store.materials().iter().any(|m| &m.id == material) {
                material.clone()
            } else {
                store
                    .find_material_id(material, color.as_deref())
                    .ok_or_else(|| FlyboxError::MaterialNotFound(material.clone()))?
            };

            if store.add_inventory_material(&id)? {
                store.save()?;
                println!("{} Added {}", style("✓").green(), material);
            } else {
                println!("{} is already in your inventory", material);
            }
        }
        InventoryCommands::Alias { text } => {
            let mut store = open_store(config)?;
            if store.add_alias(text)? {
                store.save()?;
                println!("{} Added {}", style("✓").green(), text.trim());
            } else {
                println!("'{}' is already in your inventory", text.trim());
            }
        }
        InventoryCommands::Import { input } => {
            let text = match input {
                Some(path) => std::fs::read_to_string(path)?,
                None => std::io::read_to_string(std::io::stdin())?,
            };

            let mut store = open_store(config)?;
            let summary = store.import_aliases(&text)?;
            store.save()?;
            println!(
                "{} Added {} items, skipped {} duplicates",
                style("✓").green(),
                summary.inserted,
                summary.skipped
            );
        }
        InventoryCommands::Remove { id } => {
            let mut store = open_store(config)?;
            let item = store.remove_inventory_item(id)?;
            store.save()?;
            println!(
                "{} Removed {}",
                style("✓").green(),
                item.label(&store.material_catalog())
            );
        }
        InventoryCommands::List { format } => {
            let store = open_store(config)?;
            let items = store.inventory();

            match format {
                OutputFormat::Json => print_json(&items)?,
                OutputFormat::Pretty => {
                    if items.is_empty() {
                        println!("Your inventory is empty");
                    }
                    let catalog = store.material_catalog();
                    for item in items {
                        let badge = if item.material_id().is_some() {
                            style("[catalog]").green()
                        } else {
                            style("[alias]").yellow()
                        };
                        println!("{} {} {}", badge, item.label(&catalog), style(&item.id).dim());
                    }
                }
            }
        }
    }

    Ok(())
}

fn discovery_options(config: &Config, threshold: Option<f32>) -> DiscoveryOptions {
    DiscoveryOptions {
        threshold: threshold.unwrap_or(config.matching.threshold),
        max_missing: config.matching.max_missing,
        unlock_max_missing: config.matching.unlock_max_missing,
    }
}

fn build_report(
    store: &CatalogStore,
    scope: ScopeFilter,
    options: &DiscoveryOptions,
) -> DiscoveryReport {
    let flies = filtered_flies(store, scope);
    DiscoveryReport::build(
        &flies,
        &store.inventory_snapshot(),
        &store.material_catalog(),
        options,
    )
}

fn print_missing(summary: &FlySummary) {
    let missing: Vec<&str> = summary.missing.iter().map(|m| m.label.as_str()).collect();
    println!(
        "  {} {}: missing {}",
        style("•").yellow(),
        style(&summary.fly_name).bold(),
        missing.join(", ")
    );
}

/// Execute the tie command
pub fn execute_tie(args: &super::TieArgs, config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let mut options = discovery_options(config, args.threshold);
    if let Some(max) = args.max_missing {
        options.max_missing = max;
    }

    let report = build_report(&store, args.scope, &options);

    if args.format == OutputFormat::Json {
        return print_json(&report);
    }

    println!(
        "{} ({} of {})",
        style("Ready to tie").green().bold(),
        report.tieable.len(),
        report.total
    );
    for fly in &report.tieable {
        println!("  {} {}", style("✓").green(), fly.fly_name);
    }

    if !report.almost.is_empty() {
        println!(
            "\n{} (at most {} missing)",
            style("Almost there").yellow().bold(),
            options.max_missing
        );
        for fly in &report.almost {
            print_missing(fly);
        }
    }

    Ok(())
}

/// Execute the unlock command
pub fn execute_unlock(args: &super::UnlockArgs, config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let mut options = discovery_options(config, args.threshold);
    if args.max_missing.is_some() {
        options.unlock_max_missing = args.max_missing;
    }

    let mut report = build_report(&store, args.scope, &options);
    report.leaderboard.truncate(args.limit);

    if args.format == OutputFormat::Json {
        return print_json(&report.leaderboard);
    }

    if report.leaderboard.is_empty() {
        println!("Nothing to buy: every fly is already tie-able");
        return Ok(());
    }

    let names: HashMap<&str, &str> = store
        .flies()
        .iter()
        .map(|f| (f.id.as_str(), f.name.as_str()))
        .collect();

    println!("{}", style("Best next purchases").bold().underlined());
    for candidate in &report.leaderboard {
        let badge = if candidate.resolved {
            style("").dim()
        } else {
            style(" (unlinked)").dim()
        };
        println!(
            "{:>3}. {}{} unlocks {}",
            candidate.rank,
            style(&candidate.label).bold(),
            badge,
            candidate.unlocks()
        );
        let flies: Vec<&str> = candidate
            .unlocked_fly_ids
            .iter()
            .map(|id| names.get(id.as_str()).copied().unwrap_or(id.as_str()))
            .collect();
        println!("     {}", style(flies.join(", ")).dim());
    }

    Ok(())
}

/// Execute the score command
pub fn execute_score(args: &super::ScoreArgs, config: &Config) -> Result<()> {
    let matcher =
        MaterialMatcher::new().with_threshold(args.threshold.unwrap_or(config.matching.threshold));

    for candidate in &args.on_hand {
        let score = crate::matcher::score(&args.required, candidate);
        let mark = if score >= matcher.threshold() {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("{} {:.2} {}", mark, score, candidate);
    }

    match matcher.find_best_match(&args.required, args.on_hand.iter().map(String::as_str)) {
        Some((hit, score)) => println!("\nBest match: {} ({:.2})", style(hit).bold(), score),
        None => println!(
            "\nNo match at threshold {:.2}",
            matcher.threshold()
        ),
    }

    Ok(())
}

/// Execute the config command
pub fn execute_config(args: &super::ConfigArgs, path: Option<&Path>) -> Result<()> {
    use super::ConfigCommands;

    match &args.command {
        ConfigCommands::Show => {
            let config = Config::load_from(path)?;
            println!("{}", toml::to_string_pretty(&config).map_err(|e| FlyboxError::Other(e.to_string()))?);
        }
        ConfigCommands::Reset => {
            Config::reset(path)?;
            println!("Configuration reset to defaults");
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_from(path)?;
            config.set(key, value)?;
            config.save_to(path)?;
            println!("Set {} = {}", key, value);
        }
        ConfigCommands::Get { key } => {
            let config = Config::load_from(path)?;
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else if Config::KEYS.contains(&key.as_str()) {
                println!("{} is not set", key);
            } else {
                println!("Key '{}' not found", key);
            }
        }
        ConfigCommands::Init { force } => {
            let written = Config::init(path, *force)?;
            println!("Configuration initialized at {}", written.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{FliesArgs, FlyCommands, ImportArgs};
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.general.data_dir = Some(dir.path().to_path_buf());
        config.general.auto_yes = true;
        config
    }

    #[test]
    fn test_parse_materials() {
        let tokens = vec!["Hook".to_string(), "Flash@Pearl@opt".to_string()];
        let parsed = parse_materials(&tokens).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].position, 1);
        assert!(!parsed[1].required);

        assert!(parse_materials(&["@Black".to_string()]).is_err());
    }

    #[test]
    fn test_import_then_delete() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let csv = dir.path().join("flies.csv");
        std::fs::write(&csv, "name,category,materials\nZebra Midge,,Hook;Thread@Black\n").unwrap();

        let args = ImportArgs {
            input: csv,
            global: false,
            category: None,
            no_resolve: false,
        };
        assert_eq!(execute_import(&args, &config).unwrap(), 1);
        // second import is all duplicates
        assert_eq!(execute_import(&args, &config).unwrap(), 0);

        let store = open_store(&config).unwrap();
        assert_eq!(store.flies().len(), 1);
        assert_eq!(store.flies()[0].category, "trout");

        let delete = FliesArgs {
            command: FlyCommands::Delete {
                fly: "zebra midge".to_string(),
                yes: false,
            },
        };
        execute_flies(&delete, &config).unwrap();
        assert!(open_store(&config).unwrap().flies().is_empty());
    }

    #[test]
    fn test_delete_global_is_refused() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let add = FliesArgs {
            command: FlyCommands::Add {
                name: "Adams".to_string(),
                category: None,
                materials: vec!["Hook".to_string()],
                sizes: Some("12;14".to_string()),
                global: true,
            },
        };
        execute_flies(&add, &config).unwrap();

        let delete = FliesArgs {
            command: FlyCommands::Delete {
                fly: "Adams".to_string(),
                yes: true,
            },
        };
        assert!(matches!(
            execute_flies(&delete, &config),
            Err(FlyboxError::ReadOnlyFly(_))
        ));

        let store = open_store(&config).unwrap();
        assert_eq!(store.flies()[0].sizes, vec!["12", "14"]);
    }
}
