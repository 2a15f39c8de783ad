use anyhow::{Context, Result};
use cadenza_etl::{config, Config};
use toml_edit::{value, Array, DocumentMut};

const PATH_KEYS: &[&str] = &["dataset_path", "index_path", "similarity_path"];
const COLUMN_KEYS: &[&str] = &["columns.title", "columns.artist", "columns.album"];
const NUMBER_KEYS: &[&str] = &[
    "cards_per_row",
    "recommendations.min",
    "recommendations.max",
    "recommendations.default",
];

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    println!("  dataset_path: {}", config.dataset_path.display());
    println!("  index_path: {}", config.index_path.display());
    println!("  similarity_path: {}", config.similarity_path.display());
    println!("  columns.title: {}", config.columns.title);
    println!("  columns.artist: {}", config.columns.artist);
    println!("  columns.album: {}", config.columns.album);
    if config.text_columns.is_empty() {
        println!("  text_columns: <title, artist, album>");
    } else {
        println!("  text_columns: {}", config.text_columns.join(", "));
    }
    println!(
        "  recommendations: {}..={} (default {})",
        config.recommendations.min, config.recommendations.max, config.recommendations.default
    );
    println!("  cards_per_row: {}", config.cards_per_row);
    println!("  logging.level: {:?}", config.logging.level());
    println!("  logging.coloured: {}", config.logging.coloured());
    println!("  logging.output: {:?}", config.logging.output());

    println!("\nPriority: CLI args > ENV vars (CADENZA_*) > Config file > Defaults");

    Ok(())
}

/// Get a specific config value.
pub fn get_config(key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        let config = Config::load()?;
        let tree = serde_json::to_value(&config).context("Failed to serialize config")?;
        let pointer = format!("/{}", key.replace('.', "/"));

        match tree.pointer(&pointer) {
            Some(serde_json::Value::String(s)) => println!("{}", s),
            Some(other) => println!("{}", other),
            None => anyhow::bail!("Unknown config key: {}\n\nValid keys: {}", key, valid_keys()),
        }
    } else {
        // No key provided, show entire config file contents
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            print!("{}", contents);
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'cadenza config init' to create it.");
        }
    }

    Ok(())
}

/// Set a config value.
pub fn set_config(key: String, value: String) -> Result<()> {
    let config_path = config::config_file_path();

    config::ensure_config_file()?;

    let contents = std::fs::read_to_string(&config_path)
        .context("Failed to read config file")?;
    let updated = update_config_text(&contents, &key, &value)?;

    // Refuse to write a file that would not load
    let config: Config = toml::from_str(&updated).context("Updated config does not parse")?;
    config.validate()?;

    std::fs::write(&config_path, updated)
        .context("Failed to write config file")?;

    println!("✓ Updated {} = {}", key, value);
    println!("  in {}", config_path.display());

    Ok(())
}

/// Set `key` to `raw` in a TOML document, keeping its comments and layout.
pub fn update_config_text(contents: &str, key: &str, raw: &str) -> Result<String> {
    let mut doc: DocumentMut = contents.parse().context("Failed to parse config file")?;

    let item = if PATH_KEYS.contains(&key) || COLUMN_KEYS.contains(&key) {
        value(raw)
    } else if NUMBER_KEYS.contains(&key) {
        let n: i64 = raw
            .parse()
            .with_context(|| format!("{} must be a whole number, got {:?}", key, raw))?;
        if n < 1 {
            anyhow::bail!("{} must be at least 1", key);
        }
        value(n)
    } else if key == "text_columns" {
        let columns: Array = raw
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        value(columns)
    } else {
        anyhow::bail!("Unknown config key: {}\n\nValid keys: {}", key, valid_keys());
    };

    match key.split_once('.') {
        Some((section, field)) => {
            let table = doc
                .entry(section)
                .or_insert(toml_edit::table())
                .as_table_mut()
                .ok_or_else(|| anyhow::anyhow!("[{}] in the config file is not a table", section))?;
            table[field] = item;
        }
        None => doc[key] = item,
    }

    Ok(doc.to_string())
}

fn valid_keys() -> String {
    PATH_KEYS
        .iter()
        .chain(COLUMN_KEYS)
        .chain(NUMBER_KEYS)
        .chain(&["text_columns"])
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    let config_path = config::config_file_path();
    println!("{}", config_path.display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure cadenza.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
