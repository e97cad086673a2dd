use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, shellexpand_path, Settings};

fn show(settings: &Settings) {
    let token = if settings.extractor_token().is_some() { "set" } else { "not set" };
    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![Cell::new("data_dir"), Cell::new(&settings.data_dir)]);
    table.add_row(vec![Cell::new("extractor_url"), Cell::new(&settings.extractor_url)]);
    table.add_row(vec![
        Cell::new("extractor_token_env"),
        Cell::new(format!("{} ({token})", settings.extractor_token_env)),
    ]);
    table.add_row(vec![Cell::new("currency_symbol"), Cell::new(&settings.currency_symbol)]);
    println!("{}\n{table}", settings_path().display());
}

pub fn run(
    data_dir: Option<String>,
    extractor_url: Option<String>,
    token_env: Option<String>,
    currency: Option<String>,
) -> Result<()> {
    let mut settings = load_settings();
    let changed = data_dir.is_some() || extractor_url.is_some() || token_env.is_some() || currency.is_some();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(url) = extractor_url {
        settings.extractor_url = url.trim().to_string();
    }
    if let Some(var) = token_env {
        settings.extractor_token_env = var.trim().to_string();
    }
    if let Some(symbol) = currency {
        settings.currency_symbol = symbol;
    }

    if changed {
        save_settings(&settings)?;
        println!("Settings saved.");
    }
    show(&settings);
    Ok(())
}
