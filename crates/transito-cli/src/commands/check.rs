use anyhow::{Result, bail};
use transito_application::AppContext;
use transito_core::catalog::CatalogRepository;
use transito_core::conversion::UnitConversionTable;
use transito_infrastructure::config::BOT_TOKEN_ENV;
use transito_infrastructure::AppConfig;

pub async fn execute(config: &AppConfig, has_token: bool) -> Result<()> {
    let ctx = AppContext::from_config(config);
    let mut problems =
        config.diagnostics(ctx.machine.pin_policy(), &UnitConversionTable::default());

    let catalog = &ctx.catalog;
    match catalog.list_all().await {
        Ok(entries) => {
            for (key, entry) in &entries {
                let missing = entry.missing_fields();
                if !missing.is_empty() {
                    problems.push(format!("catalog entry {key} is missing {}", missing.join(", ")));
                }
            }
            println!("Catalog: {} entries in {}", entries.len(), catalog.path().display());
        }
        Err(err) => problems.push(format!("catalog cannot be read: {err}")),
    }

    if !has_token {
        problems.push(format!("{BOT_TOKEN_ENV} is not set"));
    }

    if problems.is_empty() {
        println!("Configuration OK");
        return Ok(());
    }

    for problem in &problems {
        println!("- {problem}");
    }
    bail!("{} problem(s) found", problems.len())
}
