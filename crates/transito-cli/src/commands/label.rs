use anyhow::{Result, bail};
use transito_application::AppContext;
use transito_core::combo::ComboAssignment;
use transito_core::session::LabelOutcome;
use transito_infrastructure::AppConfig;

pub async fn execute(
    config: &AppConfig,
    line: &str,
    product: String,
    size: String,
    market: String,
) -> Result<()> {
    if config.lines.get(line).is_none() {
        bail!(
            "Unknown filling line {line} (configured: {})",
            config.lines.codes().collect::<Vec<_>>().join(", ")
        );
    }

    let ctx = AppContext::from_config(config);
    let combo = ComboAssignment::new(product, size, market);
    match ctx.machine.label_for(line, &combo).await? {
        LabelOutcome::Ready(label) => println!("{label}"),
        LabelOutcome::MissingCatalog { key, missing } => {
            bail!("{key} cannot be labelled, missing in catalog: {}", missing.join(", "))
        }
    }

    Ok(())
}
