use anyhow::Result;
use transito_core::combo::ComboRegistry;
use transito_infrastructure::{AppConfig, JsonComboRepository};

pub async fn execute(config: &AppConfig, chat: i64) -> Result<()> {
    let repo = JsonComboRepository::new(config.combo_path());
    let mut combos = repo.list_for_chat(chat).await?;

    if combos.is_empty() {
        println!("No combos assigned in chat {chat}.");
        return Ok(());
    }

    for code in config.lines.codes() {
        if let Some(combo) = combos.remove(code) {
            println!("{code}: {combo}");
        }
    }
    // Lines that are no longer on the roster.
    for (code, combo) in combos {
        println!("{code}: {combo} (not on roster)");
    }

    Ok(())
}
