//! Menus and listings rendered by the dialogue service.

use std::collections::BTreeMap;
use transito_core::catalog::CompleteEntry;
use transito_core::combo::ComboAssignment;
use transito_core::label::LabelCode;
use transito_core::line::LineRoster;
use transito_core::session::{ChatId, Choice, OutboundMessage, Token};

const UNASSIGNED: &str = "—";

pub(crate) fn main_menu(
    chat_id: ChatId,
    roster: &LineRoster,
    combos: &BTreeMap<String, ComboAssignment>,
) -> OutboundMessage {
    let mut text = String::from("Transit report\n\nCurrent assignments:");
    for code in roster.codes() {
        match combos.get(code) {
            Some(combo) => text.push_str(&format!("\n{code}: {combo}")),
            None => text.push_str(&format!("\n{code}: {UNASSIGNED}")),
        }
    }

    OutboundMessage::text(chat_id, text)
        .with_row(vec![Choice::new("Data loading", &Token::SetupMenu)])
        .with_row(vec![Choice::new("Report transit", &Token::StartReport)])
}

pub(crate) fn setup_menu(chat_id: ChatId) -> OutboundMessage {
    OutboundMessage::text(chat_id, "Data loading").with_row(vec![
        Choice::new("Load", &Token::SetupNew),
        Choice::new("View", &Token::SetupView),
        Choice::new("Back", &Token::MainMenu),
    ])
}

/// What the listing shows for one assigned line.
pub(crate) enum LineDetail {
    Ready {
        entry: CompleteEntry,
        label: LabelCode,
    },
    Missing(Vec<&'static str>),
}

pub(crate) fn listing(chat_id: ChatId, lines: &[(String, ComboAssignment, LineDetail)]) -> OutboundMessage {
    if lines.is_empty() {
        return OutboundMessage::text(chat_id, "No records for this chat yet.").with_row(vec![
            Choice::new("Load", &Token::SetupNew),
            Choice::new("Back", &Token::MainMenu),
        ]);
    }

    let blocks: Vec<String> = lines
        .iter()
        .map(|(code, combo, detail)| match detail {
            LineDetail::Ready { entry, label } => format!(
                "{code}: {combo}\nSKU {} | shelf life {} months\nLabel (now):\n{label}",
                entry.sku, entry.shelf_life_months
            ),
            LineDetail::Missing(fields) => format!(
                "{code}: {combo}\nMissing in catalog: {}",
                fields.join(", ")
            ),
        })
        .collect();

    OutboundMessage::text(chat_id, blocks.join("\n\n")).with_row(vec![
        Choice::new("Load", &Token::SetupNew),
        Choice::new("Back", &Token::MainMenu),
    ])
}

pub(crate) fn pick(
    chat_id: ChatId,
    prompt: String,
    values: &[String],
    per_row: usize,
    token: impl Fn(String) -> Token,
) -> OutboundMessage {
    let choices = values
        .iter()
        .map(|value| Choice::new(value, &token(value.clone())))
        .collect();
    OutboundMessage::text(chat_id, prompt).with_grid(choices, per_row)
}
