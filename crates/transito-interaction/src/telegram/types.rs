//! Bot API payloads. Only the fields transito reads are modelled.

use crate::transport::IncomingUpdate;
use serde::{Deserialize, Serialize};
use transito_core::session::{Choice, InboundEvent, OutboundMessage};

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseParameters {
    pub retry_after: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub data: Option<String>,
    /// Absent when the button belonged to an inline-mode message.
    pub message: Option<Message>,
}

impl From<Update> for IncomingUpdate {
    fn from(update: Update) -> Self {
        let update_id = update.update_id;

        if let Some(query) = update.callback_query {
            let event = match (query.message, query.data) {
                (Some(message), Some(data)) => Some(InboundEvent::selection(message.chat.id, data)),
                _ => None,
            };
            return Self {
                update_id,
                event,
                callback_id: Some(query.id),
            };
        }

        let event = update
            .message
            .and_then(|message| Some(InboundEvent::text(message.chat.id, message.text?)));
        Self {
            update_id,
            event,
            callback_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: [&'static str; 2],
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerCallbackQueryRequest<'a> {
    pub callback_query_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct InlineKeyboardMarkup<'a> {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton<'a>>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InlineKeyboardButton<'a> {
    pub text: &'a str,
    pub callback_data: &'a str,
}

impl<'a> InlineKeyboardMarkup<'a> {
    pub fn from_choices(rows: &'a [Vec<Choice>]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let inline_keyboard = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|choice| InlineKeyboardButton {
                        text: &choice.label,
                        callback_data: &choice.token,
                    })
                    .collect()
            })
            .collect();
        Some(Self { inline_keyboard })
    }
}

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Splits `message` into sendable requests. Long texts are cut at line
/// boundaries when possible; the keyboard rides on the last part.
pub(crate) fn split_message(message: &OutboundMessage) -> Vec<SendMessageRequest<'_>> {
    let parts = split_text(&message.text, MAX_MESSAGE_CHARS);
    let last = parts.len().saturating_sub(1);
    parts
        .into_iter()
        .enumerate()
        .map(|(idx, text)| SendMessageRequest {
            chat_id: message.chat_id,
            text,
            reply_markup: if idx == last {
                InlineKeyboardMarkup::from_choices(&message.choices)
            } else {
                None
            },
        })
        .collect()
}

fn split_text(text: &str, limit: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;

    while rest.chars().count() > limit {
        let hard_cut = rest
            .char_indices()
            .nth(limit)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let cut = match rest[..hard_cut].rfind('\n') {
            Some(idx) if idx > 0 => idx,
            _ => hard_cut,
        };
        parts.push(&rest[..cut]);
        rest = rest[cut..].strip_prefix('\n').unwrap_or(&rest[cut..]);
    }
    parts.push(rest);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use transito_core::session::{InboundKind, Token};

    #[test]
    fn text_message_becomes_text_event() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 10, "message": {"message_id": 1, "chat": {"id": -55, "type": "group"}, "text": "/start"}}"#,
        )
        .unwrap();
        let incoming = IncomingUpdate::from(update);

        assert_eq!(incoming.update_id, 10);
        assert_eq!(incoming.callback_id, None);
        let event = incoming.event.unwrap();
        assert_eq!(event.chat_id, -55);
        assert_eq!(event.kind, InboundKind::Text("/start".into()));
    }

    #[test]
    fn callback_query_becomes_selection_with_ack_id() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 11, "callback_query": {"id": "cb-1", "from": {"id": 9},
                "data": "t_ll_M1", "message": {"message_id": 2, "chat": {"id": 9}}}}"#,
        )
        .unwrap();
        let incoming = IncomingUpdate::from(update);

        assert_eq!(incoming.callback_id.as_deref(), Some("cb-1"));
        assert_eq!(incoming.event, Some(InboundEvent::selection(9, "t_ll_M1")));
    }

    #[test]
    fn non_text_updates_carry_no_event() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 12, "message": {"message_id": 3, "chat": {"id": 1}, "sticker": {}}}"#,
        )
        .unwrap();
        assert_eq!(IncomingUpdate::from(update).event, None);
    }

    #[test]
    fn keyboard_serializes_rows() {
        let message = OutboundMessage::text(3, "pick").with_row(vec![
            Choice::new("Yes", &Token::AddAnother(true)),
            Choice::new("No", &Token::AddAnother(false)),
        ]);
        let requests = split_message(&message);
        let json = serde_json::to_value(&requests[0]).unwrap();

        assert_eq!(json["chat_id"], 3);
        assert_eq!(json["reply_markup"]["inline_keyboard"][0][1]["callback_data"], "otro_no");
    }

    #[test]
    fn plain_text_has_no_markup() {
        let message = OutboundMessage::text(3, "hi");
        let requests = split_message(&message);
        let json = serde_json::to_value(&requests[0]).unwrap();
        assert!(json.get("reply_markup").is_none());
    }

    #[test]
    fn long_text_splits_on_line_boundaries() {
        let line = "x".repeat(30);
        let text = vec![line.as_str(); 10].join("\n");
        let parts = split_text(&text, 100);

        assert!(parts.iter().all(|p| p.chars().count() <= 100));
        assert!(parts.iter().all(|p| !p.starts_with('\n')));
        assert_eq!(parts.concat().len(), text.len() - (parts.len() - 1));
    }

    #[test]
    fn text_without_newlines_is_cut_hard() {
        let text = "ñ".repeat(250);
        let parts = split_text(&text, 100);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].chars().count(), 50);
    }
}
