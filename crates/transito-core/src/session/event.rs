//! Transport-neutral inbound events and outbound replies.

use super::model::ChatId;
use super::token::Token;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    /// Free text typed by the operator.
    Text(String),
    /// An opaque token identifying a pressed menu choice.
    Selection(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub chat_id: ChatId,
    pub kind: InboundKind,
}

impl InboundEvent {
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            kind: InboundKind::Text(text.into()),
        }
    }

    pub fn selection(chat_id: ChatId, token: impl Into<String>) -> Self {
        Self {
            chat_id,
            kind: InboundKind::Selection(token.into()),
        }
    }

    /// Convenience for building a selection from a typed token.
    pub fn token(chat_id: ChatId, token: &Token) -> Self {
        Self::selection(chat_id, token.to_string())
    }
}

/// A selectable choice: what the operator sees and the token sent back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub token: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, token: &Token) -> Self {
        Self {
            label: label.into(),
            token: token.to_string(),
        }
    }
}

/// A reply for the transport to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    /// Choices grouped into rows. Empty when the reply is plain text.
    pub choices: Vec<Vec<Choice>>,
}

impl OutboundMessage {
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            choices: Vec::new(),
        }
    }

    pub fn with_row(mut self, row: Vec<Choice>) -> Self {
        if !row.is_empty() {
            self.choices.push(row);
        }
        self
    }

    /// Lays `choices` out `per_row` at a time.
    pub fn with_grid(mut self, choices: Vec<Choice>, per_row: usize) -> Self {
        let per_row = per_row.max(1);
        let mut row = Vec::with_capacity(per_row);
        for choice in choices {
            row.push(choice);
            if row.len() == per_row {
                self.choices.push(std::mem::take(&mut row));
            }
        }
        if !row.is_empty() {
            self.choices.push(row);
        }
        self
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.choices.iter().flatten().map(|c| c.token.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_splits_into_rows() {
        let choices = ["M1", "M2", "M3"]
            .iter()
            .map(|code| Choice::new(*code, &Token::Line(code.to_string())))
            .collect();
        let message = OutboundMessage::text(1, "pick").with_grid(choices, 2);
        assert_eq!(message.choices.len(), 2);
        assert_eq!(message.choices[1].len(), 1);
        assert_eq!(message.tokens().collect::<Vec<_>>(), vec!["t_ll_M1", "t_ll_M2", "t_ll_M3"]);
    }
}
