use serde::{Deserialize, Serialize};

/// Bot API envelope: every method returns ok + result or a description.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum ParseMode {
    Markdown,
    #[serde(rename = "HTML")]
    Html,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    pub fn new(rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Self {
            inline_keyboard: rows,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl InlineKeyboardButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(data.into()),
            url: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_web_page_preview: Option<bool>,
}

impl SendMessage {
    pub fn markdown(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: Some(ParseMode::Markdown),
            reply_markup: None,
            disable_web_page_preview: None,
        }
    }

    pub fn html(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: Some(ParseMode::Html),
            reply_markup: None,
            disable_web_page_preview: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.reply_markup = Some(keyboard);
        self
    }

    pub fn without_preview(mut self) -> Self {
        self.disable_web_page_preview = Some(true);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct EditMessageText {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_web_page_preview: Option<bool>,
}

impl EditMessageText {
    pub fn markdown(chat_id: i64, message_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            message_id,
            text: text.into(),
            parse_mode: Some(ParseMode::Markdown),
            reply_markup: None,
            disable_web_page_preview: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.reply_markup = Some(keyboard);
        self
    }

    pub fn without_preview(mut self) -> Self {
        self.disable_web_page_preview = Some(true);
        self
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerCallbackQuery {
    pub callback_query_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_serialization() {
        let keyboard = InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("Market", "menu:market"),
            InlineKeyboardButton::callback("Top Picks", "menu:picks"),
        ]]);
        let msg = SendMessage::markdown(42, "*hello*")
            .with_keyboard(keyboard)
            .without_preview();

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["chat_id"], 42);
        assert_eq!(json["parse_mode"], "Markdown");
        assert_eq!(json["disable_web_page_preview"], true);
        assert_eq!(
            json["reply_markup"]["inline_keyboard"][0][1]["callback_data"],
            "menu:picks"
        );
        // Unset url must not appear in the payload
        assert!(json["reply_markup"]["inline_keyboard"][0][0]
            .get("url")
            .is_none());
    }

    #[test]
    fn test_html_parse_mode_rename() {
        let msg = SendMessage::html(1, "<b>x</b>");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["parse_mode"], "HTML");
    }

    #[test]
    fn test_update_with_callback_query() {
        let body = r#"{
            "update_id": 1001,
            "callback_query": {
                "id": "cb1",
                "from": {"id": 7, "is_bot": false, "first_name": "A", "username": "alice"},
                "message": {"message_id": 5, "chat": {"id": 7, "type": "private"}, "date": 0},
                "data": "stock:AAPL"
            }
        }"#;

        let update: Update = serde_json::from_str(body).unwrap();
        assert_eq!(update.update_id, 1001);
        let cb = update.callback_query.unwrap();
        assert_eq!(cb.data.as_deref(), Some("stock:AAPL"));
        assert_eq!(cb.from.id, 7);
        assert_eq!(cb.message.unwrap().chat.id, 7);
    }

    #[test]
    fn test_error_envelope() {
        let body = r#"{
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests: retry after 5",
            "parameters": {"retry_after": 5}
        }"#;

        let envelope: ApiResponse<Message> = serde_json::from_str(body).unwrap();
        assert!(!envelope.ok);
        assert_eq!(envelope.error_code, Some(429));
        assert_eq!(envelope.parameters.unwrap().retry_after, Some(5));
    }
}
