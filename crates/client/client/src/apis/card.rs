use serde_json::{Map, Value, json};

use super::{Receiver, message_id};
use crate::client::Shared;
use crate::mode::ExecutionMode;
use crate::request::ApiRequest;

const CARD_SEND: &str = "/message/v4/send/";
const EPHEMERAL_SEND: &str = "/ephemeral/v1/send";
const EPHEMERAL_DELETE: &str = "/ephemeral/v1/delete";

/// Interactive message cards.
#[derive(Clone)]
pub struct CardApi<M> {
    shared: Shared<M>,
}

impl<M: ExecutionMode> CardApi<M> {
    pub(crate) fn new(shared: Shared<M>) -> Self {
        Self { shared }
    }

    /// Sends a card and returns the message id.
    pub fn send(&self, receiver: Receiver, card: Value) -> M::Output<Option<String>> {
        self.send_card(receiver, card, None)
    }

    /// Sends a card shared by everyone in the chat: an update made for one
    /// user is shown to all.
    pub fn send_shared(&self, receiver: Receiver, card: Value) -> M::Output<Option<String>> {
        self.send_card(receiver, card, Some(true))
    }

    /// Sends a card only `open_id` can see in the group chat `chat_id`.
    pub fn send_ephemeral(
        &self,
        chat_id: impl Into<String>,
        open_id: impl Into<String>,
        card: Value,
    ) -> M::Output<Option<String>> {
        let body = json!({
            "chat_id": chat_id.into(),
            "open_id": open_id.into(),
            "msg_type": "interactive",
            "card": card,
        });
        self.shared.call(move |core| async move {
            let data = core
                .request(ApiRequest::post(EPHEMERAL_SEND).json(body))
                .await?;
            Ok(message_id(&data))
        })
    }

    /// Deletes an ephemeral card.
    pub fn delete_ephemeral(&self, message_id: impl Into<String>) -> M::Output<()> {
        let body = json!({ "message_id": message_id.into() });
        self.shared.call(move |core| async move {
            core.request(ApiRequest::post(EPHEMERAL_DELETE).json(body))
                .await?;
            Ok(())
        })
    }

    fn send_card(
        &self,
        receiver: Receiver,
        card: Value,
        update_multi: Option<bool>,
    ) -> M::Output<Option<String>> {
        let mut body = Map::new();
        receiver.write_to(&mut body);
        body.insert("msg_type".to_string(), Value::from("interactive"));
        body.insert("card".to_string(), card);
        if let Some(update_multi) = update_multi {
            body.insert("update_multi".to_string(), Value::Bool(update_multi));
        }

        self.shared.call(move |core| async move {
            let data = core
                .request(ApiRequest::post(CARD_SEND).json(Value::Object(body)))
                .await?;
            Ok(message_id(&data))
        })
    }
}
