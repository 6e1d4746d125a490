//! Chat message rendering.

use crate::item::SelectedItem;
use refiner_core::ChatMessage;

/// One `{role, content}` message per selected item that has a role.
pub fn render_messages(selected: &[SelectedItem]) -> Vec<ChatMessage> {
    selected
        .iter()
        .filter_map(|item| {
            item.role
                .map(|role| ChatMessage::new(role.chat_role(), item.content.clone()))
        })
        .collect()
}
