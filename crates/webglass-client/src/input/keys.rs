use webglass_core::protocol::Outbound;

/// Keys forwarded by name. Everything else must be a single printable
/// character to be forwarded, as typed text.
pub const SPECIAL_KEYS: &[&str] = &[
    "Enter",
    "Backspace",
    "Tab",
    "Escape",
    "ArrowUp",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "Delete",
    "Home",
    "End",
    "PageUp",
    "PageDown",
];

/// Map a key name (DOM `KeyboardEvent.key` naming) to the request to send.
pub fn key_request(key: &str) -> Option<Outbound> {
    if SPECIAL_KEYS.contains(&key) {
        return Some(Outbound::Key { key: key.to_string() });
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => Some(Outbound::Type { text: c.to_string() }),
        _ => None,
    }
}
