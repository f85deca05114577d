//! WhatsApp identifier helpers
//!
//! Chats and users are addressed by JIDs of the form `user[:device]@server`.

/// Server suffix for individual accounts
pub const USER_SERVER: &str = "s.whatsapp.net";
/// Legacy server suffix still emitted by some clients
pub const LEGACY_USER_SERVER: &str = "c.us";
/// Server suffix for group chats
pub const GROUP_SERVER: &str = "g.us";
/// Server suffix for channels
pub const NEWSLETTER_SERVER: &str = "newsletter";
/// Chat id used for text statuses
pub const STATUS_BROADCAST: &str = "status@broadcast";

/// Normalize a user identifier so that the same account always maps to the same key.
///
/// Device suffixes are dropped, the legacy `c.us` server is rewritten, and bare phone
/// numbers (optionally written with `+`, spaces or dashes) get the user server appended.
pub fn normalize_user(raw: &str) -> String {
    let raw = raw.trim().trim_start_matches('@').to_lowercase();

    match raw.split_once('@') {
        Some((user, server)) => {
            let user = user.split(':').next().unwrap_or(user);
            let server = if server == LEGACY_USER_SERVER { USER_SERVER } else { server };
            format!("{}@{}", user, server)
        }
        None => {
            let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
            format!("{}@{}", digits, USER_SERVER)
        }
    }
}

/// The user part of a JID, e.g. for `@mentions` in reply text
pub fn user_part(jid: &str) -> &str {
    let user = jid.split('@').next().unwrap_or(jid);
    user.split(':').next().unwrap_or(user)
}

pub fn is_group(jid: &str) -> bool {
    jid.ends_with(&format!("@{}", GROUP_SERVER))
}

pub fn is_newsletter(jid: &str) -> bool {
    jid.ends_with(&format!("@{}", NEWSLETTER_SERVER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_device_suffix() {
        assert_eq!(normalize_user("2547000:12@s.whatsapp.net"), "2547000@s.whatsapp.net");
    }

    #[test]
    fn test_normalize_legacy_server() {
        assert_eq!(normalize_user("2547000@c.us"), "2547000@s.whatsapp.net");
    }

    #[test]
    fn test_normalize_bare_number() {
        assert_eq!(normalize_user("+254 700-000"), "254700000@s.whatsapp.net");
        assert_eq!(normalize_user("@254700000"), "254700000@s.whatsapp.net");
    }

    #[test]
    fn test_normalize_keeps_group_ids() {
        assert_eq!(normalize_user("1203630@G.US"), "1203630@g.us");
    }

    #[test]
    fn test_chat_kinds() {
        assert!(is_group("1203630@g.us"));
        assert!(!is_group("2547000@s.whatsapp.net"));
        assert!(is_newsletter("120363422610520277@newsletter"));
        assert_eq!(user_part("2547000:3@s.whatsapp.net"), "2547000");
    }
}
