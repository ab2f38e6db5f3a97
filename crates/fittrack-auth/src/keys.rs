//! Cache key layout and TTLs.
//!
//! | Key | Value | TTL |
//! |-----|-------|-----|
//! | `user:email:{email}` | credential record (JSON) | 10 minutes |
//! | `user:{id}:data` | user summary (hash) | 30 days |
//! | `profile:{id}` | profile snapshot (JSON) | 24 hours |
//! | `failed:login:{email}` | failed attempt counter | 30 minutes |
//! | `user:{id}:lastActive` | unix millis | 7 days |

use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

pub const CREDENTIAL_TTL: Duration = Duration::from_secs(10 * MINUTE);
pub const USER_SUMMARY_TTL: Duration = Duration::from_secs(30 * DAY);
pub const PROFILE_TTL: Duration = Duration::from_secs(DAY);
pub const FAILED_LOGIN_TTL: Duration = Duration::from_secs(30 * MINUTE);
pub const ACTIVITY_TTL: Duration = Duration::from_secs(7 * DAY);

pub fn credential(email: &str) -> String {
    format!("user:email:{email}")
}

pub fn user_summary(user_id: &str) -> String {
    format!("user:{user_id}:data")
}

pub fn profile(user_id: &str) -> String {
    format!("profile:{user_id}")
}

pub fn failed_login(email: &str) -> String {
    format!("failed:login:{email}")
}

pub fn last_active(user_id: &str) -> String {
    format!("user:{user_id}:lastActive")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(credential("a@b.c"), "user:email:a@b.c");
        assert_eq!(user_summary("u1"), "user:u1:data");
        assert_eq!(profile("u1"), "profile:u1");
        assert_eq!(failed_login("a@b.c"), "failed:login:a@b.c");
        assert_eq!(last_active("u1"), "user:u1:lastActive");
    }

    #[test]
    fn test_ttls() {
        assert_eq!(CREDENTIAL_TTL.as_secs(), 600);
        assert_eq!(FAILED_LOGIN_TTL.as_secs(), 1800);
        assert_eq!(PROFILE_TTL.as_secs(), 86_400);
        assert_eq!(ACTIVITY_TTL.as_secs(), 604_800);
        assert_eq!(USER_SUMMARY_TTL.as_secs(), 2_592_000);
    }
}
