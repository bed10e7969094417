//! Anonymous player identity

use crate::rng::fill_random;
use crate::store::KeyValue;

/// Key under which the player id is kept
pub const USER_ID_KEY: &str = "quiz_user_id";

/// A fresh random id in UUID v4 layout
pub fn new_id() -> String {
    let mut bytes = [0u8; 16];
    fill_random(&mut bytes);
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}

/// The stored player id, generated and saved on first use.
///
/// If the backend cannot be read or written the id lives for this session only.
pub fn user_id(kv: &dyn KeyValue) -> String {
    match kv.get(USER_ID_KEY) {
        Ok(Some(id)) if !id.trim().is_empty() => return id,
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "failed to read user id"),
    }

    let id = new_id();
    if let Err(e) = kv.set(USER_ID_KEY, &id) {
        tracing::warn!(error = %e, "failed to persist user id, using a session id");
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKv;

    #[test]
    fn test_new_id_is_v4() {
        let id = new_id();
        let parsed = uuid::Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_ne!(new_id(), id);
    }

    #[test]
    fn test_user_id_is_stable() {
        let kv = MemoryKv::new();
        let first = user_id(&kv);
        assert_eq!(user_id(&kv), first);
        assert_eq!(kv.get(USER_ID_KEY).unwrap(), Some(first));
    }

    #[test]
    fn test_user_id_without_storage() {
        crate::test_logging::init();
        let kv = MemoryKv::new();
        kv.set_available(false);
        let id = user_id(&kv);
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }
}
