#[cfg(test)]
mod test {
    use tempfile::tempdir;

    use crate::credential::cookie::{ACCESS_COOKIE, REFRESH_COOKIE};
    use crate::credential::{Credential, CredentialStore, RequestScopedStore, SessionStore};

    #[test]
    fn session_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("cred.json"), false);

        assert!(store.read().is_none(), "empty store reads as unauthenticated");

        let credential = Credential::new("A1", Some("R1".to_owned()));
        store.write(&credential);
        assert_eq!(store.read(), Some(credential));
    }

    #[test]
    fn session_store_mirrors_into_cookies() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("cred.json"), true);

        store.write(&Credential::new("A1", Some("R1".to_owned())));
        let cookies = store.mirrored_cookies();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("auth_token=A1;"));
        assert!(cookies[0].contains("Max-Age=604800"));
        assert!(cookies[0].contains("Secure"));
        assert!(cookies[1].starts_with("refresh_token=R1;"));
        assert!(cookies[1].contains("Max-Age=2592000"));
    }

    #[test]
    fn session_store_clear_removes_everything() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cred.json");
        let store = SessionStore::new(&path, false);

        store.write(&Credential::new("A1", Some("R1".to_owned())));
        store.clear();

        assert!(store.read().is_none());
        assert!(!path.exists());
        let cookies = store.mirrored_cookies();
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    }

    #[test]
    fn session_store_tolerates_garbage_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cred.json");
        std::fs::write(&path, b"not json").unwrap();
        let store = SessionStore::new(&path, false);
        assert!(store.read().is_none());
    }

    #[test]
    fn request_store_reads_inbound_cookies() {
        let store = RequestScopedStore::from_cookie_header(
            Some("theme=dark; auth_token=A1; refresh_token=R1"),
            false,
        );
        let credential = store.read().expect("credential present");
        assert_eq!(credential.access_token, "A1");
        assert_eq!(credential.refresh_token.as_deref(), Some("R1"));
    }

    #[test]
    fn request_store_without_cookies_is_unauthenticated() {
        assert!(RequestScopedStore::empty(false).read().is_none());
        assert!(RequestScopedStore::from_cookie_header(Some("theme=dark"), false)
            .read()
            .is_none());
    }

    #[test]
    fn request_store_write_emits_set_cookies() {
        let store = RequestScopedStore::empty(true);
        store.write(&Credential::new("A1", Some("R1".to_owned())));

        let outbound = store.outbound_cookies();
        assert_eq!(outbound.len(), 2);
        assert!(outbound[0].contains(ACCESS_COOKIE));
        assert!(outbound[0].contains("HttpOnly"));
        assert!(outbound[0].contains("SameSite=Lax"));
        assert!(outbound[0].contains("Secure"));
        assert!(outbound[1].contains(REFRESH_COOKIE));

        // round trip through the in-memory copy
        assert_eq!(store.read().unwrap().access_token, "A1");
    }

    #[test]
    fn request_store_clear_emits_removal_cookies() {
        let store = RequestScopedStore::from_cookie_header(Some("auth_token=A1"), false);
        store.clear();

        assert!(store.read().is_none());
        let outbound = store.outbound_cookies();
        assert_eq!(outbound.len(), 2);
        assert!(outbound.iter().all(|c| c.contains("Max-Age=0")));
    }
}
