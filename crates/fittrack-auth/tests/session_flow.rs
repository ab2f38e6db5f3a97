//! End-to-end sign-in, session and invalidation flows over the in-process
//! cache.

mod common;

use std::sync::Arc;

use common::{EMAIL, FailingCache, FailingStore, Harness, PASSWORD, USER_ID, seeded_store};
use fittrack_auth::{
    AccountEvent, AuthError, CacheInvalidator, CredentialVerifier, Credentials,
    DEFAULT_SESSION_MAX_AGE, ProfileRecord, ProfileResolver, RedirectPolicyGate, SessionCodec,
    SessionMaterializer, SessionToken,
};
use fittrack_cache::{CacheStore, MemoryCache};

#[tokio::test]
async fn test_sign_in_then_materialize_on_cold_cache() {
    let h = Harness::new();

    let identity = h
        .verifier
        .verify(&Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap();
    let token = h.sessions.issue_token(&identity).await;
    let view = h.sessions.materialize(&token).await;
    h.sessions.flush_background().await;

    assert_eq!(view.id, identity.id);
    assert_eq!(view.email, identity.email);
    assert_eq!(view.name, identity.name);
    assert_eq!(view.image, identity.image);
    assert_eq!(view.profile, None);
    assert!(!h.cache.contains_key("failed:login:ana@example.com"));
}

#[tokio::test]
async fn test_failed_attempts_increase_then_reset() {
    let h = Harness::new();
    let bad = Credentials::new(EMAIL, "nope");

    let mut last = 0;
    for _ in 0..3 {
        assert!(matches!(
            h.verifier.verify(&bad).await,
            Err(AuthError::InvalidCredentials)
        ));
        let count = h.verifier.failed_attempts(EMAIL).await;
        assert!(count > last);
        last = count;
    }

    h.verifier
        .verify(&Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap();
    assert_eq!(h.verifier.failed_attempts(EMAIL).await, 0);
}

#[tokio::test]
async fn test_unknown_user_and_bad_password_look_identical() {
    let h = Harness::new();

    let unknown = h
        .verifier
        .verify(&Credentials::new("ghost@example.com", PASSWORD))
        .await
        .unwrap_err();
    let wrong = h
        .verifier
        .verify(&Credentials::new(EMAIL, "nope"))
        .await
        .unwrap_err();

    assert_eq!(unknown.to_string(), wrong.to_string());
    assert_eq!(unknown.error_code(), wrong.error_code());
}

#[tokio::test]
async fn test_sign_out_forces_fresh_store_reads() {
    let h = Harness::new();
    h.set_profile(Some("170"), Some("65"));

    let identity = h
        .verifier
        .verify(&Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap();
    let token = h.sessions.issue_token(&identity).await;
    h.sessions.materialize(&token).await;
    h.sessions.flush_background().await;

    let before = h.store.stats();
    h.sessions.materialize(&token).await;
    h.sessions.flush_background().await;
    assert_eq!(h.store.stats(), before, "warm cache should not touch the store");

    h.invalidator.on_sign_out(USER_ID).await;
    let view = h.sessions.materialize(&token).await;
    h.sessions.flush_background().await;

    let after = h.store.stats();
    assert_eq!(after.user_by_id, before.user_by_id + 1);
    assert_eq!(after.profile_by_user_id, before.profile_by_user_id + 1);
    assert_eq!(view.profile.and_then(|p| p.height), Some(170.0));
}

#[tokio::test]
async fn test_profile_update_is_visible_after_event() {
    let h = Harness::new();
    h.set_profile(Some("170"), Some("65"));
    let token = SessionToken {
        id: USER_ID.to_string(),
        email: EMAIL.to_string(),
        name: None,
        image: None,
    };

    let view = h.sessions.materialize(&token).await;
    assert_eq!(view.profile.and_then(|p| p.current_weight), Some(65.0));

    h.set_profile(Some("170"), Some("63.5"));
    h.invalidator
        .handle(&AccountEvent::ProfileUpdated {
            user_id: USER_ID.to_string(),
        })
        .await;

    let view = h.sessions.materialize(&token).await;
    h.sessions.flush_background().await;
    assert_eq!(view.profile.and_then(|p| p.current_weight), Some(63.5));
}

#[tokio::test]
async fn test_new_user_replaces_cached_credentials() {
    let h = Harness::new();
    h.verifier
        .verify(&Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap();
    assert!(h.cache.contains_key("user:email:ana@example.com"));

    h.invalidator
        .handle(&AccountEvent::UserCreated {
            email: EMAIL.to_string(),
        })
        .await;
    assert!(!h.cache.contains_key("user:email:ana@example.com"));
}

#[tokio::test]
async fn test_onboarding_redirect() {
    let h = Harness::new();
    let base = "https://fittrack.example.com";
    let target = "https://fittrack.example.com/dashboard";

    assert_eq!(
        h.gate.decide(target, base, Some(USER_ID)).await.unwrap(),
        "https://fittrack.example.com/"
    );

    h.set_profile(Some("170"), None);
    h.invalidator.on_profile_updated(USER_ID).await;
    assert_eq!(h.gate.decide(target, base, Some(USER_ID)).await.unwrap(), target);
}

#[tokio::test]
async fn test_store_outage() {
    let cache = Arc::new(MemoryCache::new());
    let store = Arc::new(FailingStore);

    let verifier = fittrack_auth::CredentialVerifier::new(cache.clone(), store.clone());
    let err = verifier
        .verify(&Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Storage { .. }));

    let sessions = SessionMaterializer::new(cache.clone(), store.clone());
    let token = SessionToken {
        id: USER_ID.to_string(),
        email: EMAIL.to_string(),
        name: Some("Ana".to_string()),
        image: None,
    };
    let view = sessions.materialize(&token).await;
    assert_eq!(view.profile, None);
    assert_eq!(view.name.as_deref(), Some("Ana"));

    let err = sessions.materialize_with_profile(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::ProfileUnavailable { .. }));
    sessions.flush_background().await;

    let gate = RedirectPolicyGate::new(ProfileResolver::new(cache.clone(), store.clone()));
    let err = gate
        .decide("/dashboard", "https://fittrack.example.com", Some(USER_ID))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::ProfileUnavailable { .. }));

    // A failed refresh must not leave the old snapshot in place.
    cache
        .set(
            "profile:u1",
            r#"{"height":170.0}"#,
            std::time::Duration::from_secs(60),
        )
        .await
        .unwrap();
    CacheInvalidator::new(cache.clone(), store)
        .on_profile_updated(USER_ID)
        .await;
    assert!(!cache.contains_key("profile:u1"));
}

#[tokio::test]
async fn test_every_cache_write_has_ttl() {
    let h = Harness::new();
    h.set_profile(Some("180"), Some("80"));

    let _ = h.verifier.verify(&Credentials::new(EMAIL, "nope")).await;
    let identity = h
        .verifier
        .verify(&Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap();
    let token = h.sessions.issue_token(&identity).await;
    h.sessions.materialize(&token).await;
    h.invalidator.on_profile_updated(USER_ID).await;
    h.sessions.flush_background().await;

    assert!(!h.cache.is_empty());
    assert!(h.cache.keys_without_expiry().is_empty());
}

#[tokio::test]
async fn test_session_token_survives_codec() {
    let h = Harness::new();
    let codec = SessionCodec::new(b"integration-secret", DEFAULT_SESSION_MAX_AGE);

    let identity = h
        .verifier
        .verify(&Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap();
    let token = h.sessions.issue_token(&identity).await;
    let jwt = codec.encode(&token).unwrap();

    let decoded = codec.decode(&jwt).unwrap();
    let view = h.sessions.materialize(&decoded).await;
    h.sessions.flush_background().await;
    assert_eq!(view.id, USER_ID);
}

#[tokio::test]
async fn test_cache_outage_falls_back_to_store() {
    let cache: Arc<dyn CacheStore> = Arc::new(FailingCache);
    let store = seeded_store();
    store.upsert_profile(ProfileRecord {
        user_id: USER_ID.to_string(),
        height: Some("168".to_string()),
        current_weight: Some("61".to_string()),
    });
    let verifier = CredentialVerifier::new(cache.clone(), store.clone());
    let sessions = SessionMaterializer::new(cache.clone(), store.clone());
    let invalidator = CacheInvalidator::new(cache.clone(), store.clone());
    let gate = RedirectPolicyGate::new(sessions.profiles().clone());

    let identity = verifier
        .verify(&Credentials::new(EMAIL, PASSWORD))
        .await
        .expect("correct password accepted without a cache");
    assert_eq!(identity.id, USER_ID);

    let err = verifier
        .verify(&Credentials::new(EMAIL, "wrong password"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(verifier.failed_attempts(EMAIL).await, 0);

    let token = sessions.issue_token(&identity).await;
    let view = sessions.materialize(&token).await;
    assert_eq!(view.id, USER_ID);
    assert_eq!(view.name, identity.name);
    let profile = view.profile.expect("profile read from store");
    assert_eq!(profile.height, Some(168.0));
    assert_eq!(profile.current_weight, Some(61.0));

    let view = sessions.materialize_with_profile(&token).await.unwrap();
    assert!(view.profile.is_some());

    let target = "https://fittrack.example.com/app/workouts";
    assert_eq!(
        gate.decide(target, "https://fittrack.example.com/app", Some(USER_ID))
            .await
            .unwrap(),
        target
    );

    invalidator.on_sign_out(USER_ID).await;
    invalidator.on_profile_updated(USER_ID).await;
    sessions.flush_background().await;
    assert!(store.stats().profile_by_user_id >= 3);
}
