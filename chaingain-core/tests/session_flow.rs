//! End-to-end learning sessions against a mocked backend.

mod common;

use std::sync::Arc;

use chaingain_core::storage::{PersistentStore, ACCOUNT_ID_KEY};
use chaingain_core::{
    CardStage, ChainGainError, Correctness, Deck, Session, SessionStep,
};
use mockito::{Matcher, Server};
use serde_json::json;

const DECK: &str = r#"[
    {"word": "Hallo", "translation": "Hello"},
    {"word": "Tschüss", "translation": "Bye"}
]"#;

#[tokio::test]
async fn test_session_end_to_end() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/createKey")
        .with_status(200)
        .with_body(r#"{"AccId": "0.0.4515", "PubKey": "302a3005", "PrivKey": "3030020100"}"#)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("POST", "/verifyWord")
        .match_body(Matcher::Json(json!({
            "OriginalString": "Hallo",
            "TranslatedString": "Hello",
            "AccId": "0.0.4515",
            "Language": "de",
        })))
        .with_status(200)
        .with_body(r#"{"Correct": true, "CorrectWord": "", "Certificate": "bafy123"}"#)
        .expect(1)
        .create_async()
        .await;
    let broken = server
        .mock("POST", "/verifyWord")
        .match_body(Matcher::PartialJson(json!({"OriginalString": "Tschüss"})))
        .with_status(500)
        .with_body("token service unavailable")
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(common::CountingStore::default());
    let client = common::client(&server.url(), store.clone());
    let account = client.init().await.unwrap();
    assert_eq!(account.account_id, "0.0.4515");
    assert_eq!(store.writes(), 2);

    let deck = Deck::from_json(DECK).unwrap();
    let mut session = Session::new(&deck);

    session.set_input("Hello");
    assert!(matches!(
        client.submit(&mut session).await.unwrap(),
        SessionStep::Verify(_)
    ));
    let state = session.card().state();
    assert_eq!(state.stage, CardStage::ResultShown);
    assert_eq!(state.correct, Correctness::Correct);
    assert_eq!(state.correct_word, None);
    assert_eq!(
        client.certificate_url(state.certificate.as_deref().unwrap()),
        "https://ipfs.io/ipfs/bafy123"
    );

    assert_eq!(
        client.submit(&mut session).await.unwrap(),
        SessionStep::Advanced { index: 1 }
    );

    // A backend failure reads as an incorrect answer.
    session.set_input("Bye");
    client.submit(&mut session).await.unwrap();
    let state = session.card().state();
    assert_eq!(state.stage, CardStage::ResultShown);
    assert_eq!(state.correct, Correctness::Incorrect);
    assert_eq!(state.certificate, None);

    assert_eq!(
        client.submit(&mut session).await.unwrap(),
        SessionStep::Finished
    );
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.card().state().input_value, "Bye");

    let progress = session.progress();
    assert_eq!(progress.correct_answers, 1);
    assert_eq!(progress.certificates, vec!["bafy123".to_string()]);

    create.assert_async().await;
    accepted.assert_async().await;
    broken.assert_async().await;
}

#[tokio::test]
async fn test_identity_survives_restarts() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/createKey")
        .with_status(200)
        .with_body(r#"{"AccId": "0.0.77", "PubKey": "pub", "PrivKey": "priv"}"#)
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(common::CountingStore::default());
    let first = common::client(&server.url(), store.clone());
    first.init().await.unwrap();

    let second = common::client(&server.url(), store.clone());
    let account = second.init().await.unwrap();
    assert_eq!(account.account_id, "0.0.77");
    assert_eq!(store.writes(), 2);
    assert_eq!(
        store.get(ACCOUNT_ID_KEY.to_string()).unwrap().as_deref(),
        Some("0.0.77")
    );
    create.assert_async().await;
}

#[tokio::test]
async fn test_failed_provisioning_blocks_verification() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/createKey")
        .with_status(500)
        .create_async()
        .await;
    let verify = server
        .mock("POST", "/verifyWord")
        .expect(0)
        .create_async()
        .await;

    let store = Arc::new(common::CountingStore::default());
    let client = common::client(&server.url(), store.clone());
    assert!(matches!(
        client.init().await,
        Err(ChainGainError::ProvisioningFailed { .. })
    ));
    assert_eq!(store.writes(), 0);

    let mut session = Session::new(&Deck::from_json(DECK).unwrap());
    session.set_input("Hello");
    assert!(matches!(
        client.submit(&mut session).await,
        Err(ChainGainError::AccountNotReady)
    ));
    assert_eq!(session.card().stage(), CardStage::Editing);
    verify.assert_async().await;
}
