//! Multi-member scenarios built from the fixtures.

use trustcircle::{ReturnCode, TrustLevel};
use trustcircle_testkit::{multi_member_fixture, TestFixture};

#[tokio::test]
async fn every_member_reads_what_the_owner_writes() {
    let (fixture, members) = multi_member_fixture(4).await.unwrap();
    let (owner, readers) = members.split_first().unwrap();

    let grants: Vec<_> = readers.iter().map(|m| (m, TrustLevel::Read)).collect();
    let circle = fixture.circle("board", owner, &grants).await.unwrap();

    let sealed = fixture
        .tc
        .encrypt(owner.id(), &owner.passphrase, &circle.id, b"agenda")
        .await
        .unwrap();

    for reader in readers {
        let plain = fixture
            .tc
            .decrypt(reader.id(), &reader.passphrase, &circle.id, &sealed)
            .await
            .unwrap();
        assert_eq!(plain, b"agenda");
    }
}

#[tokio::test]
async fn circles_are_isolated() {
    let fixture = TestFixture::new();
    let alice = fixture.member("alice").await.unwrap();
    let bob = fixture.member("bob").await.unwrap();

    let board = fixture.circle("board", &alice, &[]).await.unwrap();
    let club = fixture.circle("club", &bob, &[]).await.unwrap();

    let sealed = fixture
        .tc
        .encrypt(alice.id(), &alice.passphrase, &board.id, b"board only")
        .await
        .unwrap();

    // Bob is Sysop of his own circle but not a trustee of Alice's.
    let err = fixture
        .tc
        .decrypt(bob.id(), &bob.passphrase, &board.id, &sealed)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::AuthorizationWarning);

    // Data from one circle does not open under another circle's key.
    let err = fixture
        .tc
        .decrypt(bob.id(), &bob.passphrase, &club.id, &sealed)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::IntegrityWarning);
}

#[tokio::test]
async fn listings_track_membership() {
    let fixture = TestFixture::new();
    let alice = fixture.member("alice").await.unwrap();
    let bob = fixture.member("bob").await.unwrap();

    fixture.circle("board", &alice, &[(&bob, TrustLevel::Write)]).await.unwrap();
    fixture.circle("club", &bob, &[]).await.unwrap();

    let names: Vec<String> = fixture
        .tc
        .list_circles(bob.id())
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["board".to_string(), "club".to_string()]);
    assert_eq!(fixture.tc.list_circles(alice.id()).await.unwrap().len(), 1);
}

#[test]
fn settings_load_from_json() {
    let json = serde_json::json!({
        "kdf": { "memory_kib": 1024, "iterations": 1, "parallelism": 1 },
        "salt_charset": "latin1",
        "min_passphrase_len": 12
    });

    let config = trustcircle::TrustCircleConfig::from_json(&json.to_string()).unwrap();
    assert_eq!(config.settings.min_passphrase_len, 12);
    assert_eq!(config.settings.salt_charset, trustcircle_core::Charset::Latin1);
}
