//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use trustcircle::{Circle, Member, Result, TrustCircle, TrustCircleConfig, TrustLevel};
use trustcircle_core::{KdfParams, PasswordKdf, Settings};
use trustcircle_store::MemoryStore;

/// A registered member together with the passphrase that unlocks it.
#[derive(Debug, Clone)]
pub struct TestMember {
    pub member: Member,
    pub passphrase: String,
}

impl TestMember {
    pub fn id(&self) -> &trustcircle::MemberId {
        &self.member.id
    }
}

/// A service over a memory store with cheap KDF settings.
pub struct TestFixture {
    pub tc: TrustCircle<MemoryStore>,
}

impl TestFixture {
    /// Create a new test fixture.
    pub fn new() -> Self {
        Self::with_config(TrustCircleConfig::insecure_fast())
    }

    pub fn with_config(config: TrustCircleConfig) -> Self {
        let tc = match TrustCircle::new(MemoryStore::new(), config) {
            Ok(tc) => tc,
            Err(e) => panic!("crypto provider failed to initialize: {e}"),
        };
        Self { tc }
    }

    /// Register `name` with the passphrase `"{name} passphrase"`.
    pub async fn member(&self, name: &str) -> Result<TestMember> {
        let passphrase = format!("{name} passphrase");
        let member = self.tc.register_member(name, &passphrase).await?;
        Ok(TestMember { member, passphrase })
    }

    /// Create a circle owned by `owner` and grant each of `others` its level.
    pub async fn circle(
        &self,
        name: &str,
        owner: &TestMember,
        others: &[(&TestMember, TrustLevel)],
    ) -> Result<Circle> {
        let (circle, _) = self.tc.create_circle(owner.id(), name).await?;
        for (member, level) in others {
            self.tc
                .add_trustee(owner.id(), &owner.passphrase, &circle.id, member.id(), *level)
                .await?;
        }
        Ok(circle)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Register `count` members named `member-0`, `member-1`, ...
pub async fn multi_member_fixture(count: usize) -> Result<(TestFixture, Vec<TestMember>)> {
    let fixture = TestFixture::new();
    let mut members = Vec::with_capacity(count);
    for i in 0..count {
        members.push(fixture.member(&format!("member-{i}")).await?);
    }
    Ok((fixture, members))
}

/// Settings and KDF for exercising the engines without a service.
pub fn fast_crypto() -> (Settings, PasswordKdf) {
    let settings = Settings::insecure_fast();
    let kdf = match PasswordKdf::new(&KdfParams::insecure_fast()) {
        Ok(kdf) => kdf,
        Err(e) => panic!("fast KDF parameters rejected: {e}"),
    };
    (settings, kdf)
}
