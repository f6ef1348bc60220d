//! Unit tests for token entities

use chrono::{Duration, Utc};

use crate::domain::entities::principal::{Principal, UserRole};
use crate::domain::entities::token::{
    RefreshRecord, TokenClaims, TokenKind, TokenPair, JWT_AUDIENCE, JWT_ISSUER,
};

#[test]
fn test_access_claims_carry_role() {
    let principal = Principal::new("u1", UserRole::PremiumUser);
    let now = Utc::now();
    let claims = TokenClaims::access(&principal, "jti-1", now, now + Duration::hours(1));

    assert_eq!(claims.sub, "u1");
    assert_eq!(claims.role, Some(UserRole::PremiumUser));
    assert_eq!(claims.typ, TokenKind::Access);
    assert_eq!(claims.iss, JWT_ISSUER);
    assert_eq!(claims.aud, JWT_AUDIENCE);
    assert!(claims.exp > now.timestamp());
}

#[test]
fn test_refresh_claims_omit_role() {
    let now = Utc::now();
    let record = RefreshRecord::new("rid", "u1", now, now + Duration::days(30));
    let claims = TokenClaims::refresh(&record);

    assert_eq!(claims.jti, "rid");
    assert_eq!(claims.role, None);
    assert_eq!(claims.typ, TokenKind::Refresh);
    assert_eq!(claims.exp, record.expires_at.timestamp());

    let json = serde_json::to_value(&claims).unwrap();
    assert!(json.get("role").is_none());
    assert_eq!(json["typ"], "refresh");
}

#[test]
fn test_record_expiry() {
    let now = Utc::now();
    let record = RefreshRecord::new("rid", "u1", now - Duration::days(2), now - Duration::days(1));

    assert!(record.is_expired_at(now));
    assert!(!record.is_active_at(now));
    assert!(record.is_active_at(now - Duration::days(2)));
}

#[test]
fn test_record_rotation_is_terminal() {
    let now = Utc::now();
    let mut record = RefreshRecord::new("old", "u1", now, now + Duration::days(1));
    assert!(record.is_active_at(now));

    record.rotate_to("new");
    assert!(record.revoked);
    assert_eq!(record.replaced_by.as_deref(), Some("new"));
    assert!(!record.is_active_at(now));
}

#[test]
fn test_token_pair_is_bearer() {
    let pair = TokenPair::new("a".into(), "r".into(), 3600, 86400);
    assert_eq!(pair.token_type, "Bearer");

    let json = serde_json::to_value(&pair).unwrap();
    assert_eq!(json["expiresIn"], 3600);
    assert_eq!(json["refreshExpiresIn"], 86400);
}
