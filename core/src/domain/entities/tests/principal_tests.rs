//! Unit tests for the principal entity

use crate::domain::entities::principal::{Principal, UserRole};

#[test]
fn test_role_wire_names() {
    assert_eq!(serde_json::to_string(&UserRole::FreeUser).unwrap(), "\"FREE_USER\"");
    assert_eq!(serde_json::to_string(&UserRole::PremiumUser).unwrap(), "\"PREMIUM_USER\"");
    assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");

    let role: UserRole = serde_json::from_str("\"ADMIN\"").unwrap();
    assert_eq!(role, UserRole::Admin);
}

#[test]
fn test_role_from_str() {
    assert_eq!("premium_user".parse::<UserRole>().unwrap(), UserRole::PremiumUser);
    assert_eq!(UserRole::Admin.to_string(), "ADMIN");
    assert!("operator".parse::<UserRole>().is_err());
}

#[test]
fn test_new_accounts_default_to_free_user() {
    assert_eq!(UserRole::default(), UserRole::FreeUser);
}

#[test]
fn test_principal_builder() {
    let principal = Principal::new("u1", UserRole::Admin)
        .with_email("admin@example.com")
        .with_name("Admin")
        .with_profile_image("https://cdn.example.com/a.png");

    assert_eq!(principal.id, "u1");
    assert_eq!(principal.role, UserRole::Admin);
    assert_eq!(principal.email, "admin@example.com");
    assert_eq!(principal.profile_image.as_deref(), Some("https://cdn.example.com/a.png"));
}
