//! Tests for account value types and the photo collection rules.

use super::*;
use rstest::{fixture, rstest};

fn stored(id: &str) -> StoredPhoto {
    StoredPhoto {
        id: PhotoId::new(id).expect("valid photo id"),
        url: format!("https://img.test/{id}.jpg"),
    }
}

fn photo_id(id: &str) -> PhotoId {
    PhotoId::new(id).expect("valid photo id")
}

#[fixture]
fn carol() -> Account {
    Account::new(
        AccountId::random(),
        Username::new("carol").expect("username"),
        Email::new("carol@example.com").expect("email"),
        DisplayName::new("Carol").expect("display name"),
    )
}

#[rstest]
#[case("", AccountValidationError::EmptyUsername)]
#[case("  ", AccountValidationError::EmptyUsername)]
#[case("ab", AccountValidationError::UsernameTooShort { min: USERNAME_MIN })]
#[case("bad name", AccountValidationError::UsernameInvalidCharacters)]
fn invalid_usernames_are_rejected(#[case] raw: &str, #[case] expected: AccountValidationError) {
    assert_eq!(Username::new(raw), Err(expected));
}

#[rstest]
fn overlong_usernames_are_rejected() {
    let raw = "a".repeat(USERNAME_MAX + 1);
    assert_eq!(
        Username::new(raw),
        Err(AccountValidationError::UsernameTooLong { max: USERNAME_MAX })
    );
}

#[rstest]
fn usernames_normalise_case_for_uniqueness() {
    let upper = Username::new("Alice").expect("valid");
    let lower = Username::new("alice").expect("valid");
    assert_ne!(upper, lower);
    assert_eq!(upper.normalized(), lower.normalized());
}

#[rstest]
#[case("", AccountValidationError::EmptyEmail)]
#[case("not-an-email", AccountValidationError::InvalidEmail)]
#[case("a@b", AccountValidationError::InvalidEmail)]
#[case("two@@example.com", AccountValidationError::InvalidEmail)]
fn invalid_emails_are_rejected(#[case] raw: &str, #[case] expected: AccountValidationError) {
    assert_eq!(Email::new(raw), Err(expected));
}

#[rstest]
fn emails_are_trimmed_and_lower_cased() {
    let email = Email::new("  Bob@Example.COM ").expect("valid");
    assert_eq!(email.as_ref(), "bob@example.com");
}

#[rstest]
fn blank_display_names_are_rejected() {
    assert_eq!(
        DisplayName::new("   "),
        Err(AccountValidationError::EmptyDisplayName)
    );
}

#[rstest]
fn validation_errors_become_field_level_invalid_requests() {
    let error: Error = AccountValidationError::InvalidEmail.into();
    assert_eq!(error.code(), crate::domain::ErrorCode::InvalidRequest);
    assert_eq!(error.field("email"), Some("email must be a valid address"));
}

#[rstest]
fn first_photo_becomes_main(mut carol: Account) {
    let photo = carol.add_photo(stored("one"));
    assert!(photo.is_main());
    assert_eq!(carol.image_url(), Some("https://img.test/one.jpg"));
}

#[rstest]
fn later_photos_do_not_replace_main(mut carol: Account) {
    carol.add_photo(stored("one"));
    let second = carol.add_photo(stored("two"));

    assert!(!second.is_main());
    assert_eq!(carol.main_photo().map(|p| p.id().as_ref()), Some("one"));
}

#[rstest]
fn removing_main_photo_is_refused(mut carol: Account) {
    carol.add_photo(stored("one"));
    carol.add_photo(stored("two"));

    assert_eq!(
        carol.remove_photo(&photo_id("one")),
        Err(PhotoRemovalError::IsMain)
    );
    assert_eq!(carol.photos().len(), 2);
}

#[rstest]
fn removing_unknown_photo_reports_not_found(mut carol: Account) {
    assert_eq!(
        carol.remove_photo(&photo_id("ghost")),
        Err(PhotoRemovalError::NotFound)
    );
}

#[rstest]
fn promoting_a_photo_demotes_the_previous_main(mut carol: Account) {
    carol.add_photo(stored("one"));
    carol.add_photo(stored("two"));

    assert_eq!(
        carol.set_main_photo(&photo_id("two")),
        Some(MainPhotoChange::Promoted)
    );
    assert_eq!(carol.main_photo().map(|p| p.id().as_ref()), Some("two"));
    assert!(carol.has_consistent_main_photo());
    assert_eq!(
        carol.set_main_photo(&photo_id("two")),
        Some(MainPhotoChange::Unchanged)
    );
    assert_eq!(carol.set_main_photo(&photo_id("ghost")), None);
}

#[rstest]
fn main_photo_rule_holds_across_add_and_remove_sequences(mut carol: Account) {
    assert!(carol.has_consistent_main_photo());
    for round in 0..5 {
        carol.add_photo(stored(&format!("p{round}a")));
        carol.add_photo(stored(&format!("p{round}b")));
        assert!(carol.has_consistent_main_photo());

        let removable: Vec<PhotoId> = carol
            .photos()
            .iter()
            .filter(|photo| !photo.is_main())
            .map(|photo| photo.id().clone())
            .collect();
        for id in removable {
            carol.remove_photo(&id).expect("non-main photo is removable");
            assert!(carol.has_consistent_main_photo());
        }
        assert_eq!(carol.photos().len(), 1);
    }
}

#[rstest]
fn rehydrated_photos_without_main_promote_the_first(carol: Account) {
    let account = carol.with_photos(vec![
        Photo::new(photo_id("a"), "https://img.test/a.jpg", false),
        Photo::new(photo_id("b"), "https://img.test/b.jpg", false),
    ]);
    assert_eq!(account.main_photo().map(|p| p.id().as_ref()), Some("a"));
}

#[rstest]
#[case("  a new bio ", Some("a new bio"))]
#[case("   ", None)]
fn set_bio_trims_and_clears(mut carol: Account, #[case] raw: &str, #[case] expected: Option<&str>) {
    carol.set_bio("previous");
    carol.set_bio(raw);
    assert_eq!(carol.bio(), expected);
}
