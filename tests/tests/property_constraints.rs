//! Property constraints checked at commit, one property per kind.

use kith_tests::prelude::*;
use pretty_assertions::assert_eq;

/// A user with a valid username and whatever `f` sets on top.
fn user_with(
    f: impl Fn(&mut Transaction<'_>, User) -> TransactionResult<()> + 'static,
) -> impl Fn(&mut Transaction<'_>, &mut Bindings) -> TransactionResult<()> {
    move |tx: &mut Transaction<'_>, _: &mut Bindings| {
        let user = User::create(tx)?;
        User::USERNAME.set(tx, user, "ann_1".to_string())?;
        f(tx, user)
    }
}

// ========== TEST: null_values_pass ==========
#[test]
fn test_null_values_pass() {
    // GIVEN a user with only the required username
    // WHEN it commits
    // THEN no optional constraint fires on absent values
    Scenario::new("nulls", user_model)
        .step("bare_user", user_with(|_, _| Ok(())), |a| a.committed())
        .run()
        .unwrap();
}

// ========== TEST: required_username ==========
#[test]
fn test_required_username() {
    Scenario::new("required", user_model)
        .step(
            "no_username",
            |tx, _| {
                User::create(tx)?;
                Ok(())
            },
            |a| {
                a.violations(1)
                    .violated("username", "required")
                    .display("username", "required")
            },
        )
        .run()
        .unwrap();
}

// ========== TEST: every_failing_username_constraint_reported ==========
#[test]
fn test_every_failing_username_constraint_reported() {
    Scenario::new("username", user_model)
        .step(
            "bad_username",
            |tx, _| {
                let user = User::create(tx)?;
                User::USERNAME.set(tx, user, "A!".to_string())
            },
            |a| {
                a.violations(3)
                    .violated("username", "length")
                    .violated("username", "regex")
                    .violated("username", "containsNone")
                    .display("username", "should be from 3 to 16 characters long")
                    .display("username", "does not match the pattern")
                    .display("username", "shouldn't contain characters !@#")
            },
        )
        .run()
        .unwrap();
}

// ========== TEST: string_formats ==========
#[test]
fn test_string_formats() {
    Scenario::new("formats", user_model)
        .step(
            "bad_email",
            user_with(|tx, u| User::EMAIL.set(tx, u, "ann@".to_string())),
            |a| a.violations(1).violated("email", "email").display("email", "enter a valid address"),
        )
        .step(
            "good_email",
            user_with(|tx, u| User::EMAIL.set(tx, u, "ann@example.com".to_string())),
            |a| a.committed(),
        )
        .step(
            "relative_homepage",
            user_with(|tx, u| User::HOMEPAGE.set(tx, u, "/home/ann".to_string())),
            |a| a.violated("homepage", "url").display("homepage", "is not a valid URL"),
        )
        .step(
            "https_homepage",
            user_with(|tx, u| User::HOMEPAGE.set(tx, u, "https://example.com/ann".to_string())),
            |a| a.committed(),
        )
        .step(
            "relative_avatar",
            user_with(|tx, u| User::AVATAR.set(tx, u, "img/ann.png".to_string())),
            |a| a.committed(),
        )
        .step(
            "broken_escape_avatar",
            user_with(|tx, u| User::AVATAR.set(tx, u, "img/%zz.png".to_string())),
            |a| a.violated("avatar", "uri").display("avatar", "is not a valid URI"),
        )
        .run()
        .unwrap();
}

// ========== TEST: character_classes ==========
#[test]
fn test_character_classes() {
    Scenario::new("classes", user_model)
        .step(
            "digits_in_first_name",
            user_with(|tx, u| User::FIRST_NAME.set(tx, u, "Ann2".to_string())),
            |a| a.violations(1).violated("first_name", "alpha").display("first_name", "should contain only letters"),
        )
        .step(
            "letters_in_pin",
            user_with(|tx, u| User::PIN.set(tx, u, "12a4".to_string())),
            |a| a.violations(1).violated("pin", "numeric"),
        )
        .step(
            "fractions_in_pin",
            user_with(|tx, u| User::PIN.set(tx, u, "1½²4".to_string())),
            |a| a.violations(1).violated("pin", "numeric").display("pin", "should contain only digits"),
        )
        .step(
            "superscript_in_handle",
            user_with(|tx, u| User::HANDLE.set(tx, u, "ann²".to_string())),
            |a| a.violations(1).violated("handle", "alphaNumeric"),
        )
        .step(
            "space_in_handle",
            user_with(|tx, u| User::HANDLE.set(tx, u, "an n".to_string())),
            |a| {
                a.violations(1)
                    .violated("handle", "alphaNumeric")
                    .display("handle", "should contain only letters and digits")
            },
        )
        .step(
            "all_valid",
            user_with(|tx, u| {
                User::FIRST_NAME.set(tx, u, "Ann".to_string())?;
                User::PIN.set(tx, u, "0042".to_string())?;
                User::HANDLE.set(tx, u, "ann42".to_string())
            }),
            |a| a.committed(),
        )
        .run()
        .unwrap();
}

// ========== TEST: length_messages ==========
#[test]
fn test_length_messages() {
    Scenario::new("lengths", user_model)
        .step(
            "short_pin",
            user_with(|tx, u| User::PIN.set(tx, u, "123".to_string())),
            |a| a.violations(1).violated("pin", "length").display("pin", "must have exactly 4 digits"),
        )
        .step(
            "short_handle",
            user_with(|tx, u| User::HANDLE.set(tx, u, "a".to_string())),
            |a| a.display("handle", "should be at least 2 characters long"),
        )
        .step(
            "long_first_name",
            user_with(|tx, u| User::FIRST_NAME.set(tx, u, "A".repeat(21))),
            |a| a.display("first_name", "should be at most 20 characters long"),
        )
        .run()
        .unwrap();
}

// ========== TEST: numeric_ranges ==========
#[test]
fn test_numeric_ranges() {
    Scenario::new("ranges", user_model)
        .step(
            "negative_age",
            user_with(|tx, u| User::AGE.set(tx, u, -1)),
            |a| a.violations(1).violated("age", "inRange").display("age", "should be at least 0"),
        )
        .step(
            "ancient",
            user_with(|tx, u| User::AGE.set(tx, u, 151)),
            |a| a.display("age", "unrealistic age"),
        )
        .step(
            "boundary_age",
            user_with(|tx, u| User::AGE.set(tx, u, 150)),
            |a| a.committed(),
        )
        .step(
            "rating_too_high",
            user_with(|tx, u| User::RATING.set(tx, u, 5.5)),
            |a| a.violated("rating", "inRange").display("rating", "should be at most 5"),
        )
        .step(
            "rating_in_range",
            user_with(|tx, u| User::RATING.set(tx, u, 4.5)),
            |a| a.committed(),
        )
        .run()
        .unwrap();
}

// ========== TEST: violation_carries_location ==========
#[test]
fn test_violation_carries_location() {
    // GIVEN a user with a bad email
    let mut db = Database::new(user_model().build().unwrap());
    let mut tx = db.begin();
    let user = User::create(&mut tx).unwrap();
    User::USERNAME.set(&mut tx, user, "ann".to_string()).unwrap();
    User::EMAIL.set(&mut tx, user, "nope".to_string()).unwrap();

    // WHEN validating without committing
    let violations = tx.validate().unwrap();

    // THEN the violation names the entity, type and property
    assert_eq!(violations.len(), 1);
    let v = &violations.all()[0];
    assert_eq!(v.entity_id, Some(user.id()));
    assert_eq!(v.type_name.as_deref(), Some("User"));
    assert_eq!(v.property.as_deref(), Some("email"));
    assert_eq!(v.message, "email should be a valid email but was nope");

    // AND fixing the value lets the commit through
    User::EMAIL.set(&mut tx, user, "ann@example.com".to_string()).unwrap();
    tx.commit().unwrap();
    assert_eq!(db.entity_count(), 1);
}

// ========== TEST: rejected_commit_leaves_store_unchanged ==========
#[test]
fn test_rejected_commit_leaves_store_unchanged() {
    let db = Scenario::new("rollback", user_model)
        .step(
            "bad_age",
            user_with(|tx, u| User::AGE.set(tx, u, 999)),
            |a| a.rejected(),
        )
        .run()
        .unwrap();

    assert_eq!(db.entity_count(), 0);
}
