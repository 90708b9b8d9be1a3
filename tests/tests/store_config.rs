//! Commit behaviour under different store configurations.

use kith_tests::prelude::*;
use pretty_assertions::assert_eq;

fn bad_username(tx: &mut Transaction<'_>, _: &mut Bindings) -> TransactionResult<()> {
    let user = User::create(tx)?;
    User::USERNAME.set(tx, user, "A!".to_string())?;
    User::AGE.set(tx, user, -3)
}

// ========== TEST: first_failure_per_property ==========
#[test]
fn test_first_failure_per_property() {
    // GIVEN a username failing three constraints and a bad age
    // WHEN validating with the first-failure policy
    // THEN only the first username failure is reported
    Scenario::new("first_per_property", user_model)
        .config(StoreConfig::default().with_validation(ValidationPolicy::FirstPerProperty))
        .step("bad_username", bad_username, |a| {
            a.violations(2)
                .violated("username", "length")
                .violated("age", "inRange")
        })
        .run()
        .unwrap();
}

// ========== TEST: all_failures_by_default ==========
#[test]
fn test_all_failures_by_default() {
    Scenario::new("all", user_model)
        .step("bad_username", bad_username, |a| a.violations(4))
        .run()
        .unwrap();
}

// ========== TEST: reported_violations_capped ==========
#[test]
fn test_reported_violations_capped() {
    Scenario::new("capped", user_model)
        .config(StoreConfig::default().with_max_reported_violations(1))
        .step("bad_username", bad_username, |a| a.violations(1).violated("username", "length"))
        .run()
        .unwrap();
}

// ========== TEST: zero_cap_still_rejects ==========
#[test]
fn test_zero_cap_still_rejects() {
    // GIVEN a cap of zero reported violations
    // WHEN a user without the required username commits
    // THEN the commit is still rejected and reports one violation
    let db = Scenario::new("zero_cap", user_model)
        .config(StoreConfig::default().with_max_reported_violations(0))
        .step(
            "missing_username",
            |tx: &mut Transaction<'_>, _: &mut Bindings| User::create(tx).map(drop),
            |a| a.violations(1).violated("username", "required"),
        )
        .run()
        .unwrap();
    assert_eq!(db.entity_count(), 0);
}

// ========== TEST: link_cardinality_can_be_disabled ==========
#[test]
fn test_link_cardinality_can_be_disabled() {
    // GIVEN a spy without informants, which normally fails to commit
    let step = |tx: &mut Transaction<'_>, _: &mut Bindings| Spy::create(tx).map(drop);

    // THEN it commits when link cardinality is not enforced
    let db = Scenario::new("lenient_links", spy_model)
        .config(StoreConfig::default().with_link_cardinality(false))
        .step("lonely_spy", step, |a| a.committed())
        .run()
        .unwrap();
    assert_eq!(db.entity_count(), 1);

    Scenario::new("strict_links", spy_model)
        .step("lonely_spy", step, |a| a.violated("_informant_", "cardinality"))
        .run()
        .unwrap();
}

// ========== TEST: config_from_file ==========
#[test]
fn test_config_from_file() {
    // GIVEN a TOML file with every setting
    let path = std::env::temp_dir().join(format!("kith-config-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "validation = \"first_per_property\"\n\
         enforce_link_cardinality = false\n\
         max_reported_violations = 10\n",
    )
    .unwrap();

    // WHEN loaded
    let config = StoreConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    // THEN every field is taken from the file
    assert_eq!(
        config,
        StoreConfig::default()
            .with_validation(ValidationPolicy::FirstPerProperty)
            .with_link_cardinality(false)
            .with_max_reported_violations(10)
    );

    // AND the model opens with it
    let db = user_model().open(config.clone()).unwrap();
    assert_eq!(db.config(), &config);
}
