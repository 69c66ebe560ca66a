use kalo_client::calorie;

#[test]
fn basal_rate_follows_the_formula() {
    let rate = calorie::basal_rate(170.0, 70.0, 25.0);
    assert!((rate - 1513.293).abs() < 1e-9);
}

#[test]
fn the_seeded_profile_lands_on_its_known_value() {
    assert_eq!(calorie::daily_intake(170.0, 70.0, 25.0), 1816);
}

#[test]
fn the_floor_holds_for_small_frames() {
    assert_eq!(
        calorie::daily_intake(100.0, 30.0, 80.0),
        calorie::MIN_DAILY_CALORIES
    );
}
