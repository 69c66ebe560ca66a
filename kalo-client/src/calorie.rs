/// Daily calorie recommendation, Mifflin-St Jeor (women) with a light
/// activity factor and a floor under which the result never drops.
pub const MIN_DAILY_CALORIES: u32 = 1200;

const ACTIVITY_FACTOR: f64 = 1.2;

pub fn basal_rate(height_cm: f64, weight_kg: f64, age_years: f64) -> f64 {
    447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age_years
}

pub fn daily_intake(height_cm: f64, weight_kg: f64, age_years: f64) -> u32 {
    let raw = (basal_rate(height_cm, weight_kg, age_years) * ACTIVITY_FACTOR).round();
    (raw as i64).max(i64::from(MIN_DAILY_CALORIES)) as u32
}
