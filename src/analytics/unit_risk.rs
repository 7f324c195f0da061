//! Per-unit failure risk scoring
//!
//! Scores each generating unit 0-100 from its uptime, failure transitions
//! and MTBF over the rolling window, and predicts days to the next failure.
//! Buckets are additive across dimensions but only the highest bucket
//! applies within a dimension.

use chrono::NaiveDate;
use itertools::Itertools;

use super::station::count_failures;
use crate::domain::{DailyUnitReading, UnitRisk, UnitRiskLevel};

pub fn analyze(readings: &[DailyUnitReading]) -> Vec<UnitRisk> {
    let keys: Vec<(&str, &str)> = readings
        .iter()
        .map(|r| (r.station.as_str(), r.unit_id.as_str()))
        .unique()
        .collect();

    let mut out: Vec<UnitRisk> = keys
        .into_iter()
        .filter_map(|(station, unit_id)| {
            let rows: Vec<&DailyUnitReading> = readings
                .iter()
                .filter(|r| r.station == station && r.unit_id == unit_id)
                .collect();
            score_unit(&rows)
        })
        .collect();

    out.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
    out
}

fn score_unit(rows: &[&DailyUnitReading]) -> Option<UnitRisk> {
    let latest = rows.last()?;
    let flags: Vec<(NaiveDate, bool)> =
        rows.iter().map(|r| (r.date, r.status.is_online())).collect();

    let total_days = flags.len();
    let online_days = flags.iter().filter(|(_, online)| *online).count();
    let uptime_pct = online_days as f64 / total_days as f64 * 100.0;

    let failure_count = count_failures(&flags);
    let mtbf_days = if failure_count > 0 {
        total_days as f64 / failure_count as f64
    } else {
        total_days as f64
    };

    // Distance from the most recent transition to the end of the window, or
    // the full window when no failure was observed.
    let days_since_last_failure = last_failure_date(&flags)
        .map(|d| (latest.date - d).num_days() as u32)
        .unwrap_or(total_days as u32);

    let predicted_failure_days =
        (mtbf_days - days_since_last_failure as f64).round().max(0.0) as u32;

    let risk_score = score(uptime_pct, failure_count, mtbf_days);

    Some(UnitRisk {
        station: latest.station.clone(),
        engine: latest.engine.clone(),
        unit_id: latest.unit_id.clone(),
        derated_mw: latest.derated_capacity_mw.unwrap_or(0.0),
        uptime_pct,
        failure_count,
        mtbf_days,
        days_since_last_failure,
        predicted_failure_days,
        risk_level: UnitRiskLevel::from_score(risk_score),
        risk_score,
    })
}

/// The day a unit was first seen offline in its most recent failure.
fn last_failure_date(flags: &[(NaiveDate, bool)]) -> Option<NaiveDate> {
    flags
        .windows(2)
        .rev()
        .find(|w| w[0].1 && !w[1].1 && (w[1].0 - w[0].0).num_days() == 1)
        .map(|w| w[1].0)
}

fn score(uptime_pct: f64, failure_count: u32, mtbf_days: f64) -> u32 {
    let mut score = 0;

    score += if uptime_pct < 30.0 {
        40
    } else if uptime_pct < 60.0 {
        25
    } else if uptime_pct < 80.0 {
        10
    } else {
        0
    };

    score += if failure_count >= 5 {
        30
    } else if failure_count >= 3 {
        20
    } else if failure_count >= 1 {
        10
    } else {
        0
    };

    score += if mtbf_days < 15.0 {
        30
    } else if mtbf_days < 30.0 {
        15
    } else {
        0
    };

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UnitStatus;
    use chrono::Days;
    use rstest::rstest;

    fn unit_rows(station: &str, unit_id: &str, statuses: &[bool]) -> Vec<DailyUnitReading> {
        let start = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        statuses
            .iter()
            .enumerate()
            .map(|(i, online)| DailyUnitReading {
                date: start + Days::new(i as u64),
                station: station.into(),
                engine: "Wartsila 9L46".into(),
                unit_id: unit_id.into(),
                derated_capacity_mw: Some(5.7),
                available_capacity_mw: online.then_some(5.7),
                status: if *online { UnitStatus::Online } else { UnitStatus::Offline },
                utilization_pct: Some(80.0),
            })
            .collect()
    }

    #[rstest]
    // highest-matching bucket only, per dimension
    #[case(20.0, 6, 10.0, 100)] // 40 + 30 + 30
    #[case(20.0, 6, 40.0, 70)] // 40 + 30 + 0
    #[case(55.0, 1, 20.0, 50)] // 25 + 10 + 15
    #[case(75.0, 3, 35.0, 30)] // 10 + 20 + 0
    #[case(90.0, 0, 90.0, 0)]
    fn test_score_buckets(
        #[case] uptime: f64,
        #[case] failures: u32,
        #[case] mtbf: f64,
        #[case] expected: u32,
    ) {
        assert_eq!(score(uptime, failures, mtbf), expected);
    }

    #[test]
    fn test_worst_case_unit_is_high_risk() {
        assert_eq!(UnitRiskLevel::from_score(score(20.0, 6, 10.0)), UnitRiskLevel::High);
    }

    #[test]
    fn test_healthy_unit_scores_zero() {
        let rows = unit_rows("Garden Town", "U1", &[true; 30]);
        let out = analyze(&rows);
        let u = &out[0];
        assert_eq!(u.risk_score, 0);
        assert_eq!(u.risk_level, UnitRiskLevel::Low);
        assert_eq!(u.failure_count, 0);
        assert_eq!(u.mtbf_days, 30.0);
        assert_eq!(u.days_since_last_failure, 30);
        assert_eq!(u.predicted_failure_days, 0);
    }

    #[test]
    fn test_days_since_last_failure_and_prediction() {
        // 12 days, transitions at index 4 and 8; last failure 3 days before
        // the window end
        let statuses = [
            true, true, true, true, false, true, true, true, false, true, true, true,
        ];
        let rows = unit_rows("Garden Town", "U2", &statuses);
        let out = analyze(&rows);
        let u = &out[0];
        assert_eq!(u.failure_count, 2);
        assert_eq!(u.mtbf_days, 6.0);
        assert_eq!(u.days_since_last_failure, 3);
        // round(6 - 3) = 3
        assert_eq!(u.predicted_failure_days, 3);
    }

    #[test]
    fn test_sorted_by_score_descending() {
        let mut rows = unit_rows("Garden Town", "Healthy", &[true; 20]);
        rows.extend(unit_rows(
            "Garden Town",
            "Struggling",
            &[true, false, true, false, true, false, true, false, true, false],
        ));
        rows.extend(unit_rows("Riverside", "Middling", &[true, true, false, true, true]));
        let out = analyze(&rows);
        let ids: Vec<&str> = out.iter().map(|u| u.unit_id.as_str()).collect();
        assert_eq!(ids[0], "Struggling");
        assert_eq!(*ids.last().unwrap(), "Healthy");
        assert!(out.windows(2).all(|w| w[0].risk_score >= w[1].risk_score));
    }
}
