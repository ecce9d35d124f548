use super::*;

#[test]
fn parses_compact_units() {
    assert_eq!(parse_expires_in("24h").expect("24h"), Duration::hours(24));
    assert_eq!(parse_expires_in("90s").expect("90s"), Duration::seconds(90));
    assert_eq!(parse_expires_in("15m").expect("15m"), Duration::minutes(15));
    assert_eq!(parse_expires_in("7d").expect("7d"), Duration::days(7));
    assert_eq!(parse_expires_in("2w").expect("2w"), Duration::weeks(2));
}

#[test]
fn parses_long_units_with_whitespace() {
    assert_eq!(
        parse_expires_in(" 30 minutes ").expect("minutes"),
        Duration::minutes(30)
    );
    assert_eq!(parse_expires_in("1 Hour").expect("hour"), Duration::hours(1));
}

#[test]
fn rejects_missing_amount_or_unit() {
    for input in ["", "h", "24", "  "] {
        let err = parse_expires_in(input).expect_err(input);
        assert!(matches!(err, ImpersonationError::InvalidExpiry { .. }), "{input}");
    }
}

#[test]
fn rejects_unknown_unit_and_zero() {
    assert!(parse_expires_in("3 fortnights").is_err());
    assert!(parse_expires_in("0h").is_err());
    assert!(parse_expires_in("-5m").is_err());
}

#[test]
fn rejects_overflowing_amount() {
    assert!(parse_expires_in("99999999999999999999w").is_err());
    assert!(parse_expires_in("9223372036854775807w").is_err());
}
