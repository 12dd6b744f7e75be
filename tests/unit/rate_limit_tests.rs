// ==============================
// tests/unit/rate_limit_tests.rs
// ==============================
use backend_lib::auth::AuthRateLimiter;
use backend_lib::config::AuthRateLimitSettings;
use std::net::IpAddr;
use std::time::Duration;

#[test]
fn test_limiter_from_settings() {
    let limiter = AuthRateLimiter::from(&AuthRateLimitSettings {
        max_attempts: 2,
        lockout_secs: 60,
    });
    let ip: IpAddr = "198.51.100.1".parse().unwrap();

    limiter.record_failed_attempt(ip);
    assert!(limiter.check_rate_limit(ip));
    limiter.record_failed_attempt(ip);
    assert!(!limiter.check_rate_limit(ip));

    // cleanup keeps active lockouts
    limiter.cleanup();
    assert!(!limiter.check_rate_limit(ip));
    assert_eq!(limiter.tracked(), 1);
}

#[test]
fn test_ipv6_addresses_are_tracked_separately() {
    let limiter = AuthRateLimiter::new(1, Duration::from_secs(60));
    let a: IpAddr = "2001:db8::1".parse().unwrap();
    let b: IpAddr = "2001:db8::2".parse().unwrap();

    limiter.record_failed_attempt(a);
    assert!(!limiter.check_rate_limit(a));
    assert!(limiter.check_rate_limit(b));
}
