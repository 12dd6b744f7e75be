use backend_lib::auth::{hash_password, verify_password};
use backend_lib::config::HashingSettings;

fn cheap() -> HashingSettings {
    HashingSettings { log_n: 4, r: 8, p: 1 }
}

#[test]
fn test_password_hashing_and_verification() {
    let password = "SecureP@ssw0rd";
    let hash = hash_password(password, &cheap()).unwrap();

    assert_ne!(password, hash);
    assert!(verify_password(&hash, password));
    assert!(!verify_password(&hash, "securep@ssw0rd"));
}

#[test]
fn test_hash_records_its_cost_parameters() {
    let hash = hash_password("pw", &HashingSettings { log_n: 5, r: 8, p: 1 }).unwrap();
    assert!(hash.contains("ln=5"));

    // verification reads the parameters back from the hash
    assert!(verify_password(&hash, "pw"));
}
