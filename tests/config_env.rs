use scrobstat::config::StatsConfig;
use std::env;
use tempfile::tempdir;
use time::macros::offset;

const VARS: [&str; 3] = ["SCROBSTAT_LOG", "SCROBSTAT_CACHE_DIR", "SCROBSTAT_UTC_OFFSET"];

#[test]
fn env_overrides_defaults_and_is_restored() {
    let dir = tempdir().expect("tempdir");
    let cache_dir = dir.path().join("cache");
    unsafe {
        env::set_var("SCROBSTAT_LOG", dir.path().join("scrobbles.csv"));
        env::set_var("SCROBSTAT_CACHE_DIR", &cache_dir);
        env::set_var("SCROBSTAT_UTC_OFFSET", "+01:00");
    }

    let config = StatsConfig::from_env();
    let bad_offset = {
        unsafe { env::set_var("SCROBSTAT_UTC_OFFSET", "CET") };
        StatsConfig::from_env()
    };

    unsafe {
        for name in VARS {
            env::remove_var(name);
        }
    }

    let config = config.expect("config");
    assert_eq!(config.log_path, dir.path().join("scrobbles.csv"));
    assert_eq!(config.utc_offset, offset!(+1));
    assert!(bad_offset.is_err());

    let created = config.ensure_cache_dir().expect("create");
    assert_eq!(created, cache_dir);
    assert!(cache_dir.is_dir());

    assert!(VARS.iter().all(|name| env::var_os(name).is_none()));
    assert_eq!(StatsConfig::from_env().expect("defaults"), StatsConfig::default());
}
