use figment::Jail;
use heat_config::HeatConfig;

#[test]
fn env_overrides_nested_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("HEAT_DATABASE__PATH", ":memory:");
        jail.set_env("HEAT_SCHEDULER__ENFORCE_CAPACITY", "true");
        jail.set_env("HEAT_SCHEDULER__DEFAULT_MAX_PER_HEAT", "16");

        let config = HeatConfig::load().expect("config loads");
        assert!(config.database.is_in_memory());
        assert!(config.scheduler.enforce_capacity);
        assert_eq!(config.scheduler.default_max_per_heat, 16);
        Ok(())
    });
}

#[test]
fn invalid_env_capacity_fails_validation() {
    Jail::expect_with(|jail| {
        jail.set_env("HEAT_SCHEDULER__DEFAULT_MAX_PER_HEAT", "0");
        assert!(HeatConfig::load().is_err());
        Ok(())
    });
}
