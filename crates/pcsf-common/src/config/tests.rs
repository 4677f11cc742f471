#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_default_params_match_published_values() {
        let p = ForestParams::default();
        assert_eq!(p.w, 6.0);
        assert_eq!(p.b, 12.0);
        assert_eq!(p.gb, 0.1);
        assert_eq!(p.d, 6.0);
        assert_eq!(p.mu, 0.04);
        assert_eq!(p.noise, 0.33);
        assert!(p.r.is_none());
        assert_eq!(p.dummy_mode, DummyMode::Terminals);
        assert!(!p.mu_squared);
        assert!(!p.exclude_terminals);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let cfg = ForestConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.run.num_clusters, 1);
        assert_eq!(cfg.run.pruning, PruningMode::Strong);
        assert_eq!(cfg.run.min_edges_for_random_terminals, 50);
        assert_eq!(cfg.run.duplicate_prizes, DuplicatePrizePolicy::Last);
        assert!(cfg.run.include_base_trial);
        assert!(!cfg.run.is_ensemble());
    }

    #[test]
    fn test_toml_accepts_legacy_option_names() {
        let cfg = ForestConfig::from_toml_str(
            r#"
            [params]
            D = 4
            mu = 0.5
            muSquared = true
            excludeTerminals = true
            dummyMode = "all"

            [run]
            noisy_edges_repetitions = 3
            seed = 7
            pruning = "gw"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.params.d, 4.0);
        assert_eq!(cfg.params.mu, 0.5);
        assert!(cfg.params.mu_squared);
        assert!(cfg.params.exclude_terminals);
        assert_eq!(cfg.params.dummy_mode, DummyMode::All);
        assert_eq!(cfg.run.seed, Some(7));
        assert_eq!(cfg.run.pruning, PruningMode::Gw);
        assert!(cfg.run.is_ensemble());
    }

    #[test]
    fn test_yaml_config() {
        let cfg = ForestConfig::from_yaml_str(
            "params:\n  noise: 0.1\n  dummy_mode: others\nrun:\n  random_terminals_repetitions: 2\n",
        )
        .unwrap();
        assert_eq!(cfg.params.noise, 0.1);
        assert_eq!(cfg.params.dummy_mode, DummyMode::Other);
        assert_eq!(cfg.run.random_terminals_repetitions, 2);
    }

    #[test]
    fn test_validate_rejects_negative_mu() {
        let mut cfg = ForestConfig::default();
        cfg.params.mu = -1.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("`mu`"));
    }

    #[test]
    fn test_validate_rejects_zero_clusters() {
        let mut cfg = ForestConfig::default();
        cfg.run.num_clusters = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_pruning_from_str_is_case_insensitive() {
        assert_eq!("STRONG".parse::<PruningMode>().unwrap(), PruningMode::Strong);
        assert_eq!("Simple".parse::<PruningMode>().unwrap(), PruningMode::Simple);
        assert!("fastest".parse::<PruningMode>().is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = ForestConfig::load_from("/nonexistent/pcsf.toml").unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pcsf.yaml");
        std::fs::write(&path, "run:\n  seed: 11\n").unwrap();
        let cfg = ForestConfig::load_from(&path).unwrap();
        assert_eq!(cfg.run.seed, Some(11));
    }

    #[test]
    fn test_example_config_parses() {
        let cfg = ForestConfig::from_toml_str(include_str!("../../../../pcsf.example.toml")).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.solver.command.as_deref(), Some("pcst-solve"));
        assert_eq!(cfg.params.d, 6.0);
        assert_eq!(cfg.run.terminal_rank_jitter, 100.0);
    }
}
