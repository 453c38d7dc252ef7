//! Layered configuration loading.

use super::test_utils::with_xdg_env;
use catalog_strata::config::{global_config_path, ConfigLoader};
use catalog_strata::schema::SchemaRegistry;
use tempfile::TempDir;

#[test]
fn test_global_config_path_uses_xdg_config_home() {
    let dir = TempDir::new().unwrap();
    let path = with_xdg_env(&dir, global_config_path).unwrap();
    assert_eq!(path, dir.path().join("catalog-strata").join("config.toml"));
}

#[test]
fn test_environment_overrides_files() {
    let xdg = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    std::fs::create_dir_all(workspace.path().join("config")).unwrap();
    std::fs::write(
        workspace.path().join("config").join("config.toml"),
        "[diagnostics]\nmax_recorded = 20\n",
    )
    .unwrap();

    let config = with_xdg_env(&xdg, || {
        std::env::set_var("CATALOG_STRATA__DIAGNOSTICS__MAX_RECORDED", "3");
        let config = ConfigLoader::load(workspace.path());
        std::env::remove_var("CATALOG_STRATA__DIAGNOSTICS__MAX_RECORDED");
        config
    })
    .unwrap();
    assert_eq!(config.diagnostics.max_recorded, 3);
}

#[test]
fn test_environment_specific_workspace_file() {
    let xdg = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let config_dir = workspace.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "[strata]\nload_strata = [\"wms\"]\n",
    )
    .unwrap();
    std::fs::write(
        config_dir.join("staging.toml"),
        "[strata]\nload_strata = [\"wms\", \"csv\"]\n",
    )
    .unwrap();

    let config = with_xdg_env(&xdg, || {
        std::env::set_var("CATALOG_STRATA_ENV", "staging");
        let config = ConfigLoader::load(workspace.path());
        std::env::remove_var("CATALOG_STRATA_ENV");
        config
    })
    .unwrap();
    assert_eq!(config.strata.load_strata, vec!["wms", "csv"]);

    let context = config
        .build_context(SchemaRegistry::with_builtin().unwrap())
        .unwrap();
    assert!(context.order.contains("csv"));
}

#[test]
fn test_invalid_config_is_rejected_when_building() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[strata]\nload_strata = [\"override\"]\n").unwrap();
    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert!(config.validate().is_err());
    assert!(config
        .build_context(SchemaRegistry::with_builtin().unwrap())
        .is_err());
}
