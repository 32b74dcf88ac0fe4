use declarations::prelude::*;
use serial_test::serial;

const ENV_VARS: [(&str, &str); 6] = [
    ("NTNX_ACCOUNT_NAME", "acct1"),
    ("NTNX_SUBNET", "sub1"),
    ("NTNX_SUBNET_CLUSTER", "cluster1"),
    ("VCPUS", "4"),
    ("STORAGE", "100"),
    ("MEMORY", "8192"),
];

fn set_all() {
    for (key, value) in ENV_VARS {
        std::env::set_var(key, value);
    }
}

fn clear_all() {
    for (key, _) in ENV_VARS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_declarations_from_process_environment() {
    set_all();
    let source = ProcessEnv::new();

    let environment = load_environment(&source, DEFAULT_ENVIRONMENT_NAME).unwrap();
    let project = load_project(&source, DEFAULT_PROJECT_NAME).unwrap();
    clear_all();

    assert_eq!(environment.name, "SampleDslEnvironment");
    assert_eq!(environment.subnets().count(), 1);
    assert_eq!(project.name, "TestDslDemoProject");
    assert_eq!(project.quota(QuotaKind::Vcpus), Some(4));
    assert_eq!(project.quota(QuotaKind::Storage), Some(100));
    assert_eq!(project.quota(QuotaKind::Memory), Some(8192));
}

#[test]
#[serial]
fn test_missing_process_variable_is_reported_by_name() {
    set_all();
    std::env::remove_var("MEMORY");
    let source = ProcessEnv::new();

    let err = load_project(&source, DEFAULT_PROJECT_NAME).unwrap_err();
    clear_all();

    assert_eq!(
        err.to_string(),
        "missing required configuration variable MEMORY"
    );
}

#[test]
#[serial]
fn test_process_and_map_sources_agree() {
    set_all();
    let from_process = EnvironmentConfig::from_env(&ProcessEnv::new()).unwrap();
    clear_all();

    let map: MapEnv = ENV_VARS.into_iter().collect();
    let from_map = EnvironmentConfig::from_env(&map).unwrap();

    assert_eq!(from_process, from_map);
}
