//! Environment-sourced settings. Serialized because they mutate process env.

use std::env;
use std::path::PathBuf;

use serial_test::serial;
use w1therm::Settings;

fn clear_env() {
    env::remove_var("W1THERM_BASE_DIRECTORY");
    env::remove_var("W1THERM_NO_KERNEL_MODULE");
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();
    let settings = Settings::from_env().unwrap();
    assert_eq!(
        settings.base_directory,
        PathBuf::from("/sys/bus/w1/devices")
    );
    assert!(settings.auto_load_modules);
}

#[test]
#[serial]
fn test_base_directory_override() {
    clear_env();
    env::set_var("W1THERM_BASE_DIRECTORY", "/tmp/fake-devices");
    let settings = Settings::from_env().unwrap();
    assert_eq!(settings.base_directory, PathBuf::from("/tmp/fake-devices"));
    clear_env();
}

#[test]
#[serial]
fn test_no_kernel_module_toggle() {
    clear_env();
    env::set_var("W1THERM_NO_KERNEL_MODULE", "1");
    let settings = Settings::from_env().unwrap();
    assert!(!settings.auto_load_modules);

    // only the literal "1" suppresses the module load
    env::set_var("W1THERM_NO_KERNEL_MODULE", "0");
    let settings = Settings::from_env().unwrap();
    assert!(settings.auto_load_modules);
    clear_env();
}
