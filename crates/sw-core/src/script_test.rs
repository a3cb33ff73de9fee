use super::*;
use std::fs;

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), "SELECT 1;").unwrap();
}

#[test]
fn test_marker_resolution_in_versioned_folder() {
    let versioned = FolderKind::Versioned(3);
    assert_eq!(
        ScriptMarker::from_file_name("0101_SYS_init.sql").tier(versioned),
        ConnectionTier::System
    );
    assert_eq!(
        ScriptMarker::from_file_name("0101_MASTER_init.sql").tier(versioned),
        ConnectionTier::Master
    );
    assert_eq!(
        ScriptMarker::from_file_name("0101_init.sql").tier(versioned),
        ConnectionTier::Ddl
    );
    assert_eq!(
        ScriptMarker::from_file_name("_init.sql").tier(versioned),
        ConnectionTier::Ddl
    );
}

#[test]
fn test_marker_resolution_in_bootstrap_folder() {
    let bootstrap = FolderKind::Bootstrap;
    assert_eq!(
        ScriptMarker::from_file_name("01_SYS_create_database.sql").tier(bootstrap),
        ConnectionTier::System
    );
    assert_eq!(
        ScriptMarker::from_file_name("02_MASTER_grants.sql").tier(bootstrap),
        ConnectionTier::Master
    );
    assert_eq!(
        ScriptMarker::from_file_name("03_create_roles.sql").tier(bootstrap),
        ConnectionTier::Master
    );
}

#[test]
fn test_leading_underscore_never_resolves_marker() {
    assert_eq!(ScriptMarker::from_file_name("_SYS_x.sql"), ScriptMarker::None);
}

#[test]
fn test_marker_needs_second_underscore() {
    assert_eq!(ScriptMarker::from_file_name("01_SYS.sql"), ScriptMarker::None);
    assert_eq!(ScriptMarker::from_file_name("init.sql"), ScriptMarker::None);
}

#[test]
fn test_marker_is_case_sensitive() {
    assert_eq!(ScriptMarker::from_file_name("01_sys_x.sql"), ScriptMarker::None);
    assert_eq!(ScriptMarker::from_file_name("01_Master_x.sql"), ScriptMarker::None);
}

#[test]
fn test_is_script_file() {
    assert!(is_script_file(Path::new("a/1_x.sql")));
    assert!(is_script_file(Path::new("a/1_x.DDL")));
    assert!(is_script_file(Path::new("a/1_x.txt")));
    assert!(!is_script_file(Path::new("a/README.md")));
    assert!(!is_script_file(Path::new("a/noext")));
}

#[test]
fn test_list_scripts_orders_numerically_and_skips_other_files() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "10_x.sql");
    touch(dir.path(), "2_x.ddl");
    touch(dir.path(), "1_x.sql");
    touch(dir.path(), "notes.md");
    touch(dir.path(), "3_x.txt");
    fs::create_dir(dir.path().join("4_nested.sql")).unwrap();

    let scripts = list_scripts(dir.path()).unwrap();
    let names: Vec<&str> = scripts.iter().map(|s| s.file_name.as_str()).collect();
    assert_eq!(names, vec!["1_x.sql", "2_x.ddl", "3_x.txt", "10_x.sql"]);
    assert_eq!(scripts[3].order_key, Some(10));
    assert_eq!(scripts[0].path, dir.path().join("1_x.sql"));
}

#[test]
fn test_list_scripts_missing_folder() {
    let result = list_scripts(Path::new("/nonexistent/folder"));
    assert!(matches!(result, Err(CoreError::IoWithPath { .. })));
}

#[cfg(target_os = "linux")]
#[test]
fn test_list_scripts_keeps_non_utf8_names() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "01_a.sql");
    let latin1 = dir.path().join(OsStr::from_bytes(b"02_caf\xe9.sql"));
    fs::write(&latin1, "SELECT 1;").unwrap();

    let scripts = list_scripts(dir.path()).unwrap();

    assert_eq!(scripts.len(), 2);
    assert_eq!(scripts[1].path, latin1);
    assert_eq!(scripts[1].order_key, Some(2));
    assert_eq!(scripts[1].file_name, "02_caf\u{FFFD}.sql");
}
