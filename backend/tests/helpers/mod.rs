use std::env;
use std::path::PathBuf;
use std::sync::Once;

use dotenvy::dotenv;

use tadabbur_backend::content_loader::DirSource;
use tadabbur_backend::init_app_globals;

static SETUP: Once = Once::new();

/// Keep test runs from writing log files into the user's data dir.
pub fn app_setup() {
    SETUP.call_once(|| {
        dotenv().ok();
        unsafe {
            env::set_var("DISABLE_LOG", "true");
            env::set_var("TADABBUR_DIR", env::temp_dir().join("tadabbur-tests"));
        }
        init_app_globals();
    });
}

pub fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

#[allow(dead_code)]
pub fn public_source() -> DirSource {
    DirSource::new(&test_data_dir().join("public"))
}

#[allow(dead_code)]
pub fn broken_source() -> DirSource {
    DirSource::new(&test_data_dir().join("broken"))
}
