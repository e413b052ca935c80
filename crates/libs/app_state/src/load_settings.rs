use crate::{AppSettings, DatabaseConstants, RawSettings};
use color_eyre::eyre::Result;
use std::path::Path;
use std::sync::LazyLock;

pub fn load_app_settings() -> Result<AppSettings> {
    // Need to load from dotenv to get it to overwrite secrets from env.
    dotenv::from_path(".env").ok();
    let config_path = Path::new("config/settings.yaml").canonicalize()?;

    let builder = config::Config::builder()
        .add_source(config::File::from(config_path))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

    let raw_settings = builder.build()?.try_deserialize::<RawSettings>()?;
    Ok(raw_settings.into())
}

fn load_db_constants() -> Result<DatabaseConstants> {
    let config_path = Path::new("config/settings.yaml").canonicalize()?;
    let builder = config::Config::builder().add_source(config::File::from(config_path));
    let raw = builder.build()?.try_deserialize::<RawSettings>()?;
    Ok(raw.constants.database)
}

pub static DB_CONSTANTS: LazyLock<DatabaseConstants> =
    LazyLock::new(|| load_db_constants().expect("Cannot load app settings."));

#[must_use]
pub fn db_constants() -> &'static DatabaseConstants {
    &DB_CONSTANTS
}
