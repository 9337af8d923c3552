mod args;

use std::env::{set_var, var_os};
use std::time::Instant;

use args::{command, serialization_parameter};
use log::{debug, info};
use someip_arxml_decoder::{MyError, SomeipConverter};

fn main() -> Result<(), MyError> {
    let matches = command().get_matches();

    let debug = matches.get_flag("debug");
    if debug {
        set_var("RUST_LOG", "debug");
    } else if var_os("RUST_LOG").is_none() {
        set_var("RUST_LOG", "off");
    }
    env_logger::init();
    debug!("in debug mode");

    let config_file = matches
        .get_one::<String>("config")
        .ok_or_else(|| MyError::ArgInputError("config".to_owned()))?;
    let service_id = *matches
        .get_one::<u16>("service")
        .ok_or_else(|| MyError::ArgInputError("service".to_owned()))?;
    let id = *matches
        .get_one::<u32>("id")
        .ok_or_else(|| MyError::ArgInputError("id".to_owned()))?;
    let payload = matches
        .get_one::<Vec<u8>>("payload")
        .ok_or_else(|| MyError::ArgInputError("payload".to_owned()))?;

    let config = serialization_parameter(&matches);
    info!("config file:{}, session: {:?}", config_file, config);

    let start = Instant::now();
    let converter = SomeipConverter::from_json_file(config_file, config)?;
    debug!("configuration loaded in {:?}", start.elapsed());

    let start = Instant::now();
    let (label, value) = converter.convert(service_id, id, payload)?;
    debug!("{} bytes decoded in {:?}", payload.len(), start.elapsed());

    println!("{}", label);
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
