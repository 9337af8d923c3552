use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use log::debug;

use super::raw::ConfigDocument;
use crate::errors::MyError;

impl ConfigDocument {
    pub fn from_json_file<P>(path: P) -> Result<ConfigDocument, MyError>
    where
        P: AsRef<Path>,
    {
        let mut file = File::open(path.as_ref())?;
        let mut buffer = Vec::new();

        file.read_to_end(&mut buffer)?;
        debug!("read {} bytes from {}", buffer.len(), path.as_ref().display());

        Ok(serde_json::from_slice(&buffer)?)
    }

    pub fn from_json_str(s: &str) -> Result<ConfigDocument, MyError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_file<P>(&self, path: P) -> Result<(), MyError>
    where
        P: AsRef<Path>,
    {
        let mut file = File::create(path)?;

        let data = serde_json::to_string_pretty(&self)?;

        file.write_all(data.as_bytes())?;

        file.sync_all()?;

        Ok(())
    }
}
