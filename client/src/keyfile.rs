//! Authentication key resolution

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use pftabled_proto::{AuthKey, TAG_LEN};
use tracing::info;

/// Bytes read from a key file; the same length pftabled reads on its side.
pub const KEYFILE_LEN: usize = TAG_LEN;

/// Pick the key: the positional argument, else the key file, else empty.
pub fn resolve(key: Option<&str>, keyfile: Option<&Path>) -> Result<AuthKey> {
    if let Some(key) = key {
        return Ok(AuthKey::from(key));
    }
    if let Some(path) = keyfile {
        return read_keyfile(path);
    }
    info!("No key given, signing with an empty key");
    Ok(AuthKey::empty())
}

pub fn read_keyfile(path: &Path) -> Result<AuthKey> {
    let file = File::open(path)
        .with_context(|| format!("Unable to open key file {}", path.display()))?;

    let mut buf = Vec::with_capacity(KEYFILE_LEN);
    file.take(KEYFILE_LEN as u64)
        .read_to_end(&mut buf)
        .with_context(|| format!("Unable to read key file {}", path.display()))?;

    if buf.len() != KEYFILE_LEN {
        bail!(
            "Key file {} holds {} bytes, expected at least {}",
            path.display(),
            buf.len(),
            KEYFILE_LEN
        );
    }

    info!("Loaded {}-byte key from {}", KEYFILE_LEN, path.display());
    Ok(AuthKey::new(buf))
}
