//! GNOME backend, driven through `gsettings`.

use std::path::Path;
use std::process::Command;

use super::{Scope, SinkError, file_uri};

pub fn set_wallpaper(image: &Path, scope: Scope) -> Result<(), SinkError> {
    let uri = file_uri(image)?;

    // dconf persists and broadcasts in one step; a scope asking for neither
    // leaves nothing to do.
    if !scope.persist && !scope.broadcast {
        return Ok(());
    }

    run_gsettings("picture-uri", &uri)?;
    // Dark variant exists from GNOME 42 on; best-effort.
    let _ = run_gsettings("picture-uri-dark", &uri);
    Ok(())
}

fn run_gsettings(key: &str, value: &str) -> Result<(), SinkError> {
    let status = Command::new("gsettings")
        .arg("set")
        .arg("org.gnome.desktop.background")
        .arg(key)
        .arg(value)
        .status()
        .map_err(|err| SinkError::Setter(format!("cannot run gsettings: {err}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(SinkError::Setter(format!("gsettings set {key} failed")))
    }
}
