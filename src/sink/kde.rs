//! KDE Plasma backend, driven through the PlasmaShell scripting API.

use std::path::Path;
use std::process::Command;

use super::{Scope, SinkError, file_uri};

pub fn set_wallpaper(image: &Path, scope: Scope) -> Result<(), SinkError> {
    if !scope.persist && !scope.broadcast {
        return Ok(());
    }

    let qdbus = find_qdbus().ok_or_else(|| {
        SinkError::Setter("qdbus not found (tried qdbus6 and qdbus)".to_string())
    })?;
    let uri = file_uri(image)?;
    let script = format!(
        "var allDesktops = desktops();\n\
         for (var i = 0; i < allDesktops.length; i++) {{\n\
           var d = allDesktops[i];\n\
           d.wallpaperPlugin = 'org.kde.image';\n\
           d.currentConfigGroup = ['Wallpaper', 'org.kde.image', 'General'];\n\
           d.writeConfig('Image', '{uri}');\n\
         }}\n"
    );

    let status = Command::new(qdbus)
        .arg("org.kde.plasmashell")
        .arg("/PlasmaShell")
        .arg("org.kde.PlasmaShell.evaluateScript")
        .arg(script)
        .status()
        .map_err(|err| SinkError::Setter(format!("cannot run {qdbus}: {err}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(SinkError::Setter("PlasmaShell wallpaper script failed".to_string()))
    }
}

fn find_qdbus() -> Option<&'static str> {
    // Plasma 6 ships qdbus6, Plasma 5 ships qdbus.
    ["qdbus6", "qdbus"]
        .into_iter()
        .find(|exe| Command::new(exe).arg("--version").output().is_ok())
}
