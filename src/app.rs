//! Interactive entry flow.
//!
//! Checks for updates once, prompts for the GIF path, then runs the cycle
//! driver in the background while the foreground waits for a quit command or
//! an interrupt.

use clap::Parser;
use smol::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use smol::stream::StreamExt;
use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;

use crate::cancel::CancelToken;
use crate::display::LiveDisplay;
use crate::driver::{CycleDriver, DriverError};
use crate::sink::DesktopSink;
use crate::store::{FrameStore, StoreError};
use crate::update::{self, UpdateOutcome};

pub static CFG: LazyLock<Config> = LazyLock::new(parse);
pub static CACHE_PATH: LazyLock<PathBuf> = LazyLock::new(sys_cache_dir);

#[derive(Parser)]
#[command(
    version = "1.0.0",
    about = "Cycles the frames of an animated GIF as the desktop background"
)]
struct Cli {
    #[arg(
        long = "dpi-aware",
        help = "Scale the display target by the primary display's DPI factor."
    )]
    dpi_aware: bool,

    #[arg(long = "no-update-check", help = "Skip the startup update check.")]
    no_update_check: bool,
}

pub struct Config {
    pub dpi_aware: bool,
    pub no_update_check: bool,
}

fn parse() -> Config {
    let parsed = Cli::parse();
    Config {
        dpi_aware: parsed.dpi_aware,
        no_update_check: parsed.no_update_check,
    }
}

fn sys_cache_dir() -> PathBuf {
    // Staged frame files land here
    if let Ok(mut value) = env::var("XDG_CACHE_HOME") {
        value.push_str("/gifpaper");
        return PathBuf::from(value);
    }
    if let Ok(mut value) = env::var("HOME") {
        value.push_str("/.cache/gifpaper");
        return PathBuf::from(value);
    }
    // This is not persistent anyhow
    PathBuf::from("/tmp/gifpaper")
}

fn setup_logger() -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                message
            ));
        })
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Driver(#[from] DriverError),
    #[error("initialisation failed: {0}")]
    Init(String),
    #[error("no input path given")]
    NoInput,
}

/// The real start.
///
/// # Errors
/// Fatal errors that will cause the program to exit non-zero are returned
/// here; everything after the driver starts is logged and recovered.
pub async fn start() -> Result<(), AppError> {
    // If cache directory does not exist, create it
    if !CACHE_PATH.is_dir() {
        std::fs::create_dir_all(CACHE_PATH.as_path())
            .map_err(|err| AppError::Init(format!("cannot create cache directory: {err}")))?;
    }
    setup_logger().map_err(|err| AppError::Init(format!("cannot set up logging: {err}")))?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || cancel.trigger())
            .map_err(|err| AppError::Init(format!("cannot install interrupt handler: {err}")))?;
    }

    if !CFG.no_update_check
        && update::check_for_updates(CACHE_PATH.clone(), cancel.clone()).await
            == UpdateOutcome::InstallerLaunched
    {
        // Get out of the installer's way.
        println!("Updating, the application will restart once the installer finishes.");
        return Ok(());
    }

    if cancel.is_triggered() {
        return Ok(());
    }

    println!("Welcome to the animated wallpaper setter.");
    println!("Enter the full path of the GIF file to use as the wallpaper:");

    let stdin = BufReader::new(smol::Unblock::new(std::io::stdin()));
    let mut lines = stdin.lines();
    let Some(line) = read_line_or_cancel(&mut lines, &cancel).await else {
        // Interrupted at the prompt, or stdin closed before a path arrived.
        return if cancel.is_triggered() {
            Ok(())
        } else {
            Err(AppError::NoInput)
        };
    };
    let path = resolve_input(line.trim())?;

    let store = FrameStore::open(&path)?;
    log::info!(
        "loaded {} frames ({}x{}) from {}",
        store.frame_count(),
        store.dimensions().0,
        store.dimensions().1,
        path.to_string_lossy()
    );

    let sink = DesktopSink::new(CACHE_PATH.clone());
    let display = LiveDisplay::new(CFG.dpi_aware);
    let mut driver = CycleDriver::new(store, sink, display, cancel.clone());
    driver.start()?;

    println!("The wallpaper now cycles through the animation.");
    println!("Press 'q' and hit Enter to quit at any time.");

    let task = smol::spawn(async move {
        driver.run().await;
    });

    // Foreground: wait for a quit line, EOF, or the interrupt. Racing against
    // the token means Ctrl-C quits without waiting for Enter.
    smol::future::race(
        async {
            while let Some(line) = lines.next().await {
                match line {
                    Ok(text) if text.trim().eq_ignore_ascii_case("q") => break,
                    Ok(_) => (),
                    Err(_) => break,
                }
            }
        },
        cancel.wait(),
    )
    .await;

    cancel.trigger();
    task.await;
    println!("Exiting the wallpaper setter.");
    Ok(())
}

/// Reads the next stdin line, raced against the cancellation token so an
/// interrupt at the prompt does not hang on a read that never finishes.
/// `None` means cancelled or end of input.
async fn read_line_or_cancel<R: AsyncBufRead + Unpin>(
    lines: &mut Lines<R>,
    cancel: &CancelToken,
) -> Option<String> {
    smol::future::race(
        async { lines.next().await.and_then(Result::ok) },
        async {
            cancel.wait().await;
            None
        },
    )
    .await
}

/// Resolves the prompted path to an absolute one. Format validation itself
/// belongs to [`FrameStore::open`].
fn resolve_input(input: &str) -> Result<PathBuf, AppError> {
    if input.is_empty() {
        return Err(AppError::NoInput);
    }
    std::path::absolute(PathBuf::from(input)).map_err(|err| {
        AppError::Store(StoreError::InvalidInput {
            path: PathBuf::from(input),
            reason: err.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Due to [`env::set_var()`] not being thread-safe, just chain them so the
    // variables are not messed around.
    #[test]
    fn getting_locations() {
        unsafe {
            env::set_var("XDG_CACHE_HOME", "/some_cachey_place");
            assert_eq!(
                sys_cache_dir(),
                PathBuf::from("/some_cachey_place/gifpaper")
            );
            env::remove_var("XDG_CACHE_HOME");
            env::set_var("HOME", "/somewhere");
            assert_eq!(sys_cache_dir(), PathBuf::from("/somewhere/.cache/gifpaper"));
            env::remove_var("HOME");
            assert_eq!(sys_cache_dir(), PathBuf::from("/tmp/gifpaper"));
        }
    }

    #[test]
    fn prompt_read_yields_a_line() {
        let cancel = CancelToken::new();
        let mut lines = smol::io::Cursor::new(b"/some/anim.gif\n".to_vec()).lines();
        let line = smol::block_on(read_line_or_cancel(&mut lines, &cancel));
        assert_eq!(line.as_deref(), Some("/some/anim.gif"));
    }

    #[test]
    fn prompt_read_unblocks_on_cancellation() {
        use std::pin::Pin;
        use std::task::{Context, Poll};

        // Stands in for a terminal where the user never presses Enter.
        struct NeverReady;
        impl smol::io::AsyncRead for NeverReady {
            fn poll_read(
                self: Pin<&mut Self>,
                _cx: &mut Context<'_>,
                _buf: &mut [u8],
            ) -> Poll<std::io::Result<usize>> {
                Poll::Pending
            }
        }

        let cancel = CancelToken::new();
        let mut lines = BufReader::new(NeverReady).lines();
        let line = smol::block_on(async {
            smol::future::race(
                read_line_or_cancel(&mut lines, &cancel),
                async {
                    smol::Timer::after(std::time::Duration::from_millis(10)).await;
                    cancel.trigger();
                    // Give the raced read its wake-up; it must resolve, not
                    // this arm.
                    smol::Timer::after(std::time::Duration::from_secs(5)).await;
                    Some("timed out".to_string())
                },
            )
            .await
        });
        assert_eq!(line, None);
    }

    #[test]
    fn resolving_input_paths() {
        assert!(matches!(resolve_input(""), Err(AppError::NoInput)));
        let resolved = resolve_input("some/anim.gif").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some/anim.gif"));
    }
}
