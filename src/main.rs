use std::process::ExitCode;

fn main() -> ExitCode {
    match smol::block_on(gifpaper::app::start()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
