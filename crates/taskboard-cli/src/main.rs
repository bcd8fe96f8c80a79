use std::ffi::OsString;

use taskboard_core::Outcome;

#[tokio::main]
async fn main() {
    let args: Vec<OsString> = std::env::args_os().collect();
    match taskboard_core::run(args).await {
        Ok(Outcome::Done) => {}
        Ok(Outcome::Failed) => std::process::exit(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
