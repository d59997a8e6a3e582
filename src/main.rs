mod app;
mod config;
mod decode;
mod logger;
mod prelude;
mod report;
mod run;
mod runner;
mod sweep;

fn main() {
    let res = crate::app::run();
    if let Err(err) = res {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
