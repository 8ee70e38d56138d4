mod app;
mod cat;
mod click;
mod error;
mod mask;
mod platform;
mod render;
mod sheet;


fn main() {
    env_logger::init();
    log::info!("Desktop cat starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
