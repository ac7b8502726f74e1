use std::env;

fn main() {
    env_logger::init();
    match tally::run_app(env::args().collect()) {
        Ok(_) => {}
        Err(_) => std::process::exit(1),
    }
}
