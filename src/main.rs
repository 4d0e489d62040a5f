//! Binary entry point for `fs-txn`.

use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = fs_txn::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
