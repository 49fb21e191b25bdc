//! runner-agent - container entrypoint for one fleet runner
//!
//! Registers the runner with GitHub, supervises the vendor run process, and
//! deregisters on termination signal before exiting.

fn main() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime");

    let exit_code = runtime.block_on(runner_fleet::agent::run());
    std::process::exit(exit_code);
}
