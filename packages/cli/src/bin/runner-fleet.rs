//! runner-fleet - manage a fleet of GitHub Actions self-hosted runners

fn main() -> anyhow::Result<()> {
    runner_fleet::run()
}
