fn main() -> anyhow::Result<()> {
    launchcp::cli::run()
}
