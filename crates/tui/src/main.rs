use anyhow::Result;

fn main() -> Result<()> {
    ledgerchat_tui::init_logging()?;
    ledgerchat_tui::run()
}
