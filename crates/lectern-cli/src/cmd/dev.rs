use anyhow::Result;

pub async fn run() -> Result<()> {
    lectern_dev::start().await
}
